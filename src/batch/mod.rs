mod ray;

pub use ray::RayBatch;

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

use itertools::izip;

use crate::geometry::{FloatType, WorldVector};

/// N independent 3-vectors stored as three lockstep component arrays.
///
/// This is the structure-of-arrays primitive everything else batches over:
/// one lane = one vector. All three components always have equal length.
/// Results of arithmetic are new batches; in-place mutation only happens
/// through [`Vec3Batch::scatter`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Vec3Batch {
    pub x: Vec<FloatType>,
    pub y: Vec<FloatType>,
    pub z: Vec<FloatType>,
}

impl Vec3Batch {
    pub fn from_components(x: Vec<FloatType>, y: Vec<FloatType>, z: Vec<FloatType>) -> Vec3Batch {
        debug_assert!(x.len() == y.len() && y.len() == z.len());
        Vec3Batch { x, y, z }
    }

    pub fn zeros(len: usize) -> Vec3Batch {
        Vec3Batch::splat(WorldVector::zeros(), len)
    }

    pub fn ones(len: usize) -> Vec3Batch {
        Vec3Batch::splat(WorldVector::new(1.0, 1.0, 1.0), len)
    }

    /// Broadcasts a single vector into every lane.
    pub fn splat(value: WorldVector, len: usize) -> Vec3Batch {
        Vec3Batch {
            x: vec![value.x; len],
            y: vec![value.y; len],
            z: vec![value.z; len],
        }
    }

    pub fn len(&self) -> usize {
        debug_assert!(self.x.len() == self.y.len() && self.y.len() == self.z.len());
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn lane(&self, index: usize) -> WorldVector {
        WorldVector::new(self.x[index], self.y[index], self.z[index])
    }

    /// Hadamard (per-component) product.
    pub fn component_mul(&self, rhs: &Vec3Batch) -> Vec3Batch {
        debug_assert!(self.len() == rhs.len());
        self.zip_components(rhs, |a, b| a * b)
    }

    /// Multiplies every lane by its own scalar.
    pub fn scale(&self, factors: &[FloatType]) -> Vec3Batch {
        debug_assert!(self.len() == factors.len());
        Vec3Batch {
            x: izip!(&self.x, factors).map(|(a, f)| a * f).collect(),
            y: izip!(&self.y, factors).map(|(a, f)| a * f).collect(),
            z: izip!(&self.z, factors).map(|(a, f)| a * f).collect(),
        }
    }

    pub fn dot(&self, rhs: &Vec3Batch) -> Vec<FloatType> {
        debug_assert!(self.len() == rhs.len());
        izip!(&self.x, &self.y, &self.z, &rhs.x, &rhs.y, &rhs.z)
            .map(|(ax, ay, az, bx, by, bz)| ax * bx + ay * by + az * bz)
            .collect()
    }

    pub fn cross(&self, rhs: &Vec3Batch) -> Vec3Batch {
        debug_assert!(self.len() == rhs.len());
        let mut result = Vec3Batch::default();
        for (ax, ay, az, bx, by, bz) in izip!(&self.x, &self.y, &self.z, &rhs.x, &rhs.y, &rhs.z) {
            result.x.push(ay * bz - az * by);
            result.y.push(az * bx - ax * bz);
            result.z.push(ax * by - ay * bx);
        }
        result
    }

    pub fn length_squared(&self) -> Vec<FloatType> {
        self.dot(self)
    }

    pub fn length(&self) -> Vec<FloatType> {
        self.length_squared().into_iter().map(FloatType::sqrt).collect()
    }

    /// Per-lane unit vectors. Zero-length lanes silently become NaN;
    /// downstream finite-distance checks filter them out.
    pub fn normalized(&self) -> Vec3Batch {
        let lengths = self.length();
        let inverse: Vec<FloatType> = lengths.into_iter().map(|l| 1.0 / l).collect();
        self.scale(&inverse)
    }

    pub fn clamp(&self, min: FloatType, max: FloatType) -> Vec3Batch {
        self.map_components(|a| a.clamp(min, max))
    }

    pub fn sqrt(&self) -> Vec3Batch {
        self.map_components(FloatType::sqrt)
    }

    /// Per-lane blend: lanes where `condition` holds come from `a`, the rest
    /// from `b`.
    pub fn select(condition: &[bool], a: &Vec3Batch, b: &Vec3Batch) -> Vec3Batch {
        debug_assert!(condition.len() == a.len() && a.len() == b.len());
        let pick = |av: &[FloatType], bv: &[FloatType]| -> Vec<FloatType> {
            izip!(condition, av, bv)
                .map(|(&c, &a, &b)| if c { a } else { b })
                .collect()
        };
        Vec3Batch {
            x: pick(&a.x, &b.x),
            y: pick(&a.y, &b.y),
            z: pick(&a.z, &b.z),
        }
    }

    /// Returns a new batch holding only the selected lanes, in the given
    /// order. Shrinks and reorders the active set.
    pub fn gather(&self, indices: &[usize]) -> Vec3Batch {
        Vec3Batch {
            x: indices.iter().map(|&i| self.x[i]).collect(),
            y: indices.iter().map(|&i| self.y[i]).collect(),
            z: indices.iter().map(|&i| self.z[i]).collect(),
        }
    }

    /// Writes `values` into the lanes named by `indices`, leaving every other
    /// lane untouched.
    pub fn scatter(&mut self, indices: &[usize], values: &Vec3Batch) {
        debug_assert!(indices.len() == values.len());
        for (slot, &i) in indices.iter().enumerate() {
            self.x[i] = values.x[slot];
            self.y[i] = values.y[slot];
            self.z[i] = values.z[slot];
        }
    }

    fn map_components(&self, f: impl Fn(FloatType) -> FloatType) -> Vec3Batch {
        Vec3Batch {
            x: self.x.iter().map(|&a| f(a)).collect(),
            y: self.y.iter().map(|&a| f(a)).collect(),
            z: self.z.iter().map(|&a| f(a)).collect(),
        }
    }

    fn zip_components(&self, rhs: &Vec3Batch, f: impl Fn(FloatType, FloatType) -> FloatType) -> Vec3Batch {
        Vec3Batch {
            x: izip!(&self.x, &rhs.x).map(|(&a, &b)| f(a, b)).collect(),
            y: izip!(&self.y, &rhs.y).map(|(&a, &b)| f(a, b)).collect(),
            z: izip!(&self.z, &rhs.z).map(|(&a, &b)| f(a, b)).collect(),
        }
    }
}

impl Add for &Vec3Batch {
    type Output = Vec3Batch;

    fn add(self, rhs: &Vec3Batch) -> Vec3Batch {
        debug_assert!(self.len() == rhs.len());
        self.zip_components(rhs, |a, b| a + b)
    }
}

impl AddAssign<&Vec3Batch> for Vec3Batch {
    fn add_assign(&mut self, rhs: &Vec3Batch) {
        debug_assert!(self.len() == rhs.len());
        for (a, b) in izip!(&mut self.x, &rhs.x) {
            *a += b;
        }
        for (a, b) in izip!(&mut self.y, &rhs.y) {
            *a += b;
        }
        for (a, b) in izip!(&mut self.z, &rhs.z) {
            *a += b;
        }
    }
}

impl Sub for &Vec3Batch {
    type Output = Vec3Batch;

    fn sub(self, rhs: &Vec3Batch) -> Vec3Batch {
        debug_assert!(self.len() == rhs.len());
        self.zip_components(rhs, |a, b| a - b)
    }
}

impl Neg for &Vec3Batch {
    type Output = Vec3Batch;

    fn neg(self) -> Vec3Batch {
        self.map_components(|a| -a)
    }
}

impl Mul<FloatType> for &Vec3Batch {
    type Output = Vec3Batch;

    fn mul(self, rhs: FloatType) -> Vec3Batch {
        self.map_components(|a| a * rhs)
    }
}

impl Div<FloatType> for &Vec3Batch {
    type Output = Vec3Batch;

    fn div(self, rhs: FloatType) -> Vec3Batch {
        self.map_components(|a| a / rhs)
    }
}
