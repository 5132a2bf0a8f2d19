use rand::Rng;

use crate::batch::{RayBatch, Vec3Batch};
use crate::geometry::{FloatType, HitRecordBatch};
use crate::sampling::{random_in_unit_sphere, random_unit_vectors};

pub type Color = rgb::RGB<FloatType>;

/// Handle identifying a material inside one scene's registry.
///
/// Materials are shared by many objects and many rays; the handle is what the
/// integrator partitions rays by each round, so it has to be a stable small
/// value rather than an object identity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MaterialId(u32);

impl MaterialId {
    pub(crate) fn new(index: usize) -> MaterialId {
        MaterialId(index as u32)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }

    #[cfg(test)]
    pub(crate) fn for_tests(index: u32) -> MaterialId {
        MaterialId(index)
    }
}

/// Output of scattering one material's sub-batch: the continuation rays, the
/// material's attenuation color, and per lane whether the ray continues at
/// all.
#[derive(Clone, Debug)]
pub struct ScatterResult {
    pub rays: RayBatch,
    pub attenuation: Color,
    pub scattered: Vec<bool>,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Material {
    Diffuse { albedo: Color },
    Reflective { albedo: Color, fuzz: FloatType },
}

impl Material {
    pub fn diffuse(albedo: Color) -> Material {
        Material::Diffuse { albedo }
    }

    pub fn reflective(albedo: Color, fuzz: FloatType) -> Material {
        Material::Reflective {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    /// Scatters a sub-batch of rays off this material. `rays` and `record`
    /// must be the lanes of one material partition, in matching order.
    pub fn scatter(
        &self,
        rays: &RayBatch,
        record: &HitRecordBatch,
        rng: &mut impl Rng,
    ) -> ScatterResult {
        debug_assert!(rays.len() == record.len());
        match self {
            Material::Diffuse { albedo } => {
                // Lambertian shortcut: bounce towards normal + unit sphere
                // sample, attenuate by the albedo, never absorb.
                let direction = &record.normal + &random_unit_vectors(rays.len(), rng);
                ScatterResult {
                    rays: RayBatch::new(record.position.clone(), direction),
                    attenuation: *albedo,
                    scattered: vec![true; rays.len()],
                }
            }
            Material::Reflective { albedo, fuzz } => {
                let reflected = reflect(&rays.direction.normalized(), &record.normal);
                let direction =
                    &reflected + &(&random_in_unit_sphere(rays.len(), rng) * *fuzz);
                // Fuzzing can push the new direction below the surface;
                // those lanes are absorbed.
                let scattered = direction
                    .dot(&record.normal)
                    .into_iter()
                    .map(|d| d > 0.0)
                    .collect();
                ScatterResult {
                    rays: RayBatch::new(record.position.clone(), direction),
                    attenuation: *albedo,
                    scattered,
                }
            }
        }
    }
}

/// Mirror reflection of `v` about `n`, per lane.
fn reflect(v: &Vec3Batch, n: &Vec3Batch) -> Vec3Batch {
    let twice_projection: Vec<FloatType> = v.dot(n).into_iter().map(|d| 2.0 * d).collect();
    v - &n.scale(&twice_projection)
}
