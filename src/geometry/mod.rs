mod ray_sphere_intersection;

pub use ray_sphere_intersection::closest_sphere_root;

use crate::batch::Vec3Batch;
use crate::material::MaterialId;

pub type FloatType = f32;

pub type WorldPoint = nalgebra::Point3<FloatType>;
pub type WorldVector = nalgebra::Vector3<FloatType>;

/// Per-ray closest-intersection bookkeeping, one lane per currently active
/// ray.
///
/// `t` carries the sentinel `INFINITY` for "no hit yet" and is only ever
/// lowered, so after every scene object has been tested it holds the closest
/// valid intersection regardless of object order. `frame_index` keeps
/// pointing at the lane's slot in the outer frame-wide population even after
/// the active set has been narrowed, which is what makes accumulation into
/// frame-wide buffers correct across rounds.
#[derive(Clone, Debug, PartialEq)]
pub struct HitRecordBatch {
    pub position: Vec3Batch,
    pub normal: Vec3Batch,
    pub t: Vec<FloatType>,
    pub front_face: Vec<bool>,
    pub frame_index: Vec<u32>,
    pub material: Vec<Option<MaterialId>>,
}

impl HitRecordBatch {
    /// A record of `len` lanes in the no-hit state, with `frame_index` set to
    /// the identity mapping into the current population.
    pub fn new(len: usize) -> HitRecordBatch {
        HitRecordBatch {
            position: Vec3Batch::zeros(len),
            normal: Vec3Batch::zeros(len),
            t: vec![FloatType::INFINITY; len],
            front_face: vec![false; len],
            frame_index: (0..len as u32).collect(),
            material: vec![None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Restores the no-hit state for the next bounce round. `frame_index` is
    /// deliberately kept; it still identifies each lane in the outer frame.
    pub fn reset(&mut self) {
        self.t.fill(FloatType::INFINITY);
        self.material.fill(None);
    }

    /// Narrows the record to a subset of lanes. `frame_index` values are
    /// copied verbatim, never remapped.
    pub fn gather(&self, indices: &[usize]) -> HitRecordBatch {
        HitRecordBatch {
            position: self.position.gather(indices),
            normal: self.normal.gather(indices),
            t: indices.iter().map(|&i| self.t[i]).collect(),
            front_face: indices.iter().map(|&i| self.front_face[i]).collect(),
            frame_index: indices.iter().map(|&i| self.frame_index[i]).collect(),
            material: indices.iter().map(|&i| self.material[i]).collect(),
        }
    }

    /// Lanes where `candidate` beats the currently recorded distance.
    /// NaN candidates compare false and are dropped, so degenerate lanes
    /// never overwrite a real hit.
    pub fn closer_lanes(&self, candidate: &[FloatType]) -> Vec<usize> {
        debug_assert!(candidate.len() == self.len());
        (0..self.len()).filter(|&i| candidate[i] < self.t[i]).collect()
    }

    /// Overwrites the named lanes with a new closest hit. All other lanes are
    /// untouched.
    pub fn write_hits(
        &mut self,
        lanes: &[usize],
        position: &Vec3Batch,
        normal: &Vec3Batch,
        t: &[FloatType],
        front_face: &[bool],
        material: MaterialId,
    ) {
        self.position.scatter(lanes, position);
        self.normal.scatter(lanes, normal);
        for (slot, &lane) in lanes.iter().enumerate() {
            self.t[lane] = t[slot];
            self.front_face[lane] = front_face[slot];
            self.material[lane] = Some(material);
        }
    }
}
