use crate::batch::Vec3Batch;
use crate::geometry::FloatType;

/// N independent rays: lane i is the ray `origin[i] + t * direction[i]`.
///
/// A batch is created once per pixel-sample pass by the camera and then
/// repeatedly narrowed ([`RayBatch::gather`]) and rewritten in place
/// ([`RayBatch::scatter`]) as rays bounce.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RayBatch {
    pub origin: Vec3Batch,
    pub direction: Vec3Batch,
}

impl RayBatch {
    pub fn new(origin: Vec3Batch, direction: Vec3Batch) -> RayBatch {
        debug_assert!(origin.len() == direction.len());
        RayBatch { origin, direction }
    }

    pub fn len(&self) -> usize {
        self.origin.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origin.is_empty()
    }

    /// Evaluates the parametric ray equation per lane; `t` holds one
    /// parameter value per ray.
    pub fn at(&self, t: &[FloatType]) -> Vec3Batch {
        &self.origin + &self.direction.scale(t)
    }

    pub fn gather(&self, indices: &[usize]) -> RayBatch {
        RayBatch {
            origin: self.origin.gather(indices),
            direction: self.direction.gather(indices),
        }
    }

    pub fn scatter(&mut self, indices: &[usize], values: &RayBatch) {
        self.origin.scatter(indices, &values.origin);
        self.direction.scatter(indices, &values.direction);
    }
}
