use assert2::assert;
use bon::bon;
use itertools::izip;

use crate::batch::{RayBatch, Vec3Batch};
use crate::geometry::{FloatType, WorldPoint, WorldVector};

/// Simple viewport camera: maps normalized image-plane coordinates to a
/// frame-wide ray batch.
///
/// The integrator treats this as an opaque upstream producer of ray batches.
#[derive(Copy, Clone, Debug)]
pub struct Camera {
    origin: WorldPoint,
    film_origin: WorldPoint,
    horizontal: WorldVector,
    vertical: WorldVector,
}

#[bon]
impl Camera {
    #[builder]
    pub fn new(
        aspect_ratio: FloatType,
        viewport_height: FloatType,
        focal_length: FloatType,
        origin: WorldPoint,
    ) -> Camera {
        assert!(aspect_ratio > 0.0);
        assert!(viewport_height > 0.0);
        assert!(focal_length > 0.0);

        let viewport_width = aspect_ratio * viewport_height;
        let horizontal = WorldVector::new(viewport_width, 0.0, 0.0);
        // v grows downward so that v = 0 is the top image row
        let vertical = WorldVector::new(0.0, -viewport_height, 0.0);
        let film_origin =
            origin - horizontal / 2.0 - vertical / 2.0 - WorldVector::new(0.0, 0.0, focal_length);

        Camera {
            origin,
            film_origin,
            horizontal,
            vertical,
        }
    }
}

impl Camera {
    /// Builds one ray per (u, v) pair; both coordinates are normalized to
    /// [0, 1] across the image plane.
    pub fn rays(&self, u: &[FloatType], v: &[FloatType]) -> RayBatch {
        debug_assert!(u.len() == v.len());
        let mut direction = Vec3Batch::default();
        for (&u, &v) in izip!(u, v) {
            let target = self.film_origin + self.horizontal * u + self.vertical * v;
            let d = target - self.origin;
            direction.x.push(d.x);
            direction.y.push(d.y);
            direction.z.push(d.z);
        }

        RayBatch::new(Vec3Batch::splat(self.origin.coords, u.len()), direction)
    }
}
