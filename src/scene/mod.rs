pub mod presets;

use thiserror::Error;

use crate::batch::{RayBatch, Vec3Batch};
use crate::geometry::{FloatType, HitRecordBatch, WorldPoint, closest_sphere_root};
use crate::material::{Material, MaterialId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TraceError {
    /// A hit record carries a material id with no matching registry entry.
    /// This is a broken scene, not a recoverable per-lane condition.
    #[error("no material registered for {0:?}")]
    UnknownMaterial(MaterialId),
}

/// An object that can be intersection-tested against a whole ray batch.
///
/// Implementations write into the shared hit record in place, only touching
/// lanes where their own intersection beats the recorded one, so running all
/// objects of a scene in any order yields the per-lane closest hit.
pub trait Hittable {
    fn update_hit_record(
        &self,
        rays: &RayBatch,
        t_min: FloatType,
        t_max: FloatType,
        record: &mut HitRecordBatch,
    );
}

pub struct Sphere {
    pub center: WorldPoint,
    pub radius: FloatType,
    pub material: MaterialId,
}

impl Hittable for Sphere {
    fn update_hit_record(
        &self,
        rays: &RayBatch,
        t_min: FloatType,
        t_max: FloatType,
        record: &mut HitRecordBatch,
    ) {
        debug_assert!(rays.len() == record.len());
        let candidate = closest_sphere_root(rays, self.center, self.radius, t_min, t_max);
        let lanes = record.closer_lanes(&candidate);
        if lanes.is_empty() {
            return;
        }

        // Positions and normals are only computed for the lanes we are about
        // to overwrite.
        let hit_rays = rays.gather(&lanes);
        let t: Vec<FloatType> = lanes.iter().map(|&i| candidate[i]).collect();
        let position = hit_rays.at(&t);
        let outward =
            &(&position - &Vec3Batch::splat(self.center.coords, lanes.len())) / self.radius;
        let front_face: Vec<bool> = hit_rays
            .direction
            .dot(&outward)
            .into_iter()
            .map(|d| d < 0.0)
            .collect();
        // The stored normal always faces the incoming ray
        let normal = Vec3Batch::select(&front_face, &outward, &-&outward);

        record.write_hits(&lanes, &position, &normal, &t, &front_face, self.material);
    }
}

/// An ordered list of objects plus the material registry their ids point
/// into. Objects and materials are immutable for the duration of a render.
#[derive(Default)]
pub struct Scene {
    objects: Vec<Box<dyn Hittable>>,
    materials: Vec<Material>,
}

impl Scene {
    pub fn new() -> Scene {
        Scene::default()
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId::new(self.materials.len() - 1)
    }

    pub fn add_sphere(&mut self, center: WorldPoint, radius: FloatType, material: MaterialId) {
        self.objects.push(Box::new(Sphere {
            center,
            radius,
            material,
        }));
    }

    pub fn objects(&self) -> &[Box<dyn Hittable>] {
        &self.objects
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn material(&self, id: MaterialId) -> Result<&Material, TraceError> {
        self.materials
            .get(id.index())
            .ok_or(TraceError::UnknownMaterial(id))
    }
}
