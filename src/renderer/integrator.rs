//! The bounce loop: repeatedly intersects the active ray population with the
//! scene, scatters per material, and compacts away rays that stopped
//! bouncing, while accumulating throughput into frame-wide buffers.

use itertools::izip;
use rand::Rng;

use crate::batch::{RayBatch, Vec3Batch};
use crate::geometry::{FloatType, HitRecordBatch, WorldVector};
use crate::material::MaterialId;
use crate::renderer::RenderSettings;
use crate::scene::{Scene, TraceError};

/// Traces one pixel-sample pass to completion and returns the linear-space
/// color per frame lane.
///
/// Rays terminate by escaping into the background, by being absorbed at a
/// scattering event, or by exhausting the depth budget. Depth-exhausted rays
/// are shaded like escaped ones: background along their most recent scattered
/// direction, times accumulated throughput. Absorbed rays carry zero
/// throughput and therefore contribute nothing.
pub fn trace(
    scene: &Scene,
    rays: RayBatch,
    settings: &RenderSettings,
    rng: &mut impl Rng,
) -> Result<Vec3Batch, TraceError> {
    let frame_len = rays.len();
    let mut throughput = Vec3Batch::ones(frame_len);
    let mut frame_directions = rays.direction.clone();

    let mut active_rays = rays;
    let mut record = HitRecordBatch::new(frame_len);

    for _depth in 0..settings.max_depth {
        record.reset();
        for object in scene.objects() {
            object.update_hit_record(&active_rays, settings.t_min, settings.t_max, &mut record);
        }

        for (material_id, lanes) in partition_by_material(&record, scene.material_count())? {
            let material = scene.material(material_id)?;
            let sub_rays = active_rays.gather(&lanes);
            let sub_record = record.gather(&lanes);
            let result = material.scatter(&sub_rays, &sub_record, rng);

            // Continuation rays replace the scattered lanes of the working set
            active_rays.scatter(&lanes, &result.rays);

            // Frame-wide bookkeeping goes through the stored original frame
            // index, not the round-local lane number.
            let frame_lanes: Vec<usize> =
                sub_record.frame_index.iter().map(|&i| i as usize).collect();
            frame_directions.scatter(&frame_lanes, &result.rays.direction);

            for (&frame_lane, &lane, &scattered) in
                izip!(&frame_lanes, &lanes, &result.scattered)
            {
                if scattered {
                    throughput.x[frame_lane] *= result.attenuation.r;
                    throughput.y[frame_lane] *= result.attenuation.g;
                    throughput.z[frame_lane] *= result.attenuation.b;
                } else {
                    // Absorbed: zero remaining energy and drop the lane from
                    // the active set by wiping its recorded hit.
                    throughput.x[frame_lane] = 0.0;
                    throughput.y[frame_lane] = 0.0;
                    throughput.z[frame_lane] = 0.0;
                    record.t[lane] = FloatType::INFINITY;
                }
            }
        }

        // Only rays that hit something and were scattered keep bouncing
        let survivors: Vec<usize> = (0..record.len())
            .filter(|&lane| record.t[lane].is_finite())
            .collect();
        if survivors.is_empty() {
            break;
        }
        active_rays = active_rays.gather(&survivors);
        record = record.gather(&survivors);
    }

    Ok(background_gradient(&frame_directions).component_mul(&throughput))
}

/// Groups hit lanes by the material id recorded on them. Lanes with no hit
/// are excluded; an id outside the registry is a fatal scene error.
fn partition_by_material(
    record: &HitRecordBatch,
    material_count: usize,
) -> Result<Vec<(MaterialId, Vec<usize>)>, TraceError> {
    let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); material_count];
    for (lane, material) in record.material.iter().enumerate() {
        if let Some(id) = material {
            buckets
                .get_mut(id.index())
                .ok_or(TraceError::UnknownMaterial(*id))?
                .push(lane);
        }
    }

    Ok(buckets
        .into_iter()
        .enumerate()
        .filter(|(_, lanes)| !lanes.is_empty())
        .map(|(index, lanes)| (MaterialId::new(index), lanes))
        .collect())
}

/// White-to-blue vertical gradient over the normalized ray direction; the
/// light source of every scene.
pub fn background_gradient(directions: &Vec3Batch) -> Vec3Batch {
    let white = WorldVector::new(1.0, 1.0, 1.0);
    let blue = WorldVector::new(0.5, 0.7, 1.0);

    let unit = directions.normalized();
    let mut colors = Vec3Batch::default();
    for &y in &unit.y {
        let t = 0.5 * (y + 1.0);
        let color = white * (1.0 - t) + blue * t;
        colors.x.push(color.x);
        colors.y.push(color.y);
        colors.z.push(color.z);
    }
    colors
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::assert;
    use rand::{SeedableRng, rngs::SmallRng};

    use crate::geometry::WorldPoint;
    use crate::material::{Color, Material};

    fn settings_with_depth(max_depth: u32) -> RenderSettings {
        RenderSettings {
            max_depth,
            ..RenderSettings::default()
        }
    }

    fn downward_frame(len: usize) -> RayBatch {
        RayBatch::new(
            Vec3Batch::zeros(len),
            Vec3Batch::splat(WorldVector::new(0.0, 0.0, -1.0), len),
        )
    }

    #[test]
    fn empty_scene_returns_the_background() {
        let scene = Scene::new();
        let rays = RayBatch::new(
            Vec3Batch::zeros(2),
            Vec3Batch::from_components(vec![0.0, 0.0], vec![1.0, -1.0], vec![0.0, 0.0]),
        );
        let mut rng = SmallRng::seed_from_u64(8);

        let colors = trace(&scene, rays, &settings_with_depth(10), &mut rng).unwrap();

        // Straight up is pure blue, straight down pure white
        assert!((colors.lane(0) - WorldVector::new(0.5, 0.7, 1.0)).norm() < 1e-5);
        assert!((colors.lane(1) - WorldVector::new(1.0, 1.0, 1.0)).norm() < 1e-5);
    }

    #[test]
    fn depth_budget_of_one_terminates_after_a_single_round() {
        // The camera sits inside a big diffuse sphere, so every ray hits and
        // scatters; with max_depth = 1 the loop must still stop.
        let mut scene = Scene::new();
        let albedo = Color::new(0.5, 0.5, 0.5);
        let diffuse = scene.add_material(Material::diffuse(albedo));
        scene.add_sphere(WorldPoint::new(0.0, 0.0, 0.0), 10.0, diffuse);
        let mut rng = SmallRng::seed_from_u64(9);

        let colors = trace(&scene, downward_frame(16), &settings_with_depth(1), &mut rng).unwrap();

        // Exactly one attenuation by 0.5, then background <= 1 per channel
        for lane in 0..16 {
            let color = colors.lane(lane);
            assert!(color.x <= 0.5 + 1e-6);
            assert!(color.y <= 0.5 + 1e-6);
            assert!(color.z <= 0.5 + 1e-6);
            assert!(color.x >= 0.0);
        }
    }

    #[test]
    fn energy_never_exceeds_one_per_channel() {
        let scene = crate::scene::presets::Preset::FuzzedMetal.build();
        let mut rng = SmallRng::seed_from_u64(10);

        // A spread of rays towards the scene, many bounces allowed
        let u: Vec<FloatType> = (0..64).map(|i| -1.0 + (i as FloatType) / 32.0).collect();
        let rays = RayBatch::new(
            Vec3Batch::zeros(64),
            Vec3Batch::from_components(u.clone(), vec![-0.2; 64], vec![-1.0; 64]),
        );

        let colors = trace(&scene, rays, &settings_with_depth(50), &mut rng).unwrap();

        for lane in 0..64 {
            let color = colors.lane(lane);
            assert!((0.0..=1.0).contains(&color.x));
            assert!((0.0..=1.0).contains(&color.y));
            assert!((0.0..=1.0).contains(&color.z));
        }
    }

    #[test]
    fn foreign_material_id_fails_the_whole_trace() {
        let mut donor = Scene::new();
        donor.add_material(Material::diffuse(Color::new(0.5, 0.5, 0.5)));
        let foreign_id = donor.add_material(Material::diffuse(Color::new(0.1, 0.1, 0.1)));

        // This scene only registers one material, so the donor's second id
        // points past the registry.
        let mut scene = Scene::new();
        scene.add_material(Material::diffuse(Color::new(0.5, 0.5, 0.5)));
        scene.add_sphere(WorldPoint::new(0.0, 0.0, -1.0), 0.5, foreign_id);
        let mut rng = SmallRng::seed_from_u64(11);

        let result = trace(&scene, downward_frame(1), &settings_with_depth(5), &mut rng);
        assert!(result == Err(TraceError::UnknownMaterial(foreign_id)));
    }

    #[test]
    fn mirror_bounce_attenuates_exactly_once() {
        let mut scene = Scene::new();
        let metal = scene.add_material(Material::reflective(Color::new(0.8, 0.8, 0.8), 0.0));
        scene.add_sphere(WorldPoint::new(0.0, -100.5, -1.0), 100.0, metal);
        let mut rng = SmallRng::seed_from_u64(12);

        // Straight down onto the sphere's pole: the reflection goes straight
        // up and escapes, throughput is attenuated once.
        let rays = RayBatch::new(
            Vec3Batch::splat(WorldVector::new(0.0, 0.0, -1.0), 1),
            Vec3Batch::splat(WorldVector::new(0.0, -1.0, 0.0), 1),
        );
        let colors = trace(&scene, rays, &settings_with_depth(5), &mut rng).unwrap();

        // Reflected straight up into the blue end of the gradient, times 0.8
        let expected = WorldVector::new(0.5 * 0.8, 0.7 * 0.8, 1.0 * 0.8);
        assert!((colors.lane(0) - expected).norm() < 1e-4);
    }
}
