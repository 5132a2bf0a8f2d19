use itertools::izip;

use crate::batch::{RayBatch, Vec3Batch};
use crate::geometry::{FloatType, WorldPoint};

/// Solves the sphere quadratic for a whole ray batch and returns the closest
/// root inside `(t_min, t_max)` per lane, or `INFINITY` where there is none.
///
/// Uses the half-b substitution: with `a = d.d`, `half_b = d.(o-c)` and
/// `c = |o-c|^2 - r^2` the roots are `(-half_b +- sqrt(half_b^2 - a c)) / a`.
/// A negative discriminant makes the square root NaN; both range comparisons
/// then fail and the lane falls through to `INFINITY`. The nearer root `t1`
/// wins wherever both roots are in range (`t1 <= t2` always holds).
pub fn closest_sphere_root(
    rays: &RayBatch,
    center: WorldPoint,
    radius: FloatType,
    t_min: FloatType,
    t_max: FloatType,
) -> Vec<FloatType> {
    let oc = &rays.origin - &Vec3Batch::splat(center.coords, rays.len());
    let a = rays.direction.length_squared();
    let half_b = oc.dot(&rays.direction);
    let c: Vec<FloatType> = oc
        .length_squared()
        .into_iter()
        .map(|len2| len2 - radius * radius)
        .collect();

    izip!(&a, &half_b, &c)
        .map(|(&a, &half_b, &c)| {
            let root = (half_b * half_b - a * c).sqrt();
            let t1 = (-half_b - root) / a;
            let t2 = (-half_b + root) / a;

            if t1 > t_min && t1 < t_max {
                t1
            } else if t2 > t_min && t2 < t_max {
                t2
            } else {
                FloatType::INFINITY
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::assert;
    use proptest::prelude::Strategy;
    use test_case::test_case;
    use test_strategy::proptest;

    fn single_ray(origin: [FloatType; 3], direction: [FloatType; 3]) -> RayBatch {
        RayBatch::new(
            Vec3Batch::from_components(vec![origin[0]], vec![origin[1]], vec![origin[2]]),
            Vec3Batch::from_components(vec![direction[0]], vec![direction[1]], vec![direction[2]]),
        )
    }

    #[test]
    fn axial_hit_finds_near_root() {
        let rays = single_ray([0.0, 0.0, 0.0], [0.0, 0.0, -1.0]);
        let roots = closest_sphere_root(
            &rays,
            WorldPoint::new(0.0, 0.0, -1.0),
            0.5,
            0.001,
            FloatType::INFINITY,
        );
        assert!((roots[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn parallel_miss_stays_infinite() {
        let rays = single_ray([0.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let roots = closest_sphere_root(
            &rays,
            WorldPoint::new(0.0, 0.0, -1.0),
            0.5,
            0.001,
            FloatType::INFINITY,
        );
        assert!(roots[0] == FloatType::INFINITY);
    }

    #[test]
    fn negative_discriminant_lanes_stay_infinite_among_hits() {
        // Lane 0 hits, lane 1 misses wide, lane 2 hits
        let rays = RayBatch::new(
            Vec3Batch::from_components(vec![0.0, 5.0, 0.0], vec![0.0, 5.0, 0.1], vec![0.0, 0.0, 0.0]),
            Vec3Batch::from_components(vec![0.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![-1.0, 0.0, -1.0]),
        );
        let roots = closest_sphere_root(
            &rays,
            WorldPoint::new(0.0, 0.0, -1.0),
            0.5,
            0.001,
            FloatType::INFINITY,
        );
        assert!(roots[0].is_finite());
        assert!(roots[1] == FloatType::INFINITY);
        assert!(roots[2].is_finite());
    }

    #[test]
    fn ray_inside_sphere_takes_far_root() {
        // From the center both roots are +-radius / |d|; only t2 is positive
        let rays = single_ray([0.0, 0.0, -1.0], [0.0, 0.0, -1.0]);
        let roots = closest_sphere_root(
            &rays,
            WorldPoint::new(0.0, 0.0, -1.0),
            0.5,
            0.001,
            FloatType::INFINITY,
        );
        assert!((roots[0] - 0.5).abs() < 1e-6);
    }

    #[test_case(1.0; "unit direction")]
    #[test_case(3.0; "unnormalized direction")]
    fn sphere_behind_ray_is_rejected(direction_scale: FloatType) {
        let rays = single_ray([0.0, 0.0, 0.0], [0.0, 0.0, direction_scale]);
        let roots = closest_sphere_root(
            &rays,
            WorldPoint::new(0.0, 0.0, -2.0),
            0.5,
            0.001,
            FloatType::INFINITY,
        );
        assert!(roots[0] == FloatType::INFINITY);
    }

    #[test]
    fn upper_bound_excludes_far_hits() {
        let rays = single_ray([0.0, 0.0, 0.0], [0.0, 0.0, -1.0]);
        let roots = closest_sphere_root(&rays, WorldPoint::new(0.0, 0.0, -1.0), 0.5, 0.001, 0.4);
        assert!(roots[0] == FloatType::INFINITY);
    }

    fn offset_strategy() -> impl Strategy<Value = FloatType> {
        -0.4f32..0.4f32
    }

    #[proptest]
    fn hit_distance_matches_analytic_smaller_root(
        #[strategy(offset_strategy())] x: FloatType,
        #[strategy(offset_strategy())] y: FloatType,
        #[strategy(1.5f32..20.0f32)] distance: FloatType,
    ) {
        // Axis-aligned ray offset inside the silhouette of a unit-ish sphere
        let radius = 0.5;
        let rays = single_ray([x, y, 0.0], [0.0, 0.0, -1.0]);
        let roots = closest_sphere_root(
            &rays,
            WorldPoint::new(x, y, -distance),
            radius,
            0.001,
            FloatType::INFINITY,
        );

        let expected = distance - radius;
        proptest::prop_assert!((roots[0] - expected).abs() / expected < 1e-4);
    }
}
