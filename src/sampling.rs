use rand::Rng;
use rand_distr::{Distribution as _, UnitSphere};

use crate::batch::Vec3Batch;
use crate::geometry::FloatType;

/// One uniformly distributed point on the unit sphere per lane.
pub fn random_unit_vectors(len: usize, rng: &mut impl Rng) -> Vec3Batch {
    let mut batch = Vec3Batch::default();
    for _ in 0..len {
        let [x, y, z]: [FloatType; 3] = UnitSphere.sample(rng);
        batch.x.push(x);
        batch.y.push(y);
        batch.z.push(z);
    }
    batch
}

/// One uniformly distributed point strictly inside the unit sphere per lane.
///
/// Batched rejection sampling: draw every lane uniformly in the enclosing
/// cube, then redraw only the lanes that landed outside the sphere until all
/// lanes hold a valid sample. Rejected lanes are never kept, so no lane ends
/// up with a biased sample.
pub fn random_in_unit_sphere(len: usize, rng: &mut impl Rng) -> Vec3Batch {
    let mut batch = random_in_unit_cube(len, rng);

    loop {
        let length_squared = batch.length_squared();
        let rejected: Vec<usize> = (0..len).filter(|&i| length_squared[i] >= 1.0).collect();
        if rejected.is_empty() {
            return batch;
        }
        batch.scatter(&rejected, &random_in_unit_cube(rejected.len(), rng));
    }
}

fn random_in_unit_cube(len: usize, rng: &mut impl Rng) -> Vec3Batch {
    let mut draw = |_| rng.random_range(-1.0..1.0);
    Vec3Batch::from_components(
        (0..len).map(&mut draw).collect(),
        (0..len).map(&mut draw).collect(),
        (0..len).map(&mut draw).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::assert;
    use rand::{SeedableRng, rngs::SmallRng};

    #[test]
    fn unit_vectors_have_unit_length() {
        let mut rng = SmallRng::seed_from_u64(1);
        let batch = random_unit_vectors(64, &mut rng);
        assert!(batch.len() == 64);
        for length in batch.length() {
            assert!((length - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn in_unit_sphere_samples_are_all_inside() {
        let mut rng = SmallRng::seed_from_u64(2);
        let batch = random_in_unit_sphere(256, &mut rng);
        assert!(batch.len() == 256);
        for length_squared in batch.length_squared() {
            assert!(length_squared < 1.0);
        }
    }

    #[test]
    fn empty_batches_are_fine() {
        let mut rng = SmallRng::seed_from_u64(3);
        assert!(random_unit_vectors(0, &mut rng).is_empty());
        assert!(random_in_unit_sphere(0, &mut rng).is_empty());
    }
}
