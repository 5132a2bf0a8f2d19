mod integrator;

pub use integrator::{background_gradient, trace};

use image::RgbImage;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use serde::Deserialize;

use crate::batch::Vec3Batch;
use crate::camera::Camera;
use crate::geometry::FloatType;
use crate::scene::Scene;

/// Everything the renderer consumes besides the scene itself. Deserializable
/// from a TOML settings file; every field has a sensible default.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSettings {
    pub width: u32,
    pub aspect_ratio: FloatType,
    pub samples_per_pixel: u32,
    pub max_depth: u32,
    /// Lower valid hit distance; slightly above zero to avoid shadow acne
    /// from self-intersection.
    pub t_min: FloatType,
    pub t_max: FloatType,
    /// Fixed rng seed for reproducible images; `None` seeds from the OS.
    pub seed: Option<u64>,

    pub viewport_height: FloatType,
    pub focal_length: FloatType,
    pub camera_origin: [FloatType; 3],
}

impl Default for RenderSettings {
    fn default() -> RenderSettings {
        RenderSettings {
            width: 400,
            aspect_ratio: 16.0 / 9.0,
            samples_per_pixel: 10,
            max_depth: 50,
            t_min: 0.001,
            t_max: FloatType::INFINITY,
            seed: None,
            viewport_height: 2.0,
            focal_length: 1.0,
            camera_origin: [0.0, 0.0, 0.0],
        }
    }
}

impl RenderSettings {
    pub fn height(&self) -> u32 {
        (self.width as FloatType / self.aspect_ratio) as u32
    }

    pub fn rng(&self) -> SmallRng {
        match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        }
    }
}

/// Renders the scene into an 8-bit RGB image: accumulates
/// `samples_per_pixel` traced frames with jittered pixel coordinates, then
/// gamma-corrects and quantizes. `on_sample(done, total)` is called after
/// every completed sample pass.
pub fn render(
    scene: &Scene,
    camera: &Camera,
    settings: &RenderSettings,
    mut on_sample: impl FnMut(u32, u32),
) -> anyhow::Result<RgbImage> {
    let width = settings.width;
    let height = settings.height();
    anyhow::ensure!(width > 1 && height > 1, "image must be at least 2x2");

    let lanes = (width * height) as usize;
    let (u, v) = pixel_grid(width, height);

    let mut rng = settings.rng();
    let mut accumulated = Vec3Batch::zeros(lanes);
    let samples = settings.samples_per_pixel.max(1);
    for sample in 0..samples {
        let uu = jittered(&u, (width - 1) as FloatType, &mut rng);
        let vv = jittered(&v, (height - 1) as FloatType, &mut rng);
        let rays = camera.rays(&uu, &vv);

        let colors = trace(scene, rays, settings, &mut rng)?;
        accumulated += &colors;
        on_sample(sample + 1, samples);
    }

    let averaged = &accumulated / samples as FloatType;
    // sqrt is gamma 2 correction, the clamp keeps quantization below 256
    let corrected = averaged.sqrt().clamp(0.0, 0.999);

    Ok(RgbImage::from_fn(width, height, |x, y| {
        let lane = (y * width + x) as usize;
        let color = corrected.lane(lane) * 256.0;
        image::Rgb([color.x as u8, color.y as u8, color.z as u8])
    }))
}

/// Normalized (u, v) coordinates of every pixel center, row-major from the
/// top-left corner.
fn pixel_grid(width: u32, height: u32) -> (Vec<FloatType>, Vec<FloatType>) {
    let lanes = (width * height) as usize;
    let mut u = Vec::with_capacity(lanes);
    let mut v = Vec::with_capacity(lanes);
    for row in 0..height {
        for column in 0..width {
            u.push(column as FloatType / (width - 1) as FloatType);
            v.push(row as FloatType / (height - 1) as FloatType);
        }
    }
    (u, v)
}

/// Offsets every coordinate by up to one pixel pitch for antialiasing.
fn jittered(coordinates: &[FloatType], span: FloatType, rng: &mut impl Rng) -> Vec<FloatType> {
    coordinates
        .iter()
        .map(|&c| c + rng.random_range(0.0..1.0) / span)
        .collect()
}
