//! The built-in demo scenes, selectable by name from the command line.

use std::str::FromStr;

use crate::geometry::WorldPoint;
use crate::material::{Color, Material};
use crate::scene::Scene;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Preset {
    /// A diffuse sphere on a diffuse ground with one small metal sphere.
    ThreeSpheres,
    /// Diffuse center sphere flanked by two metal spheres on a ground plane.
    FourSpheres,
    /// The four-sphere layout with visibly different fuzz on the two metals.
    #[default]
    FuzzedMetal,
}

impl Preset {
    pub const NAMES: [&str; 3] = ["three_spheres", "four_spheres", "fuzzed_metal"];

    pub fn build(self) -> Scene {
        match self {
            Preset::ThreeSpheres => three_spheres(),
            Preset::FourSpheres => four_spheres(0.0, 0.0),
            Preset::FuzzedMetal => four_spheres(0.3, 1.0),
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(name: &str) -> Result<Preset, String> {
        match name {
            "three_spheres" => Ok(Preset::ThreeSpheres),
            "four_spheres" => Ok(Preset::FourSpheres),
            "fuzzed_metal" => Ok(Preset::FuzzedMetal),
            other => Err(format!(
                "unknown scene {other:?}, expected one of {:?}",
                Preset::NAMES
            )),
        }
    }
}

fn three_spheres() -> Scene {
    let mut scene = Scene::new();
    let diffuse = scene.add_material(Material::diffuse(Color::new(0.0, 0.0, 0.3)));
    let metal = scene.add_material(Material::reflective(Color::new(0.3, 0.1, 0.1), 1.0));

    scene.add_sphere(WorldPoint::new(0.0, 0.0, -1.0), 0.5, diffuse);
    scene.add_sphere(WorldPoint::new(0.0, -100.5, -1.0), 100.0, diffuse);
    scene.add_sphere(WorldPoint::new(0.5, 0.25, -1.0), 0.25, metal);
    scene
}

fn four_spheres(left_fuzz: f32, right_fuzz: f32) -> Scene {
    let mut scene = Scene::new();
    let ground = scene.add_material(Material::diffuse(Color::new(0.8, 0.8, 0.0)));
    let center = scene.add_material(Material::diffuse(Color::new(0.7, 0.3, 0.3)));
    let left = scene.add_material(Material::reflective(Color::new(0.8, 0.8, 0.8), left_fuzz));
    let right = scene.add_material(Material::reflective(Color::new(0.8, 0.6, 0.2), right_fuzz));

    scene.add_sphere(WorldPoint::new(0.0, -100.5, -1.0), 100.0, ground);
    scene.add_sphere(WorldPoint::new(0.0, 0.0, -1.0), 0.5, center);
    scene.add_sphere(WorldPoint::new(-1.0, 0.0, -1.0), 0.5, left);
    scene.add_sphere(WorldPoint::new(1.0, 0.0, -1.0), 0.5, right);
    scene
}
