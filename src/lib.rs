pub mod batch;
pub mod camera;
pub mod geometry;
pub mod material;
pub mod renderer;
pub mod sampling;
pub mod scene;

pub use crate::batch::{RayBatch, Vec3Batch};
pub use crate::camera::Camera;
pub use crate::material::{Color, Material, MaterialId};
pub use crate::renderer::{RenderSettings, render, trace};
pub use crate::scene::{Scene, TraceError, presets::Preset};
