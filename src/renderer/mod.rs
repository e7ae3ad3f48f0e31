//! WebGPU rendering module
//!
//! The scene is shaded and projected on the CPU each frame and drawn as
//! vertex-colored triangles.

pub mod camera;
pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderError, RenderState};
pub use scene::{FrameGeometry, build_scene};
