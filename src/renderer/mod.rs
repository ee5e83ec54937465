//! WebGPU rendering module
//!
//! `scene` turns the world into a flat-colored triangle list; `pipeline`
//! uploads it and draws it.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::{RenderOptions, build_scene};
pub use vertex::Vertex;
