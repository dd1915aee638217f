//! WebGPU rendering module
//!
//! The scene is tessellated into stage-space triangles on the CPU and drawn
//! with a single flat-colour pipeline.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use vertex::Vertex;
