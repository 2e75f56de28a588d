//! Rendering side of the terrain pipeline.
//!
//! This module turns generated chunks into GPU-ready geometry: the meshing
//! algorithm, the vertex format handed to the render layer, and the task that runs
//! meshing on the worker pool. Drawing itself belongs to the render layer.

pub mod meshing;
pub mod tasks;
mod vertex;

// Re-export commonly used types
pub use meshing::{ChunkMeshData, MeshBuffers};
pub use vertex::Vertex;
