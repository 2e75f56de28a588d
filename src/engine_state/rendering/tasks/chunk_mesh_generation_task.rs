//! Task for generating mesh data for chunks in a background thread.
//!
//! This module contains the `ChunkMeshGenerationTask` which builds the vertex and
//! index data of one chunk off the main thread and leaves the result in the
//! terrain's upload mailbox for the coordinator.

use std::sync::Arc;

use crate::{
    core::MtResource,
    engine_state::{
        rendering::meshing::ChunkMeshData,
        task_management::task::Task,
        voxels::{chunk::Chunk, terrain::Terrain},
    },
};

/// A task that generates mesh data for a chunk in a background thread.
///
/// This task is responsible for:
/// 1. Snapshotting the chunk and the border slabs of its neighbors
/// 2. Generating opaque and transparent vertex and index data
/// 3. Appending the result to the terrain's mesh-data mailbox
pub struct ChunkMeshGenerationTask {
    terrain: Arc<Terrain>,
    /// The chunk that needs mesh generation
    chunk: MtResource<Chunk>,
}

impl ChunkMeshGenerationTask {
    /// Creates a new chunk mesh generation task.
    ///
    /// # Arguments
    /// * `terrain` - The terrain used to look up neighboring chunks
    /// * `chunk` - The generated chunk that needs mesh generation
    pub fn new(terrain: Arc<Terrain>, chunk: MtResource<Chunk>) -> Self {
        ChunkMeshGenerationTask { terrain, chunk }
    }
}

impl Task for ChunkMeshGenerationTask {
    fn name(&self) -> &'static str {
        "chunk_mesh_generation"
    }

    fn process(&self) {
        if !self.chunk.get().is_generated() {
            log::warn!("Skipping meshing of ungenerated chunk {:?}", self.chunk.get().position);
            return;
        }
        let mesh = ChunkMeshData::build(&self.terrain, self.chunk.clone());
        log::trace!(
            "Meshed chunk {:?}: {} faces at generation {}",
            mesh.position,
            mesh.face_count(),
            mesh.generation
        );
        self.terrain.chunks_with_mesh_data().push(mesh);
    }
}
