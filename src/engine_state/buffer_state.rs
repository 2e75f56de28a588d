//! # Buffer State Module
//!
//! This module owns the render-side copies of chunk geometry. The coordinator hands
//! every current `ChunkMeshData` to a `ChunkUploader` on its own thread; the uploader
//! replaces whatever it held for that chunk before. Buffers and their bookkeeping are
//! keyed by `ChunkPos` here rather than stored on the chunk, so uploading never
//! touches a chunk lock.
//!
//! ## Implementations
//!
//! * `ChunkBufferState` creates one set of wgpu vertex and index buffers per chunk
//!   and tracks how much GPU memory they occupy
//! * `HeadlessChunkBuffers` keeps the uploaded buffers in memory, for running the
//!   pipeline without a GPU
//!
//! ## Performance Considerations
//!
//! * Empty buffer sets are never allocated on the GPU
//! * Re-uploading a chunk drops its previous buffers, so memory tracks the live mesh

use std::collections::HashMap;

use wgpu::{util::DeviceExt, Buffer, BufferUsages, Device};

use super::rendering::meshing::{ChunkMeshData, MeshBuffers};
use super::voxels::zone::ChunkPos;

/// What the render layer currently holds for a chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadedMesh {
    /// Re-mesh generation the uploaded geometry was built from.
    pub generation: u64,
    /// Number of indices in the opaque index buffer.
    pub opaque_index_count: usize,
    /// Number of indices in the transparent index buffer.
    pub transparent_index_count: usize,
}

/// Receives finished chunk meshes on the coordinator thread.
pub trait ChunkUploader {
    /// Stores the geometry of `mesh`, replacing any earlier upload of the same chunk.
    fn upload(&mut self, mesh: &ChunkMeshData);

    /// Bookkeeping of the last upload for the chunk at `position`.
    fn uploaded(&self, position: ChunkPos) -> Option<UploadedMesh>;
}

#[derive(Debug, Default)]
struct BufferAnalytics {
    pub allocated_memory: u64,
    pub times_written: u64,
}

/// GPU buffers of one chunk. Buffers of an empty transparency class are `None`.
#[derive(Debug)]
pub struct ChunkBuffers {
    pub generation: u64,
    pub opaque_vertices: Option<Buffer>,
    pub opaque_indices: Option<Buffer>,
    pub opaque_index_count: u32,
    pub transparent_vertices: Option<Buffer>,
    pub transparent_indices: Option<Buffer>,
    pub transparent_index_count: u32,
}

/// Per-chunk wgpu buffers.
pub struct ChunkBufferState {
    pub device: Device,
    pub buffers: HashMap<ChunkPos, ChunkBuffers>,
    buffer_analytics: HashMap<ChunkPos, BufferAnalytics>,
}

impl ChunkBufferState {
    pub fn new(device: Device) -> Self {
        Self {
            device,
            buffers: HashMap::new(),
            buffer_analytics: HashMap::new(),
        }
    }

    fn create_buffer_init(&self, label: &str, contents: &[u8], usage: BufferUsages) -> Option<Buffer> {
        if contents.is_empty() {
            return None;
        }
        Some(self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage,
        }))
    }

    fn create_class_buffers(&self, position: ChunkPos, class: &str, mesh: &MeshBuffers) -> (Option<Buffer>, Option<Buffer>) {
        let vertices = self.create_buffer_init(
            &format!("chunk ({}, {}) {} vertices", position.x, position.z, class),
            mesh.vertex_bytes(),
            BufferUsages::VERTEX,
        );
        let indices = self.create_buffer_init(
            &format!("chunk ({}, {}) {} indices", position.x, position.z, class),
            mesh.index_bytes(),
            BufferUsages::INDEX,
        );
        (vertices, indices)
    }

    pub fn get_buffers(&self, position: ChunkPos) -> Option<&ChunkBuffers> {
        self.buffers.get(&position)
    }

    pub fn get_total_allocated_memory(&self) -> u64 {
        self.buffer_analytics
            .values()
            .fold(0, |acc, buffer_analytics| acc + buffer_analytics.allocated_memory)
    }

    pub fn get_times_written(&self, position: ChunkPos) -> u64 {
        self.buffer_analytics
            .get(&position)
            .map_or(0, |buffer_analytics| buffer_analytics.times_written)
    }
}

impl ChunkUploader for ChunkBufferState {
    fn upload(&mut self, mesh: &ChunkMeshData) {
        let (opaque_vertices, opaque_indices) = self.create_class_buffers(mesh.position, "opaque", &mesh.opaque);
        let (transparent_vertices, transparent_indices) =
            self.create_class_buffers(mesh.position, "transparent", &mesh.transparent);

        let allocated_memory: u64 = [&mesh.opaque, &mesh.transparent]
            .iter()
            .map(|buffers| (buffers.vertex_bytes().len() + buffers.index_bytes().len()) as u64)
            .sum();

        self.buffers.insert(
            mesh.position,
            ChunkBuffers {
                generation: mesh.generation,
                opaque_vertices,
                opaque_indices,
                opaque_index_count: mesh.opaque.indices.len() as u32,
                transparent_vertices,
                transparent_indices,
                transparent_index_count: mesh.transparent.indices.len() as u32,
            },
        );

        let buffer_analytics = self.buffer_analytics.entry(mesh.position).or_default();
        buffer_analytics.allocated_memory = allocated_memory;
        buffer_analytics.times_written += 1;
    }

    fn uploaded(&self, position: ChunkPos) -> Option<UploadedMesh> {
        self.buffers.get(&position).map(|buffers| UploadedMesh {
            generation: buffers.generation,
            opaque_index_count: buffers.opaque_index_count as usize,
            transparent_index_count: buffers.transparent_index_count as usize,
        })
    }
}

/// The last mesh uploaded for a chunk, kept in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadlessUpload {
    pub generation: u64,
    pub opaque: MeshBuffers,
    pub transparent: MeshBuffers,
    pub times_uploaded: usize,
}

/// In-memory uploader for running and testing the pipeline without a GPU.
#[derive(Debug, Default)]
pub struct HeadlessChunkBuffers {
    uploads: HashMap<ChunkPos, HeadlessUpload>,
    total_uploads: usize,
}

impl HeadlessChunkBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, position: ChunkPos) -> Option<&HeadlessUpload> {
        self.uploads.get(&position)
    }

    pub fn times_uploaded(&self, position: ChunkPos) -> usize {
        self.uploads.get(&position).map_or(0, |upload| upload.times_uploaded)
    }

    pub fn total_uploads(&self) -> usize {
        self.total_uploads
    }

    pub fn chunk_count(&self) -> usize {
        self.uploads.len()
    }

    /// Faces currently held across every chunk and both transparency classes.
    pub fn total_face_count(&self) -> usize {
        self.uploads
            .values()
            .map(|upload| upload.opaque.face_count() + upload.transparent.face_count())
            .sum()
    }
}

impl ChunkUploader for HeadlessChunkBuffers {
    fn upload(&mut self, mesh: &ChunkMeshData) {
        let upload = self.uploads.entry(mesh.position).or_default();
        upload.generation = mesh.generation;
        upload.opaque = mesh.opaque.clone();
        upload.transparent = mesh.transparent.clone();
        upload.times_uploaded += 1;
        self.total_uploads += 1;
    }

    fn uploaded(&self, position: ChunkPos) -> Option<UploadedMesh> {
        self.uploads.get(&position).map(|upload| UploadedMesh {
            generation: upload.generation,
            opaque_index_count: upload.opaque.indices.len(),
            transparent_index_count: upload.transparent.indices.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MtResource;
    use crate::engine_state::voxels::chunk::Chunk;

    fn mesh_at(position: ChunkPos, generation: u64, faces: usize) -> ChunkMeshData {
        use crate::engine_state::rendering::meshing::Face;
        use crate::engine_state::voxels::block::{block_side::BlockSide, block_type::BlockType};

        let mut opaque = MeshBuffers::default();
        for i in 0..faces {
            opaque.push_face(&Face::new(cgmath::Point3::new(i as i32, 0, 0), BlockType::STONE, BlockSide::TOP));
        }
        let chunk = Chunk::new(position);
        ChunkMeshData {
            remesh: chunk.remesh_counter(),
            chunk: MtResource::new(chunk),
            position,
            generation,
            opaque,
            transparent: MeshBuffers::default(),
        }
    }

    #[test]
    fn headless_uploads_replace_previous_geometry() {
        let mut buffers = HeadlessChunkBuffers::new();
        let position = ChunkPos::new(16, 0);

        buffers.upload(&mesh_at(position, 0, 3));
        buffers.upload(&mesh_at(position, 1, 1));

        let upload = buffers.get(position).unwrap();
        assert_eq!(upload.generation, 1);
        assert_eq!(upload.times_uploaded, 2);
        assert_eq!(buffers.total_face_count(), 1);
        assert_eq!(buffers.chunk_count(), 1);
        assert_eq!(buffers.total_uploads(), 2);
        assert_eq!(
            buffers.uploaded(position),
            Some(UploadedMesh {
                generation: 1,
                opaque_index_count: 6,
                transparent_index_count: 0,
            })
        );
        assert_eq!(buffers.uploaded(ChunkPos::new(0, 0)), None);
    }
}
