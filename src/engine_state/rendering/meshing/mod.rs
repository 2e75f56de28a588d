//! Mesh generation for terrain chunks.
//!
//! This module turns a chunk's block data into interleaved vertex and index buffers.
//! Every non-empty voxel is tested against its six face neighbors, and one quad is
//! emitted for each face that can be seen:
//! - the neighbor is `EMPTY`, or
//! - the neighbor belongs to the other transparency class (water against stone)
//!
//! Geometry is split by the voxel's own class into an opaque and a transparent
//! buffer set, so the render layer can draw transparent geometry in a second pass.
//!
//! # Architecture
//! - `ChunkNeighborhood`: Lock-free snapshot of a chunk and its border slabs
//! - `Face`: One unit quad with its corners and vertex attributes
//! - `MeshBuffers`: Vertex and index buffers of one transparency class
//! - `ChunkMeshData`: Everything the upload step needs for one chunk
//!
//! # Determinism
//! Voxels are visited in y, z, x order and faces in `BlockSide::all()` order, so
//! meshing unchanged block data always yields identical buffers.

use cgmath::Point3;

use crate::core::MtResource;
use crate::engine_state::voxels::block::block_side::BlockSide;
use crate::engine_state::buffer_state::UploadedMesh;
use crate::engine_state::voxels::chunk::{Chunk, RemeshCounter, CHUNK_HEIGHT, CHUNK_WIDTH};
use crate::engine_state::voxels::terrain::Terrain;
use crate::engine_state::voxels::zone::ChunkPos;

use super::vertex::Vertex;

mod face;
mod neighborhood;

pub use face::Face;
pub use neighborhood::ChunkNeighborhood;

/// Vertex and index data of one transparency class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    /// Appends a quad: four vertices and six indices into this buffer set.
    pub fn push_face(&mut self, face: &Face) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&face.vertices());
        self.indices.extend(Face::INDICES.iter().map(|index| base + index));
    }

    pub fn face_count(&self) -> usize {
        self.vertices.len() / 4
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Meshing output for one chunk, consumed once by the upload step.
pub struct ChunkMeshData {
    /// Handle to the chunk the mesh was built from.
    pub chunk: MtResource<Chunk>,
    pub position: ChunkPos,
    /// Re-mesh generation of the block data the mesh was built from.
    pub generation: u64,
    /// The chunk's live re-mesh generation.
    pub remesh: RemeshCounter,
    pub opaque: MeshBuffers,
    pub transparent: MeshBuffers,
}

impl ChunkMeshData {
    /// Snapshots `chunk` and its neighbors out of `terrain` and meshes the snapshot.
    pub fn build(terrain: &Terrain, chunk: MtResource<Chunk>) -> Self {
        let neighborhood = ChunkNeighborhood::capture(terrain, &chunk);
        let (opaque, transparent) = mesh_neighborhood(&neighborhood);
        ChunkMeshData {
            chunk,
            position: neighborhood.position,
            generation: neighborhood.generation,
            remesh: neighborhood.remesh,
            opaque,
            transparent,
        }
    }

    pub fn face_count(&self) -> usize {
        self.opaque.face_count() + self.transparent.face_count()
    }

    /// Whether the chunk was edited after the block data of this mesh was captured.
    /// Never takes the chunk lock.
    pub fn is_stale(&self) -> bool {
        self.generation < self.remesh.current()
    }

    /// The bookkeeping an uploader keeps for this mesh.
    pub fn uploaded(&self) -> UploadedMesh {
        UploadedMesh {
            generation: self.generation,
            opaque_index_count: self.opaque.indices.len(),
            transparent_index_count: self.transparent.indices.len(),
        }
    }
}

/// Builds the opaque and transparent buffers for a captured chunk.
pub fn mesh_neighborhood(neighborhood: &ChunkNeighborhood) -> (MeshBuffers, MeshBuffers) {
    let mut opaque = MeshBuffers::default();
    let mut transparent = MeshBuffers::default();
    let origin = neighborhood.position;

    for y in 0..CHUNK_HEIGHT {
        for z in 0..CHUNK_WIDTH {
            for x in 0..CHUNK_WIDTH {
                let block_type = neighborhood.get(x, y, z);
                if block_type.is_empty() {
                    continue;
                }
                let world = Point3::new(origin.x + x, y, origin.z + z);
                for side in BlockSide::all() {
                    let offset = side.offset();
                    let neighbor = neighborhood.get(x + offset.x, y + offset.y, z + offset.z);
                    if !block_type.shows_face_against(neighbor) {
                        continue;
                    }
                    let target = if block_type.is_transparent() {
                        &mut transparent
                    } else {
                        &mut opaque
                    };
                    target.push_face(&Face::new(world, block_type, side));
                }
            }
        }
    }

    (opaque, transparent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;
    use crate::engine_state::voxels::zone::ZoneKey;

    #[test]
    fn single_block_has_six_faces() {
        let terrain = Terrain::new();
        terrain.allocate_zone(ZoneKey::from_origin(0, 0));
        terrain.set_block_at(Point3::new(3, 40, 3), BlockType::STONE).unwrap();

        let mesh = ChunkMeshData::build(&terrain, terrain.chunk_at(ChunkPos::new(0, 0)).unwrap());

        assert_eq!(mesh.opaque.face_count(), 6);
        assert_eq!(mesh.opaque.indices.len(), 36);
        assert!(mesh.transparent.is_empty());
        assert_eq!(&mesh.opaque.indices[6..12], &[4, 5, 6, 4, 6, 7]);
        assert_eq!(mesh.uploaded().opaque_index_count, 36);
    }

    #[test]
    fn water_against_stone_shows_both_faces() {
        let terrain = Terrain::new();
        terrain.allocate_zone(ZoneKey::from_origin(0, 0));
        terrain.set_block_at(Point3::new(3, 40, 3), BlockType::STONE).unwrap();
        terrain.set_block_at(Point3::new(4, 40, 3), BlockType::WATER).unwrap();
        terrain.set_block_at(Point3::new(5, 40, 3), BlockType::ICE).unwrap();

        let mesh = ChunkMeshData::build(&terrain, terrain.chunk_at(ChunkPos::new(0, 0)).unwrap());

        // The shared stone/water face is drawn from both sides, water/ice is hidden.
        assert_eq!(mesh.opaque.face_count(), 6);
        assert_eq!(mesh.transparent.face_count(), 5 + 5);
    }

    #[test]
    fn edits_after_capture_make_the_mesh_stale() {
        let terrain = Terrain::new();
        terrain.allocate_zone(ZoneKey::from_origin(0, 0));
        let chunk = terrain.chunk_at(ChunkPos::new(0, 0)).unwrap();

        let mesh = ChunkMeshData::build(&terrain, chunk.clone());
        assert!(!mesh.is_stale());
        chunk.get_mut().request_remesh();
        assert!(mesh.is_stale());
        assert!(!ChunkMeshData::build(&terrain, chunk).is_stale());
    }

    #[test]
    fn byte_views_cover_whole_buffers() {
        let mut buffers = MeshBuffers::default();
        buffers.push_face(&Face::new(Point3::new(0, 0, 0), BlockType::DIRT, BlockSide::TOP));
        assert_eq!(buffers.vertex_bytes().len(), 4 * 44);
        assert_eq!(buffers.index_bytes().len(), 6 * 4);
    }
}
