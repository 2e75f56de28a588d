//! # Terrain Module
//!
//! This module provides the `Terrain` struct, the process-wide owner of every chunk
//! and of the shared structures the pipeline stages hand work through.
//!
//! ## Architecture
//!
//! The terrain is sparse: only chunks of zones that have been approached exist.
//! Chunks are never removed during a session.
//!
//! Cross-thread state is limited to:
//! - the chunk map, behind an `MtResource` (lookups take a brief read lock and clone
//!   the chunk handle out; only the coordinator inserts)
//! - one `MtResource` per chunk guarding its block data
//! - the set of created zones, behind its own mutex
//! - two mailboxes: chunks waiting for meshing and mesh data waiting for upload
//!
//! No method holds the map lock while acquiring a chunk lock, and no method holds two
//! chunk locks at once.
//!
//! ## Performance Considerations
//!
//! - Zone and chunk existence checks are O(1) average using hash containers
//! - Block lookups clone an `Arc` and take one read lock; batch work should grab the
//!   chunk handle once and work on the guard

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use cgmath::Point3;

use crate::core::{Mailbox, MtResource};
use crate::engine_state::error::TerrainError;
use crate::engine_state::rendering::meshing::ChunkMeshData;

use super::block::block_side::BlockSide;
use super::block::block_type::BlockType;
use super::chunk::{Chunk, CHUNK_HEIGHT, CHUNK_WIDTH};
use super::zone::{is_addressable, ChunkPos, ZoneKey};

/// The voxel world: all chunks plus the pipeline mailboxes.
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_terrain::engine_state::voxels::{terrain::Terrain, zone::ZoneKey};
///
/// let terrain = Terrain::new();
/// let zone = ZoneKey::containing(10, -10).unwrap();
///
/// assert!(terrain.mark_zone_created(zone));
/// let chunks = terrain.allocate_zone(zone);
/// assert_eq!(chunks.len(), 16);
/// assert!(terrain.block_at(Point3::new(10, 5, -10)).unwrap().is_empty());
/// ```
pub struct Terrain {
    chunks: MtResource<HashMap<ChunkPos, MtResource<Chunk>>>,
    created_zones: Mutex<HashSet<ZoneKey>>,
    chunks_with_block_data: Mailbox<MtResource<Chunk>>,
    chunks_with_mesh_data: Mailbox<ChunkMeshData>,
}

impl Terrain {
    pub fn new() -> Self {
        Terrain {
            chunks: MtResource::new(HashMap::new()),
            created_zones: Mutex::new(HashSet::new()),
            chunks_with_block_data: Mailbox::new(),
            chunks_with_mesh_data: Mailbox::new(),
        }
    }

    /// Marks a zone as created. Returns `false` if it already was, in which case the
    /// caller must not dispatch generation for it.
    pub fn mark_zone_created(&self, zone: ZoneKey) -> bool {
        self.created_zones.lock().unwrap().insert(zone)
    }

    pub fn is_zone_created(&self, zone: ZoneKey) -> bool {
        self.created_zones.lock().unwrap().contains(&zone)
    }

    pub fn zone_count(&self) -> usize {
        self.created_zones.lock().unwrap().len()
    }

    /// Allocates an empty chunk at `position`, or returns the existing one.
    pub fn create_chunk_at(&self, position: ChunkPos) -> MtResource<Chunk> {
        self.chunks
            .get_mut()
            .entry(position)
            .or_insert_with(|| MtResource::new(Chunk::new(position)))
            .clone()
    }

    /// Allocates the 16 chunks of `zone`. Allocation only, no block data is written.
    pub fn allocate_zone(&self, zone: ZoneKey) -> Vec<MtResource<Chunk>> {
        zone.chunk_origins()
            .into_iter()
            .map(|origin| self.create_chunk_at(origin))
            .collect()
    }

    pub fn chunk_at(&self, position: ChunkPos) -> Option<MtResource<Chunk>> {
        self.chunks.get().get(&position).cloned()
    }

    /// The chunk containing world block column `(x, z)`, if allocated and inside the
    /// addressable grid.
    pub fn chunk_containing(&self, x: i32, z: i32) -> Option<MtResource<Chunk>> {
        if !is_addressable(x as i64, z as i64) {
            return None;
        }
        self.chunk_at(ChunkPos::containing(x, z))
    }

    pub fn has_chunk_at(&self, x: i32, z: i32) -> bool {
        self.chunks.get().contains_key(&ChunkPos::containing(x, z))
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.get().len()
    }

    /// Looks up a block by world position.
    ///
    /// Fails with `OutOfRange` outside `0..CHUNK_HEIGHT`, outside the addressable grid
    /// or inside an unallocated chunk. Callers decide how to treat a miss; see
    /// `ray::grid_march`.
    pub fn block_at(&self, position: Point3<i32>) -> Result<BlockType, TerrainError> {
        if !(0..CHUNK_HEIGHT).contains(&position.y) {
            return Err(TerrainError::out_of_range(position.x, position.y, position.z));
        }
        let chunk = self
            .chunk_containing(position.x, position.z)
            .ok_or_else(|| TerrainError::out_of_range(position.x, position.y, position.z))?;
        let block_type = chunk.get().block_at(position)?;
        Ok(block_type)
    }

    /// Writes a block by world position without requesting a re-mesh.
    ///
    /// Used by generation passes; gameplay edits go through `edit_block`.
    pub fn set_block_at(&self, position: Point3<i32>, block_type: BlockType) -> Result<(), TerrainError> {
        self.modify_column(position.x, position.z, |chunk, _, _| {
            chunk.set_block(position, block_type)
        })?
    }

    /// Runs `modify` with exclusive access to the chunk containing world column
    /// `(x, z)`. The closure also receives the column's chunk-local x and z.
    pub fn modify_column<R>(
        &self,
        x: i32,
        z: i32,
        modify: impl FnOnce(&mut Chunk, i32, i32) -> R,
    ) -> Result<R, TerrainError> {
        let chunk = self
            .chunk_containing(x, z)
            .ok_or_else(|| TerrainError::out_of_range(x, 0, z))?;
        let mut chunk = chunk.get_mut();
        let local_x = x - chunk.position.x;
        let local_z = z - chunk.position.z;
        Ok(modify(&mut chunk, local_x, local_z))
    }

    /// Applies a gameplay block edit and queues re-meshing.
    ///
    /// The containing chunk is queued, and so is the lateral neighbor whose boundary
    /// faces touch the edited block when it lies on a chunk edge. Chunks still waiting
    /// for generation are edited but not queued; their generation task queues them.
    ///
    /// Returns the positions of the chunks queued for meshing.
    pub fn edit_block(&self, position: Point3<i32>, block_type: BlockType) -> Result<Vec<ChunkPos>, TerrainError> {
        let (local_x, local_z) = self.modify_column(position.x, position.z, |chunk, lx, lz| {
            chunk.set_block(position, block_type).map(|_| (lx, lz))
        })??;

        let home = ChunkPos::containing(position.x, position.z);
        let mut affected = vec![home];
        let edge_sides = [
            (local_x == 0, BlockSide::LEFT),
            (local_x == CHUNK_WIDTH - 1, BlockSide::RIGHT),
            (local_z == 0, BlockSide::BACK),
            (local_z == CHUNK_WIDTH - 1, BlockSide::FRONT),
        ];
        for (on_edge, side) in edge_sides {
            if let (true, Some(neighbor)) = (on_edge, home.neighbor(side)) {
                affected.push(neighbor);
            }
        }

        let mut queued = Vec::new();
        for position in affected {
            let Some(chunk) = self.chunk_at(position) else {
                continue;
            };
            {
                let mut guard = chunk.get_mut();
                if !guard.is_generated() {
                    continue;
                }
                guard.request_remesh();
            }
            self.chunks_with_block_data.push(chunk);
            queued.push(position);
        }
        Ok(queued)
    }

    /// Chunks whose block data is ready and which are waiting for a meshing task.
    pub fn chunks_with_block_data(&self) -> &Mailbox<MtResource<Chunk>> {
        &self.chunks_with_block_data
    }

    /// Mesh data waiting for the coordinator to upload it.
    pub fn chunks_with_mesh_data(&self) -> &Mailbox<ChunkMeshData> {
        &self.chunks_with_mesh_data
    }
}

impl Default for Terrain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated_zone(terrain: &Terrain, zone: ZoneKey) {
        terrain.mark_zone_created(zone);
        for chunk in terrain.allocate_zone(zone) {
            chunk.get_mut().mark_generated();
        }
    }

    #[test]
    fn zones_are_created_once() {
        let terrain = Terrain::new();
        let zone = ZoneKey::from_origin(64, 0);
        assert!(terrain.mark_zone_created(zone));
        assert!(!terrain.mark_zone_created(zone));
        assert!(terrain.is_zone_created(zone));
        assert_eq!(terrain.zone_count(), 1);
    }

    #[test]
    fn allocation_is_idempotent() {
        let terrain = Terrain::new();
        let zone = ZoneKey::from_origin(0, 0);
        let first = terrain.allocate_zone(zone);
        let second = terrain.allocate_zone(zone);
        assert_eq!(terrain.chunk_count(), 16);
        assert!(first.iter().zip(second.iter()).all(|(a, b)| a.ptr_eq(b)));
    }

    #[test]
    fn missing_chunks_and_heights_are_out_of_range() {
        let terrain = Terrain::new();
        terrain.allocate_zone(ZoneKey::from_origin(0, 0));

        assert!(terrain.block_at(Point3::new(0, 0, 0)).is_ok());
        assert!(terrain.block_at(Point3::new(64, 0, 0)).is_err());
        assert!(terrain.block_at(Point3::new(0, 256, 0)).is_err());
        assert!(terrain.set_block_at(Point3::new(-1, 0, 0), BlockType::DIRT).is_err());
        assert!(terrain.has_chunk_at(63, 63));
        assert!(!terrain.has_chunk_at(-1, 0));
    }

    #[test]
    fn interior_edit_queues_only_its_chunk() {
        let terrain = Terrain::new();
        generated_zone(&terrain, ZoneKey::from_origin(0, 0));

        let queued = terrain.edit_block(Point3::new(5, 10, 5), BlockType::STONE).unwrap();

        assert_eq!(queued, vec![ChunkPos::new(0, 0)]);
        assert_eq!(terrain.chunks_with_block_data().len(), 1);
        assert_eq!(terrain.block_at(Point3::new(5, 10, 5)).unwrap(), BlockType::STONE);
    }

    #[test]
    fn edge_edit_also_queues_the_neighbor() {
        let terrain = Terrain::new();
        generated_zone(&terrain, ZoneKey::from_origin(0, 0));

        let queued = terrain.edit_block(Point3::new(15, 10, 0), BlockType::STONE).unwrap();

        // (0, -16) lies in an ungenerated zone and is skipped.
        assert_eq!(queued, vec![ChunkPos::new(0, 0), ChunkPos::new(16, 0)]);
        let remeshed = terrain.chunk_at(ChunkPos::new(16, 0)).unwrap();
        assert_eq!(remeshed.get().remesh_generation(), 1);
    }

    #[test]
    fn edits_to_ungenerated_chunks_are_not_queued() {
        let terrain = Terrain::new();
        terrain.allocate_zone(ZoneKey::from_origin(0, 0));

        let queued = terrain.edit_block(Point3::new(5, 10, 5), BlockType::STONE).unwrap();
        assert!(queued.is_empty());
        assert!(terrain.chunks_with_block_data().is_empty());
    }
}
