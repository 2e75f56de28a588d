//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a 16x256x16 column of blocks, the unit
//! of meshing dispatch and GPU buffer ownership.
//!
//! ## Storage
//!
//! Blocks are stored densely as one `BlockType` byte per voxel in a flat array in
//! XZY order (x fastest, then z, then y), so a vertical column is a strided walk and
//! a horizontal slab is contiguous. A chunk is 64 KiB of block data.
//!
//! ## Lifecycle
//!
//! 1. `Allocated` - created by the coordinator when its zone is first approached;
//!    every block is `EMPTY`
//! 2. `Generated` - block data written once by the zone's generation task
//!
//! After generation the block array is read-mostly. Block edits go through
//! `set_block`, and every edit that needs new geometry bumps the chunk's re-mesh
//! generation so that meshes built from older data can be recognised and dropped.
//! The generation lives in a `RemeshCounter` shared with those meshes, so the
//! coordinator reads it without taking the chunk lock.
//!
//! Chunks never hold references to their neighbors. Neighbors are looked up by
//! `ChunkPos` in the terrain's chunk map when needed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cgmath::Point3;

use crate::engine_state::error::TerrainError;

use super::block::block_type::BlockType;
use super::zone::ChunkPos;

/// Width of a chunk along x and z, in blocks.
pub const CHUNK_WIDTH: i32 = 16;
/// Height of a chunk along y, in blocks.
pub const CHUNK_HEIGHT: i32 = 256;
/// The number of blocks in one horizontal slab of a chunk.
pub const CHUNK_PLANE_SIZE: usize = (CHUNK_WIDTH * CHUNK_WIDTH) as usize;
/// The total number of blocks in a chunk.
pub const CHUNK_VOLUME: usize = CHUNK_PLANE_SIZE * CHUNK_HEIGHT as usize;

/// Where a chunk is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkState {
    /// Allocated by the coordinator, block data not yet written.
    Allocated,
    /// Block data written by a generation task; eligible for meshing.
    Generated,
}

/// A chunk's re-mesh generation, readable from any thread without the chunk lock.
///
/// Only advanced through `Chunk::request_remesh`, under the chunk's write lock.
#[derive(Debug, Clone, Default)]
pub struct RemeshCounter(Arc<AtomicU64>);

impl RemeshCounter {
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// A 16x256x16 column of voxel blocks.
pub struct Chunk {
    /// The world-space origin of this chunk column.
    pub position: ChunkPos,

    /// One entry per voxel, indexed by `Chunk::index`.
    blocks: Box<[BlockType]>,

    state: ChunkState,

    /// Incremented every time a re-mesh of this chunk is requested after an edit.
    remesh: RemeshCounter,
}

impl Chunk {
    /// Creates a new, completely empty chunk in the `Allocated` state.
    pub fn new(position: ChunkPos) -> Self {
        Chunk {
            position,
            blocks: vec![BlockType::EMPTY; CHUNK_VOLUME].into_boxed_slice(),
            state: ChunkState::Allocated,
            remesh: RemeshCounter::default(),
        }
    }

    #[inline]
    fn index(x: usize, y: usize, z: usize) -> usize {
        x + z * CHUNK_WIDTH as usize + y * CHUNK_PLANE_SIZE
    }

    #[inline]
    fn in_bounds(x: i32, y: i32, z: i32) -> bool {
        (0..CHUNK_WIDTH).contains(&x) && (0..CHUNK_HEIGHT).contains(&y) && (0..CHUNK_WIDTH).contains(&z)
    }

    fn out_of_range(&self, x: i32, y: i32, z: i32) -> TerrainError {
        TerrainError::out_of_range(
            self.position.x as i64 + x as i64,
            y,
            self.position.z as i64 + z as i64,
        )
    }

    /// Gets the block at chunk-relative coordinates.
    ///
    /// # Panics
    /// Panics if the coordinates are out of bounds.
    #[inline]
    pub fn block_at_local(&self, x: usize, y: usize, z: usize) -> BlockType {
        self.blocks[Self::index(x, y, z)]
    }

    /// Gets the block at chunk-relative coordinates, failing with `OutOfRange`
    /// outside the chunk.
    pub fn get_local(&self, x: i32, y: i32, z: i32) -> Result<BlockType, TerrainError> {
        if !Self::in_bounds(x, y, z) {
            return Err(self.out_of_range(x, y, z));
        }
        Ok(self.block_at_local(x as usize, y as usize, z as usize))
    }

    /// Sets the block at chunk-relative coordinates, failing with `OutOfRange`
    /// outside the chunk.
    pub fn set_local(&mut self, x: i32, y: i32, z: i32, block_type: BlockType) -> Result<(), TerrainError> {
        if !Self::in_bounds(x, y, z) {
            return Err(self.out_of_range(x, y, z));
        }
        self.blocks[Self::index(x as usize, y as usize, z as usize)] = block_type;
        Ok(())
    }

    /// Converts a world position into this chunk's local coordinates.
    pub fn to_local(&self, position: Point3<i32>) -> Result<(i32, i32, i32), TerrainError> {
        let x = position.x as i64 - self.position.x as i64;
        let z = position.z as i64 - self.position.z as i64;
        let in_chunk = (0..CHUNK_WIDTH as i64).contains(&x)
            && (0..CHUNK_WIDTH as i64).contains(&z)
            && (0..CHUNK_HEIGHT).contains(&position.y);
        if !in_chunk {
            return Err(TerrainError::out_of_range(position.x, position.y, position.z));
        }
        Ok((x as i32, position.y, z as i32))
    }

    /// Gets the block at a world position inside this chunk.
    pub fn block_at(&self, position: Point3<i32>) -> Result<BlockType, TerrainError> {
        let (x, y, z) = self.to_local(position)?;
        self.get_local(x, y, z)
    }

    /// Sets the block at a world position inside this chunk.
    pub fn set_block(&mut self, position: Point3<i32>, block_type: BlockType) -> Result<(), TerrainError> {
        let (x, y, z) = self.to_local(position)?;
        self.set_local(x, y, z, block_type)
    }

    /// Copies a full vertical column of blocks into `out` (bottom to top).
    pub fn copy_column(&self, x: usize, z: usize, out: &mut [BlockType]) {
        for (y, slot) in out.iter_mut().enumerate().take(CHUNK_HEIGHT as usize) {
            *slot = self.block_at_local(x, y, z);
        }
    }

    /// Whether every block in the chunk is `EMPTY`.
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|block| block.is_empty())
    }

    /// Number of non-empty blocks.
    pub fn solid_count(&self) -> usize {
        self.blocks.iter().filter(|block| !block.is_empty()).count()
    }

    pub fn state(&self) -> ChunkState {
        self.state
    }

    pub fn is_generated(&self) -> bool {
        self.state == ChunkState::Generated
    }

    /// Marks block data as complete. Called once by the owning generation task.
    pub fn mark_generated(&mut self) {
        self.state = ChunkState::Generated;
    }

    /// Records that geometry built before this call is stale and returns the new
    /// generation. The caller must follow up by queueing the chunk for meshing.
    pub fn request_remesh(&mut self) -> u64 {
        self.remesh.advance()
    }

    pub fn remesh_generation(&self) -> u64 {
        self.remesh.current()
    }

    /// A handle that keeps observing this chunk's re-mesh generation.
    pub fn remesh_counter(&self) -> RemeshCounter {
        self.remesh.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_chunk_is_empty_and_allocated() {
        let chunk = Chunk::new(ChunkPos::new(32, -16));
        assert!(chunk.is_empty());
        assert_eq!(chunk.state(), ChunkState::Allocated);
    }

    #[test]
    fn world_and_local_addressing_agree() {
        let mut chunk = Chunk::new(ChunkPos::new(-16, 32));
        chunk.set_block(Point3::new(-1, 200, 47), BlockType::STONE).unwrap();

        assert_eq!(chunk.get_local(15, 200, 15).unwrap(), BlockType::STONE);
        assert_eq!(chunk.block_at_local(15, 200, 15), BlockType::STONE);
        assert_eq!(chunk.solid_count(), 1);
    }

    #[test]
    fn out_of_chunk_access_reports_world_coordinates() {
        let mut chunk = Chunk::new(ChunkPos::new(16, 0));
        assert_eq!(
            chunk.set_local(0, CHUNK_HEIGHT, 0, BlockType::DIRT),
            Err(TerrainError::OutOfRange { x: 16, y: 256, z: 0 })
        );
        assert!(chunk.block_at(Point3::new(15, 0, 0)).is_err());
        assert!(chunk.block_at(Point3::new(16, -1, 0)).is_err());
    }

    #[test]
    fn remesh_requests_advance_the_generation() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        assert_eq!(chunk.remesh_generation(), 0);
        assert_eq!(chunk.request_remesh(), 1);
        assert_eq!(chunk.request_remesh(), 2);
    }

    #[test]
    fn remesh_counter_tracks_later_requests() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        let counter = chunk.remesh_counter();
        chunk.request_remesh();
        assert_eq!(counter.current(), 1);
        assert_eq!(chunk.remesh_generation(), 1);
    }
}
