use crate::core::MtResource;
use crate::engine_state::voxels::block::{block_side::BlockSide, block_type::BlockType};
use crate::engine_state::voxels::chunk::{Chunk, RemeshCounter, CHUNK_HEIGHT, CHUNK_WIDTH};
use crate::engine_state::voxels::terrain::Terrain;
use crate::engine_state::voxels::zone::ChunkPos;

/// Width of the padded grid: the chunk plus a one-block border on each side.
const PADDED_WIDTH: i32 = CHUNK_WIDTH + 2;
const PADDED_PLANE: usize = (PADDED_WIDTH * PADDED_WIDTH) as usize;

/// A private copy of a chunk's blocks plus the one-block border slabs of its four
/// lateral neighbors, taken so meshing never holds more than one lock at a time.
///
/// Border cells of missing neighbors, and everything above or below the chunk, read
/// as `EMPTY`.
pub struct ChunkNeighborhood {
    pub position: ChunkPos,
    /// The chunk's re-mesh generation at the time the snapshot was taken.
    pub generation: u64,
    pub remesh: RemeshCounter,
    blocks: Vec<BlockType>,
}

impl ChunkNeighborhood {
    pub fn capture(terrain: &Terrain, chunk: &MtResource<Chunk>) -> Self {
        let mut blocks = vec![BlockType::EMPTY; PADDED_PLANE * CHUNK_HEIGHT as usize];

        let (position, generation, remesh) = {
            let chunk = chunk.get();
            for y in 0..CHUNK_HEIGHT {
                for z in 0..CHUNK_WIDTH {
                    for x in 0..CHUNK_WIDTH {
                        blocks[Self::index(x, y, z)] = chunk.block_at_local(x as usize, y as usize, z as usize);
                    }
                }
            }
            (chunk.position, chunk.remesh_generation(), chunk.remesh_counter())
        };

        for side in [BlockSide::LEFT, BlockSide::RIGHT, BlockSide::BACK, BlockSide::FRONT] {
            let Some(neighbor) = position.neighbor(side).and_then(|p| terrain.chunk_at(p)) else {
                continue;
            };
            let neighbor = neighbor.get();
            let last = CHUNK_WIDTH - 1;
            for y in 0..CHUNK_HEIGHT {
                for i in 0..CHUNK_WIDTH {
                    // (source x, source z) in the neighbor, (target x, target z) in our frame.
                    let ((sx, sz), (tx, tz)) = match side {
                        BlockSide::LEFT => ((last, i), (-1, i)),
                        BlockSide::RIGHT => ((0, i), (CHUNK_WIDTH, i)),
                        BlockSide::BACK => ((i, last), (i, -1)),
                        _ => ((i, 0), (i, CHUNK_WIDTH)),
                    };
                    blocks[Self::index(tx, y, tz)] = neighbor.block_at_local(sx as usize, y as usize, sz as usize);
                }
            }
        }

        ChunkNeighborhood {
            position,
            generation,
            remesh,
            blocks,
        }
    }

    /// Index of chunk-local `(x, y, z)`, where x and z may be -1 or `CHUNK_WIDTH`.
    #[inline]
    fn index(x: i32, y: i32, z: i32) -> usize {
        (x + 1) as usize + (z + 1) as usize * PADDED_WIDTH as usize + y as usize * PADDED_PLANE
    }

    /// The block at chunk-local coordinates. `x` and `z` must lie in
    /// `-1..=CHUNK_WIDTH`; any `y` is accepted.
    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> BlockType {
        if !(0..CHUNK_HEIGHT).contains(&y) {
            return BlockType::EMPTY;
        }
        self.blocks[Self::index(x, y, z)]
    }
}
