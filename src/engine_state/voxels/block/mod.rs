//! # Block Module
//!
//! This module provides the core block-related functionality for the terrain.
//! It includes block type definitions, block face handling, and the texture atlas
//! lookup used when emitting face UVs.

use block_side::BlockSide;
use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// Number of cells along each edge of the square texture atlas.
pub const ATLAS_CELLS_PER_EDGE: f32 = 16.0;

/// Maps each block type to its texture atlas cell `(column, row)` for each face.
///
/// The outer array is indexed by `BlockType` as a `usize`.
/// The inner array is indexed by `BlockSide` as a `usize`:
/// [Front, Back, Bottom, Top, Left, Right]
pub static BLOCK_TYPE_TO_ATLAS_CELLS: [[(u8, u8); 6]; BlockType::COUNT] = [
    [(0, 0); 6],                                            // EMPTY (never meshed)
    [(3, 15), (3, 15), (2, 15), (8, 13), (3, 15), (3, 15)], // GRASS (top: 8,13, bottom: dirt)
    [(2, 15); 6],                                           // DIRT
    [(1, 15); 6],                                           // STONE
    [(2, 14); 6],                                           // SAND
    [(2, 11); 6],                                           // SNOW
    [(1, 14); 6],                                           // BEDROCK
    [(13, 3); 6],                                           // WATER
    [(3, 11); 6],                                           // ICE
    [(13, 1); 6],                                           // LAVA
];

/// Returns the atlas cell for one face of a block type.
pub fn atlas_cell(block_type: BlockType, side: BlockSide) -> (u8, u8) {
    BLOCK_TYPE_TO_ATLAS_CELLS[block_type as usize][side as usize]
}
