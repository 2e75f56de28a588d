//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world and the
//! per-kind properties the pipeline depends on: emptiness, the transparency class
//! used to split geometry, and whether the texture is animated.

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// Stored densely, one per voxel, as its `BlockTypeSize` discriminant. The
/// `FromPrimitive` derive allows conversion back from the compact integer form.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u8)]
pub enum BlockType {
    /// No block. Never meshed, never blocks a ray.
    #[default]
    EMPTY,

    /// Surface block of low terrain.
    GRASS,

    /// A few layers below grass.
    DIRT,

    /// Bulk of the terrain below the dirt layers.
    STONE,

    /// Surface block below and near sea level.
    SAND,

    /// Cap of terrain above the snow line.
    SNOW,

    /// The indestructible floor at y = 0.
    BEDROCK,

    /// Liquid; transparent and animated.
    WATER,

    /// Frozen water; transparent but static.
    ICE,

    /// Liquid found at the bottom of cave openings; opaque and animated.
    LAVA,
}

impl BlockType {
    /// Number of block kinds, used to size per-kind lookup tables.
    pub const COUNT: usize = 10;

    /// Converts a `BlockTypeSize` to a `BlockType`.
    ///
    /// Returns `None` if the value doesn't correspond to a valid `BlockType`.
    pub fn from_int(btype: BlockTypeSize) -> Option<Self> {
        num::FromPrimitive::from_u8(btype)
    }

    pub fn is_empty(self) -> bool {
        self == BlockType::EMPTY
    }

    /// Whether geometry for this block goes into the transparent buffer set.
    pub fn is_transparent(self) -> bool {
        matches!(self, BlockType::WATER | BlockType::ICE)
    }

    /// Whether the shader should scroll this block's texture over time.
    pub fn is_animated(self) -> bool {
        matches!(self, BlockType::WATER | BlockType::LAVA)
    }

    /// Whether a face of `self` touching `neighbor` is visible.
    ///
    /// A face shows when the neighbor is empty or belongs to the other
    /// transparency class. Faces between two blocks of the same class are hidden.
    pub fn shows_face_against(self, neighbor: BlockType) -> bool {
        !self.is_empty()
            && (neighbor.is_empty() || neighbor.is_transparent() != self.is_transparent())
    }

    /// Whether a moving body or ray is stopped by this block.
    pub fn is_solid(self) -> bool {
        !matches!(self, BlockType::EMPTY | BlockType::WATER | BlockType::LAVA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_discriminant_round_trips() {
        for value in 0..BlockType::COUNT as BlockTypeSize {
            let block_type = BlockType::from_int(value).unwrap();
            assert_eq!(block_type as BlockTypeSize, value);
        }
        assert_eq!(BlockType::from_int(BlockType::COUNT as BlockTypeSize), None);
    }

    #[test]
    fn faces_only_show_across_classes() {
        assert!(BlockType::STONE.shows_face_against(BlockType::EMPTY));
        assert!(BlockType::STONE.shows_face_against(BlockType::WATER));
        assert!(BlockType::WATER.shows_face_against(BlockType::STONE));
        assert!(!BlockType::WATER.shows_face_against(BlockType::ICE));
        assert!(!BlockType::STONE.shows_face_against(BlockType::DIRT));
        assert!(!BlockType::EMPTY.shows_face_against(BlockType::EMPTY));
    }
}
