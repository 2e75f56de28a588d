//! # Terrain Errors
//!
//! The two failure conditions the pipeline distinguishes. Neither is allowed to
//! escape a tick: fills catch `OutOfRange` per column, ray marches hand
//! `DegenerateGeometry` back to the single query that issued them.

use std::fmt;

use cgmath::Vector3;

/// An error raised while addressing or traversing terrain blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TerrainError {
    /// A world coordinate lies outside the addressable grid: beyond the `i32`
    /// range, outside `0..CHUNK_HEIGHT` vertically, or inside a chunk that has not
    /// been allocated.
    OutOfRange { x: i64, y: i64, z: i64 },
    /// A ray march direction has no finite, non-zero component to step along.
    DegenerateGeometry { direction: Vector3<f32> },
}

impl fmt::Display for TerrainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerrainError::OutOfRange { x, y, z } => {
                write!(f, "block coordinate ({x}, {y}, {z}) is outside the addressable terrain")
            }
            TerrainError::DegenerateGeometry { direction } => write!(
                f,
                "ray direction ({}, {}, {}) has no axis to advance along",
                direction.x, direction.y, direction.z
            ),
        }
    }
}

impl std::error::Error for TerrainError {}

impl TerrainError {
    pub fn out_of_range(x: impl Into<i64>, y: impl Into<i64>, z: impl Into<i64>) -> Self {
        TerrainError::OutOfRange {
            x: x.into(),
            y: y.into(),
            z: z.into(),
        }
    }
}
