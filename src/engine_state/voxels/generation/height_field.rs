//! # Height Field Fill
//!
//! The default `ColumnFill`: a seeded 2D Perlin height map layered into bedrock,
//! stone, dirt and a surface block, flooded with water up to sea level.

use noise::{NoiseFn, Perlin};

use crate::engine_state::error::TerrainError;
use crate::engine_state::settings::TerrainSettings;
use crate::engine_state::voxels::block::block_type::BlockType;
use crate::engine_state::voxels::chunk::{Chunk, CHUNK_HEIGHT};

use super::ColumnFill;

/// Layers of dirt (or sand on beaches) between the surface block and stone.
const SOIL_DEPTH: i32 = 4;
/// Octave weight of the high-frequency detail noise.
const DETAIL_WEIGHT: f64 = 0.25;
/// Temperature below which the sea surface freezes.
const FREEZING_POINT: f64 = -0.45;

pub struct HeightFieldFill {
    noise: Perlin,
    sea_level: i32,
    base_height: f64,
    height_amplitude: f64,
    noise_scale: f64,
    snow_line: i32,
}

impl HeightFieldFill {
    pub fn new(seed: u32, sea_level: i32, base_height: f64, height_amplitude: f64, noise_scale: f64, snow_line: i32) -> Self {
        HeightFieldFill {
            noise: Perlin::new(seed),
            sea_level,
            base_height,
            height_amplitude,
            noise_scale,
            snow_line,
        }
    }

    pub fn from_settings(settings: &TerrainSettings) -> Self {
        Self::new(
            settings.seed,
            settings.sea_level,
            settings.base_height,
            settings.height_amplitude,
            settings.noise_scale,
            settings.snow_line,
        )
    }

    /// Height of the topmost terrain block of world column `(x, z)`, in
    /// `1..CHUNK_HEIGHT`.
    pub fn surface_height(&self, x: i32, z: i32) -> i32 {
        let (sx, sz) = (x as f64 * self.noise_scale, z as f64 * self.noise_scale);
        let broad = self.noise.get([sx, sz]);
        let detail = self.noise.get([sx * 4.0 + 0.5, sz * 4.0 + 0.5]);
        let height = self.base_height + self.height_amplitude * (broad + DETAIL_WEIGHT * detail);
        (height.round() as i32).clamp(1, CHUNK_HEIGHT - 1)
    }

    fn is_frozen(&self, x: i32, z: i32) -> bool {
        let scale = self.noise_scale * 0.5;
        self.noise.get([x as f64 * scale + 1000.5, z as f64 * scale - 1000.5]) < FREEZING_POINT
    }

    /// The block at height `y` of a column whose surface is at `height`.
    pub fn block_for(&self, y: i32, height: i32, frozen: bool) -> BlockType {
        let beach = height <= self.sea_level + 1;
        if y == 0 {
            BlockType::BEDROCK
        } else if y > height {
            match y {
                y if y == self.sea_level && frozen => BlockType::ICE,
                y if y <= self.sea_level => BlockType::WATER,
                _ => BlockType::EMPTY,
            }
        } else if y == height {
            if beach {
                BlockType::SAND
            } else if height >= self.snow_line {
                BlockType::SNOW
            } else {
                BlockType::GRASS
            }
        } else if y > height - SOIL_DEPTH {
            if beach {
                BlockType::SAND
            } else {
                BlockType::DIRT
            }
        } else {
            BlockType::STONE
        }
    }
}

impl ColumnFill for HeightFieldFill {
    fn fill_column(&self, chunk: &mut Chunk, local_x: i32, local_z: i32) -> Result<(), TerrainError> {
        let x = chunk.position.x + local_x;
        let z = chunk.position.z + local_z;
        let height = self.surface_height(x, z);
        let frozen = self.is_frozen(x, z);

        for y in 0..CHUNK_HEIGHT {
            chunk.set_local(local_x, y, local_z, self.block_for(y, height, frozen))?;
        }
        Ok(())
    }
}
