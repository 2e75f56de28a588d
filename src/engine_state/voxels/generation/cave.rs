//! # Cave Carver
//!
//! Sinks a winding shaft from the terrain surface down into a small chamber whose
//! floor is a pool of lava.

use std::ops::Range;

use log::{debug, warn};

use crate::engine_state::voxels::block::block_type::BlockType;
use crate::engine_state::voxels::chunk::CHUNK_HEIGHT;
use crate::engine_state::voxels::terrain::Terrain;
use crate::engine_state::voxels::zone::{ZoneKey, ZONE_WIDTH};

use super::{replace_span, Carver};

/// Vertical blocks carved before the shaft drifts sideways.
const SEGMENT_HEIGHT: i32 = 6;
const CHAMBER_HEIGHT: i32 = 4;
/// Lowest y a chamber floor may reach; keeps the lava pool above bedrock.
const MIN_FLOOR: i32 = 2;

pub struct CaveCarver {
    shaft_radius: i32,
    chamber_radius: i32,
    depth: Range<i32>,
}

impl CaveCarver {
    pub fn new() -> Self {
        CaveCarver {
            shaft_radius: 1,
            chamber_radius: 4,
            depth: 20..50,
        }
    }

    /// Topmost non-empty block of world column `(x, z)`.
    fn surface_at(terrain: &Terrain, x: i32, z: i32) -> Option<(i32, BlockType)> {
        let chunk = terrain.chunk_containing(x, z)?;
        let chunk = chunk.get();
        let (local_x, local_z) = (x - chunk.position.x, z - chunk.position.z);
        (0..CHUNK_HEIGHT).rev().find_map(|y| {
            let block_type = chunk.get_local(local_x, y, local_z).ok()?;
            (!block_type.is_empty()).then_some((y, block_type))
        })
    }

    /// Replaces `span` in every column of a disc, returning how many columns fell
    /// outside the terrain.
    fn carve_disc(
        terrain: &Terrain,
        center: (i32, i32),
        radius: i32,
        span: Range<i32>,
        block_type: BlockType,
    ) -> usize {
        let mut skipped = 0;
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                if dx * dx + dz * dz > radius * radius {
                    continue;
                }
                let result = terrain.modify_column(center.0 + dx, center.1 + dz, |chunk, lx, lz| {
                    replace_span(chunk, lx, lz, span.clone(), |_| block_type)
                });
                if !matches!(result, Ok(Ok(()))) {
                    skipped += 1;
                }
            }
        }
        skipped
    }
}

impl Default for CaveCarver {
    fn default() -> Self {
        Self::new()
    }
}

impl Carver for CaveCarver {
    fn carve(&self, terrain: &Terrain, zone: ZoneKey, rng: &mut fastrand::Rng) {
        let (zone_x, zone_z) = zone.origin();
        let margin = self.chamber_radius;
        let mut x = zone_x + rng.i32(margin..ZONE_WIDTH - margin);
        let mut z = zone_z + rng.i32(margin..ZONE_WIDTH - margin);

        let surface = match Self::surface_at(terrain, x, z) {
            Some((_, block_type)) if !block_type.is_solid() => {
                debug!("No cave opening under liquid in zone {:?}", zone);
                return;
            }
            Some((y, _)) => y,
            None => {
                warn!("Cave in zone {:?} found no surface at ({}, {})", zone, x, z);
                return;
            }
        };
        let floor = (surface - rng.i32(self.depth.clone())).max(MIN_FLOOR);

        let mut skipped = 0;
        let mut top = surface + 1;
        while top > floor {
            let bottom = (top - SEGMENT_HEIGHT).max(floor);
            skipped += Self::carve_disc(terrain, (x, z), self.shaft_radius, bottom..top, BlockType::EMPTY);
            top = bottom;
            x = (x + rng.i32(-1..=1)).clamp(zone_x + margin, zone_x + ZONE_WIDTH - margin - 1);
            z = (z + rng.i32(-1..=1)).clamp(zone_z + margin, zone_z + ZONE_WIDTH - margin - 1);
        }

        let chamber = floor..floor + CHAMBER_HEIGHT;
        skipped += Self::carve_disc(terrain, (x, z), self.chamber_radius, chamber, BlockType::EMPTY);
        skipped += Self::carve_disc(terrain, (x, z), self.chamber_radius, floor - 1..floor, BlockType::LAVA);

        if skipped > 0 {
            warn!("Cave in zone {:?} skipped {} columns outside the terrain", zone, skipped);
        }
    }
}
