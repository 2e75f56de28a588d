//! # River Carver
//!
//! Walks a meandering channel west to east across a zone. Every step cuts a disc
//! of columns: water from the channel bed up to sea level, air above it.

use log::warn;

use crate::engine_state::voxels::block::block_type::BlockType;
use crate::engine_state::voxels::chunk::CHUNK_HEIGHT;
use crate::engine_state::voxels::terrain::Terrain;
use crate::engine_state::voxels::zone::{ZoneKey, ZONE_WIDTH};

use super::{replace_span, Carver};

/// Largest heading away from due east, in radians. Keeps the walk moving east so
/// it always leaves the zone.
const MAX_HEADING: f32 = 1.0;
const MAX_TURN: f32 = 0.3;
/// How far the channel may wander past the zone's north and south edges.
const LATERAL_SLACK: f32 = 8.0;
const MAX_STEPS: usize = 4 * ZONE_WIDTH as usize;

pub struct RiverCarver {
    sea_level: i32,
    half_width: i32,
}

impl RiverCarver {
    pub fn new(sea_level: i32) -> Self {
        RiverCarver { sea_level, half_width: 3 }
    }

    /// The world column path followed by the channel centre.
    ///
    /// The walk runs in zone-local coordinates, so its shape does not depend on how
    /// far the zone is from the origin.
    pub fn path(&self, zone: ZoneKey, rng: &mut fastrand::Rng) -> Vec<(i32, i32)> {
        let (zone_x, zone_z) = zone.origin();
        let min_z = -LATERAL_SLACK;
        let max_z = ZONE_WIDTH as f32 + LATERAL_SLACK;

        let mut x = 0.0f32;
        let mut z = rng.i32(8..ZONE_WIDTH - 8) as f32;
        let mut heading = (rng.f32() - 0.5) * MAX_HEADING;
        let mut path = Vec::new();

        while x < ZONE_WIDTH as f32 && path.len() < MAX_STEPS {
            path.push((zone_x + x.floor() as i32, zone_z + z.floor() as i32));
            heading = (heading + (rng.f32() - 0.5) * 2.0 * MAX_TURN).clamp(-MAX_HEADING, MAX_HEADING);
            x += heading.cos();
            z = (z + heading.sin()).clamp(min_z, max_z);
        }
        path
    }
}

impl Carver for RiverCarver {
    fn carve(&self, terrain: &Terrain, zone: ZoneKey, rng: &mut fastrand::Rng) {
        let sea_level = self.sea_level;
        let radius = self.half_width;
        let mut skipped = 0;

        for (center_x, center_z) in self.path(zone, rng) {
            for dx in -radius..=radius {
                for dz in -radius..=radius {
                    let distance_sq = dx * dx + dz * dz;
                    if distance_sq > radius * radius {
                        continue;
                    }
                    // Deepest in the middle of the channel.
                    let bed = sea_level - 2 - (radius - (distance_sq as f32).sqrt() as i32);
                    let result = terrain.modify_column(center_x + dx, center_z + dz, |chunk, lx, lz| {
                        replace_span(chunk, lx, lz, bed..CHUNK_HEIGHT, |y| {
                            if y <= sea_level {
                                BlockType::WATER
                            } else {
                                BlockType::EMPTY
                            }
                        })
                    });
                    if !matches!(result, Ok(Ok(()))) {
                        skipped += 1;
                    }
                }
            }
        }

        if skipped > 0 {
            warn!("River in zone {:?} skipped {} columns outside the terrain", zone, skipped);
        }
    }
}
