//! # Procedural Fill
//!
//! This module fills a zone's 64x64 block columns and then runs the optional
//! river and cave passes over it.
//!
//! ## Contracts
//!
//! The generators themselves are pluggable:
//!
//! * `ColumnFill` writes one full 16x256 column inside a chunk the caller has
//!   locked for writing. The default is `HeightFieldFill`.
//! * `Carver` mutates blocks along a procedural path starting in a zone. Carvers go
//!   through the terrain so they may cross into adjacent chunks, taking one chunk
//!   lock at a time. Writes into chunks that have not been allocated fail with
//!   `OutOfRange` and are skipped.
//!
//! ## Failure handling
//!
//! A column that fails to fill is logged, recorded in the report and skipped. The
//! rest of the zone is still filled, and a failed fill never aborts the worker.

use std::ops::Range;

use bitvec::prelude::*;
use log::warn;

use crate::engine_state::error::TerrainError;
use crate::engine_state::settings::TerrainSettings;

use super::block::block_type::BlockType;
use super::chunk::{Chunk, CHUNK_HEIGHT, CHUNK_WIDTH};
use super::terrain::Terrain;
use super::zone::{is_addressable, ZoneKey, ZONE_WIDTH};

pub mod cave;
pub mod height_field;
pub mod river;

pub use cave::CaveCarver;
pub use height_field::HeightFieldFill;
pub use river::RiverCarver;

/// Number of block columns in a zone.
pub const ZONE_COLUMNS: usize = (ZONE_WIDTH * ZONE_WIDTH) as usize;

/// Fills one vertical column of a chunk.
pub trait ColumnFill: Send + Sync {
    /// Writes every block of the column at chunk-local `(local_x, local_z)`.
    fn fill_column(&self, chunk: &mut Chunk, local_x: i32, local_z: i32) -> Result<(), TerrainError>;
}

/// Reshapes already filled terrain along a procedural path.
pub trait Carver: Send + Sync {
    /// Carves starting somewhere in `zone`. Must terminate and must only reach the
    /// zone itself and the chunks directly around it.
    fn carve(&self, terrain: &Terrain, zone: ZoneKey, rng: &mut fastrand::Rng);
}

/// Outcome of filling one zone.
#[derive(Debug, Clone)]
pub struct FillReport {
    pub zone: ZoneKey,
    /// One bit per zone column, indexed `x + z * ZONE_WIDTH` relative to the zone
    /// origin. Set when the column could not be filled.
    pub skipped_columns: BitVec,
    pub river_carved: bool,
    pub cave_carved: bool,
}

impl FillReport {
    fn new(zone: ZoneKey) -> Self {
        FillReport {
            zone,
            skipped_columns: bitvec![0; ZONE_COLUMNS],
            river_carved: false,
            cave_carved: false,
        }
    }

    fn skip(&mut self, zone_x: i32, zone_z: i32) {
        self.skipped_columns.set((zone_x + zone_z * ZONE_WIDTH) as usize, true);
    }

    pub fn is_skipped(&self, zone_x: i32, zone_z: i32) -> bool {
        self.skipped_columns[(zone_x + zone_z * ZONE_WIDTH) as usize]
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped_columns.count_ones()
    }
}

/// The zone fill pipeline: a column fill followed by the two optional carvers.
pub struct ProceduralFill {
    column_fill: Box<dyn ColumnFill>,
    river: Box<dyn Carver>,
    cave: Box<dyn Carver>,
    river_probability: f64,
    cave_probability: f64,
    seed: u64,
}

impl ProceduralFill {
    pub fn new(
        column_fill: Box<dyn ColumnFill>,
        river: Box<dyn Carver>,
        cave: Box<dyn Carver>,
        river_probability: f64,
        cave_probability: f64,
        seed: u64,
    ) -> Self {
        ProceduralFill {
            column_fill,
            river,
            cave,
            river_probability,
            cave_probability,
            seed,
        }
    }

    /// The default height field, river and cave generators configured from settings.
    pub fn from_settings(settings: &TerrainSettings) -> Self {
        Self::new(
            Box::new(HeightFieldFill::from_settings(settings)),
            Box::new(RiverCarver::new(settings.sea_level)),
            Box::new(CaveCarver::new()),
            settings.river_probability,
            settings.cave_probability,
            settings.seed as u64,
        )
    }

    /// Fills every column of `zone`, then rolls for a river and a cave opening.
    ///
    /// Each chunk's write lock is taken once for all 256 of its columns. The carver
    /// rolls come from an RNG seeded by the zone key, so a zone generates the same
    /// way regardless of which worker picks it up.
    pub fn fill(&self, terrain: &Terrain, zone: ZoneKey) -> FillReport {
        let mut report = FillReport::new(zone);
        let (zone_x, zone_z) = zone.origin();
        if !is_addressable(zone_x as i64, zone_z as i64) {
            warn!("Zone {:?} lies outside the addressable grid, skipping it", zone.origin());
            report.skipped_columns.fill(true);
            return report;
        }

        for origin in zone.chunk_origins() {
            let (offset_x, offset_z) = (origin.x - zone_x, origin.z - zone_z);
            let Some(chunk) = terrain.chunk_at(origin) else {
                warn!("Chunk {:?} of zone {:?} is not allocated, skipping its columns", origin, zone);
                for local_z in 0..CHUNK_WIDTH {
                    for local_x in 0..CHUNK_WIDTH {
                        report.skip(offset_x + local_x, offset_z + local_z);
                    }
                }
                continue;
            };

            let mut chunk = chunk.get_mut();
            for local_z in 0..CHUNK_WIDTH {
                for local_x in 0..CHUNK_WIDTH {
                    if let Err(e) = self.column_fill.fill_column(&mut chunk, local_x, local_z) {
                        warn!("Skipping column in zone {:?}: {}", zone, e);
                        report.skip(offset_x + local_x, offset_z + local_z);
                    }
                }
            }
        }

        let mut rng = fastrand::Rng::with_seed(self.zone_seed(zone));
        if rng.f64() < self.river_probability {
            self.river.carve(terrain, zone, &mut rng);
            report.river_carved = true;
        }
        if rng.f64() < self.cave_probability {
            self.cave.carve(terrain, zone, &mut rng);
            report.cave_carved = true;
        }

        report
    }

    fn zone_seed(&self, zone: ZoneKey) -> u64 {
        self.seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ zone.raw() as u64
    }
}

/// Overwrites `span` of a chunk column with `block_for(y)`, leaving bedrock intact.
///
/// The span is clamped to the chunk height.
pub(crate) fn replace_span(
    chunk: &mut Chunk,
    local_x: i32,
    local_z: i32,
    span: Range<i32>,
    block_for: impl Fn(i32) -> BlockType,
) -> Result<(), TerrainError> {
    for y in span.start.max(0)..span.end.min(CHUNK_HEIGHT) {
        if chunk.get_local(local_x, y, local_z)? == BlockType::BEDROCK {
            continue;
        }
        chunk.set_local(local_x, y, local_z, block_for(y))?;
    }
    Ok(())
}
