//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask` which fills the block data of one
//! newly discovered zone on a worker thread. The coordinator dispatches exactly one
//! of these per zone; the finished chunks reach the meshing stage through the
//! terrain's block-data mailbox.

use std::sync::Arc;

use log::{debug, warn};

use crate::{
    core::MtResource,
    engine_state::{
        task_management::task::Task,
        voxels::{chunk::Chunk, generation::ProceduralFill, terrain::Terrain, zone::ZoneKey},
    },
};

/// A task that generates the block data of a zone.
///
/// This task is responsible for:
/// 1. Filling every column of the zone and running the carvers
/// 2. Marking the zone's chunks as generated
/// 3. Handing all of them to the meshing stage in a single mailbox append
pub struct ChunkGenerationTask {
    terrain: Arc<Terrain>,
    fill: Arc<ProceduralFill>,
    zone: ZoneKey,
    /// The zone's chunks, allocated by the coordinator before dispatch.
    chunks: Vec<MtResource<Chunk>>,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// # Arguments
    /// * `terrain` - The terrain owning the zone's chunks
    /// * `fill` - The generators to fill the zone with
    /// * `zone` - The zone to generate, which this task owns exclusively
    /// * `chunks` - The zone's allocated chunks
    pub fn new(
        terrain: Arc<Terrain>,
        fill: Arc<ProceduralFill>,
        zone: ZoneKey,
        chunks: Vec<MtResource<Chunk>>,
    ) -> Self {
        ChunkGenerationTask {
            terrain,
            fill,
            zone,
            chunks,
        }
    }
}

impl Task for ChunkGenerationTask {
    fn name(&self) -> &'static str {
        "chunk_generation"
    }

    fn process(&self) {
        let report = self.fill.fill(&self.terrain, self.zone);
        if report.skipped_count() > 0 {
            warn!("Zone {:?} generated with {} skipped columns", self.zone, report.skipped_count());
        }
        debug!(
            "Zone {:?} generated (river: {}, cave: {})",
            self.zone, report.river_carved, report.cave_carved
        );

        for chunk in &self.chunks {
            chunk.get_mut().mark_generated();
        }
        self.terrain.chunks_with_block_data().push_all(self.chunks.iter().cloned());
    }
}
