//! # Engine State Module
//!
//! The terrain pipeline coordinator and the subsystems it drives.
//!
//! ## Key Components
//!
//! * `TerrainEngine` - The per-tick coordinator owning the worker pool and uploader
//! * `buffer_state` - Render-side chunk buffers behind the `ChunkUploader` trait
//! * `rendering` - Meshing and the vertex format
//! * `task_management` - The worker pool
//! * `voxels` - Blocks, chunks, zones, the terrain and its generators
//! * `settings` - JSON-backed tunables
//! * `error` - `TerrainError`
//!
//! ## Architecture
//!
//! `TerrainEngine::tick` runs once per frame on the render thread:
//!
//! 1. Collect finished task reports and hand queued tasks to free workers
//! 2. Allocate every zone within the load radius of the player that does not exist
//!    yet, and dispatch one generation task per new zone
//! 3. Drain the block-data mailbox and dispatch one meshing task per generated chunk
//! 4. Drain the mesh-data mailbox and upload every mesh that is still current
//! 5. Advance the time counter
//!
//! The coordinator never blocks on a worker. Work reaches it only through the two
//! terrain mailboxes, and each drain holds the mailbox lock just long enough to swap
//! the contents out.

use std::sync::Arc;
use std::time::Duration;

use cgmath::{Point3, Vector3};
use log::{debug, info, warn};
use web_time::Instant;

use buffer_state::ChunkUploader;
use error::TerrainError;
use rendering::tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask;
use settings::TerrainSettings;
use task_management::TaskManager;
use voxels::{
    block::block_type::BlockType,
    generation::ProceduralFill,
    ray::{grid_march, RayHit},
    tasks::chunk_generation_task::ChunkGenerationTask,
    terrain::Terrain,
    zone::{ChunkPos, ZoneKey},
};

pub mod buffer_state;
pub mod error;
pub mod rendering;
pub mod settings;
pub mod task_management;
pub mod voxels;

/// What happened during one coordinator tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The time counter value the tick ran at.
    pub tick: u64,
    pub zones_created: usize,
    pub meshing_dispatched: usize,
    pub meshes_uploaded: usize,
    /// Meshes dropped because the chunk was edited after they were built.
    pub stale_meshes_dropped: usize,
    pub tasks_completed: usize,
    pub tasks_panicked: usize,
}

/// The terrain pipeline coordinator.
///
/// Owns the worker pool, the generators and the uploader; shares the terrain with
/// the workers. Must be driven from a single thread.
pub struct TerrainEngine<U: ChunkUploader> {
    pub terrain: Arc<Terrain>,
    pub uploader: U,
    task_manager: TaskManager,
    fill: Arc<ProceduralFill>,
    settings: TerrainSettings,
    time: u64,
    current_player_zone: Option<ZoneKey>,
}

impl<U: ChunkUploader> TerrainEngine<U> {
    /// Creates a coordinator using the default generators configured by `settings`.
    pub fn new(settings: TerrainSettings, uploader: U) -> Self {
        let fill = ProceduralFill::from_settings(&settings);
        Self::with_fill(settings, fill, uploader)
    }

    /// Creates a coordinator with custom generators.
    pub fn with_fill(settings: TerrainSettings, fill: ProceduralFill, uploader: U) -> Self {
        let worker_count = settings.resolved_worker_count();
        let task_manager = TaskManager::new(worker_count, settings.max_tasks_in_flight);
        info!(
            "Terrain engine started: {} workers, load radius {} zones",
            worker_count, settings.load_radius_zones
        );

        Self {
            terrain: Arc::new(Terrain::new()),
            uploader,
            task_manager,
            fill: Arc::new(fill),
            settings,
            time: 0,
            current_player_zone: None,
        }
    }

    /// Runs one coordinator tick for a player standing at `player_position`.
    pub fn tick(&mut self, player_position: Point3<f32>) -> TickReport {
        let mut report = TickReport {
            tick: self.time,
            ..TickReport::default()
        };

        let task_reports = self.task_manager.process_completed_tasks();
        report.tasks_completed = task_reports.len();
        report.tasks_panicked = task_reports.iter().filter(|task| task.panicked).count();
        self.task_manager.process_queued_tasks();

        report.zones_created = self.expand_around(player_position);
        report.meshing_dispatched = self.dispatch_meshing();
        (report.meshes_uploaded, report.stale_meshes_dropped) = self.upload_meshes();

        self.time += 1;

        if report.zones_created + report.meshing_dispatched + report.meshes_uploaded > 0 {
            debug!("{:?}", report);
        }
        report
    }

    /// Creates and dispatches generation for every missing zone around the player.
    fn expand_around(&mut self, player_position: Point3<f32>) -> usize {
        let center = match ZoneKey::containing_position(player_position) {
            Ok(zone) => zone,
            Err(e) => {
                warn!("Player position is outside the terrain: {}", e);
                return 0;
            }
        };
        if self.current_player_zone != Some(center) {
            debug!("Player entered zone {:?}", center.origin());
            self.current_player_zone = Some(center);
        }

        let mut created = 0;
        for zone in center.neighborhood(self.settings.load_radius_zones) {
            if !self.terrain.mark_zone_created(zone) {
                continue;
            }
            let chunks = self.terrain.allocate_zone(zone);
            self.task_manager.publish_task(Box::new(ChunkGenerationTask::new(
                self.terrain.clone(),
                self.fill.clone(),
                zone,
                chunks,
            )));
            created += 1;
        }
        if created > 0 {
            info!("Dispatched generation for {} new zones ({} total)", created, self.terrain.zone_count());
        }
        created
    }

    fn dispatch_meshing(&mut self) -> usize {
        let mut dispatched = 0;
        // Workers check the chunk state; the coordinator takes no chunk lock here.
        for chunk in self.terrain.chunks_with_block_data().drain() {
            self.task_manager
                .publish_task(Box::new(ChunkMeshGenerationTask::new(self.terrain.clone(), chunk)));
            dispatched += 1;
        }
        dispatched
    }

    /// Uploads current meshes and drops superseded ones. Returns
    /// `(uploaded, dropped)`. Takes no chunk lock.
    fn upload_meshes(&mut self) -> (usize, usize) {
        let (mut uploaded, mut dropped) = (0, 0);
        for mesh in self.terrain.chunks_with_mesh_data().drain() {
            if mesh.is_stale() {
                dropped += 1;
                continue;
            }
            self.uploader.upload(&mesh);
            uploaded += 1;
        }
        (uploaded, dropped)
    }

    /// Whether no work is queued, running, or waiting in a mailbox.
    pub fn is_settled(&self) -> bool {
        self.task_manager.is_idle()
            && self.terrain.chunks_with_block_data().is_empty()
            && self.terrain.chunks_with_mesh_data().is_empty()
    }

    /// Ticks until the pipeline is settled or `timeout` passes. Returns whether it
    /// settled.
    pub fn settle(&mut self, player_position: Point3<f32>, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.tick(player_position);
            if self.is_settled() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    /// The monotonic tick counter, used for animated textures and the day cycle.
    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn settings(&self) -> &TerrainSettings {
        &self.settings
    }

    pub fn block_at(&self, position: Point3<i32>) -> Result<BlockType, TerrainError> {
        self.terrain.block_at(position)
    }

    /// Places a block and queues the affected chunks for re-meshing.
    pub fn place_block(&self, position: Point3<i32>, block_type: BlockType) -> Result<Vec<ChunkPos>, TerrainError> {
        self.terrain.edit_block(position, block_type)
    }

    /// Clears a block and queues the affected chunks for re-meshing.
    pub fn destroy_block(&self, position: Point3<i32>) -> Result<Vec<ChunkPos>, TerrainError> {
        self.terrain.edit_block(position, BlockType::EMPTY)
    }

    /// Destroys the first block along `ray` (whose length is the reach).
    pub fn destroy_block_along_ray(&self, origin: Point3<f32>, ray: Vector3<f32>) -> Result<Option<RayHit>, TerrainError> {
        let Some(hit) = grid_march(&self.terrain, origin, ray)? else {
            return Ok(None);
        };
        self.destroy_block(hit.cell)?;
        Ok(Some(hit))
    }

    /// Places `block_type` against the face of the first block along `ray`.
    ///
    /// Returns the position of the placed block.
    pub fn place_block_along_ray(
        &self,
        origin: Point3<f32>,
        ray: Vector3<f32>,
        block_type: BlockType,
    ) -> Result<Option<Point3<i32>>, TerrainError> {
        let Some(hit) = grid_march(&self.terrain, origin, ray)? else {
            return Ok(None);
        };
        let target = hit.adjacent_cell();
        self.place_block(target, block_type)?;
        Ok(Some(target))
    }
}
