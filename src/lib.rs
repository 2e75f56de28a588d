#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Terrain
//!
//! An infinite-terrain voxel pipeline: procedural generation of a block world in
//! 64x64 zones, visible-face meshing, and streaming of both across a worker pool
//! so the render loop never waits.
//!
//! ## Key Modules
//!
//! * `core` - Shared-ownership and mailbox primitives used across threads
//! * `engine_state` - The coordinator, terrain data model, generators, meshing and
//!   worker pool
//!
//! ## Architecture
//!
//! Generation and meshing run as tasks on worker threads. Their output flows
//! through two lock-guarded mailboxes that the coordinator drains once per tick;
//! uploads happen on the coordinator's thread through a `ChunkUploader`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cgmath::Point3;
//! use voxel_terrain::{HeadlessChunkBuffers, TerrainEngine, TerrainSettings};
//!
//! let mut engine = TerrainEngine::new(TerrainSettings::default(), HeadlessChunkBuffers::new());
//! loop {
//!     let report = engine.tick(Point3::new(0.0, 150.0, 0.0));
//!     // render using engine.uploader and engine.time()
//! #   break;
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use cgmath::Point3;
use log::info;
use web_time::Instant;

pub mod core;
pub mod engine_state;

pub use engine_state::{
    buffer_state::{ChunkBufferState, ChunkUploader, HeadlessChunkBuffers},
    error::TerrainError,
    settings::TerrainSettings,
    TerrainEngine, TickReport,
};

/// Settings file read by `run()` from the working directory, if present.
pub const SETTINGS_FILE: &str = "terrain_settings.json";

/// Blocks the simulated player walks along +x per tick in headless mode.
const HEADLESS_WALK_SPEED: f32 = 2.0;
/// How long the headless run waits for outstanding work after its last tick.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(60);

pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let settings = if Path::new(SETTINGS_FILE).exists() {
        TerrainSettings::load_from_file(SETTINGS_FILE)
    } else {
        info!("No {} found, using default settings", SETTINGS_FILE);
        TerrainSettings::default()
    };

    run_headless(settings);
}

/// Drives the pipeline without a GPU for `settings.headless_ticks` ticks while a
/// simulated player walks along +x, then logs summary statistics.
pub fn run_headless(settings: TerrainSettings) -> TerrainEngine<HeadlessChunkBuffers> {
    let tick_interval = Duration::from_millis(settings.tick_interval_ms);
    let ticks = settings.headless_ticks;
    let mut engine = TerrainEngine::new(settings, HeadlessChunkBuffers::new());

    let start = Instant::now();
    let mut player = Point3::new(0.5, 160.0, 0.5);
    let mut next_tick = Instant::now();
    for _ in 0..ticks {
        engine.tick(player);
        player.x += HEADLESS_WALK_SPEED;

        next_tick += tick_interval;
        let now = Instant::now();
        if next_tick > now {
            std::thread::sleep(next_tick - now);
        }
    }

    if !engine.settle(player, SETTLE_TIMEOUT) {
        log::warn!("Pipeline still busy after {:?}", SETTLE_TIMEOUT);
    }

    info!(
        "Ran {} ticks in {:?}: {} zones, {} chunks, {} chunks uploaded ({} uploads, {} faces)",
        engine.time(),
        start.elapsed(),
        engine.terrain.zone_count(),
        engine.terrain.chunk_count(),
        engine.uploader.chunk_count(),
        engine.uploader.total_uploads(),
        engine.uploader.total_face_count(),
    );

    engine
}
