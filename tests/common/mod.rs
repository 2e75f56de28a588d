#![allow(dead_code)]

use std::time::Duration;

use cgmath::Point3;
use voxel_terrain::engine_state::error::TerrainError;
use voxel_terrain::engine_state::voxels::{
    block::block_type::BlockType,
    chunk::Chunk,
    generation::{Carver, ColumnFill, ProceduralFill},
    terrain::Terrain,
    zone::ZoneKey,
};
use voxel_terrain::{HeadlessChunkBuffers, TerrainEngine, TerrainSettings};

pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Stone from y = 0 up to (not including) `height`.
pub struct Flat(pub i32);

impl ColumnFill for Flat {
    fn fill_column(&self, chunk: &mut Chunk, local_x: i32, local_z: i32) -> Result<(), TerrainError> {
        for y in 0..self.0 {
            chunk.set_local(local_x, y, local_z, BlockType::STONE)?;
        }
        Ok(())
    }
}

pub struct NoCarve;

impl Carver for NoCarve {
    fn carve(&self, _terrain: &Terrain, _zone: ZoneKey, _rng: &mut fastrand::Rng) {}
}

pub fn flat_fill(height: i32) -> ProceduralFill {
    ProceduralFill::new(Box::new(Flat(height)), Box::new(NoCarve), Box::new(NoCarve), 0.0, 0.0, 0)
}

pub fn test_settings(load_radius_zones: i32) -> TerrainSettings {
    TerrainSettings {
        load_radius_zones,
        worker_count: 3,
        max_tasks_in_flight: 2,
        river_probability: 0.0,
        cave_probability: 0.0,
        ..TerrainSettings::default()
    }
}

/// A settled engine over flat terrain of the given height around the origin.
pub fn settled_flat_engine(load_radius_zones: i32, height: i32) -> TerrainEngine<HeadlessChunkBuffers> {
    let mut engine = TerrainEngine::with_fill(
        test_settings(load_radius_zones),
        flat_fill(height),
        HeadlessChunkBuffers::new(),
    );
    assert!(engine.settle(player(), SETTLE_TIMEOUT), "pipeline did not settle");
    engine
}

pub fn player() -> Point3<f32> {
    Point3::new(8.5, 40.0, 8.5)
}
