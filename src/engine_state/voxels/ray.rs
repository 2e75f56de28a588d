//! # Ray Module
//!
//! Grid ray marching over terrain blocks, used by the player layer to find the
//! block under the crosshair.
//!
//! The march visits every cell the ray passes through, in order, stepping one
//! axis boundary at a time. The cell containing the origin is never reported.
//! Cells in chunks that are not allocated count as empty, so rays pass freely
//! through unexplored terrain and above or below the world.
//!
//! Reach is capped at `MAX_REACH`, which bounds the march to a few thousand cell
//! crossings. Boundary distances are tracked in `f64` so every crossing advances.

use cgmath::{InnerSpace, Point3, Vector3};

use crate::engine_state::error::TerrainError;

use super::block::block_side::BlockSide;
use super::block::block_type::BlockType;
use super::chunk::CHUNK_HEIGHT;
use super::terrain::Terrain;

/// Longest distance a single march covers, in blocks. Longer rays are shortened.
pub const MAX_REACH: f32 = 1024.0;

/// The first non-empty cell along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub cell: Point3<i32>,
    pub block_type: BlockType,
    /// Distance from the origin to the point where the ray entered the cell.
    pub distance: f32,
    /// The face of the cell the ray entered through.
    pub face: BlockSide,
}

impl RayHit {
    /// The empty cell in front of the face that was hit, where a placed block goes.
    pub fn adjacent_cell(&self) -> Point3<i32> {
        self.cell + self.face.offset()
    }
}

/// Marches from `origin` along `ray`, whose length is the maximum distance (capped
/// at `MAX_REACH`).
///
/// # Returns
/// * `Ok(Some(hit))` for the first non-empty cell within reach
/// * `Ok(None)` if the ray runs out of length or leaves the `i32` grid first
///
/// # Errors
/// `DegenerateGeometry` when `ray` has no finite non-zero component to step along,
/// or when `origin` is not finite.
pub fn grid_march(terrain: &Terrain, origin: Point3<f32>, ray: Vector3<f32>) -> Result<Option<RayHit>, TerrainError> {
    let finite = |v: [f32; 3]| v.iter().all(|c| c.is_finite());
    if !finite(ray.into()) || !finite(origin.into()) || ray == Vector3::new(0.0, 0.0, 0.0) {
        return Err(TerrainError::DegenerateGeometry { direction: ray });
    }

    let ray = Vector3::new(ray.x as f64, ray.y as f64, ray.z as f64);
    let origin = Point3::new(origin.x as f64, origin.y as f64, origin.z as f64);
    let length = ray.magnitude();
    let max_length = length.min(MAX_REACH as f64);
    let direction = ray / length;

    let mut cell = [origin.x.floor() as i32, origin.y.floor() as i32, origin.z.floor() as i32];
    let mut step = [0i32; 3];
    let mut next_boundary = [f64::INFINITY; 3];
    let mut boundary_spacing = [f64::INFINITY; 3];

    for axis in 0..3 {
        let d = direction[axis];
        if d == 0.0 {
            continue;
        }
        step[axis] = if d > 0.0 { 1 } else { -1 };
        let boundary = origin[axis].floor() + if d > 0.0 { 1.0 } else { 0.0 };
        next_boundary[axis] = (boundary - origin[axis]) / d;
        boundary_spacing[axis] = 1.0 / d.abs();
    }

    loop {
        if leaving_world_vertically(cell[1], step[1]) {
            return Ok(None);
        }

        let axis = (0..3)
            .min_by(|&a, &b| next_boundary[a].total_cmp(&next_boundary[b]))
            .unwrap_or(0);
        let travelled = next_boundary[axis];
        if travelled >= max_length {
            return Ok(None);
        }

        let Some(next) = cell[axis].checked_add(step[axis]) else {
            return Ok(None);
        };
        cell[axis] = next;
        next_boundary[axis] += boundary_spacing[axis];

        let position = Point3::new(cell[0], cell[1], cell[2]);
        // Unallocated cells do not block the ray.
        if let Ok(block_type) = terrain.block_at(position) {
            if !block_type.is_empty() {
                return Ok(Some(RayHit {
                    cell: position,
                    block_type,
                    distance: travelled.max(0.0) as f32,
                    face: BlockSide::entered_through(axis, step[axis] > 0),
                }));
            }
        }
    }
}

fn leaving_world_vertically(y: i32, step_y: i32) -> bool {
    (y < 0 && step_y <= 0) || (y >= CHUNK_HEIGHT && step_y >= 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::zone::ZoneKey;

    fn terrain_with(blocks: &[(i32, i32, i32)]) -> Terrain {
        let terrain = Terrain::new();
        terrain.allocate_zone(ZoneKey::from_origin(0, 0));
        for &(x, y, z) in blocks {
            terrain.set_block_at(Point3::new(x, y, z), BlockType::STONE).unwrap();
        }
        terrain
    }

    #[test]
    fn hits_the_first_block_in_line() {
        let terrain = terrain_with(&[(5, 10, 2), (8, 10, 2)]);
        let hit = grid_march(&terrain, Point3::new(0.5, 10.5, 2.5), Vector3::new(10.0, 0.0, 0.0))
            .unwrap()
            .unwrap();

        assert_eq!(hit.cell, Point3::new(5, 10, 2));
        assert_eq!(hit.face, BlockSide::LEFT);
        assert!((hit.distance - 4.5).abs() < 1e-5);
        assert_eq!(hit.adjacent_cell(), Point3::new(4, 10, 2));
    }

    #[test]
    fn looking_down_hits_the_top_face() {
        let terrain = terrain_with(&[(3, 4, 3)]);
        let hit = grid_march(&terrain, Point3::new(3.5, 8.2, 3.5), Vector3::new(0.0, -6.0, 0.0))
            .unwrap()
            .unwrap();
        assert_eq!(hit.cell, Point3::new(3, 4, 3));
        assert_eq!(hit.face, BlockSide::TOP);
    }

    #[test]
    fn misses_beyond_reach() {
        let terrain = terrain_with(&[(5, 10, 2)]);
        let hit = grid_march(&terrain, Point3::new(0.5, 10.5, 2.5), Vector3::new(3.0, 0.0, 0.0)).unwrap();
        assert_eq!(hit, None);
    }

    #[test]
    fn unallocated_terrain_does_not_block() {
        let terrain = terrain_with(&[(1, 10, 1)]);
        let hit = grid_march(&terrain, Point3::new(-20.5, 10.5, 1.5), Vector3::new(30.0, 0.0, 0.0))
            .unwrap()
            .unwrap();
        assert_eq!(hit.cell, Point3::new(1, 10, 1));
    }

    #[test]
    fn rays_above_the_world_end_early() {
        let terrain = terrain_with(&[]);
        let hit = grid_march(&terrain, Point3::new(1.5, 300.0, 1.5), Vector3::new(1.0e6, 1.0, 0.0)).unwrap();
        assert_eq!(hit, None);
    }

    #[test]
    fn reaches_beyond_f32_precision_still_terminate() {
        let terrain = terrain_with(&[(40, 10, 0)]);
        let origin = Point3::new(0.5, 10.5, 0.5);

        for reach in [1.8e7, 1.0e30, f32::MAX] {
            let hit = grid_march(&terrain, origin, Vector3::new(reach, 0.0, 0.0)).unwrap().unwrap();
            assert_eq!(hit.cell, Point3::new(40, 10, 0));
        }
        let empty = terrain_with(&[]);
        assert_eq!(grid_march(&empty, origin, Vector3::new(1.8e7, 0.0, 0.0)).unwrap(), None);
    }

    #[test]
    fn blocks_past_the_reach_cap_are_not_hit() {
        let far = MAX_REACH as i32 + 10;
        let terrain = Terrain::new();
        terrain.create_chunk_at(crate::engine_state::voxels::zone::ChunkPos::containing(far, 0));
        terrain.set_block_at(Point3::new(far, 10, 0), BlockType::STONE).unwrap();

        let hit = grid_march(&terrain, Point3::new(0.5, 10.5, 0.5), Vector3::new(1.0e9, 0.0, 0.0)).unwrap();
        assert_eq!(hit, None);
    }

    #[test]
    fn marches_near_the_i32_edge_stop_instead_of_overflowing() {
        let terrain = terrain_with(&[]);
        let origin = Point3::new(2.1e9, 10.5, 0.5);
        assert_eq!(grid_march(&terrain, origin, Vector3::new(5000.0, 0.0, 0.0)).unwrap(), None);
        assert_eq!(grid_march(&terrain, Point3::new(1.0e12, 10.5, 0.5), Vector3::new(5.0, 0.0, 0.0)).unwrap(), None);
    }

    #[test]
    fn degenerate_directions_are_rejected() {
        let terrain = terrain_with(&[]);
        for ray in [Vector3::new(0.0, 0.0, 0.0), Vector3::new(f32::NAN, 1.0, 0.0)] {
            assert!(matches!(
                grid_march(&terrain, Point3::new(0.0, 10.0, 0.0), ray),
                Err(TerrainError::DegenerateGeometry { .. })
            ));
        }
    }
}
