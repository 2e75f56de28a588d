//! # Zone Module
//!
//! Addressing for the two horizontal grid levels of the terrain:
//!
//! * `ChunkPos` - the 16-aligned world origin of one chunk column
//! * `ZoneKey` - the 64-aligned world origin of one 4x4 group of chunks, packed
//!   into a single `i64` (x in the high 32 bits, z in the low 32 bits) so it can be
//!   hashed and compared as one integer and decoded back without loss
//!
//! Both levels quantize with floor division, so negative coordinates land in the
//! zone/chunk that contains them rather than the one nearer to zero.
//!
//! Block columns are addressable in `-WORLD_LIMIT..WORLD_LIMIT` along x and z. The
//! remaining `i32` headroom covers the corner, border and carver arithmetic of the
//! outermost zones.

use cgmath::Point3;

use crate::engine_state::error::TerrainError;

use super::block::block_side::BlockSide;
use super::chunk::CHUNK_WIDTH;

/// Width of a generation zone in blocks along x and z.
pub const ZONE_WIDTH: i32 = 64;
/// Chunks along each horizontal edge of a zone.
pub const CHUNKS_PER_ZONE_EDGE: i32 = ZONE_WIDTH / CHUNK_WIDTH;
/// Chunks in one zone.
pub const CHUNKS_PER_ZONE: usize = (CHUNKS_PER_ZONE_EDGE * CHUNKS_PER_ZONE_EDGE) as usize;
/// Exclusive bound on the absolute x and z of addressable block columns.
pub const WORLD_LIMIT: i32 = 1 << 30;

/// Whether world block column `(x, z)` lies inside the addressable grid.
pub fn is_addressable(x: i64, z: i64) -> bool {
    let range = -(WORLD_LIMIT as i64)..WORLD_LIMIT as i64;
    range.contains(&x) && range.contains(&z)
}

/// Origin of a chunk column in world block coordinates.
///
/// Both components are multiples of `CHUNK_WIDTH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The chunk column containing world block column `(x, z)`.
    pub fn containing(x: i32, z: i32) -> Self {
        Self {
            x: x.div_euclid(CHUNK_WIDTH) * CHUNK_WIDTH,
            z: z.div_euclid(CHUNK_WIDTH) * CHUNK_WIDTH,
        }
    }

    /// The lateral neighbor across `side`, or `None` for vertical sides and for
    /// neighbors outside the `i32` grid.
    pub fn neighbor(self, side: BlockSide) -> Option<ChunkPos> {
        let offset = side.offset();
        if offset.y != 0 {
            return None;
        }
        Some(ChunkPos {
            x: self.x.checked_add(offset.x * CHUNK_WIDTH)?,
            z: self.z.checked_add(offset.z * CHUNK_WIDTH)?,
        })
    }

    /// The zone this chunk belongs to.
    pub fn zone(self) -> ZoneKey {
        ZoneKey::from_origin(
            self.x.div_euclid(ZONE_WIDTH) * ZONE_WIDTH,
            self.z.div_euclid(ZONE_WIDTH) * ZONE_WIDTH,
        )
    }
}

/// Hashed identity of a generation zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneKey(i64);

impl ZoneKey {
    /// Encodes an already quantized zone origin.
    pub const fn from_origin(x: i32, z: i32) -> Self {
        ZoneKey(((x as i64) << 32) | (z as u32 as i64))
    }

    pub const fn from_raw(raw: i64) -> Self {
        ZoneKey(raw)
    }

    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Decodes the `(x, z)` origin.
    pub const fn origin(self) -> (i32, i32) {
        ((self.0 >> 32) as i32, self.0 as i32)
    }

    /// The zone containing world block column `(x, z)`.
    ///
    /// Fails with `OutOfRange` outside the addressable grid.
    pub fn containing(x: i64, z: i64) -> Result<Self, TerrainError> {
        if !is_addressable(x, z) {
            return Err(TerrainError::OutOfRange { x, y: 0, z });
        }
        let quantize = |c: i64| (c.div_euclid(ZONE_WIDTH as i64) * ZONE_WIDTH as i64) as i32;
        Ok(Self::from_origin(quantize(x), quantize(z)))
    }

    /// The zone containing a continuous world position.
    pub fn containing_position(position: Point3<f32>) -> Result<Self, TerrainError> {
        if !position.x.is_finite() || !position.z.is_finite() {
            return Err(TerrainError::OutOfRange {
                x: i64::MAX,
                y: 0,
                z: i64::MAX,
            });
        }
        // Saturating float-to-int casts push anything huge outside the grid.
        Self::containing(position.x.floor() as i64, position.z.floor() as i64)
    }

    /// The 16 chunk origins of this zone, x-major.
    pub fn chunk_origins(self) -> [ChunkPos; CHUNKS_PER_ZONE] {
        let (x, z) = self.origin();
        let mut origins = [ChunkPos::new(x, z); CHUNKS_PER_ZONE];
        for i in 0..CHUNKS_PER_ZONE_EDGE {
            for j in 0..CHUNKS_PER_ZONE_EDGE {
                origins[(i * CHUNKS_PER_ZONE_EDGE + j) as usize] =
                    ChunkPos::new(x + CHUNK_WIDTH * i, z + CHUNK_WIDTH * j);
            }
        }
        origins
    }

    /// All zones within `radius` zones of this one (a square of side `2 * radius + 1`),
    /// skipping any that would fall outside the addressable grid.
    pub fn neighborhood(self, radius: i32) -> Vec<ZoneKey> {
        let (x, z) = self.origin();
        let mut zones = Vec::new();
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                let zone = ZoneKey::containing(
                    x as i64 + dx as i64 * ZONE_WIDTH as i64,
                    z as i64 + dz as i64 * ZONE_WIDTH as i64,
                );
                if let Ok(zone) = zone {
                    zones.push(zone);
                }
            }
        }
        zones
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_keys_round_trip_through_origin() {
        let raws = [0, 1, -1, i64::MIN, i64::MAX, 0x0000_0040_FFFF_FFC0, -274_877_906_944];
        for raw in raws {
            let key = ZoneKey::from_raw(raw);
            let (x, z) = key.origin();
            assert_eq!(ZoneKey::from_origin(x, z), key);
        }
    }

    #[test]
    fn negative_coordinates_floor_into_their_zone() {
        let key = ZoneKey::containing(-1, -65).unwrap();
        assert_eq!(key.origin(), (-64, -128));
        assert_eq!(ZoneKey::containing(63, 0).unwrap().origin(), (0, 0));
    }

    #[test]
    fn coordinates_beyond_the_world_limit_are_rejected() {
        assert!(matches!(
            ZoneKey::containing(i32::MAX as i64 + 1, 0),
            Err(TerrainError::OutOfRange { .. })
        ));
        assert!(ZoneKey::containing(2_147_483_584, 0).is_err());
        assert!(ZoneKey::containing(0, WORLD_LIMIT as i64).is_err());
        assert!(ZoneKey::containing(-(WORLD_LIMIT as i64) - 1, 0).is_err());
        assert!(ZoneKey::containing_position(Point3::new(f32::NAN, 0.0, 0.0)).is_err());
        assert!(ZoneKey::containing_position(Point3::new(1.0e12, 0.0, 0.0)).is_err());
    }

    #[test]
    fn outermost_zones_leave_room_for_a_border_block() {
        let far = ZoneKey::containing(WORLD_LIMIT as i64 - 1, -(WORLD_LIMIT as i64)).unwrap();
        let (x, z) = far.origin();
        assert_eq!(x, WORLD_LIMIT - ZONE_WIDTH);
        assert_eq!(z, -WORLD_LIMIT);
        assert!(x.checked_add(ZONE_WIDTH + 1).is_some());
        assert!(z.checked_sub(ZONE_WIDTH + 1).is_some());
    }

    #[test]
    fn neighborhood_stops_at_the_world_limit() {
        let edge = ZoneKey::containing(WORLD_LIMIT as i64 - 1, 0).unwrap();
        assert_eq!(edge.neighborhood(1).len(), 6);
    }

    #[test]
    fn zone_enumerates_sixteen_distinct_chunks() {
        let key = ZoneKey::from_origin(-64, 128);
        let origins = key.chunk_origins();
        for (i, origin) in origins.iter().enumerate() {
            assert_eq!(origin.zone(), key);
            assert!(!origins[..i].contains(origin));
        }
        assert_eq!(origins[0], ChunkPos::new(-64, 128));
        assert_eq!(origins[15], ChunkPos::new(-16, 176));
    }

    #[test]
    fn neighborhood_is_a_square() {
        let zones = ZoneKey::from_origin(0, 0).neighborhood(2);
        assert_eq!(zones.len(), 25);
        assert!(zones.contains(&ZoneKey::from_origin(-128, 128)));
    }

    #[test]
    fn lateral_neighbors_step_one_chunk() {
        let pos = ChunkPos::new(16, -16);
        assert_eq!(pos.neighbor(BlockSide::LEFT), Some(ChunkPos::new(0, -16)));
        assert_eq!(pos.neighbor(BlockSide::FRONT), Some(ChunkPos::new(16, 0)));
        assert_eq!(pos.neighbor(BlockSide::TOP), None);
        assert_eq!(ChunkPos::containing(-1, 17), ChunkPos::new(-16, 16));
    }
}
