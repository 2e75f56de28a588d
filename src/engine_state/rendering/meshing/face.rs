use cgmath::{Point3, Vector3};

use crate::engine_state::rendering::vertex::Vertex;
use crate::engine_state::voxels::block::{atlas_cell, block_side::BlockSide, block_type::BlockType, ATLAS_CELLS_PER_EDGE};

/// Corner offsets of each face, counter-clockwise when seen from outside the block,
/// indexed by `BlockSide`.
const FACE_CORNERS: [[[i32; 3]; 4]; 6] = [
    [[0, 0, 1], [1, 0, 1], [1, 1, 1], [0, 1, 1]], // FRONT (+Z)
    [[1, 0, 0], [0, 0, 0], [0, 1, 0], [1, 1, 0]], // BACK (-Z)
    [[0, 0, 0], [1, 0, 0], [1, 0, 1], [0, 0, 1]], // BOTTOM (-Y)
    [[0, 1, 1], [1, 1, 1], [1, 1, 0], [0, 1, 0]], // TOP (+Y)
    [[0, 0, 0], [0, 0, 1], [0, 1, 1], [0, 1, 0]], // LEFT (-X)
    [[1, 0, 1], [1, 0, 0], [1, 1, 0], [1, 1, 1]], // RIGHT (+X)
];

/// Texture coordinates of the four corners within one atlas cell.
const CORNER_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Represents a single unit quad on one side of a voxel.
///
/// Corners are stored lower-left, lower-right, upper-right, upper-left as seen from
/// outside the block, which is counter-clockwise winding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub corners: [Point3<i32>; 4],
    pub block_type: BlockType,
    pub block_side: BlockSide,
}

impl Face {
    /// Index pattern of one quad, relative to its first vertex.
    pub const INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

    /// Creates the face on `block_side` of the block at world position `block`.
    pub fn new(block: Point3<i32>, block_type: BlockType, block_side: BlockSide) -> Self {
        let corners = FACE_CORNERS[block_side as usize]
            .map(|[x, y, z]| Point3::new(block.x + x, block.y + y, block.z + z));
        Face {
            corners,
            block_type,
            block_side,
        }
    }

    /// The four interleaved vertices of this face.
    pub fn vertices(&self) -> [Vertex; 4] {
        let normal: Vector3<f32> = self.block_side.normal();
        let (column, row) = atlas_cell(self.block_type, self.block_side);
        let animated = self.block_type.is_animated();

        let mut vertices = [Vertex::new(Point3::new(0.0, 0.0, 0.0), normal, [0.0, 0.0], animated); 4];
        for (i, vertex) in vertices.iter_mut().enumerate() {
            let corner = self.corners[i];
            let [u, v] = CORNER_UVS[i];
            *vertex = Vertex::new(
                Point3::new(corner.x as f32, corner.y as f32, corner.z as f32),
                normal,
                [
                    (column as f32 + u) / ATLAS_CELLS_PER_EDGE,
                    (row as f32 + v) / ATLAS_CELLS_PER_EDGE,
                ],
                animated,
            );
        }
        vertices
    }
}
