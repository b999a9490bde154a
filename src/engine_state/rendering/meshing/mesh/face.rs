use cgmath::Point3;

use crate::engine_state::{
    rendering::Vertex,
    voxels::block::block_side::BlockSide,
};

/// A single unit quad on one side of a voxel.
///
/// Corners are in world-space block coordinates and are named as seen from
/// outside the block looking at the face. Drawn as the triangles
/// `ll, lr, ur` and `ll, ur, ul`, they wind counter-clockwise from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    /// Lower-left corner
    pub ll: Point3<i32>,
    /// Lower-right corner
    pub lr: Point3<i32>,
    /// Upper-left corner
    pub ul: Point3<i32>,
    /// Upper-right corner
    pub ur: Point3<i32>,
    /// Which side of the block this face represents
    pub block_side: BlockSide,
}

impl Face {
    /// Creates the face on `block_side` of the voxel whose minimum corner is
    /// `origin`.
    pub fn new(origin: Point3<i32>, block_side: BlockSide) -> Self {
        let (x, y, z) = (origin.x, origin.y, origin.z);
        let (ll, lr, ul, ur) = match block_side {
            BlockSide::FRONT => (
                Point3::new(x, y, z + 1),
                Point3::new(x + 1, y, z + 1),
                Point3::new(x, y + 1, z + 1),
                Point3::new(x + 1, y + 1, z + 1),
            ),
            BlockSide::BACK => (
                Point3::new(x + 1, y, z),
                Point3::new(x, y, z),
                Point3::new(x + 1, y + 1, z),
                Point3::new(x, y + 1, z),
            ),
            BlockSide::RIGHT => (
                Point3::new(x + 1, y, z + 1),
                Point3::new(x + 1, y, z),
                Point3::new(x + 1, y + 1, z + 1),
                Point3::new(x + 1, y + 1, z),
            ),
            BlockSide::LEFT => (
                Point3::new(x, y, z),
                Point3::new(x, y, z + 1),
                Point3::new(x, y + 1, z),
                Point3::new(x, y + 1, z + 1),
            ),
            BlockSide::TOP => (
                Point3::new(x, y + 1, z + 1),
                Point3::new(x + 1, y + 1, z + 1),
                Point3::new(x, y + 1, z),
                Point3::new(x + 1, y + 1, z),
            ),
            BlockSide::BOTTOM => (
                Point3::new(x, y, z),
                Point3::new(x + 1, y, z),
                Point3::new(x, y, z + 1),
                Point3::new(x + 1, y, z + 1),
            ),
        };

        Face {
            ll,
            lr,
            ul,
            ur,
            block_side,
        }
    }

    /// The four corner vertices in `ll, lr, ul, ur` order, with the full
    /// texture mapped once across the quad.
    pub fn vertices(&self) -> [Vertex; 4] {
        [
            Vertex::new(self.ll, 0.0, 1.0),
            Vertex::new(self.lr, 1.0, 1.0),
            Vertex::new(self.ul, 0.0, 0.0),
            Vertex::new(self.ur, 1.0, 0.0),
        ]
    }
}
