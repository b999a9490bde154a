//! # Block Side Module
//!
//! The six axis-aligned faces of a voxel and the neighbour offset each one
//! looks through when deciding visibility.

/// Represents the six possible faces of a voxel block.
///
/// The discriminants index the inner arrays of
/// [`BLOCK_TYPE_TO_TEXTURES`](super::BLOCK_TYPE_TO_TEXTURES).
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    ///
    /// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// Unit offset from a voxel to the neighbour that shares this face.
    ///
    /// # Returns
    /// `(dx, dy, dz)` in block units.
    pub fn offset(self) -> (i32, i32, i32) {
        match self {
            BlockSide::FRONT => (0, 0, 1),
            BlockSide::BACK => (0, 0, -1),
            BlockSide::BOTTOM => (0, -1, 0),
            BlockSide::TOP => (0, 1, 0),
            BlockSide::LEFT => (-1, 0, 0),
            BlockSide::RIGHT => (1, 0, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_unit_and_distinct() {
        let offsets: Vec<_> = BlockSide::all().iter().map(|s| s.offset()).collect();
        for (i, (dx, dy, dz)) in offsets.iter().enumerate() {
            assert_eq!(dx.abs() + dy.abs() + dz.abs(), 1);
            assert!(!offsets[i + 1..].contains(&(*dx, *dy, *dz)));
        }
    }
}
