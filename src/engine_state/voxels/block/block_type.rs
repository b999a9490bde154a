//! # Block Type Module
//!
//! This module defines the materials a voxel can hold and how they map to
//! the compact integer tag stored in the chunk grid.

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// The discriminants are the integer tags stored in a chunk: `0` is the
/// absence of a block, every other value is a material id. The
/// `FromPrimitive` derive allows conversion back from the stored tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// No block. Transparent to face culling.
    AIR = 0,

    /// Surface block above the water line. Top, sides and bottom use
    /// different textures.
    GRASS = 1,

    /// The shallow layer directly below the surface.
    DIRT = 2,

    /// Everything deeper than the dirt layer.
    STONE = 3,

    /// Surface block at or below the water line.
    SAND = 4,
}

impl BlockType {
    /// Converts a stored tag back into a `BlockType`.
    ///
    /// Unknown tags decode as `AIR` so that a corrupted cell renders as a
    /// hole instead of aborting the mesher.
    ///
    /// # Arguments
    /// * `btype` - The block type as a `BlockTypeSize`
    pub fn get_block_type_from_int(btype: BlockTypeSize) -> Self {
        num::FromPrimitive::from_u8(btype).unwrap_or(BlockType::AIR)
    }

    /// Returns `true` for every material other than `AIR`.
    pub fn is_solid(self) -> bool {
        self != BlockType::AIR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_match_material_ids() {
        assert_eq!(BlockType::AIR as BlockTypeSize, 0);
        assert_eq!(BlockType::GRASS as BlockTypeSize, 1);
        assert_eq!(BlockType::DIRT as BlockTypeSize, 2);
        assert_eq!(BlockType::STONE as BlockTypeSize, 3);
        assert_eq!(BlockType::SAND as BlockTypeSize, 4);
    }

    #[test]
    fn unknown_tag_decodes_as_air() {
        assert_eq!(BlockType::get_block_type_from_int(3), BlockType::STONE);
        assert_eq!(BlockType::get_block_type_from_int(200), BlockType::AIR);
        assert!(!BlockType::AIR.is_solid());
        assert!(BlockType::SAND.is_solid());
    }
}
