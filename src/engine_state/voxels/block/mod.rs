//! # Block Module
//!
//! Block materials, block faces and the material × face → texture table
//! the mesher uses to bucket its output.

use block_side::BlockSide;
use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// A texture a block face can be drawn with.
///
/// Each variant becomes one vertex stream and one draw batch per chunk. The
/// ordering is only used to keep per-chunk mesh maps deterministic.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlockTexture {
    GrassTop,
    GrassSide,
    GrassBottom,
    Dirt,
    Stone,
    Sand,
}

impl BlockTexture {
    /// Every texture, in declaration order.
    pub fn all() -> [BlockTexture; 6] {
        [
            BlockTexture::GrassTop,
            BlockTexture::GrassSide,
            BlockTexture::GrassBottom,
            BlockTexture::Dirt,
            BlockTexture::Stone,
            BlockTexture::Sand,
        ]
    }

    /// File stem of the image backing this texture, e.g. `grass_top` for
    /// `grass_top.png`.
    pub fn file_stem(self) -> &'static str {
        match self {
            BlockTexture::GrassTop => "grass_top",
            BlockTexture::GrassSide => "grass_side",
            BlockTexture::GrassBottom => "grass_bottom",
            BlockTexture::Dirt => "dirt",
            BlockTexture::Stone => "stone",
            BlockTexture::Sand => "sand",
        }
    }
}

/// Maps each solid block type to its texture for each face.
///
/// The outer array is indexed by `BlockType as usize - 1` (AIR has no entry).
/// The inner array is indexed by `BlockSide`:
/// [Front, Back, Bottom, Top, Left, Right]
pub static BLOCK_TYPE_TO_TEXTURES: [[BlockTexture; 6]; 4] = {
    use BlockTexture::*;
    [
        // GRASS
        [GrassSide, GrassSide, GrassBottom, GrassTop, GrassSide, GrassSide],
        // DIRT
        [Dirt, Dirt, Dirt, Dirt, Dirt, Dirt],
        // STONE
        [Stone, Stone, Stone, Stone, Stone, Stone],
        // SAND
        [Sand, Sand, Sand, Sand, Sand, Sand],
    ]
};

/// Represents a single voxel block in the world.
///
/// # Memory Layout
/// `#[repr(C)]` and `Pod` keep a chunk's block array castable to raw bytes.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq, Eq, Default)]
pub struct Block {
    /// The type of this block, encoded as a `BlockTypeSize` for compact storage.
    pub block_type: BlockTypeSize,
}

impl Block {
    /// The empty cell.
    pub const AIR: Block = Block { block_type: 0 };

    /// Creates a new block of the specified type.
    pub fn new(block_type: BlockType) -> Self {
        Block {
            block_type: block_type as BlockTypeSize,
        }
    }

    /// Decodes the stored tag.
    pub fn get_type(self) -> BlockType {
        BlockType::get_block_type_from_int(self.block_type)
    }

    /// Returns `true` if the cell holds a material.
    pub fn is_solid(self) -> bool {
        self.block_type != 0
    }

    /// Texture for one face of this block, or `None` for air.
    ///
    /// # Arguments
    /// * `side` - The face being drawn
    pub fn texture_for_side(self, side: BlockSide) -> Option<BlockTexture> {
        match self.get_type() {
            BlockType::AIR => None,
            block_type => {
                Some(BLOCK_TYPE_TO_TEXTURES[block_type as usize - 1][side as usize])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grass_distinguishes_top_side_and_bottom() {
        let grass = Block::new(BlockType::GRASS);
        assert_eq!(grass.texture_for_side(BlockSide::TOP), Some(BlockTexture::GrassTop));
        assert_eq!(grass.texture_for_side(BlockSide::BOTTOM), Some(BlockTexture::GrassBottom));
        for side in [BlockSide::FRONT, BlockSide::BACK, BlockSide::LEFT, BlockSide::RIGHT] {
            assert_eq!(grass.texture_for_side(side), Some(BlockTexture::GrassSide));
        }
    }

    #[test]
    fn single_texture_materials_use_it_everywhere() {
        for (block_type, texture) in [
            (BlockType::DIRT, BlockTexture::Dirt),
            (BlockType::STONE, BlockTexture::Stone),
            (BlockType::SAND, BlockTexture::Sand),
        ] {
            let block = Block::new(block_type);
            for side in BlockSide::all() {
                assert_eq!(block.texture_for_side(side), Some(texture));
            }
        }
        assert_eq!(Block::AIR.texture_for_side(BlockSide::TOP), None);
    }
}
