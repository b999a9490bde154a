//! # Chunk Iteration Module
//!
//! Iteration over the filled cells of a [`VoxelGrid`]. Air cells are skipped,
//! so the mesher only pays for blocks that can emit faces.

use cgmath::Point3;

use crate::engine_state::voxels::block::Block;

use super::{VoxelGrid, CHUNK_DEPTH, CHUNK_WIDTH};

/// An iterator over all non-air blocks in a voxel grid.
///
/// Walks the grid in storage order (x fastest, then z, then y) and yields
/// the local position of each solid block together with the block itself.
pub struct ChunkBlockIterator<'a> {
    grid: &'a VoxelGrid,
    offset: usize,
}

impl<'a> ChunkBlockIterator<'a> {
    pub(super) fn new(grid: &'a VoxelGrid) -> Self {
        ChunkBlockIterator { grid, offset: 0 }
    }
}

impl Iterator for ChunkBlockIterator<'_> {
    type Item = (Point3<i32>, Block);

    fn next(&mut self) -> Option<Self::Item> {
        let blocks = self.grid.blocks();
        while self.offset < blocks.len() {
            let offset = self.offset;
            self.offset += 1;

            let block = blocks[offset];
            if !block.is_solid() {
                continue;
            }

            let offset = offset as i32;
            let plane = CHUNK_WIDTH * CHUNK_DEPTH;
            let position = Point3::new(
                offset % CHUNK_WIDTH,
                offset / plane,
                (offset % plane) / CHUNK_WIDTH,
            );
            return Some((position, block));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    #[test]
    fn yields_only_solid_cells_with_their_positions() {
        let mut grid = VoxelGrid::empty();
        grid.set(3, 200, 9, Block::new(BlockType::STONE));
        grid.set(15, 0, 0, Block::new(BlockType::SAND));

        let found: Vec<_> = grid.solid_blocks().collect();
        assert_eq!(
            found,
            vec![
                (Point3::new(15, 0, 0), Block::new(BlockType::SAND)),
                (Point3::new(3, 200, 9), Block::new(BlockType::STONE)),
            ]
        );
    }
}
