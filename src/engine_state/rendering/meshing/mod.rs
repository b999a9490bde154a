//! Surface extraction for voxel chunks.
//!
//! [`ChunkMesher`] walks the solid cells of a chunk and emits one quad per
//! visible face into the stream of that face's texture. Two visibility
//! policies exist:
//!
//! - culling disabled: every face of every solid block is emitted
//! - culling enabled: a face is emitted only if the cell it looks into is
//!   air, outside the vertical world bounds, or in a neighbour chunk that
//!   is not loaded
//!
//! # Architecture
//! - `mesh/`: quads and per-texture vertex streams
//! - `neighborhood`: the voxel snapshots a build reads from
//!
//! Builds run on worker threads and never touch graphics-API state.

mod mesh;
mod neighborhood;

use cgmath::Point3;

pub use mesh::*;
pub use neighborhood::{ChunkNeighborhood, NEIGHBOR_OFFSETS};

use crate::engine_state::voxels::block::block_side::BlockSide;

/// Builds [`ChunkMeshData`] from a [`ChunkNeighborhood`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChunkMesher {
    /// Hide faces between two solid cells.
    pub culling: bool,
}

impl ChunkMesher {
    /// Creates a mesher with the given visibility policy.
    pub fn new(culling: bool) -> Self {
        ChunkMesher { culling }
    }

    /// Produces per-texture geometry for the centre chunk of `neighborhood`.
    ///
    /// Vertex positions are in world space.
    pub fn build(&self, neighborhood: &ChunkNeighborhood) -> ChunkMeshData {
        let mut mesh = ChunkMeshData::default();
        let (origin_x, origin_z) = neighborhood.coordinate.world_origin();

        for (position, block) in neighborhood.center().solid_blocks() {
            for side in BlockSide::all() {
                if self.culling {
                    let (dx, dy, dz) = side.offset();
                    if !neighborhood.is_exposed(position.x + dx, position.y + dy, position.z + dz) {
                        continue;
                    }
                }

                let Some(texture) = block.texture_for_side(side) else {
                    continue;
                };
                let origin = Point3::new(origin_x + position.x, position.y, origin_z + position.z);
                mesh.stream_mut(texture).push_face(&Face::new(origin, side));
            }
        }

        mesh
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine_state::voxels::{
        block::{block_type::BlockType, Block, BlockTexture},
        chunk::{ChunkCoordinate, VoxelGrid, CHUNK_DEPTH, CHUNK_WIDTH},
        generation::TerrainGenerator,
    };

    fn single_voxel() -> ChunkNeighborhood {
        let mut grid = VoxelGrid::empty();
        grid.set(8, 128, 8, Block::new(BlockType::STONE));
        ChunkNeighborhood::isolated(ChunkCoordinate::new(0, 0), Arc::new(grid))
    }

    #[test]
    fn single_voxel_emits_six_faces_either_way() {
        for culling in [true, false] {
            let mesh = ChunkMesher::new(culling).build(&single_voxel());
            assert_eq!(mesh.face_count(), 6);
            let stone = mesh.stream(BlockTexture::Stone).expect("stone stream");
            assert_eq!(stone.indices.len() / 3, 12);
            assert_eq!(stone.vertices.len(), 24);
        }
    }

    #[test]
    fn shared_faces_are_culled() {
        let mut grid = VoxelGrid::empty();
        grid.set(4, 10, 4, Block::new(BlockType::DIRT));
        grid.set(5, 10, 4, Block::new(BlockType::DIRT));
        let neighborhood = ChunkNeighborhood::isolated(ChunkCoordinate::new(0, 0), Arc::new(grid));

        assert_eq!(ChunkMesher::new(true).build(&neighborhood).face_count(), 10);
        assert_eq!(ChunkMesher::new(false).build(&neighborhood).face_count(), 12);
    }

    #[test]
    fn unculled_mesh_has_six_faces_per_block() {
        let generator = TerrainGenerator::new(42);
        let grid = generator.generate_voxels(ChunkCoordinate::new(1, -1));
        let solid = grid.solid_count();
        let neighborhood = ChunkNeighborhood::isolated(ChunkCoordinate::new(1, -1), Arc::new(grid));

        let mesh = ChunkMesher::new(false).build(&neighborhood);
        assert_eq!(mesh.face_count(), 6 * solid);
    }

    #[test]
    fn culled_terrain_keeps_only_exposed_faces() {
        let generator = TerrainGenerator::new(42);
        let coordinate = ChunkCoordinate::new(0, 0);
        let center = Arc::new(generator.generate_voxels(coordinate));
        let mut neighborhood = ChunkNeighborhood::isolated(coordinate, center.clone());
        for (dx, dz) in NEIGHBOR_OFFSETS {
            neighborhood = neighborhood.with_neighbor(
                dx,
                dz,
                Arc::new(generator.generate_voxels(coordinate.offset(dx, dz))),
            );
        }

        let mesh = ChunkMesher::new(true).build(&neighborhood);
        let expected: usize = center
            .solid_blocks()
            .map(|(p, _)| {
                BlockSide::all()
                    .into_iter()
                    .filter(|side| {
                        let (dx, dy, dz) = side.offset();
                        neighborhood.is_exposed(p.x + dx, p.y + dy, p.z + dz)
                    })
                    .count()
            })
            .sum();
        assert_eq!(mesh.face_count(), expected);
        assert!(mesh.face_count() < 6 * center.solid_count());
        // every column shows its top
        assert!(mesh.face_count() >= (CHUNK_WIDTH * CHUNK_DEPTH) as usize);
    }

    #[test]
    fn boundary_faces_follow_neighbour_loading() {
        let mut grid = VoxelGrid::empty();
        grid.set(0, 20, 7, Block::new(BlockType::SAND));
        let center = Arc::new(grid);
        let coordinate = ChunkCoordinate::new(-2, 3);

        let alone = ChunkNeighborhood::isolated(coordinate, center.clone());
        assert_eq!(ChunkMesher::new(true).build(&alone).face_count(), 6);

        let mut west = VoxelGrid::empty();
        west.set(CHUNK_WIDTH - 1, 20, 7, Block::new(BlockType::STONE));
        let loaded = ChunkNeighborhood::isolated(coordinate, center).with_neighbor(-1, 0, Arc::new(west));
        assert_eq!(ChunkMesher::new(true).build(&loaded).face_count(), 5);
    }

    #[test]
    fn vertices_are_in_world_space() {
        let mut grid = VoxelGrid::empty();
        grid.set(0, 0, 0, Block::new(BlockType::GRASS));
        let neighborhood = ChunkNeighborhood::isolated(ChunkCoordinate::new(-1, 2), Arc::new(grid));
        let mesh = ChunkMesher::new(false).build(&neighborhood);

        for (_, stream) in mesh.streams() {
            for vertex in &stream.vertices {
                let [x, y, z] = vertex.position;
                assert!((-16.0..=-15.0).contains(&x));
                assert!((0.0..=1.0).contains(&y));
                assert!((32.0..=33.0).contains(&z));
            }
        }
        assert_eq!(mesh.stream(BlockTexture::GrassTop).map(MeshStream::face_count), Some(1));
        assert_eq!(mesh.stream(BlockTexture::GrassBottom).map(MeshStream::face_count), Some(1));
        assert_eq!(mesh.stream(BlockTexture::GrassSide).map(MeshStream::face_count), Some(4));
    }
}
