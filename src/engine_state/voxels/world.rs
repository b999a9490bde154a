//! # World Module
//!
//! This module provides the `World` struct: the map from chunk coordinate to
//! loaded chunk.
//!
//! ## Architecture
//!
//! Only chunks near the observer are kept. Each chunk sits behind its own
//! `MtResource`, so a worker can fill or mesh one chunk while the main
//! thread reads or removes others. The map itself is shared as
//! `MtResource<World>`; it is written only by the chunk store.

use std::collections::HashMap;

use crate::core::MtResource;
use crate::engine_state::rendering::meshing::{ChunkNeighborhood, NEIGHBOR_OFFSETS};
use crate::engine_state::voxels::chunk::{Chunk, ChunkCoordinate, MeshSnapshot};

/// The loaded part of the voxel world.
///
/// # Examples
///
/// ```
/// use voxel_terrain::engine_state::voxels::{chunk::ChunkCoordinate, world::World};
///
/// let mut world = World::new();
/// assert!(world.insert_placeholder(ChunkCoordinate::new(0, 0)).is_some());
/// assert!(world.insert_placeholder(ChunkCoordinate::new(0, 0)).is_none());
/// assert_eq!(world.len(), 1);
/// ```
#[derive(Default)]
pub struct World {
    chunks: HashMap<ChunkCoordinate, MtResource<Chunk>>,
}

impl World {
    /// Creates a new, empty world.
    pub fn new() -> Self {
        World {
            chunks: HashMap::new(),
        }
    }

    /// Inserts an all-air placeholder if the coordinate is absent.
    ///
    /// # Returns
    /// The new chunk, or `None` if one was already loaded there.
    pub fn insert_placeholder(&mut self, coordinate: ChunkCoordinate) -> Option<MtResource<Chunk>> {
        if self.chunks.contains_key(&coordinate) {
            return None;
        }
        let chunk = MtResource::new(Chunk::new(coordinate));
        self.chunks.insert(coordinate, chunk.clone());
        Some(chunk)
    }

    /// The chunk at `coordinate`, if loaded.
    pub fn get_chunk_at(&self, coordinate: ChunkCoordinate) -> Option<MtResource<Chunk>> {
        self.chunks.get(&coordinate).cloned()
    }

    /// Returns `true` if a chunk (possibly a placeholder) is loaded there.
    pub fn contains(&self, coordinate: ChunkCoordinate) -> bool {
        self.chunks.contains_key(&coordinate)
    }

    /// Removes the chunk at `coordinate`.
    pub fn remove_chunk_at(&mut self, coordinate: ChunkCoordinate) -> Option<MtResource<Chunk>> {
        self.chunks.remove(&coordinate)
    }

    /// Loaded coordinates, in no particular order.
    pub fn coordinates(&self) -> impl Iterator<Item = ChunkCoordinate> + '_ {
        self.chunks.keys().copied()
    }

    /// Loaded chunks, in no particular order.
    pub fn chunks(&self) -> impl Iterator<Item = (ChunkCoordinate, &MtResource<Chunk>)> {
        self.chunks.iter().map(|(coordinate, chunk)| (*coordinate, chunk))
    }

    /// Number of loaded chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns `true` if nothing is loaded.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Pairs a mesh snapshot of the chunk at `coordinate` with snapshots of
    /// its generated horizontal neighbours.
    pub fn neighborhood(&self, coordinate: ChunkCoordinate, snapshot: &MeshSnapshot) -> ChunkNeighborhood {
        let mut neighborhood = ChunkNeighborhood::isolated(coordinate, snapshot.voxels.clone());
        for (dx, dz) in NEIGHBOR_OFFSETS {
            if let Some(neighbor) = self.chunks.get(&coordinate.offset(dx, dz)) {
                let neighbor = neighbor.get();
                if neighbor.is_generated() {
                    neighborhood = neighborhood.with_neighbor(dx, dz, neighbor.voxels());
                }
            }
        }
        neighborhood
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{
        block::{block_type::BlockType, Block},
        chunk::{VoxelGrid, CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH},
    };

    fn solid_grid() -> VoxelGrid {
        let mut grid = VoxelGrid::empty();
        for y in 0..CHUNK_HEIGHT {
            for z in 0..CHUNK_DEPTH {
                for x in 0..CHUNK_WIDTH {
                    grid.set(x, y, z, Block::new(BlockType::STONE));
                }
            }
        }
        grid
    }

    fn generate(world: &mut World, coordinate: ChunkCoordinate) {
        let chunk = world.insert_placeholder(coordinate).expect("absent");
        chunk.get_mut().install_generated(solid_grid());
    }

    #[test]
    fn neighborhood_attaches_only_generated_neighbors() {
        let center = ChunkCoordinate::new(0, 0);
        let mut world = World::new();
        generate(&mut world, center);
        generate(&mut world, center.offset(1, 0));
        generate(&mut world, center.offset(0, -1));
        world.insert_placeholder(center.offset(-1, 0)).expect("absent");

        let snapshot = world
            .get_chunk_at(center)
            .expect("loaded")
            .get_mut()
            .try_begin_mesh()
            .expect("claim");
        let neighborhood = world.neighborhood(center, &snapshot);

        assert!(neighborhood.has_neighbor(1, 0));
        assert!(neighborhood.has_neighbor(0, -1));
        assert!(!neighborhood.has_neighbor(-1, 0));
        assert!(!neighborhood.has_neighbor(0, 1));

        assert!(!neighborhood.is_exposed(CHUNK_WIDTH, 10, 3));
        assert!(!neighborhood.is_exposed(3, 10, -1));
        assert!(neighborhood.is_exposed(-1, 10, 3));
        assert!(neighborhood.is_exposed(3, 10, CHUNK_DEPTH));
    }
}
