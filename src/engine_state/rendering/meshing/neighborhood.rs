//! Voxel snapshots of a chunk and its four horizontal neighbours.
//!
//! Face culling needs to look one block past the chunk edge. The mesher gets
//! copy-on-write snapshots of the neighbours that are loaded at dispatch
//! time; missing neighbours read as exposed.

use std::sync::Arc;

use crate::engine_state::voxels::chunk::{
    ChunkCoordinate, VoxelGrid, CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH,
};

/// Horizontal neighbour offsets, in the order neighbours are stored.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// A chunk's voxels plus whichever neighbours were loaded.
#[derive(Clone, Debug)]
pub struct ChunkNeighborhood {
    /// The chunk being meshed.
    pub coordinate: ChunkCoordinate,
    center: Arc<VoxelGrid>,
    neighbors: [Option<Arc<VoxelGrid>>; 4],
}

impl ChunkNeighborhood {
    /// A chunk with no loaded neighbours.
    pub fn isolated(coordinate: ChunkCoordinate, center: Arc<VoxelGrid>) -> Self {
        ChunkNeighborhood {
            coordinate,
            center,
            neighbors: [None, None, None, None],
        }
    }

    /// Attaches the neighbour `(dx, dz)` chunks away. Offsets other than the
    /// four in [`NEIGHBOR_OFFSETS`] are ignored.
    pub fn with_neighbor(mut self, dx: i32, dz: i32, voxels: Arc<VoxelGrid>) -> Self {
        if let Some(slot) = Self::slot(dx, dz) {
            self.neighbors[slot] = Some(voxels);
        }
        self
    }

    fn slot(dx: i32, dz: i32) -> Option<usize> {
        NEIGHBOR_OFFSETS.iter().position(|offset| *offset == (dx, dz))
    }

    /// Returns `true` if the neighbour `(dx, dz)` chunks away is attached.
    pub fn has_neighbor(&self, dx: i32, dz: i32) -> bool {
        Self::slot(dx, dz).is_some_and(|slot| self.neighbors[slot].is_some())
    }

    /// The centre chunk's voxels.
    pub fn center(&self) -> &VoxelGrid {
        &self.center
    }

    /// Returns `true` if the cell at a position relative to the centre chunk
    /// does not occlude a face.
    ///
    /// Cells above or below the world, cells in unloaded neighbours and air
    /// cells are exposed. Horizontal positions outside the centre chunk are
    /// resolved with floor division so negative offsets land in the right
    /// neighbour.
    pub fn is_exposed(&self, x: i32, y: i32, z: i32) -> bool {
        if !(0..CHUNK_HEIGHT).contains(&y) {
            return true;
        }

        let chunk_dx = x.div_euclid(CHUNK_WIDTH);
        let chunk_dz = z.div_euclid(CHUNK_DEPTH);
        let (local_x, local_z) = (x.rem_euclid(CHUNK_WIDTH), z.rem_euclid(CHUNK_DEPTH));

        let grid = if (chunk_dx, chunk_dz) == (0, 0) {
            Some(&self.center)
        } else {
            Self::slot(chunk_dx, chunk_dz).and_then(|slot| self.neighbors[slot].as_ref())
        };

        match grid {
            Some(grid) => !grid.get(local_x, y, local_z).is_solid(),
            None => true,
        }
    }
}
