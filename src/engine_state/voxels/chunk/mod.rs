//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a fixed-size column of voxels plus
//! the bookkeeping the streaming pipeline needs to generate it once, mesh it
//! whenever it changes, and hand the mesh to the render thread.
//!
//! ## Storage
//!
//! Blocks live in a dense [`VoxelGrid`] indexed `x + z * W + y * W * D`.
//! The grid sits behind an `Arc` so a meshing task can take a snapshot
//! without holding the chunk lock for the duration of the build. Writes go
//! through `Arc::make_mut`, so a mutation during meshing copies the grid
//! instead of racing the reader.
//!
//! ## Bounds
//!
//! Coordinates outside `[0, W) × [0, H) × [0, D)` read as air and writes
//! there are ignored. Neighbour and face logic relies on this instead of
//! checking bounds at every call site.
//!
//! ## Lifecycle
//!
//! 1. Created as an all-air placeholder (`ChunkStatus::Loading`).
//! 2. Filled exactly once by `install_generated`.
//! 3. Meshed whenever `needs_rebuild` is set and no build is in flight.
//! 4. Pending mesh data is taken exactly once by the upload step.

use std::sync::Arc;

use super::block::Block;
use crate::engine_state::rendering::meshing::ChunkMeshData;

pub mod chunk_coordinate;
pub mod chunk_iteration;

pub use chunk_coordinate::{ChunkCoordinate, MAX_RENDER_DISTANCE};
use chunk_iteration::ChunkBlockIterator;

/// Chunk extent along X, in blocks.
pub const CHUNK_WIDTH: i32 = 16;
/// Chunk extent along Y, in blocks. Chunks span the whole world height.
pub const CHUNK_HEIGHT: i32 = 256;
/// Chunk extent along Z, in blocks.
pub const CHUNK_DEPTH: i32 = 16;
/// The total number of blocks in a chunk.
pub const CHUNK_VOLUME: usize = (CHUNK_WIDTH * CHUNK_HEIGHT * CHUNK_DEPTH) as usize;

/// Dense block storage for one chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelGrid {
    blocks: Vec<Block>,
}

impl Default for VoxelGrid {
    fn default() -> Self {
        Self::empty()
    }
}

impl VoxelGrid {
    /// A grid with every cell set to air.
    pub fn empty() -> Self {
        VoxelGrid {
            blocks: vec![Block::AIR; CHUNK_VOLUME],
        }
    }

    /// Returns `true` if the local coordinate lies inside the grid.
    pub fn in_bounds(x: i32, y: i32, z: i32) -> bool {
        (0..CHUNK_WIDTH).contains(&x) && (0..CHUNK_HEIGHT).contains(&y) && (0..CHUNK_DEPTH).contains(&z)
    }

    fn index(x: i32, y: i32, z: i32) -> Option<usize> {
        if Self::in_bounds(x, y, z) {
            Some((x + z * CHUNK_WIDTH + y * CHUNK_WIDTH * CHUNK_DEPTH) as usize)
        } else {
            None
        }
    }

    /// Block at a local coordinate. Out-of-bounds reads return air.
    pub fn get(&self, x: i32, y: i32, z: i32) -> Block {
        Self::index(x, y, z).map_or(Block::AIR, |index| self.blocks[index])
    }

    /// Writes a block at a local coordinate.
    ///
    /// # Returns
    /// `false` (and no change) if the coordinate is out of bounds.
    pub fn set(&mut self, x: i32, y: i32, z: i32, block: Block) -> bool {
        match Self::index(x, y, z) {
            Some(index) => {
                self.blocks[index] = block;
                true
            }
            None => false,
        }
    }

    /// Raw blocks in storage order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Iterates the filled cells of the grid.
    pub fn solid_blocks(&self) -> ChunkBlockIterator<'_> {
        ChunkBlockIterator::new(self)
    }

    /// Number of non-air cells.
    pub fn solid_count(&self) -> usize {
        self.blocks.iter().filter(|block| block.is_solid()).count()
    }
}

/// Where a chunk is in its generation lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChunkStatus {
    /// Placeholder inserted, generation dispatched but not yet installed.
    Loading,
    /// Voxel data installed. Meshing may be dispatched.
    Generated,
}

/// A voxel snapshot handed to a meshing task, tagged with the revision it
/// was taken at.
#[derive(Clone, Debug)]
pub struct MeshSnapshot {
    /// Copy-on-write handle to the chunk's voxels.
    pub voxels: Arc<VoxelGrid>,
    /// Chunk revision at the time of the snapshot.
    pub revision: u64,
}

/// One column of the voxel world and its meshing state.
#[derive(Debug)]
pub struct Chunk {
    /// The position of this chunk in chunk coordinates.
    pub coordinate: ChunkCoordinate,
    voxels: Arc<VoxelGrid>,
    status: ChunkStatus,
    needs_rebuild: bool,
    mesh_in_flight: bool,
    /// Bumped on every voxel mutation.
    revision: u64,
    pending_mesh: Option<ChunkMeshData>,
}

impl Chunk {
    /// Creates an all-air placeholder that still has to be generated.
    pub fn new(coordinate: ChunkCoordinate) -> Self {
        Chunk {
            coordinate,
            voxels: Arc::new(VoxelGrid::empty()),
            status: ChunkStatus::Loading,
            needs_rebuild: true,
            mesh_in_flight: false,
            revision: 0,
            pending_mesh: None,
        }
    }

    /// Reads a block at a local coordinate. Out-of-bounds reads return air.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Block {
        self.voxels.get(x, y, z)
    }

    /// Writes a block at a local coordinate and flags the chunk for rebuild.
    ///
    /// Out-of-bounds writes are ignored and leave every flag untouched.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block: Block) {
        if !VoxelGrid::in_bounds(x, y, z) {
            return;
        }
        Arc::make_mut(&mut self.voxels).set(x, y, z, block);
        self.revision += 1;
        self.needs_rebuild = true;
    }

    /// Installs generated voxel data into a placeholder.
    ///
    /// Generation happens exactly once per chunk; a second install is ignored.
    ///
    /// # Returns
    /// `true` if the data was installed.
    pub fn install_generated(&mut self, voxels: VoxelGrid) -> bool {
        if self.status == ChunkStatus::Generated {
            return false;
        }
        self.voxels = Arc::new(voxels);
        self.status = ChunkStatus::Generated;
        self.revision += 1;
        self.needs_rebuild = true;
        true
    }

    /// Current lifecycle status.
    pub fn status(&self) -> ChunkStatus {
        self.status
    }

    /// Returns `true` once generated voxel data has been installed.
    pub fn is_generated(&self) -> bool {
        self.status == ChunkStatus::Generated
    }

    /// Returns `true` if the voxels changed since the last produced mesh.
    pub fn needs_rebuild(&self) -> bool {
        self.needs_rebuild
    }

    /// Returns `true` while a meshing task for this chunk is running.
    pub fn is_mesh_in_flight(&self) -> bool {
        self.mesh_in_flight
    }

    /// Current voxel revision.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Shared handle to the current voxels.
    pub fn voxels(&self) -> Arc<VoxelGrid> {
        self.voxels.clone()
    }

    /// Claims the right to mesh this chunk.
    ///
    /// Succeeds only for a generated chunk that needs a rebuild and has no
    /// build already running. The flag stays set until the mesh is produced,
    /// so a later call returns `None` instead of duplicating the build.
    pub fn try_begin_mesh(&mut self) -> Option<MeshSnapshot> {
        if !self.is_generated() || !self.needs_rebuild || self.mesh_in_flight {
            return None;
        }
        self.mesh_in_flight = true;
        Some(MeshSnapshot {
            voxels: self.voxels.clone(),
            revision: self.revision,
        })
    }

    /// Publishes mesh data built from the snapshot taken at `revision`.
    ///
    /// Replaces any pending mesh that was never uploaded. `needs_rebuild` is
    /// cleared only if no mutation happened since the snapshot, so an edit
    /// made during meshing schedules another build.
    pub fn set_pending_mesh(&mut self, mesh: ChunkMeshData, revision: u64) {
        self.pending_mesh = Some(mesh);
        self.mesh_in_flight = false;
        if revision == self.revision {
            self.needs_rebuild = false;
        }
    }

    /// Takes the pending mesh data, leaving the slot empty.
    pub fn take_pending_mesh(&mut self) -> Option<ChunkMeshData> {
        self.pending_mesh.take()
    }

    /// Releases the meshing claim of a build that never produced a mesh.
    ///
    /// `needs_rebuild` is left raised so the next update dispatches again.
    pub fn abort_mesh(&mut self) {
        self.mesh_in_flight = false;
    }

    /// Returns `true` if a produced mesh is waiting for upload.
    pub fn has_pending_mesh(&self) -> bool {
        self.pending_mesh.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    fn stone() -> Block {
        Block::new(BlockType::STONE)
    }

    #[test]
    fn out_of_bounds_reads_are_air() {
        let mut grid = VoxelGrid::empty();
        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_DEPTH {
                grid.set(x, 0, z, stone());
                grid.set(x, CHUNK_HEIGHT - 1, z, stone());
            }
        }
        let mut chunk = Chunk::new(ChunkCoordinate::new(0, 0));
        chunk.install_generated(grid);

        for (x, y, z) in [
            (-1, 0, 0),
            (CHUNK_WIDTH, 0, 0),
            (0, -1, 0),
            (0, CHUNK_HEIGHT, 0),
            (0, 0, -1),
            (0, 0, CHUNK_DEPTH),
            (i32::MIN, i32::MAX, 3),
        ] {
            assert_eq!(chunk.get_block(x, y, z), Block::AIR);
        }
    }

    #[test]
    fn out_of_bounds_writes_change_nothing() {
        let mut chunk = Chunk::new(ChunkCoordinate::new(2, -3));
        chunk.install_generated(VoxelGrid::empty());
        chunk.set_pending_mesh(ChunkMeshData::default(), chunk.revision());
        let before = chunk.voxels();
        let revision = chunk.revision();

        chunk.set_block(CHUNK_WIDTH, 10, 0, stone());
        chunk.set_block(0, -1, 0, stone());
        chunk.set_block(0, 10, CHUNK_DEPTH, stone());

        assert_eq!(*chunk.voxels(), *before);
        assert_eq!(chunk.revision(), revision);
        assert!(!chunk.needs_rebuild());
    }

    #[test]
    fn placeholder_needs_rebuild_but_cannot_mesh_until_generated() {
        let mut chunk = Chunk::new(ChunkCoordinate::new(0, 0));
        assert!(chunk.needs_rebuild());
        assert_eq!(chunk.status(), ChunkStatus::Loading);
        assert!(chunk.try_begin_mesh().is_none());

        assert!(chunk.install_generated(VoxelGrid::empty()));
        assert!(!chunk.install_generated(VoxelGrid::empty()));
        assert!(chunk.try_begin_mesh().is_some());
    }

    #[test]
    fn only_one_mesh_build_in_flight() {
        let mut chunk = Chunk::new(ChunkCoordinate::new(0, 0));
        chunk.install_generated(VoxelGrid::empty());

        let snapshot = chunk.try_begin_mesh().expect("first claim");
        assert!(chunk.try_begin_mesh().is_none());

        chunk.set_pending_mesh(ChunkMeshData::default(), snapshot.revision);
        assert!(!chunk.needs_rebuild());
        assert!(chunk.has_pending_mesh());
        assert!(chunk.try_begin_mesh().is_none());
    }

    #[test]
    fn edit_during_meshing_is_not_lost() {
        let mut chunk = Chunk::new(ChunkCoordinate::new(0, 0));
        chunk.install_generated(VoxelGrid::empty());

        let snapshot = chunk.try_begin_mesh().expect("claim");
        chunk.set_block(1, 1, 1, stone());
        assert_eq!(snapshot.voxels.get(1, 1, 1), Block::AIR);

        chunk.set_pending_mesh(ChunkMeshData::default(), snapshot.revision);
        assert!(chunk.needs_rebuild());

        let second = chunk.try_begin_mesh().expect("rebuild after edit");
        assert_eq!(second.voxels.get(1, 1, 1), stone());
    }

    #[test]
    fn pending_mesh_is_taken_once() {
        let mut chunk = Chunk::new(ChunkCoordinate::new(0, 0));
        chunk.install_generated(VoxelGrid::empty());
        let snapshot = chunk.try_begin_mesh().expect("claim");
        chunk.set_pending_mesh(ChunkMeshData::default(), snapshot.revision);

        assert!(chunk.take_pending_mesh().is_some());
        assert!(chunk.take_pending_mesh().is_none());
        assert!(!chunk.has_pending_mesh());
    }
}
