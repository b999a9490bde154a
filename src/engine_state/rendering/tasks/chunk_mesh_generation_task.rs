//! Task for generating mesh data for chunks in a background thread.
//!
//! The task meshes a voxel snapshot taken on the main thread, then publishes
//! the result into the chunk's pending slot under the chunk lock. The render
//! thread picks it up from there during upload.

use log::debug;

use crate::{
    core::MtResource,
    engine_state::{
        rendering::meshing::{ChunkMesher, ChunkNeighborhood},
        task_management::task::{Task, TaskResult, TaskStatistics},
        voxels::chunk::{Chunk, ChunkCoordinate},
    },
};

/// A task that generates mesh data for a chunk in a background thread.
pub struct ChunkMeshGenerationTask {
    mesher: ChunkMesher,
    /// The chunk that receives the mesh
    chunk: MtResource<Chunk>,
    /// Voxels of the chunk and its loaded neighbours at dispatch time
    neighborhood: ChunkNeighborhood,
    /// Chunk revision the snapshot was taken at
    revision: u64,
}

impl ChunkMeshGenerationTask {
    /// Creates a new chunk mesh generation task.
    ///
    /// # Arguments
    /// * `mesher` - Visibility policy to build with
    /// * `chunk` - The chunk that needs mesh generation
    /// * `neighborhood` - Snapshot of the chunk and its neighbours
    /// * `revision` - Revision of the chunk when the snapshot was taken
    pub fn new(
        mesher: ChunkMesher,
        chunk: MtResource<Chunk>,
        neighborhood: ChunkNeighborhood,
        revision: u64,
    ) -> Self {
        ChunkMeshGenerationTask {
            mesher,
            chunk,
            neighborhood,
            revision,
        }
    }
}

/// Releases the chunk's meshing claim if the build unwinds before publishing.
struct MeshClaim<'a> {
    chunk: &'a MtResource<Chunk>,
    published: bool,
}

impl Drop for MeshClaim<'_> {
    fn drop(&mut self) {
        if !self.published {
            self.chunk.get_mut().abort_mesh();
        }
    }
}

impl Task for ChunkMeshGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let mut claim = MeshClaim {
            chunk: &self.chunk,
            published: false,
        };
        let mesh = self.mesher.build(&self.neighborhood);
        let faces = mesh.face_count();
        self.chunk.get_mut().set_pending_mesh(mesh, self.revision);
        claim.published = true;

        Box::new(ChunkMeshGenerationTaskResult {
            coordinate: self.neighborhood.coordinate,
            faces,
        })
    }
}

/// The result of a chunk mesh generation task.
pub struct ChunkMeshGenerationTaskResult {
    coordinate: ChunkCoordinate,
    faces: usize,
}

impl TaskResult for ChunkMeshGenerationTaskResult {
    fn handle_result(self: Box<Self>, statistics: &mut TaskStatistics) {
        statistics.meshes_built += 1;
        statistics.faces_built += self.faces as u64;
        debug!(
            "Meshed chunk {:?} with {} faces",
            self.coordinate, self.faces
        );
    }
}
