//! # Chunk Generation Task
//!
//! Fills a placeholder chunk with terrain on a worker thread. The voxels are
//! generated without holding the chunk lock; the lock is taken only to
//! install the finished grid.

use std::sync::Arc;

use log::debug;

use crate::{
    core::MtResource,
    engine_state::{
        task_management::task::{Task, TaskResult, TaskStatistics},
        voxels::{
            chunk::{Chunk, ChunkCoordinate},
            generation::TerrainGenerator,
        },
    },
};

/// A task that generates chunk data asynchronously.
pub struct ChunkGenerationTask {
    /// Shared, read-only terrain generator
    generator: Arc<TerrainGenerator>,
    /// The placeholder to fill
    chunk: MtResource<Chunk>,
    /// The position of the chunk to generate (in chunk coordinates)
    coordinate: ChunkCoordinate,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// # Arguments
    /// * `generator` - The terrain generator
    /// * `chunk` - The placeholder inserted for `coordinate`
    /// * `coordinate` - The chunk coordinates where the chunk should be generated
    pub fn new(generator: Arc<TerrainGenerator>, chunk: MtResource<Chunk>, coordinate: ChunkCoordinate) -> Self {
        ChunkGenerationTask {
            generator,
            chunk,
            coordinate,
        }
    }
}

impl Task for ChunkGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let voxels = self.generator.generate_voxels(self.coordinate);
        let solid_blocks = voxels.solid_count();
        let installed = self.chunk.get_mut().install_generated(voxels);

        Box::new(ChunkGenerationTaskResult {
            coordinate: self.coordinate,
            solid_blocks,
            installed,
        })
    }
}

/// The result of a chunk generation task.
pub struct ChunkGenerationTaskResult {
    coordinate: ChunkCoordinate,
    solid_blocks: usize,
    installed: bool,
}

impl TaskResult for ChunkGenerationTaskResult {
    fn handle_result(self: Box<Self>, statistics: &mut TaskStatistics) {
        if self.installed {
            statistics.chunks_generated += 1;
            debug!(
                "Generated chunk {:?} with {} solid blocks",
                self.coordinate, self.solid_blocks
            );
        }
    }
}
