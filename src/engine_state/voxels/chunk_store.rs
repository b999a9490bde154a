//! # Chunk Store
//!
//! Owns the loaded chunk set and drives the streaming state machine:
//!
//! ```text
//! absent -> loading -> generated (mesh pending) -> mesh built -> uploaded
//!    ^                                                              |
//!    +----------------- evicted (GPU meshes released first) --------+
//! ```
//!
//! ## Update step
//!
//! Given the observer's chunk coordinate and a retention radius `R`:
//!
//! 1. Every loaded chunk more than `R` chunks away on either axis is evicted.
//!    The eviction callback runs before the map entry is removed so GPU
//!    resources are released first.
//! 2. Every coordinate in the inclusive `(2R + 1)²` square is visited. An
//!    absent coordinate gets a placeholder inserted and generation dispatched
//!    in that order, so a coordinate is never generated twice. A generated
//!    chunk that needs a rebuild and has no build in flight gets meshing
//!    dispatched.
//!
//! Tasks that finish for an evicted chunk write into the detached chunk and
//! are dropped with it. Nothing is cancelled.

use std::sync::Arc;

use log::{debug, trace, warn};

use crate::{
    core::MtResource,
    engine_state::{
        rendering::{
            meshing::{ChunkMeshData, ChunkMesher},
            tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask,
        },
        task_management::{task::TaskStatistics, TaskManager},
        voxels::{
            chunk::{Chunk, ChunkCoordinate, MAX_RENDER_DISTANCE},
            generation::TerrainGenerator,
            tasks::chunk_generation_task::ChunkGenerationTask,
            world::World,
        },
    },
};

/// Streams chunks in and out around an observer.
pub struct ChunkStore {
    world: MtResource<World>,
    generator: Arc<TerrainGenerator>,
    mesher: ChunkMesher,
    render_distance: u32,
    task_manager: TaskManager,
    center: Option<ChunkCoordinate>,
}

impl ChunkStore {
    /// Creates an empty store.
    ///
    /// # Arguments
    /// * `generator` - Terrain source for new chunks
    /// * `render_distance` - Retention radius `R`, in chunks, capped at
    ///   [`MAX_RENDER_DISTANCE`]
    /// * `mesher` - Visibility policy for chunk meshes
    /// * `task_manager` - Worker pool for generation and meshing
    pub fn new(
        generator: TerrainGenerator,
        render_distance: u32,
        mesher: ChunkMesher,
        task_manager: TaskManager,
    ) -> Self {
        if render_distance > MAX_RENDER_DISTANCE {
            warn!("Render distance {render_distance} exceeds {MAX_RENDER_DISTANCE}, capping it");
        }
        let render_distance = render_distance.min(MAX_RENDER_DISTANCE);

        ChunkStore {
            world: MtResource::new(World::new()),
            generator: Arc::new(generator),
            mesher,
            render_distance,
            task_manager,
            center: None,
        }
    }

    /// Advances streaming for an observer in chunk `center`.
    ///
    /// Never blocks on workers. `on_evict` is called for every evicted
    /// coordinate while its chunk is still in the map.
    pub fn update(&mut self, center: ChunkCoordinate, mut on_evict: impl FnMut(ChunkCoordinate)) {
        self.task_manager.process_completed_tasks();

        if self.center != Some(center) {
            debug!("Observer entered chunk {:?}", center);
            self.center = Some(center);
        }

        self.evict_outside(center, &mut on_evict);

        for coordinate in ChunkCoordinate::square(center, self.render_distance) {
            let placeholder = self.world.get_mut().insert_placeholder(coordinate);
            match placeholder {
                Some(chunk) => self.dispatch_generation(coordinate, chunk),
                None => self.dispatch_meshing(coordinate),
            }
        }

        self.task_manager.process_queued_tasks();
    }

    fn evict_outside(&mut self, center: ChunkCoordinate, on_evict: &mut impl FnMut(ChunkCoordinate)) {
        let evicted: Vec<ChunkCoordinate> = self
            .world
            .get()
            .coordinates()
            .filter(|coordinate| !coordinate.is_within(center, self.render_distance))
            .collect();

        for coordinate in evicted {
            on_evict(coordinate);
            self.world.get_mut().remove_chunk_at(coordinate);
            trace!("Evicted chunk {:?}", coordinate);
        }
    }

    fn dispatch_generation(&mut self, coordinate: ChunkCoordinate, chunk: MtResource<Chunk>) {
        trace!("Dispatching generation for {:?}", coordinate);
        self.task_manager.publish_task(Box::new(ChunkGenerationTask::new(
            self.generator.clone(),
            chunk,
            coordinate,
        )));
    }

    fn dispatch_meshing(&mut self, coordinate: ChunkCoordinate) {
        let Some(chunk) = self.world.get().get_chunk_at(coordinate) else {
            return;
        };
        let Some(snapshot) = chunk.get_mut().try_begin_mesh() else {
            return;
        };

        trace!("Dispatching meshing for {:?} at revision {}", coordinate, snapshot.revision);
        let neighborhood = self.world.get().neighborhood(coordinate, &snapshot);
        self.task_manager.publish_task(Box::new(ChunkMeshGenerationTask::new(
            self.mesher,
            chunk,
            neighborhood,
            snapshot.revision,
        )));
    }

    /// Takes the pending mesh data of every loaded chunk that has some.
    ///
    /// Each produced mesh is returned exactly once.
    pub fn take_pending_meshes(&self) -> Vec<(ChunkCoordinate, ChunkMeshData)> {
        let world = self.world.get();
        world
            .chunks()
            .filter_map(|(coordinate, chunk)| {
                chunk
                    .get_mut()
                    .take_pending_mesh()
                    .map(|mesh| (coordinate, mesh))
            })
            .collect()
    }

    /// Surface height of the world column at `(world_x, world_z)`.
    pub fn height_at(&self, world_x: i32, world_z: i32) -> i32 {
        self.generator.height_at(world_x, world_z)
    }

    /// The terrain generator.
    pub fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    /// Shared handle to the chunk map.
    pub fn world(&self) -> MtResource<World> {
        self.world.clone()
    }

    /// The chunk at `coordinate`, if loaded.
    pub fn get_chunk(&self, coordinate: ChunkCoordinate) -> Option<MtResource<Chunk>> {
        self.world.get().get_chunk_at(coordinate)
    }

    /// Loaded coordinates, sorted.
    pub fn loaded_coordinates(&self) -> Vec<ChunkCoordinate> {
        let mut coordinates: Vec<_> = self.world.get().coordinates().collect();
        coordinates.sort();
        coordinates
    }

    /// Retention radius in chunks.
    pub fn render_distance(&self) -> u32 {
        self.render_distance
    }

    /// Counters of completed work.
    pub fn statistics(&self) -> TaskStatistics {
        self.task_manager.statistics()
    }

    /// Returns `true` if no generation or meshing task is queued or running.
    pub fn is_idle(&self) -> bool {
        self.task_manager.is_idle()
    }

    /// Blocks until every dispatched task has finished.
    pub fn wait_until_idle(&mut self) {
        self.task_manager.wait_until_idle();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::{block_type::BlockType, Block};

    fn store(render_distance: u32) -> ChunkStore {
        ChunkStore::new(
            TerrainGenerator::new(42),
            render_distance,
            ChunkMesher::new(true),
            TaskManager::new(2),
        )
    }

    fn settle(store: &mut ChunkStore, center: ChunkCoordinate) {
        for _ in 0..3 {
            store.update(center, |_| {});
            store.wait_until_idle();
        }
    }

    #[test]
    fn update_does_not_double_dispatch_generation() {
        let mut store = store(1);
        let center = ChunkCoordinate::new(0, 0);
        store.update(center, |_| {});
        store.update(center, |_| {});
        store.wait_until_idle();

        assert_eq!(store.statistics().chunks_generated, 9);
    }

    #[test]
    fn unchanged_chunks_are_meshed_once() {
        let mut store = store(1);
        let center = ChunkCoordinate::new(3, -2);
        settle(&mut store, center);
        let meshed = store.statistics().meshes_built;
        assert_eq!(meshed, 9);

        store.take_pending_meshes();
        settle(&mut store, center);
        assert_eq!(store.statistics().meshes_built, meshed);
    }

    #[test]
    fn edited_chunk_is_remeshed() {
        let mut store = store(0);
        let center = ChunkCoordinate::new(0, 0);
        settle(&mut store, center);
        assert_eq!(store.take_pending_meshes().len(), 1);

        let chunk = store.get_chunk(center).expect("loaded");
        chunk.get_mut().set_block(8, 250, 8, Block::new(BlockType::STONE));
        settle(&mut store, center);

        let meshes = store.take_pending_meshes();
        assert_eq!(meshes.len(), 1);
        assert_eq!(store.statistics().meshes_built, 2);
        assert!(store.take_pending_meshes().is_empty());
    }

    #[test]
    fn eviction_runs_before_removal() {
        let mut store = store(1);
        settle(&mut store, ChunkCoordinate::new(0, 0));

        let world = store.world();
        let mut evicted = Vec::new();
        store.update(ChunkCoordinate::new(2, 0), |coordinate| {
            assert!(world.get().contains(coordinate));
            evicted.push(coordinate);
        });
        evicted.sort();

        assert_eq!(
            evicted,
            vec![
                ChunkCoordinate::new(-1, -1),
                ChunkCoordinate::new(-1, 0),
                ChunkCoordinate::new(-1, 1),
                ChunkCoordinate::new(0, -1),
                ChunkCoordinate::new(0, 0),
                ChunkCoordinate::new(0, 1),
            ]
        );
        assert!(!world.get().contains(ChunkCoordinate::new(0, 0)));
        store.wait_until_idle();
    }

    #[test]
    fn oversized_render_distance_is_capped() {
        let store = ChunkStore::new(
            TerrainGenerator::new(1),
            u32::MAX,
            ChunkMesher::new(false),
            TaskManager::new(1),
        );
        assert_eq!(store.render_distance(), MAX_RENDER_DISTANCE);
        assert!(store.loaded_coordinates().is_empty());
    }

    #[test]
    fn height_query_matches_generator() {
        let store = store(0);
        assert_eq!(store.height_at(10, -20), TerrainGenerator::new(42).height_at(10, -20));
    }
}
