//! # Engine State Module
//!
//! The streaming core: everything between an observer position and a set of
//! drawable chunk meshes.
//!
//! ## Key Components
//!
//! * `WorldStreamer` - Owns the chunk store and the upload pipeline
//! * `rendering` - Meshing, texture loading and GPU upload
//! * `task_management` - Worker pool for generation and meshing
//! * `voxels` - Blocks, chunks, terrain generation and the chunk store
//!
//! ## Frame Protocol
//!
//! Once per frame, on the render thread:
//!
//! 1. `update(observer)` evicts and dispatches work without blocking
//! 2. `upload_pending()` turns finished meshes into GPU objects
//! 3. `ready_meshes()` yields what to draw
//!
//! The caller owns camera, shaders and the render pass.

use cgmath::Point3;
use log::info;

use rendering::{
    texture::TextureLibrary,
    upload::{GpuBackend, UploadPipeline},
};
use task_management::{task::TaskStatistics, TaskManager};
use voxels::{
    block::BlockTexture,
    chunk::ChunkCoordinate,
    chunk_store::ChunkStore,
    generation::TerrainGenerator,
};

use crate::settings::Settings;
use rendering::meshing::ChunkMesher;

pub mod rendering;
pub mod task_management;
pub mod voxels;

/// Streams, generates, meshes and uploads the world around one observer.
///
/// Lives on the render thread. Worker threads only ever see chunk state,
/// never the upload pipeline.
pub struct WorldStreamer<B: GpuBackend> {
    store: ChunkStore,
    upload: UploadPipeline<B>,
}

impl<B: GpuBackend> WorldStreamer<B> {
    /// Builds a streamer from settings, uploading through `backend`.
    pub fn new(settings: &Settings, backend: B) -> Self {
        let seed = settings.resolved_seed();
        let workers = settings.worker_count();
        info!(
            "World seed {seed}, render distance {}, culling {}, {workers} workers",
            settings.render_distance,
            if settings.enable_culling { "on" } else { "off" }
        );

        let store = ChunkStore::new(
            TerrainGenerator::new(seed),
            settings.render_distance,
            ChunkMesher::new(settings.enable_culling),
            TaskManager::new(workers),
        );
        let textures = TextureLibrary::new(
            &settings.texture_directory,
            &settings.fallback_texture_directory,
        );

        Self::from_parts(store, UploadPipeline::new(backend, textures))
    }

    /// Assembles a streamer from an existing store and pipeline.
    pub fn from_parts(store: ChunkStore, upload: UploadPipeline<B>) -> Self {
        WorldStreamer { store, upload }
    }

    /// Streams chunks around an observer at world-space `observer`.
    ///
    /// Meshes of evicted chunks are released before the chunks are dropped.
    pub fn update(&mut self, observer: Point3<f32>) {
        let center = ChunkCoordinate::from_world_position(observer);
        let upload = &mut self.upload;
        self.store.update(center, |coordinate| upload.release_chunk(coordinate));
    }

    /// Uploads every mesh the workers have finished.
    ///
    /// # Returns
    /// Number of chunks whose meshes were replaced.
    pub fn upload_pending(&mut self) -> usize {
        self.upload.upload_pending(&self.store)
    }

    /// `update` followed by `upload_pending`.
    pub fn frame(&mut self, observer: Point3<f32>) -> usize {
        self.update(observer);
        self.upload_pending()
    }

    /// Every drawable `(chunk, texture, mesh)` triple.
    pub fn ready_meshes(&self) -> impl Iterator<Item = (ChunkCoordinate, BlockTexture, &B::Mesh)> {
        self.upload.ready_meshes()
    }

    /// Surface height of the world column at `(world_x, world_z)`.
    pub fn height_at(&self, world_x: i32, world_z: i32) -> i32 {
        self.store.height_at(world_x, world_z)
    }

    /// A position two blocks above the surface of column `(world_x, world_z)`.
    pub fn spawn_position(&self, world_x: i32, world_z: i32) -> Point3<f32> {
        Point3::new(
            world_x as f32 + 0.5,
            (self.height_at(world_x, world_z) + 2) as f32,
            world_z as f32 + 0.5,
        )
    }

    /// The chunk store.
    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    /// The upload pipeline.
    pub fn upload(&self) -> &UploadPipeline<B> {
        &self.upload
    }

    /// Counters of completed worker tasks.
    pub fn statistics(&self) -> TaskStatistics {
        self.store.statistics()
    }

    /// Blocks until every dispatched task has finished.
    pub fn wait_until_idle(&mut self) {
        self.store.wait_until_idle();
    }

    /// Releases every GPU mesh.
    pub fn cleanup(&mut self) {
        self.upload.release_all();
    }
}
