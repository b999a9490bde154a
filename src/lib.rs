//! # Voxel Terrain
//!
//! Terrain generation and chunk meshing for a streamed voxel world.
//!
//! The crate keeps a square of chunks loaded around a moving observer,
//! generates their terrain and meshes on a worker pool, and uploads the
//! meshes to the GPU on the render thread.
//!
//! ## Key Modules
//!
//! * `core` - Shared-state primitives
//! * `engine_state` - The streaming pipeline: voxels, meshing, upload and tasks
//! * `settings` - JSON configuration with documented defaults
//!
//! ## Usage
//!
//! ```rust,no_run
//! use voxel_terrain::{engine_state::rendering::upload::HeadlessBackend, Settings, WorldStreamer};
//!
//! let settings = Settings::load("settings.json");
//! let mut streamer = WorldStreamer::new(&settings, HeadlessBackend::default());
//! let observer = streamer.spawn_position(0, 0);
//!
//! // once per frame
//! streamer.frame(observer);
//! for (_chunk, _texture, _mesh) in streamer.ready_meshes() {
//!     // draw
//! }
//! ```

use cgmath::Point3;
use log::{info, warn};

use engine_state::rendering::{
    upload::{GpuBackend, HeadlessBackend},
    wgpu_backend::WgpuBackend,
};

pub mod core;
pub mod engine_state;
pub mod settings;

pub use engine_state::WorldStreamer;
pub use settings::Settings;

/// Blocks walked along +X by the demo observer.
const DEMO_WALK_DISTANCE: f32 = 48.0;
/// Blocks walked per demo frame.
const DEMO_STEP: f32 = 0.5;

/// Runs the streaming demo: loads settings, walks an observer across chunk
/// borders and logs what was generated, meshed and uploaded.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");
    let settings = Settings::load(settings::DEFAULT_SETTINGS_PATH);

    match pollster::block_on(WgpuBackend::new_headless()) {
        Ok(backend) => stream_demo(&settings, backend),
        Err(err) => {
            warn!("{err}; uploading to a headless backend instead");
            stream_demo(&settings, HeadlessBackend::default());
        }
    }
}

fn stream_demo<B: GpuBackend>(settings: &Settings, backend: B) {
    let mut streamer = WorldStreamer::new(settings, backend);
    let spawn = streamer.spawn_position(0, 0);
    info!("Spawning observer at {:?}", spawn);

    let mut uploaded = 0;
    let mut walked = 0.0;
    while walked <= DEMO_WALK_DISTANCE {
        let observer = Point3::new(spawn.x + walked, spawn.y, spawn.z);
        uploaded += streamer.frame(observer);
        walked += DEMO_STEP;
    }

    let observer = Point3::new(spawn.x + DEMO_WALK_DISTANCE, spawn.y, spawn.z);
    streamer.wait_until_idle();
    uploaded += streamer.frame(observer);
    streamer.wait_until_idle();
    uploaded += streamer.upload_pending();

    let statistics = streamer.statistics();
    info!(
        "Loaded {} chunks, {} drawable meshes; generated {}, meshed {} ({} faces), uploaded {}",
        streamer.store().loaded_coordinates().len(),
        streamer.ready_meshes().count(),
        statistics.chunks_generated,
        statistics.meshes_built,
        statistics.faces_built,
        uploaded
    );

    streamer.cleanup();
}
