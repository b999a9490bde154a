//! Rendering side of the streaming pipeline.
//!
//! Meshing runs on workers and produces plain vertex data; everything that
//! touches graphics-API state lives in [`upload`] and [`wgpu_backend`] and
//! runs on the render thread only.

pub mod meshing;
pub mod tasks;
pub mod texture;
pub mod upload;
mod vertex;
pub mod wgpu_backend;

pub use vertex::Vertex;
