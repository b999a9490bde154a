//! Mesh data structures for voxel rendering.
//!
//! - [`Face`]: one unit quad of a voxel, with outward winding
//! - [`MeshStream`]: indexed vertex stream for a single texture
//! - [`ChunkMeshData`]: per-texture streams for one chunk

mod face;
mod mesh;

pub use face::Face;
pub use mesh::*;
