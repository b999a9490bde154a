//! # Voxel World
//!
//! Voxel data and its lifecycle.
//!
//! * **Block**: block materials, faces and the face → texture table
//! * **Chunk**: fixed-size voxel columns with rebuild bookkeeping
//! * **Generation**: seeded height-field terrain
//! * **World**: the map of loaded chunks
//! * **ChunkStore**: load/unload by distance and rebuild scheduling
//! * **Tasks**: chunk generation on the worker pool
//!
//! ## Data Flow
//!
//! 1. The chunk store decides which coordinates must exist around the observer
//! 2. Placeholders are inserted and generation is dispatched to workers
//! 3. Generated chunks that need a rebuild get meshing dispatched
//! 4. Meshes wait in the chunk until the render thread uploads them

pub mod block;
pub mod chunk;
pub mod chunk_store;
pub mod generation;
pub mod tasks;
pub mod world;
