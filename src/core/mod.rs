//! # Core Module
//!
//! Shared-state primitives used by the streaming pipeline.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted resource with read-write locking.
//!   Chunks, the world map and the voxel snapshots handed to workers all travel
//!   through this type.
//!
//! ## Usage
//! ```rust
//! use voxel_terrain::core::MtResource;
//!
//! let counter = MtResource::new(0);
//! *counter.get_mut() += 1;
//! assert_eq!(*counter.get(), 1);
//! ```

pub mod mt_resource;

pub use mt_resource::MtResource;
