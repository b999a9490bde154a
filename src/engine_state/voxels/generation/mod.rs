//! # Terrain Generation
//!
//! Deterministic height-field terrain. [`NoiseField`] is the seeded smooth
//! noise primitive; [`TerrainGenerator`] layers it into surface heights and
//! fills chunk voxel grids.

pub mod height_map;
pub mod noise_field;

pub use height_map::{OctaveNoise, TerrainGenerator, TerrainParameters, WATER_LEVEL};
pub use noise_field::NoiseField;
