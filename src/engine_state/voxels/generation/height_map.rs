//! # Height Map Generator
//!
//! Turns three octave-noise layers into a per-column surface height and fills
//! chunk columns from it. The height field is never stored: it is a pure
//! function of `(seed, world x, world z)`, recomputed for generation and for
//! spawn queries alike.
//!
//! ## Layers
//!
//! * **base** - low frequency, moderate amplitude. Rolling hills.
//! * **detail** - higher frequency, small amplitude, sampled at a fixed
//!   coordinate shift so it does not line up with the base layer.
//! * **mountain** - very low frequency. Values below a threshold are dropped
//!   and the remainder is rescaled, so mountains are rare.

use noise::NoiseFn;

use super::noise_field::NoiseField;
use crate::engine_state::voxels::{
    block::{block_type::BlockType, Block},
    chunk::{ChunkCoordinate, VoxelGrid, CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH},
};

/// Height of the water line. Surfaces at or above it are grass, below it sand.
pub const WATER_LEVEL: i32 = 32;

/// Number of dirt cells between the surface block and the stone below.
pub const DIRT_DEPTH: i32 = 4;

/// Fractal sum of a noise source over `octaves` doublings of frequency.
///
/// The sum is divided by the total amplitude used, so the output range
/// matches the source's range.
#[derive(Clone, Debug)]
pub struct OctaveNoise<N> {
    source: N,
    /// Frequency of the first octave, in cycles per block.
    pub frequency: f64,
    /// Number of samples summed.
    pub octaves: u32,
    /// Amplitude multiplier between successive octaves.
    pub persistence: f64,
    /// World-space shift applied before scaling.
    pub offset: [f64; 2],
}

impl<N: NoiseFn<f64, 2>> OctaveNoise<N> {
    /// Wraps `source` with the given octave settings.
    pub fn new(source: N, frequency: f64, octaves: u32, persistence: f64) -> Self {
        OctaveNoise {
            source,
            frequency,
            octaves,
            persistence,
            offset: [0.0, 0.0],
        }
    }

    /// Shifts every sample by `offset` world units.
    pub fn with_offset(mut self, offset: [f64; 2]) -> Self {
        self.offset = offset;
        self
    }

    /// Normalized octave sum at world position `(x, z)`.
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut amplitude_sum = 0.0;
        let mut frequency = self.frequency;

        for _ in 0..self.octaves {
            let point = [(x + self.offset[0]) * frequency, (z + self.offset[1]) * frequency];
            total += self.source.get(point) * amplitude;
            amplitude_sum += amplitude;
            amplitude *= self.persistence;
            frequency *= 2.0;
        }

        if amplitude_sum == 0.0 {
            0.0
        } else {
            total / amplitude_sum
        }
    }
}

/// Settings of one noise layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerParameters {
    pub frequency: f64,
    pub octaves: u32,
    pub persistence: f64,
    /// Height contribution, in blocks, of a normalized value of `1.0`.
    pub amplitude: f64,
}

/// Tunables of the terrain shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainParameters {
    pub water_level: i32,
    pub base: LayerParameters,
    pub detail: LayerParameters,
    pub detail_offset: [f64; 2],
    pub mountain: LayerParameters,
    /// Normalized mountain values below this contribute nothing.
    pub mountain_threshold: f64,
}

impl Default for TerrainParameters {
    fn default() -> Self {
        TerrainParameters {
            water_level: WATER_LEVEL,
            base: LayerParameters {
                frequency: 1.0 / 64.0,
                octaves: 4,
                persistence: 0.5,
                amplitude: 10.0,
            },
            detail: LayerParameters {
                frequency: 1.0 / 16.0,
                octaves: 2,
                persistence: 0.5,
                amplitude: 3.0,
            },
            detail_offset: [1043.37, -711.19],
            mountain: LayerParameters {
                frequency: 1.0 / 256.0,
                octaves: 3,
                persistence: 0.5,
                amplitude: 48.0,
            },
            mountain_threshold: 0.35,
        }
    }
}

/// Seeded terrain generator.
///
/// Shared read-only between worker threads; every method takes `&self`.
#[derive(Clone, Debug)]
pub struct TerrainGenerator {
    parameters: TerrainParameters,
    base: OctaveNoise<NoiseField>,
    detail: OctaveNoise<NoiseField>,
    mountain: OctaveNoise<NoiseField>,
}

impl TerrainGenerator {
    /// Creates a generator with the default terrain shape.
    pub fn new(seed: u64) -> Self {
        Self::with_parameters(seed, TerrainParameters::default())
    }

    /// Creates a generator with custom terrain shape.
    ///
    /// Each layer gets its own permutation table derived from `seed`.
    pub fn with_parameters(seed: u64, parameters: TerrainParameters) -> Self {
        let layer = |salt: u64, settings: &LayerParameters| {
            OctaveNoise::new(
                NoiseField::new(seed.wrapping_add(salt)),
                settings.frequency,
                settings.octaves,
                settings.persistence,
            )
        };

        TerrainGenerator {
            parameters,
            base: layer(0, &parameters.base),
            detail: layer(1, &parameters.detail).with_offset(parameters.detail_offset),
            mountain: layer(2, &parameters.mountain),
        }
    }

    /// Surface height of the world column at `(world_x, world_z)`.
    ///
    /// Always within `[0, CHUNK_HEIGHT - 1]`.
    pub fn height_at(&self, world_x: i32, world_z: i32) -> i32 {
        let (x, z) = (world_x as f64, world_z as f64);
        let p = &self.parameters;

        let base = self.base.sample(x, z) * p.base.amplitude;
        let detail = self.detail.sample(x, z) * p.detail.amplitude;

        let mountain = self.mountain.sample(x, z);
        let mountain = if mountain < p.mountain_threshold {
            0.0
        } else {
            (mountain - p.mountain_threshold) / (1.0 - p.mountain_threshold) * p.mountain.amplitude
        };

        let height = (p.water_level as f64 + base + detail + mountain).floor() as i32;
        height.clamp(0, CHUNK_HEIGHT - 1)
    }

    /// Material of the cell at height `y` in a column whose surface is `height`.
    pub fn block_type_at(&self, y: i32, height: i32) -> BlockType {
        if y > height {
            BlockType::AIR
        } else if y == height {
            if height >= self.parameters.water_level {
                BlockType::GRASS
            } else {
                BlockType::SAND
            }
        } else if y > height - (DIRT_DEPTH + 1) {
            BlockType::DIRT
        } else {
            BlockType::STONE
        }
    }

    /// Fills a voxel grid for the chunk at `coordinate`.
    ///
    /// Every cell from the bottom of the world up to and including the
    /// column's surface is filled; everything above is air.
    pub fn generate_voxels(&self, coordinate: ChunkCoordinate) -> VoxelGrid {
        let mut grid = VoxelGrid::empty();
        let (origin_x, origin_z) = coordinate.world_origin();

        for z in 0..CHUNK_DEPTH {
            for x in 0..CHUNK_WIDTH {
                let height = self.height_at(origin_x + x, origin_z + z);
                for y in 0..=height {
                    grid.set(x, y, z, Block::new(self.block_type_at(y, height)));
                }
            }
        }

        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noise::Constant;

    #[test]
    fn octave_sum_is_normalized() {
        for octaves in 1..6 {
            let layer = OctaveNoise::new(Constant::new(0.5), 1.0 / 32.0, octaves, 0.5);
            assert!((layer.sample(13.0, -9.0) - 0.5).abs() < 1e-12);
        }
        let silent = OctaveNoise::new(Constant::new(0.5), 1.0, 0, 0.5);
        assert_eq!(silent.sample(1.0, 1.0), 0.0);
    }

    #[test]
    fn seed_42_origin_height_is_stable() {
        let generator = TerrainGenerator::new(42);
        let first = generator.height_at(0, 0);
        assert!((0..=63).contains(&first), "{first}");
        for _ in 0..1000 {
            assert_eq!(generator.height_at(0, 0), first);
        }
        assert_eq!(TerrainGenerator::new(42).height_at(0, 0), first);
    }

    #[test]
    fn heights_are_clamped_to_world() {
        let generator = TerrainGenerator::with_parameters(
            3,
            TerrainParameters {
                water_level: 250,
                ..TerrainParameters::default()
            },
        );
        let sunk = TerrainGenerator::with_parameters(
            3,
            TerrainParameters {
                water_level: -100,
                ..TerrainParameters::default()
            },
        );
        for i in -20..20 {
            let h = generator.height_at(i * 37, i * -11);
            assert!((0..CHUNK_HEIGHT).contains(&h));
            assert_eq!(sunk.height_at(i * 37, i * -11), 0);
        }
    }

    #[test]
    fn material_layering() {
        let generator = TerrainGenerator::new(1);
        assert_eq!(generator.block_type_at(40, 40), BlockType::GRASS);
        assert_eq!(generator.block_type_at(WATER_LEVEL, WATER_LEVEL), BlockType::GRASS);
        assert_eq!(generator.block_type_at(31, 31), BlockType::SAND);
        assert_eq!(generator.block_type_at(41, 40), BlockType::AIR);
        for y in 36..40 {
            assert_eq!(generator.block_type_at(y, 40), BlockType::DIRT);
        }
        assert_eq!(generator.block_type_at(35, 40), BlockType::STONE);
        assert_eq!(generator.block_type_at(0, 40), BlockType::STONE);
    }

    #[test]
    fn generated_columns_are_solid_up_to_the_surface() {
        let generator = TerrainGenerator::new(42);
        for coordinate in [ChunkCoordinate::new(0, 0), ChunkCoordinate::new(-3, 5)] {
            let grid = generator.generate_voxels(coordinate);
            let (origin_x, origin_z) = coordinate.world_origin();
            for z in 0..CHUNK_DEPTH {
                for x in 0..CHUNK_WIDTH {
                    let height = generator.height_at(origin_x + x, origin_z + z);
                    for y in 0..CHUNK_HEIGHT {
                        let block = grid.get(x, y, z);
                        assert_eq!(block.is_solid(), y <= height, "({x}, {y}, {z})");
                        assert_eq!(block.get_type(), generator.block_type_at(y, height));
                    }
                }
            }
        }
    }

    #[test]
    fn terrain_varies() {
        let generator = TerrainGenerator::new(42);
        let heights: Vec<_> = (0..64).map(|i| generator.height_at(i * 5, i * 3)).collect();
        assert!(heights.iter().any(|h| *h != heights[0]));
    }
}
