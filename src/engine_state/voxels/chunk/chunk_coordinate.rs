//! # Chunk Coordinate Module
//!
//! Horizontal chunk-grid addressing. Chunks span the full world height, so a
//! coordinate is an `(x, z)` pair; the world-space origin of a chunk is
//! `(x * CHUNK_WIDTH, 0, z * CHUNK_DEPTH)`.

use cgmath::Point3;

use super::{CHUNK_DEPTH, CHUNK_WIDTH};

/// Largest supported retention radius, in chunks.
pub const MAX_RENDER_DISTANCE: u32 = 64;

/// Identifies one chunk column in the horizontal grid.
///
/// Used directly as the key of the chunk map. Ordering is row-major by
/// `(x, z)` and has no meaning beyond making iteration deterministic.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoordinate {
    /// Chunk index along world X.
    pub x: i32,
    /// Chunk index along world Z.
    pub z: i32,
}

impl ChunkCoordinate {
    /// Creates a coordinate from chunk indices.
    pub const fn new(x: i32, z: i32) -> Self {
        ChunkCoordinate { x, z }
    }

    /// The chunk containing a world-space position.
    ///
    /// Uses `floor(position / chunk size)` so positions just below zero land
    /// in chunk `-1`, not chunk `0`.
    pub fn from_world_position(position: Point3<f32>) -> Self {
        ChunkCoordinate {
            x: (position.x / CHUNK_WIDTH as f32).floor() as i32,
            z: (position.z / CHUNK_DEPTH as f32).floor() as i32,
        }
    }

    /// The chunk containing a world block column.
    pub fn from_block(block_x: i32, block_z: i32) -> Self {
        ChunkCoordinate {
            x: block_x.div_euclid(CHUNK_WIDTH),
            z: block_z.div_euclid(CHUNK_DEPTH),
        }
    }

    /// World-space block coordinates of this chunk's `(0, 0)` column.
    pub fn world_origin(self) -> (i32, i32) {
        (self.x * CHUNK_WIDTH, self.z * CHUNK_DEPTH)
    }

    /// The coordinate `(dx, dz)` chunks away.
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        ChunkCoordinate {
            x: self.x + dx,
            z: self.z + dz,
        }
    }

    /// Chebyshev distance in chunks: the larger of the two per-axis distances.
    pub fn chebyshev_distance(self, other: ChunkCoordinate) -> u32 {
        self.x.abs_diff(other.x).max(self.z.abs_diff(other.z))
    }

    /// Returns `true` if this coordinate lies in the inclusive square of
    /// half-width `radius` around `center`.
    pub fn is_within(self, center: ChunkCoordinate, radius: u32) -> bool {
        self.chebyshev_distance(center) <= radius
    }

    /// Every coordinate of the `(2 * radius + 1)²` square centred on `center`.
    ///
    /// `radius` is capped at [`MAX_RENDER_DISTANCE`].
    pub fn square(center: ChunkCoordinate, radius: u32) -> impl Iterator<Item = ChunkCoordinate> {
        let radius = radius.min(MAX_RENDER_DISTANCE) as i32;
        (-radius..=radius)
            .flat_map(move |dz| (-radius..=radius).map(move |dx| center.offset(dx, dz)))
    }
}
