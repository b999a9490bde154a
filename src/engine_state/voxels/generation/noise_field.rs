//! # Noise Field
//!
//! Seeded 2D gradient noise. A shuffled permutation of `0..=255`, doubled to
//! 512 entries, hashes each lattice corner to one of eight gradient
//! directions; the corner contributions are blended with the quintic fade
//! curve so the field is C1-continuous across cell boundaries.

use noise::NoiseFn;

const PERMUTATION_SIZE: usize = 256;

const GRADIENTS: [(f64, f64); 8] = [
    (1.0, 1.0),
    (-1.0, 1.0),
    (1.0, -1.0),
    (-1.0, -1.0),
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
];

/// Deterministic 2D gradient noise with values in `[-1, 1]`.
///
/// The same seed produces the same permutation table on every platform,
/// so every sample is reproducible bit-for-bit.
#[derive(Clone, Debug)]
pub struct NoiseField {
    permutation: [u8; PERMUTATION_SIZE * 2],
}

impl NoiseField {
    /// Builds the permutation table for `seed`.
    pub fn new(seed: u64) -> Self {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut table: Vec<u8> = (0..=255).collect();
        rng.shuffle(&mut table);

        let mut permutation = [0u8; PERMUTATION_SIZE * 2];
        for (i, entry) in permutation.iter_mut().enumerate() {
            *entry = table[i % PERMUTATION_SIZE];
        }

        NoiseField { permutation }
    }

    /// Samples the field at `(x, z)`.
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        let x_floor = x.floor();
        let z_floor = z.floor();
        let xi = (x_floor as i64).rem_euclid(PERMUTATION_SIZE as i64) as usize;
        let zi = (z_floor as i64).rem_euclid(PERMUTATION_SIZE as i64) as usize;

        let dx = x - x_floor;
        let dz = z - z_floor;
        let u = fade(dx);
        let v = fade(dz);

        let p = &self.permutation;
        let a = p[xi] as usize;
        let b = p[xi + 1] as usize;
        let aa = p[a + zi];
        let ab = p[a + zi + 1];
        let ba = p[b + zi];
        let bb = p[b + zi + 1];

        let near = lerp(u, gradient(aa, dx, dz), gradient(ba, dx - 1.0, dz));
        let far = lerp(u, gradient(ab, dx, dz - 1.0), gradient(bb, dx - 1.0, dz - 1.0));

        lerp(v, near, far).clamp(-1.0, 1.0)
    }
}

impl NoiseFn<f64, 2> for NoiseField {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.sample(point[0], point[1])
    }
}

/// `6t^5 - 15t^4 + 10t^3`: zero first and second derivative at 0 and 1.
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

fn gradient(hash: u8, x: f64, z: f64) -> f64 {
    let (gx, gz) = GRADIENTS[(hash & 7) as usize];
    gx * x + gz * z
}
