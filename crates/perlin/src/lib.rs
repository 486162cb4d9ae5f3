#![deny(unsafe_code)]
//! Seeded 3D Perlin gradient noise.
//!
//! Classic improved-noise construction: a permutation of the 256 byte values
//! (duplicated to 512 entries so lattice lookups never wrap), the quintic fade
//! curve `6t⁵ - 15t⁴ + 10t³`, twelve edge gradients selected by `hash & 15`,
//! and trilinear interpolation of the eight corner contributions.
//!
//! The permutation comes from a Fisher-Yates shuffle driven by
//! [`Xorshift64`], so the same seed always yields the same field.

pub mod panel;

use gallery_core::numeric::lerp;
use gallery_core::prng::Xorshift64;

pub use panel::{ColorScheme, PerlinPanel, PerlinParams};

/// Number of distinct lattice hashes.
const TABLE_SIZE: usize = 256;

/// Perlin noise generator owning its permutation table.
#[derive(Debug, Clone)]
pub struct Perlin {
    perm: [u8; TABLE_SIZE * 2],
    seed: u64,
}

impl Perlin {
    /// Builds the permutation table from `seed`.
    pub fn new(seed: u64) -> Self {
        let mut noise = Self {
            perm: [0; TABLE_SIZE * 2],
            seed,
        };
        noise.reseed(seed);
        noise
    }

    /// Regenerates the permutation table from a new seed.
    pub fn reseed(&mut self, seed: u64) {
        let mut table: Vec<u8> = (0..=255).collect();
        Xorshift64::new(seed).shuffle(&mut table);
        for (i, &v) in table.iter().enumerate() {
            self.perm[i] = v;
            self.perm[i + TABLE_SIZE] = v;
        }
        self.seed = seed;
        log::debug!("perlin: reseeded with {seed}");
    }

    /// Seed the current table was built from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The 512-entry duplicated permutation table.
    pub fn permutation(&self) -> &[u8] {
        &self.perm
    }

    /// Gradient noise at `(x, y, z)`, roughly in [-1, 1].
    ///
    /// Exactly zero at every integer lattice point.
    pub fn noise(&self, x: f64, y: f64, z: f64) -> f64 {
        let (xi, x) = lattice(x);
        let (yi, y) = lattice(y);
        let (zi, z) = lattice(z);

        let u = fade(x);
        let v = fade(y);
        let w = fade(z);

        let p = &self.perm;
        let a = p[xi] as usize + yi;
        let aa = p[a] as usize + zi;
        let ab = p[a + 1] as usize + zi;
        let b = p[xi + 1] as usize + yi;
        let ba = p[b] as usize + zi;
        let bb = p[b + 1] as usize + zi;

        let near = lerp(
            lerp(grad(p[aa], x, y, z), grad(p[ba], x - 1.0, y, z), u),
            lerp(
                grad(p[ab], x, y - 1.0, z),
                grad(p[bb], x - 1.0, y - 1.0, z),
                u,
            ),
            v,
        );
        let far = lerp(
            lerp(
                grad(p[aa + 1], x, y, z - 1.0),
                grad(p[ba + 1], x - 1.0, y, z - 1.0),
                u,
            ),
            lerp(
                grad(p[ab + 1], x, y - 1.0, z - 1.0),
                grad(p[bb + 1], x - 1.0, y - 1.0, z - 1.0),
                u,
            ),
            v,
        );
        lerp(near, far, w)
    }

    /// [`noise`](Self::noise) remapped from [-1, 1] to [0, 1] and clamped.
    pub fn noise01(&self, x: f64, y: f64, z: f64) -> f64 {
        ((self.noise(x, y, z) + 1.0) / 2.0).clamp(0.0, 1.0)
    }
}

/// Splits a coordinate into its wrapped lattice cell and the fractional offset.
fn lattice(c: f64) -> (usize, f64) {
    let floor = c.floor();
    ((floor as i64 & 255) as usize, c - floor)
}

/// Quintic smoothstep `6t⁵ - 15t⁴ + 10t³`.
pub fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Dot product of the offset with one of twelve edge gradients picked by
/// the low four bits of `hash`.
pub fn grad(hash: u8, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}
