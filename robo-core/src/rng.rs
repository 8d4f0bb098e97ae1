//! Deterministic random stream keyed by a string seed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded generator used for every decision made while building a figure.
///
/// The seed string is folded into a 64-bit key with FNV-1a, which keeps the
/// stream identical across platforms and toolchains. All draws go through a
/// single uniform `[0, 1)` sample so the three draw kinds share one ordering.
#[derive(Debug, Clone)]
pub struct SeedRng {
    inner: ChaCha8Rng,
}

impl SeedRng {
    /// Creates a generator for the given seed string.
    pub fn new(seed: &str) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(fnv1a(seed.as_bytes())),
        }
    }

    /// Uniform float in `[0, 1)`.
    #[inline]
    pub fn float01(&mut self) -> f32 {
        // Narrowing can round values just under 1 up to 1.0.
        (self.unit() as f32).min(1.0 - f32::EPSILON / 2.0)
    }

    /// Uniform integer in `[0, max_exclusive)`; `0` when `max_exclusive == 0`.
    #[inline]
    pub fn below(&mut self, max_exclusive: u32) -> u32 {
        (self.unit() * f64::from(max_exclusive)).floor() as u32
    }

    /// `floor(u * max)` for a fractional bound, as an `f32`.
    #[inline]
    pub fn below_f32(&mut self, max: f32) -> f32 {
        (self.unit() * f64::from(max)).floor() as f32
    }

    /// Uniform float in `[lo, hi)`. A degenerate range returns `lo`.
    #[inline]
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.unit() as f32
    }

    fn unit(&mut self) -> f64 {
        self.inner.random::<f64>()
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |h, &b| (h ^ u64::from(b)).wrapping_mul(PRIME))
}
