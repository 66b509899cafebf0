//! Seeded random source for all in-tick decisions.
//!
//! Every draw the controller makes goes through one [`SimRng`], in ship order,
//! so two controllers built from the same seed make identical decisions.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic RNG backed by `ChaCha8`.
#[derive(Debug, Clone)]
pub struct SimRng {
    seed: u64,
    inner: ChaCha8Rng,
}

impl SimRng {
    /// Create an RNG from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seed this RNG was created from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform draw in `[0, 1)`.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Uniform draw in `[0, 1)` as `f32`.
    pub fn unit(&mut self) -> f32 {
        self.inner.gen::<f32>()
    }

    /// Uniform draw in `[lo, hi)`. Returns `lo` when the range is empty.
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        // NaN bounds fail this comparison too.
        if !(hi > lo) {
            return lo;
        }
        lo + (hi - lo) * self.unit()
    }

    /// Uniform integer in `[min, max]` inclusive. Swapped bounds are accepted.
    pub fn int(&mut self, min: i64, max: i64) -> i64 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.inner.gen_range(lo..=hi)
    }

    /// Uniformly chosen element, or `None` for an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.inner.gen_range(0..items.len());
        items.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SimRng::new(99);
        let mut b = SimRng::new(99);
        for _ in 0..100 {
            assert_eq!(a.next().to_bits(), b.next().to_bits());
            assert_eq!(a.int(-5, 5), b.int(-5, 5));
        }
    }

    #[test]
    fn draws_stay_in_range() {
        let mut rng = SimRng::new(1);
        for _ in 0..1000 {
            let x = rng.next();
            assert!((0.0..1.0).contains(&x));
            let r = rng.range(2.0, 3.0);
            assert!((2.0..3.0).contains(&r));
            let i = rng.int(7, 3);
            assert!((3..=7).contains(&i));
        }
    }

    #[test]
    fn degenerate_inputs() {
        let mut rng = SimRng::new(1);
        assert_eq!(rng.range(4.0, 4.0), 4.0);
        assert_eq!(rng.range(4.0, f32::NAN), 4.0);
        assert_eq!(rng.int(2, 2), 2);
        let empty: [u8; 0] = [];
        assert!(rng.pick(&empty).is_none());
        assert_eq!(rng.pick(&[42]), Some(&42));
    }
}
