//! Pluggable randomness.
//!
//! Every chance in the simulation is drawn through [`RandomSource`], so a run is
//! reproducible from a seed and tests can force individual outcomes.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::TAU;

pub trait RandomSource {
    /// Uniform draw in [0, 1)
    fn unit(&mut self) -> f64;

    /// Uniform integer in [low, high]
    fn int_inclusive(&mut self, low: i64, high: i64) -> i64;

    /// Uniform angle in [0, 2π)
    fn angle(&mut self) -> f64;

    /// Uniform index in [0, len); `len` must be non-zero
    fn index(&mut self, len: usize) -> usize;
}

/// Default source backed by a seeded ChaCha8 generator
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: ChaCha8Rng,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }
}

impl RandomSource for SeededSource {
    fn unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn int_inclusive(&mut self, low: i64, high: i64) -> i64 {
        self.rng.gen_range(low..=high)
    }

    fn angle(&mut self) -> f64 {
        self.rng.gen_range(0.0..TAU)
    }

    fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_source_is_reproducible() {
        let mut a = SeededSource::new(42);
        let mut b = SeededSource::new(42);

        for _ in 0..100 {
            assert_eq!(a.unit(), b.unit());
            assert_eq!(a.int_inclusive(-2, 2), b.int_inclusive(-2, 2));
        }
    }

    #[test]
    fn test_draws_stay_in_range() {
        let mut source = SeededSource::new(7);

        for _ in 0..1000 {
            let unit = source.unit();
            assert!((0.0..1.0).contains(&unit));

            let value = source.int_inclusive(1000, 3000);
            assert!((1000..=3000).contains(&value));

            let angle = source.angle();
            assert!((0.0..TAU).contains(&angle));

            assert!(source.index(5) < 5);
        }
    }

    #[test]
    fn test_inclusive_range_reaches_both_ends() {
        let mut source = SeededSource::new(1);
        let draws: Vec<i64> = (0..500).map(|_| source.int_inclusive(-2, 2)).collect();
        assert!(draws.contains(&-2));
        assert!(draws.contains(&2));
    }
}
