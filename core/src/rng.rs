//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through a SeededRandom owned by the engine
//! and reseeded from the config on every reset.
//!
//! Draw order is fixed: every derived operation consumes exactly one
//! raw 64-bit value from the stream. Two generators with the same seed
//! therefore stay in lockstep for any interleaving of operations.
//!
//! Reversed ranges (`min > max`) are swapped before drawing.

use crate::error::{EngineError, EngineResult};
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a over the UTF-8 bytes of the seed. Stable across platforms
/// and compiler versions, unlike `std`'s hasher.
fn hash_seed(seed: &str) -> u64 {
    seed.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// A string-seeded deterministic random stream.
///
/// `Clone` snapshots the full generator state: the clone continues from the
/// same position but draws independently afterwards.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: String,
    inner: Pcg64Mcg,
}

impl SeededRandom {
    pub fn new(seed: &str) -> Self {
        Self {
            seed: seed.to_string(),
            inner: Pcg64Mcg::seed_from_u64(hash_seed(seed)),
        }
    }

    /// A stream seeded from platform entropy. The generated seed is kept,
    /// so the run can still be reproduced from `seed()`.
    pub fn from_entropy() -> Self {
        Self::new(&format!("{:016x}", rand::random::<u64>()))
    }

    /// Seeded when `seed` is given, entropy-seeded otherwise.
    pub fn with_optional_seed(seed: Option<&str>) -> Self {
        match seed {
            Some(seed) => Self::new(seed),
            None => Self::from_entropy(),
        }
    }

    /// Replace seed and stream in one step.
    pub fn initialize(&mut self, seed: Option<&str>) {
        *self = Self::with_optional_seed(seed);
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// An independent stream derived from this seed and a stable label.
    /// Does not advance `self`.
    pub fn fork(&self, label: &str) -> Self {
        Self::new(&format!("{}/{label}", self.seed))
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll an integer in [min, max], inclusive on both ends.
    pub fn next_int(&mut self, min: i64, max: i64) -> i64 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        let span = (i128::from(hi) - i128::from(lo) + 1) as f64;
        let offset = (self.next() * span) as i128;
        // Float rounding on very wide spans can land one past the end.
        (i128::from(lo) + offset).min(i128::from(hi)) as i64
    }

    /// Roll a float in [min, max).
    pub fn next_float(&mut self, min: f64, max: f64) -> f64 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        lo + self.next() * (hi - lo)
    }

    /// Pick one element uniformly. The slice is never modified.
    pub fn next_choice<'a, T>(&mut self, items: &'a [T]) -> EngineResult<&'a T> {
        if items.is_empty() {
            return Err(EngineError::EmptyInput);
        }
        let index = (self.next() * items.len() as f64) as usize;
        Ok(&items[index.min(items.len() - 1)])
    }

    /// Bernoulli trial: true iff `next() < threshold`.
    /// Thresholds below 0 never hit, above 1 always hit.
    pub fn next_boolean(&mut self, threshold: f64) -> bool {
        self.next() < threshold
    }

    /// Fair coin, `next_boolean(0.5)`.
    pub fn coin(&mut self) -> bool {
        self.next_boolean(0.5)
    }
}

impl Default for SeededRandom {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = SeededRandom::new("abc");
        let mut b = SeededRandom::new("abc");
        for _ in 0..3 {
            assert_eq!(a.next().to_bits(), b.next().to_bits());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = SeededRandom::new("abc");
        let mut b = SeededRandom::new("abd");
        let diverged = (0..8).any(|_| a.next() != b.next());
        assert!(diverged, "Seeds 'abc' and 'abd' produced identical streams");
    }

    #[test]
    fn mixed_operations_stay_in_lockstep() {
        let mut a = SeededRandom::new("lockstep");
        let mut b = SeededRandom::new("lockstep");
        let items = ["a", "b", "c", "d"];
        for i in 0..200 {
            match i % 5 {
                0 => assert_eq!(a.next_int(-10, 10), b.next_int(-10, 10)),
                1 => assert_eq!(
                    a.next_float(1.0, 2.0).to_bits(),
                    b.next_float(1.0, 2.0).to_bits()
                ),
                2 => assert_eq!(a.next_choice(&items).unwrap(), b.next_choice(&items).unwrap()),
                3 => assert_eq!(a.next_boolean(0.3), b.next_boolean(0.3)),
                _ => assert_eq!(a.next().to_bits(), b.next().to_bits()),
            }
        }
    }

    #[test]
    fn next_stays_in_unit_interval() {
        let mut rng = SeededRandom::new("unit");
        for _ in 0..10_000 {
            let v = rng.next();
            assert!((0.0..1.0).contains(&v), "next() returned {v}");
        }
    }

    #[test]
    fn next_int_is_inclusive_on_both_ends() {
        let mut rng = SeededRandom::new("ints");
        let mut seen = [false; 4];
        for _ in 0..2_000 {
            let v = rng.next_int(1, 4);
            assert!((1..=4).contains(&v));
            seen[(v - 1) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s), "Not every value in [1, 4] was drawn: {seen:?}");
    }

    #[test]
    fn next_int_handles_extreme_span() {
        let mut rng = SeededRandom::new("wide");
        for _ in 0..1_000 {
            let _ = rng.next_int(i64::MIN, i64::MAX);
        }
        assert_eq!(rng.next_int(7, 7), 7);
    }

    #[test]
    fn reversed_ranges_are_swapped() {
        let mut a = SeededRandom::new("swap");
        let mut b = SeededRandom::new("swap");
        for _ in 0..100 {
            assert_eq!(a.next_int(10, 0), b.next_int(0, 10));
            let v = a.next_float(5.0, 2.0);
            assert_eq!(v.to_bits(), b.next_float(2.0, 5.0).to_bits());
            assert!((2.0..5.0).contains(&v));
        }
    }

    #[test]
    fn empty_choice_is_an_error() {
        let mut rng = SeededRandom::new("empty");
        let empty: [&str; 0] = [];
        assert!(matches!(rng.next_choice(&empty), Err(EngineError::EmptyInput)));
        for _ in 0..20 {
            assert_eq!(*rng.next_choice(&["x"]).unwrap(), "x");
        }
    }

    #[test]
    fn choice_is_roughly_uniform_and_non_mutating() {
        let mut rng = SeededRandom::new("uniform");
        let items = vec![0usize, 1, 2, 3, 4];
        let before = items.clone();
        let mut counts = [0u32; 5];
        const SAMPLES: u32 = 5_000;
        for _ in 0..SAMPLES {
            counts[*rng.next_choice(&items).unwrap()] += 1;
        }
        assert_eq!(items, before);
        let expected = f64::from(SAMPLES) / 5.0;
        for (i, c) in counts.iter().enumerate() {
            let err = (f64::from(*c) - expected).abs() / expected;
            assert!(err < 0.10, "Element {i} drawn {c} times (error {err:.3})");
        }
    }

    #[test]
    fn boolean_threshold_out_of_range_degrades() {
        let mut rng = SeededRandom::new("bool");
        for _ in 0..500 {
            assert!(!rng.next_boolean(-0.5));
            assert!(!rng.next_boolean(0.0));
            assert!(rng.next_boolean(1.0));
            assert!(rng.next_boolean(1.5));
        }
    }

    #[test]
    fn initialize_replaces_stream() {
        let mut rng = SeededRandom::new("first");
        rng.next();
        rng.next();
        rng.initialize(Some("second"));
        let mut fresh = SeededRandom::new("second");
        assert_eq!(rng.seed(), "second");
        assert_eq!(rng.next().to_bits(), fresh.next().to_bits());
    }

    #[test]
    fn entropy_seed_is_reproducible() {
        let mut rng = SeededRandom::with_optional_seed(None);
        let mut replay = SeededRandom::new(rng.seed());
        assert_eq!(rng.next().to_bits(), replay.next().to_bits());
    }

    #[test]
    fn clone_snapshots_position() {
        let mut rng = SeededRandom::new("clone");
        rng.next();
        let mut copy = rng.clone();
        assert_eq!(rng.next().to_bits(), copy.next().to_bits());
        rng.next();
        // copy is one draw behind and advances on its own
        assert_ne!(rng.clone().next().to_bits(), copy.clone().next().to_bits());
    }

    #[test]
    fn fork_is_stable_and_does_not_advance_parent() {
        let parent = SeededRandom::new("root");
        let mut a = parent.fork("particles");
        let mut b = parent.fork("particles");
        assert_eq!(a.seed(), "root/particles");
        assert_eq!(a.next().to_bits(), b.next().to_bits());
        let mut p1 = parent.clone();
        let mut p2 = SeededRandom::new("root");
        assert_eq!(p1.next().to_bits(), p2.next().to_bits());
    }
}
