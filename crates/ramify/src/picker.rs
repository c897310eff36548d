//! Random selection among interchangeable alternatives.
//!
//! A recursive definition may carry several base-case bodies and several
//! step-case bodies that are required to be observationally equivalent.
//! Which alternative runs is decided by a [`Picker`] injected into the
//! group — never by an implicit global generator — so tests can seed the
//! choice or force a specific alternative. Randomizing among equivalent
//! bodies is a correctness/diversity device, not an optimization, and no
//! caller may rely on a particular selection order.

use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Chooses one alternative out of `alternatives` equivalent ones.
pub trait Picker: Send + Sync {
    /// Return an index in `0..alternatives`.
    ///
    /// `alternatives` is always at least 1.
    fn pick(&self, alternatives: usize) -> usize;
}

/// Uniformly random selection from a seedable generator.
pub struct SeededPicker {
    rng: Mutex<SmallRng>,
}

impl SeededPicker {
    /// A picker seeded from system entropy.
    pub fn new() -> Self {
        SeededPicker {
            rng: Mutex::new(SmallRng::from_entropy()),
        }
    }

    /// A picker with a fixed seed, for reproducible dispatch.
    pub fn seeded(seed: u64) -> Self {
        SeededPicker {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }
}

impl Default for SeededPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl Picker for SeededPicker {
    fn pick(&self, alternatives: usize) -> usize {
        debug_assert!(alternatives > 0);
        self.rng.lock().gen_range(0..alternatives)
    }
}

/// Always selects the same alternative (modulo the set size).
///
/// Lets a test force one specific body out of an alternative set.
pub struct FixedPicker(pub usize);

impl Picker for FixedPicker {
    fn pick(&self, alternatives: usize) -> usize {
        debug_assert!(alternatives > 0);
        self.0 % alternatives
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pick_stays_in_bounds() {
        let picker = SeededPicker::new();
        for n in 1..10 {
            for _ in 0..100 {
                assert!(picker.pick(n) < n);
            }
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let a = SeededPicker::seeded(42);
        let b = SeededPicker::seeded(42);

        let left: Vec<usize> = (0..50).map(|_| a.pick(5)).collect();
        let right: Vec<usize> = (0..50).map(|_| b.pick(5)).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_fixed_picker_wraps() {
        let picker = FixedPicker(7);
        assert_eq!(picker.pick(3), 1);
        assert_eq!(picker.pick(7), 0);
        assert_eq!(picker.pick(8), 7);
    }

    #[test]
    fn test_single_alternative_is_forced() {
        let picker = SeededPicker::new();
        for _ in 0..20 {
            assert_eq!(picker.pick(1), 0);
        }
    }
}
