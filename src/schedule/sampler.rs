//! Random range sampling
//!
//! Uniform draws over inclusive integer bounds. Wide amounts are composed
//! from two independent 64-bit draws and reduced modulo the span, so large
//! base-unit ranges never go through floating point scaling.

use rand::prelude::*;
use rand::rngs::StdRng;
use std::time::Duration;

use super::types::{AmountRange, DelayRange, QuotaRange};
use crate::error::{Error, Result};

/// Seedable sampler for quotas, delays and amounts
pub struct RangeSampler {
    rng: StdRng,
}

impl RangeSampler {
    /// Create a new sampler with optional seed
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Create sampler from entropy (random seed)
    pub fn from_entropy() -> Self {
        Self::new(None)
    }

    /// Uniform integer in `[min, max]`
    pub fn sample_int(&mut self, min: u64, max: u64) -> Result<u64> {
        if max < min {
            return Err(Error::InvalidRange {
                name: "integer",
                min: min as u128,
                max: max as u128,
            });
        }
        Ok(self.rng.gen_range(min..=max))
    }

    /// Uniform 128-bit amount in `[min, max]`
    pub fn sample_wide_amount(&mut self, min: u128, max: u128) -> Result<u128> {
        if max < min {
            return Err(Error::InvalidRange {
                name: "amount",
                min,
                max,
            });
        }

        let span = max - min;
        if span == 0 {
            return Ok(min);
        }

        let high = self.rng.next_u64() as u128;
        let low = self.rng.next_u64() as u128;
        let composed = (high << 64) | low;

        // span + 1 overflows only when the range covers all of u128
        match span.checked_add(1) {
            Some(modulus) => Ok(min + composed % modulus),
            None => Ok(composed),
        }
    }

    /// Number of transfers for a day
    pub fn sample_quota(&mut self, range: &QuotaRange) -> u64 {
        self.rng.gen_range(range.min()..=range.max())
    }

    /// Pacing delay between transfers
    pub fn sample_delay(&mut self, range: &DelayRange) -> Duration {
        Duration::from_secs(self.rng.gen_range(range.min()..=range.max()))
    }

    /// Transfer amount in base units
    pub fn sample_amount(&mut self, range: &AmountRange) -> u128 {
        // AmountRange guarantees min <= max
        self.sample_wide_amount(range.min(), range.max())
            .unwrap_or(range.min())
    }

    /// Reset the RNG with a new seed
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

impl Default for RangeSampler {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::types::BoundedRange;

    /// Chi-square critical value for 9 degrees of freedom at p = 0.001
    const CHI_SQUARE_9DF_P001: f64 = 27.877;

    fn chi_square(counts: &[u64], expected: f64) -> f64 {
        counts
            .iter()
            .map(|&c| {
                let diff = c as f64 - expected;
                diff * diff / expected
            })
            .sum()
    }

    #[test]
    fn test_deterministic_with_seed() {
        let mut s1 = RangeSampler::new(Some(12345));
        let mut s2 = RangeSampler::new(Some(12345));

        assert_eq!(s1.sample_int(0, 1000).unwrap(), s2.sample_int(0, 1000).unwrap());
        assert_eq!(
            s1.sample_wide_amount(0, u128::MAX / 3).unwrap(),
            s2.sample_wide_amount(0, u128::MAX / 3).unwrap()
        );
    }

    #[test]
    fn test_int_within_bounds() {
        let mut sampler = RangeSampler::new(Some(42));
        for _ in 0..1000 {
            let v = sampler.sample_int(60, 180).unwrap();
            assert!((60..=180).contains(&v));
        }
    }

    #[test]
    fn test_wide_amount_within_bounds() {
        let min = 100_000_000_000_000u128; // 0.0001 at 18 decimals
        let max = 1_000_000_000_000_000u128;
        let mut sampler = RangeSampler::new(Some(7));
        for _ in 0..1000 {
            let v = sampler.sample_wide_amount(min, max).unwrap();
            assert!(v >= min && v <= max);
        }
    }

    #[test]
    fn test_equal_bounds_are_constant() {
        let mut sampler = RangeSampler::new(Some(1));
        for _ in 0..50 {
            assert_eq!(sampler.sample_int(5, 5).unwrap(), 5);
            assert_eq!(sampler.sample_wide_amount(1_000, 1_000).unwrap(), 1_000);
        }
    }

    #[test]
    fn test_inverted_bounds_fail_fast() {
        let mut sampler = RangeSampler::new(Some(1));
        assert!(matches!(
            sampler.sample_int(6, 3),
            Err(Error::InvalidRange { min: 6, max: 3, .. })
        ));
        assert!(matches!(
            sampler.sample_wide_amount(10, 9),
            Err(Error::InvalidRange { min: 10, max: 9, .. })
        ));
    }

    #[test]
    fn test_full_u128_range() {
        let mut sampler = RangeSampler::new(Some(99));
        // Must not overflow computing span + 1
        let _ = sampler.sample_wide_amount(0, u128::MAX).unwrap();
    }

    #[test]
    fn test_int_uniformity() {
        let mut sampler = RangeSampler::new(Some(2024));
        let draws = 10_000;
        let mut counts = [0u64; 10];
        for _ in 0..draws {
            let v = sampler.sample_int(0, 9).unwrap();
            counts[v as usize] += 1;
        }
        let stat = chi_square(&counts, draws as f64 / 10.0);
        assert!(stat < CHI_SQUARE_9DF_P001, "chi-square {} too large", stat);
    }

    #[test]
    fn test_wide_amount_uniformity() {
        // Span wider than a 53-bit float mantissa
        let min = 1u128 << 70;
        let bucket = 1u128 << 66;
        let max = min + bucket * 10 - 1;

        let mut sampler = RangeSampler::new(Some(31337));
        let draws = 10_000;
        let mut counts = [0u64; 10];
        for _ in 0..draws {
            let v = sampler.sample_wide_amount(min, max).unwrap();
            counts[((v - min) / bucket) as usize] += 1;
        }
        let stat = chi_square(&counts, draws as f64 / 10.0);
        assert!(stat < CHI_SQUARE_9DF_P001, "chi-square {} too large", stat);
    }

    #[test]
    fn test_typed_helpers() {
        let mut sampler = RangeSampler::new(Some(5));
        let quota = BoundedRange::new("quota", 3, 6).unwrap();
        let delay = BoundedRange::new("delay", 1, 1).unwrap();
        let amount = AmountRange::new(10, 20).unwrap();

        for _ in 0..100 {
            assert!((3..=6).contains(&sampler.sample_quota(&quota)));
            assert_eq!(sampler.sample_delay(&delay), Duration::from_secs(1));
            assert!((10..=20).contains(&sampler.sample_amount(&amount)));
        }
    }

    #[test]
    fn test_reseed() {
        let mut sampler = RangeSampler::new(Some(42));
        let first = sampler.sample_int(0, u64::MAX).unwrap();
        sampler.reseed(42);
        assert_eq!(sampler.sample_int(0, u64::MAX).unwrap(), first);
    }
}
