use std::ops::RangeInclusive;

use rand::Rng;
use crate::training_engine::errors::DrillError;

/// Uniform integer in `[min, max]`, both ends inclusive.
///
/// Fails fast with [`DrillError::InvalidRange`] when `min > max` instead of
/// panicking inside `rand`.
pub fn uniform_int<R: Rng>(rng: &mut R, min: i64, max: i64) -> Result<i64, DrillError> {
    if min > max {
        return Err(DrillError::InvalidRange { min, max });
    }
    Ok(rng.gen_range(min..=max))
}

/// [`uniform_int`] over a `RangeInclusive`, for the static engine tables.
pub fn sample_range<R: Rng>(rng: &mut R, range: &RangeInclusive<i64>) -> Result<i64, DrillError> {
    uniform_int(rng, *range.start(), *range.end())
}

/// Uniform float in `[min, max]`. Equal bounds return `min`.
pub fn uniform_f64<R: Rng>(rng: &mut R, min: f64, max: f64) -> f64 {
    if max <= min {
        return min;
    }
    rng.gen_range(min..=max)
}

/// Fair coin.
pub fn coin_flip<R: Rng>(rng: &mut R) -> bool {
    rng.gen_bool(0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn uniform_int_stays_inside_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..2_000 {
            let v = uniform_int(&mut rng, 3, 7).unwrap();
            assert!((3..=7).contains(&v), "sampled {v} outside 3..=7");
            seen_min |= v == 3;
            seen_max |= v == 7;
        }
        assert!(seen_min && seen_max, "both endpoints must be reachable");
    }

    #[test]
    fn single_point_range_returns_that_point() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(uniform_int(&mut rng, 9, 9).unwrap(), 9);
    }

    #[test]
    fn reversed_range_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = uniform_int(&mut rng, 10, 2).unwrap_err();
        assert!(matches!(err, DrillError::InvalidRange { min: 10, max: 2 }));
    }

    #[test]
    fn sampling_is_deterministic_with_seed() {
        let make = |seed: u64| -> Vec<i64> {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..8).map(|_| uniform_int(&mut rng, 0, 1_000).unwrap()).collect()
        };
        assert_eq!(make(99), make(99));
        assert_ne!(make(99), make(100));
    }
}
