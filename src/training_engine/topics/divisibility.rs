use std::ops::RangeInclusive;

use log::{debug, warn};
use rand::Rng;
use crate::training_engine::{
    errors::DrillError,
    models::{Difficulty, DivisibilityProblem},
    sampler::{sample_range, uniform_int},
};

/// Resamples of the dividend before non-divisibility is forced by offset.
pub const MAX_ATTEMPTS: u32 = 50;

/// Share of problems that are exactly divisible when exact problems are on.
pub const EXACT_PROBABILITY: f64 = 0.3;

#[derive(Debug, Clone)]
pub struct DivisibilityConfig {
    pub dividend: RangeInclusive<i64>,
    /// Lower bound must be at least 2.
    pub divisor: RangeInclusive<i64>,
}

pub fn config_for(difficulty: Difficulty) -> DivisibilityConfig {
    let (dividend, divisor) = match difficulty {
        Difficulty::Novice => (10..=100,     2..=10),
        Difficulty::Easy   => (50..=500,     2..=12),
        Difficulty::Medium => (100..=1000,   3..=20),
        Difficulty::Hard   => (500..=5000,   7..=30),
        Difficulty::Expert => (1000..=10000, 11..=50),
    };
    DivisibilityConfig { dividend, divisor }
}

/// Pick a quotient inside the dividend range so `divisor * quotient` lands
/// in range too.
fn exact_problem<R: Rng>(
    rng: &mut R,
    cfg: &DivisibilityConfig,
    divisor: i64,
    difficulty: Difficulty,
) -> Result<DivisibilityProblem, DrillError> {
    let (lo, hi) = (*cfg.dividend.start(), *cfg.dividend.end());
    let q_min = ((lo + divisor - 1) / divisor).max(1);
    let q_max = (hi / divisor).max(q_min);
    let quotient = uniform_int(rng, q_min, q_max)?;
    Ok(DivisibilityProblem::new(divisor * quotient, divisor, difficulty))
}

fn inexact_problem<R: Rng>(
    rng: &mut R,
    cfg: &DivisibilityConfig,
    divisor: i64,
    difficulty: Difficulty,
) -> Result<DivisibilityProblem, DrillError> {
    let mut dividend = sample_range(rng, &cfg.dividend)?;
    let mut attempts = 1;
    while dividend % divisor == 0 {
        if attempts >= MAX_ATTEMPTS {
            warn!("{}", DrillError::SamplingExhausted { engine: "divisibility", attempts });
            dividend += uniform_int(rng, 1, divisor - 1)?;
            break;
        }
        dividend = sample_range(rng, &cfg.dividend)?;
        attempts += 1;
    }
    Ok(DivisibilityProblem::new(dividend, divisor, difficulty))
}

pub fn generate<R: Rng>(
    rng: &mut R,
    difficulty: Difficulty,
    include_exact: bool,
) -> Result<DivisibilityProblem, DrillError> {
    generate_with(rng, difficulty, include_exact, &config_for(difficulty))
}

/// With `include_exact`, roughly [`EXACT_PROBABILITY`] of problems divide
/// evenly; every other problem is guaranteed to leave a remainder.
pub fn generate_with<R: Rng>(
    rng: &mut R,
    difficulty: Difficulty,
    include_exact: bool,
    cfg: &DivisibilityConfig,
) -> Result<DivisibilityProblem, DrillError> {
    let divisor = sample_range(rng, &cfg.divisor)?;
    if divisor < 2 {
        return Err(DrillError::InvalidRange { min: 2, max: divisor });
    }
    let problem = if include_exact && rng.gen_bool(EXACT_PROBABILITY) {
        exact_problem(rng, cfg, divisor, difficulty)?
    } else {
        inexact_problem(rng, cfg, divisor, difficulty)?
    };
    debug!(
        "divisibility problem {} (q={}, r={})",
        problem.display, problem.quotient, problem.remainder
    );
    Ok(problem)
}

/// First stage: does the player's yes/no claim match?
pub fn validate_divisibility_answer(problem: &DivisibilityProblem, claims_divisible: bool) -> bool {
    claims_divisible == problem.is_divisible
}

/// Second stage. An exact problem only accepts 0; otherwise the positive
/// remainder is accepted, and the negative one too when `allow_negative`.
pub fn validate_remainder_answer(
    problem: &DivisibilityProblem,
    answer: i64,
    allow_negative: bool,
) -> bool {
    if problem.is_divisible {
        return answer == 0;
    }
    answer == problem.remainder || (allow_negative && answer == problem.negative_remainder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn assert_invariants(p: &DivisibilityProblem) {
        assert_eq!(p.dividend, p.divisor * p.quotient + p.remainder, "{p:?}");
        assert!(p.remainder >= 0 && p.remainder < p.divisor, "{p:?}");
        assert_eq!(p.is_divisible, p.remainder == 0, "{p:?}");
        if p.remainder > 0 {
            assert_eq!(p.negative_remainder, p.remainder - p.divisor);
        } else {
            assert_eq!(p.negative_remainder, 0);
        }
    }

    #[test]
    fn invariants_hold_at_every_level() {
        let mut rng = StdRng::seed_from_u64(42);
        for difficulty in Difficulty::ALL {
            for include_exact in [true, false] {
                for _ in 0..500 {
                    assert_invariants(&generate(&mut rng, difficulty, include_exact).unwrap());
                }
            }
        }
    }

    #[test]
    fn exact_problems_stay_in_dividend_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for difficulty in Difficulty::ALL {
            let cfg = config_for(difficulty);
            for _ in 0..300 {
                let divisor = sample_range(&mut rng, &cfg.divisor).unwrap();
                let p = exact_problem(&mut rng, &cfg, divisor, difficulty).unwrap();
                assert!(p.is_divisible);
                assert!(cfg.dividend.contains(&p.dividend), "{p:?}");
            }
        }
    }

    #[test]
    fn without_exact_nothing_divides() {
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..500 {
            let p = generate(&mut rng, Difficulty::Medium, false).unwrap();
            assert!(!p.is_divisible, "{p:?}");
        }
    }

    #[test]
    fn exact_share_is_roughly_thirty_percent() {
        let mut rng = StdRng::seed_from_u64(23);
        let n = 2_000;
        let exact = (0..n)
            .filter(|_| generate(&mut rng, Difficulty::Easy, true).unwrap().is_divisible)
            .count();
        // Inexact draws never divide, so only the 30% coin produces exact ones.
        assert!((450..=750).contains(&exact), "exact count {exact}");
    }

    #[test]
    fn always_divisible_range_is_forced_off() {
        // Every dividend in 10..=10 is a multiple of 5.
        let cfg = DivisibilityConfig { dividend: 10..=10, divisor: 5..=5 };
        let mut rng = StdRng::seed_from_u64(1);
        let p = generate_with(&mut rng, Difficulty::Novice, false, &cfg).unwrap();
        assert!(!p.is_divisible);
        assert!((11..=14).contains(&p.dividend));
        assert_invariants(&p);
    }

    #[test]
    fn divisor_below_two_is_rejected() {
        let cfg = DivisibilityConfig { dividend: 10..=20, divisor: 1..=1 };
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            generate_with(&mut rng, Difficulty::Novice, true, &cfg),
            Err(DrillError::InvalidRange { .. })
        ));
    }

    #[test]
    fn eighty_seven_over_five() {
        let p = DivisibilityProblem::new(87, 5, Difficulty::Novice);
        assert_eq!(p.quotient, 17);
        assert_eq!(p.remainder, 2);
        assert_eq!(p.negative_remainder, -3);
        assert!(!p.is_divisible);
        assert_eq!(p.display, "87 ÷ 5");

        assert!(validate_divisibility_answer(&p, false));
        assert!(!validate_divisibility_answer(&p, true));
        assert!(validate_remainder_answer(&p, 2, false));
        assert!(validate_remainder_answer(&p, -3, true));
        assert!(!validate_remainder_answer(&p, -3, false));
        assert!(!validate_remainder_answer(&p, 3, true));
    }

    #[test]
    fn exact_problem_only_accepts_zero() {
        let p = DivisibilityProblem::new(84, 7, Difficulty::Novice);
        assert!(p.is_divisible);
        assert!(validate_divisibility_answer(&p, true));
        assert!(validate_remainder_answer(&p, 0, true));
        assert!(!validate_remainder_answer(&p, -7, true));
        assert!(!validate_remainder_answer(&p, 7, false));
    }
}
