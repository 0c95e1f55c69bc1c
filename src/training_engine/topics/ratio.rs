use std::ops::RangeInclusive;

use log::{debug, warn};
use rand::Rng;
use crate::training_engine::{
    errors::DrillError,
    helpers::percentage_diff,
    models::{Difficulty, Ratio, RatioChoice, RatioProblem},
    sampler::{coin_flip, sample_range, uniform_f64},
};

/// Attempts before the deterministic close-pair construction kicks in.
pub const MAX_ATTEMPTS: u32 = 100;

#[derive(Debug, Clone)]
pub struct RatioConfig {
    pub numerator: RangeInclusive<i64>,
    pub denominator: RangeInclusive<i64>,
    pub min_diff_percent: f64,
    pub max_diff_percent: f64,
}

pub fn config_for(difficulty: Difficulty) -> RatioConfig {
    let (numerator, denominator, min_diff_percent, max_diff_percent) = match difficulty {
        Difficulty::Novice => (1..=9,    2..=10,   20.0, 60.0),
        Difficulty::Easy   => (1..=20,   5..=25,   10.0, 30.0),
        Difficulty::Medium => (5..=50,   10..=60,  5.0,  15.0),
        Difficulty::Hard   => (10..=99,  20..=120, 2.0,  8.0),
        Difficulty::Expert => (20..=199, 50..=250, 1.0,  4.0),
    };
    RatioConfig { numerator, denominator, min_diff_percent, max_diff_percent }
}

fn random_ratio<R: Rng>(rng: &mut R, cfg: &RatioConfig) -> Result<Ratio, DrillError> {
    let numerator = sample_range(rng, &cfg.numerator)?;
    let denominator = sample_range(rng, &cfg.denominator)?;
    Ok(Ratio::new(numerator, denominator))
}

/// Aim B at a percentage `offset` away from A (either direction) and solve
/// for its numerator. `None` when the derived numerator is out of bounds.
fn targeted_ratio<R: Rng>(
    rng: &mut R,
    a: &Ratio,
    cfg: &RatioConfig,
) -> Result<Option<Ratio>, DrillError> {
    let offset = uniform_f64(rng, cfg.min_diff_percent, cfg.max_diff_percent) / 100.0;
    let factor = if coin_flip(rng) { 1.0 + offset } else { 1.0 - offset };
    let target_pct = a.percentage() * factor;
    let denominator = sample_range(rng, &cfg.denominator)?;
    let numerator = (target_pct / 100.0 * denominator as f64).round() as i64;
    if numerator <= 0 || numerator > 2 * denominator {
        return Ok(None);
    }
    Ok(Some(Ratio::new(numerator, denominator)))
}

fn is_acceptable(a: &Ratio, b: &Ratio, cfg: &RatioConfig) -> bool {
    if a.value == b.value || a.display == b.display {
        return false;
    }
    let diff = percentage_diff(a.value, b.value);
    diff >= cfg.min_diff_percent && diff <= cfg.max_diff_percent
}

/// Scale A's numerator up by `min_diff_percent` (rounded up, at least +1)
/// over the same denominator. The pair is always distinct and at least
/// `min_diff_percent` apart, but may overshoot the upper bound for small
/// numerators.
fn forced_close_pair(a: &Ratio, cfg: &RatioConfig) -> Ratio {
    let scaled = (a.numerator as f64 * (1.0 + cfg.min_diff_percent / 100.0)).ceil() as i64;
    Ratio::new(scaled.max(a.numerator + 1), a.denominator)
}

fn finish<R: Rng>(
    rng: &mut R,
    a: Ratio,
    b: Ratio,
    difficulty: Difficulty,
    used_fallback: bool,
) -> RatioProblem {
    let (ratio_a, ratio_b) = if coin_flip(rng) { (b, a) } else { (a, b) };
    let correct_answer = if ratio_a.value > ratio_b.value { RatioChoice::A } else { RatioChoice::B };
    let percentage_diff = percentage_diff(ratio_a.value, ratio_b.value);
    let display = format!("{} vs {}", ratio_a.display, ratio_b.display);
    RatioProblem {
        ratio_a,
        ratio_b,
        correct_answer,
        percentage_diff,
        difficulty,
        display,
        used_fallback,
    }
}

pub fn generate<R: Rng>(rng: &mut R, difficulty: Difficulty) -> Result<RatioProblem, DrillError> {
    generate_with(rng, difficulty, &config_for(difficulty))
}

/// Generate two ratios whose percentage difference falls inside the
/// configured band. Harder levels derive B from A algebraically; easier ones
/// draw both independently. The pair is swapped half the time so the larger
/// ratio is not always in the same slot.
pub fn generate_with<R: Rng>(
    rng: &mut R,
    difficulty: Difficulty,
    cfg: &RatioConfig,
) -> Result<RatioProblem, DrillError> {
    let targeted = difficulty >= Difficulty::Hard;
    let mut a = random_ratio(rng, cfg)?;

    for attempt in 1..=MAX_ATTEMPTS {
        if attempt > 1 {
            a = random_ratio(rng, cfg)?;
        }
        let b = if targeted {
            match targeted_ratio(rng, &a, cfg)? {
                Some(b) => b,
                None => random_ratio(rng, cfg)?,
            }
        } else {
            random_ratio(rng, cfg)?
        };
        if is_acceptable(&a, &b, cfg) {
            debug!("ratio pair {} / {} accepted after {} attempt(s)", a.display, b.display, attempt);
            return Ok(finish(rng, a, b, difficulty, false));
        }
    }

    warn!("{}", DrillError::SamplingExhausted { engine: "ratio", attempts: MAX_ATTEMPTS });
    let b = forced_close_pair(&a, cfg);
    Ok(finish(rng, a, b, difficulty, true))
}

pub fn validate_answer(problem: &RatioProblem, choice: RatioChoice) -> bool {
    choice == problem.correct_answer
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn difference_stays_in_band() {
        let mut rng = StdRng::seed_from_u64(42);
        for difficulty in Difficulty::ALL {
            let cfg = config_for(difficulty);
            for _ in 0..300 {
                let p = generate(&mut rng, difficulty).unwrap();
                assert_ne!(p.ratio_a.value, p.ratio_b.value);
                assert_ne!(p.ratio_a.display, p.ratio_b.display);
                if !p.used_fallback {
                    assert!(
                        p.percentage_diff >= cfg.min_diff_percent
                            && p.percentage_diff <= cfg.max_diff_percent,
                        "{p:?} outside band at {difficulty}"
                    );
                }
            }
        }
    }

    #[test]
    fn correct_answer_points_at_larger_ratio() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            let p = generate(&mut rng, Difficulty::Medium).unwrap();
            let larger = if p.ratio_a.value > p.ratio_b.value { RatioChoice::A } else { RatioChoice::B };
            assert_eq!(p.correct_answer, larger);
            assert!(validate_answer(&p, larger));
        }
    }

    #[test]
    fn both_slots_win_sometimes() {
        let mut rng = StdRng::seed_from_u64(4);
        let answers: Vec<RatioChoice> = (0..200)
            .map(|_| generate(&mut rng, Difficulty::Hard).unwrap().correct_answer)
            .collect();
        assert!(answers.contains(&RatioChoice::A));
        assert!(answers.contains(&RatioChoice::B));
    }

    #[test]
    fn unreachable_band_uses_forced_pair() {
        // A single possible ratio can never satisfy any band.
        let cfg = RatioConfig {
            numerator: 40..=40,
            denominator: 50..=50,
            min_diff_percent: 5.0,
            max_diff_percent: 10.0,
        };
        let mut rng = StdRng::seed_from_u64(1);
        let p = generate_with(&mut rng, Difficulty::Medium, &cfg).unwrap();
        assert!(p.used_fallback);
        let nums = [p.ratio_a.numerator, p.ratio_b.numerator];
        assert!(nums.contains(&40) && nums.contains(&42), "{p:?}");
        assert_eq!(p.percentage_diff, 5.0);
    }

    #[test]
    fn forced_pair_always_moves_numerator() {
        let cfg = config_for(Difficulty::Expert);
        let b = forced_close_pair(&Ratio::new(1, 50), &cfg);
        assert_eq!(b.numerator, 2);
        assert_eq!(b.denominator, 50);
    }

    #[test]
    fn known_pair_diff() {
        let a = Ratio::new(1, 2);
        let b = Ratio::new(3, 5);
        assert_eq!(percentage_diff(a.value, b.value), 20.0);
        assert!(is_acceptable(&a, &b, &config_for(Difficulty::Novice)));
        assert!(!is_acceptable(&a, &Ratio::new(2, 4), &config_for(Difficulty::Novice)));
    }
}
