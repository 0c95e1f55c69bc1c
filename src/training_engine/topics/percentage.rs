use std::ops::RangeInclusive;

use log::{debug, warn};
use rand::Rng;
use crate::training_engine::{
    errors::DrillError,
    helpers::{round_to, within_tolerance},
    models::{Difficulty, PercentageProblem},
    sampler::{sample_range, uniform_int},
};

/// Maximum number of resamples before the last draw is accepted as-is.
pub const MAX_ATTEMPTS: u32 = 200;

/// Percentages that are too easy to estimate and are always resampled.
pub const TRIVIAL_PERCENTAGES: [f64; 4] = [25.0, 50.0, 75.0, 100.0];

/// Below this, low-difficulty answers are resampled (difficulty < 3 only).
pub const LOW_DIFFICULTY_FLOOR: f64 = 15.0;

#[derive(Debug, Clone)]
pub struct PercentageConfig {
    pub numerator: RangeInclusive<i64>,
    pub denominator: RangeInclusive<i64>,
    pub allow_over_100: bool,
    pub decimal_places: u32,
}

pub fn config_for(difficulty: Difficulty) -> PercentageConfig {
    let (numerator, denominator, allow_over_100, decimal_places) = match difficulty {
        Difficulty::Novice => (1..=50,     10..=100,    false, 1),
        Difficulty::Easy   => (1..=99,     20..=200,    false, 1),
        Difficulty::Medium => (10..=500,   50..=500,    false, 2),
        Difficulty::Hard   => (10..=999,   100..=999,   true,  2),
        Difficulty::Expert => (100..=4999, 200..=4999,  true,  2),
    };
    PercentageConfig { numerator, denominator, allow_over_100, decimal_places }
}

/// Half of the smallest representable unit at the given precision.
pub fn tolerance_for(decimal_places: u32) -> f64 {
    0.5 / 10f64.powi(decimal_places as i32)
}

fn is_rejected(percentage: f64, difficulty: Difficulty) -> bool {
    !percentage.is_finite()
        || TRIVIAL_PERCENTAGES.contains(&percentage)
        || (difficulty.level() < 3 && percentage < LOW_DIFFICULTY_FLOOR)
}

impl PercentageProblem {
    pub fn from_parts(
        numerator: i64,
        denominator: i64,
        decimal_places: u32,
        difficulty: Difficulty,
    ) -> Self {
        let answer = round_to(100.0 * numerator as f64 / denominator as f64, decimal_places);
        PercentageProblem {
            numerator,
            denominator,
            answer,
            decimal_places,
            difficulty,
            display: format!("{}/{}", numerator, denominator),
            used_fallback: false,
        }
    }
}

fn sample_once<R: Rng>(
    rng: &mut R,
    cfg: &PercentageConfig,
    difficulty: Difficulty,
) -> Result<PercentageProblem, DrillError> {
    let denominator = sample_range(rng, &cfg.denominator)?;
    let num_max = if cfg.allow_over_100 {
        *cfg.numerator.end()
    } else {
        (*cfg.numerator.end()).min(denominator - 1)
    };
    let numerator = uniform_int(rng, *cfg.numerator.start(), num_max)?;
    Ok(PercentageProblem::from_parts(numerator, denominator, cfg.decimal_places, difficulty))
}

/// Rejection-sample a percentage problem. After [`MAX_ATTEMPTS`] rejected
/// draws the last one is returned with `used_fallback` set.
pub fn generate<R: Rng>(rng: &mut R, difficulty: Difficulty) -> Result<PercentageProblem, DrillError> {
    generate_with(rng, difficulty, &config_for(difficulty))
}

pub fn generate_with<R: Rng>(
    rng: &mut R,
    difficulty: Difficulty,
    cfg: &PercentageConfig,
) -> Result<PercentageProblem, DrillError> {
    let mut problem = sample_once(rng, cfg, difficulty)?;
    let mut attempts = 1;
    while is_rejected(problem.answer, difficulty) {
        if attempts >= MAX_ATTEMPTS {
            warn!("{}", DrillError::SamplingExhausted { engine: "percentage", attempts });
            problem.used_fallback = true;
            return Ok(problem);
        }
        problem = sample_once(rng, cfg, difficulty)?;
        attempts += 1;
    }
    debug!("percentage problem {} = {} after {} draw(s)", problem.display, problem.answer, attempts);
    Ok(problem)
}

/// `|user - answer| <= tolerance`, boundary inclusive.
pub fn is_percentage_correct(problem: &PercentageProblem, user_answer: f64) -> bool {
    within_tolerance(user_answer, problem.answer, tolerance_for(problem.decimal_places))
}
