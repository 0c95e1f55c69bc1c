use std::ops::RangeInclusive;

use log::debug;
use rand::Rng;
use crate::training_engine::{
    errors::DrillError,
    models::{Chain, ChainStats, ChainStep, Difficulty},
    sampler::{sample_range, uniform_int},
};

/// Points per correct step.
pub const POINTS_PER_CORRECT: u32 = 10;
/// Average seconds per step under which a speed bonus is paid.
pub const SPEED_BONUS_THRESHOLD_SEC: f64 = 5.0;
/// Flat bonus for reaching the end of the chain.
pub const COMPLETION_BONUS: u32 = 50;
/// Longest chain that can be requested.
pub const MAX_CHAIN_LENGTH: u32 = 100;

#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub start: RangeInclusive<i64>,
    /// Addend ranges for steps 1–5, 6–10, 11–15 and 16+.
    pub bands: [RangeInclusive<i64>; 4],
}

pub fn config_for(difficulty: Difficulty) -> ChainConfig {
    match difficulty {
        Difficulty::Novice => ChainConfig {
            start: 1..=20,
            bands: [1..=9, 5..=20, 10..=50, 20..=99],
        },
        Difficulty::Easy => ChainConfig {
            start: 10..=50,
            bands: [5..=20, 10..=50, 20..=99, 50..=199],
        },
        Difficulty::Medium => ChainConfig {
            start: 10..=99,
            bands: [10..=50, 20..=99, 50..=199, 100..=499],
        },
        Difficulty::Hard => ChainConfig {
            start: 50..=199,
            bands: [20..=99, 50..=199, 100..=499, 200..=999],
        },
        Difficulty::Expert => ChainConfig {
            start: 100..=499,
            bands: [50..=199, 100..=499, 200..=999, 500..=1999],
        },
    }
}

/// Band index for a 1-based step number.
pub fn band_index(step: u32) -> usize {
    match step {
        0..=5   => 0,
        6..=10  => 1,
        11..=15 => 2,
        _       => 3,
    }
}

/// Build a chain whose length is drawn uniformly from
/// `[min_length, max_length]`.
///
/// Step 1 adds two fresh starting numbers; every later step adds an addend
/// from the band for its position to the previous step's result.
pub fn generate_chain<R: Rng>(
    rng: &mut R,
    min_length: u32,
    max_length: u32,
    difficulty: Difficulty,
) -> Result<Chain, DrillError> {
    generate_chain_with(rng, min_length, max_length, difficulty, &config_for(difficulty))
}

pub fn generate_chain_with<R: Rng>(
    rng: &mut R,
    min_length: u32,
    max_length: u32,
    difficulty: Difficulty,
    cfg: &ChainConfig,
) -> Result<Chain, DrillError> {
    if min_length == 0 {
        return Err(DrillError::InvalidRange { min: 1, max: 0 });
    }
    if max_length > MAX_CHAIN_LENGTH {
        return Err(DrillError::InvalidRange { min: min_length as i64, max: max_length as i64 });
    }
    let length = uniform_int(rng, min_length as i64, max_length as i64)? as u32;

    let mut steps = Vec::with_capacity(length as usize);
    let first = sample_range(rng, &cfg.start)?;
    let second = sample_range(rng, &cfg.start)?;
    steps.push(ChainStep::new(1, first, second));

    for step in 2..=length {
        let previous = steps[steps.len() - 1].result;
        let addend = sample_range(rng, &cfg.bands[band_index(step)])?;
        steps.push(ChainStep::new(step, previous, addend));
    }

    debug!("chain of {} steps at {}, final total {}", length, difficulty, steps[steps.len() - 1].result);
    Ok(Chain { steps, difficulty })
}

/// Plain integer equality against the step's result.
pub fn validate_step(step: &ChainStep, user_answer: i64) -> bool {
    user_answer == step.result
}

/// Score one played chain:
///
/// ```text
/// accuracy   = correct / total * 100
/// finalScore = correct * 10
///            + round(accuracy * 2)
///            + (avgTimeSec < 5 ? round((5 - avgTimeSec) * 10) : 0)
///            + (completed ? 50 : 0)
/// ```
///
/// `total` is the number of steps answered; an empty run scores only the
/// completion bonus (if any) with zero accuracy and zero average time.
pub fn calculate_chain_stats(
    correct: u32,
    total: u32,
    total_time_ms: u64,
    completed: bool,
) -> ChainStats {
    let accuracy = if total == 0 { 0.0 } else { correct as f64 * 100.0 / total as f64 };
    let avg_time_per_step_sec = if total == 0 {
        0.0
    } else {
        total_time_ms as f64 / 1000.0 / total as f64
    };

    let speed_bonus = if total > 0 && avg_time_per_step_sec < SPEED_BONUS_THRESHOLD_SEC {
        ((SPEED_BONUS_THRESHOLD_SEC - avg_time_per_step_sec) * 10.0).round() as u32
    } else {
        0
    };
    let final_score = correct * POINTS_PER_CORRECT
        + (accuracy * 2.0).round() as u32
        + speed_bonus
        + if completed { COMPLETION_BONUS } else { 0 };

    ChainStats {
        total_steps: total,
        correct_steps: correct,
        accuracy,
        avg_time_per_step_sec,
        completed,
        final_score,
    }
}
