//! Shared numeric and parsing helpers used across the engines and sessions.
//!
//! Engines only deal in numbers; everything that touches user-typed text goes
//! through the `parse_*` functions here so every mode rejects junk input the
//! same way.

use crate::training_engine::{errors::DrillError, models::RatioChoice};

/// Slack added to tolerance comparisons so that a value exactly on the
/// boundary (e.g. 65.435 vs 65.43 at ±0.005) is not rejected by binary
/// floating-point noise.
const FLOAT_SLACK: f64 = 1e-9;

/// Round `value` to `places` decimal places, half away from zero.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Inclusive range of all integers with exactly `digits` decimal digits.
/// `digit_range(3)` is `100..=999`.
pub fn digit_range(digits: u32) -> (i64, i64) {
    let lo = 10i64.pow(digits.saturating_sub(1));
    let hi = 10i64.pow(digits) - 1;
    (lo, hi)
}

/// `(larger - smaller) / smaller * 100`, rounded to 2 decimals.
///
/// Returns `f64::INFINITY` when the smaller value is zero.
pub fn percentage_diff(a: f64, b: f64) -> f64 {
    let (larger, smaller) = if a >= b { (a, b) } else { (b, a) };
    if smaller == 0.0 {
        return f64::INFINITY;
    }
    round_to((larger - smaller) / smaller * 100.0, 2)
}

/// Inclusive absolute-tolerance check.
pub fn within_tolerance(user: f64, expected: f64, tolerance: f64) -> bool {
    user.is_finite() && (user - expected).abs() <= tolerance + FLOAT_SLACK
}

/// Parse a whole-number answer. Surrounding whitespace and a leading `+` are
/// accepted.
pub fn parse_integer_answer(input: &str) -> Result<i64, DrillError> {
    let trimmed = input.trim();
    trimmed
        .strip_prefix('+')
        .unwrap_or(trimmed)
        .parse::<i64>()
        .map_err(|_| DrillError::UnparsableAnswer { input: input.to_string() })
}

/// Parse a decimal answer. A trailing `%` and a comma decimal separator are
/// accepted ("65,43 %").
pub fn parse_decimal_answer(input: &str) -> Result<f64, DrillError> {
    let cleaned = input.trim().trim_end_matches('%').trim().replace(',', ".");
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(DrillError::UnparsableAnswer { input: input.to_string() }),
    }
}

/// Parse a yes/no claim ("yes", "y", "true", "no", ...).
pub fn parse_bool_answer(input: &str) -> Result<bool, DrillError> {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Ok(true),
        "n" | "no" | "false" | "0" => Ok(false),
        _ => Err(DrillError::UnparsableAnswer { input: input.to_string() }),
    }
}

/// Parse a pick between the two ratios: "a"/"b", "1"/"2" or "left"/"right".
pub fn parse_ratio_choice(input: &str) -> Result<RatioChoice, DrillError> {
    match input.trim().to_ascii_lowercase().as_str() {
        "a" | "1" | "left" => Ok(RatioChoice::A),
        "b" | "2" | "right" => Ok(RatioChoice::B),
        _ => Err(DrillError::UnparsableAnswer { input: input.to_string() }),
    }
}
