use std::fmt;
use serde::{Deserialize, Serialize};

use crate::training_engine::errors::DrillError;

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

/// Five difficulty levels. Higher levels widen the numeric ranges and, for
/// the ratio engine, tighten the closeness band.
///
/// Serialised as its integer level (1–5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Difficulty {
    Novice = 1,
    Easy = 2,
    Medium = 3,
    Hard = 4,
    Expert = 5,
}

impl Difficulty {
    pub const ALL: [Difficulty; 5] = [
        Difficulty::Novice,
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    /// Integer level, 1..=5.
    pub fn level(self) -> u8 {
        self as u8
    }

    /// Zero-based index into the per-difficulty engine tables.
    pub(crate) fn index(self) -> usize {
        self.level() as usize - 1
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Novice
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = DrillError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(Difficulty::Novice),
            2 => Ok(Difficulty::Easy),
            3 => Ok(Difficulty::Medium),
            4 => Ok(Difficulty::Hard),
            5 => Ok(Difficulty::Expert),
            other => Err(DrillError::InvalidDifficulty(other)),
        }
    }
}

impl From<Difficulty> for u8 {
    fn from(d: Difficulty) -> u8 {
        d.level()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Difficulty::Novice => "Novice",
            Difficulty::Easy   => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard   => "Hard",
            Difficulty::Expert => "Expert",
        };
        write!(f, "{} ({})", s, self.level())
    }
}

// ---------------------------------------------------------------------------
// Arithmetic
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Addition,
    Subtraction,
}

impl Operation {
    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Addition    => "+",
            Operation::Subtraction => "-",
        }
    }
}

/// Operation selection for a session; `Mixed` flips a fair coin per problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OperationMode {
    #[default]
    Addition,
    Subtraction,
    Mixed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArithmeticProblem {
    pub operation: Operation,
    pub operand1: i64,
    pub operand2: i64,
    pub answer: i64,
    pub difficulty: Difficulty,
    /// e.g. "47 + 21"
    pub display: String,
}

impl ArithmeticProblem {
    /// Build a problem from explicit operands. Subtraction always takes the
    /// smaller operand from the larger, so the operands may be reordered.
    pub fn new(operation: Operation, a: i64, b: i64, difficulty: Difficulty) -> Self {
        let (operand1, operand2, answer) = match operation {
            Operation::Addition => (a, b, a + b),
            Operation::Subtraction => {
                let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
                (hi, lo, hi - lo)
            }
        };
        ArithmeticProblem {
            operation,
            operand1,
            operand2,
            answer,
            difficulty,
            display: format!("{} {} {}", operand1, operation.symbol(), operand2),
        }
    }
}

// ---------------------------------------------------------------------------
// Percentage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentageProblem {
    pub numerator: i64,
    pub denominator: i64,
    /// `100 * numerator / denominator`, rounded to `decimal_places`.
    pub answer: f64,
    pub decimal_places: u32,
    pub difficulty: Difficulty,
    /// e.g. "53/81"
    pub display: String,
    /// True when the retry bound was hit and the last sample was kept.
    pub used_fallback: bool,
}

// ---------------------------------------------------------------------------
// Ratio comparison
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ratio {
    pub numerator: i64,
    pub denominator: i64,
    pub value: f64,
    pub display: String,
}

impl Ratio {
    pub fn new(numerator: i64, denominator: i64) -> Self {
        Ratio {
            numerator,
            denominator,
            value: numerator as f64 / denominator as f64,
            display: format!("{}/{}", numerator, denominator),
        }
    }

    pub fn percentage(&self) -> f64 {
        self.value * 100.0
    }
}

/// Which of the two presented ratios is larger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatioChoice {
    A,
    B,
}

impl fmt::Display for RatioChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatioChoice::A => write!(f, "A"),
            RatioChoice::B => write!(f, "B"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioProblem {
    pub ratio_a: Ratio,
    pub ratio_b: Ratio,
    pub correct_answer: RatioChoice,
    /// `(larger - smaller) / smaller * 100`, rounded to 2 decimals.
    pub percentage_diff: f64,
    pub difficulty: Difficulty,
    /// e.g. "17/23 vs 9/13"
    pub display: String,
    pub used_fallback: bool,
}

// ---------------------------------------------------------------------------
// Divisibility
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisibilityProblem {
    pub dividend: i64,
    pub divisor: i64,
    pub quotient: i64,
    /// Always in `0..divisor`.
    pub remainder: i64,
    /// `remainder - divisor` when the remainder is non-zero, else 0.
    pub negative_remainder: i64,
    pub is_divisible: bool,
    pub difficulty: Difficulty,
    /// e.g. "87 ÷ 5"
    pub display: String,
}

impl DivisibilityProblem {
    /// Derive quotient and both remainder conventions from a dividend/divisor
    /// pair. Callers guarantee `divisor > 0` and `dividend >= 0`.
    pub fn new(dividend: i64, divisor: i64, difficulty: Difficulty) -> Self {
        let quotient = dividend / divisor;
        let remainder = dividend % divisor;
        let negative_remainder = if remainder > 0 { remainder - divisor } else { 0 };
        DivisibilityProblem {
            dividend,
            divisor,
            quotient,
            remainder,
            negative_remainder,
            is_divisible: remainder == 0,
            difficulty,
            display: format!("{} ÷ {}", dividend, divisor),
        }
    }
}

// ---------------------------------------------------------------------------
// Addition chain
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStep {
    /// 1-based position in the chain.
    pub step: u32,
    pub previous_result: i64,
    pub addend: i64,
    pub result: i64,
    /// e.g. "134 + 27"
    pub display: String,
}

impl ChainStep {
    pub fn new(step: u32, previous_result: i64, addend: i64) -> Self {
        ChainStep {
            step,
            previous_result,
            addend,
            result: previous_result + addend,
            display: format!("{} + {}", previous_result, addend),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    pub steps: Vec<ChainStep>,
    pub difficulty: Difficulty,
}

impl Chain {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Result of the last step, i.e. the running total at the end of the chain.
    pub fn final_result(&self) -> Option<i64> {
        self.steps.last().map(|s| s.result)
    }
}

/// Final figures for one played chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainStats {
    pub total_steps: u32,
    pub correct_steps: u32,
    pub accuracy: f64,
    pub avg_time_per_step_sec: f64,
    pub completed: bool,
    pub final_score: u32,
}

// ---------------------------------------------------------------------------
// One-shot generation request / response
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrillMode {
    Arithmetic,
    Percentage,
    Ratio,
    Divisibility,
    Chain,
}

impl fmt::Display for DrillMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DrillMode::Arithmetic   => "Addition & Subtraction",
            DrillMode::Percentage   => "Percentage Estimation",
            DrillMode::Ratio        => "Ratio Comparison",
            DrillMode::Divisibility => "Divisibility & Remainders",
            DrillMode::Chain        => "Addition Chain",
        };
        write!(f, "{}", s)
    }
}

/// Mode-specific knobs. Fields that don't apply to the requested mode are
/// ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineOptions {
    pub operation: OperationMode,
    pub include_exact: bool,
    pub chain_min_length: u32,
    pub chain_max_length: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            operation: OperationMode::Mixed,
            include_exact: true,
            chain_min_length: 5,
            chain_max_length: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemRequest {
    pub mode: DrillMode,
    pub difficulty: Difficulty,
    pub rng_seed: Option<u64>,
    pub options: EngineOptions,
}

impl ProblemRequest {
    /// Minimal request: lowest difficulty, entropy seed, default options.
    pub fn new(mode: DrillMode) -> Self {
        ProblemRequest {
            mode,
            difficulty: Difficulty::default(),
            rng_seed: None,
            options: EngineOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Problem {
    Arithmetic(ArithmeticProblem),
    Percentage(PercentageProblem),
    Ratio(RatioProblem),
    Divisibility(DivisibilityProblem),
    Chain(Chain),
}

impl Problem {
    pub fn mode(&self) -> DrillMode {
        match self {
            Problem::Arithmetic(_)   => DrillMode::Arithmetic,
            Problem::Percentage(_)   => DrillMode::Percentage,
            Problem::Ratio(_)        => DrillMode::Ratio,
            Problem::Divisibility(_) => DrillMode::Divisibility,
            Problem::Chain(_)        => DrillMode::Chain,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        match self {
            Problem::Arithmetic(p)   => p.difficulty,
            Problem::Percentage(p)   => p.difficulty,
            Problem::Ratio(p)        => p.difficulty,
            Problem::Divisibility(p) => p.difficulty,
            Problem::Chain(c)        => c.difficulty,
        }
    }

    /// Question text shown to the player. A chain shows its first step.
    pub fn display(&self) -> &str {
        match self {
            Problem::Arithmetic(p)   => &p.display,
            Problem::Percentage(p)   => &p.display,
            Problem::Ratio(p)        => &p.display,
            Problem::Divisibility(p) => &p.display,
            Problem::Chain(c)        => c.steps.first().map(|s| s.display.as_str()).unwrap_or(""),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedProblem {
    /// `<PREFIX>-<8 hex digits>`, e.g. "PC-1A2B3C4D".
    pub problem_id: String,
    pub problem: Problem,
}
