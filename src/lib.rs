//! # mental_math_drill
//!
//! Offline, deterministic problem generators and practice sessions for
//! mental arithmetic.
//!
//! Five drill modes are covered:
//!
//! - **Addition & subtraction** of multi-digit integers.
//! - **Percentage estimation**: express `a/b` as a percentage within a
//!   rounding tolerance.
//! - **Ratio comparison**: pick the larger of two close fractions.
//! - **Divisibility & remainders**: a yes/no claim followed by the remainder.
//! - **Addition chains**: keep a running total across a sequence of addends.
//!
//! ## How it works
//!
//! The crate has two layers:
//!
//! 1. [`training_engine`] is pure: given a difficulty and an RNG it produces
//!    a problem, and given a problem and an answer it says whether the answer
//!    is right. [`generate_problem`] wraps every engine behind one request
//!    type for one-off use.
//! 2. [`session`] runs a practice session per mode on top of the engines:
//!    phases, counters and streaks, timing, and aggregate statistics saved to
//!    a [`session::KeyValueStore`].
//!
//! Time comes from a [`session::Clock`] and randomness from a seedable RNG,
//! so a session can be replayed exactly in tests.
//!
//! ## Quick start
//!
//! ```rust
//! use mental_math_drill::{
//!     generate_problem, Difficulty, DrillMode, Problem, ProblemRequest,
//!     session::{ArithmeticSession, MemoryStore, SystemClock},
//! };
//!
//! // One-off problem:
//! let generated = generate_problem(ProblemRequest {
//!     difficulty: Difficulty::Medium,
//!     rng_seed: Some(42),
//!     ..ProblemRequest::new(DrillMode::Percentage)
//! })
//! .unwrap();
//! println!("{}: {}", generated.problem_id, generated.problem.display());
//! assert!(matches!(generated.problem, Problem::Percentage(_)));
//!
//! // A practice session:
//! let mut session = ArithmeticSession::new(MemoryStore::new(), Box::new(SystemClock), Some(7));
//! let answer = session.start().unwrap().answer;
//! let outcome = session.submit_answer(answer).unwrap();
//! assert!(outcome.correct);
//! assert_eq!(outcome.streak, 1);
//! ```

pub mod session;
pub mod training_engine;

// Convenience re-exports so callers can use `mental_math_drill::generate_problem`
// directly without reaching into `training_engine::`.
pub use training_engine::{
    generate_problem, ArithmeticProblem, Chain, ChainStats, ChainStep, Difficulty,
    DivisibilityProblem, DrillError, DrillMode, EngineOptions, GeneratedProblem, Operation,
    OperationMode, PercentageProblem, Problem, ProblemRequest, Ratio, RatioChoice, RatioProblem,
};
