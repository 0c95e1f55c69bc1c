//! Core training engine: problem generation, sampling, and answer checking.
//!
//! ## Module overview
//!
//! | Module      | Purpose |
//! |-------------|---------|
//! | `models`    | All shared types: difficulty, problems, request/response structs |
//! | `errors`    | The crate-wide [`DrillError`] |
//! | `sampler`   | Uniform integer/float sampling with range checks |
//! | `helpers`   | Rounding, tolerance checks, and answer parsing |
//! | `generator` | Single entry point `generate_problem()` — dispatches to topics |
//! | `topics`    | One engine per drill mode |

pub mod errors;
pub mod generator;
pub mod helpers;
pub mod models;
pub mod sampler;
pub mod topics;

// Re-export the public API surface so callers can use
// `training_engine::generate_problem` without reaching into sub-modules.
pub use errors::DrillError;
pub use generator::generate_problem;
pub use models::{
    ArithmeticProblem, Chain, ChainStats, ChainStep, Difficulty, DivisibilityProblem,
    DrillMode, EngineOptions, GeneratedProblem, Operation, OperationMode, PercentageProblem,
    Problem, ProblemRequest, Ratio, RatioChoice, RatioProblem,
};
