//! Per-mode session state machines, persistence, and timing.
//!
//! ## Module overview
//!
//! | Module         | Purpose |
//! |----------------|---------|
//! | `quiz`         | Generic one-problem-at-a-time session (`QuizSession`) |
//! | `arithmetic`   | Addition/subtraction settings and mode binding |
//! | `percentage`   | Percentage estimation settings and mode binding |
//! | `ratio`        | Ratio comparison settings and mode binding |
//! | `chain`        | Addition chain: setup → playing → review → complete |
//! | `divisibility` | Two-stage divisibility/remainder session |
//! | `stats`        | Session counters, summaries, and persisted aggregates |
//! | `store`        | Key-value persistence and the per-mode record keys |
//! | `clock`        | Injectable time source |
//! | `timer`        | Tickets that guard delayed phase transitions |

pub mod arithmetic;
pub mod chain;
pub mod clock;
pub mod divisibility;
pub mod percentage;
pub mod quiz;
pub mod ratio;
pub mod stats;
pub mod store;
pub mod timer;

pub use arithmetic::{ArithmeticMode, ArithmeticSession, ArithmeticSettings};
pub use chain::{ChainPhase, ChainSession, ChainSettings};
pub use clock::{Clock, ManualClock, SystemClock};
pub use divisibility::{DivisibilityPhase, DivisibilitySession, DivisibilitySettings};
pub use percentage::{PercentageMode, PercentageSession, PercentageSettings};
pub use quiz::{QuizMode, QuizOutcome, QuizPhase, QuizSession};
pub use ratio::{RatioMode, RatioSession, RatioSettings};
pub use stats::{AggregateStats, Progress, SessionSummary};
pub use store::{KeyValueStore, MemoryStore};
pub use timer::TransitionTicket;
