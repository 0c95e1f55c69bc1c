/// Errors raised by the engines and session state machines.
///
/// None of these are fatal: callers treat every variant as "rejected, try
/// again" and session state is left untouched.
#[derive(Debug, thiserror::Error)]
pub enum DrillError {
    #[error("invalid sampling range: min {min} > max {max}")]
    InvalidRange { min: i64, max: i64 },

    #[error("difficulty must be between 1 and 5, got {0}")]
    InvalidDifficulty(u8),

    #[error("no current problem to answer")]
    NoProblemAvailable,

    #[error("answer {input:?} is not a number")]
    UnparsableAnswer { input: String },

    #[error("{engine} sampling exhausted after {attempts} attempts")]
    SamplingExhausted { engine: &'static str, attempts: u32 },

    #[error("{action} is not allowed in phase {phase}")]
    WrongPhase { action: &'static str, phase: String },

    #[error("persistence error: {0}")]
    Persistence(#[from] serde_json::Error),
}
