//! Problem engines, one module per drill mode.
//!
//! Every engine exposes a `generate*` function that takes the RNG and a
//! [`Difficulty`](crate::training_engine::models::Difficulty), plus one or
//! more validators that judge a player's answer against the generated
//! problem. Engines are pure: all randomness comes from the caller's RNG.
//!
//! The generator dispatches to these via `generator.rs`; the session state
//! machines call them directly.

/// AR- addition and subtraction by digit count
pub mod arithmetic;
/// PC- fraction to percentage estimation
pub mod percentage;
/// RC- which of two ratios is larger
pub mod ratio;
/// DV- divisibility claim plus remainder
pub mod divisibility;
/// CH- running-total addition chains
pub mod chain;
