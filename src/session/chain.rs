//! Addition-chain session.
//!
//! ```text
//! Setup ─start()─▶ Playing ─last step / end()─▶ Review ─complete(ticket)─▶ Complete
//!   ▲                                                                         │
//!   └──────────────────────────────── reset() ────────────────────────────────┘
//! ```
//!
//! Entering `Review` hands out a [`TransitionTicket`]; the UI fires
//! `complete(ticket)` after its review delay. A ticket issued before a
//! `reset()` or `start()` is ignored.

use std::fmt;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::session::{
    clock::Clock,
    stats::{AggregateStats, Progress, SessionCounters, SessionSummary},
    store::{load_record, save_record, KeyValueStore, CHAIN_KEY},
    timer::{Generation, TransitionTicket},
};
use crate::training_engine::{
    errors::DrillError,
    generator::rng_for,
    helpers::parse_integer_answer,
    models::{Chain, ChainStats, ChainStep, Difficulty},
    topics::chain,
};

/// Completed chains kept in the persisted history.
pub const HISTORY_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainPhase {
    Setup,
    Playing,
    Review,
    Complete,
}

impl fmt::Display for ChainPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainPhase::Setup    => write!(f, "setup"),
            ChainPhase::Playing  => write!(f, "playing"),
            ChainPhase::Review   => write!(f, "review"),
            ChainPhase::Complete => write!(f, "complete"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSettings {
    pub difficulty: Difficulty,
    pub min_length: u32,
    pub max_length: u32,
}

impl Default for ChainSettings {
    fn default() -> Self {
        ChainSettings { difficulty: Difficulty::default(), min_length: 5, max_length: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainHistoryEntry {
    pub score: u32,
    pub accuracy: f64,
    pub length: u32,
    pub completed: bool,
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainRecord {
    #[serde(flatten)]
    pub settings: ChainSettings,
    #[serde(flatten)]
    pub stats: AggregateStats,
    /// Longest chain played to the end.
    pub longest_completed: u32,
    /// Most recent last.
    pub history: Vec<ChainHistoryEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChainStepResult {
    pub step: u32,
    /// `None` when skipped.
    pub user_answer: Option<i64>,
    pub correct: bool,
    pub time_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChainOutcome {
    pub correct: bool,
    pub step: ChainStep,
    pub streak: u32,
    /// Set when this was the last step and the session moved to `Review`.
    pub review: Option<TransitionTicket>,
}

pub struct ChainSession<S: KeyValueStore> {
    store: S,
    clock: Box<dyn Clock>,
    rng: StdRng,
    record: ChainRecord,
    phase: ChainPhase,
    chain: Option<Chain>,
    step_index: usize,
    counters: SessionCounters,
    results: Vec<ChainStepResult>,
    final_stats: Option<ChainStats>,
    generation: Generation,
    started_at_ms: u64,
    step_started_at_ms: u64,
}

impl<S: KeyValueStore> ChainSession<S> {
    pub fn new(store: S, clock: Box<dyn Clock>, rng_seed: Option<u64>) -> Self {
        let record = load_record(&store, CHAIN_KEY);
        ChainSession {
            store,
            clock,
            rng: rng_for(rng_seed),
            record,
            phase: ChainPhase::Setup,
            chain: None,
            step_index: 0,
            counters: SessionCounters::default(),
            results: Vec::new(),
            final_stats: None,
            generation: Generation::default(),
            started_at_ms: 0,
            step_started_at_ms: 0,
        }
    }

    pub fn phase(&self) -> ChainPhase {
        self.phase
    }

    pub fn chain(&self) -> Option<&Chain> {
        self.chain.as_ref()
    }

    /// Step waiting for an answer; `None` outside `Playing`.
    pub fn current_step(&self) -> Option<&ChainStep> {
        match self.phase {
            ChainPhase::Playing => self.chain.as_ref().and_then(|c| c.steps.get(self.step_index)),
            _ => None,
        }
    }

    pub fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    pub fn results(&self) -> &[ChainStepResult] {
        &self.results
    }

    pub fn final_stats(&self) -> Option<&ChainStats> {
        self.final_stats.as_ref()
    }

    pub fn settings(&self) -> &ChainSettings {
        &self.record.settings
    }

    pub fn stats(&self) -> &AggregateStats {
        &self.record.stats
    }

    pub fn history(&self) -> &[ChainHistoryEntry] {
        &self.record.history
    }

    pub fn longest_completed(&self) -> u32 {
        self.record.longest_completed
    }

    pub fn progress(&self) -> Option<Progress> {
        self.chain
            .as_ref()
            .map(|c| Progress::new(self.step_index as u32, c.len() as u32))
    }

    pub fn set_settings(&mut self, settings: ChainSettings) -> Result<(), DrillError> {
        if !matches!(self.phase, ChainPhase::Setup | ChainPhase::Complete) {
            return Err(DrillError::WrongPhase { action: "set_settings", phase: self.phase.to_string() });
        }
        if settings.min_length == 0
            || settings.min_length > settings.max_length
            || settings.max_length > chain::MAX_CHAIN_LENGTH
        {
            return Err(DrillError::InvalidRange {
                min: settings.min_length as i64,
                max: settings.max_length as i64,
            });
        }
        self.record.settings = settings;
        self.persist();
        Ok(())
    }

    /// Draw a new chain and show its first step.
    pub fn start(&mut self) -> Result<&ChainStep, DrillError> {
        let ChainSettings { difficulty, min_length, max_length } = self.record.settings;
        let chain = chain::generate_chain(&mut self.rng, min_length, max_length, difficulty)?;
        let now = self.clock.now_ms();

        self.generation.bump();
        self.phase = ChainPhase::Playing;
        self.step_index = 0;
        self.counters = SessionCounters::default();
        self.results.clear();
        self.final_stats = None;
        self.started_at_ms = now;
        self.step_started_at_ms = now;
        info!("chain session started: {} steps at {}", chain.len(), difficulty);

        let chain: &Chain = self.chain.insert(chain);
        chain.steps.first().ok_or(DrillError::NoProblemAvailable)
    }

    pub fn submit_answer(&mut self, answer: i64) -> Result<ChainOutcome, DrillError> {
        self.answer_step(Some(answer))
    }

    pub fn submit_input(&mut self, input: &str) -> Result<ChainOutcome, DrillError> {
        if self.current_step().is_none() {
            return Err(DrillError::NoProblemAvailable);
        }
        let answer = parse_integer_answer(input)?;
        self.answer_step(Some(answer))
    }

    /// Skip the current step. Counts as a miss.
    pub fn skip(&mut self) -> Result<ChainOutcome, DrillError> {
        self.answer_step(None)
    }

    fn answer_step(&mut self, answer: Option<i64>) -> Result<ChainOutcome, DrillError> {
        let step = self.current_step().cloned().ok_or(DrillError::NoProblemAvailable)?;
        let correct = answer.map_or(false, |a| chain::validate_step(&step, a));
        let now = self.clock.now_ms();

        let streak = self.counters.record(correct);
        self.results.push(ChainStepResult {
            step: step.step,
            user_answer: answer,
            correct,
            time_ms: now.saturating_sub(self.step_started_at_ms),
        });
        self.step_index += 1;
        self.step_started_at_ms = now;
        debug!("chain step {} answer {:?} -> correct={}", step.step, answer, correct);

        let finished = self.chain.as_ref().map_or(true, |c| self.step_index >= c.len());
        let review = if finished { Some(self.enter_review(true)) } else { None };
        Ok(ChainOutcome { correct, step, streak, review })
    }

    /// Stop before the last step. The chain is scored as not completed.
    pub fn end(&mut self) -> Option<TransitionTicket> {
        match self.phase {
            ChainPhase::Playing => Some(self.enter_review(false)),
            _ => None,
        }
    }

    fn enter_review(&mut self, completed: bool) -> TransitionTicket {
        let total_time_ms: u64 = self.results.iter().map(|r| r.time_ms).sum();
        let stats = chain::calculate_chain_stats(
            self.counters.correct_count,
            self.counters.question_count,
            total_time_ms,
            completed,
        );
        debug!("chain review: {:?}", stats);
        self.final_stats = Some(stats);
        self.phase = ChainPhase::Review;
        self.generation.ticket()
    }

    /// Apply the scheduled review → complete transition. Returns `false`
    /// (and changes nothing) for a stale ticket or when not in `Review`.
    pub fn complete(&mut self, ticket: TransitionTicket) -> bool {
        if self.phase != ChainPhase::Review || !self.generation.is_current(ticket) {
            debug!("ignoring stale chain completion in phase {}", self.phase);
            return false;
        }
        self.generation.bump();
        self.phase = ChainPhase::Complete;

        let Some(stats) = self.final_stats.clone() else {
            return true;
        };
        if stats.total_steps == 0 {
            return true;
        }
        let now = self.clock.now_ms();
        let summary = SessionSummary::from_counters(
            &self.counters,
            now.saturating_sub(self.started_at_ms),
            Some(stats.final_score),
        );
        self.record.stats.fold(&summary);

        let length = self.chain.as_ref().map_or(0, |c| c.len() as u32);
        if stats.completed {
            self.record.longest_completed = self.record.longest_completed.max(length);
        }
        self.record.history.push(ChainHistoryEntry {
            score: stats.final_score,
            accuracy: stats.accuracy,
            length,
            completed: stats.completed,
            timestamp_ms: now,
        });
        if self.record.history.len() > HISTORY_LIMIT {
            let excess = self.record.history.len() - HISTORY_LIMIT;
            self.record.history.drain(..excess);
        }
        self.persist();
        info!(
            "chain complete: score {} ({}/{} correct)",
            stats.final_score, stats.correct_steps, stats.total_steps
        );
        true
    }

    /// Back to `Setup`. Outstanding tickets become stale.
    pub fn reset(&mut self) {
        self.generation.bump();
        self.phase = ChainPhase::Setup;
        self.chain = None;
        self.step_index = 0;
        self.counters = SessionCounters::default();
        self.results.clear();
        self.final_stats = None;
    }

    pub fn reset_stats(&mut self) {
        self.record.stats.clear();
        self.record.longest_completed = 0;
        self.record.history.clear();
        self.persist();
    }

    #[cfg(test)]
    pub(crate) fn replace_chain(&mut self, chain: Chain) {
        self.chain = Some(chain);
        self.step_index = 0;
    }

    fn persist(&mut self) {
        if let Err(e) = save_record(&mut self.store, CHAIN_KEY, &self.record) {
            warn!("could not save {CHAIN_KEY}: {e}");
        }
    }
}
