//! Two-stage divisibility session.
//!
//! ```text
//! Setup ─start()─▶ Divisibility ─claim─▶ Remainder ─remainder─▶ Feedback
//!                       ▲                                          │
//!                       └──────────── advance(ticket) ─────────────┤
//!                                                                  ▼
//!                                    Setup ◀─reset()─ Summary ◀─ last problem
//! ```
//!
//! A problem counts as correct only when both the divisibility claim and
//! the remainder are right.

use std::fmt;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::session::{
    clock::Clock,
    stats::{AggregateStats, Progress, SessionCounters, SessionSummary},
    store::{load_record, save_record, KeyValueStore, DIVISIBILITY_KEY},
    timer::{Generation, TransitionTicket},
};
use crate::training_engine::{
    errors::DrillError,
    generator::rng_for,
    helpers::{parse_bool_answer, parse_integer_answer},
    models::{Difficulty, DivisibilityProblem},
    topics::divisibility,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DivisibilityPhase {
    Setup,
    Divisibility,
    Remainder,
    Feedback,
    Summary,
}

impl fmt::Display for DivisibilityPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DivisibilityPhase::Setup        => write!(f, "setup"),
            DivisibilityPhase::Divisibility => write!(f, "divisibility"),
            DivisibilityPhase::Remainder    => write!(f, "remainder"),
            DivisibilityPhase::Feedback     => write!(f, "feedback"),
            DivisibilityPhase::Summary      => write!(f, "summary"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DivisibilitySettings {
    pub difficulty: Difficulty,
    /// Accept `remainder - divisor` as well as the positive remainder.
    pub allow_negative_remainders: bool,
    pub include_exact: bool,
    pub problems_per_session: u32,
}

impl Default for DivisibilitySettings {
    fn default() -> Self {
        DivisibilitySettings {
            difficulty: Difficulty::default(),
            allow_negative_remainders: true,
            include_exact: true,
            problems_per_session: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DivisibilityRecord {
    #[serde(flatten)]
    pub settings: DivisibilitySettings,
    #[serde(flatten)]
    pub stats: AggregateStats,
    pub divisibility_correct: u64,
    pub remainder_correct: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DivisibilityResult {
    pub problem: DivisibilityProblem,
    pub claimed_divisible: bool,
    pub divisibility_correct: bool,
    pub remainder_answer: i64,
    pub remainder_correct: bool,
    pub response_ms: u64,
}

impl DivisibilityResult {
    pub fn correct(&self) -> bool {
        self.divisibility_correct && self.remainder_correct
    }
}

/// Verdict after the second stage. `ticket` schedules the feedback delay.
#[derive(Debug, Clone, PartialEq)]
pub struct DivisibilityOutcome {
    pub result: DivisibilityResult,
    pub streak: u32,
    pub ticket: TransitionTicket,
}

pub struct DivisibilitySession<S: KeyValueStore> {
    store: S,
    clock: Box<dyn Clock>,
    rng: StdRng,
    record: DivisibilityRecord,
    phase: DivisibilityPhase,
    current: Option<DivisibilityProblem>,
    pending_claim: Option<bool>,
    counters: SessionCounters,
    /// Per-stage hits this session; folded into the record at the end.
    claims_correct: u32,
    remainders_correct: u32,
    results: Vec<DivisibilityResult>,
    generation: Generation,
    summary: Option<SessionSummary>,
    started_at_ms: u64,
    problem_started_at_ms: u64,
}

impl<S: KeyValueStore> DivisibilitySession<S> {
    pub fn new(store: S, clock: Box<dyn Clock>, rng_seed: Option<u64>) -> Self {
        let record = load_record(&store, DIVISIBILITY_KEY);
        DivisibilitySession {
            store,
            clock,
            rng: rng_for(rng_seed),
            record,
            phase: DivisibilityPhase::Setup,
            current: None,
            pending_claim: None,
            counters: SessionCounters::default(),
            claims_correct: 0,
            remainders_correct: 0,
            results: Vec::new(),
            generation: Generation::default(),
            summary: None,
            started_at_ms: 0,
            problem_started_at_ms: 0,
        }
    }

    pub fn phase(&self) -> DivisibilityPhase {
        self.phase
    }

    pub fn current_problem(&self) -> Option<&DivisibilityProblem> {
        self.current.as_ref()
    }

    pub fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    pub fn results(&self) -> &[DivisibilityResult] {
        &self.results
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn settings(&self) -> &DivisibilitySettings {
        &self.record.settings
    }

    pub fn record(&self) -> &DivisibilityRecord {
        &self.record
    }

    pub fn stats(&self) -> &AggregateStats {
        &self.record.stats
    }

    pub fn progress(&self) -> Progress {
        Progress::new(self.counters.question_count, self.record.settings.problems_per_session)
    }

    pub fn set_settings(&mut self, settings: DivisibilitySettings) -> Result<(), DrillError> {
        if !matches!(self.phase, DivisibilityPhase::Setup | DivisibilityPhase::Summary) {
            return Err(self.wrong_phase("set_settings"));
        }
        if settings.problems_per_session == 0 {
            return Err(DrillError::InvalidRange { min: 1, max: 0 });
        }
        self.record.settings = settings;
        self.persist();
        Ok(())
    }

    pub fn start(&mut self) -> Result<&DivisibilityProblem, DrillError> {
        let first = self.draw()?;
        let now = self.clock.now_ms();
        self.generation.bump();
        self.phase = DivisibilityPhase::Divisibility;
        self.pending_claim = None;
        self.counters = SessionCounters::default();
        self.claims_correct = 0;
        self.remainders_correct = 0;
        self.results.clear();
        self.summary = None;
        self.started_at_ms = now;
        self.problem_started_at_ms = now;
        info!("divisibility session started with {:?}", self.record.settings);
        let first: &DivisibilityProblem = self.current.insert(first);
        Ok(first)
    }

    /// First stage. Returns whether the claim was right; the session moves
    /// on to the remainder question either way.
    pub fn submit_divisibility(&mut self, claims_divisible: bool) -> Result<bool, DrillError> {
        if self.phase != DivisibilityPhase::Divisibility {
            return Err(self.wrong_phase("submit_divisibility"));
        }
        let problem = self.current.as_ref().ok_or(DrillError::NoProblemAvailable)?;
        let correct = divisibility::validate_divisibility_answer(problem, claims_divisible);
        debug!("{} divisible? {} -> {}", problem.display, claims_divisible, correct);
        self.pending_claim = Some(claims_divisible);
        self.phase = DivisibilityPhase::Remainder;
        Ok(correct)
    }

    pub fn submit_divisibility_input(&mut self, input: &str) -> Result<bool, DrillError> {
        if self.phase != DivisibilityPhase::Divisibility {
            return Err(self.wrong_phase("submit_divisibility"));
        }
        let claim = parse_bool_answer(input)?;
        self.submit_divisibility(claim)
    }

    /// Second stage. Records the problem and enters `Feedback`.
    pub fn submit_remainder(&mut self, remainder: i64) -> Result<DivisibilityOutcome, DrillError> {
        if self.phase != DivisibilityPhase::Remainder {
            return Err(self.wrong_phase("submit_remainder"));
        }
        let problem = self.current.clone().ok_or(DrillError::NoProblemAvailable)?;
        let claim = self.pending_claim.take().ok_or(DrillError::NoProblemAvailable)?;

        let divisibility_correct = divisibility::validate_divisibility_answer(&problem, claim);
        let remainder_correct = divisibility::validate_remainder_answer(
            &problem,
            remainder,
            self.record.settings.allow_negative_remainders,
        );
        let now = self.clock.now_ms();
        let result = DivisibilityResult {
            problem,
            claimed_divisible: claim,
            divisibility_correct,
            remainder_answer: remainder,
            remainder_correct,
            response_ms: now.saturating_sub(self.problem_started_at_ms),
        };
        let streak = self.counters.record(result.correct());
        self.claims_correct += divisibility_correct as u32;
        self.remainders_correct += remainder_correct as u32;
        debug!(
            "{} remainder {} -> divisibility={} remainder={}",
            result.problem.display, remainder, divisibility_correct, remainder_correct
        );
        self.results.push(result.clone());
        self.phase = DivisibilityPhase::Feedback;
        Ok(DivisibilityOutcome { result, streak, ticket: self.generation.ticket() })
    }

    pub fn submit_remainder_input(&mut self, input: &str) -> Result<DivisibilityOutcome, DrillError> {
        if self.phase != DivisibilityPhase::Remainder {
            return Err(self.wrong_phase("submit_remainder"));
        }
        let remainder = parse_integer_answer(input)?;
        self.submit_remainder(remainder)
    }

    /// Apply the scheduled feedback → next transition. Moves to the next
    /// problem, or to `Summary` after the last one. Returns `Ok(false)` with
    /// no change for a stale ticket.
    pub fn advance(&mut self, ticket: TransitionTicket) -> Result<bool, DrillError> {
        if self.phase != DivisibilityPhase::Feedback || !self.generation.is_current(ticket) {
            debug!("ignoring stale divisibility advance in phase {}", self.phase);
            return Ok(false);
        }
        if self.counters.question_count >= self.record.settings.problems_per_session {
            self.generation.bump();
            self.finish();
            return Ok(true);
        }
        let next = self.draw()?;
        self.generation.bump();
        self.current = Some(next);
        self.phase = DivisibilityPhase::Divisibility;
        self.problem_started_at_ms = self.clock.now_ms();
        Ok(true)
    }

    /// Stop early and show the summary for what was answered so far.
    pub fn end(&mut self) -> Option<SessionSummary> {
        match self.phase {
            DivisibilityPhase::Setup | DivisibilityPhase::Summary => None,
            _ => {
                self.generation.bump();
                self.finish()
            }
        }
    }

    fn finish(&mut self) -> Option<SessionSummary> {
        let duration = self.clock.now_ms().saturating_sub(self.started_at_ms);
        let summary = SessionSummary::from_counters(&self.counters, duration, None);
        self.phase = DivisibilityPhase::Summary;
        self.current = None;
        self.pending_claim = None;

        if summary.attempted > 0 {
            self.record.stats.fold(&summary);
            self.record.divisibility_correct += self.claims_correct as u64;
            self.record.remainder_correct += self.remainders_correct as u64;
            self.persist();
        }
        info!(
            "divisibility session ended: {}/{} fully correct",
            summary.correct, summary.attempted
        );
        self.summary = Some(summary.clone());
        Some(summary)
    }

    pub fn reset(&mut self) {
        self.generation.bump();
        self.phase = DivisibilityPhase::Setup;
        self.current = None;
        self.pending_claim = None;
        self.counters = SessionCounters::default();
        self.claims_correct = 0;
        self.remainders_correct = 0;
        self.results.clear();
        self.summary = None;
    }

    pub fn reset_stats(&mut self) {
        self.record.stats.clear();
        self.record.divisibility_correct = 0;
        self.record.remainder_correct = 0;
        self.persist();
    }

    #[cfg(test)]
    pub(crate) fn replace_current(&mut self, problem: DivisibilityProblem) {
        self.current = Some(problem);
    }

    fn draw(&mut self) -> Result<DivisibilityProblem, DrillError> {
        let settings = &self.record.settings;
        divisibility::generate(&mut self.rng, settings.difficulty, settings.include_exact)
    }

    fn wrong_phase(&self, action: &'static str) -> DrillError {
        DrillError::WrongPhase { action, phase: self.phase.to_string() }
    }

    fn persist(&mut self) {
        if let Err(e) = save_record(&mut self.store, DIVISIBILITY_KEY, &self.record) {
            warn!("could not save {DIVISIBILITY_KEY}: {e}");
        }
    }
}
