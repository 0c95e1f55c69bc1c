//! Shared state machine for the one-question-at-a-time modes
//! (arithmetic, percentage, ratio).
//!
//! ```text
//! Idle ──start()──▶ Playing ──end() / question limit──▶ Idle
//!                     │ ▲
//!                     └─┘ submit_answer() / skip()
//! ```
//!
//! Feedback is transient: every answer immediately moves on to the next
//! problem and the verdict is handed back in the [`QuizOutcome`].

use std::fmt;

use log::{debug, info, warn};
use rand::{rngs::StdRng, Rng};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::session::{
    clock::Clock,
    stats::{AggregateStats, Progress, SessionCounters, SessionSummary},
    store::{load_record, save_record, KeyValueStore},
};
use crate::training_engine::{errors::DrillError, generator::rng_for};

/// Settings every quiz mode carries.
pub trait QuizSettings: Serialize + DeserializeOwned + Default + Clone + fmt::Debug {
    /// Questions per session, or `None` to play until `end()`.
    fn question_limit(&self) -> Option<u32>;
}

/// Binds one engine into the quiz state machine.
pub trait QuizMode {
    type Problem: Clone + fmt::Debug;
    type Answer: Clone + fmt::Debug;
    type Settings: QuizSettings;

    const STORE_KEY: &'static str;

    /// Persist totals after every answer rather than once at `end()`.
    const INCREMENTAL_STATS: bool = false;

    fn generate<R: Rng>(rng: &mut R, settings: &Self::Settings) -> Result<Self::Problem, DrillError>;

    fn check(problem: &Self::Problem, answer: &Self::Answer) -> bool;

    fn parse(input: &str) -> Result<Self::Answer, DrillError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuizPhase {
    Idle,
    Playing,
}

impl fmt::Display for QuizPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizPhase::Idle    => write!(f, "idle"),
            QuizPhase::Playing => write!(f, "playing"),
        }
    }
}

/// Persisted per-mode record: settings and aggregate stats side by side in
/// one flat object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizRecord<T> {
    #[serde(flatten)]
    pub settings: T,
    #[serde(flatten)]
    pub stats: AggregateStats,
}

/// One entry of the session result log. `answer` is `None` for a skip.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizResult<P, A> {
    pub problem: P,
    pub answer: Option<A>,
    pub correct: bool,
    pub response_ms: u64,
}

/// Verdict on the problem just answered.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizOutcome<P> {
    pub correct: bool,
    /// The problem that was answered, for showing the correct answer.
    pub problem: P,
    pub streak: u32,
    /// Set when this answer hit the question limit and closed the session.
    pub summary: Option<SessionSummary>,
}

pub struct QuizSession<M: QuizMode, S: KeyValueStore> {
    store: S,
    clock: Box<dyn Clock>,
    rng: StdRng,
    record: QuizRecord<M::Settings>,
    phase: QuizPhase,
    current: Option<M::Problem>,
    counters: SessionCounters,
    results: Vec<QuizResult<M::Problem, M::Answer>>,
    started_at_ms: u64,
    problem_started_at_ms: u64,
}

impl<M: QuizMode, S: KeyValueStore> QuizSession<M, S> {
    /// Load settings and stats from `store`. `rng_seed` makes the problem
    /// sequence reproducible.
    pub fn new(store: S, clock: Box<dyn Clock>, rng_seed: Option<u64>) -> Self {
        let record = load_record(&store, M::STORE_KEY);
        QuizSession {
            store,
            clock,
            rng: rng_for(rng_seed),
            record,
            phase: QuizPhase::Idle,
            current: None,
            counters: SessionCounters::default(),
            results: Vec::new(),
            started_at_ms: 0,
            problem_started_at_ms: 0,
        }
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn current_problem(&self) -> Option<&M::Problem> {
        self.current.as_ref()
    }

    pub fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    pub fn results(&self) -> &[QuizResult<M::Problem, M::Answer>] {
        &self.results
    }

    pub fn settings(&self) -> &M::Settings {
        &self.record.settings
    }

    pub fn stats(&self) -> &AggregateStats {
        &self.record.stats
    }

    pub fn started_at_ms(&self) -> u64 {
        self.started_at_ms
    }

    /// `None` for open-ended sessions.
    pub fn progress(&self) -> Option<Progress> {
        self.record
            .settings
            .question_limit()
            .map(|total| Progress::new(self.counters.question_count, total))
    }

    /// Replace the settings. Only allowed while idle.
    pub fn set_settings(&mut self, settings: M::Settings) -> Result<(), DrillError> {
        if self.phase != QuizPhase::Idle {
            return Err(DrillError::WrongPhase { action: "set_settings", phase: self.phase.to_string() });
        }
        if settings.question_limit() == Some(0) {
            return Err(DrillError::InvalidRange { min: 1, max: 0 });
        }
        self.record.settings = settings;
        self.persist();
        Ok(())
    }

    /// Clear counters and the result log, generate the first problem and
    /// stamp the start time. Restarting mid-session discards the old one.
    pub fn start(&mut self) -> Result<&M::Problem, DrillError> {
        let first = M::generate(&mut self.rng, &self.record.settings)?;
        let now = self.clock.now_ms();
        self.counters = SessionCounters::default();
        self.results.clear();
        self.phase = QuizPhase::Playing;
        self.started_at_ms = now;
        self.problem_started_at_ms = now;
        info!("{} session started with {:?}", M::STORE_KEY, self.record.settings);
        let first: &M::Problem = self.current.insert(first);
        Ok(first)
    }

    pub fn submit_answer(&mut self, answer: M::Answer) -> Result<QuizOutcome<M::Problem>, DrillError> {
        self.answer_current(Some(answer))
    }

    /// Parse raw input first. Unparsable input is rejected with no state
    /// change.
    pub fn submit_input(&mut self, input: &str) -> Result<QuizOutcome<M::Problem>, DrillError> {
        if self.current.is_none() {
            return Err(DrillError::NoProblemAvailable);
        }
        let answer = M::parse(input)?;
        self.answer_current(Some(answer))
    }

    /// Give up on the current problem. Counts as a miss.
    pub fn skip(&mut self) -> Result<QuizOutcome<M::Problem>, DrillError> {
        self.answer_current(None)
    }

    fn answer_current(&mut self, answer: Option<M::Answer>) -> Result<QuizOutcome<M::Problem>, DrillError> {
        let problem = match (&self.phase, &self.current) {
            (QuizPhase::Playing, Some(p)) => p.clone(),
            _ => return Err(DrillError::NoProblemAvailable),
        };
        let correct = answer.as_ref().map_or(false, |a| M::check(&problem, a));

        let answered = self.counters.question_count + 1;
        let finished = self.record.settings.question_limit().map_or(false, |limit| answered >= limit);
        // Draw the next problem before touching any state so a failure
        // leaves the session as it was.
        let next = if finished { None } else { Some(M::generate(&mut self.rng, &self.record.settings)?) };

        let now = self.clock.now_ms();
        let streak = self.counters.record(correct);
        debug!("{} answer {:?} -> correct={} streak={}", M::STORE_KEY, answer, correct, streak);
        if M::INCREMENTAL_STATS {
            self.record.stats.record_answer(correct, streak);
            self.persist();
        }
        self.results.push(QuizResult {
            problem: problem.clone(),
            answer,
            correct,
            response_ms: now.saturating_sub(self.problem_started_at_ms),
        });
        self.current = next;
        self.problem_started_at_ms = now;

        let summary = if finished { self.end() } else { None };
        Ok(QuizOutcome { correct, problem, streak, summary })
    }

    /// Close the session and fold it into the aggregates. Returns `None`
    /// when no session is running. A session with no answers is not counted
    /// as a game.
    pub fn end(&mut self) -> Option<SessionSummary> {
        if self.phase != QuizPhase::Playing {
            return None;
        }
        let duration = self.clock.now_ms().saturating_sub(self.started_at_ms);
        let summary = SessionSummary::from_counters(&self.counters, duration, None);
        self.phase = QuizPhase::Idle;
        self.current = None;

        if summary.attempted > 0 {
            if M::INCREMENTAL_STATS {
                self.record.stats.close_game(&summary);
            } else {
                self.record.stats.fold(&summary);
            }
            self.persist();
        }
        info!(
            "{} session ended: {}/{} correct, best streak {}",
            M::STORE_KEY, summary.correct, summary.attempted, summary.best_streak
        );
        Some(summary)
    }

    /// Back to idle, dropping the session without folding it in.
    pub fn reset(&mut self) {
        self.phase = QuizPhase::Idle;
        self.current = None;
        self.counters = SessionCounters::default();
        self.results.clear();
    }

    /// Zero the persisted aggregates; settings are kept.
    pub fn reset_stats(&mut self) {
        self.record.stats.clear();
        self.persist();
    }

    /// Swap in a specific problem for the one being shown.
    #[cfg(test)]
    pub(crate) fn replace_current(&mut self, problem: M::Problem) {
        self.current = Some(problem);
    }

    fn persist(&mut self) {
        if let Err(e) = save_record(&mut self.store, M::STORE_KEY, &self.record) {
            warn!("could not save {}: {e}", M::STORE_KEY);
        }
    }
}
