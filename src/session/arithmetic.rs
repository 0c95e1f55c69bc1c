use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::session::{
    quiz::{QuizMode, QuizSession, QuizSettings},
    store::ARITHMETIC_KEY,
};
use crate::training_engine::{
    errors::DrillError,
    helpers::parse_integer_answer,
    models::{ArithmeticProblem, Difficulty, OperationMode},
    topics::arithmetic,
};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArithmeticSettings {
    pub difficulty: Difficulty,
    pub operation: OperationMode,
    /// Open-ended by default.
    pub question_limit: Option<u32>,
}

impl QuizSettings for ArithmeticSettings {
    fn question_limit(&self) -> Option<u32> {
        self.question_limit
    }
}

/// Addition/subtraction drill. Totals are persisted after every answer.
pub struct ArithmeticMode;

impl QuizMode for ArithmeticMode {
    type Problem = ArithmeticProblem;
    type Answer = i64;
    type Settings = ArithmeticSettings;

    const STORE_KEY: &'static str = ARITHMETIC_KEY;
    const INCREMENTAL_STATS: bool = true;

    fn generate<R: Rng>(rng: &mut R, settings: &ArithmeticSettings) -> Result<ArithmeticProblem, DrillError> {
        Ok(arithmetic::generate(rng, settings.operation, settings.difficulty))
    }

    fn check(problem: &ArithmeticProblem, answer: &i64) -> bool {
        arithmetic::validate_answer(problem, *answer)
    }

    fn parse(input: &str) -> Result<i64, DrillError> {
        parse_integer_answer(input)
    }
}

pub type ArithmeticSession<S> = QuizSession<ArithmeticMode, S>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{
        clock::ManualClock,
        quiz::QuizPhase,
        store::{KeyValueStore, MemoryStore},
    };
    use crate::training_engine::models::Operation;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session(store: Rc<RefCell<MemoryStore>>, clock: &ManualClock) -> ArithmeticSession<Rc<RefCell<MemoryStore>>> {
        ArithmeticSession::new(store, Box::new(clock.clone()), Some(42))
    }

    #[test]
    fn answers_update_persisted_totals_immediately() {
        let store = Rc::new(RefCell::new(MemoryStore::new()));
        let clock = ManualClock::new(0);
        let mut s = session(Rc::clone(&store), &clock);
        s.start().unwrap();

        let answer = s.current_problem().unwrap().answer;
        s.submit_answer(answer).unwrap();
        s.submit_answer(-1).unwrap();

        let saved = store.borrow().load(ARITHMETIC_KEY).unwrap();
        assert_eq!(saved["total_attempted"], 2);
        assert_eq!(saved["total_correct"], 1);
        assert_eq!(saved["best_streak"], 1);
        assert_eq!(saved["games_played"], 0);

        let summary = s.end().unwrap();
        assert_eq!(summary.attempted, 2);
        assert_eq!(s.stats().games_played, 1);
        assert_eq!(s.stats().total_attempted, 2, "end must not double count");
    }

    #[test]
    fn submit_without_problem_is_rejected() {
        let store = Rc::new(RefCell::new(MemoryStore::new()));
        let clock = ManualClock::new(0);
        let mut s = session(store, &clock);
        assert!(matches!(s.submit_answer(10), Err(DrillError::NoProblemAvailable)));
        assert!(matches!(s.submit_input("10"), Err(DrillError::NoProblemAvailable)));
        assert!(matches!(s.skip(), Err(DrillError::NoProblemAvailable)));
        assert!(s.end().is_none());
    }

    #[test]
    fn unparsable_input_changes_nothing() {
        let store = Rc::new(RefCell::new(MemoryStore::new()));
        let clock = ManualClock::new(0);
        let mut s = session(store, &clock);
        let shown = s.start().unwrap().clone();
        assert!(matches!(s.submit_input("abc"), Err(DrillError::UnparsableAnswer { .. })));
        assert_eq!(s.counters().question_count, 0);
        assert_eq!(s.current_problem(), Some(&shown));
    }

    #[test]
    fn settings_round_trip_through_store() {
        let store = Rc::new(RefCell::new(MemoryStore::new()));
        let clock = ManualClock::new(0);
        let mut s = session(Rc::clone(&store), &clock);
        s.set_settings(ArithmeticSettings {
            difficulty: Difficulty::Hard,
            operation: OperationMode::Subtraction,
            question_limit: None,
        })
        .unwrap();

        let reloaded = session(store, &clock);
        assert_eq!(reloaded.settings().difficulty, Difficulty::Hard);
        assert_eq!(reloaded.settings().operation, OperationMode::Subtraction);
    }

    #[test]
    fn settings_locked_while_playing() {
        let store = Rc::new(RefCell::new(MemoryStore::new()));
        let clock = ManualClock::new(0);
        let mut s = session(store, &clock);
        s.start().unwrap();
        assert!(matches!(
            s.set_settings(ArithmeticSettings::default()),
            Err(DrillError::WrongPhase { .. })
        ));
    }

    #[test]
    fn response_time_is_logged() {
        let store = Rc::new(RefCell::new(MemoryStore::new()));
        let clock = ManualClock::new(10_000);
        let mut s = session(store, &clock);
        s.start().unwrap();
        s.replace_current(ArithmeticProblem::new(Operation::Addition, 47, 21, Difficulty::Novice));
        clock.advance(2_500);
        let outcome = s.submit_input("68").unwrap();
        assert!(outcome.correct);
        assert_eq!(s.results()[0].response_ms, 2_500);
        assert_eq!(s.results()[0].answer, Some(68));
    }

    #[test]
    fn reset_returns_to_idle_and_keeps_totals() {
        let store = Rc::new(RefCell::new(MemoryStore::new()));
        let clock = ManualClock::new(0);
        let mut s = session(store, &clock);
        s.start().unwrap();
        s.skip().unwrap();
        s.reset();
        assert_eq!(s.phase(), QuizPhase::Idle);
        assert!(s.current_problem().is_none());
        assert!(s.results().is_empty());
        assert_eq!(s.counters().question_count, 0);
        assert_eq!(s.stats().total_attempted, 1);

        s.reset_stats();
        assert_eq!(s.stats().total_attempted, 0);
    }
}
