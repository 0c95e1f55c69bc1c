use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::session::{
    quiz::{QuizMode, QuizSession, QuizSettings},
    store::PERCENTAGE_KEY,
};
use crate::training_engine::{
    errors::DrillError,
    helpers::parse_decimal_answer,
    models::{Difficulty, PercentageProblem},
    topics::percentage,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PercentageSettings {
    pub difficulty: Difficulty,
    pub question_limit: Option<u32>,
}

impl Default for PercentageSettings {
    fn default() -> Self {
        PercentageSettings { difficulty: Difficulty::default(), question_limit: Some(10) }
    }
}

impl QuizSettings for PercentageSettings {
    fn question_limit(&self) -> Option<u32> {
        self.question_limit
    }
}

pub struct PercentageMode;

impl QuizMode for PercentageMode {
    type Problem = PercentageProblem;
    type Answer = f64;
    type Settings = PercentageSettings;

    const STORE_KEY: &'static str = PERCENTAGE_KEY;

    fn generate<R: Rng>(rng: &mut R, settings: &PercentageSettings) -> Result<PercentageProblem, DrillError> {
        percentage::generate(rng, settings.difficulty)
    }

    fn check(problem: &PercentageProblem, answer: &f64) -> bool {
        percentage::is_percentage_correct(problem, *answer)
    }

    fn parse(input: &str) -> Result<f64, DrillError> {
        parse_decimal_answer(input)
    }
}

pub type PercentageSession<S> = QuizSession<PercentageMode, S>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{clock::ManualClock, quiz::QuizPhase, store::MemoryStore};

    #[test]
    fn session_ends_at_question_limit() {
        let clock = ManualClock::new(0);
        let mut s = PercentageSession::new(MemoryStore::new(), Box::new(clock.clone()), Some(3));
        s.set_settings(PercentageSettings { difficulty: Difficulty::Medium, question_limit: Some(3) })
            .unwrap();
        s.start().unwrap();

        let answer = s.current_problem().unwrap().answer;
        let first = s.submit_answer(answer).unwrap();
        assert!(first.correct);
        assert!(first.summary.is_none());
        assert_eq!(s.progress().unwrap().current, 1);

        s.submit_answer(-1.0).unwrap();
        clock.advance(9_000);
        let last = s.skip().unwrap();
        let summary = last.summary.expect("third answer closes a 3-question session");
        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.correct, 1);
        assert_eq!(summary.duration_ms, 9_000);
        assert_eq!(s.phase(), QuizPhase::Idle);
        assert!(s.current_problem().is_none());

        let stats = s.stats();
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.total_attempted, 3);
        assert_eq!(stats.total_correct, 1);
        assert!((stats.best_accuracy - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(s.progress().unwrap().percentage, 100.0);
    }

    #[test]
    fn tolerance_applies_to_typed_answers() {
        let mut s = PercentageSession::new(MemoryStore::new(), Box::new(ManualClock::new(0)), Some(1));
        s.start().unwrap();
        s.replace_current(PercentageProblem::from_parts(53, 81, 2, Difficulty::Medium));
        assert!(s.submit_input("65.428").unwrap().correct);

        s.replace_current(PercentageProblem::from_parts(53, 81, 2, Difficulty::Medium));
        assert!(!s.submit_input("65.50%").unwrap().correct);
        assert_eq!(s.counters().streak, 0);
    }

    #[test]
    fn bests_are_monotonic_across_sessions() {
        let mut s = PercentageSession::new(MemoryStore::new(), Box::new(ManualClock::new(0)), Some(5));
        s.set_settings(PercentageSettings { difficulty: Difficulty::Easy, question_limit: Some(2) })
            .unwrap();

        s.start().unwrap();
        let a = s.current_problem().unwrap().answer;
        s.submit_answer(a).unwrap();
        let b = s.current_problem().unwrap().answer;
        s.submit_answer(b).unwrap();
        assert_eq!(s.stats().best_accuracy, 100.0);
        assert_eq!(s.stats().best_streak, 2);

        s.start().unwrap();
        s.skip().unwrap();
        s.skip().unwrap();
        assert_eq!(s.stats().games_played, 2);
        assert_eq!(s.stats().best_accuracy, 100.0);
        assert_eq!(s.stats().best_streak, 2);
        assert_eq!(s.stats().total_attempted, 4);
    }

    #[test]
    fn zero_question_limit_is_rejected() {
        let mut s = PercentageSession::new(MemoryStore::new(), Box::new(ManualClock::new(0)), Some(5));
        assert!(s
            .set_settings(PercentageSettings { difficulty: Difficulty::Easy, question_limit: Some(0) })
            .is_err());
    }
}
