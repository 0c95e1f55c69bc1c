use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::session::{
    quiz::{QuizMode, QuizSession, QuizSettings},
    store::RATIO_KEY,
};
use crate::training_engine::{
    errors::DrillError,
    helpers::parse_ratio_choice,
    models::{Difficulty, RatioChoice, RatioProblem},
    topics::ratio,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatioSettings {
    pub difficulty: Difficulty,
    pub question_limit: Option<u32>,
}

impl Default for RatioSettings {
    fn default() -> Self {
        RatioSettings { difficulty: Difficulty::default(), question_limit: Some(10) }
    }
}

impl QuizSettings for RatioSettings {
    fn question_limit(&self) -> Option<u32> {
        self.question_limit
    }
}

pub struct RatioMode;

impl QuizMode for RatioMode {
    type Problem = RatioProblem;
    type Answer = RatioChoice;
    type Settings = RatioSettings;

    const STORE_KEY: &'static str = RATIO_KEY;

    fn generate<R: Rng>(rng: &mut R, settings: &RatioSettings) -> Result<RatioProblem, DrillError> {
        ratio::generate(rng, settings.difficulty)
    }

    fn check(problem: &RatioProblem, answer: &RatioChoice) -> bool {
        ratio::validate_answer(problem, *answer)
    }

    fn parse(input: &str) -> Result<RatioChoice, DrillError> {
        parse_ratio_choice(input)
    }
}

pub type RatioSession<S> = QuizSession<RatioMode, S>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{clock::ManualClock, store::MemoryStore};

    #[test]
    fn picking_the_larger_ratio_builds_a_streak() {
        let mut s = RatioSession::new(MemoryStore::new(), Box::new(ManualClock::new(0)), Some(21));
        s.set_settings(RatioSettings { difficulty: Difficulty::Hard, question_limit: Some(5) })
            .unwrap();
        s.start().unwrap();
        for expected_streak in 1..=4 {
            let pick = s.current_problem().unwrap().correct_answer;
            let outcome = s.submit_answer(pick).unwrap();
            assert!(outcome.correct);
            assert_eq!(outcome.streak, expected_streak);
        }
        let wrong = match s.current_problem().unwrap().correct_answer {
            RatioChoice::A => "b",
            RatioChoice::B => "a",
        };
        let outcome = s.submit_input(wrong).unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.streak, 0);
        assert!(outcome.summary.is_some());
        assert_eq!(s.stats().best_streak, 4);
        assert_eq!(s.stats().best_accuracy, 80.0);
    }

    #[test]
    fn seeded_sessions_repeat() {
        let first = |seed| {
            let mut s = RatioSession::new(MemoryStore::new(), Box::new(ManualClock::new(0)), Some(seed));
            s.start().unwrap().display.clone()
        };
        assert_eq!(first(77), first(77));
    }
}
