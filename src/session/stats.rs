use serde::{Deserialize, Serialize};

/// Running counters for the session in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCounters {
    pub question_count: u32,
    pub correct_count: u32,
    pub streak: u32,
    pub best_streak: u32,
}

impl SessionCounters {
    /// Count one answered question. A miss resets the streak to 0.
    pub fn record(&mut self, correct: bool) -> u32 {
        self.question_count += 1;
        if correct {
            self.correct_count += 1;
            self.streak += 1;
            self.best_streak = self.best_streak.max(self.streak);
        } else {
            self.streak = 0;
        }
        self.streak
    }

    /// Percentage of correct answers, 0 when nothing was answered.
    pub fn accuracy(&self) -> f64 {
        accuracy(self.correct_count, self.question_count)
    }
}

pub fn accuracy(correct: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        correct as f64 * 100.0 / total as f64
    }
}

/// `{current, total, percentage}` for sessions with a fixed length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub current: u32,
    pub total: u32,
    pub percentage: f64,
}

impl Progress {
    pub fn new(current: u32, total: u32) -> Self {
        let percentage = if total == 0 { 0.0 } else { current.min(total) as f64 * 100.0 / total as f64 };
        Progress { current, total, percentage }
    }
}

/// What one finished session contributes to the aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub attempted: u32,
    pub correct: u32,
    pub accuracy: f64,
    pub best_streak: u32,
    pub duration_ms: u64,
    pub score: Option<u32>,
}

impl SessionSummary {
    pub fn from_counters(counters: &SessionCounters, duration_ms: u64, score: Option<u32>) -> Self {
        SessionSummary {
            attempted: counters.question_count,
            correct: counters.correct_count,
            accuracy: counters.accuracy(),
            best_streak: counters.best_streak,
            duration_ms,
            score,
        }
    }
}

/// Cross-session totals and bests, persisted flat inside each mode record.
///
/// Counters only ever grow and bests only ever rise; the one exception is
/// an explicit [`AggregateStats::clear`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateStats {
    pub games_played: u32,
    pub total_attempted: u64,
    pub total_correct: u64,
    pub best_streak: u32,
    pub best_accuracy: f64,
    pub best_score: u32,
}

impl AggregateStats {
    /// Per-answer update, used by modes that persist after every answer.
    pub fn record_answer(&mut self, correct: bool, streak: u32) {
        self.total_attempted += 1;
        if correct {
            self.total_correct += 1;
        }
        self.best_streak = self.best_streak.max(streak);
    }

    /// Count the game and raise the bests, without touching answer totals.
    pub fn close_game(&mut self, summary: &SessionSummary) {
        self.games_played += 1;
        self.best_streak = self.best_streak.max(summary.best_streak);
        if summary.accuracy > self.best_accuracy {
            self.best_accuracy = summary.accuracy;
        }
        if let Some(score) = summary.score {
            self.best_score = self.best_score.max(score);
        }
    }

    /// Fold a whole session in at once.
    pub fn fold(&mut self, summary: &SessionSummary) {
        self.total_attempted += summary.attempted as u64;
        self.total_correct += summary.correct as u64;
        self.close_game(summary);
    }

    pub fn lifetime_accuracy(&self) -> f64 {
        if self.total_attempted == 0 {
            0.0
        } else {
            self.total_correct as f64 * 100.0 / self.total_attempted as f64
        }
    }

    pub fn clear(&mut self) {
        *self = AggregateStats::default();
    }
}
