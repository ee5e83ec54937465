//! Personal best per difficulty
//!
//! One integer per difficulty, persisted at `bitjumper_best_<DIFFICULTY>`.

use crate::platform::storage;
use crate::tuning::Difficulty;

/// Best scores for every difficulty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BestScores {
    easy: u64,
    medium: u64,
    hard: u64,
}

impl BestScores {
    /// LocalStorage key for a difficulty
    pub fn storage_key(difficulty: Difficulty) -> String {
        format!("bitjumper_best_{}", difficulty.as_str())
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, difficulty: Difficulty) -> u64 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }

    fn slot(&mut self, difficulty: Difficulty) -> &mut u64 {
        match difficulty {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Medium => &mut self.medium,
            Difficulty::Hard => &mut self.hard,
        }
    }

    /// Check if a score beats the stored best
    pub fn qualifies(&self, difficulty: Difficulty, score: u64) -> bool {
        score > 0 && score > self.get(difficulty)
    }

    /// Record a finished run's score. Returns true and persists it if it is
    /// a new best.
    pub fn record(&mut self, difficulty: Difficulty, score: u64) -> bool {
        if !self.qualifies(difficulty, score) {
            return false;
        }
        *self.slot(difficulty) = score;
        storage::set_item(&Self::storage_key(difficulty), &score.to_string());
        log::info!("New best for {}: {}", difficulty, score);
        true
    }

    /// Load all difficulties. Missing or unparsable entries count as 0.
    pub fn load() -> Self {
        let mut best = Self::new();
        for difficulty in Difficulty::ALL {
            let value = storage::get_trimmed(&Self::storage_key(difficulty))
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v > 0.0)
                .map(|v| v.round() as u64)
                .unwrap_or(0);
            *best.slot(difficulty) = value;
        }
        best
    }
}
