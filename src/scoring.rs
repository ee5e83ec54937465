//! Points reported to the scoring backend
//!
//! Independent of the in-game score: each difficulty has a base value and a
//! target time, fast runs earn up to 45% more, errors cost 8% of the base
//! each, and a lost run earns nothing.

use crate::tuning::Difficulty;

/// Time factor bounds
const MIN_TIME_FACTOR: f64 = 0.55;
const MAX_TIME_FACTOR: f64 = 1.45;

/// Share of the base lost per error
const ERROR_PENALTY: f64 = 0.08;

/// Base points for a difficulty
pub fn base_points(difficulty: Difficulty) -> u32 {
    match difficulty {
        Difficulty::Easy => 120,
        Difficulty::Medium => 220,
        Difficulty::Hard => 340,
    }
}

/// Target completion time in seconds
pub fn target_secs(difficulty: Difficulty) -> u32 {
    match difficulty {
        Difficulty::Easy => 60,
        Difficulty::Medium => 90,
        Difficulty::Hard => 120,
    }
}

/// Points earned by a run
pub fn compute_points(difficulty: Difficulty, time_ms: u64, errors: u32, won: bool) -> u32 {
    if !won {
        return 0;
    }
    let base = base_points(difficulty) as f64;
    let secs = ((time_ms as f64) / 1000.0).round().max(1.0);
    let factor = (target_secs(difficulty) as f64 / secs).clamp(MIN_TIME_FACTOR, MAX_TIME_FACTOR);
    let penalty = (errors as f64 * base * ERROR_PENALTY).round();
    (base * factor - penalty).round().max(0.0) as u32
}

/// `mm:ss` for the HUD and result screen
pub fn format_time(ms: f64) -> String {
    let total = (ms.max(0.0) / 1000.0).floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}
