//! Result bridge: turns a finished run into a summary, exactly once, and
//! records it against the personal best

use serde::{Deserialize, Serialize};

use crate::best_score::BestScores;
use crate::scoring;
use crate::sim::{LossReason, World};
use crate::tuning::Difficulty;

/// Category reported to the scoring backend
pub const CATEGORY: &str = "BIT_JUMPER";

/// Outcome of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub category: String,
    pub difficulty: Difficulty,
    /// Time spent playing (ms, countdown excluded)
    pub time_ms: u64,
    pub errors: u32,
    pub won: bool,
    /// In-game score
    pub score: u64,
    pub loss_reason: Option<LossReason>,
    /// Bits collected when the run ended
    pub bits_collected: usize,
    pub bits_total: usize,
    /// The score beat the stored best for its difficulty
    pub new_best: bool,
}

impl RunSummary {
    /// Points for the scoring backend
    pub fn points(&self) -> u32 {
        scoring::compute_points(self.difficulty, self.time_ms, self.errors, self.won)
    }
}

/// Take the summary of a terminal world and persist a new best score.
///
/// Returns `Some` the first time it is called after the run ended and `None`
/// on every later call, or while the run is still going.
pub fn finalize(world: &mut World, best: &mut BestScores) -> Option<RunSummary> {
    if !world.phase.is_terminal() || world.reported {
        return None;
    }
    world.reported = true;

    let summary = RunSummary {
        category: CATEGORY.to_string(),
        difficulty: world.difficulty,
        time_ms: world.play_ms.max(0.0).round() as u64,
        errors: world.errors,
        won: world.phase == crate::sim::GamePhase::Won,
        score: world.score,
        loss_reason: world.loss_reason,
        bits_collected: world.pattern_index,
        bits_total: world.pattern().len(),
        new_best: best.record(world.difficulty, world.score),
    };
    log::info!(
        "Run finished: won={} score={} time={}ms errors={} points={}",
        summary.won,
        summary.score,
        summary.time_ms,
        summary.errors,
        summary.points()
    );
    Some(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GamePhase;

    fn world() -> World {
        World::new(3, Difficulty::Medium, 400.0, 700.0)
    }

    fn finalize_fresh(w: &mut World) -> Option<RunSummary> {
        finalize(w, &mut BestScores::new())
    }

    #[test]
    fn test_no_summary_while_playing() {
        let mut w = world();
        assert!(finalize_fresh(&mut w).is_none());
        w.phase = GamePhase::Playing;
        assert!(finalize_fresh(&mut w).is_none());
        assert!(!w.reported);
    }

    #[test]
    fn test_summary_fires_once() {
        let mut w = world();
        w.phase = GamePhase::Playing;
        w.play_ms = 41_234.6;
        w.score = 512;
        w.pattern_index = w.pattern().len();
        w.finish(true, None);

        let summary = finalize_fresh(&mut w).unwrap();
        assert_eq!(summary.category, "BIT_JUMPER");
        assert_eq!(summary.difficulty, Difficulty::Medium);
        assert_eq!(summary.time_ms, 41_235);
        assert!(summary.won);
        assert_eq!(summary.score, 512);
        assert_eq!(summary.bits_collected, summary.bits_total);

        assert!(finalize_fresh(&mut w).is_none());
        assert!(finalize_fresh(&mut w).is_none());
    }

    #[test]
    fn test_lost_run_scores_no_points() {
        let mut w = world();
        w.phase = GamePhase::Playing;
        w.errors = 1;
        w.finish(false, Some(LossReason::WrongBit));

        let summary = finalize_fresh(&mut w).unwrap();
        assert!(!summary.won);
        assert_eq!(summary.loss_reason, Some(LossReason::WrongBit));
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.points(), 0);
    }

    #[test]
    fn test_finished_run_persists_best() {
        let mut best = BestScores::load();
        let mut w = world();
        w.phase = GamePhase::Playing;
        w.score = 640;
        w.finish(false, Some(LossReason::Fell));

        let summary = finalize(&mut w, &mut best).unwrap();
        assert!(summary.new_best);
        assert_eq!(best.get(Difficulty::Medium), 640);
        assert_eq!(BestScores::load().get(Difficulty::Medium), 640);

        // A lower score on the next run leaves the best alone
        let mut w = world();
        w.score = 200;
        w.finish(false, Some(LossReason::Fell));
        let summary = finalize(&mut w, &mut best).unwrap();
        assert!(!summary.new_best);
        assert_eq!(BestScores::load().get(Difficulty::Medium), 640);
    }

    #[test]
    fn test_summary_json_is_camel_case() {
        let mut w = world();
        w.finish(false, Some(LossReason::Fell));
        let json = serde_json::to_string(&finalize_fresh(&mut w).unwrap()).unwrap();
        assert!(json.contains("\"timeMs\":0"));
        assert!(json.contains("\"difficulty\":\"MEDIUM\""));
        assert!(json.contains("\"lossReason\":\"Fell\""));
        assert!(json.contains("\"newBest\":false"));
    }
}
