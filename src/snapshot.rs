//! Read-only HUD view of the world
//!
//! The game loop publishes a `HudSnapshot` at most every `SNAPSHOT_INTERVAL_MS`
//! so the page overlay never reads the live world.

use serde::Serialize;

use crate::scoring::format_time;
use crate::sim::{GamePhase, World, bits_to_string};
use crate::tuning::Difficulty;

/// Minimum time between two published snapshots
pub const SNAPSHOT_INTERVAL_MS: f64 = 33.0;

/// What the HUD shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HudSnapshot {
    pub phase: GamePhase,
    pub difficulty: Difficulty,
    pub score: u64,
    pub best: u64,
    pub combo: u32,
    pub errors: u32,
    /// "101 AND 011"
    pub expression: String,
    pub pattern: String,
    pub pattern_index: usize,
    /// Bit the player needs next
    pub wanted: Option<u8>,
    pub countdown: Option<u32>,
    /// "m:ss" of play time
    pub time: String,
    /// Submission status line, if any
    pub status: Option<String>,
}

impl HudSnapshot {
    pub fn capture(world: &World, best: u64, status: Option<&str>) -> Self {
        let puzzle = &world.puzzle;
        Self {
            phase: world.phase,
            difficulty: world.difficulty,
            score: world.score,
            best: best.max(world.score),
            combo: world.combo,
            errors: world.errors,
            expression: format!(
                "{} {} {}",
                bits_to_string(puzzle.a_bits()),
                puzzle.op().as_str(),
                bits_to_string(puzzle.b_bits())
            ),
            pattern: bits_to_string(world.pattern()),
            pattern_index: world.pattern_index,
            wanted: world.wanted_bit(),
            countdown: world.countdown_remaining(),
            time: format_time(world.play_ms),
            status: status.map(str::to_string),
        }
    }
}

/// Rate limiter for snapshot publication
#[derive(Debug, Clone, Default)]
pub struct SnapshotThrottle {
    last_ms: Option<f64>,
}

impl SnapshotThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if a snapshot should be published at `now_ms`. `force` bypasses
    /// the interval (phase changes, restart).
    pub fn ready(&mut self, now_ms: f64, force: bool) -> bool {
        let due = match self.last_ms {
            None => true,
            Some(last) => now_ms - last >= SNAPSHOT_INTERVAL_MS || now_ms < last,
        };
        if due || force {
            self.last_ms = Some(now_ms);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{BitOp, Puzzle};

    #[test]
    fn test_throttle_cadence() {
        let mut t = SnapshotThrottle::new();
        assert!(t.ready(0.0, false));
        assert!(!t.ready(16.0, false));
        assert!(!t.ready(32.9, false));
        assert!(t.ready(33.0, false));
        assert!(!t.ready(50.0, false));
        assert!(t.ready(50.0, true));
        assert!(!t.ready(70.0, false));
    }

    #[test]
    fn test_throttle_at_60fps() {
        let mut t = SnapshotThrottle::new();
        let published = (0..60)
            .filter(|i| t.ready(*i as f64 * 1000.0 / 60.0, false))
            .count();
        // Every other frame
        assert_eq!(published, 30);
    }

    #[test]
    fn test_capture() {
        let mut world = World::new(1, Difficulty::Easy, 400.0, 700.0);
        world.puzzle = Puzzle::new(vec![1, 0, 1], vec![0, 1, 1], BitOp::And).unwrap();
        world.pattern_index = 1;
        world.play_ms = 65_000.0;

        let snap = HudSnapshot::capture(&world, 90, Some("Score saved"));
        assert_eq!(snap.expression, "101 AND 011");
        assert_eq!(snap.pattern, "001");
        assert_eq!(snap.wanted, Some(0));
        assert_eq!(snap.countdown, Some(3));
        assert_eq!(snap.time, "01:05");
        assert_eq!(snap.best, 90);
        assert_eq!(snap.status.as_deref(), Some("Score saved"));
    }
}
