//! Data-driven difficulty tables
//!
//! The challenge-selection flow hands us a difficulty string; everything the
//! generator and the scoring formula vary by difficulty lives here.

use serde::{Deserialize, Serialize};

use crate::consts::{GRAVITY, JUMP_VY, MAX_GAP_FRACTION};
use crate::max_jump_height;

/// Challenge difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }

    /// Parse a difficulty string, accepting the short forms the board uses
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "EASY" | "E" => Some(Difficulty::Easy),
            "MEDIUM" | "MED" | "M" => Some(Difficulty::Medium),
            "HARD" | "H" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Parse with the board's fallback: anything unknown plays as EASY
    pub fn normalize(s: Option<&str>) -> Self {
        s.and_then(Self::parse).unwrap_or_default()
    }

    pub fn tuning(&self) -> DifficultyTuning {
        DifficultyTuning::for_difficulty(*self)
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generator parameters for one difficulty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyTuning {
    /// Length of the puzzle bit vectors (and of the target pattern)
    pub bits_len: usize,
    /// Vertical distance between rows (pixels)
    pub gap: f32,
    /// Platform type weights (static is always 1.0)
    pub moving_w: f32,
    pub breaking_w: f32,
    pub bouncy_w: f32,
    /// Every n-th row carries a bit collectible
    pub bit_every: u32,
    /// Chance a row without a bit carries a coin
    pub coin_p: f64,
    /// Chance a bit collectible shows the bit wanted at its pattern slot
    /// (what the player needs on reaching it, if every earlier bit row was taken)
    pub collectible_match_p: f64,
}

impl DifficultyTuning {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                bits_len: 3,
                gap: 86.0,
                moving_w: 0.14,
                breaking_w: 0.12,
                bouncy_w: 0.12,
                bit_every: 2,
                coin_p: 0.25,
                collectible_match_p: 0.7,
            },
            Difficulty::Medium => Self {
                bits_len: 4,
                gap: 92.0,
                moving_w: 0.18,
                breaking_w: 0.14,
                bouncy_w: 0.14,
                bit_every: 2,
                coin_p: 0.2,
                collectible_match_p: 0.6,
            },
            Difficulty::Hard => Self {
                bits_len: 5,
                gap: 98.0,
                moving_w: 0.22,
                breaking_w: 0.16,
                bouncy_w: 0.16,
                bit_every: 3,
                coin_p: 0.15,
                collectible_match_p: 0.5,
            },
        }
    }

    /// Row gap the generator actually uses: never more than a safe share of
    /// the highest plain jump.
    pub fn reachable_gap(&self) -> f32 {
        let limit = max_jump_height(JUMP_VY, GRAVITY) * MAX_GAP_FRACTION;
        if self.gap > limit {
            log::warn!("Row gap {} exceeds reachable limit {:.1}, clamping", self.gap, limit);
        }
        self.gap.min(limit)
    }
}
