//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only (one `Pcg32` per run)
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod generator;
pub mod puzzle;
pub mod state;
pub mod tick;
pub mod weighted;

pub use collision::{jump_velocity, lands_on, picks_up};
pub use generator::{RowPlan, Spacing, decide_collectible_bit, make_row, seed_world, spawn_platform, top_up};
pub use puzzle::{BitOp, Puzzle, bits_to_string};
pub use state::{
    Collectible, CollectibleKind, GameEvent, GamePhase, LossReason, Platform, PlatformKind, Player,
    World,
};
pub use tick::{TickInput, tick};
pub use weighted::{Weighted, pick_weighted};
