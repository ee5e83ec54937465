//! World state and core simulation types
//!
//! Everything a run needs lives in `World`; the stepper and the generator
//! receive it by `&mut` and nothing else holds on to it.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::puzzle::Puzzle;
use crate::consts::*;
use crate::tuning::{Difficulty, DifficultyTuning};
use crate::{platform_width, player_radius};

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Three second countdown, player hovers at the spawn point
    Countdown,
    /// Active gameplay
    Playing,
    /// Pattern completed
    Won,
    /// Wrong bit or fell off the screen
    Lost,
}

impl GamePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::Won | GamePhase::Lost)
    }
}

/// Why a run was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossReason {
    WrongBit,
    Fell,
}

/// Things that happened during a tick, for haptics and HUD feedback.
/// Cleared at the start of every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    CountdownFinished,
    Landed { kind: PlatformKind },
    CoinCollected,
    BitCollected { bit: u8, index: usize },
    WrongBit { got: u8, wanted: u8 },
    Fell,
    Won,
}

/// The player avatar
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Player {
    /// Center position (screen pixels)
    pub pos: Vec2,
    /// Vertical velocity (pixels/s, +y is down)
    pub vy: f32,
    pub radius: f32,
}

/// Platform types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlatformKind {
    #[default]
    Static,
    /// Slides horizontally and bounces off the lane edges
    Moving,
    /// Gives way shortly after being landed on, comes back later
    Breaking,
    /// Stronger jump
    Bouncy,
    /// Solid but never carries a collectible; the escape route in bit rows
    Blank,
}

/// A platform entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: u32,
    /// Top-left corner
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub kind: PlatformKind,
    /// Horizontal velocity (moving platforms only)
    pub vx: f32,
    /// World time at which an armed breaking platform gives way
    pub break_at_ms: Option<f64>,
    /// World time at which it broke
    pub broke_at_ms: Option<f64>,
    /// World time at which a broken platform comes back
    pub respawn_at_ms: Option<f64>,
}

impl Platform {
    pub fn new(id: u32, x: f32, y: f32, w: f32, kind: PlatformKind) -> Self {
        Self {
            id,
            x,
            y,
            w,
            h: PLATFORM_H,
            kind,
            vx: 0.0,
            break_at_ms: None,
            broke_at_ms: None,
            respawn_at_ms: None,
        }
    }

    /// Broken platforms are intangible
    pub fn is_broken(&self) -> bool {
        self.broke_at_ms.is_some()
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    /// Advance a moving platform, bouncing off `[MOVING_EDGE, width - MOVING_EDGE]`
    pub fn slide(&mut self, dt: f32, width: f32) {
        if self.kind != PlatformKind::Moving {
            return;
        }
        self.x += self.vx * dt;
        if self.x < MOVING_EDGE {
            self.x = MOVING_EDGE;
            self.vx = self.vx.abs();
        }
        if self.x + self.w > width - MOVING_EDGE {
            self.x = width - MOVING_EDGE - self.w;
            self.vx = -self.vx.abs();
        }
    }

    /// Arm the break timer (first landing only)
    pub fn arm_break(&mut self, now_ms: f64) {
        if self.kind == PlatformKind::Breaking && self.break_at_ms.is_none() {
            self.break_at_ms = Some(now_ms + BREAK_DELAY_MS);
        }
    }

    /// Advance the break/respawn cycle to `now_ms`
    pub fn update_break(&mut self, now_ms: f64) {
        if self.kind != PlatformKind::Breaking {
            return;
        }
        match (self.break_at_ms, self.broke_at_ms, self.respawn_at_ms) {
            (Some(at), None, _) if now_ms >= at => {
                self.broke_at_ms = Some(now_ms);
                self.respawn_at_ms = Some(now_ms + BREAK_RESPAWN_MS);
            }
            (_, Some(_), Some(respawn)) if now_ms >= respawn => {
                self.break_at_ms = None;
                self.broke_at_ms = None;
                self.respawn_at_ms = None;
            }
            _ => {}
        }
    }
}

/// Collectible types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectibleKind {
    Bit(u8),
    Coin,
}

/// A collectible entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub pos: Vec2,
    pub kind: CollectibleKind,
    pub collected: bool,
    /// Bits only: shows the bit its pattern slot wants (rather than the other one)
    pub on_target: bool,
    /// Bits only: the player landed above it without taking it
    pub passed: bool,
}

impl Collectible {
    pub fn new(id: u32, pos: Vec2, kind: CollectibleKind) -> Self {
        Self {
            id,
            pos,
            kind,
            collected: false,
            on_target: true,
            passed: false,
        }
    }

    /// A bit the player can still reach and take
    pub fn is_pending_bit(&self) -> bool {
        matches!(self.kind, CollectibleKind::Bit(_)) && !self.collected && !self.passed
    }
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct World {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub difficulty: Difficulty,
    pub tuning: DifficultyTuning,
    /// Row gap after the reachability clamp
    pub gap: f32,
    /// Viewport size (pixels)
    pub width: f32,
    pub height: f32,
    pub platform_w: f32,

    pub phase: GamePhase,
    pub loss_reason: Option<LossReason>,
    pub player: Player,
    /// Platforms (ascending id)
    pub platforms: Vec<Platform>,
    /// Collectibles (ascending id)
    pub collectibles: Vec<Collectible>,

    pub puzzle: Puzzle,
    pub pattern_index: usize,
    pub score: u64,
    pub combo: u32,
    pub errors: u32,

    /// Simulation clock (ms since the run was created)
    pub time_ms: f64,
    /// Time spent in `Playing` (ms)
    pub play_ms: f64,
    /// Total distance scrolled (pixels)
    pub climbed: f32,
    /// Screen y of the highest generated row
    pub top_row_y: f32,
    /// Rows generated so far
    pub rows_generated: u32,
    /// Anchor platform x of the highest row
    pub last_anchor_x: f32,
    /// Rows whose spread fell back to the overlap placement
    pub spacing_fallbacks: u32,

    /// Remaining screen shake (ms)
    pub shake_ms: f32,
    /// Events recorded by the last tick
    pub events: Vec<GameEvent>,
    /// Set once the result bridge has taken the summary
    pub reported: bool,

    next_id: u32,
}

impl World {
    /// Create a run without any platforms. Use `generator::seed_world` (or
    /// `World::start`) to populate it.
    pub fn new(seed: u64, difficulty: Difficulty, width: f32, height: f32) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let tuning = difficulty.tuning();
        let puzzle = Puzzle::generate(tuning.bits_len, &mut rng);
        let gap = tuning.reachable_gap();
        let radius = player_radius(width, height);
        let spawn = Self::spawn_point(width, height);

        Self {
            seed,
            rng,
            difficulty,
            tuning,
            gap,
            width,
            height,
            platform_w: platform_width(width),
            phase: GamePhase::Countdown,
            loss_reason: None,
            player: Player {
                pos: spawn,
                vy: 0.0,
                radius,
            },
            platforms: Vec::new(),
            collectibles: Vec::new(),
            puzzle,
            pattern_index: 0,
            score: 0,
            combo: 0,
            errors: 0,
            time_ms: 0.0,
            play_ms: 0.0,
            climbed: 0.0,
            top_row_y: spawn.y,
            rows_generated: 0,
            last_anchor_x: (width - platform_width(width)) / 2.0,
            spacing_fallbacks: 0,
            shake_ms: 0.0,
            events: Vec::new(),
            reported: false,
            next_id: 1,
        }
    }

    /// Create and populate a run
    pub fn start(seed: u64, difficulty: Difficulty, width: f32, height: f32) -> Self {
        let mut world = Self::new(seed, difficulty, width, height);
        super::generator::seed_world(&mut world);
        log::info!(
            "Run started: seed={} difficulty={} pattern={} ({} {} {})",
            seed,
            difficulty,
            super::puzzle::bits_to_string(world.pattern()),
            super::puzzle::bits_to_string(world.puzzle.a_bits()),
            world.puzzle.op().as_str(),
            super::puzzle::bits_to_string(world.puzzle.b_bits()),
        );
        world
    }

    /// Where the player appears
    pub fn spawn_point(width: f32, height: f32) -> Vec2 {
        Vec2::new(width * 0.5, height - SPAWN_FROM_BOTTOM)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// The required bit sequence
    pub fn pattern(&self) -> &[u8] {
        self.puzzle.result_bits()
    }

    /// Next bit the player must collect (None once complete)
    pub fn wanted_bit(&self) -> Option<u8> {
        self.pattern().get(self.pattern_index).copied()
    }

    pub fn is_pattern_complete(&self) -> bool {
        self.pattern_index >= self.pattern().len()
    }

    /// Enter a terminal phase. Only the first call has any effect.
    pub fn finish(&mut self, won: bool, reason: Option<LossReason>) -> bool {
        if self.phase.is_terminal() {
            return false;
        }
        if won {
            self.phase = GamePhase::Won;
            self.events.push(GameEvent::Won);
            log::info!("Run won in {:.0} ms (score {})", self.play_ms, self.score);
        } else {
            self.phase = GamePhase::Lost;
            self.loss_reason = reason;
            self.shake_ms = SHAKE_MS;
            log::info!("Run lost ({:?}) at bit {}/{}", reason, self.pattern_index, self.pattern().len());
        }
        true
    }

    /// Countdown seconds left to show (3, 2, 1), None outside the countdown
    pub fn countdown_remaining(&self) -> Option<u32> {
        if self.phase != GamePhase::Countdown {
            return None;
        }
        let left = (COUNTDOWN_MS - self.time_ms).max(0.0);
        Some((left / 1000.0).ceil().max(1.0) as u32)
    }
}
