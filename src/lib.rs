//! Bit Jumper - the bitwise platformer minigame of Code & Conquer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (level generation, physics, bit puzzle)
//! - `renderer`: WebGPU rendering pipeline
//! - `platform`: Browser/native platform abstraction (storage, haptics, clock)
//! - `tuning`: Data-driven difficulty tables
//! - `result`, `scoring`, `submit`, `best_score`: what happens after a run
//! - `snapshot`: Throttled read-only HUD view

pub mod best_score;
pub mod platform;
pub mod renderer;
pub mod result;
pub mod scoring;
pub mod settings;
pub mod sim;
pub mod snapshot;
pub mod submit;
pub mod tuning;

pub use best_score::BestScores;
pub use result::RunSummary;
pub use settings::Settings;
pub use tuning::{Difficulty, DifficultyTuning};

/// Game configuration constants
pub mod consts {
    /// Largest frame delta the stepper accepts (tab resume guard)
    pub const MAX_DT: f32 = 1.0 / 20.0;

    /// Gravity (pixels/s², screen space, +y is down)
    pub const GRAVITY: f32 = 2600.0;
    /// Vertical velocity applied on every landing (pixels/s)
    pub const JUMP_VY: f32 = -980.0;
    /// Jump multiplier for bouncy platforms
    pub const BOUNCY_MULT: f32 = 1.28;
    /// Horizontal steering strength (exponential smoothing rate, 1/s)
    pub const H_CTRL: f32 = 12.5;

    /// Landing tolerance on the vertical crossing
    pub const COYOTE_PX: f32 = 10.0;
    /// Landing tolerance on the horizontal overlap
    pub const COYOTE_X_PAD: f32 = 10.0;

    /// Breaking platforms give way this long after being landed on
    pub const BREAK_DELAY_MS: f64 = 250.0;
    /// ...and come back this long after breaking
    pub const BREAK_RESPAWN_MS: f64 = 1400.0;

    /// Countdown before the first jump
    pub const COUNTDOWN_MS: f64 = 3000.0;

    /// Screen shake duration and amplitude on failures
    pub const SHAKE_MS: f32 = 160.0;
    pub const SHAKE_PX: f32 = 9.0;

    /// Platform geometry
    pub const PLATFORM_H: f32 = 14.0;
    pub const PLATFORM_MIN_W: f32 = 62.0;
    pub const PLATFORM_MAX_W: f32 = 124.0;
    /// Spawn lane margin on both sides
    pub const LANE_MARGIN: f32 = 12.0;
    /// Moving platforms bounce this far from the screen edge
    pub const MOVING_EDGE: f32 = 6.0;
    /// Horizontal speed range for moving platforms (pixels/s)
    pub const MOVING_MIN_SPEED: i32 = 70;
    pub const MOVING_MAX_SPEED: i32 = 135;

    /// Minimum player radius (scales with the viewport above this)
    pub const PLAYER_MIN_RADIUS: f32 = 12.0;
    /// Player spawns this far above the bottom of the screen
    pub const SPAWN_FROM_BOTTOM: f32 = 90.0;

    /// Camera scrolls once the player rises above this fraction of the screen
    pub const CAMERA_FRACTION: f32 = 0.36;
    /// Score per pixel scrolled
    pub const HEIGHT_SCORE_PER_PX: f32 = 0.12;
    /// Run is lost once the player falls this far below the screen
    pub const FALL_MARGIN: f32 = 90.0;
    /// Entities this far below the screen are dropped
    pub const CULL_MARGIN: f32 = 120.0;

    /// Generator keeps rows up to this screen-relative height
    pub const TOP_UP_THRESHOLD_Y: f32 = -140.0;
    /// Generator keeps at least this many platforms alive
    pub const MIN_PLATFORMS: usize = 18;
    /// Placement attempts for extra platforms in a row
    pub const ROW_SPREAD_ATTEMPTS: u32 = 8;
    /// Generated gaps never exceed this share of the maximum jump height
    pub const MAX_GAP_FRACTION: f32 = 0.8;

    /// Collectibles
    pub const COLLECTIBLE_RADIUS: f32 = 11.0;
    /// Collectibles hover this far above their platform's top edge
    pub const COLLECTIBLE_LIFT: f32 = 26.0;

    /// Scoring
    pub const LAND_SCORE: u64 = 1;
    pub const COIN_SCORE: u64 = 25;
    pub const BIT_SCORE: f32 = 18.0;
    pub const COMPLETION_BONUS: u64 = 220;
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Highest point a jump of `jump_vy` reaches under `gravity`
#[inline]
pub fn max_jump_height(jump_vy: f32, gravity: f32) -> f32 {
    jump_vy * jump_vy / (2.0 * gravity)
}

/// Player radius for a viewport
#[inline]
pub fn player_radius(width: f32, height: f32) -> f32 {
    (width.min(height) * 0.03).round().max(consts::PLAYER_MIN_RADIUS)
}

/// Platform width for a viewport width
#[inline]
pub fn platform_width(width: f32) -> f32 {
    (width * 0.22)
        .round()
        .clamp(consts::PLATFORM_MIN_W, consts::PLATFORM_MAX_W)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp(2.0, 10.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 10.0, 1.0), 10.0);
        assert_eq!(lerp(2.0, 10.0, 0.5), 6.0);
    }

    #[test]
    fn test_viewport_scaling() {
        assert_eq!(player_radius(200.0, 300.0), consts::PLAYER_MIN_RADIUS);
        assert_eq!(player_radius(1000.0, 800.0), 24.0);
        assert_eq!(platform_width(100.0), consts::PLATFORM_MIN_W);
        assert_eq!(platform_width(400.0), 88.0);
        assert_eq!(platform_width(2000.0), consts::PLATFORM_MAX_W);
    }

    #[test]
    fn test_max_jump_height() {
        let h = max_jump_height(consts::JUMP_VY, consts::GRAVITY);
        assert!((h - 184.69).abs() < 0.1);
    }
}
