//! Collision tests for the player
//!
//! Landings are one-way: the player only lands while falling, and only when
//! its bottom edge crosses (or ends close to) a platform's top edge. Both the
//! vertical crossing and the horizontal overlap get a few pixels of slack.

use glam::Vec2;

use super::state::{Platform, PlatformKind};
use crate::consts::*;

/// Check whether a falling player lands on `platform` this tick.
///
/// `prev_y` and `y` are the player's center before and after integration.
pub fn lands_on(player_x: f32, radius: f32, prev_y: f32, y: f32, platform: &Platform) -> bool {
    let top = platform.y;
    let bottom_prev = prev_y + radius;
    let bottom_now = y + radius;

    let crossed = bottom_prev <= top && bottom_now >= top;
    let within_y = crossed || (bottom_now - top).abs() <= COYOTE_PX;
    if !within_y {
        return false;
    }

    let left = player_x - radius;
    let right = player_x + radius;
    right >= platform.x - COYOTE_X_PAD && left <= platform.x + platform.w + COYOTE_X_PAD
}

/// Vertical velocity right after landing on a platform of `kind`
#[inline]
pub fn jump_velocity(kind: PlatformKind) -> f32 {
    match kind {
        PlatformKind::Bouncy => JUMP_VY * BOUNCY_MULT,
        _ => JUMP_VY,
    }
}

/// Check whether the player touches a collectible
#[inline]
pub fn picks_up(player_pos: Vec2, radius: f32, collectible_pos: Vec2) -> bool {
    player_pos.distance(collectible_pos) <= radius + COLLECTIBLE_RADIUS
}
