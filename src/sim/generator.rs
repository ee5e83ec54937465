//! Procedural level generation
//!
//! Rows of platforms are generated above the camera as it scrolls. Two
//! constraints hold for every row:
//! - the anchor platform stays within `max_anchor_dx` of the previous row's
//!   anchor, so there is always a path upward
//! - a row carrying a bit collectible has at least two platforms and every
//!   platform but the anchor is `Blank`, so the bit can always be avoided
//!
//! Each pending bit row is aimed at its own pattern slot: the first one at
//! the bit wanted now, the next at the bit after it, and so on.

use rand::Rng;

use super::state::{Collectible, CollectibleKind, Platform, PlatformKind, World};
use super::weighted::{Weighted, pick_weighted};
use crate::consts::*;

/// Row size distribution
const ROW_SIZES: [Weighted<usize>; 3] = [
    Weighted::new(1, 0.70),
    Weighted::new(2, 0.25),
    Weighted::new(3, 0.05),
];

/// Distance the start platform sits below the spawn point
const START_PLATFORM_DROP: f32 = 44.0;

/// How the extra platforms of a row were placed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spacing {
    /// Every platform satisfied the spacing rule
    Spread,
    /// Retries ran out; at least one platform uses the fallback placement
    Fallback,
}

/// A generated row, not yet added to the world
#[derive(Debug, Clone)]
pub struct RowPlan {
    pub platforms: Vec<Platform>,
    /// Index of the anchor platform in `platforms`
    pub anchor: usize,
    pub spacing: Spacing,
}

impl RowPlan {
    pub fn anchor(&self) -> &Platform {
        &self.platforms[self.anchor]
    }
}

/// Horizontal range a platform's left edge may take
pub fn lane_bounds(world: &World) -> (f32, f32) {
    let lo = LANE_MARGIN;
    let hi = (world.width - world.platform_w - LANE_MARGIN).max(lo);
    (lo, hi)
}

/// Largest horizontal step between consecutive row anchors
pub fn max_anchor_dx(world: &World) -> f32 {
    (world.width * 0.5).max(world.platform_w)
}

/// Spawn one platform at screen height `y`.
///
/// The kind is a weighted draw over static/moving/breaking/bouncy unless
/// `forced` is given; `force_blank` overrides both.
pub fn spawn_platform(
    world: &mut World,
    y: f32,
    forced: Option<PlatformKind>,
    force_blank: bool,
) -> Platform {
    let kind = if force_blank {
        PlatformKind::Blank
    } else if let Some(kind) = forced {
        kind
    } else {
        let weights = [
            Weighted::new(PlatformKind::Static, 1.0),
            Weighted::new(PlatformKind::Moving, world.tuning.moving_w),
            Weighted::new(PlatformKind::Breaking, world.tuning.breaking_w),
            Weighted::new(PlatformKind::Bouncy, world.tuning.bouncy_w),
        ];
        pick_weighted(&weights, &mut world.rng).unwrap_or_default()
    };

    let (lo, hi) = lane_bounds(world);
    let x = world.rng.random_range(lo..=hi).round();
    let id = world.next_entity_id();
    let mut platform = Platform::new(id, x, y, world.platform_w, kind);

    if kind == PlatformKind::Moving {
        let speed = world.rng.random_range(MOVING_MIN_SPEED..=MOVING_MAX_SPEED) as f32;
        platform.vx = if world.rng.random_bool(0.5) { -speed } else { speed };
    }
    platform
}

/// Left edge for a platform that has to stay reachable from `anchor_x`
fn anchored_x(world: &mut World, anchor_x: f32) -> f32 {
    let (lo, hi) = lane_bounds(world);
    let dx = max_anchor_dx(world);
    let from = (anchor_x - dx).max(lo);
    let to = (anchor_x + dx).min(hi);
    if from < to {
        world.rng.random_range(from..=to).round()
    } else {
        anchor_x.clamp(lo, hi)
    }
}

/// Horizontal overlap of two platforms (negative when apart)
fn overlap(a: &Platform, b: &Platform) -> f32 {
    (a.x + a.w).min(b.x + b.w) - a.x.max(b.x)
}

/// Spacing rule: rows with a bit need clear air between platforms, other
/// rows only avoid heavy overlap.
fn spaced(a: &Platform, b: &Platform, strict: bool) -> bool {
    if strict {
        overlap(a, b) <= 0.0
    } else {
        overlap(a, b) < a.w * 0.5
    }
}

/// Generate a row of 1-3 platforms at height `y`.
///
/// With `force_at_least_two` the row is meant to carry a bit: it gets at
/// least two platforms, a static anchor and blank escape platforms.
pub fn make_row(world: &mut World, y: f32, anchor_x: f32, force_at_least_two: bool) -> RowPlan {
    let mut count = pick_weighted(&ROW_SIZES, &mut world.rng).unwrap_or(1);
    if force_at_least_two {
        count = count.max(2);
    }

    let anchor_kind = force_at_least_two.then_some(PlatformKind::Static);
    let mut anchor = spawn_platform(world, y, anchor_kind, false);
    anchor.x = anchored_x(world, anchor_x);

    let (lo, hi) = lane_bounds(world);
    let anchor_on_left = anchor.center_x() < world.width / 2.0;
    let mut platforms = vec![anchor];
    let mut spacing = Spacing::Spread;

    for _ in 1..count {
        let mut candidate = spawn_platform(world, y, None, force_at_least_two);
        let mut placed = false;
        for attempt in 0..ROW_SPREAD_ATTEMPTS {
            if attempt > 0 {
                candidate.x = world.rng.random_range(lo..=hi).round();
            }
            if platforms
                .iter()
                .all(|p| spaced(p, &candidate, force_at_least_two))
            {
                placed = true;
                break;
            }
        }

        if !placed {
            spacing = Spacing::Fallback;
            if force_at_least_two {
                // Escape platform goes to the far side of the lane
                candidate.x = if anchor_on_left { hi } else { lo };
            }
        }
        platforms.push(candidate);
    }

    RowPlan {
        platforms,
        anchor: 0,
        spacing,
    }
}

/// Bit shown by a new collectible: the wanted bit with probability
/// `collectible_match_p`, the other bit otherwise.
pub fn decide_collectible_bit(world: &mut World, want: u8) -> u8 {
    if world.rng.random_bool(world.tuning.collectible_match_p) {
        want
    } else {
        1 - want
    }
}

fn collectible_over(world: &mut World, platform: &Platform, kind: CollectibleKind) -> Collectible {
    let id = world.next_entity_id();
    let pos = glam::Vec2::new(platform.center_x(), platform.y - COLLECTIBLE_LIFT);
    Collectible::new(id, pos, kind)
}

/// Indices of pending bit collectibles, closest to the player first
fn pending_bits(world: &World) -> Vec<usize> {
    let mut pending: Vec<usize> = world
        .collectibles
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_pending_bit())
        .map(|(i, _)| i)
        .collect();
    pending.sort_by(|&a, &b| {
        world.collectibles[b]
            .pos
            .y
            .total_cmp(&world.collectibles[a].pos.y)
    });
    pending
}

/// Pattern bit wanted at the `n`-th pending bit row, assuming the player
/// takes every row before it. Slots past the end reuse the last bit.
pub fn slot_bit(world: &World, n: usize) -> Option<u8> {
    let pattern = world.pattern();
    let last = pattern.len().checked_sub(1)?;
    pattern.get((world.pattern_index + n).min(last)).copied()
}

/// Point pending bits that are still above the screen at their current slot.
/// Bits already on screen keep what they show.
pub fn reaim_hidden_bits(world: &mut World) {
    for (n, i) in pending_bits(world).into_iter().enumerate() {
        let Some(want) = slot_bit(world, n) else {
            return;
        };
        let c = &mut world.collectibles[i];
        if c.pos.y + COLLECTIBLE_RADIUS < 0.0 {
            c.kind = CollectibleKind::Bit(if c.on_target { want } else { 1 - want });
        }
    }
}

/// The player landed on a platform at `platform_y`: bits of the rows below
/// it were skipped, so the rows above move down one slot.
pub fn pass_bits_below(world: &mut World, platform_y: f32) {
    let mut any = false;
    for c in world.collectibles.iter_mut().filter(|c| c.is_pending_bit()) {
        if c.pos.y + COLLECTIBLE_LIFT > platform_y + 0.5 {
            c.passed = true;
            any = true;
        }
    }
    if any {
        reaim_hidden_bits(world);
    }
}

/// Generate the next row above the current top row and add it to the world
fn push_row(world: &mut World) {
    let y = world.top_row_y - world.gap;
    world.rows_generated += 1;

    let carries_bit = world.rows_generated % world.tuning.bit_every.max(1) == 0
        && !world.is_pattern_complete();
    let anchor_x = world.last_anchor_x;
    let plan = make_row(world, y, anchor_x, carries_bit);

    if plan.spacing == Spacing::Fallback {
        world.spacing_fallbacks += 1;
        log::debug!(
            "Row {} at y={:.0}: spacing fell back after {} attempts",
            world.rows_generated,
            y,
            ROW_SPREAD_ATTEMPTS
        );
    }

    let anchor = plan.anchor().clone();
    if carries_bit {
        let slot = pending_bits(world).len();
        if let Some(want) = slot_bit(world, slot) {
            let bit = decide_collectible_bit(world, want);
            let mut c = collectible_over(world, &anchor, CollectibleKind::Bit(bit));
            c.on_target = bit == want;
            world.collectibles.push(c);
        }
    } else if world.rng.random_bool(world.tuning.coin_p) {
        // Coins sit on something that stays put
        let still: Vec<_> = plan
            .platforms
            .iter()
            .filter(|p| p.kind != PlatformKind::Moving)
            .cloned()
            .collect();
        if !still.is_empty() {
            let pick = world.rng.random_range(0..still.len());
            let c = collectible_over(world, &still[pick], CollectibleKind::Coin);
            world.collectibles.push(c);
        }
    }

    world.last_anchor_x = anchor.x;
    world.top_row_y = y;
    world.platforms.extend(plan.platforms);
}

/// Keep a buffer of rows above the screen
pub fn top_up(world: &mut World) {
    while world.top_row_y > TOP_UP_THRESHOLD_Y || world.platforms.len() < MIN_PLATFORMS {
        push_row(world);
    }
}

/// Initial layout: a platform under the spawn point, one row of each special
/// platform type so they show up early, then the regular buffer.
pub fn seed_world(world: &mut World) {
    let spawn = world.player.pos;
    let start_x = (spawn.x - world.platform_w / 2.0).round();
    let id = world.next_entity_id();
    world.platforms.push(Platform::new(
        id,
        start_x,
        spawn.y + START_PLATFORM_DROP,
        world.platform_w,
        PlatformKind::Static,
    ));
    world.last_anchor_x = start_x;
    world.top_row_y = spawn.y + START_PLATFORM_DROP;

    for (i, kind) in [PlatformKind::Moving, PlatformKind::Breaking, PlatformKind::Bouncy]
        .into_iter()
        .enumerate()
    {
        let y = spawn.y - world.gap * (i + 1) as f32;
        let mut platform = spawn_platform(world, y, Some(kind), false);
        let anchor_x = world.last_anchor_x;
        platform.x = anchored_x(world, anchor_x);
        world.last_anchor_x = platform.x;
        world.top_row_y = y;
        world.platforms.push(platform);
    }

    top_up(world);
}
