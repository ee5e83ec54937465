//! Per-frame simulation step
//!
//! Advances the world by one animation frame. Order within a tick:
//! steer, wrap, gravity, platforms, landing, camera, pickups, cull, top-up,
//! fall check.

use super::collision::{jump_velocity, lands_on, picks_up};
use super::generator::{pass_bits_below, reaim_hidden_bits, top_up};
use super::state::{CollectibleKind, GameEvent, GamePhase, LossReason, World};
use crate::consts::*;
use crate::lerp;

/// Input sampled at the start of a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    /// Horizontal pointer position, 0 = left edge, 1 = right edge
    pub x_norm: f32,
}

impl Default for TickInput {
    fn default() -> Self {
        Self { x_norm: 0.5 }
    }
}

/// Advance the world by `dt` seconds (clamped to `MAX_DT`)
pub fn tick(world: &mut World, input: &TickInput, dt: f32) {
    world.events.clear();
    let dt = dt.clamp(0.0, MAX_DT);

    // Shake keeps decaying after the run ends
    if world.shake_ms > 0.0 {
        world.shake_ms = (world.shake_ms - dt * 1000.0).max(0.0);
    }

    if world.phase.is_terminal() {
        return;
    }

    world.time_ms += dt as f64 * 1000.0;
    steer(world, input, dt);

    if world.phase == GamePhase::Countdown {
        if world.time_ms >= COUNTDOWN_MS {
            world.phase = GamePhase::Playing;
            world.player.vy = JUMP_VY;
            world.events.push(GameEvent::CountdownFinished);
            log::debug!("Countdown finished, go!");
        }
        return;
    }

    world.play_ms += dt as f64 * 1000.0;

    // Gravity
    let prev_y = world.player.pos.y;
    world.player.vy += GRAVITY * dt;
    world.player.pos.y += world.player.vy * dt;

    // Moving and breaking platforms
    let now = world.time_ms;
    let width = world.width;
    for platform in &mut world.platforms {
        platform.slide(dt, width);
        platform.update_break(now);
    }

    land(world, prev_y);
    scroll_camera(world);
    collect(world);
    cull(world);
    top_up(world);

    if world.player.pos.y - world.player.radius > world.height + FALL_MARGIN {
        world.events.push(GameEvent::Fell);
        world.finish(false, Some(LossReason::Fell));
    }
}

/// Ease the player toward the pointer and wrap around the screen edges
fn steer(world: &mut World, input: &TickInput, dt: f32) {
    let target = input.x_norm.clamp(0.0, 1.0) * world.width;
    let player = &mut world.player;
    player.pos.x = lerp(player.pos.x, target, 1.0 - (-H_CTRL * dt).exp());

    let r = player.radius;
    if player.pos.x < -r {
        player.pos.x = world.width + r;
    } else if player.pos.x > world.width + r {
        player.pos.x = -r;
    }
}

/// One-way landing while falling
fn land(world: &mut World, prev_y: f32) {
    if world.player.vy <= 0.0 {
        return;
    }

    let now = world.time_ms;
    let World {
        player,
        platforms,
        events,
        score,
        ..
    } = world;

    let mut landed_y = None;
    for platform in platforms.iter_mut().filter(|p| !p.is_broken()) {
        if !lands_on(player.pos.x, player.radius, prev_y, player.pos.y, platform) {
            continue;
        }
        player.pos.y = platform.y - player.radius;
        player.vy = jump_velocity(platform.kind);
        platform.arm_break(now);
        *score += LAND_SCORE;
        events.push(GameEvent::Landed {
            kind: platform.kind,
        });
        landed_y = Some(platform.y);
        break;
    }

    if let Some(y) = landed_y {
        pass_bits_below(world, y);
    }
}

/// Keep the player below the camera line by shifting the world down
fn scroll_camera(world: &mut World) {
    let camera_y = world.height * CAMERA_FRACTION;
    if world.player.pos.y >= camera_y {
        return;
    }

    let dy = camera_y - world.player.pos.y;
    world.player.pos.y = camera_y;
    for platform in &mut world.platforms {
        platform.y += dy;
    }
    for c in &mut world.collectibles {
        c.pos.y += dy;
    }
    world.top_row_y += dy;
    world.climbed += dy;
    world.score += (dy * HEIGHT_SCORE_PER_PX).round() as u64;
}

/// Coins add score; bits must match the pattern or the run is over
fn collect(world: &mut World) {
    for i in 0..world.collectibles.len() {
        if world.phase.is_terminal() {
            break;
        }
        let c = &world.collectibles[i];
        if c.collected || !picks_up(world.player.pos, world.player.radius, c.pos) {
            continue;
        }
        let kind = c.kind;
        world.collectibles[i].collected = true;

        match kind {
            CollectibleKind::Coin => {
                world.score += COIN_SCORE;
                world.events.push(GameEvent::CoinCollected);
            }
            CollectibleKind::Bit(bit) => collect_bit(world, bit),
        }
    }
}

fn collect_bit(world: &mut World, bit: u8) {
    let Some(wanted) = world.wanted_bit() else {
        return;
    };

    if bit != wanted {
        world.errors += 1;
        world.combo = 0;
        world.events.push(GameEvent::WrongBit { got: bit, wanted });
        world.finish(false, Some(LossReason::WrongBit));
        return;
    }

    let index = world.pattern_index;
    world.pattern_index += 1;
    world.combo = (world.combo + 1).min(999);
    let bonus = (1.0 + world.combo as f32 * 0.08).min(4.5);
    world.score += (BIT_SCORE * bonus).round() as u64;
    world.events.push(GameEvent::BitCollected { bit, index });
    reaim_hidden_bits(world);

    if world.is_pattern_complete() {
        world.score += COMPLETION_BONUS + world.combo as u64 * 6;
        world.finish(true, None);
    }
}

/// Drop whatever scrolled below the screen, and spent collectibles
fn cull(world: &mut World) {
    let limit = world.height + CULL_MARGIN;
    world.platforms.retain(|p| p.y < limit);
    world.collectibles.retain(|c| !c.collected && c.pos.y < limit);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Difficulty;
    use crate::sim::puzzle::{BitOp, Puzzle};
    use crate::sim::state::{Collectible, Platform, PlatformKind};
    use glam::Vec2;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    /// A world in `Playing` with nothing near the player
    fn playing_world() -> World {
        let mut world = World::start(12345, Difficulty::Easy, 400.0, 700.0);
        world.phase = GamePhase::Playing;
        world.time_ms = COUNTDOWN_MS;
        world.platforms.clear();
        world.collectibles.clear();
        world
    }

    fn with_puzzle(world: &mut World, a: &[u8], b: &[u8], op: BitOp) {
        world.puzzle = Puzzle::new(a.to_vec(), b.to_vec(), op).unwrap();
        world.pattern_index = 0;
    }

    /// Drop a bit right on the player and run one tick
    fn grab_bit(world: &mut World, bit: u8) {
        let id = world.next_entity_id();
        world
            .collectibles
            .push(Collectible::new(id, world.player.pos, CollectibleKind::Bit(bit)));
        world.player.vy = 0.0;
        let input = TickInput {
            x_norm: world.player.pos.x / world.width,
        };
        tick(world, &input, DT);
    }

    fn platform_under_player(world: &mut World, kind: PlatformKind) {
        let id = world.next_entity_id();
        let x = world.player.pos.x - 40.0;
        let y = world.player.pos.y + world.player.radius + 5.0;
        world.platforms.push(Platform::new(id, x, y, 80.0, kind));
        world.player.vy = 300.0;
    }

    fn centered() -> TickInput {
        TickInput { x_norm: 0.5 }
    }

    #[test]
    fn test_countdown_then_jump() {
        let mut world = World::start(1, Difficulty::Easy, 400.0, 700.0);
        let start_y = world.player.pos.y;

        for _ in 0..59 {
            tick(&mut world, &centered(), 0.05);
        }
        assert_eq!(world.phase, GamePhase::Countdown);
        assert_eq!(world.player.pos.y, start_y);
        assert_eq!(world.countdown_remaining(), Some(1));

        tick(&mut world, &centered(), 0.05);
        assert_eq!(world.phase, GamePhase::Playing);
        assert_eq!(world.player.vy, JUMP_VY);
        assert!(world.events.contains(&GameEvent::CountdownFinished));
    }

    #[test]
    fn test_dt_is_capped() {
        let mut world = playing_world();
        tick(&mut world, &centered(), 2.0);
        assert!((world.play_ms - MAX_DT as f64 * 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_steering_eases_toward_pointer() {
        let mut world = playing_world();
        let x0 = world.player.pos.x;
        tick(&mut world, &TickInput { x_norm: 1.0 }, DT);
        let x1 = world.player.pos.x;
        assert!(x1 > x0 && x1 < world.width);
        tick(&mut world, &TickInput { x_norm: 1.0 }, DT);
        assert!(world.player.pos.x > x1);
    }

    #[test]
    fn test_wraps_around_edges() {
        let mut world = playing_world();
        let r = world.player.radius;
        world.player.pos.x = -r - 50.0;
        tick(&mut world, &TickInput { x_norm: 0.0 }, 0.0);
        assert_eq!(world.player.pos.x, world.width + r);

        world.player.pos.x = world.width + r + 50.0;
        tick(&mut world, &TickInput { x_norm: 1.0 }, 0.0);
        assert_eq!(world.player.pos.x, -r);
    }

    #[test]
    fn test_gravity_accelerates_fall() {
        let mut world = playing_world();
        world.player.vy = 0.0;
        tick(&mut world, &centered(), DT);
        assert!((world.player.vy - GRAVITY * DT).abs() < 1e-3);
    }

    #[test]
    fn test_land_on_static_platform() {
        let mut world = playing_world();
        platform_under_player(&mut world, PlatformKind::Static);
        let score = world.score;
        tick(&mut world, &centered(), DT);
        assert_eq!(world.player.vy, JUMP_VY);
        assert!(world.events.contains(&GameEvent::Landed {
            kind: PlatformKind::Static
        }));
        assert!(world.score > score);
    }

    #[test]
    fn test_bouncy_landing_is_stronger() {
        let mut jumps = Vec::new();
        for kind in [
            PlatformKind::Static,
            PlatformKind::Moving,
            PlatformKind::Breaking,
            PlatformKind::Bouncy,
        ] {
            let mut world = playing_world();
            platform_under_player(&mut world, kind);
            tick(&mut world, &centered(), DT);
            jumps.push(world.player.vy.abs());
        }
        let bouncy = jumps[3];
        assert!(jumps[..3].iter().all(|&v| bouncy > v));
    }

    #[test]
    fn test_no_landing_while_rising() {
        let mut world = playing_world();
        platform_under_player(&mut world, PlatformKind::Static);
        world.player.vy = -600.0;
        tick(&mut world, &centered(), DT);
        assert!(
            !world
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::Landed { .. }))
        );
    }

    #[test]
    fn test_breaking_platform_gives_way() {
        let mut world = playing_world();
        platform_under_player(&mut world, PlatformKind::Breaking);
        let id = world.platforms[0].id;
        tick(&mut world, &centered(), DT);
        let armed = world.platforms.iter().find(|p| p.id == id).unwrap();
        assert!(armed.break_at_ms.is_some());
        assert!(!armed.is_broken());

        // 250ms later it is intangible
        for _ in 0..16 {
            tick(&mut world, &centered(), DT);
        }
        let broken = world.platforms.iter().find(|p| p.id == id).unwrap();
        assert!(broken.is_broken());
    }

    #[test]
    fn test_broken_platform_is_not_landed_on() {
        let mut world = playing_world();
        platform_under_player(&mut world, PlatformKind::Breaking);
        world.platforms[0].broke_at_ms = Some(world.time_ms);
        world.platforms[0].respawn_at_ms = Some(world.time_ms + 10_000.0);
        tick(&mut world, &centered(), DT);
        assert!(world.player.vy > 0.0);
    }

    #[test]
    fn test_camera_scroll_shifts_world_and_scores() {
        let mut world = playing_world();
        let camera_y = world.height * CAMERA_FRACTION;
        world.player.pos.y = camera_y - 50.0;
        world.player.vy = 0.0;
        let id = world.next_entity_id();
        world
            .platforms
            .push(Platform::new(id, 10.0, 100.0, 80.0, PlatformKind::Static));
        let score = world.score;

        tick(&mut world, &centered(), 0.0);
        assert_eq!(world.player.pos.y, camera_y);
        let moved = world.platforms.iter().find(|p| p.id == id).unwrap();
        assert!((moved.y - 150.0).abs() < 1e-3);
        assert!((world.climbed - 50.0).abs() < 1e-3);
        assert_eq!(world.score, score + 6);
    }

    #[test]
    fn test_coin_pickup() {
        let mut world = playing_world();
        let id = world.next_entity_id();
        let pos = world.player.pos + Vec2::new(5.0, 0.0);
        world
            .collectibles
            .push(Collectible::new(id, pos, CollectibleKind::Coin));
        world.player.vy = 0.0;
        let input = TickInput {
            x_norm: world.player.pos.x / world.width,
        };
        tick(&mut world, &input, 0.0);
        assert_eq!(world.score, COIN_SCORE);
        assert!(world.events.contains(&GameEvent::CoinCollected));
        assert!(world.collectibles.iter().all(|c| c.id != id));
    }

    #[test]
    fn test_matching_bit_advances_by_one() {
        let mut world = playing_world();
        with_puzzle(&mut world, &[1, 0, 1], &[0, 1, 1], BitOp::And);
        grab_bit(&mut world, 0);
        assert_eq!(world.pattern_index, 1);
        assert_eq!(world.phase, GamePhase::Playing);
        assert!(world.events.contains(&GameEvent::BitCollected { bit: 0, index: 0 }));
    }

    #[test]
    fn test_and_puzzle_collected_in_order_wins() {
        let mut world = playing_world();
        with_puzzle(&mut world, &[1, 0, 1], &[0, 1, 1], BitOp::And);
        assert_eq!(world.pattern(), &[0, 0, 1]);

        for bit in [0, 0, 1] {
            grab_bit(&mut world, bit);
        }
        assert_eq!(world.phase, GamePhase::Won);
        assert_eq!(world.pattern_index, 3);
        assert_eq!(world.errors, 0);
        assert!(world.events.contains(&GameEvent::Won));
    }

    #[test]
    fn test_wrong_third_bit_loses() {
        let mut world = playing_world();
        with_puzzle(&mut world, &[1, 0, 1], &[0, 1, 1], BitOp::And);

        for bit in [0, 0, 0] {
            grab_bit(&mut world, bit);
        }
        assert_eq!(world.phase, GamePhase::Lost);
        assert_eq!(world.loss_reason, Some(LossReason::WrongBit));
        assert_eq!(world.errors, 1);
        assert_eq!(world.pattern_index, 2);
        assert!(world.shake_ms > 0.0);

        // Nothing moves the pattern afterwards
        grab_bit(&mut world, 1);
        assert_eq!(world.pattern_index, 2);
        assert_eq!(world.errors, 1);
    }

    #[test]
    fn test_landing_above_a_bit_reaims_hidden_rows() {
        let mut world = playing_world();
        // Pattern 1 0 1
        with_puzzle(&mut world, &[1, 0, 1], &[1, 1, 1], BitOp::And);
        let below = world.player.pos + Vec2::new(0.0, 100.0);
        let mut bits = Vec::new();
        for (y, bit, on_target) in [(below.y, 1, true), (100.0, 1, false), (-200.0, 1, true)] {
            let id = world.next_entity_id();
            let mut c = Collectible::new(id, Vec2::new(below.x, y), CollectibleKind::Bit(bit));
            c.on_target = on_target;
            world.collectibles.push(c);
            bits.push(id);
        }
        platform_under_player(&mut world, PlatformKind::Static);
        tick(&mut world, &centered(), DT);

        let find = |id: u32| world.collectibles.iter().find(|c| c.id == id).unwrap();
        assert!(find(bits[0]).passed);
        // On screen: keeps what it shows
        assert_eq!(find(bits[1]).kind, CollectibleKind::Bit(1));
        // Above the screen: now the second pending row, aimed at the 0
        assert_eq!(find(bits[2]).kind, CollectibleKind::Bit(0));
        assert_eq!(world.pattern_index, 0);
    }

    /// Climb by taking every bit row as it comes, stopping at the first one
    /// showing the wrong bit. Returns (rows reached, rows that matched).
    fn take_bits_in_order(seed: u64, difficulty: Difficulty) -> (u32, u32) {
        let mut world = World::start(seed, difficulty, 390.0, 844.0);
        world.phase = GamePhase::Playing;
        world.time_ms = COUNTDOWN_MS;
        let (mut reached, mut matched) = (0, 0);

        while world.phase == GamePhase::Playing {
            let Some(next) = world
                .collectibles
                .iter()
                .filter(|c| c.is_pending_bit())
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                .cloned()
            else {
                break;
            };
            reached += 1;
            if next.kind != CollectibleKind::Bit(world.wanted_bit().unwrap()) {
                break;
            }
            matched += 1;
            world.player.pos = next.pos;
            world.player.vy = 0.0;
            let input = TickInput {
                x_norm: next.pos.x / world.width,
            };
            tick(&mut world, &input, DT);
        }
        (reached, matched)
    }

    #[test]
    fn test_reached_bits_match_at_tuned_rate() {
        for difficulty in Difficulty::ALL {
            let (mut reached, mut matched) = (0, 0);
            for seed in 0..600 {
                let (r, m) = take_bits_in_order(seed, difficulty);
                reached += r;
                matched += m;
            }
            let rate = matched as f64 / reached as f64;
            let p = difficulty.tuning().collectible_match_p;
            assert!(
                (rate - p).abs() < 0.06,
                "{difficulty}: {matched}/{reached} = {rate:.3}, tuned {p}"
            );
        }
    }

    #[test]
    fn test_fall_loses_once() {
        let mut world = playing_world();
        world.player.pos.y = world.height + FALL_MARGIN + world.player.radius + 1.0;
        world.player.vy = 100.0;
        let score = world.score;
        let index = world.pattern_index;

        tick(&mut world, &centered(), DT);
        assert_eq!(world.phase, GamePhase::Lost);
        assert_eq!(world.loss_reason, Some(LossReason::Fell));
        assert!(world.events.contains(&GameEvent::Fell));
        assert_eq!(world.errors, 0);
        assert_eq!(world.pattern_index, index);
        assert!(world.score >= score);

        tick(&mut world, &centered(), DT);
        assert!(world.events.is_empty());
        assert_eq!(world.phase, GamePhase::Lost);
    }

    #[test]
    fn test_shake_decays_after_loss() {
        let mut world = playing_world();
        world.player.pos.y = world.height * 3.0;
        tick(&mut world, &centered(), DT);
        let shake = world.shake_ms;
        assert!(shake > 0.0);
        tick(&mut world, &centered(), DT);
        assert!(world.shake_ms < shake);
    }

    #[test]
    fn test_cull_drops_offscreen() {
        let mut world = playing_world();
        let id = world.next_entity_id();
        world.platforms.push(Platform::new(
            id,
            10.0,
            world.height + CULL_MARGIN + 1.0,
            80.0,
            PlatformKind::Static,
        ));
        tick(&mut world, &centered(), DT);
        assert!(world.platforms.iter().all(|p| p.id != id));
        assert!(world.platforms.len() >= MIN_PLATFORMS);
    }

    #[test]
    fn test_determinism() {
        // Two worlds with the same seed and inputs stay identical
        let mut a = World::start(99999, Difficulty::Medium, 390.0, 844.0);
        let mut b = World::start(99999, Difficulty::Medium, 390.0, 844.0);

        for i in 0..600 {
            let input = TickInput {
                x_norm: ((i as f32) * 0.02).sin() * 0.5 + 0.5,
            };
            tick(&mut a, &input, DT);
            tick(&mut b, &input, DT);
        }

        assert_eq!(a.phase, b.phase);
        assert_eq!(a.score, b.score);
        assert_eq!(a.pattern_index, b.pattern_index);
        assert_eq!(a.platforms.len(), b.platforms.len());
        assert!((a.player.pos - b.player.pos).length() < 1e-4);
    }

    proptest! {
        #[test]
        fn pattern_index_is_monotonic(
            seed in any::<u64>(),
            diff in 0usize..3,
            inputs in prop::collection::vec(0.0f32..=1.0, 200..600),
        ) {
            let mut world = World::start(seed, Difficulty::ALL[diff], 390.0, 844.0);
            let mut last = 0;
            let mut terminal_at = None;

            for x in inputs {
                tick(&mut world, &TickInput { x_norm: x }, DT);
                prop_assert!(world.pattern_index >= last);
                prop_assert!(world.pattern_index <= world.pattern().len());
                if world.pattern_index == world.pattern().len() {
                    prop_assert_eq!(world.phase, GamePhase::Won);
                }
                if let Some(index) = terminal_at {
                    prop_assert_eq!(world.pattern_index, index);
                } else if world.phase.is_terminal() {
                    terminal_at = Some(world.pattern_index);
                }
                last = world.pattern_index;
            }
        }
    }
}
