//! World → triangle list
//!
//! `build_scene` reads the world and never mutates it. Output is in pixel
//! coordinates of the logical viewport (y down); the pipeline maps it to NDC.

use glam::Vec2;

use super::shapes;
use super::vertex::{Vertex, colors};
use crate::consts::*;
use crate::settings::Settings;
use crate::sim::{CollectibleKind, GamePhase, Platform, PlatformKind, World};

const STAR_COUNT: u32 = 48;
const STAR_PARALLAX: f32 = 0.15;
const CIRCLE_SEGMENTS: u32 = 20;

/// Presentation switches taken from the settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub screen_shake: bool,
    pub reduced_motion: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            screen_shake: true,
            reduced_motion: false,
        }
    }
}

impl RenderOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            screen_shake: settings.effective_screen_shake(),
            reduced_motion: settings.reduced_motion,
        }
    }
}

/// Integer hash mapped to [0, 1)
fn hash01(mut n: u32) -> f32 {
    n ^= n >> 16;
    n = n.wrapping_mul(0x7feb_352d);
    n ^= n >> 15;
    n = n.wrapping_mul(0x846c_a68b);
    n ^= n >> 16;
    (n >> 8) as f32 / (1u32 << 24) as f32
}

/// Camera jitter while the shake timer runs. Amplitude fades with the timer;
/// the direction is a hash of the remaining time, so it is reproducible.
pub fn shake_offset(world: &World, enabled: bool) -> Vec2 {
    if !enabled || world.shake_ms <= 0.0 {
        return Vec2::ZERO;
    }
    let amp = SHAKE_PX * (world.shake_ms / SHAKE_MS).min(1.0);
    let k = world.shake_ms as u32;
    Vec2::new(hash01(k * 2) * 2.0 - 1.0, hash01(k * 2 + 1) * 2.0 - 1.0) * amp
}

/// Build the full frame
pub fn build_scene(world: &World, options: &RenderOptions, time_secs: f32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(4096);
    let offset = shake_offset(world, options.screen_shake);

    stars(world, options, time_secs, &mut vertices);

    for platform in &world.platforms {
        vertices.extend(platform_shapes(platform, offset));
    }

    for c in world.collectibles.iter().filter(|c| !c.collected) {
        let pos = c.pos + offset;
        match c.kind {
            CollectibleKind::Coin => {
                vertices.extend(shapes::circle(
                    pos,
                    COLLECTIBLE_RADIUS,
                    colors::COIN,
                    CIRCLE_SEGMENTS,
                ));
                vertices.extend(shapes::ring(
                    pos,
                    COLLECTIBLE_RADIUS - 2.5,
                    COLLECTIBLE_RADIUS,
                    colors::COIN_RIM,
                    CIRCLE_SEGMENTS,
                ));
            }
            CollectibleKind::Bit(bit) => {
                vertices.extend(shapes::circle(
                    pos,
                    COLLECTIBLE_RADIUS + 2.0,
                    colors::BIT,
                    CIRCLE_SEGMENTS,
                ));
                vertices.extend(shapes::ring(
                    pos,
                    COLLECTIBLE_RADIUS,
                    COLLECTIBLE_RADIUS + 2.0,
                    colors::BIT_RIM,
                    CIRCLE_SEGMENTS,
                ));
                vertices.extend(shapes::seven_segment(
                    bit,
                    pos,
                    COLLECTIBLE_RADIUS * 1.2,
                    colors::BIT_DIGIT,
                ));
            }
        }
    }

    player(world, offset, &mut vertices);

    if let Some(n) = world.countdown_remaining() {
        let center = Vec2::new(world.width * 0.5, world.height * 0.4);
        let size = (world.width.min(world.height) * 0.22).max(40.0);
        vertices.extend(shapes::seven_segment(
            n.min(9) as u8,
            center,
            size,
            colors::COUNTDOWN,
        ));
    }

    match world.phase {
        GamePhase::Won => vertices.extend(shapes::rect(
            Vec2::ZERO,
            Vec2::new(world.width, world.height),
            colors::DIM_WON,
        )),
        GamePhase::Lost => vertices.extend(shapes::rect(
            Vec2::ZERO,
            Vec2::new(world.width, world.height),
            colors::DIM_LOST,
        )),
        GamePhase::Countdown | GamePhase::Playing => {}
    }

    vertices
}

/// Background stars, scrolling slower than the world
fn stars(world: &World, options: &RenderOptions, time_secs: f32, out: &mut Vec<Vertex>) {
    let h = world.height.max(1.0);
    for i in 0..STAR_COUNT {
        let x = hash01(i * 3) * world.width;
        let base_y = hash01(i * 3 + 1) * h;
        let y = (base_y + world.climbed * STAR_PARALLAX).rem_euclid(h);
        let size = 1.0 + hash01(i * 3 + 2) * 1.5;

        let twinkle = if options.reduced_motion {
            0.6
        } else {
            0.45 + 0.35 * (time_secs * 1.7 + i as f32).sin().abs()
        };
        let mut color = colors::STAR;
        color[3] = twinkle;
        out.extend(shapes::rect(Vec2::new(x, y), Vec2::splat(size), color));
    }
}

fn platform_color(kind: PlatformKind) -> [f32; 4] {
    match kind {
        PlatformKind::Static => colors::PLATFORM_STATIC,
        PlatformKind::Moving => colors::PLATFORM_MOVING,
        PlatformKind::Breaking => colors::PLATFORM_BREAKING,
        PlatformKind::Bouncy => colors::PLATFORM_BOUNCY,
        PlatformKind::Blank => colors::PLATFORM_BLANK,
    }
}

/// A platform: filled bar with a kind glyph, or a dashed outline for blank
/// and broken ones
pub fn platform_shapes(p: &Platform, offset: Vec2) -> Vec<Vertex> {
    let min = Vec2::new(p.x, p.y) + offset;
    let size = Vec2::new(p.w, p.h);
    let mut color = platform_color(p.kind);

    if p.kind == PlatformKind::Blank || p.is_broken() {
        if p.is_broken() {
            color[3] = 0.35;
        }
        return shapes::dashed_rect(min, size, 2.0, 8.0, 6.0, color);
    }

    // Armed breaking platforms fade toward their break time
    if p.break_at_ms.is_some() {
        color[3] = 0.6;
    }

    let mut vertices = shapes::rect(min, size, color);
    let c = min + size * 0.5;
    let g = (p.h * 0.55).max(4.0);
    let t = 2.0;

    match p.kind {
        PlatformKind::Moving => {
            // ↔
            let a = c - Vec2::new(g, 0.0);
            let b = c + Vec2::new(g, 0.0);
            let head = Vec2::new(g * 0.45, g * 0.45);
            vertices.extend(shapes::line(a, b, t, colors::GLYPH));
            vertices.extend(shapes::line(a, a + head, t, colors::GLYPH));
            vertices.extend(shapes::line(a, a + Vec2::new(head.x, -head.y), t, colors::GLYPH));
            vertices.extend(shapes::line(b, b - head, t, colors::GLYPH));
            vertices.extend(shapes::line(b, b + Vec2::new(-head.x, head.y), t, colors::GLYPH));
        }
        PlatformKind::Bouncy => {
            // ↑
            let top = c - Vec2::new(0.0, g * 0.5);
            let bottom = c + Vec2::new(0.0, g * 0.5);
            let head = g * 0.4;
            vertices.extend(shapes::line(bottom, top, t, colors::GLYPH));
            vertices.extend(shapes::line(top, top + Vec2::new(-head, head), t, colors::GLYPH));
            vertices.extend(shapes::line(top, top + Vec2::new(head, head), t, colors::GLYPH));
        }
        PlatformKind::Breaking => {
            // ⟂
            let top = c - Vec2::new(0.0, g * 0.5);
            let bottom = c + Vec2::new(0.0, g * 0.5);
            vertices.extend(shapes::line(top, bottom, t, colors::GLYPH));
            vertices.extend(shapes::line(
                bottom - Vec2::new(g * 0.6, 0.0),
                bottom + Vec2::new(g * 0.6, 0.0),
                t,
                colors::GLYPH,
            ));
        }
        PlatformKind::Static | PlatformKind::Blank => {}
    }
    vertices
}

/// Player body with eyes that look where it is heading
fn player(world: &World, offset: Vec2, out: &mut Vec<Vertex>) {
    let p = &world.player;
    let pos = p.pos + offset;
    let r = p.radius;

    out.extend(shapes::circle(pos, r, colors::PLAYER_RIM, CIRCLE_SEGMENTS));
    out.extend(shapes::circle(pos, r * 0.82, colors::PLAYER, CIRCLE_SEGMENTS));

    let look = Vec2::new(0.0, (p.vy / JUMP_VY.abs()).clamp(-1.0, 1.0)) * r * 0.1;
    for side in [-1.0, 1.0] {
        let eye = pos + Vec2::new(side * r * 0.35, -r * 0.2);
        out.extend(shapes::circle(eye, r * 0.24, colors::EYE, 10));
        out.extend(shapes::circle(eye + look, r * 0.11, colors::PUPIL, 8));
    }
}
