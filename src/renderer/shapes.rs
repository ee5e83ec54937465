//! Shape generation for 2D primitives
//!
//! Everything is emitted as a triangle list in pixel coordinates.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;

/// Seven-segment layout: top, upper right, lower right, bottom, lower left,
/// upper left, middle
const SEGMENTS: [[bool; 7]; 10] = [
    [true, true, true, true, true, true, false],     // 0
    [false, true, true, false, false, false, false], // 1
    [true, true, false, true, true, false, true],    // 2
    [true, true, true, true, false, false, true],    // 3
    [false, true, true, false, false, true, true],   // 4
    [true, false, true, true, false, true, true],    // 5
    [true, false, true, true, true, true, true],     // 6
    [true, true, true, false, false, false, false],  // 7
    [true, true, true, true, true, true, true],      // 8
    [true, true, true, true, false, true, true],     // 9
];

/// Generate vertices for a filled axis-aligned rectangle
pub fn rect(min: Vec2, size: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let max = min + size;
    vec![
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
    ]
}

/// Generate vertices for a line segment of the given thickness
pub fn line(a: Vec2, b: Vec2, thickness: f32, color: [f32; 4]) -> Vec<Vertex> {
    let dir = (b - a).normalize_or_zero();
    let perp = Vec2::new(-dir.y, dir.x) * (thickness * 0.5);

    let a1 = a + perp;
    let a2 = a - perp;
    let b1 = b + perp;
    let b2 = b - perp;

    vec![
        Vertex::new(a1.x, a1.y, color),
        Vertex::new(a2.x, a2.y, color),
        Vertex::new(b1.x, b1.y, color),
        Vertex::new(b1.x, b1.y, color),
        Vertex::new(a2.x, a2.y, color),
        Vertex::new(b2.x, b2.y, color),
    ]
}

/// Dashed outline of a rectangle. Dashes run along the long edges only;
/// the short edges are solid.
pub fn dashed_rect(
    min: Vec2,
    size: Vec2,
    thickness: f32,
    dash: f32,
    gap: f32,
    color: [f32; 4],
) -> Vec<Vertex> {
    let t = thickness;
    let step = (dash + gap).max(1.0);
    let mut vertices = Vec::new();

    let mut x = 0.0;
    while x < size.x {
        let len = dash.min(size.x - x);
        vertices.extend(rect(Vec2::new(min.x + x, min.y), Vec2::new(len, t), color));
        vertices.extend(rect(
            Vec2::new(min.x + x, min.y + size.y - t),
            Vec2::new(len, t),
            color,
        ));
        x += step;
    }

    vertices.extend(rect(min, Vec2::new(t, size.y), color));
    vertices.extend(rect(
        Vec2::new(min.x + size.x - t, min.y),
        Vec2::new(t, size.y),
        color,
    ));
    vertices
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for a ring (hollow circle)
pub fn ring(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 6) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        let (s1, c1) = theta1.sin_cos();
        let (s2, c2) = theta2.sin_cos();
        let inner1 = center + Vec2::new(c1, s1) * inner_radius;
        let outer1 = center + Vec2::new(c1, s1) * outer_radius;
        let inner2 = center + Vec2::new(c2, s2) * inner_radius;
        let outer2 = center + Vec2::new(c2, s2) * outer_radius;

        // Two triangles per segment
        vertices.push(Vertex::new(inner1.x, inner1.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(inner2.x, inner2.y, color));

        vertices.push(Vertex::new(inner2.x, inner2.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(outer2.x, outer2.y, color));
    }

    vertices
}

/// A decimal digit drawn as a seven-segment display centered on `center`.
/// Digits above 9 draw nothing.
pub fn seven_segment(digit: u8, center: Vec2, height: f32, color: [f32; 4]) -> Vec<Vertex> {
    let Some(lit) = SEGMENTS.get(digit as usize) else {
        return Vec::new();
    };

    let h = height * 0.5;
    let w = height * 0.3;
    let t = (height * 0.14).max(1.5);

    let tl = center + Vec2::new(-w, -h);
    let tr = center + Vec2::new(w, -h);
    let ml = center + Vec2::new(-w, 0.0);
    let mr = center + Vec2::new(w, 0.0);
    let bl = center + Vec2::new(-w, h);
    let br = center + Vec2::new(w, h);

    let ends = [
        (tl, tr),
        (tr, mr),
        (mr, br),
        (bl, br),
        (ml, bl),
        (tl, ml),
        (ml, mr),
    ];

    let mut vertices = Vec::with_capacity(42);
    for (on, (a, b)) in lit.iter().zip(ends) {
        if *on {
            vertices.extend(line(a, b, t, color));
        }
    }
    vertices
}
