//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position (pixels, y down) and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for game elements
pub mod colors {
    pub const BACKGROUND: [f32; 4] = [0.03, 0.04, 0.09, 1.0];
    pub const STAR: [f32; 4] = [0.75, 0.8, 1.0, 1.0];

    pub const PLATFORM_STATIC: [f32; 4] = [0.25, 0.75, 0.85, 1.0];
    pub const PLATFORM_MOVING: [f32; 4] = [0.35, 0.5, 1.0, 1.0];
    pub const PLATFORM_BREAKING: [f32; 4] = [0.95, 0.55, 0.2, 1.0];
    pub const PLATFORM_BOUNCY: [f32; 4] = [0.35, 0.95, 0.45, 1.0];
    pub const PLATFORM_BLANK: [f32; 4] = [0.7, 0.72, 0.8, 0.8];
    pub const GLYPH: [f32; 4] = [0.02, 0.03, 0.08, 0.9];

    pub const COIN: [f32; 4] = [1.0, 0.82, 0.2, 1.0];
    pub const COIN_RIM: [f32; 4] = [0.8, 0.55, 0.1, 1.0];
    pub const BIT: [f32; 4] = [0.1, 0.12, 0.22, 1.0];
    pub const BIT_RIM: [f32; 4] = [0.6, 0.9, 1.0, 1.0];
    pub const BIT_DIGIT: [f32; 4] = [0.85, 0.95, 1.0, 1.0];

    pub const PLAYER: [f32; 4] = [1.0, 0.4, 0.6, 1.0];
    pub const PLAYER_RIM: [f32; 4] = [0.6, 0.15, 0.3, 1.0];
    pub const EYE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const PUPIL: [f32; 4] = [0.05, 0.05, 0.1, 1.0];

    pub const COUNTDOWN: [f32; 4] = [1.0, 1.0, 1.0, 0.9];
    pub const DIM_WON: [f32; 4] = [0.02, 0.12, 0.06, 0.6];
    pub const DIM_LOST: [f32; 4] = [0.14, 0.02, 0.04, 0.6];
}
