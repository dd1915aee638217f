//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
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
    use crate::sim::{BrickKind, PowerUpKind};

    pub const WALL: [f32; 4] = [0.45, 0.45, 0.55, 1.0];
    /// Bottom limit: drawn dim so it reads as a pit
    pub const LIMIT: [f32; 4] = [0.35, 0.08, 0.08, 1.0];
    pub const BAR: [f32; 4] = [0.85, 0.85, 0.9, 1.0];
    pub const BAR_WIDE: [f32; 4] = [0.3, 0.6, 1.0, 1.0];
    pub const BALL: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const BALL_SLOW: [f32; 4] = [0.6, 1.0, 0.7, 1.0];
    pub const BRICK_1: [f32; 4] = [0.9, 0.3, 0.3, 1.0];
    pub const BRICK_2: [f32; 4] = [0.3, 0.8, 0.4, 1.0];
    pub const BRICK_3: [f32; 4] = [0.3, 0.5, 0.95, 1.0];
    pub const POWERUP_LIFE: [f32; 4] = [1.0, 0.4, 0.7, 1.0];
    pub const POWERUP_WIDEN: [f32; 4] = [0.3, 0.6, 1.0, 1.0];
    pub const POWERUP_SLOW: [f32; 4] = [0.6, 1.0, 0.7, 1.0];
    pub const LIFE_ICON: [f32; 4] = [0.85, 0.85, 0.9, 0.9];
    pub const BACKGROUND: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

    pub fn brick(kind: BrickKind) -> [f32; 4] {
        match kind.value() {
            1 => BRICK_1,
            2 => BRICK_2,
            _ => BRICK_3,
        }
    }

    pub fn powerup(kind: PowerUpKind) -> [f32; 4] {
        match kind {
            PowerUpKind::ExtraLife => POWERUP_LIFE,
            PowerUpKind::WidenBar => POWERUP_WIDEN,
            PowerUpKind::SlowBall => POWERUP_SLOW,
        }
    }
}
