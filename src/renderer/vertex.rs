//! Vertex types for 3D rendering

use bytemuck::{Pod, Zeroable};

/// Clip-space vertex with a pre-shaded color.
///
/// Positions stay homogeneous (w not divided out) so the GPU clips
/// triangles that cross the near plane.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 4],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(position: [f32; 4], color: [f32; 4]) -> Self {
        Self { position, color }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Material colors (0xRRGGBB)
pub mod colors {
    pub const GROUND: u32 = 0x555555;
    pub const WALL: u32 = 0x404040;
    pub const OBSTACLE: u32 = 0xcd7f32;
    pub const VEHICLE: u32 = 0x3333cc;
    pub const STORE: u32 = 0xffd700;

    pub const POWER_UP_GUN1: u32 = 0x3fa7ff;
    pub const POWER_UP_GUN2: u32 = 0x9b59ff;
    pub const POWER_UP_SWORD: u32 = 0xe0e0e8;
    pub const POWER_UP_HEALTH: u32 = 0x2ecc40;
    pub const POWER_UP_INVINCIBILITY: u32 = 0xffdc00;

    pub const GUN_BODY: u32 = 0x2b2b30;
    pub const BLADE: u32 = 0xc8ccd4;
    pub const HILT: u32 = 0x5a3a1e;

    /// Warm torch light
    pub const TORCH: u32 = 0xffb066;
}
