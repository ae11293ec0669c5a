//! Vertex types for 3D rendering

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// World-space vertex with a flat normal and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, color: [f32; 4]) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
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
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for scene elements
pub mod colors {
    pub const GROUND: [f32; 4] = [0.42, 0.68, 0.36, 1.0];
    pub const INTERIOR_TOP: [f32; 4] = [0.22, 0.16, 0.12, 1.0];
    pub const INTERIOR_BOTTOM: [f32; 4] = [0.02, 0.01, 0.01, 1.0];
    /// Never visible; the mask writes no color
    pub const MASK: [f32; 4] = [0.0, 0.0, 0.0, 0.0];
    pub const BACKGROUND: [f32; 4] = [0.55, 0.75, 0.95, 1.0];
}
