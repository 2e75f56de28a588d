//! Vertex data structures and layouts for terrain rendering.
//!
//! This module defines the interleaved vertex format produced by the mesher and
//! consumed by the render layer's shader pipeline.

use cgmath::{Point3, Vector3};

/// A vertex of terrain geometry.
///
/// # Memory Layout
/// - Position: [f32; 4] world space, w = 1 (16 bytes)
/// - Normal: [f32; 4] outward face normal, w = 0 (16 bytes)
/// - UV: [f32; 2] texture atlas coordinates (8 bytes)
/// - Animation: f32, 1.0 for animated textures (4 bytes)
///
/// Total size: 44 bytes, eleven floats
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 4],
    pub normal: [f32; 4],
    pub uv: [f32; 2],
    pub animation: f32,
}

impl Vertex {
    /// Number of `f32` components per vertex.
    pub const FLOATS: usize = 11;

    /// Creates a new vertex.
    ///
    /// # Arguments
    /// * `position` - World space corner position
    /// * `normal` - Outward normal of the face the vertex belongs to
    /// * `uv` - Texture atlas coordinates
    /// * `animated` - Whether the shader should animate the texture
    pub fn new(position: Point3<f32>, normal: Vector3<f32>, uv: [f32; 2], animated: bool) -> Self {
        Vertex {
            position: [position.x, position.y, position.z, 1.0],
            normal: [normal.x, normal.y, normal.z, 0.0],
            uv,
            animation: if animated { 1.0 } else { 0.0 },
        }
    }

    /// Returns the vertex buffer layout description for the shader pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec4<f32>)
    /// - `location = 1`: normal (vec4<f32>)
    /// - `location = 2`: uv (vec2<f32>)
    /// - `location = 3`: animation (f32)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
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
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 10]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_eleven_tightly_packed_floats() {
        assert_eq!(std::mem::size_of::<Vertex>(), Vertex::FLOATS * 4);
        let layout = Vertex::desc();
        assert_eq!(layout.array_stride, 44);
        assert_eq!(layout.attributes[3].offset, 40);
    }

    #[test]
    fn casts_to_interleaved_floats() {
        let vertex = Vertex::new(Point3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 1.0, 0.0), [0.5, 0.25], true);
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&vertex));
        assert_eq!(floats, &[1.0, 2.0, 3.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.5, 0.25, 1.0]);
    }
}
