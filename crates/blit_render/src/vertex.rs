use crate::blit::Rect;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlitVertex {
    pub position: [f32; 2],
    pub tex_coords: [f32; 2],
}

/// Index pattern for one quad built by `BlitVertex::quad`.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

impl BlitVertex {
    /// Corners of `dst` in pixel space, clockwise from top-left, sampling the
    /// whole texture.
    pub fn quad(dst: Rect) -> [BlitVertex; 4] {
        let left = dst.x as f32;
        let top = dst.y as f32;
        let right = left + dst.w as f32;
        let bottom = top + dst.h as f32;
        [
            BlitVertex {
                position: [left, top],
                tex_coords: [0.0, 0.0],
            },
            BlitVertex {
                position: [right, top],
                tex_coords: [1.0, 0.0],
            },
            BlitVertex {
                position: [right, bottom],
                tex_coords: [1.0, 1.0],
            },
            BlitVertex {
                position: [left, bottom],
                tex_coords: [0.0, 1.0],
            },
        ]
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<BlitVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // position
                wgpu::VertexAttribute {
                    offset: std::mem::offset_of!(BlitVertex, position) as wgpu::BufferAddress,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                // tex_coords
                wgpu::VertexAttribute {
                    offset: std::mem::offset_of!(BlitVertex, tex_coords) as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}
