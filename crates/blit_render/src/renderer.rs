//! Window render target backed by wgpu.
//!
//! Blits are queued by `copy` and drawn in submission order when `present`
//! runs, one indexed quad per blit, over a frame cleared to the clear color.
//! The vertex and index buffers grow in powers of two but never shrink.

use std::sync::Arc;

use winit::window::Window;

use crate::blit::Rect;
use crate::blit_pipeline::BlitPipeline;
use crate::gpu_context::GpuContext;
use crate::projection::ScreenProjection;
use crate::surface::Surface;
use crate::target::{RenderTarget, TargetId};
use crate::vertex::{BlitVertex, QUAD_INDICES};

pub struct GpuTexture {
    bind_group: Arc<wgpu::BindGroup>,
    _texture: wgpu::Texture,
}

struct QueuedBlit {
    bind_group: Arc<wgpu::BindGroup>,
    dst: Rect,
}

pub struct WgpuRenderer {
    id: TargetId,
    queued: Vec<QueuedBlit>,
    clear_color: wgpu::Color,
    projection: ScreenProjection,
    projection_buffer: wgpu::Buffer,
    projection_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    quad_capacity: usize,
    pipeline: BlitPipeline,
    gpu: GpuContext,
}

impl WgpuRenderer {
    pub fn new(window: Arc<Window>, vsync: bool) -> Result<Self, String> {
        let gpu = GpuContext::new(window, vsync)?;
        let pipeline = BlitPipeline::new(&gpu.device, gpu.surface_format);
        let projection = ScreenProjection::new(gpu.size.0, gpu.size.1);

        let projection_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Blit Projection Buffer"),
            size: std::mem::size_of::<crate::projection::ProjectionUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let projection_bind_group =
            pipeline.create_projection_bind_group(&gpu.device, &projection_buffer);
        let vertex_buffer = create_vertex_buffer(&gpu.device, 1);
        let index_buffer = create_index_buffer(&gpu.device, 1);

        Ok(Self {
            id: TargetId::next(),
            queued: Vec::new(),
            clear_color: wgpu::Color::BLACK,
            projection,
            projection_buffer,
            projection_bind_group,
            vertex_buffer,
            index_buffer,
            quad_capacity: 1,
            pipeline,
            gpu,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        self.projection.viewport = self.gpu.size;
    }

    pub fn set_clear_color(&mut self, color: [u8; 4]) {
        self.clear_color = wgpu::Color {
            r: color[0] as f64 / 255.0,
            g: color[1] as f64 / 255.0,
            b: color[2] as f64 / 255.0,
            a: color[3] as f64 / 255.0,
        };
    }

    fn ensure_quad_capacity(&mut self, quads: usize) {
        if quads <= self.quad_capacity {
            return;
        }
        let capacity = quads.next_power_of_two();
        self.vertex_buffer = create_vertex_buffer(&self.gpu.device, capacity);
        self.index_buffer = create_index_buffer(&self.gpu.device, capacity);
        self.quad_capacity = capacity;
        log::debug!("Blit buffers grown to {capacity} quads");
    }
}

impl RenderTarget for WgpuRenderer {
    type Handle = GpuTexture;

    fn id(&self) -> TargetId {
        self.id
    }

    fn output_size(&self) -> (u32, u32) {
        self.gpu.size
    }

    fn upload(&mut self, surface: &Surface) -> Result<GpuTexture, String> {
        let (width, height) = surface.size();
        if width == 0 || height == 0 {
            return Err(format!("cannot create a {width}x{height} texture"));
        }
        let max = self.gpu.max_texture_dimension();
        if width > max || height > max {
            return Err(format!(
                "texture {width}x{height} exceeds the device limit of {max}px"
            ));
        }

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Blit Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.gpu.texture_format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.gpu.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            surface.as_bytes(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self
            .pipeline
            .create_texture_bind_group(&self.gpu.device, &view);

        Ok(GpuTexture {
            bind_group: Arc::new(bind_group),
            _texture: texture,
        })
    }

    fn copy(&mut self, handle: &GpuTexture, dst: Rect) -> Result<(), String> {
        if dst.is_empty() {
            return Err(format!("empty destination {}x{}", dst.w, dst.h));
        }
        self.queued.push(QueuedBlit {
            bind_group: Arc::clone(&handle.bind_group),
            dst,
        });
        Ok(())
    }

    fn clear(&mut self) {
        self.queued.clear();
    }

    fn present(&mut self) -> Result<(), String> {
        let blits = std::mem::take(&mut self.queued);
        let Some((output, view)) = self.gpu.begin_frame() else {
            return Err("no surface texture available this frame".to_string());
        };

        let mut vertices = Vec::with_capacity(blits.len() * 4);
        let mut indices = Vec::with_capacity(blits.len() * 6);
        for (i, blit) in blits.iter().enumerate() {
            let base = (i * 4) as u32;
            vertices.extend_from_slice(&BlitVertex::quad(blit.dst));
            indices.extend(QUAD_INDICES.iter().map(|idx| base + idx));
        }
        self.ensure_quad_capacity(blits.len());
        if !blits.is_empty() {
            self.gpu
                .queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
            self.gpu
                .queue
                .write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&indices));
        }
        self.gpu.queue.write_buffer(
            &self.projection_buffer,
            0,
            bytemuck::cast_slice(&[self.projection.build_uniform()]),
        );

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Blit Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Blit Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if !blits.is_empty() {
                pass.set_pipeline(&self.pipeline.pipeline);
                pass.set_bind_group(0, &self.projection_bind_group, &[]);
                pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                for (i, blit) in blits.iter().enumerate() {
                    let start = (i * 6) as u32;
                    pass.set_bind_group(1, &*blit.bind_group, &[]);
                    pass.draw_indexed(start..start + 6, 0, 0..1);
                }
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

fn create_vertex_buffer(device: &wgpu::Device, quad_capacity: usize) -> wgpu::Buffer {
    let byte_len = (quad_capacity * 4 * std::mem::size_of::<BlitVertex>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Blit Vertex Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, quad_capacity: usize) -> wgpu::Buffer {
    let byte_len = (quad_capacity * 6 * std::mem::size_of::<u32>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Blit Index Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
