//! CPU render target. Composites blits into an RGBA8 frame so output can be
//! inspected or written to disk without a window or GPU.

use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};

use crate::blit::Rect;
use crate::surface::Surface;
use crate::target::{RenderTarget, TargetId};

/// Largest texture edge the canvas accepts, matching wgpu's default
/// `max_texture_dimension_2d`.
pub const MAX_TEXTURE_DIMENSION: u32 = 8192;

pub struct CanvasTexture {
    pixels: RgbaImage,
}

pub struct Canvas {
    id: TargetId,
    frame: RgbaImage,
    clear_color: Rgba<u8>,
    frames_presented: u64,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        let clear_color = Rgba([0, 0, 0, 255]);
        Self {
            id: TargetId::next(),
            frame: RgbaImage::from_pixel(width, height, clear_color),
            clear_color,
            frames_presented: 0,
        }
    }

    pub fn set_clear_color(&mut self, color: [u8; 4]) {
        self.clear_color = Rgba(color);
    }

    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn save_png(&self, path: &Path) -> Result<(), String> {
        self.frame
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| format!("Failed to write frame to {}: {e}", path.display()))
    }
}

impl RenderTarget for Canvas {
    type Handle = CanvasTexture;

    fn id(&self) -> TargetId {
        self.id
    }

    fn output_size(&self) -> (u32, u32) {
        self.frame.dimensions()
    }

    fn upload(&mut self, surface: &Surface) -> Result<CanvasTexture, String> {
        let (w, h) = surface.size();
        if w == 0 || h == 0 {
            return Err(format!("cannot create a {w}x{h} texture"));
        }
        if w > MAX_TEXTURE_DIMENSION || h > MAX_TEXTURE_DIMENSION {
            return Err(format!(
                "texture {w}x{h} exceeds the {MAX_TEXTURE_DIMENSION}px limit"
            ));
        }
        Ok(CanvasTexture {
            pixels: surface.pixels().clone(),
        })
    }

    fn copy(&mut self, handle: &CanvasTexture, dst: Rect) -> Result<(), String> {
        let (src_w, src_h) = handle.pixels.dimensions();
        if dst.w != src_w || dst.h != src_h {
            return Err(format!(
                "destination {}x{} does not match texture {src_w}x{src_h}",
                dst.w, dst.h
            ));
        }
        let (frame_w, frame_h) = self.frame.dimensions();
        let Some(visible) = dst.intersect(&Rect::new(0, 0, frame_w, frame_h)) else {
            return Ok(());
        };

        for fy in visible.y..visible.y + visible.h as i32 {
            for fx in visible.x..visible.x + visible.w as i32 {
                let src = *handle
                    .pixels
                    .get_pixel((fx - dst.x) as u32, (fy - dst.y) as u32);
                blend_over(self.frame.get_pixel_mut(fx as u32, fy as u32), src);
            }
        }
        Ok(())
    }

    fn clear(&mut self) {
        let color = self.clear_color;
        for pixel in self.frame.pixels_mut() {
            *pixel = color;
        }
    }

    fn present(&mut self) -> Result<(), String> {
        self.frames_presented += 1;
        Ok(())
    }
}

/// Source-over blend of straight-alpha pixels.
fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let alpha = src[3] as u32;
    match alpha {
        255 => *dst = src,
        0 => {}
        _ => {
            let inv = 255 - alpha;
            for c in 0..3 {
                dst[c] = ((src[c] as u32 * alpha + dst[c] as u32 * inv + 127) / 255) as u8;
            }
            dst[3] = (alpha + (dst[3] as u32 * inv + 127) / 255) as u8;
        }
    }
}
