pub mod blit;
pub mod blit_pipeline;
pub mod canvas;
pub mod gpu_context;
pub mod projection;
pub mod renderer;
pub mod surface;
pub mod target;
pub mod texture;
pub mod vertex;

#[cfg(test)]
mod test_support;

pub use blit::{
    centered_origin, destination_rect, draw_texture, tile_origins, tiles_to_cover, BlitError, Rect,
};
pub use canvas::Canvas;
pub use gpu_context::GpuContext;
pub use renderer::{GpuTexture, WgpuRenderer};
pub use surface::Surface;
pub use target::{log_error, report_error, RenderTarget, TargetId};
pub use texture::{load_texture, Texture, TextureLoadError};
