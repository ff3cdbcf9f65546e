//! The lesson itself: open a window, create its renderer, load the bitmaps,
//! then draw frames on request.
//!
//! Resource release is structural. `Lesson` declares its fields in the order
//! textures, renderer, window, and Rust drops fields in declaration order, so
//! a finished lesson releases everything in reverse order of acquisition.
//! `Lesson::start` holds the same resources in locals declared in acquisition
//! order, so an early return on failure releases them in reverse as well.

use std::fmt;

use blit_platform::PlatformConfig;
use blit_render::{
    centered_origin, draw_texture, load_texture, report_error, tile_origins, tiles_to_cover,
    Canvas, RenderTarget, Texture, TextureLoadError,
};

use crate::config::{LessonConfig, Placement, Tiling};

/// Creates the window and renderer a lesson draws with.
pub trait Host {
    type Window;
    type Renderer: RenderTarget;

    fn create_window(&mut self, config: &PlatformConfig) -> Result<Self::Window, String>;

    fn create_renderer(
        &mut self,
        window: &Self::Window,
        config: &LessonConfig,
    ) -> Result<Self::Renderer, String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LessonError {
    Init(String),
    Config(String),
    CreateWindow(String),
    CreateRenderer(String),
    LoadTexture(TextureLoadError),
    Output(String),
}

impl LessonError {
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Init(_) => "Init",
            Self::Config(_) => "LoadConfig",
            Self::CreateWindow(_) => "CreateWindow",
            Self::CreateRenderer(_) => "CreateRenderer",
            Self::LoadTexture(err) => err.operation(),
            Self::Output(_) => "SaveFrame",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Init(msg)
            | Self::Config(msg)
            | Self::CreateWindow(msg)
            | Self::CreateRenderer(msg)
            | Self::Output(msg) => msg,
            Self::LoadTexture(err) => err.message(),
        }
    }

    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// Write the diagnostic line. Texture failures were already reported by
    /// the loader and are not repeated.
    pub fn report(&self) {
        if let Self::LoadTexture(err) = self {
            log::info!("Lesson aborted after {}", err.operation());
            return;
        }
        report_error(self.operation(), self.message());
    }
}

impl fmt::Display for LessonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.operation(), self.message())
    }
}

impl std::error::Error for LessonError {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub blits: usize,
    pub failed_blits: usize,
}

impl FrameStats {
    fn record(&mut self, ok: bool) {
        self.blits += 1;
        if !ok {
            self.failed_blits += 1;
        }
    }
}

pub struct Lesson<W, R: RenderTarget> {
    background: Option<Texture<R::Handle>>,
    foreground: Option<Texture<R::Handle>>,
    renderer: R,
    window: W,
    config: LessonConfig,
}

impl<W, R: RenderTarget> Lesson<W, R> {
    pub fn start<H>(host: &mut H, config: LessonConfig) -> Result<Self, LessonError>
    where
        H: Host<Window = W, Renderer = R>,
    {
        let window = host
            .create_window(&config.platform_config())
            .map_err(LessonError::CreateWindow)?;
        let mut renderer = host
            .create_renderer(&window, &config)
            .map_err(LessonError::CreateRenderer)?;

        let background = config
            .background
            .as_ref()
            .map(|layer| load_texture(&layer.path, &mut renderer))
            .transpose()
            .map_err(LessonError::LoadTexture)?;
        let foreground = config
            .foreground
            .as_ref()
            .map(|layer| load_texture(&layer.path, &mut renderer))
            .transpose()
            .map_err(LessonError::LoadTexture)?;

        log::info!(
            "Lesson '{}' ready on {} ({} texture(s))",
            config.title,
            renderer.id(),
            background.iter().count() + foreground.iter().count()
        );

        Ok(Self {
            background,
            foreground,
            renderer,
            window,
            config,
        })
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn config(&self) -> &LessonConfig {
        &self.config
    }

    /// Clear, draw the background tiles and the foreground image, present.
    ///
    /// A failed blit is logged and the rest of the frame still goes out; only
    /// a failed present is returned as an error.
    pub fn render_frame(&mut self) -> Result<FrameStats, String> {
        let Self {
            background,
            foreground,
            renderer,
            config,
            ..
        } = self;
        let (out_w, out_h) = renderer.output_size();
        let mut stats = FrameStats::default();

        renderer.clear();

        if let (Some(texture), Some(layer)) = (background.as_ref(), config.background.as_ref()) {
            let (tile_w, tile_h) = texture.size();
            let (columns, rows) = match layer.tiling {
                Tiling::Grid { columns, rows } => (columns, rows),
                Tiling::Fill => tiles_to_cover(tile_w, tile_h, out_w, out_h),
            };
            for (x, y) in tile_origins(tile_w, tile_h, columns, rows) {
                stats.record(blit_logged(texture, renderer, x, y));
            }
        }

        if let (Some(texture), Some(layer)) = (foreground.as_ref(), config.foreground.as_ref()) {
            let (x, y) = match layer.placement {
                Placement::Centered => {
                    centered_origin(texture.width(), texture.height(), out_w, out_h)
                }
                Placement::At { x, y } => (x, y),
            };
            stats.record(blit_logged(texture, renderer, x, y));
        }

        renderer.present()?;
        Ok(stats)
    }
}

fn blit_logged<R: RenderTarget>(
    texture: &Texture<R::Handle>,
    renderer: &mut R,
    x: i32,
    y: i32,
) -> bool {
    match draw_texture(texture, renderer, x, y) {
        Ok(()) => true,
        Err(err) => {
            log::warn!("Blit at ({x}, {y}) failed: {err}");
            false
        }
    }
}

/// Draws into a software canvas instead of a window.
pub struct CanvasHost;

impl Host for CanvasHost {
    type Window = ();
    type Renderer = Canvas;

    fn create_window(&mut self, config: &PlatformConfig) -> Result<(), String> {
        if config.width == 0 || config.height == 0 {
            return Err(format!(
                "canvas size must be non-zero, got {}x{}",
                config.width, config.height
            ));
        }
        log::info!(
            "Headless lesson '{}': rendering {}x{} off-screen",
            config.title,
            config.width,
            config.height
        );
        Ok(())
    }

    fn create_renderer(&mut self, _window: &(), config: &LessonConfig) -> Result<Canvas, String> {
        let mut canvas = Canvas::new(config.width, config.height);
        canvas.set_clear_color(config.clear_color);
        canvas.clear();
        Ok(canvas)
    }
}
