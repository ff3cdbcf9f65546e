//! Blit lesson -- open a window, load bitmaps, blit them, exit.
//!
//! Sequence: create the event loop (subsystem init), then on `resumed` create
//! the window and its wgpu renderer and load the textures (`Lesson::start`).
//! Frames are drawn on `RedrawRequested` whenever `FramePacer` says one is
//! owed; between frames the loop sleeps with `ControlFlow::WaitUntil`. Once
//! the last frame has been held for its delay the lesson is dropped, which
//! releases textures, renderer and window in that order, and the loop exits.
//!
//! `--snapshot <png>` skips the window entirely and renders one frame into a
//! software canvas, then writes it to disk.

mod config;
mod lesson;
mod pacing;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use blit_platform::PlatformConfig;
use blit_render::WgpuRenderer;
use config::{load_config_from_path, LessonConfig};
use lesson::{CanvasHost, Host, Lesson, LessonError};
use pacing::FramePacer;

#[derive(Debug, Default, PartialEq)]
struct Args {
    config_path: Option<PathBuf>,
    snapshot_path: Option<PathBuf>,
}

fn usage() -> String {
    "Usage: blit_lesson [--config <lesson.json>] [--snapshot <frame.png>]\nExample: cargo run -p blit_lesson -- --config lessons/tiled.json".to_string()
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let slot = match arg.as_str() {
            "--config" => &mut parsed.config_path,
            "--snapshot" => &mut parsed.snapshot_path,
            other => return Err(format!("Unknown argument '{other}'\n{}", usage())),
        };
        let value = iter
            .next()
            .ok_or_else(|| format!("Missing value for '{arg}'\n{}", usage()))?;
        *slot = Some(PathBuf::from(value));
    }
    Ok(parsed)
}

struct WinitHost<'a> {
    event_loop: &'a ActiveEventLoop,
}

impl Host for WinitHost<'_> {
    type Window = Arc<Window>;
    type Renderer = WgpuRenderer;

    fn create_window(&mut self, config: &PlatformConfig) -> Result<Arc<Window>, String> {
        blit_platform::create_window(self.event_loop, config)
    }

    fn create_renderer(
        &mut self,
        window: &Arc<Window>,
        config: &LessonConfig,
    ) -> Result<WgpuRenderer, String> {
        let mut renderer = WgpuRenderer::new(Arc::clone(window), config.vsync)?;
        renderer.set_clear_color(config.clear_color);
        Ok(renderer)
    }
}

struct App {
    config: LessonConfig,
    pacer: FramePacer,
    lesson: Option<Lesson<Arc<Window>, WgpuRenderer>>,
    started: bool,
    exit_code: u8,
}

impl App {
    fn new(config: LessonConfig) -> Self {
        let pacer = FramePacer::new(config.frames, config.frame_delay());
        Self {
            config,
            pacer,
            lesson: None,
            started: false,
            exit_code: 0,
        }
    }

    fn finish(&mut self, event_loop: &ActiveEventLoop) {
        // Dropping the lesson releases its resources while the loop is alive.
        self.lesson = None;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.started {
            return;
        }
        self.started = true;

        let mut host = WinitHost { event_loop };
        match Lesson::start(&mut host, self.config.clone()) {
            Ok(lesson) => {
                lesson.window().request_redraw();
                self.lesson = Some(lesson);
            }
            Err(err) => {
                err.report();
                self.exit_code = err.exit_code();
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if self.lesson.is_none() {
            return;
        }
        if self.pacer.is_finished(now) {
            if let Some(lesson) = &self.lesson {
                log::info!(
                    "'{}' presented {} frame(s), exiting.",
                    lesson.config().title,
                    self.pacer.frames_presented()
                );
            }
            self.finish(event_loop);
            return;
        }
        if self.pacer.should_draw(now) {
            if let Some(lesson) = &self.lesson {
                lesson.window().request_redraw();
            }
            event_loop.set_control_flow(ControlFlow::Wait);
        } else if let Some(due) = self.pacer.next_wake() {
            event_loop.set_control_flow(ControlFlow::WaitUntil(due));
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(lesson) = self.lesson.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                self.finish(event_loop);
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    lesson.renderer_mut().resize(w, h);
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::RedrawRequested => {
                if !self.pacer.should_draw(Instant::now()) {
                    return;
                }
                let outcome = lesson.render_frame();
                if let Ok(stats) = &outcome {
                    if stats.failed_blits > 0 {
                        log::warn!(
                            "Frame presented with {}/{} failed blits",
                            stats.failed_blits,
                            stats.blits
                        );
                    }
                }
                if !self.pacer.record_frame(&outcome, Instant::now()) {
                    lesson.window().request_redraw();
                }
            }

            _ => {}
        }
    }
}

fn run_windowed(config: LessonConfig) -> Result<u8, LessonError> {
    let event_loop = EventLoop::new()
        .map_err(|e| LessonError::Init(format!("Failed to create event loop: {e}")))?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    event_loop
        .run_app(&mut app)
        .map_err(|e| LessonError::Init(format!("Event loop error: {e}")))?;
    Ok(app.exit_code)
}

fn run_snapshot(config: LessonConfig, out: &Path) -> Result<u8, LessonError> {
    let mut lesson = Lesson::start(&mut CanvasHost, config)?;
    let stats = lesson.render_frame().map_err(LessonError::Output)?;
    lesson
        .renderer()
        .save_png(out)
        .map_err(LessonError::Output)?;
    log::info!(
        "Snapshot written to {} ({} blits)",
        out.display(),
        stats.blits
    );
    Ok(0)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Blit lesson starting...");

    let raw_args: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&raw_args) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::from(1);
        }
    };

    let result = args
        .config_path
        .as_deref()
        .map_or_else(|| Ok(LessonConfig::default()), load_config_from_path)
        .map_err(LessonError::Config)
        .and_then(|config| match &args.snapshot_path {
            Some(out) => run_snapshot(config, out),
            None => run_windowed(config),
        });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            err.report();
            ExitCode::from(err.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_args_defaults_to_windowed_lesson() {
        assert_eq!(parse_args(&[]), Ok(Args::default()));
    }

    #[test]
    fn parse_args_reads_config_and_snapshot() {
        let args = parse_args(&strings(&["--snapshot", "out.png", "--config", "l.json"]))
            .expect("valid args");
        assert_eq!(args.config_path, Some(PathBuf::from("l.json")));
        assert_eq!(args.snapshot_path, Some(PathBuf::from("out.png")));
    }

    #[test]
    fn parse_args_rejects_unknown_and_dangling_flags() {
        let err = parse_args(&strings(&["--fullscreen"])).expect_err("unknown flag");
        assert!(err.contains("Unknown argument '--fullscreen'"));
        let err = parse_args(&strings(&["--config"])).expect_err("missing value");
        assert!(err.contains("Missing value for '--config'"));
    }

    #[test]
    fn snapshot_with_missing_images_fails_with_load_error() {
        let config = LessonConfig {
            background: Some(config::BackgroundLayer {
                path: "definitely/not/here.bmp".to_string(),
                tiling: config::Tiling::default(),
            }),
            ..LessonConfig::default()
        };
        let out = std::env::temp_dir().join("blit_main_never_written.png");
        let err = run_snapshot(config, &out).expect_err("missing image");
        assert_eq!(err.operation(), "LoadBMP");
        assert!(!out.exists());
    }

    #[test]
    fn snapshot_writes_rendered_frame() {
        let dir = std::env::temp_dir();
        let stamp = format!(
            "{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("system time before unix epoch")
                .as_nanos()
        );
        let background = dir.join(format!("blit_main_bg_{stamp}.bmp"));
        let out = dir.join(format!("blit_main_snapshot_{stamp}.png"));
        image::RgbImage::from_pixel(3, 3, image::Rgb([50, 60, 70]))
            .save_with_format(&background, image::ImageFormat::Bmp)
            .expect("failed to write bmp fixture");
        let config = LessonConfig {
            width: 8,
            height: 4,
            background: Some(config::BackgroundLayer {
                path: background.display().to_string(),
                tiling: config::Tiling::Fill,
            }),
            foreground: None,
            ..LessonConfig::default()
        };

        assert_eq!(run_snapshot(config, &out), Ok(0));
        let frame = image::open(&out).expect("snapshot png").into_rgba8();
        assert_eq!(frame.dimensions(), (8, 4));
        assert_eq!(frame.get_pixel(7, 3).0, [50, 60, 70, 255]);

        let _ = std::fs::remove_file(background);
        let _ = std::fs::remove_file(out);
    }
}
