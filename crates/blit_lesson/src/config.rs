//! Lesson configuration: window, which bitmaps to draw and how, and how many
//! frames to show. Loaded from JSON; `LessonConfig::default()` is the classic
//! lesson (640x480 window, tiled `background.bmp`, centered `smile.bmp`, one
//! frame held for three seconds).

use blit_platform::PlatformConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Upper bound on background grid copies per frame.
pub const MAX_GRID_TILES: u64 = 4096;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LessonConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default)]
    pub background: Option<BackgroundLayer>,
    #[serde(default)]
    pub foreground: Option<ImageLayer>,
    #[serde(default = "default_frames")]
    pub frames: u32,
    #[serde(default = "default_frame_delay_ms")]
    pub frame_delay_ms: u64,
    #[serde(default = "default_vsync")]
    pub vsync: bool,
    #[serde(default = "default_clear_color")]
    pub clear_color: [u8; 4],
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BackgroundLayer {
    pub path: String,
    #[serde(default)]
    pub tiling: Tiling,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tiling {
    /// Fixed grid of copies starting at the top-left corner.
    Grid { columns: u32, rows: u32 },
    /// As many copies as it takes to cover the window.
    Fill,
}

impl Default for Tiling {
    fn default() -> Self {
        Tiling::Grid {
            columns: 2,
            rows: 2,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ImageLayer {
    pub path: String,
    #[serde(default)]
    pub placement: Placement,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    #[default]
    Centered,
    At {
        x: i32,
        y: i32,
    },
}

impl Default for LessonConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
            background: Some(BackgroundLayer {
                path: "background.bmp".to_string(),
                tiling: Tiling::default(),
            }),
            foreground: Some(ImageLayer {
                path: "smile.bmp".to_string(),
                placement: Placement::Centered,
            }),
            frames: default_frames(),
            frame_delay_ms: default_frame_delay_ms(),
            vsync: default_vsync(),
            clear_color: default_clear_color(),
        }
    }
}

impl LessonConfig {
    pub fn platform_config(&self) -> PlatformConfig {
        PlatformConfig {
            title: self.title.clone(),
            width: self.width,
            height: self.height,
            ..PlatformConfig::default()
        }
    }

    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_delay_ms)
    }
}

pub fn load_config_from_path(path: &Path) -> Result<LessonConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read lesson config {}: {e}", path.display()))?;
    let config: LessonConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse lesson config {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &LessonConfig) -> Result<(), String> {
    if config.width == 0 || config.height == 0 {
        return Err(format!(
            "Config validation failed: window size {}x{} must be non-zero",
            config.width, config.height
        ));
    }
    if config.frames == 0 {
        return Err("Config validation failed: frames must be > 0".to_string());
    }
    if let Some(background) = &config.background {
        if background.path.is_empty() {
            return Err("Config validation failed: background path is empty".to_string());
        }
        if let Tiling::Grid { columns, rows } = background.tiling {
            if columns == 0 || rows == 0 {
                return Err(format!(
                    "Config validation failed: background grid {columns}x{rows} must be non-zero"
                ));
            }
            if columns as u64 * rows as u64 > MAX_GRID_TILES {
                return Err(format!(
                    "Config validation failed: background grid {columns}x{rows} exceeds {MAX_GRID_TILES} tiles"
                ));
            }
        }
    }
    if let Some(foreground) = &config.foreground {
        if foreground.path.is_empty() {
            return Err("Config validation failed: foreground path is empty".to_string());
        }
    }
    if config.background.is_none() && config.foreground.is_none() {
        log::warn!("Lesson config draws no images. This is allowed but often accidental.");
    }
    Ok(())
}

fn default_title() -> String {
    "Lesson 2".to_string()
}

const fn default_width() -> u32 {
    640
}

const fn default_height() -> u32 {
    480
}

const fn default_frames() -> u32 {
    1
}

const fn default_frame_delay_ms() -> u64 {
    3000
}

const fn default_vsync() -> bool {
    true
}

const fn default_clear_color() -> [u8; 4] {
    [0, 0, 0, 255]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "blit_config_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn write_config_file(path: &Path, body: &str) {
        fs::write(path, body).expect("failed to write temp config file");
    }

    #[test]
    fn default_config_is_classic_lesson() {
        let config = LessonConfig::default();
        assert_eq!(config.title, "Lesson 2");
        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.frames, 1);
        assert_eq!(config.frame_delay(), Duration::from_secs(3));
        let background = config.background.as_ref().expect("background layer");
        assert_eq!(background.path, "background.bmp");
        assert_eq!(
            background.tiling,
            Tiling::Grid {
                columns: 2,
                rows: 2
            }
        );
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn load_config_applies_defaults() {
        let path = temp_file_path("defaults");
        write_config_file(
            &path,
            r#"{ "title": "Lesson 3", "background": { "path": "assets/bg.bmp" } }"#,
        );

        let config = load_config_from_path(&path).expect("config should load");
        assert_eq!(config.title, "Lesson 3");
        assert_eq!(config.width, 640);
        assert_eq!(config.frames, 1);
        assert!(config.vsync);
        assert_eq!(config.clear_color, [0, 0, 0, 255]);
        assert!(config.foreground.is_none());
        assert_eq!(
            config.background.as_ref().expect("background").tiling,
            Tiling::default()
        );

        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_config_parses_layouts() {
        let path = temp_file_path("layouts");
        write_config_file(
            &path,
            r#"
            {
              "width": 800,
              "height": 600,
              "frames": 3,
              "frame_delay_ms": 1000,
              "background": { "path": "bg.bmp", "tiling": "fill" },
              "foreground": { "path": "fg.bmp", "placement": { "at": { "x": 12, "y": -4 } } }
            }
            "#,
        );

        let config = load_config_from_path(&path).expect("config should load");
        assert_eq!(config.background.as_ref().expect("background").tiling, Tiling::Fill);
        assert_eq!(
            config.foreground.as_ref().expect("foreground").placement,
            Placement::At { x: 12, y: -4 }
        );
        assert_eq!(config.platform_config().width, 800);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_config_rejects_zero_frames() {
        let path = temp_file_path("zero_frames");
        write_config_file(&path, r#"{ "frames": 0 }"#);

        let err = load_config_from_path(&path).expect_err("zero frames should fail");
        assert!(err.contains("frames must be > 0"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_config_rejects_empty_grid() {
        let path = temp_file_path("empty_grid");
        write_config_file(
            &path,
            r#"{ "background": { "path": "bg.bmp", "tiling": { "grid": { "columns": 0, "rows": 2 } } } }"#,
        );

        let err = load_config_from_path(&path).expect_err("empty grid should fail");
        assert!(err.contains("background grid 0x2"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_config_rejects_oversized_grid() {
        let path = temp_file_path("huge_grid");
        write_config_file(
            &path,
            r#"{ "background": { "path": "bg.bmp", "tiling": { "grid": { "columns": 4000000000, "rows": 4000000000 } } } }"#,
        );

        let err = load_config_from_path(&path).expect_err("huge grid should fail");
        assert!(err.contains("exceeds 4096 tiles"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn grid_at_tile_limit_is_accepted() {
        let config = LessonConfig {
            background: Some(BackgroundLayer {
                path: "bg.bmp".to_string(),
                tiling: Tiling::Grid {
                    columns: 64,
                    rows: 64,
                },
            }),
            ..LessonConfig::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn load_config_reports_missing_file() {
        let path = temp_file_path("missing");
        let err = load_config_from_path(&path).expect_err("missing file should fail");
        assert!(err.contains("Failed to read lesson config"));
    }

    #[test]
    fn load_config_reports_bad_json() {
        let path = temp_file_path("bad_json");
        write_config_file(&path, "{ not json");
        let err = load_config_from_path(&path).expect_err("bad json should fail");
        assert!(err.contains("Failed to parse lesson config"));
        let _ = fs::remove_file(path);
    }
}
