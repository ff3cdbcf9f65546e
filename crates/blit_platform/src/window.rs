use std::sync::Arc;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            title: "Lesson 2".to_string(),
            width: 640,
            height: 480,
            resizable: false,
        }
    }
}

impl PlatformConfig {
    pub fn attributes(&self) -> WindowAttributes {
        WindowAttributes::default()
            .with_title(&self.title)
            .with_resizable(self.resizable)
            .with_inner_size(winit::dpi::LogicalSize::new(self.width, self.height))
    }
}

/// Opens the lesson window. The window lives as long as the last `Arc` to it,
/// so the renderer's surface keeps it alive until the renderer is dropped.
pub fn create_window(
    event_loop: &ActiveEventLoop,
    config: &PlatformConfig,
) -> Result<Arc<Window>, String> {
    if config.width == 0 || config.height == 0 {
        return Err(format!(
            "window size must be non-zero, got {}x{}",
            config.width, config.height
        ));
    }
    let window = event_loop
        .create_window(config.attributes())
        .map_err(|e| format!("Failed to create window '{}': {e}", config.title))?;
    log::info!(
        "Window created: '{}' {}x{}",
        config.title,
        config.width,
        config.height
    );
    Ok(Arc::new(window))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_lesson_window() {
        let config = PlatformConfig::default();
        assert_eq!(config.title, "Lesson 2");
        assert_eq!((config.width, config.height), (640, 480));
        assert!(!config.resizable);
    }
}
