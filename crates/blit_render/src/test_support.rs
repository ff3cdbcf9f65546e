//! Shared fixtures for render tests: a target that records every call and a
//! BMP fixture writer.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use image::{ImageFormat, Rgb, RgbImage};

use crate::blit::Rect;
use crate::surface::Surface;
use crate::target::{RenderTarget, TargetId};

#[derive(Default)]
struct Recorded {
    uploads: usize,
    live_handles: usize,
    copies: Vec<Rect>,
    upload_failure: Option<String>,
    copy_failure: Option<String>,
}

pub struct RecordedHandle {
    state: Rc<RefCell<Recorded>>,
}

impl Drop for RecordedHandle {
    fn drop(&mut self) {
        self.state.borrow_mut().live_handles -= 1;
    }
}

pub struct RecordingTarget {
    id: TargetId,
    state: Rc<RefCell<Recorded>>,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self {
            id: TargetId::next(),
            state: Rc::new(RefCell::new(Recorded::default())),
        }
    }

    pub fn fail_uploads(&mut self, message: &str) {
        self.state.borrow_mut().upload_failure = Some(message.to_string());
    }

    pub fn fail_copies(&mut self, message: &str) {
        self.state.borrow_mut().copy_failure = Some(message.to_string());
    }

    pub fn uploads(&self) -> usize {
        self.state.borrow().uploads
    }

    pub fn live_handles(&self) -> usize {
        self.state.borrow().live_handles
    }

    pub fn copies(&self) -> Vec<Rect> {
        self.state.borrow().copies.clone()
    }

    pub fn last_copy(&self) -> Option<Rect> {
        self.state.borrow().copies.last().copied()
    }
}

impl RenderTarget for RecordingTarget {
    type Handle = RecordedHandle;

    fn id(&self) -> TargetId {
        self.id
    }

    fn output_size(&self) -> (u32, u32) {
        (640, 480)
    }

    fn upload(&mut self, _surface: &Surface) -> Result<RecordedHandle, String> {
        let mut state = self.state.borrow_mut();
        if let Some(msg) = &state.upload_failure {
            return Err(msg.clone());
        }
        state.uploads += 1;
        state.live_handles += 1;
        Ok(RecordedHandle {
            state: Rc::clone(&self.state),
        })
    }

    fn copy(&mut self, _handle: &RecordedHandle, dst: Rect) -> Result<(), String> {
        let mut state = self.state.borrow_mut();
        state.copies.push(dst);
        match &state.copy_failure {
            Some(msg) => Err(msg.clone()),
            None => Ok(()),
        }
    }

    fn clear(&mut self) {}

    fn present(&mut self) -> Result<(), String> {
        Ok(())
    }
}

pub fn temp_file_path(name_hint: &str, ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!(
        "blit_render_test_{}_{}_{}.{}",
        name_hint,
        std::process::id(),
        nanos,
        ext
    ))
}

/// Write a 24-bit BMP whose pixel at (x, y) is `[x * 40, y * 40, 200]`.
pub fn write_bmp_fixture(path: &Path, width: u32, height: u32) {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 40) as u8, (y * 40) as u8, 200])
    });
    image
        .save_with_format(path, ImageFormat::Bmp)
        .expect("failed to write bmp fixture");
}
