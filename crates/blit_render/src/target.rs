//! The render-target seam shared by the window renderer and the software canvas.
//!
//! Every target carries a process-unique `TargetId`. Textures remember the id of
//! the target that uploaded them, and the blitter refuses to copy a texture onto
//! any other target. Ids are never reused, so a texture that outlives its target
//! cannot be accepted anywhere else.

use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::blit::Rect;
use crate::surface::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId(u64);

impl TargetId {
    /// Allocate a fresh id. Called once per target construction.
    pub fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target#{}", self.0)
    }
}

pub trait RenderTarget {
    /// Backend-side texture storage. Dropping it releases the backend resource.
    type Handle;

    fn id(&self) -> TargetId;

    /// Size of the frame being drawn, in pixels.
    fn output_size(&self) -> (u32, u32);

    /// Copy a decoded surface into backend texture storage.
    fn upload(&mut self, surface: &Surface) -> Result<Self::Handle, String>;

    /// Copy the whole texture into `dst`. No scaling: callers pass a rectangle
    /// the size of the texture.
    fn copy(&mut self, handle: &Self::Handle, dst: Rect) -> Result<(), String>;

    fn clear(&mut self);

    fn present(&mut self) -> Result<(), String>;
}

/// Write a diagnostic line in the `<operation>error: <message>` form and
/// mirror it to the log.
pub fn log_error(out: &mut dyn Write, operation: &str, message: &str) {
    let _ = writeln!(out, "{operation}error: {message}");
    log::error!("{operation}error: {message}");
}

/// `log_error` on stdout.
pub fn report_error(operation: &str, message: &str) {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    log_error(&mut lock, operation, message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_ids_are_unique() {
        let a = TargetId::next();
        let b = TargetId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn log_error_uses_operation_prefix() {
        let mut out = Vec::new();
        log_error(&mut out, "LoadBMP", "file not found");
        let text = String::from_utf8(out).expect("utf8 output");
        assert_eq!(text, "LoadBMPerror: file not found\n");
    }
}
