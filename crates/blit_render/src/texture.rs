//! Image loading: BMP file → `Surface` → renderer-resident `Texture`.
//!
//! `load_texture` never caches. Each call reads the file and uploads a fresh
//! copy, so GPU memory proportional to the image stays in use for as long as
//! the returned texture is alive.

use std::fmt;
use std::path::Path;

use crate::surface::Surface;
use crate::target::{report_error, RenderTarget, TargetId};

pub const LOAD_OPERATION: &str = "LoadBMP";
pub const UPLOAD_OPERATION: &str = "CreateTextureFromSurface";

/// A texture uploaded to one render target.
///
/// The native size is captured at upload and never changes. Dropping the
/// texture drops the backend handle, which releases the backend storage.
pub struct Texture<H> {
    handle: H,
    width: u32,
    height: u32,
    owner: TargetId,
}

impl<H> Texture<H> {
    /// Upload `surface` to `target`. The surface is left untouched.
    pub fn from_surface<T>(target: &mut T, surface: &Surface) -> Result<Self, String>
    where
        T: RenderTarget<Handle = H>,
    {
        let handle = target.upload(surface)?;
        Ok(Self {
            handle,
            width: surface.width(),
            height: surface.height(),
            owner: target.id(),
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn owner(&self) -> TargetId {
        self.owner
    }

    pub(crate) fn handle(&self) -> &H {
        &self.handle
    }
}

impl<H> fmt::Debug for Texture<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureLoadError {
    /// The file could not be read or is not a valid BMP.
    Decode(String),
    /// The surface decoded but the target refused the upload.
    Upload(String),
}

impl TextureLoadError {
    /// Name of the failing step, used as the diagnostic prefix.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Decode(_) => LOAD_OPERATION,
            Self::Upload(_) => UPLOAD_OPERATION,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Decode(msg) | Self::Upload(msg) => msg,
        }
    }
}

impl fmt::Display for TextureLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.operation(), self.message())
    }
}

impl std::error::Error for TextureLoadError {}

/// Load a BMP file into a texture on `target`.
///
/// Failures are written to the diagnostic channel and returned; `target` is
/// not touched when decoding fails.
pub fn load_texture<T: RenderTarget>(
    path: impl AsRef<Path>,
    target: &mut T,
) -> Result<Texture<T::Handle>, TextureLoadError> {
    let path = path.as_ref();
    let surface = match Surface::load_bmp(path) {
        Ok(surface) => surface,
        Err(msg) => {
            report_error(LOAD_OPERATION, &msg);
            return Err(TextureLoadError::Decode(msg));
        }
    };

    let uploaded = Texture::from_surface(target, &surface);
    drop(surface);

    match uploaded {
        Ok(texture) => {
            log::info!(
                "Loaded texture '{}' ({}x{}) on {}",
                path.display(),
                texture.width,
                texture.height,
                texture.owner
            );
            Ok(texture)
        }
        Err(msg) => {
            let msg = format!("{}: {msg}", path.display());
            report_error(UPLOAD_OPERATION, &msg);
            Err(TextureLoadError::Upload(msg))
        }
    }
}
