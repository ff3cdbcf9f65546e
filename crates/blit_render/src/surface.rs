use image::{ImageFormat, RgbaImage};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Decoded CPU-side pixels. Always RGBA8, whatever the bit depth of the file.
#[derive(Debug, Clone)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    /// Decode a BMP file. Files in any other format are rejected even if the
    /// `image` crate could read them.
    pub fn load_bmp(path: &Path) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("Couldn't open {}: {e}", path.display()))?;
        let image = image::load(BufReader::new(file), ImageFormat::Bmp)
            .map_err(|e| format!("Couldn't decode {} as BMP: {e}", path.display()))?;
        Ok(Self::from_rgba(image.into_rgba8()))
    }

    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Tightly packed rows, 4 bytes per pixel.
    pub fn as_bytes(&self) -> &[u8] {
        self.pixels.as_raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str, ext: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "blit_surface_test_{}_{}_{}.{}",
            name_hint,
            std::process::id(),
            nanos,
            ext
        ))
    }

    #[test]
    fn load_bmp_expands_rgb_to_rgba() {
        let path = temp_file_path("rgb", "bmp");
        let mut image = RgbImage::new(3, 2);
        image.put_pixel(2, 1, Rgb([10, 20, 30]));
        image
            .save_with_format(&path, ImageFormat::Bmp)
            .expect("failed to write bmp fixture");

        let surface = Surface::load_bmp(&path).expect("bmp should decode");
        assert_eq!(surface.size(), (3, 2));
        assert_eq!(surface.as_bytes().len(), 3 * 2 * 4);
        assert_eq!(surface.pixels().get_pixel(2, 1).0, [10, 20, 30, 255]);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_bmp_rejects_png_file() {
        let path = temp_file_path("png", "bmp");
        RgbImage::new(2, 2)
            .save_with_format(&path, ImageFormat::Png)
            .expect("failed to write png fixture");

        let err = Surface::load_bmp(&path).expect_err("png bytes are not a bmp");
        assert!(err.contains("as BMP"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_bmp_reports_missing_file() {
        let path = temp_file_path("missing", "bmp");
        let err = Surface::load_bmp(&path).expect_err("missing file should fail");
        assert!(err.contains("Couldn't open"));
    }
}
