//! Blitting a whole texture at a position, plus the rectangle arithmetic the
//! lessons use to lay textures out (tiling and centering).

use std::fmt;

use crate::target::{RenderTarget, TargetId};
use crate::texture::Texture;

/// Destination rectangle in target pixels. `x`/`y` may be negative or past the
/// edge of the target; targets clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i64 {
        self.x as i64 + self.w as i64
    }

    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.h as i64
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Overlap of two rectangles, or `None` when they do not overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = (self.x as i64).max(other.x as i64);
        let top = (self.y as i64).max(other.y as i64);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return None;
        }
        Some(Rect {
            x: left as i32,
            y: top as i32,
            w: (right - left) as u32,
            h: (bottom - top) as u32,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlitError {
    /// The texture was uploaded to a different target.
    ForeignTexture { owner: TargetId, target: TargetId },
    /// The target rejected the copy.
    Copy(String),
}

impl fmt::Display for BlitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ForeignTexture { owner, target } => write!(
                f,
                "texture belongs to {owner} and cannot be drawn on {target}"
            ),
            Self::Copy(msg) => write!(f, "RenderCopy failed: {msg}"),
        }
    }
}

impl std::error::Error for BlitError {}

/// Where `texture` lands when drawn at `(x, y)`: its native size, unscaled.
pub fn destination_rect<H>(texture: &Texture<H>, x: i32, y: i32) -> Rect {
    let (w, h) = texture.size();
    Rect { x, y, w, h }
}

/// Draw the whole of `texture` onto `target` with its top-left corner at
/// `(x, y)`, preserving its width and height.
pub fn draw_texture<T: RenderTarget>(
    texture: &Texture<T::Handle>,
    target: &mut T,
    x: i32,
    y: i32,
) -> Result<(), BlitError> {
    if texture.owner() != target.id() {
        return Err(BlitError::ForeignTexture {
            owner: texture.owner(),
            target: target.id(),
        });
    }
    let dst = destination_rect(texture, x, y);
    target.copy(texture.handle(), dst).map_err(BlitError::Copy)
}

/// Origins of a `columns x rows` grid of equally sized tiles, row-major,
/// starting at (0, 0).
pub fn tile_origins(tile_w: u32, tile_h: u32, columns: u32, rows: u32) -> Vec<(i32, i32)> {
    let mut origins = Vec::with_capacity((columns as usize) * (rows as usize));
    for row in 0..rows {
        for col in 0..columns {
            origins.push((axis_offset(col, tile_w), axis_offset(row, tile_h)));
        }
    }
    origins
}

/// Columns and rows of `tile_w x tile_h` tiles needed to cover an area.
pub fn tiles_to_cover(tile_w: u32, tile_h: u32, area_w: u32, area_h: u32) -> (u32, u32) {
    if tile_w == 0 || tile_h == 0 {
        return (0, 0);
    }
    (area_w.div_ceil(tile_w), area_h.div_ceil(tile_h))
}

/// Origin that centers a `tile_w x tile_h` texture in the area. Negative when
/// the texture is larger than the area.
pub fn centered_origin(tile_w: u32, tile_h: u32, area_w: u32, area_h: u32) -> (i32, i32) {
    let x = area_w as i64 / 2 - tile_w as i64 / 2;
    let y = area_h as i64 / 2 - tile_h as i64 / 2;
    (clamp_i32(x), clamp_i32(y))
}

fn axis_offset(index: u32, tile: u32) -> i32 {
    clamp_i32(index as i64 * tile as i64)
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
