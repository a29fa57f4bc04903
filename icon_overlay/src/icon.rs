//! Source images for overlays, with or without an alpha channel.

use std::borrow::Cow;
use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage, RgbaImage};
use tracing::debug;

use crate::error::OverlayError;

const SCALE_MIN: f32 = 0.1;
const SCALE_MAX: f32 = 10.0;
const SIDE_MIN:  u32 = 10;
const SIDE_MAX:  u32 = 1024;

/// An overlay image kept at its original resolution.
///
/// Stored as RGBA regardless of source; `has_alpha` records whether the
/// alpha channel is real or a synthetic fully-opaque fill.
#[derive(Clone, Debug)]
pub struct Icon {
    image:     RgbaImage,
    has_alpha: bool,
}

impl Icon {
    /// Load from disk, keeping transparency if the file has any.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, OverlayError> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| OverlayError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        let has_alpha = img.color().has_alpha();
        debug!(path = %path.display(), w = img.width(), h = img.height(), has_alpha, "icon loaded");
        Ok(Icon { image: img.to_rgba8(), has_alpha })
    }

    pub fn from_rgba(image: RgbaImage) -> Self {
        Icon { image, has_alpha: true }
    }

    pub fn from_rgb(image: RgbImage) -> Self {
        Icon { image: DynamicImage::ImageRgb8(image).to_rgba8(), has_alpha: false }
    }

    pub fn has_alpha(&self) -> bool { self.has_alpha }

    pub fn size(&self) -> (u32, u32) { self.image.dimensions() }

    pub fn image(&self) -> &RgbaImage { &self.image }

    /// Pixel size at `scale`: scale clamped to `[0.1, 10]`, each side to
    /// `[10, 1024]`.
    pub fn scaled_size(&self, scale: f32) -> (u32, u32) {
        let s = if scale.is_finite() { scale.clamp(SCALE_MIN, SCALE_MAX) } else { 1.0 };
        let (w, h) = self.image.dimensions();
        let side = |v: u32| ((v as f32 * s) as u32).clamp(SIDE_MIN, SIDE_MAX);
        (side(w), side(h))
    }

    /// The icon resized for `scale`, borrowed when no resize is needed.
    pub fn scaled(&self, scale: f32) -> Cow<'_, RgbaImage> {
        let (w, h) = self.scaled_size(scale);
        self.resized(w, h)
    }

    pub fn resized(&self, width: u32, height: u32) -> Cow<'_, RgbaImage> {
        if (width, height) == self.image.dimensions() {
            Cow::Borrowed(&self.image)
        } else {
            Cow::Owned(imageops::resize(&self.image, width, height, FilterType::Triangle))
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
