//! The four menu images: built-in procedural art, or PNGs from a directory.

use std::path::Path;

use image::{Rgba, RgbaImage};
use tracing::info;

use icon_overlay::{Icon, OverlayError};

/// File names looked up by [`MenuIcons::load`].
pub const BALL_FILE:       &str = "ball.png";
pub const PANEL_FILE:      &str = "menu.png";
pub const VOLUME_FILE:     &str = "volume.png";
pub const BRIGHTNESS_FILE: &str = "brightness.png";

#[derive(Clone, Debug)]
pub struct MenuIcons {
    pub ball:       Icon,
    pub panel:      Icon,
    pub volume:     Icon,
    pub brightness: Icon,
}

impl MenuIcons {
    /// Load all four icons from `dir`. Any missing or unreadable file fails
    /// the whole set.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, OverlayError> {
        let dir = dir.as_ref();
        let icons = MenuIcons {
            ball:       Icon::open(dir.join(BALL_FILE))?,
            panel:      Icon::open(dir.join(PANEL_FILE))?,
            volume:     Icon::open(dir.join(VOLUME_FILE))?,
            brightness: Icon::open(dir.join(BRIGHTNESS_FILE))?,
        };
        info!(dir = %dir.display(), "loaded menu icons");
        Ok(icons)
    }

    /// Flat-colored art drawn at startup; no files needed.
    pub fn builtin() -> Self {
        MenuIcons {
            ball:       Icon::from_rgba(ball(64)),
            panel:      Icon::from_rgba(panel(60, 24)),
            volume:     Icon::from_rgba(speaker(48)),
            brightness: Icon::from_rgba(sun(48)),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Procedural art
// ════════════════════════════════════════════════════════════════════════════

const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Distance from pixel center `(x, y)` to the image center.
fn radius_at(x: u32, y: u32, side: u32) -> f32 {
    let c = side as f32 / 2.0;
    let dx = x as f32 + 0.5 - c;
    let dy = y as f32 + 0.5 - c;
    (dx * dx + dy * dy).sqrt()
}

/// Soft-edged disc with a lighter core.
fn ball(side: u32) -> RgbaImage {
    let r = side as f32 / 2.0;
    RgbaImage::from_fn(side, side, |x, y| {
        let d = radius_at(x, y, side);
        if d > r {
            return CLEAR;
        }
        let edge = ((r - d) / 2.0).clamp(0.0, 1.0);
        let core = 1.0 - d / r;
        let g = (120.0 + 135.0 * core) as u8;
        Rgba([40, g, 255, (255.0 * edge) as u8])
    })
}

/// Rounded translucent bar the option icons sit on.
fn panel(w: u32, h: u32) -> RgbaImage {
    let rad = h as f32 / 2.0;
    RgbaImage::from_fn(w, h, |x, y| {
        let px = x as f32 + 0.5;
        let py = y as f32 + 0.5;
        let cx = px.clamp(rad, w as f32 - rad);
        let d = ((px - cx).powi(2) + (py - rad).powi(2)).sqrt();
        if d > rad {
            CLEAR
        } else {
            Rgba([30, 30, 45, 200])
        }
    })
}

/// Speaker cone with two sound arcs.
fn speaker(side: u32) -> RgbaImage {
    let s = side as f32;
    let fg = Rgba([255, 210, 60, 255]);
    RgbaImage::from_fn(side, side, |x, y| {
        let fx = (x as f32 + 0.5) / s;
        let fy = (y as f32 + 0.5) / s;
        let dy = (fy - 0.5).abs();

        let body = (0.15..0.3).contains(&fx) && dy < 0.12;
        let cone = (0.3..0.5).contains(&fx) && dy < 0.12 + (fx - 0.3) * 1.2;
        let r = ((fx - 0.5).powi(2) + (fy - 0.5).powi(2)).sqrt();
        let arcs = fx > 0.55 && ((0.18..0.24).contains(&r) || (0.32..0.38).contains(&r)) && dy < r * 0.8;

        if body || cone || arcs { fg } else { CLEAR }
    })
}

/// Disc with eight rays.
fn sun(side: u32) -> RgbaImage {
    let s = side as f32;
    let fg = Rgba([255, 245, 200, 255]);
    RgbaImage::from_fn(side, side, |x, y| {
        let d = radius_at(x, y, side) / s;
        if d < 0.2 {
            return fg;
        }
        if !(0.27..0.45).contains(&d) {
            return CLEAR;
        }
        let dx = x as f32 + 0.5 - s / 2.0;
        let dy = y as f32 + 0.5 - s / 2.0;
        let angle = dy.atan2(dx);
        let step = std::f32::consts::FRAC_PI_4;
        let off = (angle / step).round() * step - angle;
        if (off * d * s).abs() < 2.5 { fg } else { CLEAR }
    })
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
