//! Partial-alpha blending of a scaled icon onto an RGB frame.
//!
//! `result = background * (1 - a) + icon * a`, where `a` is the icon's
//! own alpha (or 1 for an opaque icon) times the element's global alpha.
//! Only the intersection of the icon rectangle with the frame is touched.

use std::borrow::Cow;

use image::{RgbImage, RgbaImage};

use crate::icon::Icon;

// ════════════════════════════════════════════════════════════════════════════
// Placement / clipping
// ════════════════════════════════════════════════════════════════════════════

/// Where an overlay landed on screen (may extend past the frame edges).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub x:      i32,
    pub y:      i32,
    pub width:  u32,
    pub height: u32,
}

impl Placement {
    /// Rectangle of `width × height` centered on `center` (floor halving).
    pub fn centered_at(center: (i32, i32), width: u32, height: u32) -> Self {
        Placement {
            x: center.0 - (width / 2) as i32,
            y: center.1 - (height / 2) as i32,
            width,
            height,
        }
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + (self.width / 2) as i32, self.y + (self.height / 2) as i32)
    }
}

/// Visible part of a placement: destination origin in the frame, source
/// origin in the icon, and the shared extent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Clip {
    dst_x:  u32,
    dst_y:  u32,
    src_x:  u32,
    src_y:  u32,
    width:  u32,
    height: u32,
}

fn clip(frame_w: u32, frame_h: u32, at: (i32, i32), w: u32, h: u32) -> Option<Clip> {
    let (x, y) = (at.0 as i64, at.1 as i64);
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w as i64).min(frame_w as i64);
    let y1 = (y + h as i64).min(frame_h as i64);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(Clip {
        dst_x:  x0 as u32,
        dst_y:  y0 as u32,
        src_x:  (x0 - x) as u32,
        src_y:  (y0 - y) as u32,
        width:  (x1 - x0) as u32,
        height: (y1 - y0) as u32,
    })
}

// ════════════════════════════════════════════════════════════════════════════
// Blending
// ════════════════════════════════════════════════════════════════════════════

/// Blend an already-scaled layer into `frame` with its top-left at `at`.
/// Returns false when nothing was drawn (off-frame or fully transparent).
///
/// Channels are rounded to the nearest value rather than truncated, so a
/// half-transparent white over black is 128, not 127.
pub fn blend_onto(
    frame:     &mut RgbImage,
    layer:     &RgbaImage,
    has_alpha: bool,
    at:        (i32, i32),
    alpha:     f32,
) -> bool {
    let alpha = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
    if alpha <= 0.0 {
        return false;
    }
    let Some(c) = clip(frame.width(), frame.height(), at, layer.width(), layer.height()) else {
        return false;
    };

    for row in 0..c.height {
        for col in 0..c.width {
            let src = layer.get_pixel(c.src_x + col, c.src_y + row).0;
            let a = if has_alpha { src[3] as f32 / 255.0 * alpha } else { alpha };
            let dst = frame.get_pixel_mut(c.dst_x + col, c.dst_y + row);
            for ch in 0..3 {
                let v = dst.0[ch] as f32 * (1.0 - a) + src[ch] as f32 * a;
                dst.0[ch] = v.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    true
}

/// Scale `icon` and blend it into `frame` in place.
pub fn composite_in_place(
    frame:    &mut RgbImage,
    icon:     &Icon,
    top_left: (i32, i32),
    scale:    f32,
    alpha:    f32,
) -> bool {
    let (w, h) = icon.scaled_size(scale);
    if clip(frame.width(), frame.height(), top_left, w, h).is_none() {
        return false;
    }
    let layer = icon.resized(w, h);
    blend_onto(frame, &layer, icon.has_alpha(), top_left, alpha)
}

/// Non-mutating form: the background itself when nothing is visible,
/// otherwise a blended copy.
pub fn composite<'a>(
    background: &'a RgbImage,
    icon:       &Icon,
    top_left:   (i32, i32),
    scale:      f32,
    alpha:      f32,
) -> Cow<'a, RgbImage> {
    let (w, h) = icon.scaled_size(scale);
    let visible = clip(background.width(), background.height(), top_left, w, h).is_some();
    if !visible || !(alpha > 0.0) {
        return Cow::Borrowed(background);
    }
    let mut out = background.clone();
    composite_in_place(&mut out, icon, top_left, scale, alpha);
    Cow::Owned(out)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba};

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    fn white_square(side: u32) -> Icon {
        Icon::from_rgb(RgbImage::from_pixel(side, side, WHITE))
    }

    fn count_white(img: &RgbImage) -> usize {
        img.pixels().filter(|p| **p == WHITE).count()
    }

    // ── clipping ──────────────────────────────────────────────────────────
    #[test]
    fn top_left_overhang_blends_visible_part_only() {
        let bg = RgbImage::from_pixel(100, 100, BLACK);
        let out = composite(&bg, &white_square(100), (-10, -10), 1.0, 1.0);
        assert_eq!(count_white(&out), 90 * 90);
        assert_eq!(out.get_pixel(89, 89), &WHITE);
        assert_eq!(out.get_pixel(90, 0), &BLACK);
        assert_eq!(out.get_pixel(0, 90), &BLACK);
    }

    #[test]
    fn bottom_right_overhang() {
        let bg = RgbImage::from_pixel(100, 100, BLACK);
        let out = composite(&bg, &white_square(20), (90, 95), 1.0, 1.0);
        assert_eq!(count_white(&out), 10 * 5);
        assert_eq!(out.get_pixel(99, 99), &WHITE);
        assert_eq!(out.get_pixel(89, 99), &BLACK);
    }

    #[test]
    fn fully_outside_returns_background_untouched() {
        let bg = RgbImage::from_pixel(100, 100, Rgb([7, 8, 9]));
        for at in [(100, 0), (0, 100), (-20, 10), (10, -20), (500, 500)] {
            let out = composite(&bg, &white_square(20), at, 1.0, 1.0);
            assert!(matches!(out, Cow::Borrowed(_)), "at {:?}", at);
            assert_eq!(*out, bg);
        }
    }

    #[test]
    fn zero_alpha_returns_background() {
        let bg = RgbImage::from_pixel(50, 50, BLACK);
        let out = composite(&bg, &white_square(20), (5, 5), 1.0, 0.0);
        assert!(matches!(out, Cow::Borrowed(_)));
    }

    #[test]
    fn composite_does_not_touch_input() {
        let bg = RgbImage::from_pixel(50, 50, BLACK);
        let out = composite(&bg, &white_square(20), (5, 5), 1.0, 1.0);
        assert!(matches!(out, Cow::Owned(_)));
        assert_eq!(count_white(&bg), 0);
        assert_eq!(count_white(&out), 400);
    }

    // ── blend math ────────────────────────────────────────────────────────
    #[test]
    fn global_alpha_mixes_linearly() {
        let bg = RgbImage::from_pixel(10, 10, BLACK);
        let out = composite(&bg, &white_square(10), (0, 0), 1.0, 0.5);
        // 255 * 0.5 = 127.5, rounded
        assert_eq!(out.get_pixel(3, 3), &Rgb([128, 128, 128]));
    }

    #[test]
    fn icon_alpha_channel_multiplies_global_alpha() {
        let mut layer = RgbaImage::from_pixel(10, 10, Rgba([200, 100, 0, 255]));
        layer.put_pixel(0, 0, Rgba([200, 100, 0, 0]));
        layer.put_pixel(1, 0, Rgba([200, 100, 0, 51])); // 0.2
        let icon = Icon::from_rgba(layer);
        let bg = RgbImage::from_pixel(10, 10, Rgb([100, 100, 100]));
        let out = composite(&bg, &icon, (0, 0), 1.0, 0.5);

        assert_eq!(out.get_pixel(0, 0), &Rgb([100, 100, 100]));
        // a = 0.2 * 0.5 = 0.1 -> 100*0.9 + 200*0.1 = 110
        assert_eq!(out.get_pixel(1, 0).0[0], 110);
        // a = 0.5 -> 100*0.5 + 200*0.5 = 150, 100 stays, 100*0.5 = 50
        assert_eq!(out.get_pixel(5, 5), &Rgb([150, 100, 50]));
    }

    #[test]
    fn scale_is_applied_before_placement() {
        let bg = RgbImage::from_pixel(100, 100, BLACK);
        let out = composite(&bg, &white_square(20), (0, 0), 2.0, 1.0);
        assert_eq!(count_white(&out), 40 * 40);
    }

    #[test]
    fn placement_center_round_trips() {
        let p = Placement::centered_at((50, 40), 31, 20);
        assert_eq!((p.x, p.y), (35, 30));
        assert_eq!(p.center(), (50, 40));
    }
}
