//! An icon paired with its entrance animation.

use std::time::Instant;

use image::{RgbImage, RgbaImage};

use crate::animation::{AnimationConfig, Animator};
use crate::compositor::{Placement, blend_onto};
use crate::icon::Icon;

/// One animated on-screen element (menu ball, menu panel, option icon).
///
/// Keeps the last resized image around; during the grow-in it changes every
/// frame, afterwards it is reused as-is.
#[derive(Clone, Debug)]
pub struct Sprite {
    icon:     Icon,
    animator: Animator,
    cache:    Option<RgbaImage>,
}

impl Sprite {
    pub fn new(icon: Icon, cfg: AnimationConfig) -> Self {
        Sprite { icon, animator: Animator::new(cfg), cache: None }
    }

    pub fn icon(&self) -> &Icon { &self.icon }
    pub fn animator(&self) -> &Animator { &self.animator }

    /// Hide: rewind the animation so the next appearance grows in again.
    pub fn reset(&mut self) { self.animator.reset(); }

    /// Where the sprite would land for `center` at its current scale,
    /// without drawing or advancing time.
    pub fn placement(&self, center: (i32, i32)) -> Placement {
        let (w, h) = self.icon.scaled_size(self.animator.state().current_scale);
        Placement::centered_at(center, w, h)
    }

    /// Advance the animation to `now`, then draw centered on `center` at
    /// the animation's current scale and opacity.
    pub fn draw_centered(&mut self, frame: &mut RgbImage, center: (i32, i32), now: Instant) -> Placement {
        let scale = self.animator.advance(now);
        let (w, h) = self.icon.scaled_size(scale);
        let placement = Placement::centered_at(center, w, h);

        let stale = self.cache.as_ref().map_or(true, |c| c.dimensions() != (w, h));
        if stale {
            self.cache = Some(self.icon.resized(w, h).into_owned());
        }
        if let Some(layer) = &self.cache {
            blend_onto(frame, layer, self.icon.has_alpha(), (placement.x, placement.y), self.animator.alpha());
        }
        placement
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba};
    use std::time::Duration;

    fn sprite() -> Sprite {
        let icon = Icon::from_rgba(RgbaImage::from_pixel(100, 100, Rgba([255, 0, 0, 255])));
        Sprite::new(icon, AnimationConfig {
            min_scale:   0.1,
            max_scale:   0.5,
            duration:    Duration::from_millis(200),
            alpha:       1.0,
            start_alpha: 0.0,
        })
    }

    #[test]
    fn grows_from_min_to_max_size() {
        let mut s = sprite();
        let mut frame = RgbImage::new(200, 200);
        let t0 = Instant::now();
        let p0 = s.draw_centered(&mut frame, (100, 100), t0);
        assert_eq!((p0.width, p0.height), (10, 10));
        let p1 = s.draw_centered(&mut frame, (100, 100), t0 + Duration::from_millis(500));
        assert_eq!((p1.width, p1.height), (50, 50));
        assert_eq!(p1.center(), (100, 100));
        assert_eq!(frame.get_pixel(100, 100), &Rgb([255, 0, 0]));
        assert_eq!(frame.get_pixel(10, 10), &Rgb([0, 0, 0]));
    }

    #[test]
    fn fades_in_while_growing() {
        let mut s = sprite();
        let t0 = Instant::now();
        let mut frame = RgbImage::new(200, 200);
        s.draw_centered(&mut frame, (100, 100), t0);
        assert_eq!(frame.get_pixel(100, 100), &Rgb([0, 0, 0]));

        // halfway: alpha 0.5 over black
        let mut frame = RgbImage::new(200, 200);
        s.draw_centered(&mut frame, (100, 100), t0 + Duration::from_millis(100));
        let r = frame.get_pixel(100, 100)[0];
        assert!((127..=128).contains(&r), "{}", r);

        s.reset();
        assert_eq!(s.animator().alpha(), 0.0);
    }

    #[test]
    fn reset_shrinks_back() {
        let mut s = sprite();
        let mut frame = RgbImage::new(200, 200);
        let t0 = Instant::now();
        s.draw_centered(&mut frame, (50, 50), t0);
        s.draw_centered(&mut frame, (50, 50), t0 + Duration::from_secs(1));
        assert!(s.animator().is_complete());
        s.reset();
        assert_eq!(s.placement((50, 50)).width, 10);
    }

    #[test]
    fn off_frame_draw_leaves_frame_alone() {
        let mut s = sprite();
        let mut frame = RgbImage::from_pixel(40, 40, Rgb([1, 1, 1]));
        let before = frame.clone();
        s.draw_centered(&mut frame, (-200, -200), Instant::now());
        assert_eq!(frame, before);
    }
}
