//! Exponential moving average for on-screen anchors.

use crate::keypoint::Point;

/// One EMA step: `prior * (1 - alpha) + raw * alpha` per axis, computed as
/// `prior + (raw - prior) * alpha` so a steady input stays exactly put.
///
/// With no prior the raw sample is returned unchanged, so smoothing starts
/// on the second sample.
pub fn ema(raw: (f32, f32), alpha: f32, prior: Option<(f32, f32)>) -> (f32, f32) {
    let (px, py) = prior.unwrap_or(raw);
    (px + (raw.0 - px) * alpha, py + (raw.1 - py) * alpha)
}

/// A smoothed position owned by one UI anchor.
///
/// Keeps full float precision internally and hands out whole pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct SmoothedPoint {
    alpha: f32,
    state: Option<(f32, f32)>,
}

impl SmoothedPoint {
    /// `alpha` is clamped to `[0, 1]`; smaller is smoother.
    pub fn new(alpha: f32) -> Self {
        let alpha = if alpha.is_nan() { 1.0 } else { alpha.clamp(0.0, 1.0) };
        SmoothedPoint { alpha, state: None }
    }

    pub fn alpha(&self) -> f32 { self.alpha }

    /// Float state, `None` until the first sample.
    pub fn value(&self) -> Option<(f32, f32)> { self.state }

    pub fn is_initialized(&self) -> bool { self.state.is_some() }

    /// Feed one raw sample; returns the smoothed point truncated to pixels.
    pub fn update(&mut self, raw: Point) -> Point {
        let next = ema((raw.x as f32, raw.y as f32), self.alpha, self.state);
        self.state = Some(next);
        Point::new(next.0 as i32, next.1 as i32)
    }

    /// Forget history; the next sample seeds the filter again.
    pub fn reset(&mut self) { self.state = None; }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
