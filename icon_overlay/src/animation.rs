//! Time-based entrance animation: an eased grow from `min_scale` to
//! `max_scale` over `duration` of wall-clock time, with opacity fading
//! from `start_alpha` to `alpha` along the same curve.

use std::time::{Duration, Instant};

// ════════════════════════════════════════════════════════════════════════════
// Limits
// ════════════════════════════════════════════════════════════════════════════

const SCALE_FLOOR:    f32      = 0.01;
const SCALE_CEIL:     f32      = 10.0;
const DURATION_FLOOR: Duration = Duration::from_millis(100);

/// Symmetric ease-in-out: `2t²` below one half, `-1 + (4 - 2t)t` above.
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AnimationConfig / AnimationState
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationConfig {
    pub min_scale: f32,
    pub max_scale: f32,
    pub duration:  Duration,
    /// Global opacity applied on top of the icon's own alpha channel,
    /// reached when the animation completes.
    pub alpha:       f32,
    /// Opacity on the first frame. Equal to `alpha` for no fade.
    pub start_alpha: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        AnimationConfig {
            min_scale: 0.1,
            max_scale: 2.0,
            duration:    Duration::from_secs(1),
            alpha:       1.0,
            start_alpha: 0.0,
        }
    }
}

impl AnimationConfig {
    /// Grow to `max_scale` while fading in from transparent to `alpha`.
    pub fn new(max_scale: f32, alpha: f32, duration_secs: f32) -> Self {
        AnimationConfig {
            max_scale,
            alpha,
            duration: Duration::try_from_secs_f32(duration_secs).unwrap_or(DURATION_FLOOR),
            ..AnimationConfig::default()
        }
    }
}

/// Snapshot of one element's animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationState {
    pub start:         Option<Instant>,
    pub current_scale: f32,
    pub current_alpha: f32,
    pub complete:      bool,
}

// ════════════════════════════════════════════════════════════════════════════
// Animator
// ════════════════════════════════════════════════════════════════════════════

/// One per visual element. Latches its start time on the first `advance`
/// after construction or `reset`; once complete it ignores time entirely.
#[derive(Clone, Debug)]
pub struct Animator {
    min_scale:   f32,
    max_scale:   f32,
    duration:    Duration,
    start_alpha: f32,
    alpha:       f32,
    state:       AnimationState,
}

impl Animator {
    pub fn new(cfg: AnimationConfig) -> Self {
        let mut a = Animator {
            min_scale:   SCALE_FLOOR,
            max_scale:   SCALE_FLOOR,
            duration:    DURATION_FLOOR,
            start_alpha: 1.0,
            alpha:       1.0,
            state: AnimationState {
                start:         None,
                current_scale: SCALE_FLOOR,
                current_alpha: 1.0,
                complete:      false,
            },
        };
        a.set_scale_range(cfg.min_scale, cfg.max_scale);
        a.set_duration(cfg.duration);
        a.set_alpha_range(cfg.start_alpha, cfg.alpha);
        a.state.current_scale = a.min_scale;
        a.state.current_alpha = a.start_alpha;
        a
    }

    /// Scale for `now`; the matching opacity is in [`Animator::alpha`].
    pub fn advance(&mut self, now: Instant) -> f32 {
        if self.state.complete {
            return self.max_scale;
        }
        let start = *self.state.start.get_or_insert(now);
        let elapsed = now.saturating_duration_since(start).as_secs_f32();
        let progress = (elapsed / self.duration.as_secs_f32()).clamp(0.0, 1.0);

        if progress >= 1.0 {
            self.state.complete = true;
            self.state.current_scale = self.max_scale;
            self.state.current_alpha = self.alpha;
        } else {
            let eased = ease_in_out(progress);
            self.state.current_scale = self.min_scale + (self.max_scale - self.min_scale) * eased;
            self.state.current_alpha = self.start_alpha + (self.alpha - self.start_alpha) * eased;
        }
        self.state.current_scale
    }

    /// Back to the un-started, smallest, faintest state. Call whenever the
    /// owning element is hidden.
    pub fn reset(&mut self) {
        self.state = AnimationState {
            start:         None,
            current_scale: self.min_scale,
            current_alpha: self.start_alpha,
            complete:      false,
        };
    }

    pub fn state(&self) -> AnimationState { self.state }
    pub fn is_complete(&self) -> bool { self.state.complete }
    pub fn min_scale(&self) -> f32 { self.min_scale }
    pub fn max_scale(&self) -> f32 { self.max_scale }
    /// Opacity as of the last `advance`.
    pub fn alpha(&self) -> f32 { self.state.current_alpha }
    pub fn start_alpha(&self) -> f32 { self.start_alpha }
    pub fn target_alpha(&self) -> f32 { self.alpha }
    pub fn duration(&self) -> Duration { self.duration }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration.max(DURATION_FLOOR);
    }

    /// Clamped to `[0.01, 10]` with `max >= min`. Re-arms a finished
    /// animation so the new range is actually played.
    pub fn set_scale_range(&mut self, min_scale: f32, max_scale: f32) {
        let min = if min_scale.is_finite() { min_scale.clamp(SCALE_FLOOR, SCALE_CEIL) } else { SCALE_FLOOR };
        let max = if max_scale.is_finite() { max_scale.clamp(SCALE_FLOOR, SCALE_CEIL) } else { SCALE_CEIL };
        self.min_scale = min;
        self.max_scale = max.max(min);
        self.state.complete = false;
    }

    /// Both ends clamped to `[0, 1]`. Re-arms a finished animation.
    pub fn set_alpha_range(&mut self, start_alpha: f32, alpha: f32) {
        let unit = |v: f32, fallback: f32| if v.is_nan() { fallback } else { v.clamp(0.0, 1.0) };
        self.alpha = unit(alpha, 1.0);
        self.start_alpha = unit(start_alpha, self.alpha);
        self.state.complete = false;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
