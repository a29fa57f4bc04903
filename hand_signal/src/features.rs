//! Pure geometric features over one frame's keypoints.

use crate::error::SignalError;
use crate::keypoint::{INDEX_MCP, KeypointSet, PINKY_MCP, Point};

// ════════════════════════════════════════════════════════════════════════════
// BoundingBox
// ════════════════════════════════════════════════════════════════════════════

/// Axis-aligned pixel box around a hand. `x_min <= x_max`, `y_min <= y_max`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoundingBox {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl BoundingBox {
    pub fn width(&self)  -> i32 { self.x_max - self.x_min }
    pub fn height(&self) -> i32 { self.y_max - self.y_min }

    /// Middle of the top edge, where menu anchors hang above the hand.
    pub fn top_center(&self) -> Point {
        Point::new((self.x_min + self.x_max).div_euclid(2), self.y_min)
    }
}

/// Min/max over all 21 landmarks.
pub fn bounding_box(hand: &KeypointSet) -> BoundingBox {
    let first = hand.point(0);
    hand.points().iter().fold(
        BoundingBox { x_min: first.x, y_min: first.y, x_max: first.x, y_max: first.y },
        |b, p| BoundingBox {
            x_min: b.x_min.min(p.x),
            y_min: b.y_min.min(p.y),
            x_max: b.x_max.max(p.x),
            y_max: b.y_max.max(p.y),
        },
    )
}

// ════════════════════════════════════════════════════════════════════════════
// Distances
// ════════════════════════════════════════════════════════════════════════════

/// Euclidean distance in pixels.
pub fn distance(a: Point, b: Point) -> f32 {
    let dx = (a.x - b.x) as f32;
    let dy = (a.y - b.y) as f32;
    (dx * dx + dy * dy).sqrt()
}

/// Integer midpoint (floor division, matching pixel indexing).
pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x).div_euclid(2), (a.y + b.y).div_euclid(2))
}

// ════════════════════════════════════════════════════════════════════════════
// RangeMap — exponential range mapping
// ════════════════════════════════════════════════════════════════════════════

/// Clamp → normalize → raise to `exponent` → rescale.
///
/// An exponent above 1 flattens the response near the low end of the input
/// range and steepens it near the high end; below 1 does the reverse.
/// A degenerate input range is rejected here, never per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangeMap {
    input:    (f32, f32),
    output:   (f32, f32),
    exponent: f32,
}

impl RangeMap {
    pub fn new(input: (f32, f32), output: (f32, f32), exponent: f32) -> Result<Self, SignalError> {
        for &(a, b) in &[input, output] {
            if !a.is_finite() || !b.is_finite() {
                return Err(SignalError::NonFiniteRange(a, b));
            }
        }
        if input.0 == input.1 {
            return Err(SignalError::DegenerateRange(input.0));
        }
        if !exponent.is_finite() || exponent <= 0.0 {
            return Err(SignalError::InvalidExponent(exponent));
        }
        Ok(RangeMap { input, output, exponent })
    }

    /// Same ranges, different curve.
    pub fn with_exponent(&self, exponent: f32) -> Result<Self, SignalError> {
        RangeMap::new(self.input, self.output, exponent)
    }

    pub fn input(&self)    -> (f32, f32) { self.input }
    pub fn output(&self)   -> (f32, f32) { self.output }
    pub fn exponent(&self) -> f32        { self.exponent }

    pub fn map(&self, value: f32) -> f32 {
        let (i0, i1) = self.input;
        let (o0, o1) = self.output;
        let (lo, hi) = if i0 < i1 { (i0, i1) } else { (i1, i0) };
        let v = if value.is_nan() { i0 } else { value.clamp(lo, hi) };
        let normalized = (v - i0) / (i1 - i0);
        o0 + normalized.powf(self.exponent) * (o1 - o0)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DepthGauge — distance from the camera, from apparent hand size
// ════════════════════════════════════════════════════════════════════════════

/// Which apparent size stands in for depth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DepthCue {
    /// Index-to-pinky knuckle span. Barely changes as fingers open and close.
    #[default]
    KnuckleSpan,
    /// Bounding-box width. Grows with spread fingers.
    BoxWidth,
}

/// Rough camera distance on a 0–100 scale: 0 is a hand filling the frame
/// height, 100 a hand too small to measure.
///
/// The apparent size is mapped over `[0, frame_h]` with a low exponent so
/// the scale stays usable at arm's length, then inverted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthGauge {
    cue: DepthCue,
    map: RangeMap,
}

impl DepthGauge {
    pub const DEFAULT_EXPONENT: f32 = 0.17;

    pub fn new(frame_h: u32, cue: DepthCue, exponent: f32) -> Result<Self, SignalError> {
        let map = RangeMap::new((0.0, frame_h as f32), (0.0, 100.0), exponent)?;
        Ok(DepthGauge { cue, map })
    }

    pub fn cue(&self) -> DepthCue { self.cue }

    pub fn measure(&self, hand: &KeypointSet, bbox: &BoundingBox) -> i32 {
        let size = match self.cue {
            DepthCue::KnuckleSpan => distance(hand.point(INDEX_MCP), hand.point(PINKY_MCP)).trunc(),
            DepthCue::BoxWidth    => bbox.width() as f32,
        };
        100 - self.map.map(size) as i32
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypoint::{Handedness, INDEX_MCP, LANDMARK_COUNT, PINKY_MCP};
    use proptest::prelude::*;

    fn hand_from(xs: &[(i32, i32)]) -> KeypointSet {
        let mut pts = [Point::new(50, 50); LANDMARK_COUNT];
        for (slot, &(x, y)) in pts.iter_mut().zip(xs) {
            *slot = Point::new(x, y);
        }
        KeypointSet::from_pixels(pts, Handedness::Left, 1.0)
    }

    // ── bounding box ──────────────────────────────────────────────────────
    #[test]
    fn bbox_spans_all_points() {
        let hand = hand_from(&[(10, 80), (120, 40), (60, 200)]);
        let b = bounding_box(&hand);
        assert_eq!(b, BoundingBox { x_min: 10, y_min: 40, x_max: 120, y_max: 200 });
        assert_eq!(b.width(), 110);
        assert_eq!(b.height(), 160);
        assert_eq!(b.top_center(), Point::new(65, 40));
    }

    #[test]
    fn bbox_of_single_location_is_empty() {
        let b = bounding_box(&hand_from(&[]));
        assert_eq!(b.width(), 0);
        assert_eq!(b.height(), 0);
    }

    // ── distances ─────────────────────────────────────────────────────────
    #[test]
    fn distance_is_euclidean() {
        assert_eq!(distance(Point::new(0, 0), Point::new(3, 4)), 5.0);
        assert_eq!(distance(Point::new(7, 7), Point::new(7, 7)), 0.0);
    }

    #[test]
    fn midpoint_floors() {
        assert_eq!(midpoint(Point::new(0, 0), Point::new(5, 3)), Point::new(2, 1));
        assert_eq!(midpoint(Point::new(-5, 0), Point::new(0, 0)), Point::new(-3, 0));
    }

    // ── range map construction ────────────────────────────────────────────
    #[test]
    fn degenerate_input_range_rejected() {
        assert_eq!(
            RangeMap::new((40.0, 40.0), (0.0, 100.0), 1.0),
            Err(SignalError::DegenerateRange(40.0)),
        );
    }

    #[test]
    fn bad_exponent_rejected() {
        assert!(RangeMap::new((0.0, 1.0), (0.0, 1.0), 0.0).is_err());
        assert!(RangeMap::new((0.0, 1.0), (0.0, 1.0), -2.0).is_err());
        assert!(RangeMap::new((0.0, 1.0), (0.0, 1.0), f32::NAN).is_err());
    }

    #[test]
    fn non_finite_range_rejected() {
        assert!(RangeMap::new((0.0, f32::INFINITY), (0.0, 1.0), 1.0).is_err());
    }

    // ── range map behavior ────────────────────────────────────────────────
    #[test]
    fn linear_midpoint_maps_to_midpoint() {
        let m = RangeMap::new((40.0, 300.0), (0.0, 100.0), 1.0).unwrap();
        assert!((m.map(170.0) - 50.0).abs() < 1e-4);
    }

    #[test]
    fn low_exponent_lifts_low_end() {
        let display = RangeMap::new((40.0, 300.0), (0.0, 100.0), 1.0).unwrap();
        let control = display.with_exponent(0.17).unwrap();
        assert!(control.map(80.0) > display.map(80.0));
        assert_eq!(control.map(40.0), 0.0);
        assert!((control.map(300.0) - 100.0).abs() < 1e-4);
    }

    #[test]
    fn reversed_input_range_still_clamps() {
        let m = RangeMap::new((300.0, 40.0), (0.0, 100.0), 1.0).unwrap();
        assert_eq!(m.map(500.0), 0.0);
        assert_eq!(m.map(0.0), 100.0);
    }

    #[test]
    fn nan_value_maps_to_input_start() {
        let m = RangeMap::new((40.0, 300.0), (-65.25, 0.0), 0.17).unwrap();
        assert_eq!(m.map(f32::NAN), -65.25);
    }

    // ── depth gauge ───────────────────────────────────────────────────────
    fn knuckles(index: (i32, i32), pinky: (i32, i32), wrist: (i32, i32)) -> KeypointSet {
        let mut pts = [Point::new(100, 50); LANDMARK_COUNT];
        pts[0]         = Point::new(wrist.0, wrist.1);
        pts[INDEX_MCP] = Point::new(index.0, index.1);
        pts[PINKY_MCP] = Point::new(pinky.0, pinky.1);
        KeypointSet::from_pixels(pts, Handedness::Left, 1.0)
    }

    #[test]
    fn depth_from_knuckle_span_and_box_width() {
        // span 100, box width 200, frame 400 high
        let hand = knuckles((150, 50), (50, 50), (-50, 60));
        let bbox = bounding_box(&hand);
        let span = DepthGauge::new(400, DepthCue::KnuckleSpan, 1.0).unwrap();
        let width = DepthGauge::new(400, DepthCue::BoxWidth, 1.0).unwrap();
        assert_eq!(span.measure(&hand, &bbox), 75);
        assert_eq!(width.measure(&hand, &bbox), 50);
    }

    #[test]
    fn closer_hand_reads_smaller_depth() {
        let gauge = DepthGauge::new(480, DepthCue::default(), DepthGauge::DEFAULT_EXPONENT).unwrap();
        let far = knuckles((120, 50), (100, 50), (100, 60));
        let near = knuckles((300, 50), (100, 50), (100, 60));
        let d_far = gauge.measure(&far, &bounding_box(&far));
        let d_near = gauge.measure(&near, &bounding_box(&near));
        assert!(d_near < d_far, "{} vs {}", d_near, d_far);
        assert!((0..=100).contains(&d_far));
    }

    #[test]
    fn hand_larger_than_frame_clamps_to_zero() {
        let gauge = DepthGauge::new(100, DepthCue::KnuckleSpan, 0.17).unwrap();
        let hand = knuckles((400, 50), (0, 50), (0, 60));
        assert_eq!(gauge.measure(&hand, &bounding_box(&hand)), 0);
    }

    #[test]
    fn zero_height_frame_rejected() {
        assert_eq!(
            DepthGauge::new(0, DepthCue::BoxWidth, 0.17),
            Err(SignalError::DegenerateRange(0.0)),
        );
    }

    proptest! {
        #[test]
        fn below_range_equals_lower_bound(v in -1000.0f32..40.0, e in 0.05f32..5.0) {
            let m = RangeMap::new((40.0, 300.0), (0.0, 100.0), e).unwrap();
            prop_assert_eq!(m.map(v), m.map(40.0));
        }

        #[test]
        fn above_range_equals_upper_bound(v in 300.0f32..5000.0, e in 0.05f32..5.0) {
            let m = RangeMap::new((40.0, 300.0), (-65.0, 0.0), e).unwrap();
            prop_assert_eq!(m.map(v), m.map(300.0));
        }

        #[test]
        fn exponent_one_is_linear(
            a in -500.0f32..500.0,
            span in 1.0f32..500.0,
            o0 in -100.0f32..100.0,
            o1 in -100.0f32..100.0,
            t in 0.0f32..=1.0,
        ) {
            let m = RangeMap::new((a, a + span), (o0, o1), 1.0).unwrap();
            let expected = o0 + t * (o1 - o0);
            prop_assert!((m.map(a + t * span) - expected).abs() < 0.05);
        }

        #[test]
        fn output_stays_within_output_range(v in -1e4f32..1e4, e in 0.05f32..5.0) {
            let m = RangeMap::new((40.0, 300.0), (0.0, 100.0), e).unwrap();
            let out = m.map(v);
            prop_assert!((0.0..=100.0).contains(&out));
        }
    }
}
