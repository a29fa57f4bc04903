//! Pinch and palm-orientation tests, and the edge detector that turns them
//! into discrete events.
//!
//! # Algorithm
//!
//! * **Pinch**: thumb-tip to index-tip distance at most `max_ratio` of the
//!   hand's own bounding-box width, so the threshold follows the hand as it
//!   moves toward or away from the camera.
//! * **Front**: the index and pinky knuckles must span at least
//!   `min_span_ratio` of the box height (an edge-on hand fails), and their
//!   left/right order must match the handedness label.
//! * **Edges**: the detector remembers last frame's pinch. A rising edge
//!   bumps the repeat counter, which is how the menu tells the first tap
//!   from the second. There is no time window.

use tracing::{debug, trace};

use crate::features::{BoundingBox, bounding_box, distance, midpoint};
use crate::keypoint::{Handedness, KeypointSet, Point, INDEX_MCP, INDEX_TIP, PINKY_MCP, THUMB_TIP};

// ════════════════════════════════════════════════════════════════════════════
// Configuration
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchConfig {
    pub finger_a:  usize,
    pub finger_b:  usize,
    /// Pinch threshold as a fraction of bounding-box width.
    pub max_ratio: f32,
}

impl Default for PinchConfig {
    fn default() -> Self {
        PinchConfig { finger_a: THUMB_TIP, finger_b: INDEX_TIP, max_ratio: 0.16 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientationConfig {
    /// Minimum knuckle span as a fraction of bounding-box height.
    pub min_span_ratio: f32,
}

impl Default for OrientationConfig {
    fn default() -> Self { OrientationConfig { min_span_ratio: 0.2 } }
}

// ════════════════════════════════════════════════════════════════════════════
// Per-frame tests
// ════════════════════════════════════════════════════════════════════════════

pub fn is_pinch(hand: &KeypointSet, bbox: &BoundingBox, cfg: &PinchConfig) -> bool {
    let d = distance(hand.point(cfg.finger_a), hand.point(cfg.finger_b));
    d <= bbox.width() as f32 * cfg.max_ratio
}

pub fn is_front(hand: &KeypointSet, bbox: &BoundingBox, cfg: &OrientationConfig) -> bool {
    let index = hand.point(INDEX_MCP);
    let pinky = hand.point(PINKY_MCP);

    if distance(index, pinky) < bbox.height() as f32 * cfg.min_span_ratio {
        return false;
    }
    match hand.handedness {
        Handedness::Left  => index.x >= pinky.x && pinky.y >= index.y,
        Handedness::Right => pinky.x >= index.x && index.y >= pinky.y,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureSignal
// ════════════════════════════════════════════════════════════════════════════

/// Everything downstream needs to know about the tracked hand this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GestureSignal {
    pub is_front:            bool,
    pub is_pinch:            bool,
    pub pinch_just_started:  bool,
    pub pinch_just_released: bool,
    pub pinch_repeat_count:  u32,
    /// Distance between the two pinch fingers; `None` with no hand.
    pub pinch_distance:      Option<f32>,
    /// Midpoint of the two pinch fingers; `None` with no hand.
    pub finger_center:       Option<Point>,
    pub bbox:                Option<BoundingBox>,
}

impl GestureSignal {
    pub fn hand_present(&self) -> bool { self.bbox.is_some() }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureDetector
// ════════════════════════════════════════════════════════════════════════════

/// Stateful edge detector. Its only memory is last frame's pinch/front
/// state and the repeat counter.
#[derive(Clone, Debug, Default)]
pub struct GestureDetector {
    pinch:        PinchConfig,
    orientation:  OrientationConfig,
    prev_pinch:   bool,
    prev_front:   bool,
    repeat_count: u32,
}

impl GestureDetector {
    pub fn new(pinch: PinchConfig, orientation: OrientationConfig) -> Self {
        GestureDetector { pinch, orientation, ..Default::default() }
    }

    pub fn repeat_count(&self) -> u32 { self.repeat_count }

    /// Zero the tap counter. Edge memory is kept so a pinch held across the
    /// reset does not fire a fresh rising edge.
    pub fn reset_repeats(&mut self) { self.repeat_count = 0; }

    /// Process one frame. `None` (no hand) reads as not front, not pinching.
    pub fn update(&mut self, hand: Option<&KeypointSet>) -> GestureSignal {
        let mut signal = GestureSignal::default();

        if let Some(h) = hand {
            let bbox = bounding_box(h);
            let a = h.point(self.pinch.finger_a);
            let b = h.point(self.pinch.finger_b);
            signal.is_front       = is_front(h, &bbox, &self.orientation);
            signal.is_pinch       = is_pinch(h, &bbox, &self.pinch);
            signal.pinch_distance = Some(distance(a, b));
            signal.finger_center  = Some(midpoint(a, b));
            signal.bbox           = Some(bbox);
        }

        signal.pinch_just_started  = signal.is_pinch && !self.prev_pinch;
        signal.pinch_just_released = !signal.is_pinch && self.prev_pinch;

        if signal.pinch_just_started {
            self.repeat_count += 1;
            debug!(count = self.repeat_count, "pinch started");
        } else if signal.pinch_just_released {
            debug!(count = self.repeat_count, "pinch released");
        }
        if signal.is_front != self.prev_front {
            debug!(front = signal.is_front, "palm orientation changed");
        }
        trace!(?signal, "gesture signal");

        self.prev_pinch = signal.is_pinch;
        self.prev_front = signal.is_front;
        signal.pinch_repeat_count = self.repeat_count;
        signal
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypoint::{LANDMARK_COUNT, MIDDLE_TIP, WRIST};

    /// A hand roughly 110 px wide and 200 px tall.
    fn hand(handedness: Handedness, front: bool, pinch: bool) -> KeypointSet {
        let mut pts = [Point::new(210, 300); LANDMARK_COUNT];
        pts[WRIST]      = Point::new(210, 400);
        pts[MIDDLE_TIP] = Point::new(210, 200);
        pts[THUMB_TIP]  = Point::new(150, 260);
        pts[INDEX_TIP]  = if pinch { Point::new(158, 262) } else { Point::new(240, 220) };

        let (index_mcp, pinky_mcp) = match (handedness, front) {
            (Handedness::Left, true)  | (Handedness::Right, false) =>
                (Point::new(260, 300), Point::new(160, 320)),
            (Handedness::Right, true) | (Handedness::Left, false)  =>
                (Point::new(160, 320), Point::new(260, 300)),
        };
        pts[INDEX_MCP] = index_mcp;
        pts[PINKY_MCP] = pinky_mcp;
        KeypointSet::from_pixels(pts, handedness, 0.9)
    }

    // ── per-frame tests ───────────────────────────────────────────────────
    #[test]
    fn pinch_threshold_scales_with_box() {
        let h = hand(Handedness::Left, true, true);
        let b = bounding_box(&h);
        assert!(is_pinch(&h, &b, &PinchConfig::default()));
        let open = hand(Handedness::Left, true, false);
        assert!(!is_pinch(&open, &bounding_box(&open), &PinchConfig::default()));
    }

    #[test]
    fn front_respects_handedness() {
        for side in [Handedness::Left, Handedness::Right] {
            let f = hand(side, true, false);
            let r = hand(side, false, false);
            let cfg = OrientationConfig::default();
            assert!(is_front(&f, &bounding_box(&f), &cfg), "{:?} front", side);
            assert!(!is_front(&r, &bounding_box(&r), &cfg), "{:?} back", side);
        }
    }

    #[test]
    fn edge_on_hand_is_not_front() {
        let mut h = hand(Handedness::Left, true, false);
        let mut pts = *h.points();
        pts[INDEX_MCP] = Point::new(212, 300);
        pts[PINKY_MCP] = Point::new(210, 305);
        h = KeypointSet::from_pixels(pts, Handedness::Left, 0.9);
        assert!(!is_front(&h, &bounding_box(&h), &OrientationConfig::default()));
    }

    // ── edge detection ────────────────────────────────────────────────────
    #[test]
    fn single_pinch_yields_one_start_and_one_release() {
        let mut det = GestureDetector::default();
        let raw = [false, false, true, true, false];
        let mut starts = Vec::new();
        let mut releases = Vec::new();
        let mut last = GestureSignal::default();
        for (i, &p) in raw.iter().enumerate() {
            let h = hand(Handedness::Left, true, p);
            last = det.update(Some(&h));
            if last.pinch_just_started  { starts.push(i); }
            if last.pinch_just_released { releases.push(i); }
        }
        assert_eq!(starts, vec![2]);
        assert_eq!(releases, vec![4]);
        assert_eq!(last.pinch_repeat_count, 1);
    }

    #[test]
    fn repeat_counter_counts_taps() {
        let mut det = GestureDetector::default();
        for &p in &[true, false, true, false, true] {
            det.update(Some(&hand(Handedness::Left, true, p)));
        }
        assert_eq!(det.repeat_count(), 3);
        det.reset_repeats();
        assert_eq!(det.repeat_count(), 0);
    }

    #[test]
    fn held_pinch_across_reset_does_not_refire() {
        let mut det = GestureDetector::default();
        det.update(Some(&hand(Handedness::Left, true, true)));
        det.reset_repeats();
        let s = det.update(Some(&hand(Handedness::Left, true, true)));
        assert!(!s.pinch_just_started);
        assert_eq!(s.pinch_repeat_count, 0);
    }

    #[test]
    fn losing_the_hand_reads_as_back_and_release() {
        let mut det = GestureDetector::default();
        det.update(Some(&hand(Handedness::Left, true, true)));
        let s = det.update(None);
        assert!(!s.is_front);
        assert!(!s.is_pinch);
        assert!(s.pinch_just_released);
        assert!(!s.hand_present());
        assert_eq!(s.finger_center, None);
    }

    #[test]
    fn signal_carries_finger_geometry() {
        let mut det = GestureDetector::default();
        let s = det.update(Some(&hand(Handedness::Left, true, false)));
        // thumb (150,260), index (240,220)
        assert_eq!(s.finger_center, Some(Point::new(195, 240)));
        let d = s.pinch_distance.unwrap();
        assert!((d - (90.0f32 * 90.0 + 40.0 * 40.0).sqrt()).abs() < 1e-3);
    }
}
