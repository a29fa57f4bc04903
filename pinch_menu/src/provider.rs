//! Hand landmarks: from LeapMotion hardware or a mouse-driven simulation.
//!
//! Both sides deliver [`DetectedHand`]s (21 normalized landmarks in the
//! standard wrist / thumb / index / middle / ring / pinky order) through the
//! [`LandmarkProvider`] trait, one synchronous call per frame. Consumers
//! don't need to know where the landmarks came from.

use image::RgbImage;
use tracing::warn;

use hand_signal::{
    Handedness, KeypointSet, LANDMARK_COUNT, INDEX_DIP, INDEX_MCP, INDEX_PIP, INDEX_TIP, MIDDLE_DIP,
    MIDDLE_MCP, MIDDLE_PIP, MIDDLE_TIP, PINKY_DIP, PINKY_MCP, PINKY_PIP, PINKY_TIP, RING_DIP,
    RING_MCP, RING_PIP, RING_TIP, THUMB_CMC, THUMB_IP, THUMB_MCP, THUMB_TIP, WRIST,
};

// ════════════════════════════════════════════════════════════════════════════
// DetectedHand
// ════════════════════════════════════════════════════════════════════════════

/// One hand as a landmark model reports it.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectedHand {
    /// Normalized `[0, 1]` positions, `x` to the right, `y` down.
    pub landmarks:  Vec<(f32, f32)>,
    pub handedness: Handedness,
    pub confidence: f32,
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkProvider trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can find hands in a frame.
pub trait LandmarkProvider {
    fn detect(&mut self, frame: &RgbImage) -> Vec<DetectedHand>;
}

/// Convert one frame's detections to pixel keypoints. Hands with the wrong
/// landmark count are dropped with a warning.
pub fn to_keypoints(detections: &[DetectedHand], frame_w: u32, frame_h: u32) -> Vec<KeypointSet> {
    detections
        .iter()
        .filter_map(|d| {
            match KeypointSet::from_normalized(&d.landmarks, frame_w, frame_h, d.handedness, d.confidence) {
                Ok(k)  => Some(k),
                Err(e) => {
                    warn!(hand = d.handedness.name(), error = %e, "dropping malformed detection");
                    None
                }
            }
        })
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════
// SimulatedHand — mouse/keyboard simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input state from the simulation window, sampled once per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimInput {
    /// Mouse position in frame pixels; `None` when outside the window.
    pub cursor:  Option<(f32, f32)>,
    /// Thumb and index touching.
    pub pinch:   bool,
    /// How far apart the open fingers are, `0.0`–`1.0`.
    pub spread:  f32,
    /// Back of the hand toward the camera.
    pub flipped: bool,
    /// Hand out of view.
    pub hidden:  bool,
}

impl Default for SimInput {
    fn default() -> Self {
        SimInput { cursor: None, pinch: false, spread: 0.3, flipped: false, hidden: false }
    }
}

// Left hand, palm toward the camera, in px relative to the wrist (y up is
// negative). Thumb and index tips are computed from the input.
const POSE: [(f32, f32); LANDMARK_COUNT] = {
    let mut p = [(0.0, 0.0); LANDMARK_COUNT];
    p[WRIST]      = (0.0, 0.0);
    p[THUMB_CMC]  = (30.0, -15.0);
    p[THUMB_MCP]  = (50.0, -40.0);
    p[THUMB_IP]   = (62.0, -65.0);
    p[INDEX_MCP]  = (35.0, -95.0);
    p[INDEX_PIP]  = (38.0, -130.0);
    p[INDEX_DIP]  = (40.0, -150.0);
    p[MIDDLE_MCP] = (10.0, -105.0);
    p[MIDDLE_PIP] = (10.0, -145.0);
    p[MIDDLE_DIP] = (10.0, -170.0);
    p[MIDDLE_TIP] = (10.0, -195.0);
    p[RING_MCP]   = (-12.0, -100.0);
    p[RING_PIP]   = (-14.0, -135.0);
    p[RING_DIP]   = (-15.0, -158.0);
    p[RING_TIP]   = (-16.0, -178.0);
    p[PINKY_MCP]  = (-32.0, -95.0);
    p[PINKY_PIP]  = (-38.0, -115.0);
    p[PINKY_DIP]  = (-42.0, -132.0);
    p[PINKY_TIP]  = (-45.0, -148.0);
    p
};

const THUMB_OPEN:  (f32, f32) = (70.0, -90.0);
const THUMB_PINCH: (f32, f32) = (56.0, -120.0);
const INDEX_PINCH: (f32, f32) = (52.0, -124.0);
const INDEX_NEAR:  (f32, f32) = (48.0, -150.0);
const INDEX_FAR:   (f32, f32) = (30.0, -260.0);

fn lerp(a: (f32, f32), b: (f32, f32), t: f32) -> (f32, f32) {
    (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t)
}

/// Synthesizes a 21-landmark hand whose thumb–index midpoint follows the
/// mouse cursor.
#[derive(Clone, Debug)]
pub struct SimulatedHand {
    pub handedness: Handedness,
    /// Pixel size multiplier for the built-in pose.
    pub scale:      f32,
    input:          SimInput,
}

impl SimulatedHand {
    pub fn new(handedness: Handedness, scale: f32) -> Self {
        let scale = if scale.is_finite() { scale.clamp(0.25, 4.0) } else { 1.0 };
        SimulatedHand { handedness, scale, input: SimInput::default() }
    }

    pub fn input(&self) -> SimInput { self.input }
    pub fn set_input(&mut self, input: SimInput) { self.input = input; }

    /// Landmarks in frame pixels, or `None` when the hand is hidden or the
    /// cursor is outside the window.
    pub fn pixel_landmarks(&self) -> Option<[(f32, f32); LANDMARK_COUNT]> {
        if self.input.hidden {
            return None;
        }
        let cursor = self.input.cursor?;

        let mut pose = POSE;
        let spread = if self.input.spread.is_nan() { 0.0 } else { self.input.spread.clamp(0.0, 1.0) };
        if self.input.pinch {
            pose[THUMB_TIP] = THUMB_PINCH;
            pose[INDEX_TIP] = INDEX_PINCH;
        } else {
            pose[THUMB_TIP] = THUMB_OPEN;
            pose[INDEX_TIP] = lerp(INDEX_NEAR, INDEX_FAR, spread);
        }

        // mirror for the other hand, and again to show the back
        let mirror = (self.handedness == Handedness::Right) != self.input.flipped;
        let sx = if mirror { -self.scale } else { self.scale };
        let mid = lerp(pose[THUMB_TIP], pose[INDEX_TIP], 0.5);
        let wrist = (cursor.0 - mid.0 * sx, cursor.1 - mid.1 * self.scale);

        let mut out = [(0.0, 0.0); LANDMARK_COUNT];
        for (slot, &(x, y)) in out.iter_mut().zip(pose.iter()) {
            *slot = (wrist.0 + x * sx, wrist.1 + y * self.scale);
        }
        Some(out)
    }
}

impl LandmarkProvider for SimulatedHand {
    fn detect(&mut self, frame: &RgbImage) -> Vec<DetectedHand> {
        let (w, h) = frame.dimensions();
        if w == 0 || h == 0 {
            return Vec::new();
        }
        let Some(px) = self.pixel_landmarks() else { return Vec::new() };
        let landmarks = px.iter().map(|&(x, y)| (x / w as f32, y / h as f32)).collect();
        vec![DetectedHand { landmarks, handedness: self.handedness, confidence: 1.0 }]
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapProvider — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Landmark provider backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// A background thread polls the device and forwards each tracking frame;
/// `detect` returns the most recent one without blocking.
///
/// Joints are projected orthographically: Leap x ∈ `[-200, 200]` mm maps to
/// the frame width, height y ∈ `[50, 450]` mm to the frame height (up is up).
#[cfg(feature = "leap")]
pub struct LeapProvider {
    rx:     std::sync::mpsc::Receiver<Vec<DetectedHand>>,
    latest: Vec<DetectedHand>,
}

#[cfg(feature = "leap")]
impl LeapProvider {
    /// Spawn the polling thread. Connection failures are logged and leave
    /// the provider permanently empty.
    pub fn spawn() -> Self {
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || leap_loop(tx));
        LeapProvider { rx, latest: Vec::new() }
    }
}

#[cfg(feature = "leap")]
impl LandmarkProvider for LeapProvider {
    fn detect(&mut self, _frame: &RgbImage) -> Vec<DetectedHand> {
        while let Ok(hands) = self.rx.try_recv() {
            self.latest = hands;
        }
        self.latest.clone()
    }
}

#[cfg(feature = "leap")]
fn leap_loop(tx: std::sync::mpsc::Sender<Vec<DetectedHand>>) {
    use leaprs::*;

    let mut connection = match Connection::create(ConnectionConfig::default()) {
        Ok(c)  => c,
        Err(e) => {
            warn!(error = ?e, "failed to create LeapC connection");
            return;
        }
    };
    if let Err(e) = connection.open() {
        warn!(error = ?e, "failed to open LeapMotion device");
        return;
    }

    macro_rules! project {
        ($joint:expr) => {{
            let v = $joint;
            ((v.x + 200.0) / 400.0, 1.0 - (v.y - 50.0) / 400.0)
        }};
    }

    loop {
        let msg = match connection.poll(100) {
            Ok(m)  => m,
            Err(_) => continue,
        };
        let Event::Tracking(frame) = msg.event() else { continue };

        let hands = frame
            .hands()
            .into_iter()
            .filter_map(|hand| {
                let digits: Vec<_> = hand.digits().collect();
                if digits.len() < 5 {
                    return None;
                }
                let mut lm = vec![(0.0f32, 0.0f32); LANDMARK_COUNT];

                // wrist: mean of the finger metacarpal bases
                let bases: Vec<_> = digits[1..].iter().map(|d| project!(d.metacarpal().prev_joint())).collect();
                let n = bases.len() as f32;
                lm[WRIST] = (
                    bases.iter().map(|b| b.0).sum::<f32>() / n,
                    bases.iter().map(|b| b.1).sum::<f32>() / n,
                );

                let thumb = &digits[0];
                lm[THUMB_CMC] = project!(thumb.proximal().prev_joint());
                lm[THUMB_MCP] = project!(thumb.intermediate().prev_joint());
                lm[THUMB_IP]  = project!(thumb.distal().prev_joint());
                lm[THUMB_TIP] = project!(thumb.distal().next_joint());

                for (i, d) in digits[1..5].iter().enumerate() {
                    let base = INDEX_MCP + 4 * i;
                    lm[base]     = project!(d.proximal().prev_joint());
                    lm[base + 1] = project!(d.intermediate().prev_joint());
                    lm[base + 2] = project!(d.distal().prev_joint());
                    lm[base + 3] = project!(d.distal().next_joint());
                }

                let handedness = match hand.hand_type() {
                    HandType::Left  => Handedness::Left,
                    HandType::Right => Handedness::Right,
                };
                Some(DetectedHand { landmarks: lm, handedness, confidence: 1.0 })
            })
            .collect();

        if tx.send(hands).is_err() {
            return;
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_signal::{
        GestureDetector, OrientationConfig, PinchConfig, Point, bounding_box, is_front, is_pinch,
        midpoint,
    };

    fn frame() -> RgbImage { RgbImage::new(800, 600) }

    fn sim(handedness: Handedness, input: SimInput) -> Vec<KeypointSet> {
        let mut s = SimulatedHand::new(handedness, 1.5);
        s.set_input(input);
        let f = frame();
        to_keypoints(&s.detect(&f), f.width(), f.height())
    }

    fn at(x: f32, y: f32) -> SimInput {
        SimInput { cursor: Some((x, y)), ..Default::default() }
    }

    #[test]
    fn hidden_or_offscreen_hand_is_not_detected() {
        assert!(sim(Handedness::Left, SimInput { hidden: true, ..at(400.0, 300.0) }).is_empty());
        assert!(sim(Handedness::Left, SimInput::default()).is_empty());
    }

    #[test]
    fn fingers_center_on_cursor() {
        let hands = sim(Handedness::Left, at(400.0, 300.0));
        assert_eq!(hands.len(), 1);
        let h = &hands[0];
        let c = midpoint(h.point(THUMB_TIP), h.point(INDEX_TIP));
        assert!((c.x - 400).abs() <= 1 && (c.y - 300).abs() <= 1, "{:?}", c);
    }

    #[test]
    fn simulated_poses_read_as_intended() {
        let o = OrientationConfig::default();
        let p = PinchConfig::default();
        for side in [Handedness::Left, Handedness::Right] {
            let open  = &sim(side, at(400.0, 300.0))[0];
            let pinch = &sim(side, SimInput { pinch: true, ..at(400.0, 300.0) })[0];
            let back  = &sim(side, SimInput { flipped: true, ..at(400.0, 300.0) })[0];

            assert!(is_front(open, &bounding_box(open), &o), "{:?} open front", side);
            assert!(!is_pinch(open, &bounding_box(open), &p), "{:?} open pinch", side);
            assert!(is_pinch(pinch, &bounding_box(pinch), &p), "{:?} pinch", side);
            assert!(is_front(pinch, &bounding_box(pinch), &o), "{:?} pinch front", side);
            assert!(!is_front(back, &bounding_box(back), &o), "{:?} back", side);
        }
    }

    #[test]
    fn spread_widens_the_fingers() {
        let narrow = &sim(Handedness::Left, SimInput { spread: 0.0, ..at(400.0, 300.0) })[0];
        let wide   = &sim(Handedness::Left, SimInput { spread: 1.0, ..at(400.0, 300.0) })[0];
        let d = |h: &KeypointSet| hand_signal::distance(h.point(THUMB_TIP), h.point(INDEX_TIP));
        assert!(d(wide) > 240.0, "{}", d(wide));
        assert!(d(narrow) < 100.0, "{}", d(narrow));
    }

    #[test]
    fn simulated_tap_is_one_edge() {
        let mut det = GestureDetector::default();
        let mut starts = 0;
        for pinch in [false, true, true, false] {
            let hands = sim(Handedness::Left, SimInput { pinch, ..at(300.0, 300.0) });
            if det.update(hands.first()).pinch_just_started { starts += 1; }
        }
        assert_eq!(starts, 1);
    }

    #[test]
    fn malformed_detection_is_dropped() {
        let good = DetectedHand {
            landmarks:  vec![(0.5, 0.5); LANDMARK_COUNT],
            handedness: Handedness::Left,
            confidence: 0.8,
        };
        let bad = DetectedHand { landmarks: vec![(0.5, 0.5); 5], ..good.clone() };
        let out = to_keypoints(&[bad, good], 100, 100);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].point(WRIST), Point::new(50, 50));
    }
}
