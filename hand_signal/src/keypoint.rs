//! The 21-point hand model and its pixel-space representation.

use crate::error::SignalError;

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices
// ════════════════════════════════════════════════════════════════════════════

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_MCP:  usize = 2;
pub const THUMB_IP:   usize = 3;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_DIP:  usize = 7;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_PIP:   usize = 14;
pub const RING_DIP:   usize = 15;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_PIP:  usize = 18;
pub const PINKY_DIP:  usize = 19;
pub const PINKY_TIP:  usize = 20;

/// Landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

// ════════════════════════════════════════════════════════════════════════════
// Point / Handedness
// ════════════════════════════════════════════════════════════════════════════

/// Pixel coordinate in the frame (origin top-left, y grows downward).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self { Point { x, y } }

    /// Shift by a fixed offset.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Point { x: self.x + dx, y: self.y + dy }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self { Point { x, y } }
}

/// Which hand the detector believes it is looking at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Handedness { Left, Right }

impl Handedness {
    pub fn name(self) -> &'static str {
        match self {
            Handedness::Left  => "Left",
            Handedness::Right => "Right",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// KeypointSet
// ════════════════════════════════════════════════════════════════════════════

/// One detected hand: 21 landmarks in pixel space plus the detector's
/// handedness label and confidence.
///
/// The landmark index is the array position, so `points[THUMB_TIP]` is the
/// thumb tip. Built fresh every frame and only ever read.
#[derive(Clone, Debug, PartialEq)]
pub struct KeypointSet {
    points:         [Point; LANDMARK_COUNT],
    pub handedness: Handedness,
    pub confidence: f32,
}

impl KeypointSet {
    /// Build from pixel coordinates.
    pub fn from_pixels(
        points:     [Point; LANDMARK_COUNT],
        handedness: Handedness,
        confidence: f32,
    ) -> Self {
        KeypointSet { points, handedness, confidence }
    }

    /// Build from normalized `[0, 1]` landmark positions, scaling by the
    /// frame size and truncating to whole pixels.
    pub fn from_normalized(
        landmarks:  &[(f32, f32)],
        frame_w:    u32,
        frame_h:    u32,
        handedness: Handedness,
        confidence: f32,
    ) -> Result<Self, SignalError> {
        if landmarks.len() != LANDMARK_COUNT {
            return Err(SignalError::LandmarkCount {
                expected: LANDMARK_COUNT,
                actual:   landmarks.len(),
            });
        }
        let mut points = [Point::default(); LANDMARK_COUNT];
        for (slot, &(nx, ny)) in points.iter_mut().zip(landmarks) {
            *slot = Point {
                x: (nx * frame_w as f32) as i32,
                y: (ny * frame_h as f32) as i32,
            };
        }
        Ok(KeypointSet { points, handedness, confidence })
    }

    /// Landmark by index (see the `*_TIP` / `*_MCP` constants).
    ///
    /// # Panics
    /// If `index >= LANDMARK_COUNT`.
    pub fn point(&self, index: usize) -> Point { self.points[index] }

    pub fn points(&self) -> &[Point; LANDMARK_COUNT] { &self.points }

    /// Iterate as `(index, point)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Point)> + '_ {
        self.points.iter().copied().enumerate()
    }
}

/// The first detected hand of the tracked handedness.
///
/// Later hands of the same side and any hand of the other side are
/// ignored for gesture purposes.
pub fn primary_hand(hands: &[KeypointSet], tracked: Handedness) -> Option<&KeypointSet> {
    hands.iter().find(|h| h.handedness == tracked)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
