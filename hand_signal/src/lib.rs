//! # hand_signal
//!
//! Turns the 21 keypoints a hand-landmark detector reports each frame into
//! the few numbers and edges a gesture UI actually needs.
//!
//! ## Pipeline
//!
//! ```text
//! KeypointSet ──► bounding_box ──► is_pinch / is_front ──► GestureDetector ──► GestureSignal
//!      │                                                        ▲
//!      └──────────── distance / midpoint (thumb, index) ────────┘
//! ```
//!
//! * [`features`] — bounding box, distances, the exponential [`RangeMap`],
//!   and the [`DepthGauge`] camera-distance estimate.
//! * [`smoothing`] — exponential moving average for on-screen anchors.
//! * [`gesture`] — pinch and palm-orientation tests plus edge detection.
//!
//! Nothing here owns a clock or a thread: one call per frame, in order.

pub mod error;
pub mod keypoint;
pub mod features;
pub mod smoothing;
pub mod gesture;

pub use error::SignalError;
pub use keypoint::{Handedness, KeypointSet, Point, primary_hand, LANDMARK_COUNT};
pub use keypoint::{
    WRIST, THUMB_CMC, THUMB_MCP, THUMB_IP, THUMB_TIP, INDEX_MCP, INDEX_PIP, INDEX_DIP, INDEX_TIP,
    MIDDLE_MCP, MIDDLE_PIP, MIDDLE_DIP, MIDDLE_TIP, RING_MCP, RING_PIP, RING_DIP, RING_TIP,
    PINKY_MCP, PINKY_PIP, PINKY_DIP, PINKY_TIP,
};
pub use features::{BoundingBox, DepthCue, DepthGauge, RangeMap, bounding_box, distance, midpoint};
pub use smoothing::{SmoothedPoint, ema};
pub use gesture::{
    GestureDetector, GestureSignal, OrientationConfig, PinchConfig, is_front, is_pinch,
};
