//! # icon_overlay
//!
//! The drawing half of a gesture menu: every on-screen element is an
//! [`Icon`] that grows in with an eased [`Animator`] and is alpha-blended
//! onto the camera frame by the [`compositor`].
//!
//! * Timing is an explicit input (`Instant` passed in), never read from a
//!   clock inside a draw call, so a slow or fast frame loop samples the same
//!   curve in real seconds.
//! * Placements that leave the frame are clipped; fully off-frame icons draw
//!   nothing.
//! * Scale, alpha and duration settings are clamped, never rejected.

pub mod error;
pub mod animation;
pub mod icon;
pub mod compositor;
pub mod sprite;

pub use error::OverlayError;
pub use animation::{AnimationConfig, AnimationState, Animator, ease_in_out};
pub use icon::Icon;
pub use compositor::{Placement, blend_onto, composite, composite_in_place};
pub use sprite::Sprite;
