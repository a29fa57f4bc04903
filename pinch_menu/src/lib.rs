//! # pinch_menu
//!
//! A pinch-driven floating menu: show the palm, tap thumb and index
//! together, and an animated menu grows out of the hand. Picking an option
//! turns the live finger distance into system volume or screen brightness.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | State | Action |
//! |---|---|---|
//! | 1st pinch, palm to camera | Idle | Menu ball appears above the hand |
//! | 2nd pinch | Ball | Menu panel with volume / brightness icons opens |
//! | 3rd pinch (hold) | Menu | Menu pins in place; hovering an icon highlights it |
//! | Release over an icon | Hover | Option committed; finger distance drives it |
//! | Release elsewhere | Hover | Back to the open menu |
//! | Back of hand, or hand lost | Any | Everything closes and resets |
//!
//! ## Crates
//!
//! * `hand_signal` — keypoints, geometry, smoothing, pinch/orientation edges.
//! * `icon_overlay` — eased grow-in animation and alpha compositing.
//! * this crate — menu state machine, control sinks, landmark providers,
//!   and the `minifb` visualizer.
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: the mouse drives a synthetic hand.
//! * `leap` — **Hardware mode**: polls a real LeapMotion controller via LeapC.
//!
//! ### Simulation controls
//!
//! | Input | Hand |
//! |---|---|
//! | Mouse | Finger centroid position |
//! | `Space` / left button (hold) | Pinch |
//! | Wheel, `Up` / `Down` | Open-finger spread (control value) |
//! | `F` | Flip palm toward / away from the camera |
//! | `H` | Hide / show the hand |
//! | `Q` / `Escape` | Quit |

pub mod error;
pub mod options;
pub mod control;
pub mod icons;
pub mod menu;
pub mod provider;
pub mod visualizer;
pub mod app;

pub use error::{AppError, MenuError, SinkError};
pub use control::{ControlConfig, ControlMapping, ControlSink, ControlValue, MidiVolumeSink, RecordingSink};
pub use menu::{FrameReport, MenuConfig, MenuController, MenuState, transition};
pub use options::{MenuOption, OptionKind};
pub use provider::{DetectedHand, LandmarkProvider, SimInput, SimulatedHand};
