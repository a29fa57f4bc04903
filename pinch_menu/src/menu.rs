//! The menu state machine and the controller that drives it per frame.
//!
//! ```text
//!            tap               tap               tap (latch point)
//!   Idle ─────────► Ball ─────────► MenuOpen ─────────► OptionHover
//!    ▲                                 ▲                  │ release
//!    │ palm turned away                │ release, missed  ▼
//!    └──── (from any state) ◄──────────┴──────── OptionCommitted
//! ```
//!
//! [`transition`] is a pure function of the current state and one frame's
//! [`GestureSignal`]; [`MenuController`] owns everything with memory (the
//! edge detector, anchor smoothing, sprite animations, the control sink)
//! and keeps it consistent with the state after every transition.

use std::borrow::Cow;
use std::time::Instant;

use image::RgbImage;
use tracing::{debug, info};

use hand_signal::{
    GestureDetector, GestureSignal, Handedness, KeypointSet, OrientationConfig, PinchConfig, Point,
    SmoothedPoint, primary_hand,
};
use icon_overlay::{AnimationConfig, Sprite};

use crate::control::{ControlConfig, ControlMapping, ControlSink, ControlValue, apply_control};
use crate::error::MenuError;
use crate::icons::MenuIcons;
use crate::options::{MenuOption, OptionKind, hit_test};

// ════════════════════════════════════════════════════════════════════════════
// Configuration
// ════════════════════════════════════════════════════════════════════════════

/// Pixel offsets. Anchors are measured from the top center of the hand's
/// bounding box; draw offsets from the (smoothed) anchor they belong to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MenuLayout {
    pub ball_anchor:     (i32, i32),
    pub menu_anchor:     (i32, i32),
    pub ball_draw:       (i32, i32),
    pub panel_draw:      (i32, i32),
    pub volume_draw:     (i32, i32),
    pub brightness_draw: (i32, i32),
}

impl Default for MenuLayout {
    fn default() -> Self {
        MenuLayout {
            ball_anchor:     (-15, -15),
            menu_anchor:     (-35, -35),
            ball_draw:       (-15, -15),
            panel_draw:      (-15, -15),
            volume_draw:     (-100, -15),
            brightness_draw: (75, -15),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MenuConfig {
    pub handedness:      Handedness,
    pub pinch:           PinchConfig,
    pub orientation:     OrientationConfig,
    /// Hover radius around an option anchor, px.
    pub hover_radius:    f32,
    /// Commit radius around an option anchor, px. Usually tighter than hover.
    pub commit_radius:   f32,
    pub ball_smoothing:  f32,
    pub menu_smoothing:  f32,
    pub layout:          MenuLayout,
    pub ball_anim:       AnimationConfig,
    pub panel_anim:      AnimationConfig,
    pub option_anim:     AnimationConfig,
    pub control:         ControlConfig,
}

impl Default for MenuConfig {
    fn default() -> Self {
        MenuConfig {
            handedness:     Handedness::Left,
            pinch:          PinchConfig::default(),
            orientation:    OrientationConfig::default(),
            hover_radius:   120.0,
            commit_radius:  55.0,
            ball_smoothing: 0.25,
            menu_smoothing: 0.1,
            layout:         MenuLayout::default(),
            ball_anim:      AnimationConfig::new(0.8, 0.8, 0.7),
            panel_anim:     AnimationConfig::new(4.0, 0.7, 0.6),
            option_anim:    AnimationConfig::new(1.0, 0.8, 0.6),
            control:        ControlConfig::default(),
        }
    }
}

impl MenuConfig {
    /// Build the control curves for a sink with the given volume range.
    /// Fails on a degenerate or non-finite input range or a bad exponent.
    pub fn validate(&self, volume_range: (f32, f32)) -> Result<ControlMapping, MenuError> {
        Ok(ControlMapping::new(&self.control, volume_range)?)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MenuState / transition
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MenuState {
    #[default]
    Idle,
    BallVisible,
    MenuOpen,
    /// Third tap landed; the menu is pinned at `commit_point` while the
    /// pinch is held.
    OptionHover { commit_point: Point },
    OptionCommitted { option: OptionKind, commit_point: Point },
}

impl MenuState {
    pub fn name(&self) -> &'static str {
        match self {
            MenuState::Idle                   => "idle",
            MenuState::BallVisible            => "ball",
            MenuState::MenuOpen               => "menu",
            MenuState::OptionHover { .. }     => "hover",
            MenuState::OptionCommitted { .. } => "committed",
        }
    }

    pub fn commit_point(&self) -> Option<Point> {
        match *self {
            MenuState::OptionHover { commit_point }
            | MenuState::OptionCommitted { commit_point, .. } => Some(commit_point),
            _ => None,
        }
    }

    pub fn committed(&self) -> Option<OptionKind> {
        match *self {
            MenuState::OptionCommitted { option, .. } => Some(option),
            _ => None,
        }
    }

    /// True while the menu panel and its options are on screen.
    pub fn shows_menu(&self) -> bool {
        !matches!(self, MenuState::Idle | MenuState::BallVisible)
    }
}

/// Next state for one frame.
///
/// `tap_point` is where the menu currently sits; it becomes the commit point
/// when the third tap lands. `commit_hit` is the option under the finger
/// centroid within the commit radius, looked up by the caller on release.
/// A palm that is not facing the camera (including no hand at all) always
/// yields `Idle`.
pub fn transition(
    state:      MenuState,
    signal:     &GestureSignal,
    tap_point:  Option<Point>,
    commit_hit: Option<OptionKind>,
) -> MenuState {
    if !signal.is_front {
        return MenuState::Idle;
    }
    match state {
        MenuState::Idle if signal.pinch_just_started        => MenuState::BallVisible,
        MenuState::BallVisible if signal.pinch_just_started => MenuState::MenuOpen,
        MenuState::MenuOpen if signal.pinch_just_started    => match tap_point {
            Some(commit_point) => MenuState::OptionHover { commit_point },
            None               => MenuState::MenuOpen,
        },
        MenuState::OptionHover { commit_point } if signal.pinch_just_released => match commit_hit {
            Some(option) => MenuState::OptionCommitted { option, commit_point },
            None         => MenuState::MenuOpen,
        },
        s => s,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MenuController
// ════════════════════════════════════════════════════════════════════════════

/// What happened this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    pub state:   MenuState,
    pub signal:  GestureSignal,
    /// Option under the held pinch while hovering.
    pub hovered: Option<OptionKind>,
    /// Value pushed to the sink while an option is committed.
    pub control: Option<ControlValue>,
}

pub struct MenuController<S: ControlSink> {
    config:        MenuConfig,
    mapping:       ControlMapping,
    detector:      GestureDetector,
    state:         MenuState,
    ball_smoother: SmoothedPoint,
    menu_smoother: SmoothedPoint,
    ball_anchor:   Option<Point>,
    menu_anchor:   Option<Point>,
    ball:          Sprite,
    panel:         Sprite,
    options:       Vec<MenuOption>,
    last_hover:    Option<OptionKind>,
    sink:          S,
}

impl<S: ControlSink> MenuController<S> {
    pub fn new(mut config: MenuConfig, icons: MenuIcons, sink: S) -> Result<Self, MenuError> {
        let mapping = config.validate(sink.volume_range())?;
        config.hover_radius  = config.hover_radius.max(0.0);
        config.commit_radius = config.commit_radius.max(0.0);

        let l = config.layout;
        let options = vec![
            MenuOption::new(OptionKind::Volume, l.volume_draw, Sprite::new(icons.volume, config.option_anim)),
            MenuOption::new(OptionKind::Brightness, l.brightness_draw, Sprite::new(icons.brightness, config.option_anim)),
        ];

        Ok(MenuController {
            mapping,
            detector:      GestureDetector::new(config.pinch, config.orientation),
            state:         MenuState::Idle,
            ball_smoother: SmoothedPoint::new(config.ball_smoothing),
            menu_smoother: SmoothedPoint::new(config.menu_smoothing),
            ball_anchor:   None,
            menu_anchor:   None,
            ball:          Sprite::new(icons.ball, config.ball_anim),
            panel:         Sprite::new(icons.panel, config.panel_anim),
            options,
            last_hover:    None,
            sink,
            config,
        })
    }

    pub fn state(&self) -> MenuState { self.state }
    pub fn config(&self) -> &MenuConfig { &self.config }
    pub fn mapping(&self) -> &ControlMapping { &self.mapping }
    pub fn sink(&self) -> &S { &self.sink }
    pub fn options(&self) -> &[MenuOption] { &self.options }
    pub fn ball_anchor(&self) -> Option<Point> { self.ball_anchor }
    pub fn menu_anchor(&self) -> Option<Point> { self.menu_anchor }
    pub fn ball(&self) -> &Sprite { &self.ball }
    pub fn panel(&self) -> &Sprite { &self.panel }

    /// Every animated element, for inspection.
    pub fn sprites(&self) -> impl Iterator<Item = &Sprite> {
        [&self.ball, &self.panel].into_iter().chain(self.options.iter().map(|o| &o.sprite))
    }

    /// Where the menu is laid out in the current state, if it is shown.
    fn layout_point(&self) -> Option<Point> {
        match self.state {
            MenuState::MenuOpen => self.menu_anchor,
            s => s.commit_point(),
        }
    }

    fn place_options(&mut self) {
        match self.layout_point() {
            Some(p) => self.options.iter_mut().for_each(|o| o.place(p)),
            None    => self.options.iter_mut().for_each(MenuOption::clear),
        }
    }

    /// Hidden elements are rewound so they grow in again next time.
    fn sync_visibility(&mut self) {
        if self.state != MenuState::BallVisible {
            self.ball.reset();
        }
        if !self.state.shows_menu() {
            self.panel.reset();
            self.options.iter_mut().for_each(MenuOption::clear);
        }
    }

    /// Advance the state machine by one frame of detected hands.
    pub fn update(&mut self, hands: &[KeypointSet]) -> FrameReport {
        let hand = primary_hand(hands, self.config.handedness);
        let signal = self.detector.update(hand);

        if let Some(bbox) = signal.bbox {
            let top = bbox.top_center();
            let l = self.config.layout;
            self.ball_anchor = Some(self.ball_smoother.update(top.offset(l.ball_anchor.0, l.ball_anchor.1)));
            self.menu_anchor = Some(self.menu_smoother.update(top.offset(l.menu_anchor.0, l.menu_anchor.1)));
        }

        self.place_options();
        let commit_hit = if signal.pinch_just_released {
            signal.finger_center.and_then(|c| hit_test(&self.options, c, self.config.commit_radius))
        } else {
            None
        };

        let next = transition(self.state, &signal, self.menu_anchor, commit_hit);
        if next != self.state {
            debug!(from = self.state.name(), to = next.name(), taps = signal.pinch_repeat_count, "menu transition");
            if let Some(option) = next.committed() {
                info!(option = option.name(), "option committed");
            }
        }
        self.state = next;

        if self.state == MenuState::Idle {
            self.detector.reset_repeats();
        }
        self.sync_visibility();
        self.place_options();

        let hovered = match self.state {
            MenuState::OptionHover { .. } if signal.is_pinch => signal
                .finger_center
                .and_then(|c| hit_test(&self.options, c, self.config.hover_radius)),
            _ => None,
        };
        if hovered != self.last_hover {
            if let Some(option) = hovered {
                info!(option = option.name(), "hovering option");
            }
            self.last_hover = hovered;
        }

        let control = match (self.state.committed(), signal.pinch_distance) {
            (Some(option), Some(d)) => Some(apply_control(&mut self.sink, &self.mapping, option, d)),
            _ => None,
        };

        FrameReport { state: self.state, signal, hovered, control }
    }

    /// Draw the overlay for the current state. With nothing to show the
    /// input frame comes back untouched.
    pub fn render<'a>(&mut self, frame: &'a RgbImage, now: Instant) -> Cow<'a, RgbImage> {
        let l = self.config.layout;
        match self.state {
            MenuState::Idle => Cow::Borrowed(frame),
            MenuState::BallVisible => {
                let Some(a) = self.ball_anchor else { return Cow::Borrowed(frame) };
                let mut out = frame.clone();
                let c = a.offset(l.ball_draw.0, l.ball_draw.1);
                self.ball.draw_centered(&mut out, (c.x, c.y), now);
                Cow::Owned(out)
            }
            _ => {
                let Some(p) = self.layout_point() else { return Cow::Borrowed(frame) };
                let mut out = frame.clone();
                let c = p.offset(l.panel_draw.0, l.panel_draw.1);
                self.panel.draw_centered(&mut out, (c.x, c.y), now);
                for o in &mut self.options {
                    if let Some(a) = o.anchor() {
                        o.sprite.draw_centered(&mut out, (a.x, a.y), now);
                    }
                }
                Cow::Owned(out)
            }
        }
    }

    /// `update` followed by `render`.
    pub fn process_frame<'a>(
        &mut self,
        hands: &[KeypointSet],
        frame: &'a RgbImage,
        now:   Instant,
    ) -> (FrameReport, Cow<'a, RgbImage>) {
        let report = self.update(hands);
        let image = self.render(frame, now);
        (report, image)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
