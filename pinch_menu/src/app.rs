//! Top-level application loop.
//!
//! [`App`] owns the landmark provider and the [`MenuController`]; each
//! frame it asks the provider for hands, runs the menu, and hands the
//! composited image plus a [`Hud`] to the visualizer.

use std::borrow::Cow;
use std::path::PathBuf;
use std::time::Instant;

use image::{Rgb, RgbImage};
use tracing::info;

use hand_signal::{DepthCue, DepthGauge, KeypointSet, bounding_box, primary_hand};

use crate::control::MidiVolumeSink;
use crate::error::{AppError, MenuError};
use crate::icons::MenuIcons;
use crate::menu::{FrameReport, MenuConfig, MenuController};
use crate::provider::{LandmarkProvider, to_keypoints};
use crate::visualizer::{FRAME_H, FRAME_W, Hud, Visualizer};

#[cfg(not(feature = "leap"))]
use crate::provider::SimulatedHand;
#[cfg(feature = "leap")]
use crate::provider::LeapProvider;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub menu:           MenuConfig,
    /// Directory holding `ball.png`, `menu.png`, `volume.png`,
    /// `brightness.png`; built-in art when `None`.
    pub icon_dir:       Option<PathBuf>,
    /// Size multiplier for the simulated hand.
    pub hand_scale:     f32,
    /// Apparent size used for the camera-distance readout.
    pub depth_cue:      DepthCue,
    pub midi_channel:   u8,
    pub show_rings:     bool,
    pub show_landmarks: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            menu:           MenuConfig::default(),
            icon_dir:       None,
            hand_scale:     1.5,
            depth_cue:      DepthCue::KnuckleSpan,
            midi_channel:   0,
            show_rings:     true,
            show_landmarks: true,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// App
// ════════════════════════════════════════════════════════════════════════════

pub struct App<P: LandmarkProvider> {
    controller:     MenuController<MidiVolumeSink>,
    provider:       P,
    hands:          Vec<KeypointSet>,
    depth:          DepthGauge,
    show_rings:     bool,
    show_landmarks: bool,
    pub status:     String,
}

impl<P: LandmarkProvider> App<P> {
    pub fn new(cfg: &AppConfig, provider: P, sink: MidiVolumeSink) -> Result<Self, AppError> {
        let icons = match &cfg.icon_dir {
            Some(dir) => MenuIcons::load(dir)?,
            None      => MenuIcons::builtin(),
        };
        let controller = MenuController::new(cfg.menu, icons, sink)?;
        let depth = DepthGauge::new(FRAME_H as u32, cfg.depth_cue, DepthGauge::DEFAULT_EXPONENT)
            .map_err(MenuError::from)?;
        Ok(App {
            controller,
            provider,
            hands:          Vec::new(),
            depth,
            show_rings:     cfg.show_rings,
            show_landmarks: cfg.show_landmarks,
            status:         "Ready — show your palm and pinch to wake the menu".to_string(),
        })
    }

    pub fn controller(&self) -> &MenuController<MidiVolumeSink> { &self.controller }
    pub fn provider_mut(&mut self) -> &mut P { &mut self.provider }
    pub fn hands(&self) -> &[KeypointSet] { &self.hands }

    // ── Per-frame step ────────────────────────────────────────────────────

    /// Detect, update the menu, composite.
    pub fn step<'a>(&mut self, frame: &'a RgbImage, now: Instant) -> (FrameReport, Cow<'a, RgbImage>) {
        let detections = self.provider.detect(frame);
        self.hands = to_keypoints(&detections, frame.width(), frame.height());
        let (report, image) = self.controller.process_frame(&self.hands, frame, now);
        self.status = status_line(&report, self.depth_reading());
        (report, image)
    }

    /// Camera distance of the tracked hand, 0 (close) to 100 (far).
    pub fn depth_reading(&self) -> Option<i32> {
        let hand = primary_hand(&self.hands, self.controller.config().handedness)?;
        Some(self.depth.measure(hand, &bounding_box(hand)))
    }

    /// HUD description of `report` for the visualizer.
    pub fn hud<'a>(&'a self, report: &'a FrameReport) -> Hud<'a> {
        let cfg = self.controller.config();
        Hud {
            report,
            options:        self.controller.options(),
            hand:           self.hands.iter().find(|h| h.handedness == cfg.handedness),
            hover_radius:   cfg.hover_radius,
            commit_radius:  cfg.commit_radius,
            brightness:     self.controller.sink().brightness(),
            near_distance:  cfg.control.input_range.0,
            show_rings:     self.show_rings,
            show_landmarks: self.show_landmarks,
        }
    }
}

fn status_line(r: &FrameReport, depth: Option<i32>) -> String {
    let hand = if !r.signal.hand_present() {
        "no hand"
    } else if !r.signal.is_front {
        "back of hand"
    } else if r.signal.is_pinch {
        "palm, pinching"
    } else {
        "palm"
    };
    let mut s = format!("{}  taps: {}  ({})", r.state.name(), r.signal.pinch_repeat_count, hand);
    if let Some(d) = depth {
        s.push_str(&format!("  depth: {}", d));
    }
    if let Some(o) = r.hovered {
        s.push_str(&format!("  hover: {}", o.name()));
    }
    if let Some(v) = r.control {
        s.push_str(&format!("  {}: {}%", v.kind.name(), v.percent as i32));
    }
    s
}

/// The stand-in camera frame: a soft diagonal gradient.
pub fn backdrop(width: u32, height: u32) -> RgbImage {
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;
    RgbImage::from_fn(width, height, |x, y| {
        let u = x as f32 / w;
        let v = y as f32 / h;
        Rgb([
            (40.0 + 60.0 * u) as u8,
            (60.0 + 50.0 * v) as u8,
            (90.0 + 40.0 * (1.0 - u)) as u8,
        ])
    })
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// This is the entry point called from `main.rs`. It creates the visualizer,
/// the landmark provider (simulation by default, hardware with `--features
/// leap`), and drives the detect/update/render loop at ~60 fps.
pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    #[cfg(not(feature = "leap"))]
    let provider = SimulatedHand::new(cfg.menu.handedness, cfg.hand_scale);
    #[cfg(feature = "leap")]
    let provider = LeapProvider::spawn();

    let sink = MidiVolumeSink::connect(cfg.midi_channel);
    let mut app = App::new(&cfg, provider, sink)?;
    let mut vis = Visualizer::new()?;
    let background = backdrop(FRAME_W as u32, FRAME_H as u32);

    info!(
        hand = cfg.menu.handedness.name(),
        hover = cfg.menu.hover_radius,
        commit = cfg.menu.commit_radius,
        "menu ready"
    );

    while vis.is_open() {
        // 1. Poll window input
        let Some(input) = vis.poll_input() else { break };
        #[cfg(not(feature = "leap"))]
        app.provider_mut().set_input(input);
        #[cfg(feature = "leap")]
        let _ = input;

        // 2. Detect + menu + composite
        let (report, image) = app.step(&background, Instant::now());

        // 3. Render
        vis.render(&image, &app.hud(&report), &app.status);
    }

    info!(volume = ?app.controller().sink().last_volume(), "bye");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::MenuState;
    use crate::options::OptionKind;
    use crate::provider::{SimInput, SimulatedHand};
    use std::time::Duration;

    fn make_app() -> App<SimulatedHand> {
        let cfg = AppConfig::default();
        let provider = SimulatedHand::new(cfg.menu.handedness, cfg.hand_scale);
        App::new(&cfg, provider, MidiVolumeSink::offline()).unwrap()
    }

    fn frame() -> RgbImage { backdrop(FRAME_W as u32, FRAME_H as u32) }

    fn input(cursor: (f32, f32), pinch: bool) -> SimInput {
        SimInput { cursor: Some(cursor), pinch, ..Default::default() }
    }

    /// Feed `pinch` states at a fixed cursor; returns the last report.
    fn feed(app: &mut App<SimulatedHand>, bg: &RgbImage, cursor: (f32, f32), pinches: &[bool]) -> FrameReport {
        let mut last = None;
        for &p in pinches {
            app.provider_mut().set_input(input(cursor, p));
            last = Some(app.step(bg, Instant::now()).0);
        }
        last.unwrap()
    }

    fn open_menu(app: &mut App<SimulatedHand>, bg: &RgbImage) {
        let r = feed(app, bg, (400.0, 300.0), &[false, true, false, true, false, true]);
        assert!(matches!(r.state, MenuState::OptionHover { .. }));
    }

    fn commit(app: &mut App<SimulatedHand>, bg: &RgbImage, kind: OptionKind) -> FrameReport {
        open_menu(app, bg);
        let target = app
            .controller()
            .options()
            .iter()
            .find(|o| o.kind == kind)
            .and_then(|o| o.anchor())
            .unwrap();
        feed(app, bg, (target.x as f32, target.y as f32), &[true, false])
    }

    #[test]
    fn no_hand_means_idle_and_untouched_frame() {
        let mut app = make_app();
        let bg = frame();
        let (r, img) = app.step(&bg, Instant::now());
        assert_eq!(r.state, MenuState::Idle);
        assert!(matches!(img, Cow::Borrowed(_)));
        assert!(app.status.contains("no hand"));
    }

    #[test]
    fn depth_readout_follows_hand_size() {
        let mut app = make_app();
        let bg = frame();
        feed(&mut app, &bg, (400.0, 300.0), &[false]);
        let far = app.depth_reading().unwrap();
        assert!(app.status.contains(&format!("depth: {}", far)));

        app.provider_mut().scale = 3.0;
        feed(&mut app, &bg, (400.0, 300.0), &[false]);
        let near = app.depth_reading().unwrap();
        assert!(near < far, "{} vs {}", near, far);

        app.provider_mut().set_input(SimInput { hidden: true, ..input((400.0, 300.0), false) });
        app.step(&bg, Instant::now());
        assert_eq!(app.depth_reading(), None);
        assert!(!app.status.contains("depth"));
    }

    #[test]
    fn three_pinches_open_the_menu() {
        let mut app = make_app();
        let bg = frame();
        open_menu(&mut app, &bg);
        assert!(app.status.starts_with("hover"));
        assert!(app.controller().options().iter().all(|o| o.anchor().is_some()));
    }

    #[test]
    fn committing_volume_sends_midi() {
        let mut app = make_app();
        let bg = frame();
        let r = commit(&mut app, &bg, OptionKind::Volume);
        assert_eq!(r.state.committed(), Some(OptionKind::Volume));
        assert!(app.controller().sink().last_volume().is_some());
        assert!(app.status.contains("volume"));
    }

    #[test]
    fn committing_brightness_dims_the_screen() {
        let mut app = make_app();
        let bg = frame();
        let r = commit(&mut app, &bg, OptionKind::Brightness);
        assert_eq!(r.state.committed(), Some(OptionKind::Brightness));
        let b = app.controller().sink().brightness();
        assert!(b > 0.0 && b < 100.0, "{}", b);
        assert_eq!(app.hud(&r).brightness, b);
    }

    #[test]
    fn flipping_the_hand_closes_everything() {
        let mut app = make_app();
        let bg = frame();
        commit(&mut app, &bg, OptionKind::Volume);
        app.provider_mut().set_input(SimInput { flipped: true, ..input((400.0, 300.0), false) });
        let (r, img) = app.step(&bg, Instant::now() + Duration::from_secs(1));
        assert_eq!(r.state, MenuState::Idle);
        assert!(matches!(img, Cow::Borrowed(_)));
    }

    #[test]
    fn menu_is_drawn_over_the_backdrop() {
        let mut app = make_app();
        let bg = frame();
        open_menu(&mut app, &bg);
        app.provider_mut().set_input(input((400.0, 300.0), true));
        let (_, img) = app.step(&bg, Instant::now() + Duration::from_secs(2));
        assert!(matches!(img, Cow::Owned(_)));
        assert_ne!(*img, bg);
    }

    #[test]
    fn missing_icon_dir_fails_startup() {
        let cfg = AppConfig { icon_dir: Some("/nonexistent/icons".into()), ..Default::default() };
        let provider = SimulatedHand::new(cfg.menu.handedness, cfg.hand_scale);
        assert!(matches!(
            App::new(&cfg, provider, MidiVolumeSink::offline()),
            Err(AppError::Icon(_))
        ));
    }
}
