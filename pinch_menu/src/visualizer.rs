//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                                                          │
//! │   composited camera frame (dimmed by brightness)         │
//! │     + landmark dots, option hover/commit rings,          │
//! │       live percentage at the finger centroid             │
//! │                                                          │
//! ├──────────────────────────────────────────────────────────┤
//! │  status bar                                              │
//! │  key legend                                              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! All drawing goes through [`Canvas`], which owns the `u32` pixel buffer;
//! [`Visualizer`] adds the window and the mouse/keyboard simulation.

use image::RgbImage;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use hand_signal::{KeypointSet, Point};

use crate::error::AppError;
use crate::menu::FrameReport;
use crate::options::MenuOption;
use crate::provider::SimInput;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const FRAME_W:     usize = 800;
pub const FRAME_H:     usize = 540;
pub const WIN_W:       usize = FRAME_W;
pub const WIN_H:       usize = FRAME_H + STATUS_H;
const STATUS_H:        usize = 40;
const STATUS_Y:        usize = FRAME_H;
const BG_COLOR:        u32   = 0xFF1A1A2E;
const TEXT_BG:         u32   = 0xFF0F3460;
const HOVER_RING:      u32   = 0xFF00AAAA;
const COMMIT_RING:     u32   = 0xFFFFD700;  // gold
const ACTIVE_RING:     u32   = 0xFF00FF66;
const LANDMARK_COLOR:  u32   = 0xFFFF4081;
const PERCENT_NEAR:    u32   = 0xFF00FF00;  // fingers at the low end
const PERCENT_COLOR:   u32   = 0xFFFF5102;
/// Brightness 0 % still leaves this much of the frame visible.
const DIM_FLOOR:       f32   = 0.15;
const SPREAD_STEP:     f32   = 0.05;

/// Everything the HUD needs beyond the composited frame.
pub struct Hud<'a> {
    pub report:         &'a FrameReport,
    pub options:        &'a [MenuOption],
    pub hand:           Option<&'a KeypointSet>,
    pub hover_radius:   f32,
    pub commit_radius:  f32,
    /// Screen brightness, percent.
    pub brightness:     f32,
    /// Finger distance at which the percentage turns green.
    pub near_distance:  f32,
    pub show_rings:     bool,
    pub show_landmarks: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas
// ════════════════════════════════════════════════════════════════════════════

/// A 0xAARRGGBB pixel buffer with the primitives the HUD draws with.
pub struct Canvas {
    pub buf: Vec<u32>,
    width:   usize,
    height:  usize,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas { buf: vec![BG_COLOR; width * height], width, height }
    }

    pub fn width(&self)  -> usize { self.width }
    pub fn height(&self) -> usize { self.height }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.buf[y * self.width + x])
    }

    pub fn clear(&mut self) { self.buf.fill(BG_COLOR); }

    /// Copy `frame` to the top-left corner, scaled by `level` (0–1) toward
    /// black.
    pub fn blit_dimmed(&mut self, frame: &RgbImage, level: f32) {
        let level = if level.is_nan() { 1.0 } else { level.clamp(0.0, 1.0) };
        let w = (frame.width() as usize).min(self.width);
        let h = (frame.height() as usize).min(self.height);
        for y in 0..h {
            for x in 0..w {
                let [r, g, b] = frame.get_pixel(x as u32, y as u32).0;
                self.buf[y * self.width + x] = blend(rgb(r, g, b), 0xFF000000, 1.0 - level);
            }
        }
    }

    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.height) {
            for col in x..(x + w).min(self.width) {
                self.buf[row * self.width + col] = color;
            }
        }
    }

    pub fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.buf[y as usize * self.width + x as usize] = color;
        }
    }

    pub fn draw_diamond(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        for dy in -r..=r {
            let span = r - dy.abs();
            for dx in -span..=span {
                self.set_pixel(cx + dx, cy + dy, color);
            }
        }
    }

    /// Ring of the given radius, `thickness` px wide, centered on the radius.
    pub fn draw_circle(&mut self, center: Point, radius: f32, thickness: f32, color: u32) {
        if !(radius > 0.0) {
            return;
        }
        let half = thickness.max(1.0) / 2.0;
        let outer = (radius + half).ceil() as isize;
        let (cx, cy) = (center.x as isize, center.y as isize);
        for dy in -outer..=outer {
            for dx in -outer..=outer {
                let d = ((dx * dx + dy * dy) as f32).sqrt();
                if (d - radius).abs() <= half {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Text in the 3×5 bitmap font, each font pixel `scale` px square.
    pub fn draw_label(&mut self, text: &str, x: isize, y: isize, scale: usize, color: u32) {
        let s = scale.max(1) as isize;
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3isize {
                    if bits & (1 << (2 - col)) != 0 {
                        for py in 0..s {
                            for px in 0..s {
                                self.set_pixel(cx + col * s + px, y + row as isize * s + py, color);
                            }
                        }
                    }
                }
            }
            cx += 4 * s; // 3 wide + 1 gap
            if cx >= self.width as isize { break; }
        }
    }

    /// Landmarks, option rings and the live percentage.
    pub fn draw_hud(&mut self, hud: &Hud<'_>) {
        if hud.show_landmarks {
            if let Some(hand) = hud.hand {
                for (_, p) in hand.iter() {
                    self.draw_diamond(p.x as isize, p.y as isize, 2, LANDMARK_COLOR);
                }
            }
        }

        let state = hud.report.state;
        if hud.show_rings && state.shows_menu() {
            for o in hud.options {
                let Some(a) = o.anchor() else { continue };
                let active = hud.report.hovered == Some(o.kind) || state.committed() == Some(o.kind);
                let hover = if active { ACTIVE_RING } else { HOVER_RING };
                self.draw_circle(a, hud.hover_radius, 2.0, hover);
                self.draw_circle(a, hud.commit_radius, 3.0, COMMIT_RING);
            }
        }

        if let (Some(v), Some(c)) = (hud.report.control, hud.report.signal.finger_center) {
            let near = hud.report.signal.pinch_distance.map_or(false, |d| d <= hud.near_distance);
            let color = if near { PERCENT_NEAR } else { PERCENT_COLOR };
            let text = format!("{} {}%", v.kind.name(), v.percent as i32);
            self.draw_label(&text, c.x as isize, c.y as isize - 20, 3, color);
        }
    }

    pub fn draw_status(&mut self, status: &str, legend: &str) {
        self.fill_rect(0, STATUS_Y, self.width, STATUS_H, TEXT_BG);
        self.draw_label(status, 10, STATUS_Y as isize + 8, 2, 0xFFEEEEEE);
        self.draw_label(legend, 10, STATUS_Y as isize + 28, 1, 0xFF888888);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:  Window,
    canvas:  Canvas,
    spread:  f32,
    flipped: bool,
    hidden:  bool,
}

impl Visualizer {
    pub fn new() -> Result<Self, AppError> {
        let mut window = Window::new(
            "Pinch Menu — hand gesture overlay",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            canvas:  Canvas::new(WIN_W, WIN_H),
            spread:  SimInput::default().spread,
            flipped: false,
            hidden:  false,
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Sample mouse and keyboard into a [`SimInput`]; `None` means quit.
    ///
    /// | Input              | Hand                       |
    /// |--------------------|----------------------------|
    /// | mouse              | finger centroid            |
    /// | Space / left click | pinch (held)               |
    /// | wheel / Up / Down  | open-finger spread         |
    /// | F                  | flip palm (toggle)         |
    /// | H                  | hide hand (toggle)         |
    /// | Q / Esc            | quit                       |
    pub fn poll_input(&mut self) -> Option<SimInput> {
        if !self.window.is_open() { return None; }

        // Keys that trigger on first press only
        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        // Keys that repeat while held
        let held     = |k: Key| self.window.is_key_pressed(k, KeyRepeat::Yes);

        if one_shot(Key::Q) || one_shot(Key::Escape) {
            return None;
        }
        let flip = one_shot(Key::F);
        let hide = one_shot(Key::H);
        let up   = held(Key::Up);
        let down = held(Key::Down);

        if flip { self.flipped = !self.flipped; }
        if hide { self.hidden  = !self.hidden; }
        if up   { self.spread += SPREAD_STEP; }
        if down { self.spread -= SPREAD_STEP; }
        if let Some((_, dy)) = self.window.get_scroll_wheel() {
            self.spread += dy.signum() * SPREAD_STEP;
        }
        self.spread = self.spread.clamp(0.0, 1.0);

        let cursor = self
            .window
            .get_mouse_pos(MouseMode::Discard)
            .filter(|&(_, y)| y < FRAME_H as f32);
        let pinch = self.window.is_key_down(Key::Space) || self.window.get_mouse_down(MouseButton::Left);

        Some(SimInput { cursor, pinch, spread: self.spread, flipped: self.flipped, hidden: self.hidden })
    }

    /// Render one frame.
    pub fn render(&mut self, frame: &RgbImage, hud: &Hud<'_>, status: &str) {
        self.canvas.clear();
        self.canvas.blit_dimmed(frame, brightness_level(hud.brightness));
        self.canvas.draw_hud(hud);
        self.canvas.draw_status(
            status,
            "mouse=move  space/click=pinch  wheel/up/down=spread  f=flip palm  h=hide hand  q=quit",
        );
        self.window.update_with_buffer(&self.canvas.buf, WIN_W, WIN_H).ok();
    }
}

/// Brightness percent to the multiplier applied to the frame.
pub fn brightness_level(percent: f32) -> f32 {
    let p = if percent.is_nan() { 100.0 } else { percent.clamp(0.0, 100.0) };
    DIM_FLOOR + (1.0 - DIM_FLOOR) * p / 100.0
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

fn rgb(r: u8, g: u8, b: u8) -> u32 {
    0xFF000000 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0 - t) + cb as f32 * t).round() as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar, br) << 16) | (lerp(ag, bg) << 8) | lerp(ab, bb)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
