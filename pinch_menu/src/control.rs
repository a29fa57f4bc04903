//! Continuous control: finger distance in, volume/brightness out.
//!
//! The menu maps the live thumb–index distance through two independent
//! [`RangeMap`]s: a display curve for the on-screen percentage and a much
//! flatter curve (exponent 0.17 by default) for the raw volume value, so
//! the whole finger range stays usable.
//!
//! Sinks are fire-and-forget. A failing sink is logged and ignored; the
//! next committed frame retries.

use tracing::{info, warn};

use hand_signal::{RangeMap, SignalError};

use crate::error::SinkError;
use crate::options::OptionKind;

// ════════════════════════════════════════════════════════════════════════════
// ControlSink — OS volume / brightness setters
// ════════════════════════════════════════════════════════════════════════════

pub trait ControlSink {
    /// Raw range `set_volume` expects (e.g. dB, or 0–127 for MIDI).
    fn volume_range(&self) -> (f32, f32);
    fn set_volume(&mut self, raw: f32) -> Result<(), SinkError>;
    fn set_brightness(&mut self, percent: f32) -> Result<(), SinkError>;
}

impl<S: ControlSink + ?Sized> ControlSink for Box<S> {
    fn volume_range(&self) -> (f32, f32) { (**self).volume_range() }
    fn set_volume(&mut self, raw: f32) -> Result<(), SinkError> { (**self).set_volume(raw) }
    fn set_brightness(&mut self, percent: f32) -> Result<(), SinkError> { (**self).set_brightness(percent) }
}

// ════════════════════════════════════════════════════════════════════════════
// Mapping
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlConfig {
    /// Finger distance (px) mapped onto the full control range.
    pub input_range:      (f32, f32),
    /// Curve for the displayed percentage; user-tunable.
    pub display_exponent: f32,
    /// Curve for the raw volume value.
    pub volume_exponent:  f32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        ControlConfig {
            input_range:      (40.0, 300.0),
            display_exponent: 1.0,
            volume_exponent:  0.17,
        }
    }
}

/// The two curves, validated once at construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlMapping {
    pub display: RangeMap,
    pub volume:  RangeMap,
}

impl ControlMapping {
    pub fn new(cfg: &ControlConfig, volume_range: (f32, f32)) -> Result<Self, SignalError> {
        Ok(ControlMapping {
            display: RangeMap::new(cfg.input_range, (0.0, 100.0), cfg.display_exponent)?,
            volume:  RangeMap::new(cfg.input_range, volume_range, cfg.volume_exponent)?,
        })
    }
}

/// One frame's committed control output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlValue {
    pub kind:    OptionKind,
    /// Display percentage, `[0, 100]`.
    pub percent: f32,
    /// Value handed to the sink.
    pub raw:     f32,
}

/// Map `distance` for `kind` and push it into `sink`, swallowing failures.
pub fn apply_control<S: ControlSink + ?Sized>(
    sink:     &mut S,
    mapping:  &ControlMapping,
    kind:     OptionKind,
    distance: f32,
) -> ControlValue {
    let percent = mapping.display.map(distance);
    let (raw, result) = match kind {
        OptionKind::Volume => {
            let raw = mapping.volume.map(distance);
            (raw, sink.set_volume(raw))
        }
        OptionKind::Brightness => (percent, sink.set_brightness(percent)),
    };
    if let Err(e) = result {
        warn!(option = kind.name(), error = %e, "control sink failed");
    }
    ControlValue { kind, percent, raw }
}

// ════════════════════════════════════════════════════════════════════════════
// RecordingSink — headless / test sink
// ════════════════════════════════════════════════════════════════════════════

/// Remembers every call; optionally fails them all.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    pub volumes:      Vec<f32>,
    pub brightnesses: Vec<f32>,
    pub fail:         bool,
}

impl ControlSink for RecordingSink {
    fn volume_range(&self) -> (f32, f32) { (-65.25, 0.0) }

    fn set_volume(&mut self, raw: f32) -> Result<(), SinkError> {
        if self.fail { return Err(SinkError::Unavailable("recording sink set to fail".into())); }
        self.volumes.push(raw);
        Ok(())
    }

    fn set_brightness(&mut self, percent: f32) -> Result<(), SinkError> {
        if self.fail { return Err(SinkError::Unavailable("recording sink set to fail".into())); }
        self.brightnesses.push(percent);
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MidiOut — abstraction over midir / null
// ════════════════════════════════════════════════════════════════════════════

trait MidiOut {
    fn control_change(&mut self, channel: u8, controller: u8, value: u8) -> Result<(), SinkError>;
}

// ── midir backend ─────────────────────────────────────────────────────────

struct MidirOut {
    conn: midir::MidiOutputConnection,
}

impl MidiOut for MidirOut {
    fn control_change(&mut self, channel: u8, controller: u8, value: u8) -> Result<(), SinkError> {
        self.conn.send(&[0xB0 | (channel & 0x0F), controller & 0x7F, value & 0x7F])?;
        Ok(())
    }
}

// ── null backend (used when no MIDI port is available) ────────────────────

struct NullOut;

impl MidiOut for NullOut {
    fn control_change(&mut self, _ch: u8, _cc: u8, _v: u8) -> Result<(), SinkError> { Ok(()) }
}

/// Try to open the first available MIDI output port.
/// Falls back to `NullOut` with a warning if none found.
fn open_midi_output() -> Box<dyn MidiOut> {
    let midi_out = match midir::MidiOutput::new("pinch_menu_volume") {
        Ok(m)  => m,
        Err(e) => {
            warn!(error = %e, "MIDI init failed, volume changes will be dropped");
            return Box::new(NullOut);
        }
    };

    let ports = midi_out.ports();
    let Some(port) = ports.first() else {
        warn!("no MIDI output ports found, volume changes will be dropped");
        return Box::new(NullOut);
    };

    let name = midi_out.port_name(port).unwrap_or_else(|_| "Unknown".to_string());
    match midi_out.connect(port, "pinch-menu-volume") {
        Ok(conn) => {
            info!(port = %name, "volume sink connected");
            Box::new(MidirOut { conn })
        }
        Err(e) => {
            warn!(port = %name, error = %e, "MIDI connect failed, volume changes will be dropped");
            Box::new(NullOut)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MidiVolumeSink — what the windowed app drives
// ════════════════════════════════════════════════════════════════════════════

const CC_CHANNEL_VOLUME: u8 = 7;

/// Volume goes out as MIDI channel volume (CC 7); brightness is kept here and
/// applied by the visualizer as a dimming factor on the rendered frame.
pub struct MidiVolumeSink {
    midi:        Box<dyn MidiOut>,
    channel:     u8,
    last_volume: Option<u8>,
    brightness:  f32,
}

impl MidiVolumeSink {
    /// Connect to the first MIDI output port, if any.
    pub fn connect(channel: u8) -> Self {
        MidiVolumeSink::with_output(open_midi_output(), channel)
    }

    /// A sink that drops volume changes (no MIDI at all).
    pub fn offline() -> Self {
        MidiVolumeSink::with_output(Box::new(NullOut), 0)
    }

    fn with_output(midi: Box<dyn MidiOut>, channel: u8) -> Self {
        MidiVolumeSink { midi, channel: channel & 0x0F, last_volume: None, brightness: 100.0 }
    }

    /// Current screen brightness, percent.
    pub fn brightness(&self) -> f32 { self.brightness }

    pub fn last_volume(&self) -> Option<u8> { self.last_volume }
}

impl ControlSink for MidiVolumeSink {
    fn volume_range(&self) -> (f32, f32) { (0.0, 127.0) }

    fn set_volume(&mut self, raw: f32) -> Result<(), SinkError> {
        let value = raw.round().clamp(0.0, 127.0) as u8;
        if self.last_volume == Some(value) {
            return Ok(());
        }
        self.midi.control_change(self.channel, CC_CHANNEL_VOLUME, value)?;
        self.last_volume = Some(value);
        Ok(())
    }

    fn set_brightness(&mut self, percent: f32) -> Result<(), SinkError> {
        self.brightness = percent.clamp(0.0, 100.0);
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
