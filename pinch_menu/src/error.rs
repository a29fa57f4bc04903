use hand_signal::SignalError;
use icon_overlay::OverlayError;
use thiserror::Error;

/// Configuration problems found while building a [`MenuController`].
///
/// [`MenuController`]: crate::menu::MenuController
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MenuError {
    #[error("invalid control mapping: {0}")]
    Mapping(#[from] SignalError),
}

/// A continuous-control sink failed. Always logged and swallowed by the
/// menu; the next committed frame simply tries again.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("MIDI send failed: {0}")]
    Midi(#[from] midir::SendError),

    #[error("control sink unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("window: {0}")]
    Window(#[from] minifb::Error),

    #[error(transparent)]
    Menu(#[from] MenuError),

    #[error(transparent)]
    Icon(#[from] OverlayError),

    #[error("landmark provider: {0}")]
    Provider(String),
}
