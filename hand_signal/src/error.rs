use thiserror::Error;

/// Errors raised while building signal-processing configuration or
/// ingesting detector output.
///
/// Per-frame processing never fails: a missing or odd hand is just
/// "no gesture". These only surface at construction time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    #[error("input range is degenerate: min and max are both {0}")]
    DegenerateRange(f32),

    #[error("range bound is not finite: ({0}, {1})")]
    NonFiniteRange(f32, f32),

    #[error("exponent must be finite and positive, got {0}")]
    InvalidExponent(f32),

    #[error("expected {expected} landmarks, got {actual}")]
    LandmarkCount { expected: usize, actual: usize },
}
