//! Error types for configuration and data loading.
//!
//! The simulation itself never fails: misses, unresolved planes and rejected
//! gestures are modelled as absence. Only data supplied from outside the core
//! (settings, ball records) can produce a `TossError`.

use thiserror::Error;

/// Errors surfaced when loading or validating configuration.
#[derive(Debug, Error)]
pub enum TossError {
    /// Safe zone bounds are inverted or empty.
    #[error("Invalid safe zone: left {left} must be < right {right} and bottom {bottom} < top {top}")]
    InvalidSafeZone {
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
    },

    /// A tuning value is out of range.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// A ball record could not be parsed.
    #[error("Malformed ball record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// Two records share a name.
    #[error("Duplicate ball name: {0}")]
    DuplicateBall(String),

    /// Lookup of a ball name that is not in the catalog.
    #[error("Unknown ball: {0}")]
    UnknownBall(String),

    /// Settings JSON failed to parse.
    #[error("Settings JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for `Result<T, TossError>`.
pub type TossResult<T> = Result<T, TossError>;
