use thiserror::Error;

use crate::session::SessionState;

/// Effect core errors.
#[derive(Debug, Error)]
pub enum EffectError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("invalid frame geometry: {0}")]
    InvalidFrameGeometry(String),

    #[error("invalid thresholds: low {low} > high {high}")]
    InvalidThresholds { low: f64, high: f64 },

    #[error("buffer allocation failed: {0}")]
    AllocationFailure(String),

    #[error("{event} not allowed in state {from:?}")]
    InvalidTransition {
        from: SessionState,
        event: &'static str,
    },
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, EffectError>;
