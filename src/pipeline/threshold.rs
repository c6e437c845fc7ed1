use std::fmt;

use crate::error::{EffectError, Result};

/// Upper bound of the sensitivity scale.
pub const MAX_SENSITIVITY: u8 = 100;

/// Low/high hysteresis cutoffs in the gradient-magnitude domain.
///
/// `high` is always derived as 2.5x `low`, so `low <= high` holds by
/// construction when mapping from sensitivity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdPair {
    low: f64,
    high: f64,
}

impl ThresholdPair {
    /// Build a pair from explicit cutoffs, rejecting `low > high`.
    pub fn new(low: f64, high: f64) -> Result<Self> {
        if low > high {
            return Err(EffectError::InvalidThresholds { low, high });
        }
        Ok(Self { low, high })
    }

    /// Map a sensitivity value (0-100, clamped) to a threshold pair.
    ///
    /// Inverted scale: higher sensitivity means a lower threshold, so more
    /// detail is retained.
    pub fn from_sensitivity(sensitivity: u8) -> Self {
        let normalized = f64::from(sensitivity.min(MAX_SENSITIVITY)) / 100.0;
        let low = 20.0 + 180.0 * (1.0 - normalized);
        Self {
            low,
            high: low * 2.5,
        }
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }
}

/// Discrete detail label shown by the control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailLevel {
    Architectural,
    Structural,
    Detailed,
    Maximum,
}

impl DetailLevel {
    /// Map a sensitivity value to its label band. Lower bounds inclusive,
    /// upper bounds exclusive.
    pub fn from_sensitivity(sensitivity: u8) -> Self {
        match sensitivity {
            0..=24 => Self::Architectural,
            25..=49 => Self::Structural,
            50..=74 => Self::Detailed,
            _ => Self::Maximum,
        }
    }

    /// Uppercase label text.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Architectural => "ARCHITECTURAL",
            Self::Structural => "STRUCTURAL",
            Self::Detailed => "DETAILED",
            Self::Maximum => "MAXIMUM",
        }
    }

    /// Full line for the scan-depth readout.
    pub fn display_line(self) -> String {
        format!("SCAN DEPTH: {}", self.as_str())
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
