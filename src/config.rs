use serde::{Deserialize, Serialize};

/// Tunable parameters for the effect core.
///
/// Defaults reproduce the stock look: a 1280x720 capture request, the
/// slider starting at 33, pure-green edges on black and a dark-green
/// scanline tint on every 4th row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EffectConfig {
    /// Capture resolution requested from the source. The source may
    /// substitute a different actual geometry at session start.
    pub requested_width: u32,
    pub requested_height: u32,
    /// Sensitivity applied before the control surface sends a value (0-100).
    pub initial_sensitivity: u8,
    /// RGBA colour painted wherever an edge is detected.
    pub accent: [u8; 4],
    /// RGBA tint added (saturating) onto scanline rows.
    pub scanline_tint: [u8; 4],
    /// Row period of the scanline overlay; 0 disables it.
    pub scanline_stride: u32,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            requested_width: 1280,
            requested_height: 720,
            initial_sensitivity: 33,
            accent: [0, 255, 0, 255],
            scanline_tint: [0, 80, 0, 30],
            scanline_stride: 4,
        }
    }
}
