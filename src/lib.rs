//! Real-time edge-highlight video effect core.
//!
//! Takes camera frames, runs a Canny-style edge detector over them, and
//! composites the result as bright accent edges on black with a periodic
//! scanline overlay. [`EffectController`] is the entry point: the host
//! shell drives its lifecycle (permission flow, session start and stop)
//! and feeds it frames from the capture thread.
//!
//! The core is deliberately free of any capture or display backend. The
//! shell owns the camera and the screen; this crate owns the pixels in
//! between.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod frame;
pub mod pipeline;
pub mod session;

pub use config::EffectConfig;
pub use diagnostics::stats::StatsSnapshot;
pub use error::{EffectError, Result};
pub use frame::{Frame, FrameGeometry, PixelFormat};
pub use pipeline::threshold::{DetailLevel, ThresholdPair};
pub use session::{EffectController, SessionState};
