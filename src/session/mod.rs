// Capture lifecycle: permission flow, buffer ownership, and the
// per-frame drive of the effect pipeline.

pub mod boot;

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::EffectConfig;
use crate::diagnostics::stats::{FrameStats, StatsSnapshot};
use crate::error::{EffectError, Result};
use crate::frame::{Frame, FrameGeometry};
use crate::pipeline;
use crate::pipeline::buffers::BufferSet;
use crate::pipeline::threshold::{DetailLevel, ThresholdPair, MAX_SENSITIVITY};

use boot::{Readiness, RuntimeBoot, StaticBoot};

/// Callback fired on the control surface when the detail label changes.
pub type LabelCallback = Arc<dyn Fn(DetailLevel) + Send + Sync>;

/// Callback for user-facing failure notices (e.g. permission denial).
pub type NoticeCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Lock-backed view of the composited output frame. The pixels stay valid
/// until the guard is dropped; the next `on_frame` call overwrites them.
pub type OutputGuard<'a> = MappedMutexGuard<'a, Frame>;

const PERMISSION_NOTICE: &str = "Camera permission required for HackerVision";

/// Externally visible lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Authorizing,
    Ready,
    Active,
    Suspended,
    Stopped,
}

/// Internal phase. `Active` and `Suspended` carry the buffer set, so a
/// session without buffers is unrepresentable.
enum Phase {
    Idle,
    Authorizing,
    Ready,
    Active(Box<BufferSet>),
    Suspended(Box<BufferSet>),
    Stopped,
}

impl Phase {
    fn state(&self) -> SessionState {
        match self {
            Self::Idle => SessionState::Idle,
            Self::Authorizing => SessionState::Authorizing,
            Self::Ready => SessionState::Ready,
            Self::Active(_) => SessionState::Active,
            Self::Suspended(_) => SessionState::Suspended,
            Self::Stopped => SessionState::Stopped,
        }
    }
}

/// Root of the effect core.
///
/// Owns the buffer set and drives the pipeline. The capture thread calls
/// `on_frame`; the control thread calls everything else. Frame processing
/// and lifecycle transitions serialise on the same mutex, so `stop()` is
/// ordered after any in-flight frame and never releases buffers that are
/// still being written. Sensitivity is a lone atomic read once per frame;
/// staleness by one frame is acceptable, torn values are impossible.
pub struct EffectController {
    config: EffectConfig,
    boot: Box<dyn RuntimeBoot>,
    phase: Mutex<Phase>,
    sensitivity: AtomicU8,
    stats: Mutex<FrameStats>,
    on_label: Option<LabelCallback>,
    on_notice: Option<NoticeCallback>,
}

impl EffectController {
    /// Create a controller with the default (static) boot strategy and no
    /// callbacks.
    pub fn new(config: EffectConfig) -> Self {
        Self::with_callbacks(config, Box::new(StaticBoot), None, None)
    }

    /// Create a controller with an explicit boot strategy and callbacks
    /// into the shell.
    pub fn with_callbacks(
        config: EffectConfig,
        boot: Box<dyn RuntimeBoot>,
        on_label: Option<LabelCallback>,
        on_notice: Option<NoticeCallback>,
    ) -> Self {
        let sensitivity = config.initial_sensitivity.min(MAX_SENSITIVITY);
        Self {
            config,
            boot,
            phase: Mutex::new(Phase::Idle),
            sensitivity: AtomicU8::new(sensitivity),
            stats: Mutex::new(FrameStats::new()),
            on_label,
            on_notice,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.phase.lock().state()
    }

    /// Resolution the core asks the capture source for. The source may
    /// substitute a different actual geometry at `start_session`.
    pub fn requested_resolution(&self) -> FrameGeometry {
        FrameGeometry::new(self.config.requested_width, self.config.requested_height)
    }

    /// True while the session holds an allocated buffer set.
    pub fn buffers_allocated(&self) -> bool {
        matches!(&*self.phase.lock(), Phase::Active(_) | Phase::Suspended(_))
    }

    /// Begin a capture attempt.
    ///
    /// Moves to `Ready` when the shell already holds camera permission,
    /// otherwise to `Authorizing` until the shell reports the permission
    /// result. If the host runtime is still initialising, the transition
    /// is deferred until the boot callback fires.
    pub fn request_start(self: &Arc<Self>, authorized: bool) -> Result<SessionState> {
        let this = Arc::clone(self);
        match self.boot.ensure_ready(Box::new(move || {
            if let Err(e) = this.begin_start(authorized) {
                warn!("deferred start failed: {e}");
            }
        })) {
            Readiness::Ready => self.begin_start(authorized),
            Readiness::Pending => {
                debug!("runtime initialising, start deferred");
                Ok(self.state())
            }
        }
    }

    fn begin_start(&self, authorized: bool) -> Result<SessionState> {
        let mut phase = self.phase.lock();
        match &*phase {
            Phase::Idle | Phase::Stopped => {
                *phase = if authorized {
                    Phase::Ready
                } else {
                    info!("requesting camera permission");
                    Phase::Authorizing
                };
                Ok(phase.state())
            }
            other => Err(EffectError::InvalidTransition {
                from: other.state(),
                event: "request_start",
            }),
        }
    }

    /// The shell reports that camera permission was granted.
    pub fn authorization_granted(&self) -> Result<()> {
        let mut phase = self.phase.lock();
        match &*phase {
            Phase::Authorizing => {
                *phase = Phase::Ready;
                Ok(())
            }
            other => Err(EffectError::InvalidTransition {
                from: other.state(),
                event: "authorization_granted",
            }),
        }
    }

    /// The shell reports that camera permission was denied.
    ///
    /// Terminal for this attempt: the session stops, the user-facing
    /// notice fires, and `PermissionDenied` is returned for the shell to
    /// propagate. The core never retries on its own.
    pub fn authorization_denied(&self) -> Result<()> {
        {
            let mut phase = self.phase.lock();
            match &*phase {
                Phase::Authorizing => *phase = Phase::Stopped,
                other => {
                    return Err(EffectError::InvalidTransition {
                        from: other.state(),
                        event: "authorization_denied",
                    })
                }
            }
        }
        warn!("camera permission denied");
        if let Some(notice) = &self.on_notice {
            notice(PERMISSION_NOTICE);
        }
        Err(EffectError::PermissionDenied)
    }

    /// Enable the session with the geometry the capture source actually
    /// chose. Allocates the buffer set; an allocation failure is fatal for
    /// the session and leaves the controller `Stopped`.
    pub fn start_session(&self, actual: FrameGeometry) -> Result<FrameGeometry> {
        let mut phase = self.phase.lock();
        match &*phase {
            Phase::Ready => {}
            other => {
                return Err(EffectError::InvalidTransition {
                    from: other.state(),
                    event: "start_session",
                })
            }
        }

        match BufferSet::allocate(actual) {
            Ok(buffers) => {
                info!("session started at {}x{}", actual.width, actual.height);
                self.stats.lock().reset();
                *phase = Phase::Active(Box::new(buffers));
                Ok(actual)
            }
            Err(e) => {
                error!("session start failed: {e}");
                *phase = Phase::Stopped;
                Err(e)
            }
        }
    }

    /// Temporarily pause frame processing, retaining buffers for cheap
    /// resumption.
    pub fn pause(&self) -> Result<()> {
        let mut phase = self.phase.lock();
        match std::mem::replace(&mut *phase, Phase::Stopped) {
            Phase::Active(buffers) => {
                debug!("session suspended");
                *phase = Phase::Suspended(buffers);
                Ok(())
            }
            other => {
                let from = other.state();
                *phase = other;
                Err(EffectError::InvalidTransition {
                    from,
                    event: "pause",
                })
            }
        }
    }

    /// Resume a suspended session. Buffers were retained, so no
    /// re-allocation happens.
    pub fn resume(&self) -> Result<()> {
        let mut phase = self.phase.lock();
        match std::mem::replace(&mut *phase, Phase::Stopped) {
            Phase::Suspended(buffers) => {
                debug!("session resumed");
                *phase = Phase::Active(buffers);
                Ok(())
            }
            other => {
                let from = other.state();
                *phase = other;
                Err(EffectError::InvalidTransition {
                    from,
                    event: "resume",
                })
            }
        }
    }

    /// Stop the session and release all buffers. Idempotent: calling stop
    /// twice, or before any frame was produced, does not fault. Waits for
    /// an in-flight `on_frame` call via the shared lock.
    pub fn stop(&self) {
        let mut phase = self.phase.lock();
        if !matches!(&*phase, Phase::Stopped) {
            info!("session stopped");
        }
        // Dropping the old phase releases the buffer set, if any.
        *phase = Phase::Stopped;
    }

    /// Process one input frame and return the composited output.
    ///
    /// Synchronous: the capture source must not deliver the next frame
    /// until the returned guard is dropped. The per-frame path performs no
    /// heap allocation. Defensive rejections (bad geometry) skip the
    /// frame with a warning and hand back the previous output, a blank
    /// black frame if nothing was composited yet.
    pub fn on_frame(&self, input: &Frame) -> Result<OutputGuard<'_>> {
        let started = Instant::now();
        let mut phase = self.phase.lock();
        let Phase::Active(buffers) = &mut *phase else {
            return Err(EffectError::InvalidTransition {
                from: phase.state(),
                event: "on_frame",
            });
        };

        let sensitivity = self.sensitivity.load(Ordering::Relaxed);
        let thresholds = ThresholdPair::from_sensitivity(sensitivity);
        match pipeline::process_frame(
            input,
            &thresholds,
            buffers,
            self.config.accent,
            self.config.scanline_tint,
            self.config.scanline_stride,
        ) {
            Ok(()) => self.stats.lock().record_frame(started.elapsed()),
            Err(e) => {
                warn!("frame skipped: {e}");
                self.stats.lock().record_skip();
            }
        }

        Ok(MutexGuard::map(phase, |p| match p {
            Phase::Active(buffers) => &mut buffers.output,
            // The lock has been held since the state check above.
            _ => unreachable!("phase changed while locked"),
        }))
    }

    /// Update the sensitivity (clamped to 0-100). Read by the capture
    /// thread before the next frame; pushes the detail label to the
    /// control surface when the value changes.
    pub fn set_sensitivity(&self, value: u8) {
        let value = value.min(MAX_SENSITIVITY);
        let previous = self.sensitivity.swap(value, Ordering::Relaxed);
        if previous != value {
            let level = DetailLevel::from_sensitivity(value);
            debug!("sensitivity {previous} -> {value} ({level})");
            if let Some(label) = &self.on_label {
                label(level);
            }
        }
    }

    /// Current sensitivity value.
    pub fn sensitivity(&self) -> u8 {
        self.sensitivity.load(Ordering::Relaxed)
    }

    /// Detail label for the current sensitivity.
    pub fn current_label(&self) -> DetailLevel {
        DetailLevel::from_sensitivity(self.sensitivity())
    }

    /// Snapshot of this session's frame statistics.
    pub fn diagnostics(&self) -> StatsSnapshot {
        self.stats.lock().snapshot()
    }
}

impl Default for EffectController {
    fn default() -> Self {
        Self::new(EffectConfig::default())
    }
}
