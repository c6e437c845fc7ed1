//! Environment bootstrap seam.
//!
//! Some hosts link the native vision runtime statically and are ready
//! immediately; others initialise it through an async manager and report
//! readiness later via a callback. The controller depends on this one
//! interface and does not care which strategy the host uses.

/// Callback fired when a deferred runtime becomes ready.
pub type OnReady = Box<dyn FnOnce() + Send>;

/// Result of a readiness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The runtime is usable right now; `on_ready` will not be called.
    Ready,
    /// Initialisation is in flight; `on_ready` fires when it completes,
    /// possibly on another thread.
    Pending,
}

/// Strategy for ensuring the host runtime is initialised.
pub trait RuntimeBoot: Send + Sync {
    fn ensure_ready(&self, on_ready: OnReady) -> Readiness;
}

/// Statically linked runtime, always ready. The default strategy.
pub struct StaticBoot;

impl RuntimeBoot for StaticBoot {
    fn ensure_ready(&self, _on_ready: OnReady) -> Readiness {
        Readiness::Ready
    }
}
