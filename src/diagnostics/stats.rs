use serde::Serialize;
use std::time::{Duration, Instant};

/// Collects frame statistics for one effect session.
///
/// Recording is allocation-free so it is safe to call from the per-frame
/// path.
pub struct FrameStats {
    frame_count: u64,
    skip_count: u64,
    start_time: Instant,
    last_frame_us: u64,
}

/// Snapshot of frame stats for serialisation to the control surface.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub fps: f64,
    pub frame_count: u64,
    pub skip_count: u64,
    pub skip_rate: f64,
    pub last_frame_ms: f64,
}

impl FrameStats {
    /// Create new stats with zeroed counters.
    pub fn new() -> Self {
        Self {
            frame_count: 0,
            skip_count: 0,
            start_time: Instant::now(),
            last_frame_us: 0,
        }
    }

    /// Record one fully processed frame and how long it took.
    pub fn record_frame(&mut self, elapsed: Duration) {
        self.frame_count += 1;
        self.last_frame_us = elapsed.as_micros() as u64;
    }

    /// Record a frame skipped by a defensive check.
    pub fn record_skip(&mut self) {
        self.skip_count += 1;
    }

    /// Processed frames per second since the session started.
    pub fn fps(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed < 0.001 {
            return 0.0;
        }
        self.frame_count as f64 / elapsed
    }

    /// Skipped frames as a percentage of all delivered frames (0.0 - 100.0).
    pub fn skip_rate(&self) -> f64 {
        let total = self.frame_count + self.skip_count;
        if total == 0 {
            return 0.0;
        }
        (self.skip_count as f64 / total as f64) * 100.0
    }

    /// Reset all counters for a new session.
    pub fn reset(&mut self) {
        self.frame_count = 0;
        self.skip_count = 0;
        self.start_time = Instant::now();
        self.last_frame_us = 0;
    }

    /// Take a serialisable snapshot.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            fps: self.fps(),
            frame_count: self.frame_count,
            skip_count: self.skip_count,
            skip_rate: self.skip_rate(),
            last_frame_ms: self.last_frame_us as f64 / 1000.0,
        }
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}
