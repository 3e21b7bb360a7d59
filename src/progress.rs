//! Progress reporting.
//!
//! Sampling never prints anything itself. Presentation layers (a terminal
//! progress bar, a log line per batch, a GUI) plug in through
//! [`ProgressCallback`], which the sampler invokes as frames are read.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use frame_sampler::{FrameSampler, ProgressCallback, ProgressInfo, SampleConfig};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("{pct:.1}% read, {} frames saved", info.saved);
//!         }
//!     }
//! }
//!
//! let config = SampleConfig::new()
//!     .with_progress(Arc::new(PrintProgress))
//!     .with_batch_size(100);
//! FrameSampler::new(config)?.run("input.mp4", "frames")?;
//! # Ok::<(), frame_sampler::SamplerError>(())
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

/// A snapshot of sampling progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Frames read from the source so far (kept or skipped).
    pub current: u64,
    /// Frames written so far.
    pub saved: u64,
    /// Frames expected to be read, if the source reports a frame count.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time since the run started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
    /// Source index of the frame that triggered this report.
    pub current_frame: Option<u64>,
    /// Presentation timestamp of that frame.
    pub current_timestamp: Option<Duration>,
}

/// Observer notified while frames are processed.
///
/// Callbacks observe; they cannot alter which frames are kept.
pub trait ProgressCallback: Send + Sync {
    /// Called every `batch_size` frames and once when the run ends.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all notifications. Used when no observer is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Tracks timing and decides when to notify the observer.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    total: Option<u64>,
    current: u64,
    saved: u64,
    batch_size: u64,
    start_time: Instant,
    items_since_last_report: u64,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        total: Option<u64>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            total,
            current: 0,
            saved: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            items_since_last_report: 0,
        }
    }

    /// Record one processed frame.
    pub(crate) fn advance(
        &mut self,
        saved: u64,
        frame_number: Option<u64>,
        timestamp: Option<Duration>,
    ) {
        self.current += 1;
        self.saved = saved;
        self.items_since_last_report += 1;

        if self.items_since_last_report >= self.batch_size {
            self.report(frame_number, timestamp);
            self.items_since_last_report = 0;
        }
    }

    /// Unconditionally emit a final report.
    pub(crate) fn finish(&mut self) {
        self.report(None, None);
    }

    fn report(&self, frame_number: Option<u64>, timestamp: Option<Duration>) {
        let elapsed = self.start_time.elapsed();

        let percentage = self
            .total
            .filter(|&t| t > 0)
            .map(|t| ((self.current as f32 / t as f32) * 100.0).min(100.0));

        let estimated_remaining = if self.current > 0 {
            self.total.map(|t| {
                let remaining = t.saturating_sub(self.current);
                elapsed.mul_f64(remaining as f64 / self.current as f64)
            })
        } else {
            None
        };

        let info = ProgressInfo {
            current: self.current,
            saved: self.saved,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
            current_frame: frame_number,
            current_timestamp: timestamp,
        };

        self.callback.on_progress(&info);
    }
}
