//! Video stream metadata.
//!
//! [`VideoInfo`] is read once when a [`VideoSource`](crate::VideoSource) is
//! opened. The frame count comes from the container when it records one and
//! is otherwise estimated from duration and frame rate, so it may be zero or
//! approximate; sampling never depends on it.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;

use serde::Serialize;

/// Metadata for the video stream being sampled.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[must_use]
pub struct VideoInfo {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second (approximate for variable-frame-rate content, 0 when
    /// unknown).
    pub frames_per_second: f64,
    /// Reported total number of frames. May be 0 for some containers.
    pub frame_count: u64,
    /// Codec name (e.g. `"h264"`).
    pub codec: String,
    /// Container-level duration, `Duration::ZERO` when unknown.
    pub duration: Duration,
}

impl VideoInfo {
    /// Duration derived from the frame count and frame rate.
    pub fn duration_seconds(&self) -> f64 {
        if self.frames_per_second > 0.0 {
            self.frame_count as f64 / self.frames_per_second
        } else {
            0.0
        }
    }

    /// The frame count, if the source reported a usable one.
    pub fn known_frame_count(&self) -> Option<u64> {
        Some(self.frame_count).filter(|&count| count > 0)
    }
}

impl Display for VideoInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{:.2} FPS, {} frames (~{:.2} sec), {}x{} [{}]",
            self.frames_per_second,
            self.frame_count,
            self.duration_seconds(),
            self.width,
            self.height,
            self.codec,
        )
    }
}
