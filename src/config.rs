//! Sampling configuration.
//!
//! [`SampleConfig`] is an immutable value built with `with_*` methods and
//! passed to [`FrameSampler::new`](crate::FrameSampler::new). It carries the
//! sampling knobs (frame skip, read cap), the output settings (resize target,
//! image format, timestamp log, image sub-directory) and the optional
//! progress observer.
//!
//! # Example
//!
//! ```
//! use frame_sampler::{ImageFormat, SampleConfig};
//!
//! let config = SampleConfig::new()
//!     .with_frame_skip(15)
//!     .with_max_frames(Some(1000))
//!     .with_square_size(640)
//!     .with_image_format(ImageFormat::Png)
//!     .with_timestamps(true);
//!
//! assert!(config.keeps(30));
//! assert!(!config.keeps(31));
//! assert!(config.validate().is_ok());
//! ```

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::SamplerError;
use crate::progress::{NoOpProgress, ProgressCallback};

/// Frame skip used when none is configured.
pub const DEFAULT_FRAME_SKIP: u64 = 10;

/// Encoding used for written frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// JPEG, written with a `.jpg` extension. This is the default.
    #[default]
    #[serde(alias = "jpeg")]
    Jpg,
    /// Lossless PNG.
    Png,
}

impl ImageFormat {
    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpg => "jpg",
            ImageFormat::Png => "png",
        }
    }

    pub(crate) fn to_image_format(self) -> image::ImageFormat {
        match self {
            ImageFormat::Jpg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
        }
    }
}

impl Display for ImageFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = SamplerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(ImageFormat::Jpg),
            "png" => Ok(ImageFormat::Png),
            _ => Err(SamplerError::UnsupportedImageFormat(value.to_string())),
        }
    }
}

/// Exact output dimensions for kept frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetSize {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

impl TargetSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A `size`×`size` target.
    pub fn square(size: u32) -> Self {
        Self::new(size, size)
    }
}

impl Display for TargetSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Configuration for one sampling run.
///
/// Frame selection uses a single counter over frames *read*: a frame is kept
/// when `read_index % frame_skip == 0`, and reading stops once `max_frames`
/// frames have been read. The cap therefore bounds frames read, not frames
/// kept; at most `ceil(max_frames / frame_skip)` frames are written.
#[derive(Clone)]
pub struct SampleConfig {
    pub(crate) frame_skip: u64,
    pub(crate) max_frames: Option<u64>,
    pub(crate) target_size: Option<TargetSize>,
    pub(crate) image_format: ImageFormat,
    pub(crate) record_timestamps: bool,
    pub(crate) image_subdirectory: Option<PathBuf>,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) batch_size: u64,
}

impl Debug for SampleConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SampleConfig")
            .field("frame_skip", &self.frame_skip)
            .field("max_frames", &self.max_frames)
            .field("target_size", &self.target_size)
            .field("image_format", &self.image_format)
            .field("record_timestamps", &self.record_timestamps)
            .field("image_subdirectory", &self.image_subdirectory)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleConfig {
    /// Defaults: every 10th frame, no cap, native resolution, JPEG, no
    /// timestamp log, no progress observer.
    pub fn new() -> Self {
        Self {
            frame_skip: DEFAULT_FRAME_SKIP,
            max_frames: None,
            target_size: None,
            image_format: ImageFormat::default(),
            record_timestamps: false,
            image_subdirectory: None,
            progress: Arc::new(NoOpProgress),
            batch_size: 1,
        }
    }

    /// Keep every `frame_skip`-th frame. Zero is rejected by
    /// [`validate`](SampleConfig::validate).
    #[must_use]
    pub fn with_frame_skip(mut self, frame_skip: u64) -> Self {
        self.frame_skip = frame_skip;
        self
    }

    /// Stop after reading this many frames. `None` reads to end of stream.
    #[must_use]
    pub fn with_max_frames(mut self, max_frames: Option<u64>) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Resize every kept frame to exactly `width`×`height`.
    #[must_use]
    pub fn with_target_size(mut self, width: u32, height: u32) -> Self {
        self.target_size = Some(TargetSize::new(width, height));
        self
    }

    /// Resize every kept frame to a `size`×`size` square.
    #[must_use]
    pub fn with_square_size(mut self, size: u32) -> Self {
        self.target_size = Some(TargetSize::square(size));
        self
    }

    /// Keep the source resolution.
    #[must_use]
    pub fn with_native_size(mut self) -> Self {
        self.target_size = None;
        self
    }

    #[must_use]
    pub fn with_image_format(mut self, format: ImageFormat) -> Self {
        self.image_format = format;
        self
    }

    /// Write `timestamps.csv` alongside the frames.
    #[must_use]
    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.record_timestamps = enabled;
        self
    }

    /// Write images into `output_dir/<subdirectory>` instead of
    /// `output_dir` itself. The timestamp log stays in `output_dir`.
    #[must_use]
    pub fn with_image_subdirectory<P: Into<PathBuf>>(mut self, subdirectory: Option<P>) -> Self {
        self.image_subdirectory = subdirectory.map(Into::into);
        self
    }

    /// Attach a progress observer.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Notify the observer every `size` frames read. Clamped to at least 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn frame_skip(&self) -> u64 {
        self.frame_skip
    }

    pub fn max_frames(&self) -> Option<u64> {
        self.max_frames
    }

    pub fn target_size(&self) -> Option<TargetSize> {
        self.target_size
    }

    pub fn image_format(&self) -> ImageFormat {
        self.image_format
    }

    pub fn records_timestamps(&self) -> bool {
        self.record_timestamps
    }

    pub fn image_subdirectory(&self) -> Option<&Path> {
        self.image_subdirectory.as_deref()
    }

    /// Whether the frame at `read_index` is written.
    pub fn keeps(&self, read_index: u64) -> bool {
        self.frame_skip > 0 && read_index % self.frame_skip == 0
    }

    /// Whether reading must stop after `frames_read` frames.
    pub fn cap_reached(&self, frames_read: u64) -> bool {
        self.max_frames.is_some_and(|cap| frames_read >= cap)
    }

    /// Directory kept frames are written to for a given output directory.
    pub fn image_dir(&self, output_dir: &Path) -> PathBuf {
        match &self.image_subdirectory {
            Some(subdirectory) => output_dir.join(subdirectory),
            None => output_dir.to_path_buf(),
        }
    }

    /// Check the configuration before any file is touched.
    ///
    /// # Errors
    ///
    /// - [`SamplerError::InvalidFrameSkip`] for a frame skip of zero.
    /// - [`SamplerError::InvalidMaxFrames`] for a cap of zero.
    /// - [`SamplerError::InvalidTargetSize`] for a zero target dimension.
    pub fn validate(&self) -> Result<(), SamplerError> {
        if self.frame_skip == 0 {
            return Err(SamplerError::InvalidFrameSkip);
        }
        if self.max_frames == Some(0) {
            return Err(SamplerError::InvalidMaxFrames);
        }
        if let Some(size) = self.target_size {
            if size.width == 0 || size.height == 0 {
                return Err(SamplerError::InvalidTargetSize {
                    width: size.width,
                    height: size.height,
                });
            }
        }
        Ok(())
    }
}
