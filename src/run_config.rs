//! File-based run configuration.
//!
//! A [`RunConfig`] describes a complete run (input, output, sampling knobs)
//! as JSON so that fixed, repeatable jobs live in a file instead of in
//! source code or long command lines:
//!
//! ```json
//! {
//!   "video": "data/raw/camera_1.mp4",
//!   "output": "data/processed/camera_1",
//!   "frame_skip": 10,
//!   "max_frames": null,
//!   "save_timestamps": true,
//!   "images_subdir": "images"
//! }
//! ```
//!
//! Missing fields fall back to [`RunConfig::default`]; unknown fields are
//! rejected.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_FRAME_SKIP, ImageFormat, SampleConfig};
use crate::error::SamplerError;

/// Output directory used when none is given.
pub const DEFAULT_OUTPUT_DIR: &str = "extracted_frames";

/// Square resize target of the flag-driven command line.
pub const DEFAULT_IMG_SIZE: u32 = 640;

/// A serialisable description of one sampling run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Input video. Required before the run can start.
    pub video: Option<PathBuf>,
    /// Output directory.
    pub output: PathBuf,
    /// Keep every Nth frame.
    pub frame_skip: u64,
    /// Cap on frames read.
    pub max_frames: Option<u64>,
    /// Square resize target; `None` keeps the source resolution.
    pub img_size: Option<u32>,
    /// Encoding of written frames.
    pub image_format: ImageFormat,
    /// Write `timestamps.csv`.
    pub save_timestamps: bool,
    /// Sub-directory of `output` that receives the images.
    pub images_subdir: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            video: None,
            output: PathBuf::from(DEFAULT_OUTPUT_DIR),
            frame_skip: DEFAULT_FRAME_SKIP,
            max_frames: None,
            img_size: None,
            image_format: ImageFormat::Jpg,
            save_timestamps: false,
            images_subdir: None,
        }
    }
}

impl RunConfig {
    /// Defaults of the command line when no file is given: frames are
    /// resized to a 640×640 square.
    pub fn command_line_defaults() -> Self {
        Self {
            img_size: Some(DEFAULT_IMG_SIZE),
            ..Self::default()
        }
    }

    /// Read and parse a JSON run configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::ConfigFile`] if the file cannot be read or is
    /// not a valid configuration.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SamplerError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|error| SamplerError::ConfigFile {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })?;
        let config = Self::from_json(&raw).map_err(|error| match error {
            SamplerError::ConfigFile { reason, .. } => SamplerError::ConfigFile {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })?;
        log::info!("Loaded run configuration from {}", path.display());
        Ok(config)
    }

    /// Parse a JSON run configuration from a string.
    pub fn from_json(raw: &str) -> Result<Self, SamplerError> {
        serde_json::from_str(raw).map_err(|error| SamplerError::ConfigFile {
            path: PathBuf::new(),
            reason: error.to_string(),
        })
    }

    /// Serialise to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SamplerError> {
        serde_json::to_string_pretty(self).map_err(|error| SamplerError::ConfigFile {
            path: PathBuf::new(),
            reason: error.to_string(),
        })
    }

    /// Build the sampling configuration this run describes.
    ///
    /// The progress observer is left at its default; attach one with
    /// [`SampleConfig::with_progress`].
    pub fn to_sample_config(&self) -> SampleConfig {
        let config = SampleConfig::new()
            .with_frame_skip(self.frame_skip)
            .with_max_frames(self.max_frames)
            .with_image_format(self.image_format)
            .with_timestamps(self.save_timestamps)
            .with_image_subdirectory(self.images_subdir.clone());
        match self.img_size {
            Some(size) => config.with_square_size(size),
            None => config.with_native_size(),
        }
    }
}
