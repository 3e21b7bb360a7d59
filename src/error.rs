//! Error types for the `frame-sampler` crate.
//!
//! [`SamplerError`] is the single error type returned by every fallible
//! operation. Only [`SamplerError::FileOpen`] and
//! [`SamplerError::NoVideoStream`] can occur before output is produced; a
//! decode failure in the middle of a stream is never an error and simply
//! ends the run early.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all sampling operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SamplerError {
    /// The video could not be opened or probed.
    #[error("Failed to open video at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`VideoSource::open`](crate::VideoSource::open).
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file opened but carries no decodable video stream.
    #[error("No video stream found in {0}")]
    NoVideoStream(PathBuf),

    /// A frame skip of zero was configured.
    #[error("Frame skip must be greater than zero")]
    InvalidFrameSkip,

    /// A frame cap of zero was configured.
    #[error("Maximum frame count must be greater than zero")]
    InvalidMaxFrames,

    /// A resize target with a zero dimension was configured.
    #[error("Invalid target size {width}x{height}: both dimensions must be non-zero")]
    InvalidTargetSize {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// An image format other than `jpg` or `png` was requested.
    #[error("Unsupported image format: {0} (expected jpg or png)")]
    UnsupportedImageFormat(String),

    /// A run configuration file could not be read or parsed.
    #[error("Invalid configuration file {path}: {reason}")]
    ConfigFile {
        /// Path of the configuration file.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// A decoded frame could not be turned into an image.
    #[error("Failed to convert decoded frame: {0}")]
    FrameConversion(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    /// An I/O error while creating directories or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// An error from the `image` crate while encoding a frame.
    #[error("Image processing error: {0}")]
    Image(#[from] ImageError),

    /// The timestamp log could not be written.
    #[error("Timestamp log error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<FfmpegError> for SamplerError {
    fn from(error: FfmpegError) -> Self {
        SamplerError::Ffmpeg(error.to_string())
    }
}
