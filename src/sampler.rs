//! Deterministic frame sampling.
//!
//! [`FrameSampler`] reads a [`FrameSource`] front to back, keeps every
//! `frame_skip`-th frame, optionally resizes it, hands it to an
//! [`ImageSink`] and optionally logs its timestamp. Kept frames are numbered
//! `0..N` with no gaps, in stream order.
//!
//! # Example
//!
//! ```no_run
//! use frame_sampler::{FrameSampler, ImageFormat, SampleConfig};
//!
//! let config = SampleConfig::new()
//!     .with_frame_skip(10)
//!     .with_square_size(640)
//!     .with_image_format(ImageFormat::Jpg)
//!     .with_timestamps(true);
//!
//! let result = FrameSampler::new(config)?.run("cctv.mp4", "extracted_frames")?;
//! println!("{result}");
//! # Ok::<(), frame_sampler::SamplerError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::DynamicImage;
use image::imageops::FilterType;
use serde::Serialize;

use crate::config::{SampleConfig, TargetSize};
use crate::error::SamplerError;
use crate::metadata::VideoInfo;
use crate::progress::ProgressTracker;
use crate::sink::{DirectorySink, ImageSink};
use crate::source::{FrameSource, VideoSource};
use crate::timestamps::{TIMESTAMP_FILE_NAME, TimestampLog};

/// Interpolation used for every resize.
const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// One kept frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameRecord {
    /// Position among kept frames, starting at 0.
    pub saved_index: u64,
    /// Position in the source stream, starting at 0.
    pub source_frame_index: u64,
    /// Presentation timestamp, recorded only when the timestamp log is on.
    pub timestamp_ms: Option<f64>,
    /// Where the image was written.
    pub path: PathBuf,
}

/// Outcome of a sampling run.
#[derive(Debug, Clone, Serialize)]
pub struct SampleResult {
    /// Frames written.
    pub saved_count: u64,
    /// Frames read from the source, kept or not.
    pub read_count: u64,
    /// Frame count the source reported up front (0 when unknown).
    pub total_frames: u64,
    /// Output directory of the run.
    pub output_dir: PathBuf,
    /// Directory holding the images.
    pub image_dir: PathBuf,
    /// Path of the timestamp log, when one was written.
    pub timestamp_log: Option<PathBuf>,
    /// Every kept frame, in save order.
    pub records: Vec<FrameRecord>,
}

impl Display for SampleResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "Extracted {} frames to {}",
            self.saved_count,
            self.output_dir.display()
        )
    }
}

/// Samples frames from a video according to a [`SampleConfig`].
#[derive(Debug, Clone)]
pub struct FrameSampler {
    config: SampleConfig,
}

impl FrameSampler {
    /// Create a sampler, rejecting invalid configurations up front.
    ///
    /// # Errors
    ///
    /// Any error from [`SampleConfig::validate`].
    pub fn new(config: SampleConfig) -> Result<Self, SamplerError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SampleConfig {
        &self.config
    }

    /// Sample a video file into `output_dir`.
    ///
    /// The video is opened before anything is written, so an unopenable
    /// input leaves the filesystem untouched. The output directory (and the
    /// image sub-directory, if configured) is created when missing.
    ///
    /// # Errors
    ///
    /// - [`SamplerError::FileOpen`] / [`SamplerError::NoVideoStream`] if the
    ///   video cannot be opened.
    /// - [`SamplerError::Io`] / [`SamplerError::Image`] /
    ///   [`SamplerError::Csv`] if an output file cannot be written.
    pub fn run<P, Q>(&self, video_path: P, output_dir: Q) -> Result<SampleResult, SamplerError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        self.run_inspecting(video_path, output_dir, |_| {})
    }

    /// Like [`run`](FrameSampler::run), but hands the stream metadata to
    /// `on_open` once the video is open and before any output exists.
    ///
    /// `on_open` is not called when the video cannot be opened.
    ///
    /// ```no_run
    /// use frame_sampler::{FrameSampler, SampleConfig};
    ///
    /// let sampler = FrameSampler::new(SampleConfig::new())?;
    /// sampler.run_inspecting("input.mp4", "frames", |info| println!("{info}"))?;
    /// # Ok::<(), frame_sampler::SamplerError>(())
    /// ```
    pub fn run_inspecting<P, Q, F>(
        &self,
        video_path: P,
        output_dir: Q,
        on_open: F,
    ) -> Result<SampleResult, SamplerError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
        F: FnOnce(&VideoInfo),
    {
        let output_dir = output_dir.as_ref();
        let mut source = VideoSource::open(video_path)?;
        on_open(source.info());
        let mut sink =
            DirectorySink::create(self.config.image_dir(output_dir), self.config.image_format)?;
        self.run_with(&mut source, &mut sink, output_dir)
    }

    /// Sample any [`FrameSource`] into any [`ImageSink`].
    ///
    /// `output_dir` receives the timestamp log (when enabled) and is what
    /// the result reports; images go wherever `sink` puts them.
    pub fn run_with<S, K>(
        &self,
        source: &mut S,
        sink: &mut K,
        output_dir: &Path,
    ) -> Result<SampleResult, SamplerError>
    where
        S: FrameSource + ?Sized,
        K: ImageSink + ?Sized,
    {
        let config = &self.config;
        let total_frames = source.info().frame_count;
        let expected_reads = source
            .info()
            .known_frame_count()
            .map(|count| config.max_frames.map_or(count, |cap| count.min(cap)));

        let mut timestamp_log = if config.record_timestamps {
            fs::create_dir_all(output_dir)?;
            Some(TimestampLog::create(output_dir.join(TIMESTAMP_FILE_NAME))?)
        } else {
            None
        };

        let mut tracker =
            ProgressTracker::new(config.progress.clone(), expected_reads, config.batch_size);
        let mut records = Vec::new();
        let mut read_index: u64 = 0;
        let mut saved_index: u64 = 0;

        while !config.cap_reached(read_index) && source.advance() {
            let timestamp_ms = source.current_timestamp_ms();

            if config.keeps(read_index) {
                let image = match source.current_image() {
                    Ok(image) => image,
                    Err(error) => {
                        log::warn!("Frame {read_index} could not be converted, stopping: {error}");
                        break;
                    }
                };
                let image = resize_to_target(image, config.target_size);
                let path = sink.write(saved_index, &image)?;

                let recorded_ms = config.record_timestamps.then_some(timestamp_ms);
                if let (Some(timestamps), Some(ms)) = (timestamp_log.as_mut(), recorded_ms) {
                    timestamps.append(saved_index, ms)?;
                }

                log::debug!("Saved frame {read_index} as {}", path.display());
                records.push(FrameRecord {
                    saved_index,
                    source_frame_index: read_index,
                    timestamp_ms: recorded_ms,
                    path,
                });
                saved_index += 1;
            }

            let position = timestamp_ms
                .is_finite()
                .then(|| Duration::from_secs_f64(timestamp_ms.max(0.0) / 1000.0));
            tracker.advance(saved_index, Some(read_index), position);
            read_index += 1;
        }

        tracker.finish();
        let timestamp_log = timestamp_log.map(TimestampLog::finish).transpose()?;

        let result = SampleResult {
            saved_count: saved_index,
            read_count: read_index,
            total_frames,
            output_dir: output_dir.to_path_buf(),
            image_dir: config.image_dir(output_dir),
            timestamp_log,
            records,
        };

        log::info!(
            "{result} (read {} of {} reported frames)",
            result.read_count,
            result.total_frames,
        );

        Ok(result)
    }
}

/// Resize to exactly the target dimensions, or return the image unchanged.
pub(crate) fn resize_to_target(image: DynamicImage, target: Option<TargetSize>) -> DynamicImage {
    match target {
        Some(size) if (image.width(), image.height()) != (size.width, size.height) => {
            image.resize_exact(size.width, size.height, RESIZE_FILTER)
        }
        _ => image,
    }
}
