//! # frame-sampler
//!
//! Sample still frames from video files: decode a video sequentially, keep
//! every Nth frame, optionally resize it, and write it to disk as
//! `frame_000000.jpg`, `frame_000001.jpg`, … with an optional
//! `timestamps.csv` of presentation timestamps. Decoding is done by FFmpeg
//! via [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next); resizing and
//! encoding by the [`image`](https://crates.io/crates/image) crate.
//!
//! ## Quick Start
//!
//! ```no_run
//! use frame_sampler::{FrameSampler, SampleConfig};
//!
//! let config = SampleConfig::new().with_frame_skip(10).with_square_size(640);
//! let result = FrameSampler::new(config)?.run("input.mp4", "extracted_frames")?;
//! println!("{result}");
//! # Ok::<(), frame_sampler::SamplerError>(())
//! ```
//!
//! ## Sampling rules
//!
//! - Frame `i` of the stream is kept iff `i % frame_skip == 0`.
//! - `max_frames` caps frames *read*, independently of the skip.
//! - Kept frames are numbered `0..N` with no gaps, in stream order.
//! - A frame that cannot be decoded ends the stream; what was written so
//!   far stays on disk.
//! - Only failing to open the input is fatal before output is produced.
//!
//! Sampling works against the [`FrameSource`] and [`ImageSink`] traits, so
//! sources other than FFmpeg (or in-memory test sources) plug in through
//! [`FrameSampler::run_with`].
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on the build machine.

pub mod config;
mod conversion;
pub mod error;
pub mod ffmpeg;
pub mod metadata;
pub mod progress;
pub mod run_config;
pub mod sampler;
pub mod sink;
pub mod source;
pub mod timestamps;

pub use config::{DEFAULT_FRAME_SKIP, ImageFormat, SampleConfig, TargetSize};
pub use error::SamplerError;
pub use ffmpeg::{FfmpegLogLevel, ffmpeg_log_level, set_ffmpeg_log_level};
pub use metadata::VideoInfo;
pub use progress::{ProgressCallback, ProgressInfo};
pub use run_config::{DEFAULT_IMG_SIZE, DEFAULT_OUTPUT_DIR, RunConfig};
pub use sampler::{FrameRecord, FrameSampler, SampleResult};
pub use sink::{DirectorySink, ImageSink, frame_file_name};
pub use source::{FrameSource, VideoSource};
pub use timestamps::{TIMESTAMP_FILE_NAME, TIMESTAMP_HEADER, TimestampLog};
