//! FFmpeg console verbosity.
//!
//! FFmpeg writes its own warnings to stderr independently of the Rust
//! [`log`](https://crates.io/crates/log) facade. Damaged recordings can make
//! it very chatty, so the level is exposed here (and through the CLI's
//! `--log-level`) without requiring callers to depend on `ffmpeg-next`.
//!
//! ```no_run
//! use frame_sampler::FfmpegLogLevel;
//!
//! frame_sampler::set_ffmpeg_log_level(FfmpegLogLevel::Error);
//! ```

use std::str::FromStr;

use ffmpeg_next::util::log::Level;

/// FFmpeg internal log verbosity, from silent to most verbose.
///
/// Each level also lets through every message more severe than itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// Nothing at all.
    Quiet,
    /// Only conditions after which FFmpeg aborts the process.
    Panic,
    /// Failures that leave a demuxer or decoder unusable.
    Fatal,
    /// Recoverable failures, such as a corrupt packet.
    Error,
    /// Suspicious input that decoding works around. FFmpeg's default.
    Warning,
    /// Stream and codec setup details.
    Info,
    /// More detailed setup and per-stream information.
    Verbose,
    /// Internal decoder state, useful when a recording misbehaves.
    Debug,
    /// Everything, including per-packet tracing.
    Trace,
}

impl FfmpegLogLevel {
    /// The matching `ffmpeg_next` level.
    fn to_ffmpeg_level(self) -> Level {
        match self {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Panic => Level::Panic,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Verbose => Level::Verbose,
            FfmpegLogLevel::Debug => Level::Debug,
            FfmpegLogLevel::Trace => Level::Trace,
        }
    }

    /// Inverse of [`to_ffmpeg_level`](FfmpegLogLevel::to_ffmpeg_level).
    fn from_ffmpeg_level(level: Level) -> Self {
        match level {
            Level::Quiet => FfmpegLogLevel::Quiet,
            Level::Panic => FfmpegLogLevel::Panic,
            Level::Fatal => FfmpegLogLevel::Fatal,
            Level::Error => FfmpegLogLevel::Error,
            Level::Warning => FfmpegLogLevel::Warning,
            Level::Info => FfmpegLogLevel::Info,
            Level::Verbose => FfmpegLogLevel::Verbose,
            Level::Debug => FfmpegLogLevel::Debug,
            Level::Trace => FfmpegLogLevel::Trace,
        }
    }
}

impl FromStr for FfmpegLogLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "quiet" => Ok(FfmpegLogLevel::Quiet),
            "panic" => Ok(FfmpegLogLevel::Panic),
            "fatal" => Ok(FfmpegLogLevel::Fatal),
            "error" => Ok(FfmpegLogLevel::Error),
            "warning" | "warn" => Ok(FfmpegLogLevel::Warning),
            "info" => Ok(FfmpegLogLevel::Info),
            "verbose" => Ok(FfmpegLogLevel::Verbose),
            "debug" => Ok(FfmpegLogLevel::Debug),
            "trace" => Ok(FfmpegLogLevel::Trace),
            _ => Err(format!("unknown FFmpeg log level: {value}")),
        }
    }
}

/// Set FFmpeg's own log verbosity. Does not affect the `log` facade.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}

/// Current FFmpeg log verbosity, if it maps to a known level.
pub fn ffmpeg_log_level() -> Option<FfmpegLogLevel> {
    ffmpeg_next::util::log::get_level()
        .ok()
        .map(FfmpegLogLevel::from_ffmpeg_level)
}
