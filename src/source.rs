//! Sequential frame sources.
//!
//! [`FrameSource`] is the seam between the sampler and whatever produces
//! frames. [`VideoSource`] is the FFmpeg-backed implementation: it demuxes
//! the best video stream of a file and decodes it strictly in order, with no
//! seeking.
//!
//! Advancing and converting are separate steps so that skipped frames are
//! decoded (the codec requires it) but never converted to RGB.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, RgbImage};

use crate::conversion::{
    frame_index_to_milliseconds, frame_to_buffer, positive_rate, pts_to_milliseconds,
};
use crate::error::SamplerError;
use crate::metadata::VideoInfo;

/// FFmpeg's `AV_NOPTS_VALUE`.
const NO_TIMESTAMP: i64 = i64::MIN;

/// A producer of decoded frames, read strictly in order.
///
/// The sampler calls [`advance`](FrameSource::advance) once per frame and,
/// only for kept frames, [`current_image`](FrameSource::current_image).
pub trait FrameSource {
    /// Stream metadata, available before the first frame.
    fn info(&self) -> &VideoInfo;

    /// Move to the next frame.
    ///
    /// Returns `false` once the stream is exhausted. A frame that cannot be
    /// decoded also ends the stream; it is not an error.
    fn advance(&mut self) -> bool;

    /// The current frame as an image at source resolution.
    fn current_image(&mut self) -> Result<DynamicImage, SamplerError>;

    /// Presentation timestamp of the current frame, in milliseconds from
    /// the start of the stream.
    fn current_timestamp_ms(&self) -> f64;
}

/// FFmpeg-backed [`FrameSource`] over the best video stream of a file.
///
/// The demuxer and decoder are owned by the source and released when it is
/// dropped, whether the run completed or failed.
///
/// # Example
///
/// ```no_run
/// use frame_sampler::{FrameSource, VideoSource};
///
/// let mut source = VideoSource::open("input.mp4")?;
/// println!("{}", source.info());
/// let mut frames = 0;
/// while source.advance() {
///     frames += 1;
/// }
/// println!("decoded {frames} frames");
/// # Ok::<(), frame_sampler::SamplerError>(())
/// ```
pub struct VideoSource {
    input_context: Input,
    decoder: VideoDecoder,
    scaler: Option<ScalingContext>,
    video_stream_index: usize,
    time_base: Rational,
    start_time: i64,
    info: VideoInfo,
    path: PathBuf,
    decoded_frame: VideoFrame,
    rgb_frame: VideoFrame,
    frames_decoded: u64,
    eof_sent: bool,
    finished: bool,
}

impl Debug for VideoSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoSource")
            .field("path", &self.path)
            .field("info", &self.info)
            .field("video_stream_index", &self.video_stream_index)
            .field("frames_decoded", &self.frames_decoded)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl VideoSource {
    /// Open a video file and prepare a decoder for its best video stream.
    ///
    /// # Errors
    ///
    /// - [`SamplerError::FileOpen`] if the file cannot be opened or its
    ///   codec has no usable decoder.
    /// - [`SamplerError::NoVideoStream`] if the file has no video stream.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SamplerError> {
        let path = path.as_ref().to_path_buf();
        let open_error = |reason: String| SamplerError::FileOpen {
            path: path.clone(),
            reason,
        };

        log::debug!("Opening video: {}", path.display());

        ffmpeg_next::init()
            .map_err(|error| open_error(format!("FFmpeg initialisation failed: {error}")))?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| open_error(error.to_string()))?;

        let container_duration = match input_context.duration() {
            micros if micros > 0 => Duration::from_micros(micros as u64),
            _ => Duration::ZERO,
        };

        let (video_stream_index, time_base, start_time, frames_per_second, reported_frames, decoder) = {
            let stream = input_context
                .streams()
                .best(Type::Video)
                .ok_or_else(|| SamplerError::NoVideoStream(path.clone()))?;

            let decoder_context = CodecContext::from_parameters(stream.parameters())
                .map_err(|error| open_error(format!("Failed to read codec parameters: {error}")))?;
            let decoder = decoder_context
                .decoder()
                .video()
                .map_err(|error| open_error(format!("Failed to create video decoder: {error}")))?;

            let frames_per_second = positive_rate(stream.avg_frame_rate())
                .or_else(|| positive_rate(stream.rate()))
                .unwrap_or(0.0);

            (
                stream.index(),
                stream.time_base(),
                stream.start_time(),
                frames_per_second,
                stream.frames(),
                decoder,
            )
        };

        let frame_count = if reported_frames > 0 {
            reported_frames as u64
        } else {
            (container_duration.as_secs_f64() * frames_per_second) as u64
        };

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let info = VideoInfo {
            width: decoder.width(),
            height: decoder.height(),
            frames_per_second,
            frame_count,
            codec,
            duration: container_duration,
        };

        log::info!(
            "Opened video: {} (stream {}, {})",
            path.display(),
            video_stream_index,
            info,
        );

        Ok(Self {
            input_context,
            decoder,
            scaler: None,
            video_stream_index,
            time_base,
            start_time: if start_time == NO_TIMESTAMP { 0 } else { start_time },
            info,
            path,
            decoded_frame: VideoFrame::empty(),
            rgb_frame: VideoFrame::empty(),
            frames_decoded: 0,
            eof_sent: false,
            finished: false,
        })
    }

    /// Path the source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of frames decoded so far.
    pub fn frames_decoded(&self) -> u64 {
        self.frames_decoded
    }

    fn end_of_stream(&mut self, reason: &str) -> bool {
        if !self.finished {
            log::warn!(
                "Stopping at frame {} of {}: {reason}",
                self.frames_decoded,
                self.path.display(),
            );
        }
        self.finished = true;
        false
    }
}

impl FrameSource for VideoSource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn advance(&mut self) -> bool {
        loop {
            if self.finished {
                return false;
            }

            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                self.frames_decoded += 1;
                return true;
            }

            if self.eof_sent {
                // Decoder drained after EOF.
                self.finished = true;
                return false;
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input_context) {
                Ok(()) => {
                    if packet.stream() != self.video_stream_index {
                        continue;
                    }
                    if let Err(error) = self.decoder.send_packet(&packet) {
                        return self.end_of_stream(&format!("decode error: {error}"));
                    }
                }
                Err(FfmpegError::Eof) => {
                    if let Err(error) = self.decoder.send_eof() {
                        return self.end_of_stream(&format!("decoder flush failed: {error}"));
                    }
                    self.eof_sent = true;
                }
                Err(error) => {
                    // Unreadable trailer: flush what the decoder already holds.
                    log::warn!("Read error in {}: {error}", self.path.display());
                    if self.decoder.send_eof().is_err() {
                        return self.end_of_stream("decoder flush failed");
                    }
                    self.eof_sent = true;
                }
            }
        }
    }

    fn current_image(&mut self) -> Result<DynamicImage, SamplerError> {
        if self.frames_decoded == 0 {
            return Err(SamplerError::FrameConversion(
                "no frame has been decoded yet".to_string(),
            ));
        }

        let format = self.decoded_frame.format();
        let width = self.decoded_frame.width();
        let height = self.decoded_frame.height();

        let stale = self.scaler.as_ref().is_none_or(|scaler| {
            let input = scaler.input();
            input.format != format || input.width != width || input.height != height
        });
        if stale {
            self.scaler = Some(ScalingContext::get(
                format,
                width,
                height,
                Pixel::RGB24,
                width,
                height,
                ScalingFlags::BILINEAR,
            )?);
            self.rgb_frame = VideoFrame::empty();
        }

        if let Some(scaler) = self.scaler.as_mut() {
            scaler.run(&self.decoded_frame, &mut self.rgb_frame)?;
        }

        let buffer = frame_to_buffer(&self.rgb_frame, width, height, 3);
        let image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            SamplerError::FrameConversion(format!(
                "RGB buffer does not match {width}x{height} frame"
            ))
        })?;
        Ok(DynamicImage::ImageRgb8(image))
    }

    fn current_timestamp_ms(&self) -> f64 {
        let pts = self
            .decoded_frame
            .timestamp()
            .or_else(|| self.decoded_frame.pts());
        match pts {
            Some(pts) if self.frames_decoded > 0 => {
                pts_to_milliseconds(pts - self.start_time, self.time_base).max(0.0)
            }
            _ => frame_index_to_milliseconds(
                self.frames_decoded.saturating_sub(1),
                self.info.frames_per_second,
            ),
        }
    }
}
