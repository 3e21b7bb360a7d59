//! Synthetic frame source and in-memory sink shared by the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use frame_sampler::{
    FrameSource, ImageFormat, ImageSink, SamplerError, VideoInfo, frame_file_name,
};
use image::{DynamicImage, Rgb, RgbImage};

/// A source of `total` solid-colour frames at a constant rate.
///
/// The red channel of each frame holds its stream index modulo 256, so tests
/// can tell which source frame ended up in which file.
pub struct SyntheticSource {
    info: VideoInfo,
    total: u64,
    position: Option<u64>,
    fail_at: Option<u64>,
    pub advances: u64,
    pub conversions: u64,
}

impl SyntheticSource {
    pub fn new(total: u64) -> Self {
        Self::with_size(total, 64, 48)
    }

    pub fn with_size(total: u64, width: u32, height: u32) -> Self {
        Self {
            info: VideoInfo {
                width,
                height,
                frames_per_second: 25.0,
                frame_count: total,
                codec: "synthetic".to_string(),
                duration: Duration::from_secs_f64(total as f64 / 25.0),
            },
            total,
            position: None,
            fail_at: None,
            advances: 0,
            conversions: 0,
        }
    }

    /// Report `count` as the frame count regardless of the real length.
    pub fn reporting_frame_count(mut self, count: u64) -> Self {
        self.info.frame_count = count;
        self
    }

    /// Make the frame at `index` undecodable.
    pub fn failing_at(mut self, index: u64) -> Self {
        self.fail_at = Some(index);
        self
    }
}

impl FrameSource for SyntheticSource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn advance(&mut self) -> bool {
        let next = self.position.map_or(0, |position| position + 1);
        if next >= self.total || self.fail_at == Some(next) {
            return false;
        }
        self.advances += 1;
        self.position = Some(next);
        true
    }

    fn current_image(&mut self) -> Result<DynamicImage, SamplerError> {
        let index = self
            .position
            .ok_or_else(|| SamplerError::FrameConversion("no current frame".to_string()))?;
        self.conversions += 1;
        Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            self.info.width,
            self.info.height,
            Rgb([(index % 256) as u8, 0, 0]),
        )))
    }

    fn current_timestamp_ms(&self) -> f64 {
        self.position.unwrap_or(0) as f64 * 1000.0 / self.info.frames_per_second
    }
}

/// One frame handed to a [`MemorySink`].
#[derive(Debug, Clone, PartialEq)]
pub struct SinkEntry {
    pub saved_index: u64,
    pub width: u32,
    pub height: u32,
    /// Red channel of the top-left pixel: the source index modulo 256.
    pub marker: u8,
}

/// Keeps frame descriptions in memory instead of writing files.
#[derive(Default)]
pub struct MemorySink {
    pub entries: Vec<SinkEntry>,
}

impl ImageSink for MemorySink {
    fn write(&mut self, saved_index: u64, image: &DynamicImage) -> Result<PathBuf, SamplerError> {
        let rgb = image.to_rgb8();
        self.entries.push(SinkEntry {
            saved_index,
            width: image.width(),
            height: image.height(),
            marker: rgb.get_pixel(0, 0)[0],
        });
        Ok(PathBuf::from(frame_file_name(saved_index, ImageFormat::Png)))
    }
}

/// Sorted file names in `directory`.
pub fn file_names(directory: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(directory)
        .expect("Failed to read output directory")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
