//! Destinations for kept frames.
//!
//! [`ImageSink`] receives each kept frame together with its sequential save
//! index. [`DirectorySink`] encodes frames to `frame_{index:06}.{ext}` files
//! in one directory.

use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::config::ImageFormat;
use crate::error::SamplerError;

/// File name of the `saved_index`-th kept frame, e.g. `frame_000042.jpg`.
pub fn frame_file_name(saved_index: u64, format: ImageFormat) -> String {
    format!("frame_{saved_index:06}.{}", format.extension())
}

/// Writes a single kept frame.
pub trait ImageSink {
    /// Persist `image` as the `saved_index`-th kept frame and return where
    /// it went.
    fn write(&mut self, saved_index: u64, image: &DynamicImage) -> Result<PathBuf, SamplerError>;
}

/// Writes frames as numbered image files into one directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    directory: PathBuf,
    format: ImageFormat,
}

impl DirectorySink {
    /// Create the directory (and any missing parents) and return a sink
    /// writing into it.
    pub fn create<P: AsRef<Path>>(directory: P, format: ImageFormat) -> Result<Self, SamplerError> {
        let directory = directory.as_ref().to_path_buf();
        fs::create_dir_all(&directory)?;
        Ok(Self { directory, format })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Path the `saved_index`-th frame is written to.
    pub fn path_for(&self, saved_index: u64) -> PathBuf {
        self.directory.join(frame_file_name(saved_index, self.format))
    }
}

impl ImageSink for DirectorySink {
    fn write(&mut self, saved_index: u64, image: &DynamicImage) -> Result<PathBuf, SamplerError> {
        let path = self.path_for(saved_index);
        match self.format {
            // JPEG has no alpha channel.
            ImageFormat::Jpg if image.color().has_alpha() => {
                DynamicImage::ImageRgb8(image.to_rgb8())
                    .save_with_format(&path, self.format.to_image_format())?;
            }
            _ => image.save_with_format(&path, self.format.to_image_format())?,
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    use super::*;

    #[test]
    fn file_names_are_zero_padded() {
        assert_eq!(frame_file_name(0, ImageFormat::Jpg), "frame_000000.jpg");
        assert_eq!(frame_file_name(42, ImageFormat::Png), "frame_000042.png");
        assert_eq!(frame_file_name(1_234_567, ImageFormat::Png), "frame_1234567.png");
    }

    #[test]
    fn creates_nested_directory() {
        let temporary_directory = tempfile::tempdir().unwrap();
        let nested = temporary_directory.path().join("a").join("b");
        let sink = DirectorySink::create(&nested, ImageFormat::Png).unwrap();
        assert!(nested.is_dir());
        assert_eq!(sink.path_for(3), nested.join("frame_000003.png"));
    }

    #[test]
    fn writes_decodable_png() {
        let temporary_directory = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::create(temporary_directory.path(), ImageFormat::Png).unwrap();
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 6, Rgb([10, 20, 30])));

        let path = sink.write(0, &image).unwrap();
        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
    }

    #[test]
    fn jpeg_drops_alpha() {
        let temporary_directory = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::create(temporary_directory.path(), ImageFormat::Jpg).unwrap();
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 128])));

        let path = sink.write(7, &image).unwrap();
        assert!(path.ends_with("frame_000007.jpg"));
        assert!(path.is_file());
    }
}
