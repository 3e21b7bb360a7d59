//! Benchmarks for frame selection, resizing, and encoding.
//!
//! Run with: cargo bench
//!
//! The file-backed benchmarks require fixture files from
//! `tests/fixtures/generate_fixtures.sh`.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use criterion::Criterion;
use frame_sampler::{
    DirectorySink, FfmpegLogLevel, FrameSampler, FrameSource, ImageFormat, ImageSink,
    SampleConfig, SamplerError, VideoInfo, frame_file_name,
};
use image::{DynamicImage, Rgb, RgbImage};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

/// Solid-colour 1280x720 frames, generated on demand.
struct BenchSource {
    info: VideoInfo,
    position: Option<u64>,
}

impl BenchSource {
    fn new(total: u64) -> Self {
        Self {
            info: VideoInfo {
                width: 1280,
                height: 720,
                frames_per_second: 30.0,
                frame_count: total,
                codec: "synthetic".to_string(),
                duration: Duration::from_secs_f64(total as f64 / 30.0),
            },
            position: None,
        }
    }
}

impl FrameSource for BenchSource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn advance(&mut self) -> bool {
        let next = self.position.map_or(0, |position| position + 1);
        if next >= self.info.frame_count {
            return false;
        }
        self.position = Some(next);
        true
    }

    fn current_image(&mut self) -> Result<DynamicImage, SamplerError> {
        let shade = (self.position.unwrap_or(0) % 256) as u8;
        Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            self.info.width,
            self.info.height,
            Rgb([shade, 128, 255 - shade]),
        )))
    }

    fn current_timestamp_ms(&self) -> f64 {
        self.position.unwrap_or(0) as f64 * 1000.0 / self.info.frames_per_second
    }
}

/// Drops every image after touching its dimensions.
struct DiscardSink;

impl ImageSink for DiscardSink {
    fn write(&mut self, saved_index: u64, image: &DynamicImage) -> Result<PathBuf, SamplerError> {
        std::hint::black_box(image.width());
        Ok(PathBuf::from(frame_file_name(saved_index, ImageFormat::Jpg)))
    }
}

fn benchmark_selection(criterion: &mut Criterion) {
    criterion.bench_function("select 300 frames, skip 10, native size", |bencher| {
        let sampler = FrameSampler::new(SampleConfig::new().with_frame_skip(10)).unwrap();
        bencher.iter(|| {
            let mut source = BenchSource::new(300);
            sampler
                .run_with(&mut source, &mut DiscardSink, Path::new("unused"))
                .unwrap()
        });
    });

    criterion.bench_function("select 300 frames, skip 10, resize 640", |bencher| {
        let config = SampleConfig::new().with_frame_skip(10).with_square_size(640);
        let sampler = FrameSampler::new(config).unwrap();
        bencher.iter(|| {
            let mut source = BenchSource::new(300);
            sampler
                .run_with(&mut source, &mut DiscardSink, Path::new("unused"))
                .unwrap()
        });
    });
}

fn benchmark_encoding(criterion: &mut Criterion) {
    let temporary_directory = tempfile::tempdir().unwrap();

    for format in [ImageFormat::Jpg, ImageFormat::Png] {
        let directory = temporary_directory.path().join(format.extension());
        let config = SampleConfig::new()
            .with_frame_skip(30)
            .with_square_size(640)
            .with_image_format(format);
        let sampler = FrameSampler::new(config).unwrap();

        criterion.bench_function(&format!("write 10 frames as {format}"), |bencher| {
            bencher.iter(|| {
                let mut source = BenchSource::new(300);
                let mut sink = DirectorySink::create(&directory, format).unwrap();
                sampler.run_with(&mut source, &mut sink, &directory).unwrap()
            });
        });
    }
}

fn benchmark_video_file(criterion: &mut Criterion) {
    frame_sampler::set_ffmpeg_log_level(FfmpegLogLevel::Error);

    if !Path::new(SAMPLE_VIDEO).exists() {
        eprintln!("Skipping benchmark: fixture not found");
        return;
    }

    let temporary_directory = tempfile::tempdir().unwrap();
    let output = temporary_directory.path().to_path_buf();

    criterion.bench_function("sample fixture video, skip 10", |bencher| {
        let sampler = FrameSampler::new(SampleConfig::new().with_frame_skip(10)).unwrap();
        bencher.iter(|| sampler.run(SAMPLE_VIDEO, &output).unwrap());
    });

    criterion.bench_function("sample fixture video, skip 1, resize 224", |bencher| {
        let config = SampleConfig::new().with_frame_skip(1).with_square_size(224);
        let sampler = FrameSampler::new(config).unwrap();
        bencher.iter(|| sampler.run(SAMPLE_VIDEO, &output).unwrap());
    });
}

criterion::criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(10).measurement_time(Duration::from_secs(5));
    targets = benchmark_selection, benchmark_encoding, benchmark_video_file
);
criterion::criterion_main!(benches);
