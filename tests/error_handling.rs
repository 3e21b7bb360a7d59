//! Error handling integration tests.
//!
//! Opening failures must be reported before anything is written.

mod common;

use std::path::Path;

use common::{MemorySink, SyntheticSource};
use frame_sampler::{FrameSampler, SampleConfig, SamplerError, VideoSource};

#[test]
fn open_nonexistent_file() {
    let result = VideoSource::open("this_file_does_not_exist.mp4");
    let error = result.unwrap_err();
    assert!(matches!(error, SamplerError::FileOpen { .. }));
    assert!(
        error.to_string().contains("Failed to open video"),
        "Error message should mention open failure: {error}",
    );
}

#[test]
fn nonexistent_video_produces_no_output() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = temporary_directory.path().join("frames");

    let config = SampleConfig::new().with_timestamps(true);
    let result = FrameSampler::new(config)
        .unwrap()
        .run("this_file_does_not_exist.mp4", &output);

    assert!(matches!(result, Err(SamplerError::FileOpen { .. })));
    assert!(!output.exists(), "Output directory should not be created");
}

#[test]
fn inspect_hook_not_called_for_unopenable_video() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = temporary_directory.path().join("frames");

    let mut inspected = false;
    let result = FrameSampler::new(SampleConfig::new())
        .unwrap()
        .run_inspecting("this_file_does_not_exist.mp4", &output, |_| inspected = true);

    assert!(matches!(result, Err(SamplerError::FileOpen { .. })));
    assert!(!inspected);
    assert!(!output.exists());
}

#[test]
fn invalid_media_file_fails_to_open() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a media file")
        .expect("Failed to write invalid file");
    let output = temporary_directory.path().join("frames");

    let result = FrameSampler::new(SampleConfig::new())
        .unwrap()
        .run(&invalid_file_path, &output);

    assert!(result.is_err(), "Expected error for invalid media file");
    assert!(!output.exists());
}

#[test]
fn zero_frame_skip_is_rejected() {
    let error = FrameSampler::new(SampleConfig::new().with_frame_skip(0)).unwrap_err();
    assert!(error.to_string().contains("Frame skip must be greater than zero"));
}

#[test]
fn zero_max_frames_is_rejected() {
    let error = FrameSampler::new(SampleConfig::new().with_max_frames(Some(0))).unwrap_err();
    assert!(matches!(error, SamplerError::InvalidMaxFrames));
}

#[test]
fn zero_target_dimension_is_rejected() {
    let error = FrameSampler::new(SampleConfig::new().with_target_size(640, 0)).unwrap_err();
    match error {
        SamplerError::InvalidTargetSize { width, height } => {
            assert_eq!((width, height), (640, 0));
        }
        other => panic!("Expected InvalidTargetSize, got: {other}"),
    }
}

#[test]
fn unwritable_log_location_is_an_io_error() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    // A file where the output directory should be.
    let blocked = temporary_directory.path().join("blocked");
    std::fs::write(&blocked, b"").unwrap();

    let mut source = SyntheticSource::new(10);
    let mut sink = MemorySink::default();
    let result = FrameSampler::new(SampleConfig::new().with_timestamps(true))
        .unwrap()
        .run_with(&mut source, &mut sink, &blocked);

    assert!(matches!(result, Err(SamplerError::Io(_))));
    assert!(sink.entries.is_empty());
}

#[test]
fn no_video_stream_error() {
    let path = "tests/fixtures/sample_audio_only.mp4";
    if !Path::new(path).exists() {
        return;
    }

    let error = VideoSource::open(path).unwrap_err();
    assert!(
        error.to_string().contains("No video stream"),
        "Error should mention missing video stream: {error}",
    );
}
