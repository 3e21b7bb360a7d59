//! Internal conversion helpers shared by the FFmpeg-backed source.

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// Copy plane 0 of a packed video frame into a tightly-packed buffer.
///
/// FFmpeg rows are often padded (stride > width × bytes per pixel); the
/// padding is dropped so the result can go straight into
/// [`image::RgbImage::from_raw`].
pub(crate) fn frame_to_buffer(
    video_frame: &VideoFrame,
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let expected_stride = (width as usize) * bytes_per_pixel;
    let data = video_frame.data(0);

    if stride == expected_stride {
        data[..expected_stride * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(expected_stride * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + expected_stride]);
        }
        buffer
    }
}

/// Value of a rational as `f64`, or `None` for `x/0` and non-positive rates.
pub(crate) fn positive_rate(rate: Rational) -> Option<f64> {
    if rate.denominator() == 0 || rate.numerator() <= 0 {
        return None;
    }
    Some(rate.numerator() as f64 / rate.denominator() as f64)
}

/// Rescale a PTS value from stream time base to milliseconds.
pub(crate) fn pts_to_milliseconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64 * 1000.0
}

/// Timestamp of the `frame_index`-th frame at a constant rate, in
/// milliseconds. Used when the decoder reports no PTS.
pub(crate) fn frame_index_to_milliseconds(frame_index: u64, frames_per_second: f64) -> f64 {
    if frames_per_second > 0.0 {
        frame_index as f64 * 1000.0 / frames_per_second
    } else {
        0.0
    }
}
