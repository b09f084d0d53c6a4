//! Per-segment crop+trim encoding.
//!
//! Filtering forces a re-encode, so each segment is encoded fresh with the
//! shared settings below; matching codec parameters across segments is what
//! allows the final concatenation to be a pure stream copy.

use std::path::{Path, PathBuf};
use tracing::info;

use vcrop_models::{format_seconds, SegmentSpec};

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};

/// Video codec for segment re-encoding
const VIDEO_CODEC: &str = "libx264";
/// Quality (CRF) for segment re-encoding
const CRF: u8 = 23;
/// Encoder preset
const PRESET: &str = "veryfast";
/// Pixel format (widest decoder compatibility)
const PIXEL_FORMAT: &str = "yuv420p";
/// Audio codec
const AUDIO_CODEC: &str = "aac";
/// Audio bitrate
const AUDIO_BITRATE: &str = "128k";

/// File name for a segment artifact, zero-padded so lexical order equals
/// plan order.
pub fn segment_file_name(index: usize) -> String {
    format!("segment_{:03}.mp4", index)
}

/// Encode one segment: trim to the spec's window and apply its crop.
///
/// The duration flag is omitted for the open-ended final segment so the
/// engine runs to end-of-stream. Returns the artifact path inside
/// `scratch_dir`.
pub async fn encode_cropped_segment(
    source: impl AsRef<Path>,
    spec: &SegmentSpec,
    scratch_dir: impl AsRef<Path>,
) -> MediaResult<PathBuf> {
    let source = source.as_ref();
    let output = scratch_dir.as_ref().join(segment_file_name(spec.index));

    let end_desc = match spec.end {
        Some(end) => format_seconds(end),
        None => "end".to_string(),
    };
    info!(
        segment = spec.index,
        start = %format_seconds(spec.start),
        end = %end_desc,
        crop_x = spec.crop_x,
        "Encoding segment"
    );

    let mut cmd = FfmpegCommand::new(source, &output)
        .seek(spec.start)
        .video_filter(format!(
            "crop={}:{}:{}:0",
            spec.crop_width, spec.crop_height, spec.crop_x
        ))
        .video_codec(VIDEO_CODEC)
        .crf(CRF)
        .preset(PRESET)
        .pixel_format(PIXEL_FORMAT)
        .audio_codec(AUDIO_CODEC)
        .audio_bitrate(AUDIO_BITRATE)
        .output_args(["-avoid_negative_ts", "make_zero"]);

    if let Some(duration) = spec.duration() {
        cmd = cmd.duration(duration);
    }

    let result = cmd.run().await?;
    if !result.success {
        return Err(MediaError::encode_failed(
            spec.index,
            result.stderr,
            result.exit_code,
        ));
    }

    Ok(output)
}
