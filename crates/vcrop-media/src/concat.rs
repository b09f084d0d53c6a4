//! Concat-demuxer stream-copy reassembly.
//!
//! Segments are re-encoded with identical codec parameters, so the final
//! join is a lossless stream copy driven by a concat manifest.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};

/// Write a concat-demuxer manifest listing the segment artifacts in order.
///
/// Single quotes in paths are escaped per the demuxer's quoting rules
/// (`'` becomes `'\''`).
pub async fn write_concat_manifest(
    segments: &[PathBuf],
    manifest_path: impl AsRef<Path>,
) -> MediaResult<()> {
    let mut contents = String::new();
    for segment in segments {
        let escaped = segment.to_string_lossy().replace('\'', "'\\''");
        contents.push_str(&format!("file '{}'\n", escaped));
    }
    fs::write(manifest_path.as_ref(), contents).await?;
    Ok(())
}

/// Concatenate segment artifacts into `output` without re-encoding.
///
/// The manifest is written next to the segments in `scratch_dir`. Fails
/// with [`MediaError::EmptyInput`] before touching the filesystem when
/// there is nothing to join.
pub async fn concat_segments(
    segments: &[PathBuf],
    scratch_dir: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> MediaResult<()> {
    if segments.is_empty() {
        return Err(MediaError::EmptyInput);
    }

    let output = output.as_ref();
    let manifest_path = scratch_dir.as_ref().join("concat_list.txt");
    write_concat_manifest(segments, &manifest_path).await?;

    info!(
        segments = segments.len(),
        output = %output.display(),
        "Concatenating segments"
    );

    let result = FfmpegCommand::new(&manifest_path, output)
        .input_args(["-f", "concat", "-safe", "0"])
        .codec_copy()
        .run()
        .await?;

    if !result.success {
        return Err(MediaError::concat_failed(result.stderr, result.exit_code));
    }

    Ok(())
}
