//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur driving the local media engine.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("Segment {segment_index} encode failed: {stderr}")]
    EncodeFailed {
        segment_index: usize,
        stderr: String,
        exit_code: Option<i32>,
    },

    #[error("Concatenation failed: {stderr}")]
    ConcatFailed {
        stderr: String,
        exit_code: Option<i32>,
    },

    #[error("No segment artifacts to concatenate")]
    EmptyInput,

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("Invalid video file: {0}")]
    InvalidVideo(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    /// Create a segment encode failure.
    pub fn encode_failed(
        segment_index: usize,
        stderr: impl Into<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::EncodeFailed {
            segment_index,
            stderr: stderr.into(),
            exit_code,
        }
    }

    /// Create a concatenation failure.
    pub fn concat_failed(stderr: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self::ConcatFailed {
            stderr: stderr.into(),
            exit_code,
        }
    }
}
