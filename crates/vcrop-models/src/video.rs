//! Source video metadata.

use serde::{Deserialize, Serialize};

/// Read-only snapshot of the source video, probed once per input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceVideoInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Duration in seconds
    pub duration: f64,
    /// Frame rate (fps)
    pub frame_rate: f64,
    /// Video codec name
    pub video_codec: String,
    /// Audio codec name, absent for silent sources
    pub audio_codec: Option<String>,
    /// File size in bytes
    pub size_bytes: u64,
}

impl SourceVideoInfo {
    /// Source resolution as a `(width, height)` pair.
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
