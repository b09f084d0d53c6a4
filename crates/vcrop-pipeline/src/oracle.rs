//! Focus-coordinate oracle seam.
//!
//! Keyframe generation is an external concern; the pipeline only consumes
//! the resulting coordinate list. A malformed or out-of-schema response is
//! a failure of the generation step, reported as [`PipelineError::Oracle`].

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use vcrop_models::{load_crop_data, CropKeyframe};

use crate::error::{PipelineError, PipelineResult};

/// Produces the ordered focus keyframes for a source video.
#[async_trait]
pub trait FocusOracle: Send + Sync {
    async fn analyze(
        &self,
        video: &Path,
        width: u32,
        height: u32,
    ) -> PipelineResult<Vec<CropKeyframe>>;
}

/// Oracle that reads a pre-generated crop-data file.
#[derive(Debug, Clone)]
pub struct FileOracle {
    crop_data_path: PathBuf,
}

impl FileOracle {
    pub fn new(crop_data_path: impl Into<PathBuf>) -> Self {
        Self {
            crop_data_path: crop_data_path.into(),
        }
    }

    /// Conventional sidecar location for an input video:
    /// `<stem>_crop_data.json` next to the video.
    pub fn sidecar_for(video: &Path) -> PathBuf {
        let stem = video
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "video".to_string());
        video.with_file_name(format!("{}_crop_data.json", stem))
    }
}

#[async_trait]
impl FocusOracle for FileOracle {
    async fn analyze(
        &self,
        _video: &Path,
        _width: u32,
        _height: u32,
    ) -> PipelineResult<Vec<CropKeyframe>> {
        load_crop_data(&self.crop_data_path)
            .map_err(|e| PipelineError::oracle(e.to_string()))
    }
}
