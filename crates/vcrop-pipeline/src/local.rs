//! Local ffmpeg encode backend.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::TempDir;

use vcrop_media::{check_ffmpeg, check_ffprobe, concat_segments, encode_cropped_segment};
use vcrop_models::SegmentSpec;

use crate::backend::{EncodeBackend, SegmentArtifact};
use crate::error::{PipelineError, PipelineResult};

/// Encodes segments with a local ffmpeg process.
///
/// Segment artifacts and the concat manifest live in an owned scratch
/// directory that is removed when the backend is dropped, on every exit
/// path.
pub struct LocalEncodeBackend {
    scratch: TempDir,
}

impl LocalEncodeBackend {
    /// Create a backend, probing for `ffmpeg` and `ffprobe` up front.
    pub fn new() -> PipelineResult<Self> {
        check_ffmpeg()?;
        check_ffprobe()?;
        let scratch = TempDir::new()?;
        Ok(Self { scratch })
    }

    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    fn local_paths(artifacts: &[SegmentArtifact]) -> PipelineResult<Vec<PathBuf>> {
        artifacts
            .iter()
            .map(|a| match a {
                SegmentArtifact::Local(path) => Ok(path.clone()),
                SegmentArtifact::Remote(uri) => Err(PipelineError::backend(format!(
                    "local backend cannot concatenate remote artifact {}",
                    uri
                ))),
            })
            .collect()
    }
}

#[async_trait]
impl EncodeBackend for LocalEncodeBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn encode_segment(
        &self,
        source: &Path,
        spec: &SegmentSpec,
    ) -> PipelineResult<SegmentArtifact> {
        let path = encode_cropped_segment(source, spec, self.scratch.path()).await?;
        Ok(SegmentArtifact::Local(path))
    }

    async fn concatenate(
        &self,
        artifacts: &[SegmentArtifact],
        output: &Path,
    ) -> PipelineResult<()> {
        let paths = Self::local_paths(artifacts)?;
        concat_segments(&paths, self.scratch.path(), output).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_artifacts_rejected() {
        let artifacts = vec![SegmentArtifact::Remote("s3://b/seg.mp4".to_string())];
        let err = LocalEncodeBackend::local_paths(&artifacts).unwrap_err();
        assert!(matches!(err, PipelineError::Backend(_)));
    }
}
