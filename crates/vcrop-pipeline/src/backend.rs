//! Encode backend capability trait.
//!
//! The orchestrator is written once against this trait; the local ffmpeg
//! engine and the cloud transcoding service implement it with equivalent
//! semantics (fail-fast segment encoding, order-preserving artifacts,
//! lossless reassembly).

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use vcrop_models::{SegmentSpec, SourceVideoInfo};

use crate::error::PipelineResult;

/// One encoded segment, addressed wherever the backend keeps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentArtifact {
    /// Path in the local scratch directory
    Local(PathBuf),
    /// Blob URI in the remote store
    Remote(String),
}

/// A backend capable of encoding planned segments and reassembling them.
#[async_trait]
pub trait EncodeBackend: Send + Sync {
    /// Backend name for log lines.
    fn name(&self) -> &'static str;

    /// One-time per-run setup (capability probes, source staging).
    async fn prepare(&self, source: &Path, info: &SourceVideoInfo) -> PipelineResult<()> {
        let _ = (source, info);
        Ok(())
    }

    /// Encode a single segment per its spec.
    async fn encode_segment(
        &self,
        source: &Path,
        spec: &SegmentSpec,
    ) -> PipelineResult<SegmentArtifact>;

    /// Encode all segments, in plan order, stopping at the first failure.
    ///
    /// The default is strictly sequential; backends with cheap fan-out may
    /// override it, but the returned artifacts must stay in plan order and
    /// any failure must abort the whole batch of segments.
    async fn encode_segments(
        &self,
        source: &Path,
        specs: &[SegmentSpec],
    ) -> PipelineResult<Vec<SegmentArtifact>> {
        let mut artifacts = Vec::with_capacity(specs.len());
        for spec in specs {
            artifacts.push(self.encode_segment(source, spec).await?);
        }
        Ok(artifacts)
    }

    /// Reassemble artifacts (order is playback order) into `output`.
    async fn concatenate(
        &self,
        artifacts: &[SegmentArtifact],
        output: &Path,
    ) -> PipelineResult<()>;
}
