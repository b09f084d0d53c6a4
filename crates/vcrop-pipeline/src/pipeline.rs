//! Per-video pipeline orchestration.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use vcrop_media::probe_source;
use vcrop_models::{plan_segments, save_crop_data, CropGeometry, SourceVideoInfo};

use crate::backend::EncodeBackend;
use crate::error::{PipelineError, PipelineResult};
use crate::oracle::FocusOracle;

/// Pipeline steps, in execution order. Failures carry the step they
/// surfaced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    Analyze,
    Plan,
    EncodeSegments,
    Concatenate,
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStep::Analyze => "analyze",
            PipelineStep::Plan => "plan",
            PipelineStep::EncodeSegments => "encode-segments",
            PipelineStep::Concatenate => "concatenate",
        };
        f.write_str(name)
    }
}

/// Summary of one successful run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub crop_data: PathBuf,
    pub segments: usize,
    pub geometry: CropGeometry,
}

/// Derived output path: `<stem>_vertical_crop.mp4` under `output_dir`.
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "video".to_string());
    output_dir.join(format!("{}_vertical_crop.mp4", stem))
}

/// Derived crop-data path: `<stem>_crop_data.json` under `output_dir`.
pub fn crop_data_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "video".to_string());
    output_dir.join(format!("{}_crop_data.json", stem))
}

/// One-video pipeline, written against the [`EncodeBackend`] trait.
pub struct Pipeline<'a> {
    backend: &'a dyn EncodeBackend,
    oracle: &'a dyn FocusOracle,
}

impl<'a> Pipeline<'a> {
    pub fn new(backend: &'a dyn EncodeBackend, oracle: &'a dyn FocusOracle) -> Self {
        Self { backend, oracle }
    }

    /// Run the full pipeline for one video. Local scratch artifacts are
    /// dropped with the backend on every exit path; remote artifacts are
    /// left for external garbage collection.
    pub async fn run(&self, input: &Path, output_dir: &Path) -> PipelineResult<PipelineReport> {
        if !input.exists() {
            return Err(PipelineError::InputNotFound(input.to_path_buf()));
        }

        let info = self
            .analyze(input)
            .await
            .map_err(|e| PipelineError::at_step(PipelineStep::Analyze, e))?;

        self.run_with_info(input, info, output_dir).await
    }

    /// Run the pipeline with an already-probed source snapshot.
    pub async fn run_with_info(
        &self,
        input: &Path,
        info: SourceVideoInfo,
        output_dir: &Path,
    ) -> PipelineResult<PipelineReport> {
        info!(input = %input.display(), backend = self.backend.name(), "Pipeline starting");

        let geometry = if info.width == 0 || info.height == 0 {
            warn!("Source resolution unknown, using fallback geometry");
            CropGeometry::fallback()
        } else {
            CropGeometry::resolve(info.width, info.height)
        };

        // Plan
        let (keyframes, specs) = async {
            let keyframes = self
                .oracle
                .analyze(input, info.width, info.height)
                .await?;
            for kf in &keyframes {
                kf.check_schema(&geometry)
                    .map_err(|e| PipelineError::oracle(e.to_string()))?;
            }
            let specs = plan_segments(&keyframes, &geometry)?;
            Ok::<_, PipelineError>((keyframes, specs))
        }
        .await
        .map_err(|e| PipelineError::at_step(PipelineStep::Plan, e))?;

        info!(segments = specs.len(), "Segment plan ready");

        tokio::fs::create_dir_all(output_dir).await?;
        let crop_data = crop_data_path_for(input, output_dir);
        save_crop_data(&keyframes, &crop_data)
            .map_err(|e| PipelineError::at_step(PipelineStep::Plan, e))?;

        // Encode
        let artifacts = async {
            self.backend.prepare(input, &info).await?;
            self.backend.encode_segments(input, &specs).await
        }
        .await
        .map_err(|e| PipelineError::at_step(PipelineStep::EncodeSegments, e))?;

        // Concatenate
        let output = output_path_for(input, output_dir);
        self.backend
            .concatenate(&artifacts, &output)
            .await
            .map_err(|e| PipelineError::at_step(PipelineStep::Concatenate, e))?;

        info!(output = %output.display(), "Pipeline finished");

        Ok(PipelineReport {
            input: input.to_path_buf(),
            output,
            crop_data,
            segments: specs.len(),
            geometry,
        })
    }

    async fn analyze(&self, input: &Path) -> PipelineResult<SourceVideoInfo> {
        let info = probe_source(input).await?;

        info!(
            resolution = %format!("{}x{}", info.width, info.height),
            duration_secs = info.duration,
            fps = info.frame_rate,
            video_codec = %info.video_codec,
            audio_codec = info.audio_codec.as_deref().unwrap_or("none"),
            size_bytes = info.size_bytes,
            "Source analyzed"
        );

        Ok(info)
    }
}
