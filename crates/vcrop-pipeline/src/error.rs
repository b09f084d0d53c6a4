//! Pipeline error types.

use thiserror::Error;

use vcrop_media::MediaError;
use vcrop_models::{KeyframeError, PlanError};
use vcrop_storage::StorageError;
use vcrop_transcoder::TranscoderError;

use crate::pipeline::PipelineStep;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that can occur running the pipeline, aggregating the per-crate
/// taxonomies. All variants are fatal to the single-video run; the batch
/// driver catches them per video and continues.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{step} step failed: {source}")]
    Step {
        step: PipelineStep,
        #[source]
        source: Box<PipelineError>,
    },

    #[error("Focus analysis failed: {0}")]
    Oracle(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input not found: {0}")]
    InputNotFound(std::path::PathBuf),

    #[error(transparent)]
    Keyframe(#[from] KeyframeError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Transcoder(#[from] TranscoderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Tag an error with the pipeline step it surfaced in.
    pub fn at_step(step: PipelineStep, source: impl Into<PipelineError>) -> Self {
        Self::Step {
            step,
            source: Box::new(source.into()),
        }
    }

    pub fn oracle(msg: impl Into<String>) -> Self {
        Self::Oracle(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
