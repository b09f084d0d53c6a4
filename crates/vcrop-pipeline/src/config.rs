//! Pipeline configuration.

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{PipelineError, PipelineResult};

/// Which encode backend a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Local,
    Cloud,
}

impl FromStr for BackendKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> PipelineResult<Self> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "cloud" => Ok(Self::Cloud),
            other => Err(PipelineError::config(format!(
                "unknown backend '{}', expected 'local' or 'cloud'",
                other
            ))),
        }
    }
}

/// Pipeline-level configuration. The storage and transcoder clients carry
/// their own `from_env` configs; this holds what the orchestrator and
/// batch driver need.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory scanned by `--all`
    pub input_dir: PathBuf,
    /// Directory outputs and crop-data files are written to
    pub output_dir: PathBuf,
    /// Which backend to encode with
    pub backend: BackendKind,
    /// Fan-out limit for concurrent cloud segment jobs
    pub max_cloud_jobs: usize,
    /// How many videos a batch run processes in parallel
    pub max_parallel_videos: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("videos"),
            output_dir: PathBuf::from("output"),
            backend: BackendKind::Local,
            max_cloud_jobs: 4,
            max_parallel_videos: 2,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            input_dir: std::env::var("VCROP_INPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.input_dir),
            output_dir: std::env::var("VCROP_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            backend: std::env::var("VCROP_BACKEND")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.backend),
            max_cloud_jobs: std::env::var("VCROP_MAX_CLOUD_JOBS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_cloud_jobs),
            max_parallel_videos: std::env::var("VCROP_MAX_PARALLEL_VIDEOS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_parallel_videos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_parses() {
        assert_eq!("local".parse::<BackendKind>().unwrap(), BackendKind::Local);
        assert_eq!("Cloud".parse::<BackendKind>().unwrap(), BackendKind::Cloud);
        assert!("gpu".parse::<BackendKind>().is_err());
    }
}
