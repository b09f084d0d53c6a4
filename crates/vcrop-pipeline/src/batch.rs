//! Batch driver: runs independent per-video pipelines over a directory.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::backend::EncodeBackend;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::oracle::FileOracle;
use crate::pipeline::{Pipeline, PipelineReport};

/// Builds a fresh backend for each video, so every run gets its own
/// scratch directory or remote run prefix.
pub type BackendFactory =
    Arc<dyn Fn() -> PipelineResult<Box<dyn EncodeBackend>> + Send + Sync>;

/// Aggregate result of a batch run.
#[derive(Debug, Clone, Copy)]
pub struct BatchOutcome {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchOutcome {
    /// Process exit code: 0 = all succeeded, 1 = nothing succeeded (or no
    /// inputs found), 2 = partial failure.
    pub fn exit_code(&self) -> i32 {
        if self.total == 0 {
            1
        } else if self.failed == 0 {
            0
        } else if self.succeeded == 0 {
            1
        } else {
            2
        }
    }
}

/// Run one video through a freshly built backend, with its crop data
/// coming from the conventional sidecar file.
pub async fn run_single(
    config: &PipelineConfig,
    factory: &BackendFactory,
    input: &Path,
) -> PipelineResult<PipelineReport> {
    if !input.exists() {
        return Err(PipelineError::InputNotFound(input.to_path_buf()));
    }

    let backend = factory()?;
    let oracle = FileOracle::new(FileOracle::sidecar_for(input));
    let pipeline = Pipeline::new(backend.as_ref(), &oracle);
    pipeline.run(input, &config.output_dir).await
}

/// Run every `.mp4` in the input directory. One video's failure never
/// aborts the batch; failures are counted and reflected in the exit code.
pub async fn run_batch(
    config: &PipelineConfig,
    factory: BackendFactory,
) -> PipelineResult<BatchOutcome> {
    let inputs = scan_inputs(&config.input_dir)?;
    if inputs.is_empty() {
        warn!(dir = %config.input_dir.display(), "No input videos found");
        return Ok(BatchOutcome {
            total: 0,
            succeeded: 0,
            failed: 0,
        });
    }

    info!(
        videos = inputs.len(),
        parallel = config.max_parallel_videos,
        "Batch starting"
    );

    let succeeded = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let slots = Arc::new(Semaphore::new(config.max_parallel_videos.max(1)));

    let mut handles = Vec::with_capacity(inputs.len());
    for input in &inputs {
        let input = input.clone();
        let config = config.clone();
        let factory = Arc::clone(&factory);
        let succeeded = Arc::clone(&succeeded);
        let failed = Arc::clone(&failed);
        let slots = Arc::clone(&slots);

        handles.push(tokio::spawn(async move {
            let _permit = match slots.acquire_owned().await {
                Ok(p) => p,
                Err(_) => return,
            };

            match run_single(&config, &factory, &input).await {
                Ok(report) => {
                    info!(
                        input = %report.input.display(),
                        output = %report.output.display(),
                        segments = report.segments,
                        "Video succeeded"
                    );
                    succeeded.fetch_add(1, Ordering::SeqCst);
                }
                Err(e) => {
                    error!(input = %input.display(), error = %e, "Video failed");
                    failed.fetch_add(1, Ordering::SeqCst);
                }
            }
        }));
    }

    for handle in handles {
        if handle.await.is_err() {
            failed.fetch_add(1, Ordering::SeqCst);
        }
    }

    let outcome = BatchOutcome {
        total: inputs.len(),
        succeeded: succeeded.load(Ordering::SeqCst),
        failed: failed.load(Ordering::SeqCst),
    };

    info!(
        total = outcome.total,
        succeeded = outcome.succeeded,
        failed = outcome.failed,
        "Batch finished"
    );

    Ok(outcome)
}

fn scan_inputs(dir: &Path) -> PipelineResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(PipelineError::InputNotFound(dir.to_path_buf()));
    }

    let mut inputs: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("mp4"))
                .unwrap_or(false)
        })
        .collect();

    inputs.sort();
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let all_ok = BatchOutcome {
            total: 3,
            succeeded: 3,
            failed: 0,
        };
        assert_eq!(all_ok.exit_code(), 0);

        let partial = BatchOutcome {
            total: 3,
            succeeded: 2,
            failed: 1,
        };
        assert_eq!(partial.exit_code(), 2);

        let none_ok = BatchOutcome {
            total: 3,
            succeeded: 0,
            failed: 3,
        };
        assert_eq!(none_ok.exit_code(), 1);

        let empty = BatchOutcome {
            total: 0,
            succeeded: 0,
            failed: 0,
        };
        assert_eq!(empty.exit_code(), 1);
    }

    #[test]
    fn test_scan_inputs_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.mp4"), b"").unwrap();
        std::fs::write(dir.path().join("a.MP4"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();
        std::fs::write(dir.path().join("c_crop_data.json"), b"[]").unwrap();

        let inputs = scan_inputs(dir.path()).unwrap();
        assert_eq!(inputs.len(), 2);
        assert!(inputs[0].ends_with("a.MP4"));
        assert!(inputs[1].ends_with("b.mp4"));
    }

    #[test]
    fn test_scan_missing_dir_errors() {
        let err = scan_inputs(Path::new("/nonexistent/videos")).unwrap_err();
        assert!(matches!(err, PipelineError::InputNotFound(_)));
    }
}
