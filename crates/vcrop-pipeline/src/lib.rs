//! Vertical crop pipeline orchestration.
//!
//! Converts a landscape source into a 9:16 vertical crop by planning
//! time-bounded segments from focus keyframes, encoding each segment
//! through an [`EncodeBackend`] (local ffmpeg or the remote transcoding
//! service), and losslessly reassembling them.

pub mod backend;
pub mod batch;
pub mod cloud;
pub mod config;
pub mod error;
pub mod local;
pub mod oracle;
pub mod pipeline;

pub use backend::{EncodeBackend, SegmentArtifact};
pub use batch::{run_batch, run_single, BackendFactory, BatchOutcome};
pub use cloud::CloudEncodeBackend;
pub use config::{BackendKind, PipelineConfig};
pub use error::{PipelineError, PipelineResult};
pub use local::LocalEncodeBackend;
pub use oracle::{FileOracle, FocusOracle};
pub use pipeline::{crop_data_path_for, output_path_for, Pipeline, PipelineReport, PipelineStep};
