//! Remote batch transcoding service client.
//!
//! Jobs are described by strongly-typed, validated request builders and
//! driven to a terminal state by fixed-interval polling with a wall-clock
//! deadline.

pub mod client;
pub mod error;
pub mod job;

pub use client::{TranscoderClient, TranscoderConfig};
pub use error::{TranscoderError, TranscoderResult};
pub use job::{
    ConcatJobBuilder, CropMargins, EditAtom, Job, JobConfig, JobRequest, JobState,
    SegmentJobBuilder, OUTPUT_STREAM_KEY,
};
