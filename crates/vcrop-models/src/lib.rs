//! Shared data models for the vertical-crop pipeline.
//!
//! This crate provides the pure, side-effect-free core:
//! - Timestamp parsing for the `MM:SS.mmm` keyframe format
//! - Keyframe schema and crop-data file I/O
//! - Crop geometry resolution (9:16 target, even-pixel alignment)
//! - Segment planning from keyframe lists

pub mod geometry;
pub mod keyframe;
pub mod plan;
pub mod timestamp;
pub mod video;

// Re-export common types
pub use geometry::CropGeometry;
pub use keyframe::{load_crop_data, save_crop_data, CropKeyframe, KeyframeError};
pub use plan::{plan_segments, PlanError, SegmentSpec};
pub use timestamp::{format_seconds, parse_timestamp, TimestampError};
pub use video::SourceVideoInfo;
