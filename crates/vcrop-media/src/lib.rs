//! FFmpeg CLI wrapper for the local encode backend.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - Source probing via FFprobe
//! - Per-segment crop+trim re-encoding
//! - Concat-demuxer stream-copy reassembly

pub mod command;
pub mod concat;
pub mod encode;
pub mod error;
pub mod probe;

pub use command::{check_ffmpeg, check_ffprobe, CommandOutput, FfmpegCommand};
pub use concat::{concat_segments, write_concat_manifest};
pub use encode::{encode_cropped_segment, segment_file_name};
pub use error::{MediaError, MediaResult};
pub use probe::probe_source;
