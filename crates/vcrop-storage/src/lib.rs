//! S3-compatible blob store client for the vertical crop pipeline.
//!
//! The cloud encode backend stages sources and collects results through
//! this crate; the transcoding service only ever sees blob URIs.

pub mod client;
pub mod error;
pub mod uri;

pub use client::{BlobStore, BlobStoreConfig};
pub use error::{StorageError, StorageResult};
pub use uri::{blob_uri, split_blob_uri};
