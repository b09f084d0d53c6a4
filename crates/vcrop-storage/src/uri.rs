//! `s3://bucket/key` URI helpers.
//!
//! The transcoding service addresses inputs and outputs by URI while the
//! SDK client works with bucket + key, so both directions are needed.

use crate::error::{StorageError, StorageResult};

const SCHEME: &str = "s3://";

/// Join a bucket and key into a blob URI.
pub fn blob_uri(bucket: &str, key: &str) -> String {
    format!("{}{}/{}", SCHEME, bucket, key.trim_start_matches('/'))
}

/// Split a blob URI into (bucket, key).
pub fn split_blob_uri(uri: &str) -> StorageResult<(String, String)> {
    let rest = uri
        .strip_prefix(SCHEME)
        .ok_or_else(|| StorageError::invalid_uri(uri))?;

    let (bucket, key) = rest
        .split_once('/')
        .ok_or_else(|| StorageError::invalid_uri(uri))?;

    if bucket.is_empty() || key.is_empty() {
        return Err(StorageError::invalid_uri(uri));
    }

    Ok((bucket.to_string(), key.to_string()))
}
