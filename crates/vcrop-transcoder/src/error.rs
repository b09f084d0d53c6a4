//! Transcoder client error types.

use thiserror::Error;

/// Result type for transcoder operations.
pub type TranscoderResult<T> = Result<T, TranscoderError>;

/// Errors that can occur driving the remote transcoding service.
#[derive(Debug, Error)]
pub enum TranscoderError {
    #[error("Failed to configure transcoder client: {0}")]
    ConfigError(String),

    #[error("Invalid job request: {0}")]
    InvalidJob(String),

    #[error("Job {job_name} failed: {message}")]
    JobFailed { job_name: String, message: String },

    #[error("Job {job_name} did not reach a terminal state within {timeout_secs}s")]
    Timeout { job_name: String, timeout_secs: u64 },

    #[error("Transcoding service unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error("Transcoder API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse API response: {0}")]
    Json(#[from] serde_json::Error),
}

impl TranscoderError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn invalid_job(msg: impl Into<String>) -> Self {
        Self::InvalidJob(msg.into())
    }

    pub fn job_failed(job_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JobFailed {
            job_name: job_name.into(),
            message: message.into(),
        }
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }
}
