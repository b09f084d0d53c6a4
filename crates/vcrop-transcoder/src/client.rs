//! Transcoding service HTTP client.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{TranscoderError, TranscoderResult};
use crate::job::{Job, JobRequest, JobState, OUTPUT_STREAM_KEY};

/// Configuration for the transcoder client.
#[derive(Debug, Clone)]
pub struct TranscoderConfig {
    /// Base URL of the transcoding service
    pub base_url: String,
    /// Project the jobs are billed against
    pub project_id: String,
    /// Region the jobs run in
    pub region: String,
    /// Fixed interval between job status polls
    pub poll_interval: Duration,
    /// Wall-clock limit for one job to reach a terminal state
    pub job_timeout: Duration,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
}

impl TranscoderConfig {
    /// Create config from environment variables.
    pub fn from_env() -> TranscoderResult<Self> {
        Ok(Self {
            base_url: std::env::var("TRANSCODER_BASE_URL")
                .map_err(|_| TranscoderError::config_error("TRANSCODER_BASE_URL not set"))?,
            project_id: std::env::var("TRANSCODER_PROJECT_ID")
                .map_err(|_| TranscoderError::config_error("TRANSCODER_PROJECT_ID not set"))?,
            region: std::env::var("TRANSCODER_REGION")
                .unwrap_or_else(|_| "us-central1".to_string()),
            poll_interval: Duration::from_secs(
                std::env::var("TRANSCODER_POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            job_timeout: Duration::from_secs(
                std::env::var("TRANSCODER_JOB_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3600),
            ),
            request_timeout: Duration::from_secs(30),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ServiceStatus {
    state: String,
}

/// Client for the remote batch transcoding service.
pub struct TranscoderClient {
    http: Client,
    config: TranscoderConfig,
}

impl TranscoderClient {
    /// Create a new client.
    pub fn new(config: TranscoderConfig) -> TranscoderResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(TranscoderError::Http)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> TranscoderResult<Self> {
        Self::new(TranscoderConfig::from_env()?)
    }

    fn jobs_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/jobs",
            self.config.base_url, self.config.project_id, self.config.region
        )
    }

    fn service_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/services/transcoder",
            self.config.base_url, self.config.project_id
        )
    }

    /// Output URI a succeeded job's result lives at.
    pub fn output_uri(request: &JobRequest) -> String {
        format!(
            "{}{}.mp4",
            request.output_prefix(),
            OUTPUT_STREAM_KEY
        )
    }

    /// Verify the transcoding service is enabled, attempting a one-shot
    /// enable if it is not. No retry loop: probe, enable once, re-probe.
    pub async fn ensure_capability(&self) -> TranscoderResult<()> {
        if self.service_enabled().await? {
            debug!("Transcoding service enabled");
            return Ok(());
        }

        info!("Transcoding service disabled, attempting to enable");
        let url = format!("{}:enable", self.service_url());
        let response = self.http.post(&url).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(status, "Service enable request rejected");
            return Err(TranscoderError::CapabilityUnavailable(format!(
                "enable request returned {}: {}",
                status, body
            )));
        }

        if self.service_enabled().await? {
            return Ok(());
        }

        Err(TranscoderError::CapabilityUnavailable(
            "service still disabled after enable attempt".to_string(),
        ))
    }

    async fn service_enabled(&self) -> TranscoderResult<bool> {
        let response = self.http.get(self.service_url()).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TranscoderError::api(status, body));
        }
        let status: ServiceStatus = response.json().await?;
        Ok(status.state == "ENABLED")
    }

    /// Submit a job. Returns the job resource with its server-assigned name.
    pub async fn create_job(&self, request: &JobRequest) -> TranscoderResult<Job> {
        let url = self.jobs_url();
        debug!(output = %request.output_prefix(), "Submitting transcoding job");

        let response = self.http.post(&url).json(request).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TranscoderError::api(status, body));
        }

        let job: Job = response.json().await?;
        info!(job = %job.name, "Transcoding job created");
        Ok(job)
    }

    /// Fetch the current state of a job by its resource name.
    pub async fn get_job(&self, job_name: &str) -> TranscoderResult<Job> {
        let url = format!("{}/{}", self.config.base_url, job_name.trim_start_matches('/'));
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TranscoderError::api(status, body));
        }
        Ok(response.json().await?)
    }

    /// Poll a job at the configured interval until it reaches a terminal
    /// state. `SUCCEEDED` returns the job; `FAILED` and a wall-clock
    /// timeout are both terminal errors, never retried.
    pub async fn wait_for_job(&self, job_name: &str) -> TranscoderResult<Job> {
        let deadline = Instant::now() + self.config.job_timeout;

        loop {
            let job = self.get_job(job_name).await?;

            match job.state {
                JobState::Succeeded => {
                    info!(job = %job.name, "Transcoding job succeeded");
                    return Ok(job);
                }
                JobState::Failed => {
                    let message = job
                        .error
                        .as_ref()
                        .and_then(|e| e.message.clone())
                        .unwrap_or_else(|| "no error detail".to_string());
                    return Err(TranscoderError::job_failed(job.name, message));
                }
                state => {
                    debug!(job = %job.name, ?state, "Job still in flight");
                }
            }

            if Instant::now() >= deadline {
                return Err(TranscoderError::Timeout {
                    job_name: job_name.to_string(),
                    timeout_secs: self.config.job_timeout.as_secs(),
                });
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Submit a job and wait for it, returning the output URI on success.
    pub async fn run_job(&self, request: &JobRequest) -> TranscoderResult<String> {
        let output = Self::output_uri(request);
        let job = self.create_job(request).await?;
        self.wait_for_job(&job.name).await?;
        Ok(output)
    }
}
