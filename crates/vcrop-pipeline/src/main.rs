//! Vertical crop CLI binary.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{ArgGroup, Parser};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vcrop_pipeline::{
    run_batch, run_single, BackendFactory, BackendKind, CloudEncodeBackend, EncodeBackend,
    LocalEncodeBackend, PipelineConfig, PipelineResult,
};
use vcrop_storage::BlobStore;
use vcrop_transcoder::{TranscoderClient, TranscoderConfig};

#[derive(Debug, Parser)]
#[command(
    name = "vcrop",
    about = "Convert landscape videos into 9:16 vertical crops",
    group(ArgGroup::new("mode").required(true).args(["all", "input"]))
)]
struct Cli {
    /// Process every .mp4 in the input directory
    #[arg(long)]
    all: bool,

    /// Process a single video file
    #[arg(long)]
    input: Option<PathBuf>,

    /// Encode backend: local or cloud
    #[arg(long)]
    backend: Option<BackendKind>,

    /// Override the input directory for --all
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Override the output directory
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("vcrop=info".parse().expect("valid directive"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

async fn build_factory(config: &PipelineConfig) -> PipelineResult<BackendFactory> {
    match config.backend {
        BackendKind::Local => Ok(Arc::new(|| {
            let backend = LocalEncodeBackend::new()?;
            Ok(Box::new(backend) as Box<dyn EncodeBackend>)
        })),
        BackendKind::Cloud => {
            let store = BlobStore::from_env().await?;
            let transcoder_config = TranscoderConfig::from_env()?;
            let max_jobs = config.max_cloud_jobs;

            Ok(Arc::new(move || {
                let transcoder = TranscoderClient::new(transcoder_config.clone())?;
                let backend = CloudEncodeBackend::new(store.clone(), transcoder, max_jobs);
                Ok(Box::new(backend) as Box<dyn EncodeBackend>)
            }))
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let mut config = PipelineConfig::from_env();
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(input_dir) = cli.input_dir {
        config.input_dir = input_dir;
    }
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }

    info!(backend = ?config.backend, "Starting vcrop");

    let factory = match build_factory(&config).await {
        Ok(f) => f,
        Err(e) => {
            error!("Failed to set up backend: {}", e);
            std::process::exit(1);
        }
    };

    let exit_code = if let Some(input) = cli.input {
        match run_single(&config, &factory, &input).await {
            Ok(report) => {
                info!(
                    output = %report.output.display(),
                    segments = report.segments,
                    "Done"
                );
                0
            }
            Err(e) => {
                error!(input = %input.display(), "Pipeline failed: {}", e);
                1
            }
        }
    } else {
        match run_batch(&config, factory).await {
            Ok(outcome) => outcome.exit_code(),
            Err(e) => {
                error!("Batch failed: {}", e);
                1
            }
        }
    };

    std::process::exit(exit_code);
}
