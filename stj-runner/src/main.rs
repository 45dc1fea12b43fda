//! stj-runner - Batch transcription job runner
//!
//! Deletes existing jobs visible to the subscription key, submits one job per
//! recording, polls until they succeed, and prints the transcripts.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use stj_runner::cancel::cancel_after;
use stj_runner::config::{CliOverrides, RunConfig};
use stj_runner::gateway::HttpJobGateway;
use stj_runner::logging;
use stj_runner::output::{render_transcripts, write_transcripts};
use stj_runner::services::{JobWorkflow, TerminationPolicy};
use stj_runner::JobError;

/// Exit status for an interrupted run (128 + SIGINT)
const EXIT_CANCELLED: u8 = 130;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum Termination {
    /// Wait until every submitted job has succeeded
    #[default]
    AllCreated,
    /// Stop at the first submitted job that succeeds
    FirstSuccess,
}

impl From<Termination> for TerminationPolicy {
    fn from(value: Termination) -> Self {
        match value {
            Termination::AllCreated => TerminationPolicy::AllCreated,
            Termination::FirstSuccess => TerminationPolicy::FirstSuccess,
        }
    }
}

/// Command-line arguments for stj-runner
#[derive(Parser, Debug)]
#[command(name = "stj-runner")]
#[command(about = "Submit batch transcription jobs and wait for their transcripts")]
#[command(version)]
struct Args {
    /// Config file (default: <config dir>/stj/config.toml)
    #[arg(short, long, env = "STJ_CONFIG")]
    config: Option<PathBuf>,

    /// Transcription collection URL of the regional service
    #[arg(long, env = "STJ_ENDPOINT")]
    endpoint: Option<String>,

    /// Service subscription key
    #[arg(long, env = "STJ_SUBSCRIPTION_KEY", hide_env_values = true)]
    subscription_key: Option<String>,

    /// Recording locale, e.g. en-US
    #[arg(short, long, env = "STJ_LOCALE")]
    locale: Option<String>,

    /// Audio source URI (repeatable)
    #[arg(short, long = "recording", env = "STJ_RECORDING")]
    recordings: Vec<String>,

    /// Acoustic or language model id (repeatable)
    #[arg(short, long = "model")]
    models: Vec<String>,

    /// Job name
    #[arg(long)]
    name: Option<String>,

    /// Job description
    #[arg(long)]
    description: Option<String>,

    /// Seconds between poll cycles
    #[arg(long)]
    poll_interval_secs: Option<u64>,

    /// Give up after this many seconds (0 = never)
    #[arg(long)]
    deadline_secs: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long)]
    request_timeout_secs: Option<u64>,

    /// Result channel to download
    #[arg(long)]
    result_channel: Option<String>,

    /// When to stop polling
    #[arg(long, value_enum, default_value_t = Termination::AllCreated)]
    termination: Termination,

    /// Keep existing jobs instead of deleting them first
    #[arg(long)]
    skip_reconcile: bool,

    /// Write transcripts here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Args {
    fn into_overrides(self) -> CliOverrides {
        CliOverrides {
            endpoint: self.endpoint,
            subscription_key: self.subscription_key,
            locale: self.locale,
            recordings: self.recordings,
            models: self.models,
            name: self.name,
            description: self.description,
            poll_interval_secs: self.poll_interval_secs,
            deadline_secs: self.deadline_secs,
            request_timeout_secs: self.request_timeout_secs,
            result_channel: self.result_channel,
            termination: self.termination.into(),
            skip_reconcile: self.skip_reconcile,
            output: self.output,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Tracing goes to stderr so stdout carries only transcripts
    let log_level = logging::init();

    info!("Starting stj-runner");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let toml_config = stj_common::config::load_config(args.config.as_deref())
        .context("Failed to load config file")?;
    log_level.apply_configured_level(&toml_config.logging.level);

    let config = RunConfig::resolve(args.into_overrides(), toml_config)
        .context("Invalid configuration")?;

    info!(
        endpoint = %config.gateway.endpoint,
        recordings = config.workflow.recordings.len(),
        locale = %config.workflow.locale,
        "Configuration resolved"
    );

    let gateway = Arc::new(
        HttpJobGateway::new(config.gateway.clone()).context("Failed to create HTTP client")?,
    );

    let cancel_token = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel_token.clone()));
    if let Some(deadline) = config.deadline {
        cancel_after(cancel_token.clone(), deadline);
    }

    let workflow = JobWorkflow::new(gateway, config.workflow.clone());
    let summary = match workflow.run(&cancel_token).await {
        Ok(summary) => summary,
        Err(JobError::Cancelled) => {
            warn!("Run cancelled before completion");
            return Ok(ExitCode::from(EXIT_CANCELLED));
        }
        Err(e) => {
            error!(error = %e, "Transcription run failed");
            return Err(e).context("Transcription run failed");
        }
    };
    cancel_token.cancel();

    match &config.output {
        Some(path) => write_transcripts(path, &summary.transcripts)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{}", render_transcripts(&summary.transcripts)),
    }

    if summary.transcripts.len() < summary.created.len() {
        warn!(
            created = summary.created.len(),
            delivered = summary.transcripts.len(),
            "Some transcripts could not be delivered"
        );
    }

    Ok(ExitCode::SUCCESS)
}

/// Cancel the run on Ctrl+C or SIGTERM
async fn cancel_on_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, cancelling"),
        _ = terminate => info!("Received SIGTERM, cancelling"),
        _ = cancel_token.cancelled() => return,
    }

    cancel_token.cancel();
}
