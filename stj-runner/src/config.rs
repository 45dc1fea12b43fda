//! Run configuration resolution
//!
//! Priority: command line → environment (both arrive through clap as
//! [`CliOverrides`]) → TOML file → compiled default.

use std::path::PathBuf;
use std::time::Duration;
use stj_common::config::TomlConfig;
use stj_common::{Error, Result};
use tracing::{info, warn};

use crate::gateway::http::DEFAULT_REQUEST_TIMEOUT;
use crate::gateway::GatewayConfig;
use crate::models::ModelIdentity;
use crate::services::{
    SubmissionTemplate, TerminationPolicy, WorkflowOptions, DEFAULT_RESULT_CHANNEL,
};
use crate::services::job_poller::DEFAULT_POLL_INTERVAL;

pub const DEFAULT_LOCALE: &str = "en-US";

/// Values supplied on the command line or through environment variables
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub endpoint: Option<String>,
    pub subscription_key: Option<String>,
    pub locale: Option<String>,
    pub recordings: Vec<String>,
    pub models: Vec<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub deadline_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub result_channel: Option<String>,
    pub termination: TerminationPolicy,
    pub skip_reconcile: bool,
    pub output: Option<PathBuf>,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub gateway: GatewayConfig,
    pub workflow: WorkflowOptions,
    pub deadline: Option<Duration>,
    pub output: Option<PathBuf>,
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve the subscription key from CLI/ENV, then TOML
pub fn resolve_subscription_key(cli: Option<&str>, toml: Option<&str>) -> Result<String> {
    let cli = cli.filter(|k| is_valid_key(k));
    let toml = toml.filter(|k| is_valid_key(k));

    if cli.is_some() && toml.is_some() {
        warn!("Subscription key found on command line/environment and in TOML config. Using command line/environment.");
    }

    if let Some(key) = cli {
        info!("Subscription key loaded from command line/environment");
        return Ok(key.to_string());
    }

    if let Some(key) = toml {
        info!("Subscription key loaded from TOML config");
        return Ok(key.to_string());
    }

    Err(Error::Config(
        "Subscription key not configured. Provide one of:\n\
         1. Command line: --subscription-key <key>\n\
         2. Environment: STJ_SUBSCRIPTION_KEY=<key>\n\
         3. TOML config: subscription_key = \"<key>\""
            .to_string(),
    ))
}

fn validate_endpoint(endpoint: &str) -> Result<String> {
    let url = reqwest::Url::parse(endpoint)
        .map_err(|e| Error::Config(format!("Invalid endpoint '{}': {}", endpoint, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(endpoint.to_string()),
        other => Err(Error::Config(format!(
            "Endpoint must use http or https, got '{}'",
            other
        ))),
    }
}

fn parse_models(raw: &[String]) -> Result<Vec<ModelIdentity>> {
    raw.iter()
        .map(|id| {
            stj_common::uuid_utils::parse(id.trim())
                .map(ModelIdentity::new)
                .map_err(|e| Error::Config(format!("Invalid model id '{}': {}", id, e)))
        })
        .collect()
}

impl RunConfig {
    pub fn resolve(cli: CliOverrides, toml: TomlConfig) -> Result<Self> {
        let endpoint = cli
            .endpoint
            .or(toml.endpoint)
            .ok_or_else(|| Error::Config("Endpoint not configured (--endpoint, STJ_ENDPOINT, or `endpoint` in TOML)".to_string()))?;
        let endpoint = validate_endpoint(&endpoint)?;

        let subscription_key =
            resolve_subscription_key(cli.subscription_key.as_deref(), toml.subscription_key.as_deref())?;

        let recordings = if cli.recordings.is_empty() {
            toml.recordings
        } else {
            cli.recordings
        };
        if recordings.is_empty() {
            return Err(Error::Config(
                "No recordings to transcribe (--recording or `recordings` in TOML)".to_string(),
            ));
        }

        let models = if cli.models.is_empty() {
            parse_models(&toml.models)?
        } else {
            parse_models(&cli.models)?
        };

        let poll_interval = match cli.poll_interval_secs.or(toml.poll_interval_secs) {
            Some(0) => return Err(Error::Config("Poll interval must be greater than zero".to_string())),
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_POLL_INTERVAL,
        };

        let request_timeout = match cli.request_timeout_secs.or(toml.request_timeout_secs) {
            Some(0) => return Err(Error::Config("Request timeout must be greater than zero".to_string())),
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let defaults = SubmissionTemplate::default();
        let template = SubmissionTemplate {
            name: cli.name.or(toml.name).unwrap_or(defaults.name),
            description: cli.description.or(toml.description).unwrap_or(defaults.description),
        };

        let workflow = WorkflowOptions {
            recordings,
            locale: cli
                .locale
                .or(toml.locale)
                .unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
            models,
            template,
            result_channel: cli
                .result_channel
                .or(toml.result_channel)
                .unwrap_or_else(|| DEFAULT_RESULT_CHANNEL.to_string()),
            policy: cli.termination,
            poll_interval,
            reconcile: !cli.skip_reconcile,
        };

        Ok(Self {
            gateway: GatewayConfig::new(endpoint, subscription_key).with_request_timeout(request_timeout),
            workflow,
            deadline: cli
                .deadline_secs
                .or(toml.deadline_secs)
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            output: cli.output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_cli() -> CliOverrides {
        CliOverrides {
            endpoint: Some("https://westus.cris.ai/api/speechtotext/v2.0/transcriptions".to_string()),
            subscription_key: Some("cli-key".to_string()),
            recordings: vec!["https://audio.example/a.wav".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_applied() {
        let config = RunConfig::resolve(minimal_cli(), TomlConfig::default()).unwrap();

        assert_eq!(config.workflow.locale, "en-US");
        assert_eq!(config.workflow.result_channel, "channel_0");
        assert_eq!(config.workflow.poll_interval, Duration::from_secs(5));
        assert_eq!(config.workflow.policy, TerminationPolicy::AllCreated);
        assert!(config.workflow.reconcile);
        assert_eq!(config.gateway.request_timeout, Duration::from_secs(1500));
        assert!(config.deadline.is_none());
    }

    #[test]
    fn test_cli_overrides_toml() {
        let toml = TomlConfig {
            endpoint: Some("https://eastus.cris.ai/api/speechtotext/v2.0/transcriptions".to_string()),
            subscription_key: Some("toml-key".to_string()),
            locale: Some("de-DE".to_string()),
            recordings: vec!["https://audio.example/toml.wav".to_string()],
            poll_interval_secs: Some(30),
            ..Default::default()
        };

        let mut cli = minimal_cli();
        cli.poll_interval_secs = Some(2);

        let config = RunConfig::resolve(cli, toml).unwrap();
        assert_eq!(config.gateway.subscription_key, "cli-key");
        assert!(config.gateway.endpoint.contains("westus"));
        assert_eq!(config.workflow.recordings, vec!["https://audio.example/a.wav".to_string()]);
        assert_eq!(config.workflow.locale, "de-DE");
        assert_eq!(config.workflow.poll_interval, Duration::from_secs(2));
    }

    #[test]
    fn test_blank_cli_key_falls_back_to_toml() {
        let mut cli = minimal_cli();
        cli.subscription_key = Some("   ".to_string());
        let toml = TomlConfig {
            subscription_key: Some("toml-key".to_string()),
            ..Default::default()
        };

        let config = RunConfig::resolve(cli, toml).unwrap();
        assert_eq!(config.gateway.subscription_key, "toml-key");
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let mut cli = minimal_cli();
        cli.subscription_key = None;
        assert!(matches!(
            RunConfig::resolve(cli, TomlConfig::default()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_invalid_model_id_rejected() {
        let mut cli = minimal_cli();
        cli.models = vec!["not-a-uuid".to_string()];
        match RunConfig::resolve(cli, TomlConfig::default()) {
            Err(Error::Config(msg)) => assert!(msg.contains("not-a-uuid")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let mut cli = minimal_cli();
        cli.poll_interval_secs = Some(0);
        assert!(RunConfig::resolve(cli, TomlConfig::default()).is_err());
    }

    #[test]
    fn test_non_http_endpoint_rejected() {
        let mut cli = minimal_cli();
        cli.endpoint = Some("ftp://westus.cris.ai/transcriptions".to_string());
        assert!(RunConfig::resolve(cli, TomlConfig::default()).is_err());
    }

    #[test]
    fn test_no_recordings_rejected() {
        let mut cli = minimal_cli();
        cli.recordings.clear();
        assert!(RunConfig::resolve(cli, TomlConfig::default()).is_err());
    }

    #[test]
    fn test_zero_deadline_means_none() {
        let mut cli = minimal_cli();
        cli.deadline_secs = Some(0);
        let config = RunConfig::resolve(cli, TomlConfig::default()).unwrap();
        assert!(config.deadline.is_none());
    }
}
