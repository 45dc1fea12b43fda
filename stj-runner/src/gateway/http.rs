//! HTTP implementation of [`JobGateway`]
//!
//! Configuration is fixed at construction and never mutated. The
//! subscription key is attached to each service request individually; it is
//! never sent to result locations, which are pre-signed URLs on other hosts.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::{RequestBuilder, Response, StatusCode};
use std::time::Duration;
use uuid::Uuid;

use super::{DeleteOutcome, JobGateway};
use crate::error::{JobError, JobResult};
use crate::models::{Job, JobDefinition, RateLimitInfo, SubmissionReceipt};

pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OPERATION_LOCATION_HEADER: &str = "operation-location";
const RATE_LIMIT_LIMIT_HEADER: &str = "x-ratelimit-limit";
const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";
const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";
const USER_AGENT: &str = concat!("stj-runner/", env!("CARGO_PKG_VERSION"));

/// Default whole-request timeout (25 minutes; result blobs can be large)
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(25 * 60);

/// Immutable connection settings for the transcription service
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Transcription collection URL; job URLs are `{endpoint}/{id}`
    pub endpoint: String,
    pub subscription_key: String,
    pub request_timeout: Duration,
}

impl GatewayConfig {
    pub fn new(endpoint: impl Into<String>, subscription_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            subscription_key: subscription_key.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn collection_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }

    fn job_url(&self, job_id: Uuid) -> String {
        format!("{}/{}", self.collection_url(), job_id)
    }
}

/// reqwest-backed gateway
pub struct HttpJobGateway {
    http_client: reqwest::Client,
    config: GatewayConfig,
}

impl HttpJobGateway {
    pub fn new(config: GatewayConfig) -> JobResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| JobError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Attach per-request service headers
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(SUBSCRIPTION_KEY_HEADER, &self.config.subscription_key)
            .header(ACCEPT, "application/json")
    }
}

/// Turn a non-success response into `RemoteRejected`, keeping the body for diagnostics
async fn ensure_success(response: Response) -> JobResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(JobError::RemoteRejected {
        status: status.as_u16(),
        body,
    })
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn parse_u32_header(headers: &HeaderMap, name: &str) -> Option<u32> {
    let raw = header_str(headers, name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::debug!(header = name, value = raw, "Ignoring unparsable rate-limit header");
            None
        }
    }
}

/// Build a receipt from submission response headers
///
/// Rate-limit fields are optional metadata; bad values are dropped rather
/// than failing the submission.
pub fn receipt_from_headers(headers: &HeaderMap) -> SubmissionReceipt {
    let reset = header_str(headers, RATE_LIMIT_RESET_HEADER).and_then(|raw| {
        let parsed = stj_common::time::parse_reset_timestamp(raw);
        if parsed.is_none() {
            tracing::debug!(value = raw, "Ignoring unparsable rate-limit reset header");
        }
        parsed
    });

    SubmissionReceipt {
        operation_location: header_str(headers, OPERATION_LOCATION_HEADER)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string),
        rate_limit: RateLimitInfo {
            limit: parse_u32_header(headers, RATE_LIMIT_LIMIT_HEADER),
            remaining: parse_u32_header(headers, RATE_LIMIT_REMAINING_HEADER),
            reset,
        },
    }
}

#[async_trait]
impl JobGateway for HttpJobGateway {
    async fn submit(&self, definition: &JobDefinition) -> JobResult<SubmissionReceipt> {
        tracing::debug!(
            endpoint = %self.config.collection_url(),
            recording = %definition.recordings_url(),
            "Submitting transcription job"
        );

        let response = self
            .authorized(self.http_client.post(self.config.collection_url()))
            .json(definition)
            .send()
            .await?;

        let response = ensure_success(response).await?;
        Ok(receipt_from_headers(response.headers()))
    }

    async fn list(&self) -> JobResult<Vec<Job>> {
        let response = self
            .authorized(self.http_client.get(self.config.collection_url()))
            .send()
            .await?;

        let response = ensure_success(response).await?;
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| JobError::Decode(e.to_string()))
    }

    async fn delete(&self, job_id: Uuid) -> JobResult<DeleteOutcome> {
        let response = self
            .authorized(self.http_client.delete(self.config.job_url(job_id)))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(job_id = %job_id, "Job already gone");
            return Ok(DeleteOutcome::AlreadyGone);
        }

        ensure_success(response).await?;
        Ok(DeleteOutcome::Deleted)
    }

    async fn fetch_result(&self, location: &str) -> JobResult<Vec<u8>> {
        let response = self.http_client.get(location).send().await?;
        let response = ensure_success(response).await?;
        let body = response.bytes().await?;

        Ok(body.to_vec())
    }
}
