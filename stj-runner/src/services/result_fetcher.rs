//! Transcript download for succeeded jobs

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::cancel::until_cancelled;
use crate::error::{JobError, JobResult};
use crate::gateway::JobGateway;
use crate::models::Job;

/// Result channel read when none is configured
pub const DEFAULT_RESULT_CHANNEL: &str = "channel_0";

/// Downloaded transcript for one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub job_id: Uuid,
    pub channel: String,
    pub location: String,
    pub text: String,
}

pub struct ResultFetcher {
    gateway: Arc<dyn JobGateway>,
    channel: String,
}

impl ResultFetcher {
    pub fn new(gateway: Arc<dyn JobGateway>, channel: impl Into<String>) -> Self {
        Self {
            gateway,
            channel: channel.into(),
        }
    }

    /// Download the configured channel's transcript into memory
    ///
    /// # Errors
    /// `MissingResultChannel` if the job lists no such channel, `Transport` /
    /// `RemoteRejected` from the download, `Decode` if the body is not UTF-8.
    pub async fn fetch(&self, job: &Job, cancel_token: &CancellationToken) -> JobResult<Transcript> {
        let location = job
            .result_location(&self.channel)
            .ok_or_else(|| JobError::MissingResultChannel {
                job_id: job.id,
                channel: self.channel.clone(),
            })?;

        tracing::debug!(job_id = %job.id, channel = %self.channel, "Downloading transcript");

        let body = until_cancelled(cancel_token, self.gateway.fetch_result(location)).await?;
        let text = String::from_utf8(body)
            .map_err(|e| JobError::Decode(format!("transcript for job {} is not UTF-8: {}", job.id, e)))?;

        tracing::info!(job_id = %job.id, bytes = text.len(), "Transcript downloaded");

        Ok(Transcript {
            job_id: job.id,
            channel: self.channel.clone(),
            location: location.to_string(),
            text,
        })
    }
}
