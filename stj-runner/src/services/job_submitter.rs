//! Job submission
//!
//! Builds the job definition with fixed processing options, submits it, and
//! recovers the new job id from the receipt's operation location.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::cancel::until_cancelled;
use crate::error::{JobError, JobResult};
use crate::gateway::JobGateway;
use crate::models::{JobDefinition, ModelIdentity, ProcessingOptions, SubmissionReceipt};

pub const DEFAULT_JOB_NAME: &str = "Transcription using a speech sample";
pub const DEFAULT_JOB_DESCRIPTION: &str = "An optional description of the transcription.";

/// Name and description stamped on every submitted job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionTemplate {
    pub name: String,
    pub description: String,
}

impl Default for SubmissionTemplate {
    fn default() -> Self {
        Self {
            name: DEFAULT_JOB_NAME.to_string(),
            description: DEFAULT_JOB_DESCRIPTION.to_string(),
        }
    }
}

/// Extract the created job's id from a submission receipt
///
/// # Errors
/// `MalformedReceipt` when the operation location is absent or its last path
/// segment is not a UUID.
pub fn job_id_from_receipt(receipt: &SubmissionReceipt) -> JobResult<Uuid> {
    let location = receipt
        .operation_location
        .as_deref()
        .ok_or_else(|| JobError::MalformedReceipt("no Operation-Location header".to_string()))?;

    stj_common::uuid_utils::trailing_segment_uuid(location).ok_or_else(|| {
        JobError::MalformedReceipt(format!(
            "Operation-Location '{}' does not end in a job id",
            location
        ))
    })
}

pub struct JobSubmitter {
    gateway: Arc<dyn JobGateway>,
    template: SubmissionTemplate,
}

impl JobSubmitter {
    pub fn new(gateway: Arc<dyn JobGateway>, template: SubmissionTemplate) -> Self {
        Self { gateway, template }
    }

    /// Submit one recording and return the created job id
    pub async fn submit_one(
        &self,
        recordings_url: &str,
        locale: &str,
        models: &[ModelIdentity],
        cancel_token: &CancellationToken,
    ) -> JobResult<Uuid> {
        let definition = JobDefinition::new(
            self.template.name.as_str(),
            self.template.description.as_str(),
            locale,
            recordings_url,
            models.iter().copied(),
            ProcessingOptions::default(),
        );

        let receipt = until_cancelled(cancel_token, self.gateway.submit(&definition)).await?;

        if !receipt.rate_limit.is_empty() {
            tracing::info!(
                limit = ?receipt.rate_limit.limit,
                remaining = ?receipt.rate_limit.remaining,
                reset = ?receipt.rate_limit.reset,
                "Service rate limit"
            );
        }

        let job_id = job_id_from_receipt(&receipt)?;

        tracing::info!(
            job_id = %job_id,
            name = %definition.name(),
            recording = %recordings_url,
            locale = %locale,
            models = definition.models().len(),
            "Transcription job submitted"
        );

        Ok(job_id)
    }
}
