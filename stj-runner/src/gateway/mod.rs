//! Remote job service access
//!
//! [`JobGateway`] is the seam between lifecycle logic and the wire. It does
//! request construction and response decoding only: no caching, no retries.

pub mod http;

pub use http::{GatewayConfig, HttpJobGateway, SUBSCRIPTION_KEY_HEADER};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::JobResult;
use crate::models::{Job, JobDefinition, SubmissionReceipt};

/// Result of a delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Job existed and was removed
    Deleted,
    /// Job was already gone (404); nothing to do
    AlreadyGone,
}

/// The four remote operations of the transcription service
#[async_trait]
pub trait JobGateway: Send + Sync {
    /// Create a job from `definition`
    ///
    /// # Errors
    /// `Transport` on connection failure, `RemoteRejected` on non-2xx status.
    async fn submit(&self, definition: &JobDefinition) -> JobResult<SubmissionReceipt>;

    /// Every job visible to the credential
    ///
    /// # Errors
    /// `Transport`, `RemoteRejected`, or `Decode` for malformed bodies and
    /// unrecognized statuses.
    async fn list(&self) -> JobResult<Vec<Job>>;

    /// Delete one job. A missing job is [`DeleteOutcome::AlreadyGone`], not an error.
    async fn delete(&self, job_id: Uuid) -> JobResult<DeleteOutcome>;

    /// Download the blob at a job's result location
    async fn fetch_result(&self, location: &str) -> JobResult<Vec<u8>>;
}
