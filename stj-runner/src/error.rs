//! Error types for stj-runner
//!
//! One variant per failure class of the job lifecycle. Callers decide the
//! propagation policy (skip, retry on the next cycle, or abort the run).

use thiserror::Error;
use uuid::Uuid;

/// Job lifecycle error type
#[derive(Debug, Error)]
pub enum JobError {
    /// Connection-level failure (DNS, refused, timeout, interrupted body)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Service answered with a non-success status
    #[error("Remote rejected request with status {status}: {body}")]
    RemoteRejected { status: u16, body: String },

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Submission response carried no usable job location
    #[error("Malformed submission receipt: {0}")]
    MalformedReceipt(String),

    /// Succeeded job has no entry for the expected result channel
    #[error("Job {job_id} has no result channel '{channel}'")]
    MissingResultChannel { job_id: Uuid, channel: String },

    /// Operator interrupt or deadline reached
    #[error("Run cancelled")]
    Cancelled,

    /// stj-common error
    #[error("Common error: {0}")]
    Common(#[from] stj_common::Error),
}

impl JobError {
    /// Whether retrying the same request later may succeed
    ///
    /// True for transport failures, throttling (429) and server-side (5xx)
    /// rejections.
    pub fn is_transient(&self) -> bool {
        match self {
            JobError::Transport(_) => true,
            JobError::RemoteRejected { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for JobError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            JobError::Decode(e.to_string())
        } else {
            JobError::Transport(e.to_string())
        }
    }
}

/// Result type for job lifecycle operations
pub type JobResult<T> = Result<T, JobError>;
