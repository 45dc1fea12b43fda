//! Metadata returned by a job submission

use chrono::{DateTime, Utc};

/// Service throttling hints from `X-RateLimit-*` headers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Maximum requests allowed in the current window
    pub limit: Option<u32>,
    /// Requests left before throttling
    pub remaining: Option<u32>,
    /// When the window resets
    pub reset: Option<DateTime<Utc>>,
}

impl RateLimitInfo {
    pub fn is_empty(&self) -> bool {
        self.limit.is_none() && self.remaining.is_none() && self.reset.is_none()
    }
}

/// Outcome of one accepted submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionReceipt {
    /// `Operation-Location` header, pointing at the created job
    pub operation_location: Option<String>,
    pub rate_limit: RateLimitInfo,
}
