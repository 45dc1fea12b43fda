//! Pre-run cleanup of existing jobs
//!
//! Best-effort sweep: list every job visible to the credential and delete
//! each one. Individual failures are logged and skipped. The service stays
//! authoritative, so an empty listing afterwards is not guaranteed.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::cancel::until_cancelled;
use crate::error::{JobError, JobResult};
use crate::gateway::{DeleteOutcome, JobGateway};

/// Counts from one reconciliation sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Jobs returned by the listing
    pub listed: usize,
    pub deleted: usize,
    /// Delete answered 404
    pub already_gone: usize,
    pub failed: usize,
}

pub struct JobReconciler {
    gateway: Arc<dyn JobGateway>,
}

impl JobReconciler {
    pub fn new(gateway: Arc<dyn JobGateway>) -> Self {
        Self { gateway }
    }

    /// Delete every visible job
    ///
    /// Never fails for remote errors; only cancellation is propagated.
    pub async fn reconcile_all(&self, cancel_token: &CancellationToken) -> JobResult<ReconcileReport> {
        let mut report = ReconcileReport::default();

        let jobs = match until_cancelled(cancel_token, self.gateway.list()).await {
            Ok(jobs) => jobs,
            Err(JobError::Cancelled) => return Err(JobError::Cancelled),
            Err(e) => {
                tracing::warn!(error = %e, "Could not list existing jobs, skipping cleanup");
                return Ok(report);
            }
        };
        report.listed = jobs.len();

        for job in &jobs {
            match until_cancelled(cancel_token, self.gateway.delete(job.id)).await {
                Ok(DeleteOutcome::Deleted) => {
                    tracing::debug!(job_id = %job.id, status = ?job.status, "Deleted job");
                    report.deleted += 1;
                }
                Ok(DeleteOutcome::AlreadyGone) => report.already_gone += 1,
                Err(JobError::Cancelled) => return Err(JobError::Cancelled),
                Err(e) => {
                    tracing::warn!(job_id = %job.id, error = %e, "Failed to delete job, continuing");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            listed = report.listed,
            deleted = report.deleted,
            already_gone = report.already_gone,
            failed = report.failed,
            "Existing jobs reconciled"
        );

        Ok(report)
    }
}
