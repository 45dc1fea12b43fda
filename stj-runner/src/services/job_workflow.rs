//! End-to-end run: reconcile, submit, poll, fetch
//!
//! Strictly sequential. Cleanup and per-job fetch failures are tolerated;
//! submission failures abort the run because without a job id there is
//! nothing to wait for.

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::job_poller::{JobPoller, TerminationPolicy, DEFAULT_POLL_INTERVAL};
use super::job_reconciler::{JobReconciler, ReconcileReport};
use super::job_submitter::{JobSubmitter, SubmissionTemplate};
use super::result_fetcher::{ResultFetcher, Transcript, DEFAULT_RESULT_CHANNEL};
use crate::error::JobResult;
use crate::gateway::JobGateway;
use crate::models::{CreatedJobSet, ModelIdentity};

/// What to submit and how to wait for it
#[derive(Debug, Clone)]
pub struct WorkflowOptions {
    pub recordings: Vec<String>,
    pub locale: String,
    pub models: Vec<ModelIdentity>,
    pub template: SubmissionTemplate,
    pub result_channel: String,
    pub policy: TerminationPolicy,
    pub poll_interval: Duration,
    /// Delete all visible jobs before submitting
    pub reconcile: bool,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            recordings: Vec::new(),
            locale: "en-US".to_string(),
            models: Vec::new(),
            template: SubmissionTemplate::default(),
            result_channel: DEFAULT_RESULT_CHANNEL.to_string(),
            policy: TerminationPolicy::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            reconcile: true,
        }
    }
}

#[derive(Debug)]
pub struct RunSummary {
    /// `None` when reconciliation was skipped
    pub reconcile: Option<ReconcileReport>,
    /// Job ids in submission order
    pub created: Vec<Uuid>,
    pub cycles: u32,
    pub transcripts: Vec<Transcript>,
}

pub struct JobWorkflow {
    gateway: Arc<dyn JobGateway>,
    options: WorkflowOptions,
}

impl JobWorkflow {
    pub fn new(gateway: Arc<dyn JobGateway>, options: WorkflowOptions) -> Self {
        Self { gateway, options }
    }

    pub async fn run(&self, cancel_token: &CancellationToken) -> JobResult<RunSummary> {
        let start_time = std::time::Instant::now();

        let reconcile = if self.options.reconcile {
            let reconciler = JobReconciler::new(Arc::clone(&self.gateway));
            Some(reconciler.reconcile_all(cancel_token).await?)
        } else {
            tracing::info!("Skipping reconciliation of existing jobs");
            None
        };

        let submitter = JobSubmitter::new(Arc::clone(&self.gateway), self.options.template.clone());
        let mut created = CreatedJobSet::new();
        let mut created_order = Vec::with_capacity(self.options.recordings.len());

        for recording in &self.options.recordings {
            let job_id = submitter
                .submit_one(recording, &self.options.locale, &self.options.models, cancel_token)
                .await?;

            if created.insert(job_id) {
                created_order.push(job_id);
            }
        }

        let fetcher = ResultFetcher::new(Arc::clone(&self.gateway), self.options.result_channel.as_str());
        let mut poller = JobPoller::new(
            Arc::clone(&self.gateway),
            fetcher,
            created,
            self.options.policy,
            self.options.poll_interval,
        );

        let outcome = poller.poll_until_complete(cancel_token).await?;

        tracing::info!(
            jobs = created_order.len(),
            cycles = outcome.cycles,
            transcripts = outcome.transcripts.len(),
            duration_seconds = start_time.elapsed().as_secs(),
            "Transcription run completed"
        );

        Ok(RunSummary {
            reconcile,
            created: created_order,
            cycles: outcome.cycles,
            transcripts: outcome.transcripts,
        })
    }
}
