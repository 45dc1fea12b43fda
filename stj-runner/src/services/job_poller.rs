//! Job status polling
//!
//! Each cycle lists every job, classifies it by the remote status, and
//! tallies this run's progress. There is no local transition logic: the only
//! state carried between cycles is the set of jobs this run created and the
//! set of jobs whose transcript has already been delivered.
//!
//! Per cycle:
//! - `Failed`: warn with the remote status message; never counted as complete
//! - `Succeeded` and created by this run: count complete, fetch transcript once
//!   (the job is settled once its transcript is delivered or cannot ever be)
//! - `Succeeded` otherwise: ignored (another run or another caller)
//! - `Running` / `NotStarted`: counted
//!
//! Polling ends when enough owned jobs are settled, so a download that fails
//! on the last cycle is retried rather than lost. Transient listing failures
//! re-enter the wait interval instead of aborting.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::result_fetcher::{ResultFetcher, Transcript};
use crate::cancel::{sleep_or_cancel, until_cancelled};
use crate::error::{JobError, JobResult};
use crate::gateway::JobGateway;
use crate::models::{CreatedJobSet, Job, JobStatus};

/// Default pause between poll cycles
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// When polling stops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TerminationPolicy {
    /// Every created job has been seen succeeded in one cycle
    #[default]
    AllCreated,
    /// Any created job has been seen succeeded
    FirstSuccess,
}

impl TerminationPolicy {
    /// Completed count that ends polling
    pub fn required_completions(&self, created: &CreatedJobSet) -> usize {
        match self {
            TerminationPolicy::AllCreated => created.len(),
            TerminationPolicy::FirstSuccess => created.len().min(1),
        }
    }
}

/// Per-cycle counts
///
/// Only jobs this run is waiting on are counted as completed; failed jobs
/// and other callers' succeeded jobs are reported separately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollTally {
    pub completed: usize,
    pub running: usize,
    pub not_started: usize,
}

impl PollTally {
    pub fn total(&self) -> usize {
        self.completed + self.running + self.not_started
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedJob {
    pub job_id: Uuid,
    /// Created by this run
    pub owned: bool,
    pub message: Option<String>,
}

/// Everything observed in one poll cycle
#[derive(Debug, Default)]
pub struct CycleReport {
    pub tally: PollTally,
    pub failed: Vec<FailedJob>,
    /// Succeeded jobs not created by this run
    pub foreign_succeeded: usize,
    /// Completed jobs whose transcript is delivered or will never be
    pub settled: usize,
    /// Transcripts first delivered in this cycle
    pub transcripts: Vec<Transcript>,
    pub fetch_errors: Vec<(Uuid, JobError)>,
}

/// Final state of a completed polling loop
#[derive(Debug)]
pub struct PollOutcome {
    pub cycles: u32,
    pub tally: PollTally,
    pub transcripts: Vec<Transcript>,
}

pub struct JobPoller {
    gateway: Arc<dyn JobGateway>,
    fetcher: ResultFetcher,
    created: CreatedJobSet,
    policy: TerminationPolicy,
    interval: Duration,
    delivered: HashSet<Uuid>,
    /// Completed jobs whose transcript can not be fetched
    abandoned: HashSet<Uuid>,
}

impl JobPoller {
    pub fn new(
        gateway: Arc<dyn JobGateway>,
        fetcher: ResultFetcher,
        created: CreatedJobSet,
        policy: TerminationPolicy,
        interval: Duration,
    ) -> Self {
        Self {
            gateway,
            fetcher,
            created,
            policy,
            interval,
            delivered: HashSet::new(),
            abandoned: HashSet::new(),
        }
    }

    /// Whether a cycle satisfies the termination policy
    ///
    /// Counts settled jobs, not merely succeeded ones: a succeeded job whose
    /// download failed transiently still needs another cycle.
    pub fn is_complete(&self, report: &CycleReport) -> bool {
        report.settled >= self.policy.required_completions(&self.created)
    }

    /// Classify one listing
    ///
    /// A failed transcript download is recorded in the report and does not
    /// stop classification of the remaining jobs. Transport and service
    /// failures are retried next cycle; a missing channel or undecodable body
    /// settles the job without a transcript.
    pub async fn classify_cycle(
        &mut self,
        jobs: &[Job],
        cancel_token: &CancellationToken,
    ) -> JobResult<CycleReport> {
        let mut report = CycleReport::default();

        for job in jobs {
            match job.status {
                JobStatus::Failed => {
                    let owned = self.created.contains(&job.id);
                    tracing::warn!(
                        job_id = %job.id,
                        owned,
                        status_message = job.status_message.as_deref().unwrap_or(""),
                        "Transcription failed: {}",
                        job.status_message.as_deref().unwrap_or("no status message")
                    );
                    report.failed.push(FailedJob {
                        job_id: job.id,
                        owned,
                        message: job.status_message.clone(),
                    });
                }
                JobStatus::Succeeded if self.created.contains(&job.id) => {
                    report.tally.completed += 1;

                    if self.delivered.contains(&job.id) || self.abandoned.contains(&job.id) {
                        report.settled += 1;
                        continue;
                    }

                    match self.fetcher.fetch(job, cancel_token).await {
                        Ok(transcript) => {
                            self.delivered.insert(job.id);
                            report.settled += 1;
                            report.transcripts.push(transcript);
                        }
                        Err(JobError::Cancelled) => return Err(JobError::Cancelled),
                        Err(e) if is_unrecoverable_fetch(&e) => {
                            tracing::warn!(job_id = %job.id, error = %e, "Transcript unavailable, not retrying");
                            self.abandoned.insert(job.id);
                            report.settled += 1;
                            report.fetch_errors.push((job.id, e));
                        }
                        Err(e) => {
                            tracing::warn!(job_id = %job.id, error = %e, "Could not fetch transcript, retrying next cycle");
                            report.fetch_errors.push((job.id, e));
                        }
                    }
                }
                JobStatus::Succeeded => {
                    tracing::trace!(job_id = %job.id, "Ignoring succeeded job from another run");
                    report.foreign_succeeded += 1;
                }
                JobStatus::Running => report.tally.running += 1,
                JobStatus::NotStarted => report.tally.not_started += 1,
            }
        }

        Ok(report)
    }

    /// Poll until the termination policy is met
    ///
    /// # Errors
    /// `Cancelled` when the token fires (including during the wait), or any
    /// non-transient listing error such as `Decode`.
    pub async fn poll_until_complete(&mut self, cancel_token: &CancellationToken) -> JobResult<PollOutcome> {
        let mut cycles: u32 = 0;
        let mut transcripts = Vec::new();

        tracing::info!(
            jobs = self.created.len(),
            policy = ?self.policy,
            interval_secs = self.interval.as_secs_f64(),
            "Polling transcription jobs"
        );

        loop {
            cycles += 1;

            match until_cancelled(cancel_token, self.gateway.list()).await {
                Ok(jobs) => {
                    let report = self.classify_cycle(&jobs, cancel_token).await?;
                    let tally = report.tally;

                    tracing::info!(
                        cycle = cycles,
                        completed = tally.completed,
                        running = tally.running,
                        not_started = tally.not_started,
                        "Transcriptions status: {} completed, {} running, {} not started yet",
                        tally.completed,
                        tally.running,
                        tally.not_started
                    );

                    let complete = self.is_complete(&report);
                    transcripts.extend(report.transcripts);

                    if complete {
                        return Ok(PollOutcome {
                            cycles,
                            tally,
                            transcripts,
                        });
                    }
                }
                Err(e) if e.is_transient() => {
                    tracing::warn!(cycle = cycles, error = %e, "Listing jobs failed, retrying after interval");
                }
                Err(e) => return Err(e),
            }

            sleep_or_cancel(cancel_token, self.interval).await?;
        }
    }
}

/// Fetch failures that another attempt cannot fix
fn is_unrecoverable_fetch(error: &JobError) -> bool {
    matches!(
        error,
        JobError::MissingResultChannel { .. } | JobError::Decode(_)
    )
}
