//! Job lifecycle services
//!
//! Run order: [`JobReconciler`] → [`JobSubmitter`] → [`JobPoller`] →
//! [`ResultFetcher`], sequenced by [`JobWorkflow`].

pub mod job_poller;
pub mod job_reconciler;
pub mod job_submitter;
pub mod job_workflow;
pub mod result_fetcher;

pub use job_poller::{CycleReport, FailedJob, JobPoller, PollOutcome, PollTally, TerminationPolicy};
pub use job_reconciler::{JobReconciler, ReconcileReport};
pub use job_submitter::{job_id_from_receipt, JobSubmitter, SubmissionTemplate};
pub use job_workflow::{JobWorkflow, RunSummary, WorkflowOptions};
pub use result_fetcher::{ResultFetcher, Transcript, DEFAULT_RESULT_CHANNEL};
