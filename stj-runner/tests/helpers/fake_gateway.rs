//! Scripted in-memory JobGateway
//!
//! Listing responses are consumed in order; once exhausted the last
//! successful listing repeats. Every call is recorded for assertions.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use stj_runner::gateway::{DeleteOutcome, JobGateway};
use stj_runner::models::{Job, JobDefinition, JobStatus, SubmissionReceipt};
use stj_runner::{JobError, JobResult};

/// Build a job with the given status and no results
pub fn job(id: Uuid, status: JobStatus) -> Job {
    Job {
        id,
        name: "Transcription using a speech sample".to_string(),
        description: None,
        locale: "en-US".to_string(),
        recordings_url: "https://audio.example/a.wav".to_string(),
        created_date_time: Utc::now(),
        last_action_date_time: None,
        status,
        status_message: None,
        results_urls: None,
    }
}

/// Build a succeeded job with the given result channels
pub fn job_with_results(id: Uuid, results: &[(&str, &str)]) -> Job {
    let mut j = job(id, JobStatus::Succeeded);
    j.results_urls = Some(
        results
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    );
    j
}

#[derive(Default)]
pub struct ScriptedGateway {
    listings: Mutex<VecDeque<JobResult<Vec<Job>>>>,
    last_listing: Mutex<Vec<Job>>,
    receipts: Mutex<VecDeque<JobResult<SubmissionReceipt>>>,
    delete_failures: Mutex<HashMap<Uuid, JobError>>,
    missing: Mutex<Vec<Uuid>>,
    results: Mutex<HashMap<String, Vec<u8>>>,
    fetch_failures: Mutex<HashMap<String, JobError>>,

    pub list_calls: AtomicUsize,
    pub submitted: Mutex<Vec<JobDefinition>>,
    pub delete_calls: Mutex<Vec<Uuid>>,
    pub fetch_calls: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_listing(&self, jobs: Vec<Job>) -> &Self {
        self.listings.lock().unwrap().push_back(Ok(jobs));
        self
    }

    pub fn push_listing_error(&self, error: JobError) -> &Self {
        self.listings.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn push_receipt(&self, operation_location: Option<&str>) -> &Self {
        self.receipts.lock().unwrap().push_back(Ok(SubmissionReceipt {
            operation_location: operation_location.map(str::to_string),
            ..Default::default()
        }));
        self
    }

    pub fn push_submit_error(&self, error: JobError) -> &Self {
        self.receipts.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn fail_delete(&self, id: Uuid, error: JobError) -> &Self {
        self.delete_failures.lock().unwrap().insert(id, error);
        self
    }

    pub fn mark_missing(&self, id: Uuid) -> &Self {
        self.missing.lock().unwrap().push(id);
        self
    }

    pub fn set_result(&self, location: &str, body: &str) -> &Self {
        self.results
            .lock()
            .unwrap()
            .insert(location.to_string(), body.as_bytes().to_vec());
        self
    }

    pub fn fail_fetch(&self, location: &str, error: JobError) -> &Self {
        self.fetch_failures
            .lock()
            .unwrap()
            .insert(location.to_string(), error);
        self
    }

    pub fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetch_calls.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<Uuid> {
        self.delete_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobGateway for ScriptedGateway {
    async fn submit(&self, definition: &JobDefinition) -> JobResult<SubmissionReceipt> {
        self.submitted.lock().unwrap().push(definition.clone());
        self.receipts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(SubmissionReceipt::default()))
    }

    async fn list(&self) -> JobResult<Vec<Job>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        match self.listings.lock().unwrap().pop_front() {
            Some(Ok(jobs)) => {
                *self.last_listing.lock().unwrap() = jobs.clone();
                Ok(jobs)
            }
            Some(Err(e)) => Err(e),
            None => Ok(self.last_listing.lock().unwrap().clone()),
        }
    }

    async fn delete(&self, job_id: Uuid) -> JobResult<DeleteOutcome> {
        self.delete_calls.lock().unwrap().push(job_id);

        if let Some(error) = self.delete_failures.lock().unwrap().remove(&job_id) {
            return Err(error);
        }

        let mut missing = self.missing.lock().unwrap();
        if missing.contains(&job_id) {
            return Ok(DeleteOutcome::AlreadyGone);
        }
        missing.push(job_id);
        Ok(DeleteOutcome::Deleted)
    }

    async fn fetch_result(&self, location: &str) -> JobResult<Vec<u8>> {
        self.fetch_calls.lock().unwrap().push(location.to_string());

        if let Some(error) = self.fetch_failures.lock().unwrap().remove(location) {
            return Err(error);
        }

        self.results
            .lock()
            .unwrap()
            .get(location)
            .cloned()
            .ok_or_else(|| JobError::RemoteRejected {
                status: 404,
                body: "BlobNotFound".to_string(),
            })
    }
}
