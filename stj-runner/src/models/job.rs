//! Remote transcription job as reported by the listing endpoint
//!
//! The service owns these records. This crate only reads and deletes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Remote job status
///
/// NotStarted → Running → Succeeded | Failed. Polling may skip intermediate
/// states, so a job can be first seen as Succeeded. Unrecognized status
/// strings fail to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    NotStarted,
    Running,
    Succeeded,
    Failed,
}

/// Remote "Transcription" resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub locale: String,
    #[serde(default)]
    pub recordings_url: String,
    pub created_date_time: DateTime<Utc>,
    #[serde(default)]
    pub last_action_date_time: Option<DateTime<Utc>>,
    pub status: JobStatus,
    #[serde(default)]
    pub status_message: Option<String>,
    /// Result channel name → downloadable transcript location
    #[serde(default)]
    pub results_urls: Option<HashMap<String, String>>,
}

impl Job {
    /// Location of the transcript for `channel`, if the service published one
    pub fn result_location(&self, channel: &str) -> Option<&str> {
        self.results_urls
            .as_ref()
            .and_then(|urls| urls.get(channel))
            .map(String::as_str)
    }
}
