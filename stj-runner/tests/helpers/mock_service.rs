//! In-process stand-in for the remote transcription service
//!
//! Serves the documented REST surface on 127.0.0.1 with an ephemeral port:
//! - `POST   /transcriptions`      create job (202 + Operation-Location)
//! - `GET    /transcriptions`      list jobs
//! - `DELETE /transcriptions/:id`  delete job (204, or 404 if absent)
//! - `GET    /results/:name`       transcript blob (no key required)
//!
//! Each listing advances created jobs one step along
//! NotStarted → Running → Succeeded.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const TEST_KEY: &str = "test-subscription-key";

#[derive(Default)]
pub struct MockServiceState {
    pub base_url: String,
    /// Jobs in listing order
    pub jobs: Vec<Value>,
    /// Ids created through POST, advanced on each listing
    pub created: Vec<Uuid>,
    pub submissions: Vec<Value>,
    pub results: HashMap<String, String>,
    /// Served for result names not in `results`
    pub default_result: Option<String>,
    /// Replaces the listing body when set
    pub list_body_override: Option<String>,
    /// Subscription key seen on each result download
    pub result_request_keys: Vec<Option<String>>,
    pub list_calls: usize,
}

type Shared = Arc<Mutex<MockServiceState>>;

pub struct MockService {
    pub base_url: String,
    pub state: Shared,
    server: tokio::task::JoinHandle<()>,
}

impl MockService {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let state: Shared = Arc::new(Mutex::new(MockServiceState {
            base_url: base_url.clone(),
            ..Default::default()
        }));

        let app = Router::new()
            .route("/transcriptions", get(list_jobs).post(create_job))
            .route("/transcriptions/:id", delete(delete_job))
            .route("/results/:name", get(get_result))
            .with_state(state.clone());

        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            state,
            server,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/transcriptions", self.base_url)
    }

    pub fn result_url(&self, name: &str) -> String {
        format!("{}/results/{}", self.base_url, name)
    }

    /// Seed a pre-existing job
    pub fn add_job(&self, id: Uuid, status: &str) {
        self.state.lock().unwrap().jobs.push(job_value(id, status, None));
    }

    pub fn set_result(&self, name: &str, body: &str) {
        self.state
            .lock()
            .unwrap()
            .results
            .insert(name.to_string(), body.to_string());
    }

    pub fn set_default_result(&self, body: &str) {
        self.state.lock().unwrap().default_result = Some(body.to_string());
    }

    pub fn set_list_body(&self, body: &str) {
        self.state.lock().unwrap().list_body_override = Some(body.to_string());
    }

    pub fn job_ids(&self) -> Vec<Uuid> {
        self.state
            .lock()
            .unwrap()
            .jobs
            .iter()
            .filter_map(|j| j["id"].as_str().and_then(|s| Uuid::parse_str(s).ok()))
            .collect()
    }
}

impl Drop for MockService {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn job_value(id: Uuid, status: &str, results: Option<Value>) -> Value {
    json!({
        "id": id,
        "name": "Transcription using a speech sample",
        "description": "An optional description of the transcription.",
        "locale": "en-US",
        "recordingsUrl": "https://audio.example/a.wav",
        "createdDateTime": "2019-03-01T12:00:00Z",
        "lastActionDateTime": "2019-03-01T12:00:00Z",
        "status": status,
        "resultsUrls": results,
    })
}

fn has_key(headers: &HeaderMap) -> bool {
    headers
        .get("ocp-apim-subscription-key")
        .and_then(|v| v.to_str().ok())
        == Some(TEST_KEY)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        "Access denied due to invalid subscription key.",
    )
        .into_response()
}

async fn create_job(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !has_key(&headers) {
        return unauthorized();
    }

    let mut s = state.lock().unwrap();
    let id = Uuid::new_v4();
    s.submissions.push(body);
    s.created.push(id);
    s.jobs.push(job_value(id, "NotStarted", None));

    let location = format!("{}/transcriptions/{}", s.base_url, id);
    (
        StatusCode::ACCEPTED,
        [
            ("Operation-Location", location),
            ("X-RateLimit-Limit", "100".to_string()),
            ("X-RateLimit-Remaining", "99".to_string()),
            ("X-RateLimit-Reset", "2019-03-01T12:30:00Z".to_string()),
        ],
    )
        .into_response()
}

async fn list_jobs(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !has_key(&headers) {
        return unauthorized();
    }

    let mut s = state.lock().unwrap();
    s.list_calls += 1;

    if let Some(body) = s.list_body_override.clone() {
        return (StatusCode::OK, [("Content-Type", "application/json")], body).into_response();
    }

    let base_url = s.base_url.clone();
    let created = s.created.clone();
    for job in s.jobs.iter_mut() {
        let Some(id) = job["id"].as_str().and_then(|v| Uuid::parse_str(v).ok()) else {
            continue;
        };
        if !created.contains(&id) {
            continue;
        }
        match job["status"].as_str() {
            Some("NotStarted") => job["status"] = json!("Running"),
            Some("Running") => {
                job["status"] = json!("Succeeded");
                job["resultsUrls"] = json!({ "channel_0": format!("{}/results/{}.json", base_url, id) });
            }
            _ => {}
        }
    }

    Json(Value::Array(s.jobs.clone())).into_response()
}

async fn delete_job(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<Uuid>) -> Response {
    if !has_key(&headers) {
        return unauthorized();
    }

    let mut s = state.lock().unwrap();
    let before = s.jobs.len();
    s.jobs.retain(|j| j["id"].as_str() != Some(id.to_string().as_str()));

    if s.jobs.len() == before {
        StatusCode::NOT_FOUND.into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

async fn get_result(State(state): State<Shared>, headers: HeaderMap, Path(name): Path<String>) -> Response {
    let mut s = state.lock().unwrap();
    let key = headers
        .get("ocp-apim-subscription-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    s.result_request_keys.push(key);

    match s.results.get(&name).or(s.default_result.as_ref()) {
        Some(body) => (StatusCode::OK, body.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "BlobNotFound").into_response(),
    }
}
