//! stj-runner library interface
//!
//! Manages the lifecycle of batch transcription jobs on a remote speech
//! service: clean up old jobs, submit new ones, poll until they finish,
//! and download their transcripts.

pub mod cancel;
pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod output;
pub mod services;

pub use crate::error::{JobError, JobResult};
