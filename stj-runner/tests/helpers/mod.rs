//! Test Helper Utilities
//!
//! Shared utilities for testing stj-runner

#![allow(dead_code)]

pub mod fake_gateway;
pub mod mock_service;

pub use fake_gateway::{job, job_with_results, ScriptedGateway};
pub use mock_service::{MockService, MockServiceState};
