//! # STJ Common Library
//!
//! Shared code for the speech transcription job tools including:
//! - Configuration file model and loading
//! - Common error type
//! - Timestamp helpers (rate-limit reset parsing)
//! - UUID helpers (identifier extraction from resource locations)

pub mod config;
pub mod error;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
