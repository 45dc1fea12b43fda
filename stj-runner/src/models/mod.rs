//! Data models for the transcription job lifecycle

pub mod created_set;
pub mod definition;
pub mod job;
pub mod receipt;

pub use created_set::CreatedJobSet;
pub use definition::{
    JobDefinition, ModelIdentity, ProcessingOptions, ProfanityFilterMode, PunctuationMode,
};
pub use job::{Job, JobStatus};
pub use receipt::{RateLimitInfo, SubmissionReceipt};
