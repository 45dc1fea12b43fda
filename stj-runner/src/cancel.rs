//! Cancellation helpers
//!
//! Every remote call and every inter-cycle delay races the run's
//! [`CancellationToken`]; a cancelled token resolves to [`JobError::Cancelled`].

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::{JobError, JobResult};

/// Await `fut` unless `cancel_token` fires first
pub async fn until_cancelled<T, F>(cancel_token: &CancellationToken, fut: F) -> JobResult<T>
where
    F: Future<Output = JobResult<T>>,
{
    tokio::select! {
        biased;
        _ = cancel_token.cancelled() => Err(JobError::Cancelled),
        result = fut => result,
    }
}

/// Cooperative delay that ends early with `Cancelled`
pub async fn sleep_or_cancel(cancel_token: &CancellationToken, duration: Duration) -> JobResult<()> {
    tokio::select! {
        biased;
        _ = cancel_token.cancelled() => Err(JobError::Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}

/// Cancel `cancel_token` once `deadline` elapses
///
/// The timer task exits early if the token is cancelled by someone else.
pub fn cancel_after(cancel_token: CancellationToken, deadline: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel_token.cancelled() => {}
            _ = tokio::time::sleep(deadline) => {
                tracing::warn!(deadline_secs = deadline.as_secs(), "Run deadline reached, cancelling");
                cancel_token.cancel();
            }
        }
    })
}
