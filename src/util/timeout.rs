//! Timeout helper.

use std::future::Future;
use std::time::Duration;

use crate::error::ResearchError;

/// Wrap a future with a timeout.
pub async fn with_timeout<T>(
    duration: Duration,
    future: impl Future<Output = Result<T, ResearchError>>,
) -> Result<T, ResearchError> {
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(ResearchError::Timeout(duration)),
    }
}
