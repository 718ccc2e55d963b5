pub mod events;
pub mod health;
pub mod metrics;

use std::time::Duration;

use pressmetrics_common::{ExporterError, Result};

/// Runs blocking work off the async runtime.
pub(crate) async fn run_blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| ExporterError::InternalError(format!("blocking task failed: {err}")))?
}

/// Runs a sample store call on the blocking pool, bounded by `timeout`.
pub(crate) async fn run_store<T, F>(timeout: Duration, task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::time::timeout(timeout, tokio::task::spawn_blocking(task)).await {
        Ok(Ok(result)) => result,
        Ok(Err(err)) => Err(ExporterError::StorageUnavailable(format!(
            "store task failed: {err}"
        ))),
        Err(_) => Err(ExporterError::StorageUnavailable(format!(
            "store did not answer within {timeout:?}"
        ))),
    }
}
