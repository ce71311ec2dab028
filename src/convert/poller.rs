use crate::api::{ApiClient, Job, JobStatus};
use crate::convert::ConvertError;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Reference inter-poll delay.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);

/// Drives a single job to a terminal state by sequential status
/// queries.
///
/// The delay is measured from receipt of the previous response, so at
/// most one fetch is ever in flight per job. Transport and server
/// errors are not retried; they end the poll.
#[derive(Debug, Clone)]
pub struct JobPoller {
    client: Arc<ApiClient>,
    interval: Duration,
}

impl JobPoller {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self::with_interval(client, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_interval(client: Arc<ApiClient>, interval: Duration) -> Self {
        Self { client, interval }
    }

    /// Poll `job` until it reaches `done` or `error`, handing every
    /// fetched snapshot to `observe`.
    ///
    /// Returns the final job on `done`; an `error` status becomes
    /// [`ConvertError::Conversion`] carrying the job's error text.
    /// Cancelling the token stops further ticks; a fetch already in
    /// flight is awaited and its response discarded.
    pub async fn run(
        &self,
        job: Job,
        mut observe: impl FnMut(&Job),
        cancel: &CancellationToken,
    ) -> Result<Job, ConvertError> {
        let mut current = job;

        loop {
            match current.status {
                JobStatus::Done => {
                    info!(job_id = %current.id, "Conversion finished");
                    return Ok(current);
                }
                JobStatus::Error => {
                    let reason = current
                        .error
                        .clone()
                        .unwrap_or_else(|| "unknown error".to_string());
                    // Full text; display layers may shorten it, logs must not.
                    warn!(job_id = %current.id, "Conversion failed: {}", reason);
                    return Err(ConvertError::Conversion { reason });
                }
                JobStatus::Pending | JobStatus::Converting => {}
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(job_id = %current.id, "Polling cancelled");
                    return Err(ConvertError::Cancelled);
                }
                _ = tokio::time::sleep(self.interval) => {}
            }

            let snapshot = self.client.fetch_job(&current.id).await?;
            if cancel.is_cancelled() {
                // The response raced the cancellation; nobody is listening.
                debug!(job_id = %current.id, "Discarding snapshot after cancellation");
                return Err(ConvertError::Cancelled);
            }

            debug!(job_id = %snapshot.id, status = %snapshot.status, "Job snapshot");
            observe(&snapshot);
            current = snapshot;
        }
    }
}
