use crate::api::{ApiClient, ApiError, ConversionRequest, Job, JobStatus};
use crate::convert::{ConvertError, JobPoller};
use crate::store::JobStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// User input for one conversion attempt.
#[derive(Debug, Clone)]
pub enum ConvertSource {
    /// Remote manifest URL.
    Url(String),
    /// Manifest file contents to upload first.
    File { name: String, data: Vec<u8> },
}

impl ConvertSource {
    fn validate(&self) -> Result<(), ApiError> {
        match self {
            ConvertSource::Url(url) if url.trim().is_empty() => {
                Err(ApiError::validation("no stream URL provided"))
            }
            ConvertSource::File { name, .. } if name.trim().is_empty() => {
                Err(ApiError::validation("no manifest file selected"))
            }
            ConvertSource::Url(_) | ConvertSource::File { .. } => Ok(()),
        }
    }
}

/// Caller-visible pipeline state.
///
/// `Idle → Submitting → Polling → Done | Failed`, with submission
/// failures jumping straight to `Failed` and `reset` returning a
/// settled machine to `Idle`.
#[derive(Debug, Clone)]
pub enum ConvertPhase {
    Idle,
    Submitting,
    Polling { job: Job },
    Done { job: Job },
    Failed { message: String },
}

impl ConvertPhase {
    /// Short human-readable progress label, when one applies.
    pub fn progress_label(&self) -> Option<&'static str> {
        match self {
            ConvertPhase::Idle | ConvertPhase::Done { .. } | ConvertPhase::Failed { .. } => None,
            ConvertPhase::Submitting => Some("submitting"),
            ConvertPhase::Polling { job } => Some(match job.status {
                JobStatus::Pending => "waiting in queue",
                JobStatus::Converting => "converting with ffmpeg",
                // Terminal snapshots are published as Done/Failed, not Polling.
                JobStatus::Done => "finished",
                JobStatus::Error => "failed",
            }),
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, ConvertPhase::Done { .. } | ConvertPhase::Failed { .. })
    }
}

/// Drives one conversion pipeline: optional upload, then convert, then
/// polling to a terminal state.
///
/// One orchestrator serves one submission at a time; concurrent jobs
/// each get their own instance and share nothing but the [`JobStore`].
/// Observers follow the pipeline through [`subscribe`].
///
/// [`subscribe`]: ConversionOrchestrator::subscribe
pub struct ConversionOrchestrator {
    client: Arc<ApiClient>,
    store: Arc<JobStore>,
    poller: JobPoller,
    phase: watch::Sender<ConvertPhase>,
    cancel: CancellationToken,
}

impl ConversionOrchestrator {
    pub fn new(client: Arc<ApiClient>, store: Arc<JobStore>) -> Self {
        Self::with_poll_interval(client, store, crate::convert::DEFAULT_POLL_INTERVAL)
    }

    pub fn with_poll_interval(
        client: Arc<ApiClient>,
        store: Arc<JobStore>,
        poll_interval: Duration,
    ) -> Self {
        let (phase, _) = watch::channel(ConvertPhase::Idle);
        Self {
            poller: JobPoller::with_interval(client.clone(), poll_interval),
            client,
            store,
            phase,
            cancel: CancellationToken::new(),
        }
    }

    /// Watch the pipeline phase. Receivers always see the latest state.
    pub fn subscribe(&self) -> watch::Receiver<ConvertPhase> {
        self.phase.subscribe()
    }

    /// Current phase snapshot.
    pub fn phase(&self) -> ConvertPhase {
        self.phase.borrow().clone()
    }

    /// Token that abandons the pipeline when cancelled. An in-flight
    /// request is not aborted; its response is discarded.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Return a settled machine (`Done`/`Failed`) to `Idle`. No-op in
    /// any other phase.
    pub fn reset(&self) {
        self.phase.send_if_modified(|phase| match phase {
            ConvertPhase::Done { .. } | ConvertPhase::Failed { .. } => {
                *phase = ConvertPhase::Idle;
                true
            }
            ConvertPhase::Idle | ConvertPhase::Submitting | ConvertPhase::Polling { .. } => false,
        });
    }

    /// Run the full pipeline for `source`.
    ///
    /// Input is validated before any network call; an invalid source
    /// leaves the machine in `Idle`. A finished job is merged into the
    /// store before `Done` is published. No failure is retried; the
    /// user resets and resubmits.
    pub async fn run(&self, source: ConvertSource) -> Result<Job, ConvertError> {
        let idle = matches!(&*self.phase.borrow(), ConvertPhase::Idle);
        if !idle {
            return Err(ApiError::validation(
                "a conversion is already in progress or awaiting reset",
            )
            .into());
        }
        source.validate()?;

        self.phase.send_replace(ConvertPhase::Submitting);

        let job = match self.submit(source).await {
            Ok(job) => job,
            Err(err) => {
                warn!("Submission failed: {}", err);
                self.phase.send_replace(ConvertPhase::Failed {
                    message: err.to_string(),
                });
                return Err(err.into());
            }
        };

        info!(job_id = %job.id, source = %job.source, "Conversion job accepted");
        self.phase
            .send_replace(ConvertPhase::Polling { job: job.clone() });

        let phase = self.phase.clone();
        let result = self
            .poller
            .run(
                job,
                |snapshot| {
                    if snapshot.status.is_active() {
                        phase.send_replace(ConvertPhase::Polling {
                            job: snapshot.clone(),
                        });
                    }
                },
                &self.cancel,
            )
            .await;

        match result {
            Ok(done) => {
                self.store.add_or_update(done.clone());
                self.phase
                    .send_replace(ConvertPhase::Done { job: done.clone() });
                Ok(done)
            }
            Err(ConvertError::Conversion { reason }) => {
                error!("Conversion failed: {}", reason);
                self.phase.send_replace(ConvertPhase::Failed {
                    message: reason.clone(),
                });
                Err(ConvertError::Conversion { reason })
            }
            Err(ConvertError::Api(err)) => {
                error!("Polling failed: {}", err);
                self.phase.send_replace(ConvertPhase::Failed {
                    message: err.to_string(),
                });
                Err(ConvertError::Api(err))
            }
            Err(ConvertError::Cancelled) => {
                // Abandoned, not failed: nothing for the user to dismiss.
                self.phase.send_replace(ConvertPhase::Idle);
                Err(ConvertError::Cancelled)
            }
        }
    }

    /// Resolve the two input modes into one convert call.
    async fn submit(&self, source: ConvertSource) -> Result<Job, ApiError> {
        let request = match source {
            ConvertSource::Url(url) => ConversionRequest::from_url(url.trim()),
            ConvertSource::File { name, data } => {
                debug!(file = %name, "Uploading manifest file");
                let uploaded = self.client.upload(&name, data).await?;
                ConversionRequest::from_upload(uploaded.filename)
            }
        };
        self.client.convert(&request).await
    }
}

/// Delete a job remotely and prune it from the store.
///
/// An id the server no longer knows still counts as a successful
/// removal; any other failure leaves the store untouched.
pub async fn remove_job(client: &ApiClient, store: &JobStore, id: &str) -> Result<(), ApiError> {
    match client.delete_job(id).await {
        Ok(()) => {}
        Err(ApiError::NotFound(_)) => {
            debug!(job_id = %id, "Job already gone on server");
        }
        Err(err) => return Err(err),
    }
    store.remove(id);
    Ok(())
}
