//! Conversion pipeline orchestration.
//!
//! Drives a submitted conversion from creation to a terminal state:
//!
//! - [`JobPoller`] observes remote job state by sequential status
//!   queries with a fixed inter-poll delay
//! - [`ConversionOrchestrator`] resolves URL and file input into one
//!   job-creation call and exposes the pipeline as a
//!   [`ConvertPhase`] state machine
//! - [`remove_job`] propagates a deletion to the server and the local
//!   [`crate::store::JobStore`]

mod orchestrator;
mod poller;

pub use orchestrator::{remove_job, ConversionOrchestrator, ConvertPhase, ConvertSource};
pub use poller::{JobPoller, DEFAULT_POLL_INTERVAL};

use crate::api::ApiError;

/// Failure of a conversion pipeline.
///
/// `Conversion` is a failure reported by the remote transcoder (the
/// job itself ended in `error`); `Api` covers transport and server
/// problems observed while submitting or polling. The two are kept
/// apart so infrastructure trouble is never mistaken for a bad input
/// stream.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Conversion failed: {reason}")]
    Conversion { reason: String },

    #[error("Conversion cancelled")]
    Cancelled,
}
