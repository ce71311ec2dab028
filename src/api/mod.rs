//! Typed access to the remote conversion service.
//!
//! The service exposes a small HTTP contract: upload a manifest file,
//! start a conversion, observe job snapshots, list and delete jobs.
//! This module wraps that contract in typed operations and a typed
//! error taxonomy. It performs no retries; retry and poll policy live
//! in [`crate::convert`].

mod client;
mod error;
mod types;

pub use client::ApiClient;
pub use error::{ApiError, Result};
pub use types::{ConversionRequest, Job, JobStatus, UploadResult};
