//! Error types for job triggers and polling.

use thiserror::Error;

use crate::http::HttpError;

/// Errors that can occur when triggering or polling a backend job.
///
/// "Not ready yet" poll responses are deliberately not represented here:
/// they are a [`super::Probe`] variant, internal to the polling loop, and
/// never surface as errors.
#[derive(Debug, Error)]
pub enum JobError {
    /// The backend reported a job of this kind already in progress.
    /// User-visible status, not fatal.
    #[error("{0}")]
    Conflict(String),

    /// Trigger parameters are out of range. Raised before any request is
    /// sent where feasible.
    #[error("Invalid job parameters: {0}")]
    Validation(String),

    /// The poll deadline elapsed while the job was still running.
    #[error("Gave up polling after {waited_secs}s without a result")]
    Timeout { waited_secs: u64 },

    /// Any other trigger or poll failure. Terminates the operation and is
    /// surfaced verbatim.
    #[error("Job request failed: {0}")]
    Fatal(String),
}

impl From<HttpError> for JobError {
    fn from(e: HttpError) -> Self {
        JobError::Fatal(e.to_string())
    }
}
