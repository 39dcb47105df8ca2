//! Classification of artifact-endpoint responses.
//!
//! The backend exposes no push channel for job completion, so the
//! artifact-retrieval endpoint doubles as the status probe. Its contract
//! overloads two distinct codes for "not done": 202 means the job is still
//! running and 404 means the study has not been created yet — both mean
//! "keep waiting". A successful body is simultaneously "done" and "the
//! answer". This coupling is deliberate protocol behavior, kept explicit
//! here as a tagged classification instead of being buried in branches.

use super::error::JobError;
use crate::http::HttpResponse;

/// Outcome of one status probe of an in-progress job.
#[derive(Debug)]
pub enum Probe {
    /// Terminal success: the job finished and this is its artifact.
    Ready(String),
    /// Still running (202) or not yet created (404). Keep waiting.
    /// Purely internal — never surfaced, never logged as an error.
    NotReady,
    /// Terminal failure.
    Failed(JobError),
}

impl Probe {
    /// Returns true for the two terminal variants.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Probe::NotReady)
    }
}

/// Classifies an artifact-endpoint response.
pub fn classify(response: &HttpResponse) -> Probe {
    match response.status {
        // 202 (still running) and 404 (study unknown yet) both mean
        // "keep waiting". 202 must be matched before the 2xx arm.
        202 | 404 => Probe::NotReady,
        status if response.is_success() => match response.utf8_body() {
            Some(text) => Probe::Ready(text.to_string()),
            None => Probe::Failed(JobError::Fatal(format!(
                "HTTP {} carried a non-UTF-8 artifact body",
                status
            ))),
        },
        status => {
            let detail = response
                .utf8_body()
                .filter(|body| !body.is_empty())
                .map(|body| format!(": {}", body))
                .unwrap_or_default();
            Probe::Failed(JobError::Fatal(format!(
                "HTTP {} while fetching job artifact{}",
                status, detail
            )))
        }
    }
}
