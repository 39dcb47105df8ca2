//! Trigger operations and single-shot probes for backend jobs.
//!
//! Every operation takes a live [`Session`] and attaches its credential as
//! a bearer token on the request it issues. None of these wait for job
//! completion — they return as soon as the backend acknowledges acceptance
//! (or rejection) of the request.

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::error::JobError;
use super::probe::{classify, Probe};
use crate::http::{AsyncHttpClient, HttpResponse};
use crate::session::Session;

/// Parameters for a model-training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingParams {
    pub batch_size: u32,
    pub epochs: u32,
}

impl TrainingParams {
    pub fn new(batch_size: u32, epochs: u32) -> Self {
        Self { batch_size, epochs }
    }

    /// Validates ranges before any request is sent.
    pub fn validate(&self) -> Result<(), JobError> {
        if self.batch_size < 1 {
            return Err(JobError::Validation("batch size must be at least 1".to_string()));
        }
        if self.epochs < 1 {
            return Err(JobError::Validation("epochs must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Parameters for a hyperparameter search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HpSearchParams {
    pub trials: u32,
    /// Study name; also the job key the caller polls under.
    pub study: String,
}

impl HpSearchParams {
    pub fn new(trials: u32, study: &str) -> Self {
        Self {
            trials,
            study: study.to_string(),
        }
    }

    /// Validates ranges before any request is sent.
    pub fn validate(&self) -> Result<(), JobError> {
        if self.trials < 1 {
            return Err(JobError::Validation("trials must be at least 1".to_string()));
        }
        if self.study.trim().is_empty() {
            return Err(JobError::Validation("study name must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Acknowledgement returned when a hyperparameter search is accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct HpSearchAck {
    pub status: String,
    pub trials: u32,
    pub study: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    detail: String,
}

/// Stateless request layer for triggering jobs and probing their results.
#[derive(Clone)]
pub struct JobClient<C> {
    http: C,
    base_url: String,
}

impl<C: AsyncHttpClient> JobClient<C> {
    /// Creates a client for the given backend base URL.
    pub fn new(http: C, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fire-and-forget data ingestion trigger. The ETL run continues
    /// asynchronously server-side; the returned message only acknowledges
    /// that it started.
    pub async fn trigger_etl(&self, session: &Session) -> Result<String, JobError> {
        let url = format!("{}/admin-dashboard/run-etl-github/", self.base_url);
        let response = self
            .http
            .post_json(&url, &json!({}), Some(&session.token))
            .await?;

        if !response.is_success() {
            return Err(fatal_from(&response, "ETL trigger"));
        }

        let parsed: MessageResponse = serde_json::from_slice(&response.body)
            .map_err(|e| JobError::Fatal(format!("malformed ETL response: {}", e)))?;
        info!(message = %parsed.message, "ETL run triggered");
        Ok(parsed.message)
    }

    /// Starts a model-training run.
    ///
    /// A 409 means a training job is already in progress — surfaced as a
    /// [`JobError::Conflict`] carrying the server's detail message, not as
    /// a fatal failure.
    pub async fn trigger_training(
        &self,
        session: &Session,
        params: &TrainingParams,
    ) -> Result<String, JobError> {
        params.validate()?;

        let url = format!("{}/admin-dashboard/run-training/", self.base_url);
        let body = json!({
            "batch_size": params.batch_size,
            "epochs": params.epochs,
        });
        let response = self.http.post_json(&url, &body, Some(&session.token)).await?;

        match response.status {
            status if (200..300).contains(&status) => {
                let parsed: DetailResponse = serde_json::from_slice(&response.body)
                    .map_err(|e| JobError::Fatal(format!("malformed training response: {}", e)))?;
                info!(
                    batch_size = params.batch_size,
                    epochs = params.epochs,
                    "training run triggered"
                );
                Ok(parsed.detail)
            }
            409 => {
                let detail = error_detail(&response)
                    .unwrap_or_else(|| "Training already running".to_string());
                debug!(detail = %detail, "training trigger refused");
                Err(JobError::Conflict(detail))
            }
            400 | 422 => {
                let detail = error_detail(&response)
                    .unwrap_or_else(|| "training parameters rejected".to_string());
                Err(JobError::Validation(detail))
            }
            _ => Err(fatal_from(&response, "training trigger")),
        }
    }

    /// Starts a hyperparameter search.
    ///
    /// The acknowledgement does not carry a result; the caller must drive a
    /// [`super::JobPoller`] keyed by the study name to obtain it.
    pub async fn trigger_hp_search(
        &self,
        session: &Session,
        params: &HpSearchParams,
    ) -> Result<HpSearchAck, JobError> {
        params.validate()?;

        let url = format!("{}/hpsearch/", self.base_url);
        let body = json!({
            "trials": params.trials,
            "study": params.study,
        });
        let response = self.http.post_json(&url, &body, Some(&session.token)).await?;

        match response.status {
            status if (200..300).contains(&status) => {
                let ack: HpSearchAck = serde_json::from_slice(&response.body)
                    .map_err(|e| JobError::Fatal(format!("malformed search ack: {}", e)))?;
                info!(study = %ack.study, trials = ack.trials, "hyperparameter search accepted");
                Ok(ack)
            }
            400 | 422 => {
                let detail = error_detail(&response)
                    .unwrap_or_else(|| "search parameters rejected".to_string());
                Err(JobError::Validation(detail))
            }
            _ => Err(fatal_from(&response, "search trigger")),
        }
    }

    /// Single-shot probe of the best-config endpoint for a study.
    ///
    /// This is the one operation that both reports status and, on success,
    /// carries the result payload — see [`classify`] for the overloaded
    /// status semantics.
    pub async fn probe_best_config(&self, study: &str, session: &Session) -> Probe {
        let url = format!("{}/hpsearch/{}/best", self.base_url, study);
        match self.http.get(&url, Some(&session.token)).await {
            Ok(response) => classify(&response),
            Err(e) => Probe::Failed(e.into()),
        }
    }
}

/// Extracts a human-readable detail from an error body, trying the keys the
/// backend uses (`detail`, `error`, `message`).
fn error_detail(response: &HttpResponse) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(&response.body).ok()?;
    for key in ["detail", "error", "message"] {
        if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
            return Some(text.to_string());
        }
    }
    None
}

fn fatal_from(response: &HttpResponse, operation: &str) -> JobError {
    let detail = error_detail(response)
        .map(|d| format!(": {}", d))
        .unwrap_or_default();
    JobError::Fatal(format!(
        "{} failed with HTTP {}{}",
        operation, response.status, detail
    ))
}
