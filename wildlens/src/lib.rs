//! WildLens - Session and job orchestration for the species-identification console
//!
//! This library provides the client-side core of the WildLens wildlife
//! dashboard: credential lifecycle, role-based view gating, and the
//! trigger-then-poll protocol used to drive long-running backend jobs
//! (data ingestion, model training, hyperparameter search).
//!
//! # High-Level API
//!
//! ```ignore
//! use wildlens::http::ReqwestClient;
//! use wildlens::session::{FileVault, SessionStore};
//! use wildlens::jobs::{HpSearchParams, JobClient, JobPoller};
//!
//! let http = ReqwestClient::new()?;
//! let store = SessionStore::new(http.clone(), FileVault::default(), base_url);
//! let session = store.login("admin@example.com", "secret").await?;
//!
//! let client = JobClient::new(http, base_url);
//! client.trigger_hp_search(&session, &HpSearchParams::new(20, "prod")).await?;
//!
//! // Poll the artifact endpoint until the search produces a result
//! let poller = JobPoller::new();
//! let mut handle = poller.start("prod", move || {
//!     let (client, session) = (client.clone(), session.clone());
//!     async move { client.probe_best_config("prod", &session).await }
//! });
//! let outcome = handle.wait().await;
//! ```

pub mod config;
pub mod diagnostics;
pub mod http;
pub mod jobs;
pub mod logging;
pub mod session;

/// Version of the WildLens library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
