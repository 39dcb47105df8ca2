//! CLI runner for common setup and operations.
//!
//! Encapsulates logging initialization, configuration loading, and client
//! construction to reduce duplication across command handlers.

use tracing::info;

use wildlens::config::ConfigFile;
use wildlens::diagnostics::DiagnosticsClient;
use wildlens::http::ReqwestClient;
use wildlens::jobs::{JobClient, JobPoller};
use wildlens::logging::{init_logging, LoggingGuard};
use wildlens::session::{decide, FileVault, Role, RouteDecision, Session, SessionStore};

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while the runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
    /// Shared HTTP client
    http: ReqwestClient,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    pub fn new() -> Result<Self, CliError> {
        let config = ConfigFile::load().map_err(|e| CliError::Config(e.to_string()))?;

        let log_path = &config.logging.file;
        let log_dir = log_path
            .parent()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_else(|| ".".to_string());
        let log_file = log_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "wildlens.log".to_string());

        let logging_guard = init_logging(&log_dir, &log_file)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        let http = ReqwestClient::with_timeout(config.api.timeout())
            .map_err(|e| CliError::HttpClient(e.to_string()))?;

        info!("WildLens console v{}", wildlens::VERSION);

        Ok(Self {
            logging_guard,
            config,
            http,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Session store bound to the configured backend and the file vault.
    pub fn session_store(&self) -> SessionStore<ReqwestClient, FileVault> {
        SessionStore::new(
            self.http.clone(),
            FileVault::default(),
            &self.config.api.base_url,
        )
    }

    /// Job client bound to the configured backend.
    pub fn job_client(&self) -> JobClient<ReqwestClient> {
        JobClient::new(self.http.clone(), &self.config.api.base_url)
    }

    /// Diagnostics client bound to the configured backend.
    pub fn diagnostics_client(&self) -> DiagnosticsClient<ReqwestClient> {
        DiagnosticsClient::new(self.http.clone(), &self.config.api.base_url)
    }

    /// Poller configured from the `[poll]` section.
    pub fn poller(&self) -> JobPoller {
        let mut poller = JobPoller::new().with_interval(self.config.poll.interval());
        if let Some(max_wait) = self.config.poll.max_wait() {
            poller = poller.with_max_wait(max_wait);
        }
        poller
    }

    /// Restores the stored session and gates it on a role requirement.
    ///
    /// The gate is re-evaluated on every command, never cached.
    pub fn require_session(&self, required: Option<Role>) -> Result<Session, CliError> {
        let store = self.session_store();
        let session = store.restore();

        match decide(session.as_ref(), required) {
            RouteDecision::Allow => Ok(session.expect("gate allowed an absent session")),
            RouteDecision::RedirectToLogin => Err(CliError::NotLoggedIn),
            RouteDecision::RedirectToDefault => Err(CliError::Forbidden {
                required: required.expect("redirect without a role requirement"),
            }),
        }
    }
}
