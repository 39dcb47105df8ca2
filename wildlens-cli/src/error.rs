//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use wildlens::diagnostics::DiagnosticsError;
use wildlens::jobs::JobError;
use wildlens::session::{Role, SessionError};

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to create the HTTP client
    HttpClient(String),
    /// Session operation failed
    Session(SessionError),
    /// Job trigger or poll failed
    Job(JobError),
    /// Diagnostics fetch failed
    Diagnostics(DiagnosticsError),
    /// No session present for a gated command
    NotLoggedIn,
    /// Session present but the wrong role for a gated command
    Forbidden { required: Role },
    /// Reading interactive input failed
    Prompt(String),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::NotLoggedIn => {
                eprintln!();
                eprintln!("Sign in first with: wildlens login --email <email>");
            }
            CliError::Session(SessionError::InvalidCredentials) => {
                eprintln!();
                eprintln!("Check the email address and password and try again.");
            }
            CliError::Config(_) => {
                eprintln!();
                eprintln!("The configuration file lives at ~/.wildlens/config.ini");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::HttpClient(msg) => write!(f, "Failed to create HTTP client: {}", msg),
            CliError::Session(e) => write!(f, "{}", e),
            CliError::Job(e) => write!(f, "{}", e),
            CliError::Diagnostics(e) => write!(f, "{}", e),
            CliError::NotLoggedIn => write!(f, "Not logged in"),
            CliError::Forbidden { required } => {
                write!(f, "This command requires the '{}' role", required)
            }
            CliError::Prompt(msg) => write!(f, "Failed to read input: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Session(e) => Some(e),
            CliError::Job(e) => Some(e),
            CliError::Diagnostics(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SessionError> for CliError {
    fn from(e: SessionError) -> Self {
        CliError::Session(e)
    }
}

impl From<JobError> for CliError {
    fn from(e: JobError) -> Self {
        CliError::Job(e)
    }
}

impl From<DiagnosticsError> for CliError {
    fn from(e: DiagnosticsError) -> Self {
        CliError::Diagnostics(e)
    }
}
