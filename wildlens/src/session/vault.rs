//! Durable credential storage.
//!
//! The vault persists the three session keys (`token`, `role`, `user_id`)
//! across process restarts. The keys are always written and cleared
//! together: a record missing any of them is treated as absent, never as a
//! partial session.

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

/// Section holding the session keys in the vault file.
const SESSION_SECTION: &str = "session";

/// Errors that can occur when writing or clearing the vault.
///
/// Reads never error: a vault that cannot be read simply has no record.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Failed to create the vault directory.
    #[error("Failed to create vault directory: {0}")]
    Directory(std::io::Error),

    /// Failed to write the vault file.
    #[error("Failed to write vault file: {0}")]
    Write(String),

    /// Failed to remove the vault file.
    #[error("Failed to clear vault file: {0}")]
    Clear(std::io::Error),
}

/// The persisted credential triple, exactly as stored.
///
/// Role is kept as a raw string here; interpretation happens when a
/// session is reconstructed from the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub token: String,
    pub role: String,
    pub user_id: String,
}

/// Trait for durable credential storage.
///
/// Implementations must treat the three keys as one unit.
pub trait CredentialVault: Send + Sync {
    /// Loads the stored record, or `None` if the vault is empty, unreadable,
    /// or missing any of the three keys.
    fn load(&self) -> Option<StoredCredentials>;

    /// Persists the record, replacing any previous one.
    fn save(&self, credentials: &StoredCredentials) -> Result<(), VaultError>;

    /// Removes the record. Idempotent: clearing an empty vault succeeds.
    fn clear(&self) -> Result<(), VaultError>;
}

/// File-backed vault storing the session keys in `~/.wildlens/session.ini`.
pub struct FileVault {
    path: PathBuf,
}

impl FileVault {
    /// Creates a vault backed by a specific file path.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path this vault reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileVault {
    fn default() -> Self {
        Self::at_path(session_file_path())
    }
}

impl CredentialVault for FileVault {
    fn load(&self) -> Option<StoredCredentials> {
        if !self.path.exists() {
            return None;
        }

        let ini = Ini::load_from_file(&self.path).ok()?;
        let section = ini.section(Some(SESSION_SECTION))?;

        let token = section.get("token")?;
        let role = section.get("role")?;
        let user_id = section.get("user_id")?;

        if token.is_empty() || role.is_empty() || user_id.is_empty() {
            return None;
        }

        Some(StoredCredentials {
            token: token.to_string(),
            role: role.to_string(),
            user_id: user_id.to_string(),
        })
    }

    fn save(&self, credentials: &StoredCredentials) -> Result<(), VaultError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(VaultError::Directory)?;
        }

        let mut ini = Ini::new();
        ini.with_section(Some(SESSION_SECTION))
            .set("token", credentials.token.as_str())
            .set("role", credentials.role.as_str())
            .set("user_id", credentials.user_id.as_str());

        ini.write_to_file(&self.path)
            .map_err(|e| VaultError::Write(e.to_string()))
    }

    fn clear(&self) -> Result<(), VaultError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(VaultError::Clear(e)),
        }
    }
}

/// In-memory vault for tests and headless embedding.
#[derive(Default)]
pub struct MemoryVault {
    record: parking_lot::Mutex<Option<StoredCredentials>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a vault pre-populated with a record.
    pub fn with_record(credentials: StoredCredentials) -> Self {
        Self {
            record: parking_lot::Mutex::new(Some(credentials)),
        }
    }
}

impl CredentialVault for MemoryVault {
    fn load(&self) -> Option<StoredCredentials> {
        self.record.lock().clone()
    }

    fn save(&self, credentials: &StoredCredentials) -> Result<(), VaultError> {
        *self.record.lock() = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), VaultError> {
        *self.record.lock() = None;
        Ok(())
    }
}

/// Get the path to the vault directory (~/.wildlens).
pub fn vault_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".wildlens")
}

/// Get the path to the vault file (~/.wildlens/session.ini).
pub fn session_file_path() -> PathBuf {
    vault_directory().join("session.ini")
}
