//! Session store: login, restore, logout.
//!
//! The store owns the currently installed session behind a read-mostly
//! lock. Consumers never read the credential out of shared default-header
//! state; every authorized request takes an explicit [`Session`] reference
//! and formats its bearer header at dispatch time. A `logout` therefore
//! does not retroactively un-authorize requests already in flight; only
//! requests issued afterwards observe the cleared credential.

use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

use super::error::SessionError;
use super::vault::{CredentialVault, StoredCredentials};
use crate::http::AsyncHttpClient;

/// Role assigned to an authenticated subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Canonical lowercase name, as it appears on the wire and in the vault.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An authenticated session: credential, role, and subject identity.
///
/// A `Session`, if present, always has all three fields populated; partial
/// records never become sessions. The token is opaque — consumers may
/// attempt to decode an embedded identity for display (see
/// [`super::display_identity`]) but correctness never depends on it.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// Subject identifier reported by the backend.
    pub user_id: String,
    /// Role reported by the backend at login.
    pub role: Role,
    /// Opaque bearer credential. The only value permitted to appear in an
    /// `Authorization` header.
    pub token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never log the credential.
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("role", &self.role)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Wire shape of a successful login response.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    user_id: String,
    role: String,
}

/// Owns the current session and its durable persistence.
pub struct SessionStore<C, V> {
    http: C,
    vault: V,
    base_url: String,
    current: RwLock<Option<Session>>,
}

impl<C: AsyncHttpClient, V: CredentialVault> SessionStore<C, V> {
    /// Creates a store for the given backend base URL.
    pub fn new(http: C, vault: V, base_url: &str) -> Self {
        Self {
            http,
            vault,
            base_url: base_url.trim_end_matches('/').to_string(),
            current: RwLock::new(None),
        }
    }

    /// Authenticates against the backend and installs the resulting session.
    ///
    /// On success the credential/role/identity triple is persisted to the
    /// vault and installed as the current session. On any failure nothing
    /// is persisted and a previously installed session is left untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, SessionError> {
        let url = format!("{}/login/", self.base_url);
        let body = json!({ "email": email, "password": password });

        let response = self.http.post_json(&url, &body, None).await?;

        if response.status == 401 {
            debug!(email = email, "login rejected");
            return Err(SessionError::InvalidCredentials);
        }
        if !response.is_success() {
            return Err(SessionError::Backend {
                status: response.status,
            });
        }

        let parsed: LoginResponse = serde_json::from_slice(&response.body)
            .map_err(|e| SessionError::MalformedResponse(e.to_string()))?;
        let role = Role::from_str(&parsed.role).map_err(|_| {
            SessionError::MalformedResponse(format!("unknown role '{}'", parsed.role))
        })?;

        let session = Session {
            user_id: parsed.user_id,
            role,
            token: parsed.token,
        };

        self.vault
            .save(&StoredCredentials {
                token: session.token.clone(),
                role: session.role.as_str().to_string(),
                user_id: session.user_id.clone(),
            })
            .map_err(|e| SessionError::Storage(e.to_string()))?;

        *self.current.write() = Some(session.clone());
        info!(user_id = %session.user_id, role = %session.role, "session installed");

        Ok(session)
    }

    /// Reconstructs a session from the vault at process start.
    ///
    /// Returns `None` if the vault is empty or the record is missing any
    /// field or carries an unknown role. Never errors.
    pub fn restore(&self) -> Option<Session> {
        let record = self.vault.load()?;

        let role = match Role::from_str(&record.role) {
            Ok(role) => role,
            Err(()) => {
                warn!(role = %record.role, "stored session has unknown role, treating as absent");
                return None;
            }
        };

        let session = Session {
            user_id: record.user_id,
            role,
            token: record.token,
        };
        *self.current.write() = Some(session.clone());
        debug!(user_id = %session.user_id, "session restored from vault");

        Some(session)
    }

    /// Clears the vault and the installed session. Idempotent.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.vault
            .clear()
            .map_err(|e| SessionError::Storage(e.to_string()))?;
        let previous = self.current.write().take();
        if previous.is_some() {
            info!("session cleared");
        }
        Ok(())
    }

    /// The currently installed session, if any.
    pub fn current(&self) -> Option<Session> {
        self.current.read().clone()
    }
}
