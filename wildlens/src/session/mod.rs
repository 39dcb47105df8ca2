//! Session lifecycle: credential acquisition, persistence, and view gating.
//!
//! A [`Session`] is the credential/role/identity triple returned by a
//! successful login. The [`SessionStore`] owns the currently installed
//! session and its durable persistence through a [`CredentialVault`];
//! the [`gate`] module decides whether a view may proceed for a given
//! session and role requirement.

mod error;
mod gate;
mod identity;
mod store;
mod vault;

pub use error::SessionError;
pub use gate::{decide, RouteDecision};
pub use identity::display_identity;
pub use store::{Role, Session, SessionStore};
pub use vault::{CredentialVault, FileVault, MemoryVault, StoredCredentials, VaultError};
