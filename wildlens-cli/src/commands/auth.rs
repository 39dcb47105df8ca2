//! Session commands: login, logout, whoami.

use dialoguer::Password;

use wildlens::session::display_identity;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Authenticates against the backend and persists the session.
pub async fn login(runner: &CliRunner, email: &str, password: Option<String>) -> Result<(), CliError> {
    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .interact()
            .map_err(|e| CliError::Prompt(e.to_string()))?,
    };

    let store = runner.session_store();
    let session = store.login(email, &password).await?;

    println!(
        "Signed in as {} ({})",
        display_identity(&session),
        session.role
    );
    Ok(())
}

/// Clears the stored session. Safe to run when already signed out.
pub fn logout(runner: &CliRunner) -> Result<(), CliError> {
    let store = runner.session_store();
    store.logout()?;
    println!("Signed out");
    Ok(())
}

/// Shows the current identity and role, if signed in.
pub fn whoami(runner: &CliRunner) -> Result<(), CliError> {
    let store = runner.session_store();
    match store.restore() {
        Some(session) => {
            println!("{} ({})", display_identity(&session), session.role);
            Ok(())
        }
        None => Err(CliError::NotLoggedIn),
    }
}
