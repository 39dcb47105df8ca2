//! Server log tailing.

use wildlens::session::Role;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Prints the last `lines` lines of the backend server log.
pub async fn tail(runner: &CliRunner, lines: u32) -> Result<(), CliError> {
    let session = runner.require_session(Some(Role::Admin))?;
    let client = runner.diagnostics_client();

    let text = client.tail_server_logs(&session, lines).await?;
    print!("{}", text);
    if !text.ends_with('\n') {
        println!();
    }
    Ok(())
}
