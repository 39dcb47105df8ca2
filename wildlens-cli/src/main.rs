//! WildLens CLI - command-line console for the species-identification service.
//!
//! This binary provides a command-line interface to the WildLens library:
//! sign in to the backend, trigger data and ML jobs, poll for search
//! results, and tail server logs.

use clap::{Parser, Subcommand};

mod commands;
mod error;
mod runner;

use runner::CliRunner;

#[derive(Parser)]
#[command(name = "wildlens")]
#[command(version = wildlens::VERSION)]
#[command(about = "Console for the WildLens species-identification service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in to the backend and persist the session
    Login {
        /// Email address to authenticate as
        #[arg(long)]
        email: String,

        /// Password; prompted for interactively when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Clear the stored session
    Logout,

    /// Show the current identity and role
    Whoami,

    /// Trigger a data-ingestion (ETL) run
    Etl,

    /// Trigger a model-training run
    Train {
        /// Training batch size
        #[arg(long, default_value_t = 32)]
        batch_size: u32,

        /// Number of training epochs
        #[arg(long, default_value_t = 10)]
        epochs: u32,
    },

    /// Trigger a hyperparameter search
    Hpsearch {
        /// Number of trials the search may run
        #[arg(long, default_value_t = 20)]
        trials: u32,

        /// Study name; the search's result is tracked under this key
        #[arg(long)]
        study: String,

        /// Poll until the search finishes and print the best configuration
        #[arg(long)]
        wait: bool,
    },

    /// Fetch the best configuration found by a search
    Best {
        /// Study name the search was started under
        #[arg(long)]
        study: String,
    },

    /// Tail the backend server log
    Logs {
        /// Number of log lines to fetch
        #[arg(long, default_value_t = wildlens::diagnostics::DEFAULT_LOG_LINES)]
        lines: u32,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let runner = match CliRunner::new() {
        Ok(runner) => runner,
        Err(e) => e.exit(),
    };

    let result = match cli.command {
        Command::Login { email, password } => {
            commands::auth::login(&runner, &email, password).await
        }
        Command::Logout => commands::auth::logout(&runner),
        Command::Whoami => commands::auth::whoami(&runner),
        Command::Etl => commands::jobs::etl(&runner).await,
        Command::Train { batch_size, epochs } => {
            commands::jobs::train(&runner, batch_size, epochs).await
        }
        Command::Hpsearch {
            trials,
            study,
            wait,
        } => commands::jobs::hpsearch(&runner, trials, &study, wait).await,
        Command::Best { study } => commands::jobs::best(&runner, &study).await,
        Command::Logs { lines } => commands::logs::tail(&runner, lines).await,
    };

    if let Err(e) = result {
        e.exit();
    }
}
