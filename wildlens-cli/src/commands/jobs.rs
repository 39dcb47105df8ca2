//! Job commands: trigger backend operations and fetch their results.
//!
//! All of these require an admin session. Triggers return as soon as the
//! backend acknowledges them; only `hpsearch --wait` stays around, driving
//! the poller until the search delivers its best configuration.

use wildlens::jobs::{HpSearchParams, JobError, Probe, TrainingParams};
use wildlens::session::Role;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Triggers a data-ingestion run. Fire-and-forget: the ETL continues
/// server-side after the acknowledgement prints.
pub async fn etl(runner: &CliRunner) -> Result<(), CliError> {
    let session = runner.require_session(Some(Role::Admin))?;
    let client = runner.job_client();

    let message = client.trigger_etl(&session).await?;
    println!("{}", message);
    Ok(())
}

/// Triggers a model-training run.
pub async fn train(runner: &CliRunner, batch_size: u32, epochs: u32) -> Result<(), CliError> {
    let session = runner.require_session(Some(Role::Admin))?;
    let client = runner.job_client();

    match client
        .trigger_training(&session, &TrainingParams::new(batch_size, epochs))
        .await
    {
        Ok(detail) => {
            println!("{}", detail);
            Ok(())
        }
        // A training run already in progress is a status, not a failure.
        Err(JobError::Conflict(detail)) => {
            println!("{}", detail);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Triggers a hyperparameter search; with `wait`, polls the artifact
/// endpoint until the search finishes and prints the best configuration.
pub async fn hpsearch(
    runner: &CliRunner,
    trials: u32,
    study: &str,
    wait: bool,
) -> Result<(), CliError> {
    let session = runner.require_session(Some(Role::Admin))?;
    let client = runner.job_client();

    let params = HpSearchParams::new(trials, study);
    let ack = client.trigger_hp_search(&session, &params).await?;
    println!(
        "Search '{}' accepted ({} trials, status: {})",
        ack.study, ack.trials, ack.status
    );

    if !wait {
        println!("Fetch the result later with: wildlens best --study {}", study);
        return Ok(());
    }

    println!(
        "Waiting for the search to finish (checking every {}s, Ctrl-C to stop waiting)",
        runner.config().poll.interval_secs
    );

    let poller = runner.poller();
    let study_key = params.study.clone();
    let mut handle = poller.start(params.study.clone(), move || {
        let client = client.clone();
        let session = session.clone();
        let study = study_key.clone();
        async move { client.probe_best_config(&study, &session).await }
    });
    let canceller = handle.clone();

    tokio::select! {
        outcome = handle.wait() => match outcome {
            Some(Ok(payload)) => {
                println!("{}", payload);
                Ok(())
            }
            Some(Err(e)) => Err(e.into()),
            None => {
                println!("Stopped waiting before a result arrived.");
                Ok(())
            }
        },
        _ = tokio::signal::ctrl_c() => {
            canceller.cancel();
            println!();
            println!("Stopped waiting; the search continues server-side.");
            println!("Fetch the result later with: wildlens best --study {}", study);
            Ok(())
        }
    }
}

/// Single-shot fetch of the best configuration found by a search.
pub async fn best(runner: &CliRunner, study: &str) -> Result<(), CliError> {
    let session = runner.require_session(Some(Role::Admin))?;
    let client = runner.job_client();

    match client.probe_best_config(study, &session).await {
        Probe::Ready(payload) => {
            println!("{}", payload);
            Ok(())
        }
        Probe::NotReady => {
            println!("Search '{}' has no result yet. Try again in a bit.", study);
            Ok(())
        }
        Probe::Failed(e) => Err(e.into()),
    }
}
