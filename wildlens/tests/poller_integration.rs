//! Integration tests for the job polling state machine.
//!
//! These tests verify the complete trigger-then-poll workflow through the
//! public API:
//! - Status classification feeding the poller
//! - One timer per job key, idempotent start
//! - Exactly-once outcome delivery
//! - Cooperative cancellation and in-flight discard

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use wildlens::http::HttpResponse;
use wildlens::jobs::{classify, JobError, JobPoller, PollStatus, Probe};

// =============================================================================
// Test Helpers
// =============================================================================

/// Serves a scripted sequence of raw HTTP responses through `classify`,
/// the way a real poll drives the artifact endpoint. Counts probes; once
/// the script is exhausted it keeps answering 202.
fn scripted_endpoint(
    responses: Vec<(u16, &'static [u8])>,
    probes: Arc<AtomicUsize>,
) -> impl FnMut() -> std::future::Ready<Probe> {
    let script: Arc<Mutex<VecDeque<(u16, &'static [u8])>>> =
        Arc::new(Mutex::new(responses.into_iter().collect()));
    move || {
        probes.fetch_add(1, Ordering::SeqCst);
        let (status, body) = script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((202, b"" as &[u8]));
        std::future::ready(classify(&HttpResponse {
            status,
            body: body.to_vec(),
        }))
    }
}

fn fast_poller() -> JobPoller {
    JobPoller::new().with_interval(Duration::from_millis(10))
}

// =============================================================================
// Integration Tests
// =============================================================================

#[tokio::test]
async fn poll_sequence_202_202_200_delivers_payload_once() {
    let probes = Arc::new(AtomicUsize::new(0));
    let poller = fast_poller();

    let mut handle = poller.start(
        "prod",
        scripted_endpoint(
            vec![(202, b"{}"), (202, b"{}"), (200, b"yaml text")],
            Arc::clone(&probes),
        ),
    );
    assert_eq!(handle.status(), PollStatus::Polling);

    let outcome = handle.wait().await;
    assert_eq!(outcome.unwrap().unwrap(), "yaml text");
    assert_eq!(handle.status(), PollStatus::Succeeded);
    assert_eq!(handle.attempts(), 2);

    // The timer for the key is cancelled immediately after delivery.
    assert!(!poller.is_polling("prod"));
    let probes_at_delivery = probes.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(probes.load(Ordering::SeqCst), probes_at_delivery);

    // Exactly-once: the outcome cannot be taken again.
    assert!(handle.wait().await.is_none());
}

#[tokio::test]
async fn poll_sequence_404_500_fails_with_server_error() {
    let probes = Arc::new(AtomicUsize::new(0));
    let poller = fast_poller();

    let mut handle = poller.start(
        "prod",
        scripted_endpoint(
            vec![(404, b""), (500, b"optuna exploded")],
            Arc::clone(&probes),
        ),
    );

    let outcome = handle.wait().await.unwrap();
    match outcome.unwrap_err() {
        JobError::Fatal(message) => {
            assert!(message.contains("500"));
            assert!(message.contains("optuna exploded"));
        }
        other => panic!("expected Fatal, got {:?}", other),
    }
    assert_eq!(handle.status(), PollStatus::Failed);
    assert_eq!(handle.attempts(), 1);
    assert!(!poller.is_polling("prod"));
}

#[tokio::test]
async fn double_start_yields_one_active_poll() {
    let probes = Arc::new(AtomicUsize::new(0));
    let poller = fast_poller();

    let first = poller.start(
        "prod",
        scripted_endpoint(vec![], Arc::clone(&probes)),
    );
    let second = poller.start(
        "prod",
        scripted_endpoint(vec![], Arc::clone(&probes)),
    );

    assert_eq!(poller.active_count(), 1);
    assert_eq!(first.job_key(), second.job_key());

    // Only one timer is probing: after several intervals the counts from a
    // hypothetical second timer would have doubled the probe rate.
    tokio::time::sleep(Duration::from_millis(55)).await;
    let observed = probes.load(Ordering::SeqCst);
    assert!(observed <= 7, "expected a single timer, saw {} probes", observed);

    first.cancel();
}

#[tokio::test]
async fn cancel_reaches_abandoned_without_callback() {
    let probes = Arc::new(AtomicUsize::new(0));
    let poller = fast_poller();

    let mut handle = poller.start(
        "prod",
        scripted_endpoint(vec![], Arc::clone(&probes)),
    );

    tokio::time::sleep(Duration::from_millis(35)).await;
    poller.cancel("prod");

    assert!(handle.wait().await.is_none());
    assert_eq!(handle.status(), PollStatus::Abandoned);
    assert!(!poller.is_polling("prod"));

    // No further network requests for the key.
    let probes_at_cancel = probes.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(probes.load(Ordering::SeqCst), probes_at_cancel);
}

#[tokio::test]
async fn polls_for_different_studies_are_independent() {
    let probes_a = Arc::new(AtomicUsize::new(0));
    let probes_b = Arc::new(AtomicUsize::new(0));
    let poller = fast_poller();

    let mut prod = poller.start(
        "prod",
        scripted_endpoint(vec![(202, b""), (200, b"prod config")], Arc::clone(&probes_a)),
    );
    let mut staging = poller.start(
        "staging",
        scripted_endpoint(vec![(500, b"boom")], Arc::clone(&probes_b)),
    );
    assert_eq!(poller.active_count(), 2);

    // One study failing does not disturb the other.
    assert!(staging.wait().await.unwrap().is_err());
    assert_eq!(prod.wait().await.unwrap().unwrap(), "prod config");
    assert_eq!(poller.active_count(), 0);
}

#[tokio::test]
async fn bounded_poll_times_out_into_failed() {
    let probes = Arc::new(AtomicUsize::new(0));
    let poller = JobPoller::new()
        .with_interval(Duration::from_millis(10))
        .with_max_wait(Duration::from_millis(45));

    let mut handle = poller.start(
        "prod",
        scripted_endpoint(vec![], Arc::clone(&probes)),
    );

    let outcome = handle.wait().await.unwrap();
    assert!(matches!(outcome.unwrap_err(), JobError::Timeout { .. }));
    assert_eq!(handle.status(), PollStatus::Failed);
    assert!(!poller.is_polling("prod"));
}

#[tokio::test]
async fn restart_after_terminal_state_creates_fresh_poll() {
    let probes = Arc::new(AtomicUsize::new(0));
    let poller = fast_poller();

    let mut first = poller.start(
        "prod",
        scripted_endpoint(vec![(200, b"round one")], Arc::clone(&probes)),
    );
    assert_eq!(first.wait().await.unwrap().unwrap(), "round one");

    // The key's state was discarded on success, so a new start is a new
    // poll, not the stale handle.
    let mut second = poller.start(
        "prod",
        scripted_endpoint(vec![(200, b"round two")], Arc::clone(&probes)),
    );
    assert_eq!(second.wait().await.unwrap().unwrap(), "round two");
}
