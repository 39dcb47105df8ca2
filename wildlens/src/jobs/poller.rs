//! Per-key polling state machine for asynchronous jobs.
//!
//! The backend exposes no push channel for job completion, so a poller
//! re-probes the artifact endpoint at a fixed interval until the job
//! reaches a terminal state. Each active job key owns exactly one
//! recurring timer; starting a poll for a key that is already polling
//! returns the existing handle instead of a second timer. Terminal states
//! are not retained: the instant a poll succeeds, fails, or is abandoned,
//! its state is removed from the active set and its outcome delivered at
//! most once.
//!
//! Cancellation is cooperative via [`CancellationToken`] and is owned by
//! the caller of [`JobPoller::start`], independent of any view lifecycle.
//! A probe already in flight when cancellation lands may still complete,
//! but its result is discarded rather than delivered.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::{watch, Mutex};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::JobError;
use super::probe::Probe;

/// Default interval between poll ticks (5 seconds).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Status of a poll for one job key.
///
/// `Polling` is the only non-terminal state; the three terminal states
/// discard the poll's registry entry the moment they are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    /// Probes are being issued at the configured interval.
    Polling,
    /// The job produced its artifact; the payload was delivered.
    Succeeded,
    /// A probe classified as a terminal failure (or the deadline passed).
    Failed,
    /// Cancelled by the caller before completion. No outcome delivered.
    Abandoned,
}

impl PollStatus {
    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Polling)
    }
}

impl std::fmt::Display for PollStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Polling => write!(f, "Polling"),
            Self::Succeeded => write!(f, "Succeeded"),
            Self::Failed => write!(f, "Failed"),
            Self::Abandoned => write!(f, "Abandoned"),
        }
    }
}

/// Shared holder for the poll outcome; taken at most once.
type OutcomeHolder = Arc<Mutex<Option<Result<String, JobError>>>>;

/// Handle to an active (or finished) poll.
///
/// Cloneable; all clones refer to the same poll. The outcome is delivered
/// to whichever waiter takes it first — later waits observe `None`, as do
/// waits on an abandoned poll.
#[derive(Clone)]
pub struct PollHandle {
    job_key: String,
    status_rx: watch::Receiver<PollStatus>,
    attempts: Arc<AtomicU32>,
    cancel: CancellationToken,
    outcome: OutcomeHolder,
}

impl PollHandle {
    /// The job key this poll tracks.
    pub fn job_key(&self) -> &str {
        &self.job_key
    }

    /// The current poll status.
    pub fn status(&self) -> PollStatus {
        *self.status_rx.borrow()
    }

    /// Number of "not ready yet" responses observed so far.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::Relaxed)
    }

    /// Requests cancellation. Takes effect at the next scheduling
    /// boundary; an in-flight probe is not pre-empted but its result is
    /// discarded.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits for the poll to reach a terminal state and takes its outcome.
    ///
    /// Returns `Some(Ok(payload))` on success, `Some(Err(_))` on failure,
    /// and `None` when the poll was abandoned or the outcome was already
    /// taken by another waiter.
    pub async fn wait(&mut self) -> Option<Result<String, JobError>> {
        loop {
            if self.status().is_terminal() {
                break;
            }
            if self.status_rx.changed().await.is_err() {
                // Sender dropped - the poll task has finished.
                break;
            }
        }
        self.outcome.lock().await.take()
    }
}

impl std::fmt::Debug for PollHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollHandle")
            .field("job_key", &self.job_key)
            .field("status", &self.status())
            .field("attempts", &self.attempts())
            .finish()
    }
}

/// Registry of active polls, one recurring timer per job key.
#[derive(Clone)]
pub struct JobPoller {
    active: Arc<DashMap<String, PollHandle>>,
    interval: Duration,
    max_wait: Option<Duration>,
}

impl JobPoller {
    /// Creates a poller with the default 5-second interval and no deadline.
    pub fn new() -> Self {
        Self {
            active: Arc::new(DashMap::new()),
            interval: DEFAULT_POLL_INTERVAL,
            max_wait: None,
        }
    }

    /// Sets a custom interval between probes.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Bounds the total time a poll may stay in `Polling`.
    ///
    /// When the deadline passes without a terminal probe, the poll fails
    /// with [`JobError::Timeout`]. The observed protocol itself never
    /// completes some jobs, so unbounded is the default.
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    /// Number of currently active polls.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Returns true if a poll is active for the key.
    pub fn is_polling(&self, job_key: &str) -> bool {
        self.active.contains_key(job_key)
    }

    /// Starts polling `probe` for the given key.
    ///
    /// Idempotent per key: if a poll for `job_key` is already active, the
    /// existing handle is returned unchanged and no second timer is
    /// created. `probe` is invoked once per tick; ticks within a key are
    /// strictly sequential — the next probe is never issued before the
    /// previous one has been classified.
    pub fn start<F, Fut>(&self, job_key: impl Into<String>, probe: F) -> PollHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Probe> + Send + 'static,
    {
        let job_key = job_key.into();

        let (handle, status_tx) = match self.active.entry(job_key.clone()) {
            Entry::Occupied(entry) => {
                debug!(job_key = %job_key, "poll already active, returning existing handle");
                return entry.get().clone();
            }
            Entry::Vacant(entry) => {
                let (status_tx, status_rx) = watch::channel(PollStatus::Polling);
                let handle = PollHandle {
                    job_key: job_key.clone(),
                    status_rx,
                    attempts: Arc::new(AtomicU32::new(0)),
                    cancel: CancellationToken::new(),
                    outcome: Arc::new(Mutex::new(None)),
                };
                entry.insert(handle.clone());
                (handle, status_tx)
            }
        };

        info!(
            job_key = %job_key,
            interval_secs = self.interval.as_secs_f64(),
            "poll started"
        );

        tokio::spawn(run_poll(PollTask {
            active: Arc::clone(&self.active),
            job_key,
            interval: self.interval,
            max_wait: self.max_wait,
            status_tx,
            attempts: Arc::clone(&handle.attempts),
            cancel: handle.cancel.clone(),
            outcome: Arc::clone(&handle.outcome),
            probe,
        }));

        handle
    }

    /// Cancels the poll for a key. No-op if no poll is active for it.
    pub fn cancel(&self, job_key: &str) {
        if let Some(handle) = self.active.get(job_key) {
            handle.cancel();
        }
    }
}

impl Default for JobPoller {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the per-key poll task needs to run to completion.
struct PollTask<F> {
    active: Arc<DashMap<String, PollHandle>>,
    job_key: String,
    interval: Duration,
    max_wait: Option<Duration>,
    status_tx: watch::Sender<PollStatus>,
    attempts: Arc<AtomicU32>,
    cancel: CancellationToken,
    outcome: OutcomeHolder,
    probe: F,
}

impl<F> PollTask<F> {
    /// Removes the poll from the active set and publishes the terminal
    /// status. Removal happens first: terminal states are never observable
    /// in the registry.
    fn finish(&self, status: PollStatus) {
        self.active.remove(&self.job_key);
        let _ = self.status_tx.send(status);
    }
}

async fn run_poll<F, Fut>(mut task: PollTask<F>)
where
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = Probe> + Send,
{
    let deadline = task.max_wait.map(|limit| Instant::now() + limit);
    let mut ticker = tokio::time::interval(task.interval);
    // The first tick of a tokio interval fires immediately; consume it so
    // the first probe lands one full interval after the trigger.
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;

            _ = task.cancel.cancelled() => {
                task.finish(PollStatus::Abandoned);
                info!(job_key = %task.job_key, "poll abandoned");
                return;
            }

            _ = ticker.tick() => {
                let probe_result = (task.probe)().await;

                if task.cancel.is_cancelled() {
                    // Cancelled while the probe was in flight: discard the
                    // response, whatever it was.
                    task.finish(PollStatus::Abandoned);
                    info!(job_key = %task.job_key, "poll abandoned, in-flight probe discarded");
                    return;
                }

                match probe_result {
                    Probe::Ready(payload) => {
                        *task.outcome.lock().await = Some(Ok(payload));
                        task.finish(PollStatus::Succeeded);
                        info!(
                            job_key = %task.job_key,
                            attempts = task.attempts.load(Ordering::Relaxed),
                            "poll succeeded"
                        );
                        return;
                    }
                    Probe::NotReady => {
                        let attempts = task.attempts.fetch_add(1, Ordering::Relaxed) + 1;
                        debug!(job_key = %task.job_key, attempts, "job not ready yet");

                        if let Some(deadline) = deadline {
                            if Instant::now() >= deadline {
                                let waited_secs = task.max_wait.unwrap_or_default().as_secs();
                                *task.outcome.lock().await =
                                    Some(Err(JobError::Timeout { waited_secs }));
                                task.finish(PollStatus::Failed);
                                warn!(job_key = %task.job_key, waited_secs, "poll deadline exceeded");
                                return;
                            }
                        }
                    }
                    Probe::Failed(err) => {
                        warn!(job_key = %task.job_key, error = %err, "poll failed");
                        *task.outcome.lock().await = Some(Err(err));
                        task.finish(PollStatus::Failed);
                        return;
                    }
                }
            }
        }
    }
}
