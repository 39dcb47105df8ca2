//! Asynchronous job orchestration: triggers, probes, and polling.
//!
//! Long-running backend operations (data ingestion, model training,
//! hyperparameter search) are driven through a trigger-then-poll protocol:
//! a trigger call returns as soon as the backend acknowledges the request,
//! and the artifact-retrieval endpoint doubles as the status probe. The
//! [`JobPoller`] owns the only recurring timers in the system and reports
//! exactly one terminal outcome per job key.

mod error;
mod poller;
mod probe;
mod trigger;

pub use error::JobError;
pub use poller::{JobPoller, PollHandle, PollStatus, DEFAULT_POLL_INTERVAL};
pub use probe::{classify, Probe};
pub use trigger::{HpSearchAck, HpSearchParams, JobClient, TrainingParams};
