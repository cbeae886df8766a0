//! Background execution of submitted work with deadline enforcement.
//!
//! [`TaskRunner::run`] is fire-and-forget: it hands the work to the tokio
//! runtime and returns immediately. A supervising task waits on the work
//! with a hard deadline and writes exactly one terminal snapshot to the
//! store:
//!
//! - the work resolves with a value in time -> `complete`;
//! - the work resolves with a [`WorkError`] -> `error`, carrying the
//!   original fault's kind and message;
//! - the work panics -> `error` with kind `panic` and the unwrapped panic
//!   payload (the join wrapper never leaks into the snapshot);
//! - the work is cancelled out from under the runner (runtime shutdown)
//!   -> `error` with kind `cancelled`;
//! - the deadline elapses -> `timedout`, written unconditionally. The
//!   abandoned work is aborted best-effort; correctness does not depend
//!   on it actually stopping.
//!
//! There are no retries: one submission, one execution attempt, one
//! terminal write.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::task::JoinError;
use tracing::{debug, error, warn};

use crate::domain::TaskSnapshot;
use crate::store::TaskStore;
use crate::types::TaskId;

/// A fault reported by a unit of work.
///
/// `kind` is a short machine-readable classification and `message` a
/// human-readable detail. The pair is the entire error contract surfaced
/// to pollers -- no stack traces, no internal error hierarchies.
///
/// # Examples
///
/// ```
/// use taskpoll::WorkError;
///
/// let fault = WorkError::new("arithmetic", "division by zero");
/// assert_eq!(fault.kind, "arithmetic");
/// assert_eq!(fault.to_string(), "arithmetic: division by zero");
/// ```
#[derive(Debug, Clone)]
pub struct WorkError {
    /// Machine-readable fault classification.
    pub kind: String,
    /// Human-readable fault message.
    pub message: String,
}

impl WorkError {
    /// Creates a fault from a classification and message.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for WorkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Executes submitted work against a deadline and records the outcome.
///
/// The runner owns nothing but a handle to the store; scheduling is
/// delegated to the tokio runtime, so worker-pool sizing is an operational
/// parameter of the runtime, not of this type.
#[derive(Clone)]
pub struct TaskRunner {
    store: Arc<dyn TaskStore>,
}

impl TaskRunner {
    /// Creates a runner writing outcomes to `store`.
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Dispatches `work` for background execution with a hard deadline.
    ///
    /// Returns immediately; the caller's thread of control never blocks on
    /// the work, not even when the deadline elapses. The terminal snapshot
    /// lands in the store when the outcome is known.
    pub fn run<W>(&self, id: TaskId, work: W, timeout: Duration)
    where
        W: Future<Output = Result<Value, WorkError>> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            // The work runs as its own task so a panic or runtime-initiated
            // cancellation is observable as a JoinError rather than tearing
            // down the supervisor.
            let mut handle = tokio::spawn(work);

            let snapshot = match tokio::time::timeout(timeout, &mut handle).await {
                Ok(Ok(Ok(value))) => {
                    debug!(task_id = %id, "task completed");
                    TaskSnapshot::complete(value)
                }
                Ok(Ok(Err(fault))) => {
                    error!(task_id = %id, kind = %fault.kind, message = %fault.message, "task faulted");
                    TaskSnapshot::error(fault.kind, fault.message)
                }
                Ok(Err(join_err)) => {
                    let (kind, message) = classify_join_error(join_err);
                    warn!(task_id = %id, kind, message, "task did not run to completion");
                    TaskSnapshot::error(kind, message)
                }
                Err(_elapsed) => {
                    warn!(task_id = %id, timeout_secs = timeout.as_secs(), "task timed out");
                    // Best-effort reclamation; the TIMEDOUT snapshot is
                    // written whether or not the abort takes effect.
                    handle.abort();
                    TaskSnapshot::timed_out()
                }
            };

            if let Err(store_err) = store.put(id, snapshot).await {
                // No caller is left to propagate to; the failure stays
                // server-side and the poller will eventually see a stale
                // snapshot or unsubmitted.
                error!(task_id = %id, error = %store_err, "failed to record task outcome");
            }
        });
    }
}

/// Reduces a [`JoinError`] to the original fault's kind and message.
///
/// A panicking task carries its panic payload through the join wrapper;
/// that payload (when it is a string) is what gets recorded. Cancellation
/// of the worker by the surrounding process is reported as an error, not
/// silently dropped.
fn classify_join_error(err: JoinError) -> (&'static str, String) {
    if err.is_panic() {
        let payload = err.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "task panicked".to_string());
        ("panic", message)
    } else {
        ("cancelled", "task was cancelled before completion".to_string())
    }
}
