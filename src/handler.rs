//! The async request handler -- submit/poll orchestration.
//!
//! [`AsyncTaskHandler`] owns a [`TaskRunner`] and a shared [`TaskStore`],
//! and implements the state machine that reconciles what the caller asked
//! for against what has happened so far:
//!
//! | Poll observes | Store effect            | Response      |
//! |---------------|-------------------------|---------------|
//! | no snapshot   | none                    | `unsubmitted` |
//! | `submitted`   | rewritten to `pending`  | `pending`     |
//! | `pending`     | none                    | `pending`     |
//! | terminal      | snapshot removed        | the outcome   |
//!
//! Terminal results are delivered at most once: the poll that observes a
//! terminal snapshot consumes it, and every later (or concurrently losing)
//! poll for the same id reports `unsubmitted`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::TaskError;
use crate::runner::{TaskRunner, WorkError};
use crate::store::TaskStore;
use crate::types::{PollResponse, SubmitReceipt, TaskId, TaskStatus};

/// Operational settings for an [`AsyncTaskHandler`].
///
/// # Defaults
///
/// | Setting            | Default | Description                               |
/// |--------------------|---------|-------------------------------------------|
/// | `max_timeout`      | `None`  | No upper bound on submitted timeouts      |
/// | `poll_interval_ms` | `None`  | No pacing hint on `pending` responses     |
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use taskpoll::HandlerConfig;
///
/// let config = HandlerConfig::default()
///     .with_max_timeout(Duration::from_secs(600))
///     .with_poll_interval_ms(2000);
/// assert_eq!(config.max_timeout, Some(Duration::from_secs(600)));
/// assert_eq!(config.poll_interval_ms, Some(2000));
/// ```
#[derive(Debug, Clone, Default)]
pub struct HandlerConfig {
    /// Upper bound on the per-task timeout a caller may request.
    /// `None` accepts any positive timeout.
    pub max_timeout: Option<Duration>,

    /// Pacing hint echoed on `pending` responses, in milliseconds.
    pub poll_interval_ms: Option<u64>,
}

impl HandlerConfig {
    /// Sets the maximum accepted per-task timeout.
    pub fn with_max_timeout(mut self, max: Duration) -> Self {
        self.max_timeout = Some(max);
        self
    }

    /// Sets the pacing hint for `pending` responses.
    pub fn with_poll_interval_ms(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = Some(interval_ms);
        self
    }
}

/// Accepts long-running work, runs it in the background, and answers polls.
///
/// `submit` hands back a correlation token immediately; `poll` reads (and,
/// depending on state, mutates) the stored snapshot. The handler is the
/// sole writer of lifecycle transitions -- the store is a passive map.
///
/// Clone-cheap via the shared store; typically one handler instance serves
/// all submissions of a given operation.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use taskpoll::{AsyncTaskHandler, InMemoryTaskStore, TaskStatus};
/// use serde_json::json;
///
/// # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
/// let handler = AsyncTaskHandler::new(Arc::new(InMemoryTaskStore::new()));
///
/// let receipt = handler
///     .submit(async { Ok(json!(2 + 3)) }, 5)
///     .await
///     .unwrap();
/// assert_eq!(receipt.status, TaskStatus::Submitted);
///
/// let response = handler.poll(&receipt.task_id.to_string()).await.unwrap();
/// assert!(matches!(
///     response.status,
///     TaskStatus::Pending | TaskStatus::Complete
/// ));
/// # });
/// ```
#[derive(Clone)]
pub struct AsyncTaskHandler {
    store: Arc<dyn TaskStore>,
    runner: TaskRunner,
    config: HandlerConfig,
}

impl AsyncTaskHandler {
    /// Creates a handler over the given store with default configuration.
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        let runner = TaskRunner::new(Arc::clone(&store));
        Self {
            store,
            runner,
            config: HandlerConfig::default(),
        }
    }

    /// Replaces the handler's configuration.
    pub fn with_config(mut self, config: HandlerConfig) -> Self {
        self.config = config;
        self
    }

    /// Submits a unit of work for background execution.
    ///
    /// Returns immediately with a [`SubmitReceipt`] carrying the new task
    /// id and status `submitted`; it never waits on the work. `timeout_secs`
    /// is the hard deadline, in whole seconds, after which the task is
    /// recorded as `timedout`.
    ///
    /// # Errors
    ///
    /// - [`TaskError::InvalidTimeout`] if `timeout_secs` is zero. No task
    ///   is created.
    /// - [`TaskError::TimeoutExceedsMax`] if `timeout_secs` exceeds the
    ///   configured [`HandlerConfig::max_timeout`]. No task is created.
    /// - [`TaskError::Store`] if the initial snapshot cannot be written.
    pub async fn submit<W>(&self, work: W, timeout_secs: u64) -> Result<SubmitReceipt, TaskError>
    where
        W: Future<Output = Result<Value, WorkError>> + Send + 'static,
    {
        if timeout_secs == 0 {
            return Err(TaskError::InvalidTimeout { given: timeout_secs });
        }
        if let Some(max) = self.config.max_timeout {
            if timeout_secs > max.as_secs() {
                return Err(TaskError::TimeoutExceedsMax {
                    given: timeout_secs,
                    max: max.as_secs(),
                });
            }
        }

        let id = TaskId::new();
        self.store
            .put(id, crate::domain::TaskSnapshot::submitted())
            .await?;

        debug!(task_id = %id, timeout_secs, "task submitted");
        self.runner
            .run(id, work, Duration::from_secs(timeout_secs));

        Ok(SubmitReceipt::new(id))
    }

    /// Polls the status of a previously submitted task.
    ///
    /// The response's status is one of the six enumerated values; the
    /// payload is present only for `complete`, and the fault fields only
    /// for `error`. A terminal status is delivered to exactly one poll;
    /// thereafter the id reports `unsubmitted`.
    ///
    /// # Errors
    ///
    /// - [`TaskError::MalformedTaskId`] if `id` is not a canonical task id.
    /// - [`TaskError::Store`] if the backing store is unavailable.
    pub async fn poll(&self, id: &str) -> Result<PollResponse, TaskError> {
        let task_id: TaskId = id.parse()?;

        let Some(snapshot) = self.store.get(&task_id).await? else {
            return Ok(PollResponse::unsubmitted());
        };

        match snapshot.status {
            TaskStatus::Submitted => {
                // First poll after submission: flip to pending. Should a
                // terminal write race with this rewrite, last-writer-wins
                // on the store decides; the handler is the sole arbiter
                // and accepts either order.
                self.store.put(task_id, snapshot.to_pending()).await?;
                Ok(PollResponse::pending(self.config.poll_interval_ms))
            }
            TaskStatus::Pending => Ok(PollResponse::pending(self.config.poll_interval_ms)),
            _ => {
                // Terminal: observe-and-remove. The remove is the atomic
                // arbiter -- whichever poller receives the snapshot owns
                // the delivery; a racing loser sees an already-consumed id.
                match self.store.remove(&task_id).await? {
                    Some(removed) => {
                        debug!(task_id = %id, status = %removed.status, "terminal result consumed");
                        Ok(PollResponse::from_terminal(removed))
                    }
                    None => Ok(PollResponse::unsubmitted()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryTaskStore;
    use serde_json::json;

    fn handler_with_store() -> (AsyncTaskHandler, Arc<InMemoryTaskStore>) {
        let store = Arc::new(InMemoryTaskStore::new());
        (
            AsyncTaskHandler::new(store.clone() as Arc<dyn TaskStore>),
            store,
        )
    }

    #[tokio::test]
    async fn submit_rejects_zero_timeout() {
        let (handler, store) = handler_with_store();
        let result = handler.submit(async { Ok(json!(())) }, 0).await;
        assert!(matches!(result, Err(TaskError::InvalidTimeout { given: 0 })));
        // Caller errors never create a task.
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn submit_rejects_timeout_above_configured_max() {
        let store = Arc::new(InMemoryTaskStore::new());
        let handler = AsyncTaskHandler::new(store.clone() as Arc<dyn TaskStore>)
            .with_config(HandlerConfig::default().with_max_timeout(Duration::from_secs(60)));

        let result = handler.submit(async { Ok(json!(())) }, 120).await;
        assert!(matches!(
            result,
            Err(TaskError::TimeoutExceedsMax { given: 120, max: 60 })
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn submit_writes_submitted_snapshot() {
        let (handler, store) = handler_with_store();
        let receipt = handler
            .submit(
                async {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    Ok(json!(()))
                },
                30,
            )
            .await
            .unwrap();

        assert_eq!(receipt.status, TaskStatus::Submitted);
        let snapshot = store.get(&receipt.task_id).await.unwrap().unwrap();
        assert_eq!(snapshot.status, TaskStatus::Submitted);
    }

    #[tokio::test]
    async fn poll_rejects_malformed_id() {
        let (handler, _) = handler_with_store();
        let result = handler.poll("not-a-task-id").await;
        assert!(matches!(result, Err(TaskError::MalformedTaskId { .. })));
    }

    #[tokio::test]
    async fn poll_unknown_id_reports_unsubmitted() {
        let (handler, _) = handler_with_store();
        let response = handler.poll(&TaskId::new().to_string()).await.unwrap();
        assert_eq!(response.status, TaskStatus::Unsubmitted);
    }

    #[tokio::test]
    async fn first_poll_flips_submitted_to_pending() {
        let (handler, store) = handler_with_store();
        let receipt = handler
            .submit(
                async {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    Ok(json!(()))
                },
                30,
            )
            .await
            .unwrap();
        let id = receipt.task_id.to_string();

        let first = handler.poll(&id).await.unwrap();
        assert_eq!(first.status, TaskStatus::Pending);
        let stored = store.get(&receipt.task_id).await.unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::Pending);

        // A second poll before completion reports pending again without
        // further mutation.
        let second = handler.poll(&id).await.unwrap();
        assert_eq!(second.status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn pending_response_carries_configured_interval() {
        let store = Arc::new(InMemoryTaskStore::new());
        let handler = AsyncTaskHandler::new(store as Arc<dyn TaskStore>)
            .with_config(HandlerConfig::default().with_poll_interval_ms(1500));

        let receipt = handler
            .submit(
                async {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    Ok(json!(()))
                },
                30,
            )
            .await
            .unwrap();

        let response = handler.poll(&receipt.task_id.to_string()).await.unwrap();
        assert_eq!(response.status, TaskStatus::Pending);
        assert_eq!(response.poll_interval, Some(1500));
    }
}
