//! Task snapshot -- the unit stored under a [`TaskId`](crate::TaskId).
//!
//! A [`TaskSnapshot`] records what has happened to a task so far: its
//! current [`TaskStatus`], the produced value (when complete), or the
//! fault classification (when errored). Snapshots are created by `submit`,
//! overwritten by the runner on a terminal outcome or by the first poll
//! (`submitted` to `pending`), and destroyed by the poll that observes a
//! terminal status.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::TaskStatus;

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The stored status-and-result record for one task.
///
/// At any time exactly one of the following holds: `result` is present
/// (status `Complete`), the error fields are present (status `Error`), or
/// neither is present -- never both. The constructors below are the only
/// way to produce a snapshot, so the invariant cannot be violated.
///
/// Timestamps are RFC 3339 UTC and exist for observability; no lifecycle
/// decision reads them.
///
/// # Examples
///
/// ```
/// use taskpoll::{TaskSnapshot, TaskStatus};
/// use serde_json::json;
///
/// let snapshot = TaskSnapshot::complete(json!({"sum": 5}));
/// assert_eq!(snapshot.status, TaskStatus::Complete);
/// assert!(snapshot.result.is_some());
/// assert!(snapshot.error_kind.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSnapshot {
    /// Current lifecycle status. One of the five storable values
    /// (`Unsubmitted` is never stored).
    pub status: TaskStatus,

    /// The produced value. Present only when `status` is `Complete`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Machine-readable fault classification. Present only when `status`
    /// is `Error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,

    /// Human-readable fault message. Present only when `status` is `Error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// RFC 3339 timestamp recorded when the snapshot was first created.
    pub created_at: String,

    /// RFC 3339 timestamp of the most recent status change.
    pub last_updated_at: String,
}

impl TaskSnapshot {
    fn bare(status: TaskStatus) -> Self {
        let now = now_rfc3339();
        Self {
            status,
            result: None,
            error_kind: None,
            error_message: None,
            created_at: now.clone(),
            last_updated_at: now,
        }
    }

    /// Initial snapshot written by `submit`.
    pub fn submitted() -> Self {
        Self::bare(TaskStatus::Submitted)
    }

    /// Terminal snapshot for a task that produced a value.
    pub fn complete(result: Value) -> Self {
        Self {
            result: Some(result),
            ..Self::bare(TaskStatus::Complete)
        }
    }

    /// Terminal snapshot for a task that raised a fault.
    ///
    /// `kind` is a short machine-readable classification; `message` is the
    /// human-readable detail. Neither should carry stack traces or internal
    /// type hierarchies -- the pair is the entire external error contract.
    pub fn error(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_kind: Some(kind.into()),
            error_message: Some(message.into()),
            ..Self::bare(TaskStatus::Error)
        }
    }

    /// Terminal snapshot for a task whose deadline elapsed.
    pub fn timed_out() -> Self {
        Self::bare(TaskStatus::TimedOut)
    }

    /// Derives the `Pending` rewrite of a `Submitted` snapshot.
    ///
    /// Preserves `created_at` and refreshes `last_updated_at`. Used by the
    /// first poll after submission.
    pub fn to_pending(&self) -> Self {
        Self {
            status: TaskStatus::Pending,
            result: None,
            error_kind: None,
            error_message: None,
            created_at: self.created_at.clone(),
            last_updated_at: now_rfc3339(),
        }
    }

    /// Returns `true` if this snapshot records a terminal outcome.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
