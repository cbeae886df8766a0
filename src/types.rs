//! Wire types for the submit/poll contract.
//!
//! This module defines the types a transport binding serializes:
//! [`TaskStatus`], [`TaskId`], [`SubmitReceipt`], and [`PollResponse`].
//!
//! # Serialization
//!
//! Statuses serialize as the lowercase strings `submitted`, `pending`,
//! `complete`, `unsubmitted`, `error`, and `timedout` -- `Display` and
//! serde agree. Optional response fields (`result`, `error_kind`,
//! `error_message`, `poll_interval`) are omitted when `None`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::TaskSnapshot;
use crate::error::TaskError;

/// Lifecycle status of a submitted task.
///
/// A task progresses through these states according to a defined state
/// machine. Terminal states (`Complete`, `Error`, `TimedOut`) are consumed
/// on the first poll that observes them. `Unsubmitted` is synthetic: it is
/// never stored and is reported only when no snapshot exists for an id.
///
/// # State Machine
///
/// ```text
/// (submit)  -> Submitted
/// Submitted -> Pending, Complete, Error, TimedOut
/// Pending   -> Complete, Error, TimedOut
/// Complete  -> (removed on first poll that observes it)
/// Error     -> (removed on first poll that observes it)
/// TimedOut  -> (removed on first poll that observes it)
/// ```
///
/// # Examples
///
/// ```
/// use taskpoll::TaskStatus;
///
/// assert!(!TaskStatus::Pending.is_terminal());
/// assert!(TaskStatus::Complete.is_terminal());
/// assert!(TaskStatus::Submitted.can_transition_to(TaskStatus::Pending));
/// assert!(!TaskStatus::Complete.can_transition_to(TaskStatus::Pending));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// The task has been accepted for execution but not yet polled.
    Submitted,
    /// The task is in progress and has been polled at least once.
    Pending,
    /// The task produced a value (terminal).
    Complete,
    /// No task exists for the supplied id; either none was ever submitted,
    /// or its terminal result was consumed by a previous poll. Synthetic,
    /// never stored.
    Unsubmitted,
    /// The task raised a fault (terminal).
    Error,
    /// The task did not finish before its deadline (terminal).
    #[serde(rename = "timedout")]
    TimedOut,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submitted => write!(f, "submitted"),
            Self::Pending => write!(f, "pending"),
            Self::Complete => write!(f, "complete"),
            Self::Unsubmitted => write!(f, "unsubmitted"),
            Self::Error => write!(f, "error"),
            Self::TimedOut => write!(f, "timedout"),
        }
    }
}

impl TaskStatus {
    /// Returns `true` if this status is terminal.
    ///
    /// Terminal states are `Complete`, `Error`, and `TimedOut`. A poll that
    /// observes a terminal snapshot consumes it: the snapshot is removed
    /// from the store and subsequent polls report `Unsubmitted`.
    ///
    /// # Examples
    ///
    /// ```
    /// use taskpoll::TaskStatus;
    ///
    /// assert!(!TaskStatus::Submitted.is_terminal());
    /// assert!(!TaskStatus::Pending.is_terminal());
    /// assert!(!TaskStatus::Unsubmitted.is_terminal());
    /// assert!(TaskStatus::Complete.is_terminal());
    /// assert!(TaskStatus::Error.is_terminal());
    /// assert!(TaskStatus::TimedOut.is_terminal());
    /// ```
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Error | Self::TimedOut)
    }

    /// Returns `true` if a stored snapshot may advance from this status
    /// to `next`.
    ///
    /// Statuses never rewind: `Submitted` may advance to `Pending` (first
    /// poll) or straight to a terminal state (the runner finished before
    /// the first poll); `Pending` may only advance to a terminal state.
    /// Terminal statuses transition out of the store, not to another
    /// status. `Unsubmitted` is synthetic and never stored, so nothing
    /// transitions from it.
    ///
    /// # Examples
    ///
    /// ```
    /// use taskpoll::TaskStatus;
    ///
    /// assert!(TaskStatus::Submitted.can_transition_to(TaskStatus::TimedOut));
    /// assert!(TaskStatus::Pending.can_transition_to(TaskStatus::Error));
    /// assert!(!TaskStatus::Pending.can_transition_to(TaskStatus::Submitted));
    /// assert!(!TaskStatus::Unsubmitted.can_transition_to(TaskStatus::Submitted));
    /// ```
    pub fn can_transition_to(&self, next: Self) -> bool {
        match self {
            Self::Submitted => matches!(
                next,
                Self::Pending | Self::Complete | Self::Error | Self::TimedOut
            ),
            Self::Pending => matches!(next, Self::Complete | Self::Error | Self::TimedOut),
            Self::Complete | Self::Error | Self::TimedOut | Self::Unsubmitted => false,
        }
    }

    /// Recommended HTTP status code for a REST binding of this status.
    ///
    /// This mapping is a convention for collaborating transport layers;
    /// nothing in the core depends on it.
    ///
    /// | Status        | Code |
    /// |---------------|------|
    /// | `submitted`   | 202  |
    /// | `pending`     | 200  |
    /// | `complete`    | 200  |
    /// | `unsubmitted` | 400  |
    /// | `error`       | 500  |
    /// | `timedout`    | 500  |
    ///
    /// # Examples
    ///
    /// ```
    /// use taskpoll::TaskStatus;
    ///
    /// assert_eq!(TaskStatus::Submitted.http_status(), 202);
    /// assert_eq!(TaskStatus::Unsubmitted.http_status(), 400);
    /// assert_eq!(TaskStatus::TimedOut.http_status(), 500);
    /// ```
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Submitted => 202,
            Self::Pending | Self::Complete => 200,
            Self::Unsubmitted => 400,
            Self::Error | Self::TimedOut => 500,
        }
    }
}

/// Opaque, globally unique handle for one submitted task.
///
/// A `TaskId` is a randomly generated 128-bit identifier (`UUIDv4`) with
/// a canonical string form. No internal structure is interpreted; ids are
/// compared for equality and used as store keys only. Generation is
/// collision-free with overwhelming probability and safe to call
/// concurrently from any number of submissions.
///
/// # Examples
///
/// ```
/// use taskpoll::TaskId;
///
/// let id = TaskId::new();
/// let round_trip: TaskId = id.to_string().parse().unwrap();
/// assert_eq!(id, round_trip);
///
/// assert!("not-a-task-id".parse::<TaskId>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Generates a fresh random task id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| TaskError::MalformedTaskId {
                input: s.to_string(),
            })
    }
}

/// Immediate acknowledgement returned by `submit`.
///
/// Carries the newly allocated [`TaskId`] and a status of
/// [`TaskStatus::Submitted`]. The id is the correlation token for all
/// subsequent polls.
///
/// # Examples
///
/// ```
/// use taskpoll::{SubmitReceipt, TaskId, TaskStatus};
///
/// let receipt = SubmitReceipt::new(TaskId::new());
/// assert_eq!(receipt.status, TaskStatus::Submitted);
///
/// let json = serde_json::to_value(&receipt).unwrap();
/// assert_eq!(json["status"], "submitted");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReceipt {
    /// The allocated id, to be supplied to subsequent `poll` calls.
    pub task_id: TaskId,

    /// Always [`TaskStatus::Submitted`].
    pub status: TaskStatus,
}

impl SubmitReceipt {
    /// Builds the acknowledgement for a freshly allocated id.
    pub fn new(task_id: TaskId) -> Self {
        Self {
            task_id,
            status: TaskStatus::Submitted,
        }
    }
}

/// Response to a `poll` call.
///
/// The `status` field is always present. `result` is present **only**
/// when the status is `complete`; `error_kind` and `error_message` are
/// present **only** when the status is `error`. No other status carries
/// a payload or fault fields. `poll_interval`, when present on a
/// still-running response, is a client pacing hint in milliseconds.
///
/// Construction goes through the methods below so the
/// payload/fault-field exclusivity cannot be violated.
///
/// # Examples
///
/// ```
/// use taskpoll::{PollResponse, TaskStatus};
///
/// let response = PollResponse::unsubmitted();
/// assert_eq!(response.status, TaskStatus::Unsubmitted);
/// assert!(response.result.is_none());
/// assert!(response.error_kind.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollResponse {
    /// Current lifecycle status of the polled task.
    pub status: TaskStatus,

    /// The produced value. Present only when `status` is `complete`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Machine-readable fault classification. Present only when `status`
    /// is `error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,

    /// Human-readable fault message. Present only when `status` is `error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Suggested polling interval in milliseconds. Only set on
    /// still-running (`pending`) responses, and only when the handler is
    /// configured with one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval: Option<u64>,
}

impl PollResponse {
    /// Response for an id with no snapshot: never submitted, or already
    /// consumed by an earlier poll.
    pub fn unsubmitted() -> Self {
        Self {
            status: TaskStatus::Unsubmitted,
            result: None,
            error_kind: None,
            error_message: None,
            poll_interval: None,
        }
    }

    /// Still-running response, with an optional pacing hint.
    pub fn pending(poll_interval: Option<u64>) -> Self {
        Self {
            status: TaskStatus::Pending,
            result: None,
            error_kind: None,
            error_message: None,
            poll_interval,
        }
    }

    /// Builds the response for a consumed terminal snapshot.
    ///
    /// The snapshot must be terminal; stored snapshots only carry
    /// `Submitted`/`Pending` or a terminal status, and the handler calls
    /// this only on the terminal arm.
    pub(crate) fn from_terminal(snapshot: TaskSnapshot) -> Self {
        Self {
            status: snapshot.status,
            result: snapshot.result,
            error_kind: snapshot.error_kind,
            error_message: snapshot.error_message,
            poll_interval: None,
        }
    }
}
