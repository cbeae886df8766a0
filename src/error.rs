//! Error types for submit/poll operations.
//!
//! [`TaskError`] covers the two error classes a caller can see:
//!
//! - **Caller errors** ([`InvalidTimeout`](TaskError::InvalidTimeout),
//!   [`TimeoutExceedsMax`](TaskError::TimeoutExceedsMax),
//!   [`MalformedTaskId`](TaskError::MalformedTaskId)) are surfaced
//!   synchronously and never recorded as a task snapshot.
//! - **Infrastructure errors** ([`Store`](TaskError::Store)) propagate a
//!   failing backing store to the caller rather than masking it as a task
//!   state.
//!
//! Faults raised by the submitted work itself are *not* errors of the
//! handler; they become an `error` snapshot and are surfaced through
//! [`PollResponse`](crate::PollResponse).

use thiserror::Error;

/// Errors returned by `submit` and `poll`.
///
/// # Examples
///
/// ```
/// use taskpoll::TaskError;
///
/// let err = TaskError::InvalidTimeout { given: 0 };
/// assert!(err.to_string().contains("positive"));
/// ```
#[derive(Debug, Error)]
pub enum TaskError {
    /// `submit` was called with a non-positive timeout. No task was created.
    #[error("timeout must be a positive number of seconds (got {given})")]
    InvalidTimeout {
        /// The rejected timeout value.
        given: u64,
    },

    /// `submit` was called with a timeout above the configured maximum.
    /// No task was created.
    #[error("timeout of {given}s exceeds the configured maximum of {max}s")]
    TimeoutExceedsMax {
        /// The rejected timeout value in seconds.
        given: u64,
        /// The configured upper bound in seconds.
        max: u64,
    },

    /// `poll` was called with a string that is not a canonical task id.
    #[error("malformed task id: {input}")]
    MalformedTaskId {
        /// The rejected input.
        input: String,
    },

    /// The backing task store failed. This is an infrastructure error,
    /// never a task state.
    #[error("task store unavailable: {0}")]
    Store(#[from] StoreError),
}

/// Failure of the backing task store.
///
/// Carries a human-readable message and, when available, the underlying
/// error via [`std::error::Error::source`].
///
/// # Examples
///
/// ```
/// use taskpoll::StoreError;
///
/// let err = StoreError::new("connection refused");
/// assert_eq!(err.to_string(), "connection refused");
/// ```
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StoreError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StoreError {
    /// Creates a store error from a message alone.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a store error wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
