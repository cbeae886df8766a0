//! Submit/poll lifecycle handling for long-running operations.
//!
//! `taskpoll` accepts a unit of work too slow to finish within a single
//! request/response cycle, runs it in the background, hands the caller a
//! correlation token immediately, and lets the caller poll for completion,
//! progress, error, or timeout with that token. The contract is
//! transport-agnostic; a REST binding is one valid collaborator (see
//! [`TaskStatus::http_status`] for the recommended mapping).
//!
//! # Overview
//!
//! - [`AsyncTaskHandler`] exposes `submit` and `poll` and implements the
//!   lifecycle state machine.
//! - [`TaskRunner`] executes the work with a hard deadline and records the
//!   outcome.
//! - [`TaskStore`] is the pluggable snapshot store;
//!   [`InMemoryTaskStore`] is the in-process reference implementation.
//!
//! A task moves through `submitted -> pending -> complete | error |
//! timedout`. Terminal results are delivered at most once: the poll that
//! observes a terminal snapshot consumes it, and the id reports
//! `unsubmitted` from then on.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use taskpoll::{AsyncTaskHandler, InMemoryTaskStore, TaskStatus};
//! use serde_json::json;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let handler = AsyncTaskHandler::new(Arc::new(InMemoryTaskStore::new()));
//!
//! // Submit with a 5 second deadline; returns immediately.
//! let receipt = handler.submit(async { Ok(json!(2 + 3)) }, 5).await.unwrap();
//!
//! // Poll until the work lands.
//! loop {
//!     let response = handler.poll(&receipt.task_id.to_string()).await.unwrap();
//!     if response.status == TaskStatus::Complete {
//!         assert_eq!(response.result, Some(json!(5)));
//!         break;
//!     }
//!     tokio::time::sleep(std::time::Duration::from_millis(10)).await;
//! }
//!
//! // The result was consumed; the id is now unsubmitted.
//! let again = handler.poll(&receipt.task_id.to_string()).await.unwrap();
//! assert_eq!(again.status, TaskStatus::Unsubmitted);
//! # });
//! ```

pub mod domain;
pub mod error;
pub mod handler;
pub mod runner;
pub mod store;
pub mod types;

pub use domain::TaskSnapshot;
pub use error::{StoreError, TaskError};
pub use handler::{AsyncTaskHandler, HandlerConfig};
pub use runner::{TaskRunner, WorkError};
pub use store::memory::InMemoryTaskStore;
pub use store::TaskStore;
pub use types::{PollResponse, SubmitReceipt, TaskId, TaskStatus};
