//! Task store trait and the in-process reference implementation.
//!
//! The store is a passive, thread-safe association from [`TaskId`] to the
//! current [`TaskSnapshot`] -- it holds no lifecycle logic of its own. The
//! handler is the sole arbiter of which write wins; the store only has to
//! make `put`/`get`/`remove` atomic per key.
//!
//! # Single delivery
//!
//! [`remove`](TaskStore::remove) returns the snapshot it removed. That is
//! the primitive the handler's observe-and-remove pattern relies on: when
//! two pollers race for one terminal snapshot, the map hands the snapshot
//! to exactly one `remove` call and the other receives `None`.
//!
//! # Backends
//!
//! - [`InMemoryTaskStore`](memory::InMemoryTaskStore) -- reference
//!   implementation over `DashMap`, suitable for a single process.
//! - A distributed deployment substitutes a shared backing store (a
//!   row-oriented table keyed by id); the core is indifferent as long as
//!   the three operations keep their per-key atomicity.

pub mod memory;

use async_trait::async_trait;

use crate::domain::TaskSnapshot;
use crate::error::StoreError;
use crate::types::TaskId;

/// Key-value association from task id to its current snapshot.
///
/// Implementations must be `Send + Sync`; the handler and any number of
/// runner workers mutate the store concurrently. Each operation must be
/// atomic relative to the others for the same key. No ordering guarantee
/// is required between operations on different ids.
///
/// All operations return `Result` so that an unavailable backing store
/// surfaces as an infrastructure error
/// ([`TaskError::Store`](crate::TaskError::Store)), never as a task state.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Unconditional upsert; last-writer-wins.
    ///
    /// The effect is visible to subsequent `get`/`remove` calls from any
    /// caller.
    async fn put(&self, id: TaskId, snapshot: TaskSnapshot) -> Result<(), StoreError>;

    /// Reads the current snapshot without removing it.
    ///
    /// Returns `None` if no snapshot exists for the id.
    async fn get(&self, id: &TaskId) -> Result<Option<TaskSnapshot>, StoreError>;

    /// Atomically removes and returns the snapshot for the id.
    ///
    /// Removing an absent id is a no-op returning `None` (idempotent).
    /// Exactly one concurrent caller can receive `Some` for a given
    /// stored snapshot.
    async fn remove(&self, id: &TaskId) -> Result<Option<TaskSnapshot>, StoreError>;
}
