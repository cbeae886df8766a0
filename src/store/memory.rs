//! In-memory task store over [`DashMap`].
//!
//! [`InMemoryTaskStore`] is the reference [`TaskStore`] implementation for
//! single-process deployments. `DashMap`'s sharded locking makes each of
//! the three operations atomic per key, which is all the handler requires;
//! in particular `DashMap::remove` hands the removed snapshot to exactly
//! one concurrent caller.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::TaskSnapshot;
use crate::error::StoreError;
use crate::store::TaskStore;
use crate::types::TaskId;

/// Thread-safe in-process task store.
///
/// Operations on this store are infallible; the `Result` signatures exist
/// for parity with external backends that can fail.
///
/// # Examples
///
/// ```
/// use taskpoll::InMemoryTaskStore;
///
/// let store = InMemoryTaskStore::new();
/// assert!(store.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    data: DashMap<TaskId, TaskSnapshot>,
}

impl InMemoryTaskStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }

    /// Returns the number of live snapshots.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if no snapshots are stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn put(&self, id: TaskId, snapshot: TaskSnapshot) -> Result<(), StoreError> {
        self.data.insert(id, snapshot);
        Ok(())
    }

    async fn get(&self, id: &TaskId) -> Result<Option<TaskSnapshot>, StoreError> {
        Ok(self.data.get(id).map(|entry| entry.value().clone()))
    }

    async fn remove(&self, id: &TaskId) -> Result<Option<TaskSnapshot>, StoreError> {
        Ok(self.data.remove(id).map(|(_, snapshot)| snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn len_tracks_live_snapshots() {
        let store = InMemoryTaskStore::new();
        assert_eq!(store.len(), 0);

        let id = TaskId::new();
        store.put(id, TaskSnapshot::submitted()).await.unwrap();
        assert_eq!(store.len(), 1);
        assert!(!store.is_empty());

        store.remove(&id).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn a_task_id_maps_to_at_most_one_snapshot() {
        let store = InMemoryTaskStore::new();
        let id = TaskId::new();

        store.put(id, TaskSnapshot::submitted()).await.unwrap();
        store
            .put(id, TaskSnapshot::complete(json!(1)))
            .await
            .unwrap();

        // A second put for the same id replaces, never duplicates.
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_removes_yield_one_winner() {
        let store = Arc::new(InMemoryTaskStore::new());
        let id = TaskId::new();
        store
            .put(id, TaskSnapshot::complete(json!("payload")))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.remove(&id).await.unwrap().is_some()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1, "exactly one remove may observe the snapshot");
    }
}
