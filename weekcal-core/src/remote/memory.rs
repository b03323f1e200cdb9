//! In-process task store.
//!
//! Used by the development backend and by tests. It can be taken offline to
//! stand in for an unreachable remote store, and counts every call it
//! receives.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{BatchOp, StoredTask, TaskRecord, TaskStore, WriteBatch};
use crate::error::{WeekcalError, WeekcalResult};

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<String, TaskRecord>>,
    offline: AtomicBool,
    reject_writes: AtomicBool,
    calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail as if the store could not be reached.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make commits and deletes fail while queries keep working.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Number of store calls received so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &str) -> Option<TaskRecord> {
        self.lock().ok()?.get(id).cloned()
    }

    /// Insert a record directly, bypassing the offline switch and the call
    /// counter. For seeding.
    pub fn insert(&self, id: impl Into<String>, record: TaskRecord) {
        if let Ok(mut records) = self.lock() {
            records.insert(id.into(), record);
        }
    }

    fn lock(&self) -> WeekcalResult<std::sync::MutexGuard<'_, BTreeMap<String, TaskRecord>>> {
        self.records
            .lock()
            .map_err(|_| WeekcalError::RemoteUnavailable("memory store poisoned".into()))
    }

    fn check_reachable(&self) -> WeekcalResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(WeekcalError::RemoteUnavailable(
                "memory store is offline".into(),
            ));
        }
        Ok(())
    }

    fn check_writable(&self) -> WeekcalResult<()> {
        self.check_reachable()?;
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(WeekcalError::RemoteUnavailable(
                "memory store rejected the write".into(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn query_by_owner(&self, user_id: &str) -> WeekcalResult<Vec<StoredTask>> {
        self.check_reachable()?;
        let records = self.lock()?;

        Ok(records
            .iter()
            .filter(|(_, record)| record.user_id == user_id)
            .map(|(id, record)| StoredTask {
                id: id.clone(),
                record: record.clone(),
            })
            .collect())
    }

    async fn probe(&self) -> WeekcalResult<()> {
        self.check_reachable()
    }

    async fn commit(&self, batch: WriteBatch) -> WeekcalResult<()> {
        self.check_writable()?;

        // Applied under one lock, so readers never see half a batch.
        let mut records = self.lock()?;
        for op in batch.ops() {
            match op {
                BatchOp::Set { id, record } => {
                    records.insert(id.clone(), record.clone());
                }
                BatchOp::Delete { id } => {
                    records.remove(id);
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> WeekcalResult<()> {
        self.check_writable()?;
        self.lock()?.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{TaskTime, Weekday};

    fn record(user: &str, title: &str) -> TaskRecord {
        TaskRecord::new(user, title, Weekday::Monday, &TaskTime::parse("08:00").unwrap())
    }

    #[tokio::test]
    async fn test_query_is_scoped_to_owner() {
        let store = MemoryStore::new();
        store.insert("a", record("u1", "Mine"));
        store.insert("b", record("u2", "Theirs"));

        let tasks = store.query_by_owner("u1").await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "a");
    }

    #[tokio::test]
    async fn test_rejected_batch_leaves_no_partial_state() {
        let store = MemoryStore::new();
        store.set_reject_writes(true);

        let result = store
            .batch_write(vec![
                ("a".to_string(), record("u1", "One")),
                ("b".to_string(), record("u1", "Two")),
            ])
            .await;

        assert!(result.is_err());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_offline_store_fails_every_call_and_counts_them() {
        let store = MemoryStore::new();
        store.set_offline(true);

        assert!(store.probe().await.is_err());
        assert!(store.query_by_owner("u1").await.is_err());
        assert!(store.delete("a").await.is_err());
        assert_eq!(store.calls(), 3);
    }

    #[tokio::test]
    async fn test_batch_delete_removes_all_ids() {
        let store = MemoryStore::new();
        store.insert("a", record("u1", "One"));
        store.insert("b", record("u1", "Two"));
        store.insert("c", record("u1", "Three"));

        store
            .batch_delete(vec!["a".to_string(), "c".to_string()])
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.get("b").is_some());
    }
}
