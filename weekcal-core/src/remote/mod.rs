//! Remote task store.
//!
//! The remote store is a document collection keyed by record id, queryable
//! by owner, with atomic multi-write batches. [`TaskStore`] is the seam the
//! sync engine talks to; [`FirestoreStore`] is the production adapter and
//! [`MemoryStore`] the in-process one.

mod firestore;
mod memory;
pub mod protocol;

pub use firestore::{FirestoreConfig, FirestoreStore};
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WeekcalResult;
use crate::task::{Task, TaskTime, Weekday};

/// A task as persisted remotely: the view fields plus owner and creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub title: String,
    pub day: Weekday,
    pub time: TaskTime,
    pub user_id: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    pub fn new(user_id: &str, title: &str, day: Weekday, time: &TaskTime) -> Self {
        TaskRecord {
            title: title.to_string(),
            day,
            time: time.clone(),
            user_id: user_id.to_string(),
            created_at: Some(Utc::now()),
        }
    }

    pub fn to_task(&self, id: &str) -> Task {
        Task {
            id: id.to_string(),
            title: self.title.clone(),
            day: self.day,
            time: self.time.clone(),
        }
    }
}

/// A record together with its store key.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTask {
    pub id: String,
    pub record: TaskRecord,
}

impl From<StoredTask> for Task {
    fn from(stored: StoredTask) -> Self {
        stored.record.to_task(&stored.id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchOp {
    Set { id: String, record: TaskRecord },
    Delete { id: String },
}

/// Writes and deletes committed as one all-or-nothing unit.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: impl Into<String>, record: TaskRecord) -> &mut Self {
        self.ops.push(BatchOp::Set {
            id: id.into(),
            record,
        });
        self
    }

    pub fn delete(&mut self, id: impl Into<String>) -> &mut Self {
        self.ops.push(BatchOp::Delete { id: id.into() });
        self
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All records whose owner field equals `user_id`, in no particular order.
    async fn query_by_owner(&self, user_id: &str) -> WeekcalResult<Vec<StoredTask>>;

    /// Keys of every record owned by `user_id`, including records that do
    /// not decode as tasks.
    async fn query_ids_by_owner(&self, user_id: &str) -> WeekcalResult<Vec<String>> {
        let tasks = self.query_by_owner(user_id).await?;
        Ok(tasks.into_iter().map(|stored| stored.id).collect())
    }

    /// Bounded, side-effect free request used as a connectivity check.
    async fn probe(&self) -> WeekcalResult<()>;

    /// Apply every operation of the batch, or none of them.
    async fn commit(&self, batch: WriteBatch) -> WeekcalResult<()>;

    async fn delete(&self, id: &str) -> WeekcalResult<()>;

    /// Allocate a key for a record that does not exist yet. Keys are chosen
    /// client-side so that a batch can be built before it is committed.
    fn allocate_id(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }

    async fn batch_write(&self, records: Vec<(String, TaskRecord)>) -> WeekcalResult<()> {
        let mut batch = WriteBatch::new();
        for (id, record) in records {
            batch.set(id, record);
        }
        self.commit(batch).await
    }

    async fn batch_delete(&self, ids: Vec<String>) -> WeekcalResult<()> {
        let mut batch = WriteBatch::new();
        for id in ids {
            batch.delete(id);
        }
        self.commit(batch).await
    }
}
