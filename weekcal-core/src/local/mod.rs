//! Local task snapshots.
//!
//! A snapshot is the last task list observed for a user. It is what the sync
//! engine falls back to when the remote store cannot be reached. Snapshot
//! stores never report failures: an unreadable snapshot is an absent one.

mod file;
mod memory;

pub use file::FileSnapshotStore;
pub use memory::MemorySnapshotStore;

use crate::constants::SNAPSHOT_KEY_PREFIX;
use crate::task::Task;

pub trait SnapshotStore: Send + Sync {
    /// The stored task list for a user, if any.
    fn get(&self, user_id: &str) -> Option<Vec<Task>>;

    /// Overwrite the stored task list for a user.
    fn set(&self, user_id: &str, tasks: &[Task]);

    /// Remove the entry for a user entirely.
    fn clear(&self, user_id: &str);
}

/// Key under which a user's snapshot is stored.
pub fn snapshot_key(user_id: &str) -> String {
    format!("{}{}", SNAPSHOT_KEY_PREFIX, user_id)
}
