use std::collections::HashMap;
use std::sync::Mutex;

use super::{SnapshotStore, snapshot_key};
use crate::task::Task;

/// Snapshot store kept in process memory. Entries hold the serialized JSON
/// so that round-trips go through the same encoding as the file store.
#[derive(Default)]
pub struct MemorySnapshotStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.entries
            .lock()
            .map(|entries| entries.contains_key(&snapshot_key(user_id)))
            .unwrap_or(false)
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn get(&self, user_id: &str) -> Option<Vec<Task>> {
        let entries = self.entries.lock().ok()?;
        let json = entries.get(&snapshot_key(user_id))?;
        serde_json::from_str(json).ok()
    }

    fn set(&self, user_id: &str, tasks: &[Task]) {
        let Ok(json) = serde_json::to_string(tasks) else {
            return;
        };
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(snapshot_key(user_id), json);
        }
    }

    fn clear(&self, user_id: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(&snapshot_key(user_id));
        }
    }
}
