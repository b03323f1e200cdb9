//! Snapshots stored as one JSON file per user.

use std::path::{Path, PathBuf};

use super::{SnapshotStore, snapshot_key};
use crate::error::WeekcalResult;
use crate::task::Task;

pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileSnapshotStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The key is percent-encoded so that distinct user ids never share a
    /// file.
    pub fn path_for(&self, user_id: &str) -> PathBuf {
        let key = snapshot_key(user_id);
        self.dir.join(format!("{}.json", urlencoding::encode(&key)))
    }

    fn write(&self, user_id: &str, tasks: &[Task]) -> WeekcalResult<()> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.path_for(user_id);
        let temp = path.with_extension("json.tmp");

        let content = serde_json::to_string_pretty(tasks)?;
        std::fs::write(&temp, content)?;
        std::fs::rename(&temp, &path)?;
        Ok(())
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn get(&self, user_id: &str) -> Option<Vec<Task>> {
        let path = self.path_for(user_id);
        if !path.exists() {
            return None;
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read task snapshot");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(tasks) => Some(tasks),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable task snapshot");
                None
            }
        }
    }

    fn set(&self, user_id: &str, tasks: &[Task]) {
        if let Err(e) = self.write(user_id, tasks) {
            tracing::warn!(user = user_id, error = %e, "could not write task snapshot");
        }
    }

    fn clear(&self, user_id: &str) {
        let path = self.path_for(user_id);
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not remove task snapshot")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{TaskTime, Weekday};

    fn sample_tasks() -> Vec<Task> {
        vec![
            Task {
                id: "abc".to_string(),
                title: "Réviser".to_string(),
                day: Weekday::Monday,
                time: TaskTime::parse("09:00").unwrap(),
            },
            Task {
                id: "def".to_string(),
                title: "Piscine".to_string(),
                day: Weekday::Saturday,
                time: TaskTime::parse("14:30").unwrap(),
            },
        ]
    }

    #[test]
    fn test_missing_snapshot_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path());
        assert!(store.get("user-1").is_none());
    }

    #[test]
    fn test_set_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("snapshots"));

        store.set("user-1", &sample_tasks());

        assert_eq!(store.get("user-1"), Some(sample_tasks()));
        assert!(store.get("user-2").is_none());
    }

    #[test]
    fn test_file_name_uses_key_prefix() {
        let store = FileSnapshotStore::new("/tmp/weekcal");
        assert_eq!(
            store.path_for("u1"),
            PathBuf::from("/tmp/weekcal/calendar-tasks-u1.json")
        );
        assert_eq!(
            store.path_for("a/b:c"),
            PathBuf::from("/tmp/weekcal/calendar-tasks-a%2Fb%3Ac.json")
        );
    }

    #[test]
    fn test_distinct_users_get_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path());
        assert_ne!(store.path_for("a/b"), store.path_for("a_b"));
        assert_ne!(store.path_for("a/b"), store.path_for("a%2Fb"));

        store.set("a/b", &sample_tasks());
        store.set("a_b", &[]);

        assert_eq!(store.get("a/b"), Some(sample_tasks()));
        assert_eq!(store.get("a_b"), Some(vec![]));
    }

    #[test]
    fn test_clear_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path());

        store.set("user-1", &sample_tasks());
        assert!(store.path_for("user-1").exists());

        store.clear("user-1");
        assert!(!store.path_for("user-1").exists());
        assert!(store.get("user-1").is_none());

        // Clearing again is harmless.
        store.clear("user-1");
    }

    #[test]
    fn test_corrupt_snapshot_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path());
        std::fs::write(store.path_for("user-1"), "{not json").unwrap();

        assert!(store.get("user-1").is_none());
    }

    #[test]
    fn test_empty_list_is_stored_as_empty_not_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path());

        store.set("user-1", &[]);
        assert_eq!(store.get("user-1"), Some(vec![]));
    }
}
