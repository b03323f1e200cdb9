//! Task synchronization engine.
//!
//! Owns the in-memory task view of one session and decides, on load and
//! after every mutation, whether the remote store or the local snapshot is
//! the source of truth. The snapshot always mirrors the last observed view,
//! not the last view the remote store acknowledged.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use crate::local::SnapshotStore;
use crate::notification::Notification;
use crate::remote::TaskStore;
use crate::session::Session;
use crate::task::{Task, WeekView};

/// Where the current view came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewSource {
    /// Not loaded yet.
    Unloaded,
    Remote,
    LocalSnapshot,
    /// The remote load failed and there was no snapshot.
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorOrigin {
    Load,
    Probe,
}

#[derive(Debug, Clone)]
struct StoreError {
    origin: ErrorOrigin,
    message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub source: ViewSource,
    pub task_count: usize,
    pub notifications: Vec<Notification>,
}

/// Connectivity and consistency state, as shown to the user.
#[derive(Debug, Clone, Serialize)]
pub struct SyncStatus {
    pub source: ViewSource,
    /// Last store error, if the store is considered unreachable.
    pub error: Option<String>,
    /// Local state may differ from the remote store until the next
    /// successful load.
    pub degraded: bool,
}

pub struct SyncEngine {
    session: Session,
    store: Arc<dyn TaskStore>,
    snapshots: Arc<dyn SnapshotStore>,
    tasks: Vec<Task>,
    source: ViewSource,
    error: Option<StoreError>,
    diverged: bool,
}

impl SyncEngine {
    pub fn new(
        session: Session,
        store: Arc<dyn TaskStore>,
        snapshots: Arc<dyn SnapshotStore>,
    ) -> Self {
        SyncEngine {
            session,
            store,
            snapshots,
            tasks: Vec::new(),
            source: ViewSource::Unloaded,
            error: None,
            diverged: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn week(&self) -> WeekView {
        WeekView::from_tasks(&self.tasks)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    pub fn status(&self) -> SyncStatus {
        SyncStatus {
            source: self.source,
            error: self.error.as_ref().map(|e| e.message.clone()),
            degraded: self.error.is_some() || self.diverged,
        }
    }

    pub(crate) fn store(&self) -> &Arc<dyn TaskStore> {
        &self.store
    }

    pub(crate) fn into_session(self) -> Session {
        self.session
    }

    /// Fetch the user's tasks from the remote store, falling back to the
    /// local snapshot when the store cannot be reached.
    pub async fn load(&mut self) -> LoadReport {
        let user_id = self.session.user_id().to_string();
        let mut notifications = Vec::new();

        match self.store.query_by_owner(&user_id).await {
            Ok(records) => {
                self.tasks = records.into_iter().map(Task::from).collect();
                self.source = ViewSource::Remote;
                self.error = None;
                self.diverged = false;
                tracing::debug!(user = %user_id, count = self.tasks.len(), "loaded tasks from remote store");
            }
            Err(e) => {
                tracing::warn!(user = %user_id, error = %e, "could not load tasks from remote store");
                self.error = Some(StoreError {
                    origin: ErrorOrigin::Load,
                    message: e.to_string(),
                });

                match self.snapshots.get(&user_id) {
                    Some(tasks) => {
                        tracing::info!(user = %user_id, count = tasks.len(), "using local task snapshot");
                        self.tasks = tasks;
                        self.source = ViewSource::LocalSnapshot;
                        notifications.push(Notification::local_only(
                            "Tasks loaded from local storage",
                        ));
                    }
                    None => {
                        self.tasks = Vec::new();
                        self.source = ViewSource::Empty;
                    }
                }
            }
        }

        self.persist_if_non_empty();

        LoadReport {
            source: self.source,
            task_count: self.tasks.len(),
            notifications,
        }
    }

    /// Run the connectivity probe. Returns whether the store answered.
    ///
    /// A failing probe never touches the view. A succeeding probe only
    /// clears an error the probe itself recorded; a load error stays until
    /// the next successful load.
    pub async fn probe(&mut self) -> bool {
        match self.store.probe().await {
            Ok(()) => {
                if self
                    .error
                    .as_ref()
                    .is_some_and(|e| e.origin == ErrorOrigin::Probe)
                {
                    self.error = None;
                }
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "remote store connectivity probe failed");
                if self.error.is_none() {
                    self.error = Some(StoreError {
                        origin: ErrorOrigin::Probe,
                        message: "Problem connecting to the database".to_string(),
                    });
                }
                false
            }
        }
    }

    /// Add tasks to the view in one update.
    pub(crate) fn append(&mut self, tasks: Vec<Task>) {
        self.tasks.extend(tasks);
        self.persist_if_non_empty();
    }

    /// Remove tasks from the view. The snapshot is written even when the
    /// view ends up empty, so removed tasks cannot come back from it.
    pub(crate) fn remove(&mut self, ids: &HashSet<String>) {
        self.tasks.retain(|t| !ids.contains(&t.id));
        self.snapshots.set(self.session.user_id(), &self.tasks);
    }

    /// Empty the view and drop the snapshot entirely.
    pub(crate) fn clear(&mut self) {
        self.tasks.clear();
        self.snapshots.clear(self.session.user_id());
    }

    /// Record that a mutation was applied locally but not remotely.
    pub(crate) fn mark_diverged(&mut self) {
        self.diverged = true;
    }

    fn persist_if_non_empty(&self) {
        if !self.tasks.is_empty() {
            self.snapshots.set(self.session.user_id(), &self.tasks);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{SignedIn, UserIdentity};
    use crate::local::MemorySnapshotStore;
    use crate::remote::{MemoryStore, TaskRecord};
    use crate::task::{TaskTime, Weekday};

    fn session(uid: &str) -> Session {
        Session::begin(SignedIn {
            user: UserIdentity {
                uid: uid.to_string(),
                display_name: None,
                avatar_url: None,
            },
            id_token: None,
        })
    }

    fn record(user: &str, title: &str, day: Weekday, time: &str) -> TaskRecord {
        TaskRecord::new(user, title, day, &TaskTime::parse(time).unwrap())
    }

    fn task(id: &str, title: &str) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            day: Weekday::Wednesday,
            time: TaskTime::parse("12:00").unwrap(),
        }
    }

    fn engine(store: &Arc<MemoryStore>, snapshots: &Arc<MemorySnapshotStore>) -> SyncEngine {
        SyncEngine::new(session("u1"), store.clone(), snapshots.clone())
    }

    #[tokio::test]
    async fn test_remote_load_replaces_view_and_persists() {
        let store = Arc::new(MemoryStore::new());
        store.insert("a", record("u1", "Réviser", Weekday::Monday, "09:00"));
        store.insert("b", record("u2", "Someone else", Weekday::Monday, "09:00"));
        let snapshots = Arc::new(MemorySnapshotStore::new());

        let mut engine = engine(&store, &snapshots);
        let report = engine.load().await;

        assert_eq!(report.source, ViewSource::Remote);
        assert_eq!(report.task_count, 1);
        assert!(report.notifications.is_empty());
        assert_eq!(engine.tasks()[0].title, "Réviser");
        assert_eq!(snapshots.get("u1").unwrap().len(), 1);
        assert!(engine.status().error.is_none());
    }

    #[tokio::test]
    async fn test_failed_load_falls_back_to_snapshot() {
        let store = Arc::new(MemoryStore::new());
        store.set_offline(true);
        let snapshots = Arc::new(MemorySnapshotStore::new());
        snapshots.set("u1", &[task("x", "Cached")]);

        let mut engine = engine(&store, &snapshots);
        let report = engine.load().await;

        assert_eq!(report.source, ViewSource::LocalSnapshot);
        assert_eq!(engine.tasks(), &[task("x", "Cached")]);
        assert_eq!(report.notifications.len(), 1);
        assert_eq!(
            report.notifications[0].kind,
            crate::notification::NotificationKind::LocalOnly
        );

        let status = engine.status();
        assert!(status.error.is_some());
        assert!(status.degraded);
    }

    #[tokio::test]
    async fn test_failed_load_without_snapshot_is_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set_offline(true);
        let snapshots = Arc::new(MemorySnapshotStore::new());

        let mut engine = engine(&store, &snapshots);
        let report = engine.load().await;

        assert_eq!(report.source, ViewSource::Empty);
        assert!(engine.tasks().is_empty());
        assert!(report.notifications.is_empty());
        assert!(!snapshots.contains("u1"));
    }

    #[tokio::test]
    async fn test_successful_reload_clears_error() {
        let store = Arc::new(MemoryStore::new());
        store.set_offline(true);
        let snapshots = Arc::new(MemorySnapshotStore::new());

        let mut engine = engine(&store, &snapshots);
        engine.load().await;
        assert!(engine.status().error.is_some());

        store.set_offline(false);
        engine.load().await;
        assert!(engine.status().error.is_none());
        assert!(!engine.status().degraded);
    }

    #[tokio::test]
    async fn test_probe_failure_keeps_loaded_tasks() {
        let store = Arc::new(MemoryStore::new());
        store.insert("a", record("u1", "Sport", Weekday::Friday, "18:00"));
        let snapshots = Arc::new(MemorySnapshotStore::new());

        let mut engine = engine(&store, &snapshots);
        engine.load().await;

        store.set_offline(true);
        assert!(!engine.probe().await);

        assert_eq!(engine.tasks().len(), 1);
        assert_eq!(
            engine.status().error.as_deref(),
            Some("Problem connecting to the database")
        );

        store.set_offline(false);
        assert!(engine.probe().await);
        assert!(engine.status().error.is_none());
    }

    #[tokio::test]
    async fn test_probe_success_does_not_hide_load_error() {
        let store = Arc::new(MemoryStore::new());
        store.set_offline(true);
        let snapshots = Arc::new(MemorySnapshotStore::new());

        let mut engine = engine(&store, &snapshots);
        engine.load().await;

        store.set_offline(false);
        assert!(engine.probe().await);
        assert!(engine.status().error.is_some());
    }

    #[tokio::test]
    async fn test_remove_persists_even_when_view_becomes_empty() {
        let store = Arc::new(MemoryStore::new());
        let snapshots = Arc::new(MemorySnapshotStore::new());
        let mut engine = engine(&store, &snapshots);

        engine.append(vec![task("a", "Only")]);
        assert_eq!(snapshots.get("u1").unwrap().len(), 1);

        engine.remove(&HashSet::from(["a".to_string()]));
        assert_eq!(snapshots.get("u1"), Some(vec![]));
    }

    #[tokio::test]
    async fn test_clear_drops_snapshot_entry() {
        let store = Arc::new(MemoryStore::new());
        let snapshots = Arc::new(MemorySnapshotStore::new());
        let mut engine = engine(&store, &snapshots);

        engine.append(vec![task("a", "Only")]);
        engine.clear();

        assert!(engine.tasks().is_empty());
        assert!(!snapshots.contains("u1"));
    }
}
