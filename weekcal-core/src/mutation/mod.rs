//! Task mutations: create, delete, delete selected and reset.
//!
//! Every mutation goes to the remote store first. What happens when the
//! store fails is looked up in [`FAILURE_POLICIES`]: create fails closed,
//! the deletes fail open and are applied to the local view anyway.

mod draft;
mod policy;
mod selection;

pub use draft::{TaskDraft, ValidDraft};
pub use policy::{FAILURE_POLICIES, FailurePolicy, MutationPhase, Operation};
pub use selection::Selection;

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::auth::UserIdentity;
use crate::error::{WeekcalError, WeekcalResult};
use crate::notification::Notification;
use crate::remote::{TaskRecord, TaskStore};
use crate::sync::SyncEngine;

#[derive(Error, Debug)]
pub enum MutationError {
    /// Bad input; nothing was sent to the store.
    #[error("{0}")]
    Validation(String),

    /// The store failed a fail-closed operation; nothing changed.
    #[error("{message}")]
    Remote {
        operation: Operation,
        message: String,
        #[source]
        source: WeekcalError,
    },
}

impl MutationError {
    pub fn notification(&self) -> Notification {
        match self {
            MutationError::Validation(msg) => Notification::validation(msg.clone()),
            MutationError::Remote { message, .. } => Notification::remote_error(message.clone()),
        }
    }
}

impl From<WeekcalError> for MutationError {
    fn from(err: WeekcalError) -> Self {
        match err {
            WeekcalError::Validation(msg) => MutationError::Validation(msg),
            other => MutationError::Remote {
                operation: Operation::Create,
                message: Operation::Create.remote_error_message().to_string(),
                source: other,
            },
        }
    }
}

/// Outcome of a mutation that went through.
#[derive(Debug, Clone, Serialize)]
pub struct MutationReport {
    pub operation: Operation,
    /// `Committed` or `Degraded`.
    pub outcome: MutationPhase,
    /// Tasks created or deleted.
    pub count: usize,
    pub notifications: Vec<Notification>,
}

impl MutationReport {
    pub fn is_degraded(&self) -> bool {
        self.outcome == MutationPhase::Degraded
    }
}

pub struct MutationService {
    engine: SyncEngine,
    selection: Selection,
    phase: MutationPhase,
}

impl MutationService {
    pub fn new(engine: SyncEngine) -> Self {
        MutationService {
            engine,
            selection: Selection::default(),
            phase: MutationPhase::Idle,
        }
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    /// For loads and probes.
    pub fn engine_mut(&mut self) -> &mut SyncEngine {
        &mut self.engine
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Phase reached by the last mutation.
    pub fn phase(&self) -> MutationPhase {
        self.phase
    }

    /// Enter selection mode. Refused while there is nothing to select.
    pub fn enter_selection_mode(&mut self) -> bool {
        if self.engine.tasks().is_empty() {
            return false;
        }
        self.selection.enter();
        true
    }

    pub fn exit_selection_mode(&mut self) {
        self.selection.exit();
    }

    /// Toggle `id` in the selection. Returns whether it is selected
    /// afterwards; ids outside the view and toggles outside selection mode
    /// are ignored.
    pub fn toggle_selection(&mut self, id: &str) -> bool {
        if !self.selection.is_active() || !self.engine.contains(id) {
            return false;
        }
        self.selection.toggle(id)
    }

    pub async fn create(&mut self, draft: &TaskDraft) -> Result<MutationReport, MutationError> {
        self.advance(MutationPhase::Validating);
        let valid = match draft.validate() {
            Ok(valid) => valid,
            Err(e) => {
                self.advance(MutationPhase::Rejected);
                tracing::debug!(error = %e, "rejected task draft");
                return Err(e);
            }
        };

        let store = Arc::clone(self.engine.store());
        let user_id = self.engine.session().user_id().to_string();

        let mut records = Vec::with_capacity(valid.days.len());
        let mut created = Vec::with_capacity(valid.days.len());
        for day in &valid.days {
            let id = store.allocate_id();
            let record = TaskRecord::new(&user_id, &valid.title, *day, &valid.time);
            created.push(record.to_task(&id));
            records.push((id, record));
        }
        let count = created.len();

        self.advance(MutationPhase::Committing);
        let result = store.batch_write(records).await;
        let message = if count == 1 {
            "Task added".to_string()
        } else {
            format!("Task added for {} days", count)
        };

        self.settle(Operation::Create, result, count, message, |engine| {
            engine.append(created)
        })
    }

    /// Delete one task. Deleting an id that is not in the view still asks
    /// the store to delete it and leaves the view as it is.
    pub async fn delete(&mut self, id: &str) -> Result<MutationReport, MutationError> {
        let store = Arc::clone(self.engine.store());

        self.advance(MutationPhase::Committing);
        let result = store.delete(id).await;

        self.selection.forget(id);
        let ids = HashSet::from([id.to_string()]);
        self.settle(Operation::Delete, result, 1, "Task deleted".to_string(), |engine| {
            engine.remove(&ids)
        })
    }

    /// Delete every selected task in one batch and leave selection mode.
    /// With nothing selected this does nothing, and selection mode stays on.
    pub async fn delete_selected(&mut self) -> Result<MutationReport, MutationError> {
        if self.selection.is_empty() {
            return Ok(MutationReport {
                operation: Operation::DeleteSelected,
                outcome: MutationPhase::Committed,
                count: 0,
                notifications: Vec::new(),
            });
        }

        let store = Arc::clone(self.engine.store());
        let ids: HashSet<String> = self.selection.ids().iter().cloned().collect();
        let count = ids.len();

        self.advance(MutationPhase::Committing);
        let result = store.batch_delete(ids.iter().cloned().collect()).await;

        self.selection.exit();
        self.settle(
            Operation::DeleteSelected,
            result,
            count,
            format!("{} task(s) deleted", count),
            |engine| engine.remove(&ids),
        )
    }

    /// Delete all of the user's tasks, including any the view does not know
    /// about.
    pub async fn reset_all(&mut self) -> Result<MutationReport, MutationError> {
        let store = Arc::clone(self.engine.store());
        let user_id = self.engine.session().user_id().to_string();

        self.advance(MutationPhase::Committing);
        let result = delete_all_owned(store.as_ref(), &user_id).await;
        let count = match &result {
            Ok(deleted) => *deleted,
            Err(_) => self.engine.tasks().len(),
        };

        self.selection.exit();
        self.settle(
            Operation::ResetAll,
            result.map(|_| ()),
            count,
            "All tasks deleted".to_string(),
            |engine| engine.clear(),
        )
    }

    /// End the session this service works for.
    pub fn end_session(self) -> UserIdentity {
        self.engine.into_session().end()
    }

    /// Apply `apply` to the view according to the remote result and the
    /// operation's failure policy.
    fn settle<F>(
        &mut self,
        operation: Operation,
        result: WeekcalResult<()>,
        count: usize,
        success_message: String,
        apply: F,
    ) -> Result<MutationReport, MutationError>
    where
        F: FnOnce(&mut SyncEngine),
    {
        let user = self.engine.session().user_id().to_string();

        let error = match result {
            Ok(()) => {
                apply(&mut self.engine);
                self.advance(MutationPhase::Committed);
                tracing::info!(user = %user, count, "{} committed", operation);
                return Ok(MutationReport {
                    operation,
                    outcome: MutationPhase::Committed,
                    count,
                    notifications: vec![Notification::success(success_message)],
                });
            }
            Err(e) => e,
        };

        match operation.failure_policy() {
            FailurePolicy::FailClosed => {
                self.advance(MutationPhase::Failed);
                tracing::warn!(user = %user, error = %error, "{} failed", operation);
                Err(MutationError::Remote {
                    operation,
                    message: operation.remote_error_message().to_string(),
                    source: error,
                })
            }
            FailurePolicy::FailOpen => {
                apply(&mut self.engine);
                self.engine.mark_diverged();
                self.advance(MutationPhase::Degraded);
                tracing::warn!(user = %user, error = %error, count, "{} applied locally only", operation);
                let mut notifications =
                    vec![Notification::remote_error(operation.remote_error_message())];
                notifications.extend(operation.local_only_message().map(Notification::local_only));
                Ok(MutationReport {
                    operation,
                    outcome: MutationPhase::Degraded,
                    count,
                    notifications,
                })
            }
        }
    }

    fn advance(&mut self, next: MutationPhase) {
        if !self.phase.can_advance_to(next) {
            tracing::debug!(from = ?self.phase, to = ?next, "unexpected mutation phase transition");
        }
        self.phase = next;
    }
}

/// Query every record the user owns and delete them in one batch. Returns
/// how many were deleted.
async fn delete_all_owned(store: &dyn TaskStore, user_id: &str) -> WeekcalResult<usize> {
    let ids = store.query_ids_by_owner(user_id).await?;
    let count = ids.len();
    store.batch_delete(ids).await?;
    Ok(count)
}
