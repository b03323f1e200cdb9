//! What each mutating operation does when the remote store fails.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Delete,
    DeleteSelected,
    ResetAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Report the failure and leave local state untouched.
    FailClosed,
    /// Apply the effect locally anyway and tell the user it is local only.
    FailOpen,
}

/// Remote failure policy per operation.
pub const FAILURE_POLICIES: [(Operation, FailurePolicy); 4] = [
    (Operation::Create, FailurePolicy::FailClosed),
    (Operation::Delete, FailurePolicy::FailOpen),
    (Operation::DeleteSelected, FailurePolicy::FailOpen),
    (Operation::ResetAll, FailurePolicy::FailOpen),
];

impl Operation {
    pub fn failure_policy(self) -> FailurePolicy {
        FAILURE_POLICIES
            .iter()
            .find(|(op, _)| *op == self)
            .map(|(_, policy)| *policy)
            .unwrap_or(FailurePolicy::FailClosed)
    }

    /// Shown when the remote store failed the operation.
    pub(crate) fn remote_error_message(self) -> &'static str {
        match self {
            Operation::Create => "Error while adding the task",
            Operation::Delete => "Error while deleting the task",
            Operation::DeleteSelected => "Error while deleting the selected tasks",
            Operation::ResetAll => "Error while deleting all tasks",
        }
    }

    /// Shown when a fail-open operation was only applied locally. Create
    /// fails closed and never gets here.
    pub(crate) fn local_only_message(self) -> Option<&'static str> {
        match self {
            Operation::Create => None,
            Operation::Delete => Some("Task deleted locally only"),
            Operation::DeleteSelected => Some("Tasks deleted locally only"),
            Operation::ResetAll => Some("Tasks reset locally only"),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Operation::Create => "create",
            Operation::Delete => "delete",
            Operation::DeleteSelected => "delete selected",
            Operation::ResetAll => "reset all",
        };
        f.write_str(name)
    }
}

/// Lifecycle of one mutating operation:
/// `idle -> validating -> (rejected | committing) -> (committed | degraded | failed)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationPhase {
    Idle,
    Validating,
    Rejected,
    Committing,
    Committed,
    /// Applied locally, remote store failed.
    Degraded,
    /// Remote store failed a fail-closed operation; nothing changed.
    Failed,
}

impl MutationPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            MutationPhase::Rejected
                | MutationPhase::Committed
                | MutationPhase::Degraded
                | MutationPhase::Failed
        )
    }

    pub(crate) fn can_advance_to(self, next: MutationPhase) -> bool {
        use MutationPhase::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Idle, Committing)
                | (Validating, Rejected)
                | (Validating, Committing)
                | (Committing, Committed)
                | (Committing, Degraded)
                | (Committing, Failed)
        ) || (self.is_terminal() && matches!(next, Validating | Committing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_create_fails_closed() {
        assert_eq!(Operation::Create.failure_policy(), FailurePolicy::FailClosed);
        assert_eq!(Operation::Delete.failure_policy(), FailurePolicy::FailOpen);
        assert_eq!(
            Operation::DeleteSelected.failure_policy(),
            FailurePolicy::FailOpen
        );
        assert_eq!(Operation::ResetAll.failure_policy(), FailurePolicy::FailOpen);
    }

    #[test]
    fn test_local_only_message_only_for_fail_open() {
        for (operation, policy) in FAILURE_POLICIES {
            assert_eq!(
                operation.local_only_message().is_some(),
                policy == FailurePolicy::FailOpen,
                "{operation}"
            );
        }
    }

    #[test]
    fn test_phase_transitions() {
        use MutationPhase::*;

        assert!(Idle.can_advance_to(Validating));
        assert!(Validating.can_advance_to(Rejected));
        assert!(Committing.can_advance_to(Degraded));
        assert!(Committed.can_advance_to(Validating));

        assert!(!Validating.can_advance_to(Committed));
        assert!(!Rejected.can_advance_to(Committed));
        assert!(!Committing.can_advance_to(Rejected));
    }
}
