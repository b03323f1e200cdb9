//! User-facing notifications produced by loads and mutations.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    ValidationError,
    /// The remote store failed; the message says what happened remotely.
    RemoteError,
    /// The effect was applied to local state only.
    LocalOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::ValidationError, message)
    }

    pub fn remote_error(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::RemoteError, message)
    }

    pub fn local_only(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::LocalOnly, message)
    }

    fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Notification {
            kind,
            message: message.into(),
        }
    }
}
