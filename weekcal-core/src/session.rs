//! The signed-in session.
//!
//! A session is created from a successful sign-in and handed to the sync
//! engine at construction. Nothing else holds the user's identity; ending
//! the session consumes it.

use chrono::{DateTime, Utc};

use crate::auth::{SignedIn, UserIdentity};

#[derive(Debug, Clone)]
pub struct Session {
    user: UserIdentity,
    started_at: DateTime<Utc>,
}

impl Session {
    pub fn begin(signed_in: SignedIn) -> Self {
        tracing::info!(user = %signed_in.user.uid, "session started");
        Session {
            user: signed_in.user,
            started_at: Utc::now(),
        }
    }

    pub fn user(&self) -> &UserIdentity {
        &self.user
    }

    pub fn user_id(&self) -> &str {
        &self.user.uid
    }

    pub fn end(self) -> UserIdentity {
        let minutes = (Utc::now() - self.started_at).num_minutes();
        tracing::info!(user = %self.user.uid, minutes, "session ended");
        self.user
    }
}
