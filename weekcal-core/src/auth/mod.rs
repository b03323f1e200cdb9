//! Identity boundary.
//!
//! Signing in is delegated to an external identity provider. The interactive
//! part (the OAuth popup) runs in the browser; what reaches this crate is
//! either a credential to exchange for a user, or the provider's error code
//! for a popup that failed.

mod dev;
mod firebase;

pub use dev::DevAuth;
pub use firebase::{FirebaseAuth, FirebaseAuthConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub uid: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// A successful sign-in.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user: UserIdentity,
    /// Token to present to the remote store on the user's behalf, when the
    /// provider issues one.
    pub id_token: Option<String>,
}

/// Sign-in and sign-out failures. The display text is the message shown to
/// the user; provider details are kept for logs only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error(
        "Popups are blocked. Allow popups for this site in your browser settings and try again."
    )]
    PopupBlocked,

    #[error("Sign-in cancelled")]
    PopupClosedByUser,

    #[error("The sign-in request was cancelled")]
    CancelledPopupRequest,

    #[error("Network error. Check your internet connection.")]
    NetworkRequestFailed,

    #[error("An error occurred while signing in")]
    Other(String),

    #[error("An error occurred while signing out")]
    SignOut(String),
}

impl AuthError {
    /// Map a provider error code (`auth/popup-blocked`, ...) to an error.
    pub fn from_code(code: &str) -> Self {
        match code {
            "auth/popup-blocked" => AuthError::PopupBlocked,
            "auth/popup-closed-by-user" => AuthError::PopupClosedByUser,
            "auth/cancelled-popup-request" => AuthError::CancelledPopupRequest,
            "auth/network-request-failed" => AuthError::NetworkRequestFailed,
            other => AuthError::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            AuthError::PopupBlocked => "auth/popup-blocked",
            AuthError::PopupClosedByUser => "auth/popup-closed-by-user",
            AuthError::CancelledPopupRequest => "auth/cancelled-popup-request",
            AuthError::NetworkRequestFailed => "auth/network-request-failed",
            AuthError::Other(_) => "auth/internal-error",
            AuthError::SignOut(_) => "auth/sign-out-failed",
        }
    }

    /// Provider detail for diagnostics, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            AuthError::Other(detail) | AuthError::SignOut(detail) => Some(detail),
            _ => None,
        }
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, credential: &str) -> Result<SignedIn, AuthError>;

    async fn sign_out(&self, user: &UserIdentity) -> Result<(), AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_map_to_tailored_errors() {
        assert_eq!(AuthError::from_code("auth/popup-blocked"), AuthError::PopupBlocked);
        assert_eq!(
            AuthError::from_code("auth/popup-closed-by-user"),
            AuthError::PopupClosedByUser
        );
        assert_eq!(
            AuthError::from_code("auth/cancelled-popup-request"),
            AuthError::CancelledPopupRequest
        );
        assert_eq!(
            AuthError::from_code("auth/network-request-failed"),
            AuthError::NetworkRequestFailed
        );
    }

    #[test]
    fn test_unknown_codes_collapse_to_generic_message() {
        let err = AuthError::from_code("auth/user-disabled");
        assert_eq!(err.to_string(), "An error occurred while signing in");
        assert_eq!(err.detail(), Some("auth/user-disabled"));
    }

    #[test]
    fn test_codes_round_trip() {
        for err in [
            AuthError::PopupBlocked,
            AuthError::PopupClosedByUser,
            AuthError::CancelledPopupRequest,
            AuthError::NetworkRequestFailed,
        ] {
            assert_eq!(AuthError::from_code(err.code()), err);
        }
    }
}
