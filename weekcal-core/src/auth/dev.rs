use async_trait::async_trait;

use super::{AuthError, IdentityProvider, SignedIn, UserIdentity};

/// Development identity provider: the credential is the user id.
///
/// Pairs with the in-memory task store for running the server without a
/// cloud project.
#[derive(Debug, Default, Clone)]
pub struct DevAuth;

#[async_trait]
impl IdentityProvider for DevAuth {
    async fn sign_in(&self, credential: &str) -> Result<SignedIn, AuthError> {
        let uid = credential.trim();
        if uid.is_empty() {
            return Err(AuthError::Other("empty credential".into()));
        }

        Ok(SignedIn {
            user: UserIdentity {
                uid: uid.to_string(),
                display_name: Some(uid.to_string()),
                avatar_url: None,
            },
            id_token: None,
        })
    }

    async fn sign_out(&self, _user: &UserIdentity) -> Result<(), AuthError> {
        Ok(())
    }
}
