//! Firebase Authentication via the Identity Toolkit REST API.
//!
//! The browser completes the Google OAuth popup and hands over the Google ID
//! token; `accounts:signInWithIdp` exchanges it for a Firebase user and a
//! Firebase ID token usable against Firestore.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{AuthError, IdentityProvider, SignedIn, UserIdentity};
use crate::constants::DEFAULT_IDENTITY_TOOLKIT_URL;

const GOOGLE_PROVIDER_ID: &str = "google.com";

#[derive(Debug, Clone)]
pub struct FirebaseAuthConfig {
    pub api_key: String,
    pub base_url: String,
    /// Must be a URI authorized for the project; the exchange does not
    /// redirect to it.
    pub request_uri: String,
}

impl FirebaseAuthConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        FirebaseAuthConfig {
            api_key: api_key.into(),
            base_url: DEFAULT_IDENTITY_TOOLKIT_URL.to_string(),
            request_uri: "http://localhost".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

pub struct FirebaseAuth {
    http: reqwest::Client,
    config: FirebaseAuthConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInWithIdpRequest {
    post_body: String,
    request_uri: String,
    return_idp_credential: bool,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInWithIdpResponse {
    local_id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorStatus,
}

#[derive(Deserialize)]
struct ErrorStatus {
    #[serde(default)]
    message: String,
}

impl FirebaseAuth {
    pub fn new(config: FirebaseAuthConfig) -> Self {
        FirebaseAuth {
            http: reqwest::Client::new(),
            config,
        }
    }
}

/// Identity Toolkit reports errors as `CODE` or `CODE : detail`.
fn error_from_message(message: &str) -> AuthError {
    let code = message.split(':').next().unwrap_or_default().trim();
    match code {
        "USER_CANCELLED" => AuthError::PopupClosedByUser,
        _ => AuthError::Other(message.to_string()),
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuth {
    async fn sign_in(&self, credential: &str) -> Result<SignedIn, AuthError> {
        let url = format!("{}/v1/accounts:signInWithIdp", self.config.base_url);
        // Google ID tokens are JWTs, already URL-safe.
        let body = SignInWithIdpRequest {
            post_body: format!("id_token={}&providerId={}", credential, GOOGLE_PROVIDER_ID),
            request_uri: self.config.request_uri.clone(),
            return_idp_credential: true,
            return_secure_token: true,
        };

        let resp = self
            .http
            .post(url)
            .query(&[("key", &self.config.api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "identity toolkit unreachable");
                AuthError::NetworkRequestFailed
            })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|_| AuthError::NetworkRequestFailed)?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {}", status));
            return Err(error_from_message(&message));
        }

        let data: SignInWithIdpResponse = serde_json::from_str(&text)
            .map_err(|e| AuthError::Other(format!("unexpected sign-in response: {e}")))?;

        Ok(SignedIn {
            user: UserIdentity {
                uid: data.local_id,
                display_name: data.display_name,
                avatar_url: data.photo_url,
            },
            id_token: data.id_token,
        })
    }

    /// Firebase sessions are client-side; dropping the local session is all
    /// signing out requires.
    async fn sign_out(&self, _user: &UserIdentity) -> Result<(), AuthError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn auth_for(server: &MockServer) -> FirebaseAuth {
        FirebaseAuth::new(FirebaseAuthConfig::new("web-key").with_base_url(server.uri()))
    }

    #[tokio::test]
    async fn test_exchanges_google_token_for_user() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithIdp"))
            .and(query_param("key", "web-key"))
            .and(body_partial_json(json!({
                "postBody": "id_token=google-jwt&providerId=google.com",
                "returnSecureToken": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "localId": "uid-42",
                "displayName": "Camille",
                "photoUrl": "https://example.com/camille.png",
                "idToken": "firebase-jwt",
                "email": "camille@example.com"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let signed_in = auth_for(&server).sign_in("google-jwt").await.unwrap();

        assert_eq!(signed_in.user.uid, "uid-42");
        assert_eq!(signed_in.user.display_name.as_deref(), Some("Camille"));
        assert_eq!(
            signed_in.user.avatar_url.as_deref(),
            Some("https://example.com/camille.png")
        );
        assert_eq!(signed_in.id_token.as_deref(), Some("firebase-jwt"));
    }

    #[tokio::test]
    async fn test_cancelled_flow_maps_to_popup_closed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "message": "USER_CANCELLED : user cancelled"}
            })))
            .mount(&server)
            .await;

        let err = auth_for(&server).sign_in("google-jwt").await.unwrap_err();
        assert_eq!(err, AuthError::PopupClosedByUser);
    }

    #[tokio::test]
    async fn test_other_provider_errors_are_generic() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "message": "INVALID_IDP_RESPONSE"}
            })))
            .mount(&server)
            .await;

        let err = auth_for(&server).sign_in("bad").await.unwrap_err();
        assert_eq!(err, AuthError::Other("INVALID_IDP_RESPONSE".to_string()));
        assert_eq!(err.to_string(), "An error occurred while signing in");
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_network_failure() {
        let auth = FirebaseAuth::new(
            FirebaseAuthConfig::new("web-key").with_base_url("http://127.0.0.1:9"),
        );

        let err = auth.sign_in("google-jwt").await.unwrap_err();
        assert_eq!(err, AuthError::NetworkRequestFailed);
    }
}
