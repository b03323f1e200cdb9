//! Sign-in and sign-out endpoints

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};

use weekcal_core::Notification;
use weekcal_core::auth::{AuthError, UserIdentity};

use crate::routes::{AppError, CurrentSession, WeekResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/sign-out", post(sign_out))
}

/// Either a credential from the browser's sign-in popup, or the error code
/// the popup failed with.
#[derive(Deserialize)]
pub struct SignInRequest {
    pub id_token: Option<String>,
    pub error_code: Option<String>,
}

#[derive(Serialize)]
pub struct SignInResponse {
    pub token: String,
    pub user: UserIdentity,
    #[serde(flatten)]
    pub state: WeekResponse,
}

#[derive(Serialize)]
pub struct SignOutResponse {
    pub notifications: Vec<Notification>,
}

/// POST /auth/sign-in - Start a session and load the user's week
async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<SignInResponse>, AppError> {
    if let Some(code) = req.error_code {
        let err = AuthError::from_code(&code);
        tracing::warn!(code = %code, "sign-in popup failed");
        return Err(err.into());
    }

    let credential = req.id_token.unwrap_or_default();
    let signed_in = state.identity().sign_in(&credential).await.map_err(|e| {
        tracing::warn!(code = e.code(), detail = ?e.detail(), "sign-in failed");
        e
    })?;
    let user = signed_in.user.clone();

    let (token, service) = state.open_session(signed_in).await;
    let mut service = service.lock().await;

    let mut notifications = vec![Notification::success(format!(
        "Signed in as {}",
        user.display_name.as_deref().unwrap_or(&user.uid)
    ))];
    let report = service.engine_mut().load().await;
    notifications.extend(report.notifications);
    service.engine_mut().probe().await;

    Ok(Json(SignInResponse {
        token,
        user,
        state: WeekResponse::from_service(&service, notifications),
    }))
}

/// POST /auth/sign-out - End the caller's session. The session is dropped
/// even when the identity provider fails.
async fn sign_out(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Json<SignOutResponse>, AppError> {
    let user = session
        .service
        .lock()
        .await
        .engine()
        .session()
        .user()
        .clone();

    let result = state.identity().sign_out(&user).await;

    state.close_session(&session.token).await;
    if let Ok(service) = Arc::try_unwrap(session.service) {
        service.into_inner().end_session();
    }

    result.map_err(|e| {
        tracing::warn!(detail = ?e.detail(), "sign-out failed");
        e
    })?;

    Ok(Json(SignOutResponse {
        notifications: vec![Notification::success("Signed out")],
    }))
}
