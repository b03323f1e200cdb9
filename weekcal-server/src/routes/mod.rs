pub mod auth;
pub mod selection;
pub mod tasks;

use std::fmt;

use axum::{
    Json, Router,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use weekcal_core::WeekcalError;
use weekcal_core::auth::AuthError;
use weekcal_core::mutation::{MutationError, MutationService};
use weekcal_core::sync::SyncStatus;
use weekcal_core::{Notification, WeekView};

use crate::state::{AppState, SharedSession};

/// All routes, without CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(tasks::router())
        .merge(selection::router())
        .with_state(state)
}

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Missing, malformed or unknown session token.
#[derive(Debug)]
pub struct SessionRequired;

impl fmt::Display for SessionRequired {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Not signed in")
    }
}

impl std::error::Error for SessionRequired {}

/// Convert errors to HTTP responses
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        if let Some(err) = self.0.downcast_ref::<MutationError>() {
            return match err {
                MutationError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                MutationError::Remote { .. } => StatusCode::BAD_GATEWAY,
            };
        }
        if let Some(err) = self.0.downcast_ref::<AuthError>() {
            return match err {
                AuthError::SignOut(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::UNAUTHORIZED,
            };
        }
        if self.0.is::<SessionRequired>() {
            return StatusCode::UNAUTHORIZED;
        }
        if let Some(WeekcalError::Validation(_)) = self.0.downcast_ref::<WeekcalError>() {
            return StatusCode::UNPROCESSABLE_ENTITY;
        }
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self.0, "request failed");
        } else {
            tracing::debug!(%status, error = %self.0, "request rejected");
        }

        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// The caller's session, found from `Authorization: Bearer <token>`.
pub struct CurrentSession {
    pub token: String,
    pub service: SharedSession,
}

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or(SessionRequired)?;

        let service = state.session(&token).await.ok_or(SessionRequired)?;

        Ok(CurrentSession { token, service })
    }
}

/// Selection mode as returned to clients.
#[derive(Serialize)]
pub struct SelectionInfo {
    pub active: bool,
    pub ids: Vec<String>,
}

/// The state a client renders: the week, the store status and the selection.
#[derive(Serialize)]
pub struct WeekResponse {
    pub week: WeekView,
    pub status: SyncStatus,
    pub selection: SelectionInfo,
    pub notifications: Vec<Notification>,
}

impl WeekResponse {
    pub fn from_service(service: &MutationService, notifications: Vec<Notification>) -> Self {
        let selection = service.selection();
        WeekResponse {
            week: service.engine().week(),
            status: service.engine().status(),
            selection: SelectionInfo {
                active: selection.is_active(),
                ids: selection.ids().iter().cloned().collect(),
            },
            notifications,
        }
    }
}
