//! Selection mode endpoints

use axum::{
    Json, Router,
    extract::Path,
    routing::post,
};
use serde::Serialize;

use weekcal_core::mutation::MutationError;

use crate::routes::tasks::MutationResponse;
use crate::routes::{AppError, CurrentSession, WeekResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/selection", post(enter).delete(exit))
        .route("/selection/delete", post(delete_selected))
        .route("/selection/{id}", post(toggle))
}

#[derive(Serialize)]
pub struct ToggleResponse {
    pub id: String,
    pub selected: bool,
    #[serde(flatten)]
    pub state: WeekResponse,
}

/// POST /selection - Enter selection mode
async fn enter(session: CurrentSession) -> Result<Json<WeekResponse>, AppError> {
    let mut service = session.service.lock().await;
    if !service.enter_selection_mode() {
        return Err(MutationError::Validation("There are no tasks to select".into()).into());
    }
    Ok(Json(WeekResponse::from_service(&service, Vec::new())))
}

/// DELETE /selection - Leave selection mode
async fn exit(session: CurrentSession) -> Json<WeekResponse> {
    let mut service = session.service.lock().await;
    service.exit_selection_mode();
    Json(WeekResponse::from_service(&service, Vec::new()))
}

/// POST /selection/:id - Select or unselect a task
async fn toggle(session: CurrentSession, Path(id): Path<String>) -> Json<ToggleResponse> {
    let mut service = session.service.lock().await;
    let selected = service.toggle_selection(&id);
    Json(ToggleResponse {
        id,
        selected,
        state: WeekResponse::from_service(&service, Vec::new()),
    })
}

/// POST /selection/delete - Delete the selected tasks
async fn delete_selected(session: CurrentSession) -> Result<Json<MutationResponse>, AppError> {
    let mut service = session.service.lock().await;
    let report = service.delete_selected().await?;
    Ok(Json(MutationResponse::new(&service, report)))
}
