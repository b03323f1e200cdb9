//! Week view and task mutation endpoints

use axum::{
    Json, Router,
    extract::Path,
    routing::{delete, get, post},
};
use serde::Serialize;

use weekcal_core::mutation::{MutationPhase, MutationReport, MutationService, Operation, TaskDraft};

use crate::routes::{AppError, CurrentSession, WeekResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(week).post(create_task))
        .route("/tasks/refresh", post(refresh))
        .route("/tasks/reset", post(reset_all))
        .route("/tasks/{id}", delete(delete_task))
}

/// A mutation outcome together with the week it left behind.
#[derive(Serialize)]
pub struct MutationResponse {
    pub operation: Operation,
    pub outcome: MutationPhase,
    pub count: usize,
    #[serde(flatten)]
    pub state: WeekResponse,
}

impl MutationResponse {
    pub(crate) fn new(service: &MutationService, report: MutationReport) -> Self {
        MutationResponse {
            operation: report.operation,
            outcome: report.outcome,
            count: report.count,
            state: WeekResponse::from_service(service, report.notifications),
        }
    }
}

/// GET /tasks - The current week
async fn week(session: CurrentSession) -> Json<WeekResponse> {
    let service = session.service.lock().await;
    Json(WeekResponse::from_service(&service, Vec::new()))
}

/// POST /tasks/refresh - Reload from the remote store
async fn refresh(session: CurrentSession) -> Json<WeekResponse> {
    let mut service = session.service.lock().await;
    let report = service.engine_mut().load().await;
    Json(WeekResponse::from_service(&service, report.notifications))
}

/// POST /tasks - Create a task on one day, or on several
async fn create_task(
    session: CurrentSession,
    Json(draft): Json<TaskDraft>,
) -> Result<Json<MutationResponse>, AppError> {
    let mut service = session.service.lock().await;
    let report = service.create(&draft).await?;
    Ok(Json(MutationResponse::new(&service, report)))
}

/// DELETE /tasks/:id - Delete one task
async fn delete_task(
    session: CurrentSession,
    Path(id): Path<String>,
) -> Result<Json<MutationResponse>, AppError> {
    let mut service = session.service.lock().await;
    let report = service.delete(&id).await?;
    Ok(Json(MutationResponse::new(&service, report)))
}

/// POST /tasks/reset - Delete all of the user's tasks
async fn reset_all(session: CurrentSession) -> Result<Json<MutationResponse>, AppError> {
    let mut service = session.service.lock().await;
    let report = service.reset_all().await?;
    Ok(Json(MutationResponse::new(&service, report)))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::{Value, json};

    use weekcal_core::local::SnapshotStore;

    use crate::routes::test_support::TestApp;

    fn monday_titles(body: &Value) -> Vec<String> {
        body["week"]["days"][0]["tasks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["title"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_create_then_read_week() {
        let app = TestApp::new();
        let token = app.sign_in("camille").await;

        let (status, body) = app
            .call(
                Method::POST,
                "/tasks",
                Some(&token),
                Some(json!({"title": "Cours", "time": "10:00", "day": "Lundi"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["outcome"], "committed");
        assert_eq!(body["notifications"][0]["kind"], "success");

        app.call(
            Method::POST,
            "/tasks",
            Some(&token),
            Some(json!({"title": "Réviser", "time": "9:00", "day": "monday"})),
        )
        .await;

        let (_, body) = app.call(Method::GET, "/tasks", Some(&token), None).await;
        assert_eq!(monday_titles(&body), vec!["Réviser", "Cours"]);
        assert_eq!(body["week"]["days"][0]["tasks"][0]["time"], "09:00");
    }

    #[tokio::test]
    async fn test_repeated_create_writes_every_day() {
        let app = TestApp::new();
        let token = app.sign_in("camille").await;

        let (status, body) = app
            .call(
                Method::POST,
                "/tasks",
                Some(&token),
                Some(json!({
                    "title": "Sport",
                    "time": "18:30",
                    "repeated": true,
                    "days": ["Mardi", "Jeudi"]
                })),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(app.store.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_create_is_unprocessable() {
        let app = TestApp::new();
        let token = app.sign_in("camille").await;
        let calls = app.store.calls();

        let (status, body) = app
            .call(
                Method::POST,
                "/tasks",
                Some(&token),
                Some(json!({"title": "Sport", "time": "18:30", "repeated": true, "days": []})),
            )
            .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "Select at least one day");
        assert_eq!(app.store.calls(), calls);
    }

    #[tokio::test]
    async fn test_create_with_store_down_is_bad_gateway() {
        let app = TestApp::new();
        let token = app.sign_in("camille").await;
        app.store.set_offline(true);

        let (status, body) = app
            .call(
                Method::POST,
                "/tasks",
                Some(&token),
                Some(json!({"title": "Sport", "time": "18:30", "day": "Lundi"})),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Error while adding the task");
    }

    #[tokio::test]
    async fn test_delete_with_store_down_is_local_only() {
        let app = TestApp::new();
        let token = app.sign_in("camille").await;
        let (_, body) = app
            .call(
                Method::POST,
                "/tasks",
                Some(&token),
                Some(json!({"title": "Sport", "time": "18:30", "day": "Lundi"})),
            )
            .await;
        let id = body["week"]["days"][0]["tasks"][0]["id"]
            .as_str()
            .unwrap()
            .to_string();

        app.store.set_offline(true);
        let (status, body) = app
            .call(Method::DELETE, &format!("/tasks/{}", id), Some(&token), None)
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "degraded");
        assert_eq!(body["notifications"][1]["kind"], "local_only");
        assert!(monday_titles(&body).is_empty());
        assert_eq!(body["status"]["degraded"], true);
    }

    #[tokio::test]
    async fn test_reset_clears_week_and_snapshot() {
        let app = TestApp::new();
        let token = app.sign_in("camille").await;
        app.call(
            Method::POST,
            "/tasks",
            Some(&token),
            Some(json!({"title": "Sport", "time": "18:30", "repeated": true, "days": ["Lundi", "Mardi"]})),
        )
        .await;
        assert!(app.snapshots.get("camille").is_some());

        let (status, body) = app.call(Method::POST, "/tasks/reset", Some(&token), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert!(app.store.is_empty());
        assert!(app.snapshots.get("camille").is_none());
    }

    #[tokio::test]
    async fn test_refresh_falls_back_to_snapshot() {
        let app = TestApp::new();
        let token = app.sign_in("camille").await;
        app.call(
            Method::POST,
            "/tasks",
            Some(&token),
            Some(json!({"title": "Sport", "time": "18:30", "day": "Lundi"})),
        )
        .await;

        app.store.set_offline(true);
        let (status, body) = app.call(Method::POST, "/tasks/refresh", Some(&token), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"]["source"], "local_snapshot");
        assert_eq!(monday_titles(&body), vec!["Sport"]);
        assert_eq!(body["notifications"][0]["kind"], "local_only");
    }

    #[tokio::test]
    async fn test_tasks_require_session() {
        let app = TestApp::new();
        let (status, _) = app.call(Method::GET, "/tasks", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app.call(Method::GET, "/tasks", Some("bogus"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
