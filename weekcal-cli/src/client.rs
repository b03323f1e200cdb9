//! HTTP client for communicating with weekcal-server

use anyhow::{Context, Result};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::process::Command;
use std::time::Duration;

use weekcal_core::Notification;
use weekcal_core::WeekView;
use weekcal_core::auth::UserIdentity;

const MAX_RETRIES: u32 = 10;
const RETRY_DELAY_MS: u64 = 200;

/// HTTP client for weekcal-server
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

// Response types matching server API

#[derive(Deserialize, Debug)]
pub struct StoreStatus {
    pub source: String,
    pub error: Option<String>,
    pub degraded: bool,
}

#[derive(Deserialize, Debug)]
pub struct SelectionInfo {
    pub active: bool,
    pub ids: Vec<String>,
}

#[derive(Deserialize, Debug)]
pub struct WeekState {
    pub week: WeekView,
    pub status: StoreStatus,
    pub selection: SelectionInfo,
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

#[derive(Deserialize, Debug)]
pub struct SignInResult {
    pub token: String,
    pub user: UserIdentity,
    #[serde(flatten)]
    pub state: WeekState,
}

#[derive(Deserialize, Debug)]
pub struct MutationResult {
    pub outcome: String,
    pub count: usize,
    #[serde(flatten)]
    pub state: WeekState,
}

#[derive(Deserialize, Debug)]
pub struct ToggleResult {
    pub selected: bool,
}

#[derive(Deserialize, Debug)]
pub struct SignOutResult {
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

#[derive(Serialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub days: Vec<String>,
    pub repeated: bool,
}

#[derive(Serialize)]
struct SignInRequest<'a> {
    id_token: &'a str,
}

#[derive(Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl Client {
    /// Connect to existing server or start one
    pub async fn connect(port: u16) -> Result<Self> {
        let client = Self::with_base_url(format!("http://127.0.0.1:{}", port));

        // Try to connect to existing server
        if client.health_check().await.is_ok() {
            return Ok(client);
        }

        // Server not running - start it
        start_server()?;

        // Wait for server to be ready
        for _ in 0..MAX_RETRIES {
            tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS)).await;
            if client.health_check().await.is_ok() {
                return Ok(client);
            }
        }

        anyhow::bail!("Failed to connect to weekcal-server after starting it")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Client {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Authenticate later requests with a session token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Any answer, even 401, means the server is up.
    async fn health_check(&self) -> Result<()> {
        self.http
            .get(format!("{}/tasks", self.base_url))
            .timeout(Duration::from_secs(2))
            .send()
            .await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T> {
        let resp = builder
            .send()
            .await
            .context("Failed to connect to server")?;
        Self::parse(resp).await
    }

    async fn parse<T: DeserializeOwned>(resp: Response) -> Result<T> {
        if !resp.status().is_success() {
            let status = resp.status();
            let err: ErrorResponse = resp
                .json()
                .await
                .with_context(|| format!("Server answered {}", status))?;
            anyhow::bail!("{}", err.error);
        }

        Ok(resp.json().await?)
    }

    /// POST /auth/sign-in
    pub async fn sign_in(&self, id_token: &str) -> Result<SignInResult> {
        Self::send(
            self.request(Method::POST, "/auth/sign-in")
                .json(&SignInRequest { id_token }),
        )
        .await
    }

    /// POST /auth/sign-out
    pub async fn sign_out(&self) -> Result<SignOutResult> {
        Self::send(self.request(Method::POST, "/auth/sign-out")).await
    }

    /// GET /tasks
    pub async fn week(&self) -> Result<WeekState> {
        Self::send(self.request(Method::GET, "/tasks")).await
    }

    /// POST /tasks/refresh
    pub async fn refresh(&self) -> Result<WeekState> {
        Self::send(self.request(Method::POST, "/tasks/refresh")).await
    }

    /// POST /tasks
    pub async fn create_task(&self, req: &CreateTaskRequest) -> Result<MutationResult> {
        Self::send(self.request(Method::POST, "/tasks").json(req)).await
    }

    /// DELETE /tasks/:id
    pub async fn delete_task(&self, id: &str) -> Result<MutationResult> {
        Self::send(self.request(Method::DELETE, &format!("/tasks/{}", id))).await
    }

    /// POST /tasks/reset
    pub async fn reset(&self) -> Result<MutationResult> {
        Self::send(self.request(Method::POST, "/tasks/reset")).await
    }

    /// POST /selection
    pub async fn enter_selection(&self) -> Result<WeekState> {
        Self::send(self.request(Method::POST, "/selection")).await
    }

    /// DELETE /selection
    pub async fn exit_selection(&self) -> Result<WeekState> {
        Self::send(self.request(Method::DELETE, "/selection")).await
    }

    /// POST /selection/:id
    pub async fn toggle_selection(&self, id: &str) -> Result<ToggleResult> {
        Self::send(self.request(Method::POST, &format!("/selection/{}", id))).await
    }

    /// POST /selection/delete
    pub async fn delete_selected(&self) -> Result<MutationResult> {
        Self::send(self.request(Method::POST, "/selection/delete")).await
    }
}

/// Start the weekcal-server process
fn start_server() -> Result<()> {
    Command::new("weekcal-server")
        .spawn()
        .context("Failed to start weekcal-server. Is it installed?")?;
    Ok(())
}
