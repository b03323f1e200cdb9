//! Cloud Firestore adapter over the REST v1 API.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;

use super::protocol::{
    CommitRequest, Document, ErrorResponse, RunQueryRequest, RunQueryResponse, StructuredQuery,
    Value, Write,
};
use super::{BatchOp, StoredTask, TaskRecord, TaskStore, WriteBatch};
use crate::constants::{DEFAULT_FIRESTORE_URL, OWNER_FIELD, TASKS_COLLECTION};
use crate::error::{WeekcalError, WeekcalResult};
use crate::task::{TaskTime, Weekday};

/// Field used by the connectivity probe. No task ever sets it, so the probe
/// reads at most one unrelated document.
const PROBE_FIELD: &str = "test";

#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub collection: String,
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        FirestoreConfig {
            project_id: project_id.into(),
            api_key: None,
            base_url: DEFAULT_FIRESTORE_URL.to_string(),
            collection: TASKS_COLLECTION.to_string(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Clone)]
pub struct FirestoreStore {
    http: reqwest::Client,
    config: FirestoreConfig,
    id_token: Option<String>,
}

impl FirestoreStore {
    pub fn new(config: FirestoreConfig) -> Self {
        FirestoreStore {
            http: reqwest::Client::new(),
            config,
            id_token: None,
        }
    }

    /// A copy of this store that authenticates as the signed-in user, so
    /// that security rules scoped to `request.auth.uid` apply.
    pub fn with_id_token(&self, id_token: impl Into<String>) -> Self {
        FirestoreStore {
            http: self.http.clone(),
            config: self.config.clone(),
            id_token: Some(id_token.into()),
        }
    }

    fn documents_path(&self) -> String {
        format!(
            "projects/{}/databases/(default)/documents",
            self.config.project_id
        )
    }

    fn owner_query(&self, user_id: &str) -> StructuredQuery {
        StructuredQuery::field_equals(
            &self.config.collection,
            OWNER_FIELD,
            Value::StringValue(user_id.to_string()),
        )
    }

    fn document_name(&self, id: &str) -> String {
        format!("{}/{}/{}", self.documents_path(), self.config.collection, id)
    }

    fn request(&self, method: Method, resource: &str) -> RequestBuilder {
        let url = format!("{}/v1/{}", self.config.base_url, resource);
        let mut builder = self.http.request(method, url);

        if let Some(key) = &self.config.api_key {
            builder = builder.query(&[("key", key)]);
        }
        if let Some(token) = &self.id_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> WeekcalResult<T> {
        let resp = builder.send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .ok()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(WeekcalError::RemoteUnavailable(message));
        }

        resp.json::<T>()
            .await
            .map_err(|e| WeekcalError::RemoteProtocol(e.to_string()))
    }

    async fn run_query(&self, query: StructuredQuery) -> WeekcalResult<Vec<Document>> {
        let builder = self
            .request(Method::POST, &format!("{}:runQuery", self.documents_path()))
            .json(&RunQueryRequest {
                structured_query: query,
            });

        let responses: Vec<RunQueryResponse> = Self::send(builder).await?;
        Ok(responses.into_iter().filter_map(|r| r.document).collect())
    }

    fn to_document(&self, id: &str, record: &TaskRecord) -> Document {
        let mut fields = HashMap::from([
            ("title".to_string(), Value::StringValue(record.title.clone())),
            (
                "day".to_string(),
                Value::StringValue(record.day.label().to_string()),
            ),
            (
                "time".to_string(),
                Value::StringValue(record.time.as_str().to_string()),
            ),
            (
                OWNER_FIELD.to_string(),
                Value::StringValue(record.user_id.clone()),
            ),
        ]);

        if let Some(created_at) = record.created_at {
            fields.insert(
                "createdAt".to_string(),
                Value::TimestampValue(created_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            );
        }

        Document {
            name: self.document_name(id),
            fields,
            create_time: None,
            update_time: None,
        }
    }
}

/// Decode a task document. Documents that do not look like tasks are
/// skipped rather than failing the whole query.
fn stored_task_from(doc: &Document) -> Option<StoredTask> {
    let title = doc.string_field("title")?;
    let day = doc.string_field("day").and_then(Weekday::from_label)?;
    let time = doc
        .string_field("time")
        .and_then(|t| TaskTime::parse(t).ok())?;
    let user_id = doc.string_field(OWNER_FIELD)?;
    let created_at = doc
        .timestamp_field("createdAt")
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|dt| dt.with_timezone(&Utc));

    Some(StoredTask {
        id: doc.id().to_string(),
        record: TaskRecord {
            title: title.to_string(),
            day,
            time,
            user_id: user_id.to_string(),
            created_at,
        },
    })
}

#[async_trait]
impl TaskStore for FirestoreStore {
    async fn query_by_owner(&self, user_id: &str) -> WeekcalResult<Vec<StoredTask>> {
        let documents = self.run_query(self.owner_query(user_id)).await?;

        let tasks: Vec<StoredTask> = documents
            .iter()
            .filter_map(|doc| {
                let task = stored_task_from(doc);
                if task.is_none() {
                    tracing::warn!(document = %doc.name, "skipping malformed task document");
                }
                task
            })
            .collect();

        tracing::debug!(user = user_id, count = tasks.len(), "queried remote tasks");
        Ok(tasks)
    }

    async fn query_ids_by_owner(&self, user_id: &str) -> WeekcalResult<Vec<String>> {
        let documents = self.run_query(self.owner_query(user_id)).await?;
        Ok(documents.iter().map(|doc| doc.id().to_string()).collect())
    }

    async fn probe(&self) -> WeekcalResult<()> {
        let query = StructuredQuery::field_equals(
            &self.config.collection,
            PROBE_FIELD,
            Value::BooleanValue(true),
        )
        .limit(1);
        self.run_query(query).await?;
        Ok(())
    }

    async fn commit(&self, batch: WriteBatch) -> WeekcalResult<()> {
        let writes = batch
            .ops()
            .iter()
            .map(|op| match op {
                BatchOp::Set { id, record } => Write::Update(self.to_document(id, record)),
                BatchOp::Delete { id } => Write::Delete(self.document_name(id)),
            })
            .collect();

        let builder = self
            .request(Method::POST, &format!("{}:commit", self.documents_path()))
            .json(&CommitRequest { writes });

        let _: serde_json::Value = Self::send(builder).await?;
        tracing::debug!(writes = batch.len(), "committed remote batch");
        Ok(())
    }

    async fn delete(&self, id: &str) -> WeekcalResult<()> {
        let builder = self.request(Method::DELETE, &self.document_name(id));
        let _: serde_json::Value = Self::send(builder).await?;
        Ok(())
    }
}
