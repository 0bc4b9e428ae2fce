//! Internal HTTP client implementation for notion

use anyhow::{Context, Result};
use reqwest::blocking::Client as HttpClient;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::debug;

use super::{DEFAULT_API_URL, DEFAULT_API_VERSION, ERROR_SNIPPET_CHARS};
use crate::error::SyncError;
use crate::pipeline::{RecordSink, SchemaSource};
use crate::properties::Payload;
use crate::schema::{ColumnKind, Schema, SchemaColumn};

/// Notion REST client
pub struct NotionClient {
    base_url: String,
    token: String,
    version: String,
    http: HttpClient,
}

impl NotionClient {
    pub fn new(token: impl Into<String>, timeout: Duration, proxy: Option<&str>) -> Result<Self> {
        Ok(Self {
            base_url: DEFAULT_API_URL.to_string(),
            token: token.into(),
            version: DEFAULT_API_VERSION.to_string(),
            http: crate::http::client(timeout, proxy)?,
        })
    }

    /// Point the client at another API root (self-hosted proxy, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Raw database object, as returned by the API.
    pub fn fetch_database(&self, database_id: &str) -> Result<Value> {
        let url = format!("{}/v1/databases/{}", self.base_url, database_id);
        debug!(%url, "fetching database");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .header("Notion-Version", &self.version)
            .send()
            .with_context(|| format!("Failed to connect to Notion at {}", self.base_url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            anyhow::bail!(
                "Notion returned status {}: {}",
                status,
                crate::http::snippet(&body, ERROR_SNIPPET_CHARS)
            );
        }

        response
            .json::<Value>()
            .context("Failed to parse database response")
    }
}

impl SchemaSource for NotionClient {
    fn fetch_schema(&self, database_id: &str) -> Result<Schema> {
        let database = self.fetch_database(database_id)?;
        schema_from_database(&database)
    }
}

impl RecordSink for NotionClient {
    fn create_record(&self, database_id: &str, payload: &Payload) -> Result<(), SyncError> {
        let url = format!("{}/v1/pages", self.base_url);
        let body = json!({
            "parent": { "database_id": database_id },
            "properties": payload,
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .header("Notion-Version", &self.version)
            .json(&body)
            .send()
            .map_err(|e| SyncError::WriteRejected {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::OK {
            return Ok(());
        }

        let text = response.text().unwrap_or_default();
        Err(SyncError::WriteRejected {
            status: Some(status.as_u16()),
            message: crate::http::snippet(&text, ERROR_SNIPPET_CHARS),
        })
    }
}

/// Database object → schema (title plus typed columns).
fn schema_from_database(database: &Value) -> Result<Schema> {
    let properties = database
        .get("properties")
        .and_then(Value::as_object)
        .context("Database response has no properties object")?;

    let mut schema = schema_from_properties(properties);
    if let Some(title) = database
        .pointer("/title/0/plain_text")
        .and_then(Value::as_str)
    {
        schema = schema.with_title(title);
    }
    Ok(schema)
}

/// Convert a Notion `properties` object into a schema, keeping its order.
pub fn schema_from_properties(properties: &Map<String, Value>) -> Schema {
    Schema::new(properties.iter().map(|(name, property)| {
        let type_name = property.get("type").and_then(Value::as_str).unwrap_or("");
        let kind = column_kind(type_name);

        let choices: Vec<String> = property
            .pointer(&format!("/{}/options", type_name))
            .and_then(Value::as_array)
            .map(|options| {
                options
                    .iter()
                    .filter_map(|o| o.get("name").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        SchemaColumn::new(name.clone(), kind).with_choices(choices)
    }))
}

fn column_kind(type_name: &str) -> ColumnKind {
    match type_name {
        "title" => ColumnKind::Title,
        "rich_text" | "text" => ColumnKind::Text,
        "number" => ColumnKind::Number,
        "url" => ColumnKind::Url,
        "date" => ColumnKind::Date,
        "email" => ColumnKind::Email,
        "phone_number" => ColumnKind::Phone,
        "checkbox" => ColumnKind::Boolean,
        "select" | "status" => ColumnKind::SingleChoice,
        "multi_select" => ColumnKind::MultiChoice,
        _ => ColumnKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATABASE: &str = r#"{
        "object": "database",
        "title": [{ "plain_text": "Trending" }],
        "properties": {
            "Name": { "id": "title", "type": "title", "title": {} },
            "Stars": { "id": "a", "type": "number", "number": { "format": "number" } },
            "Language": { "id": "b", "type": "select", "select": { "options": [
                { "id": "1", "name": "Rust", "color": "red" },
                { "id": "2", "name": "Go", "color": "blue" }
            ] } },
            "Tags": { "id": "c", "type": "multi_select", "multi_select": { "options": [] } },
            "Rollup": { "id": "d", "type": "rollup", "rollup": {} }
        }
    }"#;

    fn client(server: &mockito::Server) -> NotionClient {
        NotionClient::new("secret", Duration::from_secs(5), None)
            .unwrap()
            .with_base_url(server.url())
    }

    #[test]
    fn test_schema_conversion() {
        let database: Value = serde_json::from_str(DATABASE).unwrap();
        let schema = schema_from_database(&database).unwrap();

        assert_eq!(schema.title.as_deref(), Some("Trending"));
        let names: Vec<&str> = schema.names().collect();
        assert_eq!(names, vec!["Name", "Stars", "Language", "Tags", "Rollup"]);

        assert_eq!(schema.get("Name").unwrap().kind, ColumnKind::Title);
        assert_eq!(schema.get("Stars").unwrap().kind, ColumnKind::Number);
        assert_eq!(schema.get("Rollup").unwrap().kind, ColumnKind::Unknown);

        let language = schema.get("Language").unwrap();
        assert_eq!(language.kind, ColumnKind::SingleChoice);
        assert!(language.choices.contains("Rust"));
        assert!(language.choices.contains("Go"));
    }

    #[test]
    fn test_fetch_schema_over_http() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/v1/databases/db123")
            .match_header("authorization", "Bearer secret")
            .match_header("notion-version", DEFAULT_API_VERSION)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(DATABASE)
            .create();

        let schema = client(&server).fetch_schema("db123").unwrap();
        assert_eq!(schema.len(), 5);
        mock.assert();
    }

    #[test]
    fn test_fetch_schema_unauthorized() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/v1/databases/db123")
            .with_status(401)
            .with_body(r#"{"code":"unauthorized"}"#)
            .create();

        let err = client(&server).fetch_schema("db123").unwrap_err();
        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn test_create_record_posts_parent_and_properties() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/v1/pages")
            .match_body(mockito::Matcher::PartialJson(json!({
                "parent": { "database_id": "db123" },
                "properties": { "Stars": { "number": 7 } }
            })))
            .with_status(200)
            .with_body("{}")
            .create();

        let mut payload = Payload::new();
        payload.insert("Stars".into(), json!({ "number": 7 }));

        client(&server).create_record("db123", &payload).unwrap();
        mock.assert();
    }

    #[test]
    fn test_create_record_rejection_keeps_status() {
        let mut server = mockito::Server::new();
        let long_message = "x".repeat(500);
        let _mock = server
            .mock("POST", "/v1/pages")
            .with_status(400)
            .with_body(long_message)
            .create();

        let err = client(&server)
            .create_record("db123", &Payload::new())
            .unwrap_err();

        match err {
            SyncError::WriteRejected { status, message } => {
                assert_eq!(status, Some(400));
                assert_eq!(message.chars().count(), ERROR_SNIPPET_CHARS);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
