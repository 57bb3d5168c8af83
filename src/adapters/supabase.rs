//! Supabase (PostgREST) adapter.
//!
//! All collections share one table keyed by `collection_name`; the `data`
//! column holds the whole record array and saves upsert that single row.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::credentials::SupabaseCredentials;
use super::http::{build_client, decode_error, ensure_success, error_message, transport_error};
use super::traits::{AdapterError, AdapterResult, BackendAdapter};
use crate::config::SupabaseSettings;
use crate::data::{Collection, Mode, Record};

/// Postgres "undefined table": the project is reachable but not provisioned
const UNDEFINED_TABLE: &str = "42P01";

#[derive(Debug, Deserialize)]
struct DataRow {
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Serialize)]
struct UpsertRow<'a> {
    collection_name: &'a str,
    data: &'a [Record],
    updated_at: String,
}

/// Relational cloud backend
pub struct SupabaseAdapter {
    credentials: SupabaseCredentials,
    settings: SupabaseSettings,
    client: Client,
}

impl SupabaseAdapter {
    /// Create an adapter with injected credentials
    pub fn new(
        credentials: SupabaseCredentials,
        settings: SupabaseSettings,
        timeout_seconds: u64,
    ) -> AdapterResult<Self> {
        Ok(Self {
            credentials,
            settings,
            client: build_client(Mode::Supabase, timeout_seconds)?,
        })
    }

    /// REST endpoint of the shared table
    pub fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.credentials.project_url.trim_end_matches('/'),
            self.settings.table
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.credentials.anon_key)
            .header(
                "Authorization",
                format!("Bearer {}", self.credentials.anon_key),
            )
    }

    fn ensure_configured(&self) -> AdapterResult<()> {
        if self.credentials.is_complete() {
            Ok(())
        } else {
            Err(AdapterError::NotConfigured {
                backend: Mode::Supabase,
                message: "project URL and anon key are required".to_string(),
            })
        }
    }

    /// Probe the table and describe the outcome.
    ///
    /// A missing table still counts as connected; the message says so.
    pub async fn check_connection(&self) -> AdapterResult<String> {
        self.ensure_configured()?;

        let response = self
            .authorized(self.client.get(self.table_url()))
            .query(&[("select", "collection_name"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| transport_error(Mode::Supabase, e))?;

        if response.status().is_success() {
            return Ok("Connection Successful".to_string());
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        if is_undefined_table(&body) {
            warn!("Supabase table {} does not exist", self.settings.table);
            return Ok(format!(
                "Connected, but table \"{}\" is missing.",
                self.settings.table
            ));
        }

        Err(AdapterError::Status {
            backend: Mode::Supabase,
            status,
            message: error_message(&body).unwrap_or_else(|| "Connection failed".to_string()),
        })
    }
}

fn is_undefined_table(body: &str) -> bool {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("code").and_then(|c| c.as_str()).map(|c| c == UNDEFINED_TABLE))
        .unwrap_or(false)
}

/// Records held by the first row of a select, or empty when there is none
pub fn records_from_rows(rows: Vec<Value>) -> AdapterResult<Vec<Record>> {
    let Some(first) = rows.into_iter().next() else {
        return Ok(Vec::new());
    };
    let row: DataRow = serde_json::from_value(first).map_err(|e| decode_error(Mode::Supabase, e))?;

    match row.data {
        Value::Null => Ok(Vec::new()),
        Value::Array(records) => Ok(records),
        other => Err(decode_error(
            Mode::Supabase,
            format!("expected an array in the data column, found {}", other),
        )),
    }
}

#[async_trait]
impl BackendAdapter for SupabaseAdapter {
    fn mode(&self) -> Mode {
        Mode::Supabase
    }

    fn is_configured(&self) -> bool {
        self.credentials.is_complete()
    }

    async fn validate_connection(&self) -> bool {
        match self.check_connection().await {
            Ok(message) => {
                debug!("Supabase: {}", message);
                true
            }
            Err(e) => {
                debug!("Supabase validation failed: {}", e);
                false
            }
        }
    }

    async fn fetch_collection(&self, collection: Collection) -> AdapterResult<Vec<Record>> {
        self.ensure_configured()?;

        let filter = format!("eq.{}", collection.as_str());
        let response = self
            .authorized(self.client.get(self.table_url()))
            .query(&[("select", "data"), ("collection_name", filter.as_str())])
            .send()
            .await
            .map_err(|e| transport_error(Mode::Supabase, e))?;
        let response = ensure_success(Mode::Supabase, response).await?;

        let rows = response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| decode_error(Mode::Supabase, e))?;
        if rows.len() > 1 {
            warn!("{} has {} rows in {}; using the first", collection, rows.len(), self.settings.table);
        }
        records_from_rows(rows)
    }

    async fn save_collection(&self, collection: Collection, records: &[Record]) -> AdapterResult<()> {
        self.ensure_configured()?;

        let row = UpsertRow {
            collection_name: collection.as_str(),
            data: records,
            updated_at: Utc::now().to_rfc3339(),
        };

        let response = self
            .authorized(self.client.post(self.table_url()))
            .query(&[("on_conflict", "collection_name")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[row])
            .send()
            .await
            .map_err(|e| transport_error(Mode::Supabase, e))?;
        ensure_success(Mode::Supabase, response).await?;

        debug!("Upserted {} records into {}", records.len(), collection);
        Ok(())
    }
}
