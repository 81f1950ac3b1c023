//! Storage collaborator
//!
//! Persistence lives in a hosted platform; the pipeline only ever hands it
//! whole batches of freshly created rows. The seam is a trait so the server
//! can run against the real REST endpoint in production and an in-memory
//! table map in tests and local development.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Insert-only storage seam. No updates, merges, or deletes: every upload
/// writes fresh rows.
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert(&self, table: &str, rows: Vec<serde_json::Value>) -> Result<()>;
}

/// Serialize records and insert them into the named table.
pub async fn insert_records<T: Serialize>(
    store: &dyn Store,
    table: &str,
    records: &[T],
) -> Result<()> {
    let rows = records
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    store.insert(table, rows).await
}

/// Store backed by the platform's PostgREST-style endpoint.
///
/// Rows are posted as a JSON array to `{base}/rest/v1/{table}` with the
/// service key in both the `apikey` header and the bearer token, which is
/// how the platform expects service-role writes.
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl RestStore {
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            service_key: service_key.into(),
        }
    }
}

#[async_trait]
impl Store for RestStore {
    async fn insert(&self, table: &str, rows: Vec<serde_json::Value>) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let url = format!(
            "{}/rest/v1/{}",
            self.base_url.trim_end_matches('/'),
            table
        );

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("Prefer", "return=minimal")
            .json(&rows)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Storage(format!(
                "insert into {} failed: {} {}",
                table, status, body
            )));
        }

        debug!(table, count = rows.len(), "inserted rows");
        Ok(())
    }
}

/// In-memory store keyed by table name. Used by tests and `--no-auth` local
/// runs.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<HashMap<String, Vec<serde_json::Value>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a table's rows.
    pub fn rows(&self, table: &str) -> Vec<serde_json::Value> {
        self.tables
            .lock()
            .expect("store mutex poisoned")
            .get(table)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert(&self, table: &str, rows: Vec<serde_json::Value>) -> Result<()> {
        self.tables
            .lock()
            .expect("store mutex poisoned")
            .entry(table.to_string())
            .or_default()
            .extend(rows);
        Ok(())
    }
}
