// src/datasets.rs
//! Known datasets: the store other parts of the service read feed URLs from.
//!
//! Discovering datasets is someone else's job; this module only keeps a
//! snapshot of a catalogue file on disk and hands it out.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatasetRecord {
    pub id: String,
    pub title: String,
    pub data_url: String,
    /// Anything else the catalogue carries (publisher, licence, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpdateStatus {
    #[serde(rename = "OK")]
    Ok,
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateStatus::Ok => f.write_str("OK"),
        }
    }
}

#[async_trait::async_trait]
pub trait DatasetStore: Send + Sync {
    /// Refresh the stored snapshot.
    async fn update(&self) -> Result<UpdateStatus>;
    /// Current snapshot, in catalogue order.
    fn all(&self) -> Vec<DatasetRecord>;
}

/// Catalogue kept as a JSON array in a file.
#[derive(Debug)]
pub struct FileDatasetCache {
    path: PathBuf,
    records: RwLock<Vec<DatasetRecord>>,
}

impl FileDatasetCache {
    /// Empty until the first `update()`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: RwLock::new(Vec::new()),
        }
    }

    /// Open and load immediately.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let cache = Self::new(path);
        cache.update().await?;
        Ok(cache)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl DatasetStore for FileDatasetCache {
    async fn update(&self) -> Result<UpdateStatus> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading datasets from {}", self.path.display()))?;
        let records = parse_records(&raw)
            .with_context(|| format!("parsing datasets from {}", self.path.display()))?;

        tracing::info!(
            target: "datasets",
            count = records.len(),
            path = %self.path.display(),
            "datasets cache updated"
        );
        *self.records.write().expect("datasets rwlock poisoned") = records;
        Ok(UpdateStatus::Ok)
    }

    fn all(&self) -> Vec<DatasetRecord> {
        self.records
            .read()
            .expect("datasets rwlock poisoned")
            .clone()
    }
}

/// Entries lacking `id`, `title` or `data_url` are dropped with a warning.
fn parse_records(raw: &str) -> Result<Vec<DatasetRecord>> {
    let entries: Vec<Value> = serde_json::from_str(raw)?;
    let mut out = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<DatasetRecord>(entry) {
            Ok(rec) => out.push(rec),
            Err(e) => {
                tracing::warn!(target: "datasets", idx, error = %e, "dropping dataset entry");
            }
        }
    }
    Ok(out)
}
