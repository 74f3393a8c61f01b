//! Data Source Module
//!
//! Port for the external document store plus two adapters: an in-memory
//! store and a JSON file read on every fetch.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::SourceError;
use crate::place::RawRecord;

// == Place Source ==
/// External store of place documents.
///
/// Only "get everything" is available; callers clip results to the
/// viewport themselves.
#[async_trait]
pub trait PlaceSource: Send + Sync {
    /// Returns every place document in the store.
    async fn fetch_all(&self) -> Result<Vec<RawRecord>, SourceError>;
}

// == In-Memory Source ==
/// Store backed by a vector, with optional latency and failure injection.
#[derive(Debug, Default)]
pub struct InMemorySource {
    records: Mutex<Vec<RawRecord>>,
    failure: Mutex<Option<SourceError>>,
    latency: Duration,
    calls: AtomicUsize,
}

impl InMemorySource {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Default::default()
        }
    }

    /// Delays every fetch by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Replaces the stored documents.
    pub fn set_records(&self, records: Vec<RawRecord>) {
        if let Ok(mut guard) = self.records.lock() {
            *guard = records;
        }
    }

    /// Makes subsequent fetches fail with `failure`, or succeed again on `None`.
    pub fn fail_with(&self, failure: Option<SourceError>) {
        if let Ok(mut guard) = self.failure.lock() {
            *guard = failure;
        }
    }

    /// Number of fetches started so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlaceSource for InMemorySource {
    async fn fetch_all(&self) -> Result<Vec<RawRecord>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let failure = self
            .failure
            .lock()
            .map_err(|_| SourceError::Backend("source state poisoned".to_string()))?
            .clone();
        if let Some(err) = failure {
            return Err(err);
        }

        self.records
            .lock()
            .map(|records| records.clone())
            .map_err(|_| SourceError::Backend("source state poisoned".to_string()))
    }
}

// == JSON File Source ==
/// Store backed by a JSON array of place documents on disk.
///
/// Each document carries its id in an `"id"` field. The file is re-read on
/// every fetch so edits show up without a restart.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PlaceSource for JsonFileSource {
    async fn fetch_all(&self) -> Result<Vec<RawRecord>, SourceError> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            SourceError::Backend(format!("cannot read {}: {}", self.path.display(), e))
        })?;

        let documents: Vec<Value> = serde_json::from_str(&contents).map_err(|e| {
            SourceError::Backend(format!("cannot parse {}: {}", self.path.display(), e))
        })?;

        debug!("Loaded {} documents from {}", documents.len(), self.path.display());

        Ok(documents
            .into_iter()
            .map(|doc| {
                let id = doc
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                RawRecord::new(id, doc)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_in_memory_source_counts_calls() {
        let source = InMemorySource::new(vec![RawRecord::new("a", json!({}))]);

        assert_eq!(source.fetch_all().await.unwrap().len(), 1);
        assert_eq!(source.fetch_all().await.unwrap().len(), 1);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_in_memory_source_failure_injection() {
        let source = InMemorySource::new(Vec::new());
        source.fail_with(Some(SourceError::Network("offline".into())));

        assert_eq!(
            source.fetch_all().await,
            Err(SourceError::Network("offline".into()))
        );

        source.fail_with(None);
        assert!(source.fetch_all().await.is_ok());
    }

    #[tokio::test]
    async fn test_json_file_source() {
        let path = std::env::temp_dir().join(format!(
            "viewport_cache_source_{}.json",
            std::process::id()
        ));
        let body = json!([
            { "id": "p1", "name": "Park", "location": { "latitude": 1.0, "longitude": 2.0 } },
            { "name": "No id" }
        ]);
        tokio::fs::write(&path, body.to_string()).await.unwrap();

        let records = JsonFileSource::new(&path).fetch_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "p1");
        assert_eq!(records[1].id, "");

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_json_file_source_missing_file() {
        let source = JsonFileSource::new("/nonexistent/places.json");
        assert!(matches!(
            source.fetch_all().await,
            Err(SourceError::Backend(_))
        ));
    }
}
