//! In-memory document store
//!
//! Keeps inserted documents per collection for the lifetime of the process.
//! Useful for tests and for running without a persistence directory.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value as JsonValue;

use super::error::DataError;
use super::traits::DocumentStore;

const BACKEND: &str = "memory";

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<JsonValue>>>,
    closed: AtomicBool,
    /// Collections whose inserts fail (for exercising error paths)
    failing: RwLock<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the documents stored in `collection`, in insertion order.
    pub fn documents(&self, collection: &str) -> Vec<JsonValue> {
        self.collections
            .read()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Total number of documents across all collections.
    pub fn len(&self) -> usize {
        self.collections.read().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make every later insert into `collection` fail.
    pub fn fail_collection(&self, collection: &str) {
        self.failing.write().push(collection.to_string());
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<JsonValue>,
    ) -> Result<u64, DataError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(DataError::backend_unavailable(BACKEND, "store closed"));
        }
        if self.failing.read().iter().any(|c| c == collection) {
            return Err(DataError::backend_unavailable(
                BACKEND,
                format!("inserts into {collection} are rejected"),
            ));
        }

        let count = documents.len() as u64;
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
        Ok(count)
    }

    async fn close(&self) -> Result<(), DataError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let store = MemoryStore::new();
        let inserted = store
            .insert_many("traces", vec![json!({"traceId": "a"}), json!({"traceId": "b"})])
            .await
            .unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.documents("traces"),
            vec![json!({"traceId": "a"}), json!({"traceId": "b"})]
        );
        assert!(store.documents("spans").is_empty());
    }

    #[tokio::test]
    async fn test_insert_empty_batch() {
        let store = MemoryStore::new();
        assert_eq!(store.insert_many("traces", vec![]).await.unwrap(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_insert_after_close_fails() {
        let store = MemoryStore::new();
        store.close().await.unwrap();
        let err = store
            .insert_many("traces", vec![json!({})])
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::BackendUnavailable { .. }));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_failing_collection() {
        let store = MemoryStore::new();
        store.fail_collection("traces");
        assert!(store.insert_many("traces", vec![json!({})]).await.is_err());
        assert_eq!(store.insert_many("spans", vec![json!({})]).await.unwrap(), 1);
    }
}
