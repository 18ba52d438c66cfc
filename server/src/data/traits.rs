//! Document store trait
//!
//! Every persistence backend implements [`DocumentStore`]. Callers hand over
//! already-sanitized documents; backends do not rewrite keys.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::data::error::DataError;

/// Bulk-insert sink for trace and span documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend identifier for logs
    fn backend_name(&self) -> &'static str;

    /// Insert all documents into `collection` in one call.
    ///
    /// Returns the number of documents inserted. A failure means none of the
    /// documents of this call should be considered stored.
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<JsonValue>,
    ) -> Result<u64, DataError>;

    /// Release backend resources. Later inserts fail.
    async fn close(&self) -> Result<(), DataError>;
}
