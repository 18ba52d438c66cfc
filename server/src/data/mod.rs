//! Data storage layer
//!
//! - `traits` - [`DocumentStore`], the bulk-insert boundary used by ingestion
//! - `memory` - In-process store (tests, ephemeral runs)
//! - `jsonl` - Append-only JSON lines files, one per collection
//! - `error` - Unified error type for all backends

pub mod error;
pub mod jsonl;
pub mod memory;
pub mod traits;

pub use error::DataError;
pub use jsonl::JsonlStore;
pub use memory::MemoryStore;
pub use traits::DocumentStore;

use std::sync::Arc;

use crate::core::config::{StorageBackend, StorageConfig};

/// Document store service enum
///
/// Wraps the configured backend. Services are stored as Arc so the store can
/// be shared with the ingestion service and the shutdown path.
pub enum DocumentStoreService {
    /// Process memory (lost on exit)
    Memory(Arc<MemoryStore>),
    /// JSON lines files under the storage directory
    Jsonl(Arc<JsonlStore>),
}

impl DocumentStoreService {
    /// Initialize the store based on configuration
    pub async fn init(config: &StorageConfig) -> Result<Self, DataError> {
        match config.backend {
            StorageBackend::Memory => Ok(Self::Memory(Arc::new(MemoryStore::new()))),
            StorageBackend::Jsonl => {
                let store = JsonlStore::open(&config.dir, &config.database).await?;
                Ok(Self::Jsonl(Arc::new(store)))
            }
        }
    }

    /// Get the backend type
    pub fn backend(&self) -> StorageBackend {
        match self {
            Self::Memory(_) => StorageBackend::Memory,
            Self::Jsonl(_) => StorageBackend::Jsonl,
        }
    }

    /// Get the store as a trait object for backend-agnostic writes
    pub fn store(&self) -> Arc<dyn DocumentStore> {
        match self {
            Self::Memory(s) => Arc::clone(s) as Arc<dyn DocumentStore>,
            Self::Jsonl(s) => Arc::clone(s) as Arc<dyn DocumentStore>,
        }
    }

    /// Close the underlying store
    pub async fn close(&self) -> Result<(), DataError> {
        self.store().close().await
    }
}
