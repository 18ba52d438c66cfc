//! JSON lines document store
//!
//! Appends one document per line to `<dir>/<database>/<collection>.jsonl`.
//! Each insert call is serialized up front and written with a single append,
//! so a failed serialization writes nothing. A failed append is truncated back
//! to the file's previous length so no partial line is left behind.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::error::DataError;
use super::traits::DocumentStore;

const BACKEND: &str = "jsonl";
const FILE_EXTENSION: &str = "jsonl";

pub struct JsonlStore {
    database_dir: PathBuf,
    /// Prevents interleaved appends from concurrent requests
    write_lock: Mutex<()>,
    closed: AtomicBool,
}

impl JsonlStore {
    /// Open (and create if needed) the database directory under `dir`.
    pub async fn open(dir: &Path, database: &str) -> Result<Self, DataError> {
        validate_name("database", database)?;
        let database_dir = dir.join(database);
        fs::create_dir_all(&database_dir).await?;
        tracing::debug!(path = %database_dir.display(), "JSON lines store opened");

        Ok(Self {
            database_dir,
            write_lock: Mutex::new(()),
            closed: AtomicBool::new(false),
        })
    }

    /// Path of the file backing `collection`.
    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.database_dir
            .join(format!("{collection}.{FILE_EXTENSION}"))
    }
}

#[async_trait]
impl DocumentStore for JsonlStore {
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
        validate_name("collection", collection)?;
        if documents.is_empty() {
            return Ok(0);
        }

        let mut buffer = Vec::new();
        for document in &documents {
            serde_json::to_writer(&mut buffer, document)?;
            buffer.push(b'\n');
        }

        let path = self.collection_path(collection);
        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        let committed_len = file.metadata().await?.len();

        if let Err(e) = append(&mut file, &buffer).await {
            truncate_to(&file, committed_len, &path).await;
            return Err(e);
        }

        Ok(documents.len() as u64)
    }

    async fn close(&self) -> Result<(), DataError> {
        // Wait for an in-flight append before refusing new ones
        let _guard = self.write_lock.lock().await;
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

async fn append(file: &mut File, buffer: &[u8]) -> Result<(), DataError> {
    file.write_all(buffer).await?;
    file.flush().await?;
    Ok(())
}

/// Drop whatever a failed append left past `len`.
async fn truncate_to(file: &File, len: u64, path: &Path) {
    if let Err(e) = file.set_len(len).await {
        tracing::warn!(error = %e, path = %path.display(), "Failed to truncate partial append");
    }
}

/// Names become path components and must not escape the store directory.
fn validate_name(kind: &str, name: &str) -> Result<(), DataError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(DataError::Config(format!("invalid {kind} name: {name:?}")));
    }
    Ok(())
}
