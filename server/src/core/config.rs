use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_DATABASE, DEFAULT_HOST, DEFAULT_OTEL_GRPC_PORT,
    DEFAULT_PORT, DEFAULT_SPANS_COLLECTION, DEFAULT_STORAGE_DIR, DEFAULT_TRACES_COLLECTION,
};

// =============================================================================
// Storage Backend Enum
// =============================================================================

/// Document store backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    Jsonl,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Jsonl => write!(f, "jsonl"),
        }
    }
}

// =============================================================================
// Persist Mode Enum
// =============================================================================

/// Shape of the stored documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistMode {
    /// One document per trace, spans embedded
    #[default]
    Traces,
    /// One document per span
    Spans,
}

impl PersistMode {
    /// Collection used when none is configured
    pub fn default_collection(&self) -> &'static str {
        match self {
            PersistMode::Traces => DEFAULT_TRACES_COLLECTION,
            PersistMode::Spans => DEFAULT_SPANS_COLLECTION,
        }
    }
}

impl fmt::Display for PersistMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistMode::Traces => write!(f, "traces"),
            PersistMode::Spans => write!(f, "spans"),
        }
    }
}

// =============================================================================
// File Config Structs (raw JSON sections, all optional)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// gRPC configuration (nested under otel)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct GrpcFileConfig {
    pub enabled: Option<bool>,
    pub port: Option<u16>,
}

/// OpenTelemetry configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct OtelFileConfig {
    pub grpc: Option<GrpcFileConfig>,
}

/// Storage configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StorageFileConfig {
    pub backend: Option<StorageBackend>,
    pub dir: Option<String>,
    pub database: Option<String>,
    pub mode: Option<PersistMode>,
    pub collection: Option<String>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub otel: Option<OtelFileConfig>,
    pub storage: Option<StorageFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        // Server
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        // Otel (nested grpc)
        if let Some(otel) = other.otel {
            let current = self.otel.get_or_insert_with(OtelFileConfig::default);

            if let Some(grpc) = otel.grpc {
                let current_grpc = current.grpc.get_or_insert_with(GrpcFileConfig::default);
                if grpc.enabled.is_some() {
                    tracing::trace!(enabled = ?grpc.enabled, "Merging otel.grpc.enabled");
                    current_grpc.enabled = grpc.enabled;
                }
                if grpc.port.is_some() {
                    tracing::trace!(port = ?grpc.port, "Merging otel.grpc.port");
                    current_grpc.port = grpc.port;
                }
            }
        }

        // Storage
        if let Some(storage) = other.storage {
            let current = self.storage.get_or_insert_with(StorageFileConfig::default);
            if storage.backend.is_some() {
                tracing::trace!(backend = ?storage.backend, "Merging storage.backend");
                current.backend = storage.backend;
            }
            if storage.dir.is_some() {
                tracing::trace!(dir = ?storage.dir, "Merging storage.dir");
                current.dir = storage.dir;
            }
            if storage.database.is_some() {
                tracing::trace!(database = ?storage.database, "Merging storage.database");
                current.database = storage.database;
            }
            if storage.mode.is_some() {
                tracing::trace!(mode = ?storage.mode, "Merging storage.mode");
                current.mode = storage.mode;
            }
            if storage.collection.is_some() {
                tracing::trace!(collection = ?storage.collection, "Merging storage.collection");
                current.collection = storage.collection;
            }
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration (OTLP/HTTP listener)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// OpenTelemetry receiver configuration
#[derive(Debug, Clone)]
pub struct OtelConfig {
    pub grpc_enabled: bool,
    pub grpc_port: u16,
}

/// Document store configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Root directory of file-backed stores
    pub dir: PathBuf,
    pub database: String,
    pub mode: PersistMode,
    pub collection: String,
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub otel: OtelConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.tracedock/tracedock.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        // 1. Load from profile dir (~/.tracedock/tracedock.json) - skip if not exists
        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        // 2. Load from CLI-specified path OR local directory
        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::resolve(cli, file_config);

        // Validate configuration
        config.validate()?;

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            otel_grpc_enabled = config.otel.grpc_enabled,
            otel_grpc_port = config.otel.grpc_port,
            storage_backend = %config.storage.backend,
            storage_dir = %config.storage.dir.display(),
            database = %config.storage.database,
            persist_mode = %config.storage.mode,
            collection = %config.storage.collection,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Layer configs: defaults -> file config -> CLI/env overrides
    fn resolve(cli: &CliConfig, file_config: FileConfig) -> Self {
        let file_server = file_config.server.unwrap_or_default();
        let file_otel = file_config.otel.unwrap_or_default();
        let file_grpc = file_otel.grpc.unwrap_or_default();
        let file_storage = file_config.storage.unwrap_or_default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        // otel.grpc config: CLI/env overrides file config
        let grpc_enabled = cli.otel_grpc.or(file_grpc.enabled).unwrap_or(true);
        let grpc_port = cli
            .otel_grpc_port
            .or(file_grpc.port)
            .unwrap_or(DEFAULT_OTEL_GRPC_PORT);

        let backend = cli
            .storage
            .or(file_storage.backend)
            .unwrap_or_default();
        let dir = cli
            .storage_dir
            .clone()
            .or(file_storage.dir)
            .unwrap_or_else(|| DEFAULT_STORAGE_DIR.to_string());
        let database = cli
            .database
            .clone()
            .or(file_storage.database)
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());
        let mode = cli.persist_mode.or(file_storage.mode).unwrap_or_default();

        // Collection follows the mode unless set explicitly
        let collection = cli
            .collection
            .clone()
            .or(file_storage.collection)
            .unwrap_or_else(|| mode.default_collection().to_string());

        Self {
            server: ServerConfig { host, port },
            otel: OtelConfig {
                grpc_enabled,
                grpc_port,
            },
            storage: StorageConfig {
                backend,
                dir: expand_path(&dir),
                database,
                mode,
                collection,
            },
        }
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        // Host must not be empty
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        // Port must be non-zero (port 0 would cause bind failure)
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }
        if self.otel.grpc_enabled && self.otel.grpc_port == 0 {
            anyhow::bail!("Configuration error: otel.grpc.port must be greater than 0");
        }

        // Port collision check (only if both are enabled)
        if self.otel.grpc_enabled && self.server.port == self.otel.grpc_port {
            anyhow::bail!(
                "Configuration error: server.port and otel.grpc.port must differ (both are {})",
                self.server.port
            );
        }

        if self.storage.database.trim().is_empty() {
            anyhow::bail!("Configuration error: storage.database must not be empty");
        }
        if self.storage.collection.trim().is_empty() {
            anyhow::bail!("Configuration error: storage.collection must not be empty");
        }

        Ok(())
    }
}

/// Get the profile config path (~/.tracedock/tracedock.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}
