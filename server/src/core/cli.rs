use clap::Parser;

use std::path::PathBuf;

use super::config::{PersistMode, StorageBackend};
use super::constants::{
    ENV_COLLECTION, ENV_CONFIG, ENV_DATABASE, ENV_HOST, ENV_OTEL_GRPC_ENABLED, ENV_OTEL_GRPC_PORT,
    ENV_PERSIST_MODE, ENV_PORT, ENV_STORAGE, ENV_STORAGE_DIR,
};

#[derive(Parser)]
#[command(name = "tracedock")]
#[command(version, about = "OpenTelemetry trace collector", long_about = None)]
pub struct Cli {
    /// Server host address
    #[arg(long, short = 'H', env = ENV_HOST)]
    pub host: Option<String>,

    /// OTLP/HTTP port
    #[arg(long, short = 'p', env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Enable OTLP gRPC endpoint
    #[arg(long, env = ENV_OTEL_GRPC_ENABLED)]
    pub otel_grpc: Option<bool>,

    /// OTLP gRPC port
    #[arg(long, env = ENV_OTEL_GRPC_PORT)]
    pub otel_grpc_port: Option<u16>,

    /// Document store backend (memory or jsonl)
    #[arg(long, env = ENV_STORAGE, value_parser = parse_storage_backend)]
    pub storage: Option<StorageBackend>,

    /// Root directory of the jsonl store
    #[arg(long, env = ENV_STORAGE_DIR)]
    pub storage_dir: Option<String>,

    /// Database name
    #[arg(long, env = ENV_DATABASE)]
    pub database: Option<String>,

    /// Stored document shape (traces or spans)
    #[arg(long, env = ENV_PERSIST_MODE, value_parser = parse_persist_mode)]
    pub persist_mode: Option<PersistMode>,

    /// Target collection (defaults to the persist mode name)
    #[arg(long, env = ENV_COLLECTION)]
    pub collection: Option<String>,
}

/// Parse storage backend from CLI/env string
fn parse_storage_backend(s: &str) -> Result<StorageBackend, String> {
    match s.to_lowercase().as_str() {
        "memory" => Ok(StorageBackend::Memory),
        "jsonl" => Ok(StorageBackend::Jsonl),
        _ => Err(format!(
            "Invalid storage backend '{}'. Valid options: memory, jsonl",
            s
        )),
    }
}

/// Parse persist mode from CLI/env string
fn parse_persist_mode(s: &str) -> Result<PersistMode, String> {
    match s.to_lowercase().as_str() {
        "traces" | "trace" => Ok(PersistMode::Traces),
        "spans" | "span" => Ok(PersistMode::Spans),
        _ => Err(format!(
            "Invalid persist mode '{}'. Valid options: traces, spans",
            s
        )),
    }
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub otel_grpc: Option<bool>,
    pub otel_grpc_port: Option<u16>,
    pub storage: Option<StorageBackend>,
    pub storage_dir: Option<String>,
    pub database: Option<String>,
    pub persist_mode: Option<PersistMode>,
    pub collection: Option<String>,
}

impl From<Cli> for CliConfig {
    fn from(cli: Cli) -> Self {
        Self {
            host: cli.host,
            port: cli.port,
            config: cli.config,
            otel_grpc: cli.otel_grpc,
            otel_grpc_port: cli.otel_grpc_port,
            storage: cli.storage,
            storage_dir: cli.storage_dir,
            database: cli.database,
            persist_mode: cli.persist_mode,
            collection: cli.collection,
        }
    }
}

/// Parse CLI arguments
pub fn parse() -> CliConfig {
    Cli::parse().into()
}
