// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "TraceDock";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".tracedock";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "tracedock.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "TRACEDOCK_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "TRACEDOCK_HOST";

/// Environment variable for OTLP/HTTP port
pub const ENV_PORT: &str = "TRACEDOCK_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "TRACEDOCK_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default OTLP/HTTP port
pub const DEFAULT_PORT: u16 = 4318;

/// Default log filter when neither TRACEDOCK_LOG nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "info,tracedock_server=info";

// =============================================================================
// Environment Variables - OpenTelemetry
// =============================================================================

/// Environment variable to enable/disable the OTLP gRPC endpoint
pub const ENV_OTEL_GRPC_ENABLED: &str = "TRACEDOCK_OTEL_GRPC_ENABLED";

/// Environment variable for OTLP gRPC port
pub const ENV_OTEL_GRPC_PORT: &str = "TRACEDOCK_OTEL_GRPC_PORT";

/// Default OTLP gRPC port
pub const DEFAULT_OTEL_GRPC_PORT: u16 = 4317;

/// Maximum decoded OTLP request size (gRPC message and HTTP body)
pub const OTLP_BODY_LIMIT: usize = 64 * 1024 * 1024;

// =============================================================================
// Environment Variables - Storage
// =============================================================================

/// Environment variable for the storage backend (memory or jsonl)
pub const ENV_STORAGE: &str = "TRACEDOCK_STORAGE";

/// Environment variable for the storage directory
pub const ENV_STORAGE_DIR: &str = "TRACEDOCK_STORAGE_DIR";

/// Environment variable for the database name
pub const ENV_DATABASE: &str = "TRACEDOCK_DATABASE";

/// Environment variable for the persistence mode (traces or spans)
pub const ENV_PERSIST_MODE: &str = "TRACEDOCK_PERSIST_MODE";

/// Environment variable for the target collection
pub const ENV_COLLECTION: &str = "TRACEDOCK_COLLECTION";

// =============================================================================
// Storage Defaults
// =============================================================================

/// Default storage directory (relative to the working directory)
pub const DEFAULT_STORAGE_DIR: &str = "./data";

/// Default database name
pub const DEFAULT_DATABASE: &str = "tracing";

/// Default collection for aggregated trace documents
pub const DEFAULT_TRACES_COLLECTION: &str = "traces";

/// Default collection for span documents
pub const DEFAULT_SPANS_COLLECTION: &str = "spans";

// =============================================================================
// Shutdown
// =============================================================================

/// Maximum time to wait for servers to drain on shutdown
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

#[cfg(test)]
mod tests {
    use tracing_subscriber::EnvFilter;

    use super::*;

    #[test]
    fn test_default_log_filter_targets_this_crate() {
        let crate_directive = format!("{}=info", env!("CARGO_CRATE_NAME"));
        assert!(
            DEFAULT_LOG_FILTER
                .split(',')
                .any(|directive| directive == crate_directive)
        );
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }
}
