//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::{ApiServer, OtlpGrpcServer};
use crate::core::cli::{self, CliConfig};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME, DEFAULT_LOG_FILTER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::data::DocumentStoreService;
use crate::domain::TraceIngestService;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub store: Arc<DocumentStoreService>,
    pub ingest: TraceIngestService,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let cli_config = cli::parse();
        let app = Self::init(&cli_config).await?;
        Self::start_server(app).await
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;

        let store = Arc::new(
            DocumentStoreService::init(&config.storage)
                .await
                .with_context(|| {
                    format!(
                        "Failed to initialize {} document store",
                        config.storage.backend
                    )
                })?,
        );
        tracing::debug!(backend = %store.backend(), "Document store initialized");

        let ingest = TraceIngestService::new(
            store.store(),
            config.storage.mode,
            config.storage.collection.clone(),
        );
        let shutdown = ShutdownService::new(store.clone());

        Ok(Self {
            shutdown,
            config,
            store,
            ingest,
        })
    }

    fn init_logging() {
        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        // Start OTLP gRPC server if enabled
        if app.config.otel.grpc_enabled {
            let grpc_server = OtlpGrpcServer::new(
                &app.config.otel,
                &app.config.server.host,
                app.ingest.clone(),
            )?;
            let shutdown_rx = app.shutdown.subscribe();
            let handle = tokio::spawn(async move {
                if let Err(e) = grpc_server.start(shutdown_rx).await {
                    tracing::error!(error = %e, "OTLP gRPC server error");
                }
            });

            app.shutdown.register(handle).await;
        }

        app.log_startup();

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        Ok(())
    }

    fn log_startup(&self) {
        let host = &self.config.server.host;
        let http = format!("http://{}:{}/v1/traces", host, self.config.server.port);
        let grpc = if self.config.otel.grpc_enabled {
            format!("{}:{}", host, self.config.otel.grpc_port)
        } else {
            "disabled".to_string()
        };
        tracing::info!(%http, %grpc, "{} listening", APP_NAME);

        let storage = &self.config.storage;
        tracing::info!(
            backend = %storage.backend,
            dir = %storage.dir.display(),
            database = %storage.database,
            collection = %storage.collection,
            mode = %storage.mode,
            "Persisting traces"
        );
    }
}
