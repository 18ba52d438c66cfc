//! API server initialization

use std::net::SocketAddr;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::decompression::RequestDecompressionLayer;
use tower_http::trace::TraceLayer;

use super::routes::{health, otlp_collector};
use crate::core::CoreApp;
use crate::core::constants::OTLP_BODY_LIMIT;
use crate::domain::TraceIngestService;

pub struct ApiServer {
    app: CoreApp,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        Self { app }
    }

    /// Returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let Self { app } = self;

        let shutdown = app.shutdown.clone();
        let addr = SocketAddr::new(app.config.server.host.parse()?, app.config.server.port);

        let router = router(app.ingest.clone());

        let listener = TcpListener::bind(addr).await?;
        tracing::debug!(%addr, "Starting OTLP/HTTP server");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        Ok(app)
    }
}

/// Build the HTTP router: `GET /health` and `POST /v1/traces`
pub fn router(ingest: TraceIngestService) -> Router {
    // Limit applies to the decompressed body
    let otlp_routes = otlp_collector::routes(ingest)
        .layer(DefaultBodyLimit::max(OTLP_BODY_LIMIT))
        .layer(RequestDecompressionLayer::new());

    Router::new()
        .route("/health", get(health::health))
        .nest("/v1", otlp_routes)
        .fallback(|| async { StatusCode::NOT_FOUND })
        .layer(TraceLayer::new_for_http())
}
