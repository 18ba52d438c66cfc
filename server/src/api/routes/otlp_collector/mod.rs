//! OpenTelemetry Protocol (OTLP) HTTP and gRPC endpoints

mod encoding;
mod grpc;
mod traces;

pub use grpc::OtlpGrpcServer;

use axum::Router;
use axum::routing::post;

use crate::domain::TraceIngestService;

#[derive(Clone)]
pub struct OtlpState {
    pub ingest: TraceIngestService,
}

/// OTLP/HTTP routes, nested under `/v1`
pub fn routes(ingest: TraceIngestService) -> Router {
    Router::new()
        .route("/traces", post(traces::export))
        .with_state(OtlpState { ingest })
}

#[cfg(test)]
#[path = "traces_tests.rs"]
mod tests;
