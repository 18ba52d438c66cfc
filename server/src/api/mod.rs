//! OTLP receivers
//!
//! - OTLP/HTTP on the axum server (`/v1/traces`, `/health`)
//! - OTLP/gRPC `TraceService` on tonic

pub mod routes;
mod server;

pub use routes::otlp_collector::OtlpGrpcServer;
pub use server::{ApiServer, router};
