//! gRPC OTLP server

use std::net::SocketAddr;

use anyhow::Result;
use tokio::sync::watch;
use tonic::transport::Server as TonicServer;
use tonic::{Request, Response, Status};

use opentelemetry_proto::tonic::collector::trace::v1::{
    ExportTraceServiceRequest, ExportTraceServiceResponse,
    trace_service_server::{TraceService, TraceServiceServer},
};

use crate::core::config::OtelConfig;
use crate::core::constants::OTLP_BODY_LIMIT;
use crate::domain::TraceIngestService;

pub struct OtlpGrpcServer {
    addr: SocketAddr,
    ingest: TraceIngestService,
}

impl OtlpGrpcServer {
    pub fn new(config: &OtelConfig, host: &str, ingest: TraceIngestService) -> Result<Self> {
        let addr = SocketAddr::new(host.parse()?, config.grpc_port);
        Ok(Self { addr, ingest })
    }

    pub async fn start(self, mut shutdown_rx: watch::Receiver<bool>) -> Result<()> {
        let addr = self.addr;

        tracing::debug!(%addr, "Starting OTLP gRPC server");

        TonicServer::builder()
            .add_service(
                TraceServiceServer::new(OtlpTraceService {
                    ingest: self.ingest,
                })
                .max_decoding_message_size(OTLP_BODY_LIMIT)
                .max_encoding_message_size(OTLP_BODY_LIMIT),
            )
            .serve_with_shutdown(addr, async move {
                let _ = shutdown_rx.wait_for(|&v| v).await;
                tracing::debug!("OTLP gRPC server shutting down");
            })
            .await?;

        Ok(())
    }
}

/// gRPC trace service
struct OtlpTraceService {
    ingest: TraceIngestService,
}

#[tonic::async_trait]
impl TraceService for OtlpTraceService {
    async fn export(
        &self,
        request: Request<ExportTraceServiceRequest>,
    ) -> Result<Response<ExportTraceServiceResponse>, Status> {
        let req = request.into_inner();

        match self.ingest.ingest(&req).await {
            Ok(summary) => {
                tracing::debug!(
                    resource_groups = summary.resource_groups,
                    spans = summary.spans,
                    inserted = summary.inserted,
                    "OTLP/gRPC traces ingested"
                );
                Ok(Response::new(ExportTraceServiceResponse {
                    partial_success: None,
                }))
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to ingest OTLP/gRPC traces");
                Err(Status::internal("failed to store traces"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use opentelemetry_proto::tonic::trace::v1::{ResourceSpans, ScopeSpans, Span};

    use super::*;
    use crate::core::config::PersistMode;
    use crate::data::MemoryStore;

    fn make_service(store: &Arc<MemoryStore>) -> OtlpTraceService {
        OtlpTraceService {
            ingest: TraceIngestService::new(
                store.clone(),
                PersistMode::Traces,
                "traces".to_string(),
            ),
        }
    }

    fn one_span_request() -> ExportTraceServiceRequest {
        ExportTraceServiceRequest {
            resource_spans: vec![ResourceSpans {
                scope_spans: vec![ScopeSpans {
                    spans: vec![Span {
                        trace_id: vec![0x0a, 0x0b],
                        span_id: vec![0x01],
                        start_time_unix_nano: 10,
                        end_time_unix_nano: 25,
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
                ..Default::default()
            }],
        }
    }

    #[test]
    fn test_new_parses_address() {
        let store = Arc::new(MemoryStore::new());
        let config = OtelConfig {
            grpc_enabled: true,
            grpc_port: 4317,
        };
        let server = OtlpGrpcServer::new(&config, "127.0.0.1", make_service(&store).ingest).unwrap();
        assert_eq!(server.addr, "127.0.0.1:4317".parse().unwrap());

        assert!(OtlpGrpcServer::new(&config, "not-an-ip", make_service(&store).ingest).is_err());
    }

    #[tokio::test]
    async fn test_export_stores_traces() {
        let store = Arc::new(MemoryStore::new());
        let service = make_service(&store);

        let response = service
            .export(Request::new(one_span_request()))
            .await
            .unwrap();
        assert!(response.into_inner().partial_success.is_none());

        let documents = store.documents("traces");
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0]["traceId"], "0a0b");
        assert_eq!(documents[0]["durationNano"], 15);
    }

    #[tokio::test]
    async fn test_export_store_failure_is_internal() {
        let store = Arc::new(MemoryStore::new());
        store.fail_collection("traces");
        let service = make_service(&store);

        let status = service
            .export(Request::new(one_span_request()))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::Internal);
    }
}
