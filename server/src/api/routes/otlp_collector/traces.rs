//! Traces export endpoint

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;

use super::OtlpState;
use super::encoding::{OtlpContentType, decode_trace_request, plain_response, success_response};

pub async fn export(State(state): State<OtlpState>, headers: HeaderMap, body: Bytes) -> Response {
    let content_type = OtlpContentType::from_headers(&headers);

    let request = match decode_trace_request(&body, content_type) {
        Ok(req) => req,
        Err(e) => return e.into_response(),
    };

    match state.ingest.ingest(&request).await {
        Ok(summary) => {
            tracing::debug!(
                resource_groups = summary.resource_groups,
                spans = summary.spans,
                inserted = summary.inserted,
                "OTLP/HTTP traces ingested"
            );
            success_response(content_type)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to ingest OTLP/HTTP traces");
            plain_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to store traces")
        }
    }
}
