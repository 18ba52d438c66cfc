//! OTLP/HTTP payload encodings
//!
//! Requests arrive as binary protobuf (`application/x-protobuf`) or as the
//! protobuf JSON mapping (`application/json`). Responses use the encoding of
//! the request.

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use opentelemetry_proto::tonic::collector::trace::v1::{
    ExportTraceServiceRequest, ExportTraceServiceResponse,
};
use prost::Message;
use thiserror::Error;

const PROTOBUF: &str = "application/x-protobuf";
const JSON: &str = "application/json";

/// Payload encoding selected by the request's Content-Type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtlpContentType {
    Protobuf,
    Json,
}

impl OtlpContentType {
    /// Anything that is not JSON is treated as protobuf.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            Some(value) if value.trim_start().starts_with(JSON) => Self::Json,
            _ => Self::Protobuf,
        }
    }

    pub fn as_header_value(self) -> &'static str {
        match self {
            Self::Protobuf => PROTOBUF,
            Self::Json => JSON,
        }
    }
}

/// Request body could not be decoded
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("protobuf decode error: {0}")]
    Protobuf(#[from] prost::DecodeError),
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DecodeError {
    /// 400 response; the decoder's message is logged, not returned.
    pub fn into_response(self) -> Response {
        tracing::warn!(error = %self, "Failed to decode OTLP request");
        let message = match self {
            Self::Protobuf(_) => "Failed to decode protobuf request",
            Self::Json(_) => "Failed to decode JSON request",
        };
        plain_response(StatusCode::BAD_REQUEST, message)
    }
}

pub fn decode_trace_request(
    body: &Bytes,
    content_type: OtlpContentType,
) -> Result<ExportTraceServiceRequest, DecodeError> {
    Ok(match content_type {
        OtlpContentType::Protobuf => ExportTraceServiceRequest::decode(body.as_ref())?,
        OtlpContentType::Json => serde_json::from_slice(body.as_ref())?,
    })
}

/// Empty export response in the request's encoding
pub fn success_response(content_type: OtlpContentType) -> Response {
    let response = ExportTraceServiceResponse {
        partial_success: None,
    };
    let body = match content_type {
        OtlpContentType::Protobuf => Ok(response.encode_to_vec()),
        OtlpContentType::Json => serde_json::to_vec(&response),
    };

    match body {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, content_type.as_header_value())],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode OTLP response");
            plain_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

pub fn plain_response(status: StatusCode, message: &'static str) -> Response {
    (status, [(header::CONTENT_TYPE, "text/plain")], message).into_response()
}
