//! Span projection
//!
//! Maps OTLP wire spans onto the internal [`Span`] entity. Identifier widths
//! are not re-validated; any byte length is hex-encoded as received.

use opentelemetry_proto::tonic::resource::v1::Resource;
use opentelemetry_proto::tonic::trace::v1::span::{Event, Link};
use opentelemetry_proto::tonic::trace::v1::{Span as OtlpSpan, Status as OtlpStatus};

use super::decode::{decode, decode_attributes};
use super::model::{AttributeValue, ResourceContext, Span, SpanEvent, SpanLink, Status};
use crate::utils::otlp::{encode_id, encode_optional_id, keys};
use crate::utils::time::clamp_nanos;

/// Project one wire span.
pub fn project(span: &OtlpSpan) -> Span {
    let span_id = encode_id(&span.span_id);
    Span {
        id: span_id.clone(),
        trace_id: encode_id(&span.trace_id),
        span_id,
        parent_span_id: encode_optional_id(&span.parent_span_id),
        name: span.name.clone(),
        kind: span.kind,
        start_time_unix_nano: clamp_nanos(span.start_time_unix_nano),
        end_time_unix_nano: clamp_nanos(span.end_time_unix_nano),
        attributes: decode_attributes(&span.attributes),
        events: span.events.iter().map(project_event).collect(),
        links: span.links.iter().map(project_link).collect(),
        status: project_status(span.status.as_ref()),
    }
}

fn project_event(event: &Event) -> SpanEvent {
    SpanEvent {
        time_unix_nano: clamp_nanos(event.time_unix_nano),
        name: event.name.clone(),
        attributes: decode_attributes(&event.attributes),
    }
}

fn project_link(link: &Link) -> SpanLink {
    SpanLink {
        trace_id: encode_id(&link.trace_id),
        span_id: encode_id(&link.span_id),
        attributes: decode_attributes(&link.attributes),
    }
}

/// Missing status projects to code 0 with an empty description.
fn project_status(status: Option<&OtlpStatus>) -> Status {
    status
        .map(|s| Status {
            code: s.code,
            description: s.message.clone(),
        })
        .unwrap_or_default()
}

/// Decode the resource attributes of one resource group.
///
/// The service name is taken from the first `service.name` entry, while the
/// attribute map keeps the last value of a repeated key.
pub fn project_resource(resource: Option<&Resource>) -> ResourceContext {
    resource
        .map(|r| {
            let service_name = r
                .attributes
                .iter()
                .find(|kv| kv.key == keys::SERVICE_NAME)
                .map(|kv| kv.value.as_ref().map_or(AttributeValue::Null, decode));
            ResourceContext::with_service_name(
                decode_attributes(&r.attributes),
                service_name.as_ref(),
            )
        })
        .unwrap_or_default()
}
