//! Trace domain model
//!
//! Entities produced by projection and aggregation. Field names on the
//! serialized form are the persisted document keys.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::utils::otlp::keys;

/// Decoded attribute mapping (key → value), keys unsanitized.
pub type Attributes = BTreeMap<String, AttributeValue>;

// ============================================================================
// ATTRIBUTE VALUE
// ============================================================================

/// Decoded OTLP attribute value.
///
/// Closed over the six wire value kinds plus `Null` for unset or unsupported
/// tags. Serializes to the natural JSON shape (scalars, arrays, objects).
/// Non-finite doubles use the protobuf JSON strings `"NaN"`, `"Infinity"` and
/// `"-Infinity"`, since JSON numbers cannot carry them.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Null,
    String(String),
    Bool(bool),
    Int(i64),
    Double(f64),
    Array(Vec<AttributeValue>),
    Map(Attributes),
}

impl AttributeValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::String(s) => serializer.serialize_str(s),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Double(d) if d.is_nan() => serializer.serialize_str("NaN"),
            Self::Double(d) if d.is_infinite() && *d > 0.0 => {
                serializer.serialize_str("Infinity")
            }
            Self::Double(d) if d.is_infinite() => serializer.serialize_str("-Infinity"),
            Self::Double(d) => serializer.serialize_f64(*d),
            Self::Array(values) => serializer.collect_seq(values),
            Self::Map(map) => serializer.collect_map(map),
        }
    }
}

// ============================================================================
// SPAN
// ============================================================================

/// A projected span. Immutable after projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    pub id: String,
    pub trace_id: String,
    pub span_id: String,
    pub parent_span_id: Option<String>,
    pub name: String,
    pub kind: i32,
    pub start_time_unix_nano: i64,
    pub end_time_unix_nano: i64,
    pub attributes: Attributes,
    pub events: Vec<SpanEvent>,
    pub links: Vec<SpanLink>,
    pub status: Status,
}

impl Span {
    /// Wall-clock length of this span alone (end - start).
    pub fn duration_nano(&self) -> i64 {
        self.end_time_unix_nano
            .saturating_sub(self.start_time_unix_nano)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanEvent {
    pub time_unix_nano: i64,
    pub name: String,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanLink {
    pub trace_id: String,
    pub span_id: String,
    pub attributes: Attributes,
}

/// Span status. `description` is empty (not null) when the wire carries none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Status {
    pub code: i32,
    pub description: String,
}

// ============================================================================
// TRACE
// ============================================================================

/// Spans sharing one trace id within a single ingestion batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    pub trace_id: String,
    /// Arrival order, not chronological
    pub spans: Vec<Span>,
    pub service_name: Option<String>,
    /// Earliest observed span start
    #[serde(rename = "dateNano")]
    pub start_time_nano: i64,
    pub duration_nano: i64,
}

// ============================================================================
// RESOURCE CONTEXT
// ============================================================================

/// Decoded resource attributes shared by every span of one resource group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceContext {
    pub attributes: Attributes,
    service_name: Option<String>,
}

impl ResourceContext {
    /// Resolve the service name from the decoded attribute map.
    pub fn new(attributes: Attributes) -> Self {
        let service_name = attributes.get(keys::SERVICE_NAME).map(service_name_of);
        Self {
            attributes,
            service_name,
        }
    }

    /// Use an already resolved `service.name` value. The wire list may repeat
    /// the key, and the service name comes from its first occurrence.
    pub fn with_service_name(
        attributes: Attributes,
        service_name: Option<&AttributeValue>,
    ) -> Self {
        Self {
            attributes,
            service_name: service_name.map(service_name_of),
        }
    }

    /// Service name from `service.name`.
    ///
    /// A present but non-string value resolves to an empty name rather than
    /// none, so the trace still records that a service attribute was sent.
    pub fn service_name(&self) -> Option<String> {
        self.service_name.clone()
    }
}

fn service_name_of(value: &AttributeValue) -> String {
    value.as_str().unwrap_or_default().to_string()
}

// ============================================================================
// DOCUMENT CONVERSION
// ============================================================================

/// Convert an entity into its (unsanitized) document form.
pub fn to_document<T: Serialize>(entity: &T) -> Result<JsonValue, serde_json::Error> {
    serde_json::to_value(entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_span() -> Span {
        Span {
            id: "0102030405060708".to_string(),
            trace_id: "aabb".to_string(),
            span_id: "0102030405060708".to_string(),
            parent_span_id: None,
            name: "GET /users".to_string(),
            kind: 2,
            start_time_unix_nano: 100,
            end_time_unix_nano: 250,
            attributes: BTreeMap::from([(
                "http.method".to_string(),
                AttributeValue::String("GET".to_string()),
            )]),
            events: vec![],
            links: vec![],
            status: Status::default(),
        }
    }

    #[test]
    fn test_attribute_value_serializes_untagged() {
        let value = AttributeValue::Array(vec![
            AttributeValue::Null,
            AttributeValue::Bool(true),
            AttributeValue::Int(-3),
            AttributeValue::Double(1.5),
            AttributeValue::Map(BTreeMap::from([(
                "k".to_string(),
                AttributeValue::String("v".to_string()),
            )])),
        ]);
        assert_eq!(
            to_document(&value).unwrap(),
            json!([null, true, -3, 1.5, {"k": "v"}])
        );
    }

    #[test]
    fn test_non_finite_doubles_keep_their_value() {
        let attributes = BTreeMap::from([
            ("ratio".to_string(), AttributeValue::Double(f64::NAN)),
            ("limit".to_string(), AttributeValue::Double(f64::INFINITY)),
            ("floor".to_string(), AttributeValue::Double(f64::NEG_INFINITY)),
            ("zero".to_string(), AttributeValue::Double(-0.0)),
        ]);
        assert_eq!(
            to_document(&attributes).unwrap(),
            json!({"floor": "-Infinity", "limit": "Infinity", "ratio": "NaN", "zero": -0.0})
        );
    }

    #[test]
    fn test_span_document_field_names() {
        let doc = to_document(&make_span()).unwrap();
        let obj = doc.as_object().unwrap();
        let keys: Vec<&str> = obj.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "id",
                "traceId",
                "spanId",
                "parentSpanId",
                "name",
                "kind",
                "startTimeUnixNano",
                "endTimeUnixNano",
                "attributes",
                "events",
                "links",
                "status",
            ]
        );
        assert_eq!(obj["parentSpanId"], JsonValue::Null);
        assert_eq!(obj["status"], json!({"code": 0, "description": ""}));
    }

    #[test]
    fn test_trace_document_field_names() {
        let trace = Trace {
            trace_id: "aabb".to_string(),
            spans: vec![make_span()],
            service_name: None,
            start_time_nano: 100,
            duration_nano: 150,
        };
        let doc = to_document(&trace).unwrap();
        assert_eq!(doc["traceId"], json!("aabb"));
        assert_eq!(doc["serviceName"], JsonValue::Null);
        assert_eq!(doc["dateNano"], json!(100));
        assert_eq!(doc["durationNano"], json!(150));
        assert_eq!(doc["spans"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_event_and_link_document_field_names() {
        let event = SpanEvent {
            time_unix_nano: 7,
            name: "exception".to_string(),
            attributes: BTreeMap::new(),
        };
        let link = SpanLink {
            trace_id: "cc".to_string(),
            span_id: "dd".to_string(),
            attributes: BTreeMap::new(),
        };
        assert_eq!(
            to_document(&event).unwrap(),
            json!({"timeUnixNano": 7, "name": "exception", "attributes": {}})
        );
        assert_eq!(
            to_document(&link).unwrap(),
            json!({"traceId": "cc", "spanId": "dd", "attributes": {}})
        );
    }

    #[test]
    fn test_service_name_resolution() {
        let ctx = ResourceContext::new(BTreeMap::from([(
            "service.name".to_string(),
            AttributeValue::String("checkout".to_string()),
        )]));
        assert_eq!(ctx.service_name(), Some("checkout".to_string()));

        assert_eq!(ResourceContext::default().service_name(), None);

        let ctx = ResourceContext::new(BTreeMap::from([(
            "service.name".to_string(),
            AttributeValue::Int(1),
        )]));
        assert_eq!(ctx.service_name(), Some(String::new()));
    }

    #[test]
    fn test_span_duration_nano() {
        let span = make_span();
        assert_eq!(span.duration_nano(), 150);
    }
}
