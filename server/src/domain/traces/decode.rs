//! Attribute value decoding
//!
//! Converts OTLP `AnyValue` trees into [`AttributeValue`]. Decoding is total:
//! every wire value yields exactly one decoded value, and tags outside the
//! supported set (including `bytes_value`) become [`AttributeValue::Null`].

use opentelemetry_proto::tonic::common::v1::{AnyValue, KeyValue, any_value};

use super::model::{AttributeValue, Attributes};

/// Decode a single wire value, recursing through arrays and key-value lists.
pub fn decode(value: &AnyValue) -> AttributeValue {
    match &value.value {
        Some(any_value::Value::StringValue(s)) => AttributeValue::String(s.clone()),
        Some(any_value::Value::BoolValue(b)) => AttributeValue::Bool(*b),
        Some(any_value::Value::IntValue(i)) => AttributeValue::Int(*i),
        Some(any_value::Value::DoubleValue(d)) => AttributeValue::Double(*d),
        Some(any_value::Value::ArrayValue(arr)) => {
            AttributeValue::Array(arr.values.iter().map(decode).collect())
        }
        Some(any_value::Value::KvlistValue(kvlist)) => {
            AttributeValue::Map(decode_attributes(&kvlist.values))
        }
        Some(any_value::Value::BytesValue(_)) | None => AttributeValue::Null,
    }
}

/// Decode a key-value list. Keys are kept verbatim; a missing value decodes to
/// null and a repeated key keeps its last value.
pub fn decode_attributes(attrs: &[KeyValue]) -> Attributes {
    attrs
        .iter()
        .map(|kv| {
            let value = kv.value.as_ref().map_or(AttributeValue::Null, decode);
            (kv.key.clone(), value)
        })
        .collect()
}
