//! OTLP utility functions
//!
//! - Shared attribute keys
//! - Identifier encoding for persisted documents

// ============================================================================
// SHARED ATTRIBUTE KEYS
// ============================================================================

/// Resource attribute keys read during ingestion
pub mod keys {
    pub const SERVICE_NAME: &str = "service.name";
}

// ============================================================================
// IDENTIFIERS
// ============================================================================

/// Encode a trace or span id as lowercase hex. Empty input gives "".
pub fn encode_id(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Encode an optional id; the zero-length form means absent.
pub fn encode_optional_id(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        None
    } else {
        Some(encode_id(bytes))
    }
}
