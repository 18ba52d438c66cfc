//! Time utility functions

/// Convert an OTLP timestamp (unsigned nanoseconds) to the signed form used in
/// stored documents, saturating at `i64::MAX`.
pub fn clamp_nanos(nanos: u64) -> i64 {
    i64::try_from(nanos).unwrap_or(i64::MAX)
}
