//! Domain logic for trace ingestion
//!
//! - `traces` - OpenTelemetry trace projection, aggregation and persistence

pub mod traces;

pub use traces::{IngestError, IngestSummary, TraceIngestService};
