//! Trace ingestion pipeline
//!
//! - `decode` - OTLP `AnyValue` trees to [`AttributeValue`]
//! - `project` - Wire spans to the stored [`Span`] shape
//! - `aggregate` - Group spans of one resource into [`Trace`]s
//! - `sanitize` - Make document keys safe for the store
//! - `ingest` - Per-request orchestration and the store write

pub mod aggregate;
pub mod decode;
pub mod ingest;
pub mod model;
pub mod project;
pub mod sanitize;

pub use ingest::{IngestError, IngestSummary, TraceIngestService};
pub use model::{AttributeValue, Attributes, ResourceContext, Span, Trace};
