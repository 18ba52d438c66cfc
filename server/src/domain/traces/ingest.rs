//! Trace ingestion
//!
//! Runs one OTLP export request through the pipeline, one resource group at a
//! time:
//!
//! ```text
//! ResourceSpans ──▶ project ──▶ aggregate ──▶ sanitize ──▶ DocumentStore
//!                   (per span)   (traces mode)  (per doc)   (one insert)
//! ```
//!
//! Everything before the insert is synchronous and owns its working set, so
//! concurrent requests share nothing but the store. Resource groups are never
//! merged, even when they carry the same trace id.

use std::sync::Arc;

use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use opentelemetry_proto::tonic::trace::v1::ResourceSpans;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::aggregate::aggregate;
use super::model::{ResourceContext, Span, to_document};
use super::project::{project, project_resource};
use super::sanitize::sanitize;
use crate::core::config::PersistMode;
use crate::data::{DataError, DocumentStore};

/// Ingestion failure. Only the store write can fail.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to store documents: {0}")]
    Store(#[from] DataError),
}

/// Counters for one ingested request
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub resource_groups: usize,
    pub spans: usize,
    pub documents: usize,
    pub inserted: u64,
}

/// Decode and project every span of one resource group, in wire order.
pub fn project_resource_spans(resource_spans: &ResourceSpans) -> (ResourceContext, Vec<Span>) {
    let resource = project_resource(resource_spans.resource.as_ref());
    let spans = resource_spans
        .scope_spans
        .iter()
        .flat_map(|scope_spans| scope_spans.spans.iter())
        .map(project)
        .collect();
    (resource, spans)
}

/// Build the sanitized documents for one resource group.
pub fn build_documents(
    resource: &ResourceContext,
    spans: Vec<Span>,
    mode: PersistMode,
) -> Result<Vec<JsonValue>, DataError> {
    match mode {
        PersistMode::Traces => aggregate(resource, spans)
            .into_values()
            .map(|trace| document(&trace))
            .collect(),
        PersistMode::Spans => spans.iter().map(document).collect(),
    }
}

fn document<T: serde::Serialize>(entity: &T) -> Result<JsonValue, DataError> {
    Ok(sanitize(to_document(entity)?))
}

/// Ingestion entry point shared by the gRPC and HTTP transports.
#[derive(Clone)]
pub struct TraceIngestService {
    store: Arc<dyn DocumentStore>,
    mode: PersistMode,
    collection: String,
}

impl TraceIngestService {
    pub fn new(store: Arc<dyn DocumentStore>, mode: PersistMode, collection: String) -> Self {
        Self {
            store,
            mode,
            collection,
        }
    }

    pub fn mode(&self) -> PersistMode {
        self.mode
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Ingest one export request.
    ///
    /// Each resource group is written with a single insert. The first failing
    /// insert aborts the request; groups already written are not rolled back
    /// and nothing is retried.
    pub async fn ingest(
        &self,
        request: &ExportTraceServiceRequest,
    ) -> Result<IngestSummary, IngestError> {
        let mut summary = IngestSummary::default();

        for resource_spans in &request.resource_spans {
            let (resource, spans) = project_resource_spans(resource_spans);
            let span_count = spans.len();
            let documents = build_documents(&resource, spans, self.mode)?;
            let document_count = documents.len();

            summary.resource_groups += 1;
            summary.spans += span_count;
            summary.documents += document_count;

            if documents.is_empty() {
                continue;
            }

            match self.store.insert_many(&self.collection, documents).await {
                Ok(inserted) => {
                    tracing::debug!(
                        spans = span_count,
                        documents = document_count,
                        inserted,
                        collection = %self.collection,
                        mode = %self.mode,
                        "Stored resource group"
                    );
                    summary.inserted += inserted;
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        backend = self.store.backend_name(),
                        collection = %self.collection,
                        documents = document_count,
                        "Failed to store resource group"
                    );
                    return Err(e.into());
                }
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
#[path = "ingest_tests.rs"]
mod tests;
