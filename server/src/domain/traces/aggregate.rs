//! Trace aggregation
//!
//! Groups the projected spans of one resource context into traces, tracking
//! each trace's start and duration incrementally in a single pass.
//!
//! ## Duration semantics
//!
//! The duration is only ever compared against the span being folded in, using
//! the trace start *after* that span may have lowered it. Earlier spans are
//! never revisited, so when a later span moves the start backwards the
//! duration contributed by earlier spans is not widened:
//!
//! ```text
//! (start=100, end=300) then (start=50, end=200)  →  start=50, duration=200
//! ```
//!
//! Here the covered interval is 50..300, yet the duration stays 200.
//!
//! The result is exact when spans arrive in non-decreasing start order and a
//! lower bound of `max(end) - min(start)` otherwise. Stored traces depend on
//! this value, so it must stay order dependent.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use super::model::{ResourceContext, Span, Trace};

/// Working set of one aggregation run, keyed by trace id. Iteration order is
/// unspecified.
pub type TraceSet = HashMap<String, Trace>;

/// Aggregate spans of a single resource context into traces.
pub fn aggregate(resource: &ResourceContext, spans: Vec<Span>) -> TraceSet {
    let service_name = resource.service_name();
    let mut traces = TraceSet::new();

    for span in spans {
        match traces.entry(span.trace_id.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(start_trace(span, service_name.clone()));
            }
            Entry::Occupied(mut entry) => fold_span(entry.get_mut(), span),
        }
    }

    traces
}

fn start_trace(span: Span, service_name: Option<String>) -> Trace {
    Trace {
        trace_id: span.trace_id.clone(),
        start_time_nano: span.start_time_unix_nano,
        duration_nano: span.duration_nano(),
        service_name,
        spans: vec![span],
    }
}

fn fold_span(trace: &mut Trace, span: Span) {
    if span.start_time_unix_nano < trace.start_time_nano {
        trace.start_time_nano = span.start_time_unix_nano;
    }

    let candidate = span.end_time_unix_nano.saturating_sub(trace.start_time_nano);
    if candidate > trace.duration_nano {
        trace.duration_nano = candidate;
    }

    trace.spans.push(span);
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashSet};

    use super::*;
    use crate::domain::traces::model::{AttributeValue, Status};

    fn make_span(trace_id: &str, span_id: &str, start: i64, end: i64) -> Span {
        Span {
            id: span_id.to_string(),
            trace_id: trace_id.to_string(),
            span_id: span_id.to_string(),
            parent_span_id: None,
            name: format!("op-{span_id}"),
            kind: 1,
            start_time_unix_nano: start,
            end_time_unix_nano: end,
            attributes: BTreeMap::new(),
            events: vec![],
            links: vec![],
            status: Status::default(),
        }
    }

    fn service_context(name: &str) -> ResourceContext {
        ResourceContext::new(BTreeMap::from([(
            "service.name".to_string(),
            AttributeValue::String(name.to_string()),
        )]))
    }

    #[test]
    fn test_single_span_trace() {
        let traces = aggregate(
            &service_context("api"),
            vec![make_span("t1", "s1", 10, 35)],
        );
        let trace = &traces["t1"];
        assert_eq!(trace.spans.len(), 1);
        assert_eq!(trace.start_time_nano, 10);
        assert_eq!(trace.duration_nano, 25);
        assert_eq!(trace.service_name.as_deref(), Some("api"));
    }

    #[test]
    fn test_later_span_lowering_start_and_ending_last() {
        let traces = aggregate(
            &service_context("api"),
            vec![
                make_span("t1", "s1", 100, 200),
                make_span("t1", "s2", 50, 300),
            ],
        );
        let trace = &traces["t1"];
        assert_eq!(trace.start_time_nano, 50);
        assert_eq!(trace.duration_nano, 250);
    }

    #[test]
    fn test_later_span_lowering_start_keeps_earlier_duration() {
        let traces = aggregate(
            &service_context("api"),
            vec![
                make_span("t1", "s1", 100, 300),
                make_span("t1", "s2", 50, 200),
            ],
        );
        let trace = &traces["t1"];
        assert_eq!(trace.start_time_nano, 50);
        // 300 - 50 is never considered once the start moves
        assert_eq!(trace.duration_nano, 200);
    }

    #[test]
    fn test_start_ordered_arrival_gives_full_extent() {
        let traces = aggregate(
            &service_context("api"),
            vec![
                make_span("t1", "s2", 50, 200),
                make_span("t1", "s1", 100, 300),
            ],
        );
        assert_eq!(traces["t1"].start_time_nano, 50);
        assert_eq!(traces["t1"].duration_nano, 250);
    }

    #[test]
    fn test_reverse_order_same_bounds() {
        let traces = aggregate(
            &service_context("api"),
            vec![
                make_span("t1", "s2", 50, 300),
                make_span("t1", "s1", 100, 200),
            ],
        );
        let trace = &traces["t1"];
        assert_eq!(trace.start_time_nano, 50);
        assert_eq!(trace.duration_nano, 250);
    }

    #[test]
    fn test_duration_extends_when_later_span_ends_later() {
        let traces = aggregate(
            &ResourceContext::default(),
            vec![
                make_span("t1", "s1", 0, 10),
                make_span("t1", "s2", 5, 40),
            ],
        );
        assert_eq!(traces["t1"].start_time_nano, 0);
        assert_eq!(traces["t1"].duration_nano, 40);
    }

    #[test]
    fn test_duration_not_lowered_by_shorter_span() {
        let traces = aggregate(
            &ResourceContext::default(),
            vec![
                make_span("t1", "s1", 0, 100),
                make_span("t1", "s2", 20, 30),
            ],
        );
        assert_eq!(traces["t1"].duration_nano, 100);
    }

    #[test]
    fn test_disjoint_trace_ids_yield_independent_traces() {
        let traces = aggregate(
            &service_context("api"),
            vec![make_span("t1", "s1", 0, 5), make_span("t2", "s2", 3, 9)],
        );
        let ids: HashSet<&str> = traces.keys().map(|k| k.as_str()).collect();
        assert_eq!(ids, HashSet::from(["t1", "t2"]));
        assert!(traces.values().all(|t| t.spans.len() == 1));
        assert_eq!(traces["t2"].start_time_nano, 3);
        assert_eq!(traces["t2"].duration_nano, 6);
    }

    #[test]
    fn test_missing_service_name_is_none() {
        let traces = aggregate(
            &ResourceContext::default(),
            vec![make_span("t1", "s1", 0, 5), make_span("t2", "s2", 0, 5)],
        );
        assert!(traces.values().all(|t| t.service_name.is_none()));
    }

    #[test]
    fn test_spans_kept_in_arrival_order() {
        let traces = aggregate(
            &ResourceContext::default(),
            vec![
                make_span("t1", "late", 90, 95),
                make_span("t1", "early", 10, 20),
                make_span("t1", "middle", 50, 60),
            ],
        );
        let names: Vec<&str> = traces["t1"]
            .spans
            .iter()
            .map(|s| s.span_id.as_str())
            .collect();
        assert_eq!(names, vec!["late", "early", "middle"]);
    }

    #[test]
    fn test_root_child_grandchild() {
        let traces = aggregate(
            &service_context("frontend"),
            vec![
                make_span("aabb", "root", 0, 50),
                make_span("aabb", "child", 10, 40),
                make_span("aabb", "grandchild", 15, 20),
            ],
        );
        assert_eq!(traces.len(), 1);
        let trace = &traces["aabb"];
        assert_eq!(trace.start_time_nano, 0);
        assert_eq!(trace.duration_nano, 50);
        assert_eq!(trace.spans.len(), 3);
    }

    #[test]
    fn test_empty_input() {
        let traces = aggregate(&service_context("api"), vec![]);
        assert!(traces.is_empty());
    }

    #[test]
    fn test_negative_span_duration_preserved() {
        let traces = aggregate(
            &ResourceContext::default(),
            vec![make_span("t1", "s1", 100, 40)],
        );
        assert_eq!(traces["t1"].duration_nano, -60);
    }
}
