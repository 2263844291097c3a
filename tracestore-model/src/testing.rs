//! Constructors for ad-hoc spans and traces, used across the workspace's
//! test suites. Analogous to `opentelemetry_sdk::testing`.

use std::time::{Duration, SystemTime};

use crate::ids::{SpanId, TraceId};
use crate::span::{Process, Span, SpanFlags, SpanKind, Trace};

/// Build a minimal span with the given trace/span ids and operation name,
/// no references, no tags, starting at the Unix epoch.
pub fn new_test_span(trace_id: TraceId, span_id: SpanId, operation_name: &str) -> Span {
    Span {
        trace_id,
        span_id,
        operation_name: operation_name.to_string(),
        references: Vec::new(),
        start_time: SystemTime::UNIX_EPOCH,
        duration: Duration::from_millis(1),
        tags: Vec::new(),
        logs: Vec::new(),
        process: Process::new("test-service"),
        flags: SpanFlags::SAMPLED,
    }
}

/// Build a single-span trace for the given trace id.
pub fn new_test_trace(trace_id: TraceId) -> Trace {
    Trace {
        spans: vec![new_test_span(trace_id, SpanId::new(1), "test-operation")],
        warnings: Vec::new(),
    }
}

/// A span's kind has no bearing on [`new_test_span`]'s defaults; use this
/// to override it in a builder-style chain.
pub fn with_kind(mut span: Span, kind: SpanKind) -> Span {
    span.tags.push(crate::kv::KeyValue::new(
        "span.kind",
        kind.as_str().to_string(),
    ));
    span
}
