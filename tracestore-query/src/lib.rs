//! Translates a [`TraceQueryParameters`] into matching/ordering decisions
//! over already-loaded traces. Backend-agnostic: any backend's
//! `SpanReader::find_traces` can call [`matches`] and [`order`] over
//! whatever candidate set it loads from its own storage.

use std::cmp::Reverse;

use tracestore_model::{Span, Trace};
pub use tracestore_storage::TraceQueryParameters;

/// Does `span` alone satisfy every predicate in `query`?
fn span_matches(span: &Span, query: &TraceQueryParameters) -> bool {
    if span.process.service_name != query.service_name {
        return false;
    }
    if let Some(op) = &query.operation_name {
        if &span.operation_name != op {
            return false;
        }
    }
    if span.start_time < query.start_time_min || span.start_time > query.start_time_max {
        return false;
    }
    if let Some(min) = query.duration_min {
        if span.duration < min {
            return false;
        }
    }
    if let Some(max) = query.duration_max {
        if span.duration > max {
            return false;
        }
    }
    for (key, value) in &query.tags {
        let found = span
            .tags
            .iter()
            .chain(span.process.tags.iter())
            .any(|t| &t.key == key && t.value == *value);
        if !found {
            return false;
        }
    }
    true
}

/// Does `trace` match `query`? True when at least one of its spans
/// satisfies every predicate.
pub fn matches(trace: &Trace, query: &TraceQueryParameters) -> bool {
    trace.spans.iter().any(|span| span_matches(span, query))
}

/// Sort `traces` by most-recent span-start within each trace, descending;
/// ties broken by trace id, ascending, for determinism. Traces with no
/// spans sort last.
pub fn order(traces: &mut [Trace]) {
    traces.sort_by(|a, b| {
        Reverse(a.most_recent_start())
            .cmp(&Reverse(b.most_recent_start()))
            .then_with(|| a.trace_id().cmp(&b.trace_id()))
    });
}

/// Filter `candidates` to those matching `query`, order them, and cap the
/// result at `query.num_traces`. The standard shape a backend's
/// `find_traces` implementation folds its loaded candidates through.
pub fn find_traces(candidates: Vec<Trace>, query: &TraceQueryParameters) -> Vec<Trace> {
    let mut matched: Vec<Trace> = candidates.into_iter().filter(|t| matches(t, query)).collect();
    order(&mut matched);
    matched.truncate(query.num_traces);
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tracestore_model::testing::new_test_span;
    use tracestore_model::{KeyValue, SpanId, TraceId};

    fn trace_with_service(trace_id: TraceId, service: &str, start: SystemTime) -> Trace {
        let mut span = new_test_span(trace_id, SpanId::new(1), "op");
        span.process.service_name = service.to_string();
        span.start_time = start;
        Trace { spans: vec![span], warnings: Vec::new() }
    }

    #[test]
    fn matches_requires_service_name_equality() {
        let now = SystemTime::now();
        let query = TraceQueryParameters::new("svc-a", now, now).unwrap();
        let trace = trace_with_service(TraceId::new(0, 1), "svc-b", now);
        assert!(!matches(&trace, &query));
    }

    #[test]
    fn order_sorts_by_most_recent_start_descending_with_trace_id_tiebreak() {
        let base = SystemTime::UNIX_EPOCH;
        let mut traces = vec![
            trace_with_service(TraceId::new(0, 2), "svc", base + Duration::from_secs(5)),
            trace_with_service(TraceId::new(0, 1), "svc", base + Duration::from_secs(10)),
            trace_with_service(TraceId::new(0, 3), "svc", base + Duration::from_secs(10)),
        ];
        order(&mut traces);
        assert_eq!(traces[0].trace_id(), Some(TraceId::new(0, 1)));
        assert_eq!(traces[1].trace_id(), Some(TraceId::new(0, 3)));
        assert_eq!(traces[2].trace_id(), Some(TraceId::new(0, 2)));
    }

    #[test]
    fn find_traces_caps_at_num_traces() {
        let now = SystemTime::now();
        let mut query = TraceQueryParameters::new("svc", now, now).unwrap();
        query.num_traces = 1;
        let candidates = vec![
            trace_with_service(TraceId::new(0, 1), "svc", now),
            trace_with_service(TraceId::new(0, 2), "svc", now),
        ];
        assert_eq!(find_traces(candidates, &query).len(), 1);
    }

    #[test]
    fn tag_equality_is_typed_not_string_coerced() {
        let now = SystemTime::now();
        let mut query = TraceQueryParameters::new("svc", now, now).unwrap();
        query.tags.insert("retries".to_string(), tracestore_model::Value::I64(1));

        let mut span = new_test_span(TraceId::new(0, 1), SpanId::new(1), "op");
        span.process.service_name = "svc".to_string();
        span.start_time = now;
        span.tags = vec![KeyValue::new("retries", "1")];
        let trace = Trace { spans: vec![span], warnings: Vec::new() };

        assert!(!matches(&trace, &query));
    }
}
