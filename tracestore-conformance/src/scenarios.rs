use std::time::{Duration, SystemTime};

use chrono::Utc;
use tracestore_model::{DependencyLink, Operation, SpanKind, TraceId};
use tracestore_storage::{DependencyReader, DependencyWriter, SpanReader, SpanWriter, StorageError};

use crate::fixtures::load_example_trace;
use crate::options::ConformanceOptions;
use crate::wait::wait_for;

/// Scenario 2: `GetTrace` on the all-zero id always misses, regardless of
/// what else has been written.
pub async fn trace_not_found<B: SpanReader>(backend: &B) -> bool {
    matches!(backend.get_trace(TraceId::INVALID).await, Err(StorageError::NotFound))
}

/// Scenario 3: after writing `example_trace`, `GetServices` (sorted)
/// equals the three example services.
pub async fn get_services<B: SpanReader + SpanWriter>(backend: &B) -> bool {
    backend.write_trace(load_example_trace(Utc::now())).await.expect("write_trace succeeds");

    wait_for(|| async {
        let mut services = backend.get_services().await.unwrap_or_default();
        services.sort();
        services == ["example-service-1", "example-service-2", "example-service-3"]
    })
    .await
}

/// Scenario 4: `GetOperations({ServiceName: "example-service-1"})`
/// sorted by name matches the fixture's three operations. When
/// `opts.get_operations_missing_span_kind` is set, a backend reporting
/// `span_kind: None` for an operation the fixture gave a kind still
/// counts as a match.
pub async fn get_operations_with_kinds<B: SpanReader + SpanWriter>(
    backend: &B,
    opts: &ConformanceOptions,
) -> bool {
    backend.write_trace(load_example_trace(Utc::now())).await.expect("write_trace succeeds");

    let expected = [
        Operation { name: "example-operation-1".into(), span_kind: Some(SpanKind::Unspecified) },
        Operation { name: "example-operation-3".into(), span_kind: Some(SpanKind::Server) },
        Operation { name: "example-operation-4".into(), span_kind: Some(SpanKind::Client) },
    ];

    wait_for(|| async {
        let mut operations = backend.get_operations("example-service-1", None).await.unwrap_or_default();
        operations.sort_by(|a, b| a.name.cmp(&b.name));
        if operations.len() != expected.len() {
            return false;
        }
        operations.iter().zip(expected.iter()).all(|(got, want)| {
            got.name == want.name
                && (got.span_kind == want.span_kind
                    || (opts.get_operations_missing_span_kind && got.span_kind.is_none()))
        })
    })
    .await
}

/// Scenario 5: a trace of 10008 spans, cloned from the fixture's first
/// span with `StartTime += i` seconds and `SpanID = i`, round-trips in
/// full by `TraceID`.
pub async fn large_trace<B: SpanReader + SpanWriter>(backend: &B) -> bool {
    const SPAN_COUNT: u64 = 10_008;
    let mut trace = load_example_trace(Utc::now());
    let template = trace.spans[0].clone();
    trace.spans = (0..SPAN_COUNT)
        .map(|i| {
            let mut span = template.clone();
            span.span_id = tracestore_model::SpanId::new(i);
            span.start_time = template.start_time + Duration::from_secs(i);
            span
        })
        .collect();
    let trace_id = trace.trace_id().expect("trace has spans");

    backend.write_trace(trace).await.expect("write_trace succeeds");

    wait_for(|| async {
        matches!(backend.get_trace(trace_id).await, Ok(t) if t.spans.len() as u64 == SPAN_COUNT)
    })
    .await
}

/// Scenario 6: writing `[(hello, world, 1), (world, hello, 3)]` then
/// reading `GetDependencies(now, 5 minutes)`, sorted by parent, equals
/// the input (modulo `source` when `opts.get_dependencies_returns_source`
/// is unset).
pub async fn dependencies_round_trip<B: DependencyReader + DependencyWriter>(
    backend: &B,
    opts: &ConformanceOptions,
) -> bool {
    let now = SystemTime::now();
    let written = vec![
        DependencyLink::new("hello", "world", 1, "tracestore"),
        DependencyLink::new("world", "hello", 3, "tracestore"),
    ];
    backend.write_dependencies(now, written.clone()).await.expect("write_dependencies succeeds");

    wait_for(|| async {
        let mut got = backend.get_dependencies(now, Duration::from_secs(300)).await.unwrap_or_default();
        got.sort_by(|a, b| a.parent.cmp(&b.parent));
        if got.len() != written.len() {
            return false;
        }
        got.iter().zip(written.iter()).all(|(g, w)| {
            g.parent == w.parent
                && g.child == w.child
                && g.call_count == w.call_count
                && (!opts.get_dependencies_returns_source || g.source == w.source)
        })
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracestore_memory::MemoryBackend;

    #[tokio::test(start_paused = true)]
    async fn trace_not_found_passes_against_the_memory_backend() {
        let backend = MemoryBackend::default();
        assert!(trace_not_found(&backend).await);
    }

    #[tokio::test(start_paused = true)]
    async fn get_services_passes_against_the_memory_backend() {
        let backend = MemoryBackend::default();
        assert!(get_services(&backend).await);
    }

    #[tokio::test(start_paused = true)]
    async fn get_operations_with_kinds_passes_against_the_memory_backend() {
        // The in-memory backend derives SpanKind from a `span.kind` tag and
        // has no way to distinguish "no tag" from "tagged Unspecified", so
        // it reports `None` for the fixture's first operation.
        let backend = MemoryBackend::default();
        let opts = ConformanceOptions { get_operations_missing_span_kind: true, ..ConformanceOptions::default() };
        assert!(get_operations_with_kinds(&backend, &opts).await);
    }

    #[tokio::test(start_paused = true)]
    async fn dependencies_round_trip_passes_against_the_memory_backend() {
        let backend = MemoryBackend::default();
        let opts = ConformanceOptions { get_dependencies_returns_source: true, ..ConformanceOptions::default() };
        assert!(dependencies_round_trip(&backend, &opts).await);
    }

    #[tokio::test(start_paused = true)]
    async fn large_trace_round_trips_in_full() {
        let backend = MemoryBackend::default();
        assert!(large_trace(&backend).await);
    }
}
