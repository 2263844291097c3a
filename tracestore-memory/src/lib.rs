//! An in-memory storage backend: a single guarded map keyed by `TraceId`
//! with FIFO eviction once `max_traces` is exceeded. Useful for tests and
//! single-process deployments where durability doesn't matter.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use tracestore_model::{DependencyLink, Operation, Span, SpanKind, Trace, TraceId};
use tracestore_storage::{
    DependencyReader, DependencyWriter, SpanReader, SpanWriter, StorageError, StorageResult,
    TraceQueryParameters,
};

/// Default capacity bound, matching the documented behavior for
/// in-memory backends.
pub const DEFAULT_MAX_TRACES: usize = 100_000;

struct Inner {
    order: VecDeque<TraceId>,
    traces: HashMap<TraceId, Trace>,
    dependency_snapshots: Vec<(SystemTime, Vec<DependencyLink>)>,
}

/// An in-memory [`SpanReader`]/[`SpanWriter`]/[`DependencyReader`]/
/// [`DependencyWriter`] implementation, bounded at `max_traces` with
/// FIFO eviction — the oldest trace by insertion order is dropped on
/// overflow, never the least-recently-read one.
pub struct MemoryBackend {
    max_traces: usize,
    inner: Mutex<Inner>,
}

impl MemoryBackend {
    /// Build a backend bounded at `max_traces`.
    pub fn new(max_traces: usize) -> Self {
        MemoryBackend {
            max_traces,
            inner: Mutex::new(Inner {
                order: VecDeque::new(),
                traces: HashMap::new(),
                dependency_snapshots: Vec::new(),
            }),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        MemoryBackend::new(DEFAULT_MAX_TRACES)
    }
}

fn merge_spans(existing: &mut Vec<Span>, incoming: Vec<Span>) {
    for span in incoming {
        if let Some(slot) = existing.iter_mut().find(|s| s.span_id == span.span_id) {
            *slot = span;
        } else {
            existing.push(span);
        }
    }
}

#[async_trait]
impl SpanWriter for MemoryBackend {
    async fn write_trace(&self, trace: Trace) -> StorageResult<()> {
        let Some(trace_id) = trace.trace_id() else {
            return Ok(());
        };
        let mut inner = self.inner.lock().unwrap();

        if let Some(existing) = inner.traces.get_mut(&trace_id) {
            merge_spans(&mut existing.spans, trace.spans);
            existing.warnings.extend(trace.warnings);
        } else {
            inner.traces.insert(trace_id, trace);
            inner.order.push_back(trace_id);
            while inner.order.len() > self.max_traces {
                if let Some(oldest) = inner.order.pop_front() {
                    inner.traces.remove(&oldest);
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SpanReader for MemoryBackend {
    async fn get_trace(&self, trace_id: TraceId) -> StorageResult<Trace> {
        if !trace_id.is_valid() {
            return Err(StorageError::NotFound);
        }
        let inner = self.inner.lock().unwrap();
        inner.traces.get(&trace_id).cloned().ok_or(StorageError::NotFound)
    }

    async fn get_services(&self) -> StorageResult<Vec<String>> {
        let inner = self.inner.lock().unwrap();
        let set: HashSet<&str> = inner
            .traces
            .values()
            .flat_map(|t| t.spans.iter())
            .map(|s| s.process.service_name.as_str())
            .collect();
        Ok(set.into_iter().map(str::to_string).collect())
    }

    async fn get_operations(
        &self,
        service_name: &str,
        span_kind: Option<SpanKind>,
    ) -> StorageResult<Vec<Operation>> {
        let inner = self.inner.lock().unwrap();
        let mut seen = HashSet::new();
        let mut operations = Vec::new();
        for span in inner
            .traces
            .values()
            .flat_map(|t| t.spans.iter())
            .filter(|s| s.process.service_name == service_name)
        {
            let kind = span_tag_kind(span);
            if let Some(wanted) = span_kind {
                if kind != Some(wanted) {
                    continue;
                }
            }
            let key = (span.operation_name.clone(), kind);
            if seen.insert(key.clone()) {
                operations.push(Operation { name: key.0, span_kind: key.1 });
            }
        }
        Ok(operations)
    }

    async fn find_traces(&self, query: &TraceQueryParameters) -> StorageResult<Vec<Trace>> {
        query.validate()?;
        let candidates: Vec<Trace> = self.inner.lock().unwrap().traces.values().cloned().collect();
        Ok(tracestore_query::find_traces(candidates, query))
    }

    async fn find_trace_ids(&self, query: &TraceQueryParameters) -> StorageResult<Vec<TraceId>> {
        let traces = self.find_traces(query).await?;
        Ok(traces.iter().filter_map(|t| t.trace_id()).collect())
    }
}

/// Best-effort `SpanKind` derived from a `span.kind` tag, when the
/// producer attached one; `None` otherwise, matching
/// `GetOperationsMissingSpanKind` backends.
fn span_tag_kind(span: &Span) -> Option<SpanKind> {
    span.tags
        .iter()
        .find(|t| t.key == "span.kind")
        .and_then(|t| SpanKind::parse(&t.value.as_display()))
}

#[async_trait]
impl DependencyWriter for MemoryBackend {
    async fn write_dependencies(
        &self,
        end_ts: SystemTime,
        links: Vec<DependencyLink>,
    ) -> StorageResult<()> {
        self.inner.lock().unwrap().dependency_snapshots.push((end_ts, links));
        Ok(())
    }
}

#[async_trait]
impl DependencyReader for MemoryBackend {
    async fn get_dependencies(
        &self,
        end_ts: SystemTime,
        lookback: Duration,
    ) -> StorageResult<Vec<DependencyLink>> {
        let start = end_ts.checked_sub(lookback).unwrap_or(SystemTime::UNIX_EPOCH);
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .dependency_snapshots
            .iter()
            .filter(|(ts, _)| *ts >= start && *ts <= end_ts)
            .flat_map(|(_, links)| links.iter().cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracestore_model::testing::new_test_trace;

    #[tokio::test]
    async fn trace_not_found_for_invalid_id_regardless_of_backend_state() {
        let backend = MemoryBackend::default();
        backend.write_trace(new_test_trace(TraceId::new(0, 1))).await.unwrap();
        let result = backend.get_trace(TraceId::INVALID).await;
        assert!(matches!(result, Err(StorageError::NotFound)));
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let backend = MemoryBackend::default();
        let trace_id = TraceId::new(0, 42);
        backend.write_trace(new_test_trace(trace_id)).await.unwrap();
        let trace = backend.get_trace(trace_id).await.unwrap();
        assert_eq!(trace.trace_id(), Some(trace_id));
    }

    #[tokio::test]
    async fn fifo_eviction_drops_oldest_trace_on_overflow() {
        let backend = MemoryBackend::new(2);
        backend.write_trace(new_test_trace(TraceId::new(0, 1))).await.unwrap();
        backend.write_trace(new_test_trace(TraceId::new(0, 2))).await.unwrap();
        backend.write_trace(new_test_trace(TraceId::new(0, 3))).await.unwrap();

        assert!(matches!(
            backend.get_trace(TraceId::new(0, 1)).await,
            Err(StorageError::NotFound)
        ));
        assert!(backend.get_trace(TraceId::new(0, 2)).await.is_ok());
        assert!(backend.get_trace(TraceId::new(0, 3)).await.is_ok());
    }

    #[tokio::test]
    async fn dependencies_round_trip_within_lookback_window() {
        let backend = MemoryBackend::default();
        let now = SystemTime::now();
        backend
            .write_dependencies(
                now,
                vec![DependencyLink::new("hello", "world", 1, "jaeger")],
            )
            .await
            .unwrap();

        let links = backend.get_dependencies(now, Duration::from_secs(300)).await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].parent, "hello");
    }
}
