use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use tracestore_model::{
    DependencyLink, Operation, ServiceOperationProbabilities, ServiceOperationQPS, SpanKind,
    Throughput, Trace, TraceId,
};

use crate::error::StorageResult;
use crate::query_params::TraceQueryParameters;

/// Read access to spans, operations, and services.
///
/// Every call crosses a process boundary in persistent backends and may
/// suspend; no caller may hold a user-visible lock across one, so the
/// contract is `async`.
#[async_trait]
pub trait SpanReader: Send + Sync {
    /// Look up every span sharing `trace_id`. Returns
    /// [`crate::StorageError::NotFound`] when zero spans exist, regardless
    /// of backend state — the all-zero `TraceId` always misses.
    async fn get_trace(&self, trace_id: TraceId) -> StorageResult<Trace>;

    /// Deduplicated, unordered list of service names. Callers sort.
    async fn get_services(&self) -> StorageResult<Vec<String>>;

    /// Operations for `service_name`, optionally filtered by `span_kind`.
    /// Deduplicated on `(name, span_kind)`.
    async fn get_operations(
        &self,
        service_name: &str,
        span_kind: Option<SpanKind>,
    ) -> StorageResult<Vec<Operation>>;

    /// Full matching traces for `query`. See the query engine for matching
    /// and ordering semantics.
    async fn find_traces(&self, query: &TraceQueryParameters) -> StorageResult<Vec<Trace>>;

    /// Projection of [`SpanReader::find_traces`] returning only trace ids,
    /// for paging without materializing every span.
    async fn find_trace_ids(&self, query: &TraceQueryParameters) -> StorageResult<Vec<TraceId>>;
}

/// Write access to spans.
#[async_trait]
pub trait SpanWriter: Send + Sync {
    /// Persist `trace`'s spans. Must be safe under concurrent callers.
    /// Must be durable before returning success for persistent backends;
    /// in-memory backends may buffer up to an implementation-defined
    /// bound.
    async fn write_trace(&self, trace: Trace) -> StorageResult<()>;
}

/// Optional capability: a separate, typically longer-retention namespace
/// with the same span contract. Absence is a benign "not supported"
/// signal (`StorageError::Unsupported`), not an error.
pub trait ArchiveFactory: Send + Sync {
    /// A reader over the archive namespace, if this backend has one.
    fn create_archive_span_reader(&self) -> Option<&dyn SpanReader>;
    /// A writer over the archive namespace, if this backend has one.
    fn create_archive_span_writer(&self) -> Option<&dyn SpanWriter>;
}

/// Read access to the service dependency graph.
#[async_trait]
pub trait DependencyReader: Send + Sync {
    /// Union of links whose snapshot falls within
    /// `[end_ts - lookback, end_ts]`. Caller-side sorting is permitted.
    async fn get_dependencies(
        &self,
        end_ts: SystemTime,
        lookback: Duration,
    ) -> StorageResult<Vec<DependencyLink>>;
}

/// Write access to the service dependency graph.
#[async_trait]
pub trait DependencyWriter: Send + Sync {
    /// Store `links` as a snapshot labeled by `end_ts`.
    async fn write_dependencies(
        &self,
        end_ts: SystemTime,
        links: Vec<DependencyLink>,
    ) -> StorageResult<()>;
}

/// Adaptive sampling state: throughput accumulation and probability
/// snapshots.
#[async_trait]
pub trait SamplingStore: Send + Sync {
    /// Append-only insert of one throughput batch.
    async fn insert_throughput(&self, throughput: Vec<Throughput>) -> StorageResult<()>;

    /// Aggregated throughput rows whose bucket intersects `[start, end)`.
    async fn get_throughput(
        &self,
        start: SystemTime,
        end: SystemTime,
    ) -> StorageResult<Vec<Throughput>>;

    /// Record a probabilities/QPS snapshot for `hostname`. Snapshots are
    /// time-stamped monotonically by the caller.
    async fn insert_probabilities_and_qps(
        &self,
        hostname: &str,
        probabilities: ServiceOperationProbabilities,
        qps: ServiceOperationQPS,
    ) -> StorageResult<()>;

    /// Probabilities from the most recent snapshot across all hosts,
    /// wholesale — never merged across snapshots.
    async fn get_latest_probabilities(&self) -> StorageResult<ServiceOperationProbabilities>;
}
