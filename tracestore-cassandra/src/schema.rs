//! CQL schema for the `tracestore` keyspace, simplified from Jaeger's
//! production Cassandra schema: spans and their tags/logs/process are
//! stored as JSON text rather than nested UDTs, trading a little query
//! flexibility for a schema small enough to keep in one module.

/// Statements run by [`crate::CassandraBackend::migrate`]. Idempotent:
/// every statement uses `IF NOT EXISTS`.
pub const DDL: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS spans (
        trace_id_high bigint,
        trace_id_low bigint,
        span_id bigint,
        operation_name text,
        start_time bigint,
        duration_nanos bigint,
        tags_json text,
        logs_json text,
        references_json text,
        process_service_name text,
        process_tags_json text,
        flags int,
        PRIMARY KEY ((trace_id_high, trace_id_low), span_id)
    )",
    "CREATE TABLE IF NOT EXISTS service_names (
        service_name text PRIMARY KEY
    )",
    "CREATE TABLE IF NOT EXISTS operation_names (
        service_name text,
        span_kind text,
        operation_name text,
        PRIMARY KEY (service_name, operation_name, span_kind)
    )",
    "CREATE TABLE IF NOT EXISTS dependencies (
        end_ts bigint PRIMARY KEY,
        links_json text
    )",
    "CREATE TABLE IF NOT EXISTS sampling_probabilities (
        hostname text,
        written_at bigint,
        probabilities_json text,
        qps_json text,
        PRIMARY KEY (hostname, written_at)
    )",
    "CREATE TABLE IF NOT EXISTS throughput (
        bucket_start bigint,
        service text,
        operation text,
        count counter,
        PRIMARY KEY ((bucket_start), service, operation)
    )",
];
