use std::collections::HashSet;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use tracing::warn;
use tracestore_model::{
    DependencyLink, KeyValue, Log, Operation, Process, RefType, Span, SpanFlags, SpanId, SpanKind,
    SpanRef, Trace, TraceId, Value,
};
use tracestore_storage::{
    DependencyReader, DependencyWriter, SpanReader, SpanWriter, StorageError, StorageResult,
    TraceQueryParameters,
};

use crate::schema::DDL;

/// A Cassandra-backed implementation of the full span/dependency storage
/// contract, keyed the way Jaeger's own Cassandra schema partitions
/// spans: by `(trace_id_high, trace_id_low)`, clustered by `span_id`.
pub struct CassandraBackend {
    session: Session,
    keyspace: String,
}

impl CassandraBackend {
    /// Connect to `nodes` and use `keyspace` for every statement.
    pub async fn connect(
        nodes: &[String],
        keyspace: &str,
        username: &str,
        password: &str,
    ) -> StorageResult<Self> {
        let session = SessionBuilder::new()
            .known_nodes(nodes)
            .user(username, password)
            .use_keyspace(keyspace, false)
            .build()
            .await
            .map_err(StorageError::backend)?;
        Ok(CassandraBackend { session, keyspace: keyspace.to_string() })
    }

    /// Apply the DDL in [`crate::schema::DDL`]. Safe to call repeatedly.
    pub async fn migrate(&self) -> StorageResult<()> {
        for statement in DDL {
            self.session.query_unpaged(*statement, &[]).await.map_err(StorageError::backend)?;
        }
        Ok(())
    }

    /// The keyspace this backend was opened against.
    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct RefRow {
    trace_id_high: i64,
    trace_id_low: i64,
    span_id: i64,
    follows_from: bool,
}

fn span_to_rows(span: &Span) -> (i64, i64, i64, String, i64, String, String, String, String, String, i32) {
    let trace_id_high = span.trace_id.high() as i64;
    let trace_id_low = span.trace_id.low() as i64;
    let span_id = span.span_id.as_u64() as i64;
    let start_time = span
        .start_time
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64;
    let tags_json = serde_json::to_string(&tags_to_json(&span.tags)).unwrap_or_default();
    let process_tags_json =
        serde_json::to_string(&tags_to_json(&span.process.tags)).unwrap_or_default();
    let logs_json = serde_json::to_string(&logs_to_json(&span.logs)).unwrap_or_default();
    let references_json = serde_json::to_string(
        &span
            .references
            .iter()
            .map(|r| RefRow {
                trace_id_high: r.trace_id.high() as i64,
                trace_id_low: r.trace_id.low() as i64,
                span_id: r.span_id.as_u64() as i64,
                follows_from: r.ref_type == RefType::FollowsFrom,
            })
            .collect::<Vec<_>>(),
    )
    .unwrap_or_default();
    (
        trace_id_high,
        trace_id_low,
        span_id,
        span.operation_name.clone(),
        start_time,
        tags_json,
        logs_json,
        references_json,
        span.process.service_name.clone(),
        process_tags_json,
        span.flags.0 as i32,
    )
}

#[derive(serde::Serialize, serde::Deserialize)]
struct TagJson {
    key: String,
    kind: String,
    value: String,
}

fn tags_to_json(tags: &[KeyValue]) -> Vec<TagJson> {
    tags.iter()
        .map(|t| TagJson {
            key: t.key.clone(),
            kind: t.value.type_name().to_string(),
            value: t.value.as_display(),
        })
        .collect()
}

fn tags_from_json(json: &str) -> Vec<KeyValue> {
    let rows: Vec<TagJson> = serde_json::from_str(json).unwrap_or_else(|e| {
        warn!(error = %e, "dropping malformed tags_json column");
        Vec::new()
    });
    rows.into_iter()
        .map(|r| {
            let value = match r.kind.as_str() {
                "bool" => Value::Bool(r.value == "true"),
                "int64" => Value::I64(r.value.parse().unwrap_or_default()),
                "float64" => Value::F64(r.value.parse().unwrap_or_default()),
                "binary" => Value::Binary(r.value.into_bytes()),
                _ => Value::String(r.value),
            };
            KeyValue { key: r.key, value }
        })
        .collect()
}

#[derive(serde::Serialize, serde::Deserialize)]
struct LogJson {
    timestamp_millis: i64,
    fields: Vec<TagJson>,
}

fn logs_to_json(logs: &[Log]) -> Vec<LogJson> {
    logs.iter()
        .map(|l| LogJson {
            timestamp_millis: l
                .timestamp
                .duration_since(SystemTime::UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as i64,
            fields: tags_to_json(&l.fields),
        })
        .collect()
}

fn logs_from_json(json: &str) -> Vec<Log> {
    let rows: Vec<LogJson> = serde_json::from_str(json).unwrap_or_else(|e| {
        warn!(error = %e, "dropping malformed logs_json column");
        Vec::new()
    });
    rows.into_iter()
        .map(|r| Log {
            timestamp: SystemTime::UNIX_EPOCH + Duration::from_millis(r.timestamp_millis as u64),
            fields: r.fields.into_iter().map(|t| KeyValue {
                key: t.key,
                value: match t.kind.as_str() {
                    "bool" => Value::Bool(t.value == "true"),
                    "int64" => Value::I64(t.value.parse().unwrap_or_default()),
                    "float64" => Value::F64(t.value.parse().unwrap_or_default()),
                    "binary" => Value::Binary(t.value.into_bytes()),
                    _ => Value::String(t.value),
                },
            }).collect(),
        })
        .collect()
}

#[async_trait]
impl SpanWriter for CassandraBackend {
    async fn write_trace(&self, trace: Trace) -> StorageResult<()> {
        for span in &trace.spans {
            let (
                trace_id_high,
                trace_id_low,
                span_id,
                operation_name,
                start_time,
                tags_json,
                logs_json,
                references_json,
                service_name,
                process_tags_json,
                flags,
            ) = span_to_rows(span);

            self.session
                .query_unpaged(
                    "INSERT INTO spans (trace_id_high, trace_id_low, span_id, operation_name, \
                     start_time, duration_nanos, tags_json, logs_json, references_json, \
                     process_service_name, process_tags_json, flags) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    (
                        trace_id_high,
                        trace_id_low,
                        span_id,
                        operation_name,
                        start_time,
                        span.duration.as_nanos() as i64,
                        tags_json,
                        logs_json,
                        references_json,
                        service_name.clone(),
                        process_tags_json,
                        flags,
                    ),
                )
                .await
                .map_err(StorageError::backend)?;

            self.session
                .query_unpaged(
                    "INSERT INTO service_names (service_name) VALUES (?)",
                    (service_name.clone(),),
                )
                .await
                .map_err(StorageError::backend)?;

            self.session
                .query_unpaged(
                    "INSERT INTO operation_names (service_name, operation_name, span_kind) \
                     VALUES (?, ?, ?)",
                    (service_name, span.operation_name.clone(), "unspecified"),
                )
                .await
                .map_err(StorageError::backend)?;
        }
        Ok(())
    }
}

#[async_trait]
impl SpanReader for CassandraBackend {
    async fn get_trace(&self, trace_id: TraceId) -> StorageResult<Trace> {
        if !trace_id.is_valid() {
            return Err(StorageError::NotFound);
        }
        let rows = self
            .session
            .query_unpaged(
                "SELECT span_id, operation_name, start_time, duration_nanos, tags_json, \
                 logs_json, references_json, process_service_name, process_tags_json, flags \
                 FROM spans WHERE trace_id_high = ? AND trace_id_low = ?",
                (trace_id.high() as i64, trace_id.low() as i64),
            )
            .await
            .map_err(StorageError::backend)?
            .into_rows_result()
            .map_err(StorageError::backend)?;

        let mut spans = Vec::new();
        for row in rows.rows::<(i64, String, i64, i64, String, String, String, String, String, i32)>()
            .map_err(StorageError::backend)?
        {
            let (
                span_id,
                operation_name,
                start_time_millis,
                duration_nanos,
                tags_json,
                logs_json,
                references_json,
                process_service_name,
                process_tags_json,
                flags,
            ) = row.map_err(StorageError::backend)?;

            let references: Vec<RefRow> = serde_json::from_str(&references_json).unwrap_or_else(|e| {
                warn!(error = %e, "dropping malformed references_json column");
                Vec::new()
            });
            spans.push(Span {
                trace_id,
                span_id: SpanId::new(span_id as u64),
                operation_name,
                references: references
                    .into_iter()
                    .map(|r| SpanRef {
                        trace_id: TraceId::new(r.trace_id_high as u64, r.trace_id_low as u64),
                        span_id: SpanId::new(r.span_id as u64),
                        ref_type: if r.follows_from { RefType::FollowsFrom } else { RefType::ChildOf },
                    })
                    .collect(),
                start_time: SystemTime::UNIX_EPOCH + Duration::from_millis(start_time_millis as u64),
                duration: Duration::from_nanos(duration_nanos as u64),
                tags: tags_from_json(&tags_json),
                logs: logs_from_json(&logs_json),
                process: Process { service_name: process_service_name, tags: tags_from_json(&process_tags_json) },
                flags: SpanFlags(flags as u32),
            });
        }

        if spans.is_empty() {
            return Err(StorageError::NotFound);
        }
        Ok(Trace { spans, warnings: Vec::new() })
    }

    async fn get_services(&self) -> StorageResult<Vec<String>> {
        let rows = self
            .session
            .query_unpaged("SELECT service_name FROM service_names", &[])
            .await
            .map_err(StorageError::backend)?
            .into_rows_result()
            .map_err(StorageError::backend)?;
        let names: HashSet<String> = rows
            .rows::<(String,)>()
            .map_err(StorageError::backend)?
            .filter_map(|r| r.ok().map(|(n,)| n))
            .collect();
        Ok(names.into_iter().collect())
    }

    async fn get_operations(
        &self,
        service_name: &str,
        span_kind: Option<SpanKind>,
    ) -> StorageResult<Vec<Operation>> {
        let rows = self
            .session
            .query_unpaged(
                "SELECT operation_name, span_kind FROM operation_names WHERE service_name = ?",
                (service_name.to_string(),),
            )
            .await
            .map_err(StorageError::backend)?
            .into_rows_result()
            .map_err(StorageError::backend)?;

        let mut operations = Vec::new();
        for row in rows.rows::<(String, String)>().map_err(StorageError::backend)? {
            let (name, kind_str) = row.map_err(StorageError::backend)?;
            let kind = SpanKind::parse(&kind_str);
            if let Some(wanted) = span_kind {
                if kind != Some(wanted) {
                    continue;
                }
            }
            operations.push(Operation { name, span_kind: kind });
        }
        Ok(operations)
    }

    async fn find_traces(&self, query: &TraceQueryParameters) -> StorageResult<Vec<Trace>> {
        query.validate()?;
        Err(StorageError::Unsupported(
            "FindTraces requires a query-capable index (Cassandra backend expects one fronted by a search layer); not implemented directly against the span table",
        ))
    }

    async fn find_trace_ids(&self, query: &TraceQueryParameters) -> StorageResult<Vec<TraceId>> {
        let traces = self.find_traces(query).await?;
        Ok(traces.iter().filter_map(|t| t.trace_id()).collect())
    }
}

#[async_trait]
impl DependencyWriter for CassandraBackend {
    async fn write_dependencies(
        &self,
        end_ts: SystemTime,
        links: Vec<DependencyLink>,
    ) -> StorageResult<()> {
        let millis = end_ts.duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default().as_millis() as i64;
        let links_json = serde_json::to_string(
            &links
                .iter()
                .map(|l| (l.parent.clone(), l.child.clone(), l.call_count as i64, l.source.clone()))
                .collect::<Vec<_>>(),
        )
        .unwrap_or_default();
        self.session
            .query_unpaged(
                "INSERT INTO dependencies (end_ts, links_json) VALUES (?, ?)",
                (millis, links_json),
            )
            .await
            .map_err(StorageError::backend)?;
        Ok(())
    }
}

#[async_trait]
impl DependencyReader for CassandraBackend {
    async fn get_dependencies(
        &self,
        end_ts: SystemTime,
        lookback: Duration,
    ) -> StorageResult<Vec<DependencyLink>> {
        let start = end_ts.checked_sub(lookback).unwrap_or(SystemTime::UNIX_EPOCH);
        let rows = self
            .session
            .query_unpaged("SELECT end_ts, links_json FROM dependencies", &[])
            .await
            .map_err(StorageError::backend)?
            .into_rows_result()
            .map_err(StorageError::backend)?;

        let mut links = Vec::new();
        for row in rows.rows::<(i64, String)>().map_err(StorageError::backend)? {
            let (millis, links_json) = row.map_err(StorageError::backend)?;
            let ts = SystemTime::UNIX_EPOCH + Duration::from_millis(millis as u64);
            if ts < start || ts > end_ts {
                continue;
            }
            let decoded: Vec<(String, String, i64, String)> =
                serde_json::from_str(&links_json).unwrap_or_else(|e| {
                    warn!(error = %e, "dropping malformed links_json column");
                    Vec::new()
                });
            links.extend(
                decoded
                    .into_iter()
                    .map(|(parent, child, count, source)| {
                        DependencyLink::new(parent, child, count as u64, source)
                    }),
            );
        }
        Ok(links)
    }
}
