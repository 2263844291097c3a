use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use opensearch::http::transport::Transport;
use opensearch::{IndexParts, OpenSearch, SearchParts};
use serde_json::{json, Value as Json};
use tracestore_model::{DependencyLink, Operation, Span, SpanKind, Trace, TraceId};
use tracestore_storage::{
    DependencyReader, DependencyWriter, SpanReader, SpanWriter, StorageError, StorageResult,
    TraceQueryParameters,
};
use tracing::warn;

use crate::doc::SpanDoc;
use crate::indices;

/// An OpenSearch-backed implementation of the span and dependency storage
/// contract. Documents are partitioned into daily indices the way Jaeger's
/// own Elasticsearch/OpenSearch storage does, under `index_prefix`.
pub struct OpenSearchBackend {
    client: OpenSearch,
    index_prefix: String,
}

impl OpenSearchBackend {
    /// Connect to a single node at `url`, namespacing every index under
    /// `index_prefix` (pass `""` for no prefix).
    pub fn connect(url: &str, index_prefix: impl Into<String>) -> StorageResult<Self> {
        let transport = Transport::single_node(url).map_err(StorageError::backend)?;
        Ok(OpenSearchBackend { client: OpenSearch::new(transport), index_prefix: index_prefix.into() })
    }

    fn span_index_wildcard(&self) -> String {
        if self.index_prefix.is_empty() {
            "jaeger-span-*".to_string()
        } else {
            format!("{}-jaeger-span-*", self.index_prefix)
        }
    }
}

#[async_trait]
impl SpanWriter for OpenSearchBackend {
    async fn write_trace(&self, trace: Trace) -> StorageResult<()> {
        for span in &trace.spans {
            let index = indices::span_index_name(&self.index_prefix, span.start_time);
            let doc = SpanDoc::from(span);
            let id = format!("{}-{}", doc.trace_id, doc.span_id);
            self.client
                .index(IndexParts::IndexId(&index, &id))
                .body(&doc)
                .send()
                .await
                .map_err(StorageError::backend)?
                .error_for_status_code()
                .map_err(StorageError::backend)?;

            let service_index = indices::service_index_name(&self.index_prefix, span.start_time);
            self.client
                .index(IndexParts::IndexId(&service_index, &span.process.service_name))
                .body(json!({ "serviceName": span.process.service_name }))
                .send()
                .await
                .map_err(StorageError::backend)?
                .error_for_status_code()
                .map_err(StorageError::backend)?;
        }
        Ok(())
    }
}

#[async_trait]
impl SpanReader for OpenSearchBackend {
    async fn get_trace(&self, trace_id: TraceId) -> StorageResult<Trace> {
        if !trace_id.is_valid() {
            return Err(StorageError::NotFound);
        }
        let wildcard = self.span_index_wildcard();
        let response = self
            .client
            .search(SearchParts::Index(&[&wildcard]))
            .body(json!({
                "query": { "term": { "traceID": trace_id.to_string() } },
                "size": 10_000,
            }))
            .send()
            .await
            .map_err(StorageError::backend)?;

        let body: Json = response.json().await.map_err(StorageError::backend)?;
        let spans = hits_to_spans(&body);
        if spans.is_empty() {
            return Err(StorageError::NotFound);
        }
        Ok(Trace { spans, warnings: Vec::new() })
    }

    async fn get_services(&self) -> StorageResult<Vec<String>> {
        let wildcard = if self.index_prefix.is_empty() {
            "jaeger-service-*".to_string()
        } else {
            format!("{}-jaeger-service-*", self.index_prefix)
        };
        let response = self
            .client
            .search(SearchParts::Index(&[&wildcard]))
            .body(json!({ "size": 10_000 }))
            .send()
            .await
            .map_err(StorageError::backend)?;
        let body: Json = response.json().await.map_err(StorageError::backend)?;
        let mut names: Vec<String> = body["hits"]["hits"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|h| h["_source"]["serviceName"].as_str().map(str::to_string))
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    async fn get_operations(
        &self,
        service_name: &str,
        span_kind: Option<SpanKind>,
    ) -> StorageResult<Vec<Operation>> {
        let wildcard = self.span_index_wildcard();
        let response = self
            .client
            .search(SearchParts::Index(&[&wildcard]))
            .body(json!({
                "query": { "term": { "process.serviceName": service_name } },
                "size": 10_000,
            }))
            .send()
            .await
            .map_err(StorageError::backend)?;
        let body: Json = response.json().await.map_err(StorageError::backend)?;
        let mut seen = std::collections::HashSet::new();
        let mut operations = Vec::new();
        for span in hits_to_spans(&body) {
            let kind = span
                .tags
                .iter()
                .find(|t| t.key == "span.kind")
                .and_then(|t| SpanKind::parse(&t.value.as_display()));
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
        let wildcard = self.span_index_wildcard();

        let mut must = vec![json!({ "term": { "process.serviceName": query.service_name } })];
        if let Some(op) = &query.operation_name {
            must.push(json!({ "term": { "operationName": op } }));
        }
        for (key, value) in &query.tags {
            must.push(json!({
                "nested": {
                    "path": "tags",
                    "query": {
                        "bool": {
                            "must": [
                                { "term": { "tags.key": key } },
                                { "term": { "tags.value": value.as_display() } },
                            ]
                        }
                    }
                }
            }));
        }
        let start_micros = query.start_time_min.duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default().as_micros() as u64;
        let end_micros = query.start_time_max.duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default().as_micros() as u64;
        must.push(json!({ "range": { "startTime": { "gte": start_micros, "lte": end_micros } } }));

        let response = self
            .client
            .search(SearchParts::Index(&[&wildcard]))
            .body(json!({ "query": { "bool": { "must": must } }, "size": 10_000 }))
            .send()
            .await
            .map_err(StorageError::backend)?;
        let body: Json = response.json().await.map_err(StorageError::backend)?;

        let mut by_trace: HashMap<TraceId, Vec<Span>> = HashMap::new();
        for span in hits_to_spans(&body) {
            by_trace.entry(span.trace_id).or_default().push(span);
        }
        let candidates: Vec<Trace> =
            by_trace.into_values().map(|spans| Trace { spans, warnings: Vec::new() }).collect();
        Ok(tracestore_query::find_traces(candidates, query))
    }

    async fn find_trace_ids(&self, query: &TraceQueryParameters) -> StorageResult<Vec<TraceId>> {
        let traces = self.find_traces(query).await?;
        Ok(traces.iter().filter_map(|t| t.trace_id()).collect())
    }
}

fn hits_to_spans(body: &Json) -> Vec<Span> {
    body["hits"]["hits"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|h| match serde_json::from_value::<SpanDoc>(h["_source"].clone()) {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!(error = %e, "dropping hit that doesn't decode as a span document");
                None
            }
        })
        .map(SpanDoc::into_span)
        .collect()
}

#[async_trait]
impl DependencyWriter for OpenSearchBackend {
    async fn write_dependencies(
        &self,
        end_ts: SystemTime,
        links: Vec<DependencyLink>,
    ) -> StorageResult<()> {
        let index = indices::dependency_index_name(&self.index_prefix, end_ts);
        let ts_micros = end_ts.duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default().as_micros() as u64;
        let body = json!({
            "timestamp": ts_micros,
            "dependencies": links.iter().map(|l| json!({
                "parent": l.parent,
                "child": l.child,
                "callCount": l.call_count,
                "source": l.source,
            })).collect::<Vec<_>>(),
        });
        self.client
            .index(IndexParts::Index(&index))
            .body(body)
            .send()
            .await
            .map_err(StorageError::backend)?
            .error_for_status_code()
            .map_err(StorageError::backend)?;
        Ok(())
    }
}

#[async_trait]
impl DependencyReader for OpenSearchBackend {
    async fn get_dependencies(
        &self,
        end_ts: SystemTime,
        lookback: Duration,
    ) -> StorageResult<Vec<DependencyLink>> {
        let start = end_ts.checked_sub(lookback).unwrap_or(SystemTime::UNIX_EPOCH);
        let wildcard = if self.index_prefix.is_empty() {
            "jaeger-dependencies-*".to_string()
        } else {
            format!("{}-jaeger-dependencies-*", self.index_prefix)
        };
        let start_micros = start.duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default().as_micros() as u64;
        let end_micros = end_ts.duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default().as_micros() as u64;
        let response = self
            .client
            .search(SearchParts::Index(&[&wildcard]))
            .body(json!({
                "query": { "range": { "timestamp": { "gte": start_micros, "lte": end_micros } } },
                "size": 10_000,
            }))
            .send()
            .await
            .map_err(StorageError::backend)?;
        let body: Json = response.json().await.map_err(StorageError::backend)?;

        let mut links = Vec::new();
        for hit in body["hits"]["hits"].as_array().into_iter().flatten() {
            for dep in hit["_source"]["dependencies"].as_array().into_iter().flatten() {
                let (Some(parent), Some(child), Some(call_count), Some(source)) = (
                    dep["parent"].as_str(),
                    dep["child"].as_str(),
                    dep["callCount"].as_u64(),
                    dep["source"].as_str(),
                ) else {
                    warn!("dropping dependency entry missing a required field");
                    continue;
                };
                if call_count == 0 {
                    continue;
                }
                links.push(DependencyLink::new(parent, child, call_count, source));
            }
        }
        Ok(links)
    }
}
