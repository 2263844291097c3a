use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use tracestore_model::{KeyValue, Log, Process, RefType, Span, SpanFlags, SpanId, SpanRef, TraceId, Value};
use tracing::warn;

/// The document shape stored in a `{prefix}-jaeger-span-*` index. Field
/// names follow Jaeger's real Elasticsearch mapping (`traceID`, `spanID`,
/// `startTime` in epoch micros) so a document dumped from this backend
/// reads the way a Jaeger operator would expect.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpanDoc {
    #[serde(rename = "traceID")]
    pub trace_id: String,
    #[serde(rename = "spanID")]
    pub span_id: String,
    #[serde(rename = "operationName")]
    pub operation_name: String,
    pub references: Vec<RefDoc>,
    #[serde(rename = "startTime")]
    pub start_time_micros: u64,
    #[serde(rename = "duration")]
    pub duration_micros: u64,
    pub tags: Vec<TagDoc>,
    pub logs: Vec<LogDoc>,
    pub process: ProcessDoc,
    pub flags: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RefDoc {
    #[serde(rename = "traceID")]
    pub trace_id: String,
    #[serde(rename = "spanID")]
    pub span_id: String,
    #[serde(rename = "refType")]
    pub ref_type: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TagDoc {
    pub key: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogDoc {
    pub timestamp: u64,
    pub fields: Vec<TagDoc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProcessDoc {
    #[serde(rename = "serviceName")]
    pub service_name: String,
    pub tags: Vec<TagDoc>,
}

fn tags_to_docs(tags: &[KeyValue]) -> Vec<TagDoc> {
    tags.iter()
        .map(|t| TagDoc { key: t.key.clone(), kind: t.value.type_name().to_string(), value: t.value.as_display() })
        .collect()
}

fn tags_from_docs(docs: Vec<TagDoc>) -> Vec<KeyValue> {
    docs.into_iter()
        .map(|d| {
            let value = match d.kind.as_str() {
                "bool" => Value::Bool(d.value == "true"),
                "int64" => Value::I64(d.value.parse().unwrap_or_default()),
                "float64" => Value::F64(d.value.parse().unwrap_or_default()),
                "binary" => Value::Binary(d.value.into_bytes()),
                _ => Value::String(d.value),
            };
            KeyValue { key: d.key, value }
        })
        .collect()
}

impl From<&Span> for SpanDoc {
    fn from(span: &Span) -> Self {
        let start_time_micros = span
            .start_time
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_micros() as u64;
        SpanDoc {
            trace_id: span.trace_id.to_string(),
            span_id: span.span_id.to_string(),
            operation_name: span.operation_name.clone(),
            references: span
                .references
                .iter()
                .map(|r| RefDoc {
                    trace_id: r.trace_id.to_string(),
                    span_id: r.span_id.to_string(),
                    ref_type: if r.ref_type == RefType::FollowsFrom { "FOLLOWS_FROM" } else { "CHILD_OF" }
                        .to_string(),
                })
                .collect(),
            start_time_micros,
            duration_micros: span.duration.as_micros() as u64,
            tags: tags_to_docs(&span.tags),
            logs: span
                .logs
                .iter()
                .map(|l| LogDoc {
                    timestamp: l.timestamp.duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default().as_micros()
                        as u64,
                    fields: tags_to_docs(&l.fields),
                })
                .collect(),
            process: ProcessDoc {
                service_name: span.process.service_name.clone(),
                tags: tags_to_docs(&span.process.tags),
            },
            flags: span.flags.0,
        }
    }
}

fn parse_trace_id(hex: &str) -> TraceId {
    TraceId::from_hex(hex).unwrap_or_else(|e| {
        warn!(error = %e, hex, "treating unparsable traceID document field as invalid");
        TraceId::INVALID
    })
}

fn parse_span_id(hex: &str) -> SpanId {
    SpanId::from_hex(hex).unwrap_or_else(|e| {
        warn!(error = %e, hex, "treating unparsable spanID document field as invalid");
        SpanId::INVALID
    })
}

impl SpanDoc {
    pub fn into_span(self) -> Span {
        let trace_id = parse_trace_id(&self.trace_id);
        Span {
            trace_id,
            span_id: parse_span_id(&self.span_id),
            operation_name: self.operation_name,
            references: self
                .references
                .into_iter()
                .map(|r| SpanRef {
                    trace_id: parse_trace_id(&r.trace_id),
                    span_id: parse_span_id(&r.span_id),
                    ref_type: if r.ref_type == "FOLLOWS_FROM" { RefType::FollowsFrom } else { RefType::ChildOf },
                })
                .collect(),
            start_time: SystemTime::UNIX_EPOCH + Duration::from_micros(self.start_time_micros),
            duration: Duration::from_micros(self.duration_micros),
            tags: tags_from_docs(self.tags),
            logs: self
                .logs
                .into_iter()
                .map(|l| Log {
                    timestamp: SystemTime::UNIX_EPOCH + Duration::from_micros(l.timestamp),
                    fields: tags_from_docs(l.fields),
                })
                .collect(),
            process: Process { service_name: self.process.service_name, tags: tags_from_docs(self.process.tags) },
            flags: SpanFlags(self.flags),
        }
    }
}
