use std::time::SystemTime;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;
use tracestore_model::{KeyValue, Process, RefType, Span, SpanFlags, SpanId, SpanRef, Trace, TraceId, Value};

const EXAMPLE_TRACE_RAW: &str = include_str!("../fixtures/example_trace.json");

/// `2017-01-26` in the raw fixture bytes means "yesterday"; `2017-01-25`
/// means "two days ago" — both relative to `now`, spelled out as literal
/// dates so the fixture JSON stays valid JSON on disk.
pub fn rewrite_fixture_dates(raw: &str, now: DateTime<Utc>) -> String {
    let yesterday = (now - ChronoDuration::days(1)).format("%Y-%m-%d").to_string();
    let two_days_ago = (now - ChronoDuration::days(2)).format("%Y-%m-%d").to_string();
    raw.replace("2017-01-26", &yesterday).replace("2017-01-25", &two_days_ago)
}

#[derive(Deserialize)]
struct FixtureTrace {
    #[serde(rename = "traceIdHigh")]
    trace_id_high: u64,
    #[serde(rename = "traceIdLow")]
    trace_id_low: u64,
    spans: Vec<FixtureSpan>,
}

#[derive(Deserialize)]
struct FixtureSpan {
    #[serde(rename = "spanId")]
    span_id: u64,
    #[serde(rename = "operationName")]
    operation_name: String,
    #[serde(rename = "startTime")]
    start_time: String,
    #[serde(rename = "durationMicros")]
    duration_micros: u64,
    tags: Vec<FixtureTag>,
    process: FixtureProcess,
    references: Vec<FixtureRef>,
}

#[derive(Deserialize)]
struct FixtureTag {
    key: String,
    kind: String,
    value: String,
}

#[derive(Deserialize)]
struct FixtureProcess {
    #[serde(rename = "serviceName")]
    service_name: String,
    tags: Vec<FixtureTag>,
}

#[derive(Deserialize)]
struct FixtureRef {
    #[serde(rename = "traceIdHigh")]
    trace_id_high: u64,
    #[serde(rename = "traceIdLow")]
    trace_id_low: u64,
    #[serde(rename = "spanId")]
    span_id: u64,
    #[serde(rename = "refType")]
    ref_type: String,
}

fn tag_value(tag: &FixtureTag) -> Value {
    match tag.kind.as_str() {
        "bool" => Value::Bool(tag.value == "true"),
        "int64" => Value::I64(tag.value.parse().unwrap_or_default()),
        "float64" => Value::F64(tag.value.parse().unwrap_or_default()),
        "binary" => Value::Binary(tag.value.clone().into_bytes()),
        _ => Value::String(tag.value.clone()),
    }
}

fn into_trace(fixture: FixtureTrace) -> Trace {
    let trace_id = TraceId::new(fixture.trace_id_high, fixture.trace_id_low);
    let spans = fixture
        .spans
        .into_iter()
        .map(|s| Span {
            trace_id,
            span_id: SpanId::new(s.span_id),
            operation_name: s.operation_name,
            references: s
                .references
                .into_iter()
                .map(|r| SpanRef {
                    trace_id: TraceId::new(r.trace_id_high, r.trace_id_low),
                    span_id: SpanId::new(r.span_id),
                    ref_type: if r.ref_type == "FOLLOWS_FROM" { RefType::FollowsFrom } else { RefType::ChildOf },
                })
                .collect(),
            start_time: DateTime::parse_from_rfc3339(&s.start_time)
                .map(|dt| SystemTime::from(dt.with_timezone(&Utc)))
                .unwrap_or(SystemTime::UNIX_EPOCH),
            duration: std::time::Duration::from_micros(s.duration_micros),
            tags: s.tags.iter().map(|t| KeyValue { key: t.key.clone(), value: tag_value(t) }).collect(),
            logs: Vec::new(),
            process: Process {
                service_name: s.process.service_name,
                tags: s.process.tags.iter().map(|t| KeyValue { key: t.key.clone(), value: tag_value(t) }).collect(),
            },
            flags: SpanFlags::SAMPLED,
        })
        .collect();
    Trace { spans, warnings: Vec::new() }
}

/// Load the `example_trace` fixture used by scenarios 3 and 4, with its
/// relative dates resolved against `now`.
pub fn load_example_trace(now: DateTime<Utc>) -> Trace {
    let rewritten = rewrite_fixture_dates(EXAMPLE_TRACE_RAW, now);
    let fixture: FixtureTrace = serde_json::from_str(&rewritten).expect("example_trace.json is well-formed");
    into_trace(fixture)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrite_replaces_both_literal_dates() {
        let now = DateTime::parse_from_rfc3339("2030-06-15T00:00:00Z").unwrap().with_timezone(&Utc);
        let rewritten = rewrite_fixture_dates("a 2017-01-26 b 2017-01-25 c", now);
        assert_eq!(rewritten, "a 2030-06-14 b 2030-06-13 c");
    }

    #[test]
    fn example_trace_has_three_services() {
        let now = Utc::now();
        let trace = load_example_trace(now);
        let mut services: Vec<&str> =
            trace.spans.iter().map(|s| s.process.service_name.as_str()).collect();
        services.sort();
        services.dedup();
        assert_eq!(services, ["example-service-1", "example-service-2", "example-service-3"]);
    }
}
