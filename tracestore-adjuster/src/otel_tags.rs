use tracestore_model::{KeyValue, Trace};

use crate::Adjuster;

/// Keys relocated from span-level to process-level tags. Exact string
/// match only — no prefix or glob matching.
const OTEL_SDK_KEYS: &[&str] = &[
    "telemetry.sdk.language",
    "telemetry.sdk.name",
    "telemetry.sdk.version",
    "telemetry.distro.name",
    "telemetry.distro.version",
];

/// Relocates telemetry-SDK tags from each span's `Tags` to its
/// `Process.Tags`, then stably sorts `Process.Tags` by key.
///
/// Idempotent: a tag already promoted is never present in `Span.Tags`
/// again, so a second pass finds nothing left to promote and the sort is
/// already stable, so two applications commute to the same `Trace`.
#[derive(Clone, Copy, Debug, Default)]
pub struct OtelTagRelocation;

impl Adjuster for OtelTagRelocation {
    fn adjust(&self, mut trace: Trace) -> Trace {
        for span in &mut trace.spans {
            let mut kept = Vec::with_capacity(span.tags.len());
            let mut promoted: Vec<KeyValue> = Vec::new();
            for tag in span.tags.drain(..) {
                if OTEL_SDK_KEYS.contains(&tag.key.as_str()) {
                    promoted.push(tag);
                } else {
                    kept.push(tag);
                }
            }
            span.tags = kept;
            span.process.tags.extend(promoted);
            span.process.sort_tags();
        }
        trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracestore_model::testing::new_test_trace;
    use tracestore_model::{SpanId, TraceId};

    #[test]
    fn promotes_recognized_keys_preserving_kept_order_and_sorting_promoted() {
        let mut trace = new_test_trace(TraceId::new(0, 1));
        let span = &mut trace.spans[0];
        span.tags = vec![
            KeyValue::new("http.method", "GET"),
            KeyValue::new("telemetry.sdk.name", "x"),
            KeyValue::new("telemetry.sdk.version", "1.2"),
            KeyValue::new("db.system", "pg"),
        ];
        span.process.tags = Vec::new();

        let adjusted = OtelTagRelocation.adjust(trace);
        let span = &adjusted.spans[0];

        assert_eq!(
            span.tags,
            vec![
                KeyValue::new("http.method", "GET"),
                KeyValue::new("db.system", "pg"),
            ]
        );
        assert_eq!(
            span.process.tags,
            vec![
                KeyValue::new("telemetry.sdk.name", "x"),
                KeyValue::new("telemetry.sdk.version", "1.2"),
            ]
        );
    }

    #[test]
    fn is_idempotent() {
        let mut trace = new_test_trace(TraceId::new(0, 1));
        trace.spans[0].tags = vec![
            KeyValue::new("telemetry.sdk.name", "x"),
            KeyValue::new("http.method", "GET"),
        ];
        let once = OtelTagRelocation.adjust(trace);
        let twice = OtelTagRelocation.adjust(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn never_drops_a_span() {
        let trace = new_test_trace(TraceId::new(0, 1));
        let span_count = trace.spans.len();
        let adjusted = OtelTagRelocation.adjust(trace);
        assert_eq!(adjusted.spans.len(), span_count);
        let _ = SpanId::new(1);
    }
}
