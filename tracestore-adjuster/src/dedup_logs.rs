use tracestore_model::Trace;

use crate::Adjuster;

/// Removes adjacent logs with identical timestamp and fields, a common
/// artifact of retried instrumentation that records the same event twice.
/// Only adjacent duplicates are collapsed — logs are never reordered.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeduplicateLogs;

impl Adjuster for DeduplicateLogs {
    fn adjust(&self, mut trace: Trace) -> Trace {
        for span in &mut trace.spans {
            span.logs.dedup_by(|a, b| a.timestamp == b.timestamp && a.fields == b.fields);
        }
        trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracestore_model::testing::new_test_trace;
    use tracestore_model::{KeyValue, Log, TraceId};

    #[test]
    fn collapses_adjacent_identical_logs_only() {
        let mut trace = new_test_trace(TraceId::new(0, 1));
        let t0 = std::time::SystemTime::UNIX_EPOCH;
        let fields = vec![KeyValue::new("event", "retry")];
        trace.spans[0].logs = vec![
            Log { timestamp: t0, fields: fields.clone() },
            Log { timestamp: t0, fields: fields.clone() },
            Log { timestamp: t0, fields: vec![KeyValue::new("event", "other")] },
            Log { timestamp: t0, fields: fields.clone() },
        ];
        let adjusted = DeduplicateLogs.adjust(trace);
        assert_eq!(adjusted.spans[0].logs.len(), 3);
    }
}
