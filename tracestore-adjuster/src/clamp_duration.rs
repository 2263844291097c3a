use std::time::Duration;

use tracestore_model::Trace;

use crate::Adjuster;

/// Clamps a span's duration to zero when it carries a negative
/// duration that was wire-decoded into the unsigned [`Duration`] type via a
/// widening `as u64` cast from a signed nanosecond count (a raw negative
/// `i64` wraps to a value in the upper half of `u64`'s range, i.e. greater
/// than `i64::MAX` nanoseconds — well over 292 years). Appends a warning to
/// the trace whenever a clamp occurs.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClampNegativeDuration;

impl Adjuster for ClampNegativeDuration {
    fn adjust(&self, mut trace: Trace) -> Trace {
        for span in &mut trace.spans {
            if span.duration.as_nanos() > i64::MAX as u128 {
                span.duration = Duration::ZERO;
                trace.warnings.push(format!(
                    "clamped negative duration to zero for span {}",
                    span.span_id
                ));
            }
        }
        trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracestore_model::testing::new_test_trace;
    use tracestore_model::TraceId;

    #[test]
    fn leaves_normal_durations_untouched() {
        let mut trace = new_test_trace(TraceId::new(0, 1));
        trace.spans[0].duration = Duration::from_secs(1);
        let adjusted = ClampNegativeDuration.adjust(trace);
        assert_eq!(adjusted.spans[0].duration, Duration::from_secs(1));
        assert!(adjusted.warnings.is_empty());
    }

    #[test]
    fn clamps_a_wrapped_negative_duration_and_warns() {
        let mut trace = new_test_trace(TraceId::new(0, 1));
        let raw_negative_nanos: i64 = -5_000_000_000;
        trace.spans[0].duration = Duration::from_nanos(raw_negative_nanos as u64);

        let adjusted = ClampNegativeDuration.adjust(trace);

        assert_eq!(adjusted.spans[0].duration, Duration::ZERO);
        assert_eq!(adjusted.warnings.len(), 1);
    }
}
