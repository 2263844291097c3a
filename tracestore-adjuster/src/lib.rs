//! Trace normalization pipeline: pure, composable `Trace -> Trace`
//! transformers applied on the read and/or write path so every storage
//! backend presents a canonical shape.

mod clamp_duration;
mod dedup_logs;
mod ip_hostname;
mod otel_tags;
mod resolve_parent;

pub use clamp_duration::ClampNegativeDuration;
pub use dedup_logs::DeduplicateLogs;
pub use ip_hostname::{HostnameResolver, IpToHostname};
pub use otel_tags::OtelTagRelocation;
pub use resolve_parent::ResolveAmbiguousParent;

use tracestore_model::Trace;

/// A pure post-processor over a [`Trace`]. Implementations must not fail:
/// anomalies are recorded as warnings on the `Trace` itself, not returned
/// as an error.
pub trait Adjuster: Send + Sync {
    /// Normalize `trace`, returning the adjusted value.
    fn adjust(&self, trace: Trace) -> Trace;
}

/// An ordered sequence of [`Adjuster`]s, applied by folding over the
/// trace in registration order.
///
/// Construct with [`AdjusterPipeline::new`] and build up the order with
/// [`AdjusterPipeline::with`]: a `Vec<Box<dyn Adjuster>>` invoked in
/// registration order.
#[derive(Default)]
pub struct AdjusterPipeline {
    adjusters: Vec<Box<dyn Adjuster>>,
}

impl AdjusterPipeline {
    /// An empty pipeline.
    pub fn new() -> Self {
        AdjusterPipeline {
            adjusters: Vec::new(),
        }
    }

    /// Append an adjuster, returning `self` for chaining.
    pub fn with(mut self, adjuster: impl Adjuster + 'static) -> Self {
        self.adjusters.push(Box::new(adjuster));
        self
    }

    /// The canonical pipeline: `OtelTagRelocation` followed by the four
    /// interface adjusters, in declaration order.
    pub fn standard() -> Self {
        AdjusterPipeline::new()
            .with(OtelTagRelocation)
            .with(DeduplicateLogs)
            .with(ClampNegativeDuration)
            .with(ResolveAmbiguousParent)
    }

    /// Fold every registered adjuster over `trace` in order.
    pub fn run(&self, trace: Trace) -> Trace {
        self.adjusters
            .iter()
            .fold(trace, |trace, adjuster| adjuster.adjust(trace))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracestore_model::testing::new_test_trace;
    use tracestore_model::{KeyValue, TraceId};

    #[test]
    fn standard_pipeline_is_idempotent() {
        let mut trace = new_test_trace(TraceId::new(0, 1));
        trace.spans[0].tags = vec![
            KeyValue::new("telemetry.sdk.name", "x"),
            KeyValue::new("http.method", "GET"),
        ];
        let pipeline = AdjusterPipeline::standard();
        let once = pipeline.run(trace);
        let twice = pipeline.run(once.clone());
        assert_eq!(once.spans, twice.spans);
    }

    #[test]
    fn empty_pipeline_is_a_no_op() {
        let trace = new_test_trace(TraceId::new(0, 1));
        let adjusted = AdjusterPipeline::new().run(trace.clone());
        assert_eq!(trace, adjusted);
    }
}
