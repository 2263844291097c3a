use std::time::{Duration, SystemTime};

use crate::ids::{SpanId, TraceId};
use crate::kv::KeyValue;

/// How a [`SpanRef`] relates its span to the referenced one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefType {
    /// The referenced span is the direct parent.
    ChildOf,
    /// The referenced span is a causal but non-blocking predecessor.
    FollowsFrom,
}

/// A reference from one span to another, scoped by [`RefType`].
#[derive(Clone, Debug, PartialEq)]
pub struct SpanRef {
    /// The trace containing the referenced span.
    pub trace_id: TraceId,
    /// The referenced span.
    pub span_id: SpanId,
    /// The kind of reference.
    pub ref_type: RefType,
}

/// The role a span plays in an RPC, mirroring
/// `opentelemetry::trace::SpanKind` but adding `Unspecified` for legacy
/// backends that never recorded a kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SpanKind {
    /// No kind was recorded.
    #[default]
    Unspecified,
    /// The span describes a request to a remote service.
    Client,
    /// The span covers server-side handling of a request.
    Server,
    /// The span describes sending an asynchronous message.
    Producer,
    /// The span describes receiving an asynchronous message.
    Consumer,
    /// The span is a local operation with no remote counterpart.
    Internal,
}

impl SpanKind {
    /// Parse the lowercase wire representation used by the sampling and
    /// query wire contracts, e.g. `"server"`.
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "unspecified" => SpanKind::Unspecified,
            "client" => SpanKind::Client,
            "server" => SpanKind::Server,
            "producer" => SpanKind::Producer,
            "consumer" => SpanKind::Consumer,
            "internal" => SpanKind::Internal,
            _ => return None,
        })
    }

    /// The lowercase wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SpanKind::Unspecified => "unspecified",
            SpanKind::Client => "client",
            SpanKind::Server => "server",
            SpanKind::Producer => "producer",
            SpanKind::Consumer => "consumer",
            SpanKind::Internal => "internal",
        }
    }
}

/// A named operation observed for a service, as returned by `GetOperations`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Operation {
    /// The operation (span) name.
    pub name: String,
    /// The span kind, when the backend records one.
    pub span_kind: Option<SpanKind>,
}

/// A single structured log entry attached to a span (`Span.Logs`).
#[derive(Clone, Debug, PartialEq)]
pub struct Log {
    /// When the log event occurred.
    pub timestamp: SystemTime,
    /// The event's fields.
    pub fields: Vec<KeyValue>,
}

/// The process that emitted a span.
///
/// `service_name` must be non-empty, and `tags` must be sorted by key
/// after the adjuster pipeline runs.
#[derive(Clone, Debug, PartialEq)]
pub struct Process {
    /// The emitting service's name.
    pub service_name: String,
    /// Process-level tags (host, SDK version, promoted OTel tags, ...).
    pub tags: Vec<KeyValue>,
}

impl Process {
    /// Construct a process with no tags.
    pub fn new(service_name: impl Into<String>) -> Self {
        Process {
            service_name: service_name.into(),
            tags: Vec::new(),
        }
    }

    /// Stably sort `tags` ascending by key, as required after adjuster
    /// promotion.
    pub fn sort_tags(&mut self) {
        self.tags.sort_by(|a, b| a.key.cmp(&b.key));
    }
}

/// Bit flags recorded alongside a span; bit 0 is the W3C `sampled` flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpanFlags(pub u32);

impl SpanFlags {
    /// The `sampled` bit.
    pub const SAMPLED: SpanFlags = SpanFlags(0x1);

    /// Whether the sampled bit is set.
    pub fn is_sampled(&self) -> bool {
        self.0 & Self::SAMPLED.0 != 0
    }
}

/// A single unit of work within a trace.
///
/// Invariants: `process` is always present; `references` point to
/// `(trace_id, span_id)` pairs; `tags` is sorted lexicographically by key
/// only *after* the adjuster pipeline has run (raw writer input is not
/// required to be pre-sorted).
#[derive(Clone, Debug, PartialEq)]
pub struct Span {
    /// The trace this span belongs to.
    pub trace_id: TraceId,
    /// This span's own id, unique within its trace.
    pub span_id: SpanId,
    /// The operation name.
    pub operation_name: String,
    /// Parent/follows-from references.
    pub references: Vec<SpanRef>,
    /// When the span started.
    pub start_time: SystemTime,
    /// How long the span ran; zero for in-flight or unknown durations.
    pub duration: Duration,
    /// Span-level tags.
    pub tags: Vec<KeyValue>,
    /// Structured log events recorded during the span.
    pub logs: Vec<Log>,
    /// The emitting process.
    pub process: Process,
    /// Sampling and other wire flags.
    pub flags: SpanFlags,
}

impl Span {
    /// The `ChildOf` reference, if any — used by the "resolve ambiguous
    /// parent references" adjuster and by callers reconstructing a
    /// trace's tree shape.
    pub fn parent_span_id(&self) -> Option<SpanId> {
        self.references
            .iter()
            .find(|r| r.ref_type == RefType::ChildOf)
            .map(|r| r.span_id)
    }

    /// Sort `tags` lexicographically by key in place. The mandatory OTel
    /// adjuster keeps the *unpromoted* tags in original relative order,
    /// so this is only ever called where an adjuster explicitly wants
    /// a sorted view.
    pub fn sort_tags(&mut self) {
        self.tags.sort_by(|a, b| a.key.cmp(&b.key));
    }
}

/// A collection of spans sharing one [`TraceId`], plus any adjuster
/// warnings accumulated while normalizing it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trace {
    /// The trace's spans. Invariant: `spans.iter().all(|s| s.trace_id ==
    /// spans[0].trace_id)` whenever non-empty.
    pub spans: Vec<Span>,
    /// Non-fatal adjuster warnings, e.g. "clamped negative duration".
    pub warnings: Vec<String>,
}

impl Trace {
    /// The trace id shared by all spans, if any are present.
    pub fn trace_id(&self) -> Option<TraceId> {
        self.spans.first().map(|s| s.trace_id)
    }

    /// The most recent span start time in the trace, used by the query
    /// engine's result ordering.
    pub fn most_recent_start(&self) -> Option<SystemTime> {
        self.spans.iter().map(|s| s.start_time).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_span_id_prefers_child_of_over_follows_from() {
        let span = Span {
            trace_id: TraceId::new(0, 1),
            span_id: SpanId::new(2),
            operation_name: "op".into(),
            references: vec![
                SpanRef {
                    trace_id: TraceId::new(0, 1),
                    span_id: SpanId::new(10),
                    ref_type: RefType::FollowsFrom,
                },
                SpanRef {
                    trace_id: TraceId::new(0, 1),
                    span_id: SpanId::new(20),
                    ref_type: RefType::ChildOf,
                },
            ],
            start_time: SystemTime::UNIX_EPOCH,
            duration: Duration::ZERO,
            tags: Vec::new(),
            logs: Vec::new(),
            process: Process::new("svc"),
            flags: SpanFlags::default(),
        };
        assert_eq!(span.parent_span_id(), Some(SpanId::new(20)));
    }

    #[test]
    fn span_kind_round_trips_through_wire_strings() {
        for kind in [
            SpanKind::Unspecified,
            SpanKind::Client,
            SpanKind::Server,
            SpanKind::Producer,
            SpanKind::Consumer,
            SpanKind::Internal,
        ] {
            assert_eq!(SpanKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(SpanKind::parse("bogus"), None);
    }
}
