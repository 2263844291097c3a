use async_trait::async_trait;
use tracestore_model::Span;

/// The reduced stand-in for a protocol-specific wire receiver (OTLP,
/// Jaeger, Zipkin): something that can hand the collector a stream of
/// already-decoded spans. The protocol codec itself is out of scope.
#[async_trait]
pub trait Receiver: Send {
    /// Produce the next span, or `None` once the receiver is exhausted
    /// (e.g. its transport closed).
    async fn recv(&mut self) -> Option<Span>;
}
