use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::KafkaError;
use rdkafka::Message;
use thiserror::Error;

use crate::collector::{Collector, CollectorError};

/// Where consumption starts when the ingester has no committed offset
/// yet, mirroring the Kafka receiver's `initial_offset` setting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitialOffset {
    Earliest,
    Latest,
}

impl InitialOffset {
    fn as_auto_offset_reset(self) -> &'static str {
        match self {
            InitialOffset::Earliest => "earliest",
            InitialOffset::Latest => "latest",
        }
    }
}

/// Decodes one Kafka message payload into a span, handed to
/// [`KafkaIngester`] so this crate stays agnostic of the wire encoding
/// (`otlp_proto` or otherwise) named in the Kafka receiver config.
pub trait SpanDecoder: Send + Sync {
    /// Decode `payload` into a span, or `None` if it can't be decoded.
    fn decode(&self, payload: &[u8]) -> Option<tracestore_model::Span>;
}

/// Error constructing or running a [`KafkaIngester`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum KafkaIngesterError {
    #[error("kafka client error: {0}")]
    Client(#[from] KafkaError),
}

/// Consumes a topic of encoded spans and replays them through the same
/// write path a [`Collector`] serves for live receivers.
pub struct KafkaIngester<D: SpanDecoder> {
    consumer: StreamConsumer,
    decoder: D,
}

impl<D: SpanDecoder> KafkaIngester<D> {
    /// Build an ingester subscribed to `topic` on `brokers`, starting
    /// from `initial_offset` when no committed offset exists yet.
    pub fn new(
        brokers: &str,
        group_id: &str,
        topic: &str,
        initial_offset: InitialOffset,
        decoder: D,
    ) -> Result<Self, KafkaIngesterError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group_id)
            .set("enable.auto.commit", "true")
            .set("auto.offset.reset", initial_offset.as_auto_offset_reset())
            .create()?;
        consumer.subscribe(&[topic])?;
        Ok(KafkaIngester { consumer, decoder })
    }

    /// Consume one message and replay it through `collector`. Returns
    /// `Ok(false)` when the message could not be decoded (skipped, not
    /// fatal); `Ok(true)` when a span was submitted.
    pub async fn ingest_one(&self, collector: &Collector) -> Result<bool, KafkaIngesterError> {
        let message = self.consumer.recv().await?;
        let Some(payload) = message.payload() else {
            return Ok(false);
        };
        let Some(span) = self.decoder.decode(payload) else {
            tracing::warn!("kafka ingester: dropped undecodable message");
            return Ok(false);
        };
        match collector.submit(span) {
            Ok(()) => Ok(true),
            Err(CollectorError::QueueFull) => {
                tracing::warn!("kafka ingester: collector queue full, message will be redelivered");
                Ok(false)
            }
            Err(CollectorError::Closed) => Ok(false),
        }
    }
}
