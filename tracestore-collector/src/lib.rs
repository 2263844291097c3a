//! The collector/ingester write path: fan-in from receivers through the
//! adjuster pipeline into a storage backend writer, with batching and
//! backpressure; plus a Kafka-fed ingester variant that replays an
//! encoded-span topic through the same path.

mod collector;
mod config;
mod kafka_ingester;
mod receiver;

pub use collector::{Collector, CollectorError};
pub use config::CollectorConfig;
pub use kafka_ingester::{InitialOffset, KafkaIngester, KafkaIngesterError, SpanDecoder};
pub use receiver::Receiver;
