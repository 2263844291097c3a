use std::env;
use std::str::FromStr;
use std::time::Duration;

const OTS_COLLECTOR_MAX_QUEUE_SIZE: &str = "OTS_COLLECTOR_MAX_QUEUE_SIZE";
const OTS_COLLECTOR_MAX_QUEUE_SIZE_DEFAULT: usize = 2_048;
const OTS_COLLECTOR_SCHEDULE_DELAY: &str = "OTS_COLLECTOR_SCHEDULE_DELAY";
const OTS_COLLECTOR_SCHEDULE_DELAY_DEFAULT: u64 = 1_000;
const OTS_COLLECTOR_MAX_EXPORT_BATCH_SIZE: &str = "OTS_COLLECTOR_MAX_EXPORT_BATCH_SIZE";
const OTS_COLLECTOR_MAX_EXPORT_BATCH_SIZE_DEFAULT: usize = 512;

/// Batching and backpressure configuration for [`crate::Collector`],
/// overridable via `OTS_COLLECTOR_*` environment variables.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Bound on the number of spans buffered between receivers and the
    /// worker thread. Once full, [`crate::Collector::submit`] returns a
    /// retryable error rather than blocking the receiver.
    pub max_queue_size: usize,
    /// How often the worker flushes a partial batch to the writer.
    pub scheduled_delay: Duration,
    /// Maximum spans written per `SpanWriter::write_trace` call.
    pub max_export_batch_size: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        let mut config = CollectorConfig {
            max_queue_size: OTS_COLLECTOR_MAX_QUEUE_SIZE_DEFAULT,
            scheduled_delay: Duration::from_millis(OTS_COLLECTOR_SCHEDULE_DELAY_DEFAULT),
            max_export_batch_size: OTS_COLLECTOR_MAX_EXPORT_BATCH_SIZE_DEFAULT,
        };

        if let Some(max_queue_size) = env::var(OTS_COLLECTOR_MAX_QUEUE_SIZE)
            .ok()
            .and_then(|v| usize::from_str(&v).ok())
        {
            config.max_queue_size = max_queue_size;
        }

        if let Some(scheduled_delay) = env::var(OTS_COLLECTOR_SCHEDULE_DELAY)
            .ok()
            .and_then(|v| u64::from_str(&v).ok())
        {
            config.scheduled_delay = Duration::from_millis(scheduled_delay);
        }

        if let Some(max_export_batch_size) = env::var(OTS_COLLECTOR_MAX_EXPORT_BATCH_SIZE)
            .ok()
            .and_then(|v| usize::from_str(&v).ok())
        {
            config.max_export_batch_size = max_export_batch_size;
        }

        if config.max_export_batch_size > config.max_queue_size {
            config.max_export_batch_size = config.max_queue_size;
        }

        config
    }
}
