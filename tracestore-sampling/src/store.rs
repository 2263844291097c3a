use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use tracestore_model::{ServiceOperationProbabilities, ServiceOperationQPS, Throughput};
use tracestore_storage::{SamplingStore, StorageError, StorageResult};

/// One bucket of accumulated throughput, keyed by (service, operation).
#[derive(Default)]
struct ThroughputBucket {
    start: SystemTime,
    rows: HashMap<(String, String), Throughput>,
}

/// One probabilities/QPS snapshot written by a host.
struct Snapshot {
    host: String,
    timestamp: SystemTime,
    probabilities: ServiceOperationProbabilities,
    #[allow(dead_code)]
    qps: ServiceOperationQPS,
}

struct Inner {
    bucket_width: Duration,
    buckets: Vec<ThroughputBucket>,
    snapshots: Vec<Snapshot>,
}

/// An in-process implementation of [`SamplingStore`]: a time-bucketed
/// throughput accumulator plus an append-only snapshot log.
///
/// Snapshots are never merged — `get_latest_probabilities` always
/// returns exactly one snapshot's contents wholesale, never a per-key
/// merge of several. When two snapshots share a timestamp, the one with
/// the lexicographically greater hostname wins; this tie-break is
/// arbitrary but deterministic, per the open question in the design notes.
pub struct InMemorySamplingStore {
    inner: Mutex<Inner>,
}

impl InMemorySamplingStore {
    /// Build a store bucketing throughput at `bucket_width` (suggested:
    /// one minute).
    pub fn new(bucket_width: Duration) -> Self {
        InMemorySamplingStore {
            inner: Mutex::new(Inner {
                bucket_width,
                buckets: Vec::new(),
                snapshots: Vec::new(),
            }),
        }
    }
}

impl Default for InMemorySamplingStore {
    fn default() -> Self {
        InMemorySamplingStore::new(Duration::from_secs(60))
    }
}

fn bucket_start(ts: SystemTime, width: Duration, epoch: SystemTime) -> SystemTime {
    let since_epoch = ts.duration_since(epoch).unwrap_or(Duration::ZERO);
    let width_secs = width.as_secs().max(1);
    let bucket_index = since_epoch.as_secs() / width_secs;
    epoch + Duration::from_secs(bucket_index * width_secs)
}

#[async_trait]
impl SamplingStore for InMemorySamplingStore {
    async fn insert_throughput(&self, throughput: Vec<Throughput>) -> StorageResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let now = SystemTime::now();
        let width = inner.bucket_width;
        let start = bucket_start(now, width, SystemTime::UNIX_EPOCH);

        let bucket = match inner.buckets.iter_mut().find(|b| b.start == start) {
            Some(b) => b,
            None => {
                inner.buckets.push(ThroughputBucket { start, rows: HashMap::new() });
                inner.buckets.last_mut().unwrap()
            }
        };

        for t in throughput {
            let key = (t.service.clone(), t.operation.clone());
            let entry = bucket.rows.entry(key).or_insert_with(|| Throughput {
                service: t.service.clone(),
                operation: t.operation.clone(),
                count: 0,
                probabilities: Vec::new(),
            });
            entry.count += t.count;
            for p in t.probabilities {
                if !entry.probabilities.contains(&p) {
                    entry.probabilities.push(p);
                }
            }
        }
        Ok(())
    }

    async fn get_throughput(
        &self,
        start: SystemTime,
        end: SystemTime,
    ) -> StorageResult<Vec<Throughput>> {
        if start > end {
            return Err(StorageError::InvalidQuery(
                "throughput range start must not be after end".into(),
            ));
        }
        let inner = self.inner.lock().unwrap();
        let width = inner.bucket_width;
        let rows = inner
            .buckets
            .iter()
            .filter(|b| b.start + width > start && b.start < end)
            .flat_map(|b| b.rows.values().cloned())
            .collect();
        Ok(rows)
    }

    async fn insert_probabilities_and_qps(
        &self,
        hostname: &str,
        probabilities: ServiceOperationProbabilities,
        qps: ServiceOperationQPS,
    ) -> StorageResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.snapshots.push(Snapshot {
            host: hostname.to_string(),
            timestamp: SystemTime::now(),
            probabilities,
            qps,
        });
        Ok(())
    }

    async fn get_latest_probabilities(&self) -> StorageResult<ServiceOperationProbabilities> {
        let inner = self.inner.lock().unwrap();
        let latest = inner
            .snapshots
            .iter()
            .max_by(|a, b| (a.timestamp, &a.host).cmp(&(b.timestamp, &b.host)));
        Ok(latest.map(|s| s.probabilities.clone()).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn latest_snapshot_wins_wholesale_not_merged() {
        let store = InMemorySamplingStore::default();

        let mut probs_a = ServiceOperationProbabilities::new();
        probs_a.insert("new-srv3".into(), [("op".into(), 0.123)].into_iter().collect());
        store
            .insert_probabilities_and_qps("A", probs_a, ServiceOperationQPS::new())
            .await
            .unwrap();

        let mut probs_b = ServiceOperationProbabilities::new();
        probs_b.insert("new-srv".into(), [("op".into(), 0.1)].into_iter().collect());
        store
            .insert_probabilities_and_qps("B", probs_b.clone(), ServiceOperationQPS::new())
            .await
            .unwrap();

        let latest = store.get_latest_probabilities().await.unwrap();
        assert_eq!(latest, probs_b);
    }

    #[tokio::test]
    async fn insert_throughput_accumulates_counts_for_same_bucket() {
        let store = InMemorySamplingStore::default();
        store
            .insert_throughput(vec![Throughput {
                service: "svc".into(),
                operation: "op".into(),
                count: 5,
                probabilities: vec!["0.1".into()],
            }])
            .await
            .unwrap();
        store
            .insert_throughput(vec![Throughput {
                service: "svc".into(),
                operation: "op".into(),
                count: 3,
                probabilities: vec!["0.1".into()],
            }])
            .await
            .unwrap();

        let now = SystemTime::now();
        let rows = store
            .get_throughput(now - Duration::from_secs(120), now + Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].count, 8);
    }
}
