use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use tracestore_model::Value;

use crate::error::{StorageError, StorageResult};

/// The default cap on traces returned by a query when the caller doesn't
/// specify one.
pub const DEFAULT_NUM_TRACES: usize = 20;

/// A single `FindTraces`/`FindTraceIDs` query.
///
/// Constructed via [`TraceQueryParameters::new`], which enforces the
/// invariants validated by [`TraceQueryParameters::validate`] so an
/// already-constructed value is always well-formed.
#[derive(Clone, Debug, PartialEq)]
pub struct TraceQueryParameters {
    /// Required, non-empty.
    pub service_name: String,
    /// Optional operation name filter.
    pub operation_name: Option<String>,
    /// Tags that must all match, by typed equality, against a span's own
    /// tags or its process tags.
    pub tags: HashMap<String, Value>,
    /// Inclusive lower bound on span start time.
    pub start_time_min: SystemTime,
    /// Inclusive upper bound on span start time. Must be `>= start_time_min`.
    pub start_time_max: SystemTime,
    /// Optional inclusive lower bound on span duration.
    pub duration_min: Option<Duration>,
    /// Optional inclusive upper bound on span duration. When both bounds
    /// are present, `duration_min <= duration_max`.
    pub duration_max: Option<Duration>,
    /// Caps the number of traces returned, not spans. Defaults to
    /// [`DEFAULT_NUM_TRACES`]; must be `>= 1`.
    pub num_traces: usize,
}

impl TraceQueryParameters {
    /// Construct a query with `num_traces` defaulted, then validate it.
    pub fn new(
        service_name: impl Into<String>,
        start_time_min: SystemTime,
        start_time_max: SystemTime,
    ) -> StorageResult<Self> {
        let params = TraceQueryParameters {
            service_name: service_name.into(),
            operation_name: None,
            tags: HashMap::new(),
            start_time_min,
            start_time_max,
            duration_min: None,
            duration_max: None,
            num_traces: DEFAULT_NUM_TRACES,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check the invariants spelled out in the query engine's contract:
    /// non-empty service name, `start_time_min <= start_time_max`,
    /// `duration_min <= duration_max` when both present, `num_traces >= 1`.
    pub fn validate(&self) -> StorageResult<()> {
        if self.service_name.is_empty() {
            return Err(StorageError::InvalidQuery(
                "service_name must not be empty".into(),
            ));
        }
        if self.start_time_min > self.start_time_max {
            return Err(StorageError::InvalidQuery(
                "start_time_min must not be after start_time_max".into(),
            ));
        }
        if let (Some(min), Some(max)) = (self.duration_min, self.duration_max) {
            if min > max {
                return Err(StorageError::InvalidQuery(
                    "duration_min must not exceed duration_max".into(),
                ));
            }
        }
        if self.num_traces == 0 {
            return Err(StorageError::InvalidQuery(
                "num_traces must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_service_name() {
        let now = SystemTime::now();
        assert!(TraceQueryParameters::new("", now, now).is_err());
    }

    #[test]
    fn rejects_inverted_time_range() {
        let now = SystemTime::now();
        let later = now + Duration::from_secs(1);
        assert!(TraceQueryParameters::new("svc", later, now).is_err());
    }

    #[test]
    fn accepts_a_well_formed_query() {
        let now = SystemTime::now();
        assert!(TraceQueryParameters::new("svc", now, now).is_ok());
    }
}
