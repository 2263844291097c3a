use std::collections::HashMap;

/// Per-(service, operation) call volume observed over a sampling interval,
/// the raw input to the adaptive sampling store's probability calculation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Throughput {
    /// The service name.
    pub service: String,
    /// The operation name.
    pub operation: String,
    /// Number of spans observed for this (service, operation) pair.
    pub count: u64,
    /// Distinct probabilities spans in this bucket were sampled with,
    /// needed to reconstruct an unbiased rate when probabilities changed
    /// mid-interval.
    pub probabilities: Vec<String>,
}

/// Sampling probabilities for every operation of a service, keyed by
/// operation name. Mirrors the shape stored in a sampling store snapshot.
pub type ServiceOperationProbabilities = HashMap<String, HashMap<String, f64>>;

/// Observed queries-per-second for every operation of a service, keyed the
/// same way as [`ServiceOperationProbabilities`].
pub type ServiceOperationQPS = HashMap<String, HashMap<String, f64>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throughput_defaults_to_empty() {
        let t = Throughput::default();
        assert_eq!(t.count, 0);
        assert!(t.probabilities.is_empty());
    }
}
