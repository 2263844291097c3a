/// Wire contract returned to a client sampler requesting a strategy for
/// one service. This type should be treated as a union where only one of
/// the `*_sampling` fields is populated; `strategy_type` exists for
/// legacy consumers that switch on it instead of checking for presence.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SamplingStrategyResponse {
    pub strategy_type: SamplingStrategyType,
    pub probabilistic_sampling: Option<ProbabilisticSamplingStrategy>,
    pub rate_limiting_sampling: Option<RateLimitingSamplingStrategy>,
    pub operation_sampling: Option<PerOperationSamplingStrategies>,
}

/// See [`SamplingStrategyResponse::strategy_type`].
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SamplingStrategyType {
    Probabilistic,
    RateLimiting,
}

/// Samples traces with a fixed probability.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProbabilisticSamplingStrategy {
    /// Sampling probability in `[0.0, 1.0]`.
    pub sampling_rate: f64,
}

/// Samples a fixed number of traces per second via a leaky bucket.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitingSamplingStrategy {
    pub max_traces_per_second: i32,
}

/// A strategy for one operation within a service.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OperationSamplingStrategy {
    pub operation: String,
    pub probabilistic_sampling: ProbabilisticSamplingStrategy,
}

/// A combination of per-operation strategies plus service-wide defaults,
/// useful when a service's endpoints receive vastly different traffic.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerOperationSamplingStrategies {
    pub default_sampling_probability: f64,
    pub default_lower_bound_traces_per_second: f64,
    pub per_operation_strategies: Vec<OperationSamplingStrategy>,
    pub default_upper_bound_traces_per_second: f64,
}

/// Request parameters for the remote sampler endpoint.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SamplingStrategyParameters {
    pub service_name: String,
}

/// Error returned by the remote sampling strategy service, using the
/// stable wire strings callers match on.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SamplingError {
    #[error("failed to get sampling strategy")]
    StrategyUnavailable,
    #[error("baggage not implemented")]
    BaggageNotImplemented,
}
