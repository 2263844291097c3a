//! Adaptive sampling: a throughput accumulator and append-only
//! probability snapshot log feeding the remote sampling strategy wire
//! contract.

mod store;
mod wire;

pub use store::InMemorySamplingStore;
pub use wire::{
    OperationSamplingStrategy, PerOperationSamplingStrategies, ProbabilisticSamplingStrategy,
    RateLimitingSamplingStrategy, SamplingError, SamplingStrategyParameters,
    SamplingStrategyResponse, SamplingStrategyType,
};
