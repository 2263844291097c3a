//! Trace/span data model for the tracestore distributed tracing backend.
//!
//! This crate is pure data and pure functions: no I/O, no `tracing`
//! dependency, no async. Everything downstream (the adjuster pipeline,
//! storage backends, the query engine) builds on the types defined here.

mod dependency;
mod ids;
mod kv;
mod sampling;
mod span;
pub mod tls;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use dependency::DependencyLink;
pub use ids::{SpanId, TraceId, TraceIdParseError};
pub use kv::{KeyValue, Value};
pub use sampling::{ServiceOperationProbabilities, ServiceOperationQPS, Throughput};
pub use span::{
    Log, Operation, Process, RefType, Span, SpanFlags, SpanKind, SpanRef, Trace,
};
pub use tls::TlsNameError;
