//! A Cassandra-backed implementation of the span and dependency storage
//! contract, built on the `scylla` driver (CQL-native, works against both
//! Cassandra and ScyllaDB clusters). Grounded in Jaeger's production
//! Cassandra schema, simplified to JSON-text columns — see
//! [`schema`] for the trade-off this makes.
//!
//! Adaptive sampling storage is intentionally not implemented here: Jaeger
//! itself keeps that state in a separate, much smaller keyspace read far
//! more often than it's written, and this workspace models it instead as
//! its own in-memory store (`tracestore-sampling`).

mod backend;
mod schema;

pub use backend::CassandraBackend;
