//! An OpenSearch-backed implementation of the span and dependency storage
//! contract. Spans and dependency snapshots are stored as JSON documents
//! in daily indices named after `index_prefix`, the same partitioning
//! scheme Jaeger's Elasticsearch/OpenSearch storage uses.

mod backend;
mod doc;
mod indices;

pub use backend::OpenSearchBackend;
