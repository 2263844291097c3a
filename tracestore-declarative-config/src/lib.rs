//! Declarative pipeline configuration: receivers, the storage extension,
//! and the query extension, deserialized from YAML. Parsing and
//! validation only — wiring a running pipeline from this shape is a host
//! process concern out of scope here.

mod pipeline;
mod query_extension;
mod receiver;
mod storage_extension;

pub use pipeline::{ExtensionsConfig, PipelineConfig};
pub use query_extension::QueryExtensionConfig;
pub use receiver::{KafkaEncoding, KafkaInitialOffset, KafkaReceiverConfig, ReceiverConfig};
pub use storage_extension::{
    CassandraBackendConfig, MemoryBackendConfig, OpenSearchBackendConfig, StorageBackendConfig,
    StorageExtensionConfig,
};
