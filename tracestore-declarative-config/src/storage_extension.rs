use std::collections::HashMap;

use serde::Deserialize;

/// An in-memory backend's configuration.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MemoryBackendConfig {
    #[serde(default = "default_max_traces")]
    pub max_traces: usize,
}

fn default_max_traces() -> usize {
    100_000
}

/// A Cassandra-backed backend's configuration.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CassandraBackendConfig {
    pub keyspace: String,
    pub username: String,
    pub password: String,
}

/// An OpenSearch-backed backend's configuration.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct OpenSearchBackendConfig {
    pub index_prefix: String,
}

/// One named backend in the storage extension.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendConfig {
    Memory(MemoryBackendConfig),
    Cassandra(CassandraBackendConfig),
    #[serde(rename = "opensearch")]
    OpenSearch(OpenSearchBackendConfig),
}

/// The storage extension: a set of named backends the query extension
/// and receivers' write paths reference by name.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct StorageExtensionConfig {
    #[serde(flatten)]
    pub backends: HashMap<String, StorageBackendConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_backend_defaults_max_traces() {
        let yaml = r#"
        memory: {}
        "#;
        let backend: StorageBackendConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            backend,
            StorageBackendConfig::Memory(MemoryBackendConfig { max_traces: 100_000 })
        );
    }

    #[test]
    fn cassandra_backend_parses_required_fields() {
        let yaml = r#"
        cassandra:
          keyspace: jaeger_v1
          username: jaeger
          password: secret
        "#;
        let backend: StorageBackendConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            backend,
            StorageBackendConfig::Cassandra(CassandraBackendConfig {
                keyspace: "jaeger_v1".into(),
                username: "jaeger".into(),
                password: "secret".into(),
            })
        );
    }
}
