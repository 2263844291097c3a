use std::collections::HashMap;
use std::error::Error;

use serde::Deserialize;

use crate::query_extension::QueryExtensionConfig;
use crate::receiver::ReceiverConfig;
use crate::storage_extension::StorageExtensionConfig;

/// The top-level declarative pipeline shape: receivers plus the
/// recognized extensions. Exporters and processors beyond the adjuster
/// pipeline and write path modeled elsewhere in this workspace are not
/// part of this schema; only the shape a host process needs to stand up
/// storage and querying is captured here.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct PipelineConfig {
    #[serde(default)]
    pub receivers: HashMap<String, ReceiverConfig>,
    pub extensions: ExtensionsConfig,
}

/// The recognized extensions: storage and query.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ExtensionsConfig {
    pub storage: StorageExtensionConfig,
    pub query: QueryExtensionConfig,
}

impl PipelineConfig {
    /// Parse a pipeline configuration from a YAML string.
    pub fn from_yaml(yaml_str: &str) -> Result<Self, Box<dyn Error>> {
        let config: PipelineConfig = serde_yaml::from_str(yaml_str)?;
        Ok(config)
    }

    /// Parse a pipeline configuration from a YAML file on disk.
    pub fn from_yaml_file(file_path: &str) -> Result<Self, Box<dyn Error>> {
        let yaml_str = std::fs::read_to_string(file_path)?;
        Self::from_yaml(&yaml_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_pipeline() {
        let yaml = r#"
        receivers:
          otlp: otlp
          ingest:
            kafka:
              brokers: ["localhost:9092"]
              topic: spans
              encoding: otlp_proto
              initial_offset: earliest
        extensions:
          storage:
            primary:
              memory:
                max_traces: 50000
          query:
            trace_storage: primary
        "#;
        let config = PipelineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.receivers.len(), 2);
        assert_eq!(config.extensions.query.trace_storage, "primary");
        assert_eq!(config.extensions.storage.backends.len(), 1);
    }
}
