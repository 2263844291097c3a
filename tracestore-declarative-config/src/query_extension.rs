use serde::Deserialize;

/// The query extension: which named storage backend (from the storage
/// extension) serves reads, an optional archive backend, and where the
/// UI's own configuration file lives.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct QueryExtensionConfig {
    pub trace_storage: String,
    #[serde(default)]
    pub trace_storage_archive: Option<String>,
    #[serde(default)]
    pub ui_config_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_optional_fields_absent() {
        let yaml = r#"
        trace_storage: primary
        "#;
        let config: QueryExtensionConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.trace_storage, "primary");
        assert!(config.trace_storage_archive.is_none());
    }

    #[test]
    fn parses_with_archive_and_ui_config() {
        let yaml = r#"
        trace_storage: primary
        trace_storage_archive: archive
        ui_config_path: /etc/tracestore/ui.json
        "#;
        let config: QueryExtensionConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.trace_storage_archive.as_deref(), Some("archive"));
    }
}
