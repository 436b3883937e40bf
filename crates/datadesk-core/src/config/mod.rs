//! Configuration types for the DataDesk console.
//!
//! The whole configuration lives in a single YAML file (`datadesk.yaml` by
//! convention) and deserializes into [`DataDeskConfig`]. Every section has
//! serde defaults so a minimal file only needs the upstream connection.

pub mod audit;
pub mod bootstrap;
pub mod console;
pub mod upstream;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use audit::AuditConfig;
pub use bootstrap::BootstrapConfig;
pub use console::ConsoleConfig;
pub use upstream::UpstreamConfig;

/// Complete DataDesk configuration loaded from a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataDeskConfig {
    /// Optional project name, shown in page titles.
    #[serde(default)]
    pub project: Option<String>,

    /// Upstream Postgres connection.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Web console settings.
    #[serde(default)]
    pub console: ConsoleConfig,

    /// Audit logging configuration.
    #[serde(default)]
    pub audit: AuditConfig,

    /// First-run admin account bootstrap.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("configuration error: {0}")]
    Invalid(String),
}

impl DataDeskConfig {
    /// Load configuration from a YAML file.
    ///
    /// A missing or unreadable file is an error; the caller is expected to
    /// treat it as fatal before serving anything.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Check whether a table is hidden from the data browser.
    pub fn is_table_hidden(&self, table: &str) -> bool {
        self.console.hidden_tables.iter().any(|t| t == table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_parses_with_defaults() {
        let yaml = r#"
upstream:
  host: db.internal
  database: metrics
  username: desk
  password: secret
"#;
        let config = DataDeskConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.upstream.host, "db.internal");
        assert_eq!(config.upstream.port, 5432);
        assert_eq!(config.console.listen_port, 8080);
        assert!(config.audit.enabled);
        assert_eq!(config.bootstrap.admin_username, "admin");
        assert!(config.is_table_hidden("users"));
    }

    #[test]
    fn hidden_tables_can_be_overridden() {
        let yaml = r#"
console:
  hidden_tables: []
"#;
        let config = DataDeskConfig::from_yaml(yaml).unwrap();
        assert!(!config.is_table_hidden("users"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = DataDeskConfig::from_file("/nonexistent/datadesk.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
