//! Configuration for the hangar CLI

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// CLI settings, layered defaults -> file -> `HANGAR__*` environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Defaults applied when a flag is not given
    #[serde(default)]
    pub defaults: DeployDefaults,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Deploy flag defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeployDefaults {
    /// Wait timeout, humantime syntax
    #[serde(default)]
    pub wait_timeout: Option<String>,

    /// Lease timeout, humantime syntax
    #[serde(default)]
    pub lease_timeout: Option<String>,

    #[serde(default)]
    pub vm_size: Option<String>,

    #[serde(default)]
    pub strategy: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl DeployDefaults {
    pub fn wait_timeout(&self) -> anyhow::Result<Option<Duration>> {
        parse_optional_duration("defaults.wait_timeout", self.wait_timeout.as_deref())
    }

    pub fn lease_timeout(&self) -> anyhow::Result<Option<Duration>> {
        parse_optional_duration("defaults.lease_timeout", self.lease_timeout.as_deref())
    }
}

fn parse_optional_duration(key: &str, value: Option<&str>) -> anyhow::Result<Option<Duration>> {
    value
        .filter(|v| !v.is_empty())
        .map(|v| {
            humantime::parse_duration(v)
                .map_err(|e| anyhow::anyhow!("invalid duration for {}: '{}': {}", key, v, e))
        })
        .transpose()
}

impl CliConfig {
    /// Load configuration from file
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        // Add default configuration
        builder = builder.add_source(config::Config::try_from(&CliConfig::default())?);

        // Add file configuration if provided
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // Add environment variables with HANGAR__ prefix; keys contain underscores
        builder = builder.add_source(
            config::Environment::with_prefix("HANGAR")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.logging.level, "warn");
        assert!(!config.logging.json);
        assert!(config.defaults.vm_size.is_none());
    }

    #[test]
    fn test_duration_defaults_parse() {
        let defaults = DeployDefaults {
            wait_timeout: Some("5m".into()),
            lease_timeout: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(defaults.wait_timeout().unwrap(), Some(Duration::from_secs(300)));
        assert_eq!(defaults.lease_timeout().unwrap(), None);

        let defaults = DeployDefaults {
            wait_timeout: Some("soon".into()),
            ..Default::default()
        };
        assert!(defaults.wait_timeout().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hangar.toml");
        std::fs::write(
            &path,
            "[defaults]\nvm_size = \"shared-cpu-2x\"\n\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let config = CliConfig::load(path.to_str()).unwrap();
        assert_eq!(config.defaults.vm_size.as_deref(), Some("shared-cpu-2x"));
        assert_eq!(config.logging.level, "debug");
    }
}
