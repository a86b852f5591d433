//! Configuration loading from entitle.toml.

use entitlement::Profile;
use serde::Deserialize;
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Entitlements to apply.
    #[serde(flatten)]
    pub profile: Profile,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Default log filter when `RUST_LOG` is not set.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load `path` if it exists, otherwise fall back to the restrictive profile.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default_config())
        }
    }

    /// Create a default configuration.
    pub fn default_config() -> Self {
        Self {
            logging: LoggingConfig::default(),
            profile: Profile::restrictive(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
[logging]
level = "debug"

[[entitlement]]
domain = "network"
identifier = "mode"
value = "host"
"#;
        let config = Config::parse(toml).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.profile.entitlements.len(), 1);
        assert_eq!(config.profile.entitlements[0].domain, "network");
    }

    #[test]
    fn test_logging_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.logging.level, "warn");
        assert!(config.profile.entitlements.is_empty());
    }

    #[test]
    fn test_missing_file_uses_restrictive_profile() {
        let config = Config::load_or_default("does/not/exist/entitle.toml").unwrap();
        assert_eq!(
            config.profile.entitlements.len(),
            Profile::restrictive().entitlements.len()
        );
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            Config::parse("logging = 3\n[[entitlement"),
            Err(ConfigError::Parse(_))
        ));
    }
}
