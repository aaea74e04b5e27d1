use crate::config::{ConfigError, ConfigSource};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::Path;

const ENV_MAX_DEPTH: &str = "ELIF_DI_MAX_DEPTH";
const ENV_LOG_SHADOWED: &str = "ELIF_DI_LOG_SHADOWED";
const ENV_CHECK_ON_CREATE: &str = "ELIF_DI_CHECK_ON_CREATE";

/// Settings shared by every injector of a [`DiEngine`](crate::DiEngine)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiConfig {
    /// Longest construction chain a single `get` may build, unbounded when
    /// not set
    pub max_resolution_depth: Option<usize>,
    /// Log at debug level when a later declaration shadows an earlier one
    pub log_shadowed_providers: bool,
    /// Dry-run every provider's dependencies when an injector is created
    pub check_on_create: bool,
    #[serde(skip)]
    loaded_from: Option<String>,
}

impl DiConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self {
            max_resolution_depth: None,
            log_shadowed_providers: true,
            check_on_create: false,
            loaded_from: None,
        }
    }

    pub fn with_max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = Some(depth);
        self
    }

    pub fn with_log_shadowed_providers(mut self, enabled: bool) -> Self {
        self.log_shadowed_providers = enabled;
        self
    }

    pub fn with_check_on_create(mut self, enabled: bool) -> Self {
        self.check_on_create = enabled;
        self
    }

    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new();

        if let Ok(depth) = env::var(ENV_MAX_DEPTH) {
            let limit = depth.parse().map_err(|_| {
                ConfigError::invalid_value(
                    "max_resolution_depth",
                    depth.as_str(),
                    "positive integer",
                )
            })?;
            config.max_resolution_depth = Some(limit);
        }

        if let Ok(value) = env::var(ENV_LOG_SHADOWED) {
            config.log_shadowed_providers = parse_flag("log_shadowed_providers", &value)?;
        }

        if let Ok(value) = env::var(ENV_CHECK_ON_CREATE) {
            config.check_on_create = parse_flag("check_on_create", &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML document; missing fields take their defaults
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: DiConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_yaml_str(&contents)?;
        config.loaded_from = Some(path.display().to_string());
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_resolution_depth == Some(0) {
            return Err(ConfigError::invalid_value(
                "max_resolution_depth",
                "0",
                "a depth of at least 1",
            ));
        }
        Ok(())
    }

    /// Get configuration source information for debugging
    pub fn config_sources(&self) -> HashMap<String, ConfigSource> {
        let defaults = Self::new();
        let mut sources = HashMap::new();

        sources.insert(
            "max_resolution_depth".to_string(),
            self.source_of(
                ENV_MAX_DEPTH,
                self.max_resolution_depth == defaults.max_resolution_depth,
                "unlimited".to_string(),
            ),
        );
        sources.insert(
            "log_shadowed_providers".to_string(),
            self.source_of(
                ENV_LOG_SHADOWED,
                self.log_shadowed_providers == defaults.log_shadowed_providers,
                defaults.log_shadowed_providers.to_string(),
            ),
        );
        sources.insert(
            "check_on_create".to_string(),
            self.source_of(
                ENV_CHECK_ON_CREATE,
                self.check_on_create == defaults.check_on_create,
                defaults.check_on_create.to_string(),
            ),
        );

        sources
    }

    fn source_of(&self, var: &str, is_default: bool, default: String) -> ConfigSource {
        if env::var(var).is_ok() {
            ConfigSource::EnvVar(var.to_string())
        } else if is_default {
            ConfigSource::Default(default)
        } else if let Some(path) = &self.loaded_from {
            ConfigSource::File(path.clone())
        } else {
            ConfigSource::Programmatic
        }
    }
}

impl Default for DiConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_flag(field: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid_value(field, value, "true or false")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DiConfig::default();
        assert_eq!(config.max_resolution_depth, None);
        assert!(config.log_shadowed_providers);
        assert!(!config.check_on_create);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_depth_is_rejected() {
        let config = DiConfig::new().with_max_resolution_depth(0);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_yaml_with_partial_fields() {
        let config = DiConfig::from_yaml_str("max_resolution_depth: 8\n").unwrap();
        assert_eq!(config.max_resolution_depth, Some(8));
        assert!(config.log_shadowed_providers);
    }

    #[test]
    fn test_yaml_errors() {
        assert!(matches!(
            DiConfig::from_yaml_str("max_resolution_depth: [1, 2]"),
            Err(ConfigError::Yaml(_))
        ));
        assert!(matches!(
            DiConfig::from_yaml_str("max_resolution_depth: 0"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_yaml_null_depth_is_unlimited() {
        let yaml = "max_resolution_depth: ~\ncheck_on_create: true\n";
        let config = DiConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.max_resolution_depth, None);
        assert!(config.check_on_create);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("f", "TRUE").unwrap());
        assert!(!parse_flag("f", "off").unwrap());
        assert!(parse_flag("f", "maybe").is_err());
    }

    #[test]
    fn test_programmatic_source() {
        let config = DiConfig::new().with_check_on_create(true);
        let sources = config.config_sources();
        assert_eq!(sources["check_on_create"], ConfigSource::Programmatic);
    }
}
