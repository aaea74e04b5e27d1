/// Where a [`DiConfig`](crate::DiConfig) field got its value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `ELIF_DI_*` environment variable
    EnvVar(String),
    /// Built-in default, rendered
    Default(String),
    /// YAML file the configuration was loaded from
    File(String),
    /// Set through a `with_*` builder method or by field assignment
    Programmatic,
}

impl ConfigSource {
    pub fn is_env_var(&self) -> bool {
        matches!(self, ConfigSource::EnvVar(_))
    }

    pub fn is_default(&self) -> bool {
        matches!(self, ConfigSource::Default(_))
    }

    pub fn description(&self) -> String {
        match self {
            ConfigSource::EnvVar(var) => format!("environment variable {}", var),
            ConfigSource::Default(value) => format!("default ({})", value),
            ConfigSource::File(path) => format!("file {}", path),
            ConfigSource::Programmatic => "set in code".to_string(),
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.description())
    }
}
