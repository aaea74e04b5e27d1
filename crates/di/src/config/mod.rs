//! Engine configuration: defaults, `ELIF_DI_*` environment variables or YAML

pub mod di_config;
pub mod error;
pub mod sources;

pub use di_config::DiConfig;
pub use error::ConfigError;
pub use sources::ConfigSource;
