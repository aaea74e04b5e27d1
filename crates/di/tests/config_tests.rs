//! Configuration loading from the environment and from YAML files

use elif_di::{ConfigError, ConfigSource, DiConfig, DiEngine, DiError};
use serial_test::serial;
use std::env;

const VARS: [&str; 3] = [
    "ELIF_DI_MAX_DEPTH",
    "ELIF_DI_LOG_SHADOWED",
    "ELIF_DI_CHECK_ON_CREATE",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_env();

    let config = DiConfig::from_env().unwrap();
    assert_eq!(config, DiConfig::default());

    let sources = config.config_sources();
    assert!(sources.values().all(ConfigSource::is_default));
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_env();
    env::set_var("ELIF_DI_MAX_DEPTH", "12");
    env::set_var("ELIF_DI_LOG_SHADOWED", "false");
    env::set_var("ELIF_DI_CHECK_ON_CREATE", "yes");

    let config = DiConfig::from_env().unwrap();
    assert_eq!(config.max_resolution_depth, Some(12));
    assert!(!config.log_shadowed_providers);
    assert!(config.check_on_create);

    let sources = config.config_sources();
    assert_eq!(
        sources["max_resolution_depth"],
        ConfigSource::EnvVar("ELIF_DI_MAX_DEPTH".to_string())
    );
    assert!(sources["check_on_create"].is_env_var());

    clear_env();
}

#[test]
#[serial]
fn test_from_env_rejects_invalid_values() {
    clear_env();

    env::set_var("ELIF_DI_MAX_DEPTH", "deep");
    let error = DiConfig::from_env().unwrap_err();
    assert_eq!(error.field(), Some("max_resolution_depth"));

    env::set_var("ELIF_DI_MAX_DEPTH", "0");
    assert!(DiConfig::from_env().is_err());

    env::remove_var("ELIF_DI_MAX_DEPTH");
    env::set_var("ELIF_DI_LOG_SHADOWED", "sometimes");
    assert!(DiConfig::from_env().is_err());

    clear_env();
}

#[test]
#[serial]
fn test_from_yaml_file() {
    clear_env();
    let path = env::temp_dir().join(format!("elif-di-config-{}.yaml", std::process::id()));
    std::fs::write(&path, "max_resolution_depth: 16\ncheck_on_create: true\n").unwrap();

    let config = DiConfig::from_yaml_file(&path).unwrap();
    assert_eq!(config.max_resolution_depth, Some(16));
    assert!(config.check_on_create);
    assert!(config.log_shadowed_providers);
    assert_eq!(
        config.config_sources()["max_resolution_depth"],
        ConfigSource::File(path.display().to_string())
    );

    std::fs::remove_file(&path).unwrap();
    assert!(matches!(DiConfig::from_yaml_file(&path), Err(ConfigError::Io { .. })));
}

#[test]
fn test_engine_rejects_invalid_config() {
    let result = DiEngine::builder()
        .config(DiConfig::new().with_max_resolution_depth(0))
        .build();

    match result {
        Err(DiError::Config(ConfigError::InvalidValue { field, .. })) => {
            assert_eq!(field, "max_resolution_depth")
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
