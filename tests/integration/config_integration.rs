//! Integration tests for Configuration System

use beanctx::config::{BeanctxConfig, ConfigLoader};
use beanctx::session::{SessionContext, StandardSession, StoreStrategy};
use serial_test::serial;
use tempfile::TempDir;

#[test]
#[serial]
fn test_configured_wrapper_selects_store_strategy() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("beanctx.toml");
    std::fs::write(
        &config_file,
        r#"
[session_context]
wrapper = "http-session"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    assert!(config.validate().is_ok());

    let context = SessionContext::new(
        Some(StandardSession::shared("s1")),
        &config.session_context,
    );
    assert_eq!(context.strategy(), StoreStrategy::Generic);
}

#[test]
#[serial]
fn test_workspace_without_config_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = ConfigLoader::load(temp_dir.path()).unwrap();
    assert_eq!(config.session_context, BeanctxConfig::default().session_context);

    let context = SessionContext::new(
        Some(StandardSession::shared("s1")),
        &config.session_context,
    );
    assert_eq!(context.strategy(), StoreStrategy::Direct);
}

#[test]
#[serial]
fn test_missing_explicit_config_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    assert!(ConfigLoader::load_from_file(&temp_dir.path().join("absent.toml")).is_err());
}

#[test]
#[serial]
fn test_malformed_config_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("beanctx.toml");
    std::fs::write(&config_file, "[session_context\nwrapper = ").unwrap();
    assert!(ConfigLoader::load_from_file(&config_file).is_err());
}
