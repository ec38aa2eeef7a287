//! Configuration loading and graceful degradation
//!
//! Tests cover:
//! - Missing config file falls back to compiled defaults and says so
//! - Present config file is parsed, malformed file is an error
//! - Command-line overrides win over file values
//! - Chat API key is read from the configured environment variable
//!
//! Note: Uses serial_test to prevent environment variable races.

use mcn_common::config::{ConfigOverrides, ConfigSource, TomlConfig};
use mcn_common::Error;
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_missing_explicit_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");

    let (config, source) = TomlConfig::load(Some(&missing)).unwrap();
    assert_eq!(config.bind_addr, TomlConfig::default().bind_addr);
    assert_eq!(source, ConfigSource::Missing(missing));
    assert!(source.is_fallback());
}

#[test]
fn test_file_values_loaded() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
bind_addr = "0.0.0.0:6000"
public_base_url = "https://visite.mcn.sn"
catalog_path = "/srv/mcn/catalog.json"

[logging]
level = "debug"

[chat]
endpoint = "https://gateway.example/museum-chat"
timeout_secs = 10
"#
    )
    .unwrap();

    let (config, source) = TomlConfig::load(Some(file.path())).unwrap();
    assert_eq!(source, ConfigSource::File(file.path().to_path_buf()));
    assert_eq!(config.bind_addr, "0.0.0.0:6000");
    assert_eq!(config.public_base_url(), "https://visite.mcn.sn");
    assert_eq!(
        config.catalog_path.as_deref(),
        Some(std::path::Path::new("/srv/mcn/catalog.json"))
    );
    assert_eq!(config.logging.level, "debug");
    assert_eq!(
        config.chat.endpoint.as_deref(),
        Some("https://gateway.example/museum-chat")
    );
    assert_eq!(config.chat.timeout_secs, 10);
    assert_eq!(config.session.idle_timeout_secs, 4 * 60 * 60);
}

#[test]
fn test_malformed_file_is_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "bind_addr = [not toml").unwrap();

    let result = TomlConfig::load(Some(file.path()));
    assert!(matches!(result, Err(Error::Toml(_))));
}

#[test]
fn test_invalid_values_rejected_at_load() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[session]\nsweep_interval_secs = 0").unwrap();

    let result = TomlConfig::load(Some(file.path()));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_overrides_beat_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "bind_addr = \"0.0.0.0:6000\"").unwrap();

    let (config, _) = TomlConfig::load(Some(file.path())).unwrap();
    let config = config
        .with_overrides(ConfigOverrides {
            bind_addr: Some("127.0.0.1:7000".to_string()),
            chat_endpoint: Some("http://127.0.0.1:9999/chat".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(config.bind_addr, "127.0.0.1:7000");
    assert_eq!(
        config.chat.endpoint.as_deref(),
        Some("http://127.0.0.1:9999/chat")
    );
}

#[test]
#[serial]
fn test_chat_api_key_from_env() {
    let mut config = TomlConfig::default();
    config.chat.api_key_env = "MCN_TEST_CHAT_KEY".to_string();

    env::remove_var("MCN_TEST_CHAT_KEY");
    assert_eq!(config.chat.api_key(), None);

    env::set_var("MCN_TEST_CHAT_KEY", "   ");
    assert_eq!(config.chat.api_key(), None);

    env::set_var("MCN_TEST_CHAT_KEY", "secret-key");
    assert_eq!(config.chat.api_key().as_deref(), Some("secret-key"));

    env::remove_var("MCN_TEST_CHAT_KEY");
}
