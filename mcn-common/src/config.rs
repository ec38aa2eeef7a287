//! Bootstrap configuration
//!
//! Settings are resolved in priority order:
//! 1. Command-line arguments (and their environment fallbacks)
//! 2. TOML config file (explicit path, else the platform config directory)
//! 3. Compiled defaults
//!
//! A missing config file is not an error: defaults are used and the
//! returned [`ConfigSource`] says so. A config file that exists but cannot
//! be parsed is an error.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Default environment variable holding the chat gateway API key
pub const DEFAULT_CHAT_API_KEY_ENV: &str = "MCN_CHAT_API_KEY";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// HTTP listen address
    pub bind_addr: String,

    /// Public base URL used to build shareable artwork links
    pub public_base_url: String,

    /// Alternate catalog dataset (JSON); built-in collection when absent
    pub catalog_path: Option<PathBuf>,

    pub logging: LoggingConfig,
    pub session: SessionConfig,
    pub chat: ChatConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5730".to_string(),
            public_base_url: "http://127.0.0.1:5730".to_string(),
            catalog_path: None,
            logging: LoggingConfig::default(),
            session: SessionConfig::default(),
            chat: ChatConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Visitor session lifetime
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Idle time after which a session (and its grants) is discarded
    pub idle_timeout_secs: u64,
    /// Interval between idle-session sweeps
    pub sweep_interval_secs: u64,
    /// Event bus capacity
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 4 * 60 * 60,
            sweep_interval_secs: 60,
            event_capacity: 256,
        }
    }
}

/// Chat gateway collaborator
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Gateway URL; chat is unavailable when unset
    pub endpoint: Option<String>,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key_env: DEFAULT_CHAT_API_KEY_ENV.to_string(),
            timeout_secs: 30,
        }
    }
}

impl ChatConfig {
    /// API key from the configured environment variable, if set and non-empty
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Values supplied on the command line; `None` leaves the file/default value
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind_addr: Option<String>,
    pub public_base_url: Option<String>,
    pub catalog_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub chat_endpoint: Option<String>,
}

impl TomlConfig {
    /// Parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from `explicit` or the default location, falling back to defaults
    ///
    /// Returns where the values came from so the caller can report it once
    /// logging is up.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_file(),
        };

        match path {
            Some(path) if path.exists() => {
                let config = Self::from_file(&path)?;
                config.validate()?;
                Ok((config, ConfigSource::File(path)))
            }
            Some(path) => Ok((Self::default(), ConfigSource::Missing(path))),
            None => Ok((Self::default(), ConfigSource::Defaults)),
        }
    }

    /// Apply command-line values over the loaded configuration
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self> {
        if let Some(bind_addr) = overrides.bind_addr {
            self.bind_addr = bind_addr;
        }
        if let Some(url) = overrides.public_base_url {
            self.public_base_url = url;
        }
        if let Some(path) = overrides.catalog_path {
            self.catalog_path = Some(path);
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(endpoint) = overrides.chat_endpoint {
            self.chat.endpoint = Some(endpoint);
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject values the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.bind_addr.trim().is_empty() {
            return Err(Error::Config("bind_addr must not be empty".to_string()));
        }
        if self.session.idle_timeout_secs == 0 {
            return Err(Error::Config(
                "session.idle_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.session.sweep_interval_secs == 0 {
            return Err(Error::Config(
                "session.sweep_interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.session.event_capacity == 0 {
            return Err(Error::Config(
                "session.event_capacity must be greater than 0".to_string(),
            ));
        }
        if self.chat.timeout_secs == 0 {
            return Err(Error::Config(
                "chat.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Base URL without a trailing slash
    pub fn public_base_url(&self) -> &str {
        self.public_base_url.trim_end_matches('/')
    }
}

/// Origin of a loaded configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// This file was requested but does not exist; defaults used
    Missing(PathBuf),
    /// No config file found; defaults used
    Defaults,
}

impl ConfigSource {
    /// True when compiled defaults were used because no file was read
    pub fn is_fallback(&self) -> bool {
        !matches!(self, ConfigSource::File(_))
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Missing(path) => {
                write!(f, "compiled defaults ({} not found)", path.display())
            }
            ConfigSource::Defaults => f.write_str("compiled defaults (no config file found)"),
        }
    }
}

/// Platform config file: `<config_dir>/mcn/config.toml`, then `/etc/mcn/config.toml` on Linux
pub fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("mcn").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/mcn/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = TomlConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_addr, "127.0.0.1:5730");
        assert_eq!(config.logging.level, "info");
        assert!(config.chat.endpoint.is_none());
        assert_eq!(config.chat.api_key_env, DEFAULT_CHAT_API_KEY_ENV);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: TomlConfig = toml::from_str(
            r#"
            bind_addr = "0.0.0.0:8080"

            [session]
            idle_timeout_secs = 600
            "#,
        )
        .unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.session.idle_timeout_secs, 600);
        assert_eq!(config.session.sweep_interval_secs, 60);
        assert_eq!(config.chat.timeout_secs, 30);
    }

    #[test]
    fn test_overrides_take_priority() {
        let config = TomlConfig::default()
            .with_overrides(ConfigOverrides {
                bind_addr: Some("127.0.0.1:9000".to_string()),
                log_level: Some("debug".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = TomlConfig::default();
        config.session.idle_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_public_base_url_trims_slash() {
        let mut config = TomlConfig::default();
        config.public_base_url = "https://mcn.example/".to_string();
        assert_eq!(config.public_base_url(), "https://mcn.example");
    }
}
