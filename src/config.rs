//! Configuration file parser for ~/.config/preen/config.toml.
//!
//! The config file is optional. A missing or empty file yields
//! `Config::default()`; unknown keys are accepted with a warning.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be
/// specified; missing keys fall back to `Default::default()`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upper bound on in-flight fetches during a bulk refresh.
    pub max_concurrent_fetches: usize,

    /// Per-request timeout in seconds.
    pub fetch_timeout_secs: u64,

    /// Streaming cap on response bodies, in bytes.
    pub max_response_bytes: usize,

    /// User-Agent header sent with every request.
    pub user_agent: String,

    /// Accept feed URLs on localhost and private networks. Off by
    /// default; intended for self-hosted setups.
    pub allow_private_hosts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 8,
            fetch_timeout_secs: 30,
            max_response_bytes: 10 * 1024 * 1024,
            user_agent: format!("preen/{}", env!("CARGO_PKG_VERSION")),
            allow_private_hosts: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// - Missing file -> `Ok(Config::default())`
    /// - Empty file -> `Ok(Config::default())`
    /// - Invalid TOML -> `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys -> accepted, logged as a warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Surface potential typos: parse once as a raw table and flag
        // keys serde would silently drop.
        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = [
                "max_concurrent_fetches",
                "fetch_timeout_secs",
                "max_response_bytes",
                "user_agent",
                "allow_private_hosts",
            ];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.max_concurrent_fetches, 8);
        assert_eq!(config.fetch_timeout_secs, 30);
        assert_eq!(config.max_response_bytes, 10 * 1024 * 1024);
        assert!(config.user_agent.starts_with("preen/"));
        assert!(!config.allow_private_hosts);
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/preen_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.max_concurrent_fetches, 8);
    }

    #[test]
    fn test_empty_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "   \n \n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.fetch_timeout_secs, 30);
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_concurrent_fetches = 3\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.max_concurrent_fetches, 3);
        assert_eq!(config.fetch_timeout_secs, 30); // default
    }

    #[test]
    fn test_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let content = r#"
max_concurrent_fetches = 4
fetch_timeout_secs = 10
max_response_bytes = 1048576
user_agent = "custom-agent/2.0"
allow_private_hosts = true
"#;
        std::fs::write(&path, content).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.max_concurrent_fetches, 4);
        assert_eq!(config.fetch_timeout_secs, 10);
        assert_eq!(config.max_response_bytes, 1_048_576);
        assert_eq!(config.user_agent, "custom-agent/2.0");
        assert!(config.allow_private_hosts);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is not [valid toml").unwrap();

        let result = Config::load(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "totally_fake_key = \"ok\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.max_concurrent_fetches, 8);
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "fetch_timeout_secs = \"soon\"\n").unwrap();

        assert!(Config::load(&path).is_err());
    }
}
