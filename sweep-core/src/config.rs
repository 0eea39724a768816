//! Configuration management for gha-sweep
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (GHA_SWEEP_*)
//! 3. Config file (~/.config/gha-sweep/config.toml)
//! 4. Default values

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Sweep-related configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Target user or organization name
    pub identity: Option<String>,

    /// Repositories requested per listing page
    pub page_size: u32,

    /// Directory under which local mirrors are created
    pub local_root: PathBuf,

    /// Pause between repositories, to stay under API rate limits
    #[serde(with = "humantime_serde")]
    pub delay: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            identity: None,
            page_size: 100,
            local_root: std::env::temp_dir().join("gha-sweep"),
            delay: Duration::from_secs(1),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Sweep configuration
    pub sweep: SweepConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/gha-sweep/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gha-sweep").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - GHA_SWEEP_IDENTITY: Target user or organization
    /// - GHA_SWEEP_LOCAL_ROOT: Mirror directory root
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(identity) = std::env::var("GHA_SWEEP_IDENTITY") {
            self.sweep.identity = Some(identity);
        }

        if let Ok(local_root) = std::env::var("GHA_SWEEP_LOCAL_ROOT") {
            self.sweep.local_root = PathBuf::from(local_root);
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(
        mut self,
        identity: Option<String>,
        local_root: Option<PathBuf>,
        page_size: Option<u32>,
        delay: Option<Duration>,
    ) -> Self {
        if let Some(identity) = identity {
            self.sweep.identity = Some(identity);
        }

        if let Some(local_root) = local_root {
            self.sweep.local_root = local_root;
        }

        if let Some(page_size) = page_size {
            self.sweep.page_size = page_size;
        }

        if let Some(delay) = delay {
            self.sweep.delay = delay;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(
        identity: Option<String>,
        local_root: Option<PathBuf>,
        page_size: Option<u32>,
        delay: Option<Duration>,
    ) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()
            .with_cli_overrides(identity, local_root, page_size, delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.sweep.identity.is_none());
        assert_eq!(config.sweep.page_size, 100);
        assert_eq!(config.sweep.delay, Duration::from_secs(1));
        assert!(config.sweep.local_root.ends_with("gha-sweep"));
    }

    #[test]
    fn test_cli_overrides() {
        let config = Config::default().with_cli_overrides(
            Some("example-org".to_string()),
            Some(PathBuf::from("/var/tmp/mirrors")),
            Some(50),
            Some(Duration::from_secs(2)),
        );

        assert_eq!(config.sweep.identity.as_deref(), Some("example-org"));
        assert_eq!(config.sweep.local_root, PathBuf::from("/var/tmp/mirrors"));
        assert_eq!(config.sweep.page_size, 50);
        assert_eq!(config.sweep.delay, Duration::from_secs(2));
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[sweep]
identity = "example-org"
page_size = 25
local_root = "/var/tmp/mirrors"
delay = "500ms"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.sweep.identity.as_deref(), Some("example-org"));
        assert_eq!(config.sweep.page_size, 25);
        assert_eq!(config.sweep.local_root, PathBuf::from("/var/tmp/mirrors"));
        assert_eq!(config.sweep.delay, Duration::from_millis(500));
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
[sweep]
identity = "example-org"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        // remaining fields should use defaults
        assert_eq!(config.sweep.identity.as_deref(), Some("example-org"));
        assert_eq!(config.sweep.page_size, 100);
        assert_eq!(config.sweep.delay, Duration::from_secs(1));
    }
}
