//! Configuration management for jira-rest.
//!
//! Connection profiles live in a TOML file, by default
//! `<config dir>/jira-rest/config.toml`:
//!
//! ```toml
//! default_profile = "work"
//!
//! [[profiles]]
//! name = "work"
//! url = "https://jira.example.com/rest/api/2"
//! username = "jdoe"
//! ```

mod profile;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use profile::{Profile, ENV_API_TOKEN};

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the configuration directory")]
    NoConfigDir,

    #[error("failed to read configuration: {0}")]
    ReadError(#[source] std::io::Error),

    #[error("failed to write configuration: {0}")]
    WriteError(#[source] std::io::Error),

    #[error("invalid configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    ValidationError(String),

    #[error("profile '{0}' not found")]
    ProfileNotFound(String),

    #[error("no password for profile '{0}': set it in the config file or JIRA_API_TOKEN")]
    MissingPassword(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// The configuration file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// The name of the profile used when none is requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,

    #[serde(default)]
    pub profiles: Vec<Profile>,
}

impl Config {
    /// The default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let base_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base_dir.join("jira-rest").join("config.toml"))
    }

    /// Load from the default path. A missing file yields an empty config.
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            debug!(path = %path.display(), "No configuration file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load and validate a configuration file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        debug!(path = %path.display(), profiles = config.profiles.len(), "Loaded configuration");
        Ok(config)
    }

    /// Write the configuration, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::WriteError)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(ConfigError::WriteError)
    }

    /// Validate every profile, name uniqueness and the default profile.
    pub fn validate(&self) -> Result<()> {
        for (i, profile) in self.profiles.iter().enumerate() {
            profile.validate()?;
            if self.profiles[..i].iter().any(|p| p.name == profile.name) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate profile name '{}'",
                    profile.name
                )));
            }
        }

        if let Some(name) = &self.default_profile {
            if self.profile(name).is_none() {
                return Err(ConfigError::ProfileNotFound(name.clone()));
            }
        }

        Ok(())
    }

    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// The default profile, or the only profile when there is exactly one.
    pub fn default_profile(&self) -> Result<&Profile> {
        match &self.default_profile {
            Some(name) => self
                .profile(name)
                .ok_or_else(|| ConfigError::ProfileNotFound(name.clone())),
            None if self.profiles.len() == 1 => Ok(&self.profiles[0]),
            None => Err(ConfigError::ValidationError(
                "no default profile configured".to_string(),
            )),
        }
    }
}
