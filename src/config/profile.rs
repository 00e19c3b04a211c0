//! JIRA profile configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};

/// Environment variable consulted when a profile has no password.
pub const ENV_API_TOKEN: &str = "JIRA_API_TOKEN";

/// A JIRA profile configuration.
///
/// Profiles store connection details for a JIRA instance. The password may
/// be left out of the file and supplied through `JIRA_API_TOKEN` instead.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// The name of this profile.
    ///
    /// Must be non-empty and unique across all profiles.
    pub name: String,

    /// The REST API base URL (e.g., "https://jira.example.com/rest/api/2").
    pub url: String,

    /// The username (or email address on JIRA Cloud).
    pub username: String,

    /// The password or API token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Profile {
    /// Create a new profile without a stored password.
    pub fn new(name: String, url: String, username: String) -> Self {
        Self {
            name,
            url,
            username,
            password: None,
        }
    }

    /// Set the stored password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Validate this profile.
    ///
    /// Checks that:
    /// - The name is non-empty and has no whitespace
    /// - The URL is non-empty and uses http:// or https://
    /// - The username is non-empty
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` with details if validation fails.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ConfigError::ValidationError(
                "profile name cannot be empty".to_string(),
            ));
        }

        if self.name.contains(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "profile name '{}' cannot contain whitespace",
                self.name
            )));
        }

        if self.url.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}': URL cannot be empty",
                self.name
            )));
        }

        if !self.url.starts_with("https://") && !self.url.starts_with("http://") {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}': URL must start with http:// or https://",
                self.name
            )));
        }

        if self.username.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}': username cannot be empty",
                self.name
            )));
        }

        Ok(())
    }

    /// Resolve the password, falling back to `JIRA_API_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingPassword` when neither is set.
    pub fn password(&self) -> Result<String> {
        if let Some(password) = &self.password {
            return Ok(password.clone());
        }

        std::env::var(ENV_API_TOKEN)
            .ok()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ConfigError::MissingPassword(self.name.clone()))
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
