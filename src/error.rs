//! Crate-level error type.
//!
//! Operations that touch both configuration and the API (building a client
//! from a profile) report failures through [`Error`].

use thiserror::Error;

use crate::api::{ApiError, ErrorKind};
use crate::config::ConfigError;

/// The top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// API-related errors.
    #[error("{0}")]
    Api(#[from] ApiError),
}

impl Error {
    /// The failing stage, if the error came from the API layer.
    pub fn api_kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Api(e) => Some(e.kind()),
            Error::Config(_) => None,
        }
    }

    /// Check if this error is caused by bad configuration or credentials.
    ///
    /// Such errors will not go away by retrying the same call.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            Error::Config(_)
                | Error::Api(ApiError::InvalidUrl(_))
                | Error::Api(ApiError::Unauthorized)
                | Error::Api(ApiError::Forbidden)
        )
    }
}

/// Result type for crate-level operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_config_error() {
        let err: Error = ConfigError::NoConfigDir.into();
        assert!(matches!(err, Error::Config(ConfigError::NoConfigDir)));
        assert_eq!(err.api_kind(), None);
    }

    #[test]
    fn test_error_from_api_error() {
        let err: Error = ApiError::Unauthorized.into();
        assert!(matches!(err, Error::Api(ApiError::Unauthorized)));
        assert_eq!(err.api_kind(), Some(ErrorKind::Transport));
    }

    #[test]
    fn test_display_is_transparent() {
        let err: Error = ConfigError::ProfileNotFound("work".to_string()).into();
        assert_eq!(err.to_string(), "profile 'work' not found");
    }

    #[test]
    fn test_is_critical() {
        assert!(Error::Api(ApiError::Unauthorized).is_critical());
        assert!(Error::Api(ApiError::InvalidUrl(String::new())).is_critical());
        assert!(Error::Config(ConfigError::NoConfigDir).is_critical());
        assert!(!Error::Api(ApiError::RateLimited).is_critical());
        assert!(!Error::Api(ApiError::NotFound("A-1".to_string())).is_critical());
    }
}
