//! Authentication handling for JIRA API.
//!
//! Requests are authenticated by an [`Authenticator`], which stamps whatever
//! headers it needs onto an outgoing [`HttpRequest`] right before it is sent.
//! JIRA's username + password (or API token) scheme is covered by
//! [`BasicAuthenticator`]; other schemes can implement the trait.

use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::header;

use super::transport::HttpRequest;

/// Attaches credentials to an outgoing request.
///
/// Implementations must not perform network I/O and cannot fail. Bad
/// credentials simply produce a request the server rejects.
pub trait Authenticator: Send + Sync {
    /// Add authentication headers to `request`.
    fn authenticate(&self, request: &mut HttpRequest);
}

/// HTTP Basic authentication.
///
/// The header value is computed once at construction and the raw password is
/// not stored.
#[derive(Clone)]
pub struct BasicAuthenticator {
    /// The username the header was built for.
    username: String,
    /// The complete "Basic ..." header value.
    auth_header: String,
}

impl BasicAuthenticator {
    /// Create a new authenticator from a username and password.
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            auth_header: build_auth_header(username, password),
        }
    }

    /// Get the authorization header value for HTTP requests.
    pub fn header_value(&self) -> &str {
        &self.auth_header
    }

    /// Get the username.
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl Authenticator for BasicAuthenticator {
    fn authenticate(&self, request: &mut HttpRequest) {
        request.set_header(header::AUTHORIZATION.as_str(), &self.auth_header);
    }
}

impl fmt::Debug for BasicAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuthenticator")
            .field("username", &self.username)
            .field("auth_header", &"<redacted>")
            .finish()
    }
}

/// Build the Basic Auth header value.
///
/// Encodes "username:password" in Base64 and prepends "Basic ".
fn build_auth_header(username: &str, password: &str) -> String {
    let credentials = format!("{}:{}", username, password);
    let encoded = BASE64.encode(credentials.as_bytes());
    format!("Basic {}", encoded)
}
