//! JIRA API client and types.
//!
//! This module provides the interface for communicating with the JIRA REST API.
//! Requests flow from the resource builders in [`requests`] through the
//! [`RestClient`] dispatcher, which authenticates them and hands them to a
//! [`Transport`].

mod auth;
mod client;
mod connection;
mod error;
pub mod requests;
mod rest;
mod transport;
pub mod types;

pub use auth::{Authenticator, BasicAuthenticator};
pub use client::{document_key, JiraClient};
pub use connection::JiraConnection;
pub use error::{ApiError, ErrorKind, Result};
pub use rest::{
    error_document, into_document, normalize_base_url, RequestSpec, ResponseDocument,
    RestClient, MESSAGE_KEY,
};
pub use transport::{HttpRequest, HttpTransport, Method, Transport};
pub use types::{Issue, IssueLinkType, IssueQuery};
