//! jira-rest - a small client for the JIRA REST API
//!
//! Every request goes through one dispatcher, [`RestClient`], which joins the
//! resource path onto the base URL, serializes the JSON body, stamps HTTP
//! Basic credentials on the request and parses the JSON object that comes
//! back.
//!
//! Two surfaces sit on top of it:
//! - [`JiraClient`]: async, typed responses, typed [`ApiError`]s.
//! - [`JiraConnection`]: blocking, returns raw JSON objects and reports
//!   failures as `{"message": ...}` documents.
//!
//! ```no_run
//! use jira_rest::{IssueQuery, JiraClient};
//!
//! # async fn run() -> jira_rest::api::Result<()> {
//! let jira = JiraClient::new("https://jira.example.com/rest/api/2", "jdoe", "secret")?;
//! let issue = jira.get_issue("PROJ-1", &IssueQuery::new().field("summary")).await?;
//! println!("{}", issue);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod logging;

pub use api::{
    ApiError, Authenticator, BasicAuthenticator, ErrorKind, HttpTransport, Issue,
    IssueLinkType, IssueQuery, JiraClient, JiraConnection, Method, RequestSpec,
    ResponseDocument, RestClient, Transport,
};
pub use config::{Config, Profile};
pub use error::{Error, Result};
