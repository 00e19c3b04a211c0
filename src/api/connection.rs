//! Blocking, document-returning JIRA connection.
//!
//! [`JiraConnection`] keeps the older calling convention: every call blocks
//! the current thread for one round trip and returns a JSON object. Failures
//! never escape; they come back as `{"message": <description>}`. The status
//! change reports only `true`/`false`.
//!
//! Use [`JiraClient`](super::JiraClient) when the caller needs to tell
//! failures apart from responses.

use serde::Serialize;
use serde_json::{Map, Value};
use tokio::runtime::{Builder, Runtime};
use tracing::{instrument, warn};

use super::client::{change_status, document_key};
use super::error::{ApiError, Result};
use super::requests;
use super::rest::{into_document, RequestSpec, ResponseDocument, RestClient};
use super::transport::{HttpTransport, Method, Transport};
use super::types::{IssueInput, IssueLinkType, IssueQuery, SearchRequest};
use super::BasicAuthenticator;
use crate::config::Profile;

/// A blocking JIRA connection.
///
/// Owns a single-threaded runtime that drives each request to completion.
/// Calling its methods from inside an async runtime panics; use
/// [`JiraClient`](super::JiraClient) there.
pub struct JiraConnection<T = HttpTransport> {
    runtime: Runtime,
    rest: RestClient<T>,
}

impl JiraConnection<HttpTransport> {
    /// Open a connection to `url` with Basic credentials.
    ///
    /// # Errors
    ///
    /// Fails immediately with [`ApiError::InvalidUrl`] when `url` is empty.
    pub fn new(url: &str, username: &str, password: &str) -> Result<Self> {
        let rest = RestClient::new(url, username, password)?;
        Self::from_rest(rest)
    }

    /// Open a connection from a configured profile.
    pub fn from_profile(profile: &Profile) -> crate::Result<Self> {
        profile.validate()?;
        let password = profile.password()?;
        Ok(Self::new(&profile.url, &profile.username, &password)?)
    }

    /// The `key` of an issue document, e.g. one returned by
    /// [`create_issue`](JiraConnection::create_issue).
    pub fn get_key(document: &ResponseDocument) -> Option<&str> {
        document_key(document)
    }
}

impl<T: Transport> JiraConnection<T> {
    /// Open a connection over a custom transport.
    pub fn with_transport(url: &str, username: &str, password: &str, transport: T) -> Result<Self> {
        let authenticator = BasicAuthenticator::new(username, password);
        let rest = RestClient::with_parts(url, authenticator, transport)?;
        Self::from_rest(rest)
    }

    fn from_rest(rest: RestClient<T>) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ApiError::Runtime)?;
        Ok(Self { runtime, rest })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        self.rest.base_url()
    }

    /// Execute an arbitrary request.
    pub fn execute_request<B>(
        &self,
        method: Method,
        resource: &str,
        body: Option<&B>,
    ) -> ResponseDocument
    where
        B: Serialize + ?Sized,
    {
        self.runtime
            .block_on(self.rest.execute_document(method, resource, body))
    }

    fn run<B: Serialize>(&self, spec: RequestSpec<B>) -> ResponseDocument {
        self.runtime
            .block_on(async { into_document(self.rest.send(spec).await) })
    }

    /// Fetch an issue: `GET issue/{key}`.
    pub fn get_issue(&self, issue_key: &str) -> ResponseDocument {
        self.run(requests::get_issue(issue_key, &IssueQuery::new()))
    }

    /// Fetch an issue with `fields`, `expand` or `properties` parameters.
    pub fn get_issue_with(&self, issue_key: &str, query: &IssueQuery) -> ResponseDocument {
        self.run(requests::get_issue(issue_key, query))
    }

    /// Run a JQL search: `POST search`.
    pub fn search(
        &self,
        jql: &str,
        start_at: u32,
        max_results: u32,
        fields: &[&str],
    ) -> ResponseDocument {
        let request = SearchRequest::new(jql, start_at, max_results).with_fields(fields.iter().copied());
        self.run(requests::search(request))
    }

    /// Create an issue from its `fields` map: `POST issue`.
    pub fn create_issue(&self, fields: Map<String, Value>) -> ResponseDocument {
        self.run(requests::create_issue(IssueInput::from_fields(fields)))
    }

    /// Update fields of an issue: `PUT issue/{key}`.
    pub fn update_issue(&self, issue_key: &str, fields: Map<String, Value>) -> ResponseDocument {
        self.run(requests::update_issue(
            issue_key,
            IssueInput::from_fields(fields),
        ))
    }

    /// Link two issues: `POST issueLink/`.
    pub fn link_issue(
        &self,
        inward_key: &str,
        outward_key: &str,
        link_type: IssueLinkType,
    ) -> ResponseDocument {
        self.run(requests::link_issues(inward_key, outward_key, link_type))
    }

    /// Apply the transition named `status_name` (case-sensitive).
    ///
    /// Returns `false` when no such transition exists and also when any
    /// request fails; the failure is only logged. The lookup and the
    /// transition are two requests with no atomicity between them.
    #[instrument(skip(self))]
    pub fn change_status(&self, issue_key: &str, status_name: &str) -> bool {
        self.runtime
            .block_on(change_status(&self.rest, issue_key, status_name))
            .unwrap_or_else(|e| {
                warn!(kind = %e.kind(), "Status change failed: {}", e);
                false
            })
    }

    /// Add a comment: `POST issue/{key}/comment`.
    pub fn add_comment(&self, issue_key: &str, body: &str) -> ResponseDocument {
        self.run(requests::add_comment(issue_key, body))
    }

    /// List watchers: `GET issue/{key}/watchers`.
    pub fn get_issue_watchers(&self, issue_key: &str) -> ResponseDocument {
        self.run(requests::get_watchers(issue_key))
    }

    /// Add a watcher: `POST issue/{key}/watchers`.
    pub fn add_watcher(&self, issue_key: &str, username: &str) -> ResponseDocument {
        self.run(requests::add_watcher(issue_key, username))
    }

    /// Remove a watcher: `DELETE issue/{key}/watchers?username=`.
    pub fn remove_watcher(&self, issue_key: &str, username: &str) -> ResponseDocument {
        self.run(requests::remove_watcher(issue_key, username))
    }
}
