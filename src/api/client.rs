//! JIRA API client implementation.
//!
//! [`JiraClient`] is the typed, async surface over the REST API v2: every
//! operation builds its request with [`requests`](super::requests), sends it
//! through a [`RestClient`] and decodes the response into a schema from
//! [`types`](super::types). Failures come back as [`ApiError`]s.

use serde_json::Value;
use tracing::{debug, info, instrument};

use super::error::{ApiError, Result};
use super::requests;
use super::rest::RestClient;
use super::transport::{HttpTransport, Transport};
use super::types::{
    Comment, CreatedIssue, Issue, IssueInput, IssueLinkType, IssueQuery, SearchRequest,
    SearchResult, Transition, TransitionList, Watchers,
};
use super::BasicAuthenticator;
use crate::config::Profile;

/// The JIRA API client.
#[derive(Debug)]
pub struct JiraClient<T = HttpTransport> {
    rest: RestClient<T>,
}

impl JiraClient<HttpTransport> {
    /// Create a new client with Basic credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if `base_url` is empty. No request is
    /// made.
    pub fn new(base_url: &str, username: &str, password: &str) -> Result<Self> {
        Ok(Self {
            rest: RestClient::new(base_url, username, password)?,
        })
    }

    /// Create a client from a configured profile.
    #[instrument(skip(profile), fields(profile_name = %profile.name))]
    pub fn from_profile(profile: &Profile) -> crate::Result<Self> {
        profile.validate()?;
        let password = profile.password()?;
        let client = Self::new(&profile.url, &profile.username, &password)?;
        info!("JIRA client created");
        Ok(client)
    }
}

impl<T: Transport> JiraClient<T> {
    /// Create a client over a custom transport.
    pub fn with_transport(
        base_url: &str,
        username: &str,
        password: &str,
        transport: T,
    ) -> Result<Self> {
        let authenticator = BasicAuthenticator::new(username, password);
        Ok(Self {
            rest: RestClient::with_parts(base_url, authenticator, transport)?,
        })
    }

    /// Wrap an already configured [`RestClient`].
    pub fn from_rest(rest: RestClient<T>) -> Self {
        Self { rest }
    }

    /// The underlying dispatcher, for endpoints without a typed wrapper.
    pub fn rest(&self) -> &RestClient<T> {
        &self.rest
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        self.rest.base_url()
    }

    /// Get a single issue by key.
    #[instrument(skip(self, query), fields(issue_key = %key))]
    pub async fn get_issue(&self, key: &str, query: &IssueQuery) -> Result<Issue> {
        debug!("Fetching issue");

        let issue: Issue = self
            .rest
            .send_as(requests::get_issue(key, query))
            .await
            .map_err(|e| {
                if matches!(e, ApiError::NotFound(_)) {
                    ApiError::NotFound(format!("Issue '{}' not found", key))
                } else {
                    e
                }
            })?;

        debug!("Fetched issue: {}", issue.key);
        Ok(issue)
    }

    /// Search for issues using JQL.
    #[instrument(skip(self, request), fields(jql = %request.jql))]
    pub async fn search(&self, request: SearchRequest) -> Result<SearchResult> {
        debug!(
            "Searching issues: startAt={}, maxResults={}",
            request.start_at, request.max_results
        );

        let result: SearchResult = self.rest.send_as(requests::search(request)).await?;
        debug!("Found {} issues (total: {})", result.issues.len(), result.total);
        Ok(result)
    }

    /// Create an issue.
    #[instrument(skip(self, input))]
    pub async fn create_issue(&self, input: IssueInput) -> Result<CreatedIssue> {
        let created: CreatedIssue = self.rest.send_as(requests::create_issue(input)).await?;
        info!(issue_key = %created.key, "Created issue");
        Ok(created)
    }

    /// Update fields of an existing issue.
    #[instrument(skip(self, input), fields(issue_key = %key))]
    pub async fn update_issue(&self, key: &str, input: IssueInput) -> Result<()> {
        self.rest.send(requests::update_issue(key, input)).await?;
        debug!("Updated issue");
        Ok(())
    }

    /// Link two issues.
    #[instrument(skip(self))]
    pub async fn link_issues(
        &self,
        inward_key: &str,
        outward_key: &str,
        link_type: IssueLinkType,
    ) -> Result<()> {
        self.rest
            .send(requests::link_issues(inward_key, outward_key, link_type))
            .await?;
        Ok(())
    }

    /// Get the transitions currently available for an issue.
    #[instrument(skip(self), fields(issue_key = %key))]
    pub async fn get_transitions(&self, key: &str) -> Result<Vec<Transition>> {
        let list: TransitionList = self.rest.send_as(requests::get_transitions(key)).await?;
        Ok(list.transitions)
    }

    /// Apply a transition by id.
    #[instrument(skip(self), fields(issue_key = %key))]
    pub async fn transition_issue(&self, key: &str, transition_id: &str) -> Result<()> {
        self.rest
            .send(requests::transition_issue(key, transition_id))
            .await?;
        Ok(())
    }

    /// Move an issue to the status reached by the transition named
    /// `transition_name`.
    ///
    /// Returns `Ok(false)` without a second request when no available
    /// transition has that exact (case-sensitive) name.
    ///
    /// The lookup and the transition are two separate requests. A workflow
    /// change between them is not detected.
    pub async fn change_status(&self, key: &str, transition_name: &str) -> Result<bool> {
        change_status(&self.rest, key, transition_name).await
    }

    /// Add a comment to an issue.
    #[instrument(skip(self, body), fields(issue_key = %key))]
    pub async fn add_comment(&self, key: &str, body: &str) -> Result<Comment> {
        self.rest.send_as(requests::add_comment(key, body)).await
    }

    /// Get the watchers of an issue.
    #[instrument(skip(self), fields(issue_key = %key))]
    pub async fn get_watchers(&self, key: &str) -> Result<Watchers> {
        self.rest.send_as(requests::get_watchers(key)).await
    }

    /// Add a user to the watchers of an issue.
    #[instrument(skip(self), fields(issue_key = %key))]
    pub async fn add_watcher(&self, key: &str, username: &str) -> Result<()> {
        self.rest.send(requests::add_watcher(key, username)).await?;
        Ok(())
    }

    /// Remove a user from the watchers of an issue.
    #[instrument(skip(self), fields(issue_key = %key))]
    pub async fn remove_watcher(&self, key: &str, username: &str) -> Result<()> {
        self.rest
            .send(requests::remove_watcher(key, username))
            .await?;
        Ok(())
    }
}

/// List transitions, pick the one named `transition_name`, apply it.
#[instrument(skip_all, fields(issue_key = %key, transition = %transition_name))]
pub(crate) async fn change_status<T: Transport>(
    rest: &RestClient<T>,
    key: &str,
    transition_name: &str,
) -> Result<bool> {
    let list: TransitionList = rest.send_as(requests::get_transitions(key)).await?;

    let Some(transition) = list.find_by_name(transition_name) else {
        debug!(
            available = list.transitions.len(),
            "No transition with a matching name"
        );
        return Ok(false);
    };

    rest.send(requests::transition_issue(key, &transition.id))
        .await?;
    info!(transition_id = %transition.id, "Transitioned issue");
    Ok(true)
}

/// The `key` field of a response document, if it is a string.
pub fn document_key(document: &serde_json::Map<String, Value>) -> Option<&str> {
    document.get("key").and_then(Value::as_str)
}
