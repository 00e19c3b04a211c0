//! JIRA API request and response types.
//!
//! These types model the JIRA REST API v2 payloads for issues, search,
//! links, transitions, comments and watchers. Issue fields are open-ended
//! (every instance has its own custom fields), so the field maps keep a
//! generic JSON escape hatch next to the well-known fields.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// The kinds of link JIRA creates between two issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueLinkType {
    Blocker,
    Cloners,
    #[serde(rename = "Depends on")]
    DependsOn,
    Duplicate,
    Part,
    Reference,
}

impl IssueLinkType {
    /// Every link type, in declaration order.
    pub const ALL: [IssueLinkType; 6] = [
        IssueLinkType::Blocker,
        IssueLinkType::Cloners,
        IssueLinkType::DependsOn,
        IssueLinkType::Duplicate,
        IssueLinkType::Part,
        IssueLinkType::Reference,
    ];

    /// The link type name as JIRA knows it.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueLinkType::Blocker => "Blocker",
            IssueLinkType::Cloners => "Cloners",
            IssueLinkType::DependsOn => "Depends on",
            IssueLinkType::Duplicate => "Duplicate",
            IssueLinkType::Part => "Part",
            IssueLinkType::Reference => "Reference",
        }
    }
}

impl fmt::Display for IssueLinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional query parameters for fetching a single issue.
///
/// Empty lists are omitted from the query string entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueQuery {
    /// Fields to return (e.g. `summary`, `*all`, `-comment`).
    pub fields: Vec<String>,
    /// Entities to expand (e.g. `renderedFields`, `changelog`).
    pub expand: Vec<String>,
    /// Issue properties to return.
    pub properties: Vec<String>,
}

impl IssueQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.fields.push(field.into());
        self
    }

    pub fn expand(mut self, entity: impl Into<String>) -> Self {
        self.expand.push(entity.into());
        self
    }

    pub fn property(mut self, property: impl Into<String>) -> Self {
        self.properties.push(property.into());
        self
    }

    /// Query parameter pairs whose values are present, in a fixed order.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("fields", &self.fields),
            ("expand", &self.expand),
            ("properties", &self.properties),
        ]
        .into_iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(name, values)| (name, values.join(",")))
        .collect()
    }
}

/// A JIRA issue.
///
/// Returned by `GET issue/{key}` and inside search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// The issue ID.
    pub id: String,
    /// The issue key (e.g., "PROJ-123").
    pub key: String,
    /// The REST URL of this issue.
    #[serde(rename = "self", default)]
    pub self_url: Option<String>,
    /// The issue fields.
    #[serde(default)]
    pub fields: IssueFields,
}

impl Issue {
    /// Get the issue summary, or an empty string if it was not requested.
    pub fn summary(&self) -> &str {
        self.fields.summary.as_deref().unwrap_or("")
    }

    /// Get the status name, if the status field was returned.
    pub fn status(&self) -> Option<&str> {
        self.fields.status.as_ref().map(|s| s.name.as_str())
    }

    /// Look up a field without a typed accessor (custom fields included) by
    /// its JIRA id.
    ///
    /// The typed fields (`summary`, `status` and so on) live on
    /// [`IssueFields`] and are not found here.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.other.get(name)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.summary())
    }
}

/// Issue fields.
///
/// Only a handful of system fields are typed; everything else (custom fields
/// included) lands in `other`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuetype: Option<IssueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter: Option<User>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    /// Every field not listed above.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Issue status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub id: Option<String>,
    /// The status name (e.g., "To Do", "In Progress", "Done").
    pub name: String,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Issue type (Bug, Story, Task, Epic, etc.).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueType {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub subtask: bool,
}

/// A JIRA user.
///
/// Server instances identify users by `name`/`key`, Cloud by `accountId`,
/// so all identifiers are optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    /// The user's display name.
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

/// Body of `POST search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// The JQL query string.
    pub jql: String,
    /// The index of the first issue to return (0-based).
    pub start_at: u32,
    /// Maximum number of issues to return.
    pub max_results: u32,
    /// Fields to return for each issue.
    pub fields: Vec<String>,
}

impl SearchRequest {
    pub fn new(jql: impl Into<String>, start_at: u32, max_results: u32) -> Self {
        Self {
            jql: jql.into(),
            start_at,
            max_results,
            fields: Vec::new(),
        }
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }
}

/// Search result from a JQL query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// The index of the first result.
    pub start_at: u32,
    /// Maximum results requested.
    pub max_results: u32,
    /// Total number of matching issues.
    pub total: u32,
    /// The list of issues.
    #[serde(default)]
    pub issues: Vec<Issue>,
}

/// Body of `POST issue` and `PUT issue/{key}`: a map of field values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IssueInput {
    pub fields: Map<String, Value>,
}

impl IssueInput {
    /// Start a new issue with the fields JIRA requires for creation.
    pub fn new(project_key: &str, issue_type: &str, summary: &str) -> Self {
        Self::default()
            .with_field("project", serde_json::json!({ "key": project_key }))
            .with_field("issuetype", serde_json::json!({ "name": issue_type }))
            .with_field("summary", summary)
    }

    /// Wrap an existing field map, e.g. for a partial update.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Set a field, replacing any previous value.
    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }
}

/// Response of `POST issue`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedIssue {
    pub id: String,
    pub key: String,
    #[serde(rename = "self", default)]
    pub self_url: Option<String>,
}

/// Reference to an issue by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueRef {
    pub key: String,
}

/// Reference to a link type by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkTypeRef {
    pub name: IssueLinkType,
}

/// Body of `POST issueLink/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueLinkRequest {
    #[serde(rename = "type")]
    pub link_type: LinkTypeRef,
    pub inward_issue: IssueRef,
    pub outward_issue: IssueRef,
}

impl IssueLinkRequest {
    pub fn new(inward_key: &str, outward_key: &str, link_type: IssueLinkType) -> Self {
        Self {
            link_type: LinkTypeRef { name: link_type },
            inward_issue: IssueRef {
                key: inward_key.to_string(),
            },
            outward_issue: IssueRef {
                key: outward_key.to_string(),
            },
        }
    }
}

/// A workflow transition available for an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transition {
    /// Normally a string; numeric ids are accepted and kept as text.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    /// The status the issue ends up in.
    #[serde(default)]
    pub to: Option<Status>,
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

/// Response of `GET issue/{key}/transitions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionList {
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

impl TransitionList {
    /// Find the first transition whose name matches exactly (case-sensitive).
    pub fn find_by_name(&self, name: &str) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.name == name)
    }
}

/// Body of `POST issue/{key}/transitions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionRequest {
    pub transition: TransitionId,
}

/// A transition ID for the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionId {
    pub id: String,
}

/// Body of `POST issue/{key}/comment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentRequest {
    pub body: String,
}

/// A comment on an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub author: Option<User>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(rename = "self", default)]
    pub self_url: Option<String>,
}

/// Response of `GET issue/{key}/watchers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Watchers {
    #[serde(default)]
    pub is_watching: bool,
    #[serde(default)]
    pub watch_count: u32,
    #[serde(default)]
    pub watchers: Vec<User>,
}
