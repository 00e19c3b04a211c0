//! Request builders for the JIRA REST API v2 resources.
//!
//! Each function maps typed parameters to a [`RequestSpec`] without touching
//! the network, so both client surfaces share the exact same paths and
//! bodies.

use super::rest::RequestSpec;
use super::types::{
    CommentRequest, IssueInput, IssueLinkRequest, IssueLinkType, IssueQuery, SearchRequest,
    TransitionId, TransitionRequest,
};

/// Append `name=value` pairs to a resource path, percent-encoding the values.
///
/// No `?` is added when there are no pairs.
pub fn with_query(resource: &str, pairs: &[(&str, String)]) -> String {
    if pairs.is_empty() {
        return resource.to_string();
    }

    let query = pairs
        .iter()
        .map(|(name, value)| format!("{}={}", name, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", resource, query)
}

fn issue_path(issue_key: &str) -> String {
    format!("issue/{}", issue_key)
}

/// `GET issue/{key}` with optional `fields`, `expand` and `properties`.
pub fn get_issue(issue_key: &str, query: &IssueQuery) -> RequestSpec<()> {
    RequestSpec::get(with_query(&issue_path(issue_key), &query.pairs()))
}

/// `POST search`.
pub fn search(request: SearchRequest) -> RequestSpec<SearchRequest> {
    RequestSpec::post("search", request)
}

/// `POST issue`.
pub fn create_issue(input: IssueInput) -> RequestSpec<IssueInput> {
    RequestSpec::post("issue", input)
}

/// `PUT issue/{key}`.
pub fn update_issue(issue_key: &str, input: IssueInput) -> RequestSpec<IssueInput> {
    RequestSpec::put(issue_path(issue_key), input)
}

/// `POST issueLink/`.
pub fn link_issues(
    inward_key: &str,
    outward_key: &str,
    link_type: IssueLinkType,
) -> RequestSpec<IssueLinkRequest> {
    RequestSpec::post(
        "issueLink/",
        IssueLinkRequest::new(inward_key, outward_key, link_type),
    )
}

/// `GET issue/{key}/transitions`.
pub fn get_transitions(issue_key: &str) -> RequestSpec<()> {
    RequestSpec::get(format!("{}/transitions", issue_path(issue_key)))
}

/// `POST issue/{key}/transitions`.
pub fn transition_issue(issue_key: &str, transition_id: &str) -> RequestSpec<TransitionRequest> {
    RequestSpec::post(
        format!("{}/transitions", issue_path(issue_key)),
        TransitionRequest {
            transition: TransitionId {
                id: transition_id.to_string(),
            },
        },
    )
}

/// `POST issue/{key}/comment`.
pub fn add_comment(issue_key: &str, body: &str) -> RequestSpec<CommentRequest> {
    RequestSpec::post(
        format!("{}/comment", issue_path(issue_key)),
        CommentRequest {
            body: body.to_string(),
        },
    )
}

/// `GET issue/{key}/watchers`.
pub fn get_watchers(issue_key: &str) -> RequestSpec<()> {
    RequestSpec::get(format!("{}/watchers", issue_path(issue_key)))
}

/// `POST issue/{key}/watchers`; the body is the bare JSON string username.
pub fn add_watcher(issue_key: &str, username: &str) -> RequestSpec<String> {
    RequestSpec::post(
        format!("{}/watchers", issue_path(issue_key)),
        username.to_string(),
    )
}

/// `DELETE issue/{key}/watchers?username=...`.
pub fn remove_watcher(issue_key: &str, username: &str) -> RequestSpec<()> {
    RequestSpec::delete(with_query(
        &format!("{}/watchers", issue_path(issue_key)),
        &[("username", username.to_string())],
    ))
}
