//! HTTP transport for the JIRA client.
//!
//! A [`Transport`] performs exactly one HTTP round trip and hands back the full
//! response body as text. [`HttpTransport`] is the `reqwest` implementation
//! used in production.

use std::fmt;
use std::future::Future;

use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};

use super::error::{ApiError, Result};

/// The HTTP verbs used by the JIRA API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// The upper-case verb as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Whether requests with this method may carry a body.
    pub fn allows_body(&self) -> bool {
        !matches!(self, Method::Get)
    }

    fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outgoing request, fully prepared except for sending.
#[derive(Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// The HTTP verb.
    pub method: Method,
    /// The absolute URL.
    pub url: String,
    /// Header name/value pairs in insertion order.
    pub headers: Vec<(String, String)>,
    /// The serialized JSON payload, if any.
    pub body: Option<String>,
}

impl HttpRequest {
    /// Create a request with no headers and no body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Set a header, replacing any existing value with the same
    /// (case-insensitive) name.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.to_string()));
    }

    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(n, v)| {
                if n.eq_ignore_ascii_case("authorization") {
                    (n.as_str(), "<redacted>")
                } else {
                    (n.as_str(), v.as_str())
                }
            })
            .collect();
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &headers)
            .field("body", &self.body)
            .finish()
    }
}

/// Performs a single HTTP round trip.
///
/// Returns the full response body on a 2xx status. Network failures and
/// non-success statuses are reported as [`ApiError`]s of kind
/// [`Transport`](super::ErrorKind::Transport).
pub trait Transport: Send + Sync {
    /// Send `request` and wait for the complete response body.
    fn perform(&self, request: HttpRequest) -> impl Future<Output = Result<String>> + Send;
}

/// [`Transport`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport with a default `reqwest` client.
    pub fn new() -> Result<Self> {
        let client = Client::builder().build().map_err(ApiError::Network)?;
        Ok(Self { client })
    }

    /// Wrap an existing `reqwest` client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn perform(&self, request: HttpRequest) -> Result<String> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.client.request(method.to_reqwest(), url.as_str());
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let response_url = response.url().to_string();
        let text = response.text().await?;

        if status.is_success() {
            debug!(status = status.as_u16(), bytes = text.len(), "Received response");
            Ok(text)
        } else {
            debug!("Error response body: {}", text);
            Err(error_from_response(status, &response_url, &text))
        }
    }
}

/// Create an appropriate error from an HTTP response.
pub(crate) fn error_from_response(status: StatusCode, url: &str, body: &str) -> ApiError {
    if !body.is_empty() {
        // JIRA often returns JSON with errorMessages and/or errors
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
            if let Some(arr) = json.get("errorMessages").and_then(|m| m.as_array()) {
                let messages: Vec<&str> = arr.iter().filter_map(|v| v.as_str()).collect();
                if !messages.is_empty() {
                    return ApiError::from_status(status, &messages.join(", "));
                }
            }
            if let Some(obj) = json.get("errors").and_then(|e| e.as_object()) {
                let error_strings: Vec<String> =
                    obj.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                if !error_strings.is_empty() {
                    return ApiError::from_status(status, &error_strings.join(", "));
                }
            }
        }
    }

    ApiError::from_status(status, url)
}


#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn test_method_verbs() {
        assert_eq!(Method::Get.as_str(), "GET");
        assert_eq!(Method::Delete.to_string(), "DELETE");
        assert!(!Method::Get.allows_body());
        assert!(Method::Put.allows_body());
    }

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let mut request = HttpRequest::new(Method::Get, "http://h/");
        request.set_header("Content-Type", "text/plain");
        request.set_header("content-type", "application/json");

        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.header("CONTENT-TYPE"), Some("application/json"));
        assert_eq!(request.header("Accept"), None);
    }

    #[test]
    fn test_debug_redacts_authorization() {
        let mut request = HttpRequest::new(Method::Get, "http://h/");
        request.set_header("Authorization", "Basic Zm9vOmJhcg==");

        let debug_output = format!("{:?}", request);
        assert!(!debug_output.contains("Zm9vOmJhcg=="));
        assert!(debug_output.contains("<redacted>"));
    }

    #[test]
    fn test_error_from_response_uses_error_messages() {
        let body = r#"{"errorMessages":["Issue Does Not Exist"],"errors":{}}"#;
        let err = error_from_response(StatusCode::NOT_FOUND, "http://h/issue/X-1", body);
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "Issue Does Not Exist"));
    }

    #[test]
    fn test_error_from_response_uses_errors_map() {
        let body = r#"{"errorMessages":[],"errors":{"summary":"required"}}"#;
        let err = error_from_response(StatusCode::BAD_REQUEST, "http://h/issue", body);
        assert!(err.to_string().contains(r#"summary: "required""#));
    }

    #[test]
    fn test_error_from_response_falls_back_to_url() {
        let err = error_from_response(StatusCode::NOT_FOUND, "http://h/issue/X-1", "<html/>");
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "http://h/issue/X-1"));
    }

    #[tokio::test]
    async fn test_http_transport_sends_headers_and_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/api/2/issue/A-1/comment"))
            .and(header("Content-Type", "application/json"))
            .and(header("Authorization", "Basic Zm9vOmJhcg=="))
            .and(body_string(r#"{"body":"hi"}"#))
            .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"id":"10"}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::new().unwrap();
        let mut request = HttpRequest::new(
            Method::Post,
            format!("{}/rest/api/2/issue/A-1/comment", mock_server.uri()),
        );
        request.set_header("Content-Type", "application/json");
        request.set_header("Authorization", "Basic Zm9vOmJhcg==");
        request.body = Some(r#"{"body":"hi"}"#.to_string());

        let text = transport.perform(request).await.unwrap();
        assert_eq!(text, r#"{"id":"10"}"#);
    }

    #[tokio::test]
    async fn test_http_transport_maps_error_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/2/issue/NOPE-1"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "errorMessages": ["Issue Does Not Exist"],
                "errors": {}
            })))
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::new().unwrap();
        let request = HttpRequest::new(
            Method::Get,
            format!("{}/rest/api/2/issue/NOPE-1", mock_server.uri()),
        );

        let err = transport.perform(request).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "Issue Does Not Exist"));
    }

    #[tokio::test]
    async fn test_http_transport_malformed_url_is_network_error() {
        let transport = HttpTransport::new().unwrap();
        let request = HttpRequest::new(Method::Get, "not a url/issue/A-1");

        let err = transport.perform(request).await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }
}
