//! Request dispatch for the JIRA REST API.
//!
//! [`RestClient`] turns a method, a resource path relative to the base URL and
//! an optional body into an authenticated HTTP exchange and parses the JSON
//! object that comes back. Failures at every stage are returned as typed
//! [`ApiError`]s; [`RestClient::execute_document`] flattens them into the
//! `{"message": ...}` document older callers expect.

use std::fmt;
use std::sync::Arc;

use reqwest::header;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use super::auth::{Authenticator, BasicAuthenticator};
use super::error::{ApiError, Result};
use super::transport::{HttpRequest, HttpTransport, Method, Transport};

/// A JSON object returned by the API.
///
/// On the legacy surface this is also used for the synthetic
/// `{"message": ...}` error report.
pub type ResponseDocument = Map<String, Value>;

/// Key of the single field in a flattened error document.
pub const MESSAGE_KEY: &str = "message";

/// A logical request: method, resource path and optional body.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec<B = Value> {
    pub method: Method,
    /// Path relative to the base URL, without a leading slash.
    pub resource: String,
    pub body: Option<B>,
}

impl RequestSpec<()> {
    pub fn get(resource: impl Into<String>) -> Self {
        Self::new(Method::Get, resource, None)
    }

    pub fn delete(resource: impl Into<String>) -> Self {
        Self::new(Method::Delete, resource, None)
    }
}

impl<B> RequestSpec<B> {
    pub fn new(method: Method, resource: impl Into<String>, body: Option<B>) -> Self {
        Self {
            method,
            resource: resource.into(),
            body,
        }
    }

    pub fn post(resource: impl Into<String>, body: B) -> Self {
        Self::new(Method::Post, resource, Some(body))
    }

    pub fn put(resource: impl Into<String>, body: B) -> Self {
        Self::new(Method::Put, resource, Some(body))
    }
}

/// Authenticated JSON-over-HTTP dispatcher rooted at a base URL.
pub struct RestClient<T = HttpTransport> {
    /// Base URL, always ending in exactly one `/`.
    base_url: String,
    authenticator: Arc<dyn Authenticator>,
    transport: T,
}

impl RestClient<HttpTransport> {
    /// Create a client that authenticates with HTTP Basic credentials over
    /// the default `reqwest` transport.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if `base_url` is empty.
    pub fn new(base_url: &str, username: &str, password: &str) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        Ok(Self {
            base_url,
            authenticator: Arc::new(BasicAuthenticator::new(username, password)),
            transport: HttpTransport::new()?,
        })
    }
}

impl<T: Transport> RestClient<T> {
    /// Create a client from explicit parts.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if `base_url` is empty.
    pub fn with_parts(
        base_url: &str,
        authenticator: impl Authenticator + 'static,
        transport: T,
    ) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            authenticator: Arc::new(authenticator),
            transport,
        })
    }

    /// Get the normalized base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a resource path.
    pub fn url_for(&self, resource: &str) -> String {
        format!("{}{}", self.base_url, resource)
    }

    /// Execute a request and parse the response as a JSON object.
    ///
    /// GET requests never carry a body, even when one is supplied. An empty
    /// response body (for instance `204 No Content`) yields an empty object.
    #[instrument(skip_all, fields(method = %method, resource = %resource))]
    pub async fn execute<B>(
        &self,
        method: Method,
        resource: &str,
        body: Option<&B>,
    ) -> Result<ResponseDocument>
    where
        B: Serialize + ?Sized,
    {
        let payload = match body {
            Some(body) if method.allows_body() => {
                Some(serde_json::to_string(body).map_err(ApiError::Serialization)?)
            }
            Some(_) => {
                debug!("Ignoring body supplied with GET request");
                None
            }
            None => None,
        };

        let mut request = HttpRequest::new(method, self.url_for(resource));
        request.set_header(header::CONTENT_TYPE.as_str(), "application/json");
        request.set_header(header::ACCEPT.as_str(), "application/json");
        request.body = payload;

        // Credentials go on last, once headers and body are final.
        self.authenticator.authenticate(&mut request);

        let text = self.transport.perform(request).await?;
        parse_document(&text)
    }

    /// Execute a request and deserialize the response into `R`.
    pub async fn execute_as<R, B>(
        &self,
        method: Method,
        resource: &str,
        body: Option<&B>,
    ) -> Result<R>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let document = self.execute(method, resource, body).await?;
        from_document(document)
    }

    /// Execute a request, flattening any failure into `{"message": ...}`.
    ///
    /// This never fails. Note that a genuine response with a top-level
    /// `message` field looks the same as a flattened error; prefer
    /// [`execute`](Self::execute) when the distinction matters.
    pub async fn execute_document<B>(
        &self,
        method: Method,
        resource: &str,
        body: Option<&B>,
    ) -> ResponseDocument
    where
        B: Serialize + ?Sized,
    {
        into_document(self.execute(method, resource, body).await)
    }

    /// Execute a [`RequestSpec`].
    pub async fn send<B: Serialize>(&self, spec: RequestSpec<B>) -> Result<ResponseDocument> {
        self.execute(spec.method, &spec.resource, spec.body.as_ref())
            .await
    }

    /// Execute a [`RequestSpec`] and deserialize the response into `R`.
    pub async fn send_as<R, B>(&self, spec: RequestSpec<B>) -> Result<R>
    where
        R: DeserializeOwned,
        B: Serialize,
    {
        self.execute_as(spec.method, &spec.resource, spec.body.as_ref())
            .await
    }
}

impl<T> fmt::Debug for RestClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Normalize the base URL so that it ends with exactly one `/`.
///
/// Idempotent. Fails only when the URL is empty.
pub fn normalize_base_url(url: &str) -> Result<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidUrl(
            "base URL must be a non-empty string".to_string(),
        ));
    }

    // Warn if not HTTPS (but don't enforce for localhost/testing)
    if !trimmed.starts_with("https://") && !trimmed.contains("localhost") {
        warn!(
            "URL does not use HTTPS: {}. This is insecure for production use.",
            trimmed
        );
    }

    Ok(format!("{}/", trimmed.trim_end_matches('/')))
}

/// Build the flattened `{"message": ...}` document for an error.
pub fn error_document(error: &ApiError) -> ResponseDocument {
    let mut document = Map::new();
    document.insert(MESSAGE_KEY.to_string(), Value::String(error.to_string()));
    document
}

/// Flatten a dispatch result into a document, logging the failure if any.
pub fn into_document(result: Result<ResponseDocument>) -> ResponseDocument {
    match result {
        Ok(document) => document,
        Err(e) => {
            warn!(kind = %e.kind(), "Request failed: {}", e);
            error_document(&e)
        }
    }
}

/// Parse a response body as a JSON object.
pub(crate) fn parse_document(text: &str) -> Result<ResponseDocument> {
    if text.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(document)) => Ok(document),
        Ok(other) => Err(ApiError::InvalidResponse(format!(
            "expected a JSON object, got {}",
            json_type_name(&other)
        ))),
        Err(e) => Err(ApiError::InvalidResponse(format!(
            "Failed to parse response: {}",
            e
        ))),
    }
}

/// Deserialize a parsed document into a typed schema.
pub(crate) fn from_document<R: DeserializeOwned>(document: ResponseDocument) -> Result<R> {
    serde_json::from_value(Value::Object(document))
        .map_err(|e| ApiError::InvalidResponse(format!("Unexpected response shape: {}", e)))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::error::ErrorKind;
    use crate::api::transport::mock::{MockTransport, Reply};

    fn client(base_url: &str, transport: MockTransport) -> RestClient<MockTransport> {
        RestClient::with_parts(base_url, BasicAuthenticator::new("foo", "bar"), transport)
            .unwrap()
    }

    /// Always fails to serialize.
    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> std::result::Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot serialize this body"))
        }
    }

    #[test]
    fn test_normalize_base_url_appends_single_slash() {
        assert_eq!(
            normalize_base_url("http://h/rest/api/2").unwrap(),
            "http://h/rest/api/2/"
        );
    }

    #[test]
    fn test_normalize_base_url_is_idempotent() {
        let once = normalize_base_url("https://company.atlassian.net/rest/api/2").unwrap();
        let twice = normalize_base_url(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_base_url_collapses_trailing_slashes() {
        assert_eq!(
            normalize_base_url("https://company.atlassian.net///").unwrap(),
            "https://company.atlassian.net/"
        );
    }

    #[test]
    fn test_normalize_base_url_rejects_empty() {
        assert!(matches!(normalize_base_url(""), Err(ApiError::InvalidUrl(_))));
        assert!(matches!(normalize_base_url("   "), Err(ApiError::InvalidUrl(_))));
    }

    #[test]
    fn test_empty_base_url_fails_before_any_request() {
        let transport = MockTransport::new();
        let result = RestClient::with_parts(
            "",
            BasicAuthenticator::new("foo", "bar"),
            transport.clone(),
        );

        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_url_for_has_single_separator() {
        let rest = client("http://h/rest/api/2", MockTransport::new());
        assert_eq!(rest.url_for("issue/ABC-1"), "http://h/rest/api/2/issue/ABC-1");
    }

    #[tokio::test]
    async fn test_execute_stamps_headers_and_serializes_body() {
        let transport = MockTransport::new();
        transport.reply_json(json!({"id": "10000", "key": "ABC-1"}));
        let rest = client("http://h/rest/api/2", transport.clone());

        let body = json!({"fields": {"summary": "Hello"}});
        let document = rest
            .execute(Method::Post, "issue", Some(&body))
            .await
            .unwrap();

        assert_eq!(document["key"], "ABC-1");
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url, "http://h/rest/api/2/issue");
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(request.header("Authorization"), Some("Basic Zm9vOmJhcg=="));
        let sent: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, body);
    }

    /// Records the request as it looks when credentials are applied.
    #[derive(Default)]
    struct RecordingAuthenticator {
        seen: std::sync::Mutex<Vec<(Option<String>, Option<String>)>>,
    }

    impl Authenticator for Arc<RecordingAuthenticator> {
        fn authenticate(&self, request: &mut HttpRequest) {
            self.seen.lock().unwrap().push((
                request.body.clone(),
                request.header("Content-Type").map(str::to_string),
            ));
            request.set_header("Authorization", "Basic recorded");
        }
    }

    #[tokio::test]
    async fn test_authenticate_sees_final_body_and_headers() {
        let transport = MockTransport::new();
        transport.reply_json(json!({}));
        let auth = Arc::new(RecordingAuthenticator::default());
        let rest =
            RestClient::with_parts("http://h/rest/api/2", auth.clone(), transport.clone()).unwrap();

        rest.execute(Method::Post, "issue/ABC-1/comment", Some(&json!({"body": "hi"})))
            .await
            .unwrap();

        let seen = auth.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (body, content_type) = &seen[0];
        assert_eq!(body.as_deref(), Some(r#"{"body":"hi"}"#));
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert_eq!(
            transport.requests()[0].header("Authorization"),
            Some("Basic recorded")
        );
    }

    #[tokio::test]
    async fn test_get_never_sends_body() {
        let transport = MockTransport::new();
        transport.reply_json(json!({}));
        let rest = client("http://h/rest/api/2", transport.clone());

        rest.execute(Method::Get, "issue/ABC-1", Some(&json!({"ignored": true})))
            .await
            .unwrap();

        assert_eq!(transport.requests()[0].body, None);
    }

    #[tokio::test]
    async fn test_get_ignores_unserializable_body() {
        let transport = MockTransport::new();
        transport.reply_json(json!({"ok": true}));
        let rest = client("http://h/", transport.clone());

        let document = rest
            .execute(Method::Get, "search", Some(&Unserializable))
            .await
            .unwrap();
        assert_eq!(document["ok"], true);
    }

    #[tokio::test]
    async fn test_response_object_is_returned_unchanged() {
        let payload = json!({
            "key": "ABC-1",
            "fields": {"labels": ["a", "b"], "customfield_10016": 3.5, "parent": null},
            "nested": {"deep": {"deeper": [1, {"x": false}]}}
        });
        let transport = MockTransport::new();
        transport.reply_json(payload.clone());
        let rest = client("http://h/", transport);

        let document = rest
            .execute::<Value>(Method::Get, "issue/ABC-1", None)
            .await
            .unwrap();
        assert_eq!(Value::Object(document), payload);
    }

    #[tokio::test]
    async fn test_empty_response_is_empty_object() {
        let transport = MockTransport::new();
        transport.reply(Reply::Body(String::new()));
        let rest = client("http://h/", transport);

        let document = rest
            .execute(Method::Put, "issue/ABC-1", Some(&json!({"fields": {}})))
            .await
            .unwrap();
        assert!(document.is_empty());
    }

    #[tokio::test]
    async fn test_serialization_failure_is_typed() {
        let transport = MockTransport::new();
        let rest = client("http://h/", transport.clone());

        let err = rest
            .execute(Method::Post, "issue", Some(&Unserializable))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Serialization);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_non_json_response_is_deserialization_error() {
        let transport = MockTransport::new();
        transport.reply(Reply::Body("<html>login</html>".to_string()));
        let rest = client("http://h/", transport);

        let err = rest
            .execute::<Value>(Method::Get, "issue/ABC-1", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Deserialization);
    }

    #[tokio::test]
    async fn test_non_object_json_is_deserialization_error() {
        let transport = MockTransport::new();
        transport.reply_json(json!([1, 2, 3]));
        let rest = client("http://h/", transport);

        let err = rest
            .execute::<Value>(Method::Get, "issue/ABC-1", None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_execute_document_never_fails() {
        let transport = MockTransport::new();
        for _ in 0..3 {
            transport.reply(Reply::Status(503, String::new()));
        }
        let rest = client("http://h/", transport);

        for resource in ["issue/A-1", "search", "issueLink/"] {
            let document = tokio_test::block_on(rest.execute_document::<Value>(
                Method::Get,
                resource,
                None,
            ));
            assert_eq!(document.len(), 1);
            let message = document[MESSAGE_KEY].as_str().unwrap();
            assert!(!message.is_empty());
        }
    }

    #[test]
    fn test_execute_document_flattens_serialization_error() {
        let rest = client("http://h/", MockTransport::new());

        let document = tokio_test::block_on(rest.execute_document(
            Method::Post,
            "issue",
            Some(&Unserializable),
        ));
        let message = document[MESSAGE_KEY].as_str().unwrap();
        assert!(message.contains("cannot serialize this body"));
    }

    #[tokio::test]
    async fn test_execute_as_typed_response() {
        #[derive(serde::Deserialize)]
        struct Created {
            key: String,
        }

        let transport = MockTransport::new();
        transport.reply_json(json!({"id": "1", "key": "ABC-2", "self": "http://h/issue/1"}));
        let rest = client("http://h/", transport);

        let created: Created = rest
            .send_as(RequestSpec::post("issue", json!({"fields": {}})))
            .await
            .unwrap();
        assert_eq!(created.key, "ABC-2");
    }

    #[tokio::test]
    async fn test_execute_as_shape_mismatch() {
        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Created {
            key: String,
        }

        let transport = MockTransport::new();
        transport.reply_json(json!({"id": "1"}));
        let rest = client("http://h/", transport);

        let err = rest
            .send_as::<Created, _>(RequestSpec::get("issue/ABC-1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Deserialization);
    }

    #[test]
    fn test_error_document_shape() {
        let document = error_document(&ApiError::NotFound("Issue Does Not Exist".into()));
        assert_eq!(
            Value::Object(document),
            json!({"message": "Resource not found: Issue Does Not Exist"})
        );
    }

    #[test]
    fn test_debug_hides_authenticator() {
        let rest = client("http://h/", MockTransport::new());
        let debug_output = format!("{:?}", rest);
        assert!(debug_output.contains("http://h/"));
        assert!(!debug_output.contains("Zm9v"));
    }
}
