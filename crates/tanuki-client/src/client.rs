//! The single HTTP chokepoint for GitLab API calls.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use reqwest::redirect::Policy;
use reqwest::{Method, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::config::{Config, TlsPolicy};
use crate::error::{GitLabError, redact};
use crate::response::{GitLabResponse, Pagination};

/// Default per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest response body accepted, declared or streamed.
pub const MAX_RESPONSE_SIZE: u64 = 10 * 1024 * 1024;

const PRIVATE_TOKEN: &str = "private-token";
const USER_AGENT: &str = concat!("tanuki/", env!("CARGO_PKG_VERSION"));
const MAX_ERROR_TEXT: usize = 200;

/// Async client for the GitLab REST v4 API.
///
/// Owns one lazily built connection pool. Clones of the inner
/// [`reqwest::Client`] share that pool, so the lock is only held while the
/// handle is looked up or created, never across network I/O.
pub struct GitLabClient {
    config: Arc<Config>,
    timeout: Duration,
    http: Mutex<Option<reqwest::Client>>,
}

impl std::fmt::Debug for GitLabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GitLabClient {
    #[must_use]
    pub const fn new(config: Arc<Config>) -> Self {
        Self::with_timeout(config, REQUEST_TIMEOUT)
    }

    /// Like [`GitLabClient::new`] with a per-request timeout other than
    /// [`REQUEST_TIMEOUT`].
    #[must_use]
    pub const fn with_timeout(config: Arc<Config>, timeout: Duration) -> Self {
        Self {
            config,
            timeout,
            http: Mutex::const_new(None),
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Drop the pooled connection. The next request builds a fresh one.
    pub async fn close(&self) {
        if self.http.lock().await.take().is_some() {
            debug!("HTTP client closed");
        }
    }

    /// Whether a pooled connection currently exists.
    pub async fn is_open(&self) -> bool {
        self.http.lock().await.is_some()
    }

    async fn http(&self) -> Result<reqwest::Client, GitLabError> {
        let mut slot = self.http.lock().await;
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }
        let client = build_http_client(&self.config, self.timeout).await?;
        *slot = Some(client.clone());
        Ok(client)
    }

    /// Issue one API call and normalize the outcome.
    ///
    /// `path` is relative to the API base and must start with `/`.
    ///
    /// # Errors
    ///
    /// Returns a [`GitLabError`] for transport failures, oversized bodies,
    /// any status outside 2xx and bodies that are not valid JSON. Redirects
    /// are never followed.
    pub async fn request<Q, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<GitLabResponse, GitLabError>
    where
        Q: Serialize + Sync + ?Sized,
        B: Serialize + Sync + ?Sized,
    {
        let http = self.http().await?;
        let url = format!("{}{path}", self.config.api_base_url());

        debug!("API request: {method} {path}");

        let mut builder = http.request(method, &url);
        if let Some(query) = query {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| self.transport_error(e))?;

        if declared_length(response.headers()).is_some_and(|len| len > MAX_RESPONSE_SIZE) {
            return Err(self.too_large());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let body = self.read_body(response).await?;

        if !status.is_success() {
            return Err(self.classify_error(status, &headers, &body));
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(GitLabResponse::Deleted);
        }

        let is_text = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("text/plain"));
        if is_text {
            return Ok(GitLabResponse::Text(
                String::from_utf8_lossy(&body).into_owned(),
            ));
        }

        let value: Value = serde_json::from_slice(&body).map_err(|e| {
            GitLabError::api(
                status.as_u16(),
                format!("Invalid JSON response: {e}"),
                self.config.token(),
            )
        })?;

        Ok(GitLabResponse::from_json(value, || {
            Pagination::from_headers(&headers)
        }))
    }

    /// `GET` without query parameters.
    ///
    /// # Errors
    ///
    /// See [`GitLabClient::request`].
    pub async fn get(&self, path: &str) -> Result<GitLabResponse, GitLabError> {
        self.request::<(), ()>(Method::GET, path, None, None).await
    }

    /// `GET` with query parameters serialized from `query`.
    ///
    /// # Errors
    ///
    /// See [`GitLabClient::request`].
    pub async fn get_with_query<Q>(&self, path: &str, query: &Q) -> Result<GitLabResponse, GitLabError>
    where
        Q: Serialize + Sync + ?Sized,
    {
        self.request::<Q, ()>(Method::GET, path, Some(query), None).await
    }

    /// `POST` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`GitLabClient::request`].
    pub async fn post<B>(&self, path: &str, body: &B) -> Result<GitLabResponse, GitLabError>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.request::<(), B>(Method::POST, path, None, Some(body)).await
    }

    /// `POST` with no body, for action endpoints such as retry or cancel.
    ///
    /// # Errors
    ///
    /// See [`GitLabClient::request`].
    pub async fn post_empty(&self, path: &str) -> Result<GitLabResponse, GitLabError> {
        self.request::<(), ()>(Method::POST, path, None, None).await
    }

    /// `PUT` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`GitLabClient::request`].
    pub async fn put<B>(&self, path: &str, body: &B) -> Result<GitLabResponse, GitLabError>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.request::<(), B>(Method::PUT, path, None, Some(body)).await
    }

    /// `DELETE`.
    ///
    /// # Errors
    ///
    /// See [`GitLabClient::request`].
    pub async fn delete(&self, path: &str) -> Result<GitLabResponse, GitLabError> {
        self.request::<(), ()>(Method::DELETE, path, None, None).await
    }

    async fn read_body(&self, mut response: Response) -> Result<Vec<u8>, GitLabError> {
        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.transport_error(e))?
        {
            if (body.len() + chunk.len()) as u64 > MAX_RESPONSE_SIZE {
                return Err(self.too_large());
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    fn transport_error(&self, err: reqwest::Error) -> GitLabError {
        let prefix = if err.is_timeout() {
            "Request timeout"
        } else {
            "Request failed"
        };
        let err = err.without_url();
        GitLabError::api(0, format!("{prefix}: {err}"), self.config.token())
    }

    fn too_large(&self) -> GitLabError {
        GitLabError::api(0, "Response too large", self.config.token())
    }

    fn classify_error(&self, status: StatusCode, headers: &HeaderMap, body: &[u8]) -> GitLabError {
        let token = self.config.token();
        let message = redact(&extract_error_message(body), token);

        error!("API request failed with status {}", status.as_u16());

        match status {
            StatusCode::UNAUTHORIZED => GitLabError::permission_denied("Valid Personal Access Token"),
            StatusCode::FORBIDDEN => GitLabError::permission_denied("Required permission scope"),
            StatusCode::NOT_FOUND => GitLabError::not_found(&message),
            StatusCode::TOO_MANY_REQUESTS => GitLabError::rate_limited(
                headers
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse::<u64>().ok()),
            ),
            _ => GitLabError::api(status.as_u16(), message, token),
        }
    }
}

async fn build_http_client(config: &Config, timeout: Duration) -> Result<reqwest::Client, GitLabError> {
    let mut token = HeaderValue::from_str(config.token().expose_secret()).map_err(|_| {
        GitLabError::configuration("GITLAB_TOKEN contains characters not valid in an HTTP header")
    })?;
    token.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(HeaderName::from_static(PRIVATE_TOKEN), token);

    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .redirect(Policy::none())
        .timeout(timeout)
        .user_agent(USER_AGENT);

    match config.tls() {
        TlsPolicy::Verify => {}
        TlsPolicy::Disabled => builder = builder.danger_accept_invalid_certs(true),
        TlsPolicy::CustomCa(path) => {
            let pem = tokio::fs::read(path).await.map_err(|e| {
                GitLabError::configuration(format!(
                    "cannot read CA bundle {}: {e}",
                    path.display()
                ))
            })?;
            for cert in reqwest::Certificate::from_pem_bundle(&pem).map_err(|e| {
                GitLabError::configuration(format!("invalid CA bundle {}: {e}", path.display()))
            })? {
                builder = builder.add_root_certificate(cert);
            }
        }
    }

    debug!("Building HTTP client for {}", config.gitlab_url());

    builder
        .build()
        .map_err(|e| GitLabError::configuration(format!("failed to build HTTP client: {e}")))
}

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

fn extract_error_message(body: &[u8]) -> String {
    const UNKNOWN: &str = "Unknown error";

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => {
            let field = ["message", "error"]
                .iter()
                .filter_map(|key| map.get(*key))
                .find(|v| !v.is_null());
            match field {
                Some(Value::String(s)) if !s.is_empty() => s.clone(),
                Some(Value::String(_)) | None => UNKNOWN.to_string(),
                Some(other) => other.to_string(),
            }
        }
        Ok(other) => other.to_string(),
        Err(_) => {
            let text = String::from_utf8_lossy(body);
            if text.is_empty() {
                UNKNOWN.to_string()
            } else {
                text.chars().take(MAX_ERROR_TEXT).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]

    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const TOKEN: &str = "glpat-test-token-0123";

    fn client_for(server: &MockServer) -> GitLabClient {
        let config = Config::new(&server.uri(), TOKEN, TlsPolicy::Verify).unwrap();
        GitLabClient::new(Arc::new(config))
    }

    #[tokio::test]
    async fn test_sends_private_token_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/user"))
            .and(header("private-token", TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server).get("/user").await.unwrap();
        assert_eq!(result.into_json(), json!({"id": 1}));
    }

    #[tokio::test]
    async fn test_list_with_pagination() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects"))
            .and(query_param("per_page", "20"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"id": 1}, {"id": 2}]))
                    .insert_header("x-total", "2")
                    .insert_header("x-page", "1")
                    .insert_header("x-per-page", "20"),
            )
            .mount(&server)
            .await;

        let result = client_for(&server)
            .get_with_query("/projects", &[("per_page", 20)])
            .await
            .unwrap();
        let GitLabResponse::List { items, pagination } = result.clone() else {
            panic!("expected list, got {result:?}");
        };
        assert_eq!(items.len(), 2);
        let pagination = pagination.unwrap();
        assert_eq!(pagination.total, Some(2));
        assert_eq!(pagination.page, Some(1));
        assert_eq!(pagination.per_page, Some(20));

        let rendered = result.into_json();
        let keys: Vec<_> = rendered["pagination"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 3);
        assert!(rendered["pagination"].get("total_pages").is_none());
        assert!(rendered["pagination"].get("next_page").is_none());
        assert!(rendered["pagination"].get("prev_page").is_none());
    }

    #[tokio::test]
    async fn test_no_content_is_deleted() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v4/projects/1"))
            .respond_with(ResponseTemplate::new(204).insert_header("content-type", "application/json"))
            .mount(&server)
            .await;

        let result = client_for(&server).delete("/projects/1").await.unwrap();
        assert_eq!(result, GitLabResponse::Deleted);
        assert_eq!(result.into_json(), json!({"status": "deleted"}));
    }

    #[tokio::test]
    async fn test_plain_text_body() {
        let server = MockServer::start().await;
        let trace = "Running tests...\nAll 42 tests passed.";
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/1/jobs/7/trace"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(trace, "text/plain; charset=utf-8"))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .get("/projects/1/jobs/7/trace")
            .await
            .unwrap();
        assert_eq!(result.into_json(), json!({ "content": trace }));
    }

    #[tokio::test]
    async fn test_status_classification() {
        let server = MockServer::start().await;
        Mock::given(path("/api/v4/unauthorized"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "401 Unauthorized"})))
            .mount(&server)
            .await;
        Mock::given(path("/api/v4/forbidden"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "403 Forbidden"})))
            .mount(&server)
            .await;
        Mock::given(path("/api/v4/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "404 Project Not Found"})))
            .mount(&server)
            .await;
        Mock::given(path("/api/v4/limited"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "60"))
            .mount(&server)
            .await;

        let client = client_for(&server);

        let err = client.get("/unauthorized").await.unwrap_err();
        assert_eq!(err, GitLabError::permission_denied("Valid Personal Access Token"));

        let err = client.get("/forbidden").await.unwrap_err();
        assert_eq!(err, GitLabError::permission_denied("Required permission scope"));

        let err = client.get("/missing").await.unwrap_err();
        assert_eq!(err, GitLabError::not_found("404 Project Not Found"));

        let err = client.get("/limited").await.unwrap_err();
        assert_eq!(err, GitLabError::rate_limited(Some(60)));
    }

    #[tokio::test]
    async fn test_rate_limit_with_http_date_has_no_hint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(429).insert_header("retry-after", "Wed, 21 Oct 2026 07:28:00 GMT"),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).get("/projects").await.unwrap_err();
        assert_eq!(err, GitLabError::rate_limited(None));
    }

    #[tokio::test]
    async fn test_other_errors_are_redacted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(json!({"error": format!("token {TOKEN} is not allowed here")})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .post("/projects", &json!({"name": "x"}))
            .await
            .unwrap_err();
        let rendered = err.to_string();
        assert!(!rendered.contains(TOKEN));
        assert_eq!(rendered, "GitLab API error 422: token *** is not allowed here");
    }

    #[tokio::test]
    async fn test_non_json_error_body_is_truncated() {
        let server = MockServer::start().await;
        let html = format!("<html>{}</html>", "x".repeat(500));
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_raw(html.clone(), "text/html"))
            .mount(&server)
            .await;

        let err = client_for(&server).get("/projects").await.unwrap_err();
        let GitLabError::Api { code, message, .. } = err else {
            panic!("expected api error");
        };
        assert_eq!(code, 502);
        assert_eq!(message.chars().count(), 200);
        assert!(html.starts_with(&message));
    }

    #[tokio::test]
    async fn test_invalid_json_keeps_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("{not json", "application/json"))
            .mount(&server)
            .await;

        let err = client_for(&server).get("/projects").await.unwrap_err();
        let GitLabError::Api { code, message, .. } = err else {
            panic!("expected api error");
        };
        assert_eq!(code, 200);
        assert!(message.starts_with("Invalid JSON response"));
    }

    /// Serve one raw HTTP/1.1 response on a loopback port, writing `head`
    /// followed by each chunk of `body`.
    async fn serve_raw_once(head: String, body: Vec<Vec<u8>>) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0_u8; 4096];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    return;
                }
                request.extend_from_slice(&buf[..n]);
            }
            if socket.write_all(head.as_bytes()).await.is_err() {
                return;
            }
            for chunk in body {
                if socket.write_all(&chunk).await.is_err() {
                    return;
                }
            }
            // Hold the connection open so the client decides when to stop.
            tokio::time::sleep(Duration::from_secs(5)).await;
        });
        format!("http://{addr}")
    }

    fn raw_client(uri: &str, timeout: Duration) -> GitLabClient {
        let config = Config::new(uri, TOKEN, TlsPolicy::Verify).unwrap();
        GitLabClient::with_timeout(Arc::new(config), timeout)
    }

    #[tokio::test]
    async fn test_oversized_declared_length_rejected_before_read() {
        // Declares far more than it sends: reading the body would stall
        // until the timeout instead of failing on the header.
        let head = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\r\n",
            MAX_RESPONSE_SIZE * 2
        );
        let uri = serve_raw_once(head, vec![b"{".to_vec()]).await;

        let err = raw_client(&uri, Duration::from_secs(3))
            .get("/projects")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "GitLab API error 0: Response too large");
    }

    #[tokio::test]
    async fn test_oversized_chunked_body_rejected_while_streaming() {
        let head = "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\n\
                    transfer-encoding: chunked\r\n\r\n"
            .to_string();
        let chunk_size: usize = 1024 * 1024;
        let mut chunk = format!("{chunk_size:x}\r\n").into_bytes();
        chunk.extend(std::iter::repeat_n(b'x', chunk_size));
        chunk.extend_from_slice(b"\r\n");
        let chunks = usize::try_from(MAX_RESPONSE_SIZE).unwrap() / chunk_size + 2;
        let mut body = vec![chunk; chunks];
        body.push(b"0\r\n\r\n".to_vec());
        let uri = serve_raw_once(head, body).await;

        let err = raw_client(&uri, Duration::from_secs(10))
            .get("/projects")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "GitLab API error 0: Response too large");
    }

    #[tokio::test]
    async fn test_transport_failure_is_code_zero() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = raw_client(&format!("http://127.0.0.1:{port}"), REQUEST_TIMEOUT);
        let err = client.get("/projects").await.unwrap_err();
        let GitLabError::Api { code, message, .. } = err.clone() else {
            panic!("expected api error, got {err:?}");
        };
        assert_eq!(code, 0);
        assert!(message.starts_with("Request failed"), "{message}");
        assert!(!message.contains(TOKEN));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = raw_client(&server.uri(), Duration::from_millis(100))
            .get("/projects")
            .await
            .unwrap_err();
        let GitLabError::Api { code, message, .. } = err.clone() else {
            panic!("expected api error, got {err:?}");
        };
        assert_eq!(code, 0);
        assert!(message.starts_with("Request timeout"), "{message}");
    }

    #[tokio::test]
    async fn test_redirect_is_not_followed() {
        let elsewhere = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"moved": true})))
            .expect(0)
            .mount(&elsewhere)
            .await;

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/1"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", format!("{}/landing", elsewhere.uri()).as_str()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server).get("/projects/1").await.unwrap_err();
        let GitLabError::Api { code, .. } = err.clone() else {
            panic!("expected api error, got {err:?}");
        };
        assert_eq!(code, 302);
        assert!(elsewhere.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn test_scalar_body_is_wrapped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
            .mount(&server)
            .await;

        let result = client_for(&server).get("/flag").await.unwrap();
        assert_eq!(result.into_json(), json!({"value": true}));
    }

    #[tokio::test]
    async fn test_put_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/v4/projects/1/issues/2"))
            .and(body_json(json!({"state_event": "close"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"iid": 2, "state": "closed"})))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server)
            .put("/projects/1/issues/2", &json!({"state_event": "close"}))
            .await
            .unwrap();
        assert_eq!(result.into_json()["state"], "closed");
    }

    #[tokio::test]
    async fn test_close_and_reopen() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(!client.is_open().await);
        client.get("/version").await.unwrap();
        assert!(client.is_open().await);
        client.close().await;
        assert!(!client.is_open().await);
        client.get("/version").await.unwrap();
        assert!(client.is_open().await);
    }

    #[test]
    fn test_extract_error_message() {
        assert_eq!(extract_error_message(br#"{"message":"boom"}"#), "boom");
        assert_eq!(extract_error_message(br#"{"error":"invalid_grant"}"#), "invalid_grant");
        assert_eq!(
            extract_error_message(br#"{"message":{"name":["has already been taken"]}}"#),
            r#"{"name":["has already been taken"]}"#
        );
        assert_eq!(extract_error_message(br"{}"), "Unknown error");
        assert_eq!(extract_error_message(b""), "Unknown error");
        assert_eq!(extract_error_message(br#"["a"]"#), r#"["a"]"#);
    }

    #[test]
    fn test_debug_hides_token() {
        let config = Config::new("https://gitlab.com", TOKEN, TlsPolicy::Verify).unwrap();
        let client = GitLabClient::new(Arc::new(config));
        assert!(!format!("{client:?}").contains(TOKEN));
    }
}
