//! A stub n8n API for tests.
//!
//! Wraps a wiremock [`MockServer`] mounted under the same `/api/v1` prefix as
//! a real n8n instance, so tests can point a forwarder at
//! [`StubUpstream::base_url`] and register responses with upstream paths as
//! they appear in the route table.
//!
//! ```rust,ignore
//! let upstream = StubUpstream::start().await;
//! upstream.respond("GET", "/workflows/7", 200, r#"{"id":"7"}"#).await;
//! // ... forward `getWorkflow` with `{"workflowId": "7"}` ...
//! assert_eq!(upstream.received().await.len(), 1);
//! ```

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const API_PREFIX: &str = "/api/v1";

/// API key the stub expects in `X-N8N-API-KEY`.
pub const TEST_API_KEY: &str = "test-n8n-api-key";

pub struct StubUpstream {
    server: MockServer,
}

impl StubUpstream {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL to configure the forwarder with, including the API prefix.
    pub fn base_url(&self) -> String {
        format!("{}{API_PREFIX}", self.server.uri())
    }

    /// Answers `method upstream_path` with a JSON body. The query string is
    /// not part of the match.
    pub async fn respond(&self, http_method: &str, upstream_path: &str, status: u16, body: &str) {
        self.respond_with(
            http_method,
            upstream_path,
            ResponseTemplate::new(status).set_body_raw(body.to_string(), "application/json"),
        )
        .await;
    }

    /// Answers `method upstream_path` with a non-JSON body.
    pub async fn respond_text(&self, http_method: &str, upstream_path: &str, status: u16, body: &str) {
        self.respond_with(
            http_method,
            upstream_path,
            ResponseTemplate::new(status).set_body_raw(body.to_string(), "text/plain"),
        )
        .await;
    }

    pub async fn respond_with(&self, http_method: &str, upstream_path: &str, template: ResponseTemplate) {
        Mock::given(method(http_method))
            .and(path(format!("{API_PREFIX}{upstream_path}")))
            .respond_with(template)
            .mount(&self.server)
            .await;
    }

    /// Every request the stub has seen, in arrival order.
    pub async fn received(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }
}

/// A base URL on a local port nothing listens on.
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("read local address").port();
    drop(listener);

    format!("http://127.0.0.1:{port}{API_PREFIX}")
}
