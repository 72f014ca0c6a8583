use crate::body::{InboundBody, is_blank};
use crate::errors::{ConfigError, ForwardError, Result};
use crate::routes::{self, RouteDescriptor};
use crate::upstream::{UpstreamClient, UpstreamConfig, UpstreamResponse};
use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderValue};
use http::StatusCode;
use serde::de::IgnoredAny;
use serde_json::Value;
use tracing::{debug, error, warn};

/// Outcome of a forwarded call: a status and a JSON body, ready to be written
/// by whichever runtime received the call.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl ForwardResponse {
    pub fn from_value(status: StatusCode, value: &Value) -> Self {
        Self {
            status,
            body: Bytes::from(value.to_string()),
        }
    }

    pub fn from_error(err: &ForwardError) -> Self {
        Self::from_value(err.status(), &err.envelope())
    }

    /// The `404 {"error": "Endpoint not found"}` answer for unknown paths.
    pub fn not_found(path: &str) -> Self {
        Self::from_error(&ForwardError::UnknownRoute(path.to_string()))
    }

    pub fn json(&self) -> serde_json::Result<Value> {
        serde_json::from_slice(&self.body)
    }

    pub fn into_http(self) -> http::Response<Bytes> {
        let mut response = http::Response::new(self.body);
        *response.status_mut() = self.status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }
}

/// Runs MCP routes against the n8n API. Cloning is cheap and clones share the
/// connection pool.
#[derive(Clone)]
pub struct Forwarder {
    upstream: UpstreamClient,
}

impl Forwarder {
    pub fn new(config: &UpstreamConfig) -> std::result::Result<Self, ConfigError> {
        Ok(Self::from_client(UpstreamClient::new(config)?))
    }

    pub fn from_client(upstream: UpstreamClient) -> Self {
        Self { upstream }
    }

    /// Forwards one inbound call. Never fails: every error is turned into
    /// its status code and `{"error": ...}` envelope, and logged once.
    pub async fn forward(&self, route_name: &str, body: Bytes) -> ForwardResponse {
        match self.try_forward(route_name, body).await {
            Ok(response) => response,
            Err(err) => {
                // upstream failures were already logged by forward_route
                if err.is_local() {
                    warn!(
                        route = route_name,
                        status = err.status().as_u16(),
                        error = %err,
                        "Rejected MCP request"
                    );
                }
                ForwardResponse::from_error(&err)
            }
        }
    }

    async fn try_forward(&self, route_name: &str, body: Bytes) -> Result<ForwardResponse> {
        let route = routes::find(route_name)
            .ok_or_else(|| ForwardError::UnknownRoute(route_name.to_string()))?;
        let body = InboundBody::parse(body)?;

        self.forward_route(route, &body).await
    }

    /// Validates, plans and executes a single route. Failures past planning
    /// are logged here, with the upstream path they hit.
    pub async fn forward_route(
        &self,
        route: &RouteDescriptor,
        body: &InboundBody,
    ) -> Result<ForwardResponse> {
        let request = route.plan(body)?;

        debug!(
            route = route.name,
            method = %request.method,
            path = %request.path,
            "Forwarding to n8n API"
        );

        let result = self.upstream.execute(&request).await.and_then(relay);

        if let Err(err) = &result {
            error!(
                route = route.name,
                status = err.status().as_u16(),
                method = %request.method,
                path = %request.path,
                error = %err,
                "n8n API request failed"
            );
        }

        result
    }
}

fn relay(response: UpstreamResponse) -> Result<ForwardResponse> {
    let UpstreamResponse { status, body } = response;

    if !status.is_success() {
        return Err(ForwardError::Upstream {
            status,
            body: error_payload(status, &body),
        });
    }

    if is_blank(&body) {
        return Ok(ForwardResponse {
            status,
            body: Bytes::from_static(b"null"),
        });
    }

    serde_json::from_slice::<IgnoredAny>(&body).map_err(ForwardError::MalformedUpstreamBody)?;

    Ok(ForwardResponse { status, body })
}

/// The upstream's error body as JSON when it parses, as text otherwise.
fn error_payload(status: StatusCode, body: &Bytes) -> Value {
    if is_blank(body) {
        let reason = status.canonical_reason().unwrap_or("Upstream request failed");
        return Value::String(reason.to_string());
    }

    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}
