//! Fetch handler for edge runtimes.
//!
//! The host hands over a plain [`http::Request`] and writes back the
//! [`http::Response`] it gets. Configuration comes from the host's
//! environment bindings through [`EdgeWorker::from_bindings`]. Unlike the
//! standalone server, dispatch is by path only: any method reaches a route,
//! and `OPTIONS` is answered as a CORS preflight everywhere.

use bytes::Bytes;
use forwarder::{ConfigError, ForwardResponse, Forwarder, HealthResponse, UpstreamConfig, routes};
use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    HeaderMap, HeaderValue,
};
use http::{Method, Request, Response, StatusCode};
use tracing::debug;

const RUNTIME: &str = "edge worker";

const ALLOW_ORIGIN: &str = "*";
const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization, X-N8N-API-KEY";

#[derive(Clone)]
pub struct EdgeWorker {
    forwarder: Forwarder,
}

impl EdgeWorker {
    pub fn new(forwarder: Forwarder) -> Self {
        Self { forwarder }
    }

    /// Builds a worker from the host's bindings, e.g. `|name| env.var(name)`.
    pub fn from_bindings<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = UpstreamConfig::from_bindings(lookup)?;
        Ok(Self::new(Forwarder::new(&config)?))
    }

    pub async fn fetch(&self, request: Request<Bytes>) -> Response<Bytes> {
        let (parts, body) = request.into_parts();
        let path = parts.uri.path();

        let mut response = if parts.method == Method::OPTIONS {
            let mut preflight = Response::new(Bytes::new());
            *preflight.status_mut() = StatusCode::OK;
            preflight
        } else {
            self.dispatch(path, body).await.into_http()
        };

        add_cors_headers(response.headers_mut());
        response
    }

    async fn dispatch(&self, path: &str, body: Bytes) -> ForwardResponse {
        if path == "/" || path == "/health" {
            let health = HealthResponse::for_runtime(RUNTIME);
            return ForwardResponse::from_value(StatusCode::OK, &health.to_value());
        }

        match routes::find_by_path(path) {
            Some(route) => self.forwarder.forward(route.name, body).await,
            None => {
                debug!("No endpoint for {}", path);
                ForwardResponse::not_found(path)
            }
        }
    }
}

fn add_cors_headers(headers: &mut HeaderMap) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(ALLOW_ORIGIN));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
}
