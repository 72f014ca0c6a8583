//! Error types for the forwarder crate

use http::StatusCode;
use serde_json::{Value, json};
use thiserror::Error;

/// Result type alias for forwarding operations
pub type Result<T> = std::result::Result<T, ForwardError>;

const ENDPOINT_NOT_FOUND: &str = "Endpoint not found";

/// Everything that can end a forwarded call early.
///
/// Each variant maps to exactly one status code and one error envelope, see
/// [`ForwardError::status`] and [`ForwardError::envelope`].
#[derive(Error, Debug)]
pub enum ForwardError {
    /// No route descriptor carries this name
    #[error("Endpoint not found: {0}")]
    UnknownRoute(String),

    /// The inbound body is not valid JSON
    #[error("Invalid JSON body: {0}")]
    InvalidBody(#[source] serde_json::Error),

    /// The inbound body is JSON but not an object
    #[error("Invalid JSON body: expected an object")]
    BodyNotObject,

    /// A required body field is absent or falsy
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The upstream answered with a non-2xx status
    #[error("n8n API error: {status}")]
    Upstream { status: StatusCode, body: Value },

    /// The upstream could not be reached
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream sent a status line but its body could not be read
    #[error("Failed to read n8n API response ({status}): {source}")]
    UnreadableBody {
        status: StatusCode,
        #[source]
        source: reqwest::Error,
    },

    /// The upstream answered 2xx with a body that is not JSON
    #[error("Malformed upstream response body: {0}")]
    MalformedUpstreamBody(#[source] serde_json::Error),
}

impl ForwardError {
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::UnknownRoute(_) => StatusCode::NOT_FOUND,
            ForwardError::InvalidBody(_)
            | ForwardError::BodyNotObject
            | ForwardError::MissingField(_) => StatusCode::BAD_REQUEST,
            ForwardError::Upstream { status, .. } => *status,
            ForwardError::Transport(err) => {
                err.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            // A 2xx whose body was lost is not a success for the caller
            ForwardError::UnreadableBody { status, .. } if !status.is_success() => *status,
            ForwardError::UnreadableBody { .. } | ForwardError::MalformedUpstreamBody(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The `{"error": ...}` payload returned to the caller.
    pub fn envelope(&self) -> Value {
        match self {
            ForwardError::UnknownRoute(_) => json!({ "error": ENDPOINT_NOT_FOUND }),
            ForwardError::Upstream { body, .. } => json!({ "error": body }),
            other => json!({ "error": other.to_string() }),
        }
    }

    /// True when the call was rejected before reaching the upstream.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ForwardError::UnknownRoute(_)
                | ForwardError::InvalidBody(_)
                | ForwardError::BodyNotObject
                | ForwardError::MissingField(_)
        )
    }
}

/// Errors raised while building the upstream configuration or client
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required setting is absent or empty
    #[error("{0} is not configured")]
    Missing(&'static str),

    /// The upstream base URL does not parse
    #[error("Invalid n8n API base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The API key cannot be sent as a header value
    #[error("Invalid n8n API key: {0}")]
    InvalidApiKey(#[from] http::header::InvalidHeaderValue),

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
