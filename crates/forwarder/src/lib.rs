//! Forwarding core for the n8n MCP proxy.
//!
//! Every supported operation is a row in [`routes::ROUTES`]. A call goes
//! through the same steps regardless of the route:
//! - the inbound JSON body is parsed into an [`body::InboundBody`],
//! - the route's required fields are checked,
//! - an [`upstream::UpstreamRequest`] is planned from the descriptor,
//! - the request is executed against the n8n API,
//! - the upstream answer (or a normalized `{"error": ...}` envelope) is returned.
//!
//! The crate knows nothing about the host runtime. Adapters hand it a route
//! name plus raw body bytes and get a [`ForwardResponse`] back.

pub mod body;
pub mod errors;
pub mod forward;
pub mod health;
pub mod routes;
pub mod upstream;

pub use errors::{ConfigError, ForwardError};
pub use forward::{ForwardResponse, Forwarder};
pub use health::HealthResponse;
pub use routes::{ROUTES, RouteDescriptor};
pub use upstream::{UpstreamClient, UpstreamConfig, UpstreamRequest};
