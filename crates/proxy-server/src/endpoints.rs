pub mod health;
pub mod mcp;
pub mod metrics;

use axum::Router;
use axum::http::Uri;
use axum::response::Response;
use forwarder::{ForwardResponse, Forwarder};
use tracing::debug;

pub fn get_routes(forwarder: Forwarder) -> Router {
    // routes from all endpoints should be merged here
    Router::new()
        .merge(health::get_routes())
        .merge(metrics::get_routes())
        .merge(mcp::get_routes(forwarder))
        .fallback(handle_not_found)
}

async fn handle_not_found(uri: Uri) -> Response {
    debug!("No endpoint for {}", uri.path());
    mcp::json_response(ForwardResponse::not_found(uri.path()))
}
