pub mod config;
pub mod endpoints;
pub mod metrics;

use axum::http::{Method, header};
use axum::{Router, middleware};
use forwarder::Forwarder;
use forwarder::upstream::API_KEY_HEADER;
use tower_http::cors::{Any, CorsLayer};

/// Builds the complete application: routes, request metrics and CORS.
pub fn app(forwarder: Forwarder) -> Router {
    endpoints::get_routes(forwarder)
        .layer(middleware::from_fn(metrics::request_metrics_middleware))
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, API_KEY_HEADER])
}
