use axum::{Json, Router, routing::get};
use forwarder::HealthResponse;

const RUNTIME: &str = "standalone server";

pub fn get_routes() -> Router {
    Router::new()
        .route("/", get(handle_health))
        .route("/health", get(handle_health))
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse::for_runtime(RUNTIME))
}
