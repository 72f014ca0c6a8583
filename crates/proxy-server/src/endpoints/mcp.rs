use crate::metrics::FORWARD_FAILURES_TOTAL;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Router, routing::post};
use forwarder::{ForwardResponse, Forwarder, routes};

pub fn get_routes(forwarder: Forwarder) -> Router {
    Router::new()
        .route("/mcp/{route}", post(handle_route))
        .with_state(forwarder)
}

async fn handle_route(
    State(forwarder): State<Forwarder>,
    Path(route): Path<String>,
    body: Bytes,
) -> Response {
    let response = forwarder.forward(&route, body).await;

    // Unknown names are not labelled to keep the series bounded
    if !response.status.is_success() && routes::find(&route).is_some() {
        FORWARD_FAILURES_TOTAL.with_label_values(&[&route]).inc();
    }

    json_response(response)
}

pub(crate) fn json_response(response: ForwardResponse) -> Response {
    (
        response.status,
        [(header::CONTENT_TYPE, "application/json")],
        response.body,
    )
        .into_response()
}
