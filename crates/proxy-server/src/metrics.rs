use axum::extract::MatchedPath;
use axum::{extract::Request, middleware::Next, response::Response};
use forwarder::routes;
use lazy_static::lazy_static;
use prometheus::{
    Counter, HistogramVec, IntCounterVec, register_counter, register_histogram_vec,
    register_int_counter_vec,
};
use std::time::Instant;

const UNMATCHED_PATH: &str = "unmatched";

lazy_static! {
    pub static ref HTTP_REQUESTS_TOTAL: Counter =
        register_counter!("n8n_mcp_http_requests_total", "Total number of HTTP requests").unwrap();
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "n8n_mcp_http_request_duration_seconds",
        "HTTP request latencies in seconds",
        &["method", "path"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .unwrap();
    pub static ref FORWARD_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "n8n_mcp_forward_failures_total",
        "MCP requests that ended with an error response",
        &["route"]
    )
    .unwrap();
}

pub async fn request_metrics_middleware(req: Request, next: Next) -> Response {
    HTTP_REQUESTS_TOTAL.inc();

    let method = req.method().to_string();
    let path = path_label(
        req.extensions().get::<MatchedPath>().map(MatchedPath::as_str),
        req.uri().path(),
    );

    let start = Instant::now();

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[&method, &path])
        .observe(duration);

    response
}

/// Label for the `path` dimension. MCP routes are labelled by their own path
/// so latencies can be told apart; anything that hit no route, or names no
/// known MCP route, collapses into a single series.
fn path_label(matched: Option<&str>, uri_path: &str) -> String {
    let Some(matched) = matched else {
        return UNMATCHED_PATH.to_string();
    };

    match uri_path.strip_prefix(routes::MCP_PREFIX) {
        Some(name) if routes::find(name).is_some() => uri_path.to_string(),
        Some(_) => UNMATCHED_PATH.to_string(),
        None => matched.to_string(),
    }
}
