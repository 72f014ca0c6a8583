use bytes::Bytes;
use forwarder::{Forwarder, ROUTES, RouteDescriptor, UpstreamConfig};
use http::StatusCode;
use serde_json::{Map, Value, json};
use std::time::Duration;
use testing::{StubUpstream, TEST_API_KEY, unreachable_base_url};
use wiremock::ResponseTemplate;

fn forwarder_for(base_url: &str) -> Forwarder {
    let config = UpstreamConfig::new(base_url, TEST_API_KEY).unwrap();
    Forwarder::new(&config).unwrap()
}

fn body(value: Value) -> Bytes {
    Bytes::from(value.to_string())
}

/// A body carrying every required field of `route`, with ids set to "1".
fn complete_body(route: &RouteDescriptor) -> Value {
    let fields = route
        .required
        .iter()
        .map(|field| {
            let value = if field.ends_with("Data") {
                json!({ "name": "payload" })
            } else {
                json!("1")
            };
            (field.to_string(), value)
        })
        .collect::<Map<_, _>>();
    Value::Object(fields)
}

fn upstream_path_with_ids(route: &RouteDescriptor) -> String {
    let mut path = route.path.to_string();
    for field in route.required {
        path = path.replace(&format!("{{{field}}}"), "1");
    }
    path
}

#[tokio::test]
async fn every_route_passes_upstream_success_through() {
    let upstream = StubUpstream::start().await;
    let forwarder = forwarder_for(&upstream.base_url());

    for route in ROUTES {
        let reply = format!(r#"{{"route": "{}", "ok": true}}"#, route.name);
        upstream
            .respond(
                route.method.as_http().as_str(),
                &upstream_path_with_ids(route),
                200,
                &reply,
            )
            .await;

        let response = forwarder.forward(route.name, body(complete_body(route))).await;

        assert_eq!(response.status, StatusCode::OK, "route {}", route.name);
        assert_eq!(response.body, reply.as_bytes(), "route {}", route.name);
    }

    assert_eq!(upstream.received().await.len(), ROUTES.len());
}

#[tokio::test]
async fn missing_required_fields_never_reach_upstream() {
    let upstream = StubUpstream::start().await;
    let forwarder = forwarder_for(&upstream.base_url());

    for route in ROUTES.iter().filter(|route| !route.required.is_empty()) {
        let response = forwarder.forward(route.name, body(json!({}))).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST, "route {}", route.name);
        assert_eq!(
            response.json().unwrap(),
            json!({ "error": format!("{} is required", route.required[0]) })
        );
    }

    assert!(upstream.received().await.is_empty());
}

#[tokio::test]
async fn falsy_required_values_count_as_missing() {
    let upstream = StubUpstream::start().await;
    let forwarder = forwarder_for(&upstream.base_url());

    for value in [json!(""), json!(0), json!(false), Value::Null] {
        let response = forwarder
            .forward("getWorkflow", body(json!({ "workflowId": value })))
            .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    assert!(upstream.received().await.is_empty());
}

#[tokio::test]
async fn second_missing_field_is_reported_once_the_first_is_present() {
    let upstream = StubUpstream::start().await;
    let forwarder = forwarder_for(&upstream.base_url());

    let response = forwarder
        .forward("updateWorkflow", body(json!({ "workflowId": "3" })))
        .await;

    assert_eq!(
        response.json().unwrap(),
        json!({ "error": "workflowData is required" })
    );
}

#[tokio::test]
async fn upstream_not_found_is_wrapped_in_the_envelope() {
    let upstream = StubUpstream::start().await;
    upstream
        .respond("GET", "/workflows/42", 404, r#"{"message":"Not Found"}"#)
        .await;
    let forwarder = forwarder_for(&upstream.base_url());

    let response = forwarder
        .forward("getWorkflow", body(json!({ "workflowId": "42" })))
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(
        response.json().unwrap(),
        json!({ "error": { "message": "Not Found" } })
    );
}

#[tokio::test]
async fn empty_error_body_uses_the_reason_phrase() {
    let upstream = StubUpstream::start().await;
    upstream
        .respond_with("DELETE", "/tags/9", ResponseTemplate::new(401))
        .await;
    let forwarder = forwarder_for(&upstream.base_url());

    let response = forwarder.forward("deleteTag", body(json!({ "tagId": 9 }))).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json().unwrap(), json!({ "error": "Unauthorized" }));
}

#[tokio::test]
async fn unreachable_upstream_is_an_internal_error() {
    let forwarder = forwarder_for(&unreachable_base_url());

    let response = forwarder.forward("listWorkflows", body(json!({}))).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.json().unwrap()["error"].is_string());
}

/// Serves one connection that sends `head` and a body shorter than its
/// declared length, then hangs up.
async fn truncated_upstream(head: &'static str) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 4096];
        let _ = socket.read(&mut request).await;
        let response = format!("{head}\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{{\"par");
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
    });

    format!("http://127.0.0.1:{port}/api/v1")
}

#[tokio::test]
async fn unreadable_error_body_keeps_the_upstream_status() {
    let base_url = truncated_upstream("HTTP/1.1 503 Service Unavailable").await;
    let forwarder = forwarder_for(&base_url);

    let response = forwarder.forward("listTags", body(json!({}))).await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    let message = response.json().unwrap()["error"].as_str().unwrap().to_string();
    assert!(message.starts_with("Failed to read n8n API response"));
}

#[tokio::test]
async fn unreadable_success_body_is_an_internal_error() {
    let base_url = truncated_upstream("HTTP/1.1 200 OK").await;
    let forwarder = forwarder_for(&base_url);

    let response = forwarder.forward("listTags", body(json!({}))).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn malformed_success_body_is_an_internal_error() {
    let upstream = StubUpstream::start().await;
    upstream.respond_text("GET", "/tags", 200, "<html>gateway</html>").await;
    let forwarder = forwarder_for(&upstream.base_url());

    let response = forwarder.forward("listTags", body(json!({}))).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.json().unwrap()["error"].is_string());
}

#[tokio::test]
async fn create_workflow_sends_the_exact_body() {
    let upstream = StubUpstream::start().await;
    upstream
        .respond("POST", "/workflows", 200, r#"{"id":"10"}"#)
        .await;
    let forwarder = forwarder_for(&upstream.base_url());
    let raw = r#"{"name": "X", "nodes": [], "connections": {}}"#;

    let response = forwarder
        .forward("createWorkflow", Bytes::from_static(raw.as_bytes()))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let received = upstream.received().await;
    assert_eq!(received[0].method.as_str(), "POST");
    assert_eq!(received[0].body, raw.as_bytes());
}

#[tokio::test]
async fn list_executions_sends_only_truthy_filters() {
    let upstream = StubUpstream::start().await;
    upstream
        .respond("GET", "/executions", 200, r#"{"data":[]}"#)
        .await;
    let forwarder = forwarder_for(&upstream.base_url());

    forwarder
        .forward(
            "listExecutions",
            body(json!({ "workflowId": "5", "limit": 10, "lastId": "" })),
        )
        .await;
    forwarder.forward("listExecutions", body(json!({}))).await;

    let received = upstream.received().await;
    assert_eq!(received[0].url.query(), Some("workflowId=5&limit=10"));
    assert_eq!(received[1].url.query(), None);
}

#[tokio::test]
async fn every_call_carries_the_api_key_and_json_headers() {
    let upstream = StubUpstream::start().await;
    upstream
        .respond("POST", "/workflows/8/activate", 200, r#"{"active":true}"#)
        .await;
    let forwarder = forwarder_for(&upstream.base_url());

    forwarder
        .forward("activateWorkflow", body(json!({ "workflowId": "8" })))
        .await;

    let received = upstream.received().await;
    let headers = &received[0].headers;
    assert_eq!(headers.get("x-n8n-api-key").unwrap(), TEST_API_KEY);
    assert_eq!(headers.get("content-type").unwrap(), "application/json");
    assert_eq!(headers.get("accept").unwrap(), "application/json");
    assert!(received[0].body.is_empty());
}

#[tokio::test]
async fn concurrent_calls_do_not_interfere() {
    let upstream = StubUpstream::start().await;
    upstream
        .respond_with(
            "GET",
            "/workflows",
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"data":["workflows"]}"#, "application/json")
                .set_delay(Duration::from_millis(100)),
        )
        .await;
    upstream
        .respond("GET", "/tags", 200, r#"{"data":["tags"]}"#)
        .await;
    let forwarder = forwarder_for(&upstream.base_url());

    let (workflows, tags) = tokio::join!(
        forwarder.forward("listWorkflows", body(json!({}))),
        forwarder.forward("listTags", body(json!({}))),
    );

    assert_eq!(workflows.body, r#"{"data":["workflows"]}"#.as_bytes());
    assert_eq!(tags.body, r#"{"data":["tags"]}"#.as_bytes());
}
