//! Smoke checks against a deployed proxy.
//!
//! The routes probed here need no input, so a deployment can be checked
//! without knowing any workflow ids. They will answer with an error envelope
//! when the deployment has no valid n8n configuration, which still proves
//! the proxy is reachable and routing.

use anyhow::{Context, Result};
use serde_json::Value;

pub const HEALTH_PATH: &str = "/health";

pub const PROBED_ROUTES: &[&str] = &["/mcp/listWorkflows", "/mcp/listTags", "/mcp/listCredentials"];

#[derive(Debug)]
pub struct ProbeOutcome {
    pub path: String,
    pub status: u16,
    pub body: Value,
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Calls one path: `GET` for the health check, `POST {}` for MCP routes.
pub async fn probe(client: &reqwest::Client, base_url: &str, path: &str) -> Result<ProbeOutcome> {
    let url = format!("{}{path}", base_url.trim_end_matches('/'));

    let request = if path == HEALTH_PATH {
        client.get(&url)
    } else {
        client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body("{}")
    };

    let response = request
        .send()
        .await
        .with_context(|| format!("Failed to reach {url}"))?;
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .with_context(|| format!("Failed to read response from {url}"))?;
    let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

    Ok(ProbeOutcome {
        path: path.to_string(),
        status,
        body,
    })
}
