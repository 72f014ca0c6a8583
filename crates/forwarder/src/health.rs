use crate::routes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Readiness payload served on `/` and `/health` by every runtime.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub endpoints: Vec<String>,
}

impl HealthResponse {
    pub fn for_runtime(runtime: &str) -> Self {
        Self {
            status: "ok".to_string(),
            message: format!("n8n MCP Server is running on {runtime}"),
            endpoints: routes::inbound_paths(),
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "status": self.status,
            "message": self.message,
            "endpoints": self.endpoints,
        })
    }
}
