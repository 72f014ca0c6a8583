//! # Route descriptor table
//!
//! Each MCP route is described by one [`RouteDescriptor`] row in [`ROUTES`]:
//! - `name`: the inbound route, served as `/mcp/<name>`
//! - `method`: the HTTP verb used against the n8n API
//! - `path`: the upstream path template; `{field}` placeholders are filled
//!   from the body field of the same name
//! - `required`: body fields that must be present and truthy
//! - `query`: optional body fields appended as query parameters when truthy
//! - `payload`: where the upstream request body comes from
//!
//! Adding a route means adding a row. Nothing else dispatches on route names.

use crate::body::{InboundBody, render_scalar};
use crate::errors::{ForwardError, Result};
use crate::upstream::UpstreamRequest;
use bytes::Bytes;
use http::Method;

/// Prefix of every inbound MCP route.
pub const MCP_PREFIX: &str = "/mcp/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl UpstreamMethod {
    pub fn as_http(&self) -> Method {
        match self {
            UpstreamMethod::Get => Method::GET,
            UpstreamMethod::Post => Method::POST,
            UpstreamMethod::Put => Method::PUT,
            UpstreamMethod::Patch => Method::PATCH,
            UpstreamMethod::Delete => Method::DELETE,
        }
    }
}

/// Source of the upstream request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// No body is sent
    None,
    /// The inbound body, byte for byte
    Body,
    /// The value of one inbound field
    Field(&'static str),
    /// The value of one inbound field, `{}` when it is absent or falsy
    FieldOrEmpty(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub name: &'static str,
    pub method: UpstreamMethod,
    pub path: &'static str,
    pub required: &'static [&'static str],
    pub query: &'static [&'static str],
    pub payload: Payload,
}

impl RouteDescriptor {
    const fn new(name: &'static str, method: UpstreamMethod, path: &'static str) -> Self {
        Self {
            name,
            method,
            path,
            required: &[],
            query: &[],
            payload: Payload::None,
        }
    }

    const fn with_required(mut self, fields: &'static [&'static str]) -> Self {
        self.required = fields;
        self
    }

    const fn with_query(mut self, fields: &'static [&'static str]) -> Self {
        self.query = fields;
        self
    }

    const fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// The inbound path this route is served on.
    pub fn inbound_path(&self) -> String {
        format!("{MCP_PREFIX}{}", self.name)
    }

    /// Fails with [`ForwardError::MissingField`] on the first required field
    /// that is absent or falsy.
    pub fn validate(&self, body: &InboundBody) -> Result<()> {
        match self
            .required
            .iter()
            .find(|field| body.truthy(field).is_none())
        {
            Some(field) => Err(ForwardError::MissingField(*field)),
            None => Ok(()),
        }
    }

    /// Validates the body and turns it into the single upstream request for
    /// this route.
    pub fn plan(&self, body: &InboundBody) -> Result<UpstreamRequest> {
        self.validate(body)?;

        Ok(UpstreamRequest {
            method: self.method.as_http(),
            path: self.upstream_path(body),
            body: self.upstream_body(body),
        })
    }

    /// Fills the path template and appends the truthy query fields.
    pub fn upstream_path(&self, body: &InboundBody) -> String {
        let mut path = String::with_capacity(self.path.len() + 16);
        let mut rest = self.path;

        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            let field = &rest[start + 1..start + len];
            let value = body.get(field).map(render_scalar).unwrap_or_default();

            path.push_str(&rest[..start]);
            path.push_str(&urlencoding::encode(&value));
            rest = &rest[start + len + 1..];
        }
        path.push_str(rest);

        let query = self
            .query
            .iter()
            .filter_map(|field| {
                body.truthy(field).map(|value| {
                    format!("{field}={}", urlencoding::encode(&render_scalar(value)))
                })
            })
            .collect::<Vec<_>>();

        if !query.is_empty() {
            path.push('?');
            path.push_str(&query.join("&"));
        }

        path
    }

    fn upstream_body(&self, body: &InboundBody) -> Option<Bytes> {
        match self.payload {
            Payload::None => None,
            Payload::Body => Some(body.raw().clone()),
            Payload::Field(field) => body.get(field).map(|value| Bytes::from(value.to_string())),
            Payload::FieldOrEmpty(field) => Some(
                body.truthy(field)
                    .map(|value| Bytes::from(value.to_string()))
                    .unwrap_or_else(|| Bytes::from_static(b"{}")),
            ),
        }
    }
}

use UpstreamMethod::{Delete, Get, Patch, Post, Put};

/// Every supported MCP route.
pub static ROUTES: &[RouteDescriptor] = &[
    // workflows
    RouteDescriptor::new("listWorkflows", Get, "/workflows"),
    RouteDescriptor::new("getWorkflow", Get, "/workflows/{workflowId}").with_required(&["workflowId"]),
    RouteDescriptor::new("createWorkflow", Post, "/workflows").with_payload(Payload::Body),
    RouteDescriptor::new("updateWorkflow", Put, "/workflows/{workflowId}")
        .with_required(&["workflowId", "workflowData"])
        .with_payload(Payload::Field("workflowData")),
    RouteDescriptor::new("deleteWorkflow", Delete, "/workflows/{workflowId}")
        .with_required(&["workflowId"]),
    RouteDescriptor::new("activateWorkflow", Post, "/workflows/{workflowId}/activate")
        .with_required(&["workflowId"]),
    RouteDescriptor::new("deactivateWorkflow", Post, "/workflows/{workflowId}/deactivate")
        .with_required(&["workflowId"]),
    RouteDescriptor::new("executeWorkflow", Post, "/workflows/{workflowId}/execute")
        .with_required(&["workflowId"])
        .with_payload(Payload::FieldOrEmpty("data")),
    // executions
    RouteDescriptor::new("listExecutions", Get, "/executions")
        .with_query(&["workflowId", "limit", "lastId"]),
    RouteDescriptor::new("getExecution", Get, "/executions/{executionId}")
        .with_required(&["executionId"]),
    RouteDescriptor::new("deleteExecution", Delete, "/executions/{executionId}")
        .with_required(&["executionId"]),
    // credentials
    RouteDescriptor::new("listCredentials", Get, "/credentials"),
    // Served even though not every n8n deployment exposes it.
    RouteDescriptor::new("getCredential", Get, "/credentials/{credentialId}")
        .with_required(&["credentialId"]),
    RouteDescriptor::new("createCredential", Post, "/credentials").with_payload(Payload::Body),
    RouteDescriptor::new("updateCredential", Patch, "/credentials/{credentialId}")
        .with_required(&["credentialId", "credentialData"])
        .with_payload(Payload::Field("credentialData")),
    RouteDescriptor::new("deleteCredential", Delete, "/credentials/{credentialId}")
        .with_required(&["credentialId"]),
    // tags
    RouteDescriptor::new("listTags", Get, "/tags"),
    RouteDescriptor::new("createTag", Post, "/tags").with_payload(Payload::Body),
    RouteDescriptor::new("deleteTag", Delete, "/tags/{tagId}").with_required(&["tagId"]),
];

pub fn find(name: &str) -> Option<&'static RouteDescriptor> {
    ROUTES.iter().find(|route| route.name == name)
}

/// Looks up the route served on an inbound path such as `/mcp/getWorkflow`.
pub fn find_by_path(path: &str) -> Option<&'static RouteDescriptor> {
    path.strip_prefix(MCP_PREFIX).and_then(find)
}

/// Inbound paths of all routes, in table order.
pub fn inbound_paths() -> Vec<String> {
    ROUTES.iter().map(RouteDescriptor::inbound_path).collect()
}
