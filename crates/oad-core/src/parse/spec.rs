use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use super::operation::PathItem;
use super::security::{SecurityRequirement, SecurityScheme};
use super::server::Server;

/// Info object describing the API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// Components object holding reusable definitions. Schema bodies stay raw:
/// the normalizer, summarizer, and closure engine all walk untyped nodes.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, Value>,

    #[serde(rename = "securitySchemes", default)]
    pub security_schemes: IndexMap<String, SecurityScheme>,
}

/// A resolved, reference-free API description. Parameter, request-body,
/// and response references are assumed already inlined upstream; only
/// schema-level `$ref` nodes survive, pointing into `components.schemas`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiDescription {
    pub openapi: String,

    pub info: Info,

    #[serde(default)]
    pub servers: Vec<Server>,

    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,

    #[serde(default)]
    pub components: Components,

    /// Document-wide default security requirement alternatives.
    #[serde(default)]
    pub security: Option<Vec<SecurityRequirement>>,
}
