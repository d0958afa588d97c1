use indexmap::IndexMap;
use serde_json::Value;

pub use crate::parse::parameter::ParameterLocation;

/// HTTP method, with a fixed rank used for deterministic operation
/// ordering within a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Fixed sort rank; operations are totally ordered by (path, rank).
    pub fn rank(&self) -> u8 {
        match self {
            HttpMethod::Get => 0,
            HttpMethod::Post => 1,
            HttpMethod::Put => 2,
            HttpMethod::Patch => 3,
            HttpMethod::Delete => 4,
            HttpMethod::Head => 5,
            HttpMethod::Options => 6,
            HttpMethod::Trace => 7,
        }
    }
}

/// A resolved parameter, keyed by (location, name) during merging.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterIr {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    /// Rendered schema summary, e.g. `string` or `array<RouteOut>`.
    pub schema: String,
    pub description: Option<String>,
    pub default: Option<String>,
    pub enum_values: Vec<String>,
}

/// A resolved request body.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBodyIr {
    pub required: bool,
    pub schema: String,
    pub content_types: Vec<String>,
    pub description: Option<String>,
}

/// A resolved response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseIr {
    pub status: String,
    pub description: Option<String>,
    pub schema: Option<String>,
    pub content_types: Vec<String>,
}

/// API-key parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyLocation {
    Query,
    Header,
    Cookie,
}

impl ApiKeyLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKeyLocation::Query => "query",
            ApiKeyLocation::Header => "header",
            ApiKeyLocation::Cookie => "cookie",
        }
    }
}

/// OAuth2 flow kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    AuthorizationCode,
    Implicit,
    Password,
    ClientCredentials,
}

impl FlowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowKind::AuthorizationCode => "authorization-code",
            FlowKind::Implicit => "implicit",
            FlowKind::Password => "password",
            FlowKind::ClientCredentials => "client-credentials",
        }
    }
}

/// One resolved OAuth2 flow.
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityFlowIr {
    pub kind: FlowKind,
    pub authorization_url: Option<String>,
    pub token_url: Option<String>,
    /// Scope names, sorted.
    pub scopes: Vec<String>,
}

/// A named security scheme. Tagged by scheme type so only the fields valid
/// for that type exist at all.
#[derive(Debug, Clone, PartialEq)]
pub enum SecuritySchemeIr {
    ApiKey {
        location: ApiKeyLocation,
        name: String,
    },
    Http {
        scheme: String,
        bearer_format: Option<String>,
    },
    OAuth2 {
        flows: Vec<SecurityFlowIr>,
    },
    OpenIdConnect {
        url: Option<String>,
    },
    MutualTls,
    Unknown,
}

impl SecuritySchemeIr {
    pub fn kind(&self) -> &'static str {
        match self {
            SecuritySchemeIr::ApiKey { .. } => "api-key",
            SecuritySchemeIr::Http { .. } => "http",
            SecuritySchemeIr::OAuth2 { .. } => "oauth2",
            SecuritySchemeIr::OpenIdConnect { .. } => "open-id-connect",
            SecuritySchemeIr::MutualTls => "mutual-tls",
            SecuritySchemeIr::Unknown => "unknown",
        }
    }
}

/// One alternative way of satisfying an operation's security: every
/// (scheme, scopes) pair in the set must hold together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityRequirementSetIr {
    /// (scheme name, sorted scopes), sorted by scheme name.
    pub schemes: Vec<(String, Vec<String>)>,
}

/// Resolved security requirement for one operation. Absence of this value
/// means no applicable security at all, distinct from `optional`, which
/// records an explicit empty alternative.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationAuthIr {
    /// Inherited from the document-wide default rather than declared
    /// on the operation.
    pub inherited: bool,
    /// An explicit empty requirement alternative is present.
    pub optional: bool,
    /// Ordered, de-duplicated alternatives (OR of ANDs).
    pub requirements: Vec<SecurityRequirementSetIr>,
}

impl OperationAuthIr {
    /// Distinct scheme names across all requirement sets, in first-seen order.
    pub fn scheme_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for set in &self.requirements {
            for (name, _) in &set.schemes {
                if !names.contains(&name.as_str()) {
                    names.push(name.as_str());
                }
            }
        }
        names
    }
}

/// One HTTP-style action. Identity key: `id`, unique across the IR.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationIr {
    pub id: String,
    pub method: HttpMethod,
    pub path: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub parameters: Vec<ParameterIr>,
    pub request_body: Option<RequestBodyIr>,
    pub responses: Vec<ResponseIr>,
    pub auth: Option<OperationAuthIr>,
}

impl OperationIr {
    /// Every rendered schema summary attached to this operation; the seed
    /// surface for the schema closure.
    pub fn schema_summaries(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .map(|p| p.schema.as_str())
            .chain(self.request_body.iter().map(|b| b.schema.as_str()))
            .chain(self.responses.iter().filter_map(|r| r.schema.as_deref()))
    }
}

/// The single source of truth consumed by prompting and validation.
/// Immutable once built for a given run.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecIr {
    pub title: String,
    pub version: String,
    pub servers: Vec<String>,
    /// Named security schemes, sorted by name.
    pub security_schemes: IndexMap<String, SecuritySchemeIr>,
    /// Operations, sorted by (path, method rank).
    pub operations: Vec<OperationIr>,
    /// Named schema definitions (normalized bodies), sorted by name.
    pub schemas: IndexMap<String, Value>,
}
