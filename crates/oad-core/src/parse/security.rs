use indexmap::IndexMap;
use serde::Deserialize;

/// OAuth2 flows configuration.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct OAuthFlows {
    #[serde(default)]
    pub implicit: Option<OAuthFlow>,

    #[serde(default)]
    pub password: Option<OAuthFlow>,

    #[serde(rename = "clientCredentials", default)]
    pub client_credentials: Option<OAuthFlow>,

    #[serde(rename = "authorizationCode", default)]
    pub authorization_code: Option<OAuthFlow>,
}

/// A single OAuth2 flow.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct OAuthFlow {
    #[serde(rename = "authorizationUrl", default)]
    pub authorization_url: Option<String>,

    #[serde(rename = "tokenUrl", default)]
    pub token_url: Option<String>,

    #[serde(rename = "refreshUrl", default)]
    pub refresh_url: Option<String>,

    #[serde(default)]
    pub scopes: IndexMap<String, String>,
}

/// A raw security scheme definition. The type is kept as a free string so
/// unrecognized schemes deserialize instead of failing; the compiler folds
/// them into a tagged IR variant (unknown types map to `Unknown`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: String,

    #[serde(default)]
    pub description: Option<String>,

    /// API-key parameter name.
    #[serde(default)]
    pub name: Option<String>,

    /// API-key location: `query`, `header`, or `cookie`.
    #[serde(rename = "in", default)]
    pub location: Option<String>,

    /// HTTP auth scheme name (`basic`, `bearer`, ...).
    #[serde(default)]
    pub scheme: Option<String>,

    #[serde(rename = "bearerFormat", default)]
    pub bearer_format: Option<String>,

    #[serde(default)]
    pub flows: Option<OAuthFlows>,

    #[serde(rename = "openIdConnectUrl", default)]
    pub open_id_connect_url: Option<String>,
}

/// A security requirement alternative: map of scheme name → required scopes.
/// An empty map is the "auth optional" marker.
pub type SecurityRequirement = IndexMap<String, Vec<String>>;
