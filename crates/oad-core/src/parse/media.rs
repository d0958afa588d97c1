use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

/// A media type object carrying a raw schema node.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct MediaType {
    #[serde(default)]
    pub schema: Option<Value>,
}

/// A request body definition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub content: IndexMap<String, MediaType>,

    #[serde(default)]
    pub required: bool,
}

/// A response definition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}
