pub mod media;
pub mod operation;
pub mod parameter;
pub mod security;
pub mod server;
pub mod spec;

use serde_json::Value;

use crate::error::ParseError;
use crate::normalize::normalize_document;
use spec::ApiDescription;

/// Parse a resolved API description from YAML. Schema subtrees are
/// canonicalized before the typed model is built; every later stage
/// assumes the normalized union shape.
pub fn from_yaml(input: &str) -> Result<ApiDescription, ParseError> {
    let value: Value = serde_yaml_ng::from_str(input)?;
    from_value(value)
}

/// Parse a resolved API description from JSON.
pub fn from_json(input: &str) -> Result<ApiDescription, ParseError> {
    let value: Value = serde_json::from_str(input)?;
    from_value(value)
}

fn from_value(mut value: Value) -> Result<ApiDescription, ParseError> {
    normalize_document(&mut value);
    let desc: ApiDescription = serde_json::from_value(value)?;
    validate_version(&desc)?;
    Ok(desc)
}

fn validate_version(desc: &ApiDescription) -> Result<(), ParseError> {
    if !desc.openapi.starts_with("3.") {
        return Err(ParseError::UnsupportedVersion(desc.openapi.clone()));
    }
    Ok(())
}
