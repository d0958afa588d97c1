use thiserror::Error;

use crate::diag::Diagnostic;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported description version: {0}")]
    UnsupportedVersion(String),
}

/// Structural input errors. Compilation is all-or-nothing: any of these
/// stops the pipeline before an IR exists.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("description has no title")]
    MissingTitle,

    #[error("description has no version")]
    MissingVersion,

    #[error("description declares no operations")]
    NoOperations,

    #[error("duplicate operation id: {0}")]
    DuplicateOperationId(String),

    #[error("operation {operation} requires undeclared security scheme: {scheme}")]
    UnknownSecurityScheme { operation: String, scheme: String },
}

impl CompileError {
    /// Stable machine-checkable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::MissingTitle => "SPEC_TITLE_MISSING",
            CompileError::MissingVersion => "SPEC_VERSION_MISSING",
            CompileError::NoOperations => "SPEC_NO_OPERATIONS",
            CompileError::DuplicateOperationId(_) => "SPEC_DUPLICATE_OPERATION_ID",
            CompileError::UnknownSecurityScheme { .. } => "SPEC_UNKNOWN_SECURITY_SCHEME",
        }
    }

    /// Render as an error-level diagnostic for callers that report rather
    /// than propagate.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.code(), self.to_string())
    }
}
