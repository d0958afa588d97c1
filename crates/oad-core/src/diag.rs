use std::fmt;

/// Severity of a diagnostic. Callers decide "is this blocking" purely by
/// level; `Error` blocks, everything else does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }
}

/// A single finding. Diagnostics accumulate; they never abort the pass that
/// produced them. The code is stable and machine-checkable; programmatic
/// filtering must never need to parse the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub code: &'static str,
    pub message: String,
}

impl Diagnostic {
    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Diagnostic {
            level: Level::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: &'static str, message: impl Into<String>) -> Self {
        Diagnostic {
            level: Level::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn info(code: &'static str, message: impl Into<String>) -> Self {
        Diagnostic {
            level: Level::Info,
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.level.as_str(), self.code, self.message)
    }
}

/// True if any diagnostic in the slice is error-level.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.level == Level::Error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_errors() {
        let diags = vec![
            Diagnostic::info("A", "fine"),
            Diagnostic::warning("B", "hmm"),
        ];
        assert!(!has_errors(&diags));

        let diags = vec![Diagnostic::error("C", "broken")];
        assert!(has_errors(&diags));
    }

    #[test]
    fn test_display() {
        let d = Diagnostic::error("OPERATION_MISSING", "no section for `list_routes`");
        assert_eq!(
            d.to_string(),
            "error [OPERATION_MISSING] no section for `list_routes`"
        );
    }
}
