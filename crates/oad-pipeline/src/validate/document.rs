//! Operation-level and document-level checks of a generated document
//! against the IR contract.

use oad_core::closure::{contains_word, schema_closure};
use oad_core::diag::Diagnostic;
use oad_core::ir::{OperationIr, SpecIr};

use super::sections::{Outline, Section, mentions};

pub const OPERATIONS_HEADING_MISSING: &str = "OPERATIONS_HEADING_MISSING";
pub const OPERATION_MISSING: &str = "OPERATION_MISSING";
pub const PARAM_MISSING: &str = "PARAM_MISSING";
pub const EXAMPLE_MISSING: &str = "EXAMPLE_MISSING";
pub const AUTH_SECTION_MISSING: &str = "AUTH_SECTION_MISSING";
pub const AUTH_SCHEME_MISSING: &str = "AUTH_SCHEME_MISSING";
pub const AUTH_LANGUAGE_MISSING: &str = "AUTH_LANGUAGE_MISSING";
pub const SCHEMA_SECTION_MISSING: &str = "SCHEMA_SECTION_MISSING";
pub const SCHEMA_MISSING: &str = "SCHEMA_MISSING";

/// Validate a generated document against the IR. Diagnostics accumulate;
/// nothing raises.
pub fn validate_document(document: &str, ir: &SpecIr) -> Vec<Diagnostic> {
    let outline = Outline::parse(document);
    let mut diagnostics = Vec::new();

    let has_operations_heading = outline.top_section("Operations").is_some()
        || ir.operations.iter().any(|op| outline.find(&op.id).is_some());
    if !has_operations_heading {
        diagnostics.push(Diagnostic::error(
            OPERATIONS_HEADING_MISSING,
            "document has no Operations heading",
        ));
    }

    for op in &ir.operations {
        match outline.find(&op.id) {
            None => diagnostics.push(Diagnostic::error(
                OPERATION_MISSING,
                format!("operation `{}` has no section", op.id),
            )),
            Some(section) => check_operation_section(op, section, &mut diagnostics),
        }
    }

    check_auth_section(&outline, ir, &mut diagnostics);
    check_schema_section(&outline, ir, &mut diagnostics);

    diagnostics
}

fn check_operation_section(op: &OperationIr, section: &Section, diagnostics: &mut Vec<Diagnostic>) {
    for param in op.parameters.iter().filter(|p| p.required) {
        if !mentions(&section.body, &param.name) {
            diagnostics.push(Diagnostic::error(
                PARAM_MISSING,
                format!(
                    "required parameter `{}` is not mentioned in the section for `{}`",
                    param.name, op.id
                ),
            ));
        }
    }

    if !section.body.to_lowercase().contains("example") {
        diagnostics.push(Diagnostic::error(
            EXAMPLE_MISSING,
            format!("section for `{}` has no example request", op.id),
        ));
    }

    let Some(auth) = &op.auth else {
        return;
    };
    if auth.requirements.is_empty() {
        return;
    }

    let names = auth.scheme_names();
    let missing: Vec<&str> = names
        .iter()
        .filter(|name| !mentions(&section.body, name))
        .copied()
        .collect();
    if missing.is_empty() {
        return; // every required scheme is named
    }

    let none_named = missing.len() == names.len();
    if auth.optional {
        // Exempt from naming schemes, but not from having auth language.
        if none_named && !has_auth_language(&section.body) {
            diagnostics.push(Diagnostic::error(
                AUTH_LANGUAGE_MISSING,
                format!("section for `{}` does not mention authentication", op.id),
            ));
        }
    } else if none_named {
        if !has_auth_language(&section.body) {
            diagnostics.push(Diagnostic::error(
                AUTH_SCHEME_MISSING,
                format!(
                    "section for `{}` names none of its required security schemes ({})",
                    op.id,
                    names.join(", ")
                ),
            ));
        }
    } else {
        diagnostics.push(Diagnostic::error(
            AUTH_SCHEME_MISSING,
            format!(
                "section for `{}` is missing security scheme(s): {}",
                op.id,
                missing.join(", ")
            ),
        ));
    }
}

fn check_auth_section(outline: &Outline, ir: &SpecIr, diagnostics: &mut Vec<Diagnostic>) {
    let mut required: Vec<&str> = Vec::new();
    for op in &ir.operations {
        if let Some(auth) = &op.auth {
            for name in auth.scheme_names() {
                if !required.contains(&name) {
                    required.push(name);
                }
            }
        }
    }
    if required.is_empty() {
        return;
    }

    let Some(index) = outline.top_section("Authentication") else {
        diagnostics.push(Diagnostic::error(
            AUTH_SECTION_MISSING,
            "document has no Authentication section",
        ));
        return;
    };

    let subheadings = outline.subheadings(index);
    for name in required {
        let documented = subheadings.iter().any(|s| mentions(&s.heading, name));
        if !documented {
            diagnostics.push(Diagnostic::error(
                AUTH_SCHEME_MISSING,
                format!("security scheme `{name}` is not documented under the Authentication section"),
            ));
        }
    }
}

fn check_schema_section(outline: &Outline, ir: &SpecIr, diagnostics: &mut Vec<Diagnostic>) {
    let required = schema_closure(&ir.operations, &ir.schemas);
    if required.is_empty() {
        return;
    }

    let Some(index) = outline.top_section("Schemas") else {
        diagnostics.push(Diagnostic::error(
            SCHEMA_SECTION_MISSING,
            "document has no Schemas section",
        ));
        return;
    };

    let subheadings = outline.subheadings(index);
    for name in &required {
        let documented = subheadings.iter().any(|s| mentions(&s.heading, name));
        if !documented {
            diagnostics.push(Diagnostic::error(
                SCHEMA_MISSING,
                format!("schema `{name}` is not documented under the Schemas section"),
            ));
        }
    }
}

/// Generic authentication vocabulary, accepted when an operation section
/// names no scheme explicitly.
fn has_auth_language(text: &str) -> bool {
    let lower = text.to_lowercase();
    const WORDS: &[&str] = &[
        "auth",
        "authentication",
        "authorization",
        "bearer",
        "token",
        "credential",
        "credentials",
        "oauth",
        "oauth2",
    ];
    WORDS.iter().any(|word| contains_word(&lower, word))
        || lower.contains("api key")
        || lower.contains("api-key")
}
