//! Prompt rendering: the IR (or a segment's sub-IR, or the segment list)
//! flattened into the single opaque string the generator contract takes.

use oad_core::diag::Diagnostic;
use oad_core::ir::{OperationIr, SecuritySchemeIr, SpecIr};
use oad_core::segment::Segment;

/// Prompt for a single self-contained document covering the whole IR.
pub fn document_prompt(ir: &SpecIr) -> String {
    let mut out = String::new();
    out.push_str(
        "Write agent-facing API documentation in markdown for the API described below.\n\
         Requirements:\n\
         - Start with a `# <title>` heading.\n\
         - Add a `## Operations` section with one `### `-level heading per operation,\n\
           containing the operation id in backticks.\n\
         - In each operation section, document every parameter by name, and include an\n\
           example request in a fenced code block introduced by the word \"Example\".\n",
    );
    if has_any_auth(ir) {
        out.push_str(
            "- Name the security scheme(s) each operation requires inside its section.\n\
             - Add a `## Authentication` section with one sub-heading per security scheme.\n",
        );
    }
    if !ir.schemas.is_empty() {
        out.push_str(
            "- Add a `## Schemas` section with one sub-heading per schema named below.\n",
        );
    }
    out.push_str(
        "- Use placeholders such as $API_KEY or <token> for credentials. Never invent\n\
           or copy real-looking secret values.\n\n",
    );
    out.push_str(&render_spec(ir));
    out
}

/// Prompt for one segment document; the sub-IR already carries the
/// segment's framing in its title.
pub fn segment_prompt(sub: &SpecIr) -> String {
    document_prompt(sub)
}

/// Prompt for the index document tying the segment files together.
pub fn index_prompt(title: &str, segments: &[Segment]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Write a markdown index for the documentation of {title}, split across the\n\
         skill files listed below.\n\
         Requirements:\n\
         - Include a `## Skill Files` heading.\n\
         - Add one sub-heading per file, containing its path in backticks.\n\
         - Under each file's sub-heading, list every operation id it covers in backticks.\n\n",
    ));
    for segment in segments {
        out.push_str(&format!("File `{}` — {}\n", segment.file_path, segment.title));
        for op in &segment.operations {
            out.push_str(&format!(
                "  - `{}` ({} {})\n",
                op.id,
                op.method.as_str(),
                op.path
            ));
        }
    }
    out
}

/// Repair prompt: the original task, the prior document, and the specific
/// diagnostics it failed on.
pub fn repair_prompt(task: &str, prior: &str, diagnostics: &[Diagnostic]) -> String {
    let mut out = String::new();
    out.push_str(
        "The document below failed validation. Return the full corrected document,\n\
         fixing every problem listed while keeping everything that already validates.\n\n\
         Problems:\n",
    );
    for diag in diagnostics {
        out.push_str(&format!("- [{}] {}\n", diag.code, diag.message));
    }
    out.push_str("\nOriginal task:\n");
    out.push_str(task);
    out.push_str("\n\nPrior document:\n");
    out.push_str(prior);
    out
}

fn has_any_auth(ir: &SpecIr) -> bool {
    ir.operations
        .iter()
        .any(|op| op.auth.as_ref().is_some_and(|a| !a.requirements.is_empty()))
}

fn render_spec(ir: &SpecIr) -> String {
    let mut out = String::new();
    out.push_str(&format!("API: {} (version {})\n", ir.title, ir.version));
    for server in &ir.servers {
        out.push_str(&format!("Server: {server}\n"));
    }

    out.push_str("\nOperations:\n");
    for op in &ir.operations {
        render_operation(&mut out, op);
    }

    if !ir.security_schemes.is_empty() {
        out.push_str("\nSecurity schemes:\n");
        for (name, scheme) in &ir.security_schemes {
            out.push_str(&format!("- {name}: {}\n", describe_scheme(scheme)));
        }
    }

    if !ir.schemas.is_empty() {
        out.push_str("\nSchemas:\n");
        for (name, definition) in &ir.schemas {
            out.push_str(&format!(
                "- {name}: {}\n",
                oad_core::ir::summary::summarize_schema(definition)
            ));
        }
    }

    out
}

fn render_operation(out: &mut String, op: &OperationIr) {
    out.push_str(&format!("- `{}` {} {}\n", op.id, op.method.as_str(), op.path));
    if let Some(summary) = &op.summary {
        out.push_str(&format!("  summary: {summary}\n"));
    }
    for param in &op.parameters {
        let requiredness = if param.required { "required" } else { "optional" };
        out.push_str(&format!(
            "  parameter {} ({}, {}): {}\n",
            param.name,
            param.location.as_str(),
            requiredness,
            param.schema
        ));
        if !param.enum_values.is_empty() {
            out.push_str(&format!("    one of: {}\n", param.enum_values.join(", ")));
        }
        if let Some(default) = &param.default {
            out.push_str(&format!("    default: {default}\n"));
        }
    }
    if let Some(body) = &op.request_body {
        let requiredness = if body.required { "required" } else { "optional" };
        out.push_str(&format!(
            "  request body ({requiredness}): {} [{}]\n",
            body.schema,
            body.content_types.join(", ")
        ));
    }
    for response in &op.responses {
        let schema = response.schema.as_deref().unwrap_or("no body");
        out.push_str(&format!("  response {}: {schema}\n", response.status));
    }
    if let Some(auth) = &op.auth {
        if auth.requirements.is_empty() {
            return;
        }
        let alternatives: Vec<String> = auth
            .requirements
            .iter()
            .map(|set| {
                set.schemes
                    .iter()
                    .map(|(name, scopes)| {
                        if scopes.is_empty() {
                            name.clone()
                        } else {
                            format!("{name} [{}]", scopes.join(", "))
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" + ")
            })
            .collect();
        let optionality = if auth.optional { ", optional" } else { "" };
        out.push_str(&format!(
            "  auth: {}{optionality}\n",
            alternatives.join(" or ")
        ));
    }
}

fn describe_scheme(scheme: &SecuritySchemeIr) -> String {
    match scheme {
        SecuritySchemeIr::ApiKey { location, name } => {
            format!("API key in {} parameter `{name}`", location.as_str())
        }
        SecuritySchemeIr::Http {
            scheme,
            bearer_format,
        } => match bearer_format {
            Some(format) => format!("HTTP {scheme} ({format})"),
            None => format!("HTTP {scheme}"),
        },
        SecuritySchemeIr::OAuth2 { flows } => {
            let kinds: Vec<&str> = flows.iter().map(|f| f.kind.as_str()).collect();
            format!("OAuth2 ({})", kinds.join(", "))
        }
        SecuritySchemeIr::OpenIdConnect { url } => match url {
            Some(url) => format!("OpenID Connect ({url})"),
            None => "OpenID Connect".to_string(),
        },
        SecuritySchemeIr::MutualTls => "mutual TLS".to_string(),
        SecuritySchemeIr::Unknown => "unrecognized scheme".to_string(),
    }
}
