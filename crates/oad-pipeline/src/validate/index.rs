//! Index-document checks for segmented mode.

use oad_core::diag::Diagnostic;
use oad_core::segment::Segment;

use super::sections::{Outline, Section, mentions};

pub const INDEX_HEADING_MISSING: &str = "INDEX_HEADING_MISSING";
pub const INDEX_FILE_MISSING: &str = "INDEX_FILE_MISSING";
pub const INDEX_OPERATION_MISSING: &str = "INDEX_OPERATION_MISSING";

/// Validate the index document against the final segment assignments.
pub fn validate_index(document: &str, segments: &[Segment]) -> Vec<Diagnostic> {
    let outline = Outline::parse(document);
    let mut diagnostics = Vec::new();

    if outline.top_section("Skill Files").is_none() {
        diagnostics.push(Diagnostic::error(
            INDEX_HEADING_MISSING,
            "index has no Skill Files heading",
        ));
    }

    for segment in segments {
        match find_file_section(&outline, &segment.file_path) {
            None => diagnostics.push(Diagnostic::error(
                INDEX_FILE_MISSING,
                format!("index has no section for `{}`", segment.file_path),
            )),
            Some(section) => {
                for op in &segment.operations {
                    if !mentions(&section.body, &op.id) {
                        diagnostics.push(Diagnostic::error(
                            INDEX_OPERATION_MISSING,
                            format!(
                                "operation `{}` is not listed in the index section for `{}`",
                                op.id, segment.file_path
                            ),
                        ));
                    }
                }
            }
        }
    }

    diagnostics
}

fn find_file_section<'a>(outline: &'a Outline, file_path: &str) -> Option<&'a Section> {
    outline
        .sections
        .iter()
        .find(|s| s.heading.contains(file_path))
}
