//! Segmentation integrity, independent of any generated text: every
//! operation id must land in exactly one segment.

use std::collections::HashMap;

use oad_core::diag::Diagnostic;
use oad_core::ir::SpecIr;
use oad_core::segment::Segment;

pub const OPERATION_UNCOVERED: &str = "OPERATION_UNCOVERED";
pub const OPERATION_DUPLICATED: &str = "OPERATION_DUPLICATED";
pub const OPERATION_UNKNOWN: &str = "OPERATION_UNKNOWN";

/// Re-verify the partition law instead of assuming it by construction.
pub fn check_coverage(ir: &SpecIr, segments: &[Segment]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for segment in segments {
        for op in &segment.operations {
            if ir.operations.iter().any(|known| known.id == op.id) {
                *counts.entry(op.id.as_str()).or_insert(0) += 1;
            } else {
                diagnostics.push(Diagnostic::error(
                    OPERATION_UNKNOWN,
                    format!(
                        "segment `{}` lists operation `{}`, which is not in the IR",
                        segment.slug, op.id
                    ),
                ));
            }
        }
    }

    for op in &ir.operations {
        match counts.get(op.id.as_str()).copied().unwrap_or(0) {
            0 => diagnostics.push(Diagnostic::error(
                OPERATION_UNCOVERED,
                format!("operation `{}` is not covered by any segment", op.id),
            )),
            1 => {}
            n => diagnostics.push(Diagnostic::error(
                OPERATION_DUPLICATED,
                format!("operation `{}` appears in {n} segments", op.id),
            )),
        }
    }

    diagnostics
}
