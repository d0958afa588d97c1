//! Generation orchestration: draft → validate → bounded repair, for one
//! document or a segmented file set with bounded concurrency.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;
use tokio::task::JoinSet;

use oad_core::diag::{Diagnostic, has_errors};
use oad_core::ir::SpecIr;
use oad_core::segment::{Segment, segment_spec};

use crate::generator::{GenerationOptions, GeneratorError, TextGenerator};
use crate::prompt;
use crate::scan::{ScanConfig, scan_text};
use crate::validate::{check_coverage, validate_document, validate_index};

/// Repair attempts per document, after the initial draft.
pub const MAX_REPAIR_ATTEMPTS: usize = 3;

/// Default segmented-mode worker count.
pub const DEFAULT_WORKERS: usize = 3;

/// Fatal run failures. Contract violations are not errors; they ride in
/// `DocumentOutcome::diagnostics`; these abort the run with no partial
/// recovery.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("generator returned an empty response")]
    EmptyResponse,

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error("worker task failed: {0}")]
    Worker(String),
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub workers: usize,
    pub generation: GenerationOptions,
    pub scan: ScanConfig,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            workers: DEFAULT_WORKERS,
            generation: GenerationOptions::default(),
            scan: ScanConfig::default(),
        }
    }
}

/// One finished document. When `diagnostics` still contains errors the
/// attempt budget was exhausted; the caller decides not to persist it.
#[derive(Debug, Clone)]
pub struct DocumentOutcome {
    pub document: String,
    pub diagnostics: Vec<Diagnostic>,
    /// Repair attempts consumed (0 = first draft validated clean).
    pub repairs: usize,
}

impl DocumentOutcome {
    pub fn is_clean(&self) -> bool {
        !has_errors(&self.diagnostics)
    }
}

/// Result of a segmented run: per-segment outcomes in segment order, plus
/// the index document generated after all of them.
#[derive(Debug)]
pub struct SegmentedOutcome {
    pub segments: Vec<(Segment, DocumentOutcome)>,
    pub index: DocumentOutcome,
}

/// A generated file with path and content.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

impl SegmentedOutcome {
    pub fn is_clean(&self) -> bool {
        self.index.is_clean() && self.segments.iter().all(|(_, o)| o.is_clean())
    }

    /// Lay the outcome out as a file set: the index at the root plus one
    /// document per segment under `skills/`.
    pub fn files(&self) -> Vec<GeneratedFile> {
        let mut files = vec![GeneratedFile {
            path: crate::config::INDEX_FILE_NAME.to_string(),
            content: self.index.document.clone(),
        }];
        for (segment, outcome) in &self.segments {
            files.push(GeneratedFile {
                path: segment.file_path.clone(),
                content: outcome.document.clone(),
            });
        }
        files
    }
}

async fn generate_checked(
    generator: &dyn TextGenerator,
    prompt: &str,
    options: &GenerationOptions,
) -> Result<String, PipelineError> {
    let text = generator.generate(prompt, options).await?;
    if text.trim().is_empty() {
        return Err(PipelineError::EmptyResponse);
    }
    Ok(text)
}

/// Draft, then validate against one fixed contract, repairing up to
/// `MAX_REPAIR_ATTEMPTS` times. Exhaustion returns the last document with
/// its unresolved diagnostics; success is never fabricated.
async fn draft_and_repair(
    generator: &dyn TextGenerator,
    options: &GenerationOptions,
    task_prompt: &str,
    validate: impl Fn(&str) -> Vec<Diagnostic>,
) -> Result<DocumentOutcome, PipelineError> {
    let mut document = generate_checked(generator, task_prompt, options).await?;
    let mut repairs = 0;
    loop {
        let diagnostics = validate(&document);
        if !has_errors(&diagnostics) || repairs == MAX_REPAIR_ATTEMPTS {
            if has_errors(&diagnostics) {
                log::warn!(
                    "repair budget exhausted with {} unresolved diagnostics",
                    diagnostics.len()
                );
            }
            return Ok(DocumentOutcome {
                document,
                diagnostics,
                repairs,
            });
        }
        let repair = prompt::repair_prompt(task_prompt, &document, &diagnostics);
        document = generate_checked(generator, &repair, options).await?;
        repairs += 1;
    }
}

/// Generate and validate one document covering the whole IR.
pub async fn run_single(
    ir: &SpecIr,
    generator: &dyn TextGenerator,
    options: &RunOptions,
) -> Result<DocumentOutcome, PipelineError> {
    let task_prompt = prompt::document_prompt(ir);
    draft_and_repair(generator, &options.generation, &task_prompt, |doc| {
        let mut diagnostics = validate_document(doc, ir);
        diagnostics.extend(scan_text(doc, &options.scan));
        diagnostics
    })
    .await
}

/// Generate one document per segment plus an index.
///
/// A fixed pool of workers pulls segment indices from a shared atomic
/// cursor; each worker runs a full draft/validate/repair cycle per pull,
/// so no segment's repair loop blocks another's progress. With one worker
/// this collapses to strict sequential processing in segment order. The
/// index is generated only after every segment result is known, because
/// its contract depends on the final per-segment operation assignments.
pub async fn run_segmented(
    ir: &SpecIr,
    generator: Arc<dyn TextGenerator>,
    options: &RunOptions,
) -> Result<SegmentedOutcome, PipelineError> {
    let segments = segment_spec(ir);
    let coverage = check_coverage(ir, &segments);

    let jobs: Arc<Vec<(SpecIr, String)>> = Arc::new(
        segments
            .iter()
            .map(|segment| {
                let sub = segment.to_spec_ir(ir);
                let task_prompt = prompt::segment_prompt(&sub);
                (sub, task_prompt)
            })
            .collect(),
    );

    let worker_count = options.workers.clamp(1, segments.len().max(1));
    let cursor = Arc::new(AtomicUsize::new(0));
    let mut workers: JoinSet<Result<Vec<(usize, DocumentOutcome)>, PipelineError>> = JoinSet::new();

    for _ in 0..worker_count {
        let cursor = Arc::clone(&cursor);
        let jobs = Arc::clone(&jobs);
        let generator = Arc::clone(&generator);
        let generation = options.generation.clone();
        let scan = options.scan.clone();
        workers.spawn(async move {
            let mut produced = Vec::new();
            loop {
                let index = cursor.fetch_add(1, Ordering::SeqCst);
                if index >= jobs.len() {
                    break;
                }
                let (sub, task_prompt) = &jobs[index];
                let outcome =
                    draft_and_repair(generator.as_ref(), &generation, task_prompt, |doc| {
                        let mut diagnostics = validate_document(doc, sub);
                        diagnostics.extend(scan_text(doc, &scan));
                        diagnostics
                    })
                    .await?;
                produced.push((index, outcome));
            }
            Ok(produced)
        });
    }

    let mut collected: Vec<Option<DocumentOutcome>> = Vec::new();
    collected.resize_with(segments.len(), || None);
    while let Some(joined) = workers.join_next().await {
        match joined {
            Err(join_error) => {
                workers.abort_all();
                return Err(PipelineError::Worker(join_error.to_string()));
            }
            Ok(Err(fatal)) => {
                workers.abort_all();
                return Err(fatal);
            }
            Ok(Ok(produced)) => {
                for (index, outcome) in produced {
                    collected[index] = Some(outcome);
                }
            }
        }
    }

    let index_task = prompt::index_prompt(&ir.title, &segments);
    let index = draft_and_repair(
        generator.as_ref(),
        &options.generation,
        &index_task,
        |doc| {
            let mut diagnostics = coverage.clone();
            diagnostics.extend(validate_index(doc, &segments));
            diagnostics.extend(scan_text(doc, &options.scan));
            diagnostics
        },
    )
    .await?;

    let mut finished = Vec::with_capacity(segments.len());
    for (segment, outcome) in segments.into_iter().zip(collected) {
        match outcome {
            Some(outcome) => finished.push((segment, outcome)),
            None => {
                return Err(PipelineError::Worker(format!(
                    "segment `{}` was never processed",
                    segment.slug
                )));
            }
        }
    }

    Ok(SegmentedOutcome {
        segments: finished,
        index,
    })
}
