//! The batch pipeline: stage → OCR → chunk → generate → merge → validate → persist.
//!
//! Single-threaded, one fragment in flight. External-call failures are logged
//! and skipped; filesystem write failures abort the run.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

use ontoforge_ingest::{
    classify, file_name, list_files, ocr_images, split_chars, stage_raw, InputKind, OcrEngine,
    OcrReport, PdfRasterizer, StagingReport,
};
use ontoforge_llm::{prompts, CallKind, CompletionRequest, LlmClient};
use ontoforge_storage::{
    FragmentArchive, FragmentKey, MergeOutcome, OntologyStore, ReviewItem, ReviewQueue,
};
use ontoforge_turtle::strip_code_fence;

use crate::config::PipelineConfig;

/// External collaborators, constructed by the caller.
pub struct Collaborators<'a> {
    pub llm: &'a dyn LlmClient,
    pub ocr: &'a dyn OcrEngine,
    pub rasterizer: &'a dyn PdfRasterizer,
    pub review: &'a dyn ReviewQueue,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staging: Option<StagingReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr: Option<OcrReport>,
    pub documents: usize,
    pub chunks: usize,
    pub merged: usize,
    pub repaired: usize,
    pub queued: usize,
    /// Chunks whose generation call failed.
    pub skipped: usize,
    pub validations_ok: usize,
    pub validations_failed: usize,
    pub triples: usize,
}

pub fn run_pipeline(config: &PipelineConfig, collab: &Collaborators<'_>) -> Result<RunSummary> {
    tracing::info!(data_dir = %config.data_dir.display(), "starting ontology generation pipeline");
    let mut summary = RunSummary::default();
    let mut store = OntologyStore::new(&config.base_uri)?;
    let archive = FragmentArchive::new(config.fragments_dir());
    let dirs = config.staging_dirs();

    if !config.skip_raw {
        summary.staging = Some(stage_raw(&dirs, collab.rasterizer)?);
    }
    if !config.skip_ocr {
        summary.ocr = Some(ocr_images(&dirs, collab.ocr)?);
    }

    for path in list_files(&dirs.processed)? {
        if classify(&path) != InputKind::Text {
            tracing::info!(path = %path.display(), "not a text file; skipping");
            continue;
        }
        process_document(config, collab, &mut store, &archive, &path, &mut summary)?;
    }

    store.save_to_file(&config.output)?;
    summary.triples = store.len();
    tracing::info!(?summary, "ontology generation pipeline completed");
    Ok(summary)
}

fn process_document(
    config: &PipelineConfig,
    collab: &Collaborators<'_>,
    store: &mut OntologyStore,
    archive: &FragmentArchive,
    path: &Path,
    summary: &mut RunSummary,
) -> Result<()> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "cannot read document; skipping");
            return Ok(());
        }
    };
    let document = file_name(path);
    let chunks = split_chars(&text, config.chunk_size);
    summary.documents += 1;
    tracing::info!(document = %document, chunks = chunks.len(), "processing document");

    for (chunk_index, chunk) in chunks.iter().enumerate() {
        summary.chunks += 1;
        let key = FragmentKey::new(&document, chunk_index);

        let context =
            (config.prompt_context && !store.is_empty()).then(|| store.current_ontology_ttl());
        let request = CompletionRequest::text(
            CallKind::Generate,
            prompts::generation_prompt(chunk, store.base_uri(), context.as_deref()),
        );
        let fragment = match collab.llm.complete(&request) {
            Ok(fragment) => fragment,
            Err(e) => {
                summary.skipped += 1;
                tracing::warn!(fragment = %key, error = %e, "no fragment generated; skipping chunk");
                continue;
            }
        };

        if strip_code_fence(&fragment).is_empty() {
            summary.skipped += 1;
            tracing::warn!(fragment = %key, "generated fragment is empty; skipping chunk");
            continue;
        }

        archive.store(&key, &fragment)?;
        match store.merge_fragment(&fragment, collab.llm) {
            MergeOutcome::Merged { added } => {
                summary.merged += 1;
                tracing::info!(fragment = %key, added, "fragment merged");
            }
            MergeOutcome::Repaired { added, .. } => {
                summary.repaired += 1;
                tracing::info!(fragment = %key, added, "fragment merged after repair");
            }
            MergeOutcome::RepairExhausted {
                parse_error,
                repair_error,
            } => {
                tracing::error!(
                    fragment = %key,
                    parse_error = %parse_error,
                    repair_error = %repair_error,
                    "fragment did not merge; queueing for review"
                );
                collab
                    .review
                    .enqueue(&ReviewItem {
                        key: key.clone(),
                        turtle: fragment,
                    })
                    .with_context(|| format!("failed to queue fragment {key} for review"))?;
                summary.queued += 1;
            }
            MergeOutcome::Empty => summary.skipped += 1,
        }
    }

    if !chunks.is_empty() {
        tracing::info!(document = %document, "validating ontology");
        if store.validate_with_llm(collab.llm).is_replaced() {
            summary.validations_ok += 1;
        } else {
            summary.validations_failed += 1;
            tracing::error!(document = %document, "ontology validation failed");
        }
    }
    Ok(())
}
