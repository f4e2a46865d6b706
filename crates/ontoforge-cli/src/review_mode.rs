//! Review mode: retry queued fragments against the persisted ontology.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use ontoforge_llm::LlmClient;
use ontoforge_storage::{OntologyStore, ReviewQueue, FRAGMENT_EXTENSION};

use crate::config::PipelineConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    /// Turtle entries found in the queue.
    pub total: usize,
    pub merged: usize,
    pub remaining: usize,
    /// Non-Turtle entries left alone.
    pub skipped: usize,
    pub triples: usize,
}

/// Load the final ontology (if any), merge every queued fragment that now
/// parses (with one repair attempt each), drop merged items from the queue and
/// persist the ontology again. Items that cannot be read stay queued.
pub fn run_review(
    config: &PipelineConfig,
    llm: &dyn LlmClient,
    queue: &dyn ReviewQueue,
) -> Result<ReviewSummary> {
    let mut store = OntologyStore::new(&config.base_uri)?;
    if config.output.exists() {
        store.load_from_file(&config.output)?;
    }

    let mut summary = ReviewSummary::default();
    for name in queue.list()? {
        if !is_fragment_file(&name) {
            summary.skipped += 1;
            tracing::info!(entry = %name, "not a Turtle file; skipping");
            continue;
        }
        summary.total += 1;

        let turtle = match queue.read(&name) {
            Ok(turtle) => turtle,
            Err(e) => {
                summary.remaining += 1;
                tracing::error!(
                    entry = %name,
                    error = %format!("{e:#}"),
                    "cannot read review item; leaving it queued"
                );
                continue;
            }
        };
        let outcome = store.merge_fragment(&turtle, llm);
        if outcome.is_merged() {
            queue.remove(&name)?;
            summary.merged += 1;
            tracing::info!(entry = %name, added = outcome.added(), "review item merged and removed");
        } else {
            summary.remaining += 1;
            tracing::warn!(entry = %name, "review item still does not merge");
        }
    }

    store.save_to_file(&config.output)?;
    summary.triples = store.len();
    Ok(summary)
}

fn is_fragment_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(FRAGMENT_EXTENSION))
}
