//! The ontology store and its merge/repair/validate protocol.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

use ontoforge_llm::{prompts, CallKind, CompletionRequest, LlmClient, LlmError};
use ontoforge_turtle::{strip_code_fence, validate_base_iri, OntologyGraph, TurtleError};

/// Result of [`OntologyStore::merge_fragment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Parsed as-is; `added` triples were new.
    Merged { added: usize },
    /// Parsed only after one repair call.
    Repaired {
        added: usize,
        parse_error: TurtleError,
    },
    /// Neither the fragment nor its repair parsed. The store is unchanged.
    RepairExhausted {
        parse_error: TurtleError,
        repair_error: RepairFailure,
    },
    /// Nothing but whitespace or an empty code fence. The store is unchanged.
    Empty,
}

impl MergeOutcome {
    pub fn is_merged(&self) -> bool {
        matches!(self, Self::Merged { .. } | Self::Repaired { .. })
    }

    pub fn added(&self) -> usize {
        match self {
            Self::Merged { added } | Self::Repaired { added, .. } => *added,
            Self::RepairExhausted { .. } | Self::Empty => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepairFailure {
    #[error("repair call failed: {0}")]
    Call(LlmError),
    #[error("repaired fragment still does not parse: {0}")]
    Parse(TurtleError),
    #[error("repaired fragment contains no triples")]
    Empty,
}

/// Result of [`OntologyStore::validate_with_llm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// The graph was replaced by the validator's output.
    Replaced { before: usize, after: usize },
    /// The graph is untouched.
    Failed { reason: ValidationFailure },
}

impl ValidationOutcome {
    pub fn is_replaced(&self) -> bool {
        matches!(self, Self::Replaced { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    #[error("validation call failed: {0}")]
    Call(LlmError),
    #[error("validated ontology does not parse: {0}")]
    Parse(TurtleError),
    #[error("validator returned no triples for a graph of {0}")]
    NoTriples(usize),
}

/// Owns the merged ontology graph.
#[derive(Debug, Clone)]
pub struct OntologyStore {
    graph: OntologyGraph,
    base_uri: String,
}

impl OntologyStore {
    /// Empty store. `base_uri` resolves relative IRIs in fragments and its
    /// namespace ([`base_namespace`]) is bound to the empty prefix.
    ///
    /// Relative IRIs resolve against the bare base, not the namespace: with
    /// base `http://x.org/onto`, `<Doctor>` is `http://x.org/Doctor` while
    /// `<#Doctor>` and `:Doctor` are `http://x.org/onto#Doctor`.
    ///
    /// [`base_namespace`]: ontoforge_turtle::base_namespace
    pub fn new(base_uri: &str) -> Result<Self, TurtleError> {
        validate_base_iri(base_uri)?;
        Ok(Self {
            graph: OntologyGraph::with_base(base_uri),
            base_uri: base_uri.to_string(),
        })
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn graph(&self) -> &OntologyGraph {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    fn parse_fragment(&self, text: &str) -> Result<OntologyGraph, TurtleError> {
        OntologyGraph::parse_fragment(strip_code_fence(text), Some(&self.base_uri))
    }

    /// Whole-ontology text: a saved file or a validator's rewrite of ours.
    fn parse_document(&self, text: &str) -> Result<OntologyGraph, TurtleError> {
        OntologyGraph::parse(strip_code_fence(text), Some(&self.base_uri))
    }

    /// Parse `turtle` and union it into the graph, asking `llm` for one repair
    /// if it does not parse. Never touches durable storage.
    pub fn merge_fragment(&mut self, turtle: &str, llm: &dyn LlmClient) -> MergeOutcome {
        if strip_code_fence(turtle).is_empty() {
            tracing::debug!("fragment is empty; nothing to merge");
            return MergeOutcome::Empty;
        }

        let parse_error = match self.parse_fragment(turtle) {
            Ok(candidate) => {
                let added = self.graph.union(candidate);
                tracing::debug!(added, total = self.graph.len(), "fragment merged");
                return MergeOutcome::Merged { added };
            }
            Err(e) => e,
        };

        tracing::warn!(error = %parse_error, "fragment does not parse; requesting repair");
        let request = CompletionRequest::text(
            CallKind::Repair,
            prompts::repair_prompt(strip_code_fence(turtle), &parse_error.to_string()),
        );
        let repaired = match llm.complete(&request) {
            Ok(text) => text,
            Err(e) => {
                return MergeOutcome::RepairExhausted {
                    parse_error,
                    repair_error: RepairFailure::Call(e),
                }
            }
        };

        match self.parse_fragment(&repaired) {
            Ok(candidate) if candidate.is_empty() => MergeOutcome::RepairExhausted {
                parse_error,
                repair_error: RepairFailure::Empty,
            },
            Ok(candidate) => {
                let added = self.graph.union(candidate);
                tracing::info!(added, total = self.graph.len(), "repaired fragment merged");
                MergeOutcome::Repaired { added, parse_error }
            }
            Err(e) => MergeOutcome::RepairExhausted {
                parse_error,
                repair_error: RepairFailure::Parse(e),
            },
        }
    }

    pub fn current_ontology_ttl(&self) -> String {
        self.graph.to_turtle()
    }

    /// Replace `path` with the current ontology, creating parent directories.
    ///
    /// The text goes to a temporary file in the same directory which is then
    /// renamed over `path`; a failed write leaves the previous file intact.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).with_context(|| format!("failed to create `{}`", dir.display()))?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("failed to create a temporary file in `{}`", dir.display()))?;
        tmp.write_all(self.current_ontology_ttl().as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .with_context(|| format!("failed to write ontology for `{}`", path.display()))?;
        tmp.persist(path)
            .map_err(|e| e.error)
            .with_context(|| format!("failed to write ontology to `{}`", path.display()))?;
        tracing::info!(path = %path.display(), triples = self.graph.len(), "ontology saved");
        Ok(())
    }

    /// Union a previously saved ontology into the store. Returns the number of
    /// new triples. A file that does not parse is an error: it was written by
    /// us, so something is wrong beyond a bad LLM reply.
    pub fn load_from_file(&mut self, path: &Path) -> Result<usize> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read ontology `{}`", path.display()))?;
        let graph = self
            .parse_document(&text)
            .with_context(|| format!("failed to parse ontology `{}`", path.display()))?;
        let added = self.graph.union(graph);
        tracing::info!(path = %path.display(), added, "ontology loaded");
        Ok(added)
    }

    /// Drop every triple.
    pub fn clear(&mut self) {
        self.graph = OntologyGraph::with_base(&self.base_uri);
    }

    /// Ask `llm` to clean up the whole ontology and, if its reply parses,
    /// replace the graph with it. Any failure leaves the graph as it was.
    pub fn validate_with_llm(&mut self, llm: &dyn LlmClient) -> ValidationOutcome {
        let before = self.graph.len();
        let request = CompletionRequest::text(
            CallKind::Validate,
            prompts::validation_prompt(&self.current_ontology_ttl()),
        );

        let failed = |reason: ValidationFailure| {
            tracing::error!(error = %reason, "ontology validation failed; keeping current graph");
            ValidationOutcome::Failed { reason }
        };

        let reply = match llm.complete(&request) {
            Ok(text) => text,
            Err(e) => return failed(ValidationFailure::Call(e)),
        };
        let validated = match self.parse_document(&reply) {
            Ok(graph) => graph,
            Err(e) => return failed(ValidationFailure::Parse(e)),
        };
        if validated.is_empty() && before > 0 {
            return failed(ValidationFailure::NoTriples(before));
        }

        let mut replacement = OntologyGraph::with_base(&self.base_uri);
        replacement.union(validated);
        self.graph = replacement;
        let after = self.graph.len();
        tracing::info!(before, after, "ontology replaced by validation pass");
        ValidationOutcome::Replaced { before, after }
    }
}
