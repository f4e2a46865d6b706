//! Ontology storage for ontoforge.
//!
//! ```text
//!   LLM fragment ──► OntologyStore::merge_fragment ──► merged graph ──► final_ontology.ttl
//!        │                    │ (parse, then one repair call)
//!        ▼                    ▼
//!   FragmentArchive      ReviewQueue (fragments that never parsed)
//! ```
//!
//! - [`OntologyStore`] owns the graph. It only grows by merges, except when a
//!   validation pass replaces it wholesale.
//! - [`FragmentArchive`] keeps every generated fragment for auditing.
//! - [`ReviewQueue`] keeps fragments that failed parse and repair so a later
//!   review run can retry them.
//!
//! Nothing here is concurrent: the store is owned (`&mut`) by one driver.

pub mod archive;
pub mod review;
pub mod store;


use serde::{Deserialize, Serialize};
use std::fmt;

pub use archive::FragmentArchive;
pub use review::{DirReviewQueue, ReviewItem, ReviewQueue};
pub use store::{MergeOutcome, OntologyStore, RepairFailure, ValidationFailure, ValidationOutcome};

pub const FRAGMENT_EXTENSION: &str = "ttl";

/// Identifies the fragment generated for one chunk of one document.
///
/// `document` is the source file name (extension included), so the key maps
/// to a flat file name: `{document}_{chunk_index}.ttl`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FragmentKey {
    pub document: String,
    pub chunk_index: usize,
}

impl FragmentKey {
    pub fn new(document: impl Into<String>, chunk_index: usize) -> Self {
        Self {
            document: document.into(),
            chunk_index,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{self}.{FRAGMENT_EXTENSION}")
    }

    /// Inverse of [`FragmentKey::file_name`]. The chunk index is taken from the
    /// last `_`, so document names may themselves contain underscores.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(".ttl")?;
        let (document, index) = stem.rsplit_once('_')?;
        if document.is_empty() {
            return None;
        }
        Some(Self::new(document, index.parse().ok()?))
    }
}

impl fmt::Display for FragmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.document, self.chunk_index)
    }
}

/// Reject names that could escape the directory they are joined onto.
pub(crate) fn ensure_flat_name(name: &str) -> anyhow::Result<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
    {
        anyhow::bail!("invalid file name `{name}`");
    }
    Ok(())
}
