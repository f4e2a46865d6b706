//! Pipeline configuration.
//!
//! Every setting resolves as: command-line flag, then environment variable,
//! then default. LLM settings are separate (`ontoforge_llm::LlmConfig`) and
//! come from the environment only, so API keys never appear in argv.

use anyhow::{anyhow, Result};
use clap::Args;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use ontoforge_ingest::StagingDirs;
use ontoforge_turtle::validate_base_iri;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_OUTPUT: &str = "output/final_ontology.ttl";
pub const DEFAULT_BASE_URI: &str = "http://example.com/ontology";
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_RESPONSE_LOG: &str = "logs/llm_responses.jsonl";

#[derive(Debug, Clone, Args)]
pub struct PipelineArgs {
    /// Data directory holding raw/, images/, processed/, ontology_fragments/ and review/
    #[arg(long, env = "ONTOFORGE_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Final ontology path (overwritten on every run)
    #[arg(long, env = "ONTOFORGE_OUTPUT", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Base URI of the ontology; relative IRIs in fragments resolve against it
    #[arg(long, env = "BASE_URI", default_value = DEFAULT_BASE_URI)]
    pub base_uri: String,

    /// Chunk size in characters
    #[arg(long, env = "CHUNK_SIZE", default_value = "1000")]
    pub chunk_size: NonZeroUsize,

    /// Include the current ontology in every generation prompt
    #[arg(long, env = "ONTOFORGE_PROMPT_CONTEXT")]
    pub prompt_context: bool,

    /// JSON-lines log of every LLM call
    #[arg(long, env = "ONTOFORGE_RESPONSE_LOG", default_value = DEFAULT_RESPONSE_LOG)]
    pub response_log: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub output: PathBuf,
    pub base_uri: String,
    pub chunk_size: NonZeroUsize,
    pub prompt_context: bool,
    pub response_log: PathBuf,
    /// Do not stage `raw/` (use whatever is already in images/ and processed/).
    pub skip_raw: bool,
    /// Do not OCR staged images.
    pub skip_ocr: bool,
}

impl PipelineConfig {
    /// Defaults rooted at `data_dir`, with output and logs beside it.
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            data_dir: root.join(DEFAULT_DATA_DIR),
            output: root.join(DEFAULT_OUTPUT),
            base_uri: DEFAULT_BASE_URI.to_string(),
            chunk_size: NonZeroUsize::new(DEFAULT_CHUNK_SIZE).unwrap_or(NonZeroUsize::MIN),
            prompt_context: false,
            response_log: root.join(DEFAULT_RESPONSE_LOG),
            skip_raw: false,
            skip_ocr: false,
        }
    }

    pub fn staging_dirs(&self) -> StagingDirs {
        StagingDirs::under(&self.data_dir)
    }

    pub fn fragments_dir(&self) -> PathBuf {
        self.data_dir.join("ontology_fragments")
    }

    pub fn review_dir(&self) -> PathBuf {
        self.data_dir.join("review")
    }
}

impl PipelineArgs {
    pub fn into_config(self, skip_raw: bool, skip_ocr: bool) -> Result<PipelineConfig> {
        validate_base_iri(&self.base_uri).map_err(|e| anyhow!("--base-uri / BASE_URI: {e}"))?;
        Ok(PipelineConfig {
            data_dir: self.data_dir,
            output: self.output,
            base_uri: self.base_uri,
            chunk_size: self.chunk_size,
            prompt_context: self.prompt_context,
            response_log: self.response_log,
            skip_raw,
            skip_ocr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> PipelineArgs {
        PipelineArgs {
            data_dir: PathBuf::from("corpus"),
            output: PathBuf::from("out/onto.ttl"),
            base_uri: "http://example.org/clinic".to_string(),
            chunk_size: NonZeroUsize::new(500).expect("non-zero"),
            prompt_context: true,
            response_log: PathBuf::from("logs/calls.jsonl"),
        }
    }

    #[test]
    fn derives_data_subdirectories() {
        let config = args().into_config(true, false).expect("config");
        assert!(config.skip_raw);
        assert_eq!(config.fragments_dir(), PathBuf::from("corpus/ontology_fragments"));
        assert_eq!(config.review_dir(), PathBuf::from("corpus/review"));
        assert_eq!(config.staging_dirs().raw, PathBuf::from("corpus/raw"));
        assert_eq!(config.staging_dirs().processed, PathBuf::from("corpus/processed"));
    }

    #[test]
    fn rejects_relative_base_uri() {
        let mut bad = args();
        bad.base_uri = "clinic ontology".to_string();
        assert!(bad.into_config(false, false).is_err());
    }

    #[test]
    fn rooted_defaults_match_documented_layout() {
        let config = PipelineConfig::rooted_at(Path::new("/work"));
        assert_eq!(config.output, PathBuf::from("/work/output/final_ontology.ttl"));
        assert_eq!(config.chunk_size.get(), DEFAULT_CHUNK_SIZE);
        assert_eq!(config.base_uri, DEFAULT_BASE_URI);
        assert!(!config.prompt_context);
    }
}
