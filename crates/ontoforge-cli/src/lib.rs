//! Ontoforge: turn a corpus of PDFs, scans and text files into one OWL
//! ontology in Turtle, one LLM-generated fragment per text chunk.
//!
//! The binary (`ontoforge`) is a thin clap front-end over this library so the
//! pipeline and review mode can be driven from tests with scripted collaborators.

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod review_mode;
pub mod viz;

pub use config::{PipelineArgs, PipelineConfig};
pub use pipeline::{run_pipeline, Collaborators, RunSummary};
pub use review_mode::{run_review, ReviewSummary};
