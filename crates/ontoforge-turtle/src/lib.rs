//! Turtle boundary for ontoforge.
//!
//! LLM-produced ontology fragments are **untrusted** text. This crate is the
//! only place that turns such text into triples:
//!
//! - [`parse_turtle`] parses with Sophia and converts terms into an owned,
//!   ordered model ([`Triple`], [`Node`], [`Object`], [`Literal`]).
//! - [`OntologyGraph`] is a triple *set* plus a prefix table; union is the
//!   only way graphs combine.
//! - [`to_turtle`] prints a graph deterministically.
//!
//! Nothing here reasons over the triples (no OWL semantics, no SPARQL).

pub mod digest;
pub mod graph;
pub mod parse;
pub mod prefixes;
pub mod serialize;
pub mod term;

pub use graph::{base_namespace, OntologyGraph};
pub use parse::{parse_turtle, strip_code_fence, validate_base_iri, BlankNodes, ParsedTurtle};
pub use prefixes::PrefixMap;
pub use serialize::to_turtle;
pub use term::{local_name, Literal, Node, Object, Triple};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TurtleError {
    #[error("turtle syntax error: {0}")]
    Syntax(String),
    #[error("unsupported term `{term}`: {reason}")]
    Term { term: String, reason: String },
    #[error("invalid base IRI `{0}` (expected an absolute IRI without spaces)")]
    InvalidBase(String),
}
