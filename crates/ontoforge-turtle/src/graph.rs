//! Triple-set graph with a prefix table.

use std::collections::BTreeSet;

use crate::parse::{parse_turtle, BlankNodes, ParsedTurtle};
use crate::prefixes::PrefixMap;
use crate::serialize::to_turtle;
use crate::term::{Node, Object, Triple};
use crate::TurtleError;

/// An unordered set of triples plus the prefixes used to print it compactly.
///
/// Equality compares triples only; prefix tables are presentation.
#[derive(Debug, Clone, Default)]
pub struct OntologyGraph {
    triples: BTreeSet<Triple>,
    prefixes: PrefixMap,
}

impl PartialEq for OntologyGraph {
    fn eq(&self, other: &Self) -> bool {
        self.triples == other.triples
    }
}

impl Eq for OntologyGraph {}

impl OntologyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty graph whose prefix table binds `rdf`, `rdfs`, `owl`, `xsd` and the
    /// empty prefix to the base namespace.
    pub fn with_base(base_iri: &str) -> Self {
        let mut prefixes = PrefixMap::new();
        prefixes.bind("", &base_namespace(base_iri));
        prefixes.extend(&PrefixMap::with_standard());
        Self {
            triples: BTreeSet::new(),
            prefixes,
        }
    }

    /// Parse a whole ontology document, such as one written by [`Self::to_turtle`].
    /// Blank-node labels it already scoped are kept.
    pub fn parse(text: &str, base_iri: Option<&str>) -> Result<Self, TurtleError> {
        Ok(Self::from(parse_turtle(text, base_iri, BlankNodes::KeepScoped)?))
    }

    /// Parse an untrusted fragment. Every blank node is scoped to this text.
    pub fn parse_fragment(text: &str, base_iri: Option<&str>) -> Result<Self, TurtleError> {
        Ok(Self::from(parse_turtle(text, base_iri, BlankNodes::ScopeAll)?))
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    pub fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    pub fn triples(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    pub fn prefixes(&self) -> &PrefixMap {
        &self.prefixes
    }

    pub fn bind_prefix(&mut self, prefix: &str, namespace: &str) -> bool {
        self.prefixes.bind(prefix, namespace)
    }

    /// Set union. Returns the number of triples that were not already present.
    pub fn union(&mut self, other: OntologyGraph) -> usize {
        self.prefixes.extend(&other.prefixes);
        let before = self.triples.len();
        self.triples.extend(other.triples);
        self.triples.len() - before
    }

    /// Drop every triple, keeping the prefix table.
    pub fn clear(&mut self) {
        self.triples.clear();
    }

    pub fn is_subset_of(&self, other: &OntologyGraph) -> bool {
        self.triples.is_subset(&other.triples)
    }

    /// Subjects typed with `class_iri` (`?s rdf:type <class_iri>`).
    pub fn subjects_of_type<'a>(&'a self, class_iri: &'a str) -> impl Iterator<Item = &'a Node> {
        self.triples
            .iter()
            .filter(move |t| t.is_type_of(class_iri))
            .map(|t| &t.subject)
    }

    pub fn has_type(&self, subject: &Node, class_iri: &str) -> bool {
        self.triples.contains(&Triple::new(
            subject.clone(),
            crate::term::RDF_TYPE_IRI,
            Object::iri(class_iri),
        ))
    }

    pub fn to_turtle(&self) -> String {
        to_turtle(self)
    }
}

impl From<ParsedTurtle> for OntologyGraph {
    fn from(parsed: ParsedTurtle) -> Self {
        Self {
            triples: parsed.triples.into_iter().collect(),
            prefixes: parsed.prefixes,
        }
    }
}

impl FromIterator<Triple> for OntologyGraph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self {
            triples: iter.into_iter().collect(),
            prefixes: PrefixMap::new(),
        }
    }
}

/// `http://x.org/onto` → `http://x.org/onto#`; IRIs already ending in `#` or
/// `/` are used as-is.
pub fn base_namespace(base_iri: &str) -> String {
    if base_iri.ends_with('#') || base_iri.ends_with('/') {
        base_iri.to_string()
    } else {
        format!("{base_iri}#")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::{Literal, RDFS_CLASS_IRI};

    fn t(s: &str, p: &str, o: &str) -> Triple {
        Triple::new(Node::iri(s), p, Object::iri(o))
    }

    #[test]
    fn union_deduplicates_and_counts_new_triples() {
        let mut g: OntologyGraph = [t("a:x", "a:p", "a:y")].into_iter().collect();
        let other: OntologyGraph = [t("a:x", "a:p", "a:y"), t("a:y", "a:p", "a:z")]
            .into_iter()
            .collect();
        assert_eq!(g.union(other.clone()), 1);
        assert_eq!(g.union(other), 0);
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn equality_ignores_prefixes() {
        let mut a: OntologyGraph = [t("a:x", "a:p", "a:y")].into_iter().collect();
        let b = a.clone();
        a.bind_prefix("ex", "http://example.org/");
        assert_eq!(a, b);
    }

    #[test]
    fn with_base_binds_default_namespace() {
        let g = OntologyGraph::with_base("http://example.com/ontology");
        assert_eq!(g.prefixes().namespace(""), Some("http://example.com/ontology#"));
        assert_eq!(g.prefixes().namespace("owl"), Some(crate::term::OWL_NS));
        let g = OntologyGraph::with_base("http://example.com/ontology/");
        assert_eq!(g.prefixes().namespace(""), Some("http://example.com/ontology/"));
    }

    #[test]
    fn finds_typed_subjects() {
        let mut g = OntologyGraph::new();
        g.insert(t("a:Doctor", crate::term::RDF_TYPE_IRI, RDFS_CLASS_IRI));
        g.insert(Triple::new(
            Node::iri("a:Doctor"),
            "a:label",
            Object::Literal(Literal::plain("Doctor")),
        ));
        let classes: Vec<_> = g.subjects_of_type(RDFS_CLASS_IRI).collect();
        assert_eq!(classes, vec![&Node::iri("a:Doctor")]);
        assert!(g.has_type(&Node::iri("a:Doctor"), RDFS_CLASS_IRI));
    }

    #[test]
    fn reloading_a_saved_graph_keeps_blank_nodes() {
        let fragment = OntologyGraph::parse_fragment(
            "_:r <http://e.org/p> _:s .\n_:s <http://e.org/q> \"v\" .",
            None,
        )
        .expect("valid");
        let reloaded = OntologyGraph::parse(&fragment.to_turtle(), None).expect("valid");
        assert_eq!(reloaded, fragment);

        let rescoped = OntologyGraph::parse_fragment(&fragment.to_turtle(), None).expect("valid");
        assert_ne!(rescoped, fragment);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn term() -> impl Strategy<Value = String> {
            prop_oneof![
                3 => "[A-Z][a-z]{1,5}".prop_map(|n| format!("<http://e.org/{n}>")),
                1 => "[a-z]{1,3}".prop_map(|l| format!("_:{l}")),
            ]
        }

        fn fragment() -> impl Strategy<Value = String> {
            prop::collection::vec((term(), "[a-z]{1,4}", term()), 0..8).prop_map(|statements| {
                statements
                    .into_iter()
                    .map(|(s, p, o)| format!("{s} <http://e.org/{p}> {o} .\n"))
                    .collect()
            })
        }

        proptest! {
            #[test]
            fn saved_fragments_reload_unchanged(text in fragment()) {
                let graph = OntologyGraph::parse_fragment(&text, None).expect("valid");
                let reloaded = OntologyGraph::parse(&graph.to_turtle(), None).expect("valid");
                prop_assert_eq!(reloaded, graph);
            }

            #[test]
            fn union_is_commutative(a in fragment(), b in fragment()) {
                let ga = OntologyGraph::parse_fragment(&a, None).expect("valid");
                let gb = OntologyGraph::parse_fragment(&b, None).expect("valid");
                let mut ab = ga.clone();
                ab.union(gb.clone());
                let mut ba = gb;
                ba.union(ga);
                prop_assert_eq!(ab, ba);
            }
        }
    }
}
