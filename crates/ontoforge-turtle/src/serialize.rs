//! Graph → Turtle.
//!
//! Output is deterministic: subjects, predicates and objects are emitted in
//! term order, with `rdf:type` (as `a`) first. Only prefixes that are actually
//! used are declared.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use crate::graph::OntologyGraph;
use crate::prefixes::PrefixMap;
use crate::term::{escape_literal, Literal, Node, Object, RDF_TYPE_IRI};

pub fn to_turtle(graph: &OntologyGraph) -> String {
    let mut writer = TermWriter {
        prefixes: graph.prefixes(),
        used: BTreeSet::new(),
    };

    let mut by_subject: BTreeMap<&Node, BTreeMap<&str, Vec<&Object>>> = BTreeMap::new();
    for triple in graph.triples() {
        by_subject
            .entry(&triple.subject)
            .or_default()
            .entry(triple.predicate.as_str())
            .or_default()
            .push(&triple.object);
    }

    let mut body = String::new();
    for (subject, predicates) in &by_subject {
        let subject_text = writer.node(subject);
        let _ = write!(body, "{subject_text}");

        // rdf:type first, the rest in IRI order.
        let mut ordered: Vec<(&str, &Vec<&Object>)> = Vec::with_capacity(predicates.len());
        if let Some(objects) = predicates.get(RDF_TYPE_IRI) {
            ordered.push((RDF_TYPE_IRI, objects));
        }
        ordered.extend(
            predicates
                .iter()
                .filter(|(p, _)| **p != RDF_TYPE_IRI)
                .map(|(p, o)| (*p, o)),
        );

        for (i, (predicate, objects)) in ordered.iter().enumerate() {
            let predicate_text = if *predicate == RDF_TYPE_IRI {
                "a".to_string()
            } else {
                writer.iri(predicate)
            };
            let objects_text: Vec<String> = objects.iter().map(|o| writer.object(o)).collect();
            let sep = if i == 0 { " " } else { " ;\n    " };
            let _ = write!(body, "{sep}{predicate_text} {}", objects_text.join(", "));
        }
        body.push_str(" .\n\n");
    }

    let mut out = String::new();
    for (prefix, namespace) in graph.prefixes().iter() {
        if writer.used.contains(prefix) {
            let _ = writeln!(out, "@prefix {prefix}: <{namespace}> .");
        }
    }
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(&body);
    out
}

struct TermWriter<'a> {
    prefixes: &'a PrefixMap,
    used: BTreeSet<&'a str>,
}

impl<'a> TermWriter<'a> {
    fn iri(&mut self, iri: &str) -> String {
        match self.prefixes.compact(iri) {
            Some((prefix, local)) => {
                self.used.insert(prefix);
                format!("{prefix}:{local}")
            }
            None => format!("<{iri}>"),
        }
    }

    fn node(&mut self, node: &Node) -> String {
        match node {
            Node::Iri(iri) => self.iri(iri),
            Node::BlankNode(label) => format!("_:{label}"),
        }
    }

    fn literal(&mut self, literal: &Literal) -> String {
        let mut out = format!("\"{}\"", escape_literal(&literal.lexical));
        if let Some(lang) = &literal.language {
            out.push('@');
            out.push_str(lang);
        } else if let Some(datatype) = &literal.datatype {
            out.push_str("^^");
            out.push_str(&self.iri(datatype));
        }
        out
    }

    fn object(&mut self, object: &Object) -> String {
        match object {
            Object::Node(node) => self.node(node),
            Object::Literal(literal) => self.literal(literal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Triple;

    const FRAGMENT: &str = r#"
@prefix ns1: <http://example.org/ontology#> .
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

ns1:Person a rdfs:Class .
ns1:Doctor a rdfs:Class .
ns1:hasDoctor a rdf:Property ;
    rdfs:domain ns1:Person ;
    rdfs:range ns1:Doctor .

ns1:hasName a rdf:Property ;
    rdfs:domain ns1:Person ;
    rdfs:range xsd:string ;
    rdfs:comment "The \"full\" name\nof a person"@en .
"#;

    #[test]
    fn output_reparses_to_the_same_triples() {
        let graph = OntologyGraph::parse(FRAGMENT, None).expect("fragment parses");
        let text = graph.to_turtle();
        let reparsed = OntologyGraph::parse(&text, None).expect("serialized output parses");
        assert_eq!(graph, reparsed);
    }

    #[test]
    fn uses_declared_prefixes_and_type_shorthand() {
        let graph = OntologyGraph::parse(FRAGMENT, None).expect("fragment parses");
        let text = graph.to_turtle();
        assert!(text.contains("@prefix ns1: <http://example.org/ontology#> ."));
        assert!(text.contains("ns1:Doctor a rdfs:Class ."));
        assert!(text.contains("rdfs:range xsd:string"));
    }

    #[test]
    fn omits_unused_prefixes_and_falls_back_to_full_iris() {
        let mut graph = OntologyGraph::with_base("http://example.com/onto");
        graph.insert(Triple::new(
            Node::iri("http://elsewhere.org/thing"),
            "http://example.com/onto#p",
            Object::Literal(Literal::typed("1", "http://www.w3.org/2001/XMLSchema#integer")),
        ));
        let text = graph.to_turtle();
        assert!(text.contains("@prefix : <http://example.com/onto#> ."));
        assert!(text.contains("@prefix xsd:"));
        assert!(!text.contains("@prefix owl:"));
        assert!(text.contains("<http://elsewhere.org/thing> :p \"1\"^^xsd:integer ."));
    }

    #[test]
    fn empty_graph_serializes_to_empty_text() {
        assert_eq!(OntologyGraph::with_base("http://example.com/onto").to_turtle(), "");
    }
}
