//! Ontology visualization.
//!
//! Classes (`rdfs:Class`, `owl:Class`) are boxes, other IRIs are boxes too,
//! literals are ellipses and blank nodes are grey ellipses. Edges are labelled
//! with the compact predicate name and coloured by property kind.
//!
//! Output formats:
//! - Self-contained HTML explorer (no external scripts; works offline)
//! - Graphviz DOT
//! - JSON (for custom frontends)

use anyhow::{anyhow, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use ontoforge_turtle::digest::fnv1a64_hex;
use ontoforge_turtle::term::{
    OWL_CLASS_IRI, OWL_DATATYPE_PROPERTY_IRI, RDFS_CLASS_IRI, RDF_TYPE_IRI,
};
use ontoforge_turtle::{local_name, Node, Object, OntologyGraph};

pub const DEFAULT_VIZ_OUTPUT: &str = "output/ontology_visualization.html";

const CLASS_COLOR: &str = "#8ecae6";
const LITERAL_COLOR: &str = "#fefae0";
const BLANK_COLOR: &str = "#e0e0e0";
const OBJECT_EDGE_COLOR: &str = "#219ebc";
const DATATYPE_EDGE_COLOR: &str = "#ffb703";
const BLANK_EDGE_COLOR: &str = "#999999";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VizFormat {
    Dot,
    Html,
    Json,
}

impl VizFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dot" => Ok(Self::Dot),
            "html" | "htm" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            other => Err(anyhow!(
                "unknown viz format `{other}` (expected dot|html|json)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Class,
    Resource,
    Literal,
    Blank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Object,
    Datatype,
    Blank,
}

#[derive(Debug, Clone, Serialize)]
pub struct VizNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct VizEdge {
    pub source: String,
    pub target: String,
    pub label: String,
    pub kind: EdgeKind,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct VizGraph {
    pub nodes: Vec<VizNode>,
    pub edges: Vec<VizEdge>,
    pub triples: usize,
}

impl VizGraph {
    pub fn node(&self, id: &str) -> Option<&VizNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

struct Builder<'g> {
    graph: &'g OntologyGraph,
    nodes: BTreeMap<String, VizNode>,
    edges: Vec<VizEdge>,
}

impl<'g> Builder<'g> {
    fn label(&self, iri: &str) -> String {
        match self.graph.prefixes().compact(iri) {
            Some((prefix, local)) => format!("{prefix}:{local}"),
            None => local_name(iri).to_string(),
        }
    }

    fn add_node(&mut self, id: String, label: String, kind: NodeKind) {
        let color = match kind {
            NodeKind::Class | NodeKind::Resource => CLASS_COLOR,
            NodeKind::Literal => LITERAL_COLOR,
            NodeKind::Blank => BLANK_COLOR,
        };
        self.nodes.entry(id.clone()).or_insert(VizNode {
            id,
            label,
            kind,
            color,
        });
    }

    fn add_subject(&mut self, node: &Node) -> String {
        match node {
            Node::Iri(iri) => {
                self.add_node(iri.clone(), self.label(iri), NodeKind::Resource);
                iri.clone()
            }
            Node::BlankNode(label) => {
                let id = format!("_:{label}");
                self.add_node(id.clone(), id.clone(), NodeKind::Blank);
                id
            }
        }
    }
}

/// Build the node/edge view of `graph`. Output order is deterministic.
pub fn extract_viz_graph(graph: &OntologyGraph) -> VizGraph {
    let mut b = Builder {
        graph,
        nodes: BTreeMap::new(),
        edges: Vec::new(),
    };

    let classes: BTreeSet<&str> = graph
        .subjects_of_type(RDFS_CLASS_IRI)
        .chain(graph.subjects_of_type(OWL_CLASS_IRI))
        .filter_map(Node::as_iri)
        .collect();
    for class in &classes {
        b.add_node(class.to_string(), b.label(class), NodeKind::Class);
    }

    let datatype_properties: BTreeSet<&str> = graph
        .subjects_of_type(OWL_DATATYPE_PROPERTY_IRI)
        .filter_map(Node::as_iri)
        .collect();

    for triple in graph.triples() {
        let is_class_declaration = triple.predicate == RDF_TYPE_IRI
            && matches!(triple.object.as_iri(), Some(RDFS_CLASS_IRI) | Some(OWL_CLASS_IRI));
        if is_class_declaration {
            continue;
        }

        let source = b.add_subject(&triple.subject);
        let label = b.label(&triple.predicate);

        let (target, kind) = match &triple.object {
            Object::Literal(literal) => {
                let id = format!(
                    "lit:{}",
                    fnv1a64_hex(format!("{source}\u{0}{}\u{0}{}", triple.predicate, literal.lexical).as_bytes())
                );
                b.add_node(id.clone(), literal.lexical.clone(), NodeKind::Literal);
                (id, EdgeKind::Datatype)
            }
            Object::Node(Node::Iri(iri)) => {
                b.add_node(iri.clone(), b.label(iri), NodeKind::Resource);
                let kind = if datatype_properties.contains(triple.predicate.as_str()) {
                    EdgeKind::Datatype
                } else {
                    EdgeKind::Object
                };
                (iri.clone(), kind)
            }
            Object::Node(blank @ Node::BlankNode(_)) => (b.add_subject(blank), EdgeKind::Blank),
        };

        let color = match kind {
            EdgeKind::Object => OBJECT_EDGE_COLOR,
            EdgeKind::Datatype => DATATYPE_EDGE_COLOR,
            EdgeKind::Blank => BLANK_EDGE_COLOR,
        };
        b.edges.push(VizEdge {
            source,
            target,
            label,
            kind,
            color,
        });
    }

    VizGraph {
        nodes: b.nodes.into_values().collect(),
        edges: b.edges,
        triples: graph.len(),
    }
}

pub fn render_dot(g: &VizGraph) -> String {
    fn dot_escape(s: &str) -> String {
        s.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
    }

    let ids: BTreeMap<&str, usize> = g
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();

    let mut out = String::new();
    out.push_str("digraph ontology {\n");
    out.push_str("  rankdir=LR;\n");
    out.push_str("  node [fontname=\"Helvetica\", style=filled];\n");
    out.push_str("  edge [fontname=\"Helvetica\"];\n\n");

    for (i, n) in g.nodes.iter().enumerate() {
        let (shape, style) = match n.kind {
            NodeKind::Class => ("box", "filled,rounded,bold"),
            NodeKind::Resource => ("box", "filled,rounded"),
            NodeKind::Literal | NodeKind::Blank => ("ellipse", "filled"),
        };
        out.push_str(&format!(
            "  n{i} [label=\"{}\", shape={shape}, style=\"{style}\", fillcolor=\"{}\"];\n",
            dot_escape(&n.label),
            n.color
        ));
    }
    out.push('\n');
    for e in &g.edges {
        let (Some(s), Some(t)) = (ids.get(e.source.as_str()), ids.get(e.target.as_str())) else {
            continue;
        };
        out.push_str(&format!(
            "  n{s} -> n{t} [label=\"{}\", color=\"{}\", fontcolor=\"{}\"];\n",
            dot_escape(&e.label),
            e.color,
            e.color
        ));
    }
    out.push_str("}\n");
    out
}

pub fn render_json(g: &VizGraph) -> Result<String> {
    Ok(serde_json::to_string_pretty(g)?)
}

pub fn render_html(g: &VizGraph, title: &str) -> Result<String> {
    // `</` is escaped so graph text cannot close the <script> tag.
    let json = serde_json::to_string(g)?.replace("</", "<\\/");

    let template = include_str!("../templates/viz_explorer.html");
    let html = template
        .replace("{{TITLE}}", &html_escape(title))
        .replace("{{NODES_COUNT}}", &g.nodes.len().to_string())
        .replace("{{EDGES_COUNT}}", &g.edges.len().to_string())
        .replace("{{GRAPH_JSON}}", &json);
    Ok(html)
}

pub fn render(g: &VizGraph, format: VizFormat, title: &str) -> Result<String> {
    match format {
        VizFormat::Dot => Ok(render_dot(g)),
        VizFormat::Json => render_json(g),
        VizFormat::Html => render_html(g, title),
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// =============================================================================
// Tests
// =============================================================================
