//! Namespace prefix table.
//!
//! Sophia resolves prefixed names while parsing but does not hand the
//! declarations back through the triple source, so declarations are scanned
//! from the source text. The table only drives compact serialization: a
//! missed declaration costs readability, never correctness.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::term::{OWL_NS, RDFS_NS, RDF_NS, XSD_NS};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixMap {
    bindings: BTreeMap<String, String>,
}

impl PrefixMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// `rdf`, `rdfs`, `owl` and `xsd`.
    pub fn with_standard() -> Self {
        let mut map = Self::new();
        map.bind("rdf", RDF_NS);
        map.bind("rdfs", RDFS_NS);
        map.bind("owl", OWL_NS);
        map.bind("xsd", XSD_NS);
        map
    }

    /// Bind `prefix` unless either the prefix or the namespace is already
    /// bound. First binding wins; returns whether the binding was added.
    pub fn bind(&mut self, prefix: &str, namespace: &str) -> bool {
        if self.bindings.contains_key(prefix) || self.prefix_for(namespace).is_some() {
            return false;
        }
        self.bindings
            .insert(prefix.to_string(), namespace.to_string());
        true
    }

    pub fn extend(&mut self, other: &PrefixMap) {
        for (prefix, namespace) in &other.bindings {
            self.bind(prefix, namespace);
        }
    }

    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.bindings.get(prefix).map(String::as_str)
    }

    pub fn prefix_for(&self, namespace: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(_, ns)| ns.as_str() == namespace)
            .map(|(p, _)| p.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(p, ns)| (p.as_str(), ns.as_str()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Compact an IRI to `prefix:local`, picking the longest matching
    /// namespace whose remainder is a safe local name.
    pub fn compact(&self, iri: &str) -> Option<(&str, String)> {
        self.bindings
            .iter()
            .filter(|(_, ns)| !ns.is_empty() && iri.starts_with(ns.as_str()))
            .filter(|(_, ns)| is_safe_local_name(&iri[ns.len()..]))
            .max_by_key(|(_, ns)| ns.len())
            .map(|(p, ns)| (p.as_str(), iri[ns.len()..].to_string()))
    }
}

/// Conservative subset of Turtle's PN_LOCAL: ASCII alphanumerics, `_`, `-`
/// and inner `.`. Anything else is written as a full `<IRI>`.
pub fn is_safe_local_name(local: &str) -> bool {
    if local.is_empty() {
        return true;
    }
    let first = local.chars().next().unwrap_or('-');
    if !(first.is_ascii_alphanumeric() || first == '_') || local.ends_with('.') {
        return false;
    }
    local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
}

fn prefix_decl_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?mi)^\s*(?:@prefix|prefix)\s+([A-Za-z][A-Za-z0-9_.-]*)?:\s*<([^<>\s]*)>")
            .expect("prefix declaration regex")
    })
}

/// Collect `@prefix p: <ns> .` and SPARQL-style `PREFIX p: <ns>` declarations.
/// Relative namespaces (no scheme) are ignored.
pub fn scan_prefix_declarations(text: &str) -> PrefixMap {
    let mut map = PrefixMap::new();
    for caps in prefix_decl_regex().captures_iter(text) {
        let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let namespace = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        if namespace.contains(':') {
            map.bind(prefix, namespace);
        }
    }
    map
}
