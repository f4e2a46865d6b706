//! RDF term model.
//!
//! Small, owned, totally-ordered terms so a graph can be a plain
//! `BTreeSet<Triple>` with deterministic iteration (and therefore
//! deterministic Turtle output).

use std::fmt;

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const OWL_NS: &str = "http://www.w3.org/2002/07/owl#";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";

pub const RDF_TYPE_IRI: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDF_LANG_STRING_IRI: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
pub const RDFS_CLASS_IRI: &str = "http://www.w3.org/2000/01/rdf-schema#Class";
pub const OWL_CLASS_IRI: &str = "http://www.w3.org/2002/07/owl#Class";
pub const OWL_OBJECT_PROPERTY_IRI: &str = "http://www.w3.org/2002/07/owl#ObjectProperty";
pub const OWL_DATATYPE_PROPERTY_IRI: &str = "http://www.w3.org/2002/07/owl#DatatypeProperty";
pub const XSD_STRING_IRI: &str = "http://www.w3.org/2001/XMLSchema#string";

/// Subject position: an IRI or a blank node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Node {
    Iri(String),
    BlankNode(String),
}

impl Node {
    pub fn iri(iri: impl Into<String>) -> Self {
        Self::Iri(iri.into())
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Self::Iri(iri) => Some(iri),
            Self::BlankNode(_) => None,
        }
    }
}

/// A literal value. Plain literals carry no datatype: `"x"` and
/// `"x"^^xsd:string` are normalized to the same term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    pub lexical: String,
    pub datatype: Option<String>,
    pub language: Option<String>,
}

impl Literal {
    pub fn plain(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn typed(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        let datatype = datatype.into();
        Self {
            lexical: lexical.into(),
            datatype: (datatype != XSD_STRING_IRI).then_some(datatype),
            language: None,
        }
    }

    pub fn lang(lexical: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: Some(language.into().to_ascii_lowercase()),
        }
    }
}

/// Object position: a node or a literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Object {
    Node(Node),
    Literal(Literal),
}

impl Object {
    pub fn iri(iri: impl Into<String>) -> Self {
        Self::Node(Node::Iri(iri.into()))
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Self::Node(node) => node.as_iri(),
            Self::Literal(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triple {
    pub subject: Node,
    pub predicate: String,
    pub object: Object,
}

impl Triple {
    pub fn new(subject: Node, predicate: impl Into<String>, object: Object) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
        }
    }

    pub fn is_type_of(&self, class_iri: &str) -> bool {
        self.predicate == RDF_TYPE_IRI
            && matches!(&self.object, Object::Node(Node::Iri(iri)) if iri == class_iri)
    }
}

/// N-Triples-style display, handy in logs and test failures.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(iri) => write!(f, "<{iri}>"),
            Self::BlankNode(label) => write!(f, "_:{label}"),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", escape_literal(&self.lexical))?;
        if let Some(lang) = &self.language {
            write!(f, "@{lang}")
        } else if let Some(dt) = &self.datatype {
            write!(f, "^^<{dt}>")
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(node) => node.fmt(f),
            Self::Literal(lit) => lit.fmt(f),
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {} .", self.subject, self.predicate, self.object)
    }
}

/// Escape a literal's lexical form for a single-line `"..."` string.
pub fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

pub fn unescape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some('u') => push_unicode_escape(&mut out, &mut chars, 4),
            Some('U') => push_unicode_escape(&mut out, &mut chars, 8),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn push_unicode_escape(out: &mut String, chars: &mut std::str::Chars<'_>, width: usize) {
    let hex: String = chars.by_ref().take(width).collect();
    match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
        Some(c) if hex.len() == width => out.push(c),
        _ => {
            out.push_str(if width == 4 { "\\u" } else { "\\U" });
            out.push_str(&hex);
        }
    }
}

/// Last path/fragment segment of an IRI (`http://x.org/a#B` → `B`).
pub fn local_name(iri: &str) -> &str {
    iri.rsplit(['#', '/']).next().filter(|s| !s.is_empty()).unwrap_or(iri)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xsd_string_literals_normalize_to_plain() {
        assert_eq!(Literal::typed("a", XSD_STRING_IRI), Literal::plain("a"));
        assert_ne!(
            Literal::typed("1", format!("{XSD_NS}integer")),
            Literal::plain("1")
        );
    }

    #[test]
    fn escape_roundtrips_control_characters() {
        let raw = "line one\n\"quoted\"\tend\\";
        assert_eq!(unescape_literal(&escape_literal(raw)), raw);
    }

    #[test]
    fn unescape_handles_unicode_escapes() {
        assert_eq!(unescape_literal("caf\\u00e9"), "café");
        assert_eq!(unescape_literal("bad \\u12"), "bad \\u12");
    }

    #[test]
    fn local_name_takes_last_segment() {
        assert_eq!(local_name("http://example.org/onto#Doctor"), "Doctor");
        assert_eq!(local_name("http://example.org/onto/Doctor"), "Doctor");
        assert_eq!(local_name("urn:x"), "urn:x");
    }
}
