//! Turtle → owned triples.
//!
//! Parsing is delegated to Sophia's Turtle parser; terms are converted from
//! their N-Triples display form into the owned model in [`crate::term`].
//!
//! Blank-node labels are scoped per parsed text: a label `x` becomes
//! `b<digest>_x`, where `<digest>` is the FNV-1a digest of the text. Two
//! fragments that both say `_:x` therefore never collide, and parsing the same
//! text twice yields the same labels (so re-merging is idempotent).
//!
//! Documents we wrote ourselves already carry scoped labels; parsing them with
//! [`BlankNodes::KeepScoped`] leaves those labels alone.

use crate::digest::fnv1a64_hex;
use crate::prefixes::{scan_prefix_declarations, PrefixMap};
use crate::term::{unescape_literal, Literal, Node, Object, Triple, RDF_LANG_STRING_IRI};
use crate::TurtleError;

/// Result of parsing one Turtle document.
#[derive(Debug, Clone, Default)]
pub struct ParsedTurtle {
    pub triples: Vec<Triple>,
    pub prefixes: PrefixMap,
}

/// How blank-node labels are scoped while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankNodes {
    /// Every label gets this text's scope. Use for untrusted fragments.
    ScopeAll,
    /// Labels that already look scoped (`b<16 hex>_...`) are kept. Use for
    /// saved ontologies and whole-graph rewrites of one.
    KeepScoped,
}

/// Parse a Turtle document.
///
/// When `base_iri` is given, relative IRIs resolve against it (a document's
/// own `@base` still takes precedence from the point it is declared).
pub fn parse_turtle(
    text: &str,
    base_iri: Option<&str>,
    blank_nodes: BlankNodes,
) -> Result<ParsedTurtle, TurtleError> {
    if let Some(base) = base_iri {
        validate_base_iri(base)?;
    }

    let scope = BlankScope {
        digest: fnv1a64_hex(text.as_bytes()),
        mode: blank_nodes,
    };
    let statements = sophia_source::collect_statements(text.as_bytes(), base_iri)?;

    let mut triples = Vec::with_capacity(statements.len());
    for (s, p, o) in statements {
        let subject = parse_node(&s, &scope)?;
        let Node::Iri(predicate) = parse_node(&p, &scope)? else {
            return Err(TurtleError::Term {
                term: p,
                reason: "predicate must be an IRI".to_string(),
            });
        };
        let object = parse_object(&o, &scope)?;
        triples.push(Triple {
            subject,
            predicate,
            object,
        });
    }

    Ok(ParsedTurtle {
        triples,
        prefixes: scan_prefix_declarations(text),
    })
}

pub fn validate_base_iri(base: &str) -> Result<(), TurtleError> {
    let has_scheme = base
        .split_once(':')
        .map(|(scheme, _)| {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        })
        .unwrap_or(false);
    let has_forbidden = base
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\'));
    if has_scheme && !has_forbidden {
        Ok(())
    } else {
        Err(TurtleError::InvalidBase(base.to_string()))
    }
}

/// Remove a Markdown code fence wrapping the whole response
/// (```` ```turtle ... ``` ````). Text without a leading fence is returned
/// trimmed but otherwise unchanged.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(after_open) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`turtle`, `ttl`, ...) on the opening line.
    let body = match after_open.find('\n') {
        Some(idx) => &after_open[idx + 1..],
        None => "",
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

struct BlankScope {
    digest: String,
    mode: BlankNodes,
}

fn scoped_blank_label(label: &str, scope: &BlankScope) -> String {
    if scope.mode == BlankNodes::KeepScoped && is_scoped_label(label) {
        return label.to_string();
    }
    let mut out = format!("b{}_", scope.digest);
    for c in label.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            out.push(c);
        } else {
            out.push('_');
        }
    }
    out
}

/// `b<16 hex>_...`, the shape [`scoped_blank_label`] produces.
fn is_scoped_label(label: &str) -> bool {
    let bytes = label.as_bytes();
    bytes.len() > 18
        && bytes[0] == b'b'
        && bytes[1..17].iter().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        && bytes[17] == b'_'
}

fn parse_node(term: &str, scope: &BlankScope) -> Result<Node, TurtleError> {
    match parse_object(term, scope)? {
        Object::Node(node) => Ok(node),
        Object::Literal(_) => Err(TurtleError::Term {
            term: term.to_string(),
            reason: "expected IRI or blank node, got literal".to_string(),
        }),
    }
}

fn parse_object(term: &str, scope: &BlankScope) -> Result<Object, TurtleError> {
    let s = term.trim();

    if let Some(iri) = s.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
        return Ok(Object::Node(Node::Iri(iri.to_string())));
    }

    if let Some(label) = s.strip_prefix("_:") {
        return Ok(Object::Node(Node::BlankNode(scoped_blank_label(label, scope))));
    }

    if s.starts_with('"') {
        let mut end_quote = None;
        let mut escaped = false;
        for (i, ch) in s.char_indices().skip(1) {
            if escaped {
                escaped = false;
                continue;
            }
            match ch {
                '\\' => escaped = true,
                '"' => {
                    end_quote = Some(i);
                    break;
                }
                _ => {}
            }
        }
        let Some(end) = end_quote else {
            return Err(TurtleError::Term {
                term: s.to_string(),
                reason: "literal is missing its closing quote".to_string(),
            });
        };

        let lexical = unescape_literal(&s[1..end]);
        let rest = s[end + 1..].trim();

        let literal = if let Some(lang) = rest.strip_prefix('@') {
            Literal::lang(lexical, lang)
        } else if let Some(dt) = rest.strip_prefix("^^") {
            let dt = dt.trim();
            let dt = dt
                .strip_prefix('<')
                .and_then(|t| t.strip_suffix('>'))
                .unwrap_or(dt);
            if dt == RDF_LANG_STRING_IRI {
                Literal::plain(lexical)
            } else {
                Literal::typed(lexical, dt)
            }
        } else {
            Literal::plain(lexical)
        };
        return Ok(Object::Literal(literal));
    }

    Err(TurtleError::Term {
        term: s.to_string(),
        reason: "unsupported term form".to_string(),
    })
}

mod sophia_source {
    //! The only place that talks to Sophia directly.

    use crate::TurtleError;
    use sophia::api::prelude::*;
    use sophia::iri::Iri;
    use sophia::turtle::parser::turtle::TurtleParser;

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    struct SinkError(String);

    /// `(subject, predicate, object)` in N-Triples display form.
    ///
    /// The base goes to the parser directly so error positions match the
    /// caller's text line for line.
    pub(super) fn collect_statements(
        bytes: &[u8],
        base_iri: Option<&str>,
    ) -> Result<Vec<(String, String, String)>, TurtleError> {
        let base = base_iri
            .map(|b| Iri::new(b.to_string()).map_err(|_| TurtleError::InvalidBase(b.to_string())))
            .transpose()?;
        let reader = std::io::BufReader::new(std::io::Cursor::new(bytes));
        let mut out: Vec<(String, String, String)> = Vec::new();
        let mut parser = TurtleParser { base }.parse(reader);
        parser
            .try_for_each_triple(|t| -> std::result::Result<(), SinkError> {
                out.push((t.s().to_string(), t.p().to_string(), t.o().to_string()));
                Ok(())
            })
            .map_err(|e| TurtleError::Syntax(e.to_string()))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::{RDF_TYPE_IRI, XSD_NS};

    const BASE: &str = "http://example.com/ontology";

    #[test]
    fn parses_prefixed_fragment() {
        let text = r#"
@prefix ns1: <http://example.org/ontology#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

ns1:Person a rdfs:Class ;
    rdfs:label "Person"@en .
ns1:age rdfs:range xsd:integer ;
    ns1:example 42 .
"#;
        let parsed = parse_turtle(text, Some(BASE), BlankNodes::ScopeAll).expect("valid turtle");
        assert_eq!(parsed.triples.len(), 4);
        let person = Node::iri("http://example.org/ontology#Person");
        assert!(parsed.triples.contains(&Triple::new(
            person.clone(),
            RDF_TYPE_IRI,
            Object::iri("http://www.w3.org/2000/01/rdf-schema#Class"),
        )));
        assert!(parsed.triples.contains(&Triple::new(
            person,
            "http://www.w3.org/2000/01/rdf-schema#label",
            Object::Literal(Literal::lang("Person", "en")),
        )));
        assert!(parsed.triples.iter().any(|t| matches!(
            &t.object,
            Object::Literal(Literal { lexical, datatype: Some(dt), .. })
                if lexical == "42" && *dt == format!("{XSD_NS}integer")
        )));
        assert_eq!(
            parsed.prefixes.namespace("ns1"),
            Some("http://example.org/ontology#")
        );
    }

    #[test]
    fn resolves_relative_iris_against_base() {
        let parsed = parse_turtle("<#Doctor> a <#Role> .", Some(BASE), BlankNodes::ScopeAll)
            .expect("valid turtle");
        assert_eq!(
            parsed.triples[0].subject,
            Node::iri("http://example.com/ontology#Doctor")
        );
    }

    #[test]
    fn rejects_undeclared_prefix() {
        let err = parse_turtle("ex:a ex:b ex:c .", Some(BASE), BlankNodes::ScopeAll).unwrap_err();
        assert!(matches!(err, TurtleError::Syntax(_)), "{err}");
    }

    #[test]
    fn rejects_missing_final_period() {
        let text = "@prefix ex: <http://example.org/> .\nex:a ex:b ex:c";
        assert!(parse_turtle(text, None, BlankNodes::ScopeAll).is_err());
    }

    #[test]
    fn empty_document_has_no_triples() {
        let parsed =
            parse_turtle("   \n", Some(BASE), BlankNodes::ScopeAll).expect("empty turtle is valid");
        assert!(parsed.triples.is_empty());
    }

    #[test]
    fn blank_nodes_are_scoped_per_text() {
        let parse = |text: &str| parse_turtle(text, None, BlankNodes::ScopeAll).expect("valid");
        let a = parse("_:x <http://e.org/p> \"a\" .");
        let b = parse("_:x <http://e.org/p> \"b\" .");
        let again = parse("_:x <http://e.org/p> \"a\" .");
        assert_ne!(a.triples[0].subject, b.triples[0].subject);
        assert_eq!(a.triples[0].subject, again.triples[0].subject);
    }

    fn scope(mode: BlankNodes) -> BlankScope {
        BlankScope {
            digest: "ffffffffffffffff".to_string(),
            mode,
        }
    }

    #[test]
    fn scoped_labels_survive_reparse_of_saved_documents() {
        let label = "b0123456789abcdef_x";
        assert_eq!(scoped_blank_label(label, &scope(BlankNodes::KeepScoped)), label);
        assert_eq!(
            scoped_blank_label("x.y", &scope(BlankNodes::KeepScoped)),
            "bffffffffffffffff_x_y"
        );
    }

    #[test]
    fn fragments_cannot_reuse_another_scope() {
        assert_eq!(
            scoped_blank_label("b0123456789abcdef_x", &scope(BlankNodes::ScopeAll)),
            "bffffffffffffffff_b0123456789abcdef_x"
        );

        let text = "_:b0123456789abcdef_x <http://e.org/p> \"a\" .";
        let fragment = parse_turtle(text, None, BlankNodes::ScopeAll).expect("valid");
        assert_ne!(
            fragment.triples[0].subject,
            Node::BlankNode("b0123456789abcdef_x".to_string())
        );
        let saved = parse_turtle(text, None, BlankNodes::KeepScoped).expect("valid");
        assert_eq!(
            saved.triples[0].subject,
            Node::BlankNode("b0123456789abcdef_x".to_string())
        );
    }

    #[test]
    fn syntax_errors_report_positions_in_the_callers_text() {
        let text = "@prefix ex: <http://example.org/> .\nex:a ex:b ex:c .\nex:d ex:e\n";
        let with_base = parse_turtle(text, Some(BASE), BlankNodes::ScopeAll).unwrap_err();
        let without_base = parse_turtle(text, None, BlankNodes::ScopeAll).unwrap_err();
        assert_eq!(with_base, without_base);
    }

    #[test]
    fn strips_markdown_fences() {
        assert_eq!(
            strip_code_fence("```turtle\n<a:b> <a:c> <a:d> .\n```\n"),
            "<a:b> <a:c> <a:d> ."
        );
        assert_eq!(strip_code_fence("```\nx\n```"), "x");
        assert_eq!(strip_code_fence("  plain  "), "plain");
    }

    #[test]
    fn validates_base_iri() {
        assert!(validate_base_iri(BASE).is_ok());
        assert!(validate_base_iri("urn:onto").is_ok());
        assert!(validate_base_iri("not a uri").is_err());
        assert!(validate_base_iri("relative/path").is_err());
    }
}
