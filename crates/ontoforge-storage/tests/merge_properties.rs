//! Property tests for the merge algebra: union is commutative and idempotent,
//! and a merge never loses a triple.

use ontoforge_llm::scripted::ScriptedLlm;
use ontoforge_storage::{MergeOutcome, OntologyStore};
use ontoforge_turtle::OntologyGraph;
use proptest::prelude::*;

const BASE: &str = "http://example.com/ontology";

// ============================================================================
// Strategies
// ============================================================================

fn local_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Patient".to_string()),
        Just("Physician".to_string()),
        Just("Clinic".to_string()),
        Just("treats".to_string()),
        Just("worksAt".to_string()),
        "[A-Z][a-z]{1,6}",
    ]
}

fn subject() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => local_name().prop_map(|n| format!("ex:{n}")),
        1 => "[a-z]{1,3}".prop_map(|l| format!("_:{l}")),
    ]
}

fn object() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => local_name().prop_map(|n| format!("ex:{n}")),
        1 => "[a-zA-Z ]{0,12}".prop_map(|s| format!("\"{s}\"")),
        1 => "[a-z]{1,3}".prop_map(|l| format!("_:{l}")),
    ]
}

/// A syntactically valid Turtle fragment of 0..8 statements.
fn fragment() -> impl Strategy<Value = String> {
    prop::collection::vec((subject(), local_name(), object()), 0..8).prop_map(|statements| {
        let mut out = String::from("@prefix ex: <http://example.org/clinic#> .\n");
        for (s, p, o) in statements {
            out.push_str(&format!("{s} ex:{p} {o} .\n"));
        }
        out
    })
}

fn merged(fragments: &[&str]) -> OntologyStore {
    let mut store = OntologyStore::new(BASE).expect("valid base");
    let llm = ScriptedLlm::new();
    for fragment in fragments {
        let outcome = store.merge_fragment(fragment, &llm);
        assert!(matches!(outcome, MergeOutcome::Merged { .. }), "{outcome:?}");
    }
    store
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn merge_is_commutative(a in fragment(), b in fragment()) {
        let ab = merged(&[&a, &b]);
        let ba = merged(&[&b, &a]);
        prop_assert_eq!(ab.graph(), ba.graph());
    }

    #[test]
    fn merge_is_idempotent(a in fragment()) {
        let mut store = merged(&[&a]);
        let once = store.graph().clone();
        let outcome = store.merge_fragment(&a, &ScriptedLlm::new());
        prop_assert_eq!(outcome, MergeOutcome::Merged { added: 0 });
        prop_assert_eq!(store.graph(), &once);
    }

    #[test]
    fn merge_keeps_every_parsed_triple(a in fragment(), b in fragment()) {
        let store = merged(&[&a, &b]);
        for text in [&a, &b] {
            // The store parses trimmed text; blank-node scopes depend on it.
            let parsed = OntologyGraph::parse_fragment(text.trim(), Some(BASE)).expect("fragment parses");
            prop_assert!(parsed.is_subset_of(store.graph()));
        }
    }
}
