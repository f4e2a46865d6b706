//! Prompt builders for the four call kinds.
//!
//! Every Turtle-producing prompt ends with the same output contract: bare
//! Turtle, no prose, no code fences. Models still break it sometimes, so the
//! parser strips a wrapping fence anyway.

const OUTPUT_CONTRACT: &str = "\
Reply with the Turtle document only. No explanations, no comments outside the \
Turtle, and no Markdown code fences.";

const STYLE_EXAMPLE: &str = r#"@prefix ex: <http://example.org/clinic#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

ex:Patient a owl:Class ;
    rdfs:label "Patient" .
ex:Physician a owl:Class ;
    rdfs:label "Physician" .
ex:treatedBy a owl:ObjectProperty ;
    rdfs:domain ex:Patient ;
    rdfs:range ex:Physician .
ex:fullName a owl:DatatypeProperty ;
    rdfs:domain ex:Patient ;
    rdfs:range xsd:string ."#;

const MODELLING_RULES: &str = "\
Guidelines:
- Naming: classes in PascalCase, properties in camelCase. One name per concept; \
do not introduce near-duplicates such as Physician and Physicians. Avoid vague \
names like Entity, Object or Thing.
- Prefixes: declare an @prefix for every namespace you use. Mint new terms in \
the base namespace given below.
- Properties: owl:ObjectProperty links two individuals, owl:DatatypeProperty \
links an individual to a literal. Give each a domain and range that makes sense.
- Classes and individuals are distinct: never declare the same term as both.
- Hierarchy: only add rdfs:subClassOf where the text supports it, and never \
state contradictory axioms.
- Readability: add rdfs:label and, where helpful, rdfs:comment.
- Syntax: every statement ends with a period, IRIs contain no spaces, and \
nothing refers to a term you did not declare.
- Scope: model only what the passage actually says.";

/// Ask for an ontology fragment describing one text chunk.
///
/// `current_ontology` is the serialized ontology so far; when present the model
/// is asked to reuse its terms instead of minting parallel ones.
pub fn generation_prompt(chunk: &str, base_uri: &str, current_ontology: Option<&str>) -> String {
    let mut out = String::new();
    out.push_str(
        "You build OWL ontologies. Turn the passage below into an ontology \
         fragment in Turtle syntax that captures its concepts, relationships \
         and attributes.\n\n",
    );
    out.push_str(&format!("Base namespace: <{base_uri}>\n\n"));
    out.push_str("PASSAGE:\n\"\"\"\n");
    out.push_str(chunk);
    out.push_str("\n\"\"\"\n\n");

    if let Some(ontology) = current_ontology.filter(|o| !o.trim().is_empty()) {
        out.push_str(
            "The ontology built so far is shown next. Reuse its classes and \
             properties wherever they fit and only add what is new.\n\nEXISTING ONTOLOGY:\n",
        );
        out.push_str(ontology);
        out.push_str("\n\n");
    }

    out.push_str(MODELLING_RULES);
    out.push_str("\n\nA fragment in the expected style:\n");
    out.push_str(STYLE_EXAMPLE);
    out.push_str("\n\n");
    out.push_str(OUTPUT_CONTRACT);
    out.push('\n');
    out
}

/// Ask the model to make a fragment parse without changing what it says.
pub fn repair_prompt(broken_turtle: &str, parse_error: &str) -> String {
    format!(
        "The Turtle fragment below does not parse.\n\
         Parser error: {parse_error}\n\n\
         Correct the syntax so that it is valid Turtle. Keep every statement \
         as it is apart from the syntax fixes: do not add, drop or reinterpret \
         triples, and declare any prefix that is used but missing.\n\n\
         {OUTPUT_CONTRACT}\n\n\
         FRAGMENT:\n{broken_turtle}\n"
    )
}

/// Ask the model to clean up the whole ontology. The reply replaces the graph.
pub fn validation_prompt(ontology: &str) -> String {
    format!(
        "Review the OWL ontology below (Turtle) and return a cleaned-up version.\n\n\
         Steps:\n\
         1. Correct any Turtle syntax problems.\n\
         2. Collapse classes or properties that name the same thing under \
         different spellings into one term.\n\
         3. Apply PascalCase to classes and camelCase to properties.\n\
         4. Drop references to terms that are never declared.\n\
         5. Check that every object property has a sensible domain and range.\n\
         6. Do not invent classes or properties that are not already present.\n\n\
         Return the complete ontology, not a diff. {OUTPUT_CONTRACT}\n\n\
         ONTOLOGY:\n{ontology}\n"
    )
}

pub const OCR_SYSTEM_PROMPT: &str = "\
Transcribe every piece of legible text in the image. Return plain text only, \
in reading order, without commentary.";

pub const OCR_USER_PROMPT: &str = "Extract the text from this image.";
