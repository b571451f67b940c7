//! Integration tests for regime compilation
//!
//! Checks which auxiliary rules each entailment regime contributes and how
//! graphs are translated into rule sets.

use rdfs_graph::{iris, Graph, RdfTerm, Triple};
use rdfs_logic::regime::{extensional_rdfs_rules, rdf_rules, rdfs_rules};
use rdfs_logic::{
    EntailmentRegime, Error, LiteralTyping, RegimeCompiler, Rule, RuleSet, Term, ValueType,
};

const NS: &str = "http://www.example.com/";

fn ex(local: &str) -> String {
    format!("{}{}", NS, local)
}

fn graph() -> Graph {
    Graph::from_triples(vec![
        Triple::new(ex("hasParent"), iris::RDFS_DOMAIN, ex("Person")),
        Triple::new(ex("anna"), ex("hasAge"), RdfTerm::integer(21)),
    ])
    .unwrap()
}

fn compile(regime: EntailmentRegime) -> RuleSet {
    RegimeCompiler::new(regime, LiteralTyping::Declared)
        .compile(&graph(), NS)
        .unwrap()
}

#[test]
fn test_rule_counts_grow_with_regime() {
    assert_eq!(compile(EntailmentRegime::Simple).len(), 2);
    assert_eq!(compile(EntailmentRegime::Rdf).len(), 2 + 1);
    assert_eq!(compile(EntailmentRegime::Rdfs).len(), 2 + 1 + 16);
    assert_eq!(compile(EntailmentRegime::ExtensionalRdfs).len(), 2 + 1 + 16 + 4);
    assert_eq!(compile(EntailmentRegime::Extended).len(), 2 + 1 + 16 + 4);
}

#[test]
fn test_regimes_are_monotonic() {
    let compiled: Vec<RuleSet> = EntailmentRegime::ALL.iter().map(|r| compile(*r)).collect();
    for pair in compiled.windows(2) {
        assert!(pair[1].is_superset(&pair[0]));
    }
}

#[test]
fn test_facts_come_first() {
    let rules = compile(EntailmentRegime::Rdfs);
    assert_eq!(rules.facts().count(), 2);
    assert!(rules.iter().take(2).all(Rule::is_fact));
    assert!(rules.iter().skip(2).all(|r| !r.is_fact()));
}

#[test]
fn test_auxiliary_rules_are_in_generator_order() {
    let rules = compile(EntailmentRegime::ExtensionalRdfs);
    let expected: Vec<Rule> = rdf_rules()
        .into_iter()
        .chain(rdfs_rules())
        .chain(extensional_rdfs_rules())
        .collect();
    let actual: Vec<Rule> = rules.implications().cloned().collect();
    assert_eq!(actual, expected);
}

#[test]
fn test_datatype_of_compiled_attribute() {
    let rules = compile(EntailmentRegime::Rdfs);
    assert_eq!(
        rules.datatype_of(&Term::identifier(ex("hasAge"))),
        Some(ValueType::Int)
    );
    assert_eq!(rules.datatype_of(&Term::identifier(iris::RDFS_DOMAIN)), None);
}

#[test]
fn test_lexical_typing_sniffs_literals() {
    let graph = Graph::from_triples(vec![
        Triple::new(ex("anna"), ex("homepage"), RdfTerm::string("http://anna.example.org/")),
        Triple::new(ex("anna"), ex("hasAge"), RdfTerm::string("21")),
        Triple::new(ex("anna"), ex("hasName"), RdfTerm::string("Anna")),
    ])
    .unwrap();
    let rules = RegimeCompiler::new(EntailmentRegime::Simple, LiteralTyping::Lexical)
        .compile(&graph, NS)
        .unwrap();

    let values: Vec<&Term> = rules
        .facts()
        .filter_map(Rule::head)
        .map(|h| h.right())
        .collect();
    assert_eq!(
        values,
        vec![
            &Term::identifier("http://anna.example.org/"),
            &Term::Int(21),
            &Term::string("Anna"),
        ]
    );
}

#[test]
fn test_validation_only_for_extensional_rdfs() {
    let graph = Graph::from_triples(vec![Triple::new(
        ex("hasParent"),
        iris::RDF_TYPE,
        iris::RDF_PROPERTY,
    )])
    .unwrap();

    for regime in EntailmentRegime::ALL {
        let result = RegimeCompiler::new(regime, LiteralTyping::Declared).compile(&graph, NS);
        if regime.requires_validation() {
            assert!(matches!(result, Err(Error::NonStandardVocabulary(ref v)) if v.len() == 1));
        } else {
            assert!(result.is_ok(), "{} rejected the graph", regime);
        }
    }
}

#[test]
fn test_rule_set_serializes() {
    let json = compile(EntailmentRegime::Rdf).to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["name"], NS);
}
