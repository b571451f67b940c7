//! Integration tests for RDFS Graph
//!
//! Tests graph construction, triple checking, namespaces and JSON persistence.

use rdfs_graph::{iris, Error, Graph, NamespaceMap, RdfTerm, Triple};
use std::io::Write;

const EX: &str = "http://example.org/family#";

fn ex(local: &str) -> String {
    format!("{}{}", EX, local)
}

fn family() -> Graph {
    Graph::from_triples(vec![
        Triple::new(ex("Student"), iris::RDFS_SUBCLASS_OF, ex("Person")),
        Triple::new(ex("hasParent"), iris::RDFS_DOMAIN, ex("Person")),
        Triple::new(ex("anna"), iris::RDF_TYPE, ex("Student")),
        Triple::new(ex("anna"), ex("hasAge"), RdfTerm::integer(21)),
        Triple::new(ex("anna"), ex("nickname"), RdfTerm::lang_string("Anni", "de")),
    ])
    .unwrap()
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_graph_preserves_insertion_order() {
    let graph = family();
    let subjects: Vec<String> = graph.iter().map(|t| t.subject.to_string()).collect();
    assert_eq!(
        subjects,
        vec![ex("Student"), ex("hasParent"), ex("anna"), ex("anna"), ex("anna")]
    );
}

#[test]
fn test_graph_ignores_duplicates() {
    let mut graph = family();
    let again = Triple::new(ex("anna"), iris::RDF_TYPE, ex("Student"));
    assert!(!graph.insert(again).unwrap());
    assert_eq!(graph.len(), 5);
}

#[test]
fn test_graph_remove() {
    let mut graph = family();
    let t = Triple::new(ex("hasParent"), iris::RDFS_DOMAIN, ex("Person"));
    assert!(graph.contains(&t));
    assert!(graph.remove(&t));
    assert!(!graph.contains(&t));
    assert_eq!(graph.len(), 4);
}

#[test]
fn test_with_predicate() {
    let graph = family();
    assert_eq!(graph.with_predicate(iris::RDF_TYPE).count(), 1);
    assert_eq!(graph.with_predicate(&ex("hasAge")).count(), 1);
    assert_eq!(graph.with_predicate(iris::RDFS_RANGE).count(), 0);
}

// ============================================================================
// Position Checks
// ============================================================================

#[test]
fn test_literal_subject_rejected() {
    let result = Graph::from_triples(vec![Triple::new(
        RdfTerm::string("anna"),
        ex("p"),
        ex("o"),
    )]);
    assert!(matches!(result, Err(Error::InvalidTriple(_))));
}

#[test]
fn test_blank_predicate_rejected() {
    let mut graph = Graph::new();
    let result = graph.insert(Triple::new(ex("s"), RdfTerm::blank("b0"), ex("o")));
    assert!(matches!(result, Err(Error::InvalidTriple(_))));
    assert!(graph.is_empty());
}

#[test]
fn test_empty_iri_rejected() {
    let mut graph = Graph::new();
    let result = graph.insert(Triple::new("", ex("p"), ex("o")));
    assert!(matches!(result, Err(Error::InvalidTerm(_))));
}

#[test]
fn test_blank_nodes_allowed_in_subject_and_object() {
    let graph = Graph::from_triples(vec![Triple::new(
        RdfTerm::blank("b0"),
        ex("knows"),
        RdfTerm::blank("b1"),
    )])
    .unwrap();
    assert_eq!(graph.len(), 1);
    assert_eq!(
        graph.iter().next().unwrap().to_string(),
        format!("(_:b0, {}, _:b1)", ex("knows"))
    );
}

// ============================================================================
// Namespaces
// ============================================================================

#[test]
fn test_namespace_expand_and_compact() {
    let mut ns = NamespaceMap::with_defaults();
    ns.add("fam", EX);

    assert_eq!(ns.expand("rdf:type").unwrap(), iris::RDF_TYPE);
    assert_eq!(ns.expand("fam:anna").unwrap(), ex("anna"));
    assert_eq!(ns.compact(&ex("anna")), "fam:anna");
    assert_eq!(ns.compact("urn:isbn:123"), "urn:isbn:123");
}

#[test]
fn test_namespace_unknown_prefix() {
    let ns = NamespaceMap::with_defaults();
    assert!(matches!(ns.expand("foaf:name"), Err(Error::UnknownPrefix(p)) if p == "foaf"));
}

// ============================================================================
// JSON Persistence
// ============================================================================

#[test]
fn test_json_round_trip_keeps_literals() {
    let graph = family();
    let restored = Graph::from_json(&graph.to_json().unwrap()).unwrap();
    assert_eq!(restored, graph);

    let nickname_pred = ex("nickname");
    let nickname = restored
        .with_predicate(&nickname_pred)
        .next()
        .and_then(|t| t.object.as_literal())
        .unwrap();
    assert_eq!(nickname.lang(), Some("de"));
    assert_eq!(nickname.datatype(), iris::RDF_LANG_STRING);
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(family().to_json().unwrap().as_bytes()).unwrap();

    let loaded = Graph::load(file.path()).unwrap();
    assert_eq!(loaded.len(), 5);
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = Graph::load(dir.path().join("missing.json"));
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_load_rejects_malformed_triples() {
    let mut bad = Graph::new();
    bad.insert(Triple::new(ex("s"), ex("p"), ex("o"))).unwrap();
    let json = bad
        .to_json()
        .unwrap()
        .replace(&ex("s"), "")
        .into_bytes();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&json).unwrap();
    assert!(matches!(Graph::load(file.path()), Err(Error::InvalidTerm(_))));
}
