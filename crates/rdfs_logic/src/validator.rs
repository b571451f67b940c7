//! Detection of non-standard use of the RDFS vocabulary.
//!
//! Extensional RDFS entailment is only sound when the schema vocabulary stays
//! in its standard positions. The validator scans a graph before extensional
//! rules are generated and reports every offending statement at once.

use crate::error::{Error, Result};
use log::warn;
use rdfs_graph::{iris, Graph, RdfTerm, Triple};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a statement was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationKind {
    /// A reserved property is used as the subject of an unrelated statement.
    ReservedSubject,
    /// A reserved property is used as the object of something other than `subPropertyOf`.
    ReservedObject,
    /// `Resource`, `Class`, `Property` or `ContainerMembershipProperty` appears at all.
    ClosedVocabulary,
}

/// A statement that uses the RDFS vocabulary in a non-standard way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// The offending statement.
    pub triple: Triple,
    /// The first rule it broke.
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.triple)
    }
}

/// Checks graphs for reserved-vocabulary misuse.
#[derive(Debug, Clone, Copy, Default)]
pub struct VocabularyValidator;

impl VocabularyValidator {
    /// Creates a validator.
    pub fn new() -> Self {
        Self
    }

    /// Collects every violation in the graph, in graph order. A statement that
    /// breaks several rules is reported once.
    pub fn violations(&self, graph: &Graph) -> Vec<Violation> {
        graph
            .iter()
            .filter_map(|triple| {
                check_statement(triple).map(|kind| Violation {
                    triple: triple.clone(),
                    kind,
                })
            })
            .collect()
    }

    /// Fails with [`Error::NonStandardVocabulary`] listing every offending
    /// statement as `(s, p, o)`.
    pub fn validate(&self, graph: &Graph) -> Result<()> {
        let violations = self.violations(graph);
        if violations.is_empty() {
            return Ok(());
        }
        for v in &violations {
            warn!("Non-standard RDFS vocabulary use ({:?}): {}", v.kind, v);
        }
        Err(Error::NonStandardVocabulary(
            violations.iter().map(ToString::to_string).collect(),
        ))
    }
}

fn is_reserved_property(term: &RdfTerm) -> bool {
    term.as_iri()
        .is_some_and(|iri| iris::RESERVED_PROPERTIES.contains(&iri))
}

fn is_closed_vocabulary(term: &RdfTerm) -> bool {
    term.as_iri()
        .is_some_and(|iri| iris::CLOSED_VOCABULARY.contains(&iri))
}

fn check_statement(triple: &Triple) -> Option<ViolationKind> {
    let p = &triple.predicate;

    if is_reserved_property(&triple.subject) {
        let schema_statement = p.is(iris::RDFS_SUBPROPERTY_OF)
            || p.is(iris::RDFS_DOMAIN)
            || p.is(iris::RDFS_RANGE)
            || (p.is(iris::RDF_TYPE)
                && (triple.object.is(iris::RDF_PROPERTY)
                    || triple.object.is(iris::RDFS_CONTAINER_MEMBERSHIP_PROPERTY)));
        if !schema_statement {
            return Some(ViolationKind::ReservedSubject);
        }
    }

    if is_reserved_property(&triple.object) && !p.is(iris::RDFS_SUBPROPERTY_OF) {
        return Some(ViolationKind::ReservedObject);
    }

    if triple.terms().into_iter().any(is_closed_vocabulary) {
        return Some(ViolationKind::ClosedVocabulary);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "http://test.example.org/test#";

    fn ex(local: &str) -> String {
        format!("{}{}", NS, local)
    }

    fn graph(triples: Vec<Triple>) -> Graph {
        Graph::from_triples(triples).unwrap()
    }

    #[test]
    fn test_standard_schema_passes() {
        let g = graph(vec![
            Triple::new(ex("hasParent"), iris::RDFS_DOMAIN, RdfTerm::iri(ex("Person"))),
            Triple::new(ex("hasParent"), iris::RDFS_RANGE, RdfTerm::iri(ex("Person"))),
            Triple::new(ex("hasMother"), iris::RDFS_SUBPROPERTY_OF, RdfTerm::iri(ex("hasParent"))),
            Triple::new(ex("Person"), iris::RDFS_SUBCLASS_OF, RdfTerm::iri(ex("Animal"))),
        ]);
        assert!(VocabularyValidator::new().validate(&g).is_ok());
    }

    #[test]
    fn test_reserved_property_as_subject() {
        let allowed = graph(vec![
            Triple::new(iris::RDFS_DOMAIN, iris::RDFS_SUBPROPERTY_OF, RdfTerm::iri(ex("p"))),
            Triple::new(iris::RDFS_RANGE, iris::RDFS_DOMAIN, RdfTerm::iri(ex("C"))),
        ]);
        assert!(VocabularyValidator::new().violations(&allowed).is_empty());

        let rejected = graph(vec![Triple::new(
            iris::RDFS_RANGE,
            iris::RDFS_SUBCLASS_OF,
            RdfTerm::iri(ex("testType")),
        )]);
        let found = VocabularyValidator::new().violations(&rejected);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, ViolationKind::ReservedSubject);
    }

    #[test]
    fn test_reserved_property_as_object() {
        let g = graph(vec![
            Triple::new(ex("p"), iris::RDFS_SUBPROPERTY_OF, RdfTerm::iri(iris::RDF_TYPE)),
            Triple::new(ex("p"), ex("q"), RdfTerm::iri(iris::RDFS_DOMAIN)),
        ]);
        let found = VocabularyValidator::new().violations(&g);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, ViolationKind::ReservedObject);
    }

    #[test]
    fn test_closed_vocabulary_in_any_position() {
        let g = graph(vec![
            Triple::new(ex("Animal"), iris::RDF_TYPE, RdfTerm::iri(iris::RDFS_CLASS)),
            Triple::new(iris::RDFS_RESOURCE, ex("p"), RdfTerm::iri(ex("o"))),
            Triple::new(ex("s"), ex("p"), RdfTerm::iri(iris::RDF_PROPERTY)),
        ]);
        let found = VocabularyValidator::new().violations(&g);
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|v| v.kind == ViolationKind::ClosedVocabulary));
    }

    #[test]
    fn test_violation_is_reported_once() {
        // Breaks the subject rule and the closed-vocabulary rule.
        let g = graph(vec![Triple::new(
            iris::RDFS_DOMAIN,
            iris::RDF_TYPE,
            RdfTerm::iri(iris::RDFS_CLASS),
        )]);
        let err = VocabularyValidator::new().validate(&g).unwrap_err();
        assert_eq!(err.violations().map(|v| v.len()), Some(1));
    }

    #[test]
    fn test_literals_never_match_vocabulary() {
        let g = graph(vec![Triple::new(
            ex("s"),
            ex("label"),
            RdfTerm::string(iris::RDFS_CLASS),
        )]);
        assert!(VocabularyValidator::new().validate(&g).is_ok());
    }
}
