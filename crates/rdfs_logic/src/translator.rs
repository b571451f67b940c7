//! Triple to fact translation with blank-node skolemization.

use crate::config::LiteralTyping;
use crate::error::{Error, Result};
use crate::molecule::{Molecule, Rule};
use crate::term::Term;
use log::trace;
use rdfs_graph::{iris, Literal, RdfTerm, Triple};
use regex::Regex;
use std::collections::HashMap;
use uuid::Uuid;

/// Lexical forms that look like an absolute IRI (`scheme:rest`).
const ABSOLUTE_IRI: &str = r#"^[A-Za-z][A-Za-z0-9+.\-]*:[^\s<>"{}|\\^`]+$"#;

/// Maps blank-node labels to skolem constants.
///
/// The map lives as long as its translator, so every mention of a blank node
/// during one registration resolves to the same constant. Constants are minted
/// from random UUIDs and never collide across translators.
#[derive(Debug, Default)]
pub struct BlankNodeMap {
    skolems: HashMap<String, Term>,
}

impl BlankNodeMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the skolem constant for `label`, minting one under `namespace` on first use.
    pub fn resolve(&mut self, label: &str, namespace: &str) -> Term {
        self.skolems
            .entry(label.to_string())
            .or_insert_with(|| {
                let iri = format!("{}{}", namespace, Uuid::new_v4().simple());
                trace!("Skolemized _:{} as {}", label, iri);
                Term::Skolem(iri)
            })
            .clone()
    }

    /// Number of blank nodes seen.
    pub fn len(&self) -> usize {
        self.skolems.len()
    }

    /// Returns `true` if no blank node was seen yet.
    pub fn is_empty(&self) -> bool {
        self.skolems.is_empty()
    }
}

/// Turns RDF triples into fact rules.
#[derive(Debug)]
pub struct TripleTranslator {
    namespace: String,
    typing: LiteralTyping,
    blank_nodes: BlankNodeMap,
    iri_shape: Option<Regex>,
}

impl TripleTranslator {
    /// Creates a translator minting skolem constants under `namespace`.
    pub fn new(namespace: impl Into<String>, typing: LiteralTyping) -> Result<Self> {
        let iri_shape = match typing {
            LiteralTyping::Lexical => {
                Some(Regex::new(ABSOLUTE_IRI).map_err(|e| Error::Config(e.to_string()))?)
            }
            LiteralTyping::Declared => None,
        };
        Ok(Self {
            namespace: namespace.into(),
            typing,
            blank_nodes: BlankNodeMap::new(),
            iri_shape,
        })
    }

    /// The namespace skolem constants are minted under.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The blank nodes resolved so far.
    pub fn blank_nodes(&self) -> &BlankNodeMap {
        &self.blank_nodes
    }

    /// Translates one triple into the fact `s[p ->> o]`.
    pub fn translate(&mut self, triple: &Triple) -> Rule {
        let left = self.term(&triple.subject);
        let predicate = self.term(&triple.predicate);
        let right = self.term(&triple.object);
        Rule::fact(Molecule::new(left, predicate, right))
    }

    fn term(&mut self, term: &RdfTerm) -> Term {
        match term {
            RdfTerm::Iri(iri) => Term::identifier(iri.as_str()),
            RdfTerm::Blank(label) => self.blank_nodes.resolve(label, &self.namespace),
            RdfTerm::Literal(lit) => match self.typing {
                LiteralTyping::Declared => declared_value(lit),
                LiteralTyping::Lexical => self.lexical_value(lit.lexical()),
            },
        }
    }

    fn lexical_value(&self, lexical: &str) -> Term {
        if self
            .iri_shape
            .as_ref()
            .is_some_and(|shape| shape.is_match(lexical))
        {
            return Term::identifier(lexical);
        }
        match lexical.parse::<i64>() {
            Ok(i) => Term::Int(i),
            Err(_) => Term::string(lexical),
        }
    }
}

/// Maps a literal onto a value term by its XSD datatype. Lexical forms that do
/// not parse under their datatype fall back to strings.
fn declared_value(lit: &Literal) -> Term {
    let lexical = lit.lexical().trim();
    let parsed = match lit.datatype() {
        iris::XSD_INTEGER
        | iris::XSD_INT
        | iris::XSD_LONG
        | iris::XSD_SHORT
        | iris::XSD_NON_NEGATIVE_INTEGER => lexical.parse::<i64>().ok().map(Term::Int),
        iris::XSD_DOUBLE | iris::XSD_FLOAT | iris::XSD_DECIMAL => {
            lexical.parse::<f64>().ok().map(Term::Double)
        }
        iris::XSD_BOOLEAN => match lexical {
            "true" | "1" => Some(Term::Bool(true)),
            "false" | "0" => Some(Term::Bool(false)),
            _ => None,
        },
        _ => None,
    };
    parsed.unwrap_or_else(|| Term::string(lit.lexical()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "http://www.example.com/";

    fn ex(local: &str) -> String {
        format!("{}{}", NS, local)
    }

    fn declared() -> TripleTranslator {
        TripleTranslator::new(NS, LiteralTyping::Declared).unwrap()
    }

    #[test]
    fn test_translate_iri_triple() {
        let mut tr = declared();
        let rule = tr.translate(&Triple::new(ex("anna"), ex("hasParent"), RdfTerm::iri(ex("john"))));
        assert!(rule.is_fact());
        let head = rule.head().unwrap();
        assert_eq!(head.left(), &Term::identifier(ex("anna")));
        assert_eq!(head.predicate(), &Term::identifier(ex("hasParent")));
        assert_eq!(head.right(), &Term::identifier(ex("john")));
    }

    #[test]
    fn test_same_blank_node_same_skolem() {
        let mut tr = declared();
        let t = Triple::new(RdfTerm::blank("b0"), ex("p"), RdfTerm::blank("b0"));
        let first = tr.translate(&t);
        let second = tr.translate(&t);
        assert_eq!(first, second);

        let head = first.head().unwrap();
        assert_eq!(head.left(), head.right());
        assert!(head.left().as_iri().unwrap().starts_with(NS));
        assert_eq!(tr.blank_nodes().len(), 1);
    }

    #[test]
    fn test_blank_nodes_differ_across_translators() {
        let t = Triple::new(RdfTerm::blank("b0"), ex("p"), ex("o"));
        let a = declared().translate(&t);
        let b = declared().translate(&t);
        assert_ne!(a, b);
    }

    #[test]
    fn test_declared_literal_typing() {
        let mut tr = declared();
        let value = |tr: &mut TripleTranslator, o: RdfTerm| {
            tr.translate(&Triple::new(ex("s"), ex("p"), o))
                .head()
                .unwrap()
                .right()
                .clone()
        };

        assert_eq!(value(&mut tr, RdfTerm::integer(30)), Term::Int(30));
        assert_eq!(value(&mut tr, RdfTerm::double(1.5)), Term::Double(1.5));
        assert_eq!(value(&mut tr, RdfTerm::boolean(true)), Term::Bool(true));
        assert_eq!(value(&mut tr, RdfTerm::string("30")), Term::string("30"));
        assert_eq!(
            value(&mut tr, RdfTerm::string("http://example.org/x")),
            Term::string("http://example.org/x")
        );
        assert_eq!(
            value(&mut tr, RdfTerm::typed("thirty", iris::XSD_INTEGER)),
            Term::string("thirty")
        );
        assert_eq!(value(&mut tr, RdfTerm::lang_string("Hund", "de")), Term::string("Hund"));
    }

    #[test]
    fn test_lexical_literal_typing() {
        let mut tr = TripleTranslator::new(NS, LiteralTyping::Lexical).unwrap();
        let value = |tr: &mut TripleTranslator, o: RdfTerm| {
            tr.translate(&Triple::new(ex("s"), ex("p"), o))
                .head()
                .unwrap()
                .right()
                .clone()
        };

        assert_eq!(value(&mut tr, RdfTerm::string("30")), Term::Int(30));
        assert_eq!(value(&mut tr, RdfTerm::string("John")), Term::string("John"));
        assert_eq!(
            value(&mut tr, RdfTerm::string("http://example.org/x")),
            Term::identifier("http://example.org/x")
        );
        assert_eq!(value(&mut tr, RdfTerm::double(2.5)), Term::string("2.5"));
    }
}
