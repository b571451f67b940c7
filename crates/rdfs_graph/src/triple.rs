//! Triples and graphs.
//!
//! A [`Graph`] is an insertion-ordered set of [`Triple`]s. Order carries no
//! meaning for reasoning but keeps rule generation and diagnostics stable.

use crate::error::{Error, Result};
use crate::term::RdfTerm;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A `(subject, predicate, object)` statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Triple {
    /// The subject: an IRI or blank node.
    pub subject: RdfTerm,
    /// The predicate: always an IRI.
    pub predicate: RdfTerm,
    /// The object: any term.
    pub object: RdfTerm,
}

impl Triple {
    /// Creates a new triple. Position rules are checked by [`Triple::check`].
    ///
    /// # Examples
    ///
    /// ```
    /// use rdfs_graph::{RdfTerm, Triple};
    ///
    /// let t = Triple::new(
    ///     "http://example.org/anna",
    ///     "http://example.org/hasParent",
    ///     RdfTerm::iri("http://example.org/john"),
    /// );
    /// assert_eq!(
    ///     t.to_string(),
    ///     "(http://example.org/anna, http://example.org/hasParent, http://example.org/john)"
    /// );
    /// ```
    pub fn new(
        subject: impl Into<RdfTerm>,
        predicate: impl Into<RdfTerm>,
        object: impl Into<RdfTerm>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Checks that every term is well formed and sits in a legal position.
    pub fn check(&self) -> Result<()> {
        self.subject.check()?;
        self.predicate.check()?;
        self.object.check()?;
        if self.subject.is_literal() {
            return Err(Error::InvalidTriple(format!(
                "literal {} in subject position",
                self.subject
            )));
        }
        if !self.predicate.is_iri() {
            return Err(Error::InvalidTriple(format!(
                "predicate {} is not an IRI",
                self.predicate
            )));
        }
        Ok(())
    }

    /// Returns every term of the triple, subject first.
    pub fn terms(&self) -> [&RdfTerm; 3] {
        [&self.subject, &self.predicate, &self.object]
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.subject, self.predicate, self.object)
    }
}

/// A duplicate-free, insertion-ordered collection of triples.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    triples: IndexSet<Triple>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from triples, rejecting the first malformed one.
    pub fn from_triples(triples: impl IntoIterator<Item = Triple>) -> Result<Self> {
        let mut graph = Self::new();
        for triple in triples {
            graph.insert(triple)?;
        }
        Ok(graph)
    }

    /// Inserts a triple. Returns `false` if it was already present.
    pub fn insert(&mut self, triple: Triple) -> Result<bool> {
        triple.check()?;
        Ok(self.triples.insert(triple))
    }

    /// Removes a triple. Returns `true` if it was present.
    pub fn remove(&mut self, triple: &Triple) -> bool {
        self.triples.shift_remove(triple)
    }

    /// Returns `true` if the graph holds the triple.
    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Number of triples.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Returns `true` if the graph holds no triples.
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Iterates the triples in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// All triples using the given predicate IRI.
    pub fn with_predicate<'a>(&'a self, predicate: &'a str) -> impl Iterator<Item = &'a Triple> {
        self.triples.iter().filter(move |t| t.predicate.is(predicate))
    }

    /// Serializes the graph to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserializes a graph from JSON, re-checking every triple.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: Graph = serde_json::from_str(json)?;
        Self::from_triples(raw.triples)
    }

    /// Reads a JSON-encoded graph from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = indexmap::set::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}
