//! RDF terms: the subjects, predicates and objects of a graph.
//!
//! A `RdfTerm` is either an IRI, a blank node or a literal. Blank node labels
//! are only meaningful inside the graph that uses them.

use crate::error::{Error, Result};
use crate::namespace::iris;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A node of an RDF graph.
///
/// # Examples
///
/// ```
/// use rdfs_graph::RdfTerm;
///
/// let alice = RdfTerm::iri("http://example.org/alice");
/// assert!(alice.is_iri());
///
/// let age = RdfTerm::integer(30);
/// assert_eq!(age.as_literal().map(|l| l.lexical()), Some("30"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub enum RdfTerm {
    /// An IRI reference.
    Iri(String),

    /// A blank node, identified by its label within one graph.
    Blank(String),

    /// A literal value.
    Literal(Literal),
}

impl RdfTerm {
    /// Creates an IRI term.
    pub fn iri(iri: impl Into<String>) -> Self {
        Self::Iri(iri.into())
    }

    /// Creates a blank node with the given label.
    pub fn blank(label: impl Into<String>) -> Self {
        Self::Blank(label.into())
    }

    /// Creates a blank node with a fresh, process-unique label.
    ///
    /// # Examples
    ///
    /// ```
    /// use rdfs_graph::RdfTerm;
    ///
    /// let b1 = RdfTerm::fresh_blank();
    /// let b2 = RdfTerm::fresh_blank();
    /// assert!(b1.is_blank());
    /// assert_ne!(b1, b2);
    /// ```
    pub fn fresh_blank() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self::Blank(format!("b{}", COUNTER.fetch_add(1, Ordering::SeqCst)))
    }

    /// Creates a plain `xsd:string` literal.
    pub fn string(value: impl Into<String>) -> Self {
        Self::Literal(Literal::typed(value, iris::XSD_STRING))
    }

    /// Creates an `xsd:integer` literal.
    pub fn integer(value: i64) -> Self {
        Self::Literal(Literal::typed(value.to_string(), iris::XSD_INTEGER))
    }

    /// Creates an `xsd:double` literal.
    pub fn double(value: f64) -> Self {
        Self::Literal(Literal::typed(value.to_string(), iris::XSD_DOUBLE))
    }

    /// Creates an `xsd:boolean` literal.
    pub fn boolean(value: bool) -> Self {
        Self::Literal(Literal::typed(value.to_string(), iris::XSD_BOOLEAN))
    }

    /// Creates a literal with an explicit datatype IRI.
    pub fn typed(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self::Literal(Literal::typed(lexical, datatype))
    }

    /// Creates a language-tagged string literal.
    pub fn lang_string(lexical: impl Into<String>, lang: impl Into<String>) -> Self {
        Self::Literal(Literal::lang_string(lexical, lang))
    }

    /// Returns `true` if this is an IRI.
    pub fn is_iri(&self) -> bool {
        matches!(self, Self::Iri(_))
    }

    /// Returns `true` if this is a blank node.
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Blank(_))
    }

    /// Returns `true` if this is a literal.
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// Returns the IRI if this is an IRI term.
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Self::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// Returns the literal if this is a literal term.
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    /// Returns `true` if this term is the given IRI.
    pub fn is(&self, iri: &str) -> bool {
        self.as_iri() == Some(iri)
    }

    /// Checks the term is well formed.
    pub fn check(&self) -> Result<()> {
        match self {
            Self::Iri(iri) if iri.is_empty() => Err(Error::InvalidTerm("empty IRI".to_string())),
            Self::Blank(label) if label.is_empty() => {
                Err(Error::InvalidTerm("empty blank node label".to_string()))
            }
            Self::Literal(lit) if lit.datatype.is_empty() => Err(Error::InvalidTerm(format!(
                "literal \"{}\" has an empty datatype",
                lit.lexical
            ))),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for RdfTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(iri) => write!(f, "{}", iri),
            Self::Blank(label) => write!(f, "_:{}", label),
            Self::Literal(lit) => write!(f, "{}", lit),
        }
    }
}

impl From<&str> for RdfTerm {
    fn from(iri: &str) -> Self {
        Self::Iri(iri.to_string())
    }
}

impl From<String> for RdfTerm {
    fn from(iri: String) -> Self {
        Self::Iri(iri)
    }
}

impl From<Literal> for RdfTerm {
    fn from(lit: Literal) -> Self {
        Self::Literal(lit)
    }
}

/// An RDF literal: a lexical form with a datatype and an optional language tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Literal {
    lexical: String,
    datatype: String,
    lang: Option<String>,
}

impl Literal {
    /// Creates a literal with an explicit datatype.
    pub fn typed(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: datatype.into(),
            lang: None,
        }
    }

    /// Creates an `rdf:langString` literal.
    pub fn lang_string(lexical: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: iris::RDF_LANG_STRING.to_string(),
            lang: Some(lang.into()),
        }
    }

    /// The lexical form.
    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    /// The datatype IRI.
    pub fn datatype(&self) -> &str {
        &self.datatype
    }

    /// The language tag, if any.
    pub fn lang(&self) -> Option<&str> {
        self.lang.as_deref()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lang {
            Some(lang) => write!(f, "\"{}\"@{}", self.lexical, lang),
            None if self.datatype == iris::XSD_STRING => write!(f, "\"{}\"", self.lexical),
            None => write!(f, "\"{}\"^^<{}>", self.lexical, self.datatype),
        }
    }
}
