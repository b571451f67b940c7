//! Error types for the RDFS logic layer.

use crate::evaluator::EvaluatorError;
use thiserror::Error;

/// A specialized `Result` type for translation, registration and query operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Defines the errors that can occur while compiling ontologies and answering queries.
///
/// Every variant aborts the operation that raised it: there is no partial
/// registration and no partial query result.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// A term or literal cannot be represented in the target algebra.
    #[error("Translation error: {0}")]
    Translation(String),

    /// The query uses a connective outside conjunctions of atoms and molecules.
    #[error("Query could not be transformed to datalog: {shape} is not supported in {query}")]
    UnsupportedQuery { shape: String, query: String },

    /// Reserved RDFS vocabulary is used in a non-standard position.
    #[error(
        "Extensional RDFS entailment not possible: non-standard use of RDFS vocabulary occured in the following statements: \n{}",
        .0.join("\n")
    )]
    NonStandardVocabulary(Vec<String>),

    /// The Datalog evaluator failed.
    #[error("Evaluator error ({context}): {source}")]
    Evaluator {
        context: String,
        #[source]
        source: EvaluatorError,
    },

    /// A query was addressed to a namespace that holds no registered ontology.
    #[error("No ontology registered under namespace {0}")]
    UnknownNamespace(String),

    /// The textual query could not be parsed.
    #[error("Parse error at {position}: {message}")]
    Parse { position: usize, message: String },

    /// The operation is not offered by this reasoner.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// The reasoner configuration was rejected.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error originating from the input graph model.
    #[error("Graph error: {0}")]
    GraphError(String),

    /// An error occurred during data serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An error from the underlying I/O system.
    #[error("I/O error: {0}")]
    Io(String),
}

impl Error {
    /// Wraps an evaluator failure with the namespace or query it concerned.
    pub fn evaluator(context: impl Into<String>, source: EvaluatorError) -> Self {
        Error::Evaluator {
            context: context.into(),
            source,
        }
    }

    /// The offending statements of a [`Error::NonStandardVocabulary`] error.
    pub fn violations(&self) -> Option<&[String]> {
        match self {
            Error::NonStandardVocabulary(v) => Some(v),
            _ => None,
        }
    }
}

impl From<rdfs_graph::Error> for Error {
    fn from(e: rdfs_graph::Error) -> Self {
        Error::GraphError(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = Error::Translation("Can't convert a term of type anonymous id".to_string());
        assert!(err.to_string().contains("anonymous id"));
    }

    #[test]
    fn test_non_standard_vocabulary_lists_every_statement() {
        let err = Error::NonStandardVocabulary(vec!["(a, b, c)".to_string(), "(d, e, f)".to_string()]);
        let text = err.to_string();
        assert!(text.starts_with("Extensional RDFS entailment not possible"));
        assert!(text.ends_with("(a, b, c)\n(d, e, f)"));
        assert_eq!(err.violations().map(|v| v.len()), Some(2));
    }

    #[test]
    fn test_evaluator_error_keeps_cause() {
        let err = Error::evaluator(
            "namespace http://example.org/",
            EvaluatorError::MaxIterationsExceeded { limit: 3 },
        );
        assert!(err.to_string().contains("http://example.org/"));
        assert!(err.source().is_some());
    }
}
