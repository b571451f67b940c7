//! Error types for RDFS Graph.
//!
//! This module provides a unified `Error` type for building and loading RDF graphs.

use thiserror::Error;

/// A specialized `Result` type for graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Defines the errors that can occur while building an RDF graph.
#[derive(Error, Debug)]
pub enum Error {
    /// A term was malformed (e.g. an empty IRI or blank node label).
    #[error("invalid term: {0}")]
    InvalidTerm(String),

    /// A triple put a term in a position RDF does not allow.
    #[error("invalid triple: {0}")]
    InvalidTriple(String),

    /// A prefixed name used a prefix that was never declared.
    #[error("unknown prefix: {0}")]
    UnknownPrefix(String),

    /// An error occurred while reading or writing a JSON-encoded graph.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An error from the underlying I/O system.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidTriple("literal in subject position".to_string());
        assert!(err.to_string().contains("invalid triple"));
        assert!(err.to_string().contains("subject"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
