//! RDFS Graph - RDF input model for the RDFS Datalog reasoner
//!
//! This crate holds the already-parsed side of reasoning: RDF terms, triples,
//! graphs, and the RDF/RDFS/XSD vocabulary. Parsing concrete RDF syntaxes is
//! left to callers; they hand over a [`Graph`] of [`Triple`]s.
//!
//! # Quick Start
//!
//! ```
//! use rdfs_graph::{iris, Graph, RdfTerm, Triple};
//!
//! let mut graph = Graph::new();
//! graph.insert(Triple::new(
//!     "http://example.org/Person",
//!     iris::RDFS_SUBCLASS_OF,
//!     RdfTerm::iri("http://example.org/Animal"),
//! ))?;
//! graph.insert(Triple::new(
//!     "http://example.org/john",
//!     "http://example.org/hasAge",
//!     RdfTerm::integer(30),
//! ))?;
//!
//! assert_eq!(graph.len(), 2);
//! # Ok::<(), rdfs_graph::Error>(())
//! ```

pub mod error;
pub mod namespace;
pub mod term;
pub mod triple;

// Re-exports
pub use error::{Error, Result};
pub use namespace::{iris, NamespaceMap};
pub use term::{Literal, RdfTerm};
pub use triple::{Graph, Triple};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
