//! RDFS Logic - RDF entailment regimes over a Datalog evaluator
//!
//! This crate answers conjunctive queries over RDF graphs under the Simple,
//! RDF, RDFS, extensional RDFS and extended entailment regimes. Graphs are
//! compiled into F-logic rules, queries are normalized into conjunctive
//! Datalog queries, and a pluggable evaluator computes the answers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        RdfsReasoner                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │                 Regime Compiler                       │   │
//! │  │  Validator │ Triple Translator │ Rule Generators     │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                           │                                  │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │                 Query Pipeline                        │   │
//! │  │  Parser │ DNF Split │ Type Expansion                  │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                           │                                  │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │                 Evaluator Facade                      │   │
//! │  │  Lowering │ Memoized Queries │ Binding Extraction     │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                           │                                  │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │                 Datalog Evaluator                     │   │
//! │  │  Naive Fixpoint │ Builtins │ Unification              │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                                                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use rdfs_graph::{iris, Graph, Triple};
//! use rdfs_logic::{EntailmentRegime, Reasoner, ReasonerFactory};
//!
//! let ns = "http://example.org/family#";
//! let graph = Graph::from_triples(vec![
//!     Triple::new(
//!         "http://example.org/family#hasFather",
//!         iris::RDFS_SUBPROPERTY_OF,
//!         "http://example.org/family#hasParent",
//!     ),
//!     Triple::new(
//!         "http://example.org/family#anna",
//!         "http://example.org/family#hasFather",
//!         "http://example.org/family#john",
//!     ),
//! ])?;
//!
//! let mut reasoner = ReasonerFactory::create(EntailmentRegime::Rdfs)?;
//! reasoner.register_ontology(ns, &graph)?;
//!
//! let parents = reasoner.execute_query_str(ns, "anna[hasParent ->> ?p]")?;
//! assert_eq!(parents.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod error;
pub mod evaluator;
pub mod expr;
pub mod facade;
pub mod molecule;
pub mod normalize;
pub mod parser;
pub mod query;
pub mod reasoner;
pub mod regime;
pub mod term;
pub mod translator;
pub mod validator;

// Re-exports
pub use config::{EvaluatorConfig, LiteralTyping, ReasonerConfig, TypeExpansion};
pub use error::{Error, Result};
pub use evaluator::{
    Builtin, EvalAtom, EvalLiteral, EvalRule, EvalTerm, Evaluator, EvaluatorError,
    EvaluatorFactory, MemoryEvaluator, Tuple,
};
pub use expr::LogicalExpression;
pub use facade::{Binding, EvaluatorFacade, FacadeStats};
pub use molecule::{Molecule, Rule, RuleSet, ValuePredicate};
pub use parser::{parse_query, QueryParser};
pub use query::{ConjunctiveQuery, QueryLiteral, QueryTransformer};
pub use reasoner::{RdfsReasoner, Reasoner, ReasonerFactory};
pub use regime::{EntailmentRegime, RegimeCompiler};
pub use term::{Term, ValueType, Variable};
pub use translator::TripleTranslator;
pub use validator::{Violation, ViolationKind, VocabularyValidator};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
