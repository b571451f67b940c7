//! The Datalog evaluator boundary.
//!
//! Compiled knowledge bases are handed to an [`Evaluator`] as ground facts and
//! range-restricted rules over [`EvalAtom`]s. The facade never inspects an
//! evaluator's internals; it only adds facts and rules, asks for a fixpoint
//! and reads back the tuples matching a query atom.
//!
//! [`MemoryEvaluator`] is the bundled implementation. Other engines can be
//! plugged in through [`crate::ReasonerFactory::create_with_evaluator`].

mod builtin;
mod memory;

pub use builtin::Builtin;
pub use memory::MemoryEvaluator;
pub(crate) use memory::{substitute, unify_all, Substitution};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Errors raised by an evaluator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluatorError {
    /// The fixpoint was not reached within the configured number of rounds.
    #[error("Fixpoint not reached after {limit} iterations")]
    MaxIterationsExceeded { limit: usize },

    /// A rule head variable is not bound by the body, or a fact is not ground.
    #[error("Unsafe rule: {0}")]
    UnsafeRule(String),

    /// Negated body literals cannot be evaluated.
    #[error("Negation is not supported: {0}")]
    NegationUnsupported(String),

    /// A builtin was applied to values it cannot handle.
    #[error("Builtin {builtin} failed: {message}")]
    Builtin { builtin: String, message: String },

    /// A builtin was called with the wrong number of arguments.
    #[error("{symbol} expects {expected} arguments, got {actual}")]
    ArityMismatch {
        symbol: String,
        expected: usize,
        actual: usize,
    },
}

/// A term in the evaluator's term space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EvalTerm {
    Iri(String),
    Str(String),
    Int(i64),
    Double(f64),
    Bool(bool),
    Var(String),
    /// A constructed term `functor(args...)`.
    Construct { functor: String, args: Vec<EvalTerm> },
}

impl EvalTerm {
    /// Returns `true` if no variable occurs in the term.
    pub fn is_ground(&self) -> bool {
        match self {
            EvalTerm::Var(_) => false,
            EvalTerm::Construct { args, .. } => args.iter().all(EvalTerm::is_ground),
            _ => true,
        }
    }

    /// Appends the term's variable names to `out`, skipping ones already present.
    pub fn collect_variables(&self, out: &mut Vec<String>) {
        match self {
            EvalTerm::Var(v) => {
                if !out.contains(v) {
                    out.push(v.clone());
                }
            }
            EvalTerm::Construct { args, .. } => args.iter().for_each(|a| a.collect_variables(out)),
            _ => {}
        }
    }

    /// The term as a number, if it is one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            EvalTerm::Int(i) => Some(*i as f64),
            EvalTerm::Double(d) => Some(*d),
            _ => None,
        }
    }
}

impl PartialEq for EvalTerm {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (EvalTerm::Iri(a), EvalTerm::Iri(b)) => a == b,
            (EvalTerm::Str(a), EvalTerm::Str(b)) => a == b,
            (EvalTerm::Int(a), EvalTerm::Int(b)) => a == b,
            (EvalTerm::Double(a), EvalTerm::Double(b)) => a.to_bits() == b.to_bits(),
            (EvalTerm::Bool(a), EvalTerm::Bool(b)) => a == b,
            (EvalTerm::Var(a), EvalTerm::Var(b)) => a == b,
            (
                EvalTerm::Construct { functor: f1, args: a1 },
                EvalTerm::Construct { functor: f2, args: a2 },
            ) => f1 == f2 && a1 == a2,
            _ => false,
        }
    }
}

impl Eq for EvalTerm {}

impl Hash for EvalTerm {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            EvalTerm::Iri(s) | EvalTerm::Str(s) | EvalTerm::Var(s) => s.hash(state),
            EvalTerm::Int(i) => i.hash(state),
            EvalTerm::Double(d) => d.to_bits().hash(state),
            EvalTerm::Bool(b) => b.hash(state),
            EvalTerm::Construct { functor, args } => {
                functor.hash(state);
                args.hash(state);
            }
        }
    }
}

impl fmt::Display for EvalTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalTerm::Iri(iri) => write!(f, "<{}>", iri),
            EvalTerm::Str(s) => write!(f, "{:?}", s),
            EvalTerm::Int(i) => write!(f, "{}", i),
            EvalTerm::Double(d) => write!(f, "{:?}", d),
            EvalTerm::Bool(b) => write!(f, "{}", b),
            EvalTerm::Var(v) => write!(f, "?{}", v),
            EvalTerm::Construct { functor, args } => {
                write!(f, "{}(", functor)?;
                write_args(f, args)?;
                write!(f, ")")
            }
        }
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[EvalTerm]) -> fmt::Result {
    for (i, a) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", a)?;
    }
    Ok(())
}

/// A ground or partially ground tuple of a relation.
pub type Tuple = Vec<EvalTerm>;

/// An atom `symbol(terms...)`. The relation is identified by symbol and arity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvalAtom {
    pub symbol: String,
    pub terms: Vec<EvalTerm>,
}

impl EvalAtom {
    /// Creates an atom.
    pub fn new(symbol: impl Into<String>, terms: Vec<EvalTerm>) -> Self {
        Self {
            symbol: symbol.into(),
            terms,
        }
    }

    /// Number of arguments.
    pub fn arity(&self) -> usize {
        self.terms.len()
    }

    /// Returns `true` if every argument is ground.
    pub fn is_ground(&self) -> bool {
        self.terms.iter().all(EvalTerm::is_ground)
    }

    /// Appends the atom's variable names to `out` in first-occurrence order.
    pub fn collect_variables(&self, out: &mut Vec<String>) {
        self.terms.iter().for_each(|t| t.collect_variables(out));
    }
}

impl fmt::Display for EvalAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.symbol)?;
        write_args(f, &self.terms)?;
        write!(f, ")")
    }
}

/// A body literal: a signed relational atom or a builtin call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvalLiteral {
    Atom { positive: bool, atom: EvalAtom },
    Builtin { builtin: Builtin, terms: Vec<EvalTerm> },
}

impl EvalLiteral {
    /// A positive relational literal.
    pub fn positive(atom: EvalAtom) -> Self {
        EvalLiteral::Atom {
            positive: true,
            atom,
        }
    }

    /// Appends the literal's variable names to `out` in first-occurrence order.
    pub fn collect_variables(&self, out: &mut Vec<String>) {
        match self {
            EvalLiteral::Atom { atom, .. } => atom.collect_variables(out),
            EvalLiteral::Builtin { terms, .. } => {
                terms.iter().for_each(|t| t.collect_variables(out))
            }
        }
    }
}

impl fmt::Display for EvalLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalLiteral::Atom { positive, atom } => {
                if !positive {
                    write!(f, "not ")?;
                }
                write!(f, "{}", atom)
            }
            EvalLiteral::Builtin { builtin, terms } => {
                write!(f, "{}(", builtin.name())?;
                write_args(f, terms)?;
                write!(f, ")")
            }
        }
    }
}

/// A rule `head :- body`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvalRule {
    pub head: EvalAtom,
    pub body: Vec<EvalLiteral>,
}

impl EvalRule {
    /// Creates a rule.
    pub fn new(head: EvalAtom, body: Vec<EvalLiteral>) -> Self {
        Self { head, body }
    }
}

impl fmt::Display for EvalRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :- ", self.head)?;
        for (i, l) in self.body.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", l)?;
        }
        write!(f, ".")
    }
}

/// A bottom-up Datalog engine.
pub trait Evaluator: Send + fmt::Debug {
    /// Adds a ground fact.
    fn add_fact(&mut self, fact: EvalAtom) -> Result<(), EvaluatorError>;

    /// Adds a rule. It takes effect after the next [`Evaluator::rebuild`].
    fn add_rule(&mut self, rule: EvalRule) -> Result<(), EvaluatorError>;

    /// Drops every fact, rule and derived tuple.
    fn reset(&mut self);

    /// Rebuilds the executor after rules changed.
    fn rebuild(&mut self) -> Result<(), EvaluatorError>;

    /// Computes the fixpoint of the current facts and rules.
    fn execute(&mut self) -> Result<(), EvaluatorError>;

    /// The distinct tuples of `query`'s relation that match its pattern.
    fn compute_substitution(&self, query: &EvalAtom) -> Result<Vec<Tuple>, EvaluatorError>;

    /// The number of independent derivations of a ground atom in the last
    /// fixpoint: one if it was added as a fact, plus one per rule instance
    /// that derives it without using the atom itself.
    ///
    /// Engines that do not track derivations report one for every stored tuple.
    fn count_derivations(&self, fact: &EvalAtom) -> Result<usize, EvaluatorError> {
        Ok(self.compute_substitution(fact)?.len().min(1))
    }
}

/// Creates fresh evaluator instances, one per program.
pub type EvaluatorFactory = Box<dyn Fn() -> Box<dyn Evaluator> + Send + Sync>;
