//! Query transformation: logical expressions to conjunctive queries.
//!
//! The transformer splits a query into the conjunctions of its disjunctive
//! normal form and lowers every atom and molecule to an evaluator literal.
//! Molecules are stored under one of five value predicates (see
//! [`ValuePredicate`]). A molecule with a variable value is assigned one from
//! the datatypes its attribute is stored with in the rule set. When the
//! attribute is a variable, or only ever receives derived values, no predicate
//! can be chosen statically and the molecule is expanded into one query per
//! value predicate.

use crate::config::TypeExpansion;
use crate::error::Result;
use crate::expr::LogicalExpression;
use crate::molecule::{Molecule, RuleSet, ValuePredicate};
use crate::normalize;
use crate::term::{Term, Variable};
use indexmap::IndexSet;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Synthetic head predicate of every query rule.
pub const RESULT_PREDICATE: &str = "http://www.wsmo.org/reasoner/wsml_query_result";

/// A signed evaluator literal `predicate(terms...)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryLiteral {
    pub positive: bool,
    pub predicate: String,
    pub terms: Vec<Term>,
}

impl QueryLiteral {
    /// Creates a positive literal.
    pub fn positive(predicate: impl Into<String>, terms: Vec<Term>) -> Self {
        Self {
            positive: true,
            predicate: predicate.into(),
            terms,
        }
    }

    /// Lowers a molecule under the given value predicate.
    pub fn from_molecule(molecule: &Molecule, predicate: ValuePredicate) -> Self {
        Self::positive(
            predicate.symbol(),
            molecule.terms().into_iter().cloned().collect(),
        )
    }

    /// Appends the literal's variables to `out` in first-occurrence order.
    pub fn collect_variables(&self, out: &mut Vec<Variable>) {
        self.terms.iter().for_each(|t| t.collect_variables(out));
    }
}

impl fmt::Display for QueryLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.positive {
            write!(f, "not ")?;
        }
        write!(f, "{}(", self.predicate)?;
        for (i, t) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", t)?;
        }
        write!(f, ")")
    }
}

/// One conjunctive query: a body of literals and the variables it exports.
///
/// This is the rule `wsml_query_result(result_vars) :- literals`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConjunctiveQuery {
    pub literals: Vec<QueryLiteral>,
    pub result_vars: Vec<Variable>,
}

impl ConjunctiveQuery {
    /// Every variable of the body in first-occurrence order.
    pub fn body_variables(&self) -> Vec<Variable> {
        let mut out = Vec::new();
        self.literals.iter().for_each(|l| l.collect_variables(&mut out));
        out
    }
}

impl fmt::Display for ConjunctiveQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", RESULT_PREDICATE)?;
        for (i, v) in self.result_vars.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, ") :- ")?;
        for (i, l) in self.literals.iter().enumerate() {
            if i > 0 {
                write!(f, " and ")?;
            }
            write!(f, "{}", l)?;
        }
        write!(f, ".")
    }
}

/// Transforms logical expressions into conjunctive queries.
///
/// Attribute types are inferred from the rule set compiled for the queried
/// namespace.
#[derive(Debug, Clone, Copy)]
pub struct QueryTransformer<'a> {
    rules: &'a RuleSet,
    expansion: TypeExpansion,
}

impl<'a> QueryTransformer<'a> {
    /// Creates a transformer that infers attribute types from `rules`.
    pub fn new(rules: &'a RuleSet, expansion: TypeExpansion) -> Self {
        Self { rules, expansion }
    }

    /// Transforms `expr` into a duplicate-free list of conjunctive queries.
    ///
    /// All queries share the same result variables: the free variables of
    /// `expr` in first-occurrence order.
    pub fn transform(&self, expr: &LogicalExpression) -> Result<Vec<ConjunctiveQuery>> {
        let result_vars = expr.free_variables();
        let mut queries = IndexSet::new();

        for conjunction in normalize::split(expr)? {
            let mut bodies: Vec<Vec<QueryLiteral>> = vec![Vec::new()];
            for node in &conjunction {
                let options = self.lower(node);
                bodies = bodies
                    .into_iter()
                    .flat_map(|body| {
                        options.iter().map(move |lit| {
                            let mut next = body.clone();
                            next.push(lit.clone());
                            next
                        })
                    })
                    .collect();
            }
            for literals in bodies {
                queries.insert(ConjunctiveQuery {
                    literals,
                    result_vars: result_vars.clone(),
                });
            }
        }

        debug!("Query {} transformed into {} conjunctive queries", expr, queries.len());
        Ok(queries.into_iter().collect())
    }

    /// The alternative literals a body node can be lowered to.
    fn lower(&self, node: &LogicalExpression) -> Vec<QueryLiteral> {
        match node {
            LogicalExpression::Atom { predicate, args } => {
                vec![QueryLiteral::positive(predicate.as_str(), args.clone())]
            }
            LogicalExpression::AttributeValue(m) => self
                .value_predicates(m)
                .into_iter()
                .map(|p| QueryLiteral::from_molecule(m, p))
                .collect(),
            // split() only yields atoms and molecules
            _ => Vec::new(),
        }
    }

    fn value_predicates(&self, m: &Molecule) -> Vec<ValuePredicate> {
        if let Some(ty) = m.right().value_type() {
            return vec![ValuePredicate::Typed(ty)];
        }
        if !m.right().is_variable() {
            return vec![ValuePredicate::Generic];
        }
        if !m.predicate().is_variable() {
            if let Some(ty) = self.rules.datatype_of(m.predicate()) {
                return vec![ValuePredicate::Typed(ty)];
            }
            if self.rules.has_untyped_value(m.predicate()) {
                return vec![ValuePredicate::Generic];
            }
            // only derived values, whose type is known after evaluation
        }
        match self.expansion {
            TypeExpansion::PerType => ValuePredicate::ALL.to_vec(),
            TypeExpansion::GenericOnly => vec![ValuePredicate::Generic],
        }
    }
}
