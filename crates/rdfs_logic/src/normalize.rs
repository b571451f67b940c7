//! Lloyd–Topor style splitting of query bodies.
//!
//! A query body is rewritten into disjunctive normal form and split into one
//! conjunction per disjunct. Existential quantifiers are dropped after their
//! variables are renamed apart, so a quantified `?y` never joins with a `?y`
//! outside its scope. Every other connective is rejected.

use crate::error::{Error, Result};
use crate::expr::LogicalExpression;
use crate::molecule::Molecule;
use crate::term::{Term, Variable};
use std::collections::HashMap;

/// A conjunction of atoms and molecules, in source order.
pub type Conjunction = Vec<LogicalExpression>;

type Renaming = HashMap<Variable, Variable>;

/// Splits `expr` into the conjunctions of its disjunctive normal form.
///
/// Variables bound by `exists` are renamed to `name#n`, which the query
/// syntax cannot produce. Returns [`Error::UnsupportedQuery`] naming the first
/// connective that cannot occur in a rule body.
pub fn split(expr: &LogicalExpression) -> Result<Vec<Conjunction>> {
    let mut fresh = 0;
    dnf(expr, expr, &Renaming::new(), &mut fresh)
}

fn dnf(
    node: &LogicalExpression,
    query: &LogicalExpression,
    renaming: &Renaming,
    fresh: &mut usize,
) -> Result<Vec<Conjunction>> {
    match node {
        LogicalExpression::Atom { predicate, args } => Ok(vec![vec![LogicalExpression::atom(
            predicate.as_str(),
            args.iter().map(|t| rename(t, renaming)).collect(),
        )]]),
        LogicalExpression::AttributeValue(m) => {
            let [left, predicate, right] = m.terms().map(|t| rename(t, renaming));
            Ok(vec![vec![LogicalExpression::AttributeValue(Molecule::new(
                left, predicate, right,
            ))]])
        }
        LogicalExpression::And(a, b) => {
            let left = dnf(a, query, renaming, fresh)?;
            let right = dnf(b, query, renaming, fresh)?;
            let mut out = Vec::with_capacity(left.len() * right.len());
            for l in &left {
                for r in &right {
                    let mut conj = l.clone();
                    conj.extend(r.iter().cloned());
                    out.push(conj);
                }
            }
            Ok(out)
        }
        LogicalExpression::Or(a, b) => {
            let mut out = dnf(a, query, renaming, fresh)?;
            out.extend(dnf(b, query, renaming, fresh)?);
            Ok(out)
        }
        LogicalExpression::Exists(vars, body) => {
            let mut scoped = renaming.clone();
            for v in vars {
                *fresh += 1;
                scoped.insert(v.clone(), Variable::new(format!("{}#{}", v.name(), fresh)));
            }
            dnf(body, query, &scoped, fresh)
        }
        other => Err(Error::UnsupportedQuery {
            shape: other.kind_name().to_string(),
            query: query.to_string(),
        }),
    }
}

fn rename(term: &Term, renaming: &Renaming) -> Term {
    match term {
        Term::Variable(v) => match renaming.get(v) {
            Some(fresh) => Term::Variable(fresh.clone()),
            None => term.clone(),
        },
        Term::Function { symbol, args } => Term::function(
            symbol.as_str(),
            args.iter().map(|a| rename(a, renaming)).collect(),
        ),
        _ => term.clone(),
    }
}
