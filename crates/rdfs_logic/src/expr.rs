//! Logical expressions accepted as queries.

use crate::molecule::Molecule;
use crate::term::{Term, Variable};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A first-order logical expression over atoms and molecules.
///
/// Only conjunctions and disjunctions of [`LogicalExpression::Atom`] and
/// [`LogicalExpression::AttributeValue`] nodes, optionally under an existential
/// quantifier, can be answered. The other connectives are modelled so that they
/// can be parsed and rejected with a precise diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalExpression {
    /// `predicate(args...)`
    Atom { predicate: String, args: Vec<Term> },
    /// `left[predicate ->> right]`
    AttributeValue(Molecule),
    And(Box<LogicalExpression>, Box<LogicalExpression>),
    Or(Box<LogicalExpression>, Box<LogicalExpression>),
    Not(Box<LogicalExpression>),
    Exists(Vec<Variable>, Box<LogicalExpression>),
    Forall(Vec<Variable>, Box<LogicalExpression>),
    Implies(Box<LogicalExpression>, Box<LogicalExpression>),
    ImpliedBy(Box<LogicalExpression>, Box<LogicalExpression>),
    Equivalent(Box<LogicalExpression>, Box<LogicalExpression>),
    /// `!- body`
    Constraint(Box<LogicalExpression>),
}

impl LogicalExpression {
    /// Creates an atom.
    pub fn atom(predicate: impl Into<String>, args: Vec<Term>) -> Self {
        LogicalExpression::Atom {
            predicate: predicate.into(),
            args,
        }
    }

    /// Creates the molecule expression `left[predicate ->> right]`.
    pub fn molecule(left: Term, predicate: Term, right: Term) -> Self {
        LogicalExpression::AttributeValue(Molecule::new(left, predicate, right))
    }

    /// Conjunction.
    pub fn and(self, other: LogicalExpression) -> Self {
        LogicalExpression::And(Box::new(self), Box::new(other))
    }

    /// Disjunction.
    pub fn or(self, other: LogicalExpression) -> Self {
        LogicalExpression::Or(Box::new(self), Box::new(other))
    }

    /// Existential quantification.
    pub fn exists(vars: Vec<Variable>, body: LogicalExpression) -> Self {
        LogicalExpression::Exists(vars, Box::new(body))
    }

    /// Name of the expression's top-level connective.
    pub fn kind_name(&self) -> &'static str {
        match self {
            LogicalExpression::Atom { .. } => "Atom",
            LogicalExpression::AttributeValue(_) => "AttributeValueMolecule",
            LogicalExpression::And(..) => "Conjunction",
            LogicalExpression::Or(..) => "Disjunction",
            LogicalExpression::Not(_) => "Negation",
            LogicalExpression::Exists(..) => "ExistentialQuantification",
            LogicalExpression::Forall(..) => "UniversalQuantification",
            LogicalExpression::Implies(..) => "Implication",
            LogicalExpression::ImpliedBy(..) => "InverseImplication",
            LogicalExpression::Equivalent(..) => "Equivalence",
            LogicalExpression::Constraint(_) => "Constraint",
        }
    }

    /// The free variables in first-occurrence order.
    ///
    /// Variables bound by `exists` or `forall` are free only where they occur
    /// outside the quantifier's scope.
    pub fn free_variables(&self) -> Vec<Variable> {
        let mut out = Vec::new();
        self.collect_free(&mut Vec::new(), &mut out);
        out
    }

    fn collect_free(&self, bound: &mut Vec<Variable>, out: &mut Vec<Variable>) {
        match self {
            LogicalExpression::Atom { args, .. } => push_free(args.iter(), bound, out),
            LogicalExpression::AttributeValue(m) => push_free(m.terms(), bound, out),
            LogicalExpression::And(a, b)
            | LogicalExpression::Or(a, b)
            | LogicalExpression::Implies(a, b)
            | LogicalExpression::ImpliedBy(a, b)
            | LogicalExpression::Equivalent(a, b) => {
                a.collect_free(bound, out);
                b.collect_free(bound, out);
            }
            LogicalExpression::Not(e) | LogicalExpression::Constraint(e) => {
                e.collect_free(bound, out)
            }
            LogicalExpression::Exists(vars, e) | LogicalExpression::Forall(vars, e) => {
                let depth = bound.len();
                bound.extend(vars.iter().cloned());
                e.collect_free(bound, out);
                bound.truncate(depth);
            }
        }
    }
}

fn push_free<'a>(
    terms: impl IntoIterator<Item = &'a Term>,
    bound: &[Variable],
    out: &mut Vec<Variable>,
) {
    let mut vars = Vec::new();
    terms.into_iter().for_each(|t| t.collect_variables(&mut vars));
    for v in vars {
        if !bound.contains(&v) && !out.contains(&v) {
            out.push(v);
        }
    }
}

impl fmt::Display for LogicalExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vars = |vars: &[Variable]| {
            vars.iter()
                .map(Variable::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        match self {
            LogicalExpression::Atom { predicate, args } => {
                write!(f, "<{}>(", predicate)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            LogicalExpression::AttributeValue(m) => write!(f, "{}", m),
            LogicalExpression::And(a, b) => write!(f, "({} and {})", a, b),
            LogicalExpression::Or(a, b) => write!(f, "({} or {})", a, b),
            LogicalExpression::Not(e) => write!(f, "not {}", e),
            LogicalExpression::Exists(v, e) => write!(f, "exists {} ({})", vars(v), e),
            LogicalExpression::Forall(v, e) => write!(f, "forall {} ({})", vars(v), e),
            LogicalExpression::Implies(a, b) => write!(f, "({} implies {})", a, b),
            LogicalExpression::ImpliedBy(a, b) => write!(f, "({} impliedBy {})", a, b),
            LogicalExpression::Equivalent(a, b) => write!(f, "({} equivalent {})", a, b),
            LogicalExpression::Constraint(e) => write!(f, "!- {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ex(local: &str) -> Term {
        Term::identifier(format!("http://example.org/{}", local))
    }

    #[test]
    fn test_free_variables_order() {
        let expr = LogicalExpression::molecule(Term::variable("x"), ex("p"), Term::variable("y"))
            .and(LogicalExpression::molecule(
                Term::variable("y"),
                ex("q"),
                Term::variable("z"),
            ));
        assert_eq!(
            expr.free_variables(),
            vec![Variable::new("x"), Variable::new("y"), Variable::new("z")]
        );
    }

    #[test]
    fn test_quantified_variables_are_not_free() {
        let body = LogicalExpression::molecule(Term::variable("x"), ex("p"), Term::variable("y"));
        let expr = LogicalExpression::exists(vec![Variable::new("y")], body);
        assert_eq!(expr.free_variables(), vec![Variable::new("x")]);
    }

    #[test]
    fn test_variable_free_outside_scope() {
        let inner = LogicalExpression::exists(
            vec![Variable::new("y")],
            LogicalExpression::molecule(ex("a"), ex("p"), Term::variable("y")),
        );
        let expr = inner.and(LogicalExpression::atom(
            "http://example.org/q",
            vec![Term::variable("y")],
        ));
        assert_eq!(expr.free_variables(), vec![Variable::new("y")]);
    }

    #[test]
    fn test_display() {
        let expr = LogicalExpression::molecule(Term::variable("x"), ex("p"), Term::Int(3));
        assert_eq!(expr.to_string(), "?x[<http://example.org/p> ->> 3]");
        assert_eq!(LogicalExpression::Not(Box::new(expr)).kind_name(), "Negation");
    }
}
