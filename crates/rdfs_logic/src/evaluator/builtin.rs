//! Builtin predicates.
//!
//! Builtins are addressed by IRI in queries and evaluated inline during body
//! matching. Arithmetic builtins follow the `numericAdd(?z, ?x, ?y)` convention:
//! the first argument is the result.

use super::{EvalTerm, EvaluatorError};
use rdfs_graph::namespace::PREFIX_WSML;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A builtin predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Builtin {
    Equal,
    StrongEqual,
    NumericEqual,
    StringEqual,
    Inequal,
    NumericInequal,
    StringInequal,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    NumericAdd,
    NumericSubtract,
    NumericMultiply,
    NumericDivide,
}

/// Outcome of applying a builtin to a partial substitution.
#[derive(Debug, Clone, PartialEq)]
pub enum BuiltinOutcome {
    /// The builtin holds.
    Holds,
    /// The builtin fails.
    Fails,
    /// The builtin holds if the variable takes the value.
    Bind(String, EvalTerm),
}

impl Builtin {
    /// Every builtin.
    pub const ALL: [Builtin; 15] = [
        Builtin::Equal,
        Builtin::StrongEqual,
        Builtin::NumericEqual,
        Builtin::StringEqual,
        Builtin::Inequal,
        Builtin::NumericInequal,
        Builtin::StringInequal,
        Builtin::LessThan,
        Builtin::LessEqual,
        Builtin::GreaterThan,
        Builtin::GreaterEqual,
        Builtin::NumericAdd,
        Builtin::NumericSubtract,
        Builtin::NumericMultiply,
        Builtin::NumericDivide,
    ];

    /// Local name under the WSML syntax namespace.
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Equal => "equal",
            Builtin::StrongEqual => "strongEqual",
            Builtin::NumericEqual => "numericEqual",
            Builtin::StringEqual => "stringEqual",
            Builtin::Inequal => "inequal",
            Builtin::NumericInequal => "numericInequal",
            Builtin::StringInequal => "stringInequal",
            Builtin::LessThan => "lessThan",
            Builtin::LessEqual => "lessEqual",
            Builtin::GreaterThan => "greaterThan",
            Builtin::GreaterEqual => "greaterEqual",
            Builtin::NumericAdd => "numericAdd",
            Builtin::NumericSubtract => "numericSubtract",
            Builtin::NumericMultiply => "numericMultiply",
            Builtin::NumericDivide => "numericDivide",
        }
    }

    /// The full IRI of the builtin.
    pub fn iri(&self) -> String {
        format!("{}{}", PREFIX_WSML, self.name())
    }

    /// Looks a builtin up by IRI.
    pub fn from_iri(iri: &str) -> Option<Self> {
        let local = iri.strip_prefix(PREFIX_WSML)?;
        Self::ALL.into_iter().find(|b| b.name() == local)
    }

    /// Number of arguments.
    pub fn arity(&self) -> usize {
        if self.is_arithmetic() {
            3
        } else {
            2
        }
    }

    /// Returns `true` for the four arithmetic builtins.
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Builtin::NumericAdd
                | Builtin::NumericSubtract
                | Builtin::NumericMultiply
                | Builtin::NumericDivide
        )
    }

    /// Returns `true` if the builtin can bind an unbound argument.
    ///
    /// Equality binds either side; arithmetic binds its result.
    pub fn can_bind(&self) -> bool {
        self.is_arithmetic() || matches!(self, Builtin::Equal | Builtin::StrongEqual)
    }

    /// Whether the builtin can run once `bound` tells which arguments are ground.
    pub fn ready(&self, bound: &[bool]) -> bool {
        if self.is_arithmetic() {
            bound.len() == 3 && bound[1] && bound[2]
        } else if self.can_bind() {
            bound.iter().any(|b| *b)
        } else {
            bound.iter().all(|b| *b)
        }
    }

    /// Checks the argument count.
    pub fn check_arity(&self, actual: usize) -> Result<(), EvaluatorError> {
        if actual == self.arity() {
            Ok(())
        } else {
            Err(EvaluatorError::ArityMismatch {
                symbol: self.iri(),
                expected: self.arity(),
                actual,
            })
        }
    }

    /// Applies the builtin to arguments that are ground or single unbound variables.
    pub fn apply(&self, args: &[EvalTerm]) -> Result<BuiltinOutcome, EvaluatorError> {
        self.check_arity(args.len())?;
        let outcome = |holds: bool| {
            if holds {
                BuiltinOutcome::Holds
            } else {
                BuiltinOutcome::Fails
            }
        };

        match self {
            Builtin::Equal | Builtin::StrongEqual => match (&args[0], &args[1]) {
                (EvalTerm::Var(v), other) | (other, EvalTerm::Var(v)) if other.is_ground() => {
                    Ok(BuiltinOutcome::Bind(v.clone(), other.clone()))
                }
                (a, b) if *self == Builtin::Equal => Ok(outcome(loose_equal(a, b))),
                (a, b) => Ok(outcome(a == b)),
            },
            Builtin::Inequal => Ok(outcome(!loose_equal(&args[0], &args[1]))),
            Builtin::NumericEqual | Builtin::NumericInequal => {
                let (a, b) = self.numbers(&args[0], &args[1])?;
                let equal = a == b;
                Ok(outcome(equal == (*self == Builtin::NumericEqual)))
            }
            Builtin::StringEqual | Builtin::StringInequal => {
                let (a, b) = self.strings(&args[0], &args[1])?;
                let equal = a == b;
                Ok(outcome(equal == (*self == Builtin::StringEqual)))
            }
            Builtin::LessThan | Builtin::LessEqual | Builtin::GreaterThan | Builtin::GreaterEqual => {
                let ordering = self.compare(&args[0], &args[1])?;
                Ok(outcome(match self {
                    Builtin::LessThan => ordering == Ordering::Less,
                    Builtin::LessEqual => ordering != Ordering::Greater,
                    Builtin::GreaterThan => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                }))
            }
            Builtin::NumericAdd
            | Builtin::NumericSubtract
            | Builtin::NumericMultiply
            | Builtin::NumericDivide => {
                let Some(value) = self.arithmetic(&args[1], &args[2])? else {
                    return Ok(BuiltinOutcome::Fails);
                };
                match &args[0] {
                    EvalTerm::Var(v) => Ok(BuiltinOutcome::Bind(v.clone(), value)),
                    result => Ok(outcome(loose_equal(result, &value))),
                }
            }
        }
    }

    fn error(&self, message: String) -> EvaluatorError {
        EvaluatorError::Builtin {
            builtin: self.name().to_string(),
            message,
        }
    }

    fn numbers(&self, a: &EvalTerm, b: &EvalTerm) -> Result<(f64, f64), EvaluatorError> {
        match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => Err(self.error(format!("{} and {} are not both numeric", a, b))),
        }
    }

    fn strings<'a>(&self, a: &'a EvalTerm, b: &'a EvalTerm) -> Result<(&'a str, &'a str), EvaluatorError> {
        match (a, b) {
            (EvalTerm::Str(x), EvalTerm::Str(y)) => Ok((x, y)),
            _ => Err(self.error(format!("{} and {} are not both strings", a, b))),
        }
    }

    fn compare(&self, a: &EvalTerm, b: &EvalTerm) -> Result<Ordering, EvaluatorError> {
        if let (EvalTerm::Str(x), EvalTerm::Str(y)) = (a, b) {
            return Ok(x.cmp(y));
        }
        let (x, y) = self.numbers(a, b)?;
        x.partial_cmp(&y)
            .ok_or_else(|| self.error(format!("{} and {} are not comparable", a, b)))
    }

    /// `None` when the operation has no value, as for division by zero.
    fn arithmetic(&self, a: &EvalTerm, b: &EvalTerm) -> Result<Option<EvalTerm>, EvaluatorError> {
        if let (EvalTerm::Int(x), EvalTerm::Int(y)) = (a, b) {
            let value = match self {
                Builtin::NumericAdd => x.checked_add(*y),
                Builtin::NumericSubtract => x.checked_sub(*y),
                Builtin::NumericMultiply => x.checked_mul(*y),
                _ => {
                    if *y == 0 {
                        return Ok(None);
                    }
                    return Ok(Some(EvalTerm::Double(*x as f64 / *y as f64)));
                }
            };
            return value
                .map(|v| Some(EvalTerm::Int(v)))
                .ok_or_else(|| self.error(format!("integer overflow on {} and {}", x, y)));
        }
        let (x, y) = self.numbers(a, b)?;
        let value = match self {
            Builtin::NumericAdd => x + y,
            Builtin::NumericSubtract => x - y,
            Builtin::NumericMultiply => x * y,
            _ => {
                if y == 0.0 {
                    return Ok(None);
                }
                x / y
            }
        };
        Ok(Some(EvalTerm::Double(value)))
    }
}

/// Structural equality, except that integers and doubles compare by value.
fn loose_equal(a: &EvalTerm, b: &EvalTerm) -> bool {
    match (a, b) {
        (EvalTerm::Int(_), EvalTerm::Double(_)) | (EvalTerm::Double(_), EvalTerm::Int(_)) => {
            a.as_f64() == b.as_f64()
        }
        _ => a == b,
    }
}
