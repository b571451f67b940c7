//! The term algebra shared by rules, queries and bindings.
//!
//! Equality is structural: two identifiers are equal iff their IRIs are equal,
//! and a skolem constant, whose id is minted process-unique, only ever equals
//! itself. Doubles compare by bit pattern so that `Term` can be `Eq` and `Hash`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A logic variable, written `?name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Variable(String);

impl Variable {
    /// Creates a variable. A leading `?` is stripped.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        match name.strip_prefix('?') {
            Some(stripped) => Self(stripped.to_string()),
            None => Self(name),
        }
    }

    /// The variable name without the `?` marker.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.0)
    }
}

/// The primitive datatypes a value term can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ValueType {
    String,
    Int,
    Double,
    Bool,
}

impl ValueType {
    /// Every value type, in the order typed rule variants are generated.
    pub const ALL: [ValueType; 4] = [
        ValueType::String,
        ValueType::Int,
        ValueType::Double,
        ValueType::Bool,
    ];

    /// Short lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Int => "int",
            ValueType::Double => "double",
            ValueType::Bool => "bool",
        }
    }
}

/// A term of the rule language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Term {
    /// A resource named by an IRI.
    Identifier(String),
    /// A logic variable.
    Variable(Variable),
    /// A string value.
    String(String),
    /// An integer value.
    Int(i64),
    /// A double value.
    Double(f64),
    /// A boolean value.
    Bool(bool),
    /// A skolem constant standing in for a blank node; the IRI is globally unique.
    Skolem(String),
    /// A constructed term `symbol(args...)`.
    Function { symbol: String, args: Vec<Term> },
    /// An unnumbered anonymous identifier (`_#`). No evaluator can represent it.
    Anonymous,
}

impl Term {
    /// Creates an identifier term.
    pub fn identifier(iri: impl Into<String>) -> Self {
        Term::Identifier(iri.into())
    }

    /// Creates a variable term.
    pub fn variable(name: impl Into<String>) -> Self {
        Term::Variable(Variable::new(name))
    }

    /// Creates a string value term.
    pub fn string(value: impl Into<String>) -> Self {
        Term::String(value.into())
    }

    /// Creates a constructed term.
    pub fn function(symbol: impl Into<String>, args: Vec<Term>) -> Self {
        Term::Function {
            symbol: symbol.into(),
            args,
        }
    }

    /// Returns `true` for variables.
    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }

    /// Returns the variable if this term is one.
    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Term::Variable(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the IRI of an identifier or skolem constant.
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Identifier(iri) | Term::Skolem(iri) => Some(iri),
            _ => None,
        }
    }

    /// The datatype of a value term; `None` for anything else.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Term::String(_) => Some(ValueType::String),
            Term::Int(_) => Some(ValueType::Int),
            Term::Double(_) => Some(ValueType::Double),
            Term::Bool(_) => Some(ValueType::Bool),
            _ => None,
        }
    }

    /// Returns `true` if no variable occurs in the term.
    pub fn is_ground(&self) -> bool {
        match self {
            Term::Variable(_) => false,
            Term::Function { args, .. } => args.iter().all(Term::is_ground),
            _ => true,
        }
    }

    /// Appends the variables of this term to `out`, skipping ones already present.
    pub fn collect_variables(&self, out: &mut Vec<Variable>) {
        match self {
            Term::Variable(v) => {
                if !out.contains(v) {
                    out.push(v.clone());
                }
            }
            Term::Function { args, .. } => args.iter().for_each(|a| a.collect_variables(out)),
            _ => {}
        }
    }

    fn kind_index(&self) -> u8 {
        match self {
            Term::Identifier(_) => 0,
            Term::Variable(_) => 1,
            Term::String(_) => 2,
            Term::Int(_) => 3,
            Term::Double(_) => 4,
            Term::Bool(_) => 5,
            Term::Skolem(_) => 6,
            Term::Function { .. } => 7,
            Term::Anonymous => 8,
        }
    }

    /// A short name of the term's variant, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Term::Identifier(_) => "identifier",
            Term::Variable(_) => "variable",
            Term::String(_) => "string",
            Term::Int(_) => "integer",
            Term::Double(_) => "double",
            Term::Bool(_) => "boolean",
            Term::Skolem(_) => "skolem constant",
            Term::Function { .. } => "constructed term",
            Term::Anonymous => "anonymous id",
        }
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Term::Identifier(a), Term::Identifier(b)) => a == b,
            (Term::Variable(a), Term::Variable(b)) => a == b,
            (Term::String(a), Term::String(b)) => a == b,
            (Term::Int(a), Term::Int(b)) => a == b,
            (Term::Double(a), Term::Double(b)) => a.to_bits() == b.to_bits(),
            (Term::Bool(a), Term::Bool(b)) => a == b,
            (Term::Skolem(a), Term::Skolem(b)) => a == b,
            (
                Term::Function { symbol: s1, args: a1 },
                Term::Function { symbol: s2, args: a2 },
            ) => s1 == s2 && a1 == a2,
            (Term::Anonymous, Term::Anonymous) => true,
            _ => false,
        }
    }
}

impl Eq for Term {}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind_index().hash(state);
        match self {
            Term::Identifier(s) | Term::String(s) | Term::Skolem(s) => s.hash(state),
            Term::Variable(v) => v.hash(state),
            Term::Int(i) => i.hash(state),
            Term::Double(d) => d.to_bits().hash(state),
            Term::Bool(b) => b.hash(state),
            Term::Function { symbol, args } => {
                symbol.hash(state);
                args.hash(state);
            }
            Term::Anonymous => {}
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Identifier(iri) | Term::Skolem(iri) => write!(f, "<{}>", iri),
            Term::Variable(v) => write!(f, "{}", v),
            Term::String(s) => write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
            Term::Int(i) => write!(f, "{}", i),
            Term::Double(d) => write!(f, "{:?}", d),
            Term::Bool(b) => write!(f, "{}", b),
            Term::Function { symbol, args } => {
                write!(f, "{}(", symbol)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Term::Anonymous => write!(f, "_#"),
        }
    }
}

impl From<Variable> for Term {
    fn from(v: Variable) -> Self {
        Term::Variable(v)
    }
}

impl From<i64> for Term {
    fn from(i: i64) -> Self {
        Term::Int(i)
    }
}

impl From<f64> for Term {
    fn from(d: f64) -> Self {
        Term::Double(d)
    }
}

impl From<bool> for Term {
    fn from(b: bool) -> Self {
        Term::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identifier_equality_is_by_iri() {
        let a = Term::identifier(String::from("http://example.org/a"));
        let b = Term::identifier("http://example.org/a");
        assert_eq!(a, b);
        assert_ne!(a, Term::identifier("http://example.org/b"));
    }

    #[test]
    fn test_skolem_differs_from_identifier() {
        let iri = "http://example.org/ns#b1";
        assert_ne!(Term::Skolem(iri.into()), Term::identifier(iri));
        assert_eq!(Term::Skolem(iri.into()), Term::Skolem(iri.into()));
    }

    #[test]
    fn test_double_hashing() {
        let mut set = HashSet::new();
        set.insert(Term::Double(1.5));
        set.insert(Term::Double(1.5));
        set.insert(Term::Int(1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_variable_strips_marker() {
        assert_eq!(Variable::new("?x"), Variable::new("x"));
        assert_eq!(Term::variable("?x").to_string(), "?x");
    }

    #[test]
    fn test_value_type() {
        assert_eq!(Term::string("a").value_type(), Some(ValueType::String));
        assert_eq!(Term::Int(3).value_type(), Some(ValueType::Int));
        assert_eq!(Term::Double(3.0).value_type(), Some(ValueType::Double));
        assert_eq!(Term::Bool(true).value_type(), Some(ValueType::Bool));
        assert_eq!(Term::identifier("urn:x").value_type(), None);
    }

    #[test]
    fn test_collect_variables_in_function() {
        let term = Term::function(
            "f",
            vec![Term::variable("x"), Term::function("g", vec![Term::variable("y")]), Term::variable("x")],
        );
        let mut vars = Vec::new();
        term.collect_variables(&mut vars);
        assert_eq!(vars, vec![Variable::new("x"), Variable::new("y")]);
        assert!(!term.is_ground());
    }

    #[test]
    fn test_display() {
        assert_eq!(Term::Double(2.0).to_string(), "2.0");
        assert_eq!(Term::string("say \"hi\"").to_string(), "\"say \\\"hi\\\"\"");
        assert_eq!(
            Term::function("f", vec![Term::Int(1), Term::Anonymous]).to_string(),
            "f(1, _#)"
        );
    }
}
