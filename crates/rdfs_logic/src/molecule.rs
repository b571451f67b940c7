//! Molecules, rules and rule sets.
//!
//! A [`Molecule`] is the attribute-value statement `left[predicate ->> right]`.
//! A [`Rule`] pairs an optional head molecule with a conjunctive body; a rule
//! with an empty body is a fact, a rule without a head is a constraint.

use crate::term::{Term, ValueType, Variable};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Evaluator predicate for molecules whose value is not a typed literal.
pub const PRED_HAS_VALUE: &str = "f-logic-has-value";
/// Evaluator predicate for molecules holding a string value.
pub const PRED_HAS_STRING_VALUE: &str = "has-string-value";
/// Evaluator predicate for molecules holding an integer value.
pub const PRED_HAS_INT_VALUE: &str = "has-int-value";
/// Evaluator predicate for molecules holding a double value.
pub const PRED_HAS_DOUBLE_VALUE: &str = "has-double-value";
/// Evaluator predicate for molecules holding a boolean value.
pub const PRED_HAS_BOOL_VALUE: &str = "has-bool-value";

/// Which ternary evaluator predicate a molecule is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValuePredicate {
    /// `f-logic-has-value`
    Generic,
    /// `has-<type>-value`
    Typed(ValueType),
}

impl ValuePredicate {
    /// The generic predicate followed by one typed predicate per value type.
    pub const ALL: [ValuePredicate; 5] = [
        ValuePredicate::Typed(ValueType::String),
        ValuePredicate::Typed(ValueType::Int),
        ValuePredicate::Typed(ValueType::Double),
        ValuePredicate::Typed(ValueType::Bool),
        ValuePredicate::Generic,
    ];

    /// The evaluator predicate symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            ValuePredicate::Generic => PRED_HAS_VALUE,
            ValuePredicate::Typed(ValueType::String) => PRED_HAS_STRING_VALUE,
            ValuePredicate::Typed(ValueType::Int) => PRED_HAS_INT_VALUE,
            ValuePredicate::Typed(ValueType::Double) => PRED_HAS_DOUBLE_VALUE,
            ValuePredicate::Typed(ValueType::Bool) => PRED_HAS_BOOL_VALUE,
        }
    }

    /// Maps an optional value type to its predicate.
    pub fn for_type(value_type: Option<ValueType>) -> Self {
        value_type.map_or(ValuePredicate::Generic, ValuePredicate::Typed)
    }
}

/// An attribute-value molecule `left[predicate ->> right]`.
///
/// Molecules are immutable once built; equality and hashing derive from the
/// three terms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Molecule {
    left: Term,
    predicate: Term,
    right: Term,
}

impl Molecule {
    /// Creates a molecule.
    pub fn new(left: Term, predicate: Term, right: Term) -> Self {
        Self {
            left,
            predicate,
            right,
        }
    }

    /// The subject side.
    pub fn left(&self) -> &Term {
        &self.left
    }

    /// The attribute.
    pub fn predicate(&self) -> &Term {
        &self.predicate
    }

    /// The value side.
    pub fn right(&self) -> &Term {
        &self.right
    }

    /// The predicate a molecule is stored under, chosen by the value's own type.
    pub fn value_predicate(&self) -> ValuePredicate {
        ValuePredicate::for_type(self.right.value_type())
    }

    /// Returns `true` if neither the attribute nor the value is known, so the
    /// molecule could match facts stored under any value predicate.
    pub fn is_ambiguous(&self) -> bool {
        self.predicate.is_variable() && self.right.is_variable()
    }

    /// The terms in evaluator argument order: left, predicate, right.
    pub fn terms(&self) -> [&Term; 3] {
        [&self.left, &self.predicate, &self.right]
    }

    /// Appends the molecule's variables to `out` in first-occurrence order.
    pub fn collect_variables(&self, out: &mut Vec<Variable>) {
        for term in self.terms() {
            term.collect_variables(out);
        }
    }
}

impl fmt::Display for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{} ->> {}]", self.left, self.predicate, self.right)
    }
}

/// A rule `head :- body`.
///
/// Body order is kept for readability but is irrelevant to equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    head: Option<Molecule>,
    body: Vec<Molecule>,
}

impl Rule {
    /// Creates a rule.
    pub fn new(head: Option<Molecule>, body: Vec<Molecule>) -> Self {
        Self { head, body }
    }

    /// Creates a fact.
    pub fn fact(head: Molecule) -> Self {
        Self::new(Some(head), Vec::new())
    }

    /// Creates an implication `head :- body`.
    pub fn implication(head: Molecule, body: Vec<Molecule>) -> Self {
        Self::new(Some(head), body)
    }

    /// Creates a constraint `!- body`.
    pub fn constraint(body: Vec<Molecule>) -> Self {
        Self::new(None, body)
    }

    /// The head molecule, absent for constraints.
    pub fn head(&self) -> Option<&Molecule> {
        self.head.as_ref()
    }

    /// The body molecules.
    pub fn body(&self) -> &[Molecule] {
        &self.body
    }

    /// A rule with an empty body.
    pub fn is_fact(&self) -> bool {
        self.body.is_empty()
    }

    /// A rule without a head.
    pub fn is_constraint(&self) -> bool {
        self.head.is_none()
    }

    /// The body as a multiset.
    fn body_counts(&self) -> HashMap<&Molecule, usize> {
        let mut counts = HashMap::new();
        for m in &self.body {
            *counts.entry(m).or_insert(0) += 1;
        }
        counts
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.head == other.head
            && self.body.len() == other.body.len()
            && self.body_counts() == other.body_counts()
    }
}

impl Eq for Rule {}

impl Hash for Rule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.head.hash(state);
        let mut digests: Vec<u64> = self
            .body
            .iter()
            .map(|m| {
                let mut h = DefaultHasher::new();
                m.hash(&mut h);
                h.finish()
            })
            .collect();
        digests.sort_unstable();
        digests.hash(state);
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.head {
            Some(head) => write!(f, "{}", head)?,
            None => write!(f, "!")?,
        }
        if !self.body.is_empty() {
            write!(f, " :- ")?;
            for (i, m) in self.body.iter().enumerate() {
                if i > 0 {
                    write!(f, " and ")?;
                }
                write!(f, "{}", m)?;
            }
        }
        write!(f, ".")
    }
}

/// An ordered, duplicate-free collection of rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    /// The rule set's name, usually the namespace it was compiled for.
    pub name: String,
    rules: IndexSet<Rule>,
}

impl RuleSet {
    /// Creates an empty rule set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: IndexSet::new(),
        }
    }

    /// Adds a rule. Returns `false` if an equal rule was already present.
    pub fn add(&mut self, rule: Rule) -> bool {
        self.rules.insert(rule)
    }

    /// Returns `true` if an equal rule is present.
    pub fn contains(&self, rule: &Rule) -> bool {
        self.rules.contains(rule)
    }

    /// Number of rules, facts included.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates every rule in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Iterates the facts.
    pub fn facts(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.is_fact())
    }

    /// Iterates the rules with a non-empty body.
    pub fn implications(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| !r.is_fact())
    }

    /// Returns `true` if every rule of `other` is also in this set.
    pub fn is_superset(&self, other: &RuleSet) -> bool {
        other.rules.is_subset(&self.rules)
    }

    /// The declared value type of an attribute.
    ///
    /// Looks for a rule whose head uses `predicate` as attribute and holds a
    /// typed value; the first such head in insertion order decides.
    pub fn datatype_of(&self, predicate: &Term) -> Option<ValueType> {
        self.rules
            .iter()
            .filter_map(Rule::head)
            .filter(|head| head.predicate() == predicate)
            .find_map(|head| head.right().value_type())
    }

    /// Returns `true` if some head stores a constant of no datatype, such as an
    /// identifier, under `predicate`.
    pub fn has_untyped_value(&self, predicate: &Term) -> bool {
        self.rules
            .iter()
            .filter_map(Rule::head)
            .filter(|head| head.predicate() == predicate)
            .any(|head| !head.right().is_variable() && head.right().value_type().is_none())
    }

    /// Serializes the rule set to JSON.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Extend<Rule> for RuleSet {
    fn extend<T: IntoIterator<Item = Rule>>(&mut self, iter: T) {
        self.rules.extend(iter);
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = indexmap::set::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(local: &str) -> Term {
        Term::identifier(format!("http://example.org/{}", local))
    }

    fn var(name: &str) -> Term {
        Term::variable(name)
    }

    #[test]
    fn test_fact_and_constraint_classification() {
        let fact = Rule::fact(Molecule::new(iri("a"), iri("p"), iri("b")));
        assert!(fact.is_fact());
        assert!(!fact.is_constraint());

        let constraint = Rule::constraint(vec![Molecule::new(var("x"), iri("p"), var("x"))]);
        assert!(constraint.is_constraint());
        assert!(!constraint.is_fact());
    }

    #[test]
    fn test_body_order_is_irrelevant() {
        let head = Molecule::new(var("x"), iri("q"), var("y"));
        let m1 = Molecule::new(var("x"), iri("p"), var("z"));
        let m2 = Molecule::new(var("z"), iri("p"), var("y"));
        let r1 = Rule::implication(head.clone(), vec![m1.clone(), m2.clone()]);
        let r2 = Rule::implication(head, vec![m2, m1]);
        assert_eq!(r1, r2);

        let mut set = RuleSet::new("test");
        assert!(set.add(r1));
        assert!(!set.add(r2));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_body_multiplicity_matters() {
        let head = Molecule::new(var("x"), iri("q"), var("y"));
        let a = Molecule::new(var("x"), iri("p"), var("y"));
        let b = Molecule::new(var("y"), iri("p"), var("x"));
        let aab = Rule::implication(head.clone(), vec![a.clone(), a.clone(), b.clone()]);
        let abb = Rule::implication(head.clone(), vec![a.clone(), b.clone(), b.clone()]);
        let baa = Rule::implication(head, vec![b, a.clone(), a]);
        assert_ne!(aab, abb);
        assert_eq!(aab, baa);

        let mut set = RuleSet::new("test");
        assert!(set.add(aab));
        assert!(set.add(abb));
        assert!(!set.add(baa));
    }

    #[test]
    fn test_value_predicate_selection() {
        let typed = Molecule::new(iri("john"), iri("hasAge"), Term::Int(30));
        assert_eq!(typed.value_predicate().symbol(), PRED_HAS_INT_VALUE);

        let plain = Molecule::new(iri("john"), iri("knows"), iri("anna"));
        assert_eq!(plain.value_predicate(), ValuePredicate::Generic);
        assert_eq!(plain.value_predicate().symbol(), PRED_HAS_VALUE);
    }

    #[test]
    fn test_datatype_of() {
        let mut set = RuleSet::new("test");
        set.add(Rule::fact(Molecule::new(iri("john"), iri("knows"), iri("anna"))));
        set.add(Rule::fact(Molecule::new(iri("john"), iri("hasName"), Term::string("John"))));

        assert_eq!(set.datatype_of(&iri("hasName")), Some(ValueType::String));
        assert_eq!(set.datatype_of(&iri("knows")), None);
        assert_eq!(set.datatype_of(&iri("missing")), None);

        assert!(set.has_untyped_value(&iri("knows")));
        assert!(!set.has_untyped_value(&iri("hasName")));
        assert!(!set.has_untyped_value(&iri("missing")));
    }

    #[test]
    fn test_rule_display() {
        let rule = Rule::implication(
            Molecule::new(var("x"), iri("type"), iri("Property")),
            vec![Molecule::new(var("y"), var("x"), var("u"))],
        );
        assert_eq!(
            rule.to_string(),
            "?x[<http://example.org/type> ->> <http://example.org/Property>] :- ?y[?x ->> ?u]."
        );
        assert!(rule.body()[0].is_ambiguous());
        assert!(!rule.head().unwrap().is_ambiguous());
    }

    #[test]
    fn test_rule_set_json() {
        let mut set = RuleSet::new("json");
        set.add(Rule::fact(Molecule::new(iri("a"), iri("p"), Term::Double(1.5))));
        let json = set.to_json().unwrap();
        let back: RuleSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
