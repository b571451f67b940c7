//! In-memory bottom-up evaluator.

use super::builtin::BuiltinOutcome;
use super::{EvalAtom, EvalLiteral, EvalRule, EvalTerm, Evaluator, EvaluatorError, Tuple};
use crate::config::EvaluatorConfig;
use indexmap::IndexSet;
use log::{debug, trace};
use std::collections::{HashMap, HashSet, VecDeque};

type RelationKey = (String, usize);
pub(crate) type Substitution = HashMap<String, EvalTerm>;

/// A rule with its body literals in evaluation order.
#[derive(Debug, Clone)]
struct Plan {
    head: EvalAtom,
    steps: Vec<EvalLiteral>,
}

/// A naive bottom-up Datalog evaluator over in-memory relations.
///
/// Every round applies all rules to the current relations and adds the new
/// head tuples; the fixpoint is reached when a round adds nothing. Rules must
/// be range restricted and free of negation. Builtins are evaluated inline as
/// soon as the arguments they need are bound.
#[derive(Debug, Clone)]
pub struct MemoryEvaluator {
    max_iterations: usize,
    relations: HashMap<RelationKey, IndexSet<Tuple>>,
    /// Tuples added through `add_fact`, as opposed to derived ones.
    base: HashSet<(RelationKey, Tuple)>,
    rules: Vec<EvalRule>,
    plans: Vec<Plan>,
    stale: bool,
    last_iterations: usize,
}

impl Default for MemoryEvaluator {
    fn default() -> Self {
        Self::with_config(&EvaluatorConfig::default())
    }
}

impl MemoryEvaluator {
    /// Creates an evaluator that gives up after `max_iterations` rounds.
    pub fn new(max_iterations: usize) -> Self {
        Self {
            max_iterations,
            relations: HashMap::new(),
            base: HashSet::new(),
            rules: Vec::new(),
            plans: Vec::new(),
            stale: false,
            last_iterations: 0,
        }
    }

    /// Creates an evaluator from configuration.
    pub fn with_config(config: &EvaluatorConfig) -> Self {
        Self::new(config.max_iterations)
    }

    /// Number of rules added.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Number of stored tuples, derived ones included.
    pub fn tuple_count(&self) -> usize {
        self.relations.values().map(IndexSet::len).sum()
    }

    /// Rounds used by the last fixpoint computation.
    pub fn last_iterations(&self) -> usize {
        self.last_iterations
    }

    /// Iterates the stored tuples of one relation.
    pub fn relation(&self, symbol: &str, arity: usize) -> impl Iterator<Item = &Tuple> {
        self.relations
            .get(&(symbol.to_string(), arity))
            .into_iter()
            .flat_map(IndexSet::iter)
    }

    fn plan(rule: &EvalRule) -> Result<Plan, EvaluatorError> {
        let mut atoms = VecDeque::new();
        let mut builtins = Vec::new();
        for literal in &rule.body {
            match literal {
                EvalLiteral::Atom { positive: false, .. } => {
                    return Err(EvaluatorError::NegationUnsupported(rule.to_string()))
                }
                EvalLiteral::Atom { .. } => atoms.push_back(literal.clone()),
                EvalLiteral::Builtin { builtin, terms } => {
                    builtin.check_arity(terms.len())?;
                    builtins.push(literal.clone());
                }
            }
        }

        let mut bound: HashSet<String> = HashSet::new();
        let mut steps = Vec::with_capacity(rule.body.len());
        loop {
            while let Some(i) = builtins.iter().position(|b| is_ready(b, &bound)) {
                let builtin = builtins.remove(i);
                bind_all(&builtin, &mut bound);
                steps.push(builtin);
            }
            match atoms.pop_front() {
                Some(atom) => {
                    bind_all(&atom, &mut bound);
                    steps.push(atom);
                }
                None => break,
            }
        }

        if !builtins.is_empty() {
            return Err(EvaluatorError::UnsafeRule(format!(
                "builtin arguments are never bound in {}",
                rule
            )));
        }
        let mut head_vars = Vec::new();
        rule.head.collect_variables(&mut head_vars);
        if let Some(v) = head_vars.iter().find(|v| !bound.contains(*v)) {
            return Err(EvaluatorError::UnsafeRule(format!(
                "?{} does not occur in the body of {}",
                v, rule
            )));
        }

        Ok(Plan {
            head: rule.head.clone(),
            steps,
        })
    }

    fn matches(&self, steps: &[EvalLiteral]) -> Result<Vec<Substitution>, EvaluatorError> {
        self.matches_from(Substitution::new(), steps)
    }

    fn matches_from(
        &self,
        seed: Substitution,
        steps: &[EvalLiteral],
    ) -> Result<Vec<Substitution>, EvaluatorError> {
        let mut substitutions = vec![seed];
        for step in steps {
            let mut next = Vec::new();
            match step {
                EvalLiteral::Atom { atom, .. } => {
                    let key = (atom.symbol.clone(), atom.arity());
                    let Some(relation) = self.relations.get(&key) else {
                        return Ok(Vec::new());
                    };
                    for s in &substitutions {
                        for tuple in relation {
                            let mut extended = s.clone();
                            if unify_all(&atom.terms, tuple, &mut extended) {
                                next.push(extended);
                            }
                        }
                    }
                }
                EvalLiteral::Builtin { builtin, terms } => {
                    for s in &substitutions {
                        let args: Vec<EvalTerm> = terms.iter().map(|t| substitute(t, s)).collect();
                        match builtin.apply(&args)? {
                            BuiltinOutcome::Holds => next.push(s.clone()),
                            BuiltinOutcome::Fails => {}
                            BuiltinOutcome::Bind(var, value) => {
                                let mut extended = s.clone();
                                extended.insert(var, value);
                                next.push(extended);
                            }
                        }
                    }
                }
            }
            substitutions = next;
            if substitutions.is_empty() {
                break;
            }
        }
        Ok(substitutions)
    }
}

impl Evaluator for MemoryEvaluator {
    fn add_fact(&mut self, fact: EvalAtom) -> Result<(), EvaluatorError> {
        if !fact.is_ground() {
            return Err(EvaluatorError::UnsafeRule(format!("fact {} is not ground", fact)));
        }
        let key = (fact.symbol, fact.terms.len());
        self.base.insert((key.clone(), fact.terms.clone()));
        self.relations.entry(key).or_default().insert(fact.terms);
        Ok(())
    }

    fn add_rule(&mut self, rule: EvalRule) -> Result<(), EvaluatorError> {
        self.rules.push(rule);
        self.stale = true;
        Ok(())
    }

    fn reset(&mut self) {
        self.relations.clear();
        self.base.clear();
        self.rules.clear();
        self.plans.clear();
        self.stale = false;
        self.last_iterations = 0;
    }

    fn rebuild(&mut self) -> Result<(), EvaluatorError> {
        self.plans = self
            .rules
            .iter()
            .map(Self::plan)
            .collect::<Result<Vec<_>, _>>()?;
        self.stale = false;
        debug!("Rebuilt executor with {} rules", self.plans.len());
        Ok(())
    }

    fn execute(&mut self) -> Result<(), EvaluatorError> {
        if self.stale {
            self.rebuild()?;
        }

        let mut iteration = 0;
        loop {
            iteration += 1;
            if iteration > self.max_iterations {
                return Err(EvaluatorError::MaxIterationsExceeded {
                    limit: self.max_iterations,
                });
            }

            let mut derived = Vec::new();
            for plan in &self.plans {
                let key = (plan.head.symbol.clone(), plan.head.arity());
                for s in self.matches(&plan.steps)? {
                    let tuple: Tuple = plan.head.terms.iter().map(|t| substitute(t, &s)).collect();
                    let known = self
                        .relations
                        .get(&key)
                        .is_some_and(|relation| relation.contains(&tuple));
                    if !known {
                        derived.push((key.clone(), tuple));
                    }
                }
            }

            let mut added = 0;
            for (key, tuple) in derived {
                if self.relations.entry(key).or_default().insert(tuple) {
                    added += 1;
                }
            }
            trace!("Fixpoint round {}: {} new tuples", iteration, added);
            if added == 0 {
                break;
            }
        }

        self.last_iterations = iteration;
        debug!(
            "Fixpoint reached after {} rounds, {} tuples",
            iteration,
            self.tuple_count()
        );
        Ok(())
    }

    fn compute_substitution(&self, query: &EvalAtom) -> Result<Vec<Tuple>, EvaluatorError> {
        let key = (query.symbol.clone(), query.arity());
        let Some(relation) = self.relations.get(&key) else {
            return Ok(Vec::new());
        };
        Ok(relation
            .iter()
            .filter(|tuple| unify_all(&query.terms, tuple, &mut Substitution::new()))
            .cloned()
            .collect())
    }

    fn count_derivations(&self, fact: &EvalAtom) -> Result<usize, EvaluatorError> {
        if !fact.is_ground() {
            return Err(EvaluatorError::UnsafeRule(format!("{} is not ground", fact)));
        }
        let key = (fact.symbol.clone(), fact.arity());
        let stored = self
            .relations
            .get(&key)
            .is_some_and(|relation| relation.contains(&fact.terms));
        if !stored {
            return Ok(0);
        }

        let mut count = usize::from(self.base.contains(&(key, fact.terms.clone())));
        for plan in &self.plans {
            let mut seed = Substitution::new();
            if plan.head.symbol != fact.symbol || !unify_all(&plan.head.terms, &fact.terms, &mut seed)
            {
                continue;
            }
            let mut instances = HashSet::new();
            for s in self.matches_from(seed, &plan.steps)? {
                let body: Vec<EvalAtom> = plan
                    .steps
                    .iter()
                    .filter_map(|step| match step {
                        EvalLiteral::Atom { atom, .. } => Some(EvalAtom::new(
                            atom.symbol.as_str(),
                            atom.terms.iter().map(|t| substitute(t, &s)).collect(),
                        )),
                        EvalLiteral::Builtin { .. } => None,
                    })
                    .collect();
                // an instance that uses the atom to derive itself proves nothing new
                if !body.contains(fact) && instances.insert(body) {
                    count += 1;
                }
            }
        }
        trace!("{} has {} derivations", fact, count);
        Ok(count)
    }
}

fn is_ready(literal: &EvalLiteral, bound: &HashSet<String>) -> bool {
    match literal {
        EvalLiteral::Builtin { builtin, terms } => {
            let flags: Vec<bool> = terms.iter().map(|t| is_bound(t, bound)).collect();
            builtin.ready(&flags)
        }
        EvalLiteral::Atom { .. } => true,
    }
}

fn is_bound(term: &EvalTerm, bound: &HashSet<String>) -> bool {
    let mut vars = Vec::new();
    term.collect_variables(&mut vars);
    vars.iter().all(|v| bound.contains(v))
}

/// Marks every variable of a literal as bound. Binding builtins bind at most
/// their unbound argument, so this holds for them too.
fn bind_all(literal: &EvalLiteral, bound: &mut HashSet<String>) {
    let mut vars = Vec::new();
    literal.collect_variables(&mut vars);
    bound.extend(vars);
}

pub(crate) fn substitute(term: &EvalTerm, s: &Substitution) -> EvalTerm {
    match term {
        EvalTerm::Var(v) => s.get(v).cloned().unwrap_or_else(|| term.clone()),
        EvalTerm::Construct { functor, args } => EvalTerm::Construct {
            functor: functor.clone(),
            args: args.iter().map(|a| substitute(a, s)).collect(),
        },
        _ => term.clone(),
    }
}

fn unify(pattern: &EvalTerm, value: &EvalTerm, s: &mut Substitution) -> bool {
    match pattern {
        EvalTerm::Var(v) => match s.get(v) {
            Some(existing) => existing == value,
            None => {
                s.insert(v.clone(), value.clone());
                true
            }
        },
        EvalTerm::Construct { functor, args } => match value {
            EvalTerm::Construct {
                functor: other,
                args: values,
            } if functor == other && args.len() == values.len() => unify_all(args, values, s),
            _ => false,
        },
        constant => constant == value,
    }
}

pub(crate) fn unify_all(patterns: &[EvalTerm], values: &[EvalTerm], s: &mut Substitution) -> bool {
    patterns.len() == values.len()
        && patterns
            .iter()
            .zip(values)
            .all(|(pattern, value)| unify(pattern, value, s))
}
