//! The evaluator facade: rule-set registration, caching and binding extraction.
//!
//! Each registered namespace owns a program: an evaluator instance plus two
//! dirty flags and a table of memoized conjunctive queries. The executor is
//! rebuilt only when rules changed and the fixpoint recomputed only when facts
//! or rules changed, so repeated queries against an unchanged knowledge base
//! read straight from the evaluator.
//!
//! With partitioning disabled every namespace feeds one shared program.

use crate::config::{ReasonerConfig, TypeExpansion};
use crate::error::{Error, Result};
use crate::evaluator::{
    substitute, unify_all, Builtin, EvalAtom, EvalLiteral, EvalRule, EvalTerm, Evaluator,
    EvaluatorError, EvaluatorFactory, MemoryEvaluator, Substitution, Tuple,
};
use crate::molecule::{Molecule, Rule, RuleSet, ValuePredicate};
use crate::query::{ConjunctiveQuery, QueryLiteral};
use crate::term::{Term, Variable};
use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// One answer to a query: a value per result variable.
pub type Binding = BTreeMap<Variable, Term>;

/// Prefix of the predicates standing in for memoized conjunctive queries.
pub const REPLACEMENT_PREFIX: &str = "_replacement_";

const SHARED_PROGRAM: &str = "";

/// Counters describing the work done by a facade.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FacadeStats {
    /// Fixpoint computations triggered by queries.
    pub fixpoint_runs: usize,
    /// Executor rebuilds triggered by rule changes.
    pub executor_rebuilds: usize,
    /// Queries answered through an existing replacement rule.
    pub memo_hits: usize,
    /// Replacement rules added for conjunctive queries.
    pub memo_rules: usize,
    /// When the last fixpoint computation finished.
    pub last_fixpoint: Option<DateTime<Utc>>,
}

/// A rule set lowered to evaluator facts and rules.
#[derive(Debug, Clone, Default)]
struct Compiled {
    facts: Vec<EvalAtom>,
    rules: Vec<EvalRule>,
}

struct Program {
    evaluator: Box<dyn Evaluator>,
    facts_changed: bool,
    rules_changed: bool,
    memo: HashMap<ConjunctiveQuery, EvalRule>,
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("evaluator", &self.evaluator)
            .field("facts_changed", &self.facts_changed)
            .field("rules_changed", &self.rules_changed)
            .field("memoized", &self.memo.len())
            .finish()
    }
}

/// Bridges compiled rule sets and queries to an [`Evaluator`].
pub struct EvaluatorFacade {
    factory: EvaluatorFactory,
    expansion: TypeExpansion,
    partitioned: bool,
    compiled: IndexMap<String, Compiled>,
    programs: IndexMap<String, Program>,
    stats: FacadeStats,
}

impl fmt::Debug for EvaluatorFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluatorFacade")
            .field("expansion", &self.expansion)
            .field("partitioned", &self.partitioned)
            .field("namespaces", &self.compiled.keys().collect::<Vec<_>>())
            .field("programs", &self.programs)
            .field("stats", &self.stats)
            .finish()
    }
}

impl EvaluatorFacade {
    /// Creates a facade backed by [`MemoryEvaluator`]s.
    pub fn new(config: &ReasonerConfig) -> Self {
        let evaluator = config.evaluator.clone();
        Self::with_factory(
            config,
            Box::new(move || Box::new(MemoryEvaluator::with_config(&evaluator))),
        )
    }

    /// Creates a facade drawing evaluators from `factory`.
    pub fn with_factory(config: &ReasonerConfig, factory: EvaluatorFactory) -> Self {
        Self {
            factory,
            expansion: config.type_expansion,
            partitioned: config.partition_by_namespace,
            compiled: IndexMap::new(),
            programs: IndexMap::new(),
            stats: FacadeStats::default(),
        }
    }

    /// Work counters.
    pub fn stats(&self) -> &FacadeStats {
        &self.stats
    }

    /// Returns `true` if a rule set is registered under `namespace`.
    pub fn is_registered(&self, namespace: &str) -> bool {
        self.compiled.contains_key(namespace)
    }

    /// The registered namespaces in registration order.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.compiled.keys().map(String::as_str)
    }

    /// Registers `rules` under `namespace`, replacing what was there.
    ///
    /// On failure the previous knowledge base of the namespace is kept.
    pub fn register(&mut self, namespace: &str, rules: &RuleSet) -> Result<()> {
        let compiled = self.lower(rules)?;
        debug!(
            "Lowered {} to {} facts and {} rules",
            namespace,
            compiled.facts.len(),
            compiled.rules.len()
        );

        if self.partitioned {
            let program = self.build_program(namespace, [&compiled])?;
            self.programs.insert(namespace.to_string(), program);
            self.compiled.insert(namespace.to_string(), compiled);
        } else {
            let previous = self.compiled.insert(namespace.to_string(), compiled);
            if let Err(e) = self.rebuild_shared() {
                match previous {
                    Some(p) => self.compiled.insert(namespace.to_string(), p),
                    None => self.compiled.shift_remove(namespace),
                };
                return Err(e);
            }
        }
        Ok(())
    }

    /// Drops the knowledge base registered under `namespace`.
    ///
    /// Returns `false` if nothing was registered there.
    pub fn deregister(&mut self, namespace: &str) -> Result<bool> {
        if self.compiled.shift_remove(namespace).is_none() {
            return Ok(false);
        }
        if self.partitioned {
            if let Some(mut program) = self.programs.shift_remove(namespace) {
                program.evaluator.reset();
            }
        } else {
            self.rebuild_shared()?;
        }
        debug!("Deregistered {}", namespace);
        Ok(true)
    }

    /// Evaluates a conjunctive query against the program of `namespace`.
    ///
    /// Every binding maps the query's result variables to values. A query
    /// without result variables yields one empty binding per proof: for each
    /// matching tuple, the product of the derivation counts of its body atoms.
    pub fn evaluate(&mut self, query: &ConjunctiveQuery, namespace: &str) -> Result<Vec<Binding>> {
        if !self.compiled.contains_key(namespace) {
            return Err(Error::UnknownNamespace(namespace.to_string()));
        }
        let key = self.program_key(namespace).to_string();
        let body = query
            .literals
            .iter()
            .map(convert_literal)
            .collect::<Result<Vec<_>>>()?;
        let proof_body = query.result_vars.is_empty().then(|| body.clone());

        let memoize = body.len() > 1
            || body
                .iter()
                .any(|l| !matches!(l, EvalLiteral::Atom { positive: true, .. }));

        let (query_atom, added) = {
            let program = self.program_mut(&key)?;
            if memoize {
                match program.memo.get(query) {
                    Some(rule) => (rule.head.clone(), None),
                    None => {
                        let rule = replacement_rule(query, body);
                        program
                            .evaluator
                            .add_rule(rule.clone())
                            .map_err(|e| Error::evaluator(query.to_string(), e))?;
                        program.memo.insert(query.clone(), rule.clone());
                        program.rules_changed = true;
                        (rule.head.clone(), Some(rule))
                    }
                }
            } else {
                match body.into_iter().next() {
                    Some(EvalLiteral::Atom { atom, .. }) => (atom, None),
                    _ => return Ok(Vec::new()),
                }
            }
        };
        match &added {
            Some(rule) => {
                self.stats.memo_rules += 1;
                debug!("Memoized {} as {}", query, rule.head.symbol);
            }
            None if memoize => {
                self.stats.memo_hits += 1;
                debug!("Memoized query hit: {}", query_atom.symbol);
            }
            None => {}
        }

        if let Err(e) = self.refresh(&key, &query.to_string()) {
            if added.is_some() {
                self.forget(&key, query)?;
            }
            return Err(e);
        }

        let program = self.program_mut(&key)?;
        let tuples = program
            .evaluator
            .compute_substitution(&query_atom)
            .map_err(|e| Error::evaluator(query.to_string(), e))?;

        if let Some(body) = proof_body {
            let proofs = count_proofs(program.evaluator.as_ref(), &query_atom, &body, &tuples)
                .map_err(|e| Error::evaluator(query.to_string(), e))?;
            debug!("Query {} proved {} times", query_atom.symbol, proofs);
            return Ok(vec![Binding::new(); proofs]);
        }
        extract_bindings(&query_atom, &query.result_vars, &tuples)
    }

    fn program_key<'a>(&self, namespace: &'a str) -> &'a str {
        if self.partitioned {
            namespace
        } else {
            SHARED_PROGRAM
        }
    }

    fn program_mut(&mut self, key: &str) -> Result<&mut Program> {
        self.programs
            .get_mut(key)
            .ok_or_else(|| Error::UnknownNamespace(key.to_string()))
    }

    /// Rebuilds and re-executes a program according to its dirty flags.
    fn refresh(&mut self, key: &str, context: &str) -> Result<()> {
        let program = self
            .programs
            .get_mut(key)
            .ok_or_else(|| Error::UnknownNamespace(key.to_string()))?;
        let rebuild = program.rules_changed;
        let execute = program.facts_changed || program.rules_changed;

        if rebuild {
            program
                .evaluator
                .rebuild()
                .map_err(|e| Error::evaluator(context, e))?;
            self.stats.executor_rebuilds += 1;
        }
        if execute {
            program
                .evaluator
                .execute()
                .map_err(|e| Error::evaluator(context, e))?;
            self.stats.fixpoint_runs += 1;
            self.stats.last_fixpoint = Some(Utc::now());
        }
        program.rules_changed = false;
        program.facts_changed = false;
        Ok(())
    }

    /// Drops a memoized query whose rule could not be evaluated and reloads the program without it.
    fn forget(&mut self, key: &str, query: &ConjunctiveQuery) -> Result<()> {
        let memo = match self.programs.get_mut(key) {
            Some(program) => {
                program.memo.remove(query);
                std::mem::take(&mut program.memo)
            }
            None => return Ok(()),
        };
        let sources: Vec<Compiled> = if self.partitioned {
            self.compiled.get(key).cloned().into_iter().collect()
        } else {
            self.compiled.values().cloned().collect()
        };
        let mut program = self.build_program(key, sources.iter())?;
        for rule in memo.values() {
            program
                .evaluator
                .add_rule(rule.clone())
                .map_err(|e| Error::evaluator(key, e))?;
        }
        program.memo = memo;
        self.programs.insert(key.to_string(), program);
        Ok(())
    }

    fn rebuild_shared(&mut self) -> Result<()> {
        let program = self.build_program(SHARED_PROGRAM, self.compiled.values())?;
        self.programs.insert(SHARED_PROGRAM.to_string(), program);
        Ok(())
    }

    fn build_program<'a>(
        &self,
        context: &str,
        sources: impl IntoIterator<Item = &'a Compiled>,
    ) -> Result<Program> {
        let mut evaluator = (self.factory)();
        for compiled in sources {
            for fact in &compiled.facts {
                evaluator
                    .add_fact(fact.clone())
                    .map_err(|e| Error::evaluator(context, e))?;
            }
            for rule in &compiled.rules {
                evaluator
                    .add_rule(rule.clone())
                    .map_err(|e| Error::evaluator(context, e))?;
            }
        }
        Ok(Program {
            evaluator,
            facts_changed: true,
            rules_changed: true,
            memo: HashMap::new(),
        })
    }

    /// Lowers a rule set to evaluator facts and rules.
    fn lower(&self, rules: &RuleSet) -> Result<Compiled> {
        let mut compiled = Compiled::default();
        let mut seen = IndexSet::new();
        for rule in rules {
            match rule.head() {
                None => {
                    return Err(Error::Translation(format!(
                        "Can't register the constraint {}",
                        rule
                    )))
                }
                Some(head) if rule.is_fact() => {
                    compiled.facts.push(molecule_atom(head, head.value_predicate())?)
                }
                Some(head) => {
                    for lowered in self.expand(rule, head)? {
                        if seen.insert(lowered.clone()) {
                            compiled.rules.push(lowered);
                        }
                    }
                }
            }
        }
        Ok(compiled)
    }

    /// Lowers one implication, expanding ambiguous body molecules into one rule per value predicate.
    fn expand(&self, rule: &Rule, head: &Molecule) -> Result<Vec<EvalRule>> {
        let ambiguous: Vec<&Molecule> = rule.body().iter().filter(|m| m.is_ambiguous()).collect();
        let variants: &[ValuePredicate] = match (ambiguous.is_empty(), self.expansion) {
            (false, TypeExpansion::PerType) => &ValuePredicate::ALL,
            _ => &[ValuePredicate::Generic],
        };

        let mut out = Vec::with_capacity(variants.len());
        for &variant in variants {
            let head_predicate = match variant {
                ValuePredicate::Typed(_)
                    if head.right().is_variable()
                        && ambiguous.iter().any(|m| m.right() == head.right()) =>
                {
                    variant
                }
                _ => head.value_predicate(),
            };
            let body = rule
                .body()
                .iter()
                .map(|m| {
                    let predicate = if m.is_ambiguous() {
                        variant
                    } else {
                        m.value_predicate()
                    };
                    molecule_atom(m, predicate).map(EvalLiteral::positive)
                })
                .collect::<Result<Vec<_>>>()?;
            out.push(EvalRule::new(molecule_atom(head, head_predicate)?, body));
        }
        Ok(out)
    }
}

fn replacement_rule(query: &ConjunctiveQuery, body: Vec<EvalLiteral>) -> EvalRule {
    let digest = blake3::hash(query.to_string().as_bytes());
    let symbol = format!("{}{}", REPLACEMENT_PREFIX, hex::encode(digest.as_bytes()));
    let mut vars = Vec::new();
    body.iter().for_each(|l| l.collect_variables(&mut vars));
    let head = EvalAtom::new(symbol, vars.into_iter().map(EvalTerm::Var).collect());
    EvalRule::new(head, body)
}

/// Sums, over the tuples matching `query_atom`, the product of the derivation
/// counts of the body atoms instantiated by each tuple.
fn count_proofs(
    evaluator: &dyn Evaluator,
    query_atom: &EvalAtom,
    body: &[EvalLiteral],
    tuples: &[Tuple],
) -> std::result::Result<usize, EvaluatorError> {
    let mut total = 0;
    for tuple in tuples {
        let mut s = Substitution::new();
        if !unify_all(&query_atom.terms, tuple, &mut s) {
            continue;
        }
        let mut proofs = 1;
        for literal in body {
            if let EvalLiteral::Atom { atom, .. } = literal {
                let ground = EvalAtom::new(
                    atom.symbol.as_str(),
                    atom.terms.iter().map(|t| substitute(t, &s)).collect(),
                );
                proofs *= evaluator.count_derivations(&ground)?;
            }
        }
        total += proofs;
    }
    Ok(total)
}

fn molecule_atom(m: &Molecule, predicate: ValuePredicate) -> Result<EvalAtom> {
    let terms = m
        .terms()
        .into_iter()
        .map(to_eval_term)
        .collect::<Result<Vec<_>>>()?;
    Ok(EvalAtom::new(predicate.symbol(), terms))
}

fn convert_literal(literal: &QueryLiteral) -> Result<EvalLiteral> {
    let terms = literal
        .terms
        .iter()
        .map(to_eval_term)
        .collect::<Result<Vec<_>>>()?;
    if let Some(builtin) = Builtin::from_iri(&literal.predicate) {
        builtin
            .check_arity(terms.len())
            .map_err(|e| Error::evaluator(literal.to_string(), e))?;
        return Ok(EvalLiteral::Builtin { builtin, terms });
    }
    Ok(EvalLiteral::Atom {
        positive: literal.positive,
        atom: EvalAtom::new(literal.predicate.as_str(), terms),
    })
}

/// Converts a term into the evaluator's term space.
pub fn to_eval_term(term: &Term) -> Result<EvalTerm> {
    Ok(match term {
        Term::Identifier(iri) | Term::Skolem(iri) => EvalTerm::Iri(iri.clone()),
        Term::Variable(v) => EvalTerm::Var(v.name().to_string()),
        Term::String(s) => EvalTerm::Str(s.clone()),
        Term::Int(i) => EvalTerm::Int(*i),
        Term::Double(d) => EvalTerm::Double(*d),
        Term::Bool(b) => EvalTerm::Bool(*b),
        Term::Function { symbol, args } => EvalTerm::Construct {
            functor: symbol.clone(),
            args: args.iter().map(to_eval_term).collect::<Result<Vec<_>>>()?,
        },
        Term::Anonymous => {
            return Err(Error::Translation(format!(
                "Can't convert a term of type {}",
                term.kind_name()
            )))
        }
    })
}

/// Converts an evaluator term back into a term. Skolem constants come back as identifiers.
pub fn from_eval_term(term: &EvalTerm) -> Term {
    match term {
        EvalTerm::Iri(iri) => Term::identifier(iri.as_str()),
        EvalTerm::Str(s) => Term::string(s.as_str()),
        EvalTerm::Int(i) => Term::Int(*i),
        EvalTerm::Double(d) => Term::Double(*d),
        EvalTerm::Bool(b) => Term::Bool(*b),
        EvalTerm::Var(v) => Term::variable(v.as_str()),
        EvalTerm::Construct { functor, args } => {
            Term::function(functor.as_str(), args.iter().map(from_eval_term).collect())
        }
    }
}

/// The index path of the first occurrence of `var` in `atom`: an argument
/// position followed by argument positions inside constructed terms.
pub fn search_query_for_var(atom: &EvalAtom, var: &str) -> Option<Vec<usize>> {
    fn search(terms: &[EvalTerm], var: &str, path: &mut Vec<usize>) -> bool {
        for (i, term) in terms.iter().enumerate() {
            path.push(i);
            let found = match term {
                EvalTerm::Var(v) => v == var,
                EvalTerm::Construct { args, .. } => search(args, var, path),
                _ => false,
            };
            if found {
                return true;
            }
            path.pop();
        }
        false
    }

    let mut path = Vec::new();
    search(&atom.terms, var, &mut path).then_some(path)
}

/// Follows an index path into a tuple.
pub fn term_at<'a>(tuple: &'a [EvalTerm], path: &[usize]) -> Option<&'a EvalTerm> {
    let (first, rest) = path.split_first()?;
    let mut term = tuple.get(*first)?;
    for &i in rest {
        term = match term {
            EvalTerm::Construct { args, .. } => args.get(i)?,
            _ => return None,
        };
    }
    Some(term)
}

fn extract_bindings(
    query_atom: &EvalAtom,
    result_vars: &[Variable],
    tuples: &[Tuple],
) -> Result<Vec<Binding>> {
    let paths: Vec<(&Variable, Vec<usize>)> = result_vars
        .iter()
        .filter_map(|v| search_query_for_var(query_atom, v.name()).map(|p| (v, p)))
        .collect();

    let mut bindings = IndexSet::new();
    for tuple in tuples {
        let mut binding = Binding::new();
        for (var, path) in &paths {
            let value = term_at(tuple, path).ok_or_else(|| {
                Error::Translation(format!(
                    "Result tuple of {} has no value for {}",
                    query_atom.symbol, var
                ))
            })?;
            binding.insert((*var).clone(), from_eval_term(value));
        }
        bindings.insert(binding);
    }
    debug!(
        "Query {} answered with {} bindings",
        query_atom.symbol,
        bindings.len()
    );
    Ok(bindings.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecule::{PRED_HAS_INT_VALUE, PRED_HAS_STRING_VALUE, PRED_HAS_VALUE};

    const NS: &str = "http://example.org/";

    fn ex(local: &str) -> Term {
        Term::identifier(format!("{}{}", NS, local))
    }

    fn var(name: &str) -> Term {
        Term::variable(name)
    }

    fn kb() -> RuleSet {
        let mut rules = RuleSet::new(NS);
        rules.add(Rule::fact(Molecule::new(ex("anna"), ex("hasParent"), ex("john"))));
        rules.add(Rule::fact(Molecule::new(ex("anna"), ex("hasParent"), ex("mary"))));
        rules.add(Rule::fact(Molecule::new(ex("john"), ex("hasAge"), Term::Int(40))));
        rules.add(Rule::fact(Molecule::new(ex("john"), ex("hasName"), Term::string("John"))));
        rules
    }

    fn query(literals: Vec<QueryLiteral>, vars: &[&str]) -> ConjunctiveQuery {
        ConjunctiveQuery {
            literals,
            result_vars: vars.iter().map(|v| Variable::new(*v)).collect(),
        }
    }

    fn has_value(s: Term, p: Term, o: Term) -> QueryLiteral {
        QueryLiteral::positive(PRED_HAS_VALUE, vec![s, p, o])
    }

    fn facade() -> EvaluatorFacade {
        let mut facade = EvaluatorFacade::new(&ReasonerConfig::default());
        facade.register(NS, &kb()).unwrap();
        facade
    }

    #[test]
    fn test_ground_fact_round_trip() {
        let mut facade = facade();
        let q = query(vec![has_value(ex("anna"), ex("hasParent"), ex("john"))], &[]);
        let result = facade.evaluate(&q, NS).unwrap();
        assert_eq!(result, vec![Binding::new()]);
    }

    #[test]
    fn test_bindings_by_position() {
        let mut facade = facade();
        let q = query(vec![has_value(ex("anna"), ex("hasParent"), var("p"))], &["p"]);
        let result = facade.evaluate(&q, NS).unwrap();
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|b| b.len() == 1));
        assert!(result
            .iter()
            .any(|b| b.get(&Variable::new("p")) == Some(&ex("mary"))));
    }

    #[test]
    fn test_zero_variable_query_counts_derivations() {
        let mut facade = facade();
        let q = query(vec![has_value(ex("anna"), ex("hasParent"), var("p"))], &[]);
        assert_eq!(facade.evaluate(&q, NS).unwrap().len(), 2);
    }

    #[test]
    fn test_typed_facts_use_typed_predicates() {
        let mut facade = facade();
        let untyped = query(vec![has_value(ex("john"), ex("hasAge"), var("a"))], &["a"]);
        assert!(facade.evaluate(&untyped, NS).unwrap().is_empty());

        let typed = query(
            vec![QueryLiteral::positive(
                PRED_HAS_INT_VALUE,
                vec![ex("john"), ex("hasAge"), var("a")],
            )],
            &["a"],
        );
        let result = facade.evaluate(&typed, NS).unwrap();
        assert_eq!(result[0][&Variable::new("a")], Term::Int(40));
    }

    #[test]
    fn test_caching_contract() {
        let mut facade = facade();
        let q = query(vec![has_value(ex("anna"), ex("hasParent"), var("p"))], &["p"]);
        facade.evaluate(&q, NS).unwrap();
        facade.evaluate(&q, NS).unwrap();
        assert_eq!(facade.stats().fixpoint_runs, 1);
        assert_eq!(facade.stats().executor_rebuilds, 1);
        assert!(facade.stats().last_fixpoint.is_some());
    }

    #[test]
    fn test_conjunctive_query_memoized() {
        let mut facade = facade();
        let q = query(
            vec![
                has_value(ex("anna"), ex("hasParent"), var("p")),
                QueryLiteral::positive(PRED_HAS_STRING_VALUE, vec![var("p"), ex("hasName"), var("n")]),
            ],
            &["p", "n"],
        );
        let first = facade.evaluate(&q, NS).unwrap();
        let second = facade.evaluate(&q, NS).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0][&Variable::new("n")], Term::string("John"));
        assert_eq!(facade.stats().memo_rules, 1);
        assert_eq!(facade.stats().memo_hits, 1);
        // the replacement rule was added once, then read from the cache
        assert_eq!(facade.stats().executor_rebuilds, 1);
    }

    #[test]
    fn test_zero_variable_conjunction_multiplies_derivations() {
        let mut rules = kb();
        rules.add(Rule::fact(Molecule::new(ex("anna"), ex("hasFather"), ex("john"))));
        // ?x[hasParent ->> ?y] :- ?x[hasFather ->> ?y]
        rules.add(Rule::implication(
            Molecule::new(var("x"), ex("hasParent"), var("y")),
            vec![Molecule::new(var("x"), ex("hasFather"), var("y"))],
        ));
        let mut facade = EvaluatorFacade::new(&ReasonerConfig::default());
        facade.register(NS, &rules).unwrap();

        let single = query(vec![has_value(ex("anna"), ex("hasParent"), ex("john"))], &[]);
        assert_eq!(facade.evaluate(&single, NS).unwrap().len(), 2);

        let conjunction = query(
            vec![
                has_value(ex("anna"), ex("hasParent"), var("p")),
                QueryLiteral::positive(PRED_HAS_INT_VALUE, vec![var("p"), ex("hasAge"), var("a")]),
            ],
            &[],
        );
        // john is reached two ways and has one age
        assert_eq!(facade.evaluate(&conjunction, NS).unwrap().len(), 2);
    }

    #[test]
    fn test_replacement_symbol_uses_full_digest() {
        let q = query(
            vec![
                has_value(var("x"), ex("hasParent"), var("y")),
                has_value(var("y"), ex("hasParent"), var("z")),
            ],
            &["x", "z"],
        );
        let rule = replacement_rule(&q, Vec::new());
        let digest = blake3::hash(q.to_string().as_bytes());
        assert_eq!(
            rule.head.symbol,
            format!("{}{}", REPLACEMENT_PREFIX, hex::encode(digest.as_bytes()))
        );
        assert_eq!(rule.head.symbol.len(), REPLACEMENT_PREFIX.len() + 64);
    }

    #[test]
    fn test_unknown_namespace() {
        let mut facade = facade();
        let q = query(vec![has_value(var("x"), var("p"), var("y"))], &["x"]);
        assert!(matches!(
            facade.evaluate(&q, "http://elsewhere.org/"),
            Err(Error::UnknownNamespace(_))
        ));
    }

    #[test]
    fn test_anonymous_term_rejected() {
        let mut facade = facade();
        let q = query(vec![has_value(Term::Anonymous, var("p"), var("y"))], &["y"]);
        let err = facade.evaluate(&q, NS).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Translation error: Can't convert a term of type anonymous id"
        );
    }

    #[test]
    fn test_unsafe_builtin_query_is_rolled_back() {
        let mut facade = facade();
        let lt = Builtin::LessThan.iri();
        let bad = query(
            vec![
                has_value(ex("anna"), ex("hasParent"), var("p")),
                QueryLiteral::positive(lt, vec![var("a"), Term::Int(3)]),
            ],
            &["p"],
        );
        assert!(matches!(facade.evaluate(&bad, NS), Err(Error::Evaluator { .. })));

        let good = query(vec![has_value(ex("anna"), ex("hasParent"), var("p"))], &["p"]);
        assert_eq!(facade.evaluate(&good, NS).unwrap().len(), 2);
    }

    #[test]
    fn test_deregister() {
        let mut facade = facade();
        assert!(facade.deregister(NS).unwrap());
        assert!(!facade.deregister(NS).unwrap());
        assert!(!facade.is_registered(NS));
    }

    #[test]
    fn test_shared_program_keeps_other_namespaces() {
        let config = ReasonerConfig {
            partition_by_namespace: false,
            ..ReasonerConfig::default()
        };
        let mut facade = EvaluatorFacade::new(&config);
        facade.register(NS, &kb()).unwrap();

        let other_ns = "http://other.org/";
        let mut other = RuleSet::new(other_ns);
        other.add(Rule::fact(Molecule::new(
            Term::identifier("http://other.org/a"),
            ex("hasParent"),
            Term::identifier("http://other.org/b"),
        )));
        facade.register(other_ns, &other).unwrap();

        let q = query(vec![has_value(var("c"), ex("hasParent"), var("p"))], &["c", "p"]);
        assert_eq!(facade.evaluate(&q, NS).unwrap().len(), 3);

        facade.deregister(other_ns).unwrap();
        assert_eq!(facade.evaluate(&q, NS).unwrap().len(), 2);
    }

    #[test]
    fn test_search_query_for_var_descends_into_constructs() {
        let atom = EvalAtom::new(
            "q",
            vec![
                EvalTerm::Iri("urn:a".into()),
                EvalTerm::Construct {
                    functor: "f".into(),
                    args: vec![EvalTerm::Int(1), EvalTerm::Var("x".into())],
                },
            ],
        );
        assert_eq!(search_query_for_var(&atom, "x"), Some(vec![1, 1]));
        assert_eq!(search_query_for_var(&atom, "y"), None);

        let tuple = vec![
            EvalTerm::Iri("urn:a".into()),
            EvalTerm::Construct {
                functor: "f".into(),
                args: vec![EvalTerm::Int(1), EvalTerm::Str("v".into())],
            },
        ];
        assert_eq!(term_at(&tuple, &[1, 1]), Some(&EvalTerm::Str("v".into())));
        assert_eq!(term_at(&tuple, &[0, 1]), None);
    }

    #[test]
    fn test_ambiguous_rule_expansion() {
        let mut rules = kb();
        // ?x[related ->> ?v] :- ?x[?p ->> ?v]
        rules.add(Rule::implication(
            Molecule::new(var("x"), ex("related"), var("v")),
            vec![Molecule::new(var("x"), var("p"), var("v"))],
        ));
        let facade = EvaluatorFacade::new(&ReasonerConfig::default());
        let compiled = facade.lower(&rules).unwrap();
        assert_eq!(compiled.rules.len(), 5);
        assert!(compiled
            .rules
            .iter()
            .any(|r| r.head.symbol == PRED_HAS_INT_VALUE && r.body[0].to_string().starts_with(PRED_HAS_INT_VALUE)));

        let generic = EvaluatorFacade::new(&ReasonerConfig {
            type_expansion: TypeExpansion::GenericOnly,
            ..ReasonerConfig::default()
        });
        assert_eq!(generic.lower(&rules).unwrap().rules.len(), 1);
    }
}
