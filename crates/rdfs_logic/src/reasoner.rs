//! The reasoner API.

use crate::config::ReasonerConfig;
use crate::error::{Error, Result};
use crate::evaluator::{EvaluatorFactory, MemoryEvaluator};
use crate::expr::LogicalExpression;
use crate::facade::{Binding, EvaluatorFacade, FacadeStats};
use crate::molecule::RuleSet;
use crate::parser::QueryParser;
use crate::query::QueryTransformer;
use crate::regime::{EntailmentRegime, RegimeCompiler};
use indexmap::{IndexMap, IndexSet};
use log::info;
use rdfs_graph::{Graph, NamespaceMap};

/// Registers RDF graphs and answers queries over their entailments.
pub trait Reasoner {
    /// Compiles `graph` and registers it under `namespace`, replacing any
    /// knowledge base already registered there.
    fn register_ontology(&mut self, namespace: &str, graph: &Graph) -> Result<()>;

    /// Registers several graphs. All graphs are compiled before any is registered.
    fn register_ontologies(&mut self, ontologies: &IndexMap<String, Graph>) -> Result<()>;

    /// Drops the knowledge base registered under `namespace`.
    fn deregister_ontology(&mut self, namespace: &str) -> Result<()>;

    /// Drops several knowledge bases.
    fn deregister_ontologies(&mut self, namespaces: &[&str]) -> Result<()> {
        namespaces
            .iter()
            .try_for_each(|ns| self.deregister_ontology(ns))
    }

    /// Answers `query` against the knowledge base of `namespace`.
    fn execute_query(&mut self, namespace: &str, query: &LogicalExpression) -> Result<Vec<Binding>>;

    /// Parses and answers a textual query. Bare names resolve against `namespace`.
    fn execute_query_str(&mut self, namespace: &str, query: &str) -> Result<Vec<Binding>>;

    /// The namespace of the last registered ontology, or the configured default.
    fn default_namespace(&self) -> &str;

    /// The entailment regime applied at registration.
    fn regime(&self) -> EntailmentRegime;

    /// Entailment checks between logical expressions are not offered.
    fn entails(&mut self, namespace: &str, _expr: &LogicalExpression) -> Result<bool> {
        Err(Error::Unsupported(format!(
            "entailment checks are not available (namespace {})",
            namespace
        )))
    }

    /// Boolean ground queries are not offered; ask a query without free variables instead.
    fn execute_ground_query(&mut self, namespace: &str, _query: &LogicalExpression) -> Result<bool> {
        Err(Error::Unsupported(format!(
            "ground query execution is not available (namespace {})",
            namespace
        )))
    }
}

/// A [`Reasoner`] compiling graphs under one entailment regime and evaluating
/// them with an in-process Datalog evaluator.
///
/// # Examples
///
/// ```
/// use rdfs_logic::{EntailmentRegime, Reasoner, ReasonerFactory};
/// use rdfs_graph::{iris, Graph, Triple};
///
/// let ns = "http://example.org/";
/// let graph = Graph::from_triples(vec![
///     Triple::new("http://example.org/Student", iris::RDFS_SUBCLASS_OF, "http://example.org/Person"),
///     Triple::new("http://example.org/anna", iris::RDF_TYPE, "http://example.org/Student"),
/// ])
/// .unwrap();
///
/// let mut reasoner = ReasonerFactory::create(EntailmentRegime::Rdfs).unwrap();
/// reasoner.register_ontology(ns, &graph).unwrap();
/// let people = reasoner.execute_query_str(ns, "?x[rdf:type ->> Person]").unwrap();
/// assert_eq!(people.len(), 1);
/// ```
#[derive(Debug)]
pub struct RdfsReasoner {
    config: ReasonerConfig,
    compiler: RegimeCompiler,
    facade: EvaluatorFacade,
    rule_sets: IndexMap<String, RuleSet>,
    prefixes: NamespaceMap,
    default_namespace: String,
}

impl RdfsReasoner {
    /// Creates a reasoner backed by [`MemoryEvaluator`]s.
    pub fn new(config: ReasonerConfig) -> Result<Self> {
        let evaluator = config.evaluator.clone();
        Self::with_factory(
            config,
            Box::new(move || Box::new(MemoryEvaluator::with_config(&evaluator))),
        )
    }

    /// Creates a reasoner drawing its evaluators from `factory`.
    pub fn with_factory(config: ReasonerConfig, factory: EvaluatorFactory) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            compiler: RegimeCompiler::new(config.regime, config.literal_typing),
            facade: EvaluatorFacade::with_factory(&config, factory),
            rule_sets: IndexMap::new(),
            prefixes: NamespaceMap::with_defaults(),
            default_namespace: config.default_namespace.clone(),
            config,
        })
    }

    /// The configuration the reasoner was built with.
    pub fn config(&self) -> &ReasonerConfig {
        &self.config
    }

    /// Evaluation counters of the underlying facade.
    pub fn stats(&self) -> &FacadeStats {
        self.facade.stats()
    }

    /// The rule set compiled for `namespace`.
    pub fn rule_set(&self, namespace: &str) -> Option<&RuleSet> {
        self.rule_sets.get(namespace)
    }

    /// The registered namespaces in registration order.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.rule_sets.keys().map(String::as_str)
    }

    /// The prefixes available to textual queries.
    pub fn prefixes(&self) -> &NamespaceMap {
        &self.prefixes
    }

    /// Mutable access to the query prefixes, for declaring new ones.
    pub fn prefixes_mut(&mut self) -> &mut NamespaceMap {
        &mut self.prefixes
    }

    fn install(&mut self, namespace: &str, rules: RuleSet) -> Result<()> {
        self.facade.register(namespace, &rules)?;
        info!(
            "Registered {} under {} entailment: {} facts, {} rules",
            namespace,
            self.config.regime,
            rules.facts().count(),
            rules.implications().count()
        );
        self.rule_sets.insert(namespace.to_string(), rules);
        self.default_namespace = namespace.to_string();
        Ok(())
    }
}

impl Reasoner for RdfsReasoner {
    fn register_ontology(&mut self, namespace: &str, graph: &Graph) -> Result<()> {
        let rules = self.compiler.compile(graph, namespace)?;
        self.install(namespace, rules)
    }

    fn register_ontologies(&mut self, ontologies: &IndexMap<String, Graph>) -> Result<()> {
        let compiled = ontologies
            .iter()
            .map(|(ns, graph)| Ok((ns.as_str(), self.compiler.compile(graph, ns)?)))
            .collect::<Result<Vec<_>>>()?;
        for (ns, rules) in compiled {
            self.install(ns, rules)?;
        }
        Ok(())
    }

    fn deregister_ontology(&mut self, namespace: &str) -> Result<()> {
        self.facade.deregister(namespace)?;
        if self.rule_sets.shift_remove(namespace).is_some() {
            info!("Deregistered {}", namespace);
        }
        Ok(())
    }

    fn execute_query(&mut self, namespace: &str, query: &LogicalExpression) -> Result<Vec<Binding>> {
        let rules = self
            .rule_sets
            .get(namespace)
            .ok_or_else(|| Error::UnknownNamespace(namespace.to_string()))?;
        let queries = QueryTransformer::new(rules, self.config.type_expansion).transform(query)?;

        if query.free_variables().is_empty() {
            let mut proofs = Vec::new();
            for q in &queries {
                proofs.extend(self.facade.evaluate(q, namespace)?);
            }
            return Ok(proofs);
        }

        let mut results = IndexSet::new();
        for q in &queries {
            results.extend(self.facade.evaluate(q, namespace)?);
        }
        Ok(results.into_iter().collect())
    }

    fn execute_query_str(&mut self, namespace: &str, query: &str) -> Result<Vec<Binding>> {
        let expr = QueryParser::with_namespaces(self.prefixes.clone(), namespace).parse(query)?;
        self.execute_query(namespace, &expr)
    }

    fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    fn regime(&self) -> EntailmentRegime {
        self.config.regime
    }
}

/// Builds reasoners.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReasonerFactory;

impl ReasonerFactory {
    /// A reasoner for `regime` with default settings.
    pub fn create(regime: EntailmentRegime) -> Result<RdfsReasoner> {
        RdfsReasoner::new(ReasonerConfig::for_regime(regime))
    }

    /// A reasoner for the given configuration.
    pub fn create_with_config(config: ReasonerConfig) -> Result<RdfsReasoner> {
        RdfsReasoner::new(config)
    }

    /// A reasoner whose programs run on evaluators produced by `factory`.
    pub fn create_with_evaluator(
        config: ReasonerConfig,
        factory: EvaluatorFactory,
    ) -> Result<RdfsReasoner> {
        RdfsReasoner::with_factory(config, factory)
    }
}
