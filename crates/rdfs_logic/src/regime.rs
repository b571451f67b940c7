//! Entailment regimes and the compiler that turns a graph into a rule set.
//!
//! A regime selects a chain of auxiliary rule generators that run after the
//! base fact translation:
//!
//! | Regime            | Generators                 |
//! |-------------------|----------------------------|
//! | `Simple`          | none                       |
//! | `Rdf`             | rdf                        |
//! | `Rdfs`            | rdf, rdfs                  |
//! | `ExtensionalRdfs` | rdf, rdfs, erdfs           |
//! | `Extended`        | rdf, rdfs, erdfs, iowl     |
//!
//! `ExtensionalRdfs` additionally validates the graph with the
//! [`VocabularyValidator`] before any rule is produced.

use crate::config::LiteralTyping;
use crate::error::Result;
use crate::molecule::{Molecule, Rule, RuleSet};
use crate::term::Term;
use crate::translator::TripleTranslator;
use crate::validator::VocabularyValidator;
use log::{debug, info};
use rdfs_graph::{iris, Graph};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The strength of inference applied to a registered graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntailmentRegime {
    /// Plain triple translation.
    Simple,
    /// RDF entailment.
    Rdf,
    /// RDFS entailment.
    Rdfs,
    /// Extensional RDFS entailment.
    ExtensionalRdfs,
    /// Open-world extension point; currently adds no rules beyond extensional RDFS.
    Extended,
}

/// A named auxiliary rule generator.
#[derive(Clone, Copy)]
pub struct RuleGenerator {
    /// Name used in logs.
    pub name: &'static str,
    /// Produces the generator's fixed rule templates.
    pub rules: fn() -> Vec<Rule>,
}

impl fmt::Debug for RuleGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleGenerator").field("name", &self.name).finish()
    }
}

const RDF: RuleGenerator = RuleGenerator {
    name: "rdf",
    rules: rdf_rules,
};
const RDFS: RuleGenerator = RuleGenerator {
    name: "rdfs",
    rules: rdfs_rules,
};
const ERDFS: RuleGenerator = RuleGenerator {
    name: "erdfs",
    rules: extensional_rdfs_rules,
};
const IOWL: RuleGenerator = RuleGenerator {
    name: "iowl",
    rules: iowl_rules,
};

static SIMPLE_CHAIN: [RuleGenerator; 0] = [];
static RDF_CHAIN: [RuleGenerator; 1] = [RDF];
static RDFS_CHAIN: [RuleGenerator; 2] = [RDF, RDFS];
static ERDFS_CHAIN: [RuleGenerator; 3] = [RDF, RDFS, ERDFS];
static EXTENDED_CHAIN: [RuleGenerator; 4] = [RDF, RDFS, ERDFS, IOWL];

impl EntailmentRegime {
    /// Every regime, weakest first.
    pub const ALL: [EntailmentRegime; 5] = [
        EntailmentRegime::Simple,
        EntailmentRegime::Rdf,
        EntailmentRegime::Rdfs,
        EntailmentRegime::ExtensionalRdfs,
        EntailmentRegime::Extended,
    ];

    /// The auxiliary rule generators this regime runs, in order.
    pub fn generators(&self) -> &'static [RuleGenerator] {
        match self {
            EntailmentRegime::Simple => &SIMPLE_CHAIN,
            EntailmentRegime::Rdf => &RDF_CHAIN,
            EntailmentRegime::Rdfs => &RDFS_CHAIN,
            EntailmentRegime::ExtensionalRdfs => &ERDFS_CHAIN,
            EntailmentRegime::Extended => &EXTENDED_CHAIN,
        }
    }

    /// Whether graphs must pass the vocabulary validator first.
    pub fn requires_validation(&self) -> bool {
        matches!(self, EntailmentRegime::ExtensionalRdfs)
    }

    /// Parses a regime name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "simple" => Some(EntailmentRegime::Simple),
            "rdf" => Some(EntailmentRegime::Rdf),
            "rdfs" => Some(EntailmentRegime::Rdfs),
            "erdfs" | "extensional-rdfs" | "extensionalrdfs" => {
                Some(EntailmentRegime::ExtensionalRdfs)
            }
            "extended" | "iowl" => Some(EntailmentRegime::Extended),
            _ => None,
        }
    }
}

impl fmt::Display for EntailmentRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntailmentRegime::Simple => "simple",
            EntailmentRegime::Rdf => "rdf",
            EntailmentRegime::Rdfs => "rdfs",
            EntailmentRegime::ExtensionalRdfs => "erdfs",
            EntailmentRegime::Extended => "extended",
        };
        f.write_str(name)
    }
}

/// Compiles graphs into rule sets under one regime.
#[derive(Debug, Clone, Copy)]
pub struct RegimeCompiler {
    regime: EntailmentRegime,
    typing: LiteralTyping,
}

impl RegimeCompiler {
    /// Creates a compiler.
    pub fn new(regime: EntailmentRegime, typing: LiteralTyping) -> Self {
        Self { regime, typing }
    }

    /// The regime this compiler applies.
    pub fn regime(&self) -> EntailmentRegime {
        self.regime
    }

    /// Translates every statement of `graph` and appends the regime's auxiliary rules.
    ///
    /// # Arguments
    ///
    /// * `graph` - The ontology to compile.
    /// * `namespace` - The ontology namespace; skolem constants are minted under it.
    ///
    /// # Returns
    ///
    /// The compiled `RuleSet`, or [`crate::Error::NonStandardVocabulary`] when the
    /// regime validates and the graph misuses the RDFS vocabulary.
    pub fn compile(&self, graph: &Graph, namespace: &str) -> Result<RuleSet> {
        if self.regime.requires_validation() {
            VocabularyValidator::new().validate(graph)?;
        }

        let mut translator = TripleTranslator::new(namespace, self.typing)?;
        let mut rules = RuleSet::new(namespace);
        for triple in graph {
            rules.add(translator.translate(triple));
        }
        let facts = rules.len();

        for generator in self.regime.generators() {
            let generated = (generator.rules)();
            debug!(
                "Regime {} adds {} {} rules",
                self.regime,
                generated.len(),
                generator.name
            );
            rules.extend(generated);
        }

        info!(
            "Compiled {} under {} entailment: {} facts, {} auxiliary rules, {} blank nodes",
            namespace,
            self.regime,
            facts,
            rules.len() - facts,
            translator.blank_nodes().len()
        );
        Ok(rules)
    }
}

fn v(name: &str) -> Term {
    Term::variable(name)
}

fn i(iri: &str) -> Term {
    Term::identifier(iri)
}

fn m(left: Term, predicate: Term, right: Term) -> Molecule {
    Molecule::new(left, predicate, right)
}

fn rule(head: Molecule, body: Vec<Molecule>) -> Rule {
    Rule::implication(head, body)
}

/// Anything used as a predicate is a property.
pub fn rdf_rules() -> Vec<Rule> {
    vec![rule(
        m(v("x"), i(iris::RDF_TYPE), i(iris::RDF_PROPERTY)),
        vec![m(v("y"), v("x"), v("u"))],
    )]
}

/// The RDFS entailment templates.
pub fn rdfs_rules() -> Vec<Rule> {
    let ty = || i(iris::RDF_TYPE);
    let sub_prop = || i(iris::RDFS_SUBPROPERTY_OF);
    let sub_class = || i(iris::RDFS_SUBCLASS_OF);

    vec![
        // Both sides of every statement are resources.
        rule(
            m(v("x"), ty(), i(iris::RDFS_RESOURCE)),
            vec![m(v("x"), v("y"), v("u"))],
        ),
        rule(
            m(v("u"), ty(), i(iris::RDFS_RESOURCE)),
            vec![m(v("x"), v("y"), v("u"))],
        ),
        // Domain and range typing.
        rule(
            m(v("u"), ty(), v("y")),
            vec![
                m(v("x"), i(iris::RDFS_DOMAIN), v("y")),
                m(v("u"), v("x"), v("v")),
            ],
        ),
        rule(
            m(v("v"), ty(), v("y")),
            vec![
                m(v("x"), i(iris::RDFS_RANGE), v("y")),
                m(v("u"), v("x"), v("v")),
            ],
        ),
        // Container membership properties specialise rdfs:member.
        rule(
            m(v("x"), sub_prop(), i(iris::RDFS_MEMBER)),
            vec![m(
                v("x"),
                ty(),
                i(iris::RDFS_CONTAINER_MEMBERSHIP_PROPERTY),
            )],
        ),
        // Sub-properties.
        rule(
            m(v("x"), sub_prop(), v("x")),
            vec![m(v("x"), ty(), i(iris::RDF_PROPERTY))],
        ),
        rule(
            m(v("x"), sub_prop(), v("u")),
            vec![m(v("x"), sub_prop(), v("y")), m(v("y"), sub_prop(), v("u"))],
        ),
        rule(
            m(v("x"), ty(), i(iris::RDF_PROPERTY)),
            vec![m(v("x"), sub_prop(), v("y"))],
        ),
        rule(
            m(v("y"), ty(), i(iris::RDF_PROPERTY)),
            vec![m(v("x"), sub_prop(), v("y"))],
        ),
        rule(
            m(v("u"), v("y"), v("v")),
            vec![m(v("x"), sub_prop(), v("y")), m(v("u"), v("x"), v("v"))],
        ),
        // Sub-classes.
        rule(
            m(v("x"), sub_class(), i(iris::RDFS_RESOURCE)),
            vec![m(v("x"), ty(), i(iris::RDFS_CLASS))],
        ),
        rule(
            m(v("x"), sub_class(), v("x")),
            vec![m(v("x"), ty(), i(iris::RDFS_CLASS))],
        ),
        rule(
            m(v("x"), sub_class(), v("u")),
            vec![m(v("x"), sub_class(), v("y")), m(v("y"), sub_class(), v("u"))],
        ),
        rule(
            m(v("x"), ty(), i(iris::RDFS_CLASS)),
            vec![m(v("x"), sub_class(), v("y"))],
        ),
        rule(
            m(v("y"), ty(), i(iris::RDFS_CLASS)),
            vec![m(v("x"), sub_class(), v("y"))],
        ),
        rule(
            m(v("u"), ty(), v("y")),
            vec![m(v("x"), sub_class(), v("y")), m(v("u"), ty(), v("x"))],
        ),
    ]
}

/// Domain and range propagation along the class and property hierarchies.
pub fn extensional_rdfs_rules() -> Vec<Rule> {
    let sub_prop = || i(iris::RDFS_SUBPROPERTY_OF);
    let sub_class = || i(iris::RDFS_SUBCLASS_OF);
    let domain = || i(iris::RDFS_DOMAIN);
    let range = || i(iris::RDFS_RANGE);

    vec![
        rule(
            m(v("u"), domain(), v("y")),
            vec![m(v("u"), domain(), v("x")), m(v("x"), sub_class(), v("y"))],
        ),
        rule(
            m(v("u"), range(), v("y")),
            vec![m(v("u"), range(), v("x")), m(v("x"), sub_class(), v("y"))],
        ),
        rule(
            m(v("x"), domain(), v("u")),
            vec![m(v("y"), domain(), v("u")), m(v("x"), sub_prop(), v("y"))],
        ),
        rule(
            m(v("x"), range(), v("u")),
            vec![m(v("y"), range(), v("u")), m(v("x"), sub_prop(), v("y"))],
        ),
    ]
}

/// Open-world extension rules. Intentionally empty for now.
pub fn iowl_rules() -> Vec<Rule> {
    Vec::new()
}
