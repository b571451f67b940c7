//! RDFS Reasoner Demo
//!
//! Registers an ontology, answers a few queries and prints the bindings.

use clap::Parser;
use rdfs_graph::{iris, Graph, RdfTerm, Triple};
use rdfs_logic::{EntailmentRegime, Reasoner, ReasonerConfig, ReasonerFactory, Result};
use std::path::PathBuf;

const FAMILY_NS: &str = "http://www.example.org/family#";

/// RDFS entailment over a Datalog evaluator
#[derive(Parser, Debug)]
#[command(name = "rdfs-reasoner-demo")]
#[command(version)]
#[command(about = "Query an RDF graph under an RDFS entailment regime", long_about = None)]
struct Args {
    /// Entailment regime: simple, rdf, rdfs, erdfs or extended
    #[arg(short, long, default_value = "rdfs")]
    regime: String,

    /// JSON reasoner configuration; overrides --regime
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON-encoded graph to load instead of the built-in family ontology
    #[arg(short, long)]
    graph: Option<PathBuf>,

    /// Namespace to register the graph under
    #[arg(short, long, default_value = FAMILY_NS)]
    namespace: String,

    /// Queries to run; defaults to a few family queries
    #[arg(short, long)]
    query: Vec<String>,

    /// Print the evaluation statistics as JSON
    #[arg(long)]
    stats: bool,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match &args.config {
        Some(path) => ReasonerConfig::load(path)?,
        None => {
            let regime = EntailmentRegime::from_name(&args.regime).ok_or_else(|| {
                rdfs_logic::Error::Config(format!("unknown regime {}", args.regime))
            })?;
            ReasonerConfig::for_regime(regime)
        }
    };

    let graph = match &args.graph {
        Some(path) => Graph::load(path)?,
        None => family_ontology()?,
    };

    let queries = if args.query.is_empty() {
        vec![
            "?x[rdf:type ->> Person]".to_string(),
            "?x[hasParent ->> ?y]".to_string(),
            "?x[hasAge ->> ?a] and wsml:greaterThan(?a, 30)".to_string(),
            "anna[?p ->> ?v]".to_string(),
        ]
    } else {
        args.query.clone()
    };

    let mut reasoner = ReasonerFactory::create_with_config(config)?;
    log::info!(
        "Registering {} triples under {} entailment",
        graph.len(),
        reasoner.regime()
    );
    reasoner.register_ontology(&args.namespace, &graph)?;
    reasoner.prefixes_mut().add("ns", &args.namespace);

    for query in &queries {
        let bindings = reasoner.execute_query_str(&args.namespace, query)?;
        println!("{}  ({} results)", query, bindings.len());
        for binding in &bindings {
            let row: Vec<String> = binding
                .iter()
                .map(|(var, value)| match value.as_iri() {
                    Some(iri) => format!("{} = {}", var, reasoner.prefixes().compact(iri)),
                    None => format!("{} = {}", var, value),
                })
                .collect();
            println!("    {}", row.join(", "));
        }
    }

    if args.stats {
        println!("{}", serde_json::to_string_pretty(reasoner.stats())?);
    }

    reasoner.deregister_ontology(&args.namespace)?;
    Ok(())
}

/// A small family ontology exercising subclass, subproperty, domain and range inference.
fn family_ontology() -> Result<Graph> {
    let f = |local: &str| format!("{}{}", FAMILY_NS, local);
    let graph = Graph::from_triples(vec![
        Triple::new(f("Man"), iris::RDFS_SUBCLASS_OF, f("Person")),
        Triple::new(f("Woman"), iris::RDFS_SUBCLASS_OF, f("Person")),
        Triple::new(f("hasFather"), iris::RDFS_SUBPROPERTY_OF, f("hasParent")),
        Triple::new(f("hasMother"), iris::RDFS_SUBPROPERTY_OF, f("hasParent")),
        Triple::new(f("hasParent"), iris::RDFS_DOMAIN, f("Person")),
        Triple::new(f("hasParent"), iris::RDFS_RANGE, f("Person")),
        Triple::new(f("john"), iris::RDF_TYPE, f("Man")),
        Triple::new(f("mary"), iris::RDF_TYPE, f("Woman")),
        Triple::new(f("anna"), f("hasFather"), f("john")),
        Triple::new(f("anna"), f("hasMother"), f("mary")),
        Triple::new(f("anna"), f("hasAge"), RdfTerm::integer(12)),
        Triple::new(f("john"), f("hasAge"), RdfTerm::integer(41)),
        Triple::new(f("mary"), f("hasAge"), RdfTerm::integer(39)),
        Triple::new(f("anna"), f("hasName"), RdfTerm::string("Anna")),
    ])?;
    Ok(graph)
}
