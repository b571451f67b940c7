//! Configuration for the reasoner.

use crate::error::{Error, Result};
use crate::regime::EntailmentRegime;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Namespace used until an ontology is registered.
pub const DEFAULT_NAMESPACE: &str = "http://www.example.org/reasoner#";

/// Main configuration for an `RdfsReasoner`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasonerConfig {
    /// Entailment regime used when compiling ontologies.
    pub regime: EntailmentRegime,
    /// Namespace reported before any registration.
    pub default_namespace: String,
    /// How RDF literals are mapped onto value terms.
    pub literal_typing: LiteralTyping,
    /// How molecules without a static type are expanded.
    pub type_expansion: TypeExpansion,
    /// Settings handed to the bundled evaluator.
    pub evaluator: EvaluatorConfig,
    /// Keep one evaluator program per registered namespace.
    pub partition_by_namespace: bool,
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            regime: EntailmentRegime::Rdfs,
            default_namespace: DEFAULT_NAMESPACE.to_string(),
            literal_typing: LiteralTyping::Declared,
            type_expansion: TypeExpansion::PerType,
            evaluator: EvaluatorConfig::default(),
            partition_by_namespace: true,
        }
    }
}

impl ReasonerConfig {
    /// Default settings for the given regime.
    pub fn for_regime(regime: EntailmentRegime) -> Self {
        Self {
            regime,
            ..Self::default()
        }
    }

    /// Settings that reproduce the legacy behaviour: lexical literal sniffing
    /// and one program shared by every namespace.
    pub fn compatibility() -> Self {
        Self {
            literal_typing: LiteralTyping::Lexical,
            partition_by_namespace: false,
            ..Self::default()
        }
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serializes the configuration to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks the values are usable.
    pub fn validate(&self) -> Result<()> {
        if self.default_namespace.is_empty() {
            return Err(Error::Config("default_namespace must not be empty".to_string()));
        }
        if self.evaluator.max_iterations == 0 {
            return Err(Error::Config("evaluator.max_iterations must be positive".to_string()));
        }
        Ok(())
    }
}

/// How the lexical form of an RDF literal becomes a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LiteralTyping {
    /// Dispatch on the literal's declared XSD datatype.
    #[default]
    Declared,
    /// Ignore the datatype: an absolute-IRI-shaped lexical form becomes an
    /// identifier, an integer-shaped one an integer, anything else a string.
    Lexical,
}

/// Expansion policy for molecules whose value type cannot be known statically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TypeExpansion {
    /// One variant per value type plus one generic variant.
    #[default]
    PerType,
    /// Only the generic `f-logic-has-value` variant; typed facts become invisible
    /// to fully variable patterns.
    GenericOnly,
}

/// Configuration for the in-memory evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Upper bound on fixpoint rounds before evaluation is abandoned.
    pub max_iterations: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ReasonerConfig::default();
        assert_eq!(config.regime, EntailmentRegime::Rdfs);
        assert_eq!(config.literal_typing, LiteralTyping::Declared);
        assert!(config.partition_by_namespace);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_compatibility_config() {
        let config = ReasonerConfig::compatibility();
        assert_eq!(config.literal_typing, LiteralTyping::Lexical);
        assert!(!config.partition_by_namespace);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = ReasonerConfig::from_json(r#"{ "regime": "ExtensionalRdfs" }"#).unwrap();
        assert_eq!(config.regime, EntailmentRegime::ExtensionalRdfs);
        assert_eq!(config.evaluator.max_iterations, 10_000);
        assert_eq!(config.default_namespace, DEFAULT_NAMESPACE);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = ReasonerConfig::from_json(r#"{ "evaluator": { "max_iterations": 0 } }"#);
        assert!(matches!(err, Err(Error::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "regime": "Simple", "literal_typing": "Lexical", "partition_by_namespace": false }}"#
        )
        .unwrap();

        let config = ReasonerConfig::load(file.path()).unwrap();
        assert_eq!(config.regime, EntailmentRegime::Simple);
        assert_eq!(config.literal_typing, LiteralTyping::Lexical);
        assert!(!config.partition_by_namespace);
    }
}
