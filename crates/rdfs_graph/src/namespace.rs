//! RDF namespace and prefix management
//!
//! Provides the RDF, RDFS and XSD vocabularies the reasoner is built around,
//! plus a prefix map for expanding `prefix:local` names and compacting IRIs
//! back for display.

use crate::error::{Error, Result};
use indexmap::IndexMap;

/// Standard RDF namespace
pub const PREFIX_RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
/// RDF Schema namespace
pub const PREFIX_RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
/// XML Schema datatypes namespace
pub const PREFIX_XSD: &str = "http://www.w3.org/2001/XMLSchema#";
/// WSML syntax namespace, home of the builtin predicates
pub const PREFIX_WSML: &str = "http://www.wsmo.org/wsml/wsml-syntax#";

/// A map of namespace prefixes, kept in declaration order.
#[derive(Debug, Clone, Default)]
pub struct NamespaceMap {
    prefixes: IndexMap<String, String>,
}

impl NamespaceMap {
    /// Create an empty namespace map
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a namespace map with the rdf, rdfs, xsd and wsml prefixes
    pub fn with_defaults() -> Self {
        let mut map = Self::new();
        map.add("rdf", PREFIX_RDF);
        map.add("rdfs", PREFIX_RDFS);
        map.add("xsd", PREFIX_XSD);
        map.add("wsml", PREFIX_WSML);
        map
    }

    /// Add (or replace) a namespace
    pub fn add(&mut self, prefix: &str, iri: &str) {
        self.prefixes.insert(prefix.to_string(), iri.to_string());
    }

    /// Expand a prefixed name to a full IRI.
    ///
    /// Fails with [`Error::UnknownPrefix`] when the prefix was never declared.
    pub fn expand(&self, prefixed: &str) -> Result<String> {
        let (prefix, local) = prefixed
            .split_once(':')
            .ok_or_else(|| Error::InvalidTerm(format!("not a prefixed name: {}", prefixed)))?;
        self.prefixes
            .get(prefix)
            .map(|base| format!("{}{}", base, local))
            .ok_or_else(|| Error::UnknownPrefix(prefix.to_string()))
    }

    /// Compact an IRI to prefixed form, preferring the longest matching base IRI.
    pub fn compact(&self, iri: &str) -> String {
        self.prefixes
            .iter()
            .filter(|(_, base)| iri.starts_with(base.as_str()))
            .max_by_key(|(_, base)| base.len())
            .map(|(prefix, base)| format!("{}:{}", prefix, &iri[base.len()..]))
            .unwrap_or_else(|| iri.to_string())
    }
}

/// Well-known IRIs
pub mod iris {
    // RDF vocabulary
    pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const RDF_PROPERTY: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Property";
    pub const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

    // RDFS vocabulary
    pub const RDFS_RESOURCE: &str = "http://www.w3.org/2000/01/rdf-schema#Resource";
    pub const RDFS_CLASS: &str = "http://www.w3.org/2000/01/rdf-schema#Class";
    pub const RDFS_LITERAL: &str = "http://www.w3.org/2000/01/rdf-schema#Literal";
    pub const RDFS_SUBCLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
    pub const RDFS_SUBPROPERTY_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subPropertyOf";
    pub const RDFS_DOMAIN: &str = "http://www.w3.org/2000/01/rdf-schema#domain";
    pub const RDFS_RANGE: &str = "http://www.w3.org/2000/01/rdf-schema#range";
    pub const RDFS_MEMBER: &str = "http://www.w3.org/2000/01/rdf-schema#member";
    pub const RDFS_CONTAINER_MEMBERSHIP_PROPERTY: &str =
        "http://www.w3.org/2000/01/rdf-schema#ContainerMembershipProperty";

    // XSD datatypes
    pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const XSD_INT: &str = "http://www.w3.org/2001/XMLSchema#int";
    pub const XSD_LONG: &str = "http://www.w3.org/2001/XMLSchema#long";
    pub const XSD_SHORT: &str = "http://www.w3.org/2001/XMLSchema#short";
    pub const XSD_NON_NEGATIVE_INTEGER: &str =
        "http://www.w3.org/2001/XMLSchema#nonNegativeInteger";
    pub const XSD_DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
    pub const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    pub const XSD_FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";
    pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

    /// The five schema properties whose placement extensional RDFS restricts.
    pub const RESERVED_PROPERTIES: [&str; 5] = [
        RDF_TYPE,
        RDFS_SUBCLASS_OF,
        RDFS_DOMAIN,
        RDFS_RANGE,
        RDFS_SUBPROPERTY_OF,
    ];

    /// Vocabulary extensional RDFS treats as derivable, forbidden anywhere in a graph.
    pub const CLOSED_VOCABULARY: [&str; 4] = [
        RDFS_CONTAINER_MEMBERSHIP_PROPERTY,
        RDFS_RESOURCE,
        RDFS_CLASS,
        RDF_PROPERTY,
    ];
}
