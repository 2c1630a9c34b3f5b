//! Vocabulary constants and compact-name handling.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::term::Iri;
use crate::RdfError;

pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
pub const DCAT: &str = "http://www.w3.org/ns/dcat#";
pub const DCT: &str = "http://purl.org/dc/terms/";
pub const OWL: &str = "http://www.w3.org/2002/07/owl#";
pub const SKOS: &str = "http://www.w3.org/2004/02/skos/core#";
pub const FOAF: &str = "http://xmlns.com/foaf/0.1/";
pub const VCARD: &str = "http://www.w3.org/2006/vcard/ns#";
pub const SH: &str = "http://www.w3.org/ns/shacl#";
pub const ADMS: &str = "http://www.w3.org/ns/adms#";
pub const SNUM: &str = "http://snum.scenari-community.org/Metadata/Vocabulaire/#";
pub const PLUME: &str = "http://registre.data.developpement-durable.gouv.fr/plume/";

pub mod plume {
    /// Description of one field of the described table.
    pub const COLUMN: &str = "http://registre.data.developpement-durable.gouv.fr/plume/column";
}

pub mod rdf {
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
}

pub mod rdfs {
    pub const RESOURCE: &str = "http://www.w3.org/2000/01/rdf-schema#Resource";
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
}

pub mod xsd {
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const DATE: &str = "http://www.w3.org/2001/XMLSchema#date";
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
    pub const TIME: &str = "http://www.w3.org/2001/XMLSchema#time";
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    pub const DURATION: &str = "http://www.w3.org/2001/XMLSchema#duration";
}

pub mod dcat {
    pub const DATASET: &str = "http://www.w3.org/ns/dcat#Dataset";
    pub const CONTACT_POINT: &str = "http://www.w3.org/ns/dcat#contactPoint";
    pub const KEYWORD: &str = "http://www.w3.org/ns/dcat#keyword";
    pub const THEME: &str = "http://www.w3.org/ns/dcat#theme";
    pub const LANDING_PAGE: &str = "http://www.w3.org/ns/dcat#landingPage";
}

pub mod dct {
    pub const TITLE: &str = "http://purl.org/dc/terms/title";
    pub const DESCRIPTION: &str = "http://purl.org/dc/terms/description";
    pub const IDENTIFIER: &str = "http://purl.org/dc/terms/identifier";
    pub const MODIFIED: &str = "http://purl.org/dc/terms/modified";
    pub const ACCESS_RIGHTS: &str = "http://purl.org/dc/terms/accessRights";
    pub const PUBLISHER: &str = "http://purl.org/dc/terms/publisher";
    pub const RIGHTS_STATEMENT: &str = "http://purl.org/dc/terms/RightsStatement";
    pub const LICENSE: &str = "http://purl.org/dc/terms/license";
}

pub mod vcard {
    pub const KIND: &str = "http://www.w3.org/2006/vcard/ns#Kind";
    pub const FN: &str = "http://www.w3.org/2006/vcard/ns#fn";
    pub const HAS_EMAIL: &str = "http://www.w3.org/2006/vcard/ns#hasEmail";
    pub const HAS_TELEPHONE: &str = "http://www.w3.org/2006/vcard/ns#hasTelephone";
}

pub mod foaf {
    pub const AGENT: &str = "http://xmlns.com/foaf/0.1/Agent";
    pub const NAME: &str = "http://xmlns.com/foaf/0.1/name";
}

pub mod owl {
    pub const THING: &str = "http://www.w3.org/2002/07/owl#Thing";
}

pub mod sh {
    pub const LITERAL: &str = "http://www.w3.org/ns/shacl#Literal";
    pub const IRI: &str = "http://www.w3.org/ns/shacl#IRI";
    pub const BLANK_NODE: &str = "http://www.w3.org/ns/shacl#BlankNode";
    pub const BLANK_NODE_OR_IRI: &str = "http://www.w3.org/ns/shacl#BlankNodeOrIRI";
}

/// Prefix table used to expand `prefix:local` names and compact IRIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrefixMap {
    prefixes: BTreeMap<String, String>,
}

impl Default for PrefixMap {
    fn default() -> Self {
        let mut map = Self::empty();
        for (prefix, namespace) in [
            ("rdf", RDF),
            ("rdfs", RDFS),
            ("xsd", XSD),
            ("dcat", DCAT),
            ("dct", DCT),
            ("owl", OWL),
            ("skos", SKOS),
            ("foaf", FOAF),
            ("vcard", VCARD),
            ("sh", SH),
            ("adms", ADMS),
            ("snum", SNUM),
            ("plume", PLUME),
        ] {
            map.bind(prefix, namespace);
        }
        map
    }
}

impl PrefixMap {
    /// A map without any binding.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            prefixes: BTreeMap::new(),
        }
    }

    /// Bind `prefix` to `namespace`, replacing any previous binding.
    pub fn bind(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Namespace bound to `prefix`, if any.
    #[must_use]
    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// Expand a compact name (`dct:title`) or an angle-bracketed IRI.
    pub fn expand(&self, name: &str) -> Result<Iri, RdfError> {
        let name = name.trim();
        if let Some(inner) = name.strip_prefix('<').and_then(|rest| rest.strip_suffix('>')) {
            return Iri::parse(inner);
        }
        let Some((prefix, local)) = name.split_once(':') else {
            return Err(RdfError::UnknownPrefix {
                prefix: name.to_string(),
            });
        };
        match self.prefixes.get(prefix) {
            Some(namespace) => Iri::parse(format!("{namespace}{local}")),
            None => Err(RdfError::UnknownPrefix {
                prefix: prefix.to_string(),
            }),
        }
    }

    /// Compact an IRI with the longest matching namespace, or wrap it in
    /// angle brackets when no namespace matches.
    #[must_use]
    pub fn compact(&self, iri: &Iri) -> String {
        let value = iri.as_str();
        let best = self
            .prefixes
            .iter()
            .filter(|(_, namespace)| {
                value.len() > namespace.len() && value.starts_with(namespace.as_str())
            })
            .max_by_key(|(_, namespace)| namespace.len());
        match best {
            Some((prefix, namespace)) => format!("{prefix}:{}", &value[namespace.len()..]),
            None => format!("<{value}>"),
        }
    }
}
