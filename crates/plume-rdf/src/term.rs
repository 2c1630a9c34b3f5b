//! RDF terms.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::RdfError;
use crate::namespace::{rdf, xsd};

/// Characters that may not appear in an IRI.
const FORBIDDEN_IRI_CHARS: &[char] = &['<', '>', '"', '{', '}', '|', '^', '`', '\\', ' '];

/// Absolute IRI.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iri(String);

impl Iri {
    /// Wrap a string without checking it.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Wrap a string, rejecting characters that cannot appear in an IRI.
    pub fn parse(value: impl Into<String>) -> Result<Self, RdfError> {
        let value = value.into();
        if value.is_empty()
            || value
                .chars()
                .any(|c| FORBIDDEN_IRI_CHARS.contains(&c) || c.is_control())
        {
            return Err(RdfError::InvalidIri { iri: value });
        }
        Ok(Self(value))
    }

    /// A fresh `urn:uuid:` IRI.
    #[must_use]
    pub fn random_urn() -> Self {
        Self(Uuid::new_v4().urn().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when this IRI equals `other`.
    #[must_use]
    pub fn is(&self, other: &str) -> bool {
        self.0 == other
    }

    /// Fragment or last path segment.
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.0
            .rsplit(['#', '/', ':'])
            .find(|part| !part.is_empty())
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Iri {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Blank node label, without the `_:` marker.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlankNode(String);

impl BlankNode {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// A blank node with a label that cannot clash with existing ones.
    #[must_use]
    pub fn fresh() -> Self {
        Self(format!("n{}", Uuid::new_v4().simple()))
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.0)
    }
}

/// Literal with an explicit datatype.
///
/// Plain strings are stored as `xsd:string`; language-tagged strings carry
/// `rdf:langString` and a lowercase language tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Literal {
    lexical: String,
    datatype: Iri,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    language: Option<String>,
}

impl Literal {
    /// `xsd:string` literal.
    #[must_use]
    pub fn plain(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: Iri::new(xsd::STRING),
            language: None,
        }
    }

    /// `rdf:langString` literal.
    #[must_use]
    pub fn lang_string(lexical: impl Into<String>, language: &str) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: Iri::new(rdf::LANG_STRING),
            language: Some(language.to_ascii_lowercase()),
        }
    }

    /// Literal of an arbitrary datatype. Passing `rdf:langString` without a
    /// language yields a plain string.
    #[must_use]
    pub fn typed(lexical: impl Into<String>, datatype: Iri) -> Self {
        if datatype.is(rdf::LANG_STRING) {
            return Self::plain(lexical);
        }
        Self {
            lexical: lexical.into(),
            datatype,
            language: None,
        }
    }

    /// `xsd:boolean` literal in canonical form.
    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Self::typed(if value { "true" } else { "false" }, Iri::new(xsd::BOOLEAN))
    }

    #[must_use]
    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    #[must_use]
    pub fn datatype(&self) -> &Iri {
        &self.datatype
    }

    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Same text tagged with another language.
    #[must_use]
    pub fn with_language(&self, language: &str) -> Self {
        Self::lang_string(self.lexical.clone(), language)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lexical)
    }
}

/// Any RDF term.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Term {
    Iri(Iri),
    Blank(BlankNode),
    Literal(Literal),
}

impl Term {
    #[must_use]
    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Self::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_blank(&self) -> Option<&BlankNode> {
        match self {
            Self::Blank(node) => Some(node),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Blank(_))
    }

    /// Text of the term: the IRI, the blank label or the literal's lexical form.
    #[must_use]
    pub fn lexical(&self) -> &str {
        match self {
            Self::Iri(iri) => iri.as_str(),
            Self::Blank(node) => node.label(),
            Self::Literal(literal) => literal.lexical(),
        }
    }

    /// N-Triples rendering of the term.
    #[must_use]
    pub fn to_ntriples(&self) -> String {
        match self {
            Self::Iri(iri) => format!("<{iri}>"),
            Self::Blank(node) => node.to_string(),
            Self::Literal(literal) => {
                let escaped = escape_literal(literal.lexical());
                match literal.language() {
                    Some(language) => format!("\"{escaped}\"@{language}"),
                    None if literal.datatype().is(xsd::STRING) => format!("\"{escaped}\""),
                    None => format!("\"{escaped}\"^^<{}>", literal.datatype()),
                }
            }
        }
    }
}

fn escape_literal(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

impl From<Iri> for Term {
    fn from(value: Iri) -> Self {
        Self::Iri(value)
    }
}

impl From<BlankNode> for Term {
    fn from(value: BlankNode) -> Self {
        Self::Blank(value)
    }
}

impl From<Literal> for Term {
    fn from(value: Literal) -> Self {
        Self::Literal(value)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lexical())
    }
}
