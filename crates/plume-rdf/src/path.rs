//! Property paths.
//!
//! A path is the chain of predicates leading from the described dataset to a
//! field. Templates and override data are keyed by the compact rendering,
//! e.g. `dcat:contactPoint / vcard:fn`.

use serde::{Deserialize, Serialize};

use crate::RdfError;
use crate::namespace::PrefixMap;
use crate::term::Iri;

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyPath(Vec<Iri>);

impl PropertyPath {
    /// Path of the dataset itself.
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn from_predicates(predicates: Vec<Iri>) -> Self {
        Self(predicates)
    }

    /// This path extended by one predicate.
    #[must_use]
    pub fn child(&self, predicate: &Iri) -> Self {
        let mut predicates = self.0.clone();
        predicates.push(predicate.clone());
        Self(predicates)
    }

    #[must_use]
    pub fn predicates(&self) -> &[Iri] {
        &self.0
    }

    #[must_use]
    pub fn last(&self) -> Option<&Iri> {
        self.0.last()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compact rendering, segments joined by ` / `.
    #[must_use]
    pub fn to_compact(&self, prefixes: &PrefixMap) -> String {
        self.0
            .iter()
            .map(|predicate| prefixes.compact(predicate))
            .collect::<Vec<_>>()
            .join(" / ")
    }

    /// Parse a compact rendering. Slashes inside `<...>` belong to the IRI.
    pub fn parse(raw: &str, prefixes: &PrefixMap) -> Result<Self, RdfError> {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut in_iri = false;
        for c in raw.chars() {
            match c {
                '<' => {
                    in_iri = true;
                    current.push(c);
                }
                '>' => {
                    in_iri = false;
                    current.push(c);
                }
                '/' if !in_iri => segments.push(std::mem::take(&mut current)),
                _ => current.push(c),
            }
        }
        segments.push(current);

        let mut predicates = Vec::with_capacity(segments.len());
        for segment in segments {
            let segment = segment.trim();
            if segment.is_empty() {
                return Err(RdfError::InvalidPath {
                    path: raw.to_string(),
                });
            }
            predicates.push(prefixes.expand(segment)?);
        }
        Ok(Self(predicates))
    }
}
