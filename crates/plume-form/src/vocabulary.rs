//! Controlled vocabularies.
//!
//! A source is a concept scheme identified by an IRI. Forms display its
//! concepts by label, in the best language available, and store the
//! concept IRIs.

use std::collections::BTreeMap;

use plume_rdf::Iri;
use plume_tree::{PlumeError, Result};
use serde::{Deserialize, Serialize};

/// Label and concept resolution for the sources of a form.
pub trait Vocabulary {
    /// Label of `source` in the first language of `langlist` that has
    /// one. `None` for unknown sources.
    fn source_label(&self, source: &Iri, langlist: &[String]) -> Option<String>;

    /// Concept of `source` whose label in `language` is `label`.
    fn concept_iri(&self, source: &Iri, language: &str, label: &str) -> Option<Iri>;

    /// Label of `concept` in `language`, falling back to any label.
    fn concept_label(&self, source: &Iri, language: &str, concept: &Iri) -> Option<String>;

    /// First of `sources` holding `concept`.
    fn concept_source(&self, concept: &Iri, sources: &[Iri]) -> Option<Iri>;

    /// Labels of every concept of `source`, sorted, preceded by an empty
    /// entry.
    fn concept_labels(&self, source: &Iri, langlist: &[String]) -> Vec<String>;

    /// Web page describing `concept`, if any.
    fn concept_link(&self, _source: &Iri, _concept: &Iri) -> Option<Iri> {
        None
    }
}

impl<T: Vocabulary + ?Sized> Vocabulary for &T {
    fn source_label(&self, source: &Iri, langlist: &[String]) -> Option<String> {
        (**self).source_label(source, langlist)
    }

    fn concept_iri(&self, source: &Iri, language: &str, label: &str) -> Option<Iri> {
        (**self).concept_iri(source, language, label)
    }

    fn concept_label(&self, source: &Iri, language: &str, concept: &Iri) -> Option<String> {
        (**self).concept_label(source, language, concept)
    }

    fn concept_source(&self, concept: &Iri, sources: &[Iri]) -> Option<Iri> {
        (**self).concept_source(concept, sources)
    }

    fn concept_labels(&self, source: &Iri, langlist: &[String]) -> Vec<String> {
        (**self).concept_labels(source, langlist)
    }

    fn concept_link(&self, source: &Iri, concept: &Iri) -> Option<Iri> {
        (**self).concept_link(source, concept)
    }
}

/// Labels of a term, keyed by language.
pub type Labels = BTreeMap<String, String>;

fn pick<'a>(labels: &'a Labels, langlist: &[String]) -> Option<&'a String> {
    langlist
        .iter()
        .find_map(|language| labels.get(language))
        .or_else(|| labels.values().next())
}

/// One concept of a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub iri: Iri,
    pub labels: Labels,
    #[serde(default)]
    pub link: Option<Iri>,
}

/// One concept scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptScheme {
    pub labels: Labels,
    #[serde(default)]
    pub concepts: Vec<Concept>,
}

impl ConceptScheme {
    fn concept(&self, iri: &Iri) -> Option<&Concept> {
        self.concepts.iter().find(|concept| &concept.iri == iri)
    }
}

/// Vocabulary held in memory, loadable from JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryVocabulary {
    schemes: BTreeMap<Iri, ConceptScheme>,
}

impl MemoryVocabulary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_scheme(mut self, source: Iri, scheme: ConceptScheme) -> Self {
        self.schemes.insert(source, scheme);
        self
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|err| PlumeError::UnknownParameterValue {
            parameter: "vocabulary",
            value: err.to_string(),
        })
    }

    #[must_use]
    pub fn scheme(&self, source: &Iri) -> Option<&ConceptScheme> {
        self.schemes.get(source)
    }
}

impl Vocabulary for MemoryVocabulary {
    fn source_label(&self, source: &Iri, langlist: &[String]) -> Option<String> {
        self.schemes
            .get(source)
            .and_then(|scheme| pick(&scheme.labels, langlist))
            .cloned()
    }

    fn concept_iri(&self, source: &Iri, language: &str, label: &str) -> Option<Iri> {
        let scheme = self.schemes.get(source)?;
        let language = [language.to_owned()];
        scheme
            .concepts
            .iter()
            .find(|concept| pick(&concept.labels, &language).is_some_and(|l| l == label))
            .map(|concept| concept.iri.clone())
    }

    fn concept_label(&self, source: &Iri, language: &str, concept: &Iri) -> Option<String> {
        let concept = self.schemes.get(source)?.concept(concept)?;
        pick(&concept.labels, &[language.to_owned()]).cloned()
    }

    fn concept_source(&self, concept: &Iri, sources: &[Iri]) -> Option<Iri> {
        sources
            .iter()
            .find(|source| {
                self.schemes
                    .get(*source)
                    .is_some_and(|scheme| scheme.concept(concept).is_some())
            })
            .cloned()
    }

    fn concept_labels(&self, source: &Iri, langlist: &[String]) -> Vec<String> {
        let Some(scheme) = self.schemes.get(source) else {
            return Vec::new();
        };
        let mut labels: Vec<String> = scheme
            .concepts
            .iter()
            .filter_map(|concept| pick(&concept.labels, langlist).cloned())
            .collect();
        labels.sort();
        labels.insert(0, String::new());
        labels
    }

    fn concept_link(&self, source: &Iri, concept: &Iri) -> Option<Iri> {
        self.schemes
            .get(source)?
            .concept(concept)?
            .link
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs
            .iter()
            .map(|(lang, text)| ((*lang).to_owned(), (*text).to_owned()))
            .collect()
    }

    fn themes() -> (MemoryVocabulary, Iri) {
        let source = Iri::new("http://publications.europa.eu/resource/authority/data-theme");
        let scheme = ConceptScheme {
            labels: labels(&[("fr", "Thèmes"), ("en", "Themes")]),
            concepts: vec![
                Concept {
                    iri: Iri::new("http://publications.europa.eu/resource/authority/data-theme/ENVI"),
                    labels: labels(&[("fr", "Environnement"), ("en", "Environment")]),
                    link: None,
                },
                Concept {
                    iri: Iri::new("http://publications.europa.eu/resource/authority/data-theme/AGRI"),
                    labels: labels(&[("fr", "Agriculture"), ("en", "Agriculture, fisheries")]),
                    link: Some(Iri::new("https://op.europa.eu/agri")),
                },
            ],
        };
        (MemoryVocabulary::new().with_scheme(source.clone(), scheme), source)
    }

    #[test]
    fn labels_follow_language_priority() {
        let (vocabulary, source) = themes();
        let langlist = ["de".to_owned(), "en".to_owned()];
        assert_eq!(vocabulary.source_label(&source, &langlist).as_deref(), Some("Themes"));
        assert_eq!(
            vocabulary.concept_labels(&source, &["fr".to_owned()]),
            ["", "Agriculture", "Environnement"]
        );
    }

    #[test]
    fn resolves_concepts_both_ways() {
        let (vocabulary, source) = themes();
        let envi = vocabulary
            .concept_iri(&source, "fr", "Environnement")
            .expect("concept");
        assert_eq!(envi.local_name(), "ENVI");
        assert_eq!(
            vocabulary.concept_label(&source, "en", &envi).as_deref(),
            Some("Environment")
        );
        assert_eq!(vocabulary.concept_iri(&source, "fr", "Environment"), None);
        assert_eq!(
            vocabulary.concept_source(&envi, &[Iri::new("urn:x"), source.clone()]),
            Some(source)
        );
    }

    #[test]
    fn loads_from_json() {
        let raw = r#"{
            "urn:x:licenses": {
                "labels": {"fr": "Licences"},
                "concepts": [
                    {"iri": "urn:x:lo", "labels": {"fr": "Licence Ouverte"}}
                ]
            }
        }"#;
        let vocabulary = MemoryVocabulary::from_json(raw).expect("vocabulary");
        let source = Iri::new("urn:x:licenses");
        assert_eq!(vocabulary.scheme(&source).map(|s| s.concepts.len()), Some(1));
        assert_eq!(vocabulary.concept_link(&source, &Iri::new("urn:x:lo")), None);
    }
}
