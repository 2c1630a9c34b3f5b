//! Form templates and override data.
//!
//! Both are keyed by compact property paths (`dct:title`,
//! `dcat:contactPoint / vcard:fn`) and resolved against a [`PrefixMap`]
//! before a build.

use std::collections::BTreeMap;

use plume_rdf::{Iri, PrefixMap, PropertyPath};
use plume_tree::{PlumeError, Result};
use serde::{Deserialize, Serialize};

use crate::schema::PropertyKind;

/// Presentation settings of one property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateEntry {
    pub label: Option<String>,
    pub description: Option<String>,
    pub order: Option<u32>,
    /// Label of the tab holding the property. First tab when absent.
    pub tab: Option<String>,
    pub is_read_only: Option<bool>,
    pub is_mandatory: Option<bool>,
    pub placeholder: Option<String>,
    pub input_mask: Option<String>,
    pub rowspan: Option<u32>,
    pub is_long_text: Option<bool>,
    pub regex_validator: Option<String>,
    pub regex_validator_flags: Option<String>,
    /// Datatype of a property the schema does not know.
    pub datatype: Option<Iri>,
    /// Kind of a property the schema does not know.
    pub kind: Option<PropertyKind>,
    pub sources: Option<Vec<Iri>>,
}

/// Template of a form: tabs and per-path settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormTemplate {
    /// Tab labels, in display order.
    pub tabs: Vec<String>,
    pub entries: BTreeMap<String, TemplateEntry>,
}

impl FormTemplate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tab(mut self, label: impl Into<String>) -> Self {
        self.tabs.push(label.into());
        self
    }

    #[must_use]
    pub fn with_entry(mut self, path: impl Into<String>, entry: TemplateEntry) -> Self {
        self.entries.insert(path.into(), entry);
        self
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|err| PlumeError::UnknownParameterValue {
            parameter: "template",
            value: err.to_string(),
        })
    }

    /// Template with parsed paths.
    pub fn resolve(&self, prefixes: &PrefixMap) -> Result<ResolvedTemplate> {
        let mut entries = BTreeMap::new();
        for (raw, entry) in &self.entries {
            entries.insert(parse_path(raw, prefixes)?, entry.clone());
        }
        Ok(ResolvedTemplate {
            tabs: self.tabs.clone(),
            entries,
        })
    }
}

/// A [`FormTemplate`] whose keys are property paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedTemplate {
    pub tabs: Vec<String>,
    pub entries: BTreeMap<PropertyPath, TemplateEntry>,
}

impl ResolvedTemplate {
    #[must_use]
    pub fn entry(&self, path: &PropertyPath) -> Option<&TemplateEntry> {
        self.entries.get(path)
    }

    /// True when the template lists `path`.
    #[must_use]
    pub fn lists(&self, path: &PropertyPath) -> bool {
        self.entries.contains_key(path)
    }
}

/// Values supplied by the caller, winning over the metadata graph.
///
/// Values are raw strings, deserialised like user input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverrideData {
    values: BTreeMap<String, Vec<String>>,
}

impl OverrideData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_values<I, S>(mut self, path: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values
            .insert(path.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|err| PlumeError::UnknownParameterValue {
            parameter: "data",
            value: err.to_string(),
        })
    }

    pub fn resolve(&self, prefixes: &PrefixMap) -> Result<BTreeMap<PropertyPath, Vec<String>>> {
        self.values
            .iter()
            .map(|(raw, values)| Ok((parse_path(raw, prefixes)?, values.clone())))
            .collect()
    }
}

fn parse_path(raw: &str, prefixes: &PrefixMap) -> Result<PropertyPath> {
    PropertyPath::parse(raw, prefixes).map_err(|err| PlumeError::UnknownParameterValue {
        parameter: "path",
        value: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use plume_rdf::namespace::{dcat, dct, vcard};

    use super::*;

    #[test]
    fn resolves_compact_paths() {
        let template = FormTemplate::new()
            .with_tab("Général")
            .with_entry(
                "dct:title",
                TemplateEntry {
                    order: Some(1),
                    ..TemplateEntry::default()
                },
            )
            .with_entry("dcat:contactPoint / vcard:fn", TemplateEntry::default());
        let resolved = template.resolve(&PrefixMap::default()).expect("resolve");
        let title = PropertyPath::root().child(&Iri::new(dct::TITLE));
        assert_eq!(resolved.entry(&title).and_then(|e| e.order), Some(1));
        let name = PropertyPath::root()
            .child(&Iri::new(dcat::CONTACT_POINT))
            .child(&Iri::new(vcard::FN));
        assert!(resolved.lists(&name));
    }

    #[test]
    fn unknown_prefix_is_rejected() {
        let template = FormTemplate::new().with_entry("nope:title", TemplateEntry::default());
        let err = template.resolve(&PrefixMap::default()).expect_err("bad prefix");
        assert!(matches!(err, PlumeError::UnknownParameterValue { parameter: "path", .. }));
    }

    #[test]
    fn data_from_json() {
        let data = OverrideData::from_json(r#"{"dct:title": ["Titre"]}"#).expect("data");
        let resolved = data.resolve(&PrefixMap::default()).expect("resolve");
        let title = PropertyPath::root().child(&Iri::new(dct::TITLE));
        assert_eq!(resolved.get(&title).map(Vec::as_slice), Some(&["Titre".to_owned()][..]));
    }
}
