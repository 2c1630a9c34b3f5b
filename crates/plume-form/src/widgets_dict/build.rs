//! Building a widgets dict from a schema, a graph, a template and data.

use std::collections::{BTreeMap, BTreeSet};

use plume_rdf::namespace::{dcat, plume, rdf, rdfs, xsd};
use plume_rdf::{BlankNode, Graph, Iri, Literal, PrefixMap, PropertyPath, Term};
use plume_tree::{
    IntegrityIssue, MAX_ROWSPAN, NodeId, NodeKind, NodeSpec, OrderIndex, PlumeError,
    PropertiesGroup, PropertyInfo, Result, TabNode, TranslationGroup, TreeBuilder, ValueNode,
    ValuesGroup,
};
use tracing::{debug, info_span};
use web_time::Instant;

use super::WidgetsDict;
use crate::labels::tabs;
use crate::options::FormOptions;
use crate::schema::{PropertyDescriptor, PropertyKind, Schema};
use crate::template::{FormTemplate, OverrideData, ResolvedTemplate, TemplateEntry};
use crate::value::{ValueContext, main_datatype, prepare_value, sort_by_language};
use crate::vocabulary::Vocabulary;

/// Order of the catch-all tab.
const OTHERS_ORDER: u32 = 9999;
/// Order of the table fields tab, just before the catch-all one.
const FIELDS_ORDER: u32 = 9998;

/// Inputs of a widgets dict build.
///
/// ```ignore
/// let dict = FormBuilder::new(&schema, FormOptions::default())
///     .graph(&graph)
///     .template(&template)
///     .build(vocabulary)?;
/// ```
#[derive(Debug, Clone)]
pub struct FormBuilder<'a, S> {
    schema: S,
    options: FormOptions,
    graph: Option<&'a Graph>,
    template: Option<&'a FormTemplate>,
    data: Option<&'a OverrideData>,
    columns: &'a [(String, String)],
    prefixes: PrefixMap,
    dataset_id: Option<Iri>,
}

impl<'a, S: Schema> FormBuilder<'a, S> {
    #[must_use]
    pub fn new(schema: S, options: FormOptions) -> Self {
        Self {
            schema,
            options,
            graph: None,
            template: None,
            data: None,
            columns: &[],
            prefixes: PrefixMap::default(),
            dataset_id: None,
        }
    }

    /// Current metadata. Without a graph, the form starts blank.
    #[must_use]
    pub fn graph(mut self, graph: &'a Graph) -> Self {
        self.graph = Some(graph);
        self
    }

    #[must_use]
    pub fn template(mut self, template: &'a FormTemplate) -> Self {
        self.template = Some(template);
        self
    }

    #[must_use]
    pub fn data(mut self, data: &'a OverrideData) -> Self {
        self.data = Some(data);
        self
    }

    /// Names and descriptions of the fields of the described table. They
    /// are shown in their own tab and never exported.
    #[must_use]
    pub fn columns(mut self, columns: &'a [(String, String)]) -> Self {
        self.columns = columns;
        self
    }

    /// Prefixes used to read template and data paths.
    #[must_use]
    pub fn prefixes(mut self, prefixes: PrefixMap) -> Self {
        self.prefixes = prefixes;
        self
    }

    /// Identifier of the dataset, when the graph does not declare one.
    #[must_use]
    pub fn dataset_id(mut self, dataset_id: Iri) -> Self {
        self.dataset_id = Some(dataset_id);
        self
    }

    /// Build the tree, clean it and cache every node.
    pub fn build<V: Vocabulary>(self, vocabulary: V) -> Result<WidgetsDict<V>> {
        let start = Instant::now();
        let _span = info_span!(
            "form.build",
            mode = %self.options.mode,
            languages = self.options.lang_list.len(),
            nodes = tracing::field::Empty,
            duration_us = tracing::field::Empty,
        )
        .entered();

        let session = self.options.session()?;
        let template = self
            .template
            .map(|template| template.resolve(&self.prefixes))
            .transpose()?;
        let data = self
            .data
            .map(|data| data.resolve(&self.prefixes))
            .transpose()?
            .unwrap_or_default();
        let empty = Graph::new();
        let graph = self.graph.unwrap_or(&empty);
        let dataset_id = graph.dataset_id().cloned().or(self.dataset_id);

        let builder = TreeBuilder::new(session, dataset_id);
        let subject = builder
            .tree()
            .dataset_id()
            .cloned()
            .map(Term::Iri)
            .ok_or(PlumeError::MissingParameter {
                parameter: "dataset_id",
                node: None,
            })?;
        let mut walk = Walk {
            schema: &self.schema,
            options: &self.options,
            graph,
            template: template.as_ref(),
            data: &data,
            vocabulary: &vocabulary,
            builder,
            tabs: Vec::new(),
            classes: Vec::new(),
        };
        walk.declare_tabs();
        let root = walk.builder.root();
        walk.classes.push(Iri::new(dcat::DATASET));
        walk.walk_properties(root, &subject, &Iri::new(dcat::DATASET), &PropertyPath::root())?;
        walk.insert_columns(self.columns)?;
        let tree = walk.builder.finish();

        let dict = WidgetsDict::from_tree(tree, self.options, vocabulary);
        let duration_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
        tracing::Span::current().record("nodes", dict.len());
        tracing::Span::current().record("duration_us", duration_us);
        debug!(nodes = dict.len(), duration_us, "form built");
        Ok(dict)
    }
}

/// One property to walk, with its origin.
struct Candidate {
    descriptor: PropertyDescriptor,
    /// Found in the graph only: shown in the catch-all tab.
    catch_all: bool,
}

/// Recursive state of one build.
struct Walk<'w, S, V> {
    schema: &'w S,
    options: &'w FormOptions,
    graph: &'w Graph,
    template: Option<&'w ResolvedTemplate>,
    data: &'w BTreeMap<PropertyPath, Vec<String>>,
    vocabulary: &'w V,
    builder: TreeBuilder,
    /// Tab labels, orders and nodes once created, in display order.
    tabs: Vec<(String, u32, Option<NodeId>)>,
    /// Classes of the property groups being walked.
    classes: Vec<Iri>,
}

impl<S: Schema, V: Vocabulary> Walk<'_, S, V> {
    fn langlist(&self) -> &[String] {
        self.builder.tree().session().langlist()
    }

    /// Declare the tabs. They are created on first use.
    fn declare_tabs(&mut self) {
        let others = tabs::OTHERS.trans(self.langlist()).to_owned();
        let mut labels: Vec<(String, u32)> = match self.template {
            Some(template) if !template.tabs.is_empty() => template
                .tabs
                .iter()
                .zip(1..)
                .map(|(label, order)| (label.clone(), order))
                .collect(),
            _ => vec![(tabs::GENERAL.trans(self.langlist()).to_owned(), 0)],
        };
        if !labels.iter().any(|(label, _)| *label == others) {
            labels.push((others, OTHERS_ORDER));
        }
        self.tabs = labels
            .into_iter()
            .map(|(label, order)| (label, order, None))
            .collect();
    }

    fn tab(&mut self, label: &str) -> Result<NodeId> {
        let Some(slot) = self.tabs.iter().position(|(tab, _, _)| tab == label) else {
            return Err(PlumeError::IntegrityBreach {
                node: None,
                breach: IntegrityIssue::UnknownTab {
                    label: label.to_owned(),
                },
            });
        };
        if let Some(id) = self.tabs[slot].2 {
            return Ok(id);
        }
        let root = self.builder.root();
        let spec = NodeSpec::new(NodeKind::Tab(TabNode {
            label: label.to_owned(),
        }))
        .order(OrderIndex::single(self.tabs[slot].1));
        let id = self
            .builder
            .insert(root, spec)?
            .ok_or(PlumeError::MissingParameter {
                parameter: "tab",
                node: Some(root),
            })?;
        self.tabs[slot].2 = Some(id);
        Ok(id)
    }

    fn first_tab(&mut self) -> Result<NodeId> {
        let label = self
            .tabs
            .first()
            .map(|(label, _, _)| label.clone())
            .unwrap_or_default();
        self.tab(&label)
    }

    fn others_tab(&mut self) -> Result<NodeId> {
        let label = tabs::OTHERS.trans(self.langlist()).to_owned();
        self.tab(&label)
    }

    /// One long text per table field, in the fields tab.
    fn insert_columns(&mut self, columns: &[(String, String)]) -> Result<()> {
        if columns.is_empty() {
            return Ok(());
        }
        let label = tabs::FIELDS.trans(self.langlist()).to_owned();
        if !self.tabs.iter().any(|(tab, _, _)| *tab == label) {
            self.tabs.push((label.clone(), FIELDS_ORDER, None));
        }
        let tab = self.tab(&label)?;
        let predicate = Iri::new(plume::COLUMN);
        let path = PropertyPath::root().child(&predicate);
        for (name, description) in columns {
            let mut info = PropertyInfo::new(predicate.clone(), path.clone())
                .with_label(name.clone())
                .with_xsdtype(Iri::new(xsd::STRING))
                .read_only(!self.options.edit());
            info.description = Some("Description du champ".to_owned());
            let value = (!description.is_empty())
                .then(|| Term::from(Literal::plain(description.clone())));
            let mut node = ValueNode::new(Some(info)).with_value(value);
            node.is_long_text = true;
            node.rowspan = self.options.text_edit_rowspan.clamp(1, MAX_ROWSPAN);
            node.independant_label = true;
            node.do_not_save = true;
            self.builder.insert(tab, NodeSpec::new(NodeKind::Value(node)))?;
        }
        Ok(())
    }

    /// Schema properties of `class`, then template-only properties, then
    /// graph predicates nobody declared.
    fn candidates(&self, subject: &Term, class: &Iri, path: &PropertyPath) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = self
            .schema
            .properties(class)
            .iter()
            .map(|descriptor| Candidate {
                descriptor: descriptor.clone(),
                catch_all: false,
            })
            .collect();
        let mut known: BTreeSet<Iri> = candidates
            .iter()
            .map(|c| c.descriptor.predicate.clone())
            .collect();

        if let Some(template) = self.template {
            for (entry_path, entry) in &template.entries {
                let is_child = entry_path.len() == path.len() + 1
                    && entry_path.predicates().starts_with(path.predicates());
                let Some(predicate) = entry_path.last().filter(|_| is_child) else {
                    continue;
                };
                if known.insert(predicate.clone()) {
                    candidates.push(Candidate {
                        descriptor: local_descriptor(predicate, entry),
                        catch_all: false,
                    });
                }
            }
        }

        let mut unknown: BTreeMap<Iri, Vec<Term>> = BTreeMap::new();
        for (predicate, object) in self.graph.predicate_objects(subject) {
            if predicate.is(rdf::TYPE) || known.contains(predicate) {
                continue;
            }
            unknown.entry(predicate.clone()).or_default().push(object.clone());
        }
        for (predicate, values) in unknown {
            candidates.push(Candidate {
                descriptor: unknown_descriptor(predicate, &values),
                catch_all: true,
            });
        }
        candidates
    }

    fn walk_properties(
        &mut self,
        parent: NodeId,
        subject: &Term,
        class: &Iri,
        path: &PropertyPath,
    ) -> Result<()> {
        for candidate in self.candidates(subject, class, path) {
            self.walk_property(parent, subject, path, candidate)?;
        }
        Ok(())
    }

    fn walk_property(
        &mut self,
        parent: NodeId,
        subject: &Term,
        path: &PropertyPath,
        candidate: Candidate,
    ) -> Result<()> {
        let Candidate {
            descriptor,
            catch_all,
        } = candidate;
        let options = self.options;
        let prop_path = path.child(&descriptor.predicate);
        let entry = self.template.and_then(|template| template.entry(&prop_path));
        let unlisted = catch_all || (self.template.is_some() && entry.is_none());

        let mut info = descriptor.property_info(prop_path.clone());
        if let Some(entry) = entry {
            apply_entry(&mut info, entry);
        }
        if !options.edit() {
            info.is_read_only = true;
        }
        let kind = descriptor.kind;
        if kind.is_composite() && info.rdfclass.is_none() {
            info.rdfclass = Some(Iri::new(rdfs::RESOURCE));
        }

        let mut values = self.values(subject, &prop_path, &descriptor, &info);
        let blank = values.iter().all(Option::is_none);
        let mandatory = info.is_mandatory;
        if blank && (unlisted || options.hide_blank()) && !(options.edit() && mandatory) {
            return Ok(());
        }
        if blank
            && kind.is_composite()
            && info
                .rdfclass
                .as_ref()
                .is_some_and(|class| self.classes.contains(class))
        {
            debug!(path = %prop_path.to_compact(&PrefixMap::default()), "recursive class skipped");
            return Ok(());
        }
        let ghost = !blank && unlisted && options.hide_unlisted() && !mandatory;

        let target = if parent == self.builder.root() {
            match entry.and_then(|e| e.tab.as_deref()) {
                _ if unlisted => self.others_tab()?,
                Some(label) => self.tab(label)?,
                None => self.first_tab()?,
            }
        } else {
            parent
        };
        let order = OrderIndex::single(
            entry
                .and_then(|e| e.order)
                .or(descriptor.shape_order)
                .unwrap_or(plume_tree::DEFAULT_ORDER),
        );

        let is_lang_string = info.is_lang_string();
        let multilingual = descriptor.unilang && is_lang_string && options.translation();
        let multiple = descriptor.is_multiple() && options.edit() && !descriptor.unilang;
        let main_language = self.builder.tree().session().main_language().to_owned();
        let only_current = options.only_current_language() && is_lang_string;
        if only_current {
            sort_by_language(&mut values, &main_language);
        }

        let group = if values.len() > 1 || multilingual || multiple {
            let values_group = ValuesGroup {
                property: info.clone(),
                with_minus_buttons: options.edit(),
                button: None,
            };
            let group_kind = if multilingual && !ghost {
                NodeKind::TranslationGroup(TranslationGroup {
                    values: values_group,
                    available_languages: Vec::new(),
                })
            } else {
                NodeKind::GroupOfValues(values_group)
            };
            self.builder
                .insert(target, NodeSpec::new(group_kind).ghost(ghost).order(order.clone()))?
        } else {
            None
        };

        let slot = Slot {
            parent: group.unwrap_or(target),
            info: &info,
            descriptor: &descriptor,
            entry,
            order,
        };
        let several = values.len() > 1;
        let mut visible = 0_usize;
        for value in values {
            let foreign = value
                .as_ref()
                .and_then(Term::as_literal)
                .is_some_and(|literal| literal.language() != Some(main_language.as_str()));
            let value_ghost = ghost || (only_current && several && visible > 0 && foreign);
            let created = if kind.is_composite() {
                self.insert_composite(&slot, value, value_ghost)?
            } else {
                self.insert_value(&slot, value, value_ghost)?
            };
            if created.is_some_and(|id| !self.builder.tree().is_ghost(id)) {
                visible += 1;
            }
        }

        if let Some(group) = group {
            let button = if multilingual {
                Some(NodeKind::TranslationButton)
            } else if multiple {
                Some(NodeKind::PlusButton)
            } else {
                None
            };
            if let Some(button) = button.filter(|_| !ghost) {
                self.builder.insert(group, NodeSpec::new(button))?;
            }
        }
        Ok(())
    }

    /// Values of a property: override data, else the graph, else one
    /// empty slot.
    fn values(
        &self,
        subject: &Term,
        path: &PropertyPath,
        descriptor: &PropertyDescriptor,
        info: &PropertyInfo,
    ) -> Vec<Option<Term>> {
        if let Some(raw) = self.data.get(path).filter(|_| descriptor.kind.has_value_form()) {
            let ctx = ValueContext {
                datatype: info.xsdtype.as_ref(),
                language: None,
                source: None,
                transform: info.transform,
                read_only: false,
                main_language: self.builder.tree().session().main_language(),
            };
            let values: Vec<Option<Term>> = raw
                .iter()
                .map(|raw| prepare_value(&ctx, raw, self.vocabulary))
                .filter(Option::is_some)
                .collect();
            if !values.is_empty() {
                return values;
            }
        }
        let values: Vec<Option<Term>> = self
            .graph
            .objects(subject, &descriptor.predicate)
            .cloned()
            .map(Some)
            .collect();
        if values.is_empty() {
            vec![None]
        } else {
            values
        }
    }

    fn insert_value(&mut self, slot: &Slot<'_>, value: Option<Term>, ghost: bool) -> Result<Option<NodeId>> {
        let options = self.options;
        let info = slot.info;
        let literal_len = value
            .as_ref()
            .and_then(Term::as_literal)
            .map_or(0, |literal| literal.lexical().chars().count());
        let is_long_text = slot
            .entry
            .and_then(|e| e.is_long_text)
            .unwrap_or(slot.descriptor.is_long_text)
            || literal_len > options.value_length_limit;
        let rowspan = if is_long_text {
            slot.entry
                .and_then(|e| e.rowspan)
                .or(slot.descriptor.rowspan)
                .unwrap_or(options.text_edit_rowspan)
                .clamp(1, MAX_ROWSPAN)
        } else {
            1
        };
        let value_source = match &value {
            Some(Term::Iri(iri)) if !info.sources.is_empty() => {
                self.vocabulary.concept_source(iri, &info.sources)
            }
            None => info.sources.first().cloned(),
            _ => None,
        };

        let mut node = ValueNode::new(Some(info.clone())).with_value(value);
        node.is_long_text = is_long_text;
        node.rowspan = rowspan;
        node.independant_label = info.label.as_ref().is_some_and(|label| {
            is_long_text || label.chars().count() > options.label_length_limit
        });
        node.value_source = value_source;
        let spec = NodeSpec::new(NodeKind::Value(node))
            .ghost(ghost)
            .order(slot.order.clone());
        self.builder.insert(slot.parent, spec)
    }

    fn insert_composite(
        &mut self,
        slot: &Slot<'_>,
        value: Option<Term>,
        ghost: bool,
    ) -> Result<Option<NodeId>> {
        let info = slot.info;
        let with_twin = slot.descriptor.kind == PropertyKind::BlankNodeOrIri;
        let node_term = match &value {
            Some(Term::Blank(blank)) => Term::Blank(blank.clone()),
            Some(Term::Iri(iri)) if !with_twin => Term::Iri(iri.clone()),
            _ => Term::Blank(BlankNode::fresh()),
        };
        let rdftype = info
            .rdfclass
            .clone()
            .unwrap_or_else(|| Iri::new(rdfs::RESOURCE));
        let spec = NodeSpec::new(NodeKind::GroupOfProperties(PropertiesGroup {
            property: Some(info.clone()),
            rdftype: rdftype.clone(),
            node: node_term.clone(),
        }))
        .ghost(ghost)
        .order(slot.order.clone());
        let Some(group) = self.builder.insert(slot.parent, spec)? else {
            return Ok(None);
        };
        self.classes.push(rdftype.clone());
        let walked = self.walk_properties(group, &node_term, &rdftype, &info.path);
        self.classes.pop();
        walked?;

        if with_twin {
            let value_hidden = value.as_ref().is_some_and(Term::is_blank);
            let iri = value.filter(|v| v.as_iri().is_some());
            let twin = self.insert_value(slot, iri, ghost)?;
            let tree = self.builder.tree();
            let linkable = tree.contains(group) && !tree.is_ghost(group);
            if let Some(twin) = twin.filter(|id| linkable && !tree.is_ghost(*id)) {
                self.builder.link_twins(twin, group, value_hidden)?;
            }
        }
        Ok(Some(group))
    }
}

/// Where the values of one property go.
struct Slot<'s> {
    parent: NodeId,
    info: &'s PropertyInfo,
    descriptor: &'s PropertyDescriptor,
    entry: Option<&'s TemplateEntry>,
    order: OrderIndex,
}

fn apply_entry(info: &mut PropertyInfo, entry: &TemplateEntry) {
    if let Some(label) = &entry.label {
        info.label = Some(label.clone());
    }
    if let Some(description) = &entry.description {
        info.description = Some(description.clone());
    }
    if let Some(read_only) = entry.is_read_only {
        info.is_read_only = read_only;
    }
    if let Some(mandatory) = entry.is_mandatory {
        info.is_mandatory = mandatory;
    }
    if let Some(placeholder) = &entry.placeholder {
        info.placeholder = Some(placeholder.clone());
    }
    if let Some(input_mask) = &entry.input_mask {
        info.input_mask = Some(input_mask.clone());
    }
    if let Some(regex) = &entry.regex_validator {
        info.regex_validator = Some(regex.clone());
        info.regex_validator_flags = entry.regex_validator_flags.clone();
    }
    if let Some(sources) = &entry.sources {
        info.sources = sources.clone();
    }
}

/// Property declared by the template only.
fn local_descriptor(predicate: &Iri, entry: &TemplateEntry) -> PropertyDescriptor {
    let kind = entry.kind.unwrap_or(if entry.datatype.is_some() {
        PropertyKind::Literal
    } else {
        PropertyKind::Iri
    });
    let mut descriptor = PropertyDescriptor::new(predicate.clone(), kind);
    descriptor.datatype = entry.datatype.clone();
    if descriptor.datatype.is_none() && kind == PropertyKind::Literal {
        descriptor.datatype = Some(Iri::new(xsd::STRING));
    }
    descriptor.is_long_text = entry.is_long_text.unwrap_or(false);
    descriptor
}

/// Property found in the graph only, typed by its values.
fn unknown_descriptor(predicate: Iri, values: &[Term]) -> PropertyDescriptor {
    let kind = if values.iter().any(Term::is_blank) {
        PropertyKind::BlankNode
    } else if values.iter().any(|value| value.as_literal().is_some()) {
        PropertyKind::Literal
    } else {
        PropertyKind::Iri
    };
    let mut descriptor = PropertyDescriptor::new(predicate, kind);
    match kind {
        PropertyKind::Literal => descriptor.datatype = main_datatype(values),
        _ => descriptor.rdfclass = Some(Iri::new(rdfs::RESOURCE)),
    }
    descriptor
}

#[cfg(test)]
mod tests {
    use plume_rdf::namespace::{dct, vcard, xsd};
    use plume_rdf::{Literal, PropertyPath};

    use super::*;
    use crate::options::Mode;
    use crate::schema::ShapeSchema;
    use crate::vocabulary::MemoryVocabulary;

    const DATASET: &str = "urn:uuid:479fd670-32c5-4ade-a26d-0268b0ce5046";

    fn schema() -> ShapeSchema {
        ShapeSchema::new()
            .with_shape(
                Iri::new(dcat::DATASET),
                vec![
                    PropertyDescriptor::new(Iri::new(dct::TITLE), PropertyKind::Literal)
                        .with_label("Libellé")
                        .with_datatype(Iri::new(rdf::LANG_STRING))
                        .with_count(Some(1), Some(1))
                        .with_unilang(true)
                        .with_order(0),
                    PropertyDescriptor::new(Iri::new(dcat::CONTACT_POINT), PropertyKind::BlankNodeOrIri)
                        .with_label("Point de contact")
                        .with_rdfclass(Iri::new(vcard::KIND))
                        .with_order(1),
                ],
            )
            .with_shape(
                Iri::new(vcard::KIND),
                vec![
                    PropertyDescriptor::new(Iri::new(vcard::FN), PropertyKind::Literal)
                        .with_label("Nom")
                        .with_datatype(Iri::new(xsd::STRING))
                        .with_count(None, Some(1)),
                ],
            )
    }

    fn graph() -> Graph {
        let mut graph = Graph::new();
        let dataset = Iri::new(DATASET);
        graph.insert(dataset.clone(), Iri::new(rdf::TYPE), Iri::new(dcat::DATASET));
        graph.insert(
            dataset.clone(),
            Iri::new(dct::TITLE),
            Literal::lang_string("ADMIN EXPRESS - Départements de métropole", "fr"),
        );
        graph
    }

    fn path(predicates: &[&str]) -> PropertyPath {
        PropertyPath::from_predicates(predicates.iter().map(|p| Iri::new(*p)).collect())
    }

    #[test]
    fn default_tabs_and_title() {
        let graph = graph();
        let dict = FormBuilder::new(schema(), FormOptions::default())
            .graph(&graph)
            .build(MemoryVocabulary::new())
            .expect("build");
        let tree = dict.tree();
        assert_eq!(tree.dataset_id(), Some(&Iri::new(DATASET)));
        let tabs: Vec<&str> = tree
            .real_children(tree.root())
            .into_iter()
            .filter_map(|id| tree.label(id))
            .collect();
        assert_eq!(tabs, ["Général"]);
        let title = tree.find_by_path(&path(&[dct::TITLE]));
        assert_eq!(title.len(), 1);
        assert_eq!(
            dict.get(title[0]).and_then(|d| d.value.clone()).as_deref(),
            Some("ADMIN EXPRESS - Départements de métropole")
        );
    }

    #[test]
    fn blank_node_or_iri_builds_twins() {
        let graph = graph();
        let dict = FormBuilder::new(schema(), FormOptions::default())
            .graph(&graph)
            .build(MemoryVocabulary::new())
            .expect("build");
        let tree = dict.tree();
        let nodes = tree.find_by_path(&path(&[dcat::CONTACT_POINT]));
        let value = nodes
            .iter()
            .copied()
            .find(|id| tree.value_node(*id).is_some())
            .expect("value twin");
        let group = tree.twin(value).expect("group twin");
        assert!(!tree.is_hidden(value));
        assert!(tree.is_hidden(group));
        let name = tree.find_by_path(&path(&[dcat::CONTACT_POINT, vcard::FN]));
        assert_eq!(name.len(), 1);
        assert!(tree.is_hidden(name[0]));
    }

    #[test]
    fn unknown_predicates_land_in_the_catch_all_tab() {
        let mut graph = graph();
        let extra = Iri::new("https://example.org/ns#note");
        graph.insert(Iri::new(DATASET), extra.clone(), Literal::plain("note libre"));
        let dict = FormBuilder::new(schema(), FormOptions::default())
            .graph(&graph)
            .build(MemoryVocabulary::new())
            .expect("build");
        let tree = dict.tree();
        let nodes = tree.find_by_path(&PropertyPath::root().child(&extra));
        let value = nodes
            .iter()
            .copied()
            .find(|id| tree.value_node(*id).is_some())
            .expect("value");
        let mut tab = value;
        while let Some(parent) = tree.parent(tab).filter(|p| *p != tree.root()) {
            tab = parent;
        }
        assert_eq!(tree.label(tab), Some("Autres"));
        assert!(dict.build_metagraph().is_isomorphic(&graph));
    }

    #[test]
    fn read_mode_hides_blank_properties() {
        let graph = graph();
        let dict = FormBuilder::new(schema(), FormOptions::new(Mode::Read))
            .graph(&graph)
            .build(MemoryVocabulary::new())
            .expect("build");
        let tree = dict.tree();
        assert!(tree.find_by_path(&path(&[dcat::CONTACT_POINT])).is_empty());
        let title = tree.find_by_path(&path(&[dct::TITLE]));
        assert!(tree.is_read_only(title[0]));
    }

    #[test]
    fn override_data_wins_over_the_graph() {
        let graph = graph();
        let data = OverrideData::new().with_values("dct:title", ["Nouveau titre"]);
        let dict = FormBuilder::new(schema(), FormOptions::default())
            .graph(&graph)
            .data(&data)
            .build(MemoryVocabulary::new())
            .expect("build");
        let exported = dict.build_metagraph();
        let titles: Vec<&Term> = exported
            .objects(&Term::Iri(Iri::new(DATASET)), &Iri::new(dct::TITLE))
            .collect();
        assert_eq!(titles, [&Term::from(Literal::lang_string("Nouveau titre", "fr"))]);
    }

    #[test]
    fn template_rowspan_is_capped() {
        let graph = graph();
        let template = FormTemplate::new().with_tab("Principal").with_entry(
            "dct:description",
            TemplateEntry {
                datatype: Some(Iri::new(xsd::STRING)),
                is_long_text: Some(true),
                rowspan: Some(u32::MAX),
                ..TemplateEntry::default()
            },
        );
        let dict = FormBuilder::new(schema(), FormOptions::default())
            .graph(&graph)
            .template(&template)
            .build(MemoryVocabulary::new())
            .expect("build");
        let tree = dict.tree();
        let description = tree.find_by_path(&path(&[dct::DESCRIPTION]));
        assert_eq!(description.len(), 1);
        assert_eq!(tree.rowspan(description[0]), MAX_ROWSPAN);
        assert!(tree.validate().is_ok());
        assert!(dict.check_grids().is_ok());
    }

    #[test]
    fn unknown_template_tab_is_a_breach() {
        let template = FormTemplate::new().with_tab("Principal").with_entry(
            "dct:title",
            TemplateEntry {
                tab: Some("Inconnu".into()),
                ..TemplateEntry::default()
            },
        );
        let err = FormBuilder::new(schema(), FormOptions::default())
            .template(&template)
            .build(MemoryVocabulary::new())
            .expect_err("unknown tab");
        assert!(matches!(
            err,
            PlumeError::IntegrityBreach {
                breach: IntegrityIssue::UnknownTab { .. },
                ..
            }
        ));
    }
}
