//! End-to-end form scenarios: build from a graph, edit, export.

use plume_form::labels::{sources, tabs};
use plume_form::{
    FormBuilder, FormOptions, MemoryVocabulary, Mode, PropertyDescriptor, PropertyKind,
    ShapeSchema, WidgetsDict,
};
use plume_rdf::namespace::{dcat, dct, plume, rdf, vcard, xsd};
use plume_rdf::{Graph, Iri, Literal, PropertyPath, Term};
use plume_tree::{ErrorClass, NodeId, NodeKind, PlumeError};
use proptest::prelude::*;

const DATASET: &str = "urn:uuid:479fd670-32c5-4ade-a26d-0268b0ce5046";

fn schema() -> ShapeSchema {
    ShapeSchema::new()
        .with_shape(
            Iri::new(dcat::DATASET),
            vec![
                PropertyDescriptor::new(Iri::new(dct::TITLE), PropertyKind::Literal)
                    .with_label("Libellé")
                    .with_datatype(Iri::new(rdf::LANG_STRING))
                    .with_count(Some(1), None)
                    .with_unilang(true)
                    .with_order(0),
                PropertyDescriptor::new(Iri::new(dcat::KEYWORD), PropertyKind::Literal)
                    .with_label("Mots-clés")
                    .with_datatype(Iri::new(rdf::LANG_STRING))
                    .with_order(1),
                PropertyDescriptor::new(Iri::new(dct::MODIFIED), PropertyKind::Literal)
                    .with_label("Date de dernière modification")
                    .with_datatype(Iri::new(xsd::DATE))
                    .with_count(None, Some(1))
                    .with_order(2),
                PropertyDescriptor::new(
                    Iri::new(dcat::CONTACT_POINT),
                    PropertyKind::BlankNodeOrIri,
                )
                .with_label("Point de contact")
                .with_rdfclass(Iri::new(vcard::KIND))
                .with_order(3),
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
    let dataset = Iri::new(DATASET);
    let mut graph = Graph::new();
    graph.insert(dataset.clone(), Iri::new(rdf::TYPE), Iri::new(dcat::DATASET));
    graph.insert(
        dataset.clone(),
        Iri::new(dct::TITLE),
        Literal::lang_string("Cours d'eau", "fr"),
    );
    for word in ["hydrographie", "rivière"] {
        graph.insert(
            dataset.clone(),
            Iri::new(dcat::KEYWORD),
            Literal::lang_string(word, "fr"),
        );
    }
    graph.insert(
        dataset,
        Iri::new(dcat::CONTACT_POINT),
        Iri::new("https://example.org/contact"),
    );
    graph
}

fn build(options: FormOptions) -> WidgetsDict<MemoryVocabulary> {
    FormBuilder::new(schema(), options)
        .graph(&graph())
        .build(MemoryVocabulary::new())
        .expect("build")
}

fn path(predicates: &[&str]) -> PropertyPath {
    PropertyPath::from_predicates(predicates.iter().map(|p| Iri::new(*p)).collect())
}

fn group_of(dict: &WidgetsDict<MemoryVocabulary>, predicate: &str) -> NodeId {
    let tree = dict.tree();
    tree.find_by_path(&path(&[predicate]))
        .into_iter()
        .find(|id| tree.node(*id).is_some_and(|record| record.kind.is_values_group()))
        .expect("values group")
}

fn values_of(dict: &WidgetsDict<MemoryVocabulary>, predicate: &str) -> Vec<NodeId> {
    let tree = dict.tree();
    tree.find_by_path(&path(&[predicate]))
        .into_iter()
        .filter(|id| tree.value_node(*id).is_some())
        .collect()
}

#[test]
fn untouched_form_exports_its_graph() {
    let dict = build(FormOptions::default());
    assert!(dict.build_metagraph().is_isomorphic(&graph()));
    assert!(dict.check_grids().is_ok());
    assert!(!dict.modified());
}

#[test]
fn add_then_drop_restores_the_metadata() {
    let mut dict = build(FormOptions::default());
    let keywords = group_of(&dict, dcat::KEYWORD);
    let button = dict.tree().button(keywords).expect("plus button");
    let before = dict.build_metagraph();
    let rows = dict.tree().len();

    let update = dict.add(button).expect("add");
    let created = update.created.expect("created node");
    assert!(update.actions.create.contains(&created));
    assert!(update.placements.contains_key(&created));
    assert_eq!(dict.tree().len(), rows + 1);
    assert!(dict.modified());

    let update = dict.drop(created).expect("drop");
    assert!(update.actions.drop.contains(&created));
    assert_eq!(dict.tree().len(), rows);
    assert!(dict.build_metagraph().is_isomorphic(&before));
}

#[test]
fn translations_use_up_the_language_list() {
    let options = FormOptions::default()
        .with_translation(true)
        .with_lang_list(["fr", "en", "it"]);
    let mut dict = build(options);
    let title = group_of(&dict, dct::TITLE);
    assert!(matches!(
        dict.tree().node(title).map(|record| &record.kind),
        Some(NodeKind::TranslationGroup(_))
    ));
    let button = dict.tree().button(title).expect("translation button");

    let english = dict.add(button).expect("first add").created.expect("created");
    assert_eq!(
        dict.get(english).and_then(|d| d.language_value.as_deref()),
        Some("en")
    );
    let italian = dict.add(button).expect("second add").created.expect("created");
    assert_eq!(
        dict.get(italian).and_then(|d| d.language_value.as_deref()),
        Some("it")
    );

    let err = dict.add(button).expect_err("no language left");
    assert_eq!(err.class(), ErrorClass::ForbiddenOperation);
    assert_eq!(values_of(&dict, dct::TITLE).len(), 3);
}

#[test]
fn language_outside_the_pool_is_refused() {
    let options = FormOptions::default()
        .with_translation(true)
        .with_lang_list(["fr", "en"]);
    let mut dict = build(options);
    let value = values_of(&dict, dct::TITLE)[0];
    let err = dict.change_language(value, "de").expect_err("not authorized");
    assert!(matches!(err, PlumeError::ForbiddenOperation { .. }));

    dict.change_language(value, "en").expect("change language");
    let exported = dict.build_metagraph();
    let titles: Vec<&Term> = exported
        .objects(&Term::Iri(Iri::new(DATASET)), &Iri::new(dct::TITLE))
        .collect();
    assert_eq!(titles, [&Term::from(Literal::lang_string("Cours d'eau", "en"))]);
}

#[test]
fn manual_source_switches_to_the_property_group() {
    let mut dict = build(FormOptions::default());
    let nodes = dict.tree().find_by_path(&path(&[dcat::CONTACT_POINT]));
    let value = nodes
        .iter()
        .copied()
        .find(|id| dict.tree().value_node(*id).is_some())
        .expect("value twin");
    let group = dict.tree().twin(value).expect("group twin");
    assert!(dict.tree().is_hidden(group));

    let manual = sources::MANUAL.trans(dict.tree().session().langlist());
    let update = dict.change_source(value, manual).expect("switch");
    assert!(update.actions.hide.contains(&value));
    assert!(update.actions.show.contains(&group));
    assert!(dict.tree().is_hidden(value));
    assert!(!dict.tree().is_hidden(group));
    assert_eq!(dict.tree().value_node(value).and_then(|v| v.value.clone()), None);
    assert_eq!(
        dict.get(group).and_then(|d| d.current_source.as_deref()),
        Some(manual)
    );

    let exported = dict.build_metagraph();
    assert_eq!(
        exported
            .objects(&Term::Iri(Iri::new(DATASET)), &Iri::new(dcat::CONTACT_POINT))
            .count(),
        0
    );
    assert!(dict.check_grids().is_ok());
}

#[test]
fn unknown_source_label_is_refused() {
    let mut dict = build(FormOptions::default());
    let value = values_of(&dict, dcat::CONTACT_POINT)[0];
    let err = dict
        .change_source(value, "< vocabulaire inconnu >")
        .expect_err("unknown source");
    assert!(matches!(err, PlumeError::ForbiddenOperation { .. }));
    let title = values_of(&dict, dct::TITLE)[0];
    assert!(dict.change_source(title, "< URI >").is_err());
}

#[test]
fn dates_are_typed_on_input() {
    let mut dict = build(FormOptions::default());
    let modified = values_of(&dict, dct::MODIFIED)[0];
    dict.update_value(modified, "25/12/2021").expect("update");
    assert_eq!(
        dict.get(modified).and_then(|d| d.value.as_deref()),
        Some("25/12/2021")
    );
    let exported = dict.build_metagraph();
    let dates: Vec<&Term> = exported
        .objects(&Term::Iri(Iri::new(DATASET)), &Iri::new(dct::MODIFIED))
        .collect();
    assert_eq!(
        dates,
        [&Term::from(Literal::typed("2021-12-25", Iri::new(xsd::DATE)))]
    );

    dict.update_value(modified, "pas une date").expect("update");
    assert_eq!(dict.get(modified).and_then(|d| d.value.clone()), None);
}

fn columns() -> Vec<(String, String)> {
    vec![
        ("insee_com".to_owned(), "Code INSEE de la commune".to_owned()),
        ("nom_com".to_owned(), String::new()),
    ]
}

#[test]
fn table_fields_get_their_own_tab_and_are_not_exported() {
    let columns = columns();
    let mut dict = FormBuilder::new(schema(), FormOptions::default())
        .graph(&graph())
        .columns(&columns)
        .build(MemoryVocabulary::new())
        .expect("build");
    let tree = dict.tree();
    let langlist = tree.session().langlist();
    let labels: Vec<&str> = tree
        .real_children(tree.root())
        .into_iter()
        .filter_map(|id| tree.label(id))
        .collect();
    assert_eq!(
        labels,
        [tabs::GENERAL.trans(langlist), tabs::FIELDS.trans(langlist)]
    );

    let fields = values_of(&dict, plume::COLUMN);
    assert_eq!(fields.len(), 2);
    let first = fields[0];
    assert_eq!(tree.label(first), Some("insee_com"));
    assert!(tree.independant_label(first));
    assert!(!tree.is_read_only(first));
    assert_eq!(
        dict.get(first).and_then(|d| d.value.as_deref()),
        Some("Code INSEE de la commune")
    );
    assert_eq!(dict.get(fields[1]).and_then(|d| d.value.clone()), None);

    assert!(dict.build_metagraph().is_isomorphic(&graph()));
    dict.update_value(fields[1], "Nom de la commune").expect("update");
    assert!(dict.build_metagraph().is_isomorphic(&graph()));
    assert!(dict.check_grids().is_ok());
}

#[test]
fn table_fields_are_read_only_outside_edit_mode() {
    let columns = columns();
    let dict = FormBuilder::new(schema(), FormOptions::new(Mode::Read))
        .graph(&graph())
        .columns(&columns)
        .build(MemoryVocabulary::new())
        .expect("build");
    let fields = values_of(&dict, plume::COLUMN);
    assert_eq!(fields.len(), 2);
    assert!(fields.iter().all(|id| dict.tree().is_read_only(*id)));
}

#[derive(Debug, Clone, Copy)]
enum Edit {
    Add(usize),
    Drop(usize),
    Language(usize, usize),
    Source(usize, usize),
    Value(usize, usize),
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        any::<usize>().prop_map(Edit::Add),
        any::<usize>().prop_map(Edit::Drop),
        (any::<usize>(), 0..4_usize).prop_map(|(n, l)| Edit::Language(n, l)),
        (any::<usize>(), 0..4_usize).prop_map(|(n, s)| Edit::Source(n, s)),
        (any::<usize>(), 0..4_usize).prop_map(|(n, v)| Edit::Value(n, v)),
    ]
}

const LANGUAGES: [&str; 4] = ["fr", "en", "it", "de"];
const INPUTS: [&str; 4] = ["", "eau", "01/02/2020", "https://example.org/x"];

proptest! {
    #[test]
    fn edit_streams_keep_the_form_consistent(
        edits in proptest::collection::vec(edit_strategy(), 1..40),
    ) {
        let options = FormOptions::default()
            .with_translation(true)
            .with_lang_list(["fr", "en", "it"]);
        let mut dict = build(options);
        for edit in edits {
            let nodes = dict.tree().tree_order();
            let pick = |n: usize| nodes[n % nodes.len()];
            let before = dict.tree().state_hash();
            let result = match edit {
                Edit::Add(n) => dict.add(pick(n)),
                Edit::Drop(n) => dict.drop(pick(n)),
                Edit::Language(n, l) => dict.change_language(pick(n), LANGUAGES[l]),
                Edit::Source(n, s) => {
                    let node = pick(n);
                    let label = dict
                        .get(node)
                        .and_then(|d| d.sources.get(s).cloned())
                        .unwrap_or_default();
                    dict.change_source(node, &label)
                }
                Edit::Value(n, v) => dict.update_value(pick(n), INPUTS[v]),
            };
            if result.is_err() {
                prop_assert_eq!(dict.tree().state_hash(), before);
            }
            prop_assert!(dict.tree().validate().is_ok());
            prop_assert_eq!(dict.len(), dict.tree().len());
            prop_assert!(dict.check_grids().is_ok());
        }
    }
}
