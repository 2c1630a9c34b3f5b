#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use plume_form::{
    FormBuilder, FormOptions, MemoryVocabulary, PropertyDescriptor, PropertyKind, ShapeSchema,
};
use plume_rdf::namespace::{dcat, dct, rdf, vcard, xsd};
use plume_rdf::{Graph, Iri, Literal};

#[derive(Debug, Arbitrary)]
enum Edit {
    Add(u16),
    Drop(u16),
    Language(u16, u8),
    Source(u16, u8),
    Value(u16, String),
}

#[derive(Debug, Arbitrary)]
struct Input {
    translation: bool,
    keywords: u8,
    edits: Vec<Edit>,
}

const LANGUAGES: [&str; 4] = ["fr", "en", "it", "de"];

fn schema() -> ShapeSchema {
    ShapeSchema::new()
        .with_shape(
            Iri::new(dcat::DATASET),
            vec![
                PropertyDescriptor::new(Iri::new(dct::TITLE), PropertyKind::Literal)
                    .with_datatype(Iri::new(rdf::LANG_STRING))
                    .with_unilang(true)
                    .with_order(0),
                PropertyDescriptor::new(Iri::new(dcat::KEYWORD), PropertyKind::Literal)
                    .with_datatype(Iri::new(rdf::LANG_STRING))
                    .with_order(1),
                PropertyDescriptor::new(Iri::new(dct::MODIFIED), PropertyKind::Literal)
                    .with_datatype(Iri::new(xsd::DATE))
                    .with_count(None, Some(1))
                    .with_order(2),
                PropertyDescriptor::new(Iri::new(dcat::CONTACT_POINT), PropertyKind::BlankNodeOrIri)
                    .with_rdfclass(Iri::new(vcard::KIND))
                    .with_order(3),
            ],
        )
        .with_shape(
            Iri::new(vcard::KIND),
            vec![PropertyDescriptor::new(Iri::new(vcard::FN), PropertyKind::Literal)
                .with_datatype(Iri::new(xsd::STRING))],
        )
}

fuzz_target!(|input: Input| {
    let dataset = Iri::new("urn:uuid:fuzz");
    let mut graph = Graph::new();
    graph.insert(dataset.clone(), Iri::new(rdf::TYPE), Iri::new(dcat::DATASET));
    for i in 0..input.keywords % 8 {
        graph.insert(
            dataset.clone(),
            Iri::new(dcat::KEYWORD),
            Literal::lang_string(format!("mot {i}"), LANGUAGES[usize::from(i) % 4]),
        );
    }
    let options = FormOptions::default()
        .with_translation(input.translation)
        .with_lang_list(["fr", "en", "it"]);
    let Ok(mut dict) = FormBuilder::new(schema(), options)
        .graph(&graph)
        .build(MemoryVocabulary::new())
    else {
        return;
    };

    for edit in input.edits.into_iter().take(64) {
        let nodes = dict.tree().tree_order();
        let pick = |n: u16| nodes[usize::from(n) % nodes.len()];
        let before = dict.tree().state_hash();
        let result = match edit {
            Edit::Add(n) => dict.add(pick(n)),
            Edit::Drop(n) => dict.drop(pick(n)),
            Edit::Language(n, l) => dict.change_language(pick(n), LANGUAGES[usize::from(l) % 4]),
            Edit::Source(n, s) => {
                let node = pick(n);
                let label = dict
                    .get(node)
                    .and_then(|d| d.sources.get(usize::from(s) % 4).cloned())
                    .unwrap_or_default();
                dict.change_source(node, &label)
            }
            Edit::Value(n, raw) => dict.update_value(pick(n), &raw),
        };
        if result.is_err() {
            assert_eq!(dict.tree().state_hash(), before, "failed edit mutated the tree");
        }
        assert!(dict.tree().validate().is_ok(), "tree invariants broken");
        assert_eq!(dict.len(), dict.tree().len(), "cache out of sync");
        dict.build_metagraph();
    }
});
