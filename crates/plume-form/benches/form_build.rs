//! Benchmark: building a widgets dict and running edits on it.
//!
//! Run with: `cargo bench -p plume-form --bench form_build`
//!
//! Builds forms over graphs with a growing number of keywords and contact
//! points, then measures a plus-button add followed by the matching drop.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use plume_form::{
    FormBuilder, FormOptions, MemoryVocabulary, PropertyDescriptor, PropertyKind, ShapeSchema,
};
use plume_rdf::namespace::{dcat, dct, rdf, vcard, xsd};
use plume_rdf::{BlankNode, Graph, Iri, Literal, PropertyPath};

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
                PropertyDescriptor::new(Iri::new(dcat::CONTACT_POINT), PropertyKind::BlankNodeOrIri)
                    .with_rdfclass(Iri::new(vcard::KIND))
                    .with_order(2),
            ],
        )
        .with_shape(
            Iri::new(vcard::KIND),
            vec![
                PropertyDescriptor::new(Iri::new(vcard::FN), PropertyKind::Literal)
                    .with_datatype(Iri::new(xsd::STRING)),
                PropertyDescriptor::new(Iri::new(vcard::HAS_EMAIL), PropertyKind::Iri),
            ],
        )
}

fn graph(size: usize) -> Graph {
    let dataset = Iri::new("urn:uuid:0c5e7b1a-93d4-4f2e-8a61-5d7c2e9f4b30");
    let mut graph = Graph::new();
    graph.insert(dataset.clone(), Iri::new(rdf::TYPE), Iri::new(dcat::DATASET));
    graph.insert(
        dataset.clone(),
        Iri::new(dct::TITLE),
        Literal::lang_string("Jeu de données", "fr"),
    );
    for i in 0..size {
        graph.insert(
            dataset.clone(),
            Iri::new(dcat::KEYWORD),
            Literal::lang_string(format!("mot {i}"), "fr"),
        );
        let contact = BlankNode::new(format!("c{i}"));
        graph.insert(dataset.clone(), Iri::new(dcat::CONTACT_POINT), contact.clone());
        graph.insert(contact.clone(), Iri::new(rdf::TYPE), Iri::new(vcard::KIND));
        graph.insert(contact, Iri::new(vcard::FN), Literal::plain(format!("Service {i}")));
    }
    graph
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("form_build");
    for size in [1_usize, 10, 50] {
        let graph = graph(size);
        let schema = schema();
        group.bench_with_input(BenchmarkId::from_parameter(size), &graph, |b, graph| {
            b.iter(|| {
                let dict = FormBuilder::new(&schema, FormOptions::default())
                    .graph(graph)
                    .build(MemoryVocabulary::new())
                    .expect("build");
                black_box(dict.len())
            });
        });
    }
    group.finish();
}

fn bench_add_drop(c: &mut Criterion) {
    let mut group = c.benchmark_group("form_add_drop");
    let keyword = PropertyPath::root().child(&Iri::new(dcat::KEYWORD));
    for size in [1_usize, 10, 50] {
        let graph = graph(size);
        let mut dict = FormBuilder::new(schema(), FormOptions::default())
            .graph(&graph)
            .build(MemoryVocabulary::new())
            .expect("build");
        let button = dict
            .tree()
            .find_by_path(&keyword)
            .into_iter()
            .find_map(|id| dict.tree().button(id))
            .expect("plus button");
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| {
                let created = dict.add(button).expect("add").created.expect("created");
                black_box(dict.drop(created).expect("drop"))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_add_drop);
criterion_main!(benches);
