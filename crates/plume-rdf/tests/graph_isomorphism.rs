//! Blank-node relabelling never changes isomorphism, and any change to a
//! statement does.

use plume_rdf::namespace::{dcat, dct, foaf, rdf, vcard};
use plume_rdf::{BlankNode, Graph, Iri, Literal, Term, Triple};
use proptest::prelude::*;

fn dataset() -> Iri {
    Iri::new("urn:uuid:ba7ebb1c-5a2a-4b6b-9b1e-6b3c0c2fd0a1")
}

/// Dataset with `contacts` contact points, each a blank node with a name and
/// a nested blank organisation.
fn sample(contacts: &[(String, String)], prefix: &str) -> Graph {
    let mut graph = Graph::new();
    graph.insert(dataset(), Iri::new(rdf::TYPE), Iri::new(dcat::DATASET));
    graph.insert(dataset(), Iri::new(dct::TITLE), Literal::lang_string("Titre", "fr"));
    for (i, (name, org)) in contacts.iter().enumerate() {
        let contact = BlankNode::new(format!("{prefix}c{i}"));
        let organisation = BlankNode::new(format!("{prefix}o{i}"));
        graph.insert(dataset(), Iri::new(dcat::CONTACT_POINT), contact.clone());
        graph.insert(contact.clone(), Iri::new(rdf::TYPE), Iri::new(vcard::KIND));
        graph.insert(contact.clone(), Iri::new(vcard::FN), Literal::plain(name.clone()));
        graph.insert(contact, Iri::new(dct::PUBLISHER), organisation.clone());
        graph.insert(organisation, Iri::new(foaf::NAME), Literal::plain(org.clone()));
    }
    graph
}

#[test]
fn identical_graphs_are_isomorphic() {
    let contacts = vec![("Jean".to_owned(), "DDT".to_owned())];
    assert!(sample(&contacts, "a").is_isomorphic(&sample(&contacts, "a")));
}

#[test]
fn symmetric_blank_structures_are_matched() {
    // Two contacts sharing every literal force the search to try both
    // assignments.
    let contacts = vec![
        ("Jean".to_owned(), "DDT".to_owned()),
        ("Jean".to_owned(), "DDT".to_owned()),
    ];
    assert!(sample(&contacts, "x").is_isomorphic(&sample(&contacts, "y")));
}

#[test]
fn crossed_links_are_not_isomorphic() {
    let a = BlankNode::new("a");
    let b = BlankNode::new("b");
    let p = Iri::new(dct::PUBLISHER);
    let name = Iri::new(foaf::NAME);

    let mut left = Graph::new();
    left.insert(a.clone(), p.clone(), b.clone());
    left.insert(a.clone(), name.clone(), Literal::plain("one"));
    left.insert(b.clone(), name.clone(), Literal::plain("two"));

    let mut right = Graph::new();
    right.insert(b.clone(), p, a.clone());
    right.insert(a, name.clone(), Literal::plain("one"));
    right.insert(b, name, Literal::plain("two"));

    assert!(!left.is_isomorphic(&right));
}

#[test]
fn json_round_trip_keeps_isomorphism() {
    let contacts = vec![("Marie".to_owned(), "IGN".to_owned())];
    let graph = sample(&contacts, "n");
    let json = serde_json::to_string(&graph).expect("serialize");
    let back: Graph = serde_json::from_str(&json).expect("deserialize");
    assert!(graph.is_isomorphic(&back));
}

proptest! {
    #[test]
    fn relabelling_blank_nodes_preserves_isomorphism(
        contacts in proptest::collection::vec(("[a-z]{1,6}", "[A-Z]{1,4}"), 0..5),
    ) {
        let left = sample(&contacts, "left");
        let right = sample(&contacts, "right");
        prop_assert!(left.is_isomorphic(&right));
        prop_assert!(right.is_isomorphic(&left));
    }

    #[test]
    fn removing_a_statement_breaks_isomorphism(
        contacts in proptest::collection::vec(("[a-z]{1,6}", "[A-Z]{1,4}"), 1..4),
        pick in any::<prop::sample::Index>(),
    ) {
        let left = sample(&contacts, "l");
        let mut right = sample(&contacts, "r");
        let triples: Vec<Triple> = right.iter().cloned().collect();
        let victim = &triples[pick.index(triples.len())];
        right.remove(victim);
        right.insert(
            Term::from(dataset()),
            Iri::new(dct::DESCRIPTION),
            Literal::plain("filler"),
        );
        prop_assert!(!left.is_isomorphic(&right));
    }
}
