//! In-memory metadata graph.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::isomorphism;
use crate::namespace::{dcat, rdf};
use crate::term::{BlankNode, Iri, Term};

/// One subject / predicate / object statement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Iri,
    pub object: Term,
}

impl Triple {
    #[must_use]
    pub fn new(subject: impl Into<Term>, predicate: Iri, object: impl Into<Term>) -> Self {
        Self {
            subject: subject.into(),
            predicate,
            object: object.into(),
        }
    }

    /// True when neither end is a blank node.
    #[must_use]
    pub fn is_ground(&self) -> bool {
        !self.subject.is_blank() && !self.object.is_blank()
    }

    /// N-Triples line, without the trailing newline.
    #[must_use]
    pub fn to_ntriples(&self) -> String {
        format!(
            "{} <{}> {} .",
            self.subject.to_ntriples(),
            self.predicate,
            self.object.to_ntriples()
        )
    }
}

/// Ordered set of triples.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Graph {
    triples: BTreeSet<Triple>,
}

impl Graph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Insert a statement. Returns false if it was already present.
    pub fn insert(&mut self, subject: impl Into<Term>, predicate: Iri, object: impl Into<Term>) -> bool {
        self.triples.insert(Triple::new(subject, predicate, object))
    }

    pub fn insert_triple(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    pub fn remove(&mut self, triple: &Triple) -> bool {
        self.triples.remove(triple)
    }

    #[must_use]
    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Objects of `subject` through `predicate`, in term order.
    pub fn objects<'a, 'b>(
        &'a self,
        subject: &'b Term,
        predicate: &'b Iri,
    ) -> impl Iterator<Item = &'a Term> + use<'a, 'b> {
        let start = Triple::new(subject.clone(), predicate.clone(), lowest_term());
        self.triples
            .range(start..)
            .take_while(move |t| &t.subject == subject && &t.predicate == predicate)
            .map(|t| &t.object)
    }

    /// Every predicate / object pair of `subject`.
    pub fn predicate_objects<'a, 'b>(
        &'a self,
        subject: &'b Term,
    ) -> impl Iterator<Item = (&'a Iri, &'a Term)> + use<'a, 'b> {
        let start = Triple::new(subject.clone(), Iri::new(""), lowest_term());
        self.triples
            .range(start..)
            .take_while(move |t| &t.subject == subject)
            .map(|t| (&t.predicate, &t.object))
    }

    /// Subjects declared with `rdf:type class`.
    #[must_use]
    pub fn subjects_with_type(&self, class: &str) -> Vec<&Term> {
        self.triples
            .iter()
            .filter(|t| t.predicate.is(rdf::TYPE) && t.object.as_iri().is_some_and(|o| o.is(class)))
            .map(|t| &t.subject)
            .collect()
    }

    /// IRI of the described dataset, i.e. the first subject typed
    /// `dcat:Dataset`.
    #[must_use]
    pub fn dataset_id(&self) -> Option<&Iri> {
        self.subjects_with_type(dcat::DATASET)
            .into_iter()
            .find_map(Term::as_iri)
    }

    /// Blank nodes occurring anywhere in the graph.
    #[must_use]
    pub fn blank_nodes(&self) -> BTreeSet<&BlankNode> {
        let mut nodes = BTreeSet::new();
        for triple in &self.triples {
            if let Some(node) = triple.subject.as_blank() {
                nodes.insert(node);
            }
            if let Some(node) = triple.object.as_blank() {
                nodes.insert(node);
            }
        }
        nodes
    }

    /// True when both graphs are equal up to a renaming of blank nodes.
    #[must_use]
    pub fn is_isomorphic(&self, other: &Self) -> bool {
        isomorphism::isomorphic(self, other)
    }

    /// Sorted N-Triples document.
    #[must_use]
    pub fn to_ntriples(&self) -> String {
        let mut out = String::new();
        for triple in &self.triples {
            out.push_str(&triple.to_ntriples());
            out.push('\n');
        }
        out
    }
}

/// Smallest term in the triple order. Triples sort by subject, then
/// predicate, then object, so a range starting at
/// `(subject, predicate, lowest_term())` begins with the first match.
fn lowest_term() -> Term {
    Term::Iri(Iri::new(""))
}

impl FromIterator<Triple> for Graph {
    fn from_iter<T: IntoIterator<Item = Triple>>(iter: T) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}

impl Extend<Triple> for Graph {
    fn extend<T: IntoIterator<Item = Triple>>(&mut self, iter: T) {
        self.triples.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = std::collections::btree_set::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::dct;
    use crate::term::Literal;

    fn dataset() -> Iri {
        Iri::new("urn:uuid:479fd670-32c5-4ade-a26d-0268b0ce5046")
    }

    #[test]
    fn objects_filters_subject_and_predicate() {
        let mut graph = Graph::new();
        let subject = Term::from(dataset());
        graph.insert(subject.clone(), Iri::new(dct::TITLE), Literal::lang_string("Titre", "fr"));
        graph.insert(subject.clone(), Iri::new(dct::TITLE), Literal::lang_string("Title", "en"));
        graph.insert(subject.clone(), Iri::new(dct::DESCRIPTION), Literal::plain("x"));
        let title = Iri::new(dct::TITLE);
        assert_eq!(graph.objects(&subject, &title).count(), 2);
        assert_eq!(graph.predicate_objects(&subject).count(), 3);
    }

    #[test]
    fn lookups_stop_at_neighbouring_subjects() {
        let mut graph = Graph::new();
        let before = Iri::new("urn:a");
        let after = Iri::new("urn:z");
        graph.insert(before.clone(), Iri::new(dct::TITLE), Literal::plain("a"));
        graph.insert(after.clone(), Iri::new(dct::TITLE), Literal::plain("z"));
        graph.insert(dataset(), Iri::new(dct::DESCRIPTION), Literal::plain("d"));
        graph.insert(dataset(), Iri::new(dct::TITLE), Literal::plain("t"));
        graph.insert(dataset(), Iri::new(dct::TITLE), BlankNode::new("b"));
        graph.insert(dataset(), Iri::new(dct::TITLE), Iri::new("urn:title"));

        let titles: Vec<&Term> = graph
            .objects(&Term::Iri(dataset()), &Iri::new(dct::TITLE))
            .collect();
        assert_eq!(titles.len(), 3);
        assert!(titles.contains(&&Term::from(Literal::plain("t"))));
        assert_eq!(graph.predicate_objects(&Term::Iri(dataset())).count(), 4);
        assert_eq!(graph.predicate_objects(&Term::Iri(before)).count(), 1);
        assert_eq!(graph.predicate_objects(&Term::Iri(after)).count(), 1);
        assert_eq!(
            graph.objects(&BlankNode::new("b").into(), &Iri::new(dct::TITLE)).count(),
            0
        );
    }

    #[test]
    fn dataset_id_finds_typed_subject() {
        let mut graph = Graph::new();
        graph.insert(dataset(), Iri::new(rdf::TYPE), Iri::new(dcat::DATASET));
        assert_eq!(graph.dataset_id(), Some(&dataset()));
    }

    #[test]
    fn insert_is_idempotent() {
        let mut graph = Graph::new();
        assert!(graph.insert(dataset(), Iri::new(dct::TITLE), Literal::plain("a")));
        assert!(!graph.insert(dataset(), Iri::new(dct::TITLE), Literal::plain("a")));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn json_round_trip_preserves_graph() {
        let mut graph = Graph::new();
        graph.insert(dataset(), Iri::new(dct::TITLE), Literal::lang_string("Titre", "fr"));
        graph.insert(dataset(), Iri::new(dcat::CONTACT_POINT), BlankNode::new("c"));
        let json = serde_json::to_string(&graph).expect("serialize");
        let back: Graph = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, graph);
    }
}
