//! Blank-node aware graph comparison.
//!
//! Blank nodes are first coloured by iterative refinement over their
//! neighbourhoods; candidate mappings are then searched only among nodes of
//! equal colour, checking every statement whose blank nodes are all mapped.

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHasher};

use crate::graph::{Graph, Triple};
use crate::term::{BlankNode, Term};

pub(crate) fn isomorphic(a: &Graph, b: &Graph) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let ground_a: BTreeSet<&Triple> = a.iter().filter(|t| t.is_ground()).collect();
    let ground_b: BTreeSet<&Triple> = b.iter().filter(|t| t.is_ground()).collect();
    if ground_a != ground_b {
        return false;
    }

    let blanks_a: Vec<&BlankNode> = a.blank_nodes().into_iter().collect();
    let blanks_b: Vec<&BlankNode> = b.blank_nodes().into_iter().collect();
    if blanks_a.len() != blanks_b.len() {
        return false;
    }
    if blanks_a.is_empty() {
        return true;
    }

    let colors_a = refine(a, &blanks_a);
    let colors_b = refine(b, &blanks_b);
    let mut histogram_a: Vec<u64> = colors_a.values().copied().collect();
    let mut histogram_b: Vec<u64> = colors_b.values().copied().collect();
    histogram_a.sort_unstable();
    histogram_b.sort_unstable();
    if histogram_a != histogram_b {
        return false;
    }

    // Most constrained nodes first.
    let mut class_size: FxHashMap<u64, usize> = FxHashMap::default();
    for color in colors_a.values() {
        *class_size.entry(*color).or_default() += 1;
    }
    let mut order = blanks_a.clone();
    order.sort_by_key(|node| (class_size[&colors_a[node]], colors_a[node]));

    let mut incident: FxHashMap<&BlankNode, Vec<&Triple>> = FxHashMap::default();
    for triple in a.iter().filter(|t| !t.is_ground()) {
        if let Some(node) = triple.subject.as_blank() {
            incident.entry(node).or_default().push(triple);
        }
        if let Some(node) = triple.object.as_blank() {
            incident.entry(node).or_default().push(triple);
        }
    }

    let mut search = Search {
        target: b,
        order: &order,
        colors_a: &colors_a,
        colors_b: &colors_b,
        candidates: &blanks_b,
        incident: &incident,
        mapping: FxHashMap::default(),
        used: BTreeSet::new(),
    };
    search.extend(0)
}

fn term_hash(term: &Term) -> u64 {
    let mut hasher = FxHasher::default();
    term.hash(&mut hasher);
    hasher.finish()
}

fn refine<'g>(graph: &'g Graph, blanks: &[&'g BlankNode]) -> FxHashMap<&'g BlankNode, u64> {
    let mut colors: FxHashMap<&BlankNode, u64> = blanks.iter().map(|node| (*node, 0)).collect();
    let mut distinct = 1;
    for _ in 0..=blanks.len() {
        let mut next: FxHashMap<&BlankNode, u64> = FxHashMap::default();
        for node in blanks {
            let mut signature: Vec<(u8, u64, u64)> = Vec::new();
            for triple in graph.iter() {
                let predicate = {
                    let mut hasher = FxHasher::default();
                    triple.predicate.hash(&mut hasher);
                    hasher.finish()
                };
                if triple.subject.as_blank() == Some(*node) {
                    let other = match triple.object.as_blank() {
                        Some(object) => colors[object],
                        None => term_hash(&triple.object),
                    };
                    signature.push((0, predicate, other));
                }
                if triple.object.as_blank() == Some(*node) {
                    let other = match triple.subject.as_blank() {
                        Some(subject) => colors[subject],
                        None => term_hash(&triple.subject),
                    };
                    signature.push((1, predicate, other));
                }
            }
            signature.sort_unstable();
            let mut hasher = FxHasher::default();
            colors[node].hash(&mut hasher);
            signature.hash(&mut hasher);
            next.insert(*node, hasher.finish());
        }
        let now: BTreeSet<u64> = next.values().copied().collect();
        colors = next;
        if now.len() == distinct {
            break;
        }
        distinct = now.len();
    }
    colors
}

struct Search<'a, 'g> {
    target: &'g Graph,
    order: &'a [&'g BlankNode],
    colors_a: &'a FxHashMap<&'g BlankNode, u64>,
    colors_b: &'a FxHashMap<&'g BlankNode, u64>,
    candidates: &'a [&'g BlankNode],
    incident: &'a FxHashMap<&'g BlankNode, Vec<&'g Triple>>,
    mapping: FxHashMap<&'g BlankNode, &'g BlankNode>,
    used: BTreeSet<&'g BlankNode>,
}

impl<'g> Search<'_, 'g> {
    fn extend(&mut self, depth: usize) -> bool {
        let Some(node) = self.order.get(depth).copied() else {
            return true;
        };
        let color = self.colors_a[node];
        for candidate in self.candidates.iter().copied() {
            if self.used.contains(candidate) || self.colors_b[candidate] != color {
                continue;
            }
            self.mapping.insert(node, candidate);
            self.used.insert(candidate);
            if self.consistent(node) && self.extend(depth + 1) {
                return true;
            }
            self.mapping.remove(node);
            self.used.remove(candidate);
        }
        false
    }

    /// Check the statements around `node` whose blank nodes are all mapped.
    fn consistent(&self, node: &BlankNode) -> bool {
        let Some(triples) = self.incident.get(node) else {
            return true;
        };
        for triple in triples {
            let (Some(subject), Some(object)) = (self.map(&triple.subject), self.map(&triple.object))
            else {
                continue;
            };
            let image = Triple {
                subject,
                predicate: triple.predicate.clone(),
                object,
            };
            if !self.target.contains(&image) {
                return false;
            }
        }
        true
    }

    fn map(&self, term: &Term) -> Option<Term> {
        match term.as_blank() {
            Some(node) => self.mapping.get(node).map(|image| Term::Blank((*image).clone())),
            None => Some(term.clone()),
        }
    }
}
