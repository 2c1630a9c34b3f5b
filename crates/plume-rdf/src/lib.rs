#![forbid(unsafe_code)]

//! RDF model consumed and produced by the Plume form engine.
//!
//! The form tree reads the current values of a dataset description from a
//! metadata graph and can always regenerate an equivalent graph. This crate
//! provides the small RDF surface both directions need:
//!
//! - [`Term`] and its parts ([`Iri`], [`BlankNode`], [`Literal`]).
//! - Vocabulary constants in [`namespace`] and a [`PrefixMap`] for compact names.
//! - [`PropertyPath`], the chain of predicates identifying a form field.
//! - [`Graph`], an ordered triple set with blank-node aware isomorphism.
//!
//! Parsing and serializing textual RDF is left to callers.

pub mod graph;
mod isomorphism;
pub mod namespace;
pub mod path;
pub mod term;

use std::fmt;

pub use graph::{Graph, Triple};
pub use namespace::PrefixMap;
pub use path::PropertyPath;
pub use term::{BlankNode, Iri, Literal, Term};

/// Errors raised while resolving compact names and paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RdfError {
    /// A compact name used a prefix the map does not know.
    UnknownPrefix { prefix: String },
    /// A path string could not be split into predicates.
    InvalidPath { path: String },
    /// An IRI contains characters that cannot appear in an IRI.
    InvalidIri { iri: String },
}

impl fmt::Display for RdfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPrefix { prefix } => write!(f, "unknown namespace prefix '{prefix}'"),
            Self::InvalidPath { path } => write!(f, "invalid property path '{path}'"),
            Self::InvalidIri { iri } => write!(f, "invalid IRI '{iri}'"),
        }
    }
}

impl std::error::Error for RdfError {}
