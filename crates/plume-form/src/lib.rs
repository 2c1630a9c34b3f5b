#![forbid(unsafe_code)]

//! Widgets dictionary for Plume metadata forms.
//!
//! [`FormBuilder`] walks a property [`Schema`] over the metadata graph of
//! a dataset, applies the optional [`FormTemplate`] and [`OverrideData`],
//! and produces a [`WidgetsDict`]: a form tree from `plume-tree` plus the
//! [`InternalDict`] presentation cache of every node.
//!
//! The presentation layer reads the cache and the grid placements, then
//! sends user actions back through the edit API ([`WidgetsDict::add`],
//! [`WidgetsDict::change_source`], [`WidgetsDict::update_value`], ...).
//! Each call returns a [`FormUpdate`] listing the widgets to refresh.
//! [`WidgetsDict::build_metagraph`] exports the edited metadata.

pub mod grid;
pub mod internal;
pub mod labels;
pub mod options;
pub mod schema;
pub mod template;
pub mod value;
pub mod vocabulary;
pub mod widgets_dict;

pub use grid::{GRID_WIDTH, Placement, WidgetKind};
pub use internal::{InternalDict, ObjectKind, TypeValidator, WidgetFlags, WidgetType};
pub use options::{FormOptions, Mode};
pub use schema::{PropertyDescriptor, PropertyKind, Schema, ShapeSchema};
pub use template::{FormTemplate, OverrideData, ResolvedTemplate, TemplateEntry};
pub use vocabulary::{Concept, ConceptScheme, MemoryVocabulary, Vocabulary};
pub use widgets_dict::{FormBuilder, FormUpdate, WidgetsDict};
