//! Structural model of an experimental design.
//!
//! A [`Design`] owns an arena of [`Factor`]s addressed by [`FactorId`], an
//! ordered list of typed [`Relationship`]s, and [`DesignMetadata`]. On top
//! of that it provides:
//!
//! - the mutation API (`add_factor`, `add_nesting`, `add_batch_effect`, ...)
//! - [`Design::validate`], which collects [`ValidationIssue`]s
//! - [`Design::count_observations`] and [`Design::level_counts`]
//! - the declarative [`DesignDocument`] form
//! - [`SharedDesign`], a lock around a design for use across threads

mod describe;
mod design;
mod document;
mod error;
mod factor;
mod observations;
mod relationship;
mod shared;
mod validate;

pub use design::{Design, DesignMetadata};
pub use document::{
    DesignDocument, FactorRecord, MetadataRecord, RelationshipRecord, SCHEMA_VERSION, SizeRecord,
};
pub use error::DesignError;
pub use factor::{Factor, FactorId, FactorKind, FactorSize};
pub use observations::ObservationCount;
pub(crate) use observations::DisjointSet;
pub use relationship::{RelationKind, Relationship};
pub use shared::SharedDesign;
pub use validate::{IssueKind, IssueSeverity, ValidationIssue};
