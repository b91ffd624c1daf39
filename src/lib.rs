//! # edgram
//!
//! Notation, structural model, and character diagrams for hierarchical and
//! crossed experimental designs.
//!
//! ```text
//! Site(3) > Patient(20) × Treatment(2) > Cell(~5k) : CellType(35)
//! ```
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! render       → Layered canvas, layout engine, diagrams
//!   ↓
//! interchange  → JSON/YAML/GraphML/DOT, directed-graph adapter
//!   ↓
//! parser       → Logos lexer, precedence-climbing parser, error codes
//!   ↓
//! model        → Design arena, validator, observation counting
//!   ↓
//! base         → Primitives (TextRange, Position, LineIndex)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use edgram::Design;
//!
//! let design = Design::from_grammar("Site(3) > Patient(20) > Cell(1000)")?;
//! assert!(design.validate().is_empty());
//! assert_eq!(design.count_observations().total, 60_000);
//! println!("{}", design.ascii_diagram());
//! ```

// ============================================================================
// MODULES (dependency order: base → model → parser → interchange → render)
// ============================================================================

/// Foundation types: TextRange, Position, LineIndex
pub mod base;

/// Structural model: factors, relationships, validation, counting
pub mod model;

/// Parser: Logos lexer, precedence-climbing parser, error codes
pub mod parser;

/// Interchange formats: JSON, YAML, GraphML, DOT
pub mod interchange;

/// Diagrams: layered canvas and layout engine
pub mod render;

// Re-export the model surface
pub use model::{
    Design, DesignDocument, DesignError, DesignMetadata, Factor, FactorId, FactorKind, FactorSize,
    IssueKind, IssueSeverity, ObservationCount, RelationKind, Relationship, SharedDesign,
    ValidationIssue,
};

// Re-export entry points of the later stages
pub use interchange::{DesignFormat, InterchangeError};
pub use parser::{ParseError, ParseOptions, parse};
pub use render::{LayoutOptions, render_diagram};

// Re-export foundation types
pub use base::{LineIndex, Position, TextRange, TextSize};
