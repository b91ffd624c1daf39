//! Foundation types for the edgram pipeline.
//!
//! This module provides the primitives shared by every later stage:
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`Position`], [`LineIndex`] - Line/column conversion for diagnostics
//!
//! This module has NO dependencies on other edgram modules.

mod position;

pub use position::{LineIndex, Position};

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};
