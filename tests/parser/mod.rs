//! Parser tests
//!
//! Whole-document parsing through the public entry points:
//! - Edge sets produced by realistic designs
//! - Error codes and positions reported to callers
//! - Incremental parsing into an existing design

mod tests_errors;
mod tests_notation;
