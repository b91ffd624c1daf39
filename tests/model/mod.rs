//! Model tests
//!
//! Observation counting, validation and document conversion over designs
//! built from notation and through the mutation API.

mod tests_document;
mod tests_mutation;
mod tests_observations;
mod tests_validation;
