//! Shared fixtures and assertions for integration tests.

#![allow(dead_code)]

pub mod design_assertions;
pub mod source_fixtures;
