//! Diagram tests

mod tests_diagram;
