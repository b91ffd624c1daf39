#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

#[path = "helpers/mod.rs"]
mod helpers;

#[path = "model/mod.rs"]
mod model;

#[path = "parser/mod.rs"]
mod parser;

#[path = "render/mod.rs"]
mod render;
