//! Character diagrams of a design.
//!
//! [`Canvas`] is a layered grid of box-drawing glyphs; [`Layout`] places
//! every factor and issues the drawing calls.

mod canvas;
mod layout;

pub use canvas::{Canvas, Corner, Junction, Layer, Stroke};
pub use layout::{Anchor, EMPTY_DIAGRAM, FlowLine, Layout, LayoutOptions, render_diagram};
