//! Design interchange formats.
//!
//! - **JSON** / **YAML** - the declarative document form, lossless
//! - **GraphML** - nodes and typed edges, readable by graph tooling
//! - **DOT** - Graphviz export, write-only
//!
//! JSON, YAML and GraphML need the `interchange` feature; without it their
//! handlers exist but return [`InterchangeError::Unsupported`]. DOT and the
//! [`DesignGraph`] adapter are always available.
//!
//! ```text
//! ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────┐
//! │   JSON   │  │   YAML   │  │ GraphML  │  │   DOT    │
//! └────┬─────┘  └────┬─────┘  └────┬─────┘  └────▲─────┘
//!      │             │             │             │
//!      ▼             ▼             ▼             │
//! ┌──────────────────────────────────────────────┴─────┐
//! │                 DesignFormat trait                 │
//! │  - read(&[u8]) -> Result<Design>                   │
//! │  - write(&Design) -> Result<Vec<u8>>               │
//! └────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use edgram::interchange::{DesignFormat, Json};
//!
//! let design = Design::from_grammar("Site(3) > Patient(20)")?;
//! let bytes = Json.write(&design)?;
//! let back = Json.read(&bytes)?;
//! ```

mod dot;
mod error;
mod format;
mod graph;
mod graphml;
mod json;
mod yaml;

use std::path::Path;

use tracing::debug;

pub use dot::{Dot, sanitize_id, to_dot};
pub use error::InterchangeError;
pub use format::{DesignFormat, FormatCapability};
pub use graph::{DesignGraph, GraphEdge, NodeAttrs};
pub use graphml::{GRAPHML_NS, GraphMl};
pub use json::Json;
pub use yaml::Yaml;

use crate::model::Design;

/// Supported file extensions for interchange formats.
pub fn supported_extensions() -> &'static [&'static str] {
    &["json", "yaml", "yml", "graphml", "dot", "gv"]
}

/// Detect format from file extension.
pub fn detect_format(path: &Path) -> Option<Box<dyn DesignFormat>> {
    let ext = path.extension()?.to_str()?;
    match ext.to_lowercase().as_str() {
        "json" => Some(Box::new(Json)),
        "yaml" | "yml" => Some(Box::new(Yaml)),
        "graphml" => Some(Box::new(GraphMl)),
        "dot" | "gv" => Some(Box::new(Dot)),
        _ => None,
    }
}

fn format_for(path: &Path) -> Result<Box<dyn DesignFormat>, InterchangeError> {
    detect_format(path).ok_or_else(|| {
        InterchangeError::Unsupported(format!("no format for '{}'", path.display()))
    })
}

fn utf8(bytes: Vec<u8>) -> Result<String, InterchangeError> {
    String::from_utf8(bytes)
        .map_err(|e| InterchangeError::Unsupported(format!("Invalid UTF-8 output: {e}")))
}

impl Design {
    pub fn to_json(&self) -> Result<String, InterchangeError> {
        utf8(Json.write(self)?)
    }

    pub fn from_json(text: &str) -> Result<Design, InterchangeError> {
        Json.read(text.as_bytes())
    }

    pub fn to_yaml(&self) -> Result<String, InterchangeError> {
        utf8(Yaml.write(self)?)
    }

    pub fn from_yaml(text: &str) -> Result<Design, InterchangeError> {
        Yaml.read(text.as_bytes())
    }

    pub fn to_graphml(&self) -> Result<String, InterchangeError> {
        utf8(GraphMl.write(self)?)
    }

    pub fn to_dot(&self) -> String {
        to_dot(self)
    }

    /// Write the design to `path`, choosing the format by extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), InterchangeError> {
        let path = path.as_ref();
        let format = format_for(path)?;
        let bytes = format.write(self)?;
        std::fs::write(path, &bytes)?;
        debug!(path = %path.display(), format = format.name(), bytes = bytes.len(), "saved design");
        Ok(())
    }

    /// Read a design from `path`, choosing the format by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Design, InterchangeError> {
        let path = path.as_ref();
        let format = format_for(path)?;
        if !format.capabilities().read {
            return Err(InterchangeError::Unsupported(format!(
                "{} cannot be read",
                format.name()
            )));
        }
        let bytes = std::fs::read(path)?;
        format.validate(&bytes)?;
        let design = format.read(&bytes)?;
        debug!(path = %path.display(), factors = design.factor_count(), "loaded design");
        Ok(design)
    }
}
