//! Error types for interchange operations.

use thiserror::Error;

use crate::model::DesignError;

/// Errors that can occur while reading or writing a design.
#[derive(Debug, Error)]
pub enum InterchangeError {
    /// XML parsing or serialization error.
    #[error("XML error: {0}")]
    Xml(String),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// YAML parsing or serialization error.
    #[error("YAML error: {0}")]
    Yaml(String),

    /// IO error during read/write.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document declares a schema version this crate cannot read.
    #[error("Unsupported schema version: {0}")]
    UnsupportedVersion(String),

    /// Missing required element or attribute.
    #[error("Missing required {kind}: {name}")]
    Missing { kind: &'static str, name: String },

    /// Unsupported feature or format variant.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// The document was well-formed but does not describe a valid design.
    #[error(transparent)]
    Design(DesignError),
}

impl From<DesignError> for InterchangeError {
    fn from(error: DesignError) -> Self {
        match error {
            DesignError::UnsupportedVersion(version) => Self::UnsupportedVersion(version),
            other => Self::Design(other),
        }
    }
}

impl InterchangeError {
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml(message.into())
    }

    pub fn json(message: impl Into<String>) -> Self {
        Self::Json(message.into())
    }

    pub fn yaml(message: impl Into<String>) -> Self {
        Self::Yaml(message.into())
    }

    pub fn missing_attribute(name: impl Into<String>) -> Self {
        Self::Missing {
            kind: "attribute",
            name: name.into(),
        }
    }

    pub fn missing_element(name: impl Into<String>) -> Self {
        Self::Missing {
            kind: "element",
            name: name.into(),
        }
    }

    #[cfg(not(feature = "interchange"))]
    pub(crate) fn feature_required(what: &str) -> Self {
        Self::Unsupported(format!("{what} requires the 'interchange' feature"))
    }
}
