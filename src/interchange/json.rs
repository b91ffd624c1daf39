//! JSON format support.
//!
//! Reads and writes the [`DesignDocument`](crate::model::DesignDocument)
//! form with `serde_json`, pretty-printed with two-space indentation.

use super::{DesignFormat, FormatCapability, InterchangeError};
use crate::model::Design;

/// JSON format handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json;

impl DesignFormat for Json {
    fn name(&self) -> &'static str {
        "JSON"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn mime_type(&self) -> &'static str {
        "application/json"
    }

    fn capabilities(&self) -> FormatCapability {
        FormatCapability::FULL
    }

    fn read(&self, input: &[u8]) -> Result<Design, InterchangeError> {
        #[cfg(feature = "interchange")]
        {
            reader::read(input)
        }
        #[cfg(not(feature = "interchange"))]
        {
            let _ = input;
            Err(InterchangeError::feature_required("JSON reading"))
        }
    }

    fn write(&self, design: &Design) -> Result<Vec<u8>, InterchangeError> {
        #[cfg(feature = "interchange")]
        {
            let doc = design.to_document();
            serde_json::to_vec_pretty(&doc)
                .map_err(|e| InterchangeError::json(format!("Write error: {e}")))
        }
        #[cfg(not(feature = "interchange"))]
        {
            let _ = design;
            Err(InterchangeError::feature_required("JSON writing"))
        }
    }
}

// ============================================================================
// JSON READER (requires interchange feature)
// ============================================================================

#[cfg(feature = "interchange")]
mod reader {
    use super::*;
    use crate::model::DesignDocument;

    pub fn read(input: &[u8]) -> Result<Design, InterchangeError> {
        let doc: DesignDocument = serde_json::from_slice(input)
            .map_err(|e| InterchangeError::json(format!("Parse error: {e}")))?;
        Ok(Design::from_document(&doc)?)
    }
}
