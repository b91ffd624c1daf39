//! YAML format support.
//!
//! Same document structure as JSON in YAML syntax:
//!
//! ```yaml
//! schema_version: '1.0'
//! study: Atlas
//! factors:
//! - name: Site
//!   n: 3
//!   type: factor
//! relationships:
//! - from: Site
//!   to: Patient
//!   type: nests
//! metadata:
//!   confound_groups: []
//!   notes: Pilot cohort
//! ```

use super::{DesignFormat, FormatCapability, InterchangeError};
use crate::model::Design;

/// YAML format handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Yaml;

impl DesignFormat for Yaml {
    fn name(&self) -> &'static str {
        "YAML"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["yaml", "yml"]
    }

    fn mime_type(&self) -> &'static str {
        "application/x-yaml"
    }

    fn capabilities(&self) -> FormatCapability {
        FormatCapability::FULL
    }

    fn read(&self, input: &[u8]) -> Result<Design, InterchangeError> {
        #[cfg(feature = "interchange")]
        {
            let doc: crate::model::DesignDocument = serde_yaml::from_slice(input)
                .map_err(|e| InterchangeError::yaml(format!("YAML parse error: {e}")))?;
            Ok(Design::from_document(&doc)?)
        }
        #[cfg(not(feature = "interchange"))]
        {
            let _ = input;
            Err(InterchangeError::feature_required("YAML reading"))
        }
    }

    fn write(&self, design: &Design) -> Result<Vec<u8>, InterchangeError> {
        #[cfg(feature = "interchange")]
        {
            let text = serde_yaml::to_string(&design.to_document())
                .map_err(|e| InterchangeError::yaml(format!("YAML write error: {e}")))?;
            Ok(text.into_bytes())
        }
        #[cfg(not(feature = "interchange"))]
        {
            let _ = design;
            Err(InterchangeError::feature_required("YAML writing"))
        }
    }
}
