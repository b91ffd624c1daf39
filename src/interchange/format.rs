//! Common trait for design interchange formats.

use super::InterchangeError;
use crate::model::Design;

/// Capabilities supported by a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatCapability {
    /// Can read/import designs.
    pub read: bool,
    /// Can write/export designs.
    pub write: bool,
    /// Preserves factors, relationships and metadata exactly.
    pub lossless: bool,
}

impl FormatCapability {
    /// Full capability (read, write, lossless).
    pub const FULL: Self = Self {
        read: true,
        write: true,
        lossless: true,
    };

    /// Write-only capability.
    pub const WRITE_ONLY: Self = Self {
        read: false,
        write: true,
        lossless: false,
    };
}

/// Serialization between a [`Design`] and an external file format.
pub trait DesignFormat: Send + Sync {
    /// Human-readable name of the format.
    fn name(&self) -> &'static str;

    /// File extension(s) for this format.
    fn extensions(&self) -> &'static [&'static str];

    fn mime_type(&self) -> &'static str;

    fn capabilities(&self) -> FormatCapability;

    /// Read a design from bytes.
    fn read(&self, input: &[u8]) -> Result<Design, InterchangeError>;

    /// Write a design to bytes.
    fn write(&self, design: &Design) -> Result<Vec<u8>, InterchangeError>;

    /// Cheap structural check without building a design.
    fn validate(&self, input: &[u8]) -> Result<(), InterchangeError> {
        let content = std::str::from_utf8(input)
            .map_err(|e| InterchangeError::Unsupported(format!("Invalid UTF-8: {e}")))?;
        if content.trim().is_empty() {
            return Err(InterchangeError::Unsupported(format!(
                "Empty {} content",
                self.name()
            )));
        }
        Ok(())
    }
}
