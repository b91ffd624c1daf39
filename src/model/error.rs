use smol_str::SmolStr;
use thiserror::Error;

/// Errors raised by programmatic design mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DesignError {
    #[error("invalid size for factor '{name}': {reason}")]
    InvalidSize { name: SmolStr, reason: &'static str },

    #[error("invalid factor name '{0}'")]
    InvalidName(SmolStr),

    #[error("factor '{0}' already exists")]
    DuplicateFactor(SmolStr),

    #[error("unknown factor '{0}'")]
    UnknownFactor(SmolStr),

    #[error("factor '{0}' cannot be related to itself")]
    SelfLoop(SmolStr),

    #[error("unsupported schema version '{0}'")]
    UnsupportedVersion(String),

    #[error("invalid design document: {0}")]
    InvalidDocument(String),
}

impl DesignError {
    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }
}
