//! Error code definitions for parser diagnostics
//!
//! Error codes follow a naming convention: E{category}{number}
//! - E01xx: Lexical errors (characters, numbers)
//! - E02xx: Delimiter errors (parentheses, brackets, braces)
//! - E03xx: Factor declaration errors (sizes, confound groups)
//! - E04xx: Operator chain errors
//! - E05xx: Design-level errors (references, batch effects)
//! - E09xx: Generic/fallback errors

use std::fmt;

/// Error codes for parser diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // E01xx: Lexical errors
    // =========================================================================
    /// Character that starts no token
    E0101,
    /// Delimiter left open at end of input
    E0102,
    /// Malformed number, e.g. `12abc`
    E0103,
    /// Number too large to represent
    E0104,

    // =========================================================================
    // E02xx: Delimiter errors
    // =========================================================================
    /// Unclosed parenthesis `(`
    E0201,
    /// Unclosed bracket `[`
    E0202,
    /// Unclosed brace `{`
    E0203,
    /// Unexpected closing delimiter
    E0204,

    // =========================================================================
    // E03xx: Factor declaration errors
    // =========================================================================
    /// First mention of a factor without a size
    E0301,
    /// Zero size or branch count
    E0302,
    /// Later mention with a different size
    E0303,
    /// Unbalanced size with no branches
    E0304,
    /// Confound group with fewer than two members
    E0305,
    /// Confound group member that is not a bare factor
    E0306,

    // =========================================================================
    // E04xx: Operator chain errors
    // =========================================================================
    /// Operator not followed by an operand
    E0401,
    /// Operator applied to a classified operand
    E0402,

    // =========================================================================
    // E05xx: Design-level errors
    // =========================================================================
    /// Batch operator on a factor registered by an earlier expression
    E0501,
    /// Relationship from a factor to itself
    E0502,

    // =========================================================================
    // E09xx: Generic errors
    // =========================================================================
    /// Unexpected token
    E0901,
    /// Expected a specific token
    E0902,
    /// Internal parser error
    E0999,
}

impl ErrorCode {
    /// Get the string representation of the error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E0101 => "E0101",
            Self::E0102 => "E0102",
            Self::E0103 => "E0103",
            Self::E0104 => "E0104",
            Self::E0201 => "E0201",
            Self::E0202 => "E0202",
            Self::E0203 => "E0203",
            Self::E0204 => "E0204",
            Self::E0301 => "E0301",
            Self::E0302 => "E0302",
            Self::E0303 => "E0303",
            Self::E0304 => "E0304",
            Self::E0305 => "E0305",
            Self::E0306 => "E0306",
            Self::E0401 => "E0401",
            Self::E0402 => "E0402",
            Self::E0501 => "E0501",
            Self::E0502 => "E0502",
            Self::E0901 => "E0901",
            Self::E0902 => "E0902",
            Self::E0999 => "E0999",
        }
    }

    /// Get a short description of the error category
    pub fn category_description(&self) -> &'static str {
        match self {
            Self::E0101 | Self::E0102 | Self::E0103 | Self::E0104 => "lexical error",
            Self::E0201 | Self::E0202 | Self::E0203 | Self::E0204 => "delimiter error",
            Self::E0301 | Self::E0302 | Self::E0303 | Self::E0304 | Self::E0305 | Self::E0306 => {
                "declaration error"
            }
            Self::E0401 | Self::E0402 => "operator error",
            Self::E0501 | Self::E0502 => "design error",
            Self::E0901 | Self::E0902 | Self::E0999 => "syntax error",
        }
    }

    /// Get the default message template for this error code
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::E0101 => "invalid character",
            Self::E0102 => "unterminated delimiter",
            Self::E0103 => "malformed number",
            Self::E0104 => "number out of range",
            Self::E0201 => "unclosed parenthesis",
            Self::E0202 => "unclosed bracket",
            Self::E0203 => "unclosed brace",
            Self::E0204 => "unexpected closing delimiter",
            Self::E0301 => "missing size specification",
            Self::E0302 => "size must be positive",
            Self::E0303 => "conflicting size specification",
            Self::E0304 => "empty unbalanced size",
            Self::E0305 => "confound group needs at least two factors",
            Self::E0306 => "invalid confound group member",
            Self::E0401 => "expected a factor, group, or parenthesized expression",
            Self::E0402 => "classification is terminal",
            Self::E0501 => "batch effect on an existing factor",
            Self::E0502 => "factor related to itself",
            Self::E0901 => "unexpected token",
            Self::E0902 => "expected token",
            Self::E0999 => "internal parser error",
        }
    }

    /// Check if this is a delimiter error
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::E0102 | Self::E0201 | Self::E0202 | Self::E0203 | Self::E0204
        )
    }

    /// Check if the error concerns how a factor was declared or referenced
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            Self::E0301 | Self::E0302 | Self::E0303 | Self::E0304 | Self::E0501
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
