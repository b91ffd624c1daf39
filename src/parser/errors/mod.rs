//! Parser error handling module
//!
//! - Categorized error codes for filtering and documentation
//! - Context-aware error messages
//! - Suggestions/hints for common mistakes
//! - Related span tracking (e.g. "opened here" for unclosed parentheses)
//! - The [`ParseError`] umbrella over lexing, syntax and limit failures

mod codes;
mod context;
mod error;
mod parse;

pub use codes::ErrorCode;
pub use context::ParseContext;
pub use error::{RelatedInfo, Severity, SyntaxError, SyntaxErrorBuilder, context_message};
pub use parse::{LexError, LexErrorKind, LimitExceededError, ParseError};

#[cfg(test)]
mod tests;
