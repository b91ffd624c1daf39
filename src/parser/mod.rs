//! Parser for the experimental design notation
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens with SyntaxKind
//!     ↓
//! tokenize → trivia dropped, delimiters balanced, EOF appended
//!     ↓
//! Parser (precedence climbing) → Design
//! ```
//!
//! ## Notation
//!
//! ```text
//! # comment
//! {Center(3) ≈≈ Protocol(2)} > Patient[30|25|18] > Sample(2) ◊ Treatment(3)
//! Sample > Cell(~5k) : CellType(42)
//! ```
//!
//! | operator | glyph | ASCII |
//! |----------|-------|-------|
//! | nests | `>` | `>` |
//! | crosses | `×` | `*` |
//! | partially crosses | `◊` | `<>` |
//! | classifies | `:` | `:` |
//! | batch effect | `==` | `==` |
//! | confounded | `≈≈` | `~~` |
//!
//! A document is a sequence of expressions. The first mention of a factor
//! declares it and must carry a size; later mentions are references.

pub mod errors;
mod lexer;
#[allow(clippy::module_inception)]
mod parser;
mod syntax_kind;

pub use errors::{
    ErrorCode, LexError, LexErrorKind, LimitExceededError, ParseContext, ParseError, RelatedInfo,
    Severity, SyntaxError,
};
pub use lexer::{Lexer, Token, tokenize};
pub use parser::{ParseOptions, parse, parse_into, parse_with};
pub use syntax_kind::SyntaxKind;

use crate::model::Design;

impl Design {
    /// Build a design from notation text.
    pub fn from_grammar(text: &str) -> Result<Design, ParseError> {
        parse(text)
    }

    pub fn from_grammar_with(text: &str, options: &ParseOptions) -> Result<Design, ParseError> {
        parse_with(text, options)
    }

    /// Parse more notation into this design. Existing factors can be
    /// referenced by name. On error the design is unchanged.
    pub fn parse_into(&mut self, text: &str) -> Result<(), ParseError> {
        parse_into(self, text, &ParseOptions::default())
    }
}
