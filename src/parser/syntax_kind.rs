//! Token kinds of the design notation.

/// All token kinds produced by the lexer.
///
/// Every structural operator has one canonical glyph and one ASCII
/// spelling; both map to the same [`RelationKind`](crate::model::RelationKind)
/// through [`SyntaxKind::relation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    WHITESPACE = 0,
    COMMENT, // # to end of line

    // =========================================================================
    // LITERALS
    // =========================================================================
    IDENT,
    NUMBER, // 42, 5k

    // =========================================================================
    // OPERATORS
    // =========================================================================
    GT,             // >
    TIMES,          // ×
    STAR,           // *
    LOZENGE,        // ◊
    LT_GT,          // <>
    COLON,          // :
    EQ_EQ,          // ==
    APPROX_APPROX,  // ≈≈
    TILDE_TILDE,    // ~~

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    L_PAREN,   // (
    R_PAREN,   // )
    L_BRACKET, // [
    R_BRACKET, // ]
    L_BRACE,   // {
    R_BRACE,   // }
    PIPE,      // |
    TILDE,     // ~

    // =========================================================================
    // SPECIAL
    // =========================================================================
    ERROR,
    EOF,
}

impl SyntaxKind {
    /// Whitespace and comments
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::COMMENT)
    }

    pub fn is_operator(self) -> bool {
        self.relation().is_some()
    }

    pub fn is_opening_delimiter(self) -> bool {
        matches!(self, Self::L_PAREN | Self::L_BRACKET | Self::L_BRACE)
    }

    pub fn is_closing_delimiter(self) -> bool {
        matches!(self, Self::R_PAREN | Self::R_BRACKET | Self::R_BRACE)
    }

    /// The closing delimiter matching an opening one.
    pub fn closing(self) -> Option<SyntaxKind> {
        match self {
            Self::L_PAREN => Some(Self::R_PAREN),
            Self::L_BRACKET => Some(Self::R_BRACKET),
            Self::L_BRACE => Some(Self::R_BRACE),
            _ => None,
        }
    }

    /// Relationship emitted by an operator token.
    pub fn relation(self) -> Option<crate::model::RelationKind> {
        use crate::model::RelationKind;
        match self {
            Self::GT => Some(RelationKind::Nests),
            Self::TIMES | Self::STAR => Some(RelationKind::Crosses),
            Self::LOZENGE | Self::LT_GT => Some(RelationKind::PartialCrosses),
            Self::COLON => Some(RelationKind::Classifies),
            Self::EQ_EQ => Some(RelationKind::BatchEffect),
            Self::APPROX_APPROX | Self::TILDE_TILDE => Some(RelationKind::Confounded),
            _ => None,
        }
    }

    /// Tokens that can start a primary expression.
    pub fn starts_primary(self) -> bool {
        matches!(self, Self::IDENT | Self::L_PAREN | Self::L_BRACE)
    }

    /// Short human-readable description used in error messages.
    pub fn describe(self) -> &'static str {
        match self {
            Self::WHITESPACE => "whitespace",
            Self::COMMENT => "comment",
            Self::IDENT => "identifier",
            Self::NUMBER => "number",
            Self::GT => "'>'",
            Self::TIMES => "'×'",
            Self::STAR => "'*'",
            Self::LOZENGE => "'◊'",
            Self::LT_GT => "'<>'",
            Self::COLON => "':'",
            Self::EQ_EQ => "'=='",
            Self::APPROX_APPROX => "'≈≈'",
            Self::TILDE_TILDE => "'~~'",
            Self::L_PAREN => "'('",
            Self::R_PAREN => "')'",
            Self::L_BRACKET => "'['",
            Self::R_BRACKET => "']'",
            Self::L_BRACE => "'{'",
            Self::R_BRACE => "'}'",
            Self::PIPE => "'|'",
            Self::TILDE => "'~'",
            Self::ERROR => "invalid token",
            Self::EOF => "end of input",
        }
    }
}
