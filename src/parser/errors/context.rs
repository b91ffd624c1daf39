//! Parse context tracking for context-aware error messages

/// Where in the notation the parser currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParseContext {
    /// Between expressions
    #[default]
    TopLevel,
    /// After a complete expression, on the same line
    ExpressionEnd,
    /// After an operator, waiting for its right operand
    Operand,
    /// Inside `( ... )` of a sub-expression
    Parenthesized,
    /// Inside `{ ... }` of a confound group
    ConfoundGroup,
    /// Inside `( ... )` of a size specification
    Size,
    /// Inside `[ ... ]` of an unbalanced size
    UnbalancedSize,
}

impl ParseContext {
    /// Get a human-readable description of this context for error messages
    pub fn description(&self) -> &'static str {
        match self {
            Self::TopLevel => "at top level",
            Self::ExpressionEnd => "after expression",
            Self::Operand => "after operator",
            Self::Parenthesized => "in parenthesized expression",
            Self::ConfoundGroup => "in confound group",
            Self::Size => "in size specification",
            Self::UnbalancedSize => "in unbalanced size",
        }
    }

    /// Get a description of what is expected in this context
    pub fn expected_description(&self) -> &'static str {
        match self {
            Self::TopLevel => "a factor, confound group, or parenthesized expression",
            Self::ExpressionEnd => "an operator or end of line",
            Self::Operand => "a factor, confound group, or parenthesized expression",
            Self::Parenthesized => "an operator or ')'",
            Self::ConfoundGroup => "'≈≈' or '}'",
            Self::Size => "a count such as 3, 5k, or ~5000",
            Self::UnbalancedSize => "branch counts separated by '|'",
        }
    }
}
