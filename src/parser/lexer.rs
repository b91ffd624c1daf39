//! Logos-based lexer for the design notation.

use logos::Logos;
use text_size::{TextRange, TextSize};

use super::errors::{LexError, LexErrorKind};
use super::syntax_kind::SyntaxKind;
use crate::base::LineIndex;

/// A token with its kind, text, and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: TextSize,
}

impl Token<'_> {
    pub fn range(&self) -> TextRange {
        TextRange::at(self.offset, TextSize::of(self.text))
    }
}

/// Lexer wrapping the logos-generated tokenizer.
///
/// Yields every token including trivia; characters that match nothing
/// come out as [`SyntaxKind::ERROR`].
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
    offset: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            offset: 0,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.offset);
        self.offset += text.len() as u32;

        let kind = match logos_token {
            Ok(t) => t.into(),
            Err(()) => SyntaxKind::ERROR,
        };

        Some(Token { kind, text, offset })
    }
}

/// Tokenize a whole document for the parser.
///
/// Trivia is dropped and a final [`SyntaxKind::EOF`] token is appended.
/// Fails on the first character that starts no token, and on an opening
/// paren, bracket or brace that is never closed.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, LexError> {
    let mut tokens = Vec::new();
    let mut open: Vec<Token<'_>> = Vec::new();

    for token in Lexer::new(input) {
        match token.kind {
            kind if kind.is_trivia() => continue,
            SyntaxKind::ERROR => {
                let character = token.text.chars().next().unwrap_or('\0');
                return Err(lex_error(input, LexErrorKind::UnexpectedCharacter, character, token.offset));
            }
            kind if kind.is_opening_delimiter() => open.push(token.clone()),
            kind if kind.is_closing_delimiter() => {
                // Stray closers are left for the parser to report.
                if open.last().and_then(|t| t.kind.closing()) == Some(kind) {
                    open.pop();
                }
            }
            _ => {}
        }
        tokens.push(token);
    }

    if let Some(unclosed) = open.pop() {
        let character = unclosed.text.chars().next().unwrap_or('\0');
        return Err(lex_error(input, LexErrorKind::UnterminatedDelimiter, character, unclosed.offset));
    }

    tokens.push(Token {
        kind: SyntaxKind::EOF,
        text: "",
        offset: TextSize::of(input),
    });
    Ok(tokens)
}

fn lex_error(input: &str, kind: LexErrorKind, character: char, offset: TextSize) -> LexError {
    LexError {
        kind,
        character,
        offset,
        position: LineIndex::new(input).position(offset),
    }
}

/// Logos token enum - maps to SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r"#[^\n]*")]
    Comment,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    // Trailing letters are kept in the token so `12abc` is reported as a
    // malformed number rather than a number followed by an identifier.
    #[regex(r"[0-9][0-9A-Za-z_]*")]
    Number,

    // =========================================================================
    // OPERATORS
    // =========================================================================
    #[token(">")]
    Gt,

    #[token("×")]
    Times,

    #[token("*")]
    Star,

    #[token("◊")]
    Lozenge,

    #[token("<>")]
    LtGt,

    #[token(":")]
    Colon,

    #[token("==")]
    EqEq,

    #[token("≈≈")]
    ApproxApprox,

    #[token("~~")]
    TildeTilde,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("|")]
    Pipe,

    #[token("~")]
    Tilde,
}

impl From<LogosToken> for SyntaxKind {
    fn from(token: LogosToken) -> Self {
        match token {
            LogosToken::Whitespace => SyntaxKind::WHITESPACE,
            LogosToken::Comment => SyntaxKind::COMMENT,
            LogosToken::Ident => SyntaxKind::IDENT,
            LogosToken::Number => SyntaxKind::NUMBER,
            LogosToken::Gt => SyntaxKind::GT,
            LogosToken::Times => SyntaxKind::TIMES,
            LogosToken::Star => SyntaxKind::STAR,
            LogosToken::Lozenge => SyntaxKind::LOZENGE,
            LogosToken::LtGt => SyntaxKind::LT_GT,
            LogosToken::Colon => SyntaxKind::COLON,
            LogosToken::EqEq => SyntaxKind::EQ_EQ,
            LogosToken::ApproxApprox => SyntaxKind::APPROX_APPROX,
            LogosToken::TildeTilde => SyntaxKind::TILDE_TILDE,
            LogosToken::LParen => SyntaxKind::L_PAREN,
            LogosToken::RParen => SyntaxKind::R_PAREN,
            LogosToken::LBracket => SyntaxKind::L_BRACKET,
            LogosToken::RBracket => SyntaxKind::R_BRACKET,
            LogosToken::LBrace => SyntaxKind::L_BRACE,
            LogosToken::RBrace => SyntaxKind::R_BRACE,
            LogosToken::Pipe => SyntaxKind::PIPE,
            LogosToken::Tilde => SyntaxKind::TILDE,
        }
    }
}
