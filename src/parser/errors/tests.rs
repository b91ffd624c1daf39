//! Integration tests for the errors module

use super::*;
use crate::base::Position;
use text_size::{TextRange, TextSize};

#[test]
fn test_complete_error_workflow() {
    // Unclosed parenthesis opened at offset 10, detected at 50
    let opening = TextRange::new(TextSize::new(10), TextSize::new(11));
    let error_pos = TextRange::empty(TextSize::new(50));

    let err = SyntaxError::builder(ErrorCode::E0201)
        .message("unclosed '(' in parenthesized expression")
        .range(error_pos)
        .hint("add ')' to close the expression")
        .related("opened here", opening)
        .build();

    assert_eq!(err.code, ErrorCode::E0201);
    assert!(err.message.contains("unclosed"));
    assert!(err.has_hint());
    assert_eq!(err.related[0].range, opening);
}

#[test]
fn test_error_code_exhaustiveness() {
    let codes = [
        ErrorCode::E0101,
        ErrorCode::E0102,
        ErrorCode::E0103,
        ErrorCode::E0104,
        ErrorCode::E0201,
        ErrorCode::E0202,
        ErrorCode::E0203,
        ErrorCode::E0204,
        ErrorCode::E0301,
        ErrorCode::E0302,
        ErrorCode::E0303,
        ErrorCode::E0304,
        ErrorCode::E0305,
        ErrorCode::E0306,
        ErrorCode::E0401,
        ErrorCode::E0402,
        ErrorCode::E0501,
        ErrorCode::E0502,
        ErrorCode::E0901,
        ErrorCode::E0902,
        ErrorCode::E0999,
    ];

    for code in codes {
        assert!(!code.default_message().is_empty(), "code {:?} has no message", code);
        assert!(
            !code.category_description().is_empty(),
            "code {:?} has no category",
            code
        );
        let s = code.as_str();
        assert!(s.starts_with('E'), "code {:?} doesn't start with E", code);
        assert_eq!(s.len(), 5, "code {:?} should be 5 chars", code);
    }
}

#[test]
fn test_lex_error_display_carries_code_and_position() {
    let err = LexError {
        kind: LexErrorKind::UnexpectedCharacter,
        character: '$',
        offset: TextSize::new(5),
        position: Position::new(0, 5),
    };
    assert_eq!(err.to_string(), "E0101 at 1:6: unexpected character '$'");
}

#[test]
fn test_parse_error_accessors() {
    let syntax = SyntaxError::builder(ErrorCode::E0402)
        .range(TextRange::new(TextSize::new(7), TextSize::new(8)))
        .position(Position::new(1, 2))
        .build();
    let err = ParseError::from(syntax);
    assert_eq!(err.offset(), TextSize::new(7));
    assert_eq!(err.position(), Position::new(1, 2));
    assert_eq!(err.code(), Some(ErrorCode::E0402));
    assert!(err.as_syntax().is_some());

    let limit = ParseError::from(LimitExceededError {
        what: "nesting depth",
        limit: 4,
        depth: 5,
        offset: TextSize::new(9),
        position: Position::new(0, 9),
    });
    assert_eq!(limit.code(), None);
    assert_eq!(limit.to_string(), "nesting depth limit of 4 exceeded at 1:10");
}
