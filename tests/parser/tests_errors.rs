//! Error reporting through the public parse entry points.

use edgram::parser::{ErrorCode, ParseOptions, parse_with};
use edgram::{Design, ParseError, TextSize, parse};
use rstest::rstest;

fn error_of(source: &str) -> ParseError {
    parse(source).unwrap_err()
}

// =============================================================================
// CODES
// =============================================================================

#[rstest]
#[case("Site(3) > Patient", ErrorCode::E0301)]
#[case("Site(3) > Patient(0)", ErrorCode::E0302)]
#[case("Site(3)\nSite(4) > Cell(2)", ErrorCode::E0303)]
#[case("Clinic[] > Patient(2)", ErrorCode::E0304)]
#[case("{Center(3)} > Patient(2)", ErrorCode::E0305)]
#[case("Cell(100) : CellType(5) > Gene(3)", ErrorCode::E0402)]
#[case("Site(3) > Patient(2)\nSite == Patient", ErrorCode::E0501)]
#[case("Site(3) > Site", ErrorCode::E0502)]
#[case("Site(3) > > Patient(2)", ErrorCode::E0401)]
#[case("Site(3) > Patient(2))", ErrorCode::E0204)]
#[case("Site(3) Patient(20) > Cell(5)", ErrorCode::E0901)]
#[case("{Center(3) ≈≈ Protocol(2)} Patient(10)", ErrorCode::E0901)]
fn test_syntax_error_codes(#[case] source: &str, #[case] expected: ErrorCode) {
    let err = error_of(source);
    assert_eq!(err.code(), Some(expected), "{source:?} gave {err}");
    assert!(err.as_syntax().is_some());
}

#[rstest]
#[case("Site(3) & Patient(2)", ErrorCode::E0101)]
#[case("Site(3) > (Patient(2)", ErrorCode::E0102)]
#[case("Clinic[3|4", ErrorCode::E0102)]
fn test_lex_error_codes(#[case] source: &str, #[case] expected: ErrorCode) {
    let err = error_of(source);
    assert!(matches!(err, ParseError::Lex(_)), "{source:?} gave {err:?}");
    assert_eq!(err.code(), Some(expected));
}

// =============================================================================
// POSITIONS AND MESSAGES
// =============================================================================

#[test]
fn test_error_position_is_line_and_column_of_offender() {
    let err = error_of("Site(3) > Patient(20)\nPatient > Visit");
    let position = err.position();
    assert_eq!((position.line, position.column), (1, 10));
    assert_eq!(err.offset(), TextSize::from(32));
}

#[test]
fn test_missing_operator_between_factors_on_one_line() {
    let err = error_of("Site(3) Patient(20) > Cell(5)");
    let syntax = err.as_syntax().unwrap();
    assert_eq!(syntax.code, ErrorCode::E0901);
    assert!(syntax.message.contains("expected an operator or end of line"), "{err}");
    assert_eq!((err.position().line, err.position().column), (0, 8));

    let design = parse("Site(3) # first site\nPatient(20) > Cell(5)").unwrap();
    assert_eq!(design.factor_count(), 3);
    assert_eq!(design.relationships().len(), 1);
}

#[test]
fn test_display_carries_code_and_one_based_position() {
    let err = error_of("Site(3) > Patient");
    let text = err.to_string();
    assert!(text.starts_with("E0301 at 1:11"), "{text}");
    assert!(text.contains("Patient"), "{text}");
}

#[test]
fn test_lex_error_reports_offending_character() {
    let err = error_of("Site(3)\n  $");
    let ParseError::Lex(lex) = err else {
        panic!("expected a lex error");
    };
    assert_eq!(lex.character, '$');
    assert_eq!((lex.position.line, lex.position.column), (1, 2));
}

#[test]
fn test_conflicting_size_mentions_both_sizes() {
    let err = error_of("Site(3) > Patient(20)\nSite(4) > Visit(2)");
    let syntax = err.as_syntax().unwrap();
    assert!(syntax.message.contains('3'), "{}", syntax.message);
    assert!(syntax.message.contains('4'), "{}", syntax.message);
    assert!(syntax.has_hint());
}

// =============================================================================
// LIMITS AND ATOMICITY
// =============================================================================

#[test]
fn test_deep_parentheses_hit_depth_limit() {
    let options = ParseOptions {
        max_depth: 8,
        ..ParseOptions::default()
    };
    let source = format!("{}A(2){}", "(".repeat(20), ")".repeat(20));
    assert!(matches!(
        parse_with(&source, &options),
        Err(ParseError::Limit(_))
    ));
}

#[test]
fn test_default_limits_accept_wide_unbalanced_size() {
    let branches = vec!["2"; 500].join("|");
    let design = parse(&format!("Clinic[{branches}] > Patient(3)")).unwrap();
    assert_eq!(design.count_observations().total, 3000);
}

#[test]
fn test_failed_parse_into_leaves_design_untouched() {
    let mut design = parse("Site(3) > Patient(20)").unwrap();
    let before = design.clone();

    let err = design.parse_into("Patient > Visit(4) > Site(5)").unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::E0303));
    assert_eq!(design, before);
    assert!(design.factor("Visit").is_none());
}

#[test]
fn test_empty_and_comment_only_documents_parse() {
    assert!(parse("").unwrap().is_empty());
    assert!(parse("# nothing yet\n\n").unwrap().is_empty());
    assert!(Design::from_grammar("   ").unwrap().is_empty());
}
