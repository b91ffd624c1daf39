//! Edge sets produced by whole notation documents.

use crate::helpers::design_assertions::*;
use crate::helpers::source_fixtures::*;
use edgram::{Design, FactorKind, FactorSize, RelationKind, parse};
use rstest::rstest;

// =============================================================================
// FIXTURE DOCUMENTS
// =============================================================================

#[rstest]
#[case(SIMPLE_NESTING, 3, 2)]
#[case(UNBALANCED_CLINICS, 3, 2)]
#[case(CLASSIFIED_CELLS, 3, 2)]
#[case(HOSPITAL_TRIAL, 4, 4)]
#[case(CONFOUNDED_CENTERS, 3, 3)]
#[case(SINGLE_CELL_ATLAS, 6, 5)]
#[case(MULTI_CENTER, 8, 8)]
fn test_fixture_shape(#[case] source: &str, #[case] factors: usize, #[case] relationships: usize) {
    let design = parse(source).unwrap();
    assert_eq!(design.factor_count(), factors, "factors of {source:?}");
    assert_eq!(
        design.relationships().len(),
        relationships,
        "relationships of {source:?}: {:?}",
        edges(&design)
    );
}

#[test]
fn test_single_cell_atlas_edges() {
    let design = parse(SINGLE_CELL_ATLAS).unwrap();
    assert_eq!(
        edges(&design),
        vec![
            "Donor > Sample",
            "Sample > Cell",
            "Lane == Donor",
            "Cell : CellType",
            "Donor > Visit",
        ]
    );
    assert_eq!(design.factor("Lane").unwrap().kind, FactorKind::Batch);
    assert_eq!(design.factor("Donor").unwrap().kind, FactorKind::Factor);
    assert_eq!(
        design.factor("Cell").unwrap().size,
        FactorSize::Approximate(5000)
    );
}

#[test]
fn test_multi_center_edges() {
    let design = parse(MULTI_CENTER).unwrap();
    assert_eq!(
        edges(&design),
        vec![
            "Center ≈≈ Protocol",
            "Center > Patient",
            "Protocol > Patient",
            "Patient > Visit",
            "Visit > Sample",
            "Sample ◊ Assay",
            "Sample > Cell",
            "Cell : CellType",
        ]
    );
    assert_eq!(
        design.confound_group_names(),
        vec![vec!["Center", "Protocol"]]
    );
    assert_eq!(
        design.factor("Patient").unwrap().size,
        FactorSize::Unbalanced(vec![30, 25, 18, 22, 25])
    );
}

#[test]
fn test_unbalanced_size_keeps_branch_order() {
    let design = parse(UNBALANCED_CLINICS).unwrap();
    let clinic = design.factor("Clinic").unwrap();
    assert_eq!(clinic.size, FactorSize::Unbalanced(vec![45, 38, 52, 29]));
    assert_eq!(clinic.size.levels(), 164);
}

// =============================================================================
// OPERATOR SPELLINGS
// =============================================================================

#[rstest]
#[case("A(2) × B(3)", "A(2) * B(3)", RelationKind::Crosses)]
#[case("A(2) ◊ B(3)", "A(2) <> B(3)", RelationKind::PartialCrosses)]
#[case("A(2) ≈≈ B(3)", "A(2) ~~ B(3)", RelationKind::Confounded)]
fn test_ascii_and_glyph_operators_agree(
    #[case] glyph: &str,
    #[case] ascii: &str,
    #[case] kind: RelationKind,
) {
    let from_glyph = parse(glyph).unwrap();
    let from_ascii = parse(ascii).unwrap();
    assert_eq!(edges(&from_glyph), edges(&from_ascii));
    assert_eq!(from_glyph.relationships()[0].kind, kind);
}

#[test]
fn test_whitespace_is_insignificant() {
    let spaced = parse("Site( 3 )  >\tPatient(20)").unwrap();
    let tight = parse("Site(3)>Patient(20)").unwrap();
    assert_same_structure(&spaced, &tight);
}

// =============================================================================
// DOCUMENTS AND REFERENCES
// =============================================================================

#[test]
fn test_later_lines_reference_earlier_factors() {
    let design = parse("Site(3) > Patient(20)\nPatient > Visit(4)\nPatient > Sample(2)").unwrap();
    assert_eq!(
        edges(&design),
        vec!["Site > Patient", "Patient > Visit", "Patient > Sample"]
    );
    assert_eq!(design.count_observations().total, 3 * 20 * 4 * 2);
}

#[test]
fn test_repeating_declaration_with_same_size_is_a_reference() {
    let design = parse("Site(3) > Patient(20)\nSite(3) > Batch(2)").unwrap();
    assert_eq!(design.factor_count(), 3);
}

#[test]
fn test_parse_into_extends_existing_design() {
    let mut design = Design::new();
    design.add_factor("Site", 3u64, FactorKind::Factor).unwrap();

    design.parse_into("Site > Patient(20) > Cell(1k)").unwrap();
    assert_eq!(
        factor_names(&design),
        vec!["Site", "Patient", "Cell"]
    );
    assert_eq!(design.count_observations().total, 60_000);
}

#[test]
fn test_from_grammar_equals_parse_for_every_fixture() {
    for source in ALL {
        let a = Design::from_grammar(source).unwrap();
        let b = parse(source).unwrap();
        assert_eq!(a, b, "{source:?}");
    }
}
