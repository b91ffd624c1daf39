//! Observation counts for realistic designs.

use crate::helpers::source_fixtures::*;
use edgram::{Design, FactorKind, FactorSize, ObservationCount, parse};
use rstest::rstest;

#[rstest]
#[case(SIMPLE_NESTING, ObservationCount::exact(60_000))]
#[case(UNBALANCED_CLINICS, ObservationCount::exact(4_920))]
#[case(CLASSIFIED_CELLS, ObservationCount::exact(500_000))]
#[case(HOSPITAL_TRIAL, ObservationCount::exact(360))]
#[case(CONFOUNDED_CENTERS, ObservationCount::exact(30))]
#[case(SINGLE_CELL_ATLAS, ObservationCount::approximate(360_000))]
#[case(MULTI_CENTER, ObservationCount::approximate(36_000_000))]
fn test_fixture_totals(#[case] source: &str, #[case] expected: ObservationCount) {
    let design = parse(source).unwrap();
    assert_eq!(design.count_observations(), expected, "{source:?}");
}

#[rstest]
#[case("Patient(10) > Sample(2) × Treatment(3)", 60, false)]
#[case("Site[10|20|30] > Patient(5)", 300, false)]
#[case("Site(3) > Patient(20) > Cell(~5000)", 300_000, true)]
#[case("Site(3) > Patient(20) > Cell(~5k)", 300_000, true)]
#[case("Sample(4) ◊ Assay(3)", 4, true)]
#[case("Lane(8) == Sample(10) > Cell(100)", 1_000, false)]
#[case("Cell(5000) : CellType(35) : Lineage(4)", 5_000, false)]
fn test_notation_totals(#[case] source: &str, #[case] total: u64, #[case] approximate: bool) {
    let count = parse(source).unwrap().count_observations();
    assert_eq!(count.total, total, "{source:?}");
    assert_eq!(count.approximate, approximate, "{source:?}");
}

#[test]
fn test_display_marks_approximate_totals() {
    let exact = parse(SIMPLE_NESTING).unwrap().count_observations();
    let approx = parse(SINGLE_CELL_ATLAS).unwrap().count_observations();
    assert_eq!(exact.to_string(), "60000");
    assert_eq!(approx.to_string(), "~360000");
}

#[test]
fn test_saturating_total_is_approximate() {
    let mut design = Design::new();
    for i in 0..8 {
        let name = format!("Level{i}");
        design.add_factor(&name, 1_000_000u64, FactorKind::Factor).unwrap();
        if i > 0 {
            design.add_nesting(&format!("Level{}", i - 1), &name).unwrap();
        }
    }
    assert_eq!(design.count_observations(), ObservationCount::approximate(u64::MAX));
}

#[test]
fn test_removed_factor_stops_contributing() {
    let mut design = parse(SIMPLE_NESTING).unwrap();
    design.remove_factor("Cell").unwrap();
    assert_eq!(design.count_observations().total, 60);
}

#[test]
fn test_level_counts_follow_nesting() {
    let design = parse(HOSPITAL_TRIAL).unwrap();
    let counts: Vec<(String, u64)> = design
        .level_counts()
        .into_iter()
        .map(|(id, count)| (design.name_of(id).to_string(), count.total))
        .collect();
    assert_eq!(
        counts,
        vec![
            ("Hospital".to_string(), 4),
            ("Patient".to_string(), 60),
            ("Treatment".to_string(), 2),
            ("Sample".to_string(), 360),
        ]
    );
}

#[test]
fn test_programmatic_design_matches_notation() {
    let mut design = Design::new();
    design.add_factor("Clinic", vec![45, 38, 52, 29], FactorKind::Factor).unwrap();
    design.add_factor("Patient", 10u64, FactorKind::Factor).unwrap();
    design.add_factor("Visit", FactorSize::Exact(3), FactorKind::Factor).unwrap();
    design.add_nesting("Clinic", "Patient").unwrap();
    design.add_nesting("Patient", "Visit").unwrap();

    assert_eq!(
        design.count_observations(),
        parse(UNBALANCED_CLINICS).unwrap().count_observations()
    );
}
