//! Structural validation of parsed and edited designs.

use crate::helpers::source_fixtures::*;
use edgram::{Design, FactorKind, IssueKind, IssueSeverity, RelationKind, parse};

fn kinds(design: &Design) -> Vec<IssueKind> {
    design.validate().into_iter().map(|issue| issue.kind).collect()
}

#[test]
fn test_every_fixture_is_valid() {
    for source in ALL {
        let design = parse(source).unwrap();
        assert!(design.validate().is_empty(), "{source:?}: {:?}", design.validate());
        assert!(design.is_valid());
    }
}

#[test]
fn test_cycle_across_expressions_is_reported() {
    let design = parse("A(2) > B(3) > C(4)\nC > A").unwrap();
    let issues = design.validate();
    assert_eq!(kinds(&design), vec![IssueKind::NestingCycle]);
    assert_eq!(issues[0].severity, IssueSeverity::Error);
    for name in ["A", "B", "C"] {
        assert!(issues[0].message.contains(name), "{}", issues[0].message);
    }
}

#[test]
fn test_empty_design_is_a_warning_only() {
    let design = parse("# to be filled in").unwrap();
    let issues = design.validate();
    assert_eq!(kinds(&design), vec![IssueKind::EmptyDesign]);
    assert_eq!(issues[0].severity, IssueSeverity::Warning);
    assert!(design.is_valid());
}

#[test]
fn test_classified_subject_nested_later_is_reported() {
    let mut design = parse(CLASSIFIED_CELLS).unwrap();
    design.add_factor("Organelle", 12u64, FactorKind::Factor).unwrap();
    design.add_nesting("Cell", "Organelle").unwrap();
    assert_eq!(kinds(&design), vec![IssueKind::ClassificationNotTerminal]);
    assert!(!design.is_valid());

    // A second label on the same subject is still terminal.
    let mut relabelled = parse(CLASSIFIED_CELLS).unwrap();
    relabelled.add_factor("CellCycle", 3u64, FactorKind::Factor).unwrap();
    relabelled.add_classification("Cell", "CellCycle").unwrap();
    assert!(relabelled.validate().is_empty());
}

#[test]
fn test_duplicate_edge_added_through_api() {
    let mut design = parse(SIMPLE_NESTING).unwrap();
    design
        .add_relationship("Site", "Patient", RelationKind::Nests)
        .unwrap();
    assert_eq!(kinds(&design), vec![IssueKind::DuplicateRelationship]);
}

#[test]
fn test_removed_factor_leaves_orphans_until_pruned() {
    let mut design = parse(SIMPLE_NESTING).unwrap();
    design.remove_factor("Patient").unwrap();
    assert_eq!(
        kinds(&design),
        vec![
            IssueKind::OrphanedRelationship,
            IssueKind::OrphanedRelationship
        ]
    );

    assert_eq!(design.prune_orphaned_relationships(), 2);
    assert!(design.validate().is_empty());
}

#[test]
fn test_issue_display_leads_with_severity() {
    let design = parse("A(2) > B(3)\nB > A").unwrap();
    let issues = design.validate();
    assert!(issues[0].to_string().starts_with("error: "), "{}", issues[0]);
}
