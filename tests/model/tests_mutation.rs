//! Programmatic editing and shared access.

use std::thread;

use crate::helpers::design_assertions::*;
use crate::helpers::source_fixtures::*;
use edgram::{Design, DesignError, FactorKind, FactorSize, SharedDesign, parse};

// =============================================================================
// EDITING
// =============================================================================

#[test]
fn test_rename_keeps_relationships() {
    let mut design = parse(SIMPLE_NESTING).unwrap();
    design.rename_factor("Patient", "Subject").unwrap();

    assert_eq!(edges(&design), vec!["Site > Subject", "Subject > Cell"]);
    assert!(design.factor("Patient").is_none());
    assert_eq!(design.count_observations().total, 60_000);

    // The new name is usable from notation.
    design.parse_into("Subject > Visit(2)").unwrap();
    assert_eq!(design.count_observations().total, 120_000);
}

#[test]
fn test_rename_rejects_taken_name() {
    let mut design = parse(SIMPLE_NESTING).unwrap();
    assert_eq!(
        design.rename_factor("Patient", "Site"),
        Err(DesignError::DuplicateFactor("Site".into()))
    );
}

#[test]
fn test_mutation_errors() {
    let mut design = parse(SIMPLE_NESTING).unwrap();
    assert_eq!(
        design.add_factor("Site", 4u64, FactorKind::Factor),
        Err(DesignError::DuplicateFactor("Site".into()))
    );
    assert!(matches!(
        design.add_factor("Visit", FactorSize::Exact(0), FactorKind::Factor),
        Err(DesignError::InvalidSize { .. })
    ));
    assert!(matches!(
        design.add_factor("  ", 2u64, FactorKind::Factor),
        Err(DesignError::InvalidName(_))
    ));
    assert_eq!(
        design.add_nesting("Site", "Ward"),
        Err(DesignError::UnknownFactor("Ward".into()))
    );
    assert_eq!(
        design.add_crossing("Cell", "Cell"),
        Err(DesignError::SelfLoop("Cell".into()))
    );
}

#[test]
fn test_batch_effect_is_all_or_nothing() {
    let mut design = parse(SIMPLE_NESTING).unwrap();
    design.add_factor("Lane", 4u64, FactorKind::Factor).unwrap();

    assert!(design.add_batch_effect("Lane", &["Cell", "Ward"]).is_err());
    assert!(!design.factor("Lane").unwrap().is_batch());
    assert_eq!(design.relationships().len(), 2);

    design.add_batch_effect("Lane", &["Patient", "Cell"]).unwrap();
    assert!(design.factor("Lane").unwrap().is_batch());
    assert_eq!(design.count_observations().total, 60_000);
}

#[test]
fn test_confound_through_api_matches_notation() {
    let mut design = Design::new();
    design.add_factor("Center", 3u64, FactorKind::Factor).unwrap();
    design.add_factor("Protocol", 2u64, FactorKind::Factor).unwrap();
    design.add_factor("Patient", 10u64, FactorKind::Factor).unwrap();
    design.add_confound("Center", "Protocol").unwrap();
    design.add_nesting("Center", "Patient").unwrap();
    design.add_nesting("Protocol", "Patient").unwrap();

    assert_eq!(design, parse(CONFOUNDED_CENTERS).unwrap());
}

#[test]
fn test_describe_summarises_design() {
    let text = parse(CLASSIFIED_CELLS).unwrap().describe();
    assert!(text.contains("Factors (3):"), "{text}");
    assert!(text.contains("  classifies:\n    - Cell → CellType"), "{text}");
    assert!(text.ends_with("Total observations: 500000"), "{text}");
}

// =============================================================================
// SHARED ACCESS
// =============================================================================

#[test]
fn test_shared_design_serialises_writers() {
    let shared = SharedDesign::new(parse("Site(3)").unwrap());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let shared = shared.clone();
            thread::spawn(move || {
                shared.update(|design| {
                    let name = format!("Ward{i}");
                    design.add_factor(&name, 2u64, FactorKind::Factor).unwrap();
                    design.add_nesting("Site", &name).unwrap();
                });
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let design = shared.snapshot();
    assert_eq!(design.factor_count(), 9);
    assert_eq!(design.relationships().len(), 8);
    assert!(design.validate().is_empty());
}

#[test]
fn test_shared_design_concurrent_readers() {
    let shared = SharedDesign::from(parse(MULTI_CENTER).unwrap());
    let expected = shared.with(|design| design.count_observations());

    let counts: Vec<_> = (0..4)
        .map(|_| {
            let shared = shared.clone();
            thread::spawn(move || shared.with(|design| design.count_observations()))
        })
        .map(|handle| handle.join().unwrap())
        .collect();

    assert!(counts.iter().all(|count| *count == expected));
    assert_eq!(shared.read().factor_count(), 8);
}
