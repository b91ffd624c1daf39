//! Conversion between designs and their declarative document form.

use crate::helpers::design_assertions::*;
use crate::helpers::source_fixtures::*;
use edgram::model::{FactorRecord, RelationshipRecord, SizeRecord};
use edgram::{Design, DesignDocument, DesignError, FactorKind, RelationKind, parse};

#[test]
fn test_every_fixture_survives_document_round_trip() {
    for source in ALL {
        let design = parse(source).unwrap();
        let rebuilt = Design::from_document(&design.to_document()).unwrap();
        assert_eq!(rebuilt, design, "{source:?}");
        assert_same_structure(&rebuilt, &design);
    }
}

#[test]
fn test_document_records_sizes_by_shape() {
    let doc = parse(MULTI_CENTER).unwrap().to_document();
    let size_of = |name: &str| {
        doc.factors
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.n.clone())
            .unwrap()
    };
    assert_eq!(size_of("Center"), SizeRecord::Count(5));
    assert_eq!(size_of("Patient"), SizeRecord::Branches(vec![30, 25, 18, 22, 25]));
    assert_eq!(size_of("Cell"), SizeRecord::Text("~5000".to_string()));
    assert_eq!(
        doc.metadata.confound_groups,
        vec![vec!["Center".to_string(), "Protocol".to_string()]]
    );
}

#[test]
fn test_batch_kind_is_carried() {
    let doc = parse(SINGLE_CELL_ATLAS).unwrap().to_document();
    let lane = doc.factors.iter().find(|f| f.name == "Lane").unwrap();
    assert_eq!(lane.kind, FactorKind::Batch);

    let rebuilt = Design::from_document(&doc).unwrap();
    assert!(rebuilt.factor("Lane").unwrap().is_batch());
}

#[test]
fn test_handwritten_document() {
    let doc = DesignDocument {
        schema_version: "1.2".to_string(),
        study: Some("Pilot".to_string()),
        factors: vec![
            FactorRecord {
                name: "Site".to_string(),
                n: SizeRecord::Count(3),
                kind: FactorKind::Factor,
            },
            FactorRecord {
                name: "Cell".to_string(),
                n: SizeRecord::Text("~2k".to_string()),
                kind: FactorKind::Factor,
            },
        ],
        relationships: vec![RelationshipRecord {
            from: "Site".to_string(),
            to: "Cell".to_string(),
            kind: RelationKind::Nests,
        }],
        metadata: Default::default(),
    };
    let design = Design::from_document(&doc).unwrap();
    assert_eq!(design.metadata().study.as_deref(), Some("Pilot"));
    assert_eq!(design.count_observations().to_string(), "~6000");
}

#[test]
fn test_relationship_to_unknown_factor_is_rejected() {
    let mut doc = parse(SIMPLE_NESTING).unwrap().to_document();
    doc.relationships.push(RelationshipRecord {
        from: "Cell".to_string(),
        to: "Organelle".to_string(),
        kind: RelationKind::Nests,
    });
    assert_eq!(
        Design::from_document(&doc),
        Err(DesignError::UnknownFactor("Organelle".into()))
    );
}

#[test]
fn test_removed_factors_are_compacted_away() {
    let mut design = parse(HOSPITAL_TRIAL).unwrap();
    design.remove_factor("Treatment").unwrap();
    let doc = design.to_document();
    assert_eq!(doc.factors.len(), 3);
    assert_eq!(doc.relationships.len(), 2);

    let rebuilt = Design::from_document(&doc).unwrap();
    assert_eq!(rebuilt.arena_len(), 3);
    assert!(rebuilt.validate().is_empty());
    assert_eq!(edges(&rebuilt), vec!["Hospital > Patient", "Patient > Sample"]);
}
