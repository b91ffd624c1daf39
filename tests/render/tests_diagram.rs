//! Rendered diagrams of whole designs.

use crate::helpers::source_fixtures::*;
use edgram::render::{EMPTY_DIAGRAM, Layout};
use edgram::{Design, FactorKind, LayoutOptions, parse, render_diagram};
use rstest::rstest;

/// One framed interior line of a 60-column diagram.
fn framed(content: &str) -> String {
    format!("│{content:<58}│")
}

fn diagram(source: &str) -> String {
    parse(source).unwrap().ascii_diagram()
}

#[test]
fn test_simple_nesting_snapshot() {
    let expected = [
        format!("┌{} Design Structure {}┐", "─".repeat(20), "─".repeat(20)),
        framed(""),
        framed(" Site(3)"),
        framed("  ↓"),
        framed(" Patient(20)"),
        framed("  ↓"),
        framed(" Cell(1k)"),
        framed(""),
        format!("└{}┘", "─".repeat(58)),
    ]
    .join("\n");
    assert_eq!(diagram(SIMPLE_NESTING), expected);
}

#[rstest]
#[case(SIMPLE_NESTING)]
#[case(UNBALANCED_CLINICS)]
#[case(CLASSIFIED_CELLS)]
#[case(HOSPITAL_TRIAL)]
#[case(CONFOUNDED_CENTERS)]
#[case(SINGLE_CELL_ATLAS)]
#[case(MULTI_CENTER)]
fn test_fixture_diagram_is_framed_and_complete(#[case] source: &str) {
    let design = parse(source).unwrap();
    let text = design.ascii_diagram();

    let lines: Vec<&str> = text.lines().collect();
    let width = lines[0].chars().count();
    assert!(width >= 60);
    assert!(lines.iter().all(|line| line.chars().count() == width), "{text}");
    assert!(lines[0].starts_with('┌') && lines[0].ends_with('┐'));
    assert!(lines[lines.len() - 1].starts_with('└'));

    for (_, factor) in design.factors() {
        assert!(text.contains(&factor.label()), "{} missing:\n{text}", factor.label());
    }
    assert_eq!(text, design.ascii_diagram());
}

#[test]
fn test_every_factor_placed_once() {
    for source in ALL {
        let design = parse(source).unwrap();
        let layout = Layout::compute(&design, &LayoutOptions::default());
        let mut seen = std::collections::HashSet::new();
        for (id, _) in design.factors() {
            let anchor = layout.anchor(id).unwrap();
            assert!(seen.insert((anchor.x, anchor.y)), "{source:?}");
        }
    }
}

#[test]
fn test_single_cell_atlas_routes_lane_to_donor() {
    let design = parse(SINGLE_CELL_ATLAS).unwrap();
    let layout = Layout::compute(&design, &LayoutOptions::default());
    let flows = layout.flow_lines();

    assert_eq!(flows.len(), 1);
    assert_eq!(flows[0].targets, vec![design.factor_id("Donor").unwrap()]);
    assert!(layout
        .annotations()
        .contains(&"Batch: Lane ══ Donor".to_string()));

    let text = layout.render();
    assert!(text.contains(" Lane(4) ═"), "{text}");
    assert!(text.contains("Cell(~5k)"), "{text}");
}

#[test]
fn test_multi_center_rows() {
    let text = diagram(MULTI_CENTER);
    assert!(text.contains("Center(5) ≈≈≈≈ Protocol(5)"), "{text}");
    assert!(text.contains("Sample(3) ──◊── Assay(2)"), "{text}");
    assert!(text.contains("Confounded: Center ≈≈ Protocol"), "{text}");
}

#[test]
fn test_hospital_trial_crossing_row() {
    let text = diagram(HOSPITAL_TRIAL);
    assert!(text.contains("Patient(15) ──×── Treatment(2)"), "{text}");
}

#[test]
fn test_empty_design_message() {
    assert_eq!(diagram("# nothing"), EMPTY_DIAGRAM);
    assert_eq!(
        render_diagram(&Design::new(), &LayoutOptions::default()),
        "Empty design"
    );
}

#[test]
fn test_wide_design_renders_past_readable_limit() {
    let mut design = Design::new();
    design.add_factor("Site", 2u64, FactorKind::Factor).unwrap();
    for i in 0..50 {
        let name = format!("Ward{i}");
        design.add_factor(&name, 3u64, FactorKind::Factor).unwrap();
        design.add_nesting("Site", &name).unwrap();
    }
    let text = design.ascii_diagram();
    assert!(text.contains("Ward49(3)"));

    let lines: Vec<&str> = text.lines().collect();
    let width = lines[0].chars().count();
    assert!(width > 60);
    assert!(lines.iter().all(|line| line.chars().count() == width));
}

#[test]
fn test_title_option_is_centred() {
    let options = LayoutOptions {
        title: "Atlas".to_string(),
        ..LayoutOptions::default()
    };
    let text = parse(SIMPLE_NESTING).unwrap().render_diagram(&options);
    let top = text.lines().next().unwrap();
    assert_eq!(top, format!("┌{} Atlas {}┐", "─".repeat(25), "─".repeat(26)));
}
