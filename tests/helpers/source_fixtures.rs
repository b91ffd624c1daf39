//! Common notation fixtures for tests.

// Plain nesting
pub const SIMPLE_NESTING: &str = "Site(3) > Patient(20) > Cell(1000)";
pub const UNBALANCED_CLINICS: &str = "Clinic[45|38|52|29] > Patient(10) > Visit(3)";
pub const CLASSIFIED_CELLS: &str = "Sample(100) > Cell(5000) : CellType(35)";

// Crossing and confounding
pub const HOSPITAL_TRIAL: &str = "Hospital(4) > Patient(15) × Treatment(2) > Sample(3)";
pub const CONFOUNDED_CENTERS: &str = "{Center(3) ≈≈ Protocol(2)} > Patient(10)";

pub const SINGLE_CELL_ATLAS: &str = r#"
# single-cell atlas with sequencing lanes
Lane(4) == Donor(12) > Sample(3) > Cell(~5k) : CellType(42)
Donor > Visit(2)
"#;

pub const MULTI_CENTER: &str = r#"
{Center(5) ≈≈ Protocol(5)} > Patient[30|25|18|22|25] > Visit(4) > Sample(3) ◊ Assay(2)
Sample > Cell(~5k) : CellType(20)
"#;

/// Every fixture, for properties that must hold on all of them.
pub const ALL: &[&str] = &[
    SIMPLE_NESTING,
    UNBALANCED_CLINICS,
    CLASSIFIED_CELLS,
    HOSPITAL_TRIAL,
    CONFOUNDED_CENTERS,
    SINGLE_CELL_ATLAS,
    MULTI_CENTER,
];
