//! Graphviz DOT export.
//!
//! Write-only. Factors become rounded boxes coloured by kind, relationships
//! become edges styled by kind, and each confound group becomes a dashed
//! `cluster_N` subgraph.

use std::fmt::Write as _;

use super::{DesignFormat, FormatCapability, InterchangeError};
use crate::model::{Design, FactorKind, RelationKind};

/// DOT format handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dot;

impl DesignFormat for Dot {
    fn name(&self) -> &'static str {
        "DOT"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["dot", "gv"]
    }

    fn mime_type(&self) -> &'static str {
        "text/vnd.graphviz"
    }

    fn capabilities(&self) -> FormatCapability {
        FormatCapability::WRITE_ONLY
    }

    fn read(&self, _input: &[u8]) -> Result<Design, InterchangeError> {
        Err(InterchangeError::Unsupported(
            "DOT is an export-only format".to_string(),
        ))
    }

    fn write(&self, design: &Design) -> Result<Vec<u8>, InterchangeError> {
        Ok(to_dot(design).into_bytes())
    }
}

fn fill_color(kind: FactorKind) -> &'static str {
    match kind {
        FactorKind::Factor => "#E8F4F8",
        FactorKind::Batch => "#FFE6E6",
    }
}

fn edge_style(kind: RelationKind) -> &'static str {
    match kind {
        RelationKind::Nests => "",
        RelationKind::Crosses | RelationKind::PartialCrosses => ", style=dashed, dir=none",
        RelationKind::Classifies => ", style=dotted",
        RelationKind::BatchEffect => ", color=red, style=bold",
        RelationKind::Confounded => ", color=orange, style=dashed, dir=none",
    }
}

/// Node identifier: every character that is not alphanumeric becomes `_`.
pub fn sanitize_id(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

fn escape_label(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Render a design as a Graphviz `digraph`.
pub fn to_dot(design: &Design) -> String {
    let mut out = String::new();
    out.push_str("digraph ExperimentalDesign {\n");
    out.push_str("  rankdir=TB;\n");
    out.push_str("  node [shape=box, style=\"rounded,filled\"];\n\n");

    out.push_str("  // Factors\n");
    for (_, factor) in design.factors() {
        let _ = writeln!(
            out,
            "  {} [label=\"{}\", fillcolor=\"{}\"];",
            sanitize_id(&factor.name),
            escape_label(&factor.notation()),
            fill_color(factor.kind)
        );
    }

    out.push_str("\n  // Relationships\n");
    for rel in design.live_relationships() {
        let _ = writeln!(
            out,
            "  {} -> {} [label=\"{}\"{}];",
            sanitize_id(design.name_of(rel.from)),
            sanitize_id(design.name_of(rel.to)),
            rel.kind.symbol(),
            edge_style(rel.kind)
        );
    }

    let groups = design.confound_group_names();
    if !groups.is_empty() {
        out.push_str("\n  // Confound groups\n");
        for (i, group) in groups.iter().enumerate() {
            let _ = writeln!(out, "  subgraph cluster_{i} {{");
            out.push_str("    style=dashed;\n");
            out.push_str("    color=orange;\n");
            out.push_str("    label=\"Confounded\";\n");
            for name in group {
                let _ = writeln!(out, "    {};", sanitize_id(name));
            }
            out.push_str("  }\n");
        }
    }

    out.push_str("}\n");
    out
}
