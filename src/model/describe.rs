use std::fmt::Write;

use indexmap::IndexMap;

use super::{Design, RelationKind, Relationship};

impl Design {
    /// Multi-line human-readable summary: factors, relationships grouped by
    /// kind in order of first appearance, and the observation total.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        out.push_str("Experimental Design Description\n");
        out.push_str(&"=".repeat(40));
        out.push_str("\n\n");

        if let Some(study) = &self.metadata().study {
            let _ = writeln!(out, "Study: {study}\n");
        }

        let _ = writeln!(out, "Factors ({}):", self.factor_count());
        for (_, factor) in self.factors() {
            let _ = writeln!(out, "  - {} ({}): {}", factor.name, factor.size, factor.kind);
        }
        out.push('\n');

        let mut by_kind: IndexMap<RelationKind, Vec<&Relationship>> = IndexMap::new();
        for rel in self.live_relationships() {
            by_kind.entry(rel.kind).or_default().push(rel);
        }
        let total: usize = by_kind.values().map(Vec::len).sum();
        let _ = writeln!(out, "Relationships ({total}):");
        for (kind, rels) in &by_kind {
            let _ = writeln!(out, "  {kind}:");
            for rel in rels {
                let _ = writeln!(
                    out,
                    "    - {} → {}",
                    self.name_of(rel.from),
                    self.name_of(rel.to)
                );
            }
        }
        out.push('\n');

        let _ = write!(out, "Total observations: {}", self.count_observations());
        out
    }
}
