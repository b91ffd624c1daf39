//! Structural validation of a [`Design`].
//!
//! Every check runs independently and all findings are reported in one
//! pass. Validation never fails; it returns a list of issues.

use std::fmt;

use rustc_hash::FxHashSet;
use tracing::debug;

use super::{Design, FactorId, RelationKind, Relationship};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueSeverity {
    Error,
    Warning,
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    EmptyDesign,
    NestingCycle,
    ClassificationNotTerminal,
    DuplicateRelationship,
    OrphanedRelationship,
}

impl IssueKind {
    pub fn severity(&self) -> IssueSeverity {
        match self {
            Self::EmptyDesign => IssueSeverity::Warning,
            _ => IssueSeverity::Error,
        }
    }
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub severity: IssueSeverity,
    pub message: String,
}

impl ValidationIssue {
    fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

impl Design {
    /// Check the design's structural invariants.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut validator = Validator::new(self);
        validator.check_empty();
        validator.check_nesting_cycles();
        validator.check_classification_terminal();
        validator.check_duplicates();
        validator.check_orphans();
        debug!(issues = validator.issues.len(), "validated design");
        validator.issues
    }

    /// True when [`validate`](Design::validate) reports no errors.
    pub fn is_valid(&self) -> bool {
        self.validate()
            .iter()
            .all(|issue| issue.severity != IssueSeverity::Error)
    }
}

struct Validator<'a> {
    design: &'a Design,
    issues: Vec<ValidationIssue>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

impl<'a> Validator<'a> {
    fn new(design: &'a Design) -> Self {
        Self {
            design,
            issues: Vec::new(),
        }
    }

    fn name(&self, id: FactorId) -> &'a str {
        self.design.name_of(id)
    }

    fn live(&self, rel: &Relationship) -> bool {
        self.design.is_live(rel.from) && self.design.is_live(rel.to)
    }

    fn check_empty(&mut self) {
        if self.design.is_empty() {
            self.issues
                .push(ValidationIssue::new(IssueKind::EmptyDesign, "design has no factors"));
        }
    }

    /// Three-color depth-first search over live `nests` edges. Every back
    /// edge found is one reported cycle.
    fn check_nesting_cycles(&mut self) {
        let n = self.design.arena_len();
        let mut children: Vec<Vec<FactorId>> = vec![Vec::new(); n];
        for rel in self.design.relationships_of(RelationKind::Nests) {
            if self.live(rel) {
                children[rel.from.index()].push(rel.to);
            }
        }

        let mut color = vec![Color::White; n];
        for (root, _) in self.design.factors() {
            if color[root.index()] != Color::White {
                continue;
            }
            // Explicit stack of (node, next child index).
            let mut stack: Vec<(FactorId, usize)> = vec![(root, 0)];
            color[root.index()] = Color::Gray;
            while let Some(top) = stack.last_mut() {
                let (node, next) = *top;
                top.1 += 1;
                if let Some(&child) = children[node.index()].get(next) {
                    match color[child.index()] {
                        Color::White => {
                            color[child.index()] = Color::Gray;
                            stack.push((child, 0));
                        }
                        Color::Gray => {
                            let start = stack
                                .iter()
                                .position(|(id, _)| *id == child)
                                .unwrap_or(0);
                            let mut path: Vec<&str> =
                                stack[start..].iter().map(|(id, _)| self.name(*id)).collect();
                            path.push(self.name(child));
                            self.issues.push(ValidationIssue::new(
                                IssueKind::NestingCycle,
                                format!(
                                    "nesting cycle: {} (back edge {} > {})",
                                    path.join(" > "),
                                    self.name(node),
                                    self.name(child)
                                ),
                            ));
                        }
                        Color::Black => {}
                    }
                } else {
                    color[node.index()] = Color::Black;
                    stack.pop();
                }
            }
        }
    }

    /// A classified subject may not appear in any later edge, other than a
    /// further classification of the same subject.
    fn check_classification_terminal(&mut self) {
        let rels = self.design.relationships();
        for (i, rel) in rels.iter().enumerate() {
            if rel.kind != RelationKind::Classifies || !self.live(rel) {
                continue;
            }
            let subject = rel.from;
            for later in &rels[i + 1..] {
                let also_classifies =
                    later.kind == RelationKind::Classifies && later.from == subject;
                if later.touches(subject) && !also_classifies && self.live(later) {
                    self.issues.push(ValidationIssue::new(
                        IssueKind::ClassificationNotTerminal,
                        format!(
                            "'{}' is classified by '{}' but appears again in {} {} {}",
                            self.name(subject),
                            self.name(rel.to),
                            self.name(later.from),
                            later.kind.operator(),
                            self.name(later.to)
                        ),
                    ));
                }
            }
        }
    }

    fn check_duplicates(&mut self) {
        let mut seen: FxHashSet<Relationship> = FxHashSet::default();
        let mut reported: FxHashSet<Relationship> = FxHashSet::default();
        for rel in self.design.relationships() {
            if !seen.insert(*rel) && reported.insert(*rel) {
                self.issues.push(ValidationIssue::new(
                    IssueKind::DuplicateRelationship,
                    format!(
                        "duplicate relationship {} {} {}",
                        self.name(rel.from),
                        rel.kind.operator(),
                        self.name(rel.to)
                    ),
                ));
            }
        }
    }

    fn check_orphans(&mut self) {
        for rel in self.design.relationships() {
            let missing: Vec<&str> = [rel.from, rel.to]
                .into_iter()
                .filter(|id| !self.design.is_live(*id))
                .map(|id| self.name(id))
                .collect();
            if !missing.is_empty() {
                self.issues.push(ValidationIssue::new(
                    IssueKind::OrphanedRelationship,
                    format!(
                        "relationship {} {} {} references removed factor '{}'",
                        self.name(rel.from),
                        rel.kind.operator(),
                        self.name(rel.to),
                        missing.join("', '")
                    ),
                ));
            }
        }
    }
}
