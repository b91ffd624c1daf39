//! Typed, directed edges between factors.

use std::fmt;
use std::str::FromStr;

use super::FactorId;

/// The structural meaning of an edge.
///
/// Symmetric kinds (`Crosses`, `PartialCrosses`, `Confounded`) are still
/// stored with a direction: `from` is the factor written first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "interchange",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum RelationKind {
    /// `from` contains `to`: every level of `to` belongs to one level of `from`.
    Nests,
    /// Every level of `from` is combined with every level of `to`.
    Crosses,
    /// Only some combinations of levels are observed.
    PartialCrosses,
    /// `to` is a post-hoc label assigned to levels of `from`.
    Classifies,
    /// The two factors vary together and cannot be separated.
    Confounded,
    /// `from` is a technical variation source affecting `to`.
    BatchEffect,
}

impl RelationKind {
    pub const ALL: [RelationKind; 6] = [
        Self::Nests,
        Self::Crosses,
        Self::PartialCrosses,
        Self::Classifies,
        Self::Confounded,
        Self::BatchEffect,
    ];

    /// Name used in interchange documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nests => "nests",
            Self::Crosses => "crosses",
            Self::PartialCrosses => "partial_crosses",
            Self::Classifies => "classifies",
            Self::Confounded => "confounded",
            Self::BatchEffect => "batch_effect",
        }
    }

    /// Canonical operator spelling in the notation.
    pub fn operator(&self) -> &'static str {
        match self {
            Self::Nests => ">",
            Self::Crosses => "×",
            Self::PartialCrosses => "◊",
            Self::Classifies => ":",
            Self::Confounded => "≈≈",
            Self::BatchEffect => "==",
        }
    }

    /// Glyph used on diagram connectors and graph exports.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Nests => "↓",
            Self::Crosses => "×",
            Self::PartialCrosses => "◊",
            Self::Classifies => ":",
            Self::Confounded => "≈",
            Self::BatchEffect => "══",
        }
    }

    pub fn is_symmetric(&self) -> bool {
        matches!(
            self,
            Self::Crosses | Self::PartialCrosses | Self::Confounded
        )
    }

    /// Kinds that place both endpoints on the same diagram row.
    pub fn is_same_level(&self) -> bool {
        self.is_symmetric()
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown relationship type '{s}'"))
    }
}

/// A directed edge between two factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Relationship {
    pub from: FactorId,
    pub to: FactorId,
    pub kind: RelationKind,
}

impl Relationship {
    pub fn new(from: FactorId, to: FactorId, kind: RelationKind) -> Self {
        Self { from, to, kind }
    }

    pub fn touches(&self, id: FactorId) -> bool {
        self.from == id || self.to == id
    }

    /// Whether `self` and `other` describe the same edge. Symmetric kinds
    /// match in either direction.
    pub fn same_edge(&self, other: &Relationship) -> bool {
        if self.kind != other.kind {
            return false;
        }
        (self.from == other.from && self.to == other.to)
            || (self.kind.is_symmetric() && self.from == other.to && self.to == other.from)
    }
}
