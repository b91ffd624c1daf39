//! Factors — the named variables of an experimental design.

use std::fmt;
use std::str::FromStr;

use smol_str::SmolStr;

/// Stable handle to a factor in a [`Design`](super::Design) arena.
///
/// Handles are never reused: removing a factor leaves its slot behind, so a
/// relationship that still points at it can be reported as orphaned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FactorId(pub u32);

impl FactorId {
    /// Create a new FactorId from an arena index
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Get the index into the arena
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The number of levels of a factor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FactorSize {
    /// An exact positive count, e.g. `Site(3)`.
    Exact(u64),
    /// Per-branch counts of an unbalanced factor, e.g. `Patient[30|25|18]`.
    Unbalanced(Vec<u64>),
    /// A positive count known only roughly, e.g. `Cell(~5000)`.
    Approximate(u64),
}

impl FactorSize {
    /// Convenience constructor for an approximate count
    pub fn approx(n: u64) -> Self {
        Self::Approximate(n)
    }

    /// Total number of levels. Unbalanced factors contribute the sum of
    /// their branches.
    pub fn levels(&self) -> u64 {
        match self {
            Self::Exact(n) | Self::Approximate(n) => *n,
            Self::Unbalanced(branches) => branches
                .iter()
                .fold(0u64, |acc, n| acc.saturating_add(*n)),
        }
    }

    pub fn is_approximate(&self) -> bool {
        matches!(self, Self::Approximate(_))
    }

    /// Check the positivity invariants, returning the reason on failure.
    pub fn check(&self) -> Result<(), &'static str> {
        match self {
            Self::Exact(0) => Err("count must be positive"),
            Self::Approximate(0) => Err("approximate count must be positive"),
            Self::Unbalanced(branches) if branches.is_empty() => {
                Err("unbalanced size needs at least one branch")
            }
            Self::Unbalanced(branches) if branches.contains(&0) => {
                Err("every branch count must be positive")
            }
            _ => Ok(()),
        }
    }

    /// Compact label used in diagrams: exact multiples of 1000 use the
    /// thousands shorthand (`5000` → `5k`).
    pub fn short_label(&self) -> String {
        fn shorthand(n: u64) -> String {
            if n >= 1000 && n % 1000 == 0 {
                format!("{}k", n / 1000)
            } else {
                n.to_string()
            }
        }
        match self {
            Self::Exact(n) => shorthand(*n),
            Self::Approximate(n) => format!("~{}", shorthand(*n)),
            Self::Unbalanced(_) => self.to_string(),
        }
    }
}

impl fmt::Display for FactorSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{n}"),
            Self::Approximate(n) => write!(f, "~{n}"),
            Self::Unbalanced(branches) => {
                f.write_str("[")?;
                for (i, n) in branches.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{n}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<u64> for FactorSize {
    fn from(n: u64) -> Self {
        Self::Exact(n)
    }
}

impl From<Vec<u64>> for FactorSize {
    fn from(branches: Vec<u64>) -> Self {
        Self::Unbalanced(branches)
    }
}

impl<const N: usize> From<[u64; N]> for FactorSize {
    fn from(branches: [u64; N]) -> Self {
        Self::Unbalanced(branches.to_vec())
    }
}

/// Parses the textual size forms used by the interchange document:
/// `"3"`, `"~5000"`, `"5k"`, `"~5k"`, `"[30|25|18]"`.
impl FromStr for FactorSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        fn count(s: &str) -> Result<u64, String> {
            let s = s.trim();
            let (digits, scale) = match s.strip_suffix('k') {
                Some(digits) => (digits, 1000),
                None => (s, 1),
            };
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(format!("malformed count '{s}'"));
            }
            digits
                .parse::<u64>()
                .ok()
                .and_then(|n| n.checked_mul(scale))
                .ok_or_else(|| format!("count '{s}' is out of range"))
        }

        let s = s.trim();
        if let Some(rest) = s.strip_prefix('~') {
            return count(rest).map(Self::Approximate);
        }
        if let Some(inner) = s.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            return inner
                .split('|')
                .map(count)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Unbalanced);
        }
        count(s).map(Self::Exact)
    }
}

/// Whether a factor is a design level or a technical variation source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "interchange",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum FactorKind {
    #[default]
    Factor,
    Batch,
}

impl FactorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Factor => "factor",
            Self::Batch => "batch",
        }
    }
}

impl fmt::Display for FactorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FactorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "factor" => Ok(Self::Factor),
            "batch" => Ok(Self::Batch),
            other => Err(format!("unknown factor type '{other}'")),
        }
    }
}

/// A named design variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Factor {
    pub name: SmolStr,
    pub size: FactorSize,
    pub kind: FactorKind,
}

impl Factor {
    pub fn new(name: impl Into<SmolStr>, size: impl Into<FactorSize>, kind: FactorKind) -> Self {
        Self {
            name: name.into(),
            size: size.into(),
            kind,
        }
    }

    pub fn is_batch(&self) -> bool {
        self.kind == FactorKind::Batch
    }

    /// The factor as written in the notation: `Site(3)`, `Cell(~5000)`,
    /// `Patient[30|25|18]`.
    pub fn notation(&self) -> String {
        match &self.size {
            FactorSize::Unbalanced(_) => format!("{}{}", self.name, self.size),
            size => format!("{}({size})", self.name),
        }
    }

    /// Diagram label with the thousands shorthand applied.
    pub fn label(&self) -> String {
        match &self.size {
            FactorSize::Unbalanced(_) => format!("{}{}", self.name, self.size),
            size => format!("{}({})", self.name, size.short_label()),
        }
    }
}
