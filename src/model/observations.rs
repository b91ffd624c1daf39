//! Observation counting.
//!
//! Factors are grouped into counting units: confounded factors share one
//! unit, and units joined by partial crossing form a single block. Blocks
//! are visited in topological order of the nesting graph and each block
//! multiplies into the total exactly once.
//!
//! A partial crossing does not say which level combinations occur, only
//! that every level of each side does. A block therefore contributes the
//! size of its largest unit, the smallest count consistent with the model
//! and below the full crossed product, and always marks the total
//! approximate.

use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, warn};

use super::{Design, FactorId, RelationKind};

/// A computed count and whether it is exact.
///
/// Once `approximate` is set by any contributing factor, partial crossing,
/// or overflow, it stays set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObservationCount {
    pub total: u64,
    pub approximate: bool,
}

impl ObservationCount {
    pub const ONE: Self = Self {
        total: 1,
        approximate: false,
    };

    pub fn exact(total: u64) -> Self {
        Self {
            total,
            approximate: false,
        }
    }

    pub fn approximate(total: u64) -> Self {
        Self {
            total,
            approximate: true,
        }
    }

    /// Multiply by `n`, saturating and tainting on overflow.
    fn times(self, n: u64, approximate: bool) -> Self {
        match self.total.checked_mul(n) {
            Some(total) => Self {
                total,
                approximate: self.approximate || approximate,
            },
            None => Self::approximate(u64::MAX),
        }
    }
}

impl fmt::Display for ObservationCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.approximate {
            write!(f, "~{}", self.total)
        } else {
            write!(f, "{}", self.total)
        }
    }
}

/// Union-find keyed by arena index; the smallest index is the root.
pub(crate) struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    pub(crate) fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    pub(crate) fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[child] = root;
        }
    }
}

/// One multiplicative term of the total.
#[derive(Debug, Clone)]
struct Block {
    members: Vec<FactorId>,
    size: u64,
    approximate: bool,
}

/// The counting plan for a design: blocks in visiting order plus the
/// nesting parents of each block.
struct CountingPlan {
    blocks: Vec<Block>,
    /// Indices into `blocks` in visiting order.
    order: Vec<usize>,
    parents: Vec<Vec<usize>>,
}

impl CountingPlan {
    fn build(design: &Design) -> Self {
        let n = design.arena_len();

        let mut excluded = vec![false; n];
        for rel in design.live_relationships() {
            match rel.kind {
                RelationKind::Classifies => excluded[rel.to.index()] = true,
                RelationKind::BatchEffect => excluded[rel.from.index()] = true,
                _ => {}
            }
        }
        let counted: Vec<FactorId> = design
            .factors()
            .filter(|(id, f)| !f.is_batch() && !excluded[id.index()])
            .map(|(id, _)| id)
            .collect();
        let mut is_counted = vec![false; n];
        for id in &counted {
            is_counted[id.index()] = true;
        }
        let both_counted = |a: FactorId, b: FactorId| is_counted[a.index()] && is_counted[b.index()];

        // Confounded factors collapse into one unit.
        let mut units = DisjointSet::new(n);
        for rel in design.relationships_of(RelationKind::Confounded) {
            if both_counted(rel.from, rel.to) {
                units.union(rel.from.index(), rel.to.index());
            }
        }
        for group in &design.metadata().confound_groups {
            let live: Vec<&FactorId> = group.iter().filter(|id| is_counted[id.index()]).collect();
            for pair in live.windows(2) {
                units.union(pair[0].index(), pair[1].index());
            }
        }

        // Units joined by partial crossing form one block.
        let mut blocks_set = DisjointSet::new(n);
        for id in &counted {
            let unit = units.find(id.index());
            blocks_set.union(id.index(), unit);
        }
        let mut partial = vec![false; n];
        for rel in design.relationships_of(RelationKind::PartialCrosses) {
            if both_counted(rel.from, rel.to) {
                blocks_set.union(rel.from.index(), rel.to.index());
                partial[rel.from.index()] = true;
                partial[rel.to.index()] = true;
            }
        }

        // Materialise blocks in declaration order of their first member.
        let mut block_of = vec![usize::MAX; n];
        let mut blocks: Vec<Block> = Vec::new();
        let mut block_index_of_root = vec![usize::MAX; n];
        for id in &counted {
            let root = blocks_set.find(id.index());
            let b = if block_index_of_root[root] == usize::MAX {
                block_index_of_root[root] = blocks.len();
                blocks.push(Block {
                    members: Vec::new(),
                    size: 1,
                    approximate: false,
                });
                blocks.len() - 1
            } else {
                block_index_of_root[root]
            };
            block_of[id.index()] = b;
            blocks[b].members.push(*id);
        }

        for block in &mut blocks {
            // Unit sizes: the maximum over confounded members.
            let mut unit_sizes: Vec<(usize, u64, bool)> = Vec::new();
            for id in &block.members {
                let Some(factor) = design.get(*id) else { continue };
                let unit = units.find(id.index());
                let levels = factor.size.levels();
                let approx = factor.size.is_approximate();
                match unit_sizes.iter_mut().find(|(u, _, _)| *u == unit) {
                    Some(entry) => {
                        entry.1 = entry.1.max(levels);
                        entry.2 |= approx;
                    }
                    None => unit_sizes.push((unit, levels, approx)),
                }
            }
            // Lower bound: the largest unit, never the full product.
            block.size = unit_sizes.iter().map(|(_, s, _)| *s).max().unwrap_or(1);
            block.approximate = unit_sizes.iter().any(|(_, _, a)| *a)
                || block.members.iter().any(|id| partial[id.index()]);
        }

        let mut parents: Vec<Vec<usize>> = vec![Vec::new(); blocks.len()];
        for rel in design.relationships_of(RelationKind::Nests) {
            if !both_counted(rel.from, rel.to) {
                continue;
            }
            let (p, c) = (block_of[rel.from.index()], block_of[rel.to.index()]);
            if p != c && !parents[c].contains(&p) {
                parents[c].push(p);
            }
        }

        let order = topological_order(&parents);
        Self {
            blocks,
            order,
            parents,
        }
    }
}

/// Kahn's algorithm, ties broken by declaration order. Blocks left over
/// by a cycle are appended in declaration order.
fn topological_order(parents: &[Vec<usize>]) -> Vec<usize> {
    let n = parents.len();
    let mut indegree: Vec<usize> = parents.iter().map(Vec::len).collect();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (c, ps) in parents.iter().enumerate() {
        for &p in ps {
            children[p].push(c);
        }
    }

    let mut queue: VecDeque<usize> = (0..n).filter(|&b| indegree[b] == 0).collect();
    let mut order = Vec::with_capacity(n);
    let mut visited = vec![false; n];
    while let Some(b) = queue.pop_front() {
        visited[b] = true;
        order.push(b);
        for &c in &children[b] {
            indegree[c] -= 1;
            if indegree[c] == 0 {
                queue.push_back(c);
            }
        }
    }
    if order.len() < n {
        warn!(
            blocks = n - order.len(),
            "nesting cycle met while counting observations"
        );
        order.extend((0..n).filter(|&b| !visited[b]));
    }
    order
}

impl Design {
    /// Total number of observations implied by the design.
    ///
    /// Batch factors and classifiers do not multiply the total.
    pub fn count_observations(&self) -> ObservationCount {
        let plan = CountingPlan::build(self);
        let count = plan.order.iter().fold(ObservationCount::ONE, |acc, &b| {
            let block = &plan.blocks[b];
            acc.times(block.size, block.approximate)
        });
        debug!(%count, blocks = plan.blocks.len(), "counted observations");
        count
    }

    /// Number of instances of each counted factor: the product of its own
    /// block and every block it is nested under. Returned in declaration
    /// order.
    pub fn level_counts(&self) -> Vec<(FactorId, ObservationCount)> {
        let plan = CountingPlan::build(self);
        let n = plan.blocks.len();

        let mut ancestors: Vec<Vec<bool>> = vec![vec![false; n]; n];
        for &b in &plan.order {
            ancestors[b][b] = true;
            for &p in &plan.parents[b] {
                let inherited = ancestors[p].clone();
                for (slot, from_parent) in ancestors[b].iter_mut().zip(inherited) {
                    *slot |= from_parent;
                }
            }
        }

        let mut per_block: Vec<ObservationCount> = Vec::with_capacity(n);
        for set in &ancestors {
            let count = set
                .iter()
                .enumerate()
                .filter(|(_, in_closure)| **in_closure)
                .fold(ObservationCount::ONE, |acc, (a, _)| {
                    acc.times(plan.blocks[a].size, plan.blocks[a].approximate)
                });
            per_block.push(count);
        }

        let mut counts: Vec<(FactorId, ObservationCount)> = plan
            .blocks
            .iter()
            .zip(per_block)
            .flat_map(|(block, count)| block.members.iter().map(move |id| (*id, count)))
            .collect();
        counts.sort_by_key(|(id, _)| *id);
        counts
    }
}
