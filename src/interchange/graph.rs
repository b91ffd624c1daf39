//! Generic directed-graph view of a design.
//!
//! One node per live factor carrying `{n, type}`, one edge per live
//! relationship carrying `{type}`. Node order follows declaration order.

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::model::{Design, FactorKind, FactorSize, RelationKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAttrs {
    pub n: FactorSize,
    pub kind: FactorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    pub source: SmolStr,
    pub target: SmolStr,
    pub kind: RelationKind,
}

/// A name-keyed directed multigraph built from a [`Design`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesignGraph {
    nodes: IndexMap<SmolStr, NodeAttrs>,
    edges: Vec<GraphEdge>,
}

impl DesignGraph {
    pub fn from_design(design: &Design) -> Self {
        let nodes = design
            .factors()
            .map(|(_, f)| {
                (
                    f.name.clone(),
                    NodeAttrs {
                        n: f.size.clone(),
                        kind: f.kind,
                    },
                )
            })
            .collect();
        let edges = design
            .live_relationships()
            .map(|rel| GraphEdge {
                source: design.name_of(rel.from).into(),
                target: design.name_of(rel.to).into(),
                kind: rel.kind,
            })
            .collect();
        Self { nodes, edges }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&str, &NodeAttrs)> + '_ {
        self.nodes.iter().map(|(name, attrs)| (name.as_str(), attrs))
    }

    pub fn node(&self, name: &str) -> Option<&NodeAttrs> {
        self.nodes.get(name)
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Targets of edges leaving `name`, optionally restricted to one kind.
    pub fn successors<'a>(
        &'a self,
        name: &'a str,
        kind: Option<RelationKind>,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.edges
            .iter()
            .filter(move |e| e.source == name && kind.is_none_or(|k| e.kind == k))
            .map(|e| e.target.as_str())
    }

    /// Sources of edges entering `name`, optionally restricted to one kind.
    pub fn predecessors<'a>(
        &'a self,
        name: &'a str,
        kind: Option<RelationKind>,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.edges
            .iter()
            .filter(move |e| e.target == name && kind.is_none_or(|k| e.kind == k))
            .map(|e| e.source.as_str())
    }

    /// Nodes with no incoming `nests` edge.
    pub fn roots(&self) -> Vec<&str> {
        self.nodes
            .keys()
            .filter(|name| self.predecessors(name, Some(RelationKind::Nests)).next().is_none())
            .map(SmolStr::as_str)
            .collect()
    }

    /// Nodes with no outgoing `nests` edge.
    pub fn leaves(&self) -> Vec<&str> {
        self.nodes
            .keys()
            .filter(|name| self.successors(name, Some(RelationKind::Nests)).next().is_none())
            .map(SmolStr::as_str)
            .collect()
    }

    pub fn in_degree(&self, name: &str) -> usize {
        self.predecessors(name, None).count()
    }

    pub fn out_degree(&self, name: &str) -> usize {
        self.successors(name, None).count()
    }
}

impl Design {
    /// The directed-graph view of this design.
    pub fn to_graph(&self) -> DesignGraph {
        DesignGraph::from_design(self)
    }
}
