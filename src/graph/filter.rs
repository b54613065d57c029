//! Derivation of the visible node/edge subset from the current filters.
//!
//! Everything here is a pure function of the model plus the filter values;
//! filtering hides nodes, it never removes them from the model.

use std::collections::HashSet;

use petgraph::algo::dijkstra;
use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};

use super::model::GraphModel;
use super::types::{CiType, RelationshipType};

/// Node-type dropdown selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TypeFilter {
    #[default]
    All,
    Only(CiType),
}

impl TypeFilter {
    pub fn matches(&self, ci_type: CiType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(only) => *only == ci_type,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TypeFilter::All => "All CIs",
            TypeFilter::Only(t) => t.label(),
        }
    }
}

/// Relationship-type dropdown selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RelationshipFilter {
    #[default]
    All,
    Only(RelationshipType),
}

impl RelationshipFilter {
    pub fn matches(&self, rel_type: RelationshipType) -> bool {
        match self {
            RelationshipFilter::All => true,
            RelationshipFilter::Only(only) => *only == rel_type,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RelationshipFilter::All => "All relationships",
            RelationshipFilter::Only(r) => r.label(),
        }
    }
}

/// Restrict the view to CIs within `max_hops` of a focus CI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthFilter {
    pub focus: String,
    pub max_hops: usize,
}

/// All filter inputs for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphFilter {
    pub node_type: TypeFilter,
    pub relationship_type: RelationshipFilter,
    /// Case-insensitive substring of name or id; empty matches everything
    pub search: String,
    pub depth: Option<DepthFilter>,
}

/// Nodes whose type passes `filter`, in node-list order.
pub fn visible_nodes(model: &GraphModel, filter: TypeFilter) -> Vec<usize> {
    model
        .nodes()
        .iter()
        .enumerate()
        .filter(|(_, node)| filter.matches(node.ci_type))
        .map(|(i, _)| i)
        .collect()
}

/// Relationships with both endpoints in `visible` and a type passing `filter`.
///
/// Returned values are indices into `model.relationships()`. Relationships
/// whose endpoints are unknown ids are never returned.
pub fn visible_edges(
    model: &GraphModel,
    visible: &[usize],
    filter: RelationshipFilter,
) -> Vec<usize> {
    let mut member = vec![false; model.len()];
    for &i in visible {
        if let Some(slot) = member.get_mut(i) {
            *slot = true;
        }
    }
    let is_visible = |id: &str| model.index_of(id).is_some_and(|i| member[i]);

    model
        .relationships()
        .iter()
        .enumerate()
        .filter(|(_, rel)| {
            filter.matches(rel.rel_type) && is_visible(&rel.source) && is_visible(&rel.target)
        })
        .map(|(i, _)| i)
        .collect()
}

/// Node indices within `max_hops` undirected hops of `focus`, focus included.
///
/// Returns `None` when the focus id is not in the model.
pub fn neighbourhood(model: &GraphModel, focus: &str, max_hops: usize) -> Option<HashSet<usize>> {
    let start = model.index_of(focus)?;

    let mut graph = UnGraph::<(), ()>::with_capacity(model.len(), model.relationships().len());
    for _ in 0..model.len() {
        graph.add_node(());
    }
    for rel in model.relationships() {
        if let (Some(s), Some(t)) = (model.index_of(&rel.source), model.index_of(&rel.target)) {
            graph.add_edge(NodeIndex::new(s), NodeIndex::new(t), ());
        }
    }

    let hops = dijkstra(&graph, NodeIndex::new(start), None, |_| 1usize);
    Some(
        hops.into_iter()
            .filter(|&(_, cost)| cost <= max_hops)
            .map(|(node, _)| node.index())
            .collect(),
    )
}

/// The visible subset for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibleSet {
    /// Node indices, in node-list order
    pub nodes: Vec<usize>,
    /// Relationship indices, in relationship-list order
    pub edges: Vec<usize>,
    member: Vec<bool>,
}

impl VisibleSet {
    pub fn compute(model: &GraphModel, filter: &GraphFilter) -> Self {
        let query = filter.search.trim().to_lowercase();
        let near = filter
            .depth
            .as_ref()
            .and_then(|d| neighbourhood(model, &d.focus, d.max_hops));

        let nodes: Vec<usize> = visible_nodes(model, filter.node_type)
            .into_iter()
            .filter(|&i| {
                let node = &model.nodes()[i];
                let passes_search = query.is_empty()
                    || node.name.to_lowercase().contains(&query)
                    || node.id.to_lowercase().contains(&query);
                let passes_depth = near.as_ref().map_or(true, |set| set.contains(&i));
                passes_search && passes_depth
            })
            .collect();

        let edges = visible_edges(model, &nodes, filter.relationship_type);

        let mut member = vec![false; model.len()];
        for &i in &nodes {
            member[i] = true;
        }

        Self {
            nodes,
            edges,
            member,
        }
    }

    /// Every node and every relationship with known endpoints
    pub fn everything(model: &GraphModel) -> Self {
        Self::compute(model, &GraphFilter::default())
    }

    pub fn contains_node(&self, index: usize) -> bool {
        self.member.get(index).copied().unwrap_or(false)
    }
}
