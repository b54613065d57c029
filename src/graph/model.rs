//! Node arena and relationship list for one graph view.
//!
//! Nodes live in a `Vec` whose indices stay stable for the lifetime of the
//! model; an id -> index map gives O(1) lookup. Relationships reference nodes
//! by id only, so a relationship may point at an id that does not exist.

use std::collections::HashMap;

use egui::{Pos2, Vec2};
use rand::Rng;

use super::types::{
    CiNode, Direction, GraphData, NodeDetail, Relationship, RelationshipSummary,
};

/// Smallest canvas extent accepted on either axis
pub const MIN_CANVAS_EXTENT: f32 = 100.0;

/// Inset used when scattering nodes over the canvas
const SCATTER_INSET: f32 = 50.0;

/// Size of the drawing surface in model units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl CanvasSize {
    /// Zero, negative and non-finite extents are raised to `MIN_CANVAS_EXTENT`.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: sanitize_extent(width),
            height: sanitize_extent(height),
        }
    }

    pub fn center(&self) -> Pos2 {
        Pos2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Clamp a point into `[margin, extent - margin]` on both axes.
    pub fn clamp(&self, pos: Pos2, margin: f32) -> Pos2 {
        let max_x = (self.width - margin).max(margin);
        let max_y = (self.height - margin).max(margin);
        Pos2::new(pos.x.clamp(margin, max_x), pos.y.clamp(margin, max_y))
    }

    fn random_point(&self, rng: &mut impl Rng) -> Pos2 {
        let span_x = (self.width - 2.0 * SCATTER_INSET).max(1.0);
        let span_y = (self.height - 2.0 * SCATTER_INSET).max(1.0);
        Pos2::new(
            SCATTER_INSET + rng.gen::<f32>() * span_x,
            SCATTER_INSET + rng.gen::<f32>() * span_y,
        )
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

fn sanitize_extent(value: f32) -> f32 {
    if value.is_finite() {
        value.max(MIN_CANVAS_EXTENT)
    } else {
        MIN_CANVAS_EXTENT
    }
}

/// The graph's nodes and relationships
pub struct GraphModel {
    nodes: Vec<CiNode>,
    index: HashMap<String, usize>,
    relationships: Vec<Relationship>,
    canvas: CanvasSize,
}

impl GraphModel {
    /// Build the model from supplied data, scattering nodes randomly over the canvas.
    ///
    /// A node whose id was already seen is dropped. Relationship strengths are
    /// clamped into the supported range; relationships to unknown ids are kept
    /// and simply never drawn.
    pub fn new(data: GraphData, canvas: CanvasSize, rng: &mut impl Rng) -> Self {
        let mut nodes = Vec::with_capacity(data.nodes.len());
        let mut index = HashMap::with_capacity(data.nodes.len());

        for record in data.nodes {
            if index.contains_key(&record.id) {
                tracing::warn!("Dropping duplicate CI id {:?}", record.id);
                continue;
            }
            index.insert(record.id.clone(), nodes.len());
            nodes.push(CiNode::from_record(record, canvas.random_point(rng)));
        }

        let relationships: Vec<Relationship> = data
            .relationships
            .into_iter()
            .map(|mut rel| {
                rel.strength = rel
                    .strength
                    .clamp(Relationship::MIN_STRENGTH, Relationship::MAX_STRENGTH);
                rel
            })
            .collect();

        let dangling = relationships
            .iter()
            .filter(|rel| !index.contains_key(&rel.source) || !index.contains_key(&rel.target))
            .count();
        tracing::info!(
            "Loaded CI graph: {} nodes, {} relationships ({} dangling)",
            nodes.len(),
            relationships.len(),
            dangling
        );

        Self {
            nodes,
            index,
            relationships,
            canvas,
        }
    }

    pub fn nodes(&self) -> &[CiNode] {
        &self.nodes
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn node(&self, index: usize) -> Option<&CiNode> {
        self.nodes.get(index)
    }

    pub fn node_by_id(&self, id: &str) -> Option<&CiNode> {
        self.index_of(id).map(|i| &self.nodes[i])
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [CiNode] {
        &mut self.nodes
    }

    /// Pin a node at `pos`; its position follows immediately.
    pub fn pin(&mut self, index: usize, pos: Pos2) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pin = Some(pos);
            node.pos = pos;
        }
    }

    pub fn unpin(&mut self, index: usize) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pin = None;
        }
    }

    #[cfg(test)]
    pub fn pinned_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_pinned()).count()
    }

    /// Scatter every node over the canvas again, zeroing motion and releasing pins.
    pub fn restart_layout(&mut self, rng: &mut impl Rng) {
        let canvas = self.canvas;
        for node in &mut self.nodes {
            node.pos = canvas.random_point(rng);
            node.velocity = Vec2::ZERO;
            node.pin = None;
        }
    }

    /// Adopt new canvas dimensions and pull every node (and pin) back inside.
    pub fn resize(&mut self, canvas: CanvasSize, margin: f32) {
        self.canvas = canvas;
        for node in &mut self.nodes {
            node.pos = canvas.clamp(node.pos, margin);
            if let Some(pin) = node.pin {
                node.pin = Some(canvas.clamp(pin, margin));
            }
        }
    }

    /// Detail payload for a node, with its relationships resolved to peer names.
    pub fn detail(&self, id: &str) -> Option<NodeDetail> {
        let node = self.node_by_id(id)?;
        let peer_name = |peer: &str| {
            self.node_by_id(peer)
                .map(|n| n.name.clone())
                .unwrap_or_default()
        };

        let relationships = self
            .relationships
            .iter()
            .filter_map(|rel| {
                let (direction, peer) = if rel.source == id {
                    (Direction::Outgoing, &rel.target)
                } else if rel.target == id {
                    (Direction::Incoming, &rel.source)
                } else {
                    return None;
                };
                Some(RelationshipSummary {
                    direction,
                    peer_id: peer.clone(),
                    peer_name: peer_name(peer),
                    rel_type: rel.rel_type,
                    strength: rel.strength,
                })
            })
            .collect();

        Some(NodeDetail {
            id: node.id.clone(),
            name: node.name.clone(),
            ci_type: node.ci_type,
            status: node.status,
            metadata: node.metadata.clone(),
            relationships,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::graph::types::{CiMetadata, CiRecord, CiStatus, CiType, RelationshipType};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    pub(crate) fn record(id: &str, ci_type: CiType) -> CiRecord {
        CiRecord {
            id: id.to_string(),
            name: format!("CI {}", id),
            ci_type,
            status: CiStatus::Healthy,
            details: CiMetadata::default(),
        }
    }

    pub(crate) fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_duplicate_ids_are_dropped() {
        let data = GraphData {
            nodes: vec![
                record("a", CiType::Server),
                record("a", CiType::Database),
                record("b", CiType::Network),
            ],
            relationships: Vec::new(),
        };
        let model = GraphModel::new(data, CanvasSize::default(), &mut rng());
        assert_eq!(model.len(), 2);
        assert_eq!(model.node_by_id("a").unwrap().ci_type, CiType::Server);
        assert_eq!(model.index_of("b"), Some(1));
    }

    #[test]
    fn test_strength_is_clamped_on_load() {
        let mut rel = Relationship::new("a", "b", RelationshipType::DependsOn, 3);
        rel.strength = 7;
        let data = GraphData {
            nodes: vec![record("a", CiType::Server), record("b", CiType::Server)],
            relationships: vec![rel],
        };
        let model = GraphModel::new(data, CanvasSize::default(), &mut rng());
        assert_eq!(model.relationships()[0].strength, 3);
    }

    #[test]
    fn test_initial_positions_inside_canvas() {
        let data = GraphData {
            nodes: (0..50).map(|i| record(&i.to_string(), CiType::Server)).collect(),
            relationships: Vec::new(),
        };
        let canvas = CanvasSize::new(400.0, 300.0);
        let model = GraphModel::new(data, canvas, &mut rng());
        for node in model.nodes() {
            assert!(node.pos.x >= 50.0 && node.pos.x <= 350.0);
            assert!(node.pos.y >= 50.0 && node.pos.y <= 250.0);
        }
    }

    #[test]
    fn test_canvas_rejects_degenerate_extents() {
        let canvas = CanvasSize::new(0.0, -20.0);
        assert_eq!(canvas.width, MIN_CANVAS_EXTENT);
        assert_eq!(canvas.height, MIN_CANVAS_EXTENT);
        let canvas = CanvasSize::new(f32::NAN, f32::INFINITY);
        assert_eq!(canvas.width, MIN_CANVAS_EXTENT);
        assert_eq!(canvas.height, MIN_CANVAS_EXTENT);
    }

    #[test]
    fn test_resize_reclamps_positions_and_pins() {
        let data = GraphData {
            nodes: vec![record("a", CiType::Server), record("b", CiType::Server)],
            relationships: Vec::new(),
        };
        let mut model = GraphModel::new(data, CanvasSize::new(1000.0, 1000.0), &mut rng());
        model.pin(0, Pos2::new(900.0, 900.0));
        model.nodes_mut()[1].pos = Pos2::new(-40.0, 800.0);

        model.resize(CanvasSize::new(200.0, 150.0), 30.0);

        assert_eq!(model.node(0).unwrap().pos, Pos2::new(170.0, 120.0));
        assert_eq!(model.node(0).unwrap().pin, Some(Pos2::new(170.0, 120.0)));
        assert_eq!(model.node(1).unwrap().pos, Pos2::new(30.0, 120.0));
    }

    #[test]
    fn test_restart_layout_clears_pins_and_velocity() {
        let data = GraphData {
            nodes: vec![record("a", CiType::Server), record("b", CiType::Server)],
            relationships: Vec::new(),
        };
        let mut model = GraphModel::new(data, CanvasSize::default(), &mut rng());
        model.pin(0, Pos2::new(10.0, 10.0));
        model.nodes_mut()[1].velocity = Vec2::new(5.0, 5.0);

        model.restart_layout(&mut rng());

        assert_eq!(model.pinned_count(), 0);
        assert!(model.nodes().iter().all(|n| n.velocity == Vec2::ZERO));
    }

    #[test]
    fn test_detail_resolves_relationships() {
        let data = GraphData {
            nodes: vec![record("a", CiType::Server), record("b", CiType::Database)],
            relationships: vec![
                Relationship::new("a", "b", RelationshipType::DependsOn, 3),
                Relationship::new("c", "a", RelationshipType::Monitors, 1),
                Relationship::new("b", "c", RelationshipType::Supports, 2),
            ],
        };
        let model = GraphModel::new(data, CanvasSize::default(), &mut rng());
        let detail = model.detail("a").unwrap();

        assert_eq!(detail.ci_type, CiType::Server);
        assert_eq!(detail.relationships.len(), 2);
        assert_eq!(detail.relationships[0].direction, Direction::Outgoing);
        assert_eq!(detail.relationships[0].peer_name, "CI b");
        assert_eq!(detail.relationships[1].direction, Direction::Incoming);
        assert_eq!(detail.relationships[1].peer_id, "c");
        assert!(detail.relationships[1].peer_name.is_empty());

        assert!(model.detail("zzz").is_none());
    }
}
