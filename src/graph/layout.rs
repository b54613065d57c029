//! Force-directed graph layout.
//!
//! One call to [`ForceSimulator::step`] advances every visible, unpinned node
//! by a single integration step:
//! - Damping of the previous velocity
//! - Centering force toward the canvas center
//! - Inverse-square repulsion between every pair of visible nodes
//! - Spring force along every visible relationship
//! - Clamp into the canvas after integrating
//!
//! The simulation never settles on purpose; it runs every frame so the layout
//! keeps reacting to drags and filter changes.

use egui::{Pos2, Vec2};
use serde::{Deserialize, Serialize};

use super::filter::VisibleSet;
use super::model::GraphModel;

/// Force-directed layout parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceParams {
    /// Integration step scalar applied to velocity
    pub alpha: f32,
    /// Fraction of velocity kept from the previous step
    pub damping: f32,
    /// Pull toward the canvas center, proportional to displacement
    pub center_force: f32,
    /// Inverse-square repulsion coefficient
    pub repulsion_force: f32,
    /// Spring stiffness along relationships
    pub link_force: f32,
    /// Rest length of a relationship before its strength is added
    pub link_distance: f32,
    /// Rest length added per unit of relationship strength
    pub link_distance_per_strength: f32,
    /// Distances below this are treated as this value
    pub min_distance: f32,
    /// Nodes are kept this far inside the canvas edges
    pub margin: f32,
}

impl Default for ForceParams {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            damping: 0.99,
            center_force: 0.01,
            repulsion_force: 1000.0,
            link_force: 0.5,
            link_distance: 80.0,
            link_distance_per_strength: 20.0,
            min_distance: 1.0,
            margin: 30.0,
        }
    }
}

/// Per-frame physics integration
#[derive(Debug, Clone, Default)]
pub struct ForceSimulator {
    pub params: ForceParams,
}

impl ForceSimulator {
    pub fn new(params: ForceParams) -> Self {
        Self { params }
    }

    /// Spring rest length for a relationship of the given strength
    pub fn target_distance(&self, strength: u8) -> f32 {
        self.params.link_distance + strength as f32 * self.params.link_distance_per_strength
    }

    /// Run one iteration of the force simulation over the visible subset.
    ///
    /// Hidden nodes are neither moved nor exert force. Pinned nodes exert
    /// force on others but are snapped to their pin instead of integrating.
    pub fn step(&self, model: &mut GraphModel, visible: &VisibleSet) {
        let p = &self.params;
        let canvas = model.canvas();
        let center = canvas.center();

        // Resolve relationship endpoints before borrowing nodes mutably
        let links: Vec<(usize, usize, f32)> = visible
            .edges
            .iter()
            .filter_map(|&e| {
                let rel = model.relationships().get(e)?;
                let source = model.index_of(&rel.source)?;
                let target = model.index_of(&rel.target)?;
                (source != target).then(|| (source, target, self.target_distance(rel.strength)))
            })
            .collect();

        let node_count = model.len();
        let ids: Vec<usize> = visible
            .nodes
            .iter()
            .copied()
            .filter(|&i| i < node_count)
            .collect();
        let nodes = model.nodes_mut();

        // Damping
        for &i in &ids {
            if !nodes[i].is_pinned() {
                nodes[i].velocity *= p.damping;
            }
        }

        // Centering force
        for &i in &ids {
            if !nodes[i].is_pinned() {
                let to_center = center - nodes[i].pos;
                nodes[i].velocity += to_center * p.center_force;
            }
        }

        // Pairwise repulsion
        for (k, &a) in ids.iter().enumerate() {
            for &b in &ids[k + 1..] {
                let (unit, distance) = unit_and_distance(nodes[a].pos, nodes[b].pos, p.min_distance);
                let push = unit * (p.repulsion_force / (distance * distance));
                if !nodes[a].is_pinned() {
                    nodes[a].velocity -= push;
                }
                if !nodes[b].is_pinned() {
                    nodes[b].velocity += push;
                }
            }
        }

        // Spring force along relationships
        for &(source, target, rest) in &links {
            let (unit, distance) =
                unit_and_distance(nodes[source].pos, nodes[target].pos, p.min_distance);
            let pull = unit * ((distance - rest) * p.link_force);
            if !nodes[source].is_pinned() {
                nodes[source].velocity += pull;
            }
            if !nodes[target].is_pinned() {
                nodes[target].velocity -= pull;
            }
        }

        // Integrate
        for &i in &ids {
            let node = &mut nodes[i];
            if let Some(pin) = node.pin {
                node.pos = pin;
                continue;
            }

            let next = node.pos + node.velocity * p.alpha;
            if !is_finite(next) || !node.velocity.x.is_finite() || !node.velocity.y.is_finite() {
                tracing::warn!("Non-finite motion for CI {:?}, resetting velocity", node.id);
                node.velocity = Vec2::ZERO;
                node.pos = canvas.clamp(node.pos, p.margin);
                continue;
            }
            node.pos = canvas.clamp(next, p.margin);
        }
    }

    /// Average speed of visible, unpinned nodes (for the stats readout)
    pub fn average_speed(&self, model: &GraphModel, visible: &VisibleSet) -> f32 {
        let (total, count) = visible
            .nodes
            .iter()
            .filter_map(|&i| model.node(i))
            .filter(|n| !n.is_pinned())
            .fold((0.0, 0usize), |(sum, cnt), n| (sum + n.velocity.length(), cnt + 1));
        total / count.max(1) as f32
    }
}

/// Unit vector from `a` toward `b` and their distance floored at `min_distance`.
/// Coincident points use the +x axis so forces stay finite.
fn unit_and_distance(a: Pos2, b: Pos2, min_distance: f32) -> (Vec2, f32) {
    let delta = b - a;
    let length = delta.length();
    let unit = if length > 1e-6 {
        delta / length
    } else {
        Vec2::new(1.0, 0.0)
    };
    (unit, length.max(min_distance.max(f32::EPSILON)))
}

fn is_finite(pos: Pos2) -> bool {
    pos.x.is_finite() && pos.y.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::filter::{GraphFilter, TypeFilter, VisibleSet};
    use crate::graph::model::tests::{record, rng};
    use crate::graph::model::CanvasSize;
    use crate::graph::sample;
    use crate::graph::types::{CiType, GraphData, Relationship, RelationshipType};

    fn pair_model(distance: f32) -> GraphModel {
        let data = GraphData {
            nodes: vec![record("a", CiType::Server), record("b", CiType::Database)],
            relationships: vec![Relationship::new("a", "b", RelationshipType::DependsOn, 3)],
        };
        let mut model = GraphModel::new(data, CanvasSize::new(1000.0, 1000.0), &mut rng());
        let nodes = model.nodes_mut();
        nodes[0].pos = Pos2::new(500.0 - distance / 2.0, 500.0);
        nodes[1].pos = Pos2::new(500.0 + distance / 2.0, 500.0);
        model
    }

    fn spring_only(damping: f32) -> ForceSimulator {
        ForceSimulator::new(ForceParams {
            center_force: 0.0,
            repulsion_force: 0.0,
            damping,
            ..Default::default()
        })
    }

    fn distance(model: &GraphModel) -> f32 {
        model.nodes()[0].pos.distance(model.nodes()[1].pos)
    }

    #[test]
    fn test_target_distance() {
        let sim = ForceSimulator::default();
        assert_eq!(sim.target_distance(1), 100.0);
        assert_eq!(sim.target_distance(3), 140.0);
    }

    #[test]
    fn test_spring_relaxes_monotonically_when_fully_damped() {
        let mut model = pair_model(200.0);
        let visible = VisibleSet::everything(&model);
        let sim = spring_only(0.0);

        let mut error = (distance(&model) - 140.0).abs();
        let mut steps = 0;
        while error > 0.01 {
            sim.step(&mut model, &visible);
            let next = (distance(&model) - 140.0).abs();
            assert!(next < error, "step {}: {} -> {}", steps, error, next);
            error = next;
            steps += 1;
            assert!(steps < 500, "did not converge");
        }
    }

    #[test]
    fn test_spring_converges_with_default_damping() {
        let mut model = pair_model(200.0);
        let visible = VisibleSet::everything(&model);
        let sim = spring_only(ForceParams::default().damping);

        for _ in 0..4000 {
            sim.step(&mut model, &visible);
        }
        assert!((distance(&model) - 140.0).abs() < 0.5, "{}", distance(&model));
    }

    #[test]
    fn test_pinned_nodes_stay_on_pin() {
        let mut model =
            GraphModel::new(sample::sample_data(), CanvasSize::default(), &mut rng());
        let pin = Pos2::new(123.5, 456.25);
        model.pin(0, pin);
        model.pin(3, Pos2::new(5.0, 5.0)); // outside the margin on purpose
        let visible = VisibleSet::everything(&model);
        let sim = ForceSimulator::default();

        for _ in 0..200 {
            sim.step(&mut model, &visible);
            assert_eq!(model.nodes()[0].pos, pin);
            assert_eq!(model.nodes()[3].pos, Pos2::new(5.0, 5.0));
        }
    }

    #[test]
    fn test_boundary_invariant() {
        let canvas = CanvasSize::new(300.0, 200.0);
        let mut model = GraphModel::new(sample::sample_data(), canvas, &mut rng());
        // Pile everything on one spot to provoke large repulsion
        for node in model.nodes_mut() {
            node.pos = Pos2::new(150.0, 100.0);
        }
        let visible = VisibleSet::everything(&model);
        let sim = ForceSimulator::default();

        for _ in 0..300 {
            sim.step(&mut model, &visible);
            for node in model.nodes() {
                assert!(node.pos.x >= 30.0 && node.pos.x <= 270.0, "{:?}", node.pos);
                assert!(node.pos.y >= 30.0 && node.pos.y <= 170.0, "{:?}", node.pos);
            }
        }
    }

    #[test]
    fn test_coincident_nodes_stay_finite_and_separate() {
        let mut model = pair_model(0.0);
        let visible = VisibleSet::everything(&model);
        let sim = ForceSimulator::default();

        sim.step(&mut model, &visible);

        for node in model.nodes() {
            assert!(node.pos.x.is_finite() && node.pos.y.is_finite());
            assert!(node.velocity.x.is_finite() && node.velocity.y.is_finite());
        }
        assert!(distance(&model) > 0.0);
    }

    #[test]
    fn test_hidden_nodes_do_not_move() {
        let mut model =
            GraphModel::new(sample::sample_data(), CanvasSize::default(), &mut rng());
        let filter = GraphFilter {
            node_type: TypeFilter::Only(CiType::Server),
            ..Default::default()
        };
        let visible = VisibleSet::compute(&model, &filter);
        let before: Vec<Pos2> = model.nodes().iter().map(|n| n.pos).collect();

        let sim = ForceSimulator::default();
        for _ in 0..20 {
            sim.step(&mut model, &visible);
        }

        for (i, node) in model.nodes().iter().enumerate() {
            if !visible.contains_node(i) {
                assert_eq!(node.pos, before[i]);
            }
        }
    }

    #[test]
    fn test_centering_pulls_lone_node() {
        let data = GraphData {
            nodes: vec![record("solo", CiType::Storage)],
            relationships: Vec::new(),
        };
        let mut model = GraphModel::new(data, CanvasSize::new(800.0, 600.0), &mut rng());
        model.nodes_mut()[0].pos = Pos2::new(100.0, 100.0);
        let visible = VisibleSet::everything(&model);

        ForceSimulator::default().step(&mut model, &visible);

        let pos = model.nodes()[0].pos;
        assert!(pos.x > 100.0 && pos.y > 100.0);
    }

    #[test]
    fn test_average_speed_ignores_pinned() {
        let mut model = pair_model(200.0);
        model.nodes_mut()[0].velocity = Vec2::new(3.0, 4.0);
        model.pin(1, Pos2::new(10.0, 10.0));
        model.nodes_mut()[1].velocity = Vec2::new(100.0, 0.0);
        let visible = VisibleSet::everything(&model);
        let speed = ForceSimulator::default().average_speed(&model, &visible);
        assert!((speed - 5.0).abs() < 1e-5);
    }
}
