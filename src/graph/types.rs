//! CI graph data types matching the collaborator-supplied document.

use chrono::NaiveDate;
use egui::{Color32, Pos2, Vec2};
use serde::{Deserialize, Serialize};

use crate::theme;

/// Kind of configuration item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CiType {
    Server,
    Network,
    Database,
    Application,
    Storage,
    Security,
}

/// Outline drawn for a CI type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    Rectangle,
    Diamond,
    Cylinder,
    Hexagon,
    Shield,
}

impl CiType {
    /// All types for UI iteration (legend, filter dropdown)
    pub const ALL: [CiType; 6] = [
        CiType::Server,
        CiType::Network,
        CiType::Database,
        CiType::Application,
        CiType::Storage,
        CiType::Security,
    ];

    pub fn color(&self) -> Color32 {
        match self {
            CiType::Server => theme::ci_type::SERVER,
            CiType::Network => theme::ci_type::NETWORK,
            CiType::Database => theme::ci_type::DATABASE,
            CiType::Application => theme::ci_type::APPLICATION,
            CiType::Storage => theme::ci_type::STORAGE,
            CiType::Security => theme::ci_type::SECURITY,
        }
    }

    pub fn shape(&self) -> NodeShape {
        match self {
            CiType::Server | CiType::Storage => NodeShape::Rectangle,
            CiType::Network => NodeShape::Diamond,
            CiType::Database => NodeShape::Cylinder,
            CiType::Application => NodeShape::Hexagon,
            CiType::Security => NodeShape::Shield,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CiType::Server => "Server",
            CiType::Network => "Network",
            CiType::Database => "Database",
            CiType::Application => "Application",
            CiType::Storage => "Storage",
            CiType::Security => "Security",
        }
    }
}

/// Operational status of a CI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CiStatus {
    Healthy,
    Warning,
    Critical,
    Offline,
}

impl CiStatus {
    pub const ALL: [CiStatus; 4] = [
        CiStatus::Healthy,
        CiStatus::Warning,
        CiStatus::Critical,
        CiStatus::Offline,
    ];

    pub fn color(&self) -> Color32 {
        match self {
            CiStatus::Healthy => theme::status::HEALTHY,
            CiStatus::Warning => theme::status::WARNING,
            CiStatus::Critical => theme::status::CRITICAL,
            CiStatus::Offline => theme::status::OFFLINE,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CiStatus::Healthy => "Healthy",
            CiStatus::Warning => "Warning",
            CiStatus::Critical => "Critical",
            CiStatus::Offline => "Offline",
        }
    }
}

/// Kind of dependency between two CIs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    DependsOn,
    ConnectsTo,
    Manages,
    Monitors,
    Supports,
}

impl RelationshipType {
    pub const ALL: [RelationshipType; 5] = [
        RelationshipType::DependsOn,
        RelationshipType::ConnectsTo,
        RelationshipType::Manages,
        RelationshipType::Monitors,
        RelationshipType::Supports,
    ];

    pub fn color(&self) -> Color32 {
        match self {
            RelationshipType::DependsOn => theme::relationship::DEPENDS_ON,
            RelationshipType::ConnectsTo => theme::relationship::CONNECTS_TO,
            RelationshipType::Manages => theme::relationship::MANAGES,
            RelationshipType::Monitors => theme::relationship::MONITORS,
            RelationshipType::Supports => theme::relationship::SUPPORTS,
        }
    }

    /// Alternating dash/gap lengths in model units. Empty means a solid line.
    pub fn dash_pattern(&self) -> &'static [f32] {
        match self {
            RelationshipType::DependsOn => &[5.0, 5.0],
            RelationshipType::ConnectsTo => &[],
            RelationshipType::Manages => &[10.0, 5.0],
            RelationshipType::Monitors => &[2.0, 3.0],
            RelationshipType::Supports => &[15.0, 5.0, 5.0, 5.0],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RelationshipType::DependsOn => "Depends on",
            RelationshipType::ConnectsTo => "Connects to",
            RelationshipType::Manages => "Manages",
            RelationshipType::Monitors => "Monitors",
            RelationshipType::Supports => "Supports",
        }
    }
}

/// Opaque display data attached to a CI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CiMetadata {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub last_updated: Option<NaiveDate>,
    #[serde(default, rename = "dependencies", alias = "dependency_count")]
    pub dependency_count: u32,
}

/// A CI record as supplied by the CMDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CiRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub ci_type: CiType,
    pub status: CiStatus,
    #[serde(default)]
    pub details: CiMetadata,
}

/// A typed relationship between two CIs, referencing them by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub rel_type: RelationshipType,
    #[serde(default = "default_strength")]
    pub strength: u8,
}

fn default_strength() -> u8 {
    1
}

impl Relationship {
    pub const MIN_STRENGTH: u8 = 1;
    pub const MAX_STRENGTH: u8 = 3;

    pub fn new(source: &str, target: &str, rel_type: RelationshipType, strength: u8) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            rel_type,
            strength: strength.clamp(Self::MIN_STRENGTH, Self::MAX_STRENGTH),
        }
    }
}

/// Complete graph document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub nodes: Vec<CiRecord>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl GraphData {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Runtime node: a CI record plus its simulation state
#[derive(Debug, Clone)]
pub struct CiNode {
    pub id: String,
    pub name: String,
    pub ci_type: CiType,
    pub status: CiStatus,
    pub metadata: CiMetadata,
    pub pos: Pos2,
    pub velocity: Vec2,
    /// When set, the simulation holds the node exactly here
    pub pin: Option<Pos2>,
}

impl CiNode {
    pub fn from_record(record: CiRecord, pos: Pos2) -> Self {
        Self {
            id: record.id,
            name: record.name,
            ci_type: record.ci_type,
            status: record.status,
            metadata: record.details,
            pos,
            velocity: Vec2::ZERO,
            pin: None,
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.pin.is_some()
    }
}

/// Which way a relationship points relative to the selected CI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// One relationship of the selected CI, resolved for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipSummary {
    pub direction: Direction,
    pub peer_id: String,
    /// Empty when the peer id is not part of the model
    pub peer_name: String,
    pub rel_type: RelationshipType,
    pub strength: u8,
}

/// Detail payload for the external detail panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDetail {
    pub id: String,
    pub name: String,
    pub ci_type: CiType,
    pub status: CiStatus,
    pub metadata: CiMetadata,
    pub relationships: Vec<RelationshipSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let json = r#"{
            "nodes": [
                {"id": "1", "name": "Web-01", "type": "server", "status": "healthy",
                 "details": {"description": "Main web", "owner": "Ops",
                             "last_updated": "2025-08-28", "dependencies": 5}},
                {"id": "2", "name": "DB-01", "type": "database", "status": "critical"}
            ],
            "relationships": [
                {"source": "1", "target": "2", "type": "depends_on", "strength": 3},
                {"source": "2", "target": "1", "type": "monitors"}
            ]
        }"#;
        let data = GraphData::from_json(json).unwrap();
        assert_eq!(data.nodes.len(), 2);
        assert_eq!(data.nodes[0].ci_type, CiType::Server);
        assert_eq!(data.nodes[0].details.dependency_count, 5);
        assert_eq!(
            data.nodes[0].details.last_updated,
            NaiveDate::from_ymd_opt(2025, 8, 28)
        );
        assert_eq!(data.nodes[1].details, CiMetadata::default());
        assert_eq!(data.relationships[0].rel_type, RelationshipType::DependsOn);
        assert_eq!(data.relationships[1].strength, 1);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let json = r#"{"nodes": [{"id": "1", "name": "x", "type": "mainframe", "status": "healthy"}]}"#;
        assert!(GraphData::from_json(json).is_err());
    }

    #[test]
    fn test_relationship_new_clamps_strength() {
        assert_eq!(Relationship::new("a", "b", RelationshipType::Supports, 0).strength, 1);
        assert_eq!(Relationship::new("a", "b", RelationshipType::Supports, 9).strength, 3);
    }

    #[test]
    fn test_shapes_per_type() {
        assert_eq!(CiType::Server.shape(), NodeShape::Rectangle);
        assert_eq!(CiType::Storage.shape(), NodeShape::Rectangle);
        assert_eq!(CiType::Network.shape(), NodeShape::Diamond);
        assert_eq!(CiType::Database.shape(), NodeShape::Cylinder);
        assert_eq!(CiType::Application.shape(), NodeShape::Hexagon);
        assert_eq!(CiType::Security.shape(), NodeShape::Shield);
    }

    #[test]
    fn test_dash_patterns_have_even_length() {
        for rel in RelationshipType::ALL {
            assert_eq!(rel.dash_pattern().len() % 2, 0, "{:?}", rel);
        }
    }
}
