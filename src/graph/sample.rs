//! Built-in CMDB data set used when no data file is given.

use chrono::NaiveDate;

use super::types::{
    CiMetadata, CiRecord, CiStatus, CiType, GraphData, Relationship, RelationshipType,
};

#[allow(clippy::too_many_arguments)]
fn ci(
    id: &str,
    name: &str,
    ci_type: CiType,
    status: CiStatus,
    description: &str,
    owner: &str,
    (year, month, day): (i32, u32, u32),
    dependency_count: u32,
) -> CiRecord {
    CiRecord {
        id: id.to_string(),
        name: name.to_string(),
        ci_type,
        status,
        details: CiMetadata {
            description: description.to_string(),
            owner: owner.to_string(),
            last_updated: NaiveDate::from_ymd_opt(year, month, day),
            dependency_count,
        },
    }
}

/// Eight CIs of mixed types and ten relationships between them.
pub fn sample_data() -> GraphData {
    use CiStatus::*;
    use CiType::*;
    use RelationshipType::*;

    GraphData {
        nodes: vec![
            ci("1", "Web Server 01", Server, Healthy, "Main web server", "Operations", (2025, 8, 28), 5),
            ci("2", "DB Server 01", Database, Healthy, "Primary database", "DBA team", (2025, 8, 27), 8),
            ci("3", "Load Balancer", Network, Warning, "Traffic distribution", "Network team", (2025, 8, 28), 3),
            ci("4", "ERP System", Application, Healthy, "Core business system", "Application team", (2025, 8, 25), 12),
            ci("5", "Firewall", Security, Healthy, "Perimeter security", "Security team", (2025, 8, 28), 2),
            ci("6", "NAS Storage", Storage, Critical, "Shared storage", "Storage team", (2025, 8, 26), 15),
            ci("7", "API Server", Server, Healthy, "REST API server", "Development team", (2025, 8, 28), 4),
            ci("8", "Monitoring", Application, Healthy, "System monitoring tool", "Operations", (2025, 8, 28), 7),
        ],
        relationships: vec![
            Relationship::new("1", "2", DependsOn, 3),
            Relationship::new("3", "1", ConnectsTo, 2),
            Relationship::new("4", "2", DependsOn, 3),
            Relationship::new("5", "3", Manages, 1),
            Relationship::new("6", "1", Supports, 2),
            Relationship::new("7", "2", DependsOn, 2),
            Relationship::new("8", "1", Monitors, 1),
            Relationship::new("8", "2", Monitors, 1),
            Relationship::new("8", "7", Monitors, 1),
            Relationship::new("4", "7", ConnectsTo, 2),
        ],
    }
}
