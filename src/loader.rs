//! Loading the CI graph document from disk.

use std::path::Path;

use anyhow::{Context, Result};

use crate::graph::sample::sample_data;
use crate::graph::GraphData;

/// Read the graph document at `path`, or the built-in sample when no path is given.
pub fn load_graph_data(path: Option<&Path>) -> Result<GraphData> {
    let Some(path) = path else {
        tracing::info!("No data file given, using the built-in sample CMDB");
        return Ok(sample_data());
    };

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read graph data from {}", path.display()))?;
    let data = GraphData::from_json(&raw)
        .with_context(|| format!("invalid graph document in {}", path.display()))?;

    tracing::info!(
        "Read {} CIs and {} relationships from {}",
        data.nodes.len(),
        data.relationships.len(),
        path.display()
    );
    Ok(data)
}
