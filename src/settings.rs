//! Persistent viewer preferences.

use crate::graph::{ForceParams, HitTestMode, RelationshipFilter, TypeFilter};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// All persistable UI settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    // Display
    #[serde(default = "default_true")]
    pub show_minimap: bool,
    #[serde(default = "default_true")]
    pub show_labels: bool,
    #[serde(default = "default_true")]
    pub show_legend: bool,

    // Interaction
    #[serde(default)]
    pub hit_test_mode: HitTestMode,

    // Physics
    #[serde(default)]
    pub force: ForceParams,

    // Last used filters
    #[serde(default)]
    pub node_type_filter: TypeFilter,
    #[serde(default)]
    pub relationship_filter: RelationshipFilter,
    #[serde(default = "default_depth")]
    pub neighbourhood_depth: usize,
}

fn default_true() -> bool {
    true
}

fn default_depth() -> usize {
    2
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_minimap: true,
            show_labels: true,
            show_legend: true,
            hit_test_mode: HitTestMode::FirstMatch,
            force: ForceParams::default(),
            node_type_filter: TypeFilter::All,
            relationship_filter: RelationshipFilter::All,
            neighbourhood_depth: default_depth(),
        }
    }
}

impl Settings {
    /// Get the path to the settings file
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("ci-graph");
            p.push("settings.json");
            p
        })
    }

    /// Load settings from disk, returning defaults if the file is missing or invalid
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            tracing::warn!("Could not determine config directory, using default settings");
            return Self::default();
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => {
                    tracing::info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    tracing::warn!("Failed to parse settings file: {}, using defaults", e);
                    Self::default()
                }
            },
            // File doesn't exist yet, that's fine
            Err(_) => Self::default(),
        }
    }

    /// Save settings to disk
    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            tracing::warn!("Could not determine config directory, settings not saved");
            return;
        };
        self.save_to(&path);
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!("Failed to create config directory: {}", e);
                return;
            }
        }

        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    tracing::warn!("Failed to write settings file: {}", e);
                } else {
                    tracing::debug!("Saved settings to {:?}", path);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CiType;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("ci-graph-test-{}-{}", std::process::id(), name))
            .join("settings.json")
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"show_minimap": false}"#).unwrap();
        assert!(!settings.show_minimap);
        assert!(settings.show_labels);
        assert_eq!(settings.neighbourhood_depth, 2);
        assert_eq!(settings.force, ForceParams::default());
    }

    #[test]
    fn test_partial_force_params() {
        let settings: Settings =
            serde_json::from_str(r#"{"force": {"repulsion_force": 2500.0}}"#).unwrap();
        assert_eq!(settings.force.repulsion_force, 2500.0);
        assert_eq!(settings.force.alpha, 0.3);
    }

    #[test]
    fn test_save_and_load_file() {
        let path = temp_path("roundtrip");
        let settings = Settings {
            hit_test_mode: HitTestMode::Nearest,
            node_type_filter: TypeFilter::Only(CiType::Storage),
            show_labels: false,
            ..Default::default()
        };
        settings.save_to(&path);
        assert_eq!(Settings::load_from(&path), settings);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_corrupt_file_uses_defaults() {
        let path = temp_path("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
