//! Unified theme and color constants for the CI graph.
//!
//! The palettes here are shared by the graph renderer and the egui panels
//! (legend, detail panel, filter controls) so a CI type or status always has
//! the same color wherever it appears.

use egui::Color32;

/// Background colors for different layers
pub mod bg {
    use super::*;

    /// Main graph area background - darkest layer
    pub const GRAPH: Color32 = Color32::from_rgb(14, 17, 23);

    /// Panel backgrounds - slightly lighter than graph
    pub const PANEL: Color32 = Color32::from_rgb(20, 22, 28);

    /// Minimap inset background
    pub const MINIMAP: Color32 = Color32::from_rgba_premultiplied(28, 30, 38, 230);
}

/// Fill color per CI type
pub mod ci_type {
    use super::*;

    pub const SERVER: Color32 = Color32::from_rgb(0x3B, 0x82, 0xF6);
    pub const NETWORK: Color32 = Color32::from_rgb(0x10, 0xB9, 0x81);
    pub const DATABASE: Color32 = Color32::from_rgb(0xF5, 0x9E, 0x0B);
    pub const APPLICATION: Color32 = Color32::from_rgb(0x8B, 0x5C, 0xF6);
    pub const STORAGE: Color32 = Color32::from_rgb(0xEF, 0x44, 0x44);
    pub const SECURITY: Color32 = Color32::from_rgb(0x6B, 0x72, 0x80);
}

/// Badge/outline color per CI status
pub mod status {
    use super::*;

    pub const HEALTHY: Color32 = Color32::from_rgb(0x10, 0xB9, 0x81);
    pub const WARNING: Color32 = Color32::from_rgb(0xF5, 0x9E, 0x0B);
    pub const CRITICAL: Color32 = Color32::from_rgb(0xEF, 0x44, 0x44);
    pub const OFFLINE: Color32 = Color32::from_rgb(0x6B, 0x72, 0x80);
}

/// Line color per relationship type
pub mod relationship {
    use super::*;

    pub const DEPENDS_ON: Color32 = Color32::from_rgb(0xEF, 0x44, 0x44);
    pub const CONNECTS_TO: Color32 = Color32::from_rgb(0x3B, 0x82, 0xF6);
    pub const MANAGES: Color32 = Color32::from_rgb(0x10, 0xB9, 0x81);
    pub const MONITORS: Color32 = Color32::from_rgb(0xF5, 0x9E, 0x0B);
    pub const SUPPORTS: Color32 = Color32::from_rgb(0x8B, 0x5C, 0xF6);
}

/// Text colors at different emphasis levels
pub mod text {
    use super::*;

    /// Primary text - high contrast
    pub const PRIMARY: Color32 = Color32::from_rgb(240, 240, 245);

    /// Secondary text - medium contrast
    pub const SECONDARY: Color32 = Color32::from_rgb(180, 180, 190);

    /// Muted text - low contrast for less important info
    pub const MUTED: Color32 = Color32::from_rgb(120, 125, 135);

    /// Node labels drawn under each CI
    pub const NODE_LABEL: Color32 = Color32::from_rgb(209, 213, 219);
}

/// Border colors
pub mod border {
    use super::*;

    /// Default border for cards/panels and the minimap frame
    pub const DEFAULT: Color32 = Color32::from_rgb(55, 58, 65);
}

/// Minimap overlay colors
pub mod minimap {
    use super::*;

    /// Rectangle marking the current viewport extent
    pub const VIEWPORT: Color32 = Color32::from_rgb(0x3B, 0x82, 0xF6);
}

/// Helper to create a stroke with consistent styling
pub fn stroke(color: Color32, width: f32) -> egui::Stroke {
    egui::Stroke::new(width, color)
}

/// Node rendering stroke widths
pub mod stroke_width {
    /// Status outline around every node shape
    pub const STATUS_OUTLINE: f32 = 3.0;

    /// Minimap frame
    pub const MINIMAP_FRAME: f32 = 1.0;

    /// Minimap viewport rectangle
    pub const MINIMAP_VIEWPORT: f32 = 2.0;
}

/// Same hue with its alpha replaced by `alpha` (0.0 to 1.0).
pub fn with_alpha(color: Color32, alpha: f32) -> Color32 {
    let alpha = (alpha.clamp(0.0, 1.0) * 255.0) as u8;
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}
