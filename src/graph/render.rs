//! Display-list rendering of the graph.
//!
//! [`render`] turns the model, the visible subset and the viewport into a
//! [`Scene`]: plain `egui::Shape`s plus label runs, all in canvas-relative
//! screen coordinates. The app paints the scene with [`Scene::paint`].
//!
//! Node geometry is specified in model units and mapped through the viewport,
//! so shapes, strokes and labels grow with zoom. The minimap is a fixed-size
//! screen overlay.

use std::f32::consts::PI;

use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, Vec2};

use super::filter::VisibleSet;
use super::interaction::InteractionController;
use super::model::{CanvasSize, GraphModel};
use super::types::{CiNode, NodeShape, Relationship};
use super::viewport::Viewport;
use crate::theme;

/// Node size when neither selected nor hovered
pub const NODE_SIZE: f32 = 20.0;
/// Node size when selected or hovered
pub const NODE_SIZE_ACTIVE: f32 = 25.0;

/// Edge endpoints stop this far from node centers
const EDGE_OFFSET: f32 = 25.0;
const ARROW_SIZE: f32 = 8.0;
const ARROW_HALF_ANGLE: f32 = PI / 6.0;

const BADGE_RADIUS: f32 = 3.0;
const BADGE_INSET: f32 = 5.0;
const LABEL_FONT_SIZE: f32 = 12.0;
const LABEL_GAP: f32 = 15.0;

/// Extent of the glow around active nodes, drawn as translucent rings
const GLOW_BLUR: f32 = 15.0;
const GLOW_RINGS: usize = 3;
const GLOW_ALPHA: f32 = 0.12;

const ELLIPSE_SEGMENTS: usize = 24;

pub const MINIMAP_SIZE: f32 = 150.0;
const MINIMAP_INSET: f32 = 10.0;
const MINIMAP_DOT_RADIUS: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub show_minimap: bool,
    pub show_labels: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_minimap: true,
            show_labels: true,
        }
    }
}

/// A piece of text anchored at its bottom center
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub pos: Pos2,
    pub text: String,
    pub font_size: f32,
    pub color: Color32,
}

/// One frame's display list
#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// Edges and nodes
    pub shapes: Vec<Shape>,
    pub labels: Vec<Label>,
    /// Minimap, painted above everything else
    pub overlay: Vec<Shape>,
}

impl Scene {
    /// Paint onto `painter`, shifting everything by the canvas origin.
    pub fn paint(self, painter: &Painter, origin: Vec2) {
        let shift = |mut shape: Shape| {
            shape.translate(origin);
            shape
        };

        painter.extend(self.shapes.into_iter().map(shift));
        for label in self.labels {
            painter.text(
                label.pos + origin,
                Align2::CENTER_BOTTOM,
                label.text,
                FontId::proportional(label.font_size),
                label.color,
            );
        }
        painter.extend(self.overlay.into_iter().map(shift));
    }
}

/// Build the display list for the current frame.
pub fn render(
    model: &GraphModel,
    visible: &VisibleSet,
    viewport: &Viewport,
    interaction: &InteractionController,
    options: RenderOptions,
) -> Scene {
    let mut scene = Scene::default();

    for &e in &visible.edges {
        let Some(rel) = model.relationships().get(e) else {
            continue;
        };
        let (Some(source), Some(target)) =
            (model.node_by_id(&rel.source), model.node_by_id(&rel.target))
        else {
            continue;
        };
        draw_edge(&mut scene.shapes, rel, source.pos, target.pos, viewport);
    }

    for &i in &visible.nodes {
        let Some(node) = model.node(i) else {
            continue;
        };
        let active = interaction.selected() == Some(node.id.as_str())
            || interaction.hovered() == Some(node.id.as_str());
        let size = if active { NODE_SIZE_ACTIVE } else { NODE_SIZE };

        if active {
            draw_glow(&mut scene.shapes, node, size, viewport);
        }
        draw_node(&mut scene.shapes, node, size, viewport);

        if options.show_labels {
            scene.labels.push(Label {
                pos: viewport.model_to_screen(node.pos + Vec2::new(0.0, size + LABEL_GAP)),
                text: node.name.clone(),
                font_size: viewport.to_screen_len(LABEL_FONT_SIZE),
                color: theme::text::NODE_LABEL,
            });
        }
    }

    if options.show_minimap {
        draw_minimap(&mut scene.overlay, model, visible, viewport);
    }

    scene
}

/// Segment between two node centers, shortened by `EDGE_OFFSET` at both ends.
/// Returns `None` for coincident centers.
pub fn edge_segment(from: Pos2, to: Pos2) -> Option<(Pos2, Pos2)> {
    let delta = to - from;
    let length = delta.length();
    if length <= f32::EPSILON || !length.is_finite() {
        return None;
    }
    let unit = delta / length;
    Some((from + unit * EDGE_OFFSET, to - unit * EDGE_OFFSET))
}

/// Triangle for an arrowhead whose tip is at `tip`, pointing along `direction`.
pub fn arrowhead(tip: Pos2, direction: Vec2) -> [Pos2; 3] {
    let angle = direction.y.atan2(direction.x);
    let wing = |a: f32| tip - Vec2::new(a.cos(), a.sin()) * ARROW_SIZE;
    [
        tip,
        wing(angle - ARROW_HALF_ANGLE),
        wing(angle + ARROW_HALF_ANGLE),
    ]
}

fn draw_edge(
    shapes: &mut Vec<Shape>,
    rel: &Relationship,
    from: Pos2,
    to: Pos2,
    viewport: &Viewport,
) {
    let Some((start, end)) = edge_segment(from, to) else {
        return;
    };
    let color = rel.rel_type.color();
    let stroke = Stroke::new(viewport.to_screen_len(rel.strength as f32), color);
    let line = [viewport.model_to_screen(start), viewport.model_to_screen(end)];

    let pattern = rel.rel_type.dash_pattern();
    if pattern.is_empty() {
        shapes.push(Shape::line_segment(line, stroke));
    } else {
        let scaled: Vec<f32> = pattern.iter().map(|l| viewport.to_screen_len(*l)).collect();
        let dashes: Vec<f32> = scaled.iter().step_by(2).copied().collect();
        let gaps: Vec<f32> = scaled.iter().skip(1).step_by(2).copied().collect();
        shapes.extend(Shape::dashed_line_with_offset(&line, stroke, &dashes, &gaps, 0.0));
    }

    let arrow = arrowhead(end, to - from).map(|p| viewport.model_to_screen(p));
    shapes.push(Shape::convex_polygon(arrow.to_vec(), color, Stroke::NONE));
}

fn draw_glow(shapes: &mut Vec<Shape>, node: &CiNode, size: f32, viewport: &Viewport) {
    let center = viewport.model_to_screen(node.pos);
    let color = theme::with_alpha(node.ci_type.color(), GLOW_ALPHA);
    for ring in (1..=GLOW_RINGS).rev() {
        let radius = size / 2.0 + GLOW_BLUR * ring as f32 / GLOW_RINGS as f32;
        shapes.push(Shape::circle_filled(center, viewport.to_screen_len(radius), color));
    }
}

fn draw_node(shapes: &mut Vec<Shape>, node: &CiNode, size: f32, viewport: &Viewport) {
    let at = |dx: f32, dy: f32| viewport.model_to_screen(node.pos + Vec2::new(dx, dy));
    let fill = node.ci_type.color();
    let outline = theme::stroke(
        node.status.color(),
        viewport.to_screen_len(theme::stroke_width::STATUS_OUTLINE),
    );
    let half = size / 2.0;

    match node.ci_type.shape() {
        NodeShape::Rectangle => {
            let rect = Rect::from_two_pos(at(-half, -half), at(half, half));
            shapes.push(Shape::rect_filled(rect, 0.0, fill));
            shapes.push(Shape::rect_stroke(rect, 0.0, outline));
        }
        NodeShape::Diamond => {
            let points = vec![at(0.0, -half), at(half, 0.0), at(0.0, half), at(-half, 0.0)];
            shapes.push(Shape::convex_polygon(points, fill, outline));
        }
        NodeShape::Cylinder => {
            let rx = size / 3.0;
            let ry = rx / 3.0;
            let cap = |cy: f32| {
                (0..ELLIPSE_SEGMENTS)
                    .map(|k| {
                        let a = 2.0 * PI * k as f32 / ELLIPSE_SEGMENTS as f32;
                        at(a.cos() * rx, cy + a.sin() * ry)
                    })
                    .collect::<Vec<_>>()
            };
            shapes.push(Shape::convex_polygon(cap(-half), fill, outline));
            let body = Rect::from_two_pos(at(-rx, -half), at(rx, half));
            shapes.push(Shape::rect_filled(body, 0.0, fill));
            shapes.push(Shape::rect_stroke(body, 0.0, outline));
            shapes.push(Shape::convex_polygon(cap(half), fill, outline));
        }
        NodeShape::Hexagon => {
            let points = (0..6)
                .map(|k| {
                    let a = k as f32 * PI / 3.0;
                    at(a.cos() * half, a.sin() * half)
                })
                .collect();
            shapes.push(Shape::convex_polygon(points, fill, outline));
        }
        NodeShape::Shield => {
            let third = size / 3.0;
            let quarter = size / 4.0;
            let points = vec![
                at(0.0, -half),
                at(third, -quarter),
                at(third, quarter),
                at(0.0, half),
                at(-third, quarter),
                at(-third, -quarter),
            ];
            shapes.push(Shape::convex_polygon(points, fill, outline));
        }
    }

    shapes.push(Shape::circle_filled(
        at(half - BADGE_INSET, -half + BADGE_INSET),
        viewport.to_screen_len(BADGE_RADIUS),
        node.status.color(),
    ));
}

/// Screen rectangle of the minimap panel
pub fn minimap_frame(canvas: CanvasSize) -> Rect {
    let origin = Pos2::new(canvas.width - MINIMAP_SIZE - MINIMAP_INSET, MINIMAP_INSET);
    Rect::from_min_size(origin, Vec2::splat(MINIMAP_SIZE))
}

fn minimap_scale(canvas: CanvasSize) -> Vec2 {
    Vec2::new(MINIMAP_SIZE / canvas.width, MINIMAP_SIZE / canvas.height)
}

/// Where a model position lands inside the minimap
pub fn minimap_point(canvas: CanvasSize, pos: Pos2) -> Pos2 {
    let scale = minimap_scale(canvas);
    minimap_frame(canvas).min + Vec2::new(pos.x * scale.x, pos.y * scale.y)
}

/// The current view's extent drawn inside the minimap
pub fn minimap_viewport_rect(canvas: CanvasSize, viewport: &Viewport) -> Rect {
    let scale = minimap_scale(canvas);
    let shift = Vec2::new(
        viewport.translate.x * scale.x,
        viewport.translate.y * scale.y,
    ) / viewport.scale();
    Rect::from_min_size(
        minimap_frame(canvas).min - shift,
        Vec2::splat(MINIMAP_SIZE / viewport.scale()),
    )
}

fn draw_minimap(
    shapes: &mut Vec<Shape>,
    model: &GraphModel,
    visible: &VisibleSet,
    viewport: &Viewport,
) {
    let canvas = model.canvas();
    let frame = minimap_frame(canvas);
    shapes.push(Shape::rect_filled(frame, 0.0, theme::bg::MINIMAP));
    shapes.push(Shape::rect_stroke(
        frame,
        0.0,
        theme::stroke(theme::border::DEFAULT, theme::stroke_width::MINIMAP_FRAME),
    ));

    for node in visible.nodes.iter().filter_map(|&i| model.node(i)) {
        shapes.push(Shape::circle_filled(
            minimap_point(canvas, node.pos),
            MINIMAP_DOT_RADIUS,
            node.ci_type.color(),
        ));
    }

    shapes.push(Shape::rect_stroke(
        minimap_viewport_rect(canvas, viewport),
        0.0,
        theme::stroke(theme::minimap::VIEWPORT, theme::stroke_width::MINIMAP_VIEWPORT),
    ));
}
