//! Main application state and UI.

use crate::graph::types::{Direction, NodeShape};
use crate::graph::{
    CiStatus, CiType, DepthFilter, FrameLoop, GraphData, GraphEvent, GraphFilter, GraphView,
    HitTestMode, InputEvent, NodeDetail, PointerEvent, RelationshipFilter, RelationshipType,
    RenderOptions, TypeFilter,
};
use crate::graph::model::CanvasSize;
use crate::settings::Settings;
use crate::theme;
use eframe::egui::{self, RichText, Vec2};
use egui_extras::{Column, TableBuilder};
use std::time::Instant;

/// egui scrolls 50 points per wheel notch, browsers report 100
const WHEEL_DELTA_PER_POINT: f32 = 2.0;

/// Wheel zoom input from egui's scroll delta (positive scrolls up)
fn wheel_event(scroll_y: f32) -> InputEvent {
    InputEvent::Wheel(-scroll_y * WHEEL_DELTA_PER_POINT)
}

/// Primary-button state on the canvas, turned into graph pointer events
#[derive(Debug, Default)]
struct CanvasPointer {
    primary_down: bool,
    inside: bool,
}

impl CanvasPointer {
    /// Events for this frame, in canvas-local coordinates.
    fn translate(&mut self, ui: &egui::Ui, response: &egui::Response) -> Vec<PointerEvent> {
        let origin = response.rect.min.to_vec2();
        let (latest, pressed, released) = ui.input(|i| {
            (
                i.pointer.latest_pos(),
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
            )
        });
        let hovered = response.hovered();

        let mut events = Vec::new();
        match latest {
            Some(pos) if pressed && hovered => {
                events.push(PointerEvent::Down(pos - origin));
                // A tap can press and release within one frame
                if released {
                    events.push(PointerEvent::Up(pos - origin));
                } else {
                    self.primary_down = true;
                }
            }
            Some(pos) if released && self.primary_down => {
                self.primary_down = false;
                events.push(PointerEvent::Up(pos - origin));
            }
            Some(pos) if self.primary_down || hovered => {
                events.push(PointerEvent::Move(pos - origin));
            }
            _ if self.inside => {
                self.primary_down = false;
                events.push(PointerEvent::Leave);
            }
            _ => {}
        }
        self.inside = self.primary_down || hovered;
        events
    }
}

/// Main CI graph application
pub struct GraphApp {
    view: GraphView,
    frame_loop: FrameLoop,

    // Filter controls
    type_filter: TypeFilter,
    relationship_filter: RelationshipFilter,
    search: String,
    depth_enabled: bool,
    depth: usize,
    depth_focus: Option<String>,

    // Selected CI
    detail: Option<NodeDetail>,

    // Canvas input tracking
    canvas_size: Vec2,
    pointer: CanvasPointer,

    // Performance tracking
    last_frame: Instant,
    frame_times: Vec<f32>,
    fps: f32,

    // Settings persistence
    settings: Settings,
    settings_dirty: bool,
    last_settings_save: Instant,
}

impl GraphApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, data: GraphData, settings: Settings) -> Self {
        let mut view = GraphView::new(data, CanvasSize::default());
        view.set_force_params(settings.force);
        view.set_hit_test_mode(settings.hit_test_mode);
        view.options = RenderOptions {
            show_minimap: settings.show_minimap,
            show_labels: settings.show_labels,
        };

        let mut frame_loop = FrameLoop::new();
        frame_loop.start();

        let mut app = Self {
            view,
            frame_loop,
            type_filter: settings.node_type_filter,
            relationship_filter: settings.relationship_filter,
            search: String::new(),
            depth_enabled: false,
            depth: settings.neighbourhood_depth,
            depth_focus: None,
            detail: None,
            canvas_size: Vec2::ZERO,
            pointer: CanvasPointer::default(),
            last_frame: Instant::now(),
            frame_times: Vec::with_capacity(60),
            fps: 0.0,
            settings,
            settings_dirty: false,
            last_settings_save: Instant::now(),
        };
        app.apply_filters();
        app
    }

    /// Mark settings as needing to be saved
    fn mark_settings_dirty(&mut self) {
        self.settings_dirty = true;
    }

    /// Copy current UI state to settings struct
    fn sync_settings_from_ui(&mut self) {
        self.settings.show_minimap = self.view.options.show_minimap;
        self.settings.show_labels = self.view.options.show_labels;
        self.settings.hit_test_mode = self.view.interaction().mode;
        self.settings.force = self.view.force_params();
        self.settings.node_type_filter = self.type_filter;
        self.settings.relationship_filter = self.relationship_filter;
        self.settings.neighbourhood_depth = self.depth;
    }

    /// Save settings if dirty and enough time has passed (debounce)
    fn maybe_save_settings(&mut self) {
        if self.settings_dirty && self.last_settings_save.elapsed().as_secs() >= 2 {
            self.sync_settings_from_ui();
            self.settings.save();
            self.settings_dirty = false;
            self.last_settings_save = Instant::now();
        }
    }

    /// Push the sidebar's filter controls into the view
    fn apply_filters(&mut self) {
        let depth = match (&self.depth_focus, self.depth_enabled) {
            (Some(focus), true) => Some(DepthFilter {
                focus: focus.clone(),
                max_hops: self.depth,
            }),
            _ => None,
        };
        self.view.set_filter(GraphFilter {
            node_type: self.type_filter,
            relationship_type: self.relationship_filter,
            search: self.search.clone(),
            depth,
        });
    }

    fn handle_graph_events(&mut self) {
        for event in self.view.take_events() {
            match event {
                GraphEvent::SelectionChanged(detail) => {
                    if let Some(ref d) = detail {
                        self.depth_focus = Some(d.id.clone());
                    }
                    self.detail = detail;
                }
                GraphEvent::FiltersChanged { nodes, edges } => {
                    tracing::debug!("Showing {} CIs and {} relationships", nodes, edges);
                }
            }
        }
    }

    fn update_fps(&mut self) {
        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.frame_times.push(frame_time);
        if self.frame_times.len() > 60 {
            self.frame_times.remove(0);
        }

        if !self.frame_times.is_empty() {
            let avg_frame_time: f32 =
                self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
            self.fps = 1.0 / avg_frame_time.max(f32::EPSILON);
        }
    }

    fn render_sidebar(&mut self, ui: &mut egui::Ui) {
        ui.heading("CI Relationships");
        ui.add_space(10.0);

        egui::CollapsingHeader::new("Filters")
            .default_open(true)
            .show(ui, |ui| {
                let prev_type = self.type_filter;
                egui::ComboBox::from_id_salt("node_type_filter")
                    .selected_text(self.type_filter.label())
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut self.type_filter, TypeFilter::All, TypeFilter::All.label());
                        for t in CiType::ALL {
                            ui.selectable_value(&mut self.type_filter, TypeFilter::Only(t), t.label());
                        }
                    });

                let prev_rel = self.relationship_filter;
                egui::ComboBox::from_id_salt("relationship_filter")
                    .selected_text(self.relationship_filter.label())
                    .show_ui(ui, |ui| {
                        ui.selectable_value(
                            &mut self.relationship_filter,
                            RelationshipFilter::All,
                            RelationshipFilter::All.label(),
                        );
                        for r in RelationshipType::ALL {
                            ui.selectable_value(
                                &mut self.relationship_filter,
                                RelationshipFilter::Only(r),
                                r.label(),
                            );
                        }
                    });

                if self.type_filter != prev_type || self.relationship_filter != prev_rel {
                    self.mark_settings_dirty();
                }

                ui.add_space(5.0);
                ui.horizontal(|ui| {
                    ui.label("Search");
                    ui.text_edit_singleline(&mut self.search);
                });

                ui.add_space(5.0);
                let focus_label = self
                    .depth_focus
                    .as_deref()
                    .and_then(|id| self.view.model().node_by_id(id))
                    .map(|n| n.name.clone());
                ui.add_enabled_ui(focus_label.is_some(), |ui| {
                    ui.checkbox(&mut self.depth_enabled, "Neighbourhood only");
                    if ui
                        .add(egui::Slider::new(&mut self.depth, 1..=5).text("Hops"))
                        .changed()
                    {
                        self.mark_settings_dirty();
                    }
                });
                match focus_label {
                    Some(name) => ui.label(RichText::new(format!("Around: {}", name)).small()),
                    None => ui.label(RichText::new("Select a CI to focus").small().color(theme::text::MUTED)),
                };
            });

        egui::CollapsingHeader::new("View")
            .default_open(true)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    if ui.button("＋ Zoom in").clicked() {
                        self.frame_loop.push(InputEvent::ZoomIn);
                    }
                    if ui.button("－ Zoom out").clicked() {
                        self.frame_loop.push(InputEvent::ZoomOut);
                    }
                });
                if ui.button("↺ Reset view").clicked() {
                    self.frame_loop.push(InputEvent::Reset);
                }
                ui.label(
                    RichText::new(format!("Zoom: {:.0}%", self.view.viewport().scale() * 100.0))
                        .color(theme::text::SECONDARY),
                );

                ui.add_space(5.0);
                if ui.checkbox(&mut self.view.options.show_minimap, "Show minimap").changed() {
                    self.mark_settings_dirty();
                }
                if ui.checkbox(&mut self.view.options.show_labels, "Show labels").changed() {
                    self.mark_settings_dirty();
                }
                if ui.checkbox(&mut self.settings.show_legend, "Show legend").changed() {
                    self.mark_settings_dirty();
                }

                let mut mode = self.view.interaction().mode;
                egui::ComboBox::from_id_salt("hit_test_mode")
                    .selected_text(mode.label())
                    .show_ui(ui, |ui| {
                        for m in [HitTestMode::FirstMatch, HitTestMode::Nearest] {
                            ui.selectable_value(&mut mode, m, m.label());
                        }
                    });
                if mode != self.view.interaction().mode {
                    self.view.set_hit_test_mode(mode);
                    self.mark_settings_dirty();
                }
            });

        egui::CollapsingHeader::new("Physics")
            .default_open(false)
            .show(ui, |ui| {
                let mut params = self.view.force_params();
                let mut changed = false;
                changed |= ui
                    .add(egui::Slider::new(&mut params.repulsion_force, 100.0..=5000.0).text("Repulsion"))
                    .changed();
                changed |= ui
                    .add(egui::Slider::new(&mut params.link_force, 0.05..=1.0).text("Link force"))
                    .changed();
                changed |= ui
                    .add(egui::Slider::new(&mut params.center_force, 0.0..=0.05).text("Centering"))
                    .changed();
                changed |= ui
                    .add(egui::Slider::new(&mut params.damping, 0.5..=0.999).text("Damping"))
                    .changed();
                if ui.button("Defaults").clicked() {
                    params = Default::default();
                    changed = true;
                }
                if changed {
                    self.view.set_force_params(params);
                    self.mark_settings_dirty();
                }
            });

        if self.settings.show_legend {
            egui::CollapsingHeader::new("Legend")
                .default_open(true)
                .show(ui, |ui| render_legend(ui));
        }

        ui.add_space(10.0);
        ui.separator();
        let visible = self.view.visible();
        ui.label(
            RichText::new(format!(
                "{} / {} CIs, {} relationships",
                visible.nodes.len(),
                self.view.model().len(),
                visible.edges.len()
            ))
            .color(theme::text::SECONDARY),
        );
        ui.label(
            RichText::new(format!(
                "{:.0} fps, frame {}, avg speed {:.2}",
                self.fps,
                self.frame_loop.frames(),
                self.view.average_speed()
            ))
            .small()
            .color(theme::text::MUTED),
        );
    }

    fn render_detail(&mut self, ui: &mut egui::Ui) {
        let Some(detail) = self.detail.clone() else {
            return;
        };

        ui.horizontal(|ui| {
            ui.heading(RichText::new(&detail.name).color(theme::text::PRIMARY));
            if ui.small_button("✕").clicked() {
                self.view.clear_selection();
            }
        });
        ui.horizontal(|ui| {
            ui.colored_label(detail.ci_type.color(), detail.ci_type.label());
            ui.label("·");
            ui.colored_label(detail.status.color(), format!("● {}", detail.status.label()));
        });
        ui.add_space(6.0);

        let meta = &detail.metadata;
        egui::Grid::new("ci_detail_grid")
            .num_columns(2)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                ui.label(RichText::new("ID").color(theme::text::MUTED));
                ui.label(&detail.id);
                ui.end_row();
                ui.label(RichText::new("Description").color(theme::text::MUTED));
                ui.label(&meta.description);
                ui.end_row();
                ui.label(RichText::new("Owner").color(theme::text::MUTED));
                ui.label(&meta.owner);
                ui.end_row();
                ui.label(RichText::new("Last updated").color(theme::text::MUTED));
                ui.label(
                    meta.last_updated
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "—".to_string()),
                );
                ui.end_row();
                ui.label(RichText::new("Dependencies").color(theme::text::MUTED));
                ui.label(meta.dependency_count.to_string());
                ui.end_row();
            });

        ui.add_space(10.0);
        ui.label(RichText::new("Relationships").strong());
        if detail.relationships.is_empty() {
            ui.label(RichText::new("None").color(theme::text::MUTED));
            return;
        }

        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto())
            .column(Column::remainder().at_least(80.0))
            .column(Column::auto())
            .column(Column::auto())
            .header(18.0, |mut header| {
                for title in ["", "CI", "Type", "Strength"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for rel in &detail.relationships {
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.label(match rel.direction {
                                Direction::Outgoing => "→",
                                Direction::Incoming => "←",
                            });
                        });
                        row.col(|ui| {
                            if rel.peer_name.is_empty() {
                                ui.label(RichText::new(&rel.peer_id).color(theme::text::MUTED));
                            } else {
                                ui.label(&rel.peer_name);
                            }
                        });
                        row.col(|ui| {
                            ui.colored_label(rel.rel_type.color(), rel.rel_type.label());
                        });
                        row.col(|ui| {
                            ui.label(rel.strength.to_string());
                        });
                    });
                }
            });
    }

    fn render_graph(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let rect = response.rect;
        let origin = rect.min.to_vec2();

        if rect.size() != self.canvas_size {
            self.canvas_size = rect.size();
            self.frame_loop.push(InputEvent::Resize {
                width: rect.width(),
                height: rect.height(),
            });
        }

        for event in self.pointer.translate(ui, &response) {
            self.frame_loop.push(InputEvent::Pointer(event));
        }
        let scroll = ui.input(|i| i.raw_scroll_delta.y);

        let cursor = if self.view.interaction().dragging().is_some() {
            Some(egui::CursorIcon::Grabbing)
        } else if self.view.interaction().hovered().is_some() {
            Some(egui::CursorIcon::PointingHand)
        } else {
            None
        };
        if let Some(icon) = cursor {
            ui.output_mut(|output| output.cursor_icon = icon);
        }

        // Pan with the secondary or middle button
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.frame_loop.push(InputEvent::Pan(response.drag_delta()));
        }

        // Browser-style wheel delta: positive scrolls down and zooms out
        if response.hovered() && scroll != 0.0 {
            self.frame_loop.push(wheel_event(scroll));
        }

        if self.view.model().is_empty() {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "No configuration items loaded",
                egui::FontId::proportional(14.0),
                theme::text::MUTED,
            );
        }

        if let Some(scene) = self.frame_loop.tick(&mut self.view) {
            scene.paint(&painter, origin);
        }
        self.handle_graph_events();
    }
}

fn shape_name(shape: NodeShape) -> &'static str {
    match shape {
        NodeShape::Rectangle => "■",
        NodeShape::Diamond => "◆",
        NodeShape::Cylinder => "⛁",
        NodeShape::Hexagon => "⬢",
        NodeShape::Shield => "⛨",
    }
}

fn render_legend(ui: &mut egui::Ui) {
    ui.label(RichText::new("CI types").small().color(theme::text::MUTED));
    for t in CiType::ALL {
        ui.horizontal(|ui| {
            ui.colored_label(t.color(), shape_name(t.shape()));
            ui.label(t.label());
        });
    }

    ui.add_space(4.0);
    ui.label(RichText::new("Status").small().color(theme::text::MUTED));
    ui.horizontal_wrapped(|ui| {
        for s in CiStatus::ALL {
            ui.colored_label(s.color(), "●");
            ui.label(s.label());
        }
    });

    ui.add_space(4.0);
    ui.label(RichText::new("Relationships").small().color(theme::text::MUTED));
    for r in RelationshipType::ALL {
        ui.horizontal(|ui| {
            let dashed = if r.dash_pattern().is_empty() { "───" } else { "- - -" };
            ui.colored_label(r.color(), dashed);
            ui.label(r.label());
        });
    }
}

impl eframe::App for GraphApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_fps();
        self.maybe_save_settings();
        self.apply_filters();

        // The simulation never settles
        if self.frame_loop.is_running() {
            ctx.request_repaint();
        }

        // Dark theme
        ctx.set_visuals(egui::Visuals::dark());

        egui::SidePanel::left("sidebar")
            .min_width(220.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.render_sidebar(ui);
                });
            });

        if self.detail.is_some() {
            egui::SidePanel::right("ci_detail")
                .min_width(260.0)
                .frame(
                    egui::Frame::none()
                        .fill(theme::bg::PANEL)
                        .inner_margin(egui::Margin::same(10.0)),
                )
                .show(ctx, |ui| {
                    self.render_detail(ui);
                });
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(theme::bg::GRAPH))
            .show(ctx, |ui| {
                self.render_graph(ui);
            });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.frame_loop.stop();
        // Force save settings on exit
        if self.settings_dirty {
            self.sync_settings_from_ui();
            self.settings.save();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::tests::rng;
    use crate::graph::sample::sample_data;
    use egui::{Event, Modifiers, PointerButton, Pos2, RawInput, Rect};

    fn button(pos: Pos2, pressed: bool) -> Event {
        Event::PointerButton {
            pos,
            button: PointerButton::Primary,
            pressed,
            modifiers: Modifiers::NONE,
        }
    }

    /// Run one egui frame with a full-window canvas and return its rect and pointer events.
    fn canvas_frame(
        ctx: &egui::Context,
        pointer: &mut CanvasPointer,
        events: Vec<Event>,
    ) -> (Rect, Vec<PointerEvent>) {
        let input = RawInput {
            screen_rect: Some(Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0))),
            events,
            ..Default::default()
        };
        let mut canvas = Rect::NOTHING;
        let mut out = Vec::new();
        let _ = ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                let response =
                    ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
                canvas = response.rect;
                out = pointer.translate(ui, &response);
            });
        });
        (canvas, out)
    }

    fn near(a: Pos2, b: Pos2) -> bool {
        (a - b).length() < 1e-3
    }

    fn apply_all(view: &mut GraphView, events: Vec<PointerEvent>) {
        for event in events {
            view.apply(InputEvent::Pointer(event));
        }
    }

    #[test]
    fn test_tap_within_one_frame_does_not_leave_a_drag() {
        let ctx = egui::Context::default();
        let mut pointer = CanvasPointer::default();
        let mut view = GraphView::with_rng(sample_data(), CanvasSize::new(800.0, 600.0), rng());

        let (canvas, _) =
            canvas_frame(&ctx, &mut pointer, vec![Event::PointerMoved(Pos2::new(400.0, 300.0))]);
        let target = view.model().nodes()[0].pos;
        let tap = canvas.min + target.to_vec2();

        let (_, events) = canvas_frame(
            &ctx,
            &mut pointer,
            vec![Event::PointerMoved(tap), button(tap, true), button(tap, false)],
        );
        match events.as_slice() {
            [PointerEvent::Down(down), PointerEvent::Up(up)] => {
                assert!(near(*down, target) && near(*up, target));
            }
            other => panic!("unexpected events {:?}", other),
        }
        apply_all(&mut view, events);
        assert!(view.interaction().selected().is_some());
        assert!(view.interaction().dragging().is_none());

        let away = tap + Vec2::new(60.0, 40.0);
        let (_, events) = canvas_frame(&ctx, &mut pointer, vec![Event::PointerMoved(away)]);
        match events.as_slice() {
            [PointerEvent::Move(pos)] => assert!(near(*pos, target + Vec2::new(60.0, 40.0))),
            other => panic!("unexpected events {:?}", other),
        }
        apply_all(&mut view, events);
        assert!(view.interaction().dragging().is_none());
        assert!(view.model().nodes().iter().all(|n| !n.is_pinned()));
        assert!(near(view.model().nodes()[0].pos, target));
    }

    #[test]
    fn test_one_wheel_notch_zooms_like_the_browser() {
        let mut view = GraphView::with_rng(sample_data(), CanvasSize::new(800.0, 600.0), rng());
        // egui reports 50 points for one notch scrolled up
        assert_eq!(wheel_event(50.0), InputEvent::Wheel(-100.0));
        view.apply(wheel_event(50.0));
        assert!((view.viewport().scale() - 1.1).abs() < 1e-6);
        view.apply(wheel_event(-50.0));
        assert!((view.viewport().scale() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_press_and_release_across_frames_drags() {
        let ctx = egui::Context::default();
        let mut pointer = CanvasPointer::default();
        let mut view = GraphView::with_rng(sample_data(), CanvasSize::new(800.0, 600.0), rng());

        let (canvas, _) =
            canvas_frame(&ctx, &mut pointer, vec![Event::PointerMoved(Pos2::new(400.0, 300.0))]);
        let target = view.model().nodes()[0].pos;
        let press = canvas.min + target.to_vec2();

        let (_, events) = canvas_frame(
            &ctx,
            &mut pointer,
            vec![Event::PointerMoved(press), button(press, true)],
        );
        apply_all(&mut view, events);
        assert!(view.interaction().dragging().is_some());

        let (_, events) = canvas_frame(&ctx, &mut pointer, vec![button(press, false)]);
        match events.as_slice() {
            [PointerEvent::Up(pos)] => assert!(near(*pos, target)),
            other => panic!("unexpected events {:?}", other),
        }
        apply_all(&mut view, events);
        assert!(view.interaction().dragging().is_none());
    }
}
