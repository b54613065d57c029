//! One interactive graph view: model, filters, physics, viewport and pointer
//! state, owned together for the lifetime of the view.

use egui::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::filter::{GraphFilter, VisibleSet};
use super::interaction::{HitTestMode, InteractionController, PointerEvent, SelectionChanged};
use super::layout::{ForceParams, ForceSimulator};
use super::model::{CanvasSize, GraphModel};
use super::render::{self, RenderOptions, Scene};
use super::types::{GraphData, NodeDetail};
use super::viewport::Viewport;

/// Queued user input, applied at the start of a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Pointer(PointerEvent),
    /// Scroll-wheel zoom; positive zooms out
    Wheel(f32),
    /// Screen-space pan
    Pan(Vec2),
    ZoomIn,
    ZoomOut,
    /// Reset the viewport and restart the layout
    Reset,
    /// New canvas size in screen pixels
    Resize { width: f32, height: f32 },
}

/// Notifications for the surrounding UI
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    /// The selected CI changed; `None` when the selection was cleared
    SelectionChanged(Option<NodeDetail>),
    /// Filters were applied and the visible subset recomputed
    FiltersChanged { nodes: usize, edges: usize },
}

pub struct GraphView {
    model: GraphModel,
    filter: GraphFilter,
    visible: VisibleSet,
    simulator: ForceSimulator,
    viewport: Viewport,
    interaction: InteractionController,
    pub options: RenderOptions,
    rng: StdRng,
    events: Vec<GraphEvent>,
}

impl GraphView {
    pub fn new(data: GraphData, canvas: CanvasSize) -> Self {
        Self::with_rng(data, canvas, StdRng::from_entropy())
    }

    /// Build with a caller-supplied RNG so layouts are reproducible.
    pub fn with_rng(data: GraphData, canvas: CanvasSize, mut rng: StdRng) -> Self {
        let model = GraphModel::new(data, canvas, &mut rng);
        let visible = VisibleSet::everything(&model);
        Self {
            model,
            filter: GraphFilter::default(),
            visible,
            simulator: ForceSimulator::default(),
            viewport: Viewport::default(),
            interaction: InteractionController::default(),
            options: RenderOptions::default(),
            rng,
            events: Vec::new(),
        }
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn filter(&self) -> &GraphFilter {
        &self.filter
    }

    pub fn visible(&self) -> &VisibleSet {
        &self.visible
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    pub fn force_params(&self) -> ForceParams {
        self.simulator.params
    }

    pub fn set_force_params(&mut self, params: ForceParams) {
        self.simulator.params = params;
    }

    pub fn set_hit_test_mode(&mut self, mode: HitTestMode) {
        self.interaction.mode = mode;
    }

    /// Apply one queued input event.
    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::Pointer(pointer) => {
                let change = self.interaction.handle(
                    pointer,
                    &mut self.model,
                    &self.visible,
                    &self.viewport,
                );
                self.report(change);
            }
            InputEvent::Wheel(delta_y) => self.viewport.wheel(delta_y),
            InputEvent::Pan(delta) => self.viewport.pan(delta),
            InputEvent::ZoomIn => self.viewport.zoom_in(),
            InputEvent::ZoomOut => self.viewport.zoom_out(),
            InputEvent::Reset => self.reset(),
            InputEvent::Resize { width, height } => self.resize(width, height),
        }
    }

    /// Replace the filters and recompute the visible subset.
    pub fn set_filter(&mut self, filter: GraphFilter) {
        if filter == self.filter {
            return;
        }
        self.filter = filter;
        self.visible = VisibleSet::compute(&self.model, &self.filter);
        tracing::debug!(
            "Filters changed: {} of {} CIs visible, {} relationships",
            self.visible.nodes.len(),
            self.model.len(),
            self.visible.edges.len()
        );

        let change = self.interaction.reconcile(&mut self.model, &self.visible);
        self.events.push(GraphEvent::FiltersChanged {
            nodes: self.visible.nodes.len(),
            edges: self.visible.edges.len(),
        });
        self.report(change);
    }

    /// Advance the simulation by one frame.
    pub fn step(&mut self) {
        self.simulator.step(&mut self.model, &self.visible);
    }

    pub fn render(&self) -> Scene {
        render::render(
            &self.model,
            &self.visible,
            &self.viewport,
            &self.interaction,
            self.options,
        )
    }

    /// Reset zoom and pan, and scatter the layout again.
    pub fn reset(&mut self) {
        self.viewport.reset();
        self.model.restart_layout(&mut self.rng);
        self.interaction.cancel_drag();
        tracing::debug!("Viewport reset and layout restarted");
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        let canvas = CanvasSize::new(width, height);
        if canvas == self.model.canvas() {
            return;
        }
        self.model.resize(canvas, self.simulator.params.margin);
        tracing::debug!("Canvas resized to {}x{}", canvas.width, canvas.height);
    }

    pub fn clear_selection(&mut self) {
        let change = self.interaction.clear_selection();
        self.report(change);
    }

    #[cfg(test)]
    pub fn selected_detail(&self) -> Option<NodeDetail> {
        self.interaction
            .selected()
            .and_then(|id| self.model.detail(id))
    }

    pub fn average_speed(&self) -> f32 {
        self.simulator.average_speed(&self.model, &self.visible)
    }

    /// Drain the events produced since the last call.
    pub fn take_events(&mut self) -> Vec<GraphEvent> {
        std::mem::take(&mut self.events)
    }

    fn report(&mut self, change: Option<SelectionChanged>) {
        let Some(SelectionChanged(id)) = change else {
            return;
        };
        match &id {
            Some(id) => tracing::debug!("Selected CI {:?}", id),
            None => tracing::debug!("Selection cleared"),
        }
        let detail = id.and_then(|id| self.model.detail(&id));
        self.events.push(GraphEvent::SelectionChanged(detail));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::filter::TypeFilter;
    use crate::graph::interaction::InteractionState;
    use crate::graph::model::tests::rng;
    use crate::graph::sample;
    use crate::graph::types::CiType;
    use egui::Pos2;

    fn sample_view() -> GraphView {
        GraphView::with_rng(sample::sample_data(), CanvasSize::new(800.0, 600.0), rng())
    }

    #[test]
    fn test_click_emits_selection_detail() {
        let mut view = sample_view();
        let pos = view.model().nodes()[3].pos;
        // Move the other nodes away so the click is unambiguous
        for (i, node) in view.model.nodes_mut().iter_mut().enumerate() {
            if i != 3 {
                node.pos = Pos2::new(pos.x + 200.0, pos.y + 200.0);
            }
        }

        view.apply(InputEvent::Pointer(PointerEvent::Down(pos)));
        view.apply(InputEvent::Pointer(PointerEvent::Up(pos)));

        let events = view.take_events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            GraphEvent::SelectionChanged(Some(detail)) => {
                assert_eq!(detail.name, "ERP System");
                assert_eq!(detail.relationships.len(), 2);
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(view.selected_detail().unwrap().id, "4");
        assert!(view.take_events().is_empty());
    }

    #[test]
    fn test_filter_hiding_selection_clears_it() {
        let mut view = sample_view();
        let pos = view.model().nodes()[0].pos;
        view.apply(InputEvent::Pointer(PointerEvent::Down(pos)));
        view.take_events();

        view.set_filter(GraphFilter {
            node_type: TypeFilter::Only(CiType::Database),
            ..Default::default()
        });

        let events = view.take_events();
        assert_eq!(events[0], GraphEvent::FiltersChanged { nodes: 1, edges: 0 });
        assert_eq!(events[1], GraphEvent::SelectionChanged(None));
        assert_eq!(view.interaction().state(), &InteractionState::Idle);
        assert_eq!(view.model().pinned_count(), 0);
    }

    #[test]
    fn test_same_filter_is_a_no_op() {
        let mut view = sample_view();
        view.set_filter(GraphFilter::default());
        assert!(view.take_events().is_empty());
    }

    #[test]
    fn test_reset_restores_viewport_and_releases_drag() {
        let mut view = sample_view();
        let pos = view.model().nodes()[0].pos;
        view.apply(InputEvent::ZoomIn);
        view.apply(InputEvent::Pan(Vec2::new(40.0, -20.0)));
        view.apply(InputEvent::Pointer(PointerEvent::Down(
            view.viewport().model_to_screen(pos),
        )));
        assert_eq!(view.model().pinned_count(), 1);

        view.apply(InputEvent::Reset);

        assert_eq!(view.viewport(), &Viewport::default());
        assert_eq!(view.model().pinned_count(), 0);
        assert!(view.interaction().dragging().is_none());
    }

    #[test]
    fn test_resize_clamps_into_new_canvas() {
        let mut view = sample_view();
        view.apply(InputEvent::Resize {
            width: 200.0,
            height: 0.0,
        });
        assert_eq!(view.model().canvas(), CanvasSize::new(200.0, 100.0));
        for node in view.model().nodes() {
            assert!(node.pos.x >= 30.0 && node.pos.x <= 170.0);
            assert!(node.pos.y >= 30.0 && node.pos.y <= 70.0);
        }
    }

    #[test]
    fn test_wheel_and_zoom_buttons_stay_clamped() {
        let mut view = sample_view();
        for _ in 0..30 {
            view.apply(InputEvent::ZoomIn);
        }
        view.apply(InputEvent::Wheel(-500.0));
        assert_eq!(view.viewport().scale(), 3.0);
        view.apply(InputEvent::Wheel(1e6));
        assert_eq!(view.viewport().scale(), 0.1);
    }
}
