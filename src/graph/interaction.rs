//! Pointer handling: hover, selection and node dragging.
//!
//! Pointer positions arrive in canvas screen coordinates and are mapped to
//! model space through the viewport before hit-testing. Dragging pins the
//! node under the pointer; releasing unpins it so the simulation takes over.

use serde::{Deserialize, Serialize};

use egui::Pos2;

use super::filter::VisibleSet;
use super::model::GraphModel;
use super::viewport::Viewport;

/// Pick radius around a node center, in model units
pub const HIT_RADIUS: f32 = 25.0;

/// Pointer model coordinates are clamped into `±MAX_MODEL_COORD`
const MAX_MODEL_COORD: f32 = 1.0e6;

/// How to choose between several nodes under the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HitTestMode {
    /// First node in node-list order within the radius
    #[default]
    FirstMatch,
    /// Closest node within the radius, earliest on ties
    Nearest,
}

impl HitTestMode {
    pub fn label(&self) -> &'static str {
        match self {
            HitTestMode::FirstMatch => "First match",
            HitTestMode::Nearest => "Nearest node",
        }
    }
}

/// Interaction state machine
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Hovering(String),
    Dragging(String),
}

/// Pointer input in canvas screen coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Pos2),
    /// Movement with no button held, or while dragging
    Move(Pos2),
    Up(Pos2),
    /// Pointer left the canvas
    Leave,
}

/// The selected node changed; `None` means the selection was cleared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChanged(pub Option<String>);

/// Find the visible node within `HIT_RADIUS` of a model-space point.
pub fn hit_test(
    model: &GraphModel,
    visible: &VisibleSet,
    point: Pos2,
    mode: HitTestMode,
) -> Option<usize> {
    let mut hits = visible.nodes.iter().filter_map(|&i| {
        let node = model.node(i)?;
        let distance = node.pos.distance(point);
        (distance <= HIT_RADIUS).then_some((i, distance))
    });

    match mode {
        HitTestMode::FirstMatch => hits.next().map(|(i, _)| i),
        HitTestMode::Nearest => hits
            .fold(None, |best: Option<(usize, f32)>, (i, d)| match best {
                Some((_, best_d)) if best_d <= d => best,
                _ => Some((i, d)),
            })
            .map(|(i, _)| i),
    }
}

fn sanitize(point: Pos2) -> Option<Pos2> {
    if !point.x.is_finite() || !point.y.is_finite() {
        return None;
    }
    Some(Pos2::new(
        point.x.clamp(-MAX_MODEL_COORD, MAX_MODEL_COORD),
        point.y.clamp(-MAX_MODEL_COORD, MAX_MODEL_COORD),
    ))
}

/// Translates pointer events into hover/selection/drag actions
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    state: InteractionState,
    selected: Option<String>,
    pub mode: HitTestMode,
}

impl InteractionController {
    pub fn new(mode: HitTestMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Node under the pointer without a drag in progress
    pub fn hovered(&self) -> Option<&str> {
        match &self.state {
            InteractionState::Hovering(id) => Some(id),
            _ => None,
        }
    }

    pub fn dragging(&self) -> Option<&str> {
        match &self.state {
            InteractionState::Dragging(id) => Some(id),
            _ => None,
        }
    }

    /// Apply one pointer event. Returns the new selection when it changed.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        model: &mut GraphModel,
        visible: &VisibleSet,
        viewport: &Viewport,
    ) -> Option<SelectionChanged> {
        let to_model = |screen: Pos2| sanitize(viewport.screen_to_model(screen));

        match event {
            PointerEvent::Down(screen) => {
                let point = to_model(screen)?;
                self.release_drag(model);
                match hit_test(model, visible, point, self.mode) {
                    Some(index) => {
                        let id = model.node(index)?.id.clone();
                        model.pin(index, point);
                        self.state = InteractionState::Dragging(id.clone());
                        self.select(Some(id))
                    }
                    None => {
                        self.state = InteractionState::Idle;
                        self.select(None)
                    }
                }
            }
            PointerEvent::Move(screen) => {
                let point = to_model(screen)?;
                if let InteractionState::Dragging(id) = &self.state {
                    if let Some(index) = model.index_of(id) {
                        model.pin(index, point);
                    }
                } else {
                    self.update_hover(model, visible, point);
                }
                None
            }
            PointerEvent::Up(screen) => {
                self.release_drag(model);
                match to_model(screen) {
                    Some(point) => self.update_hover(model, visible, point),
                    None => self.state = InteractionState::Idle,
                }
                None
            }
            PointerEvent::Leave => {
                self.release_drag(model);
                self.state = InteractionState::Idle;
                None
            }
        }
    }

    /// Drop hover/drag/selection on nodes that are no longer visible.
    pub fn reconcile(
        &mut self,
        model: &mut GraphModel,
        visible: &VisibleSet,
    ) -> Option<SelectionChanged> {
        let is_visible = |id: &str| model.index_of(id).is_some_and(|i| visible.contains_node(i));

        let stale = match &self.state {
            InteractionState::Idle => false,
            InteractionState::Hovering(id) | InteractionState::Dragging(id) => !is_visible(id),
        };
        let selection_hidden = self.selected.as_deref().is_some_and(|id| !is_visible(id));

        if stale {
            self.release_drag(model);
            self.state = InteractionState::Idle;
        }
        if selection_hidden {
            self.select(None)
        } else {
            None
        }
    }

    /// Forget any drag in progress (the layout was restarted and pins cleared).
    pub fn cancel_drag(&mut self) {
        if matches!(self.state, InteractionState::Dragging(_)) {
            self.state = InteractionState::Idle;
        }
    }

    pub fn clear_selection(&mut self) -> Option<SelectionChanged> {
        self.select(None)
    }

    fn select(&mut self, id: Option<String>) -> Option<SelectionChanged> {
        if self.selected == id {
            return None;
        }
        self.selected = id.clone();
        Some(SelectionChanged(id))
    }

    fn release_drag(&mut self, model: &mut GraphModel) {
        if let InteractionState::Dragging(id) = &self.state {
            if let Some(index) = model.index_of(id) {
                model.unpin(index);
            }
            self.state = InteractionState::Idle;
        }
    }

    fn update_hover(&mut self, model: &GraphModel, visible: &VisibleSet, point: Pos2) {
        self.state = match hit_test(model, visible, point, self.mode) {
            Some(index) => InteractionState::Hovering(model.nodes()[index].id.clone()),
            None => InteractionState::Idle,
        };
    }
}
