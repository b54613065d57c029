//! Pan/zoom transform between model space and canvas screen space.
//!
//! Screen coordinates are relative to the canvas' top-left corner:
//! `screen = model * scale + translate`.

use egui::{Pos2, Vec2};

pub const MIN_SCALE: f32 = 0.1;
pub const MAX_SCALE: f32 = 3.0;

/// Factor applied by the zoom buttons
const ZOOM_STEP: f32 = 1.2;

/// Scale change per unit of wheel delta
const WHEEL_SENSITIVITY: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub translate: Vec2,
    scale: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl Viewport {
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Set the scale, clamped into `[MIN_SCALE, MAX_SCALE]`. Non-finite values are ignored.
    pub fn set_scale(&mut self, scale: f32) {
        if scale.is_finite() {
            self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        }
    }

    pub fn zoom_in(&mut self) {
        self.set_scale(self.scale * ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_scale(self.scale / ZOOM_STEP);
    }

    /// Wheel zoom: positive `delta_y` (scrolling down) zooms out.
    pub fn wheel(&mut self, delta_y: f32) {
        if delta_y.is_finite() {
            self.set_scale(self.scale - delta_y * WHEEL_SENSITIVITY);
        }
    }

    /// Move the view by a screen-space delta.
    pub fn pan(&mut self, delta: Vec2) {
        if delta.x.is_finite() && delta.y.is_finite() {
            self.translate += delta;
        }
    }

    /// Back to the origin at scale 1.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn screen_to_model(&self, screen: Pos2) -> Pos2 {
        Pos2::new(
            (screen.x - self.translate.x) / self.scale,
            (screen.y - self.translate.y) / self.scale,
        )
    }

    pub fn model_to_screen(&self, model: Pos2) -> Pos2 {
        Pos2::new(
            model.x * self.scale + self.translate.x,
            model.y * self.scale + self.translate.y,
        )
    }

    /// Convert a model-space length to screen pixels
    pub fn to_screen_len(&self, len: f32) -> f32 {
        len * self.scale
    }
}
