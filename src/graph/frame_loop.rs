//! Continuous frame driver with an input queue.
//!
//! Each tick drains queued input into the view, steps the simulation once and
//! renders. A stopped loop ignores new input and produces no frames.

use std::collections::VecDeque;

use super::render::Scene;
use super::view::{GraphView, InputEvent};

#[derive(Debug, Default)]
pub struct FrameLoop {
    running: bool,
    queue: VecDeque<InputEvent>,
    frames: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        if !self.running {
            tracing::debug!("Frame loop started");
        }
        self.running = true;
    }

    /// Stop ticking and discard pending input.
    pub fn stop(&mut self) {
        if self.running {
            tracing::debug!("Frame loop stopped after {} frames", self.frames);
        }
        self.running = false;
        self.queue.clear();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queue input for the next tick. Dropped while stopped.
    pub fn push(&mut self, event: InputEvent) {
        if self.running {
            self.queue.push_back(event);
        }
    }

    /// Run one frame: input, then physics, then rendering.
    pub fn tick(&mut self, view: &mut GraphView) -> Option<Scene> {
        if !self.running {
            return None;
        }
        while let Some(event) = self.queue.pop_front() {
            view.apply(event);
        }
        view.step();
        self.frames += 1;
        Some(view.render())
    }
}
