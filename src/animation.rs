/*
MIT License

Copyright (c) 2025 Vincent Hiribarren

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Time-driven transform rules.
//!
//! Every rule derives its output from the elapsed time of the frame rather
//! than accumulating per-tick deltas, so animation speed does not depend on
//! how often ticks happen.

use std::f32::consts::TAU;

use crate::{
    cameras::Camera,
    render_loop::{FrameContext, FrameUpdate},
    scene::{Axis, ObjectId, SceneGraph},
};

/// `rotation[axis] = base + rate * elapsed`
pub struct Spin {
    pub object: ObjectId,
    pub axis: Axis,
    pub base: f32,
    /// Radians per second.
    pub rate: f32,
}

impl Spin {
    #[must_use]
    pub fn new(object: ObjectId, axis: Axis, rate: f32) -> Self {
        Self {
            object,
            axis,
            base: 0.0,
            rate,
        }
    }

    #[must_use]
    pub fn angle_at(&self, elapsed: f32) -> f32 {
        self.base + self.rate * elapsed
    }
}

impl FrameUpdate for Spin {
    fn update(&mut self, frame: &FrameContext, scene: &mut SceneGraph, _camera: &mut Camera) {
        let angle = self.angle_at(frame.elapsed_f32());
        if let Some(node) = scene.get_mut(self.object) {
            *self.axis.component_mut(&mut node.transform.rotation) = angle;
        }
    }
}

/// Slides one position coordinate to `target`, linearly over `duration`
/// seconds once `delay` seconds have elapsed. The start value is the one the
/// object has when the move begins.
pub struct MoveTo {
    pub object: ObjectId,
    pub axis: Axis,
    pub target: f32,
    pub delay: f32,
    pub duration: f32,
    from: Option<f32>,
}

impl MoveTo {
    pub const DEFAULT_DURATION: f32 = 0.5;

    #[must_use]
    pub fn new(object: ObjectId, axis: Axis, target: f32) -> Self {
        Self {
            object,
            axis,
            target,
            delay: 0.0,
            duration: Self::DEFAULT_DURATION,
            from: None,
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    /// Fraction of the move done at `elapsed`, in `[0, 1]`.
    #[must_use]
    pub fn progress_at(&self, elapsed: f32) -> f32 {
        if self.duration <= 0.0 {
            return if elapsed >= self.delay { 1.0 } else { 0.0 };
        }
        ((elapsed - self.delay) / self.duration).clamp(0.0, 1.0)
    }
}

impl FrameUpdate for MoveTo {
    fn update(&mut self, frame: &FrameContext, scene: &mut SceneGraph, _camera: &mut Camera) {
        let elapsed = frame.elapsed_f32();
        if elapsed < self.delay {
            return;
        }
        let Some(node) = scene.get_mut(self.object) else {
            return;
        };
        let from = *self
            .from
            .get_or_insert_with(|| self.axis.component(&node.transform.position));
        *self.axis.component_mut(&mut node.transform.position) =
            from + (self.target - from) * self.progress_at(elapsed);
    }
}

/// Keeps the camera pointed at an object.
pub struct FollowObject {
    pub object: ObjectId,
}

impl FrameUpdate for FollowObject {
    fn update(&mut self, _frame: &FrameContext, scene: &mut SceneGraph, camera: &mut Camera) {
        if let Some(position) = scene.world_position(self.object) {
            camera.look_at(position);
        }
    }
}

/// A single full turn on two axes over a fixed duration, started on demand.
pub struct SpinOnce {
    pub object: ObjectId,
    pub duration: f32,
    running: Option<(f32, [f32; 2])>,
}

impl SpinOnce {
    #[must_use]
    pub fn new(object: ObjectId, duration: f32) -> Self {
        Self {
            object,
            duration,
            running: None,
        }
    }

    /// Starts a turn from the current rotation. Ignored while one is running.
    pub fn trigger(&mut self, scene: &SceneGraph, elapsed: f32) {
        if self.running.is_some() {
            return;
        }
        if let Some(node) = scene.get(self.object) {
            let rotation = node.transform.rotation;
            self.running = Some((elapsed, [rotation.x, rotation.y]));
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }
}

impl FrameUpdate for SpinOnce {
    fn update(&mut self, frame: &FrameContext, scene: &mut SceneGraph, _camera: &mut Camera) {
        let Some((start, [base_x, base_y])) = self.running else {
            return;
        };
        let progress = ((frame.elapsed_f32() - start) / self.duration).clamp(0.0, 1.0);
        if let Some(node) = scene.get_mut(self.object) {
            node.transform.rotation.x = base_x + TAU * progress;
            node.transform.rotation.y = base_y + TAU * progress;
        }
        if progress >= 1.0 {
            self.running = None;
        }
    }
}
