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

use std::f32::consts::PI;

use cgmath::{InnerSpace, MetricSpace, Point3, vec3};
use winit::event::{DeviceEvent, ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::cameras::Camera;

pub trait CameraControls {
    /// Advances the controls by one step and writes the result into `camera`.
    /// Returns `true` when the camera moved.
    fn update(&mut self, camera: &mut Camera) -> bool;
    fn on_window_event(&mut self, _event: &WindowEvent) {}
    fn on_mouse_event(&mut self, _event: &DeviceEvent) {}
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct SphericalDelta {
    theta: f32,
    phi: f32,
}

/// Orbits the camera around a target point, with optional damping so that
/// motion decelerates over several updates after the input stops.
pub struct OrbitControls {
    pub target: Point3<f32>,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pending: SphericalDelta,
    pending_scale: f32,
    dragging: bool,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Point3::new(0.0, 0.0, 0.0),
            enable_damping: false,
            damping_factor: Self::DEFAULT_DAMPING_FACTOR,
            rotate_speed: Self::DEFAULT_ROTATE_SPEED,
            zoom_speed: Self::DEFAULT_ZOOM_SPEED,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            pending: SphericalDelta::default(),
            pending_scale: 1.0,
            dragging: false,
        }
    }
}

impl OrbitControls {
    const DEFAULT_DAMPING_FACTOR: f32 = 0.05;
    const DEFAULT_ROTATE_SPEED: f32 = 0.005;
    const DEFAULT_ZOOM_SPEED: f32 = 0.95;
    const POLAR_EPSILON: f32 = 1e-6;
    const MOVE_EPSILON: f32 = 1e-6;
    const PIXELS_PER_LINE: f32 = 40.0;

    #[must_use]
    pub fn new(target: Point3<f32>) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_damping(mut self) -> Self {
        self.enable_damping = true;
        self
    }

    /// Rotates around the vertical axis. Positive values orbit to the left.
    pub fn rotate_left(&mut self, angle: f32) {
        self.pending.theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.pending.phi -= angle;
    }

    /// Moves toward the target by `steps` wheel notches; negative moves away.
    pub fn dolly(&mut self, steps: f32) {
        self.pending_scale *= self.zoom_speed.powf(steps);
    }

    fn is_settled(&self) -> bool {
        self.pending.theta.abs() < Self::MOVE_EPSILON
            && self.pending.phi.abs() < Self::MOVE_EPSILON
            && (self.pending_scale - 1.0).abs() < Self::MOVE_EPSILON
    }
}

impl CameraControls for OrbitControls {
    fn update(&mut self, camera: &mut Camera) -> bool {
        let previous_eye = camera.eye_position();
        let offset = previous_eye - self.target;
        let mut radius = offset.magnitude();
        let (mut theta, mut phi) = if radius > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, PI / 2.0)
        };

        let step = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };
        theta += self.pending.theta * step;
        phi += self.pending.phi * step;
        phi = phi.clamp(Self::POLAR_EPSILON, PI - Self::POLAR_EPSILON);
        radius = (radius * self.pending_scale).clamp(self.min_distance, self.max_distance);

        let eye = self.target
            + vec3(
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
                radius * phi.sin() * theta.cos(),
            );
        if self.enable_damping {
            self.pending.theta *= 1.0 - self.damping_factor;
            self.pending.phi *= 1.0 - self.damping_factor;
        } else {
            self.pending = SphericalDelta::default();
        }
        self.pending_scale = 1.0;
        if self.is_settled() {
            self.pending = SphericalDelta::default();
        }

        camera.set_position(eye);
        camera.look_at(self.target);
        previous_eye.distance2(eye) > Self::MOVE_EPSILON * Self::MOVE_EPSILON
    }

    fn on_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = *state == ElementState::Pressed;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    #[allow(clippy::cast_possible_truncation)]
                    MouseScrollDelta::PixelDelta(position) => {
                        position.y as f32 / Self::PIXELS_PER_LINE
                    }
                };
                self.dolly(steps);
            }
            _ => {}
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn on_mouse_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.dragging {
                self.rotate_left(delta.0 as f32 * self.rotate_speed);
                self.rotate_up(delta.1 as f32 * self.rotate_speed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn azimuth(camera: &Camera) -> f32 {
        let offset = camera.eye_position() - camera.target();
        offset.x.atan2(offset.z)
    }

    #[test]
    fn without_damping_applies_full_delta_once() {
        let mut camera = Camera::default();
        let mut controls = OrbitControls::default();
        controls.rotate_left(-0.5);
        assert!(controls.update(&mut camera));
        assert!((azimuth(&camera) - 0.5).abs() < 1e-4);
        assert!(!controls.update(&mut camera));
    }

    #[test]
    fn damping_keeps_moving_after_input_stops() {
        let mut camera = Camera::default();
        let mut controls = OrbitControls::default().with_damping();
        controls.rotate_left(-0.5);
        assert!(controls.update(&mut camera));
        let first = azimuth(&camera);
        assert!((first - 0.5 * 0.05).abs() < 1e-4);
        assert!(controls.update(&mut camera));
        assert!(azimuth(&camera) > first);
    }

    #[test]
    fn damping_converges_to_full_delta() {
        let mut camera = Camera::default();
        let mut controls = OrbitControls::default().with_damping();
        controls.rotate_left(-0.5);
        let mut updates = 0;
        while controls.update(&mut camera) {
            updates += 1;
            assert!(updates < 1_000, "damping should settle");
        }
        assert!((azimuth(&camera) - 0.5).abs() < 1e-3);
    }

    #[test]
    fn dolly_respects_distance_limits() {
        let mut camera = Camera::default();
        let mut controls = OrbitControls {
            min_distance: 2.0,
            ..OrbitControls::default()
        };
        controls.dolly(100.0);
        controls.update(&mut camera);
        let distance = (camera.eye_position() - camera.target()).magnitude();
        assert!((distance - 2.0).abs() < 1e-4);
    }

    #[test]
    fn polar_angle_is_clamped() {
        let mut camera = Camera::default();
        let mut controls = OrbitControls::default();
        controls.rotate_up(10.0);
        controls.update(&mut camera);
        let offset = camera.eye_position() - camera.target();
        assert!(offset.y > 0.0);
        assert!((offset.magnitude() - 3.0).abs() < 1e-3);
    }

    #[test]
    fn drag_gates_mouse_motion() {
        let mut controls = OrbitControls::default();
        controls.on_mouse_event(&DeviceEvent::MouseMotion { delta: (10.0, 0.0) });
        assert!(controls.is_settled());
    }
}
