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

use cgmath::{Deg, Matrix4, PerspectiveFov, Point3, Rad, Vector3, vec3};
use std::sync::LazyLock;

use crate::viewport::Dimensions;

static SWITCH_Z_AXIS: LazyLock<Matrix4<f32>> =
    LazyLock::new(|| Matrix4::from_nonuniform_scale(1., 1., -1.));
static TO_WEBGPU_NDCS: LazyLock<Matrix4<f32>> = LazyLock::new(|| {
    Matrix4::from_translation(vec3(0., 0., 0.5)) * Matrix4::from_nonuniform_scale(1., 1., 0.5)
});

#[derive(Clone, Debug)]
pub struct CameraView {
    pub eye: Point3<f32>,
    pub center: Point3<f32>,
    pub up: Vector3<f32>,
}

impl CameraView {
    #[must_use]
    pub fn calc_view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_lh(self.eye, self.center, self.up)
    }
}

impl Default for CameraView {
    fn default() -> Self {
        Self {
            eye: Point3::new(0.0, 0.0, 3.0),
            center: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::unit_y(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PerspectiveCameraConfig {
    pub fovy: Rad<f32>,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveCameraConfig {
    fn default() -> Self {
        Self {
            fovy: Deg(75.0).into(),
            aspect: 800. / 600.,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl PerspectiveCameraConfig {
    fn calc_projection(&self) -> Matrix4<f32> {
        Matrix4::from(PerspectiveFov {
            fovy: self.fovy,
            aspect: self.aspect,
            near: self.near,
            far: self.far,
        })
    }
}

pub struct Camera {
    projection: PerspectiveCameraConfig,
    view: CameraView,
    projection_cache: Matrix4<f32>,
    view_cache: Matrix4<f32>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraView::default(), PerspectiveCameraConfig::default())
    }
}

impl Camera {
    #[must_use]
    pub fn new(view: CameraView, projection: PerspectiveCameraConfig) -> Self {
        let view_cache = view.calc_view_matrix();
        let projection_cache = projection.calc_projection();
        Self {
            projection,
            view,
            projection_cache,
            view_cache,
        }
    }
    fn update_view_cache(&mut self) {
        self.view_cache = self.view.calc_view_matrix();
    }
    fn update_projection_cache(&mut self) {
        self.projection_cache = self.projection.calc_projection();
    }
    pub fn resize_screen(&mut self, dimensions: Dimensions) {
        self.projection.aspect = dimensions.surface_ratio();
        self.update_projection_cache();
    }
    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.projection.aspect
    }
    #[must_use]
    pub fn projection(&self) -> &PerspectiveCameraConfig {
        &self.projection
    }
    #[must_use]
    pub fn get_camera_matrix(&self) -> Matrix4<f32> {
        (*TO_WEBGPU_NDCS) * self.projection_cache * (*SWITCH_Z_AXIS) * self.view_cache
    }
    #[must_use]
    pub fn eye_position(&self) -> Point3<f32> {
        self.view.eye
    }
    #[must_use]
    pub fn target(&self) -> Point3<f32> {
        self.view.center
    }
    #[must_use]
    pub fn up(&self) -> Vector3<f32> {
        self.view.up
    }
    pub fn set_position(&mut self, eye: Point3<f32>) {
        self.view.eye = eye;
        self.update_view_cache();
    }
    pub fn look_at(&mut self, center: Point3<f32>) {
        self.view.center = center;
        self.update_view_cache();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{EuclideanSpace, Transform};

    #[test]
    fn resize_updates_aspect() {
        let mut camera = Camera::default();
        camera.resize_screen(Dimensions {
            width: 1920,
            height: 1080,
        });
        assert_eq!(camera.aspect(), 1920.0 / 1080.0);
    }

    #[test]
    fn target_projects_to_screen_center() {
        let mut camera = Camera::default();
        camera.set_position(Point3::new(2.0, 2.0, 2.0));
        camera.look_at(Point3::new(0.5, 0.0, 0.0));
        let projected = camera
            .get_camera_matrix()
            .transform_point(Point3::new(0.5, 0.0, 0.0));
        assert!(projected.x.abs() < 1e-5);
        assert!(projected.y.abs() < 1e-5);
        assert!(projected.z > 0.0 && projected.z < 1.0);
    }

    #[test]
    fn point_behind_camera_is_outside_depth_range() {
        let camera = Camera::default();
        let behind = camera.eye_position().to_vec() * 2.0;
        let projected = camera
            .get_camera_matrix()
            .transform_point(Point3::from_vec(behind));
        assert!(!(0.0..=1.0).contains(&projected.z));
    }
}
