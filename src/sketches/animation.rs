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

use std::f32::consts::FRAC_PI_4;

use cgmath::{EuclideanSpace, InnerSpace, MetricSpace, Point3};
use log::info;

use crate::{
    animation::{FollowObject, MoveTo, Spin},
    render_loop::RenderLoopBuilder,
    scene::{Axis, Geometry, Material, NodeKind, SceneNode},
};

use super::{Sketch, SketchContext, add_cube_group, camera_at};

const SLIDE_DELAY: f32 = 1.0;
const SLIDE_TARGET_X: f32 = 2.0;

/// A stretched, tilted cube spinning on two axes next to an axes helper and
/// the cube group. After one second it slides to x = 2; the camera follows it.
pub fn create(context: &SketchContext) -> Sketch {
    let axes_position = Point3::new(0.6, 0.6, 0.0);
    let mut builder = RenderLoopBuilder::new(context.viewport)
        .camera(camera_at(0.0, 0.0, 3.0, axes_position));
    let scene = builder.scene_mut();
    let cube = scene.add(
        SceneNode::mesh("cube", Geometry::Box, Material::wireframe([1.0, 0.0, 0.0]))
            .with_position(0.6, -0.8, 0.7)
            .with_scale(1.5, 0.5, 0.5)
            .with_rotation(FRAC_PI_4, FRAC_PI_4, FRAC_PI_4),
    );
    scene.add(
        SceneNode::new("axes", NodeKind::AxesHelper { size: 1.0 })
            .with_position(axes_position.x, axes_position.y, axes_position.z),
    );
    add_cube_group(scene);

    if let Some(position) = scene.world_position(cube) {
        let eye = Point3::new(0.0, 0.0, 3.0);
        info!(
            "Cube at {:?}: length {:.3}, distance to camera {:.3}, direction {:?}",
            position,
            position.to_vec().magnitude(),
            position.distance(eye),
            position.to_vec().normalize()
        );
    }

    builder
        .update(Spin {
            base: FRAC_PI_4,
            ..Spin::new(cube, Axis::X, 1.0)
        })
        .update(Spin {
            base: FRAC_PI_4,
            ..Spin::new(cube, Axis::Y, 0.5)
        })
        .update(MoveTo::new(cube, Axis::X, SLIDE_TARGET_X).with_delay(SLIDE_DELAY))
        .update(FollowObject { object: cube })
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sketches::tick_sketch_at;

    fn cube_x(times: &[f64]) -> f32 {
        let render_loop = tick_sketch_at(create, times);
        let cube = render_loop.scene().find("cube").unwrap();
        render_loop.scene().get(cube).unwrap().transform.position.x
    }

    #[test]
    fn cube_slides_right_after_the_delay() {
        assert!((cube_x(&[0.5]) - 0.6).abs() < 1e-6);
        let halfway = cube_x(&[0.5, 1.25]);
        assert!((halfway - 1.3).abs() < 1e-5, "{halfway}");
        assert!((cube_x(&[0.5, 1.25, 3.0]) - SLIDE_TARGET_X).abs() < 1e-6);
        assert!((cube_x(&[3.0]) - SLIDE_TARGET_X).abs() < 1e-6);
    }

    #[test]
    fn camera_keeps_looking_at_the_cube() {
        let render_loop = tick_sketch_at(create, &[3.0]);
        assert!((render_loop.camera().target().x - SLIDE_TARGET_X).abs() < 1e-6);
    }
}
