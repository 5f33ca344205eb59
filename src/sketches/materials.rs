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

use cgmath::Point3;

use crate::{
    animation::Spin,
    controls::OrbitControls,
    render_loop::RenderLoopBuilder,
    scene::{Axis, Geometry, Material, SceneNode},
};

use super::{Sketch, SketchContext, camera_at};

/// Radians per second, shared by every shape.
const SPIN_RATE_Y: f32 = 0.1;
const SPIN_RATE_X: f32 = -0.15;

/// Half-transparent primitives side by side, all turning slowly on X and Y.
pub fn create(context: &SketchContext) -> Sketch {
    let mut builder = RenderLoopBuilder::new(context.viewport)
        .camera(camera_at(1.0, 1.0, 3.0, Point3::new(0.0, 0.0, 0.0)))
        .controls(OrbitControls::new(Point3::new(0.0, 0.0, 0.0)).with_damping());
    let scene = builder.scene_mut();
    let translucent = |color| Material {
        opacity: 0.6,
        ..Material::solid(color)
    };
    let shapes = [
        ("plane", Geometry::Plane, -1.5, [1.0, 0.0, 0.0]),
        ("box", Geometry::Box, 0.0, [0.0, 1.0, 0.0]),
        ("triangle", Geometry::Triangle, 1.5, [0.0, 0.0, 1.0]),
    ];
    let ids: Vec<_> = shapes
        .into_iter()
        .map(|(name, geometry, x, color)| {
            scene.add(SceneNode::mesh(name, geometry, translucent(color)).with_position(x, 0.0, 0.0))
        })
        .collect();
    for id in ids {
        builder = builder
            .update(Spin::new(id, Axis::Y, SPIN_RATE_Y))
            .update(Spin::new(id, Axis::X, SPIN_RATE_X));
    }
    builder.into()
}
