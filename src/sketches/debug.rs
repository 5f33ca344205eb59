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

use std::{f32::consts::PI, rc::Rc};

use cgmath::Point3;

use crate::{
    animation::SpinOnce,
    cameras::Camera,
    controls::OrbitControls,
    params::{ParameterBindings, ParameterSet, Property},
    render_loop::{FrameContext, FrameUpdate, RenderLoopBuilder},
    scene::{Axis, Geometry, Material, SceneGraph, SceneNode},
};

use super::{Sketch, SketchContext, camera_at};

const SPIN_DURATION: f32 = 1.0;

fn key(prefix: &str, axis: Axis) -> String {
    format!("{prefix}.{}", axis.label().to_lowercase())
}

/// A wireframe cube whose transform and material are driven by the
/// parameter panel, plus a one-shot spin button.
pub fn create(context: &SketchContext) -> Sketch {
    let mut builder = RenderLoopBuilder::new(context.viewport)
        .camera(camera_at(1.0, 1.0, 2.0, Point3::new(0.0, 0.0, 0.0)))
        .controls(OrbitControls::new(Point3::new(0.0, 0.0, 0.0)).with_damping());
    let cube = builder.scene_mut().add(SceneNode::mesh(
        "cube",
        Geometry::Box,
        Material::wireframe([1.0, 0.0, 0.0]),
    ));

    let mut params = ParameterSet::new();
    for (prefix, name, value, range) in [
        ("position", "Position", 0.0, -3.0..=3.0),
        ("rotation", "Rotation", 0.0, -PI..=PI),
        ("scale", "Scale", 1.0, 0.1..=3.0),
    ] {
        for axis in Axis::ALL {
            let label = format!("{name} {}", axis.label());
            params.add_float(&key(prefix, axis), &label, value, range.clone(), 0.01);
        }
    }
    params
        .add_color("color", "Color", [1.0, 0.0, 0.0])
        .add_bool("visible", "Mesh Visible", true)
        .add_bool("wireframe", "Wireframe", true)
        .add_action("spin", "Spin Mesh");
    let params = params.into_shared();

    let mut bindings = ParameterBindings::new(Rc::clone(&params));
    for axis in Axis::ALL {
        bindings = bindings
            .bind(&key("position", axis), cube, Property::Position(axis))
            .bind(&key("rotation", axis), cube, Property::Rotation(axis))
            .bind(&key("scale", axis), cube, Property::Scale(axis));
    }
    let bindings = bindings
        .bind("color", cube, Property::Color)
        .bind("visible", cube, Property::Visible)
        .bind("wireframe", cube, Property::Wireframe);

    let spin_params = Rc::clone(&params);
    let mut spin = SpinOnce::new(cube, SPIN_DURATION);
    let spin_on_demand = move |frame: &FrameContext, scene: &mut SceneGraph, camera: &mut Camera| {
        if spin_params.borrow_mut().take_action("spin") {
            spin.trigger(scene, frame.elapsed_f32());
        }
        spin.update(frame, scene, camera);
    };

    Sketch {
        builder: builder.update(bindings).update(spin_on_demand),
        params: Some(params),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::{Clock, ManualTime},
        render_loop::ManualScheduler,
        surface::NullSurface,
        viewport::Viewport,
    };
    use std::time::Duration;

    #[test]
    fn panel_edits_reach_the_cube_on_next_tick() {
        let context = SketchContext {
            viewport: Viewport::default(),
            assets_dir: std::env::temp_dir(),
        };
        let sketch = create(&context);
        let params = sketch.params.unwrap();
        let time = ManualTime::default();
        let scheduler = ManualScheduler::default();
        let mut render_loop = sketch
            .builder
            .clock(Clock::new(time.clone()))
            .build(NullSurface::default(), scheduler.clone());
        render_loop.start();
        let cube = render_loop.scene().find("cube").unwrap();

        params.borrow_mut().set_float("position.x", 9.0);
        params.borrow_mut().trigger("spin");
        time.advance(Duration::from_millis(500));
        render_loop.tick().unwrap();
        let node = render_loop.scene().get(cube).unwrap();
        assert!((node.transform.position.x - 3.0).abs() < 1e-6);
        // Spin started on this tick, so no progress yet.
        assert!(node.transform.rotation.x.abs() < 1e-6);

        time.advance(Duration::from_millis(500));
        render_loop.tick().unwrap();
        let rotation = render_loop.scene().get(cube).unwrap().transform.rotation.x;
        assert!((rotation - PI).abs() < 1e-3);
    }
}
