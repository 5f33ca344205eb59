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

use std::rc::Rc;

use cgmath::Point3;

use crate::{
    cameras::{Camera, CameraView, PerspectiveCameraConfig},
    controls::OrbitControls,
    params::ParameterSet,
    render_loop::{FrameContext, RenderLoopBuilder},
    scene::{Geometry, Material, NodeKind, SceneGraph, SceneNode},
};

use super::{Sketch, SketchContext};

const BUFFER_KEY: &str = "buffer";

/// The two shapes the lesson compares: a library box, or a triangle written
/// vertex by vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BaseGeometry {
    Box,
    Buffer,
}

impl BaseGeometry {
    const DEFAULT: Self = Self::Buffer;

    fn from_buffer_flag(buffer: bool) -> Self {
        if buffer { Self::Buffer } else { Self::Box }
    }

    fn geometry(self) -> Geometry {
        match self {
            Self::Box => Geometry::Box,
            Self::Buffer => Geometry::Triangle,
        }
    }
}

/// One red wireframe shape inspected with orbit controls. The panel switches
/// between the box and the hand-written triangle.
pub fn create(context: &SketchContext) -> Sketch {
    let camera = Camera::new(
        CameraView::default(),
        PerspectiveCameraConfig {
            far: 1000.0,
            ..PerspectiveCameraConfig::default()
        },
    );
    let mut builder = RenderLoopBuilder::new(context.viewport)
        .camera(camera)
        .controls(OrbitControls::new(Point3::new(0.0, 0.0, 0.0)).with_damping());
    let shape = builder.scene_mut().add(SceneNode::mesh(
        "shape",
        BaseGeometry::DEFAULT.geometry(),
        Material::wireframe([1.0, 0.0, 0.0]),
    ));

    let mut params = ParameterSet::new();
    params.add_bool(
        BUFFER_KEY,
        "Custom Buffer Geometry",
        BaseGeometry::DEFAULT == BaseGeometry::Buffer,
    );
    let params = params.into_shared();
    let choice = Rc::clone(&params);
    let apply_choice = move |_frame: &FrameContext, scene: &mut SceneGraph, _camera: &mut Camera| {
        let Some(buffer) = choice.borrow().bool(BUFFER_KEY) else {
            return;
        };
        if let Some(NodeKind::Mesh(mesh)) = scene.get_mut(shape).map(|node| &mut node.kind) {
            mesh.geometry = BaseGeometry::from_buffer_flag(buffer).geometry();
        }
    };

    Sketch {
        builder: builder.update(apply_choice),
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

    fn shape_geometry(render_loop: &crate::render_loop::RenderLoop) -> Option<Geometry> {
        let id = render_loop.scene().find("shape")?;
        match &render_loop.scene().get(id)?.kind {
            NodeKind::Mesh(mesh) => Some(mesh.geometry),
            _ => None,
        }
    }

    #[test]
    fn panel_switches_between_box_and_triangle() {
        let context = SketchContext {
            viewport: Viewport::default(),
            assets_dir: std::env::temp_dir(),
        };
        let sketch = create(&context);
        let params = sketch.params.unwrap();
        let mut render_loop = sketch
            .builder
            .clock(Clock::new(ManualTime::default()))
            .build(NullSurface::default(), ManualScheduler::default());
        render_loop.start();
        render_loop.tick().unwrap();
        assert_eq!(shape_geometry(&render_loop), Some(Geometry::Triangle));

        params.borrow_mut().set_bool(BUFFER_KEY, false);
        render_loop.tick().unwrap();
        assert_eq!(shape_geometry(&render_loop), Some(Geometry::Box));

        params.borrow_mut().set_bool(BUFFER_KEY, true);
        render_loop.tick().unwrap();
        assert_eq!(shape_geometry(&render_loop), Some(Geometry::Triangle));
    }
}
