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

//! The learning sketches. Each one sets up a scene, a camera and the per-tick
//! updates, and hands back an unbuilt [`RenderLoopBuilder`]; the host picks
//! the surface and the scheduler.

use std::path::PathBuf;

use cgmath::Point3;

use crate::{
    cameras::{Camera, CameraView, PerspectiveCameraConfig},
    params::SharedParameters,
    render_loop::RenderLoopBuilder,
    scene::{Geometry, Material, NodeKind, ObjectId, SceneGraph, SceneNode},
    viewport::Viewport,
};

mod animation;
mod basic;
mod camera;
mod debug;
mod geometry;
mod materials;
mod texture;

pub struct SketchContext {
    pub viewport: Viewport,
    pub assets_dir: PathBuf,
}

pub struct Sketch {
    pub builder: RenderLoopBuilder,
    /// Parameters to expose in the debug panel, if any.
    pub params: Option<SharedParameters>,
}

impl From<RenderLoopBuilder> for Sketch {
    fn from(builder: RenderLoopBuilder) -> Self {
        Self {
            builder,
            params: None,
        }
    }
}

pub type SketchBuilder = fn(&SketchContext) -> Sketch;

pub const SKETCHES: &[(&str, SketchBuilder)] = &[
    ("basic", basic::create),
    ("animation", animation::create),
    ("camera", camera::create),
    ("geometry", geometry::create),
    ("materials", materials::create),
    ("debug", debug::create),
    ("texture", texture::create),
];

#[must_use]
pub fn find_sketch(name: &str) -> Option<SketchBuilder> {
    SKETCHES
        .iter()
        .find(|(sketch_name, _)| *sketch_name == name)
        .map(|(_, builder)| *builder)
}

pub fn sketch_names() -> impl Iterator<Item = &'static str> {
    SKETCHES.iter().map(|(name, _)| *name)
}

fn camera_at(x: f32, y: f32, z: f32, target: Point3<f32>) -> Camera {
    Camera::new(
        CameraView {
            eye: Point3::new(x, y, z),
            center: target,
            ..CameraView::default()
        },
        PerspectiveCameraConfig::default(),
    )
}

/// Three wireframe cubes side by side in a stretched, slightly turned group.
fn add_cube_group(scene: &mut SceneGraph) -> ObjectId {
    let group = scene.add(
        SceneNode::new("group", NodeKind::Group)
            .with_scale(1.0, 2.0, 1.0)
            .with_rotation(0.0, 0.2, 0.0),
    );
    for (name, x, color) in [
        ("cube_one", -1.5, [0.0, 1.0, 0.0]),
        ("cube_two", 0.0, [0.0, 0.0, 1.0]),
        ("cube_three", 1.5, [1.0, 1.0, 0.0]),
    ] {
        scene.add_child(
            group,
            SceneNode::mesh(name, Geometry::Box, Material::wireframe(color)).with_position(x, 0.0, 0.0),
        );
    }
    group
}

/// Builds a sketch on a manual clock and ticks it once at each of `times`,
/// in seconds since start.
#[cfg(test)]
fn tick_sketch_at(create: SketchBuilder, times: &[f64]) -> crate::render_loop::RenderLoop {
    use crate::{
        clock::{Clock, ManualTime},
        render_loop::ManualScheduler,
        surface::NullSurface,
    };
    let context = SketchContext {
        viewport: Viewport::default(),
        assets_dir: std::env::temp_dir(),
    };
    let time = ManualTime::default();
    let mut render_loop = create(&context)
        .builder
        .clock(Clock::new(time.clone()))
        .build(NullSurface::default(), ManualScheduler::default());
    render_loop.start();
    for &secs in times {
        time.set(secs);
        render_loop.tick().unwrap();
    }
    render_loop
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::{Clock, ManualTime},
        render_loop::{ManualScheduler, TickOutcome},
        surface::NullSurface,
    };
    use std::time::Duration;

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = sketch_names().collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SKETCHES.len());
        assert!(find_sketch("debug").is_some());
        assert!(find_sketch("nope").is_none());
    }

    #[test]
    fn every_sketch_draws_frames() {
        let context = SketchContext {
            viewport: Viewport::default(),
            assets_dir: std::env::temp_dir(),
        };
        for (name, create) in SKETCHES {
            let time = ManualTime::default();
            let scheduler = ManualScheduler::default();
            let mut sketch = create(&context);
            assert!(!sketch.builder.scene_mut().is_empty(), "{name} has an empty scene");
            let mut render_loop = sketch
                .builder
                .clock(Clock::new(time.clone()))
                .build(NullSurface::default(), scheduler.clone());
            render_loop.start();
            for _ in 0..5 {
                assert!(scheduler.fire());
                time.advance(Duration::from_millis(16));
                assert_eq!(render_loop.tick(), Ok(TickOutcome::Drawn), "{name}");
            }
        }
    }

    #[test]
    fn group_children_follow_group_transform() {
        let mut scene = SceneGraph::new();
        let group = add_cube_group(&mut scene);
        assert_eq!(scene.get(group).unwrap().children().len(), 3);
        let right = scene.find("cube_three").unwrap();
        let position = scene.world_position(right).unwrap();
        // Rotated 0.2 rad around Y, so the cube moves slightly along -Z.
        assert!((position.x - 1.5 * 0.2f32.cos()).abs() < 1e-5);
        assert!((position.z + 1.5 * 0.2f32.sin()).abs() < 1e-5);
    }
}
