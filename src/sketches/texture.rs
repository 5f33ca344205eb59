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

use anyhow::{Context, bail};
use cgmath::Point3;
use log::{info, warn};

use crate::{
    assets::{AssetHandle, AssetLoader, LoadingManager},
    cameras::Camera,
    controls::OrbitControls,
    render_loop::{FrameContext, FrameUpdate, RenderLoopBuilder},
    scene::{Geometry, Material, ObjectId, SceneGraph, SceneNode},
};

use super::{Sketch, SketchContext, camera_at};

const COLOR_ASSET: &str = "textures/minecraft.hex";
const PLACEHOLDER_COLOR: [f32; 3] = [0.5, 0.5, 0.5];

/// Parses `#rrggbb` into linear channel values in `0.0..=1.0`.
fn parse_hex_color(text: &str) -> anyhow::Result<[f32; 3]> {
    let hex = text.trim().trim_start_matches('#');
    if hex.len() != 6 {
        bail!("expected #rrggbb, got {text:?}");
    }
    let mut color = [0.0; 3];
    for (channel, value) in color.iter_mut().enumerate() {
        let digits = hex
            .get(channel * 2..channel * 2 + 2)
            .context("color is not ASCII")?;
        *value = f32::from(u8::from_str_radix(digits, 16)?) / 255.0;
    }
    Ok(color)
}

/// Waits for the color asset and paints the cube with it once it arrives.
struct ApplyLoadedColor {
    loader: AssetLoader,
    pending: Option<AssetHandle>,
    object: ObjectId,
}

impl ApplyLoadedColor {
    fn apply(&mut self, scene: &mut SceneGraph, data: &[u8]) -> anyhow::Result<()> {
        let color = parse_hex_color(std::str::from_utf8(data)?)?;
        let material = scene
            .get_mut(self.object)
            .and_then(|node| node.material_mut())
            .context("textured cube is gone")?;
        material.color = color;
        info!("Applied loaded color {color:?}");
        Ok(())
    }
}

impl FrameUpdate for ApplyLoadedColor {
    fn update(&mut self, _frame: &FrameContext, scene: &mut SceneGraph, _camera: &mut Camera) {
        let Some(handle) = self.pending else {
            return;
        };
        self.loader.poll();
        let Some(result) = self.loader.take(handle) else {
            return;
        };
        self.pending = None;
        let applied = result
            .map_err(anyhow::Error::from)
            .and_then(|data| self.apply(scene, &data));
        if let Err(err) = applied {
            warn!("Keeping placeholder color: {err:#}");
        }
    }
}

pub fn create(context: &SketchContext) -> Sketch {
    with_manager(context, LoadingManager::default())
}

fn with_manager(context: &SketchContext, manager: LoadingManager) -> Sketch {
    let mut builder = RenderLoopBuilder::new(context.viewport)
        .camera(camera_at(1.0, 1.0, 1.0, Point3::new(0.0, 0.0, 0.0)))
        .controls(OrbitControls::new(Point3::new(0.0, 0.0, 0.0)).with_damping());
    let cube = builder.scene_mut().add(SceneNode::mesh(
        "cube",
        Geometry::Box,
        Material::solid(PLACEHOLDER_COLOR),
    ));
    let mut loader = AssetLoader::new(&context.assets_dir, manager);
    let pending = Some(loader.load(COLOR_ASSET));
    builder
        .update(ApplyLoadedColor {
            loader,
            pending,
            object: cube,
        })
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assets::LoadEvent,
        render_loop::{ManualScheduler, RenderLoop},
        surface::NullSurface,
        viewport::Viewport,
    };
    use std::{cell::RefCell, path::Path, rc::Rc, thread, time::Duration};

    fn start_sketch(assets_dir: &Path) -> RenderLoop {
        start_sketch_with(assets_dir, LoadingManager::default())
    }

    fn start_sketch_with(assets_dir: &Path, manager: LoadingManager) -> RenderLoop {
        let context = SketchContext {
            viewport: Viewport::default(),
            assets_dir: assets_dir.to_owned(),
        };
        let mut render_loop = with_manager(&context, manager)
            .builder
            .build(NullSurface::default(), ManualScheduler::default());
        render_loop.start();
        render_loop
    }

    fn cube_color(render_loop: &RenderLoop) -> [f32; 3] {
        let scene = render_loop.scene();
        let cube = scene.find("cube").unwrap();
        scene.get(cube).unwrap().material().unwrap().color
    }

    #[test]
    fn loaded_color_replaces_placeholder() {
        let dir = std::env::temp_dir().join(format!("sketchbook-texture-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("textures")).unwrap();
        std::fs::write(dir.join(COLOR_ASSET), "#0000ff").unwrap();
        let mut render_loop = start_sketch(&dir);
        assert_eq!(cube_color(&render_loop), PLACEHOLDER_COLOR);
        for _ in 0..500 {
            render_loop.tick().unwrap();
            if cube_color(&render_loop) != PLACEHOLDER_COLOR {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(cube_color(&render_loop), [0.0, 0.0, 1.0]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_asset_reports_error_and_keeps_placeholder() {
        let dir = std::env::temp_dir().join("sketchbook-texture-missing");
        let events = Rc::new(RefCell::new(Vec::new()));
        let recorded = Rc::clone(&events);
        let manager = LoadingManager::with_listener(move |event| {
            recorded.borrow_mut().push(event.clone());
        });
        let mut render_loop = start_sketch_with(&dir, manager);
        for _ in 0..500 {
            render_loop.tick().unwrap();
            if events.borrow().contains(&LoadEvent::Loaded) {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }

        let events = events.borrow();
        assert!(
            matches!(events.first(), Some(LoadEvent::Started { total: 1, .. })),
            "{events:?}"
        );
        let error = events
            .iter()
            .position(|event| matches!(event, LoadEvent::Error { path, .. } if path.ends_with(COLOR_ASSET)))
            .expect("an error event for the color asset");
        let loaded = events
            .iter()
            .position(|event| *event == LoadEvent::Loaded)
            .expect("a final loaded event");
        assert!(error < loaded, "{events:?}");
        assert_eq!(cube_color(&render_loop), PLACEHOLDER_COLOR);
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_hex_color("#ff0000\n").unwrap(), [1.0, 0.0, 0.0]);
        let color = parse_hex_color("6aa84f").unwrap();
        assert!((color[1] - 168.0 / 255.0).abs() < 1e-6);
        assert!(parse_hex_color("#fff").is_err());
        assert!(parse_hex_color("#gg0000").is_err());
    }
}
