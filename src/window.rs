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

use std::sync::Arc;
#[cfg(feature = "egui")]
use std::{cell::RefCell, rc::Rc};

use log::{debug, error, info};
use pollster::FutureExt;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

#[cfg(feature = "egui")]
use crate::{support::egui::EguiOverlay, surface::Overlay};
use crate::{
    config::LaunchConfig,
    draw_context::DrawContext,
    render_loop::{FrameScheduler, RenderLoop},
    sketches::{Sketch, SketchBuilder, SketchContext},
    surface::WgpuSurface,
    viewport::Viewport,
};

/// Schedules the next tick as a redraw of the window.
struct WindowScheduler {
    window: Arc<Window>,
}

impl FrameScheduler for WindowScheduler {
    fn request_frame(&mut self) {
        self.window.request_redraw();
    }
}

struct RunningSketch {
    window: Arc<Window>,
    render_loop: RenderLoop,
    #[cfg(feature = "egui")]
    overlay: Option<Rc<RefCell<EguiOverlay>>>,
}

impl RunningSketch {
    fn resize_to_window(&mut self) {
        let size = self.window.inner_size();
        if let Err(err) = self.render_loop.on_resize(
            i64::from(size.width),
            i64::from(size.height),
            self.window.scale_factor(),
        ) {
            debug!("Resize not applied: {err}");
        }
    }

    #[cfg(feature = "egui")]
    fn overlay_consumes(&self, event: &WindowEvent) -> bool {
        let Some(overlay) = &self.overlay else {
            return false;
        };
        let response = overlay.borrow_mut().on_window_event(event);
        if response.repaint {
            self.window.request_redraw();
        }
        response.consumed
    }

    #[cfg(not(feature = "egui"))]
    fn overlay_consumes(&self, _event: &WindowEvent) -> bool {
        false
    }

    #[cfg(feature = "egui")]
    fn overlay_wants_pointer(&self) -> bool {
        self.overlay
            .as_ref()
            .is_some_and(|overlay| overlay.borrow().wants_pointer_input())
    }

    #[cfg(not(feature = "egui"))]
    fn overlay_wants_pointer(&self) -> bool {
        false
    }
}

struct SketchApp {
    title: String,
    sketch: SketchBuilder,
    assets_dir: std::path::PathBuf,
    running: Option<RunningSketch>,
    error: Option<anyhow::Error>,
}

impl SketchApp {
    const DEFAULT_WIDTH: f64 = 800.0;
    const DEFAULT_HEIGHT: f64 = 600.0;

    fn start_sketch(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<RunningSketch> {
        let attributes = Window::default_attributes()
            .with_title(&self.title)
            .with_inner_size(LogicalSize::new(Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT));
        let window = Arc::new(event_loop.create_window(attributes)?);
        let size = window.inner_size();
        let viewport = Viewport::new(
            i64::from(size.width),
            i64::from(size.height),
            window.scale_factor(),
        )
        .unwrap_or_default();
        let draw_context = DrawContext::new(Some(Arc::clone(&window)), Some(viewport.dimensions()))
            .block_on()?;
        let Sketch { builder, params } = (self.sketch)(&SketchContext {
            viewport,
            assets_dir: self.assets_dir.clone(),
        });
        let surface = WgpuSurface::new(draw_context);
        #[cfg(feature = "egui")]
        let (surface, overlay) = match params {
            Some(params) => {
                let overlay = Rc::new(RefCell::new(EguiOverlay::new(
                    surface.context(),
                    Arc::clone(&window),
                    params,
                )));
                let painter: Rc<RefCell<dyn Overlay>> = overlay.clone();
                (surface.with_overlay(painter), Some(overlay))
            }
            None => (surface, None),
        };
        #[cfg(not(feature = "egui"))]
        drop(params);
        let mut render_loop = builder.build(
            surface,
            WindowScheduler {
                window: Arc::clone(&window),
            },
        );
        render_loop.start();
        Ok(RunningSketch {
            window,
            render_loop,
            #[cfg(feature = "egui")]
            overlay,
        })
    }
}

impl ApplicationHandler for SketchApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match self.start_sketch(event_loop) {
            Ok(running) => self.running = Some(running),
            Err(err) => {
                error!("Could not start sketch: {err:#}");
                self.error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(running) = self.running.as_mut() else {
            return;
        };
        if running.overlay_consumes(&event) {
            return;
        }
        if let Some(controls) = running.render_loop.controls_mut() {
            controls.on_window_event(&event);
        }
        match event {
            WindowEvent::CloseRequested => {
                running.render_loop.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                running.resize_to_window();
            }
            WindowEvent::RedrawRequested if running.render_loop.is_frame_pending() => {
                if let Err(err) = running.render_loop.tick() {
                    error!("Render loop failed: {err}");
                    self.error = Some(err.into());
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _id: DeviceId, event: DeviceEvent) {
        let Some(running) = self.running.as_mut() else {
            return;
        };
        if running.overlay_wants_pointer() {
            return;
        }
        if let Some(controls) = running.render_loop.controls_mut() {
            controls.on_mouse_event(&event);
        }
    }
}

/// Opens a window and runs `sketch` until the window is closed.
pub fn run_windowed(config: &LaunchConfig, sketch: SketchBuilder) -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);
    let mut app = SketchApp {
        title: format!("{} - {}", env!("CARGO_PKG_NAME"), config.sketch),
        sketch,
        assets_dir: config.assets_dir.clone(),
        running: None,
        error: None,
    };
    event_loop.run_app(&mut app)?;
    info!("Window closed");
    app.error.map_or(Ok(()), Err)
}
