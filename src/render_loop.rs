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

use std::{cell::Cell, fmt, path::PathBuf, rc::Rc};

use log::{debug, error, info, warn};

use crate::{
    cameras::Camera,
    clock::Clock,
    controls::CameraControls,
    scene::SceneGraph,
    viewport::{Dimensions, Viewport},
};

#[derive(Debug, Clone, PartialEq)]
pub enum LoopError {
    InvalidViewport {
        width: i64,
        height: i64,
        pixel_ratio: f64,
    },
    SurfaceLost(String),
    AssetLoadFailure {
        path: PathBuf,
        reason: String,
    },
}

impl fmt::Display for LoopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidViewport {
                width,
                height,
                pixel_ratio,
            } => write!(f, "invalid viewport {width}x{height} @ {pixel_ratio}"),
            Self::SurfaceLost(reason) => write!(f, "output surface lost: {reason}"),
            Self::AssetLoadFailure { path, reason } => {
                write!(f, "could not load {}: {reason}", path.display())
            }
        }
    }
}

impl std::error::Error for LoopError {}

#[derive(Debug)]
pub enum SurfaceError {
    /// The surface cannot be drawn to anymore.
    Lost(String),
    /// The frame was dropped but the next one may succeed.
    Other(String),
}

pub trait RenderSurface {
    fn resize(&mut self, viewport: &Viewport);
    fn size(&self) -> Dimensions;
    fn pixel_ratio(&self) -> f64;
    fn draw(&mut self, scene: &SceneGraph, camera: &Camera) -> Result<(), SurfaceError>;
}

pub trait FrameScheduler {
    /// Asks the host to call [`RenderLoop::tick`] on the next display refresh.
    fn request_frame(&mut self);
}

/// Scheduler whose requests are collected and fired by the caller.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    requests: Rc<Cell<usize>>,
}

impl ManualScheduler {
    #[must_use]
    pub fn pending(&self) -> usize {
        self.requests.get()
    }
    /// Consumes one pending request, returning `false` if there was none.
    pub fn fire(&self) -> bool {
        let pending = self.requests.get();
        if pending == 0 {
            return false;
        }
        self.requests.set(pending - 1);
        true
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) {
        self.requests.set(self.requests.get() + 1);
    }
}

pub struct FrameContext {
    /// Seconds since the loop started.
    pub elapsed: f64,
    pub index: u64,
}

impl FrameContext {
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn elapsed_f32(&self) -> f32 {
        self.elapsed as f32
    }
}

pub trait FrameUpdate {
    fn update(&mut self, frame: &FrameContext, scene: &mut SceneGraph, camera: &mut Camera);
}

impl<F> FrameUpdate for F
where
    F: FnMut(&FrameContext, &mut SceneGraph, &mut Camera),
{
    fn update(&mut self, frame: &FrameContext, scene: &mut SceneGraph, camera: &mut Camera) {
        self(frame, scene, camera);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Drawn,
    Idle,
}

pub struct RenderLoopBuilder {
    viewport: Viewport,
    camera: Camera,
    clock: Clock,
    scene: SceneGraph,
    controls: Option<Box<dyn CameraControls>>,
    updates: Vec<Box<dyn FrameUpdate>>,
}

impl RenderLoopBuilder {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            camera: Camera::default(),
            clock: Clock::default(),
            scene: SceneGraph::new(),
            controls: None,
            updates: Vec::new(),
        }
    }
    #[must_use]
    pub fn camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }
    #[must_use]
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
    #[must_use]
    pub fn scene(mut self, scene: SceneGraph) -> Self {
        self.scene = scene;
        self
    }
    #[must_use]
    pub fn controls(mut self, controls: impl CameraControls + 'static) -> Self {
        self.controls = Some(Box::new(controls));
        self
    }
    /// Registers a per-tick update. Updates run in registration order.
    #[must_use]
    pub fn update(mut self, update: impl FrameUpdate + 'static) -> Self {
        self.updates.push(Box::new(update));
        self
    }
    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }
    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    pub fn build(
        self,
        surface: impl RenderSurface + 'static,
        scheduler: impl FrameScheduler + 'static,
    ) -> RenderLoop {
        let Self {
            viewport,
            mut camera,
            clock,
            scene,
            controls,
            updates,
        } = self;
        let mut surface: Box<dyn RenderSurface> = Box::new(surface);
        camera.resize_screen(viewport.dimensions());
        surface.resize(&viewport);
        RenderLoop {
            state: LoopState::Stopped,
            viewport,
            camera,
            clock,
            scene,
            surface,
            scheduler: Box::new(scheduler),
            controls,
            updates,
            frame_pending: false,
            frame_count: 0,
        }
    }
}

/// Drives one draw of the scene per scheduled frame and keeps the camera
/// projection and the surface in sync with the viewport.
pub struct RenderLoop {
    state: LoopState,
    viewport: Viewport,
    camera: Camera,
    clock: Clock,
    scene: SceneGraph,
    surface: Box<dyn RenderSurface>,
    scheduler: Box<dyn FrameScheduler>,
    controls: Option<Box<dyn CameraControls>>,
    updates: Vec<Box<dyn FrameUpdate>>,
    frame_pending: bool,
    frame_count: u64,
}

impl RenderLoop {
    pub fn start(&mut self) {
        if self.state == LoopState::Running {
            debug!("Render loop already running");
            return;
        }
        info!("Starting render loop");
        self.state = LoopState::Running;
        self.clock.start();
        self.request_frame();
    }

    pub fn stop(&mut self) {
        if self.state == LoopState::Running {
            info!("Stopping render loop after {} frames", self.frame_count);
        }
        self.state = LoopState::Stopped;
    }

    pub fn tick(&mut self) -> Result<TickOutcome, LoopError> {
        self.frame_pending = false;
        if self.state == LoopState::Stopped {
            return Ok(TickOutcome::Idle);
        }
        let frame = FrameContext {
            elapsed: self.clock.sample(),
            index: self.frame_count,
        };
        for update in &mut self.updates {
            update.update(&frame, &mut self.scene, &mut self.camera);
        }
        if let Some(controls) = self.controls.as_mut() {
            controls.update(&mut self.camera);
        }
        match self.surface.draw(&self.scene, &self.camera) {
            Ok(()) => {}
            Err(SurfaceError::Other(reason)) => warn!("Frame {} dropped: {reason}", frame.index),
            Err(SurfaceError::Lost(reason)) => {
                error!("Surface lost, stopping render loop: {reason}");
                self.state = LoopState::Stopped;
                return Err(LoopError::SurfaceLost(reason));
            }
        }
        self.frame_count += 1;
        if self.state == LoopState::Running {
            self.request_frame();
        }
        Ok(TickOutcome::Drawn)
    }

    pub fn on_resize(&mut self, width: i64, height: i64, pixel_ratio: f64) -> Result<(), LoopError> {
        let viewport = Viewport::new(width, height, pixel_ratio).inspect_err(|err| {
            warn!("Ignoring resize: {err}");
        })?;
        self.viewport = viewport;
        self.camera.resize_screen(viewport.dimensions());
        self.surface.resize(&viewport);
        debug!(
            "Resized to {}x{} @ {}",
            viewport.width(),
            viewport.height(),
            viewport.pixel_ratio()
        );
        Ok(())
    }

    fn request_frame(&mut self) {
        if self.frame_pending {
            return;
        }
        self.frame_pending = true;
        self.scheduler.request_frame();
    }

    #[must_use]
    pub fn state(&self) -> LoopState {
        self.state
    }
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }
    #[must_use]
    pub fn is_frame_pending(&self) -> bool {
        self.frame_pending
    }
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }
    #[must_use]
    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }
    #[must_use]
    pub fn surface(&self) -> &dyn RenderSurface {
        self.surface.as_ref()
    }
    pub fn controls_mut(&mut self) -> Option<&mut (dyn CameraControls + 'static)> {
        self.controls.as_deref_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::NullSurface;

    fn running_loop() -> (RenderLoop, ManualScheduler) {
        let scheduler = ManualScheduler::default();
        let mut render_loop =
            RenderLoopBuilder::new(Viewport::default()).build(NullSurface::default(), scheduler.clone());
        render_loop.start();
        (render_loop, scheduler)
    }

    #[test]
    fn start_requests_a_single_frame() {
        let (mut render_loop, scheduler) = running_loop();
        render_loop.start();
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn tick_while_stopped_is_a_noop() {
        let scheduler = ManualScheduler::default();
        let mut render_loop =
            RenderLoopBuilder::new(Viewport::default()).build(NullSurface::default(), scheduler.clone());
        assert_eq!(render_loop.tick(), Ok(TickOutcome::Idle));
        assert_eq!(render_loop.frame_count(), 0);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn each_tick_requests_the_next_one() {
        let (mut render_loop, scheduler) = running_loop();
        for _ in 0..3 {
            assert!(scheduler.fire());
            assert_eq!(render_loop.tick(), Ok(TickOutcome::Drawn));
            assert_eq!(scheduler.pending(), 1);
        }
        assert_eq!(render_loop.frame_count(), 3);
    }

    #[test]
    fn rejected_resize_keeps_viewport() {
        let (mut render_loop, _) = running_loop();
        let before = *render_loop.viewport();
        assert!(render_loop.on_resize(0, 600, 1.0).is_err());
        assert_eq!(*render_loop.viewport(), before);
    }

    #[test]
    fn error_messages_name_the_problem() {
        let err = LoopError::InvalidViewport {
            width: 0,
            height: 600,
            pixel_ratio: 1.0,
        };
        assert_eq!(err.to_string(), "invalid viewport 0x600 @ 1");
    }
}
