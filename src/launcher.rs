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

use std::time::Duration;

use anyhow::anyhow;
use log::{info, warn};
use pollster::FutureExt;

use crate::{
    clock::{Clock, ManualTime},
    config::LaunchConfig,
    draw_context::DrawContext,
    render_loop::{ManualScheduler, RenderLoop, RenderLoopBuilder},
    sketches::{self, Sketch, SketchBuilder, SketchContext},
    surface::{NullSurface, WgpuSurface},
    viewport::Viewport,
    window::run_windowed,
};

const GLOBAL_LOG_FILTER: log::LevelFilter = log::LevelFilter::Info;
const HEADLESS_FRAME_STEP: Duration = Duration::from_micros(16_667);

pub fn launch_app(config: &LaunchConfig) -> anyhow::Result<()> {
    init_log()?;
    info!("Init app");
    let sketch = sketches::find_sketch(&config.sketch).ok_or_else(|| {
        anyhow!(
            "Unknown sketch {:?}, expected one of: {}",
            config.sketch,
            sketches::sketch_names().collect::<Vec<_>>().join(", ")
        )
    })?;
    info!("Running sketch {}", config.sketch);
    if config.headless {
        info!("Running in headless mode");
        run_headless(config, sketch)
    } else {
        run_windowed(config, sketch)
    }
}

fn init_log() -> anyhow::Result<()> {
    use fern::colors::{Color, ColoredLevelConfig};
    let colors = ColoredLevelConfig::new()
        .info(Color::Blue)
        .debug(Color::Green);
    fern::Dispatch::new()
        .level(GLOBAL_LOG_FILTER)
        .level_for(env!("CARGO_CRATE_NAME"), log::LevelFilter::Debug)
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}:{}] {}",
                chrono::Local::now().format("[%H:%M:%S]"),
                colors.color(record.level()),
                record.target(),
                record.line().unwrap_or_default(),
                message
            ));
        })
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}

/// Offscreen rendering when an adapter is available, otherwise no drawing at all.
fn build_headless(builder: RenderLoopBuilder, scheduler: &ManualScheduler) -> RenderLoop {
    let dimensions = builder.viewport().dimensions();
    match DrawContext::new(None, Some(dimensions)).block_on() {
        Ok(draw_context) => builder.build(WgpuSurface::new(draw_context), scheduler.clone()),
        Err(err) => {
            warn!("No GPU available ({err:#}), frames will not be drawn");
            builder.build(NullSurface::default(), scheduler.clone())
        }
    }
}

/// Runs a fixed number of frames on a simulated 60 Hz clock.
fn run_headless(config: &LaunchConfig, sketch: SketchBuilder) -> anyhow::Result<()> {
    let time = ManualTime::default();
    let scheduler = ManualScheduler::default();
    let Sketch { builder, .. } = sketch(&SketchContext {
        viewport: Viewport::default(),
        assets_dir: config.assets_dir.clone(),
    });
    let mut render_loop = build_headless(builder.clock(Clock::new(time.clone())), &scheduler);
    render_loop.start();
    for _ in 0..config.headless_frames {
        if !scheduler.fire() {
            break;
        }
        time.advance(HEADLESS_FRAME_STEP);
        render_loop.tick()?;
    }
    render_loop.stop();
    info!("Headless run finished after {} frames", render_loop.frame_count());
    Ok(())
}
