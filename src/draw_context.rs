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

use std::{marker::PhantomData, rc::Rc, sync::Arc};

use anyhow::anyhow;
use bytemuck::NoUninit;
use log::debug;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::viewport::Dimensions;

pub struct Uniform<T> {
    buffer: wgpu::Buffer,
    queue: Rc<wgpu::Queue>,
    value_type: PhantomData<T>,
}

impl<T: NoUninit> Uniform<T> {
    pub fn new(context: &DrawContext, value: T) -> Self {
        let buffer = context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Uniform Buffer"),
                contents: bytemuck::bytes_of(&value),
                usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::UNIFORM,
            });
        Self {
            buffer,
            queue: Rc::clone(&context.queue),
            value_type: PhantomData,
        }
    }

    pub fn write_uniform(&mut self, value: T) {
        self.queue
            .write_buffer(&self.buffer, 0, bytemuck::bytes_of(&value));
    }

    pub fn binding_resource(&self) -> wgpu::BindingResource<'_> {
        self.buffer.as_entire_binding()
    }
}

fn create_target_texture(
    device: &wgpu::Device,
    label: &str,
    format: wgpu::TextureFormat,
    dimensions: Dimensions,
    sample_count: u32,
    usage: wgpu::TextureUsages,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: dimensions.width,
            height: dimensions.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage,
        view_formats: &[],
    })
}

/// Where finished frames go.
enum DrawTarget {
    Window(wgpu::Surface<'static>),
    /// Headless runs render into a plain texture nobody reads back.
    Offscreen(wgpu::Texture),
}

impl DrawTarget {
    fn offscreen(device: &wgpu::Device, dimensions: Dimensions) -> Self {
        Self::Offscreen(create_target_texture(
            device,
            "Offscreen Target",
            DrawContext::OFFSCREEN_FORMAT,
            dimensions,
            1,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        ))
    }
}

/// Depth buffer, plus the multisampled color buffer resolved into the target
/// when MSAA is on. Both follow the target size.
struct Attachments {
    depth: wgpu::Texture,
    multisample: Option<wgpu::Texture>,
}

impl Attachments {
    fn new(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration, sample_count: u32) -> Self {
        let dimensions = Dimensions {
            width: config.width,
            height: config.height,
        };
        Self {
            depth: create_target_texture(
                device,
                "Depth Texture",
                DrawContext::DEPTH_FORMAT,
                dimensions,
                sample_count,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
            ),
            multisample: (sample_count > 1).then(|| {
                create_target_texture(
                    device,
                    "Multisample Texture",
                    config.format,
                    dimensions,
                    sample_count,
                    wgpu::TextureUsages::RENDER_ATTACHMENT,
                )
            }),
        }
    }
}

/// GPU device, queue and output target (window surface, or an offscreen
/// texture when there is no window).
pub struct DrawContext {
    target: DrawTarget,
    attachments: Attachments,
    sample_count: u32,
    pub queue: Rc<wgpu::Queue>,
    pub device: wgpu::Device,
    pub surface_config: wgpu::SurfaceConfiguration,
}

impl DrawContext {
    const FALLBACK_DIMENSIONS: Dimensions = Dimensions {
        width: 800,
        height: 600,
    };
    const SAMPLE_COUNT: u32 = 4;
    const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;
    const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    // winit reports a zero-sized window on some platforms at startup, hence the explicit dimensions.
    pub async fn new(
        window: Option<Arc<Window>>,
        dimensions: Option<Dimensions>,
    ) -> anyhow::Result<Self> {
        let requested = dimensions
            .or_else(|| {
                window.as_ref().map(|window| {
                    let size = window.inner_size();
                    Dimensions {
                        width: size.width,
                        height: size.height,
                    }
                })
            })
            .unwrap_or(Self::FALLBACK_DIMENSIONS);
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = window
            .map(|window| instance.create_surface(window))
            .transpose()?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: surface.as_ref(),
            })
            .await
            .ok_or_else(|| anyhow!("Could not create WebGPU adapter"))?;
        debug!("{:?}", adapter.get_info());
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device Descriptor"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await?;
        let dimensions = requested.clamped(device.limits().max_texture_dimension_2d);
        let format = match &surface {
            Some(surface) => {
                let formats = surface.get_capabilities(&adapter).formats;
                formats
                    .iter()
                    .copied()
                    .find(|format| format.is_srgb())
                    .or_else(|| formats.first().copied())
                    .ok_or_else(|| anyhow!("Surface has no supported format"))?
            }
            None => Self::OFFSCREEN_FORMAT,
        };
        let surface_config = wgpu::SurfaceConfiguration {
            desired_maximum_frame_latency: 2,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: dimensions.width,
            height: dimensions.height,
            view_formats: vec![],
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            present_mode: wgpu::PresentMode::Fifo,
        };
        let target = match surface {
            Some(surface) => {
                surface.configure(&device, &surface_config);
                DrawTarget::Window(surface)
            }
            None => DrawTarget::offscreen(&device, dimensions),
        };
        let attachments = Attachments::new(&device, &surface_config, Self::SAMPLE_COUNT);
        Ok(Self {
            target,
            attachments,
            sample_count: Self::SAMPLE_COUNT,
            queue: Rc::new(queue),
            device,
            surface_config,
        })
    }

    #[must_use]
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Largest width or height the target accepts.
    #[must_use]
    pub fn max_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    pub fn create_shader_module(&self, wgsl_shader: &str) -> wgpu::ShaderModule {
        self.device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: None,
                source: wgpu::ShaderSource::Wgsl(wgsl_shader.into()),
            })
    }

    /// Sizes beyond [`Self::max_dimension`] are clamped.
    pub fn resize(&mut self, dimensions: Dimensions) {
        let dimensions = dimensions.clamped(self.max_dimension());
        self.surface_config.width = dimensions.width;
        self.surface_config.height = dimensions.height;
        self.reconfigure();
    }

    /// Applies the current configuration again, e.g. after an outdated surface.
    pub fn reconfigure(&mut self) {
        if let DrawTarget::Window(surface) = &self.target {
            surface.configure(&self.device, &self.surface_config);
        } else {
            self.target = DrawTarget::offscreen(&self.device, self.surface_dimensions());
        }
        self.attachments = Attachments::new(&self.device, &self.surface_config, self.sample_count);
    }

    #[must_use]
    pub fn surface_dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.surface_config.width,
            height: self.surface_config.height,
        }
    }

    /// Records one render pass through `draw`, then submits and presents it.
    pub fn render_scene<C>(&self, draw: C) -> Result<(), wgpu::SurfaceError>
    where
        C: FnOnce(wgpu::RenderPass<'static>),
    {
        let default_view = wgpu::TextureViewDescriptor::default();
        let (frame, target_view) = match &self.target {
            DrawTarget::Window(surface) => {
                let frame = surface.get_current_texture()?;
                let view = frame.texture.create_view(&default_view);
                (Some(frame), view)
            }
            DrawTarget::Offscreen(texture) => (None, texture.create_view(&default_view)),
        };
        let depth_view = self.attachments.depth.create_view(&default_view);
        let multisample_view = self
            .attachments
            .multisample
            .as_ref()
            .map(|texture| texture.create_view(&default_view));
        let ops = wgpu::Operations {
            load: wgpu::LoadOp::Clear(Self::CLEAR_COLOR),
            store: wgpu::StoreOp::Store,
        };
        let color_attachment = match &multisample_view {
            Some(view) => wgpu::RenderPassColorAttachment {
                view,
                resolve_target: Some(&target_view),
                ops,
            },
            None => wgpu::RenderPassColorAttachment {
                view: &target_view,
                resolve_target: None,
                ops,
            },
        };
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });
        let render_pass = encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(color_attachment)],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            })
            .forget_lifetime();
        draw(render_pass);
        self.queue.submit([encoder.finish()]);
        if let Some(frame) = frame {
            frame.present();
        }
        Ok(())
    }
}
