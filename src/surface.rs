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

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use cgmath::SquareMatrix;
use log::{debug, warn};
use wgpu::util::DeviceExt;

use crate::{
    cameras::Camera,
    draw_context::{DrawContext, Uniform},
    primitives::{self, GeometryData, Vertex},
    render_loop::{RenderSurface, SurfaceError},
    scene::{Geometry, NodeKind, ObjectId, SceneGraph},
    viewport::{Dimensions, Viewport},
};

const SCENE_SHADER: &str = include_str!("shaders/scene.wgsl");

/// Surface that draws nothing and counts the draw calls it receives.
#[derive(Default)]
pub struct NullSurface {
    size: Option<Dimensions>,
    pixel_ratio: f64,
    draw_count: u64,
}

impl NullSurface {
    #[must_use]
    pub fn draw_count(&self) -> u64 {
        self.draw_count
    }
}

impl RenderSurface for NullSurface {
    fn resize(&mut self, viewport: &Viewport) {
        self.size = Some(viewport.dimensions());
        self.pixel_ratio = viewport.pixel_ratio();
    }
    fn size(&self) -> Dimensions {
        self.size.unwrap_or_else(|| Viewport::default().dimensions())
    }
    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }
    fn draw(&mut self, scene: &SceneGraph, _camera: &Camera) -> Result<(), SurfaceError> {
        self.draw_count += 1;
        debug!(
            "Null draw #{} of {} nodes",
            self.draw_count,
            scene.draw_items().len()
        );
        Ok(())
    }
}

/// Something painted on top of the scene, inside the same render pass.
pub trait Overlay {
    fn draw(
        &mut self,
        context: &DrawContext,
        pixel_ratio: f64,
        render_pass: &mut wgpu::RenderPass<'static>,
    );
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct ObjectUniform {
    model: [[f32; 4]; 4],
    color: [f32; 4],
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum MeshKey {
    Geometry(Geometry),
    Axes(u32),
}

struct GpuMesh {
    vertices: wgpu::Buffer,
    triangles: Option<(wgpu::Buffer, u32)>,
    edges: (wgpu::Buffer, u32),
}

impl GpuMesh {
    fn new(device: &wgpu::Device, data: &GeometryData) -> Self {
        let index_buffer = |indices: &[u16]| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        };
        let count = |indices: &[u16]| u32::try_from(indices.len()).expect("Value should fit in u32");
        Self {
            vertices: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(&data.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            triangles: (!data.triangles.is_empty())
                .then(|| (index_buffer(&data.triangles), count(&data.triangles))),
            edges: (index_buffer(&data.edges), count(&data.edges)),
        }
    }
}

struct GpuObject {
    uniform: Uniform<ObjectUniform>,
    bind_group: wgpu::BindGroup,
}

struct DrawCommand {
    id: ObjectId,
    mesh: MeshKey,
    wireframe: bool,
}

/// Draws the scene graph through wgpu: one pipeline for filled triangles and
/// one for line lists (wireframes and axes helpers).
pub struct WgpuSurface {
    context: DrawContext,
    pixel_ratio: f64,
    camera_uniform: Uniform<[[f32; 4]; 4]>,
    camera_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    fill_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    meshes: HashMap<MeshKey, GpuMesh>,
    objects: HashMap<ObjectId, GpuObject>,
    overlay: Option<Rc<RefCell<dyn Overlay>>>,
}

fn uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn create_pipeline(
    context: &DrawContext,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    topology: wgpu::PrimitiveTopology,
) -> wgpu::RenderPipeline {
    context
        .device
        .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            cache: None,
            label: Some("Scene Pipeline"),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: None,
                buffers: &[Vertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: None,
                targets: &[Some(wgpu::ColorTargetState {
                    format: context.surface_config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Planes and the triangle are seen from both sides.
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DrawContext::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: context.sample_count(),
                ..Default::default()
            },
            multiview: None,
        })
}

impl WgpuSurface {
    #[must_use]
    pub fn new(context: DrawContext) -> Self {
        let shader = context.create_shader_module(SCENE_SHADER);
        let camera_layout = uniform_layout(&context.device, "Camera Bind Group Layout");
        let object_layout = uniform_layout(&context.device, "Object Bind Group Layout");
        let camera_uniform = Uniform::new(&context, cgmath::Matrix4::identity().into());
        let camera_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Camera Bind Group"),
                layout: &camera_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_uniform.binding_resource(),
                }],
            });
        let pipeline_layout =
            context
                .device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("Scene Pipeline Layout"),
                    bind_group_layouts: &[&camera_layout, &object_layout],
                    push_constant_ranges: &[],
                });
        let fill_pipeline = create_pipeline(
            &context,
            &shader,
            &pipeline_layout,
            wgpu::PrimitiveTopology::TriangleList,
        );
        let line_pipeline = create_pipeline(
            &context,
            &shader,
            &pipeline_layout,
            wgpu::PrimitiveTopology::LineList,
        );
        Self {
            pixel_ratio: 1.0,
            camera_uniform,
            camera_bind_group,
            object_layout,
            fill_pipeline,
            line_pipeline,
            meshes: HashMap::new(),
            objects: HashMap::new(),
            overlay: None,
            context,
        }
    }

    #[must_use]
    pub fn with_overlay(mut self, overlay: Rc<RefCell<dyn Overlay>>) -> Self {
        self.overlay = Some(overlay);
        self
    }

    #[must_use]
    pub fn context(&self) -> &DrawContext {
        &self.context
    }

    fn prepare(&mut self, scene: &SceneGraph, camera: &Camera) -> Vec<DrawCommand> {
        self.camera_uniform
            .write_uniform(camera.get_camera_matrix().into());
        let items = scene.draw_items();
        self.objects
            .retain(|id, _| scene.get(*id).is_some());
        let mut commands = Vec::with_capacity(items.len());
        for item in items {
            let (mesh, wireframe, color) = match &item.node.kind {
                NodeKind::Group => continue,
                NodeKind::Mesh(mesh) => {
                    let material = &mesh.material;
                    let [r, g, b] = material.color;
                    (
                        MeshKey::Geometry(mesh.geometry),
                        material.wireframe,
                        [r, g, b, material.opacity.clamp(0.0, 1.0)],
                    )
                }
                NodeKind::AxesHelper { size } => {
                    (MeshKey::Axes(size.to_bits()), true, [1.0, 1.0, 1.0, 1.0])
                }
            };
            let device = &self.context.device;
            self.meshes.entry(mesh).or_insert_with(|| {
                let data = match mesh {
                    MeshKey::Geometry(geometry) => primitives::geometry_data(geometry),
                    MeshKey::Axes(bits) => primitives::axes_data(f32::from_bits(bits)),
                };
                GpuMesh::new(device, &data)
            });
            let value = ObjectUniform {
                model: item.world.into(),
                color,
            };
            if let Some(object) = self.objects.get_mut(&item.id) {
                object.uniform.write_uniform(value);
            } else {
                let uniform = Uniform::new(&self.context, value);
                let bind_group = self
                    .context
                    .device
                    .create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some("Object Bind Group"),
                        layout: &self.object_layout,
                        entries: &[wgpu::BindGroupEntry {
                            binding: 0,
                            resource: uniform.binding_resource(),
                        }],
                    });
                self.objects
                    .insert(item.id, GpuObject { uniform, bind_group });
            }
            commands.push(DrawCommand {
                id: item.id,
                mesh,
                wireframe,
            });
        }
        commands
    }
}

impl RenderSurface for WgpuSurface {
    fn resize(&mut self, viewport: &Viewport) {
        self.pixel_ratio = viewport.pixel_ratio();
        let dimensions = viewport.dimensions().clamped(self.context.max_dimension());
        if dimensions != viewport.dimensions() {
            warn!(
                "Viewport {}x{} exceeds the device limit, drawing at {}x{}",
                viewport.width(),
                viewport.height(),
                dimensions.width,
                dimensions.height
            );
        }
        if self.context.surface_dimensions() != dimensions {
            self.context.resize(dimensions);
        }
    }

    fn size(&self) -> Dimensions {
        self.context.surface_dimensions()
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn draw(&mut self, scene: &SceneGraph, camera: &Camera) -> Result<(), SurfaceError> {
        let commands = self.prepare(scene, camera);
        let result = self.context.render_scene(|mut render_pass| {
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            for command in &commands {
                let (Some(mesh), Some(object)) =
                    (self.meshes.get(&command.mesh), self.objects.get(&command.id))
                else {
                    continue;
                };
                let (pipeline, (indices, count)) = match (&mesh.triangles, command.wireframe) {
                    (Some(triangles), false) => (&self.fill_pipeline, triangles),
                    _ => (&self.line_pipeline, &mesh.edges),
                };
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(1, &object.bind_group, &[]);
                render_pass.set_vertex_buffer(0, mesh.vertices.slice(..));
                render_pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..*count, 0, 0..1);
            }
            if let Some(overlay) = &self.overlay {
                overlay
                    .borrow_mut()
                    .draw(&self.context, self.pixel_ratio, &mut render_pass);
            }
        });
        match result {
            Ok(()) => Ok(()),
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Surface texture acquisition timed out, skipping frame");
                Ok(())
            }
            Err(wgpu::SurfaceError::Outdated) => {
                warn!("Surface outdated, reconfiguring");
                self.context.reconfigure();
                Ok(())
            }
            Err(err @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::OutOfMemory)) => {
                Err(SurfaceError::Lost(err.to_string()))
            }
            Err(err) => Err(SurfaceError::Other(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Material, SceneNode};

    #[test]
    fn null_surface_tracks_viewport() {
        let mut surface = NullSurface::default();
        let viewport = Viewport::new(1024, 768, 2.0).unwrap();
        surface.resize(&viewport);
        assert_eq!(
            surface.size(),
            Dimensions {
                width: 1024,
                height: 768
            }
        );
        assert!((surface.pixel_ratio() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn null_surface_counts_draws() {
        let mut surface = NullSurface::default();
        let mut scene = SceneGraph::new();
        scene.add(SceneNode::mesh("cube", Geometry::Box, Material::default()));
        for _ in 0..3 {
            surface.draw(&scene, &Camera::default()).unwrap();
        }
        assert_eq!(surface.draw_count(), 3);
    }
}
