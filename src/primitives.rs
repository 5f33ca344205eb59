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

use cgmath::{Vector3, vec3};

use crate::scene::Geometry;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    #[must_use]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

pub struct GeometryData {
    pub vertices: Vec<Vertex>,
    /// Triangle list indices.
    pub triangles: Vec<u16>,
    /// Line list indices.
    pub edges: Vec<u16>,
}

pub const COLOR_WHITE: [f32; 3] = [1.0, 1.0, 1.0];
pub const COLOR_RED: [f32; 3] = [1.0, 0.0, 0.0];
pub const COLOR_GREEN: [f32; 3] = [0.0, 1.0, 0.0];
pub const COLOR_BLUE: [f32; 3] = [0.0, 0.0, 1.0];

// Faces as (normal, u, v) with u x v == normal, so corners go counter-clockwise
// when seen from outside.
#[rustfmt::skip]
const BOX_FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([ 1.,  0.,  0.], [0., 1., 0.], [0., 0., 1.]),
    ([-1.,  0.,  0.], [0., 0., 1.], [0., 1., 0.]),
    ([ 0.,  1.,  0.], [0., 0., 1.], [1., 0., 0.]),
    ([ 0., -1.,  0.], [1., 0., 0.], [0., 0., 1.]),
    ([ 0.,  0.,  1.], [1., 0., 0.], [0., 1., 0.]),
    ([ 0.,  0., -1.], [0., 1., 0.], [1., 0., 0.]),
];
const BOX_FACE_SHADES: [f32; 6] = [1.0, 0.6, 0.9, 0.5, 0.8, 0.7];

fn quad(vertices: &mut Vec<Vertex>, triangles: &mut Vec<u16>, edges: &mut Vec<u16>, corners: [Vector3<f32>; 4], shade: f32) {
    #[allow(clippy::cast_possible_truncation)]
    let base = vertices.len() as u16;
    vertices.extend(corners.iter().map(|corner| Vertex {
        position: (*corner).into(),
        color: [shade; 3],
    }));
    triangles.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    edges.extend([base, base + 1, base + 1, base + 2, base + 2, base + 3, base + 3, base]);
}

fn unit_box() -> GeometryData {
    let (mut vertices, mut triangles, mut edges) = (Vec::new(), Vec::new(), Vec::new());
    for ((normal, u, v), shade) in BOX_FACES.iter().zip(BOX_FACE_SHADES) {
        let (n, u, v) = (
            Vector3::from(*normal) * 0.5,
            Vector3::from(*u) * 0.5,
            Vector3::from(*v) * 0.5,
        );
        let corners = [n - u - v, n + u - v, n + u + v, n - u + v];
        quad(&mut vertices, &mut triangles, &mut edges, corners, shade);
    }
    GeometryData {
        vertices,
        triangles,
        edges,
    }
}

fn unit_plane() -> GeometryData {
    let (mut vertices, mut triangles, mut edges) = (Vec::new(), Vec::new(), Vec::new());
    let corners = [
        vec3(-0.5, -0.5, 0.0),
        vec3(0.5, -0.5, 0.0),
        vec3(0.5, 0.5, 0.0),
        vec3(-0.5, 0.5, 0.0),
    ];
    quad(&mut vertices, &mut triangles, &mut edges, corners, 1.0);
    GeometryData {
        vertices,
        triangles,
        edges,
    }
}

#[rustfmt::skip]
const TRIANGLE_GEOMETRY: [[f32; 3]; 3] = [
    [0., 0., 0.],
    [0., 1., 0.],
    [1., 0., 0.],
];

fn triangle() -> GeometryData {
    GeometryData {
        vertices: TRIANGLE_GEOMETRY
            .iter()
            .map(|position| Vertex {
                position: *position,
                color: COLOR_WHITE,
            })
            .collect(),
        triangles: vec![0, 1, 2],
        edges: vec![0, 1, 1, 2, 2, 0],
    }
}

#[must_use]
pub fn geometry_data(geometry: Geometry) -> GeometryData {
    match geometry {
        Geometry::Box => unit_box(),
        Geometry::Plane => unit_plane(),
        Geometry::Triangle => triangle(),
    }
}

/// Three colored segments of length `size` along X, Y and Z.
#[must_use]
pub fn axes_data(size: f32) -> GeometryData {
    let mut vertices = Vec::with_capacity(6);
    for (direction, color) in [
        ([size, 0.0, 0.0], COLOR_RED),
        ([0.0, size, 0.0], COLOR_GREEN),
        ([0.0, 0.0, size], COLOR_BLUE),
    ] {
        vertices.push(Vertex {
            position: [0.0; 3],
            color,
        });
        vertices.push(Vertex {
            position: direction,
            color,
        });
    }
    GeometryData {
        vertices,
        triangles: Vec::new(),
        edges: vec![0, 1, 2, 3, 4, 5],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    fn indices_in_range(data: &GeometryData) -> bool {
        let count = data.vertices.len();
        data.triangles
            .iter()
            .chain(&data.edges)
            .all(|index| usize::from(*index) < count)
    }

    #[test]
    fn box_has_six_quads() {
        let data = geometry_data(Geometry::Box);
        assert_eq!(data.vertices.len(), 24);
        assert_eq!(data.triangles.len(), 36);
        assert_eq!(data.edges.len(), 48);
        assert!(indices_in_range(&data));
    }

    #[test]
    fn box_corners_are_on_unit_cube() {
        let data = geometry_data(Geometry::Box);
        for vertex in &data.vertices {
            let corner = Vector3::from(vertex.position);
            assert!((corner.magnitude2() - 0.75).abs() < 1e-6);
        }
    }

    #[test]
    fn every_primitive_is_consistent() {
        for geometry in [Geometry::Box, Geometry::Plane, Geometry::Triangle] {
            assert!(indices_in_range(&geometry_data(geometry)));
        }
        let axes = axes_data(1.0);
        assert!(indices_in_range(&axes));
        assert!(axes.triangles.is_empty());
    }
}
