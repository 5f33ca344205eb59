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

use cgmath::{Euler, Matrix4, Point3, Rad, SquareMatrix, Transform as _, Vector3, vec3};
use indexmap::IndexMap;
use log::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    #[must_use]
    pub fn component(self, vector: &Vector3<f32>) -> f32 {
        match self {
            Self::X => vector.x,
            Self::Y => vector.y,
            Self::Z => vector.z,
        }
    }

    pub fn component_mut(self, vector: &mut Vector3<f32>) -> &mut f32 {
        match self {
            Self::X => &mut vector.x,
            Self::Y => &mut vector.y,
            Self::Z => &mut vector.z,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    /// Euler angles, in radians.
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: vec3(0.0, 0.0, 0.0),
            rotation: vec3(0.0, 0.0, 0.0),
            scale: vec3(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    #[must_use]
    pub fn local_matrix(&self) -> Matrix4<f32> {
        let rotation = Euler {
            x: Rad(self.rotation.x),
            y: Rad(self.rotation.y),
            z: Rad(self.rotation.z),
        };
        Matrix4::from_translation(self.position)
            * Matrix4::from(rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Geometry {
    Box,
    Plane,
    Triangle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub color: [f32; 3],
    pub wireframe: bool,
    pub opacity: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: [1.0, 0.0, 0.0],
            wireframe: false,
            opacity: 1.0,
        }
    }
}

impl Material {
    #[must_use]
    pub fn wireframe(color: [f32; 3]) -> Self {
        Self {
            color,
            wireframe: true,
            ..Self::default()
        }
    }
    #[must_use]
    pub fn solid(color: [f32; 3]) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub geometry: Geometry,
    pub material: Material,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Mesh(Mesh),
    Group,
    AxesHelper { size: f32 },
}

#[derive(Clone, Debug)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    pub transform: Transform,
    pub visible: bool,
    parent: Option<ObjectId>,
    children: Vec<ObjectId>,
}

impl SceneNode {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            transform: Transform::default(),
            visible: true,
            parent: None,
            children: Vec::new(),
        }
    }
    #[must_use]
    pub fn mesh(name: impl Into<String>, geometry: Geometry, material: Material) -> Self {
        Self::new(name, NodeKind::Mesh(Mesh { geometry, material }))
    }
    #[must_use]
    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.position = vec3(x, y, z);
        self
    }
    #[must_use]
    pub fn with_rotation(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.rotation = vec3(x, y, z);
        self
    }
    #[must_use]
    pub fn with_scale(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.scale = vec3(x, y, z);
        self
    }
    #[must_use]
    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }
    #[must_use]
    pub fn children(&self) -> &[ObjectId] {
        &self.children
    }
    #[must_use]
    pub fn material(&self) -> Option<&Material> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(&mesh.material),
            _ => None,
        }
    }
    pub fn material_mut(&mut self) -> Option<&mut Material> {
        match &mut self.kind {
            NodeKind::Mesh(mesh) => Some(&mut mesh.material),
            _ => None,
        }
    }
}

/// One node ready to be drawn, with its transform resolved to world space.
pub struct DrawItem<'a> {
    pub id: ObjectId,
    pub node: &'a SceneNode,
    pub world: Matrix4<f32>,
}

#[derive(Default)]
pub struct SceneGraph {
    nodes: IndexMap<ObjectId, SceneNode>,
    next_id: u32,
}

impl SceneGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mut node: SceneNode) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        node.parent = None;
        node.children.clear();
        self.nodes.insert(id, node);
        id
    }

    /// Adds `node` under `parent`. Falls back to the root if `parent` is unknown.
    pub fn add_child(&mut self, parent: ObjectId, node: SceneNode) -> ObjectId {
        let id = self.add(node);
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.push(id);
            if let Some(child) = self.nodes.get_mut(&id) {
                child.parent = Some(parent);
            }
        } else {
            warn!("Unknown parent {parent:?}, adding {id:?} at the root");
        }
        id
    }

    /// Removes a node and its whole subtree.
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneNode> {
        let node = self.nodes.shift_remove(&id)?;
        if let Some(parent) = node.parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|child| *child != id);
        }
        for child in &node.children {
            self.remove(*child);
        }
        Some(node)
    }

    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&id)
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<ObjectId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| *id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.nodes.keys().copied()
    }

    #[must_use]
    pub fn world_matrix(&self, id: ObjectId) -> Option<Matrix4<f32>> {
        let node = self.nodes.get(&id)?;
        let local = node.transform.local_matrix();
        Some(match node.parent {
            Some(parent) => self.world_matrix(parent).unwrap_or_else(Matrix4::identity) * local,
            None => local,
        })
    }

    #[must_use]
    pub fn world_position(&self, id: ObjectId) -> Option<Point3<f32>> {
        self.world_matrix(id)
            .map(|world| world.transform_point(Point3::new(0.0, 0.0, 0.0)))
    }

    /// Visible nodes in insertion order. A hidden group hides its subtree.
    pub fn draw_items(&self) -> Vec<DrawItem<'_>> {
        let mut items = Vec::with_capacity(self.nodes.len());
        for (id, node) in &self.nodes {
            if node.parent.is_none() {
                self.collect_visible(*id, Matrix4::identity(), &mut items);
            }
        }
        items
    }

    fn collect_visible<'a>(
        &'a self,
        id: ObjectId,
        parent_world: Matrix4<f32>,
        items: &mut Vec<DrawItem<'a>>,
    ) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if !node.visible {
            return;
        }
        let world = parent_world * node.transform.local_matrix();
        items.push(DrawItem { id, node, world });
        for child in &node.children {
            self.collect_visible(*child, world, items);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(name: &str) -> SceneNode {
        SceneNode::mesh(name, Geometry::Box, Material::wireframe([0.0, 1.0, 0.0]))
    }

    #[test]
    fn group_transform_applies_to_children() {
        let mut scene = SceneGraph::new();
        let group = scene.add(SceneNode::new("group", NodeKind::Group).with_scale(1.0, 2.0, 1.0));
        let child = scene.add_child(group, cube("child").with_position(0.0, 1.0, 0.0));
        let position = scene.world_position(child).unwrap();
        assert!((position.y - 2.0).abs() < 1e-6);
    }

    #[test]
    fn hidden_group_hides_children() {
        let mut scene = SceneGraph::new();
        let group = scene.add(SceneNode::new("group", NodeKind::Group));
        scene.add_child(group, cube("a"));
        scene.add(cube("b"));
        scene.get_mut(group).unwrap().visible = false;
        let names: Vec<_> = scene
            .draw_items()
            .iter()
            .map(|item| item.node.name.clone())
            .collect();
        assert_eq!(names, vec!["b".to_string()]);
    }

    #[test]
    fn remove_drops_subtree() {
        let mut scene = SceneGraph::new();
        let group = scene.add(SceneNode::new("group", NodeKind::Group));
        scene.add_child(group, cube("a"));
        scene.add_child(group, cube("b"));
        scene.add(cube("c"));
        assert_eq!(scene.len(), 4);
        scene.remove(group);
        assert_eq!(scene.len(), 1);
        assert!(scene.find("c").is_some());
        assert!(scene.find("a").is_none());
    }

    #[test]
    fn unknown_parent_falls_back_to_root() {
        let mut scene = SceneGraph::new();
        let ghost = scene.add(cube("ghost"));
        scene.remove(ghost);
        let id = scene.add_child(ghost, cube("orphan"));
        assert_eq!(scene.get(id).unwrap().parent(), None);
        assert_eq!(scene.draw_items().len(), 1);
    }
}
