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

//! Named parameters edited from the debug GUI and copied into scene fields.
//!
//! The GUI only writes into a [`ParameterSet`]. [`ParameterBindings`] reads it
//! once per tick, before the draw, and applies the values to the scene, so the
//! drawn frame never observes a half-applied edit.

use std::{cell::RefCell, ops::RangeInclusive, rc::Rc};

use indexmap::IndexMap;
use log::warn;

use crate::{
    cameras::Camera,
    render_loop::{FrameContext, FrameUpdate},
    scene::{Axis, ObjectId, SceneGraph},
};

#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    Float {
        value: f32,
        min: f32,
        max: f32,
        step: f32,
    },
    Bool(bool),
    Color([f32; 3]),
    Action {
        triggered: bool,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    pub label: String,
    pub value: ParamValue,
}

pub type SharedParameters = Rc<RefCell<ParameterSet>>;

#[derive(Default, Debug)]
pub struct ParameterSet {
    params: IndexMap<String, Parameter>,
}

pub(crate) fn snap(value: f32, min: f32, max: f32, step: f32) -> f32 {
    let snapped = if step > 0.0 {
        min + ((value - min) / step).round() * step
    } else {
        value
    };
    snapped.clamp(min, max)
}

impl ParameterSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn into_shared(self) -> SharedParameters {
        Rc::new(RefCell::new(self))
    }

    fn insert(&mut self, key: &str, label: &str, value: ParamValue) -> &mut Self {
        self.params.insert(
            key.to_owned(),
            Parameter {
                label: label.to_owned(),
                value,
            },
        );
        self
    }

    pub fn add_float(
        &mut self,
        key: &str,
        label: &str,
        value: f32,
        range: RangeInclusive<f32>,
        step: f32,
    ) -> &mut Self {
        let (min, max) = (*range.start(), *range.end());
        let value = snap(value, min, max, step);
        self.insert(
            key,
            label,
            ParamValue::Float {
                value,
                min,
                max,
                step,
            },
        )
    }

    pub fn add_bool(&mut self, key: &str, label: &str, value: bool) -> &mut Self {
        self.insert(key, label, ParamValue::Bool(value))
    }

    pub fn add_color(&mut self, key: &str, label: &str, value: [f32; 3]) -> &mut Self {
        self.insert(key, label, ParamValue::Color(value))
    }

    pub fn add_action(&mut self, key: &str, label: &str) -> &mut Self {
        self.insert(key, label, ParamValue::Action { triggered: false })
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Parameter> {
        self.params.get(key)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut Parameter)> {
        self.params.iter_mut()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Sets a float parameter, clamped to its range and snapped to its step.
    pub fn set_float(&mut self, key: &str, new_value: f32) -> bool {
        match self.params.get_mut(key).map(|p| &mut p.value) {
            Some(ParamValue::Float {
                value,
                min,
                max,
                step,
            }) => {
                *value = snap(new_value, *min, *max, *step);
                true
            }
            _ => false,
        }
    }

    pub fn set_bool(&mut self, key: &str, new_value: bool) -> bool {
        match self.params.get_mut(key).map(|p| &mut p.value) {
            Some(ParamValue::Bool(value)) => {
                *value = new_value;
                true
            }
            _ => false,
        }
    }

    pub fn trigger(&mut self, key: &str) -> bool {
        match self.params.get_mut(key).map(|p| &mut p.value) {
            Some(ParamValue::Action { triggered }) => {
                *triggered = true;
                true
            }
            _ => false,
        }
    }

    /// Returns whether the action was triggered since the last call.
    pub fn take_action(&mut self, key: &str) -> bool {
        match self.params.get_mut(key).map(|p| &mut p.value) {
            Some(ParamValue::Action { triggered }) => std::mem::take(triggered),
            _ => false,
        }
    }

    #[must_use]
    pub fn float(&self, key: &str) -> Option<f32> {
        match self.params.get(key)?.value {
            ParamValue::Float { value, .. } => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn bool(&self, key: &str) -> Option<bool> {
        match self.params.get(key)?.value {
            ParamValue::Bool(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn color(&self, key: &str) -> Option<[f32; 3]> {
        match self.params.get(key)?.value {
            ParamValue::Color(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Property {
    Position(Axis),
    Rotation(Axis),
    Scale(Axis),
    Visible,
    Wireframe,
    Color,
}

struct Binding {
    key: String,
    object: ObjectId,
    property: Property,
}

pub struct ParameterBindings {
    params: SharedParameters,
    bindings: Vec<Binding>,
}

impl ParameterBindings {
    #[must_use]
    pub fn new(params: SharedParameters) -> Self {
        Self {
            params,
            bindings: Vec::new(),
        }
    }

    #[must_use]
    pub fn bind(mut self, key: &str, object: ObjectId, property: Property) -> Self {
        self.bindings.push(Binding {
            key: key.to_owned(),
            object,
            property,
        });
        self
    }

    fn apply(params: &ParameterSet, binding: &Binding, scene: &mut SceneGraph) -> Option<()> {
        let node = scene.get_mut(binding.object)?;
        match binding.property {
            Property::Position(axis) => {
                *axis.component_mut(&mut node.transform.position) = params.float(&binding.key)?;
            }
            Property::Rotation(axis) => {
                *axis.component_mut(&mut node.transform.rotation) = params.float(&binding.key)?;
            }
            Property::Scale(axis) => {
                *axis.component_mut(&mut node.transform.scale) = params.float(&binding.key)?;
            }
            Property::Visible => node.visible = params.bool(&binding.key)?,
            Property::Wireframe => node.material_mut()?.wireframe = params.bool(&binding.key)?,
            Property::Color => node.material_mut()?.color = params.color(&binding.key)?,
        }
        Some(())
    }
}

impl FrameUpdate for ParameterBindings {
    fn update(&mut self, _frame: &FrameContext, scene: &mut SceneGraph, _camera: &mut Camera) {
        let params = self.params.borrow();
        for binding in &self.bindings {
            if Self::apply(&params, binding, scene).is_none() {
                warn!(
                    "Binding {:?} -> {:?} of {:?} could not be applied",
                    binding.key, binding.property, binding.object
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Geometry, Material, SceneNode};

    fn frame() -> FrameContext {
        FrameContext {
            elapsed: 0.0,
            index: 0,
        }
    }

    #[test]
    fn float_is_clamped_and_snapped() {
        let mut params = ParameterSet::new();
        params.add_float("x", "Position X", 0.0, -3.0..=3.0, 0.01);
        params.set_float("x", 5.0);
        assert_eq!(params.float("x"), Some(3.0));
        params.set_float("x", 1.234);
        assert!((params.float("x").unwrap() - 1.23).abs() < 1e-5);
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let mut params = ParameterSet::new();
        params.add_bool("visible", "Visible", true);
        assert!(!params.set_float("visible", 1.0));
        assert!(!params.set_bool("missing", true));
    }

    #[test]
    fn actions_fire_once() {
        let mut params = ParameterSet::new();
        params.add_action("spin", "Spin");
        assert!(!params.take_action("spin"));
        params.trigger("spin");
        assert!(params.take_action("spin"));
        assert!(!params.take_action("spin"));
    }

    #[test]
    fn bindings_write_scene_fields() {
        let mut scene = SceneGraph::new();
        let cube = scene.add(SceneNode::mesh(
            "cube",
            Geometry::Box,
            Material::wireframe([1.0, 0.0, 0.0]),
        ));
        let mut params = ParameterSet::new();
        params
            .add_float("py", "Position Y", 0.0, -3.0..=3.0, 0.01)
            .add_bool("wireframe", "Wireframe", true)
            .add_color("color", "Color", [0.0, 0.0, 1.0]);
        let params = params.into_shared();
        let mut bindings = ParameterBindings::new(Rc::clone(&params))
            .bind("py", cube, Property::Position(Axis::Y))
            .bind("wireframe", cube, Property::Wireframe)
            .bind("color", cube, Property::Color);
        params.borrow_mut().set_float("py", 1.5);
        params.borrow_mut().set_bool("wireframe", false);

        // Edits are not visible before the bindings run.
        assert_eq!(scene.get(cube).unwrap().transform.position.y, 0.0);
        bindings.update(&frame(), &mut scene, &mut Camera::default());
        let node = scene.get(cube).unwrap();
        assert!((node.transform.position.y - 1.5).abs() < 1e-6);
        let material = node.material().unwrap();
        assert!(!material.wireframe);
        assert_eq!(material.color, [0.0, 0.0, 1.0]);
    }
}
