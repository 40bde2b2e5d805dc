//! The two transform components
//!
//! [`TransformEuler`] stores position, rotation and scale and derives the
//! matrix; [`TransformMatrix`] stores the matrix directly. An object carries
//! one or the other, never both.

use std::any::Any;

use glam::{EulerRot, Mat4, Quat, Vec3};
use void_ecs::{EntityStore, TransformData};
use void_ir::Definition;

use super::{Component, ComponentContext, ComponentType, Transform};

fn push_transform_block(ctx: &mut ComponentContext<'_>, relative: Mat4) {
    let Some(entity) = ctx.entity else {
        return;
    };
    let store: &mut dyn EntityStore = &mut *ctx.store;
    if let Some(data) = store.transform_data_mut(entity) {
        data.set_relative(relative);
        return;
    }
    store.add_block(entity, TransformData::new(relative));
}

/// Position, rotation (degrees, XYZ order) and scale
#[derive(Debug, Clone, PartialEq)]
pub struct TransformEuler {
    /// Position
    pub position: Vec3,
    /// Rotation in degrees
    pub rotation: Vec3,
    /// Scale
    pub scale: Vec3,
}

impl Default for TransformEuler {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl TransformEuler {
    fn rotation_quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x.to_radians(),
            self.rotation.y.to_radians(),
            self.rotation.z.to_radians(),
        )
    }
}

impl Transform for TransformEuler {
    fn relative_transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation_quat(), self.position)
    }

    fn set_relative_transform(&mut self, relative: Mat4) {
        let (scale, rotation, translation) = relative.to_scale_rotation_translation();
        let (x, y, z) = rotation.to_euler(EulerRot::XYZ);
        self.position = translation;
        self.rotation = Vec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees());
        self.scale = scale;
    }
}

impl Component for TransformEuler {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn init_component(&mut self, ctx: &mut ComponentContext<'_>) {
        push_transform_block(ctx, self.relative_transform());
    }

    fn start_component(&mut self, ctx: &mut ComponentContext<'_>) {
        push_transform_block(ctx, self.relative_transform());
    }

    fn create_serializable(&self) -> Definition {
        Definition::new(Self::TYPE_NAME)
            .with("position", self.position.to_array())
            .with("rotation", self.rotation.to_array())
            .with("scale", self.scale.to_array())
    }

    fn load_serializable(&mut self, data: &Definition) {
        if let Some(v) = data.get_vec3("position") {
            self.position = Vec3::from_array(v);
        }
        if let Some(v) = data.get_vec3("rotation") {
            self.rotation = Vec3::from_array(v);
        }
        if let Some(v) = data.get_vec3("scale") {
            self.scale = Vec3::from_array(v);
        }
    }

    fn as_transform(&self) -> Option<&dyn Transform> {
        Some(self)
    }

    fn as_transform_mut(&mut self) -> Option<&mut dyn Transform> {
        Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl ComponentType for TransformEuler {
    const TYPE_NAME: &'static str = "TransformEuler";
}

/// A relative transform stored as a matrix
#[derive(Debug, Clone, PartialEq)]
pub struct TransformMatrix {
    /// Relative matrix
    pub relative: Mat4,
}

impl Default for TransformMatrix {
    fn default() -> Self {
        Self {
            relative: Mat4::IDENTITY,
        }
    }
}

impl Transform for TransformMatrix {
    fn relative_transform(&self) -> Mat4 {
        self.relative
    }

    fn set_relative_transform(&mut self, relative: Mat4) {
        self.relative = relative;
    }
}

impl Component for TransformMatrix {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn init_component(&mut self, ctx: &mut ComponentContext<'_>) {
        push_transform_block(ctx, self.relative);
    }

    fn start_component(&mut self, ctx: &mut ComponentContext<'_>) {
        push_transform_block(ctx, self.relative);
    }

    fn create_serializable(&self) -> Definition {
        Definition::new(Self::TYPE_NAME).with("relative", self.relative.to_cols_array())
    }

    fn load_serializable(&mut self, data: &Definition) {
        if let Some(m) = data.get_mat4("relative") {
            self.relative = Mat4::from_cols_array(&m);
        }
    }

    fn as_transform(&self) -> Option<&dyn Transform> {
        Some(self)
    }

    fn as_transform_mut(&mut self) -> Option<&mut dyn Transform> {
        Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl ComponentType for TransformMatrix {
    const TYPE_NAME: &'static str = "TransformMatrix";
}
