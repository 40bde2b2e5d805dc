//! Components attached to scene objects
//!
//! A component is a unit of behavior or state owned by exactly one object.
//! Capabilities (such as being the object's transform) are exposed through
//! accessor methods on [`Component`] rather than through type hierarchies.
//!
//! # Example
//!
//! ```ignore
//! #[derive(Default)]
//! struct Mesh { path: String }
//!
//! impl Component for Mesh {
//!     fn type_name(&self) -> &str { Self::TYPE_NAME }
//!     fn create_serializable(&self) -> Definition {
//!         Definition::new(Self::TYPE_NAME).with("path", self.path.as_str())
//!     }
//!     fn load_serializable(&mut self, data: &Definition) {
//!         self.path = data.get_str("path").unwrap_or_default().to_string();
//!     }
//!     fn as_any(&self) -> &dyn Any { self }
//!     fn as_any_mut(&mut self) -> &mut dyn Any { self }
//! }
//!
//! impl ComponentType for Mesh {
//!     const TYPE_NAME: &'static str = "Mesh";
//!     const DEPENDENCIES: &'static [&'static str] = &["Collider"];
//! }
//! ```

use std::any::Any;

use glam::Mat4;
use void_ecs::{Entity, EntityStore};
use void_ir::Definition;

use crate::node::NodeHandle;

pub mod placeholder;
pub mod registry;
pub mod transform;

pub use placeholder::PlaceholderComponent;
pub use registry::{ComponentEntry, ComponentRegistry};
pub use transform::{TransformEuler, TransformMatrix};

/// What a component hook can reach: its owner and the entity store
pub struct ComponentContext<'a> {
    /// Owning object
    pub owner: NodeHandle,
    /// The owner's entity, if it has one
    pub entity: Option<Entity>,
    /// Entity store of the scene
    pub store: &'a mut dyn EntityStore,
}

/// A polymorphic unit of behavior attached to an object
pub trait Component: Any {
    /// Stable type name; also the component's block name in definitions
    fn type_name(&self) -> &str;

    /// Serializable components are written to and reconciled from definitions
    fn is_serializable(&self) -> bool {
        true
    }

    /// Disabled components skip update hooks
    fn is_enabled(&self) -> bool {
        true
    }

    /// Called once right after the component is attached
    fn init_component(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// Called after the owner finished loading
    fn start_component(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// Per-frame update
    fn update_component(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// Runs after every object finished `update_component`
    fn end_update(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// The owner's culling mask changed
    fn on_update_culling_layer(&mut self, _layer: u32) {}

    /// Serialize fields into a definition named after [`Component::type_name`]
    fn create_serializable(&self) -> Definition {
        Definition::new(self.type_name())
    }

    /// Load fields from a definition
    fn load_serializable(&mut self, _data: &Definition) {}

    /// Transform capability
    fn as_transform(&self) -> Option<&dyn Transform> {
        None
    }

    /// Mutable transform capability
    fn as_transform_mut(&mut self) -> Option<&mut dyn Transform> {
        None
    }

    /// Placeholders stand in for types missing from the registry
    fn is_placeholder(&self) -> bool {
        false
    }

    /// Downcast support
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast support
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A concrete component type that can be registered by name
pub trait ComponentType: Component + Default {
    /// Registry key and definition block name
    const TYPE_NAME: &'static str;

    /// Type names that must be present whenever this component is
    const DEPENDENCIES: &'static [&'static str] = &[];
}

/// The transform capability
///
/// At most one component of an object carries it.
pub trait Transform {
    /// Transform relative to the parent object
    fn relative_transform(&self) -> Mat4;

    /// Replace the relative transform
    fn set_relative_transform(&mut self, relative: Mat4);
}
