//! # void_ecs - Entity Store
//!
//! The entity side of the scene graph. Every scene object owns at most one
//! entity; the store keeps:
//! - Generational entity IDs for use-after-free safety
//! - A parent index mirroring the object hierarchy
//! - Typed data blocks ([`VisibleData`], [`TransformData`], or any `'static` type)
//!
//! ## Example
//!
//! ```ignore
//! use void_ecs::prelude::*;
//!
//! let mut world = World::new();
//! let parent = world.create_entity();
//! let child = world.create_entity();
//! world.set_parent(child, Some(parent))?;
//!
//! let store: &mut dyn EntityStore = &mut world;
//! store.set_culling_layer(child, 0b10);
//! assert_eq!(store.visible_data(child).map(|v| v.culling_layer), Some(0b10));
//! ```

pub mod blocks;
pub mod error;
pub mod store;
pub mod world;

pub use blocks::{TransformData, VisibleData, DEFAULT_CULLING_LAYER};
pub use error::HierarchyError;
pub use store::EntityStore;
pub use world::{EntitySlot, World};

/// Entity identifier with generation for ABA protection
pub type Entity = void_core::Handle<EntitySlot>;

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::blocks::{TransformData, VisibleData};
    pub use crate::error::HierarchyError;
    pub use crate::store::EntityStore;
    pub use crate::world::World;
    pub use crate::Entity;
}
