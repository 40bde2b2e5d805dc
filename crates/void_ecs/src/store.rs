//! The entity store contract the scene graph is written against
//!
//! Scene objects own at most one entity each. Everything the scene needs
//! from the store goes through [`EntityStore`] so the in-memory [`World`]
//! can be swapped for an engine-side store.
//!
//! [`World`]: crate::World

use core::any::{Any, TypeId};

use crate::blocks::{TransformData, VisibleData};
use crate::error::HierarchyError;
use crate::Entity;

/// Entity creation, parent index and typed data-block attachment
pub trait EntityStore {
    /// Create an entity carrying default [`VisibleData`] and [`TransformData`]
    fn create_entity(&mut self) -> Entity;

    /// Destroy an entity. Children are orphaned, not destroyed.
    ///
    /// Returns false if the entity was already gone.
    fn destroy_entity(&mut self, entity: Entity) -> bool;

    /// Check whether the entity is alive
    fn is_alive(&self, entity: Entity) -> bool;

    /// Set (or clear) the parent index of an entity
    fn set_parent(&mut self, entity: Entity, parent: Option<Entity>) -> Result<(), HierarchyError>;

    /// Parent index of an entity
    fn parent(&self, entity: Entity) -> Option<Entity>;

    /// Direct children in the parent index, in attach order
    fn children(&self, entity: Entity) -> Vec<Entity>;

    /// Attach a type-erased data block, replacing any block of the same type
    fn insert_block(&mut self, entity: Entity, type_id: TypeId, block: Box<dyn Any>) -> bool;

    /// Detach a data block
    fn remove_block(&mut self, entity: Entity, type_id: TypeId) -> Option<Box<dyn Any>>;

    /// Borrow a type-erased data block
    fn block(&self, entity: Entity, type_id: TypeId) -> Option<&(dyn Any + 'static)>;

    /// Mutably borrow a type-erased data block
    fn block_mut(&mut self, entity: Entity, type_id: TypeId) -> Option<&mut (dyn Any + 'static)>;

    /// Number of live entities
    fn entity_count(&self) -> usize;

    /// Write the visible flag directly into the entity's [`VisibleData`]
    fn set_visible(&mut self, entity: Entity, visible: bool) -> bool {
        match self.get_visible_mut(entity) {
            Some(data) => {
                data.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Write the culling mask directly into the entity's [`VisibleData`]
    fn set_culling_layer(&mut self, entity: Entity, culling_layer: u32) -> bool {
        match self.get_visible_mut(entity) {
            Some(data) => {
                data.culling_layer = culling_layer;
                true
            }
            None => false,
        }
    }

    #[doc(hidden)]
    fn get_visible_mut(&mut self, entity: Entity) -> Option<&mut VisibleData> {
        self.block_mut(entity, TypeId::of::<VisibleData>())?
            .downcast_mut::<VisibleData>()
    }
}

impl dyn EntityStore + '_ {
    /// Attach a typed data block
    pub fn add_block<T: Any>(&mut self, entity: Entity, block: T) -> bool {
        self.insert_block(entity, TypeId::of::<T>(), Box::new(block))
    }

    /// Borrow a typed data block
    pub fn get_block<T: Any>(&self, entity: Entity) -> Option<&T> {
        self.block(entity, TypeId::of::<T>())?.downcast_ref::<T>()
    }

    /// Mutably borrow a typed data block
    pub fn get_block_mut<T: Any>(&mut self, entity: Entity) -> Option<&mut T> {
        self.block_mut(entity, TypeId::of::<T>())?
            .downcast_mut::<T>()
    }

    /// Detach a typed data block
    pub fn take_block<T: Any>(&mut self, entity: Entity) -> Option<T> {
        self.remove_block(entity, TypeId::of::<T>())?
            .downcast::<T>()
            .ok()
            .map(|block| *block)
    }

    /// Visibility block of an entity
    pub fn visible_data(&self, entity: Entity) -> Option<&VisibleData> {
        self.get_block::<VisibleData>(entity)
    }

    /// Transform block of an entity
    pub fn transform_data(&self, entity: Entity) -> Option<&TransformData> {
        self.get_block::<TransformData>(entity)
    }

    /// Mutable transform block of an entity
    pub fn transform_data_mut(&mut self, entity: Entity) -> Option<&mut TransformData> {
        self.get_block_mut::<TransformData>(entity)
    }
}
