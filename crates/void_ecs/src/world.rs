//! In-memory entity store
//!
//! Entities live in a generational [`Arena`]; each slot holds the parent
//! index and a map of type-erased data blocks.

use core::any::{Any, TypeId};
use std::collections::HashMap;

use void_core::Arena;

use crate::blocks::{TransformData, VisibleData};
use crate::error::HierarchyError;
use crate::store::EntityStore;
use crate::Entity;

/// Storage slot for one entity
#[derive(Default)]
pub struct EntitySlot {
    parent: Option<Entity>,
    children: Vec<Entity>,
    blocks: HashMap<TypeId, Box<dyn Any>>,
}

/// The in-memory [`EntityStore`]
#[derive(Default)]
pub struct World {
    entities: Arena<EntitySlot>,
}

impl World {
    /// Create an empty world
    pub fn new() -> Self {
        Self::default()
    }

    /// Destroy an entity and all its descendants in the parent index.
    ///
    /// Entities are destroyed deepest first so parents still exist when
    /// their children are detached.
    pub fn destroy_recursive(&mut self, entity: Entity) -> usize {
        if !self.entities.contains(entity) {
            return 0;
        }

        let mut to_destroy = Vec::new();
        self.collect_descendants(entity, &mut to_destroy);
        to_destroy.reverse();

        let mut destroyed = 0;
        for e in to_destroy {
            if self.destroy_entity(e) {
                destroyed += 1;
            }
        }
        destroyed
    }

    /// Collect an entity and its descendants, depth-first
    pub fn collect_descendants(&self, entity: Entity, result: &mut Vec<Entity>) {
        result.push(entity);
        if let Some(slot) = self.entities.get(entity) {
            for &child in &slot.children {
                self.collect_descendants(child, result);
            }
        }
    }

    /// Check if `ancestor` is an ancestor of `entity`
    pub fn is_ancestor(&self, ancestor: Entity, entity: Entity) -> bool {
        let mut current = self.parent(entity);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }

    /// Depth in the parent index (roots are 0)
    pub fn depth(&self, entity: Entity) -> usize {
        let mut depth = 0;
        let mut current = self.parent(entity);
        while let Some(parent) = current {
            depth += 1;
            current = self.parent(parent);
        }
        depth
    }

    fn detach_from_parent(&mut self, entity: Entity) {
        let parent = self.entities.get(entity).and_then(|slot| slot.parent);
        if let Some(parent) = parent {
            if let Some(slot) = self.entities.get_mut(parent) {
                slot.children.retain(|&c| c != entity);
            }
        }
        if let Some(slot) = self.entities.get_mut(entity) {
            slot.parent = None;
        }
    }
}

impl EntityStore for World {
    fn create_entity(&mut self) -> Entity {
        let mut slot = EntitySlot::default();
        slot.blocks
            .insert(TypeId::of::<VisibleData>(), Box::new(VisibleData::default()));
        slot.blocks
            .insert(TypeId::of::<TransformData>(), Box::new(TransformData::default()));
        self.entities.insert(slot)
    }

    fn destroy_entity(&mut self, entity: Entity) -> bool {
        if !self.entities.contains(entity) {
            return false;
        }

        self.detach_from_parent(entity);

        let Some(slot) = self.entities.remove(entity) else {
            return false;
        };
        for child in slot.children {
            if let Some(child_slot) = self.entities.get_mut(child) {
                child_slot.parent = None;
            }
        }

        log::trace!("destroyed entity {:?}", entity);
        true
    }

    fn is_alive(&self, entity: Entity) -> bool {
        self.entities.contains(entity)
    }

    fn set_parent(&mut self, entity: Entity, parent: Option<Entity>) -> Result<(), HierarchyError> {
        if !self.is_alive(entity) {
            return Err(HierarchyError::EntityNotFound { entity });
        }

        let Some(parent) = parent else {
            self.detach_from_parent(entity);
            return Ok(());
        };

        if !self.is_alive(parent) {
            return Err(HierarchyError::InvalidParent {
                child: entity,
                parent,
            });
        }
        if entity == parent || self.is_ancestor(entity, parent) {
            return Err(HierarchyError::CycleDetected {
                entities: vec![entity, parent],
            });
        }
        if self.parent(entity) == Some(parent) {
            return Ok(());
        }

        self.detach_from_parent(entity);
        if let Some(slot) = self.entities.get_mut(entity) {
            slot.parent = Some(parent);
        }
        if let Some(slot) = self.entities.get_mut(parent) {
            slot.children.push(entity);
        }
        Ok(())
    }

    fn parent(&self, entity: Entity) -> Option<Entity> {
        self.entities.get(entity)?.parent
    }

    fn children(&self, entity: Entity) -> Vec<Entity> {
        self.entities
            .get(entity)
            .map(|slot| slot.children.clone())
            .unwrap_or_default()
    }

    fn insert_block(&mut self, entity: Entity, type_id: TypeId, block: Box<dyn Any>) -> bool {
        match self.entities.get_mut(entity) {
            Some(slot) => {
                slot.blocks.insert(type_id, block);
                true
            }
            None => false,
        }
    }

    fn remove_block(&mut self, entity: Entity, type_id: TypeId) -> Option<Box<dyn Any>> {
        self.entities.get_mut(entity)?.blocks.remove(&type_id)
    }

    fn block(&self, entity: Entity, type_id: TypeId) -> Option<&(dyn Any + 'static)> {
        self.entities
            .get(entity)?
            .blocks
            .get(&type_id)
            .map(|block| block.as_ref())
    }

    fn block_mut(&mut self, entity: Entity, type_id: TypeId) -> Option<&mut (dyn Any + 'static)> {
        self.entities
            .get_mut(entity)?
            .blocks
            .get_mut(&type_id)
            .map(|block| block.as_mut())
    }

    fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Health(u32);

    #[test]
    fn test_new_entity_has_default_blocks() {
        let mut world = World::new();
        let e = world.create_entity();

        let store: &dyn EntityStore = &world;
        assert_eq!(store.visible_data(e), Some(&VisibleData::default()));
        assert!(store.transform_data(e).is_some());
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn test_typed_blocks() {
        let mut world = World::new();
        let e = world.create_entity();

        let store: &mut dyn EntityStore = &mut world;
        assert!(store.add_block(e, Health(10)));
        store.get_block_mut::<Health>(e).unwrap().0 = 25;
        assert_eq!(store.get_block::<Health>(e), Some(&Health(25)));
        assert_eq!(store.take_block::<Health>(e), Some(Health(25)));
        assert_eq!(store.get_block::<Health>(e), None);
    }

    #[test]
    fn test_set_visible_and_culling() {
        let mut world = World::new();
        let e = world.create_entity();

        assert!(world.set_visible(e, false));
        assert!(world.set_culling_layer(e, 0b110));

        let store: &dyn EntityStore = &world;
        let data = store.visible_data(e).unwrap();
        assert!(!data.visible);
        assert_eq!(data.culling_layer, 0b110);
    }

    #[test]
    fn test_parent_index() {
        let mut world = World::new();
        let root = world.create_entity();
        let child = world.create_entity();
        let grandchild = world.create_entity();

        world.set_parent(child, Some(root)).unwrap();
        world.set_parent(grandchild, Some(child)).unwrap();

        assert_eq!(world.parent(child), Some(root));
        assert_eq!(world.children(root), vec![child]);
        assert_eq!(world.depth(grandchild), 2);
        assert!(world.is_ancestor(root, grandchild));

        // Cycle
        let result = world.set_parent(root, Some(grandchild));
        assert!(matches!(result, Err(HierarchyError::CycleDetected { .. })));

        world.set_parent(child, None).unwrap();
        assert!(world.children(root).is_empty());
        assert_eq!(world.parent(child), None);
    }

    #[test]
    fn test_destroy_orphans_children() {
        let mut world = World::new();
        let root = world.create_entity();
        let child = world.create_entity();
        world.set_parent(child, Some(root)).unwrap();

        assert!(world.destroy_entity(root));
        assert!(!world.destroy_entity(root));
        assert!(world.is_alive(child));
        assert_eq!(world.parent(child), None);
    }

    #[test]
    fn test_destroy_recursive() {
        let mut world = World::new();
        let root = world.create_entity();
        let a = world.create_entity();
        let b = world.create_entity();
        world.set_parent(a, Some(root)).unwrap();
        world.set_parent(b, Some(a)).unwrap();

        assert_eq!(world.destroy_recursive(root), 3);
        assert_eq!(world.entity_count(), 0);
    }
}
