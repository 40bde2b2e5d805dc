//! Container operations: factories, the deferred add/remove queues, ordering,
//! searches and naming
//!
//! Structural changes made while the tree is being walked are queued on the
//! container and applied at the next [`Scene::update_add_remove_object`].
//! Until then [`Scene::children`] reports the flushed list minus the nodes
//! queued for removal; queued additions are not visible.

use std::collections::VecDeque;

use void_ir::Definition;

use crate::component::Component;
use crate::error::{Result, SceneError};
use crate::node::{Node, NodeHandle, NodeKind};
use crate::scene::Scene;

/// Block holding a container's serialized children
pub const CHILDREN_BLOCK: &str = "Children";

impl Scene {
    // ========================================================================
    // Factories
    // ========================================================================

    /// Create a plain object, queued for the next flush of `container`
    pub fn create_empty_object(&mut self, container: NodeHandle) -> Option<NodeHandle> {
        let template = self.config.object_name_template.clone();
        self.spawn_node(container, NodeKind::Object, &template)
    }

    /// Create a container object, queued for the next flush of `container`
    pub fn create_container_object(&mut self, container: NodeHandle) -> Option<NodeHandle> {
        let template = self.config.container_name_template.clone();
        self.spawn_node(container, NodeKind::Container, &template)
    }

    /// Create an object subtree from a definition
    ///
    /// The root is queued on `container`; nested containers are flushed so the
    /// whole subtree is in place once `container` flushes. With
    /// `generate_new_id` every node gets a fresh ID instead of the stored one.
    pub fn create_object(
        &mut self,
        container: NodeHandle,
        definition: &Definition,
        generate_new_id: bool,
    ) -> Option<NodeHandle> {
        let kind = match NodeKind::from_type_name(&definition.name) {
            Some(NodeKind::Zone) => {
                log::warn!("Zone definition nested in a container, creating a container");
                NodeKind::Container
            }
            Some(kind) => kind,
            None => {
                log::warn!("No node type named '{}'", definition.name);
                return None;
            }
        };

        let template = match kind {
            NodeKind::Object => self.config.object_name_template.clone(),
            _ => self.config.container_name_template.clone(),
        };
        let node = self.spawn_node(container, kind, &template)?;
        self.load_object_with(node, definition, !generate_new_id);

        if kind.is_container() {
            if let Some(children) = definition.object(CHILDREN_BLOCK) {
                for child in children.objects() {
                    self.create_object(node, child, generate_new_id);
                }
            }
            self.update_add_remove_object(node, true);
        }

        self.start_components(node);
        Some(node)
    }

    fn spawn_node(&mut self, container: NodeHandle, kind: NodeKind, template: &str) -> Option<NodeHandle> {
        let zone = {
            let parent = self.nodes.get(container)?;
            if !parent.is_container() {
                log::warn!("Cannot create a child under plain object {:?}", container);
                return None;
            }
            parent.zone
        };

        let name = self.generate_object_name(container, template);
        let node = self.nodes.insert(Node::new(kind, Some(container), zone));
        self.init_node(node, name);

        let data = self.container_data_mut(container)?;
        data.pending_add.push(node);
        data.dirty = true;
        Some(node)
    }

    // ========================================================================
    // Flush point
    // ========================================================================

    /// Apply the queued additions and removals of `container`
    ///
    /// Additions are applied first, then removals, so a node added and
    /// removed before the same flush ends up destroyed. With `force` the
    /// name/ID maps are rebuilt even when nothing was queued. Returns false
    /// when there was nothing to do.
    pub fn update_add_remove_object(&mut self, container: NodeHandle, force: bool) -> bool {
        let Some(data) = self.container_data_mut(container) else {
            return false;
        };
        if !data.dirty && !data.has_pending() && !force {
            return false;
        }
        let adds = std::mem::take(&mut data.pending_add);
        let removes = std::mem::take(&mut data.pending_remove);
        data.dirty = false;

        let container_entity = self.nodes.get(container).and_then(|n| n.entity);
        let (added, removed) = (adds.len(), removes.len());

        for child in adds {
            let Some(c) = self.nodes.get(child) else {
                continue;
            };
            if c.parent != Some(container) {
                continue;
            }
            let (id, name, entity) = (c.record.id.clone(), c.record.name.clone(), c.entity);

            let Some(data) = self.container_data_mut(container) else {
                return false;
            };
            if data.children.contains(&child) {
                continue;
            }
            data.children.push(child);
            data.by_name.entry(name).or_insert(child);
            data.by_id.entry(id).or_insert(child);

            if let (Some(entity), Some(parent)) = (entity, container_entity) {
                if let Err(err) = self.entities.set_parent(entity, Some(parent)) {
                    log::warn!("Entity parent not updated: {}", err);
                }
            }
        }

        for child in removes {
            let Some(data) = self.container_data_mut(container) else {
                return false;
            };
            let Some(position) = data.children.iter().position(|&c| c == child) else {
                continue;
            };
            data.children.remove(position);
            data.by_name.retain(|_, h| *h != child);
            data.by_id.retain(|_, h| *h != child);

            if self.nodes.get(child).map(|c| c.parent) == Some(Some(container)) {
                self.destroy_node(child);
            }
        }

        if force {
            self.update_container_index(container);
        }
        log::debug!(
            "Flushed {:?}: {} added, {} removed",
            container,
            added,
            removed
        );
        true
    }

    /// Flush `root` and every container below it, parents before children
    pub fn update_add_remove_subtree(&mut self, root: NodeHandle) {
        let mut stack = vec![root];
        while let Some(container) = stack.pop() {
            self.update_add_remove_object(container, false);
            if let Some(data) = self.container_data(container) {
                for &child in data.children.iter().rev() {
                    if self.nodes.get(child).map_or(false, Node::is_container) {
                        stack.push(child);
                    }
                }
            }
        }
    }

    /// Rebuild the name/ID maps of `container` from its flushed children
    pub fn update_container_index(&mut self, container: NodeHandle) {
        let Some(data) = self.container_data(container) else {
            return;
        };
        let entries: Vec<(NodeHandle, String, String)> = data
            .children
            .iter()
            .filter_map(|&c| self.nodes.get(c).map(|n| (c, n.record.name.clone(), n.record.id.clone())))
            .collect();

        if let Some(data) = self.container_data_mut(container) {
            data.by_name.clear();
            data.by_id.clear();
            for (child, name, id) in entries {
                data.by_name.entry(name).or_insert(child);
                data.by_id.entry(id).or_insert(child);
            }
        }
    }

    // ========================================================================
    // Children
    // ========================================================================

    /// Flushed children not queued for removal, in order
    pub fn children(&self, container: NodeHandle) -> Vec<NodeHandle> {
        self.container_data(container)
            .map(|data| {
                data.children
                    .iter()
                    .copied()
                    .filter(|&c| !data.is_pending_remove(c))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of visible children
    pub fn number_objects(&self, container: NodeHandle) -> usize {
        self.children(container).len()
    }

    /// Sibling right before `child`
    pub fn child_before(&self, container: NodeHandle, child: NodeHandle) -> Option<NodeHandle> {
        let children = self.children(container);
        let position = children.iter().position(|&c| c == child)?;
        position.checked_sub(1).map(|p| children[p])
    }

    /// Check whether `node` sits anywhere below `container`
    pub fn have_child(&self, container: NodeHandle, node: NodeHandle) -> bool {
        let mut current = self.nodes.get(node).and_then(|n| n.parent);
        while let Some(handle) = current {
            if handle == container {
                return true;
            }
            current = self.nodes.get(handle).and_then(|n| n.parent);
        }
        false
    }

    /// Move `node` under `container`
    ///
    /// The node leaves its old container at once and joins `container` at
    /// the next flush. Fails for zones, plain-object targets and moves that
    /// would create a cycle.
    pub fn add_child(&mut self, container: NodeHandle, node: NodeHandle) -> bool {
        match self.try_add_child(container, node) {
            Ok(()) => true,
            Err(err) => {
                log::debug!("add_child refused: {}", err);
                false
            }
        }
    }

    /// [`Scene::add_child`] with the reason for a refusal
    pub fn try_add_child(&mut self, container: NodeHandle, node: NodeHandle) -> Result<()> {
        let target = self.try_node(container)?;
        if !target.is_container() {
            return Err(SceneError::Structural(format!(
                "{} cannot hold children",
                target.type_name()
            )));
        }
        let zone = target.zone;
        let moved = self.try_node(node)?;
        if moved.kind == NodeKind::Zone {
            return Err(SceneError::Structural("a zone cannot be reparented".into()));
        }
        let old_parent = moved.parent;
        if node == container || self.have_child(node, container) {
            return Err(SceneError::Structural(format!(
                "{:?} is an ancestor of {:?}",
                node, container
            )));
        }

        if let Some(old) = old_parent {
            if let Some(data) = self.container_data_mut(old) {
                data.children.retain(|&c| c != node);
                data.pending_add.retain(|&c| c != node);
                data.pending_remove.retain(|&c| c != node);
                data.by_name.retain(|_, h| *h != node);
                data.by_id.retain(|_, h| *h != node);
            }
        }

        if let Some(n) = self.nodes.get_mut(node) {
            n.parent = Some(container);
        }
        for handle in self.subtree_with_pending(node) {
            if let Some(n) = self.nodes.get_mut(handle) {
                n.zone = zone;
            }
        }

        if let Some(data) = self.container_data_mut(container) {
            data.pending_add.push(node);
            data.dirty = true;
        }
        Ok(())
    }

    /// Queue `node` for removal from `container`
    pub fn remove_object(&mut self, container: NodeHandle, node: NodeHandle) -> bool {
        if self.nodes.get(node).and_then(|n| n.parent) != Some(container) {
            return false;
        }
        let Some(data) = self.container_data_mut(container) else {
            return false;
        };
        let known = data.children.contains(&node) || data.pending_add.contains(&node);
        if !known || data.is_pending_remove(node) {
            return false;
        }
        data.pending_remove.push(node);
        data.dirty = true;
        true
    }

    /// Queue every child (flushed or pending) for removal
    pub fn remove_all_objects(&mut self, container: NodeHandle) {
        let Some(data) = self.container_data(container) else {
            return;
        };
        let all: Vec<NodeHandle> = data.children.iter().chain(&data.pending_add).copied().collect();
        for child in all {
            self.remove_object(container, child);
        }
    }

    // ========================================================================
    // Ordering
    // ========================================================================

    /// Move `object` next to `target` in the child list
    ///
    /// `behind` places it after `target`, otherwise before.
    pub fn bring_to_next(&mut self, container: NodeHandle, object: NodeHandle, target: NodeHandle, behind: bool) -> bool {
        if object == target {
            return false;
        }
        let Some(data) = self.container_data_mut(container) else {
            return false;
        };
        let Some(from) = data.children.iter().position(|&c| c == object) else {
            return false;
        };
        if !data.children.contains(&target) {
            return false;
        }
        data.children.remove(from);
        let Some(to) = data.children.iter().position(|&c| c == target) else {
            return false;
        };
        let to = if behind { to + 1 } else { to };
        data.children.insert(to, object);
        true
    }

    /// Move `object` to the end of the child list
    pub fn bring_to_child(&mut self, container: NodeHandle, object: NodeHandle) -> bool {
        let Some(data) = self.container_data_mut(container) else {
            return false;
        };
        let Some(from) = data.children.iter().position(|&c| c == object) else {
            return false;
        };
        let moved = data.children.remove(from);
        data.children.push(moved);
        true
    }

    /// Stable-sort children by the position of their template correlation key in `order`
    ///
    /// Children whose key is not listed keep their relative order after the
    /// listed ones.
    pub fn sort_childs_by_template_order(&mut self, container: NodeHandle, order: &[String]) {
        let Some(data) = self.container_data(container) else {
            return;
        };
        let mut keyed: Vec<(usize, NodeHandle)> = data
            .children
            .iter()
            .map(|&c| {
                let rank = self
                    .nodes
                    .get(c)
                    .and_then(|n| order.iter().position(|k| *k == n.record.template_object_id))
                    .unwrap_or(usize::MAX);
                (rank, c)
            })
            .collect();
        keyed.sort_by_key(|(rank, _)| *rank);

        if let Some(data) = self.container_data_mut(container) {
            data.children = keyed.into_iter().map(|(_, c)| c).collect();
        }
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Direct child by name
    pub fn search_object(&self, container: NodeHandle, name: &str) -> Option<NodeHandle> {
        let data = self.container_data(container)?;
        if let Some(&child) = data.by_name.get(name) {
            let valid = self.nodes.get(child).map_or(false, |n| n.record.name == name);
            if valid && !data.is_pending_remove(child) {
                return Some(child);
            }
        }
        self.children(container)
            .into_iter()
            .find(|&c| self.nodes.get(c).map_or(false, |n| n.record.name == name))
    }

    /// Descendant by name, depth-first
    pub fn search_object_in_child(&self, container: NodeHandle, name: &str) -> Option<NodeHandle> {
        self.find_descendant(container, &|n: &Node| n.record.name == name)
    }

    /// Direct child by ID
    pub fn search_child_by_id(&self, container: NodeHandle, id: &str) -> Option<NodeHandle> {
        let data = self.container_data(container)?;
        if let Some(&child) = data.by_id.get(id) {
            let valid = self.nodes.get(child).map_or(false, |n| n.record.id == id);
            if valid && !data.is_pending_remove(child) {
                return Some(child);
            }
        }
        self.children(container)
            .into_iter()
            .find(|&c| self.nodes.get(c).map_or(false, |n| n.record.id == id))
    }

    /// Descendant by ID, depth-first
    pub fn search_object_in_child_by_id(&self, container: NodeHandle, id: &str) -> Option<NodeHandle> {
        self.find_descendant(container, &|n: &Node| n.record.id == id)
    }

    /// Descendant by template correlation key, depth-first
    pub fn search_object_in_child_by_template_obj_id(&self, container: NodeHandle, key: &str) -> Option<NodeHandle> {
        if key.is_empty() {
            return None;
        }
        self.find_descendant(container, &|n: &Node| n.record.template_object_id == key)
    }

    /// Descendants whose culling mask intersects `mask`
    pub fn search_object_by_culling_layer(&self, container: NodeHandle, mask: u32) -> Vec<NodeHandle> {
        self.descendants(container, false)
            .into_iter()
            .filter(|&c| {
                self.nodes
                    .get(c)
                    .map_or(false, |n| n.record.culling_layer & mask != 0)
            })
            .collect()
    }

    fn find_descendant(&self, container: NodeHandle, predicate: &dyn Fn(&Node) -> bool) -> Option<NodeHandle> {
        for child in self.children(container) {
            let Some(n) = self.nodes.get(child) else {
                continue;
            };
            if predicate(n) {
                return Some(child);
            }
            if n.is_container() {
                if let Some(found) = self.find_descendant(child, predicate) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Flattened subtree in depth-first order
    pub fn descendants(&self, container: NodeHandle, add_self: bool) -> Vec<NodeHandle> {
        let mut result = Vec::new();
        if add_self && self.nodes.contains(container) {
            result.push(container);
        }
        self.collect_descendants(container, &mut result);
        result
    }

    fn collect_descendants(&self, container: NodeHandle, out: &mut Vec<NodeHandle>) {
        for child in self.children(container) {
            out.push(child);
            if self.nodes.get(child).map_or(false, Node::is_container) {
                self.collect_descendants(child, out);
            }
        }
    }

    /// Every node of a subtree, including children still waiting in queues
    pub(crate) fn subtree_with_pending(&self, root: NodeHandle) -> Vec<NodeHandle> {
        let mut result = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            result.push(node);
            if let Some(data) = self.container_data(node) {
                stack.extend(data.children.iter().chain(&data.pending_add).copied());
            }
        }
        result
    }

    /// Components of type `T` in the subtree, breadth-first
    pub fn components_in_children<T: Component>(&self, container: NodeHandle, add_self: bool) -> Vec<&T> {
        let mut result = Vec::new();
        let mut queue = VecDeque::new();
        if add_self {
            queue.push_back(container);
        } else {
            queue.extend(self.children(container));
        }

        while let Some(node) = queue.pop_front() {
            let Some(n) = self.nodes.get(node) else {
                continue;
            };
            result.extend(n.components.iter().filter_map(|c| c.as_any().downcast_ref::<T>()));
            if n.is_container() {
                queue.extend(self.children(node));
            }
        }
        result
    }

    // ========================================================================
    // Culling propagation
    // ========================================================================

    /// Set the culling mask on `container` and every descendant
    pub fn set_culling_layer_for_child(&mut self, container: NodeHandle, culling_layer: u32) {
        for node in self.descendants(container, true) {
            self.set_culling_layer(node, culling_layer);
        }
    }

    /// Switch one culling bit on `container` and every descendant
    pub fn set_culling_on_off_for_child(&mut self, container: NodeHandle, bit: u32, on: bool) {
        for node in self.descendants(container, true) {
            self.set_culling_layer_on_off(node, bit, on);
        }
    }

    // ========================================================================
    // Naming
    // ========================================================================

    /// Check whether a child (flushed or pending, not queued for removal) uses `name`
    pub fn test_conflict_name(&self, container: NodeHandle, name: &str) -> bool {
        self.sibling_named(container, name, None).is_some()
    }

    fn sibling_named(&self, container: NodeHandle, name: &str, except: Option<NodeHandle>) -> Option<NodeHandle> {
        let data = self.container_data(container)?;
        data.children
            .iter()
            .chain(&data.pending_add)
            .copied()
            .filter(|&c| Some(c) != except && !data.is_pending_remove(c))
            .find(|&c| self.nodes.get(c).map_or(false, |n| n.record.name == name))
    }

    /// Produce a name unique among the children of `container`
    ///
    /// Names are `"{template}_{n}"` with `n` taken from a per-container
    /// counter; a candidate that collides with a child name or ID is skipped.
    pub fn generate_object_name(&mut self, container: NodeHandle, template: &str) -> String {
        loop {
            let Some(data) = self.container_data_mut(container) else {
                return template.to_string();
            };
            data.last_generate_id += 1;
            let name = format!("{}_{}", template, data.last_generate_id);

            let id_taken = self.container_data(container).map_or(false, |data| {
                data.children
                    .iter()
                    .chain(&data.pending_add)
                    .any(|&c| self.nodes.get(c).map_or(false, |n| n.record.id == name))
            });
            if !id_taken && !self.test_conflict_name(container, &name) {
                return name;
            }
        }
    }

    /// Rename a child, refusing names already used by a sibling
    pub fn rename_object(&mut self, container: NodeHandle, node: NodeHandle, name: &str) -> bool {
        match self.try_rename_object(container, node, name) {
            Ok(()) => true,
            Err(err) => {
                log::debug!("rename refused: {}", err);
                false
            }
        }
    }

    /// [`Scene::rename_object`] with the reason for a refusal
    pub fn try_rename_object(&mut self, container: NodeHandle, node: NodeHandle, name: &str) -> Result<()> {
        if self.try_node(node)?.parent != Some(container) {
            return Err(SceneError::Structural(format!(
                "{:?} is not a child of {:?}",
                node, container
            )));
        }
        if self.sibling_named(container, name, Some(node)).is_some() {
            return Err(SceneError::IdentityConflict(name.to_string()));
        }
        self.set_name(node, name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    use void_ecs::EntityStore;

    use crate::component::{ComponentRegistry, TransformEuler};

    fn scene() -> (Scene, NodeHandle) {
        let mut scene = Scene::new("Test", Arc::new(ComponentRegistry::with_builtin()));
        let zone = scene.create_zone();
        (scene, zone)
    }

    fn names(scene: &Scene, container: NodeHandle) -> Vec<String> {
        scene
            .children(container)
            .into_iter()
            .map(|c| scene.node(c).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_queued_add_visible_after_flush() {
        let (mut scene, zone) = scene();
        let a = scene.create_empty_object(zone).unwrap();
        assert!(scene.children(zone).is_empty());
        assert_eq!(scene.container_data(zone).unwrap().pending_add(), &[a]);

        assert!(scene.update_add_remove_object(zone, false));
        assert_eq!(scene.children(zone), vec![a]);
        assert!(!scene.update_add_remove_object(zone, false));

        let entity = scene.node(a).unwrap().entity().unwrap();
        let zone_entity = scene.node(zone).unwrap().entity();
        assert_eq!(scene.entities().parent(entity), zone_entity);
    }

    #[test]
    fn test_queued_remove_hidden_before_flush() {
        let (mut scene, zone) = scene();
        let a = scene.create_empty_object(zone).unwrap();
        let b = scene.create_empty_object(zone).unwrap();
        scene.update_add_remove_object(zone, false);

        assert!(scene.remove_object(zone, a));
        assert!(!scene.remove_object(zone, a));
        assert_eq!(scene.children(zone), vec![b]);
        assert!(scene.contains(a));

        scene.update_add_remove_object(zone, false);
        assert_eq!(scene.children(zone), vec![b]);
        assert!(!scene.contains(a));
        assert_eq!(scene.search_child_by_id(zone, "nope"), None);
    }

    #[test]
    fn test_add_then_remove_in_one_flush() {
        let (mut scene, zone) = scene();
        let a = scene.create_empty_object(zone).unwrap();
        assert!(scene.remove_object(zone, a));
        scene.update_add_remove_object(zone, false);
        assert!(scene.children(zone).is_empty());
        assert!(!scene.contains(a));
    }

    #[test]
    fn test_generated_names_unique() {
        let (mut scene, zone) = scene();
        let existing = scene.create_empty_object(zone).unwrap();
        scene.set_name(existing, "GameObject_2");
        scene.update_add_remove_object(zone, false);

        let generated: Vec<String> = (0..20).map(|_| scene.generate_object_name(zone, "GameObject")).collect();
        let unique: HashSet<&String> = generated.iter().collect();
        assert_eq!(unique.len(), 20);
        assert!(!generated.iter().any(|n| n == "GameObject_2"));
    }

    #[test]
    fn test_rename_conflict_leaves_name() {
        let (mut scene, zone) = scene();
        let a = scene.create_empty_object(zone).unwrap();
        let b = scene.create_empty_object(zone).unwrap();
        scene.update_add_remove_object(zone, false);
        let old = scene.node(b).unwrap().name().to_string();
        let taken = scene.node(a).unwrap().name().to_string();

        assert!(!scene.rename_object(zone, b, &taken));
        assert_eq!(scene.node(b).unwrap().name(), old);
        assert!(matches!(
            scene.try_rename_object(zone, b, &taken),
            Err(SceneError::IdentityConflict(_))
        ));

        assert!(scene.rename_object(zone, b, "Door"));
        assert_eq!(scene.search_object(zone, "Door"), Some(b));
        assert!(scene.test_conflict_name(zone, "Door"));
        assert!(!scene.test_conflict_name(zone, &old));
    }

    #[test]
    fn test_add_child_reparents() {
        let (mut scene, zone) = scene();
        let box_a = scene.create_container_object(zone).unwrap();
        let box_b = scene.create_container_object(zone).unwrap();
        scene.update_add_remove_object(zone, false);
        let item = scene.create_empty_object(box_a).unwrap();
        scene.update_add_remove_object(box_a, false);

        assert!(scene.add_child(box_b, item));
        assert!(scene.children(box_a).is_empty());
        assert!(scene.children(box_b).is_empty());
        scene.update_add_remove_object(box_b, false);
        assert_eq!(scene.children(box_b), vec![item]);
        assert!(scene.have_child(zone, item));
        assert!(!scene.have_child(box_a, item));

        let entity = scene.node(item).unwrap().entity().unwrap();
        assert_eq!(scene.entities().parent(entity), scene.node(box_b).unwrap().entity());

        assert!(!scene.add_child(item, box_b));
        assert!(!scene.add_child(box_b, zone));
        let err = scene.try_add_child(box_a, zone).unwrap_err();
        assert!(matches!(err, SceneError::Structural(_)));
        assert_eq!(err.to_string(), "Structural error: a zone cannot be reparented");
        assert!(!scene.add_child(box_b, box_b));

        let inner = scene.create_container_object(box_b).unwrap();
        scene.update_add_remove_object(box_b, false);
        assert!(!scene.add_child(inner, box_b));
    }

    #[test]
    fn test_reordering() {
        let (mut scene, zone) = scene();
        let a = scene.create_empty_object(zone).unwrap();
        let b = scene.create_empty_object(zone).unwrap();
        let c = scene.create_empty_object(zone).unwrap();
        scene.update_add_remove_object(zone, false);

        assert!(scene.bring_to_next(zone, c, a, false));
        assert_eq!(scene.children(zone), vec![c, a, b]);
        assert!(scene.bring_to_next(zone, c, b, true));
        assert_eq!(scene.children(zone), vec![a, b, c]);
        assert!(scene.bring_to_child(zone, a));
        assert_eq!(scene.children(zone), vec![b, c, a]);
        assert_eq!(scene.child_before(zone, a), Some(c));
        assert_eq!(scene.child_before(zone, b), None);
    }

    #[test]
    fn test_template_order_is_stable() {
        let (mut scene, zone) = scene();
        let handles: Vec<_> = (0..4).map(|_| scene.create_empty_object(zone).unwrap()).collect();
        scene.update_add_remove_object(zone, false);
        for (h, key) in handles.iter().zip(["A", "", "B", ""]) {
            scene.set_template_object_id(*h, key);
        }

        scene.sort_childs_by_template_order(zone, &["B".to_string(), "A".to_string()]);
        assert_eq!(
            scene.children(zone),
            vec![handles[2], handles[0], handles[1], handles[3]]
        );
    }

    #[test]
    fn test_recursive_search_and_culling() {
        let (mut scene, zone) = scene();
        let room = scene.create_container_object(zone).unwrap();
        scene.update_add_remove_object(zone, false);
        let lamp = scene.create_empty_object(room).unwrap();
        scene.update_add_remove_object(room, false);
        scene.set_name(lamp, "Lamp");
        scene.set_template_object_id(lamp, "lamp-key");

        assert_eq!(scene.search_object(zone, "Lamp"), None);
        assert_eq!(scene.search_object_in_child(zone, "Lamp"), Some(lamp));
        let id = scene.node(lamp).unwrap().id().to_string();
        assert_eq!(scene.search_object_in_child_by_id(zone, &id), Some(lamp));
        assert_eq!(scene.search_object_in_child_by_template_obj_id(zone, "lamp-key"), Some(lamp));
        assert_eq!(scene.descendants(zone, true), vec![zone, room, lamp]);

        scene.set_culling_layer_for_child(room, 0b100);
        assert_eq!(scene.search_object_by_culling_layer(zone, 0b100), vec![room, lamp]);
        scene.set_culling_on_off_for_child(zone, 2, false);
        assert!(scene.search_object_by_culling_layer(zone, 0b100).is_empty());
        assert_eq!(scene.node(zone).unwrap().culling_layer(), 1);
    }

    #[test]
    fn test_components_in_children_breadth_first() {
        let (mut scene, zone) = scene();
        let room = scene.create_container_object(zone).unwrap();
        let chair = scene.create_empty_object(zone).unwrap();
        scene.update_add_remove_object(zone, false);
        scene.create_empty_object(room).unwrap();
        scene.update_add_remove_object(room, false);

        assert_eq!(scene.components_in_children::<TransformEuler>(zone, true).len(), 4);
        assert_eq!(scene.components_in_children::<TransformEuler>(zone, false).len(), 3);
        assert_eq!(scene.components_in_children::<TransformEuler>(chair, true).len(), 1);
    }

    #[test]
    fn test_create_object_from_definition() {
        let (mut scene, zone) = scene();
        let definition = Definition::new("ContainerObject")
            .with("id", "shelf")
            .with("name", "Shelf")
            .with_object(
                Definition::new(CHILDREN_BLOCK)
                    .with_object(Definition::new("GameObject").with("id", "book").with("name", "Book")),
            );

        let shelf = scene.create_object(zone, &definition, false).unwrap();
        scene.update_add_remove_object(zone, false);
        assert_eq!(scene.node(shelf).unwrap().id(), "shelf");
        assert_eq!(names(&scene, shelf), vec!["Book"]);

        let copy = scene.create_object(zone, &definition, true).unwrap();
        scene.update_add_remove_object(zone, false);
        assert_ne!(scene.node(copy).unwrap().id(), "shelf");
        let book = scene.children(copy)[0];
        assert_ne!(scene.node(book).unwrap().id(), "book");
        assert_eq!(names(&scene, zone), vec!["Shelf", "Shelf"]);

        assert!(scene.create_object(zone, &Definition::new("Light"), false).is_none());
    }

    #[test]
    fn test_remove_destroys_subtree_entities() {
        let (mut scene, zone) = scene();
        let room = scene.create_container_object(zone).unwrap();
        scene.update_add_remove_object(zone, false);
        scene.create_empty_object(room).unwrap();
        scene.create_empty_object(room).unwrap();
        scene.update_add_remove_object(room, false);
        assert_eq!(scene.entities().entity_count(), 4);

        scene.remove_all_objects(zone);
        scene.update_add_remove_object(zone, false);
        assert_eq!(scene.entities().entity_count(), 1);
        assert_eq!(scene.node_count(), 1);
    }
}
