//! Per-object operations: identity, flags, template linkage and transform
//!
//! Setters keep the parent container's name/ID maps and the scene index in
//! step with the record, and push visibility state into the owner's entity.

use glam::{Mat4, Vec3};

use crate::component::{Transform, TransformEuler, TransformMatrix};
use crate::node::{NodeHandle, NodeKind};
use crate::scene::Scene;

impl Scene {
    // ========================================================================
    // Identity
    // ========================================================================

    /// Replace an object's ID
    ///
    /// Fails when a sibling already uses `id`.
    pub fn set_id(&mut self, node: NodeHandle, id: impl Into<String>) -> bool {
        let id = id.into();
        let Some(n) = self.nodes.get(node) else {
            return false;
        };
        if n.record.id == id {
            return true;
        }
        let old = n.record.id.clone();
        let parent = n.parent;

        if let Some(data) = parent.and_then(|p| self.container_data_mut(p)) {
            if data.by_id.get(&id).map_or(false, |&other| other != node) {
                log::debug!("ID '{}' already used under {:?}", id, parent);
                return false;
            }
            if data.by_id.get(&old) == Some(&node) {
                data.by_id.remove(&old);
                data.by_id.insert(id.clone(), node);
            }
        }

        if self.index.get(&old) == Some(&node) {
            self.index.remove(&old);
            self.index.insert(id.clone(), node);
        }
        if let Some(n) = self.nodes.get_mut(node) {
            n.record.id = id;
        }
        true
    }

    /// Set the display name
    ///
    /// Names need not be unique; use [`Scene::rename_object`] for a checked rename.
    pub fn set_name(&mut self, node: NodeHandle, name: impl Into<String>) -> bool {
        let name = name.into();
        let Some(n) = self.nodes.get_mut(node) else {
            return false;
        };
        let old = std::mem::replace(&mut n.record.name, name.clone());
        if n.record.default_name.is_empty() {
            n.record.default_name = name.clone();
        }
        let parent = n.parent;

        if let Some(data) = parent.and_then(|p| self.container_data_mut(p)) {
            if data.by_name.get(&old) == Some(&node) {
                data.by_name.remove(&old);
            }
            if data.children.contains(&node) {
                data.by_name.entry(name).or_insert(node);
            }
        }
        true
    }

    // ========================================================================
    // Template linkage
    // ========================================================================

    /// Set the template instance group
    pub fn set_template_id(&mut self, node: NodeHandle, template_id: impl Into<String>) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.record.template_id = template_id.into();
        }
    }

    /// Set the template asset path (template roots only)
    pub fn set_template_asset(&mut self, node: NodeHandle, asset: impl Into<String>) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.record.template_asset = asset.into();
        }
    }

    /// Set the template correlation key
    pub fn set_template_object_id(&mut self, node: NodeHandle, template_object_id: impl Into<String>) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.record.template_object_id = template_object_id.into();
        }
    }

    /// Mark local edits as diverging from the template
    pub fn set_template_changed(&mut self, node: NodeHandle, changed: bool) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.record.template_changed = changed;
        }
    }

    /// Nearest enclosing template root
    ///
    /// Walks up while the parent belongs to the same template instance. A
    /// nested template root is its own root. Returns `None` for nodes outside
    /// any template.
    pub fn get_parent_template(&self, node: NodeHandle) -> Option<NodeHandle> {
        let n = self.nodes.get(node)?;
        if !n.record.is_template_object() {
            return None;
        }
        let template_id = &n.record.template_id;

        let mut current = node;
        loop {
            let c = self.nodes.get(current)?;
            if c.record.is_template_asset() {
                return Some(current);
            }
            let Some(parent) = c.parent else {
                return Some(current);
            };
            match self.nodes.get(parent) {
                Some(p) if p.record.template_id == *template_id => current = parent,
                _ => return Some(current),
            }
        }
    }

    /// Detach an object from its template
    pub fn unpack_template(&mut self, node: NodeHandle) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.record.template_asset.clear();
            n.record.template_id.clear();
        }
    }

    // ========================================================================
    // Flags
    // ========================================================================

    /// Enable or disable update hooks
    pub fn set_enable(&mut self, node: NodeHandle, enable: bool) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.record.enable = enable;
        }
    }

    /// Set the static flag
    pub fn set_static(&mut self, node: NodeHandle, is_static: bool) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.record.is_static = is_static;
        }
    }

    /// Set the object's own lock flag
    pub fn set_lock(&mut self, node: NodeHandle, lock: bool) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.record.lock = lock;
        }
    }

    /// Locked if this object or any ancestor is locked
    pub fn is_lock(&self, node: NodeHandle) -> bool {
        let mut current = Some(node);
        while let Some(handle) = current {
            let Some(n) = self.nodes.get(handle) else {
                return false;
            };
            if n.record.lock {
                return true;
            }
            current = n.parent;
        }
        false
    }

    /// Mark as editor-only
    pub fn set_editor_object(&mut self, node: NodeHandle, editor_object: bool) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.record.editor_object = editor_object;
        }
    }

    /// Allow the editor to change this object
    pub fn set_enable_editor_change(&mut self, node: NodeHandle, enable: bool) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.record.enable_editor_change = enable;
        }
    }

    /// Allow the editor to select this object
    pub fn set_enable_editor_select(&mut self, node: NodeHandle, enable: bool) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.record.enable_editor_select = enable;
        }
    }

    // ========================================================================
    // Visibility
    // ========================================================================

    /// Set the visible flag and push it to the entity
    pub fn set_visible(&mut self, node: NodeHandle, visible: bool) {
        let Some(n) = self.nodes.get_mut(node) else {
            return;
        };
        n.record.visible = visible;
        if let Some(entity) = n.entity {
            self.entities.set_visible(entity, visible);
        }
    }

    /// Set the culling mask, push it to the entity and notify components
    pub fn set_culling_layer(&mut self, node: NodeHandle, culling_layer: u32) {
        let Some(n) = self.nodes.get_mut(node) else {
            return;
        };
        n.record.culling_layer = culling_layer;
        if let Some(entity) = n.entity {
            self.entities.set_culling_layer(entity, culling_layer);
        }
        for component in n.components.iter_mut() {
            component.on_update_culling_layer(culling_layer);
        }
    }

    /// Switch one culling bit (0..32) on or off
    pub fn set_culling_layer_on_off(&mut self, node: NodeHandle, bit: u32, on: bool) {
        let Some(current) = self.nodes.get(node).map(|n| n.record.culling_layer) else {
            return;
        };
        let Some(mask) = 1u32.checked_shl(bit) else {
            log::warn!("Culling bit {} out of range", bit);
            return;
        };
        let layer = if on { current | mask } else { current & !mask };
        self.set_culling_layer(node, layer);
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Queue an object for removal from its container
    ///
    /// The object stays alive until the container's next flush. Zones are
    /// destroyed immediately.
    pub fn remove(&mut self, node: NodeHandle) -> bool {
        let Some(n) = self.nodes.get(node) else {
            return false;
        };
        if n.kind == NodeKind::Zone {
            return self.remove_zone(node);
        }
        match n.parent {
            Some(parent) => self.remove_object(parent, node),
            None => false,
        }
    }

    // ========================================================================
    // Transform
    // ========================================================================

    /// The object's transform capability
    pub fn transform(&self, node: NodeHandle) -> Option<&dyn Transform> {
        self.nodes
            .get(node)?
            .components
            .iter()
            .find_map(|c| c.as_transform())
    }

    /// Transform relative to the parent (identity without a transform)
    pub fn relative_transform(&self, node: NodeHandle) -> Mat4 {
        self.transform(node)
            .map(|t| t.relative_transform())
            .unwrap_or(Mat4::IDENTITY)
    }

    /// Replace the relative transform and push it to the entity
    pub fn set_relative_transform(&mut self, node: NodeHandle, relative: Mat4) -> bool {
        let Some(n) = self.nodes.get_mut(node) else {
            return false;
        };
        let Some(transform) = n.components.iter_mut().find_map(|c| c.as_transform_mut()) else {
            return false;
        };
        transform.set_relative_transform(relative);

        if let Some(entity) = n.entity {
            if let Some(data) = self.entities.transform_data_mut(entity) {
                data.set_relative(relative);
            }
        }
        true
    }

    /// Product of relative transforms from the zone down to this object
    pub fn world_transform(&self, node: NodeHandle) -> Mat4 {
        let mut world = Mat4::IDENTITY;
        let mut current = Some(node);
        while let Some(handle) = current {
            let Some(n) = self.nodes.get(handle) else {
                break;
            };
            world = self.relative_transform(handle) * world;
            current = n.parent;
        }
        world
    }

    /// World-space position
    pub fn position(&self, node: NodeHandle) -> Vec3 {
        self.world_transform(node).w_axis.truncate()
    }

    /// Switch to a position/rotation/scale transform
    pub fn setup_euler_transform(&mut self, node: NodeHandle) -> bool {
        if self.get_component::<TransformEuler>(node).is_some() {
            return true;
        }
        self.add_component::<TransformEuler>(node).is_some()
    }

    /// Switch to a matrix transform
    pub fn setup_matrix_transform(&mut self, node: NodeHandle) -> bool {
        if self.get_component::<TransformMatrix>(node).is_some() {
            return true;
        }
        self.add_component::<TransformMatrix>(node).is_some()
    }
}
