//! Template (prefab) reconciliation
//!
//! [`TemplateSync`] brings a live template instance in line with a template
//! definition. Live children are matched to definition entries by their
//! `templateObjectId` only: names and positions may have been edited
//! locally and are not used.
//!
//! # Usage
//!
//! ```ignore
//! let definition = source.load("props/crate.json")?;
//!
//! let mut sync = TemplateSync::new(&mut scene);
//! if !sync.reload_template(instance, &definition) {
//!     log::warn!("instance does not match the template's type");
//! }
//! ```

use std::collections::HashSet;

use void_core::generate_object_id;
use void_ir::Definition;

use crate::container::CHILDREN_BLOCK;
use crate::error::{Result, SceneError};
use crate::node::NodeHandle;
use crate::scene::Scene;
use crate::serializer::{attr, COMPONENTS_BLOCK};

/// Reconciles live template instances with template definitions
pub struct TemplateSync<'s> {
    scene: &'s mut Scene,
}

impl<'s> TemplateSync<'s> {
    /// Borrow the scene for reconciliation
    pub fn new(scene: &'s mut Scene) -> Self {
        Self { scene }
    }

    /// Reconcile the subtree rooted at `node` with `definition`
    ///
    /// Returns false, leaving the node untouched, when the node's type does
    /// not match the definition's.
    pub fn reload_template(&mut self, node: NodeHandle, definition: &Definition) -> bool {
        match self.try_reload_template(node, definition) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("Template reload skipped: {}", err);
                false
            }
        }
    }

    /// [`TemplateSync::reload_template`] with the reason for a refusal
    ///
    /// # Errors
    ///
    /// - [`SceneError::InvalidHandle`] if the node is gone
    /// - [`SceneError::TypeMismatch`] if the node and definition types differ
    pub fn try_reload_template(&mut self, node: NodeHandle, definition: &Definition) -> Result<()> {
        let live = self.scene.try_node(node)?;
        if live.type_name() != definition.name {
            return Err(SceneError::TypeMismatch {
                node: live.type_name().to_string(),
                definition: definition.name.clone(),
            });
        }

        self.sync_node(node, definition);
        log::debug!("Reloaded template instance {:?}", node);
        Ok(())
    }

    fn sync_node(&mut self, node: NodeHandle, definition: &Definition) {
        let saved_transform = self.scene.relative_transform(node);
        let saved_id = self
            .scene
            .node(node)
            .map(|n| n.id().to_string())
            .unwrap_or_default();

        self.sync_components(node, definition);
        self.scene.load_object_with(node, definition, false);
        self.scene.start_components(node);

        if self.scene.get_parent_template(node) == Some(node) {
            self.scene.set_relative_transform(node, saved_transform);
        }
        self.scene.set_id(node, saved_id);
        self.scene.set_template_changed(node, false);

        if self.scene.node(node).map_or(false, |n| n.is_container()) {
            self.sync_children(node, definition);
        }
    }

    fn sync_components(&mut self, node: NodeHandle, definition: &Definition) {
        let Some(block) = definition.object(COMPONENTS_BLOCK) else {
            self.scene.release_all_components(node);
            return;
        };
        let wanted: Vec<String> = block.objects().map(|c| c.name.clone()).collect();

        for type_name in &wanted {
            self.scene.ensure_component(node, type_name);
        }

        // Removing a component can free one it required, so repeat until stable
        loop {
            let victim = self.scene.node(node).and_then(|n| {
                n.components().iter().enumerate().position(|(i, c)| {
                    c.is_serializable()
                        && !wanted.iter().any(|w| w == c.type_name())
                        && !self.scene.is_dependency_of_present(node, c.type_name(), i)
                })
            });
            match victim {
                Some(index) => {
                    self.scene.remove_component_at(node, index);
                }
                None => break,
            }
        }

        self.scene.sort_components(node, &wanted);
    }

    fn sync_children(&mut self, node: NodeHandle, definition: &Definition) {
        self.scene.update_add_remove_object(node, true);

        let mut matched: HashSet<NodeHandle> = HashSet::new();
        let mut order: Vec<String> = Vec::new();

        let entries: Vec<&Definition> = definition
            .object(CHILDREN_BLOCK)
            .map(|block| block.objects().collect())
            .unwrap_or_default();

        for entry in entries {
            let key = entry.get_str(attr::TEMPLATE_OBJECT_ID).unwrap_or_default();
            if key.is_empty() {
                // Entries without a correlation key can never be matched again
                log::debug!("Skipping template child '{}' without a templateObjectId", entry.name);
                continue;
            }
            order.push(key.to_string());

            let Some(child) = self.find_match(node, key, &matched) else {
                if let Some(created) = self.scene.create_object(node, entry, true) {
                    log::debug!("Instantiated template child '{}' under {:?}", key, node);
                    // Bring the new child to the state a later reload would leave it in
                    self.sync_node(created, entry);
                    matched.insert(created);
                }
                continue;
            };
            matched.insert(child);

            let live_type = self.scene.node(child).map(|c| c.type_name().to_string()).unwrap_or_default();
            if live_type != entry.name {
                let err = SceneError::TypeMismatch {
                    node: live_type,
                    definition: entry.name.clone(),
                };
                log::warn!("Leaving template child '{}' untouched: {}", key, err);
                continue;
            }

            if self.scene.node(child).and_then(|c| c.parent()) != Some(node) {
                self.scene.add_child(node, child);
            }
            if self.scene.node(child).map_or(false, |c| c.is_template_asset()) {
                continue;
            }
            self.sync_node(child, entry);
        }

        for child in self.scene.children(node) {
            if !matched.contains(&child) {
                self.scene.remove_object(node, child);
            }
        }

        self.scene.update_add_remove_object(node, true);
        if !order.is_empty() {
            self.scene.sort_childs_by_template_order(node, &order);
        }
    }

    /// Live node carrying `key`: direct children first, then the rest of the
    /// subtree without descending into nested template instances
    fn find_match(&self, container: NodeHandle, key: &str, matched: &HashSet<NodeHandle>) -> Option<NodeHandle> {
        let is_candidate = |handle: NodeHandle| {
            !matched.contains(&handle)
                && self
                    .scene
                    .node(handle)
                    .map_or(false, |n| n.template_object_id() == key)
        };

        let children = self.scene.children(container);
        if let Some(&direct) = children.iter().find(|&&c| is_candidate(c)) {
            return Some(direct);
        }

        let mut stack: Vec<NodeHandle> = children.into_iter().rev().collect();
        while let Some(handle) = stack.pop() {
            if is_candidate(handle) {
                return Some(handle);
            }
            let Some(n) = self.scene.node(handle) else {
                continue;
            };
            if n.is_container() && !n.is_template_asset() {
                stack.extend(self.scene.children(handle).into_iter().rev());
            }
        }
        None
    }

    /// Turn the subtree at `node` into a template root
    ///
    /// A new template ID is given to the root and every descendant outside
    /// nested template instances, nodes without a correlation key get one,
    /// and the root records `asset_path`. Returns the template definition.
    pub fn make_template(&mut self, node: NodeHandle, asset_path: &str) -> Option<Definition> {
        if !self.scene.contains(node) {
            return None;
        }
        self.scene.update_add_remove_subtree(node);

        let template_id = generate_object_id();
        self.scene.set_template_id(node, template_id.as_str());
        self.scene.set_template_asset(node, asset_path);
        self.scene.set_template_changed(node, false);
        self.assign_template_object_id(node);

        let mut stack = self.scene.children(node);
        while let Some(handle) = stack.pop() {
            self.assign_template_object_id(handle);
            let Some(n) = self.scene.node(handle) else {
                continue;
            };
            if n.is_template_asset() {
                continue;
            }
            let descend = n.is_container();
            self.scene.set_template_id(handle, template_id.as_str());
            if descend {
                stack.extend(self.scene.children(handle));
            }
        }

        log::info!("Created template '{}' from {:?}", asset_path, node);
        self.scene.export_object(node)
    }

    fn assign_template_object_id(&mut self, node: NodeHandle) {
        let missing = self
            .scene
            .node(node)
            .map_or(false, |n| n.template_object_id().is_empty());
        if missing {
            self.scene.set_template_object_id(node, generate_object_id());
        }
    }
}
