//! The scene: an ordered list of zones over a node arena
//!
//! Every object, container and zone lives in the scene's [`Arena`] and is
//! addressed by [`NodeHandle`]. Object, container, component and
//! serialization operations are `impl Scene` blocks in their own modules;
//! this one holds storage, zones, the scene-wide ID index and the update
//! loop.
//!
//! # Example
//!
//! ```ignore
//! let registry = Arc::new(ComponentRegistry::with_builtin());
//! let mut scene = Scene::new("Level", registry);
//!
//! let zone = scene.create_zone();
//! let crate_obj = scene.create_empty_object(zone).unwrap();
//! scene.update_add_remove_object(zone, false);
//!
//! assert_eq!(scene.children(zone), vec![crate_obj]);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use void_core::{generate_object_id, Arena};
use void_ecs::{EntityStore, World};
use void_ir::Definition;

use crate::component::{ComponentRegistry, TransformEuler};
use crate::config::SceneConfig;
use crate::error::{Result, SceneError};
use crate::node::{ContainerData, Node, NodeHandle, NodeKind};

/// Definition name of a serialized scene
pub const SCENE_TYPE_NAME: &str = "Scene";

/// Root of the scene graph
pub struct Scene {
    pub(crate) name: String,
    pub(crate) nodes: Arena<Node>,
    pub(crate) zones: Vec<NodeHandle>,
    pub(crate) index: HashMap<String, NodeHandle>,
    pub(crate) entities: Box<dyn EntityStore>,
    pub(crate) registry: Arc<ComponentRegistry>,
    pub(crate) config: SceneConfig,
}

impl Scene {
    /// Create an empty scene over an in-memory [`World`]
    pub fn new(name: impl Into<String>, registry: Arc<ComponentRegistry>) -> Self {
        Self::with_config(name, registry, SceneConfig::default())
    }

    /// Create with explicit configuration
    pub fn with_config(name: impl Into<String>, registry: Arc<ComponentRegistry>, config: SceneConfig) -> Self {
        Self::with_store(name, registry, config, Box::new(World::new()))
    }

    /// Create over a caller-supplied entity store
    pub fn with_store(
        name: impl Into<String>,
        registry: Arc<ComponentRegistry>,
        config: SceneConfig,
        entities: Box<dyn EntityStore>,
    ) -> Self {
        Self {
            name: name.into(),
            nodes: Arena::new(),
            zones: Vec::new(),
            index: HashMap::new(),
            entities,
            registry,
            config,
        }
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the scene
    pub fn set_scene_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Configuration
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Component registry shared with importers
    pub fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.registry
    }

    /// Entity store
    pub fn entities(&self) -> &dyn EntityStore {
        self.entities.as_ref()
    }

    /// Mutable entity store
    pub fn entities_mut(&mut self) -> &mut dyn EntityStore {
        self.entities.as_mut()
    }

    // ========================================================================
    // Node access
    // ========================================================================

    /// Borrow a node
    pub fn node(&self, node: NodeHandle) -> Option<&Node> {
        self.nodes.get(node)
    }

    pub(crate) fn node_mut(&mut self, node: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(node)
    }

    /// Borrow a node or fail with [`SceneError::InvalidHandle`]
    pub fn try_node(&self, node: NodeHandle) -> Result<&Node> {
        self.nodes.get(node).ok_or(SceneError::InvalidHandle(node))
    }

    pub(crate) fn container_data(&self, node: NodeHandle) -> Option<&ContainerData> {
        self.nodes.get(node)?.container.as_ref()
    }

    pub(crate) fn container_data_mut(&mut self, node: NodeHandle) -> Option<&mut ContainerData> {
        self.nodes.get_mut(node)?.container.as_mut()
    }

    /// Check whether a handle still resolves
    pub fn contains(&self, node: NodeHandle) -> bool {
        self.nodes.contains(node)
    }

    /// Number of live nodes, zones included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ========================================================================
    // Zones
    // ========================================================================

    /// Create a zone at the end of the zone list
    pub fn create_zone(&mut self) -> NodeHandle {
        let name = self.generate_zone_name();
        let zone = self.nodes.insert(Node::new(NodeKind::Zone, None, None));
        self.init_node(zone, name);
        if let Some(node) = self.nodes.get_mut(zone) {
            node.zone = Some(zone);
        }
        self.zones.push(zone);
        log::debug!("Created zone {:?}", zone);
        zone
    }

    /// Destroy a zone and everything under it
    pub fn remove_zone(&mut self, zone: NodeHandle) -> bool {
        let Some(position) = self.zones.iter().position(|&z| z == zone) else {
            return false;
        };
        self.zones.remove(position);
        self.destroy_node(zone);
        true
    }

    /// Zones in order
    pub fn zones(&self) -> &[NodeHandle] {
        &self.zones
    }

    /// Number of zones
    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    /// Zone by position
    pub fn zone(&self, index: usize) -> Option<NodeHandle> {
        self.zones.get(index).copied()
    }

    fn generate_zone_name(&self) -> String {
        let template = &self.config.zone_name_template;
        let mut n = self.zones.len() + 1;
        loop {
            let name = format!("{}_{}", template, n);
            let taken = self
                .zones
                .iter()
                .filter_map(|&z| self.nodes.get(z))
                .any(|z| z.record.name == name);
            if !taken {
                return name;
            }
            n += 1;
        }
    }

    /// Give a fresh node its ID, name, entity and default transform
    pub(crate) fn init_node(&mut self, node: NodeHandle, name: String) {
        let entity = self.entities.create_entity();
        let culling_layer = self.config.default_culling_layer;
        self.entities.set_culling_layer(entity, culling_layer);

        if let Some(n) = self.nodes.get_mut(node) {
            n.record.id = generate_object_id();
            n.record.default_name = name.clone();
            n.record.name = name;
            n.record.culling_layer = culling_layer;
            n.entity = Some(entity);
        }
        self.add_component::<TransformEuler>(node);
    }

    // ========================================================================
    // Scene-wide ID index
    // ========================================================================

    /// Rebuild the scene-wide ID index from the flushed tree
    pub fn update_index_search_object(&mut self) {
        let mut index = HashMap::new();
        for zone in self.zones.clone() {
            for node in self.descendants(zone, true) {
                if let Some(n) = self.nodes.get(node) {
                    if !n.record.id.is_empty() {
                        index.insert(n.record.id.clone(), node);
                    }
                }
            }
        }
        log::debug!("Rebuilt scene index with {} objects", index.len());
        self.index = index;
    }

    /// Find an object anywhere in the scene by ID
    ///
    /// Uses the index built by [`Scene::update_index_search_object`] and falls
    /// back to walking the tree when the index is stale.
    pub fn search_object_by_id(&self, id: &str) -> Option<NodeHandle> {
        if let Some(&node) = self.index.get(id) {
            if self.nodes.get(node).map(|n| n.record.id == id).unwrap_or(false) {
                return Some(node);
            }
        }

        self.zones.iter().find_map(|&zone| {
            if self.nodes.get(zone)?.record.id == id {
                return Some(zone);
            }
            self.search_object_in_child_by_id(zone, id)
        })
    }

    // ========================================================================
    // Update
    // ========================================================================

    /// Run component updates on every enabled object, then flush every container
    pub fn update(&mut self) {
        let mut objects = Vec::new();
        for zone in self.zones.clone() {
            objects.extend(self.descendants(zone, true));
        }

        for &node in &objects {
            if self.nodes.get(node).map(|n| n.record.enable).unwrap_or(false) {
                self.update_object(node);
            }
        }
        for &node in &objects {
            if self.nodes.get(node).map(|n| n.record.enable).unwrap_or(false) {
                self.end_update(node);
            }
        }

        self.update_add_remove_all_objects();
    }

    /// Flush the pending queues of every container in the scene
    pub fn update_add_remove_all_objects(&mut self) {
        for zone in self.zones.clone() {
            self.update_add_remove_subtree(zone);
        }
    }

    // ========================================================================
    // Serialization of scene attributes
    // ========================================================================

    /// Scene attributes (no zones)
    pub fn create_serializable(&self) -> Definition {
        Definition::new(SCENE_TYPE_NAME).with("name", self.name.as_str())
    }

    /// Load scene attributes
    pub fn load_serializable(&mut self, data: &Definition) {
        if let Some(name) = data.get_str("name") {
            self.set_scene_name(name);
        }
    }

    // ========================================================================
    // Destruction
    // ========================================================================

    /// Free a node, its subtree, components and entities
    pub(crate) fn destroy_node(&mut self, node: NodeHandle) {
        let Some(removed) = self.nodes.remove(node) else {
            return;
        };

        if let Some(data) = removed.container {
            for child in data.children.into_iter().chain(data.pending_add) {
                self.destroy_node(child);
            }
        }

        drop(removed.components);
        if let Some(entity) = removed.entity {
            self.entities.destroy_entity(entity);
        }
        if self.index.get(&removed.record.id) == Some(&node) {
            self.index.remove(&removed.record.id);
        }
        log::trace!("Destroyed node {:?} '{}'", node, removed.record.name);
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("zones", &self.zones)
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Scene {
        Scene::new("Test", Arc::new(ComponentRegistry::with_builtin()))
    }

    #[test]
    fn test_create_zone() {
        let mut scene = scene();
        let a = scene.create_zone();
        let b = scene.create_zone();

        assert_eq!(scene.zones(), &[a, b]);
        let zone = scene.node(a).unwrap();
        assert_eq!(zone.kind(), NodeKind::Zone);
        assert_eq!(zone.zone(), Some(a));
        assert_eq!(zone.name(), "Zone_1");
        assert_eq!(scene.node(b).unwrap().name(), "Zone_2");
        assert!(zone.entity().is_some());
        assert!(scene.transform(a).is_some());
    }

    #[test]
    fn test_remove_zone_destroys_subtree() {
        let mut scene = scene();
        let zone = scene.create_zone();
        let container = scene.create_container_object(zone).unwrap();
        scene.update_add_remove_object(zone, false);
        scene.create_empty_object(container).unwrap();
        scene.update_add_remove_object(container, false);
        assert_eq!(scene.node_count(), 3);
        assert_eq!(scene.entities().entity_count(), 3);

        assert!(scene.remove_zone(zone));
        assert!(!scene.remove_zone(zone));
        assert_eq!(scene.node_count(), 0);
        assert_eq!(scene.entities().entity_count(), 0);
    }

    #[test]
    fn test_search_by_id_falls_back_to_walk() {
        let mut scene = scene();
        let zone = scene.create_zone();
        let obj = scene.create_empty_object(zone).unwrap();
        scene.update_add_remove_object(zone, false);

        let id = scene.node(obj).unwrap().id().to_string();
        // Index not rebuilt yet
        assert_eq!(scene.search_object_by_id(&id), Some(obj));

        scene.update_index_search_object();
        assert_eq!(scene.search_object_by_id(&id), Some(obj));
        assert_eq!(scene.search_object_by_id("missing"), None);
    }

    #[test]
    fn test_update_flushes_all_containers() {
        let mut scene = scene();
        let zone = scene.create_zone();
        let container = scene.create_container_object(zone).unwrap();
        scene.update();
        let obj = scene.create_empty_object(container).unwrap();
        assert!(scene.children(container).is_empty());

        scene.update();
        assert_eq!(scene.children(container), vec![obj]);
    }

    #[test]
    fn test_scene_and_node_names_are_separate() {
        let mut scene = scene();
        let zone = scene.create_zone();
        let lamp = scene.create_empty_object(zone).unwrap();
        scene.update_add_remove_object(zone, false);

        scene.set_scene_name("Harbor");
        assert!(scene.set_name(lamp, "Lamp"));
        assert_eq!(scene.name(), "Harbor");
        assert_eq!(scene.node(lamp).unwrap().name(), "Lamp");

        scene.load_serializable(&Definition::new(SCENE_TYPE_NAME).with("name", "Docks"));
        assert_eq!(scene.name(), "Docks");
        assert_eq!(scene.node(lamp).unwrap().name(), "Lamp");
    }
}
