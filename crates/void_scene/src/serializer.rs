//! Object definitions: export of nodes and subtrees, and loading one node's
//! attributes and components back
//!
//! A node definition is named after the node's type and holds the node
//! attributes, a `Components` block with one entry per serializable
//! component, and (containers only) a `Children` block.

use void_ecs::DEFAULT_CULLING_LAYER;
use void_ir::Definition;

use crate::container::CHILDREN_BLOCK;
use crate::node::NodeHandle;
use crate::scene::Scene;

/// Block holding an object's serialized components
pub const COMPONENTS_BLOCK: &str = "Components";

/// Attribute names of a node definition
pub mod attr {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const TEMPLATE_ID: &str = "templateId";
    pub const TEMPLATE_ASSET: &str = "templateAsset";
    pub const TEMPLATE_OBJECT_ID: &str = "templateObjectId";
    pub const TEMPLATE_CHANGED: &str = "templateChanged";
    pub const ENABLE: &str = "enable";
    pub const VISIBLE: &str = "visible";
    pub const STATIC: &str = "static";
    pub const LOCK: &str = "lock";
    pub const CULLING: &str = "culling";
}

impl Scene {
    /// Definition of one node: attributes and components, no children
    pub fn serialize_object(&self, node: NodeHandle) -> Option<Definition> {
        let n = self.nodes.get(node)?;
        let record = &n.record;

        let mut definition = Definition::new(n.kind.type_name())
            .with(attr::ID, record.id.as_str())
            .with(attr::NAME, record.name.as_str());
        if record.is_template_object() {
            definition.push(attr::TEMPLATE_ID, record.template_id.as_str());
            definition.push(attr::TEMPLATE_ASSET, record.template_asset.as_str());
            definition.push(attr::TEMPLATE_OBJECT_ID, record.template_object_id.as_str());
            definition.push(attr::TEMPLATE_CHANGED, record.template_changed);
        }
        definition.push(attr::ENABLE, record.enable);
        definition.push(attr::VISIBLE, record.visible);
        definition.push(attr::STATIC, record.is_static);
        definition.push(attr::LOCK, record.lock);
        definition.push(attr::CULLING, record.culling_layer);

        let mut components = Definition::new(COMPONENTS_BLOCK);
        for component in n.components.iter().filter(|c| c.is_serializable()) {
            components.add_object(component.create_serializable());
        }
        definition.add_object(components);
        Some(definition)
    }

    /// Definition of a whole subtree
    pub fn export_object(&self, node: NodeHandle) -> Option<Definition> {
        let mut definition = self.serialize_object(node)?;
        if self.nodes.get(node)?.is_container() {
            let mut children = Definition::new(CHILDREN_BLOCK);
            for child in self.children(node) {
                if let Some(exported) = self.export_object(child) {
                    children.add_object(exported);
                }
            }
            definition.add_object(children);
        }
        Some(definition)
    }

    /// Definition of the whole scene: scene attributes plus every zone
    pub fn export_scene(&self) -> Definition {
        let mut definition = self.create_serializable();
        let mut zones = Definition::new(CHILDREN_BLOCK);
        for &zone in &self.zones {
            if let Some(exported) = self.export_object(zone) {
                zones.add_object(exported);
            }
        }
        definition.add_object(zones);
        definition
    }

    /// Load one node's attributes and components from a definition
    ///
    /// Children are not touched. Absent attributes take their defaults,
    /// except the ID and name which keep their current values. Components
    /// named in the definition are created when missing (as placeholders if
    /// the type is unknown); components the definition omits are left alone.
    pub fn load_object(&mut self, node: NodeHandle, definition: &Definition) {
        self.load_object_with(node, definition, true);
    }

    /// [`Scene::load_object`], optionally ignoring the stored ID
    pub(crate) fn load_object_with(&mut self, node: NodeHandle, definition: &Definition, load_id: bool) {
        if !self.nodes.contains(node) {
            return;
        }

        let stored_id = definition.get_str(attr::ID).filter(|id| !id.is_empty() && load_id);
        if let Some(id) = stored_id {
            if !self.set_id(node, id) {
                log::warn!("Object ID '{}' already in use, keeping {:?}'s current ID", id, node);
            }
        }
        if let Some(name) = definition.get_str(attr::NAME).filter(|name| !name.is_empty()) {
            self.set_name(node, name);
        }

        let text = |key: &str| definition.get_str(key).unwrap_or_default().to_string();
        if let Some(n) = self.nodes.get_mut(node) {
            n.record.template_id = text(attr::TEMPLATE_ID);
            n.record.template_asset = text(attr::TEMPLATE_ASSET);
            n.record.template_object_id = text(attr::TEMPLATE_OBJECT_ID);
            n.record.template_changed = definition.get_bool(attr::TEMPLATE_CHANGED).unwrap_or(false);
            n.record.enable = definition.get_bool(attr::ENABLE).unwrap_or(true);
            n.record.is_static = definition.get_bool(attr::STATIC).unwrap_or(false);
            n.record.lock = definition.get_bool(attr::LOCK).unwrap_or(false);
        }
        self.set_visible(node, definition.get_bool(attr::VISIBLE).unwrap_or(true));
        self.set_culling_layer(
            node,
            definition.get_u32(attr::CULLING).unwrap_or(DEFAULT_CULLING_LAYER),
        );

        if let Some(components) = definition.object(COMPONENTS_BLOCK) {
            for data in components.objects() {
                let Some(index) = self.ensure_component(node, &data.name) else {
                    continue;
                };
                if let Some(component) = self
                    .nodes
                    .get_mut(node)
                    .and_then(|n| n.components.get_mut(index))
                {
                    component.load_serializable(data);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use glam::{Mat4, Vec3};

    use crate::component::{Component, ComponentRegistry, PlaceholderComponent, TransformMatrix};
    use crate::scene::SCENE_TYPE_NAME;

    fn scene() -> (Scene, NodeHandle) {
        let mut scene = Scene::new("Test", Arc::new(ComponentRegistry::with_builtin()));
        let zone = scene.create_zone();
        (scene, zone)
    }

    #[test]
    fn test_template_keys_only_on_template_objects() {
        let (mut scene, zone) = scene();
        let obj = scene.create_empty_object(zone).unwrap();

        let plain = scene.serialize_object(obj).unwrap();
        assert!(!plain.contains(attr::TEMPLATE_ID));
        assert_eq!(plain.name, "GameObject");
        assert_eq!(plain.get_u32(attr::CULLING), Some(1));

        scene.set_template_id(obj, "T");
        scene.set_template_object_id(obj, "key");
        let linked = scene.serialize_object(obj).unwrap();
        assert_eq!(linked.get_str(attr::TEMPLATE_OBJECT_ID), Some("key"));
        assert_eq!(linked.get_bool(attr::TEMPLATE_CHANGED), Some(false));
    }

    #[test]
    fn test_export_and_load_round_trip() {
        let (mut scene, zone) = scene();
        let room = scene.create_container_object(zone).unwrap();
        scene.update_add_remove_object(zone, false);
        let lamp = scene.create_empty_object(room).unwrap();
        scene.update_add_remove_object(room, false);
        scene.set_name(lamp, "Lamp");
        scene.set_static(lamp, true);
        scene.set_culling_layer(lamp, 0b110);
        scene.set_relative_transform(lamp, Mat4::from_translation(Vec3::new(0.0, 3.0, 0.0)));

        let exported = scene.export_object(room).unwrap();
        let children = exported.object(CHILDREN_BLOCK).unwrap();
        assert_eq!(children.objects().count(), 1);

        let (mut other, other_zone) = self::scene();
        let copy = other.create_object(other_zone, &exported, false).unwrap();
        other.update_add_remove_object(other_zone, false);
        assert_eq!(other.export_object(copy), Some(exported));

        let lamp_copy = other.children(copy)[0];
        let node = other.node(lamp_copy).unwrap();
        assert!(node.is_static());
        assert_eq!(node.culling_layer(), 0b110);
        approx::assert_relative_eq!(other.position(lamp_copy).y, 3.0);
    }

    #[test]
    fn test_load_defaults_keep_identity() {
        let (mut scene, zone) = scene();
        let obj = scene.create_empty_object(zone).unwrap();
        scene.set_static(obj, true);
        scene.set_visible(obj, false);
        let id = scene.node(obj).unwrap().id().to_string();
        let name = scene.node(obj).unwrap().name().to_string();

        scene.load_object(obj, &Definition::new("GameObject"));
        let node = scene.node(obj).unwrap();
        assert_eq!(node.id(), id);
        assert_eq!(node.name(), name);
        assert!(!node.is_static());
        assert!(node.is_visible());
    }

    #[test]
    fn test_unknown_component_round_trips() {
        let (mut scene, zone) = scene();
        let obj = scene.create_empty_object(zone).unwrap();
        let water = Definition::new("Water")
            .with("depth", 2.5)
            .with_object(Definition::new("Waves").with("height", 0.3));
        let definition = Definition::new("GameObject")
            .with_object(Definition::new(COMPONENTS_BLOCK).with_object(water.clone()));

        scene.load_object(obj, &definition);
        let placeholder = scene.get_component::<PlaceholderComponent>(obj).unwrap();
        assert_eq!(placeholder.original_type_name(), "Water");

        let saved = scene.serialize_object(obj).unwrap();
        assert_eq!(saved.object(COMPONENTS_BLOCK).and_then(|c| c.object("Water")), Some(&water));
    }

    #[test]
    fn test_load_switches_transform_kind() {
        let (mut scene, zone) = scene();
        let obj = scene.create_empty_object(zone).unwrap();
        let matrix = TransformMatrix {
            relative: Mat4::from_translation(Vec3::new(7.0, 0.0, 0.0)),
        };
        let definition = Definition::new("GameObject").with_object(
            Definition::new(COMPONENTS_BLOCK).with_object(matrix.create_serializable()),
        );

        scene.load_object(obj, &definition);
        assert_eq!(scene.component_type_names(obj), vec!["TransformMatrix"]);
        approx::assert_relative_eq!(scene.relative_transform(obj).w_axis.x, 7.0);
    }

    #[test]
    fn test_export_scene_lists_zones() {
        let (mut scene, _) = scene();
        scene.create_zone();
        let exported = scene.export_scene();
        assert_eq!(exported.name, SCENE_TYPE_NAME);
        assert_eq!(exported.get_str("name"), Some("Test"));
        assert_eq!(exported.object(CHILDREN_BLOCK).unwrap().objects().count(), 2);
    }
}
