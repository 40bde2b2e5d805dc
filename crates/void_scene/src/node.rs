//! Scene nodes
//!
//! Objects, containers and zones share one node type stored in the scene's
//! arena. The kind decides which operations apply; containers and zones
//! additionally carry [`ContainerData`].

use std::collections::HashMap;
use std::fmt;

use void_core::Handle;
use void_ecs::{Entity, DEFAULT_CULLING_LAYER};

use crate::component::Component;

/// Handle to a node in a [`Scene`](crate::Scene)
pub type NodeHandle = Handle<Node>;

/// What a node is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Plain object, no children
    Object,
    /// Object that owns an ordered child list
    Container,
    /// Root-level container, child of the scene itself
    Zone,
}

impl NodeKind {
    /// Runtime type name, as recorded in definitions
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Object => "GameObject",
            Self::Container => "ContainerObject",
            Self::Zone => "Zone",
        }
    }

    /// Parse a definition's type name
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "GameObject" => Some(Self::Object),
            "ContainerObject" => Some(Self::Container),
            "Zone" => Some(Self::Zone),
            _ => None,
        }
    }

    /// Containers and zones own children
    pub fn is_container(self) -> bool {
        !matches!(self, Self::Object)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Identity, template linkage and flags shared by every node kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    /// Process-unique ID
    pub id: String,
    /// Display name (not required unique)
    pub name: String,
    /// First name ever assigned
    pub default_name: String,
    /// Template instance group this node belongs to
    pub template_id: String,
    /// Template asset path, set on template roots only
    pub template_asset: String,
    /// Correlation key across template edits
    pub template_object_id: String,
    /// Local edits diverge from the template
    pub template_changed: bool,
    /// Enabled flag
    pub enable: bool,
    /// Visible flag
    pub visible: bool,
    /// Static flag
    pub is_static: bool,
    /// Own lock flag (see `Scene::is_lock` for the inherited value)
    pub lock: bool,
    /// Object exists only for the editor
    pub editor_object: bool,
    /// Editor may change this object
    pub enable_editor_change: bool,
    /// Editor may select this object
    pub enable_editor_select: bool,
    /// 32-bit culling mask
    pub culling_layer: u32,
}

impl Default for ObjectRecord {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            default_name: String::new(),
            template_id: String::new(),
            template_asset: String::new(),
            template_object_id: String::new(),
            template_changed: false,
            enable: true,
            visible: true,
            is_static: false,
            lock: false,
            editor_object: false,
            enable_editor_change: true,
            enable_editor_select: true,
            culling_layer: DEFAULT_CULLING_LAYER,
        }
    }
}

impl ObjectRecord {
    /// Node belongs to a template instance
    pub fn is_template_object(&self) -> bool {
        !self.template_id.is_empty()
    }

    /// Node is the root of a template instance
    pub fn is_template_asset(&self) -> bool {
        !self.template_asset.is_empty()
    }
}

/// Child list, lookup indices and pending mutation queues of a container
#[derive(Debug, Default)]
pub struct ContainerData {
    pub(crate) children: Vec<NodeHandle>,
    pub(crate) pending_add: Vec<NodeHandle>,
    pub(crate) pending_remove: Vec<NodeHandle>,
    pub(crate) by_name: HashMap<String, NodeHandle>,
    pub(crate) by_id: HashMap<String, NodeHandle>,
    pub(crate) last_generate_id: u32,
    pub(crate) dirty: bool,
}

impl ContainerData {
    /// Flushed children, in order
    pub fn flushed_children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// Children waiting for the next flush
    pub fn pending_add(&self) -> &[NodeHandle] {
        &self.pending_add
    }

    /// Children queued for removal at the next flush
    pub fn pending_remove(&self) -> &[NodeHandle] {
        &self.pending_remove
    }

    /// Check whether a flush has work to do
    pub fn has_pending(&self) -> bool {
        !self.pending_add.is_empty() || !self.pending_remove.is_empty()
    }

    pub(crate) fn is_pending_remove(&self, node: NodeHandle) -> bool {
        self.pending_remove.contains(&node)
    }
}

/// A node of the scene graph
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) record: ObjectRecord,
    pub(crate) components: Vec<Box<dyn Component>>,
    pub(crate) container: Option<ContainerData>,
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) zone: Option<NodeHandle>,
    pub(crate) entity: Option<Entity>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, parent: Option<NodeHandle>, zone: Option<NodeHandle>) -> Self {
        Self {
            kind,
            record: ObjectRecord::default(),
            components: Vec::new(),
            container: kind.is_container().then(ContainerData::default),
            parent,
            zone,
            entity: None,
        }
    }

    /// Node kind
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Runtime type name
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// Identity and flags
    pub fn record(&self) -> &ObjectRecord {
        &self.record
    }

    /// Process-unique ID
    pub fn id(&self) -> &str {
        &self.record.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.record.name
    }

    /// Name given when the node was created
    pub fn default_name(&self) -> &str {
        &self.record.default_name
    }

    /// Template instance group
    pub fn template_id(&self) -> &str {
        &self.record.template_id
    }

    /// Template asset path (template roots only)
    pub fn template_asset(&self) -> &str {
        &self.record.template_asset
    }

    /// Template correlation key
    pub fn template_object_id(&self) -> &str {
        &self.record.template_object_id
    }

    /// Local edits diverge from the template
    pub fn is_template_changed(&self) -> bool {
        self.record.template_changed
    }

    /// Node belongs to a template instance
    pub fn is_template_object(&self) -> bool {
        self.record.is_template_object()
    }

    /// Node is a template root
    pub fn is_template_asset(&self) -> bool {
        self.record.is_template_asset()
    }

    /// Enabled flag
    pub fn is_enable(&self) -> bool {
        self.record.enable
    }

    /// Visible flag
    pub fn is_visible(&self) -> bool {
        self.record.visible
    }

    /// Static flag
    pub fn is_static(&self) -> bool {
        self.record.is_static
    }

    /// Own lock flag, ignoring ancestors
    pub fn is_self_lock(&self) -> bool {
        self.record.lock
    }

    /// Culling mask
    pub fn culling_layer(&self) -> u32 {
        self.record.culling_layer
    }

    /// Parent container (`None` for zones)
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    /// Owning zone (a zone owns itself)
    pub fn zone(&self) -> Option<NodeHandle> {
        self.zone
    }

    /// Entity owned by this node
    pub fn entity(&self) -> Option<Entity> {
        self.entity
    }

    /// Check for child support
    pub fn is_container(&self) -> bool {
        self.container.is_some()
    }

    /// Container data, if this node is a container
    pub fn container(&self) -> Option<&ContainerData> {
        self.container.as_ref()
    }

    /// Components in order
    pub fn components(&self) -> &[Box<dyn Component>] {
        &self.components
    }

    /// Number of components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind)
            .field("id", &self.record.id)
            .field("name", &self.record.name)
            .field("components", &self.components.iter().map(|c| c.type_name()).collect::<Vec<_>>())
            .field("parent", &self.parent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        for kind in [NodeKind::Object, NodeKind::Container, NodeKind::Zone] {
            assert_eq!(NodeKind::from_type_name(kind.type_name()), Some(kind));
        }
        assert_eq!(NodeKind::from_type_name("Scene"), None);
        assert!(!NodeKind::Object.is_container());
        assert!(NodeKind::Zone.is_container());
    }

    #[test]
    fn test_record_defaults() {
        let record = ObjectRecord::default();
        assert!(record.enable && record.visible);
        assert!(!record.is_static && !record.lock);
        assert_eq!(record.culling_layer, 1);
        assert!(!record.is_template_object());
    }

    #[test]
    fn test_container_data_only_on_containers() {
        assert!(Node::new(NodeKind::Object, None, None).container().is_none());
        assert!(Node::new(NodeKind::Container, None, None).container().is_some());
    }
}
