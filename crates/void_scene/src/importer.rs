//! Incremental import of scenes and templates
//!
//! An [`ImportSession`] reads a definition stream twice. The skeleton pass
//! creates every zone, container and object in stream order and records them
//! in a flat list. The hydration pass rewinds the stream and, a bounded
//! number of nodes per [`ImportSession::update_load`] call, loads each
//! node's attributes and components in the same order.
//!
//! # Example
//!
//! ```ignore
//! let mut session = ImportSession::new();
//! session.begin_import_scene(&mut scene, &source, "levels/dock.json")?;
//!
//! // once per frame
//! if session.update_load(&mut scene) {
//!     log::info!("loaded {} objects", session.total_objects());
//! } else if session.is_stalled() {
//!     // truncated stream, give up
//! }
//! ```

use void_ir::{Definition, DefinitionReader, DefinitionSource, ParseStop, ReadEvent, StreamError};

use crate::container::CHILDREN_BLOCK;
use crate::error::{Result, SceneError};
use crate::node::{NodeHandle, NodeKind};
use crate::scene::{Scene, SCENE_TYPE_NAME};
use crate::serializer::COMPONENTS_BLOCK;

/// Phase of an [`ImportSession`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ImportState {
    /// Nothing started
    #[default]
    Idle,
    /// Every node exists; no node has been hydrated yet
    SkeletonBuilt,
    /// Hydration in progress
    Hydrating,
    /// Every node hydrated and flushed into its container
    Done,
}

/// Where the reader is in the definition tree
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Frame {
    /// Outside everything, expecting a `Scene`
    Root,
    /// Inside the `Scene` object
    Scene,
    /// Inside a `Children` block; `None` for the scene's zone list or an unplaceable parent
    Children(Option<NodeHandle>),
    /// Inside a node definition
    Node(Option<NodeHandle>),
}

fn malformed(err: StreamError) -> SceneError {
    SceneError::Malformed(err.to_string())
}

/// A resumable two-pass import
pub struct ImportSession {
    state: ImportState,
    path: String,
    reader: Option<Box<dyn DefinitionReader>>,
    base: Frame,
    frames: Vec<Frame>,
    /// Created nodes in stream order; `None` for nodes that could not be placed
    slots: Vec<Option<NodeHandle>>,
    cursor: usize,
    saw_scene: bool,
    scene_pending: bool,
    generate_id: bool,
    touched: Vec<NodeHandle>,
    stalled: bool,
}

impl Default for ImportSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportSession {
    /// Create an idle session
    pub fn new() -> Self {
        Self {
            state: ImportState::Idle,
            path: String::new(),
            reader: None,
            base: Frame::Root,
            frames: Vec::new(),
            slots: Vec::new(),
            cursor: 0,
            saw_scene: false,
            scene_pending: false,
            generate_id: false,
            touched: Vec::new(),
            stalled: false,
        }
    }

    // ========================================================================
    // Begin
    // ========================================================================

    /// Open a scene stream and build its skeleton
    ///
    /// Zones are appended after the scene's existing zones and keep their
    /// stored IDs.
    ///
    /// # Errors
    ///
    /// - [`SceneError::MissingStream`] if the stream cannot be opened (nothing is created)
    /// - [`SceneError::Malformed`] if the stream does not start with a scene
    pub fn begin_import_scene(&mut self, scene: &mut Scene, source: &dyn DefinitionSource, path: &str) -> Result<()> {
        let reader = source.open(path)?;
        self.reset(path, reader, Frame::Root, false);
        self.scene_pending = true;
        self.build_skeleton(scene)
    }

    /// Open a template stream and build its skeleton under `target`
    ///
    /// Every created node gets a fresh ID.
    ///
    /// # Errors
    ///
    /// - [`SceneError::InvalidHandle`] / [`SceneError::Structural`] if `target` is not a live container
    /// - [`SceneError::MissingStream`] if the stream cannot be opened (nothing is created)
    /// - [`SceneError::Malformed`] if the stream does not start with an object
    pub fn begin_import_template(
        &mut self,
        scene: &mut Scene,
        target: NodeHandle,
        source: &dyn DefinitionSource,
        path: &str,
    ) -> Result<()> {
        let node = scene.try_node(target)?;
        if !node.is_container() {
            return Err(SceneError::Structural(format!(
                "{} cannot hold a template instance",
                node.type_name()
            )));
        }
        let reader = source.open(path)?;
        self.reset(path, reader, Frame::Children(Some(target)), true);
        self.build_skeleton(scene)
    }

    fn reset(&mut self, path: &str, reader: Box<dyn DefinitionReader>, base: Frame, generate_id: bool) {
        *self = Self {
            path: path.to_string(),
            reader: Some(reader),
            base,
            frames: vec![base],
            generate_id,
            ..Self::new()
        };
    }

    // ========================================================================
    // Skeleton pass
    // ========================================================================

    fn build_skeleton(&mut self, scene: &mut Scene) -> Result<()> {
        let Some(mut reader) = self.reader.take() else {
            return Ok(());
        };
        let result = self.walk_skeleton(scene, reader.as_mut());
        reader.rewind();
        self.reader = Some(reader);
        self.frames = vec![self.base];

        match result {
            Ok(()) => {}
            Err(StreamError::UnexpectedEnd { object }) => {
                log::warn!(
                    "Definition stream '{}' ends inside '{}', {} objects created",
                    self.path,
                    object,
                    self.slots.len()
                );
            }
            Err(err) => return Err(malformed(err)),
        }
        let empty = match self.base {
            Frame::Root => !self.saw_scene,
            _ => self.slots.is_empty(),
        };
        if empty {
            self.state = ImportState::Idle;
            return Err(SceneError::Malformed(format!("'{}' holds no importable object", self.path)));
        }

        self.state = ImportState::SkeletonBuilt;
        log::debug!("Built skeleton of '{}': {} objects", self.path, self.slots.len());
        Ok(())
    }

    fn walk_skeleton(
        &mut self,
        scene: &mut Scene,
        reader: &mut dyn DefinitionReader,
    ) -> std::result::Result<(), StreamError> {
        let mut frames = vec![self.base];

        while let Some(event) = reader.next_event() {
            let name = match event {
                ReadEvent::BeginObject { name } => name,
                ReadEvent::EndObject => {
                    frames.pop();
                    continue;
                }
                ReadEvent::Property { .. } => continue,
            };

            match frames.last().copied() {
                Some(Frame::Root) if name == SCENE_TYPE_NAME => {
                    self.saw_scene = true;
                    frames.push(Frame::Scene);
                }
                Some(Frame::Scene) if name == CHILDREN_BLOCK => frames.push(Frame::Children(None)),
                Some(Frame::Node(node)) if name == CHILDREN_BLOCK => frames.push(Frame::Children(node)),
                Some(Frame::Node(node)) if name == COMPONENTS_BLOCK => {
                    let block = Definition::parse_body(reader, name)?;
                    if let Some(node) = node {
                        for component in block.objects() {
                            scene.ensure_component(node, &component.name);
                        }
                    }
                }
                Some(Frame::Children(parent)) => match NodeKind::from_type_name(&name) {
                    Some(kind) => {
                        let node = self.place(scene, parent, kind);
                        self.slots.push(node);
                        match node {
                            Some(_) => frames.push(Frame::Node(node)),
                            None => {
                                Definition::parse_body(reader, name)?;
                            }
                        }
                    }
                    None => {
                        log::warn!("Skipping unknown node type '{}' in '{}'", name, self.path);
                        Definition::parse_body(reader, name)?;
                    }
                },
                _ => {
                    Definition::parse_body(reader, name)?;
                }
            }
        }

        if frames.len() > 1 {
            return Err(StreamError::UnexpectedEnd {
                object: self.path.clone(),
            });
        }
        Ok(())
    }

    fn place(&mut self, scene: &mut Scene, parent: Option<NodeHandle>, kind: NodeKind) -> Option<NodeHandle> {
        let Some(parent) = parent else {
            if kind == NodeKind::Zone && self.base == Frame::Root {
                return Some(scene.create_zone());
            }
            log::warn!("Cannot place a {} here in '{}'", kind, self.path);
            return None;
        };

        let node = match kind {
            NodeKind::Object => scene.create_empty_object(parent),
            NodeKind::Container => scene.create_container_object(parent),
            NodeKind::Zone => {
                log::warn!("Zone nested in a container in '{}', importing as a container", self.path);
                scene.create_container_object(parent)
            }
        };
        if node.is_some() && !self.touched.contains(&parent) {
            self.touched.push(parent);
        }
        node
    }

    // ========================================================================
    // Hydration pass
    // ========================================================================

    /// Hydrate up to `load_step` nodes
    ///
    /// Returns true once every node is hydrated. A stream that ends early
    /// stalls the session: every later call returns false and
    /// [`ImportSession::is_stalled`] reports it.
    pub fn update_load(&mut self, scene: &mut Scene) -> bool {
        match self.state {
            ImportState::Done => return true,
            ImportState::Idle => return false,
            ImportState::SkeletonBuilt => self.state = ImportState::Hydrating,
            ImportState::Hydrating => {}
        }
        if self.stalled {
            return false;
        }
        let Some(mut reader) = self.reader.take() else {
            return false;
        };

        let result = self.hydrate_step(scene, reader.as_mut());
        self.reader = Some(reader);

        match result {
            Ok(true) => {
                self.finish(scene);
                true
            }
            Ok(false) => false,
            Err(err) => {
                log::warn!(
                    "Import of '{}' stalled at {}/{}: {}",
                    self.path,
                    self.cursor,
                    self.slots.len(),
                    err
                );
                self.stalled = true;
                false
            }
        }
    }

    fn is_complete(&self) -> bool {
        self.cursor >= self.slots.len() && !self.scene_pending
    }

    fn hydrate_step(&mut self, scene: &mut Scene, reader: &mut dyn DefinitionReader) -> Result<bool> {
        let budget = scene.config().load_step.max(1);
        let mut steps = 0;

        while steps < budget {
            if self.is_complete() {
                return Ok(true);
            }
            let Some(event) = reader.next_event() else {
                return Err(SceneError::Malformed(format!(
                    "stream ended after {} of {} objects",
                    self.cursor,
                    self.slots.len()
                )));
            };
            let name = match event {
                ReadEvent::BeginObject { name } => name,
                ReadEvent::EndObject => {
                    self.frames.pop();
                    continue;
                }
                ReadEvent::Property { .. } => continue,
            };

            match self.frames.last().copied() {
                Some(Frame::Root) if name == SCENE_TYPE_NAME => {
                    let (definition, stop) =
                        Definition::parse_until(reader, name, Some(CHILDREN_BLOCK)).map_err(malformed)?;
                    scene.load_serializable(&definition);
                    self.scene_pending = false;
                    if stop == ParseStop::AtBlock {
                        self.frames.push(Frame::Scene);
                        self.frames.push(Frame::Children(None));
                    }
                }
                Some(Frame::Children(_)) if NodeKind::from_type_name(&name).is_some() => {
                    let slot = self.slots.get(self.cursor).copied().flatten();
                    steps += 1;

                    let Some(node) = slot else {
                        Definition::parse_body(reader, name).map_err(malformed)?;
                        self.cursor += 1;
                        continue;
                    };
                    let (definition, stop) =
                        Definition::parse_until(reader, name, Some(CHILDREN_BLOCK)).map_err(malformed)?;
                    scene.load_object_with(node, &definition, !self.generate_id);
                    scene.start_components(node);
                    self.cursor += 1;
                    if stop == ParseStop::AtBlock {
                        self.frames.push(Frame::Node(Some(node)));
                        self.frames.push(Frame::Children(Some(node)));
                    }
                }
                _ => {
                    Definition::parse_body(reader, name).map_err(malformed)?;
                }
            }
        }

        Ok(self.is_complete())
    }

    fn finish(&mut self, scene: &mut Scene) {
        for &container in &self.touched {
            scene.update_add_remove_object(container, false);
        }
        scene.update_index_search_object();
        self.state = ImportState::Done;
        log::info!("Imported '{}': {} objects", self.path, self.slots.len());
    }

    // ========================================================================
    // Progress
    // ========================================================================

    /// Current phase
    pub fn state(&self) -> ImportState {
        self.state
    }

    /// Check whether every node is hydrated
    pub fn is_done(&self) -> bool {
        self.state == ImportState::Done
    }

    /// Check whether a truncated stream stopped hydration
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    /// Number of nodes found by the skeleton pass
    pub fn total_objects(&self) -> usize {
        self.slots.len()
    }

    /// Number of nodes hydrated so far
    pub fn loaded_objects(&self) -> usize {
        self.cursor.min(self.slots.len())
    }

    /// Hydration progress in percent
    pub fn loading_percent(&self) -> f32 {
        if self.slots.is_empty() {
            return if self.is_done() { 100.0 } else { 0.0 };
        }
        self.loaded_objects() as f32 * 100.0 / self.slots.len() as f32
    }

    /// Created nodes in stream order
    pub fn objects(&self) -> Vec<NodeHandle> {
        self.slots.iter().flatten().copied().collect()
    }

    /// First created node (the root of an imported template)
    pub fn root(&self) -> Option<NodeHandle> {
        self.slots.iter().flatten().next().copied()
    }

    // ========================================================================
    // Synchronous helpers
    // ========================================================================

    /// Import a template under `target` in one go and return its root
    ///
    /// # Errors
    ///
    /// Everything [`ImportSession::begin_import_template`] reports, plus
    /// [`SceneError::Malformed`] if hydration stalls.
    pub fn import_template(
        scene: &mut Scene,
        target: NodeHandle,
        source: &dyn DefinitionSource,
        path: &str,
    ) -> Result<NodeHandle> {
        let mut session = Self::new();
        session.begin_import_template(scene, target, source, path)?;
        while !session.update_load(scene) {
            if session.is_stalled() {
                return Err(SceneError::Malformed(format!("'{}' is truncated", path)));
            }
        }
        session
            .root()
            .ok_or_else(|| SceneError::Malformed(format!("'{}' holds no importable object", path)))
    }

    /// Import a template into `zone`, export it, then remove the instance
    pub fn import_template_to_definition(
        scene: &mut Scene,
        zone: NodeHandle,
        source: &dyn DefinitionSource,
        path: &str,
    ) -> Result<Definition> {
        let root = Self::import_template(scene, zone, source, path)?;
        let definition = scene.export_object(root).ok_or(SceneError::InvalidHandle(root))?;
        scene.remove(root);
        if let Some(parent) = scene.node(root).and_then(|n| n.parent()) {
            scene.update_add_remove_object(parent, false);
        }
        Ok(definition)
    }
}

impl std::fmt::Debug for ImportSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportSession")
            .field("state", &self.state)
            .field("path", &self.path)
            .field("loaded", &self.cursor)
            .field("total", &self.slots.len())
            .field("stalled", &self.stalled)
            .finish()
    }
}
