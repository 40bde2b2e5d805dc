//! # void_scene - Scene Graph & Template Sync
//!
//! Objects, containers and zones stored in an arena and addressed by
//! [`NodeHandle`], with:
//! - Ordered components with dependency resolution and a name-keyed registry
//! - Deferred child add/remove applied at explicit flush points
//! - Template (prefab) reconciliation keyed by `templateObjectId`
//! - Two-pass incremental import with bounded work per call
//!
//! ## Example
//!
//! ```ignore
//! use void_scene::prelude::*;
//!
//! let registry = Arc::new(ComponentRegistry::with_builtin());
//! let mut scene = Scene::new("Level", registry);
//!
//! let mut session = ImportSession::new();
//! session.begin_import_scene(&mut scene, &FileSource::new("assets"), "level.json")?;
//! while !session.update_load(&mut scene) {}
//!
//! let mut reload = ReloadSession::new();
//! reload.begin_reload_template(&scene, edited_template);
//! while !reload.reload_template(&mut scene) {}
//! ```

pub mod component;
pub mod components;
pub mod config;
pub mod container;
pub mod error;
pub mod importer;
pub mod node;
pub mod object;
pub mod reload;
pub mod scene;
pub mod serializer;
pub mod template;

pub use component::{
    Component, ComponentContext, ComponentRegistry, ComponentType, PlaceholderComponent, Transform,
    TransformEuler, TransformMatrix,
};
pub use config::SceneConfig;
pub use container::CHILDREN_BLOCK;
pub use error::{Result, SceneError};
pub use importer::{ImportSession, ImportState};
pub use node::{ContainerData, Node, NodeHandle, NodeKind, ObjectRecord};
pub use reload::{ReloadSession, ReloadState};
pub use scene::{Scene, SCENE_TYPE_NAME};
pub use serializer::COMPONENTS_BLOCK;
pub use template::TemplateSync;

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::component::{Component, ComponentRegistry, ComponentType, Transform};
    pub use crate::config::SceneConfig;
    pub use crate::error::{Result, SceneError};
    pub use crate::importer::ImportSession;
    pub use crate::node::{NodeHandle, NodeKind};
    pub use crate::reload::ReloadSession;
    pub use crate::scene::Scene;
    pub use crate::template::TemplateSync;
    pub use void_ir::{Definition, DefinitionSource, FileSource, MemorySource};
}
