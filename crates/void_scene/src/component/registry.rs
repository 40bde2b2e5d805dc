//! Name-keyed component factories
//!
//! Definitions refer to components by type name. The registry maps each
//! name to a constructor plus the names of the components it requires, and
//! is filled once before any scene is built.

use std::collections::BTreeMap;
use std::fmt;

use super::{Component, ComponentType, TransformEuler, TransformMatrix};

/// Constructor stored per registered type
pub type ComponentConstructor = Box<dyn Fn() -> Box<dyn Component> + Send + Sync>;

/// One registered component type
pub struct ComponentEntry {
    /// Registry key
    pub type_name: String,
    /// Type names this component requires
    pub dependencies: Vec<String>,
    constructor: ComponentConstructor,
}

impl ComponentEntry {
    /// Build a fresh instance
    pub fn create(&self) -> Box<dyn Component> {
        (self.constructor)()
    }
}

impl fmt::Debug for ComponentEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentEntry")
            .field("type_name", &self.type_name)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// Registry of constructible component types
#[derive(Default)]
pub struct ComponentRegistry {
    by_name: BTreeMap<String, ComponentEntry>,
}

impl ComponentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the components the scene graph itself needs
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register::<TransformEuler>();
        registry.register::<TransformMatrix>();
        registry
    }

    /// Register a concrete component type
    pub fn register<T: ComponentType>(&mut self) -> &mut Self {
        self.register_fn(
            T::TYPE_NAME,
            T::DEPENDENCIES.iter().map(|d| d.to_string()).collect(),
            || Box::new(T::default()),
        )
    }

    /// Register a constructor under an explicit name
    pub fn register_fn<F>(&mut self, type_name: &str, dependencies: Vec<String>, constructor: F) -> &mut Self
    where
        F: Fn() -> Box<dyn Component> + Send + Sync + 'static,
    {
        if self.by_name.contains_key(type_name) {
            log::warn!("Component type '{}' registered twice, replacing", type_name);
        }
        self.by_name.insert(
            type_name.to_string(),
            ComponentEntry {
                type_name: type_name.to_string(),
                dependencies,
                constructor: Box::new(constructor),
            },
        );
        self
    }

    /// Look up a registered type
    pub fn get(&self, type_name: &str) -> Option<&ComponentEntry> {
        self.by_name.get(type_name)
    }

    /// Check if a type is registered
    pub fn contains(&self, type_name: &str) -> bool {
        self.by_name.contains_key(type_name)
    }

    /// Construct a component by name
    pub fn create(&self, type_name: &str) -> Option<Box<dyn Component>> {
        self.get(type_name).map(ComponentEntry::create)
    }

    /// Names the given type requires (empty for unknown types)
    pub fn dependencies(&self, type_name: &str) -> &[String] {
        self.get(type_name)
            .map(|e| e.dependencies.as_slice())
            .unwrap_or(&[])
    }

    /// Check whether `dependent` requires `dependency`
    pub fn depends_on(&self, dependent: &str, dependency: &str) -> bool {
        self.dependencies(dependent).iter().any(|d| d == dependency)
    }

    /// Registered type names in sorted order
    pub fn type_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.by_name.keys().map(String::as_str)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.by_name.values()).finish()
    }
}
