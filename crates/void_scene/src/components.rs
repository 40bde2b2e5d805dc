//! Component operations on scene objects
//!
//! Components are kept in an ordered list per object. Adding a component
//! resolves the dependencies it declares in the registry; adding a second
//! transform-capable component replaces the first and keeps its matrix.

use glam::Mat4;

use crate::component::{Component, ComponentContext, ComponentType, PlaceholderComponent};
use crate::node::NodeHandle;
use crate::scene::Scene;

impl Scene {
    // ========================================================================
    // Add
    // ========================================================================

    /// Construct and attach a component of type `T`
    ///
    /// Returns the attached instance. If `T` is a transform, the existing
    /// transform component is replaced and its relative matrix carried over.
    pub fn add_component<T: ComponentType>(&mut self, node: NodeHandle) -> Option<&mut T> {
        let index = self.attach_component(node, Box::new(T::default()))?;
        self.resolve_dependencies(node, T::DEPENDENCIES.iter().map(|d| d.to_string()).collect());
        self.resolve_dependencies(node, self.registry.dependencies(T::TYPE_NAME).to_vec());

        self.nodes
            .get_mut(node)?
            .components
            .get_mut(index)?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    /// Construct a component through the registry and attach it
    ///
    /// Returns false when the name is not registered.
    pub fn add_component_by_type_name(&mut self, node: NodeHandle, type_name: &str) -> bool {
        let Some(component) = self.registry.create(type_name) else {
            return false;
        };
        if self.attach_component(node, component).is_none() {
            return false;
        }
        self.resolve_dependencies(node, self.registry.dependencies(type_name).to_vec());
        true
    }

    /// Attach a component built by the caller
    pub fn add_component_boxed(&mut self, node: NodeHandle, component: Box<dyn Component>) -> bool {
        let type_name = component.type_name().to_string();
        if self.attach_component(node, component).is_none() {
            return false;
        }
        self.resolve_dependencies(node, self.registry.dependencies(&type_name).to_vec());
        true
    }

    /// Attach a placeholder standing in for an unknown component type
    pub fn add_placeholder_component(&mut self, node: NodeHandle, type_name: &str) -> bool {
        self.attach_component(node, Box::new(PlaceholderComponent::new(type_name)))
            .is_some()
    }

    /// Return the component with this type name, adding it (or a placeholder) if missing
    pub(crate) fn ensure_component(&mut self, node: NodeHandle, type_name: &str) -> Option<usize> {
        if let Some(index) = self.component_position(node, type_name) {
            return Some(index);
        }
        if !self.add_component_by_type_name(node, type_name) {
            log::warn!("Found unsupported component '{}', keeping a placeholder", type_name);
            self.add_placeholder_component(node, type_name);
        }
        self.component_position(node, type_name)
    }

    fn attach_component(&mut self, node: NodeHandle, mut component: Box<dyn Component>) -> Option<usize> {
        let n = self.nodes.get_mut(node)?;

        if component.as_transform().is_some() {
            let existing = n
                .components
                .iter()
                .position(|c| c.as_transform().is_some());
            if let Some(existing) = existing {
                let previous = n.components.remove(existing);
                let relative = previous
                    .as_transform()
                    .map(|t| t.relative_transform())
                    .unwrap_or(Mat4::IDENTITY);
                if let Some(transform) = component.as_transform_mut() {
                    transform.set_relative_transform(relative);
                }
                log::debug!(
                    "Replaced transform {} with {} on {:?}",
                    previous.type_name(),
                    component.type_name(),
                    node
                );
            }
        }

        let mut ctx = ComponentContext {
            owner: node,
            entity: n.entity,
            store: self.entities.as_mut(),
        };
        component.init_component(&mut ctx);
        n.components.push(component);
        Some(n.components.len() - 1)
    }

    fn resolve_dependencies(&mut self, node: NodeHandle, dependencies: Vec<String>) {
        for dependency in dependencies {
            if self.component_position(node, &dependency).is_some() {
                continue;
            }
            if !self.add_component_by_type_name(node, &dependency) {
                log::warn!("Dependency '{}' is not registered, skipping", dependency);
            }
        }
    }

    // ========================================================================
    // Query
    // ========================================================================

    /// First component of concrete type `T`
    pub fn get_component<T: Component>(&self, node: NodeHandle) -> Option<&T> {
        self.nodes
            .get(node)?
            .components
            .iter()
            .find_map(|c| c.as_any().downcast_ref::<T>())
    }

    /// Mutable access to the first component of concrete type `T`
    pub fn get_component_mut<T: Component>(&mut self, node: NodeHandle) -> Option<&mut T> {
        self.nodes
            .get_mut(node)?
            .components
            .iter_mut()
            .find_map(|c| c.as_any_mut().downcast_mut::<T>())
    }

    /// First component with this type name (placeholders match by the name they stand in for)
    pub fn get_component_by_type_name(&self, node: NodeHandle, type_name: &str) -> Option<&dyn Component> {
        self.nodes
            .get(node)?
            .components
            .iter()
            .find(|c| c.type_name() == type_name)
            .map(|c| c.as_ref())
    }

    /// Position of the first component with this type name
    pub fn component_position(&self, node: NodeHandle, type_name: &str) -> Option<usize> {
        self.nodes
            .get(node)?
            .components
            .iter()
            .position(|c| c.type_name() == type_name)
    }

    /// Type names of the components, in order
    pub fn component_type_names(&self, node: NodeHandle) -> Vec<String> {
        self.nodes
            .get(node)
            .map(|n| n.components.iter().map(|c| c.type_name().to_string()).collect())
            .unwrap_or_default()
    }

    /// Number of serializable components
    pub fn serializable_component_count(&self, node: NodeHandle) -> usize {
        self.nodes
            .get(node)
            .map(|n| n.components.iter().filter(|c| c.is_serializable()).count())
            .unwrap_or(0)
    }

    /// Check whether some component other than `exclude` requires `type_name`
    pub fn is_dependency_of_present(&self, node: NodeHandle, type_name: &str, exclude: usize) -> bool {
        let Some(n) = self.nodes.get(node) else {
            return false;
        };
        n.components
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != exclude)
            .any(|(_, c)| self.registry.depends_on(c.type_name(), type_name))
    }

    // ========================================================================
    // Remove
    // ========================================================================

    /// Detach and drop the first component of type `T`
    pub fn remove_component<T: Component>(&mut self, node: NodeHandle) -> bool {
        let position = self.nodes.get(node).and_then(|n| {
            n.components
                .iter()
                .position(|c| c.as_any().downcast_ref::<T>().is_some())
        });
        match position {
            Some(index) => self.remove_component_at(node, index),
            None => false,
        }
    }

    /// Detach and drop the first component with this type name
    pub fn remove_component_by_type_name(&mut self, node: NodeHandle, type_name: &str) -> bool {
        match self.component_position(node, type_name) {
            Some(index) => self.remove_component_at(node, index),
            None => false,
        }
    }

    /// Detach and drop the component at `index`
    pub fn remove_component_at(&mut self, node: NodeHandle, index: usize) -> bool {
        let Some(n) = self.nodes.get_mut(node) else {
            return false;
        };
        if index >= n.components.len() {
            return false;
        }
        let removed = n.components.remove(index);
        log::trace!("Removed component {} from {:?}", removed.type_name(), node);
        true
    }

    /// Drop every component
    pub fn release_all_components(&mut self, node: NodeHandle) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.components.clear();
        }
    }

    // ========================================================================
    // Ordering
    // ========================================================================

    /// Swap the component at `index` with its predecessor
    pub fn move_component_up(&mut self, node: NodeHandle, index: usize) -> bool {
        let Some(n) = self.nodes.get_mut(node) else {
            return false;
        };
        if index == 0 || index >= n.components.len() {
            return false;
        }
        n.components.swap(index - 1, index);
        true
    }

    /// Swap the component at `index` with its successor
    pub fn move_component_down(&mut self, node: NodeHandle, index: usize) -> bool {
        let Some(n) = self.nodes.get_mut(node) else {
            return false;
        };
        if index + 1 >= n.components.len() {
            return false;
        }
        n.components.swap(index, index + 1);
        true
    }

    /// Swap the component at `index` with the previous serializable one
    pub fn move_serializable_component_up(&mut self, node: NodeHandle, index: usize) -> bool {
        let Some(n) = self.nodes.get_mut(node) else {
            return false;
        };
        if index >= n.components.len() {
            return false;
        }
        match (0..index).rev().find(|&i| n.components[i].is_serializable()) {
            Some(target) => {
                n.components.swap(target, index);
                true
            }
            None => false,
        }
    }

    /// Swap the component at `index` with the next serializable one
    pub fn move_serializable_component_down(&mut self, node: NodeHandle, index: usize) -> bool {
        let Some(n) = self.nodes.get_mut(node) else {
            return false;
        };
        let len = n.components.len();
        if index >= len {
            return false;
        }
        match (index + 1..len).find(|&i| n.components[i].is_serializable()) {
            Some(target) => {
                n.components.swap(index, target);
                true
            }
            None => false,
        }
    }

    /// Reorder serializable components to follow `order`
    ///
    /// Only the slots holding serializable components are permuted; other
    /// components keep their positions. Names missing from `order` sort
    /// after the listed ones, keeping their relative order.
    pub fn sort_components(&mut self, node: NodeHandle, order: &[String]) {
        let Some(n) = self.nodes.get_mut(node) else {
            return;
        };

        let slots: Vec<usize> = n
            .components
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_serializable())
            .map(|(i, _)| i)
            .collect();

        let rank = |c: &dyn Component| {
            order
                .iter()
                .position(|name| name == c.type_name())
                .unwrap_or(usize::MAX)
        };

        let mut taken: Vec<Option<Box<dyn Component>>> =
            n.components.drain(..).map(Some).collect();
        let mut serializable: Vec<Box<dyn Component>> =
            slots.iter().filter_map(|&i| taken[i].take()).collect();
        serializable.sort_by_key(|c| rank(c.as_ref()));

        let mut sorted = serializable.into_iter();
        for (i, slot) in taken.iter_mut().enumerate() {
            if slots.contains(&i) {
                *slot = sorted.next();
            }
        }
        n.components = taken.into_iter().flatten().collect();
    }

    // ========================================================================
    // Lifecycle hooks
    // ========================================================================

    fn for_each_component<F>(&mut self, node: NodeHandle, only_enabled: bool, mut hook: F)
    where
        F: FnMut(&mut dyn Component, &mut ComponentContext<'_>),
    {
        let Some(n) = self.nodes.get_mut(node) else {
            return;
        };
        let mut ctx = ComponentContext {
            owner: node,
            entity: n.entity,
            store: self.entities.as_mut(),
        };
        for component in n.components.iter_mut() {
            if only_enabled && !component.is_enabled() {
                continue;
            }
            hook(component.as_mut(), &mut ctx);
        }
    }

    /// Run `start_component` on every component (after loading)
    pub fn start_components(&mut self, node: NodeHandle) {
        self.for_each_component(node, false, |c, ctx| c.start_component(ctx));
    }

    /// Run `update_component` on every enabled component
    pub fn update_object(&mut self, node: NodeHandle) {
        self.for_each_component(node, true, |c, ctx| c.update_component(ctx));
    }

    /// Run `end_update` on every enabled component
    pub fn end_update(&mut self, node: NodeHandle) {
        self.for_each_component(node, true, |c, ctx| c.end_update(ctx));
    }
}
