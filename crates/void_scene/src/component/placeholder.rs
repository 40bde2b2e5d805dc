//! Stand-in for components this build cannot construct
//!
//! The placeholder keeps the whole definition block it was loaded from and
//! writes it back unchanged, so saving a scene that references unknown
//! components loses nothing.

use std::any::Any;

use void_ir::Definition;

use super::Component;

/// Verbatim holder for an unsupported component block
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderComponent {
    data: Definition,
}

impl PlaceholderComponent {
    /// Create a placeholder for `type_name` with no fields yet
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            data: Definition::new(type_name),
        }
    }

    /// Name of the component type this stands in for
    pub fn original_type_name(&self) -> &str {
        &self.data.name
    }

    /// Captured definition block
    pub fn data(&self) -> &Definition {
        &self.data
    }
}

impl Component for PlaceholderComponent {
    fn type_name(&self) -> &str {
        &self.data.name
    }

    fn create_serializable(&self) -> Definition {
        self.data.clone()
    }

    fn load_serializable(&mut self, data: &Definition) {
        // Keep our own name even if the block was renamed by the caller
        let name = std::mem::take(&mut self.data.name);
        self.data = data.clone();
        self.data.name = name;
    }

    fn is_placeholder(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
