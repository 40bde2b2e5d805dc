//! Entity store errors

use thiserror::Error;

use crate::Entity;

/// Errors raised by parent-index operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    /// Cycle detected in hierarchy
    #[error("Cycle detected in hierarchy: {entities:?}")]
    CycleDetected {
        /// Entities involved in the cycle
        entities: Vec<Entity>,
    },

    /// Invalid parent reference
    #[error("Invalid parent {parent:?} for child {child:?}")]
    InvalidParent {
        /// Child entity
        child: Entity,
        /// Invalid parent entity
        parent: Entity,
    },

    /// Entity not found
    #[error("Entity not found: {entity:?}")]
    EntityNotFound {
        /// Missing entity
        entity: Entity,
    },
}
