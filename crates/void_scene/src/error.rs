//! Error types for the scene graph

use thiserror::Error;

use void_ir::StreamError;

use crate::node::NodeHandle;

/// Scene graph errors
///
/// Steady-state operations recover locally and report through `bool` or
/// `Option`; these values surface only from begin-phase entry points and
/// from the `try_*` variants of structural operations.
#[derive(Debug, Error)]
pub enum SceneError {
    /// An operation the tree structure does not allow
    #[error("Structural error: {0}")]
    Structural(String),

    /// Duplicate name or ID among siblings
    #[error("Name or ID already used in container: {0}")]
    IdentityConflict(String),

    /// Reconciliation against a definition of a different node type
    #[error("Type mismatch: node is '{node}', definition is '{definition}'")]
    TypeMismatch {
        /// Runtime type name of the live node
        node: String,
        /// Type name recorded in the definition
        definition: String,
    },

    /// A definition stream could not be opened
    #[error("Missing definition stream: {0}")]
    MissingStream(#[from] StreamError),

    /// The stream ended or nested incorrectly
    #[error("Malformed definition: {0}")]
    Malformed(String),

    /// The handle no longer resolves to a node
    #[error("Invalid node handle: {0:?}")]
    InvalidHandle(NodeHandle),

    /// Invalid configuration
    #[error("Invalid scene configuration: {0}")]
    Config(String),
}

/// Result type for scene operations
pub type Result<T> = std::result::Result<T, SceneError>;
