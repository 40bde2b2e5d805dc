//! # void_core - Scene Graph Core
//!
//! Foundational primitives shared by every other crate in the workspace:
//! - **Handles**: generational, typed, `Copy` references into an [`Arena`]
//! - **IDs**: process-unique random identifiers for scene objects
//!
//! Nothing in here knows about scenes or components. Higher crates build
//! their graphs out of arenas and address nodes by handle.

pub mod handle;
pub mod id;

pub use handle::*;
pub use id::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::handle::{Arena, Handle};
    pub use crate::id::{generate_object_id, is_object_id};
}
