//! Process-unique object identifiers
//!
//! Scene objects are identified by a random string rather than by their
//! handle: the string survives save/load and template reloads, the handle
//! does not.

use uuid::Uuid;

/// Length of an ID produced by [`generate_object_id`]
pub const OBJECT_ID_LEN: usize = 32;

/// Generate a new random object ID (v4 UUID, simple lowercase hex)
pub fn generate_object_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Check whether a string has the shape of a generated object ID
///
/// IDs loaded from files are accepted as-is whatever their shape; this is
/// only used to tell generated IDs apart from hand-written ones.
pub fn is_object_id(id: &str) -> bool {
    id.len() == OBJECT_ID_LEN && id.bytes().all(|b| b.is_ascii_hexdigit())
}
