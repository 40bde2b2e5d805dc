//! # void_ir - Definition Trees & Streams
//!
//! The serialization side of the scene graph. Objects are saved as ordered,
//! named definition trees and read back through a pull-style reader.
//!
//! ## Key Concepts
//!
//! - **Value**: a typed property value (scalar, vector, matrix, array or nested object)
//! - **Definition**: a named object with properties in stored order
//! - **ReadEvent**: one step of a stream (`BeginObject`, `Property`, `EndObject`)
//! - **DefinitionSource**: opens rewindable readers by path (JSON files or memory)
//!
//! ```text
//! Definition ──to_events──► EventStream ──next_event──► importer
//!      ▲                                                    │
//!      └─────────────── parse / parse_until ◄───────────────┘
//! ```

pub mod definition;
pub mod error;
pub mod source;
pub mod stream;
pub mod value;

pub use definition::{Definition, ParseStop, Property};
pub use error::{Result, StreamError};
pub use source::{DefinitionSource, FileSource, MemorySource};
pub use stream::{DefinitionReader, EventStream, ReadEvent};
pub use value::Value;
