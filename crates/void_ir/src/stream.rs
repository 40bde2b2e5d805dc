//! Pull-style definition reader
//!
//! Readers hand out one [`ReadEvent`] at a time. Importers walk the same
//! stream twice, so every reader can be rewound to its start.

use crate::definition::Definition;
use crate::value::Value;

/// One structural event of a definition stream
#[derive(Debug, Clone, PartialEq)]
pub enum ReadEvent {
    /// A nested object opens
    BeginObject {
        /// Object name
        name: String,
    },
    /// A scalar property of the innermost open object
    Property {
        /// Property name
        name: String,
        /// Property value
        value: Value,
    },
    /// The innermost open object closes
    EndObject,
}

/// A rewindable source of [`ReadEvent`]s
pub trait DefinitionReader {
    /// Next event, or `None` at end of stream
    fn next_event(&mut self) -> Option<ReadEvent>;

    /// Move the cursor back to the first event
    fn rewind(&mut self);

    /// Number of events consumed since the last rewind
    fn position(&self) -> usize;
}

/// An in-memory event stream
#[derive(Debug, Clone, Default)]
pub struct EventStream {
    events: Vec<ReadEvent>,
    cursor: usize,
}

impl EventStream {
    /// Wrap a list of events
    pub fn new(events: Vec<ReadEvent>) -> Self {
        Self { events, cursor: 0 }
    }

    /// Stream over a definition tree
    pub fn from_definition(definition: &Definition) -> Self {
        Self::new(definition.to_events())
    }

    /// Total number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the stream holds no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl DefinitionReader for EventStream {
    fn next_event(&mut self) -> Option<ReadEvent> {
        let event = self.events.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(event)
    }

    fn rewind(&mut self) {
        self.cursor = 0;
    }

    fn position(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewind() {
        let def = Definition::new("Scene").with("name", "level");
        let mut stream = EventStream::from_definition(&def);
        assert_eq!(stream.len(), 3);

        while stream.next_event().is_some() {}
        assert_eq!(stream.position(), 3);

        stream.rewind();
        assert_eq!(
            stream.next_event(),
            Some(ReadEvent::BeginObject {
                name: "Scene".into()
            })
        );
    }
}
