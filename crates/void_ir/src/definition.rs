//! Ordered, named definition trees
//!
//! A [`Definition`] is what an object looks like once serialized: a name
//! plus an ordered list of properties, where a property value may itself be
//! a nested definition. Property order is stored order and is preserved
//! through every conversion in this crate.

use serde::{Deserialize, Serialize};

use crate::error::StreamError;
use crate::stream::{DefinitionReader, ReadEvent};
use crate::value::Value;

/// One named property of a definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Property name (for nested objects, the object's name)
    pub name: String,
    /// Property value
    pub value: Value,
}

impl Property {
    /// Create a property
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A serialized object: name plus ordered properties
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Definition {
    /// Object name (node kind or component type name)
    pub name: String,
    /// Properties in stored order
    #[serde(default)]
    pub properties: Vec<Property>,
}

/// How [`Definition::parse_until`] stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStop {
    /// The object's closing event was consumed
    Closed,
    /// The stop block was opened; the reader sits inside it
    AtBlock,
}

impl Definition {
    /// Create an empty definition
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    /// Builder-style property append
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(name, value);
        self
    }

    /// Builder-style nested object append
    pub fn with_object(mut self, object: Definition) -> Self {
        self.add_object(object);
        self
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Check if there are no properties
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// First property with this name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }

    /// Mutable access to the first property with this name
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.properties
            .iter_mut()
            .find(|p| p.name == name)
            .map(|p| &mut p.value)
    }

    /// Check for a property
    pub fn contains(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p.name == name)
    }

    /// Replace the first property with this name, or append it
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.get_mut(&name) {
            Some(slot) => *slot = value,
            None => self.properties.push(Property { name, value }),
        }
    }

    /// Append a property, even if the name is already present
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties.push(Property::new(name, value));
    }

    /// Remove every property with this name. Returns how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.properties.len();
        self.properties.retain(|p| p.name != name);
        before - self.properties.len()
    }

    /// Bool property
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name)?.as_bool()
    }

    /// Integer property
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name)?.as_int()
    }

    /// Unsigned 32-bit property
    pub fn get_u32(&self, name: &str) -> Option<u32> {
        self.get(name)?.as_u32()
    }

    /// Float property
    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.get(name)?.as_float()
    }

    /// String property
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name)?.as_str()
    }

    /// Vec3 property
    pub fn get_vec3(&self, name: &str) -> Option<[f32; 3]> {
        self.get(name)?.as_vec3()
    }

    /// Matrix property
    pub fn get_mat4(&self, name: &str) -> Option<[f32; 16]> {
        self.get(name)?.as_mat4()
    }

    /// First nested object with this name
    pub fn object(&self, name: &str) -> Option<&Definition> {
        self.properties
            .iter()
            .filter(|p| p.name == name)
            .find_map(|p| p.value.as_object())
    }

    /// Mutable access to the first nested object with this name
    pub fn object_mut(&mut self, name: &str) -> Option<&mut Definition> {
        self.properties
            .iter_mut()
            .filter(|p| p.name == name)
            .find_map(|p| p.value.as_object_mut())
    }

    /// Nested objects in stored order
    pub fn objects(&self) -> impl Iterator<Item = &Definition> + '_ {
        self.properties.iter().filter_map(|p| p.value.as_object())
    }

    /// Append a nested object
    pub fn add_object(&mut self, object: Definition) {
        self.properties.push(Property {
            name: object.name.clone(),
            value: Value::Object(object),
        });
    }

    /// Flatten into the pull-reader event form
    pub fn to_events(&self) -> Vec<ReadEvent> {
        let mut events = Vec::new();
        self.write_events(&mut events);
        events
    }

    /// Append this definition's events to `out`
    pub fn write_events(&self, out: &mut Vec<ReadEvent>) {
        out.push(ReadEvent::BeginObject {
            name: self.name.clone(),
        });
        for property in &self.properties {
            match &property.value {
                Value::Object(object) => object.write_events(out),
                value => out.push(ReadEvent::Property {
                    name: property.name.clone(),
                    value: value.clone(),
                }),
            }
        }
        out.push(ReadEvent::EndObject);
    }

    /// Read one whole object from the reader.
    ///
    /// The reader must be positioned just before the object's `BeginObject`
    /// event. Returns `Ok(None)` at a clean end of stream.
    pub fn parse(reader: &mut dyn DefinitionReader) -> Result<Option<Definition>, StreamError> {
        loop {
            match reader.next_event() {
                Some(ReadEvent::BeginObject { name }) => {
                    return Self::parse_body(reader, name).map(Some)
                }
                Some(_) => continue,
                None => return Ok(None),
            }
        }
    }

    /// Read the body of an object whose `BeginObject` was already consumed
    pub fn parse_body(
        reader: &mut dyn DefinitionReader,
        name: impl Into<String>,
    ) -> Result<Definition, StreamError> {
        let (definition, _) = Self::parse_until(reader, name, None)?;
        Ok(definition)
    }

    /// Read an object body, stopping early when a nested block named
    /// `stop_block` opens.
    ///
    /// Stopping at a block leaves the reader inside it, so the block's
    /// entries can be consumed one by one by the caller. The block's own
    /// closing event and the enclosing object's closing event are then the
    /// caller's to skip.
    pub fn parse_until(
        reader: &mut dyn DefinitionReader,
        name: impl Into<String>,
        stop_block: Option<&str>,
    ) -> Result<(Definition, ParseStop), StreamError> {
        let mut definition = Definition::new(name);
        loop {
            match reader.next_event() {
                Some(ReadEvent::BeginObject { name }) => {
                    if stop_block == Some(name.as_str()) {
                        return Ok((definition, ParseStop::AtBlock));
                    }
                    let nested = Self::parse_body(reader, name)?;
                    definition.add_object(nested);
                }
                Some(ReadEvent::Property { name, value }) => definition.push(name, value),
                Some(ReadEvent::EndObject) => return Ok((definition, ParseStop::Closed)),
                None => {
                    return Err(StreamError::UnexpectedEnd {
                        object: definition.name,
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::EventStream;

    fn sample() -> Definition {
        Definition::new("GameObject")
            .with("id", "abc")
            .with("enable", true)
            .with_object(
                Definition::new("Components")
                    .with_object(Definition::new("Mesh").with("path", "cube.obj")),
            )
            .with_object(
                Definition::new("Children").with_object(Definition::new("GameObject").with("id", "child")),
            )
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut def = Definition::new("Node").with("a", 1).with("b", 2);
        def.set("a", 10);
        def.set("c", 3);

        let names: Vec<_> = def.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(def.get_int("a"), Some(10));
    }

    #[test]
    fn test_objects_in_order() {
        let def = sample();
        let names: Vec<_> = def.objects().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["Components", "Children"]);
        assert_eq!(
            def.object("Components")
                .and_then(|c| c.object("Mesh"))
                .and_then(|m| m.get_str("path")),
            Some("cube.obj")
        );
    }

    #[test]
    fn test_events_parse_back() {
        let def = sample();
        let mut stream = EventStream::new(def.to_events());
        let parsed = Definition::parse(&mut stream).unwrap().unwrap();
        assert_eq!(parsed, def);
        assert_eq!(Definition::parse(&mut stream).unwrap(), None);
    }

    #[test]
    fn test_parse_until_stops_inside_block() {
        let def = sample();
        let mut stream = EventStream::new(def.to_events());
        stream.next_event();

        let (head, stop) = Definition::parse_until(&mut stream, "GameObject", Some("Children")).unwrap();
        assert_eq!(stop, ParseStop::AtBlock);
        assert!(head.object("Components").is_some());
        assert!(head.object("Children").is_none());

        // Next comes the first child
        assert_eq!(
            stream.next_event(),
            Some(ReadEvent::BeginObject {
                name: "GameObject".into()
            })
        );
    }

    #[test]
    fn test_truncated_stream() {
        let mut events = sample().to_events();
        events.truncate(5);
        let mut stream = EventStream::new(events);
        let result = Definition::parse(&mut stream);
        assert!(matches!(result, Err(StreamError::UnexpectedEnd { .. })));
    }
}
