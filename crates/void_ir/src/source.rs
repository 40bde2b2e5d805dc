//! Where definition streams come from
//!
//! A [`DefinitionSource`] opens a path and hands back a rewindable reader.
//! [`FileSource`] stores one JSON document per path under a root directory;
//! [`MemorySource`] keeps definitions in a map and is what tests use.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::definition::Definition;
use crate::error::{Result, StreamError};
use crate::stream::{DefinitionReader, EventStream};

/// Opens and stores definition streams by path
pub trait DefinitionSource {
    /// Open a stream. Fails with [`StreamError::NotFound`] if nothing is stored at `path`.
    fn open(&self, path: &str) -> Result<Box<dyn DefinitionReader>>;

    /// Store a definition at `path`, replacing what was there
    fn save(&mut self, path: &str, definition: &Definition) -> Result<()>;

    /// Load a whole definition tree
    fn load(&self, path: &str) -> Result<Definition> {
        let mut reader = self.open(path)?;
        Definition::parse(reader.as_mut())?.ok_or_else(|| StreamError::NotFound(path.to_string()))
    }
}

/// JSON files under a root directory
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    /// Resolve paths relative to `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl DefinitionSource for FileSource {
    fn open(&self, path: &str) -> Result<Box<dyn DefinitionReader>> {
        let full = self.resolve(path);
        if !full.is_file() {
            return Err(StreamError::NotFound(full.display().to_string()));
        }
        let text = fs::read_to_string(&full)?;
        let definition: Definition = serde_json::from_str(&text)?;
        log::debug!("opened definition stream {}", full.display());
        Ok(Box::new(EventStream::from_definition(&definition)))
    }

    fn save(&mut self, path: &str, definition: &Definition) -> Result<()> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(definition)?;
        fs::write(&full, text)?;
        log::debug!("saved definition stream {}", full.display());
        Ok(())
    }
}

/// Definitions kept in memory, keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    entries: HashMap<String, Definition>,
}

impl MemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a definition
    pub fn insert(&mut self, path: impl Into<String>, definition: Definition) {
        self.entries.insert(path.into(), definition);
    }

    /// Stored definition at `path`
    pub fn get(&self, path: &str) -> Option<&Definition> {
        self.entries.get(path)
    }

    /// Drop a stored definition
    pub fn remove(&mut self, path: &str) -> Option<Definition> {
        self.entries.remove(path)
    }
}

impl DefinitionSource for MemorySource {
    fn open(&self, path: &str) -> Result<Box<dyn DefinitionReader>> {
        let definition = self
            .entries
            .get(path)
            .ok_or_else(|| StreamError::NotFound(path.to_string()))?;
        Ok(Box::new(EventStream::from_definition(definition)))
    }

    fn save(&mut self, path: &str, definition: &Definition) -> Result<()> {
        self.insert(path, definition.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_missing() {
        let source = MemorySource::new();
        assert!(matches!(source.open("nope.template"), Err(StreamError::NotFound(_))));
    }

    #[test]
    fn test_file_source_round_trip() {
        let dir = std::env::temp_dir().join(format!("void_ir_source_{}", std::process::id()));
        let mut source = FileSource::new(&dir);

        let def = Definition::new("GameObject")
            .with("name", "Crate")
            .with("culling", 3u32)
            .with("transform", [1.0f32; 16]);
        source.save("props/crate.template", &def).unwrap();

        assert_eq!(source.load("props/crate.template").unwrap(), def);
        assert!(matches!(source.open("props/missing.template"), Err(StreamError::NotFound(_))));

        let _ = fs::remove_dir_all(&dir);
    }
}
