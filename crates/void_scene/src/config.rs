//! Scene configuration
//!
//! Loaded from TOML, every field optional:
//!
//! ```toml
//! load_step = 10                     # nodes hydrated per update_load call
//! default_culling_layer = 1
//! object_name_template = "GameObject"
//! container_name_template = "Container"
//! zone_name_template = "Zone"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};

/// Tunables for scene construction and incremental import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Nodes hydrated per import step
    pub load_step: usize,
    /// Culling mask assigned to new objects
    pub default_culling_layer: u32,
    /// Name prefix for plain objects
    pub object_name_template: String,
    /// Name prefix for container objects
    pub container_name_template: String,
    /// Name prefix for zones
    pub zone_name_template: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            load_step: 10,
            default_culling_layer: 1,
            object_name_template: "GameObject".to_string(),
            container_name_template: "Container".to_string(),
            zone_name_template: "Zone".to_string(),
        }
    }
}

impl SceneConfig {
    /// Parse from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| SceneError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SceneError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&content)?;
        log::info!("Loaded scene config from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.load_step == 0 {
            return Err(SceneError::Config("load_step must be at least 1".into()));
        }
        if self.object_name_template.is_empty()
            || self.container_name_template.is_empty()
            || self.zone_name_template.is_empty()
        {
            return Err(SceneError::Config("name templates must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SceneConfig::default();
        assert_eq!(config.load_step, 10);
        assert_eq!(config.default_culling_layer, 1);
        assert_eq!(config.object_name_template, "GameObject");
    }

    #[test]
    fn test_partial_toml() {
        let config = SceneConfig::from_toml_str("load_step = 3\nzone_name_template = \"Area\"").unwrap();
        assert_eq!(config.load_step, 3);
        assert_eq!(config.zone_name_template, "Area");
        assert_eq!(config.container_name_template, "Container");
    }

    #[test]
    fn test_rejects_zero_step() {
        assert!(matches!(
            SceneConfig::from_toml_str("load_step = 0"),
            Err(SceneError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(SceneConfig::load_from_file("/nonexistent/scene.toml").is_err());
    }
}
