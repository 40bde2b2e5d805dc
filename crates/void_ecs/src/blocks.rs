//! Typed data blocks every entity carries
//!
//! The scene layer pushes visibility and transform state into these blocks
//! so systems outside the scene graph can read them without going through
//! the owning object.

use glam::Mat4;

/// Culling layer every new entity starts on
pub const DEFAULT_CULLING_LAYER: u32 = 1;

/// Visibility state of an entity
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibleData {
    /// Whether the entity is visible
    pub visible: bool,
    /// 32-bit culling mask
    pub culling_layer: u32,
}

impl VisibleData {
    /// Create visibility data
    pub fn new(visible: bool, culling_layer: u32) -> Self {
        Self {
            visible,
            culling_layer,
        }
    }

    /// Check whether any bit of `mask` is set on this entity
    #[inline]
    pub fn intersects(&self, mask: u32) -> bool {
        self.culling_layer & mask != 0
    }
}

impl Default for VisibleData {
    fn default() -> Self {
        Self::new(true, DEFAULT_CULLING_LAYER)
    }
}

/// Transform relative to the parent entity
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformData {
    /// Relative transform
    pub relative: Mat4,
    /// Set when `relative` changed since the last world-transform pass
    pub changed: bool,
}

impl TransformData {
    /// Create from a relative matrix
    pub fn new(relative: Mat4) -> Self {
        Self {
            relative,
            changed: true,
        }
    }

    /// Replace the relative matrix and mark it changed
    pub fn set_relative(&mut self, relative: Mat4) {
        self.relative = relative;
        self.changed = true;
    }
}

impl Default for TransformData {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_visible_defaults() {
        let data = VisibleData::default();
        assert!(data.visible);
        assert_eq!(data.culling_layer, DEFAULT_CULLING_LAYER);
        assert!(data.intersects(1));
        assert!(!data.intersects(2));
    }

    #[test]
    fn test_transform_marks_changed() {
        let mut data = TransformData::default();
        data.changed = false;
        data.set_relative(Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)));
        assert!(data.changed);
        approx::assert_relative_eq!(data.relative.w_axis.y, 2.0);
    }
}
