//! Dynamic value types for definition properties
//!
//! Values are the leaves of a [`Definition`] tree. Nested objects are
//! themselves definitions, so a whole subtree can travel as one value.

use serde::{Deserialize, Serialize};

use crate::definition::Definition;

/// A dynamic property value
///
/// Adjacently tagged so a file round-trips without guessing: a three-float
/// array and a `Vec3` stay distinct.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Absent value
    #[default]
    Null,
    /// Flag
    Bool(bool),
    /// Integer, widened to i64
    Int(i64),
    /// Float, widened to f64
    Float(f64),
    /// Text
    String(String),
    /// Position, rotation or scale triple
    Vec3([f32; 3]),
    /// RGBA color
    Color([f32; 4]),
    /// Column-major 4x4 matrix
    Mat4([f32; 16]),
    /// Homogeneous or mixed list
    Array(Vec<Value>),
    /// Nested object
    Object(Definition),
}

impl Value {
    /// True for [`Value::Null`]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Flag, accepting integers as C-style booleans
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Int(i) => Some(*i != 0),
            _ => None,
        }
    }

    /// Integer, truncating floats
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    /// Try to get as u32, rejecting out-of-range integers
    pub fn as_u32(&self) -> Option<u32> {
        u32::try_from(self.as_int()?).ok()
    }

    /// Float, widening integers
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Borrowed text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Triple, also accepted from a three-number array
    pub fn as_vec3(&self) -> Option<[f32; 3]> {
        match self {
            Self::Vec3(v) => Some(*v),
            Self::Array(arr) if arr.len() == 3 => Some([
                arr[0].as_float()? as f32,
                arr[1].as_float()? as f32,
                arr[2].as_float()? as f32,
            ]),
            _ => None,
        }
    }

    /// Try to get as color
    pub fn as_color(&self) -> Option<[f32; 4]> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// Try to get as a column-major matrix
    pub fn as_mat4(&self) -> Option<[f32; 16]> {
        match self {
            Self::Mat4(m) => Some(*m),
            _ => None,
        }
    }

    /// Try to get as a nested object
    pub fn as_object(&self) -> Option<&Definition> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Try to get as a mutable nested object
    pub fn as_object_mut(&mut self) -> Option<&mut Definition> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }
}

macro_rules! impl_from {
    ($($source:ty => |$v:ident| $body:expr),* $(,)?) => {
        $(
            impl From<$source> for Value {
                fn from($v: $source) -> Self {
                    $body
                }
            }
        )*
    };
}

impl_from! {
    bool => |v| Self::Bool(v),
    i32 => |v| Self::Int(i64::from(v)),
    u32 => |v| Self::Int(i64::from(v)),
    i64 => |v| Self::Int(v),
    f32 => |v| Self::Float(f64::from(v)),
    f64 => |v| Self::Float(v),
    String => |v| Self::String(v),
    &str => |v| Self::String(v.to_owned()),
    [f32; 3] => |v| Self::Vec3(v),
    [f32; 4] => |v| Self::Color(v),
    [f32; 16] => |v| Self::Mat4(v),
    Definition => |v| Self::Object(v),
}

impl<V: Into<Value>> FromIterator<V> for Value {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::Array(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_conversions() {
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from(42u32).as_u32(), Some(42));
        assert_eq!(Value::from(-1i64).as_u32(), None);
        assert_eq!(Value::from("Barrel").as_str(), Some("Barrel"));
        approx::assert_relative_eq!(Value::from(1.5f32).as_float().unwrap(), 1.5);
    }

    #[test]
    fn test_vec3_from_array() {
        let arr: Value = [1.0f64, 2.0, 3.0].into_iter().collect();
        assert_eq!(arr.as_vec3(), Some([1.0, 2.0, 3.0]));
        assert_eq!(Value::Vec3([4.0, 5.0, 6.0]).as_vec3(), Some([4.0, 5.0, 6.0]));
    }

    #[test]
    fn test_json_keeps_variant() {
        let v = Value::Vec3([1.0, 2.0, 3.0]);
        let json = serde_json::to_string(&v).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);

        let arr: Value = [1.0f64, 2.0, 3.0].into_iter().collect();
        let json = serde_json::to_string(&arr).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, Value::Array(_)));
    }
}
