//! A small dynamically-shaped value used wherever the source system passed
//! around untyped JSON (request `environment`/`context`, token `claims`,
//! policy condition values).
//!
//! Rearchitecture note (spec §9): "dynamically-typed claim bags become a
//! value union: string, number, bool, list-of-values, map-of-string-to-value.
//! Dot-path resolution walks the map structure." This type is that union.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A dynamically-typed attribute value, the building block of every
/// subject/resource/environment/context bag evaluated by the Authorization
/// and Risk engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    String(String),
    Number(f64),
    Bool(bool),
    List(Vec<AttributeValue>),
    Map(BTreeMap<String, AttributeValue>),
    Null,
}

impl AttributeValue {
    pub fn str(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    pub fn num(n: impl Into<f64>) -> Self {
        Self::Number(n.into())
    }

    pub fn map() -> AttributeMapBuilder {
        AttributeMapBuilder(BTreeMap::new())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, AttributeValue>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Resolve a dot-delimited field path (e.g. `"device.fingerprint"`)
    /// against a nested map value. Returns `None` if any segment is absent
    /// or the value at some prefix is not a map.
    pub fn resolve_path(&self, path: &str) -> Option<&AttributeValue> {
        let mut current = self;
        for segment in path.split('.') {
            current = current.as_map()?.get(segment)?;
        }
        Some(current)
    }

    /// Render as a loose string for comparisons that accept either a native
    /// string or a stringified scalar (mirrors how the source system's
    /// dynamically-typed values compare loosely).
    pub fn to_loose_string(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Number(n) => {
                if n.fract() == 0.0 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Self::Bool(b) => b.to_string(),
            Self::Null => String::new(),
            Self::List(_) | Self::Map(_) => String::new(),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Fluent builder for `AttributeValue::Map`, to keep call sites building
/// context bags readable.
pub struct AttributeMapBuilder(BTreeMap<String, AttributeValue>);

impl AttributeMapBuilder {
    pub fn set(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> AttributeValue {
        AttributeValue::Map(self.0)
    }
}

impl Default for AttributeValue {
    fn default() -> Self {
        Self::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_nested_dot_path() {
        let value = AttributeValue::map()
            .set(
                "device",
                AttributeValue::map().set("fingerprint", "abc123").build(),
            )
            .build();

        assert_eq!(
            value.resolve_path("device.fingerprint").and_then(AttributeValue::as_str),
            Some("abc123")
        );
    }

    #[test]
    fn missing_segment_resolves_to_none() {
        let value = AttributeValue::map().set("ip", "10.0.0.1").build();
        assert!(value.resolve_path("device.fingerprint").is_none());
    }

    #[test]
    fn loose_string_normalizes_integral_numbers() {
        assert_eq!(AttributeValue::Number(42.0).to_loose_string(), "42");
        assert_eq!(AttributeValue::Number(4.5).to_loose_string(), "4.5");
    }
}
