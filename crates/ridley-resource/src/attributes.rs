//! Ordered attribute storage owned by an entity.

use ridley_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered mapping of attribute names to JSON values.
///
/// Insertion order is preserved so that request bodies are serialized in the
/// order attributes were assigned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeMap(Map<String, Value>);

impl AttributeMap {
    /// Create an empty attribute map.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build an attribute map from a decoded response body.
    ///
    /// A `null` body (e.g. `204 No Content`) yields an empty map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseError`] if the body is neither an object nor `null`.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::new()),
            other => Err(Error::ParseError(format!(
                "expected a JSON object, found {other}"
            ))),
        }
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the value under `key` if it is a string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Assign `value` to `key`, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Remove `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of top-level attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Merge `other` into this map.
    ///
    /// Values from `other` win on conflicting keys; keys only present here are
    /// kept. Nested objects present on both sides are merged the same way.
    pub fn merge(&mut self, other: Self) {
        deep_merge(&mut self.0, other.0);
    }

    /// Consuming variant of [`merge`](Self::merge).
    #[must_use]
    pub fn merged(mut self, other: Self) -> Self {
        self.merge(other);
        self
    }

    /// Borrow the underlying JSON map.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Convert into the underlying JSON map.
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Convert into a JSON object value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Clone into a JSON object value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

fn deep_merge(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        if let Value::Object(incoming) = value {
            if let Some(Value::Object(existing)) = target.get_mut(&key) {
                deep_merge(existing, incoming);
                continue;
            }
            target.insert(key, Value::Object(incoming));
        } else {
            target.insert(key, value);
        }
    }
}

impl From<Map<String, Value>> for AttributeMap {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for AttributeMap {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl IntoIterator for AttributeMap {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
