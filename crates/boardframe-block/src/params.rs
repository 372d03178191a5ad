use std::borrow::Cow;
use std::fmt;

use serde_json::Value;

use crate::error::{BlockError, Result};

/// Reserved key whose value is decoded as JSON.
pub const DATA_KEY: &str = "data";

/// Returns true if `key` is a non-empty run of `[A-Za-z0-9_]`.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// A single parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Plain text, exactly as written in the block (trimmed).
    Text(String),
    /// Decoded JSON; only produced for the `data` key.
    Json(Value),
}

impl ParamValue {
    /// The string form used both in block text and as a query value.
    /// JSON values are written compactly.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            ParamValue::Text(text) => Cow::Borrowed(text),
            ParamValue::Json(value) => Cow::Owned(value.to_string()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(text) => Some(text),
            ParamValue::Json(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ParamValue::Json(value) => Some(value),
            ParamValue::Text(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        ParamValue::Json(value)
    }
}

/// Insertion-ordered parameter map.
///
/// Re-inserting an existing key replaces its value but keeps its original
/// position, so query strings built from the map follow the block's line order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterMap {
    entries: Vec<(String, ParamValue)>,
}

impl ParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value. Returns the previous value for `key`.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Result<Option<ParamValue>> {
        let key = key.into();
        if !is_valid_key(&key) {
            return Err(BlockError::InvalidKey(key));
        }
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => Ok(Some(std::mem::replace(slot, value))),
            None => {
                self.entries.push((key, value));
                Ok(None)
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Text value for `key`; `None` for missing keys and JSON values.
    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ParamValue::as_text)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        let index = self.entries.iter().position(|(existing, _)| existing == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
