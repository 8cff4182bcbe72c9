//! JSON feature records.

use serde_json::Value;
use std::path::Path;

use super::{read_text, DocumentError};
use crate::error::{IngestionError, Result};

/// A parsed JSON document with JSON-pointer lookups (`/properties/sun/azimuth`).
#[derive(Debug, Clone, PartialEq)]
pub struct JsonDocument {
    value: Value,
}

impl JsonDocument {
    pub fn parse(text: &str) -> std::result::Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(DocumentError::Structure("top level is not an object".into()));
        }
        Ok(Self { value })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = read_text(path)?;
        Self::parse(&text).map_err(|e| IngestionError::document(path, e))
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Raw value at `pointer`; JSON `null` counts as absent.
    pub fn value_at(&self, pointer: &str) -> Option<&Value> {
        self.value.pointer(pointer).filter(|v| !v.is_null())
    }

    pub fn str_at(&self, pointer: &str) -> Option<&str> {
        self.value_at(pointer).and_then(Value::as_str)
    }

    /// Numbers, or numeric strings, at `pointer`.
    pub fn f64_at(&self, pointer: &str) -> Option<f64> {
        match self.value_at(pointer)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn u64_at(&self, pointer: &str) -> Option<u64> {
        match self.value_at(pointer)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}
