//! Submission records

use crate::{FillError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved field holding the signature/photo URL
pub const SIGNATURE_FIELD: &str = "signature_url";

/// Field used to name output files
pub const DISPLAY_NAME_FIELD: &str = "full_name";

/// One submission: a bag of named scalar values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a record from a JSON object
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Build a record from a JSON value, which must be an object
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(FillError::InvalidRecord(format!(
                "expected a JSON object, got {}",
                kind_of(&other)
            ))),
        }
    }

    /// Set a value, returning the record for chaining
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// The value of `name` as it is drawn. `None` when there is nothing to draw.
    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name)
            .and_then(scalar_text)
            .filter(|s| !s.is_empty())
    }

    /// The value of `name` as an image URL
    pub fn url(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim()),
            _ => None,
        }
    }

    /// The name shown for this record, if it has one
    ///
    /// Numbers and `true` are stringified. Empty strings, zero and `false`
    /// count as no name.
    pub fn display_name(&self) -> Option<String> {
        match self.get(DISPLAY_NAME_FIELD)? {
            Value::Bool(false) => None,
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            value => scalar_text(value).filter(|s| !s.is_empty()),
        }
    }

    /// Storage identifier, when the record carries one
    pub fn id(&self) -> Option<String> {
        match self.get("id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Stringify a scalar the way a browser form would show it
///
/// Integral numbers lose their fractional part and booleans become
/// `true`/`false`. Null, arrays and objects have no text.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i.to_string());
            }
            if let Some(u) = n.as_u64() {
                return Some(u.to_string());
            }
            let f = n.as_f64()?;
            if f.fract() == 0.0 && f.abs() < 1e15 {
                Some(format!("{}", f as i64))
            } else {
                Some(f.to_string())
            }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
