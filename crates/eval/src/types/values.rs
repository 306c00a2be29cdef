//! Runtime value types and JSON conversion helpers.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

// ──────────────────────────────────────────────
// Runtime values
// ──────────────────────────────────────────────

/// A value in the flat data context.
///
/// Equality is strict: values of different variants are never equal, so
/// `Text("1") != Int(1)` and `Int(1) != Decimal(1.0)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    /// A number too large or too precise for `Decimal`.
    Float(f64),
    Text(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Date(time::Date),
    DateTime(time::OffsetDateTime),
    Time(time::Time),
    /// An uploaded file supplied by the host; never produced from JSON.
    File(FileHandle),
}

/// Opaque handle to a file the host has already received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub path: PathBuf,
    pub original_name: Option<String>,
    pub mime_type: Option<String>,
    pub size: Option<u64>,
}

impl FileHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileHandle {
            path: path.into(),
            original_name: None,
            mime_type: None,
            size: None,
        }
    }
}

impl Value {
    /// Returns a human-readable type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Decimal(_) => "Decimal",
            Value::Float(_) => "Float",
            Value::Text(_) => "Text",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
            Value::Date(_) => "Date",
            Value::DateTime(_) => "DateTime",
            Value::Time(_) => "Time",
            Value::File(_) => "File",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for host-supplied date, datetime and time values.
    pub fn is_temporal(&self) -> bool {
        matches!(self, Value::Date(_) | Value::DateTime(_) | Value::Time(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert a JSON value. Integers that fit in `i64` become `Int`, other
    /// numbers become `Decimal`, or `Float` when `Decimal` cannot hold them.
    pub fn from_json(v: &serde_json::Value) -> Value {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => number_to_value(n),
            serde_json::Value::String(s) => Value::Text(s.clone()),
            serde_json::Value::Array(items) => Value::List(items.iter().map(Value::from_json).collect()),
            serde_json::Value::Object(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert to JSON for output. Temporal values are rendered as ISO 8601
    /// strings and files as a small descriptive object.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Decimal(d) => d
                .to_f64()
                .and_then(serde_json::Number::from_f64)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(d.to_string())),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Date(d) => serde_json::Value::String(
                d.format(format_description!("[year]-[month]-[day]"))
                    .unwrap_or_else(|_| d.to_string()),
            ),
            Value::DateTime(dt) => {
                serde_json::Value::String(dt.format(&Rfc3339).unwrap_or_else(|_| dt.to_string()))
            }
            Value::Time(t) => serde_json::Value::String(
                t.format(format_description!("[hour]:[minute]:[second]"))
                    .unwrap_or_else(|_| t.to_string()),
            ),
            Value::File(file) => serde_json::json!({
                "path": file.path.display().to_string(),
                "originalName": file.original_name,
                "mimeType": file.mime_type,
                "size": file.size,
            }),
        }
    }
}

fn number_to_value(n: &serde_json::Number) -> Value {
    if let Some(i) = n.as_i64() {
        return Value::Int(i);
    }
    let text = n.to_string();
    if let Ok(d) = text
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&text))
    {
        return Value::Decimal(d);
    }
    match n.as_f64() {
        Some(f) => Value::Float(f),
        None => Value::Null,
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}
