//! The flat data context shared by every section and category.

use serde::Serialize;
use std::collections::BTreeMap;

use super::values::Value;
use super::BuildError;

static NULL: Value = Value::Null;

/// Question key to value. Sections and categories never nest into it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormData(pub BTreeMap<String, Value>);

impl FormData {
    pub fn new() -> Self {
        FormData(BTreeMap::new())
    }

    /// Build from a JSON object. `null` is accepted as an empty context.
    pub fn from_json(v: &serde_json::Value) -> Result<FormData, BuildError> {
        match v {
            serde_json::Value::Null => Ok(FormData::new()),
            serde_json::Value::Object(map) => Ok(FormData(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            )),
            other => Err(BuildError::InvalidData {
                got: json_type_name(other).to_string(),
            }),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Value for `key`, with a missing entry read as null.
    pub fn resolve(&self, key: &str) -> &Value {
        self.0.get(key).unwrap_or(&NULL)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Overlay `other` onto this context; keys in `other` win.
    pub fn merge(&mut self, other: FormData) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FormData(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

fn json_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
