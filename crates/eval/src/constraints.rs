//! Constraint descriptor registry.
//!
//! Constraints are never executed here. A question's `constraints` block is
//! checked against a closed registry of known names and turned into opaque
//! [`ConstraintDescriptor`] records for the host's validation engine.

use formtree_interchange::JsonMap;
use serde::Serialize;
use std::collections::BTreeMap;

/// Opaque `{kind, options}` record handed to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintDescriptor {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<JsonMap>,
}

/// Errors raised while building constraint descriptors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstraintError {
    #[error("unknown constraint '{name}'")]
    Unknown { name: String },

    #[error("constraint '{name}': {message}")]
    InvalidOptions { name: String, message: String },
}

/// Built-in constraint names and, for each, the option keys of which at
/// least one must be present. An empty list means no option is required.
const BUILTIN: &[(&str, &[&str])] = &[
    ("All", &[]),
    ("Bic", &[]),
    ("Blank", &[]),
    ("CardScheme", &["schemes"]),
    ("Choice", &["choices", "callback"]),
    ("Count", &["min", "max", "exactly"]),
    ("Country", &[]),
    ("CssColor", &[]),
    ("Currency", &[]),
    ("Date", &[]),
    ("DateTime", &[]),
    ("DivisibleBy", &["value", "propertyPath"]),
    ("Email", &[]),
    ("EqualTo", &["value", "propertyPath"]),
    ("Expression", &["expression"]),
    ("File", &[]),
    ("GreaterThan", &["value", "propertyPath"]),
    ("GreaterThanOrEqual", &["value", "propertyPath"]),
    ("Hostname", &[]),
    ("Iban", &[]),
    ("IdenticalTo", &["value", "propertyPath"]),
    ("Image", &[]),
    ("Ip", &[]),
    ("IsFalse", &[]),
    ("IsNull", &[]),
    ("IsTrue", &[]),
    ("Isbn", &[]),
    ("Issn", &[]),
    ("Json", &[]),
    ("Language", &[]),
    ("Length", &["min", "max", "exactly"]),
    ("LessThan", &["value", "propertyPath"]),
    ("LessThanOrEqual", &["value", "propertyPath"]),
    ("Locale", &[]),
    ("Luhn", &[]),
    ("Negative", &[]),
    ("NegativeOrZero", &[]),
    ("NotBlank", &[]),
    ("NotEqualTo", &["value", "propertyPath"]),
    ("NotIdenticalTo", &["value", "propertyPath"]),
    ("NotNull", &[]),
    ("Positive", &[]),
    ("PositiveOrZero", &[]),
    ("Range", &["min", "max", "minPropertyPath", "maxPropertyPath"]),
    ("Regex", &["pattern"]),
    ("Time", &[]),
    ("Timezone", &[]),
    ("Type", &["type"]),
    ("Ulid", &[]),
    ("Unique", &[]),
    ("Url", &[]),
    ("Uuid", &[]),
    ("WordCount", &["min", "max"]),
];

/// Closed set of known constraint names.
///
/// Built once, optionally extended with extra names from configuration, and
/// read-only afterwards.
#[derive(Debug, Clone)]
pub struct ConstraintRegistry {
    entries: BTreeMap<String, Vec<String>>,
}

impl Default for ConstraintRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ConstraintRegistry {
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(name, keys)| {
                (
                    name.to_string(),
                    keys.iter().map(|k| k.to_string()).collect(),
                )
            })
            .collect();
        ConstraintRegistry { entries }
    }

    /// Add host-specific names. Extra names require no options.
    pub fn with_extra<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.entries.entry(name.into()).or_default();
        }
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    /// Option keys of which at least one is required for `name`.
    pub fn required_options(&self, name: &str) -> Option<&[String]> {
        self.entries.get(name).map(|v| v.as_slice())
    }

    /// Build the descriptor for one constraint.
    ///
    /// Object options are kept; any other shape yields a descriptor
    /// without options.
    pub fn descriptor(
        &self,
        name: &str,
        options: &serde_json::Value,
    ) -> Result<ConstraintDescriptor, ConstraintError> {
        let required = self
            .entries
            .get(name)
            .ok_or_else(|| ConstraintError::Unknown {
                name: name.to_string(),
            })?;

        let options = options.as_object().cloned();
        if !required.is_empty() {
            let satisfied = options
                .as_ref()
                .is_some_and(|o| required.iter().any(|k| o.contains_key(k)));
            if !satisfied {
                return Err(ConstraintError::InvalidOptions {
                    name: name.to_string(),
                    message: format!("requires one of the options: {}", required.join(", ")),
                });
            }
        }

        Ok(ConstraintDescriptor {
            kind: name.to_string(),
            options,
        })
    }

    /// Build descriptors for a whole `constraints` block, in declaration
    /// order. The first unknown or ill-configured name aborts.
    pub fn build(
        &self,
        constraints: &[(String, serde_json::Value)],
    ) -> Result<Vec<ConstraintDescriptor>, ConstraintError> {
        constraints
            .iter()
            .map(|(name, options)| self.descriptor(name, options))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn block(v: serde_json::Value) -> Vec<(String, serde_json::Value)> {
        v.as_object()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    #[test]
    fn descriptors_keep_declaration_order() {
        let registry = ConstraintRegistry::builtin();
        let out = registry
            .build(&block(json!({
                "NotBlank": null,
                "Length": { "min": 2, "max": 40 },
                "Email": {}
            })))
            .unwrap();
        let kinds: Vec<&str> = out.iter().map(|d| d.kind.as_str()).collect();
        assert_eq!(kinds, vec!["NotBlank", "Length", "Email"]);
        assert_eq!(out[0].options, None);
        assert_eq!(out[1].options.as_ref().unwrap()["max"], json!(40));
        assert_eq!(out[2].options, Some(JsonMap::new()));
    }

    #[test]
    fn unknown_name_is_rejected() {
        let registry = ConstraintRegistry::builtin();
        let err = registry.build(&block(json!({ "Bogus": {} }))).unwrap_err();
        assert_eq!(
            err,
            ConstraintError::Unknown {
                name: "Bogus".to_string()
            }
        );
    }

    #[test]
    fn non_object_options_produce_bare_descriptor() {
        let registry = ConstraintRegistry::builtin();
        let d = registry.descriptor("NotNull", &json!(true)).unwrap();
        assert_eq!(d.options, None);
        assert_eq!(serde_json::to_value(&d).unwrap(), json!({ "kind": "NotNull" }));
    }

    #[test]
    fn missing_required_option_is_rejected() {
        let registry = ConstraintRegistry::builtin();
        let err = registry.descriptor("Length", &json!({ "charset": "UTF-8" })).unwrap_err();
        assert!(matches!(err, ConstraintError::InvalidOptions { ref name, .. } if name == "Length"));
        assert!(registry.descriptor("Length", &json!({ "exactly": 5 })).is_ok());
        assert!(registry.descriptor("Regex", &json!(null)).is_err());
    }

    #[test]
    fn extra_names_extend_the_registry() {
        let registry = ConstraintRegistry::builtin().with_extra(["PostalCode"]);
        assert!(registry.contains("PostalCode"));
        assert!(registry.descriptor("PostalCode", &json!(null)).is_ok());
        assert!(registry.names().any(|n| n == "NotBlank"));
    }
}
